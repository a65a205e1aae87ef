//! Projection modes and their parameter sets.
//!
//! Matrices follow the OpenGL clip-space convention (depth in `[-w, w]`); the
//! shader remaps depth for wgpu, so the camera block carries the matrices
//! unchanged.

use cgmath::{Deg, Matrix4, Rad};

/// One of the two mutually exclusive projection modes
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Projection {
    Perspective {
        fovy: Rad<f32>,
        aspect: f32,
        near: f32,
        far: f32,
    },
    Orthographic {
        left: f32,
        right: f32,
        bottom: f32,
        top: f32,
        near: f32,
        far: f32,
    },
}

impl Projection {
    pub fn perspective(fovy: impl Into<Rad<f32>>, aspect: f32, near: f32, far: f32) -> Self {
        Projection::Perspective {
            fovy: fovy.into(),
            aspect,
            near,
            far,
        }
    }

    pub fn orthographic(left: f32, right: f32, bottom: f32, top: f32, near: f32, far: f32) -> Self {
        Projection::Orthographic {
            left,
            right,
            bottom,
            top,
            near,
            far,
        }
    }

    pub fn is_perspective(&self) -> bool {
        matches!(self, Projection::Perspective { .. })
    }

    pub fn to_matrix(&self) -> Matrix4<f32> {
        match *self {
            Projection::Perspective {
                fovy,
                aspect,
                near,
                far,
            } => cgmath::perspective(fovy, aspect, near, far),
            Projection::Orthographic {
                left,
                right,
                bottom,
                top,
                near,
                far,
            } => cgmath::ortho(left, right, bottom, top, near, far),
        }
    }

    /// Recovers the parameters of a matrix built by [`cgmath::perspective`]
    /// or [`cgmath::ortho`].
    ///
    /// Returns `None` when the matrix does not have the expected shape.
    pub fn from_matrix(m: &Matrix4<f32>, is_perspective: bool) -> Option<Self> {
        let projection = if is_perspective {
            let f = m.y.y;
            let (a, b) = (m.z.z, m.w.z);
            Projection::Perspective {
                fovy: Rad(2.0 * (1.0 / f).atan()),
                aspect: f / m.x.x,
                near: b / (a - 1.0),
                far: b / (a + 1.0),
            }
        } else {
            let width = 2.0 / m.x.x;
            let height = 2.0 / m.y.y;
            let depth = -2.0 / m.z.z;
            // translation column holds -(max + min) / extent per axis
            let (sum_x, sum_y, sum_z) = (-m.w.x * width, -m.w.y * height, -m.w.z * depth);
            Projection::Orthographic {
                left: (sum_x - width) * 0.5,
                right: (sum_x + width) * 0.5,
                bottom: (sum_y - height) * 0.5,
                top: (sum_y + height) * 0.5,
                near: (sum_z - depth) * 0.5,
                far: (sum_z + depth) * 0.5,
            }
        };

        projection.is_finite().then_some(projection)
    }

    /// Same projection with a new aspect ratio.
    ///
    /// Orthographic bounds keep their vertical extent and horizontal centre.
    pub fn with_aspect(&self, aspect: f32) -> Self {
        match *self {
            Projection::Perspective { fovy, near, far, .. } => Projection::Perspective {
                fovy,
                aspect,
                near,
                far,
            },
            Projection::Orthographic {
                left,
                right,
                bottom,
                top,
                near,
                far,
            } => {
                let cx = (left + right) * 0.5;
                let half_width = (top - bottom) * aspect * 0.5;
                Projection::Orthographic {
                    left: cx - half_width,
                    right: cx + half_width,
                    bottom,
                    top,
                    near,
                    far,
                }
            }
        }
    }

    /// Scales orthographic bounds about their centre by `factor`.
    ///
    /// Each extent is clamped to `[min_extent, max_extent]`. Bounds that
    /// still round onto their centre are pushed one ULP apart, so the result
    /// always has `right > left` and `top > bottom`. Perspective projections
    /// are returned unchanged.
    pub fn zoomed(&self, factor: f32, min_extent: f32, max_extent: f32) -> Self {
        match *self {
            Projection::Orthographic {
                left,
                right,
                bottom,
                top,
                near,
                far,
            } => {
                let (cx, cy) = ((left + right) * 0.5, (bottom + top) * 0.5);
                let width = clamp_extent((right - left).abs() * factor, min_extent, max_extent);
                let height = clamp_extent((top - bottom).abs() * factor, min_extent, max_extent);
                let (left, right) = open_interval(cx, width);
                let (bottom, top) = open_interval(cy, height);
                Projection::Orthographic {
                    left,
                    right,
                    bottom,
                    top,
                    near,
                    far,
                }
            }
            perspective => perspective,
        }
    }

    fn is_finite(&self) -> bool {
        match *self {
            Projection::Perspective {
                fovy,
                aspect,
                near,
                far,
            } => [fovy.0, aspect, near, far].iter().all(|v| v.is_finite()),
            Projection::Orthographic {
                left,
                right,
                bottom,
                top,
                near,
                far,
            } => [left, right, bottom, top, near, far]
                .iter()
                .all(|v| v.is_finite()),
        }
    }
}

impl Default for Projection {
    fn default() -> Self {
        Projection::perspective(Deg(30.0), 4.0 / 3.0, 1.0, 50.0)
    }
}

fn clamp_extent(extent: f32, min_extent: f32, max_extent: f32) -> f32 {
    if extent.is_nan() {
        min_extent
    } else {
        extent.clamp(min_extent, max_extent)
    }
}

/// `centre ± extent / 2`, at least one representable step on each side
fn open_interval(centre: f32, extent: f32) -> (f32, f32) {
    let (low, high) = (centre - extent * 0.5, centre + extent * 0.5);
    if high > low {
        (low, high)
    } else {
        (next_down(centre), next_up(centre))
    }
}

fn next_up(x: f32) -> f32 {
    if x.is_nan() || x == f32::INFINITY {
        x
    } else if x == 0.0 {
        f32::from_bits(1)
    } else if x > 0.0 {
        f32::from_bits(x.to_bits() + 1)
    } else {
        f32::from_bits(x.to_bits() - 1)
    }
}

fn next_down(x: f32) -> f32 {
    -next_up(-x)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_close(a: f32, b: f32) {
        assert!((a - b).abs() <= 1e-3 * b.abs().max(1.0), "{} != {}", a, b);
    }

    #[test]
    fn test_perspective_parameters_recovered_from_matrix() {
        let original = Projection::perspective(Deg(100.0), 640.0 / 480.0, 1.0, 50.0);
        let Some(Projection::Perspective {
            fovy,
            aspect,
            near,
            far,
        }) = Projection::from_matrix(&original.to_matrix(), true)
        else {
            panic!("expected a perspective projection");
        };
        assert_close(Deg::from(fovy).0, 100.0);
        assert_close(aspect, 640.0 / 480.0);
        assert_close(near, 1.0);
        assert_close(far, 50.0);
    }

    #[test]
    fn test_orthographic_parameters_recovered_from_matrix() {
        let original = Projection::orthographic(-2.0, 3.0, -1.0, 2.0, 1.0, 10.0);
        let Some(Projection::Orthographic {
            left,
            right,
            bottom,
            top,
            near,
            far,
        }) = Projection::from_matrix(&original.to_matrix(), false)
        else {
            panic!("expected an orthographic projection");
        };
        assert_close(left, -2.0);
        assert_close(right, 3.0);
        assert_close(bottom, -1.0);
        assert_close(top, 2.0);
        assert_close(near, 1.0);
        assert_close(far, 10.0);
    }

    #[test]
    fn test_zoom_keeps_centre_and_enforces_minimum_extent() {
        let ortho = Projection::orthographic(0.0, 4.0, 0.0, 2.0, 1.0, 10.0);
        let Projection::Orthographic {
            left,
            right,
            bottom,
            top,
            ..
        } = ortho.zoomed(1e-9, 0.05, 1000.0)
        else {
            unreachable!()
        };
        assert_close(right - left, 0.05);
        assert_close(top - bottom, 0.05);
        assert_close((left + right) * 0.5, 2.0);
        assert_close((bottom + top) * 0.5, 1.0);
    }

    #[test]
    fn test_zoom_far_from_origin_keeps_bounds_apart() {
        let mut ortho = Projection::orthographic(1e8 - 2.0, 1e8 + 2.0, 1e8 - 2.0, 1e8 + 2.0, 1.0, 10.0);
        for _ in 0..10 {
            ortho = ortho.zoomed((-10.0f32).exp(), 0.05, 1000.0);
            let Projection::Orthographic {
                left,
                right,
                bottom,
                top,
                ..
            } = ortho
            else {
                unreachable!()
            };
            assert!(right > left, "left={} right={}", left, right);
            assert!(top > bottom, "bottom={} top={}", bottom, top);
        }
    }

    #[test]
    fn test_neighbouring_floats() {
        assert!(next_up(1e8) > 1e8);
        assert!(next_down(1e8) < 1e8);
        assert!(next_up(-1e8) > -1e8);
        assert!(next_down(0.0) < 0.0);
        assert_eq!(next_down(next_up(3.5)), 3.5);
    }

    #[test]
    fn test_zoom_ignores_perspective() {
        let perspective = Projection::default();
        assert_eq!(perspective.zoomed(0.5, 0.05, 1000.0), perspective);
    }

    #[test]
    fn test_orthographic_aspect_keeps_height() {
        let ortho = Projection::orthographic(-2.0, 2.0, -2.0, 2.0, 1.0, 10.0).with_aspect(2.0);
        assert_eq!(ortho, Projection::orthographic(-4.0, 4.0, -2.0, 2.0, 1.0, 10.0));
    }
}
