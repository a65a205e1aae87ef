//! Translation / rotation / scale decomposition and interpolation of affine
//! transforms.

use cgmath::{InnerSpace, Matrix3, Matrix4, Quaternion, SquareMatrix, Vector3, VectorSpace};

/// An affine transform split into translation, rotation and scale
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Trs {
    pub translation: Vector3<f32>,
    pub rotation: Quaternion<f32>,
    pub scale: Vector3<f32>,
}

impl Trs {
    pub fn new(translation: Vector3<f32>, rotation: Quaternion<f32>, scale: Vector3<f32>) -> Self {
        Self {
            translation,
            rotation,
            scale,
        }
    }

    /// Splits an affine matrix with no shear.
    ///
    /// A mirroring transform (negative determinant) comes back with a
    /// negative X scale.
    pub fn decompose(m: &Matrix4<f32>) -> Self {
        let translation = m.w.truncate();
        let (x, y, z) = (m.x.truncate(), m.y.truncate(), m.z.truncate());
        let mut scale = Vector3::new(x.magnitude(), y.magnitude(), z.magnitude());

        let linear = Matrix3::from_cols(x, y, z);
        if linear.determinant() < 0.0 {
            scale.x = -scale.x;
        }

        let rotation = if scale.x.abs() > f32::EPSILON
            && scale.y.abs() > f32::EPSILON
            && scale.z.abs() > f32::EPSILON
        {
            Quaternion::from(Matrix3::from_cols(x / scale.x, y / scale.y, z / scale.z)).normalize()
        } else {
            Quaternion::new(1.0, 0.0, 0.0, 0.0)
        };

        Self {
            translation,
            rotation,
            scale,
        }
    }

    /// Recomposes as `T * R * S`
    pub fn to_matrix(&self) -> Matrix4<f32> {
        Matrix4::from_translation(self.translation)
            * Matrix4::from(self.rotation)
            * Matrix4::from_nonuniform_scale(self.scale.x, self.scale.y, self.scale.z)
    }

    /// Linear translation and scale, spherical rotation along the shorter arc.
    pub fn interpolate(&self, other: &Trs, alpha: f32) -> Trs {
        let alpha = if alpha.is_nan() { 0.0 } else { alpha.clamp(0.0, 1.0) };
        let target = if self.rotation.dot(other.rotation) < 0.0 {
            -other.rotation
        } else {
            other.rotation
        };

        Trs {
            translation: self.translation.lerp(other.translation, alpha),
            rotation: self.rotation.slerp(target, alpha).normalize(),
            scale: self.scale.lerp(other.scale, alpha),
        }
    }
}

/// Blends two affine transforms; `alpha` is clamped to `[0, 1]`.
pub fn interpolate_transform(a: &Matrix4<f32>, b: &Matrix4<f32>, alpha: f32) -> Matrix4<f32> {
    Trs::decompose(a).interpolate(&Trs::decompose(b), alpha).to_matrix()
}

#[cfg(test)]
mod tests {
    use super::*;
    use cgmath::{Deg, Matrix, Rad, Rotation3, Vector4};
    use rand::Rng;

    fn assert_matrix_close(a: Matrix4<f32>, b: Matrix4<f32>) {
        let (a, b): ([[f32; 4]; 4], [[f32; 4]; 4]) = (a.into(), b.into());
        for col in 0..4 {
            for row in 0..4 {
                assert!((a[col][row] - b[col][row]).abs() < 1e-4, "{:?} vs {:?}", a, b);
            }
        }
    }

    fn sample() -> (Matrix4<f32>, Matrix4<f32>) {
        let a = Matrix4::from_translation(Vector3::new(1.0, 2.0, 3.0))
            * Matrix4::from_angle_z(Deg(30.0))
            * Matrix4::from_nonuniform_scale(1.0, 2.0, 0.5);
        let b = Matrix4::from_translation(Vector3::new(-4.0, 0.0, 1.0))
            * Matrix4::from_axis_angle(Vector3::new(1.0, 1.0, 0.0).normalize(), Deg(120.0))
            * Matrix4::from_scale(3.0);
        (a, b)
    }

    #[test]
    fn test_endpoints_reproduce_inputs() {
        let (a, b) = sample();
        assert_matrix_close(interpolate_transform(&a, &b, 0.0), a);
        assert_matrix_close(interpolate_transform(&a, &b, 1.0), b);
    }

    #[test]
    fn test_alpha_is_clamped() {
        let (a, b) = sample();
        assert_matrix_close(interpolate_transform(&a, &b, -2.0), a);
        assert_matrix_close(interpolate_transform(&a, &b, 7.5), b);
    }

    fn assert_translation_monotonic(a: Matrix4<f32>, b: Matrix4<f32>) {
        let direction = b.w.truncate() - a.w.truncate();
        let mut last = a.w.truncate();
        for step in 1..=20 {
            let current = interpolate_transform(&a, &b, step as f32 / 20.0).w.truncate();
            for axis in 0..3 {
                let moved = (current[axis] - last[axis]) * direction[axis].signum();
                assert!(moved >= -1e-5, "axis {} went backwards at step {}", axis, step);
            }
            last = current;
        }
    }

    #[test]
    fn test_translation_moves_monotonically() {
        let (a, b) = sample();
        assert_translation_monotonic(a, b);
    }

    #[test]
    fn test_axis_aligned_translation_moves_monotonically() {
        let a = Matrix4::from_translation(Vector3::new(-3.0, 0.5, 2.0)) * Matrix4::from_nonuniform_scale(1.0, 2.0, 1.0);
        let b = Matrix4::from_translation(Vector3::new(4.0, -1.5, 2.0)) * Matrix4::from_scale(0.5);
        assert_translation_monotonic(a, b);
        assert_translation_monotonic(b, a);

        let halfway = interpolate_transform(&a, &b, 0.5);
        assert_matrix_close(
            halfway,
            Matrix4::from_translation(Vector3::new(0.5, -0.5, 2.0)) * Matrix4::from_nonuniform_scale(0.75, 1.25, 0.75),
        );
    }

    #[test]
    fn test_mirrored_transform_round_trips() {
        let m = Matrix4::from_translation(Vector3::new(0.5, 0.0, 0.0))
            * Matrix4::from_angle_y(Deg(45.0))
            * Matrix4::from_nonuniform_scale(-2.0, 1.0, 1.0);
        let trs = Trs::decompose(&m);
        assert!(trs.scale.x < 0.0);
        assert_matrix_close(trs.to_matrix(), m);
    }

    #[test]
    fn test_random_rotations_decompose() {
        let mut rng = rand::rng();
        for _ in 0..50 {
            let axis = Vector3::new(
                rng.random_range(-1.0..1.0),
                rng.random_range(-1.0..1.0),
                rng.random_range(0.1..1.0),
            )
            .normalize();
            let rotation = Quaternion::from_axis_angle(axis, Rad(rng.random_range(-3.0..3.0)));
            let m = Trs::new(Vector3::new(1.0, -1.0, 2.0), rotation, Vector3::new(0.5, 1.5, 2.5)).to_matrix();
            assert_matrix_close(Trs::decompose(&m).to_matrix(), m);
            assert_eq!(m.row(3), Vector4::unit_w());
        }
    }
}
