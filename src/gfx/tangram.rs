//! The seven-piece tangram and its assembly animation.
//!
//! Pieces start laid out in a row on the ground plane and animate into the
//! upright figure in the XY plane.

use cgmath::{Deg, Matrix4, Vector3};

use super::scene::{MeshId, NodeId, SceneGraph, SceneNode, ShapeKind};
use super::transform::interpolate_transform;
use crate::error::Result;

/// Uniform scale applied to every piece of the figure
pub const SCALE_FACTOR: f32 = 0.4;

/// Depth between stacked pieces of the assembled figure
const LAYER_OFFSET: f32 = 0.01;
/// Spacing of the flat row along X
const ROW_SPACING: f32 = 0.9;
/// Distance of the flat row in front of the figure
const ROW_DEPTH: f32 = 1.2;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Piece {
    pub name: &'static str,
    pub shape: ShapeKind,
    pub color: [f32; 4],
    /// Position in the assembled figure
    pub offset: [f32; 2],
    /// Rotation about `+Z` in the assembled figure
    pub angle: f32,
    /// Size relative to the base shape, before [`SCALE_FACTOR`]
    pub size: f32,
}

impl Piece {
    fn rotation(&self) -> Matrix4<f32> {
        Matrix4::from_angle_z(Deg(self.angle))
    }

    fn scale(&self) -> Matrix4<f32> {
        let s = self.size * SCALE_FACTOR;
        Matrix4::from_nonuniform_scale(s, s, 1.0)
    }
}

pub const PIECES: [Piece; 7] = [
    Piece {
        name: "parallelogram",
        shape: ShapeKind::Parallelogram,
        color: [1.0, 0.3, 0.3, 1.0],
        offset: [-0.8815, 0.395],
        angle: -45.0,
        size: 1.0,
    },
    Piece {
        name: "square",
        shape: ShapeKind::Square,
        color: [0.7, 0.6, 1.0, 1.0],
        offset: [0.315, 0.2825],
        angle: 45.0,
        size: 1.0,
    },
    Piece {
        name: "medium_triangle",
        shape: ShapeKind::RightTriangle,
        color: [1.0, 1.0, 0.6, 1.0],
        offset: [0.5975, 0.2825],
        angle: 180.0,
        size: std::f32::consts::SQRT_2,
    },
    Piece {
        name: "small_triangle_left",
        shape: ShapeKind::RightTriangle,
        color: [1.0, 0.75, 0.85, 1.0],
        offset: [-0.625, -0.59],
        angle: -90.0,
        size: 1.0,
    },
    Piece {
        name: "small_triangle_right",
        shape: ShapeKind::RightTriangle,
        color: [0.85, 0.6, 0.4, 1.0],
        offset: [0.1215, -0.5935],
        angle: 0.0,
        size: 1.0,
    },
    Piece {
        name: "large_triangle_bottom",
        shape: ShapeKind::RightTriangle,
        color: [0.6, 0.7, 1.0, 1.0],
        offset: [-0.25, 0.0],
        angle: 45.0,
        size: 2.0,
    },
    Piece {
        name: "large_triangle_top",
        shape: ShapeKind::RightTriangle,
        color: [0.7, 0.9, 0.5, 1.0],
        offset: [-0.085, 0.4],
        angle: 0.0,
        size: 2.0,
    },
];

/// Local transforms of the upright figure, one per entry of [`PIECES`]
pub fn assembled_layout() -> Vec<Matrix4<f32>> {
    PIECES
        .iter()
        .enumerate()
        .map(|(i, piece)| {
            let translation = Vector3::new(piece.offset[0], piece.offset[1], i as f32 * LAYER_OFFSET);
            Matrix4::from_translation(translation) * piece.rotation() * piece.scale()
        })
        .collect()
}

/// Local transforms with the pieces lying in a row on the ground plane
pub fn flat_layout() -> Vec<Matrix4<f32>> {
    let first = -(PIECES.len() as f32 - 1.0) * 0.5 * ROW_SPACING;
    PIECES
        .iter()
        .enumerate()
        .map(|(i, piece)| {
            let translation = Vector3::new(first + i as f32 * ROW_SPACING, 0.0, ROW_DEPTH);
            Matrix4::from_translation(translation)
                * Matrix4::from_angle_x(Deg(-90.0))
                * piece.rotation()
                * piece.scale()
        })
        .collect()
}

/// Node ids of a tangram added to a [`SceneGraph`]
#[derive(Debug, Clone)]
pub struct Tangram {
    pub root: NodeId,
    pub pieces: Vec<NodeId>,
}

/// Adds a grouping root and one child per piece, in the flat layout.
///
/// `mesh_for` supplies the uploaded mesh of each primitive shape.
pub fn build_scene(graph: &mut SceneGraph, mesh_for: impl Fn(ShapeKind) -> MeshId) -> Result<Tangram> {
    let root = graph.add_node(SceneNode::group("tangram"));
    let pieces = PIECES
        .iter()
        .zip(flat_layout())
        .map(|(piece, local)| {
            graph.add_node_under(
                root,
                SceneNode::with_mesh(piece.name, mesh_for(piece.shape), piece.color).with_local_transform(local),
            )
        })
        .collect::<Result<Vec<_>>>()?;

    graph.update_world_transform(root)?;
    log::info!("built tangram scene with {} pieces", pieces.len());
    Ok(Tangram { root, pieces })
}

/// Moves the pieces between the flat and the assembled layout
#[derive(Debug, Clone)]
pub struct AssemblyAnimation {
    tangram: Tangram,
    flat: Vec<Matrix4<f32>>,
    assembled: Vec<Matrix4<f32>>,
    duration: f32,
    progress: f32,
    assembling: bool,
}

impl AssemblyAnimation {
    /// Starts flat and idle. `duration` is the seconds for a full run.
    pub fn new(tangram: Tangram, duration: f32) -> Self {
        let duration = if duration.is_finite() && duration > 0.0 {
            duration
        } else {
            log::warn!("invalid assembly duration {}, using 1s", duration);
            1.0
        };

        Self {
            tangram,
            flat: flat_layout(),
            assembled: assembled_layout(),
            duration,
            progress: 0.0,
            assembling: false,
        }
    }

    /// Reverses the direction of travel
    pub fn toggle(&mut self) {
        self.assembling = !self.assembling;
        log::debug!(
            "tangram {} from progress {:.2}",
            if self.assembling { "assembling" } else { "disassembling" },
            self.progress
        );
    }

    /// Steps the animation by `dt` seconds; returns true if progress changed
    pub fn advance(&mut self, dt: f32) -> bool {
        if !dt.is_finite() || dt <= 0.0 {
            return false;
        }
        let step = dt / self.duration;
        let target = if self.assembling {
            (self.progress + step).min(1.0)
        } else {
            (self.progress - step).max(0.0)
        };
        let changed = target != self.progress;
        self.progress = target;
        changed
    }

    /// Writes interpolated local transforms and refreshes world transforms
    pub fn apply(&self, graph: &mut SceneGraph) -> Result<()> {
        let alpha = smoothstep(self.progress);
        for ((&node, flat), assembled) in self.tangram.pieces.iter().zip(&self.flat).zip(&self.assembled) {
            graph.set_local_transform(node, interpolate_transform(flat, assembled, alpha))?;
        }
        graph.update_world_transform(self.tangram.root)
    }

    pub fn progress(&self) -> f32 {
        self.progress
    }

    pub fn is_assembling(&self) -> bool {
        self.assembling
    }

    pub fn tangram(&self) -> &Tangram {
        &self.tangram
    }
}

fn smoothstep(t: f32) -> f32 {
    t * t * (3.0 - 2.0 * t)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn mesh_for(shape: ShapeKind) -> MeshId {
        MeshId::new(ShapeKind::ALL.iter().position(|&s| s == shape).unwrap())
    }

    fn assert_matrix_close(a: Matrix4<f32>, b: Matrix4<f32>) {
        let (a, b): ([[f32; 4]; 4], [[f32; 4]; 4]) = (a.into(), b.into());
        for col in 0..4 {
            for row in 0..4 {
                assert!((a[col][row] - b[col][row]).abs() < 1e-4, "{:?} vs {:?}", a, b);
            }
        }
    }

    #[test]
    fn test_build_scene_adds_root_and_pieces() {
        let mut graph = SceneGraph::new();
        let tangram = build_scene(&mut graph, mesh_for).unwrap();

        assert_eq!(graph.len(), 8);
        assert_eq!(graph.roots(), vec![tangram.root]);
        assert_eq!(graph.node(tangram.root).unwrap().children(), tangram.pieces.as_slice());

        let square = graph.find_by_name("square").unwrap();
        assert_eq!(graph.node(square).unwrap().mesh, Some(mesh_for(ShapeKind::Square)));
        assert_eq!(graph.node(square).unwrap().color, [0.7, 0.6, 1.0, 1.0]);
    }

    #[test]
    fn test_animation_reaches_both_layouts() {
        let mut graph = SceneGraph::new();
        let tangram = build_scene(&mut graph, mesh_for).unwrap();
        let mut animation = AssemblyAnimation::new(tangram.clone(), 2.0);

        animation.toggle();
        for _ in 0..30 {
            animation.advance(0.1);
        }
        assert_eq!(animation.progress(), 1.0);
        animation.apply(&mut graph).unwrap();
        for (node, expected) in tangram.pieces.iter().zip(assembled_layout()) {
            assert_matrix_close(graph.node(*node).unwrap().local_transform(), expected);
        }

        animation.toggle();
        assert!(animation.advance(1.0));
        assert!((animation.progress() - 0.5).abs() < 1e-6);
        assert!(animation.advance(5.0));
        assert!(!animation.advance(1.0));
        animation.apply(&mut graph).unwrap();
        for (node, expected) in tangram.pieces.iter().zip(flat_layout()) {
            assert_matrix_close(graph.node(*node).unwrap().world_transform(), expected);
        }
    }

    #[test]
    fn test_idle_animation_ignores_bad_time_steps() {
        let mut graph = SceneGraph::new();
        let tangram = build_scene(&mut graph, mesh_for).unwrap();
        let mut animation = AssemblyAnimation::new(tangram, f32::NAN);
        animation.toggle();
        assert!(!animation.advance(f32::NAN));
        assert!(!animation.advance(-1.0));
        assert!(animation.advance(0.25));
        assert!((animation.progress() - 0.25).abs() < 1e-6);
    }

    #[test]
    fn test_assembled_pieces_are_layered() {
        let layout = assembled_layout();
        for pair in layout.windows(2) {
            assert!(pair[1].w.z > pair[0].w.z);
        }
    }
}
