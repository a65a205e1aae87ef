use std::f32::consts::SQRT_2;

use super::mesh::{Indices, MeshData, VertexAttributes};
use super::vertex::Vertex3D;

const FACING: [f32; 3] = [0.0, 0.0, 1.0];
const HALF_DIAGONAL: f32 = SQRT_2 / 2.0;

const RIGHT_TRIANGLE: [[f32; 3]; 3] = [[-0.5, -0.5, 0.0], [0.5, -0.5, 0.0], [-0.5, 0.5, 0.0]];
const SQUARE: [[f32; 3]; 4] = [[-0.5, -0.5, 0.0], [0.5, -0.5, 0.0], [-0.5, 0.5, 0.0], [0.5, 0.5, 0.0]];
const PARALLELOGRAM: [[f32; 3]; 4] = [
    [0.0, 0.0, 0.0],
    [SQRT_2, 0.0, 0.0],
    [-0.707, HALF_DIAGONAL, 0.0],
    [SQRT_2 - 0.707, HALF_DIAGONAL, 0.0],
];

/// The three flat primitives every tangram piece is drawn from.
///
/// All lie in the XY plane facing `+Z`; they differ only in vertex and
/// index data.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ShapeKind {
    /// Unit right triangle with the right angle at `(-0.5, -0.5)`
    RightTriangle,
    /// Unit square centred on the origin
    Square,
    /// Parallelogram with a `sqrt(2)` base and 45 degree slant
    Parallelogram,
}

impl ShapeKind {
    pub const ALL: [ShapeKind; 3] = [
        ShapeKind::RightTriangle,
        ShapeKind::Square,
        ShapeKind::Parallelogram,
    ];

    pub fn positions(self) -> &'static [[f32; 3]] {
        match self {
            ShapeKind::RightTriangle => &RIGHT_TRIANGLE,
            ShapeKind::Square => &SQUARE,
            ShapeKind::Parallelogram => &PARALLELOGRAM,
        }
    }

    pub fn indices(self) -> &'static [u16] {
        match self {
            ShapeKind::RightTriangle => &[0, 1, 2],
            ShapeKind::Square | ShapeKind::Parallelogram => &[0, 1, 2, 2, 1, 3],
        }
    }

    pub fn index_count(self) -> u32 {
        self.indices().len() as u32
    }

    pub fn mesh_data(self) -> MeshData {
        MeshData {
            vertices: self
                .positions()
                .iter()
                .map(|&position| Vertex3D::new(position, FACING))
                .collect(),
            indices: Indices::U16(self.indices().to_vec()),
            attributes: VertexAttributes {
                normals: true,
                texcoords: false,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_index_counts() {
        assert_eq!(ShapeKind::RightTriangle.index_count(), 3);
        assert_eq!(ShapeKind::Square.index_count(), 6);
        assert_eq!(ShapeKind::Parallelogram.index_count(), 6);
    }

    #[test]
    fn test_indices_reference_existing_vertices() {
        for shape in ShapeKind::ALL {
            let vertex_count = shape.positions().len() as u16;
            assert!(shape.indices().iter().all(|&i| i < vertex_count), "{:?}", shape);
            let mesh = shape.mesh_data();
            assert_eq!(mesh.indices.format(), wgpu::IndexFormat::Uint16);
            assert_eq!(mesh.index_count(), shape.index_count());
        }
    }

    #[test]
    fn test_parallelogram_opposite_sides_match() {
        let p = ShapeKind::Parallelogram.positions();
        for axis in 0..2 {
            assert!(((p[1][axis] - p[0][axis]) - (p[3][axis] - p[2][axis])).abs() < 1e-6);
        }
    }
}
