//! CPU-side mesh data and OBJ loading.

use std::path::Path;

use super::vertex::Vertex3D;
use crate::error::{Error, Result};

/// Handle to a mesh uploaded to a `MeshLibrary`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct MeshId(usize);

impl MeshId {
    pub fn new(index: usize) -> Self {
        Self(index)
    }

    pub fn index(self) -> usize {
        self.0
    }
}

/// Index data with its element type
#[derive(Debug, Clone, PartialEq)]
pub enum Indices {
    U16(Vec<u16>),
    U32(Vec<u32>),
}

impl Indices {
    pub fn len(&self) -> usize {
        match self {
            Indices::U16(indices) => indices.len(),
            Indices::U32(indices) => indices.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn format(&self) -> wgpu::IndexFormat {
        match self {
            Indices::U16(_) => wgpu::IndexFormat::Uint16,
            Indices::U32(_) => wgpu::IndexFormat::Uint32,
        }
    }

    pub fn as_bytes(&self) -> &[u8] {
        match self {
            Indices::U16(indices) => bytemuck::cast_slice(indices),
            Indices::U32(indices) => bytemuck::cast_slice(indices),
        }
    }
}

/// Which optional attributes the source geometry provided
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct VertexAttributes {
    pub normals: bool,
    pub texcoords: bool,
}

#[derive(Debug, Clone)]
pub struct MeshData {
    pub vertices: Vec<Vertex3D>,
    pub indices: Indices,
    pub attributes: VertexAttributes,
}

impl MeshData {
    /// Loads every model in an OBJ file into one triangle mesh.
    ///
    /// Faces are triangulated and identical vertices joined. Models without
    /// normals get smooth per-vertex normals.
    pub fn load_obj(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let (models, _materials) = tobj::load_obj(
            path,
            &tobj::LoadOptions {
                triangulate: true,
                single_index: true,
                ..Default::default()
            },
        )
        .map_err(|source| Error::MeshLoad {
            path: path.to_path_buf(),
            source,
        })?;

        let mut vertices = Vec::new();
        let mut indices = Vec::new();
        let mut attributes = VertexAttributes {
            normals: true,
            texcoords: true,
        };

        for model in &models {
            let mesh = &model.mesh;
            let has_normals = !mesh.normals.is_empty() && mesh.normals.len() == mesh.positions.len();
            attributes.normals &= has_normals;
            attributes.texcoords &= !mesh.texcoords.is_empty();

            let normals = if has_normals {
                mesh.normals.clone()
            } else {
                log::debug!("model '{}' has no normals, computing smooth normals", model.name);
                smooth_normals(&mesh.positions, &mesh.indices)
            };

            let base = vertices.len() as u32;
            vertices.extend(
                mesh.positions
                    .chunks_exact(3)
                    .zip(normals.chunks_exact(3))
                    .map(|(p, n)| Vertex3D::new([p[0], p[1], p[2]], [n[0], n[1], n[2]])),
            );
            indices.extend(mesh.indices.iter().map(|i| base + i));
        }

        if vertices.is_empty() || indices.is_empty() {
            return Err(Error::EmptyMesh {
                path: path.to_path_buf(),
            });
        }

        log::info!(
            "loaded {} ({} vertices, {} triangles)",
            path.display(),
            vertices.len(),
            indices.len() / 3
        );

        Ok(Self {
            vertices,
            indices: Indices::U32(indices),
            attributes,
        })
    }

    pub fn index_count(&self) -> u32 {
        self.indices.len() as u32
    }
}

/// Area-weighted average of the face normals around each vertex.
///
/// Vertices referenced by no triangle get `+Z`.
pub fn smooth_normals(positions: &[f32], indices: &[u32]) -> Vec<f32> {
    let mut normals = vec![0.0f32; positions.len()];
    let position = |i: usize| [positions[i * 3], positions[i * 3 + 1], positions[i * 3 + 2]];

    for triangle in indices.chunks_exact(3) {
        let [i0, i1, i2] = [triangle[0] as usize, triangle[1] as usize, triangle[2] as usize];
        let (v0, v1, v2) = (position(i0), position(i1), position(i2));

        let edge1 = [v1[0] - v0[0], v1[1] - v0[1], v1[2] - v0[2]];
        let edge2 = [v2[0] - v0[0], v2[1] - v0[1], v2[2] - v0[2]];
        // Unnormalized cross product, so larger faces weigh more
        let face_normal = [
            edge1[1] * edge2[2] - edge1[2] * edge2[1],
            edge1[2] * edge2[0] - edge1[0] * edge2[2],
            edge1[0] * edge2[1] - edge1[1] * edge2[0],
        ];

        for vertex in [i0, i1, i2] {
            for axis in 0..3 {
                normals[vertex * 3 + axis] += face_normal[axis];
            }
        }
    }

    for normal in normals.chunks_exact_mut(3) {
        let length = (normal[0] * normal[0] + normal[1] * normal[1] + normal[2] * normal[2]).sqrt();
        if length > f32::EPSILON {
            normal.iter_mut().for_each(|c| *c /= length);
        } else {
            normal.copy_from_slice(&[0.0, 0.0, 1.0]);
        }
    }

    normals
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn write_temp_obj(name: &str, contents: &str) -> std::path::PathBuf {
        let path = std::env::temp_dir().join(format!("mgl-{}-{}.obj", name, std::process::id()));
        let mut file = std::fs::File::create(&path).unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        path
    }

    #[test]
    fn test_load_obj_triangulates_and_computes_normals() {
        let path = write_temp_obj(
            "quad",
            "o quad\nv 0 0 0\nv 1 0 0\nv 1 1 0\nv 0 1 0\nf 1 2 3 4\n",
        );
        let mesh = MeshData::load_obj(&path).unwrap();
        std::fs::remove_file(&path).ok();

        assert_eq!(mesh.vertices.len(), 4);
        assert_eq!(mesh.index_count(), 6);
        assert!(!mesh.attributes.normals);
        assert!(!mesh.attributes.texcoords);
        for vertex in &mesh.vertices {
            assert!((vertex.normal[2] - 1.0).abs() < 1e-5);
        }
    }

    #[test]
    fn test_load_obj_keeps_file_normals() {
        let path = write_temp_obj(
            "normals",
            "v 0 0 0\nv 1 0 0\nv 0 1 0\nvn 0 0 -1\nf 1//1 2//1 3//1\n",
        );
        let mesh = MeshData::load_obj(&path).unwrap();
        std::fs::remove_file(&path).ok();

        assert!(mesh.attributes.normals);
        assert_eq!(mesh.vertices[0].normal, [0.0, 0.0, -1.0]);
    }

    #[test]
    fn test_missing_file_is_a_load_error() {
        let result = MeshData::load_obj("/nonexistent/mgl/missing.obj");
        assert!(matches!(result, Err(Error::MeshLoad { .. })));
    }

    #[test]
    fn test_unreferenced_vertex_gets_default_normal() {
        let positions = [0.0, 0.0, 0.0, 1.0, 0.0, 0.0, 0.0, 1.0, 0.0, 5.0, 5.0, 5.0];
        let normals = smooth_normals(&positions, &[0, 1, 2]);
        assert_eq!(&normals[9..12], &[0.0, 0.0, 1.0]);
        assert!((normals[2] - 1.0).abs() < 1e-6);
    }
}
