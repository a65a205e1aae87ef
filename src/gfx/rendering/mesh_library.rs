use std::ops::Range;

use wgpu::util::DeviceExt;

use crate::gfx::scene::{MeshData, MeshId, ShapeKind};

/// Mesh geometry living in GPU buffers
pub struct GpuMesh {
    pub label: String,
    vertex_buffer: wgpu::Buffer,
    index_buffer: wgpu::Buffer,
    index_count: u32,
    index_format: wgpu::IndexFormat,
}

impl GpuMesh {
    pub fn upload(device: &wgpu::Device, data: &MeshData, label: &str) -> Self {
        let vertex_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some(&format!("{} Vertex Buffer", label)),
            contents: bytemuck::cast_slice(&data.vertices),
            usage: wgpu::BufferUsages::VERTEX,
        });
        let index_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some(&format!("{} Index Buffer", label)),
            contents: data.indices.as_bytes(),
            usage: wgpu::BufferUsages::INDEX,
        });

        Self {
            label: label.to_string(),
            vertex_buffer,
            index_buffer,
            index_count: data.index_count(),
            index_format: data.indices.format(),
        }
    }

    pub fn index_count(&self) -> u32 {
        self.index_count
    }

    pub fn index_format(&self) -> wgpu::IndexFormat {
        self.index_format
    }
}

/// Mesh ids of the uploaded tangram primitives
#[derive(Debug, Clone, Copy)]
pub struct ShapeMeshes {
    pub right_triangle: MeshId,
    pub square: MeshId,
    pub parallelogram: MeshId,
}

impl ShapeMeshes {
    pub fn get(&self, shape: ShapeKind) -> MeshId {
        match shape {
            ShapeKind::RightTriangle => self.right_triangle,
            ShapeKind::Square => self.square,
            ShapeKind::Parallelogram => self.parallelogram,
        }
    }
}

/// Every mesh the scene can refer to, indexed by [`MeshId`]
#[derive(Default)]
pub struct MeshLibrary {
    meshes: Vec<GpuMesh>,
}

impl MeshLibrary {
    pub fn new() -> Self {
        Self::default()
    }

    /// Uploads one mesh per tangram primitive
    pub fn upload_shapes(&mut self, device: &wgpu::Device) -> ShapeMeshes {
        let mut upload = |shape: ShapeKind| {
            self.add(GpuMesh::upload(device, &shape.mesh_data(), &format!("{:?}", shape)))
        };
        ShapeMeshes {
            right_triangle: upload(ShapeKind::RightTriangle),
            square: upload(ShapeKind::Square),
            parallelogram: upload(ShapeKind::Parallelogram),
        }
    }

    pub fn add(&mut self, mesh: GpuMesh) -> MeshId {
        let id = MeshId::new(self.meshes.len());
        log::debug!("registered mesh '{}' as {:?}", mesh.label, id);
        self.meshes.push(mesh);
        id
    }

    pub fn get(&self, id: MeshId) -> Option<&GpuMesh> {
        self.meshes.get(id.index())
    }

    pub fn len(&self) -> usize {
        self.meshes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.meshes.is_empty()
    }
}

pub trait DrawMesh<'a> {
    fn draw_mesh(&mut self, mesh: &'a GpuMesh);
    fn draw_mesh_instanced(&mut self, mesh: &'a GpuMesh, instances: Range<u32>);
}

impl<'a, 'b> DrawMesh<'b> for wgpu::RenderPass<'a>
where
    'b: 'a,
{
    fn draw_mesh(&mut self, mesh: &'b GpuMesh) {
        self.draw_mesh_instanced(mesh, 0..1);
    }

    fn draw_mesh_instanced(&mut self, mesh: &'b GpuMesh, instances: Range<u32>) {
        self.set_vertex_buffer(0, mesh.vertex_buffer.slice(..));
        self.set_index_buffer(mesh.index_buffer.slice(..), mesh.index_format);
        self.draw_indexed(0..mesh.index_count, 0, instances);
    }
}
