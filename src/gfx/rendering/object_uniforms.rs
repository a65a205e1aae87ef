//! Per-node model matrix and colour, packed into one dynamic-offset uniform
//! buffer per frame.

use cgmath::Matrix4;

use crate::gfx::scene::{MeshId, NodeRenderer};
use crate::wgpu_utils::binding_types;

#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct ObjectUniform {
    pub model: [[f32; 4]; 4],
    pub color: [f32; 4],
}

impl ObjectUniform {
    pub const SIZE: u64 = std::mem::size_of::<ObjectUniform>() as u64;

    pub fn new(model: &Matrix4<f32>, color: [f32; 4]) -> Self {
        Self {
            model: (*model).into(),
            color,
        }
    }
}

/// Collects the draws of a scene graph walk
#[derive(Debug, Default)]
pub struct DrawList {
    pub meshes: Vec<MeshId>,
    pub uniforms: Vec<ObjectUniform>,
}

impl DrawList {
    pub fn clear(&mut self) {
        self.meshes.clear();
        self.uniforms.clear();
    }

    pub fn len(&self) -> usize {
        self.meshes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.meshes.is_empty()
    }
}

impl NodeRenderer for DrawList {
    fn draw_node(&mut self, mesh: MeshId, world_transform: &Matrix4<f32>, color: [f32; 4]) {
        self.meshes.push(mesh);
        self.uniforms.push(ObjectUniform::new(world_transform, color));
    }
}

/// Rounds `size` up to a multiple of `alignment`
pub fn aligned_stride(size: u64, alignment: u64) -> u64 {
    let alignment = alignment.max(1);
    size.div_ceil(alignment) * alignment
}

/// Dynamic-offset uniform buffer holding one [`ObjectUniform`] per draw
pub struct ObjectUniformBuffer {
    layout: wgpu::BindGroupLayout,
    buffer: wgpu::Buffer,
    bind_group: wgpu::BindGroup,
    stride: u64,
    capacity: usize,
    staging: Vec<u8>,
}

impl ObjectUniformBuffer {
    const INITIAL_CAPACITY: usize = 16;

    pub fn new(device: &wgpu::Device) -> Self {
        let layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("Object Uniform Layout"),
            entries: &[wgpu::BindGroupLayoutEntry {
                binding: 0,
                visibility: wgpu::ShaderStages::VERTEX | wgpu::ShaderStages::FRAGMENT,
                ty: binding_types::dynamic_uniform(ObjectUniform::SIZE),
                count: None,
            }],
        });
        let stride = aligned_stride(
            ObjectUniform::SIZE,
            device.limits().min_uniform_buffer_offset_alignment as u64,
        );
        let (buffer, bind_group) = Self::allocate(device, &layout, stride, Self::INITIAL_CAPACITY);

        Self {
            layout,
            buffer,
            bind_group,
            stride,
            capacity: Self::INITIAL_CAPACITY,
            staging: Vec::new(),
        }
    }

    fn allocate(
        device: &wgpu::Device,
        layout: &wgpu::BindGroupLayout,
        stride: u64,
        capacity: usize,
    ) -> (wgpu::Buffer, wgpu::BindGroup) {
        let buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("Object Uniform Buffer"),
            size: stride * capacity as u64,
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });
        let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("Object Uniform Bind Group"),
            layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: wgpu::BindingResource::Buffer(wgpu::BufferBinding {
                    buffer: &buffer,
                    offset: 0,
                    size: wgpu::BufferSize::new(ObjectUniform::SIZE),
                }),
            }],
        });
        (buffer, bind_group)
    }

    /// Uploads `uniforms`, growing the buffer if needed
    pub fn write(&mut self, device: &wgpu::Device, queue: &wgpu::Queue, uniforms: &[ObjectUniform]) {
        if uniforms.is_empty() {
            return;
        }
        if uniforms.len() > self.capacity {
            let capacity = uniforms.len().next_power_of_two();
            log::debug!("growing object uniform buffer to {} entries", capacity);
            self.buffer.destroy();
            let (buffer, bind_group) = Self::allocate(device, &self.layout, self.stride, capacity);
            self.buffer = buffer;
            self.bind_group = bind_group;
            self.capacity = capacity;
        }

        self.staging.clear();
        self.staging.resize(self.stride as usize * uniforms.len(), 0);
        for (chunk, uniform) in self.staging.chunks_exact_mut(self.stride as usize).zip(uniforms) {
            chunk[..ObjectUniform::SIZE as usize].copy_from_slice(bytemuck::bytes_of(uniform));
        }
        queue.write_buffer(&self.buffer, 0, &self.staging);
    }

    /// Dynamic offset of the `index`th uniform
    pub fn offset(&self, index: usize) -> wgpu::DynamicOffset {
        (self.stride * index as u64) as wgpu::DynamicOffset
    }

    pub fn layout(&self) -> &wgpu::BindGroupLayout {
        &self.layout
    }

    pub fn bind_group(&self) -> &wgpu::BindGroup {
        &self.bind_group
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gfx::scene::{SceneGraph, SceneNode};
    use cgmath::Vector3;

    #[test]
    fn test_uniform_size_and_stride() {
        assert_eq!(ObjectUniform::SIZE, 80);
        assert_eq!(aligned_stride(80, 256), 256);
        assert_eq!(aligned_stride(80, 16), 80);
        assert_eq!(aligned_stride(80, 0), 80);
        assert_eq!(aligned_stride(300, 256), 512);
    }

    #[test]
    fn test_draw_list_collects_scene_walk() {
        let mut graph = SceneGraph::new();
        let root = graph.add_node(
            SceneNode::group("root").with_local_transform(Matrix4::from_translation(Vector3::new(0.0, 1.0, 0.0))),
        );
        graph
            .add_node_under(root, SceneNode::with_mesh("piece", MeshId::new(3), [0.5, 0.5, 0.5, 1.0]))
            .unwrap();
        graph.update_all();

        let mut draws = DrawList::default();
        graph.draw_all(&mut draws);
        assert_eq!(draws.meshes, vec![MeshId::new(3)]);
        assert_eq!(draws.uniforms[0].model[3], [0.0, 1.0, 0.0, 1.0]);
        assert_eq!(draws.uniforms[0].color, [0.5, 0.5, 0.5, 1.0]);

        draws.clear();
        assert!(draws.is_empty());
    }
}
