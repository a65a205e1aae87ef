// src/wgpu_utils/uniform_buffer.rs - Fixed-size uniform blocks with partial updates
use std::sync::Arc;

use super::binding_types;

/// A fixed-size block of uniform memory that can be written in parts.
///
/// The camera writes its view half and its projection half independently,
/// so writes carry a byte offset into the block.
pub trait UniformBlock {
    /// Total size of the block in bytes
    fn size(&self) -> u64;

    /// Copies `bytes` into the block starting at `offset`
    fn write(&mut self, offset: u64, bytes: &[u8]);
}

/// Creates the bind group layout for a single uniform block at `binding`.
pub fn uniform_block_layout(device: &wgpu::Device, binding: u32, label: &str) -> wgpu::BindGroupLayout {
    device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
        label: Some(label),
        entries: &[wgpu::BindGroupLayoutEntry {
            binding,
            visibility: wgpu::ShaderStages::VERTEX | wgpu::ShaderStages::FRAGMENT,
            ty: binding_types::uniform(),
            count: None,
        }],
    })
}

/// GPU-resident uniform block bound at a fixed binding slot
///
/// Keeps a shadow copy of the block so unchanged ranges are not re-sent to
/// the queue. The buffer is destroyed when the block is dropped.
pub struct GpuUniformBlock {
    buffer: wgpu::Buffer,
    queue: Arc<wgpu::Queue>,
    bind_group: wgpu::BindGroup,
    binding: u32,
    previous_content: Vec<u8>,
}

impl GpuUniformBlock {
    /// Allocates a zeroed block of `size` bytes and binds it at `binding`.
    ///
    /// `layout` must have been created by [`uniform_block_layout`] for the
    /// same binding slot.
    pub fn new(
        device: &wgpu::Device,
        queue: Arc<wgpu::Queue>,
        layout: &wgpu::BindGroupLayout,
        binding: u32,
        size: u64,
        label: &str,
    ) -> Self {
        let buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some(&format!("UniformBlock: {}", label)),
            size,
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });

        let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some(&format!("UniformBlock Bind Group: {}", label)),
            layout,
            entries: &[wgpu::BindGroupEntry {
                binding,
                resource: buffer.as_entire_binding(),
            }],
        });

        log::debug!("allocated {} byte uniform block '{}' at binding {}", size, label, binding);

        GpuUniformBlock {
            buffer,
            queue,
            bind_group,
            binding,
            previous_content: vec![0; size as usize],
        }
    }

    /// Get the bind group to set before drawing
    pub fn bind_group(&self) -> &wgpu::BindGroup {
        &self.bind_group
    }

    /// Get the binding slot this block was created for
    pub fn binding(&self) -> u32 {
        self.binding
    }

    /// Get the underlying buffer
    pub fn buffer(&self) -> &wgpu::Buffer {
        &self.buffer
    }
}

impl UniformBlock for GpuUniformBlock {
    fn size(&self) -> u64 {
        self.buffer.size()
    }

    fn write(&mut self, offset: u64, bytes: &[u8]) {
        let start = offset as usize;
        let Some(previous) = self.previous_content.get_mut(start..start + bytes.len()) else {
            log::warn!(
                "ignoring {} byte write at offset {} past the end of a {} byte uniform block",
                bytes.len(),
                offset,
                self.buffer.size()
            );
            return;
        };
        if previous == bytes {
            return;
        }
        self.queue.write_buffer(&self.buffer, offset, bytes);
        previous.copy_from_slice(bytes);
    }
}

impl Drop for GpuUniformBlock {
    fn drop(&mut self) {
        self.buffer.destroy();
    }
}

/// Host-memory uniform block
///
/// Mirrors exactly what a [`GpuUniformBlock`] would receive. Used for
/// headless cameras and for checking the block layout without a device.
#[derive(Debug, Clone, PartialEq)]
pub struct HostUniformBlock {
    bytes: Vec<u8>,
    writes: usize,
}

impl HostUniformBlock {
    pub fn new(size: u64) -> Self {
        Self {
            bytes: vec![0; size as usize],
            writes: 0,
        }
    }

    /// Current content of the block
    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// Number of accepted writes since creation
    pub fn write_count(&self) -> usize {
        self.writes
    }
}

impl UniformBlock for HostUniformBlock {
    fn size(&self) -> u64 {
        self.bytes.len() as u64
    }

    fn write(&mut self, offset: u64, bytes: &[u8]) {
        let start = offset as usize;
        match self.bytes.get_mut(start..start + bytes.len()) {
            Some(target) => {
                target.copy_from_slice(bytes);
                self.writes += 1;
            }
            None => log::warn!(
                "ignoring {} byte write at offset {} past the end of a {} byte host block",
                bytes.len(),
                offset,
                self.bytes.len()
            ),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_host_block_partial_writes() {
        let mut block = HostUniformBlock::new(8);
        block.write(4, &[1, 2, 3, 4]);
        assert_eq!(block.bytes(), &[0, 0, 0, 0, 1, 2, 3, 4]);
        assert_eq!(block.write_count(), 1);
    }

    #[test]
    fn test_host_block_rejects_out_of_range() {
        let mut block = HostUniformBlock::new(4);
        block.write(2, &[9, 9, 9]);
        assert_eq!(block.bytes(), &[0, 0, 0, 0]);
        assert_eq!(block.write_count(), 0);
    }
}
