use log::debug;

use crate::{compute_entry, Bindable};

/// Storage buffer that exists only in VRAM.
///
/// Used for data produced and consumed on the device within a frame (tile
/// lists, indirect-dispatch arguments); the host never writes into it.
#[derive(Debug)]
pub struct StorageBuffer {
    buffer: wgpu::Buffer,
}

impl StorageBuffer {
    pub fn new(
        device: &wgpu::Device,
        label: impl AsRef<str>,
        size: usize,
    ) -> Self {
        Self::with_usage(device, label, size, wgpu::BufferUsages::empty())
    }

    /// Creates a storage buffer that can be also used as the source of
    /// `dispatch_workgroups_indirect()`.
    pub fn new_indirect(
        device: &wgpu::Device,
        label: impl AsRef<str>,
        size: usize,
    ) -> Self {
        Self::with_usage(device, label, size, wgpu::BufferUsages::INDIRECT)
    }

    fn with_usage(
        device: &wgpu::Device,
        label: impl AsRef<str>,
        size: usize,
        usage: wgpu::BufferUsages,
    ) -> Self {
        let label = label.as_ref();
        let size = (size + 31) & !31;

        debug!("Allocating storage buffer `{label}`; size={size}");

        let buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some(label),
            usage: wgpu::BufferUsages::STORAGE
                | wgpu::BufferUsages::COPY_SRC
                | usage,
            size: size as _,
            mapped_at_creation: false,
        });

        Self { buffer }
    }

    pub fn buffer(&self) -> &wgpu::Buffer {
        &self.buffer
    }

    pub fn bind_readable(&self) -> impl Bindable + '_ {
        StorageBufferBinder {
            parent: self,
            read_only: true,
        }
    }

    pub fn bind_writable(&self) -> impl Bindable + '_ {
        StorageBufferBinder {
            parent: self,
            read_only: false,
        }
    }
}

pub struct StorageBufferBinder<'a> {
    parent: &'a StorageBuffer,
    read_only: bool,
}

impl Bindable for StorageBufferBinder<'_> {
    fn bind(
        &self,
        binding: u32,
    ) -> Vec<(wgpu::BindGroupLayoutEntry, wgpu::BindingResource)> {
        let layout = compute_entry(
            binding,
            wgpu::BindingType::Buffer {
                ty: wgpu::BufferBindingType::Storage {
                    read_only: self.read_only,
                },
                has_dynamic_offset: false,
                min_binding_size: None,
            },
        );

        vec![(layout, self.parent.buffer.as_entire_binding())]
    }
}
