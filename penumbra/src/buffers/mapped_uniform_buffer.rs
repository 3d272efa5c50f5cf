use std::ops::{Deref, DerefMut};
use std::{any, mem};

use bytemuck::Pod;
use log::debug;

use crate::{compute_entry, Bindable};

/// Uniform buffer that keeps a host-side copy of its contents and uploads it
/// on [`Self::flush()`] whenever it's been modified through [`DerefMut`].
#[derive(Debug)]
pub struct MappedUniformBuffer<T> {
    buffer: wgpu::Buffer,
    data: T,
    dirty: bool,
}

impl<T> MappedUniformBuffer<T>
where
    T: Pod,
{
    pub fn new(device: &wgpu::Device, label: impl AsRef<str>, data: T) -> Self {
        let label = label.as_ref();
        let size = (mem::size_of::<T>() + 31) & !31;

        debug!(
            "Allocating uniform buffer `{label}`; ty={}, size={size}",
            any::type_name::<T>(),
        );

        let buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some(label),
            usage: wgpu::BufferUsages::COPY_DST | wgpu::BufferUsages::UNIFORM,
            size: size as _,
            mapped_at_creation: false,
        });

        Self {
            buffer,
            data,
            dirty: true,
        }
    }

    pub fn flush(&mut self, queue: &wgpu::Queue) {
        if !mem::take(&mut self.dirty) {
            return;
        }

        queue.write_buffer(&self.buffer, 0, bytemuck::bytes_of(&self.data));
    }

    pub fn bind_readable(&self) -> impl Bindable + '_ {
        MappedUniformBufferBinder {
            buffer: &self.buffer,
        }
    }
}

impl<T> Deref for MappedUniformBuffer<T> {
    type Target = T;

    fn deref(&self) -> &Self::Target {
        &self.data
    }
}

impl<T> DerefMut for MappedUniformBuffer<T> {
    fn deref_mut(&mut self) -> &mut Self::Target {
        self.dirty = true;

        &mut self.data
    }
}

pub struct MappedUniformBufferBinder<'a> {
    buffer: &'a wgpu::Buffer,
}

impl Bindable for MappedUniformBufferBinder<'_> {
    fn bind(
        &self,
        binding: u32,
    ) -> Vec<(wgpu::BindGroupLayoutEntry, wgpu::BindingResource)> {
        let layout = compute_entry(
            binding,
            wgpu::BindingType::Buffer {
                ty: wgpu::BufferBindingType::Uniform,
                has_dynamic_offset: false,
                min_binding_size: None,
            },
        );

        vec![(layout, self.buffer.as_entire_binding())]
    }
}
