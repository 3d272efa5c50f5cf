use glam::UVec2;
use log::debug;

use crate::{compute_entry, Bindable};

/// Screen-sized texture owned by the denoiser.
#[derive(Debug)]
pub struct Texture {
    tex: wgpu::Texture,
    view: wgpu::TextureView,
    size: UVec2,
    format: wgpu::TextureFormat,
}

impl Texture {
    pub fn new(
        device: &wgpu::Device,
        label: impl AsRef<str>,
        size: UVec2,
        format: wgpu::TextureFormat,
    ) -> Self {
        let label = label.as_ref();

        debug!(
            "Allocating texture `{label}`; size={size:?}, format={format:?}"
        );

        assert!(size.x > 0);
        assert!(size.y > 0);

        let tex = device.create_texture(&wgpu::TextureDescriptor {
            label: Some(&format!("{label}_tex")),
            size: wgpu::Extent3d {
                width: size.x,
                height: size.y,
                depth_or_array_layers: 1,
            },
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format,
            usage: wgpu::TextureUsages::TEXTURE_BINDING
                | wgpu::TextureUsages::STORAGE_BINDING
                | wgpu::TextureUsages::COPY_SRC
                | wgpu::TextureUsages::COPY_DST,
            view_formats: &[],
        });

        let view = tex.create_view(&Default::default());

        Self {
            tex,
            view,
            size,
            format,
        }
    }

    pub fn tex(&self) -> &wgpu::Texture {
        &self.tex
    }

    pub fn view(&self) -> &wgpu::TextureView {
        &self.view
    }

    /// Records a copy of this texture into `target`; both must share the same
    /// size and format.
    pub fn copy_to(&self, encoder: &mut wgpu::CommandEncoder, target: &Self) {
        assert_eq!(self.size, target.size);
        assert_eq!(self.format, target.format);

        encoder.copy_texture_to_texture(
            self.tex.as_image_copy(),
            target.tex.as_image_copy(),
            wgpu::Extent3d {
                width: self.size.x,
                height: self.size.y,
                depth_or_array_layers: 1,
            },
        );
    }

    /// Binds this texture for `textureLoad()`.
    pub fn bind_readable(&self) -> impl Bindable + '_ {
        TextureBinder::Readable(&self.view)
    }

    /// Binds this texture as a write-only storage texture.
    pub fn bind_writable(&self) -> impl Bindable + '_ {
        TextureBinder::Writable(&self.view, self.format)
    }
}

pub enum TextureBinder<'a> {
    Readable(&'a wgpu::TextureView),
    Writable(&'a wgpu::TextureView, wgpu::TextureFormat),
}

impl Bindable for TextureBinder<'_> {
    fn bind(
        &self,
        binding: u32,
    ) -> Vec<(wgpu::BindGroupLayoutEntry, wgpu::BindingResource)> {
        match *self {
            TextureBinder::Readable(view) => {
                let layout = compute_entry(
                    binding,
                    wgpu::BindingType::Texture {
                        multisampled: false,
                        view_dimension: wgpu::TextureViewDimension::D2,
                        sample_type: wgpu::TextureSampleType::Float {
                            filterable: false,
                        },
                    },
                );

                vec![(layout, wgpu::BindingResource::TextureView(view))]
            }

            TextureBinder::Writable(view, format) => {
                let layout = compute_entry(
                    binding,
                    wgpu::BindingType::StorageTexture {
                        access: wgpu::StorageTextureAccess::WriteOnly,
                        format,
                        view_dimension: wgpu::TextureViewDimension::D2,
                    },
                );

                vec![(layout, wgpu::BindingResource::TextureView(view))]
            }
        }
    }
}
