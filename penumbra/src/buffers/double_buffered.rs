use glam::UVec2;

use crate::{gpu, Bindable, DoubleBufferedBindable, Texture, TextureBinder};

/// Pair of objects, one per side of a ping-pong domain.
#[derive(Clone, Copy, Debug)]
pub struct DoubleBuffered<T> {
    a: T,
    b: T,
}

impl DoubleBuffered<Texture> {
    /// Creates a double-buffered texture.
    ///
    /// See: [`Texture::new()`].
    pub fn new(
        device: &wgpu::Device,
        label: impl AsRef<str>,
        size: UVec2,
        format: wgpu::TextureFormat,
    ) -> Self {
        let label = label.as_ref();

        Self {
            a: Texture::new(device, format!("{label}_a"), size, format),
            b: Texture::new(device, format!("{label}_b"), size, format),
        }
    }
}

impl DoubleBuffered<&Texture> {
    /// See: [`Texture::bind_readable()`].
    pub fn bind_readable(&self) -> impl DoubleBufferedBindable + '_ {
        DoubleBufferedBinder {
            a: self.a.bind_readable(),
            b: self.b.bind_readable(),
        }
    }

    /// See: [`Texture::bind_writable()`].
    pub fn bind_writable(&self) -> impl DoubleBufferedBindable + '_ {
        DoubleBufferedBinder {
            a: self.a.bind_writable(),
            b: self.b.bind_writable(),
        }
    }
}

impl DoubleBuffered<&wgpu::TextureView> {
    /// Binds a pair of externally-owned views for `textureLoad()`.
    pub fn bind_readable(&self) -> impl DoubleBufferedBindable + '_ {
        DoubleBufferedBinder {
            a: TextureBinder::Readable(self.a),
            b: TextureBinder::Readable(self.b),
        }
    }
}

impl<T> DoubleBuffered<T> {
    pub fn from_pair(a: T, b: T) -> Self {
        Self { a, b }
    }

    pub fn get(&self, side: gpu::PingPong) -> &T {
        match side {
            gpu::PingPong::A => &self.a,
            gpu::PingPong::B => &self.b,
        }
    }

    pub fn get_mut(&mut self, side: gpu::PingPong) -> &mut T {
        match side {
            gpu::PingPong::A => &mut self.a,
            gpu::PingPong::B => &mut self.b,
        }
    }

    /// Returns a view where side `A` binds `a` and side `B` binds `b`.
    pub fn curr(&self) -> DoubleBuffered<&T> {
        DoubleBuffered {
            a: &self.a,
            b: &self.b,
        }
    }

    /// Returns a view where side `A` binds `b` and side `B` binds `a`.
    pub fn past(&self) -> DoubleBuffered<&T> {
        DoubleBuffered {
            a: &self.b,
            b: &self.a,
        }
    }

    pub fn map<U>(&self, f: impl Fn(&T) -> U) -> DoubleBuffered<U> {
        DoubleBuffered {
            a: f(&self.a),
            b: f(&self.b),
        }
    }
}

pub struct DoubleBufferedBinder<T> {
    a: T,
    b: T,
}

impl<T> DoubleBufferedBindable for DoubleBufferedBinder<T>
where
    T: Bindable,
{
    fn bind(
        &self,
        binding: u32,
    ) -> Vec<(wgpu::BindGroupLayoutEntry, [wgpu::BindingResource; 2])> {
        let entries_a = self.a.bind(binding);
        let entries_b = self.b.bind(binding);

        assert_eq!(entries_a.len(), entries_b.len());

        entries_a
            .into_iter()
            .zip(entries_b)
            .map(|((layout_a, resource_a), (layout_b, resource_b))| {
                assert_eq!(layout_a, layout_b);

                (layout_a, [resource_a, resource_b])
            })
            .collect()
    }
}
