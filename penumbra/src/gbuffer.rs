use crate::{gpu, DoubleBuffered};

/// One frame's worth of the G-buffer, owned by the renderer.
///
/// Expected contents (all textures must be readable through `textureLoad()`,
/// i.e. created with `TEXTURE_BINDING`):
///
/// - `normal` - world-space normal in `xyz`,
/// - `depth` - linear depth (distance from the camera) in `x`, zero for sky,
/// - `material` - roughness in `x`, metalness in `y`,
/// - `motion` - screen-space motion in UV units in `xy`.
#[derive(Clone, Copy, Debug)]
pub struct GBufferFrame<'a> {
    pub normal: &'a wgpu::TextureView,
    pub depth: &'a wgpu::TextureView,
    pub material: &'a wgpu::TextureView,
    pub motion: &'a wgpu::TextureView,
}

/// Double-buffered G-buffer; which frame is the current one is decided by the
/// parity passed to [`crate::Denoiser::render()`].
#[derive(Clone, Copy, Debug)]
pub struct GBuffer<'a> {
    pub frames: [GBufferFrame<'a>; 2],
}

impl<'a> GBuffer<'a> {
    pub fn new(frames: [GBufferFrame<'a>; 2]) -> Self {
        Self { frames }
    }

    pub fn frame(&self, parity: gpu::PingPong) -> &GBufferFrame<'a> {
        &self.frames[parity.index()]
    }

    pub(crate) fn frames(&self) -> DoubleBuffered<GBufferFrame<'a>> {
        let [a, b] = self.frames;

        DoubleBuffered::from_pair(a, b)
    }
}

/// Externally-owned textures the denoiser reads from every frame.
#[derive(Clone, Copy, Debug)]
pub struct DenoiserInputs<'a> {
    pub gbuffer: GBuffer<'a>,

    /// Raw, noisy signal produced by the ray-tracing stage
    pub signal: &'a wgpu::TextureView,
}
