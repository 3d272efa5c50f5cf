mod buffers;
mod pass;
mod passes;

use std::mem;

use log::{debug, info, trace};

pub(crate) use self::buffers::*;
pub(crate) use self::pass::*;
pub(crate) use self::passes::*;
use crate::{
    gpu, Camera, ConfigError, DenoiserConfig, DenoiserInputs, FrameParity,
    Shaders, Texture,
};

/// Denoiser of a single signal (e.g. shadows or reflections) as seen through
/// a single camera.
///
/// Each frame goes like this:
///
/// - [`Self::update()`] - provide this frame's camera,
/// - [`Self::flush()`] - upload pending changes into the device,
/// - [`Self::render()`] - record the passes,
/// - [`Self::output()`] - read the denoised signal.
#[derive(Debug)]
pub struct Denoiser {
    config: DenoiserConfig,
    camera: Camera,
    buffers: DenoiserBuffers,
    passes: DenoiserPasses,
    temporal: gpu::TemporalPingPong,
    pending_reset: bool,
    resetting: bool,
    frame: u32,
}

impl Denoiser {
    /// Device features the denoiser's kernels rely on.
    pub fn required_features() -> wgpu::Features {
        wgpu::Features::PUSH_CONSTANTS
    }

    /// Device limits the denoiser's kernels rely on.
    pub fn required_limits() -> wgpu::Limits {
        let params_size = mem::size_of::<gpu::ReprojectionPassParams>()
            .max(mem::size_of::<gpu::AtrousPassParams>());

        wgpu::Limits {
            max_push_constant_size: params_size as u32,
            ..Default::default()
        }
    }

    pub fn new(
        shaders: &Shaders,
        device: &wgpu::Device,
        config: DenoiserConfig,
        camera: Camera,
        inputs: &DenoiserInputs,
    ) -> Result<Self, ConfigError> {
        config.validate()?;

        info!(
            "Creating denoiser: {}, signal={:?}",
            camera.describe(),
            config.signal,
        );

        let buffers = DenoiserBuffers::new(device, &camera, &camera);
        let passes = DenoiserPasses::new(shaders, device, &buffers, inputs);

        debug!("Denoiser created");

        Ok(Self {
            config,
            camera,
            buffers,
            passes,
            temporal: Default::default(),
            pending_reset: true,
            resetting: false,
            frame: 0,
        })
    }

    pub fn config(&self) -> &DenoiserConfig {
        &self.config
    }

    /// Replaces the configuration; takes effect starting from the next
    /// rendered frame.
    pub fn set_config(
        &mut self,
        config: DenoiserConfig,
    ) -> Result<(), ConfigError> {
        config.validate()?;

        debug!("Updating denoiser config: {config:?}");

        if config.signal != self.config.signal {
            self.reset_history();
        }

        self.config = config;

        Ok(())
    }

    pub fn camera(&self) -> &Camera {
        &self.camera
    }

    /// Provides the camera this frame is rendered through; expected to be
    /// called once per frame.
    ///
    /// # Panics
    ///
    /// Panics if the viewport's size changed - use [`Self::resize()`] then.
    pub fn update(&mut self, camera: Camera) {
        assert!(
            !self.camera.is_invalidated_by(&camera),
            "viewport changed from {} to {}; the denoiser has to be resized",
            self.camera.describe(),
            camera.describe(),
        );

        *self.buffers.camera = camera.serialize(&self.camera);
        self.camera = camera;
    }

    /// Reallocates all screen-sized buffers for given camera; history is
    /// lost.
    pub fn resize(
        &mut self,
        shaders: &Shaders,
        device: &wgpu::Device,
        camera: Camera,
        inputs: &DenoiserInputs,
    ) {
        debug!(
            "Resizing denoiser: {} -> {}",
            self.camera.describe(),
            camera.describe(),
        );

        self.camera = camera;
        self.buffers = DenoiserBuffers::new(device, &camera, &camera);

        self.passes =
            DenoiserPasses::new(shaders, device, &self.buffers, inputs);

        self.temporal = Default::default();
        self.reset_history();
    }

    /// Drops the accumulated history; the next rendered frame starts from
    /// the raw signal.
    pub fn reset_history(&mut self) {
        debug!("Resetting history");

        self.pending_reset = true;
    }

    pub fn flush(&mut self, queue: &wgpu::Queue) {
        self.frame += 1;
        self.temporal = self.temporal.next();
        self.resetting = mem::take(&mut self.pending_reset);
        self.buffers.camera.flush(queue);
    }

    /// Records this frame's passes.
    ///
    /// `gbuffer_parity` says which of [`crate::GBuffer::frames`] holds the
    /// current frame.
    pub fn render(
        &self,
        encoder: &mut wgpu::CommandEncoder,
        gbuffer_parity: gpu::PingPong,
    ) {
        trace!(
            "Rendering frame {}; gbuffer={:?}, temporal={:?}, reset={}",
            self.frame,
            gbuffer_parity,
            self.temporal,
            self.resetting,
        );

        let mut parity = FrameParity {
            gbuffer: gbuffer_parity,
            temporal: self.temporal,
            spatial: Default::default(),
        };

        self.passes.reset_args.run(&parity, encoder);

        self.passes.reprojection.run(
            &parity,
            encoder,
            self.camera.size,
            self.config.reprojection_params(self.resetting),
        );

        if self.config.filters() {
            for iteration in 0..self.config.atrous_iterations {
                let params = self.config.atrous_params(iteration);

                self.passes
                    .copy_tiles
                    .run(&parity, encoder, &self.buffers, params);

                self.passes
                    .atrous
                    .run(&parity, encoder, &self.buffers, params);

                if self.config.commits_at(iteration) {
                    self.buffers
                        .working
                        .get(parity.spatial.dst())
                        .copy_to(encoder, &self.buffers.history);
                }

                parity.spatial = parity.spatial.next();
            }
        }

        if self.config.commits_output() {
            self.output_texture().copy_to(encoder, &self.buffers.history);
        }
    }

    /// Denoised signal of the most recently rendered frame; value in `rgb`,
    /// variance in `a`.
    pub fn output(&self) -> &wgpu::TextureView {
        self.output_texture().view()
    }

    /// Texture behind [`Self::output()`], e.g. for copying the signal out.
    pub fn output_tex(&self) -> &wgpu::Texture {
        self.output_texture().tex()
    }

    /// Signal the next frame is going to reproject from.
    pub fn history(&self) -> &wgpu::TextureView {
        self.buffers.history.view()
    }

    /// Buffer holding `[gpu::TileArgs; 2]` of the most recently rendered
    /// frame, indexed by [`gpu::TileKind::index()`]; useful for inspection.
    pub fn tile_args(&self) -> &wgpu::Buffer {
        self.buffers.tile_args.buffer()
    }

    fn output_texture(&self) -> &Texture {
        if !self.config.filters() {
            return &self.buffers.accumulated;
        }

        // Iteration `i` writes into side A when `i` is even
        let last = self.config.atrous_iterations - 1;

        let side = if last % 2 == 0 {
            gpu::PingPong::A
        } else {
            gpu::PingPong::B
        };

        self.buffers.working.get(side)
    }
}

impl Drop for Denoiser {
    fn drop(&mut self) {
        info!("Deleting denoiser: {}", self.camera.describe());
    }
}
