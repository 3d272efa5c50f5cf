use glam::UVec2;

use crate::{
    gpu, BindGroupDomain, DenoiserBuffers, DenoiserComputePass,
    DenoiserInputs, FrameParity, Shaders, TextureBinder,
};

/// Accumulates the raw signal with reprojected history and sorts tiles into
/// the denoise and copy lists.
#[derive(Debug)]
pub struct ReprojectionPass {
    pass: DenoiserComputePass<gpu::ReprojectionPassParams>,
}

impl ReprojectionPass {
    pub fn new(
        shaders: &Shaders,
        device: &wgpu::Device,
        buffers: &DenoiserBuffers,
        inputs: &DenoiserInputs,
    ) -> Self {
        let frames = inputs.gbuffer.frames();
        let curr = frames.curr();
        let prev = frames.past();

        let pass = DenoiserComputePass::builder("reprojection")
            .bind(
                BindGroupDomain::Static,
                [
                    &buffers.camera.bind_readable(),
                    &TextureBinder::Readable(inputs.signal),
                    &buffers.history.bind_readable(),
                    &buffers.accumulated.bind_writable(),
                    &buffers.denoise_tiles.bind_writable(),
                    &buffers.copy_tiles.bind_writable(),
                    &buffers.tile_args.bind_writable(),
                ],
            )
            .bind(
                BindGroupDomain::GBuffer,
                [
                    &curr.map(|frame| frame.normal).bind_readable(),
                    &curr.map(|frame| frame.depth).bind_readable(),
                    &curr.map(|frame| frame.material).bind_readable(),
                    &curr.map(|frame| frame.motion).bind_readable(),
                    &prev.map(|frame| frame.normal).bind_readable(),
                    &prev.map(|frame| frame.depth).bind_readable(),
                ],
            )
            .bind(
                BindGroupDomain::Temporal,
                [
                    &buffers.moments.curr().bind_writable(),
                    &buffers.moments.past().bind_readable(),
                ],
            )
            .build(device, &shaders.reprojection);

        Self { pass }
    }

    pub fn run(
        &self,
        parity: &FrameParity,
        encoder: &mut wgpu::CommandEncoder,
        screen_size: UVec2,
        params: gpu::ReprojectionPassParams,
    ) {
        // One workgroup per tile
        let size = gpu::tile_grid(screen_size);

        self.pass.run(parity, encoder, size, params);
    }
}
