use crate::{
    gpu, BindGroupDomain, DenoiserBuffers, DenoiserComputePass,
    DenoiserInputs, FrameParity, Shaders,
};

/// Forwards tiles from the copy list into the current à-trous destination,
/// so that every iteration's output covers the entire screen.
#[derive(Debug)]
pub struct CopyTilesPass {
    pass: DenoiserComputePass<gpu::AtrousPassParams>,
}

impl CopyTilesPass {
    pub fn new(
        shaders: &Shaders,
        device: &wgpu::Device,
        buffers: &DenoiserBuffers,
        _: &DenoiserInputs,
    ) -> Self {
        let pass = DenoiserComputePass::builder("copy_tiles")
            .bind(
                BindGroupDomain::Static,
                [
                    &buffers.camera.bind_readable(),
                    &buffers.copy_tiles.bind_readable(),
                    &buffers.accumulated.bind_readable(),
                    &buffers.tile_args.bind_readable(),
                ],
            )
            .bind(
                BindGroupDomain::Spatial,
                [
                    &buffers.working.past().bind_readable(),
                    &buffers.working.curr().bind_writable(),
                ],
            )
            .build(device, &shaders.copy_tiles);

        Self { pass }
    }

    pub fn run(
        &self,
        parity: &FrameParity,
        encoder: &mut wgpu::CommandEncoder,
        buffers: &DenoiserBuffers,
        params: gpu::AtrousPassParams,
    ) {
        self.pass.run_indirect(
            parity,
            encoder,
            buffers.tile_args.buffer(),
            DenoiserBuffers::args_offset(gpu::TileKind::Copy),
            params,
        );
    }
}
