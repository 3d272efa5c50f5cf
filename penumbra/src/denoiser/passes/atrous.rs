use crate::{
    gpu, BindGroupDomain, DenoiserBuffers, DenoiserComputePass,
    DenoiserInputs, FrameParity, Shaders,
};

/// Runs a single à-trous iteration over the tiles of the denoise list.
#[derive(Debug)]
pub struct AtrousPass {
    pass: DenoiserComputePass<gpu::AtrousPassParams>,
}

impl AtrousPass {
    pub fn new(
        shaders: &Shaders,
        device: &wgpu::Device,
        buffers: &DenoiserBuffers,
        inputs: &DenoiserInputs,
    ) -> Self {
        let curr = inputs.gbuffer.frames();
        let curr = curr.curr();

        let pass = DenoiserComputePass::builder("atrous")
            .bind(
                BindGroupDomain::Static,
                [
                    &buffers.camera.bind_readable(),
                    &buffers.denoise_tiles.bind_readable(),
                    &buffers.accumulated.bind_readable(),
                    &buffers.tile_args.bind_readable(),
                ],
            )
            .bind(
                BindGroupDomain::GBuffer,
                [
                    &curr.map(|frame| frame.normal).bind_readable(),
                    &curr.map(|frame| frame.depth).bind_readable(),
                    &curr.map(|frame| frame.material).bind_readable(),
                ],
            )
            .bind(
                BindGroupDomain::Spatial,
                [
                    &buffers.working.past().bind_readable(),
                    &buffers.working.curr().bind_writable(),
                ],
            )
            .build(device, &shaders.atrous);

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
            DenoiserBuffers::args_offset(gpu::TileKind::Denoise),
            params,
        );
    }
}
