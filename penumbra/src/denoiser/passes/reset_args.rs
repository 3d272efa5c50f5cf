use glam::uvec2;

use crate::{
    BindGroupDomain, DenoiserBuffers, DenoiserComputePass, DenoiserInputs,
    FrameParity, Shaders,
};

/// Empties both tile lists by zeroing their dispatch arguments.
#[derive(Debug)]
pub struct ResetArgsPass {
    pass: DenoiserComputePass<()>,
}

impl ResetArgsPass {
    pub fn new(
        shaders: &Shaders,
        device: &wgpu::Device,
        buffers: &DenoiserBuffers,
        _: &DenoiserInputs,
    ) -> Self {
        let pass = DenoiserComputePass::builder("reset_args")
            .bind(
                BindGroupDomain::Static,
                [&buffers.tile_args.bind_writable()],
            )
            .build(device, &shaders.reset_args);

        Self { pass }
    }

    pub fn run(
        &self,
        parity: &FrameParity,
        encoder: &mut wgpu::CommandEncoder,
    ) {
        self.pass.run(parity, encoder, uvec2(1, 1), ());
    }
}
