use log::debug;

const COMMON_SHADER: &str = include_str!("shaders/common.wgsl");
const RESET_ARGS_SHADER: &str = include_str!("shaders/reset_args.wgsl");
const REPROJECTION_SHADER: &str = include_str!("shaders/reprojection.wgsl");
const COPY_TILES_SHADER: &str = include_str!("shaders/copy_tiles.wgsl");
const ATROUS_SHADER: &str = include_str!("shaders/atrous.wgsl");

/// Compiled kernels of the denoiser, shared by all of its instances.
#[derive(Debug)]
pub struct Shaders {
    pub reset_args: (wgpu::ShaderModule, &'static str),
    pub reprojection: (wgpu::ShaderModule, &'static str),
    pub copy_tiles: (wgpu::ShaderModule, &'static str),
    pub atrous: (wgpu::ShaderModule, &'static str),
}

impl Shaders {
    pub fn new(device: &wgpu::Device) -> Self {
        debug!("Compiling shaders");

        Self {
            reset_args: Self::compile(device, "reset_args", RESET_ARGS_SHADER),
            reprojection: Self::compile(
                device,
                "reprojection",
                REPROJECTION_SHADER,
            ),
            copy_tiles: Self::compile(device, "copy_tiles", COPY_TILES_SHADER),
            atrous: Self::compile(device, "atrous", ATROUS_SHADER),
        }
    }

    fn compile(
        device: &wgpu::Device,
        name: &str,
        source: &str,
    ) -> (wgpu::ShaderModule, &'static str) {
        let module =
            device.create_shader_module(wgpu::ShaderModuleDescriptor {
                label: Some(&format!("penumbra_{name}_shader")),
                source: wgpu::ShaderSource::Wgsl(
                    format!("{COMMON_SHADER}\n{source}").into(),
                ),
            });

        (module, "main")
    }
}
