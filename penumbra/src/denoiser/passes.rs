use log::debug;

use crate::{DenoiserBuffers, DenoiserInputs, Shaders};

macro_rules! passes {
    ([ $( $name:ident => $class:ident, )* ]) => {
        $( mod $name; )*
        $( pub use self::$name::*; )*

        #[derive(Debug)]
        pub struct DenoiserPasses {
            $( pub $name: $class, )*
        }

        impl DenoiserPasses {
            pub fn new(
                shaders: &Shaders,
                device: &wgpu::Device,
                buffers: &DenoiserBuffers,
                inputs: &DenoiserInputs,
            ) -> Self {
                debug!("Initializing denoiser passes");

                Self {
                    $( $name: $class::new(shaders, device, buffers, inputs), )*
                }
            }
        }
    };
}

passes!([
    reset_args => ResetArgsPass,
    reprojection => ReprojectionPass,
    copy_tiles => CopyTilesPass,
    atrous => AtrousPass,
]);
