//! Host-side execution of the denoiser's kernels.

mod denoiser;
mod gbuffer;
mod image;
mod tile_list;

pub use self::denoiser::*;
pub use self::gbuffer::*;
pub use self::image::*;
pub use self::tile_list::*;
