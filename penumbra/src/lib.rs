//! Adaptive temporal-spatial denoiser for real-time ray-traced signals.
//!
//! Each frame, the [`Denoiser`] blends the raw signal with reprojected
//! history, sorts the screen's 8x8 tiles into those that still need
//! filtering and those that don't, and then runs an edge-aware à-trous filter
//! over the former only - the amount of work is decided on the device,
//! through indirect dispatches.
//!
//! [`cpu::CpuDenoiser`] executes the same kernels on the host.

mod buffers;
mod camera;
mod config;
pub mod cpu;
mod denoiser;
mod gbuffer;
mod shaders;
mod utils;

pub use penumbra_gpu as gpu;

pub(crate) use self::buffers::*;
pub use self::camera::*;
pub use self::config::*;
pub use self::denoiser::*;
pub use self::gbuffer::*;
pub use self::shaders::*;
