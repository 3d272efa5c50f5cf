//! Common structs and per-pixel algorithms shared by Penumbra's compute
//! kernels and its CPU reference backend.

#![allow(clippy::manual_range_contains)]

mod accumulation;
mod atrous;
mod camera;
mod moments;
mod passes;
mod ping_pong;
mod reprojection;
mod signal;
mod surface;
mod tile;
mod utils;

pub use self::accumulation::*;
pub use self::atrous::*;
pub use self::camera::*;
pub use self::moments::*;
pub use self::passes::*;
pub use self::ping_pong::*;
pub use self::reprojection::*;
pub use self::signal::*;
pub use self::surface::*;
pub use self::tile::*;
pub use self::utils::*;

/// Iteration whose output becomes next frame's history, unless configured
/// otherwise.
pub const HISTORY_COMMIT_ITERATION: u32 = 1;

/// Upper bound for the number of à-trous iterations; the step of the last one
/// is `2 ^ (MAX_ATROUS_ITERATIONS - 1)`.
pub const MAX_ATROUS_ITERATIONS: u32 = 8;
