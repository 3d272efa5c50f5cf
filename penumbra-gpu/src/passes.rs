use bytemuck::{Pod, Zeroable};

use crate::SignalKind;

#[repr(C)]
#[derive(Clone, Copy, Debug, Default, PartialEq, Pod, Zeroable)]
pub struct ReprojectionPassParams {
    pub blend_alpha: f32,
    pub moments_alpha: f32,
    pub consistency_epsilon: f32,
    pub normal_threshold: f32,
    pub tile_variance_threshold: f32,
    pub min_history_samples: f32,
    pub max_history: f32,
    pub flags: u32,
}

impl ReprojectionPassParams {
    /// Forces every pixel to drop its history this frame.
    pub const RESET_HISTORY: u32 = 1;

    /// Previous positions come from the G-buffer's motion vectors instead of
    /// the camera matrices.
    pub const USE_MOTION_VECTORS: u32 = 2;

    /// Signal is RGB (see: [`SignalKind::Radiance`]).
    pub const RADIANCE: u32 = 4;

    pub fn has(&self, flag: u32) -> bool {
        self.flags & flag > 0
    }

    pub fn signal(&self) -> SignalKind {
        if self.has(Self::RADIANCE) {
            SignalKind::Radiance
        } else {
            SignalKind::Visibility
        }
    }

    pub fn min_history_samples(&self) -> u32 {
        self.min_history_samples as u32
    }
}

#[repr(C)]
#[derive(Clone, Copy, Debug, Default, PartialEq, Pod, Zeroable)]
pub struct AtrousPassParams {
    pub radius: u32,

    /// Spacing between kernel taps, `2^iteration`
    pub step: u32,

    pub sigma_depth: f32,
    pub phi_value: f32,
    pub phi_normal: f32,

    /// Exponent applied to the edge-stopping weight; `1.0` when not
    /// sharpening
    pub sharpen_power: f32,

    /// Pixels rougher than this get filtered; zero disables the bypass
    pub mirror_roughness: f32,

    pub flags: u32,
}

impl AtrousPassParams {
    /// Signal is RGB (see: [`SignalKind::Radiance`]).
    pub const RADIANCE: u32 = 1;

    pub fn signal(&self) -> SignalKind {
        if self.flags & Self::RADIANCE > 0 {
            SignalKind::Radiance
        } else {
            SignalKind::Visibility
        }
    }
}
