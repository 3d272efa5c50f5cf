use thiserror::Error;

use crate::gpu;
pub use crate::gpu::{
    SignalKind, HISTORY_COMMIT_ITERATION, MAX_ATROUS_ITERATIONS,
};

/// Per-signal tunables of the denoiser.
#[derive(Clone, Debug, PartialEq)]
pub struct DenoiserConfig {
    pub signal: SignalKind,

    /// When disabled, the spatial filter is skipped and the accumulated
    /// signal becomes the output.
    pub enabled: bool,

    /// Minimum weight of the raw sample when blending it with history.
    pub blend_alpha: f32,

    /// Minimum weight of the raw sample when blending temporal moments.
    pub moments_alpha: f32,

    /// Maximum difference (in world units) between a pixel's expected and
    /// stored previous depth for its history to be reused.
    pub consistency_epsilon: f32,

    /// Minimum dot product between current and previous normal for history
    /// to be reused.
    pub normal_threshold: f32,

    /// History length is clamped to this many frames.
    pub max_history_length: u32,

    /// Tiles whose maximum variance exceeds this get spatially filtered.
    pub tile_variance_threshold: f32,

    /// Tiles containing pixels with shorter history get spatially filtered.
    pub min_history_samples: u32,

    pub atrous_radius: u32,
    pub atrous_iterations: u32,
    pub sigma_depth: f32,
    pub phi_value: f32,
    pub phi_normal: f32,

    /// Exponent applied to the edge-stopping weights during the last
    /// iteration; visibility signals only.
    pub sharpen_power: Option<f32>,

    /// Pixels smoother than this keep their accumulated value; radiance
    /// signals only.
    pub mirror_roughness: Option<f32>,

    /// Iteration whose output becomes next frame's history.
    pub history_commit_iteration: u32,

    /// Reproject through the G-buffer's motion vectors instead of the camera
    /// matrices.
    pub use_motion_vectors: bool,
}

impl DenoiserConfig {
    /// Preset for shadow visibility.
    pub fn shadow() -> Self {
        Self {
            signal: SignalKind::Visibility,
            enabled: true,
            blend_alpha: 0.05,
            moments_alpha: 0.2,
            consistency_epsilon: 0.1,
            normal_threshold: 0.9,
            max_history_length: 32,
            tile_variance_threshold: 0.05,
            min_history_samples: 4,
            atrous_radius: 1,
            atrous_iterations: 4,
            sigma_depth: 1.0,
            phi_value: 10.0,
            phi_normal: 32.0,
            sharpen_power: Some(1.2),
            mirror_roughness: None,
            history_commit_iteration: HISTORY_COMMIT_ITERATION,
            use_motion_vectors: false,
        }
    }

    /// Preset for specular reflections.
    pub fn reflection() -> Self {
        Self {
            signal: SignalKind::Radiance,
            sharpen_power: None,
            mirror_roughness: Some(0.05),
            ..Self::shadow()
        }
    }

    #[allow(clippy::neg_cmp_op_on_partial_ord)]
    pub fn validate(&self) -> Result<(), ConfigError> {
        for (name, value) in [
            ("blend_alpha", self.blend_alpha),
            ("moments_alpha", self.moments_alpha),
        ] {
            if !(value > 0.0 && value <= 1.0) {
                return Err(ConfigError::AlphaOutOfRange { name, value });
            }
        }

        for (name, value) in [
            ("consistency_epsilon", self.consistency_epsilon),
            ("sigma_depth", self.sigma_depth),
            ("phi_value", self.phi_value),
            ("phi_normal", self.phi_normal),
        ] {
            if !(value > 0.0) {
                return Err(ConfigError::NotPositive { name, value });
            }
        }

        if !(-1.0..=1.0).contains(&self.normal_threshold) {
            return Err(ConfigError::NormalThresholdOutOfRange(
                self.normal_threshold,
            ));
        }

        if self.max_history_length == 0 {
            return Err(ConfigError::ZeroHistory);
        }

        if self.atrous_radius == 0 {
            return Err(ConfigError::ZeroRadius);
        }

        if self.atrous_iterations > MAX_ATROUS_ITERATIONS {
            return Err(ConfigError::TooManyIterations {
                got: self.atrous_iterations,
                max: MAX_ATROUS_ITERATIONS,
            });
        }

        match (self.signal, self.sharpen_power, self.mirror_roughness) {
            (SignalKind::Radiance, Some(_), _) => {
                Err(ConfigError::SharpenOnRadiance)
            }
            (SignalKind::Visibility, _, Some(_)) => {
                Err(ConfigError::MirrorOnVisibility)
            }
            (_, Some(power), _) if !(power > 0.0) => {
                Err(ConfigError::NotPositive {
                    name: "sharpen_power",
                    value: power,
                })
            }
            _ => Ok(()),
        }
    }

    /// Whether the spatial filter runs at all.
    pub fn filters(&self) -> bool {
        self.enabled && self.atrous_iterations > 0
    }

    /// Whether history gets committed right after given iteration; when the
    /// commit iteration is never reached, the final output is committed
    /// instead (see: [`Self::commits_output()`]).
    pub fn commits_at(&self, iteration: u32) -> bool {
        self.filters() && iteration == self.history_commit_iteration
    }

    pub fn commits_output(&self) -> bool {
        !self.filters()
            || self.history_commit_iteration >= self.atrous_iterations
    }

    pub fn reprojection_params(
        &self,
        reset_history: bool,
    ) -> gpu::ReprojectionPassParams {
        let mut flags = 0;

        if reset_history {
            flags |= gpu::ReprojectionPassParams::RESET_HISTORY;
        }

        if self.use_motion_vectors {
            flags |= gpu::ReprojectionPassParams::USE_MOTION_VECTORS;
        }

        if self.signal.is_radiance() {
            flags |= gpu::ReprojectionPassParams::RADIANCE;
        }

        gpu::ReprojectionPassParams {
            blend_alpha: self.blend_alpha,
            moments_alpha: self.moments_alpha,
            consistency_epsilon: self.consistency_epsilon,
            normal_threshold: self.normal_threshold,
            tile_variance_threshold: self.tile_variance_threshold,
            min_history_samples: self.min_history_samples as f32,
            max_history: self.max_history_length as f32,
            flags,
        }
    }

    pub fn atrous_params(&self, iteration: u32) -> gpu::AtrousPassParams {
        let is_last = iteration + 1 == self.atrous_iterations;

        let sharpen_power = match self.sharpen_power {
            Some(power) if is_last => power,
            _ => 1.0,
        };

        let flags = if self.signal.is_radiance() {
            gpu::AtrousPassParams::RADIANCE
        } else {
            0
        };

        gpu::AtrousPassParams {
            radius: self.atrous_radius,
            step: 1 << iteration,
            sigma_depth: self.sigma_depth,
            phi_value: self.phi_value,
            phi_normal: self.phi_normal,
            sharpen_power,
            mirror_roughness: self.mirror_roughness.unwrap_or(0.0),
            flags,
        }
    }
}

impl Default for DenoiserConfig {
    fn default() -> Self {
        Self::shadow()
    }
}

#[derive(Clone, Debug, PartialEq, Error)]
pub enum ConfigError {
    /// Blending factor outside of `(0, 1]`
    #[error("`{name}` must be within (0, 1], got {value}")]
    AlphaOutOfRange { name: &'static str, value: f32 },

    /// Parameter that has to be strictly positive
    #[error("`{name}` must be positive, got {value}")]
    NotPositive { name: &'static str, value: f32 },

    #[error("`normal_threshold` must be within [-1, 1], got {0}")]
    NormalThresholdOutOfRange(f32),

    #[error("`max_history_length` must be at least 1")]
    ZeroHistory,

    #[error("`atrous_radius` must be at least 1")]
    ZeroRadius,

    #[error("`atrous_iterations` must be at most {max}, got {got}")]
    TooManyIterations { got: u32, max: u32 },

    #[error("`sharpen_power` is supported only for visibility signals")]
    SharpenOnRadiance,

    #[error("`mirror_roughness` is supported only for radiance signals")]
    MirrorOnVisibility,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn presets_are_valid() {
        assert_eq!(Ok(()), DenoiserConfig::shadow().validate());
        assert_eq!(Ok(()), DenoiserConfig::reflection().validate());
    }

    #[test]
    fn invalid_configs() {
        let cases = [
            (
                DenoiserConfig {
                    blend_alpha: 0.0,
                    ..DenoiserConfig::shadow()
                },
                ConfigError::AlphaOutOfRange {
                    name: "blend_alpha",
                    value: 0.0,
                },
            ),
            (
                DenoiserConfig {
                    moments_alpha: 1.5,
                    ..DenoiserConfig::shadow()
                },
                ConfigError::AlphaOutOfRange {
                    name: "moments_alpha",
                    value: 1.5,
                },
            ),
            (
                DenoiserConfig {
                    phi_normal: -1.0,
                    ..DenoiserConfig::shadow()
                },
                ConfigError::NotPositive {
                    name: "phi_normal",
                    value: -1.0,
                },
            ),
            (
                DenoiserConfig {
                    atrous_radius: 0,
                    ..DenoiserConfig::shadow()
                },
                ConfigError::ZeroRadius,
            ),
            (
                DenoiserConfig {
                    atrous_iterations: 9,
                    ..DenoiserConfig::shadow()
                },
                ConfigError::TooManyIterations { got: 9, max: 8 },
            ),
            (
                DenoiserConfig {
                    sharpen_power: Some(1.5),
                    ..DenoiserConfig::reflection()
                },
                ConfigError::SharpenOnRadiance,
            ),
            (
                DenoiserConfig {
                    mirror_roughness: Some(0.1),
                    ..DenoiserConfig::shadow()
                },
                ConfigError::MirrorOnVisibility,
            ),
        ];

        for (config, expected) in cases {
            assert_eq!(Err(expected), config.validate());
        }
    }

    #[test]
    fn sharpening_applies_to_last_iteration_only() {
        let config = DenoiserConfig::shadow();

        assert_eq!(1.0, config.atrous_params(0).sharpen_power);
        assert_eq!(1.0, config.atrous_params(2).sharpen_power);
        assert_eq!(1.2, config.atrous_params(3).sharpen_power);
        assert_eq!(8, config.atrous_params(3).step);
    }

    #[test]
    fn commit_point() {
        let config = DenoiserConfig::shadow();

        assert!(!config.commits_at(0));
        assert!(config.commits_at(1));
        assert!(!config.commits_output());

        let config = DenoiserConfig {
            atrous_iterations: 1,
            ..DenoiserConfig::shadow()
        };

        assert!(config.commits_output());

        let config = DenoiserConfig {
            enabled: false,
            ..DenoiserConfig::shadow()
        };

        assert!(!config.commits_at(1));
        assert!(config.commits_output());
    }
}
