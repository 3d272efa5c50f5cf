use glam::{UVec2, Vec2, Vec3, Vec4, Vec4Swizzles};

use crate::{
    lerp, BilinearFilter, Camera, Moments, Reprojection,
    ReprojectionPassParams, Surface,
};

/// Outcome of the temporal accumulation of a single pixel.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Accumulated {
    /// Accumulated signal in `xyz`, variance in `w`
    pub value: Vec4,
    pub moments: Moments,
}

impl Accumulated {
    /// Pixel that (re)starts accumulating from given raw sample.
    pub fn restart(raw: Vec3, luma: f32) -> Self {
        Self {
            value: raw.extend(0.0),
            moments: Moments::from_sample(luma),
        }
    }

    /// Sky pixel - passes the raw sample through and carries no moments, so
    /// it doesn't take part in tile classification.
    pub fn sky(raw: Vec3) -> Self {
        Self {
            value: raw.extend(0.0),
            moments: Moments::default(),
        }
    }

    pub fn variance(&self) -> f32 {
        self.value.w
    }

    pub fn is_sky(&self) -> bool {
        self.moments.history <= 0.0
    }
}

/// Blends the raw signal with reprojected history.
pub struct TemporalAccumulator<'a> {
    pub camera: &'a Camera,
    pub params: &'a ReprojectionPassParams,
}

impl<'a> TemporalAccumulator<'a> {
    /// Accumulates pixel at `screen_pos`.
    ///
    /// - `prev_surface` reads the previous frame's G-buffer,
    /// - `prev_value` reads the history texture,
    /// - `prev_moments` reads the previous frame's moments texture.
    #[allow(clippy::too_many_arguments)]
    pub fn run(
        &self,
        screen_pos: UVec2,
        raw: Vec3,
        surface: Surface,
        motion: Vec2,
        prev_surface: impl Fn(UVec2) -> Surface,
        prev_value: impl Fn(UVec2) -> Vec4,
        prev_moments: impl Fn(UVec2) -> Vec4,
    ) -> Accumulated {
        if surface.is_sky() {
            return Accumulated::sky(raw);
        }

        if self.params.has(ReprojectionPassParams::RESET_HISTORY) {
            return self.accumulate(raw, None);
        }

        let reprojection = Reprojection::find(
            self.camera,
            self.params,
            screen_pos,
            surface,
            motion,
            prev_surface,
        );

        let history = BilinearFilter::reproject(reprojection, prev_value)
            .zip(BilinearFilter::reproject(reprojection, prev_moments));

        self.accumulate(
            raw,
            history.map(|(value, moments)| {
                (value.xyz(), Moments::deserialize(moments))
            }),
        )
    }

    /// Blends raw sample with already-reprojected history; `None` means the
    /// pixel got disoccluded.
    pub fn accumulate(
        &self,
        raw: Vec3,
        history: Option<(Vec3, Moments)>,
    ) -> Accumulated {
        let luma = self.params.signal().luminance(raw);

        let Some((prev_value, prev_moments)) = history else {
            return Accumulated::restart(raw, luma);
        };

        if prev_moments.history_len() == 0 {
            return Accumulated::restart(raw, luma);
        }

        let history = (prev_moments.history + 1.0).min(self.params.max_history);
        let alpha = self.params.blend_alpha.max(1.0 / history);
        let moments_alpha = self.params.moments_alpha.max(1.0 / history);
        let value = lerp(prev_value, raw, alpha);
        let moments = prev_moments.blend(luma, moments_alpha, history);

        Accumulated {
            value: value.extend(moments.variance()),
            moments,
        }
    }
}
