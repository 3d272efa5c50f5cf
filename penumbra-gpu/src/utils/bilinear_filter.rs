use glam::{ivec2, vec4, IVec2, UVec2, Vec2, Vec4};

use crate::Reprojection;

#[derive(Clone, Copy)]
pub struct BilinearFilter {
    /// Sample at `f(x=0, y=0)`
    pub s00: Vec4,

    /// Sample at `f(x=1, y=0)`
    pub s10: Vec4,

    /// Sample at `f(x=0, y=1)`
    pub s01: Vec4,

    /// Sample at `f(x=1, y=1)`
    pub s11: Vec4,

    /// Weights for each sample; zero for taps that failed the consistency
    /// test
    pub weights: Vec4,
}

impl BilinearFilter {
    /// Fetches history around the reprojected position, skipping taps that
    /// are not valid; returns `None` if there's nothing to blend with.
    pub fn reproject(
        reprojection: Reprojection,
        sample: impl Fn(UVec2) -> Vec4,
    ) -> Option<Vec4> {
        if reprojection.is_none() {
            return None;
        }

        Self::from_reprojection(reprojection, sample)
            .eval(reprojection.prev_pos_fract())
    }

    pub fn from_reprojection(
        reprojection: Reprojection,
        sample: impl Fn(UVec2) -> Vec4,
    ) -> Self {
        let mut samples = [Vec4::ZERO; 4];
        let mut weights = [0.0; 4];
        let taps = Self::reprojection_coords(reprojection.prev_pos());

        for (idx, tap) in taps.into_iter().enumerate() {
            if reprojection.is_tap_valid(idx) {
                samples[idx] = sample(tap.as_uvec2());
                weights[idx] = 1.0;
            }
        }

        let [s00, s10, s01, s11] = samples;

        Self {
            s00,
            s10,
            s01,
            s11,
            weights: Vec4::from_array(weights),
        }
    }

    pub fn reprojection_coords(prev_pos: Vec2) -> [IVec2; 4] {
        let p00 = ivec2(prev_pos.x.floor() as i32, prev_pos.y.floor() as i32);
        let p10 = ivec2(prev_pos.x.ceil() as i32, prev_pos.y.floor() as i32);
        let p01 = ivec2(prev_pos.x.floor() as i32, prev_pos.y.ceil() as i32);
        let p11 = ivec2(prev_pos.x.ceil() as i32, prev_pos.y.ceil() as i32);

        [p00, p10, p01, p11]
    }

    pub fn eval(&self, uv: Vec2) -> Option<Vec4> {
        let weights = self.weights
            * vec4(
                (1.0 - uv.x) * (1.0 - uv.y),
                uv.x * (1.0 - uv.y),
                (1.0 - uv.x) * uv.y,
                uv.x * uv.y,
            );

        let w_sum = weights.dot(Vec4::ONE);

        if w_sum <= 0.0 {
            None
        } else {
            Some(
                (self.s00 * weights.x
                    + self.s10 * weights.y
                    + self.s01 * weights.z
                    + self.s11 * weights.w)
                    / w_sum,
            )
        }
    }
}

#[cfg(test)]
mod tests {
    use approx::assert_relative_eq;
    use glam::vec2;

    use super::*;

    fn sample(pos: UVec2) -> Vec4 {
        Vec4::splat((pos.x + 10 * pos.y) as f32)
    }

    #[test]
    fn exact_position_reads_single_texel() {
        let reprojection = Reprojection::new(vec2(3.0, 4.0), 0b1111);
        let actual = BilinearFilter::reproject(reprojection, sample).unwrap();

        assert_eq!(43.0, actual.x);
    }

    #[test]
    fn invalid_taps_are_skipped() {
        let reprojection = Reprojection::new(vec2(3.5, 4.0), 0b0010);
        let actual = BilinearFilter::reproject(reprojection, sample).unwrap();

        assert_relative_eq!(44.0, actual.x);

        let reprojection = Reprojection::new(vec2(3.5, 4.5), 0b0001);
        let actual = BilinearFilter::reproject(reprojection, sample).unwrap();

        assert_relative_eq!(43.0, actual.x);
    }

    #[test]
    fn fully_rejected_history_yields_nothing() {
        let reprojection = Reprojection::new(vec2(3.5, 4.5), 0);

        assert!(BilinearFilter::reproject(reprojection, sample).is_none());
    }

    #[test]
    fn taps_are_weighted() {
        let reprojection = Reprojection::new(vec2(3.5, 4.0), 0b1111);
        let actual = BilinearFilter::reproject(reprojection, sample).unwrap();

        assert_relative_eq!(43.5, actual.x);
    }
}
