use glam::{vec4, Vec4};

use crate::F32Ext;

/// Temporal moments of a pixel's luminance.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Moments {
    /// Mean luminance
    pub m1: f32,

    /// Mean of squared luminance
    pub m2: f32,

    /// How many frames have been accumulated so far; zero means there's no
    /// history at all
    pub history: f32,
}

impl Moments {
    /// Moments of a pixel that has just (re)started accumulating.
    pub fn from_sample(luma: f32) -> Self {
        Self {
            m1: luma,
            m2: luma.sqr(),
            history: 1.0,
        }
    }

    pub fn serialize(&self) -> Vec4 {
        vec4(self.m1, self.m2, self.history, 0.0)
    }

    pub fn deserialize(d0: Vec4) -> Self {
        Self {
            m1: d0.x,
            m2: d0.y,
            history: d0.z,
        }
    }

    pub fn variance(&self) -> f32 {
        (self.m2 - self.m1.sqr()).max(0.0)
    }

    pub fn history_len(&self) -> u32 {
        self.history as u32
    }

    /// Blends these (previous) moments towards given sample.
    pub fn blend(self, luma: f32, alpha: f32, history: f32) -> Self {
        Self {
            m1: self.m1 + (luma - self.m1) * alpha,
            m2: self.m2 + (luma.sqr() - self.m2) * alpha,
            history,
        }
    }
}

#[cfg(test)]
mod tests {
    use approx::assert_relative_eq;

    use super::*;

    #[test]
    fn variance_is_clamped() {
        let target = Moments {
            m1: 0.5,
            m2: 0.2,
            history: 4.0,
        };

        assert_eq!(0.0, target.variance());
    }

    #[test]
    fn blend() {
        let target = Moments {
            m1: 0.5,
            m2: 0.25,
            history: 32.0,
        };

        let target = target.blend(1.0, 0.2, 32.0);

        assert_relative_eq!(0.6, target.m1, epsilon = 1e-6);
        assert_relative_eq!(0.4, target.m2, epsilon = 1e-6);
        assert_relative_eq!(0.04, target.variance(), epsilon = 1e-6);
    }

    #[test]
    fn from_sample() {
        let target = Moments::from_sample(0.75);

        assert_eq!(0.0, target.variance());
        assert_eq!(1, target.history_len());
    }
}
