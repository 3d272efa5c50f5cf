use glam::Vec3;

use crate::Vec3Ext;

/// Kind of signal a denoiser instance works on.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum SignalKind {
    /// Scalar signal (e.g. shadow visibility), stored in the `x` channel.
    #[default]
    Visibility,

    /// RGB signal (e.g. specular reflections).
    Radiance,
}

impl SignalKind {
    pub fn is_radiance(self) -> bool {
        self == SignalKind::Radiance
    }

    /// Returns the luminance used for moments and edge-stopping.
    pub fn luminance(self, value: Vec3) -> f32 {
        match self {
            SignalKind::Visibility => value.x,
            SignalKind::Radiance => value.luma(),
        }
    }
}

#[cfg(test)]
mod tests {
    use approx::assert_relative_eq;
    use glam::vec3;

    use super::*;

    #[test]
    fn luminance() {
        let value = vec3(0.5, 1.0, 0.0);

        assert_eq!(0.5, SignalKind::Visibility.luminance(value));

        assert_relative_eq!(
            0.2126 * 0.5 + 0.7152,
            SignalKind::Radiance.luminance(value)
        );
    }
}
