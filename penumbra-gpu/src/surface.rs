use glam::{Vec3, Vec4, Vec4Swizzles};

/// One pixel of the G-buffer, as seen by the denoiser.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Surface {
    pub normal: Vec3,

    /// Linear depth, i.e. distance from the camera; zero (or less) for pixels
    /// that don't see any geometry.
    pub depth: f32,

    pub roughness: f32,
    pub metalness: f32,
}

impl Surface {
    /// Builds a surface out of the G-buffer's normal, depth and material
    /// texels (material is `roughness, metalness, ..`).
    pub fn new(normal: Vec4, depth: f32, material: Vec4) -> Self {
        Self {
            normal: normal.xyz(),
            depth,
            roughness: material.x,
            metalness: material.y,
        }
    }

    pub fn sky() -> Self {
        Self::default()
    }

    pub fn is_sky(&self) -> bool {
        self.depth <= 0.0
    }
}

#[cfg(test)]
mod tests {
    use glam::vec4;

    use super::*;

    #[test]
    fn new() {
        let target = Surface::new(
            vec4(0.0, 0.0, 1.0, 0.0),
            10.0,
            vec4(0.25, 0.75, 0.0, 0.0),
        );

        assert_eq!(Vec3::Z, target.normal);
        assert_eq!(10.0, target.depth);
        assert_eq!(0.25, target.roughness);
        assert_eq!(0.75, target.metalness);
        assert!(!target.is_sky());
        assert!(Surface::sky().is_sky());
    }
}
