use glam::{Mat4, UVec2, Vec4};

use crate::gpu;

/// Camera through which the denoised signal is seen.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Camera {
    /// World-to-view transformation
    pub view: Mat4,

    /// View-to-clip transformation
    pub projection: Mat4,

    /// Viewport size, in pixels
    pub size: UVec2,
}

impl Camera {
    pub fn new(view: Mat4, projection: Mat4, size: UVec2) -> Self {
        Self {
            view,
            projection,
            size,
        }
    }

    /// Returns whether the denoiser's buffers have to be reallocated in order
    /// to render through `other`.
    pub fn is_invalidated_by(&self, other: &Self) -> bool {
        self.size != other.size
    }

    pub fn describe(&self) -> String {
        format!("size={}x{}", self.size.x, self.size.y)
    }

    pub fn world_to_clip(&self) -> Mat4 {
        self.projection * self.view
    }

    pub fn origin(&self) -> Vec4 {
        self.view.inverse().w_axis.truncate().extend(0.0)
    }

    /// Serializes this camera, taking `prev` as the camera used to render the
    /// previous frame.
    pub fn serialize(&self, prev: &Self) -> gpu::Camera {
        let origin = self.origin();

        gpu::Camera {
            curr_ndc_to_world: self.world_to_clip().inverse(),
            prev_world_to_clip: prev.world_to_clip(),
            origin,
            delta: origin - prev.origin(),
            screen: self.size.as_vec2().extend(0.0).extend(0.0),
        }
    }
}

#[cfg(test)]
mod tests {
    use approx::assert_relative_eq;
    use glam::{uvec2, vec3, Vec3};

    use super::*;

    fn camera(eye: Vec3, size: UVec2) -> Camera {
        Camera::new(
            Mat4::look_at_rh(eye, eye - Vec3::Z, Vec3::Y),
            Mat4::perspective_rh(1.0, 1.0, 0.1, 100.0),
            size,
        )
    }

    #[test]
    fn is_invalidated_by() {
        let target = camera(Vec3::ZERO, uvec2(16, 16));

        assert!(!target.is_invalidated_by(&camera(Vec3::ONE, uvec2(16, 16))));
        assert!(target.is_invalidated_by(&camera(Vec3::ZERO, uvec2(32, 16))));
    }

    #[test]
    fn serialize() {
        let prev = camera(vec3(1.0, 0.0, 0.0), uvec2(16, 8));
        let curr = camera(vec3(1.5, 2.0, 0.0), uvec2(16, 8));
        let actual = curr.serialize(&prev);

        assert_relative_eq!(1.5, actual.origin.x, epsilon = 1e-5);
        assert_relative_eq!(2.0, actual.origin.y, epsilon = 1e-5);
        assert_relative_eq!(0.5, actual.delta.x, epsilon = 1e-5);
        assert_relative_eq!(2.0, actual.delta.y, epsilon = 1e-5);
        assert_eq!(uvec2(16, 8), actual.screen_size());
        assert_relative_eq!(1.0, actual.prev_origin().x, epsilon = 1e-5);
    }
}
