use bytemuck::{Pod, Zeroable};
use glam::{vec2, IVec2, Mat4, UVec2, Vec2, Vec3, Vec4, Vec4Swizzles};

#[repr(C)]
#[derive(Clone, Copy, Debug, Default, Pod, Zeroable)]
pub struct Camera {
    /// Transforms current-frame NDC into world-space.
    pub curr_ndc_to_world: Mat4,

    /// Transforms world-space into previous-frame clip-space.
    pub prev_world_to_clip: Mat4,

    /// x, y, z - current camera position
    pub origin: Vec4,

    /// x, y, z - how far the camera moved since the previous frame
    pub delta: Vec4,

    /// x, y - viewport size (in pixels)
    pub screen: Vec4,
}

impl Camera {
    pub fn screen_size(&self) -> UVec2 {
        self.screen.xy().as_uvec2()
    }

    /// Returns whether given point lays inside the screen.
    pub fn contains(&self, pos: IVec2) -> bool {
        let screen_size = self.screen.xy().as_ivec2();

        pos.x >= 0
            && pos.y >= 0
            && pos.x < screen_size.x
            && pos.y < screen_size.y
    }

    /// Returns the direction of a ray going from camera's origin through the
    /// center of given pixel.
    pub fn ray_direction(&self, screen_pos: UVec2) -> Vec3 {
        let screen_size = self.screen.xy();
        let ndc = (screen_pos.as_vec2() + 0.5) * 2.0 / screen_size - Vec2::ONE;
        let ndc = vec2(ndc.x, -ndc.y);

        let near_plane =
            self.curr_ndc_to_world.project_point3(ndc.extend(0.0));

        let far_plane =
            self.curr_ndc_to_world.project_point3(ndc.extend(1.0));

        (far_plane - near_plane).normalize()
    }

    /// Given a pixel and its linear depth (distance from the camera), returns
    /// the world-space point that pixel sees.
    pub fn screen_to_world(&self, screen_pos: UVec2, depth: f32) -> Vec3 {
        self.origin.xyz() + self.ray_direction(screen_pos) * depth
    }

    /// Camera position during the previous frame.
    pub fn prev_origin(&self) -> Vec3 {
        self.origin.xyz() - self.delta.xyz()
    }

    /// Given a point in world-coordinates, returns where it was located on the
    /// previous frame's screen, in pixel-index space (i.e. `(3.0, 4.0)` is the
    /// center of pixel `(3, 4)`).
    ///
    /// Returns `None` if the point was behind the previous camera.
    pub fn world_to_prev_screen(&self, pos: Vec3) -> Option<Vec2> {
        let clip = self.prev_world_to_clip * pos.extend(1.0);

        if clip.w <= 0.0 {
            return None;
        }

        let ndc = clip.xy() / clip.w;
        let ndc = vec2(ndc.x, -ndc.y);

        Some((0.5 * ndc + 0.5) * self.screen.xy() - 0.5)
    }
}

#[cfg(test)]
mod tests {
    use approx::assert_relative_eq;
    use glam::{uvec2, vec3};

    use super::*;

    fn camera() -> Camera {
        let view = Mat4::look_at_rh(Vec3::ZERO, -Vec3::Z, Vec3::Y);
        let proj = Mat4::perspective_rh(1.0, 1.0, 0.1, 100.0);
        let view_proj = proj * view;

        Camera {
            curr_ndc_to_world: view_proj.inverse(),
            prev_world_to_clip: view_proj,
            origin: Vec4::ZERO,
            delta: Vec4::ZERO,
            screen: Vec4::new(16.0, 16.0, 0.0, 0.0),
        }
    }

    #[test]
    fn contains() {
        let target = camera();

        assert!(target.contains(IVec2::new(0, 0)));
        assert!(target.contains(IVec2::new(15, 15)));
        assert!(!target.contains(IVec2::new(-1, 0)));
        assert!(!target.contains(IVec2::new(16, 3)));
    }

    #[test]
    fn static_reprojection_lands_on_the_same_pixel() {
        let target = camera();

        for pos in [uvec2(0, 0), uvec2(3, 11), uvec2(15, 15)] {
            let world = target.screen_to_world(pos, 10.0);
            let prev = target.world_to_prev_screen(world).unwrap();

            assert_relative_eq!(prev.x, pos.x as f32, epsilon = 1e-3);
            assert_relative_eq!(prev.y, pos.y as f32, epsilon = 1e-3);
        }
    }

    #[test]
    fn points_behind_previous_camera_are_rejected() {
        let target = camera();

        assert!(target.world_to_prev_screen(vec3(0.0, 0.0, 5.0)).is_none());
    }
}
