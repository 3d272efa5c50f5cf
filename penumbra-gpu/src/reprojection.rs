use glam::{UVec2, Vec2};

use crate::{BilinearFilter, Camera, ReprojectionPassParams, Surface};

/// Reprojected positions closer than this to a pixel center are snapped onto
/// it, so that static scenes read history without any bilinear blur.
const SNAP_EPSILON: f32 = 1e-3;

#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Reprojection {
    pub prev_x: f32,
    pub prev_y: f32,

    /// Bitmask of bilinear taps (in [`BilinearFilter::reprojection_coords()`]
    /// order) that passed the consistency test
    pub validity: u32,
}

impl Reprojection {
    pub fn new(prev_pos: Vec2, validity: u32) -> Self {
        Self {
            prev_x: prev_pos.x,
            prev_y: prev_pos.y,
            validity,
        }
    }

    /// Finds where given pixel was located during the previous frame and
    /// checks which of the surrounding history taps still see the same
    /// surface.
    pub fn find(
        camera: &Camera,
        params: &ReprojectionPassParams,
        screen_pos: UVec2,
        surface: Surface,
        motion: Vec2,
        prev_surface: impl Fn(UVec2) -> Surface,
    ) -> Self {
        let world_pos = camera.screen_to_world(screen_pos, surface.depth);

        let prev_pos = if params.has(ReprojectionPassParams::USE_MOTION_VECTORS)
        {
            let screen_size = camera.screen_size().as_vec2();

            screen_pos.as_vec2() - motion * screen_size
        } else {
            match camera.world_to_prev_screen(world_pos) {
                Some(prev_pos) => prev_pos,
                None => return Self::default(),
            }
        };

        let prev_pos = Self::snap(prev_pos);
        let prev_depth = world_pos.distance(camera.prev_origin());
        let mut validity = 0;

        for (idx, tap) in BilinearFilter::reprojection_coords(prev_pos)
            .into_iter()
            .enumerate()
        {
            if !camera.contains(tap) {
                continue;
            }

            let tap_surface = prev_surface(tap.as_uvec2());

            if tap_surface.is_sky() {
                continue;
            }

            if (prev_depth - tap_surface.depth).abs()
                > params.consistency_epsilon
            {
                continue;
            }

            if surface.normal.dot(tap_surface.normal) < params.normal_threshold
            {
                continue;
            }

            validity |= 1 << idx;
        }

        Self::new(prev_pos, validity)
    }

    fn snap(pos: Vec2) -> Vec2 {
        let rounded = pos.round();

        Vec2::select(
            (pos - rounded).abs().cmplt(Vec2::splat(SNAP_EPSILON)),
            rounded,
            pos,
        )
    }

    pub fn is_some(&self) -> bool {
        self.validity > 0
    }

    pub fn is_none(&self) -> bool {
        !self.is_some()
    }

    pub fn is_tap_valid(&self, idx: usize) -> bool {
        self.validity & (1 << idx) > 0
    }

    pub fn prev_pos(&self) -> Vec2 {
        Vec2::new(self.prev_x, self.prev_y)
    }

    pub fn prev_pos_fract(&self) -> Vec2 {
        self.prev_pos() - self.prev_pos().floor()
    }
}
