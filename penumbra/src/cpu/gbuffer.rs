use glam::{UVec2, Vec2, Vec4Swizzles};

use crate::cpu::Image;
use crate::gpu;

/// Host-side counterpart of [`crate::GBufferFrame`]; texel layouts match.
#[derive(Clone, Debug)]
pub struct CpuGBufferFrame {
    pub normal: Image,
    pub depth: Image,
    pub material: Image,
    pub motion: Image,
}

impl CpuGBufferFrame {
    pub fn size(&self) -> UVec2 {
        self.normal.size()
    }

    pub fn surface(&self, pos: UVec2) -> gpu::Surface {
        gpu::Surface::new(
            self.normal.get(pos),
            self.depth.get(pos).x,
            self.material.get(pos),
        )
    }

    pub fn motion(&self, pos: UVec2) -> Vec2 {
        self.motion.get(pos).xy()
    }
}

/// Host-side counterpart of [`crate::GBuffer`].
#[derive(Clone, Debug)]
pub struct CpuGBuffer {
    pub frames: [CpuGBufferFrame; 2],
}

impl CpuGBuffer {
    pub fn new(frames: [CpuGBufferFrame; 2]) -> Self {
        for frame in &frames {
            assert_eq!(frames[0].size(), frame.normal.size());
            assert_eq!(frames[0].size(), frame.depth.size());
            assert_eq!(frames[0].size(), frame.material.size());
            assert_eq!(frames[0].size(), frame.motion.size());
        }

        Self { frames }
    }

    pub fn frame(&self, parity: gpu::PingPong) -> &CpuGBufferFrame {
        &self.frames[parity.index()]
    }

    pub fn frame_mut(&mut self, parity: gpu::PingPong) -> &mut CpuGBufferFrame {
        &mut self.frames[parity.index()]
    }
}
