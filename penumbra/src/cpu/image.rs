use derivative::Derivative;
use glam::{UVec2, Vec4};

/// Screen-sized host image; the CPU counterpart of a texture.
#[derive(Clone, PartialEq, Derivative)]
#[derivative(Debug)]
pub struct Image {
    size: UVec2,

    #[derivative(Debug = "ignore")]
    pixels: Vec<Vec4>,
}

impl Image {
    pub fn new(size: UVec2) -> Self {
        Self::filled(size, Vec4::ZERO)
    }

    pub fn filled(size: UVec2, value: Vec4) -> Self {
        assert!(size.x > 0);
        assert!(size.y > 0);

        Self {
            size,
            pixels: vec![value; (size.x as usize) * (size.y as usize)],
        }
    }

    pub fn from_fn(size: UVec2, f: impl Fn(UVec2) -> Vec4) -> Self {
        let mut this = Self::new(size);

        for y in 0..size.y {
            for x in 0..size.x {
                let pos = UVec2::new(x, y);

                this.set(pos, f(pos));
            }
        }

        this
    }

    pub fn size(&self) -> UVec2 {
        self.size
    }

    pub fn get(&self, pos: UVec2) -> Vec4 {
        self.pixels[self.idx(pos)]
    }

    pub fn set(&mut self, pos: UVec2, value: Vec4) {
        let idx = self.idx(pos);

        self.pixels[idx] = value;
    }

    pub fn pixels(&self) -> &[Vec4] {
        &self.pixels
    }

    fn idx(&self, pos: UVec2) -> usize {
        assert!(pos.x < self.size.x && pos.y < self.size.y);

        (pos.y as usize) * (self.size.x as usize) + (pos.x as usize)
    }
}

#[cfg(test)]
mod tests {
    use glam::{uvec2, vec4};

    use super::*;

    #[test]
    fn from_fn() {
        let target = Image::from_fn(uvec2(3, 2), |pos| {
            vec4(pos.x as f32, pos.y as f32, 0.0, 0.0)
        });

        assert_eq!(vec4(2.0, 1.0, 0.0, 0.0), target.get(uvec2(2, 1)));
        assert_eq!(6, target.pixels().len());
    }

    #[test]
    #[should_panic]
    fn out_of_bounds() {
        Image::new(uvec2(4, 4)).get(uvec2(4, 0));
    }
}
