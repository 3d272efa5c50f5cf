use bytemuck::{Pod, Zeroable};
use glam::{uvec2, UVec2};

use crate::ReprojectionPassParams;

/// Width and height of a tile, in pixels; matches the workgroup size of all
/// per-pixel kernels.
pub const TILE_SIZE: u32 = 8;

#[repr(C)]
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Pod, Zeroable)]
pub struct TileCoord {
    pub x: u32,
    pub y: u32,
}

impl TileCoord {
    pub fn new(x: u32, y: u32) -> Self {
        Self { x, y }
    }

    /// Returns the tile that contains given pixel.
    pub fn containing(screen_pos: UVec2) -> Self {
        Self::new(screen_pos.x / TILE_SIZE, screen_pos.y / TILE_SIZE)
    }

    /// Returns the top-left pixel of this tile.
    pub fn origin(self) -> UVec2 {
        uvec2(self.x, self.y) * TILE_SIZE
    }

    /// Returns the pixels of this tile that lay inside a screen of given size.
    pub fn pixels(self, screen_size: UVec2) -> impl Iterator<Item = UVec2> {
        let origin = self.origin();

        (0..TILE_SIZE).flat_map(move |y| {
            (0..TILE_SIZE).filter_map(move |x| {
                let pos = origin + uvec2(x, y);

                if pos.x < screen_size.x && pos.y < screen_size.y {
                    Some(pos)
                } else {
                    None
                }
            })
        })
    }

    /// Packs this coordinate into a single word; used where tile lists have to
    /// be appended to atomically.
    pub fn pack(self) -> u64 {
        ((self.y as u64) << 32) | (self.x as u64)
    }

    /// See: [`Self::pack()`].
    pub fn unpack(val: u64) -> Self {
        Self::new(val as u32, (val >> 32) as u32)
    }
}

/// Returns how many tiles (horizontally and vertically) cover a screen of
/// given size.
pub fn tile_grid(screen_size: UVec2) -> UVec2 {
    (screen_size + (TILE_SIZE - 1)) / TILE_SIZE
}

/// Returns how many tiles cover a screen of given size.
pub fn tile_count(screen_size: UVec2) -> usize {
    let grid = tile_grid(screen_size);

    (grid.x as usize) * (grid.y as usize)
}

/// Which list a tile lands in after classification.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum TileKind {
    /// Tile still contains noise and goes through the à-trous filter.
    Denoise,

    /// Tile is stable enough to be copied through untouched.
    Copy,
}

impl TileKind {
    pub const ALL: [Self; 2] = [TileKind::Denoise, TileKind::Copy];

    /// Index of this kind's tile list and dispatch arguments.
    pub fn index(self) -> usize {
        match self {
            TileKind::Denoise => 0,
            TileKind::Copy => 1,
        }
    }

    /// Classifies a tile given the statistics gathered over its pixels.
    ///
    /// `min_history` is `None` for tiles that didn't contain any surface
    /// (e.g. tiles filled with sky).
    pub fn classify(
        max_variance: f32,
        min_history: Option<u32>,
        variance_threshold: f32,
        min_history_samples: u32,
    ) -> Self {
        let Some(min_history) = min_history else {
            return TileKind::Copy;
        };

        if max_variance > variance_threshold
            || min_history < min_history_samples
        {
            TileKind::Denoise
        } else {
            TileKind::Copy
        }
    }
}

/// Statistics gathered over a tile's pixels during reprojection; sky pixels
/// are not added.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct TileStats {
    pub max_variance: f32,
    pub min_history: Option<u32>,
}

impl TileStats {
    pub fn add(&mut self, variance: f32, history: u32) {
        self.max_variance = self.max_variance.max(variance);

        self.min_history = Some(match self.min_history {
            Some(min_history) => min_history.min(history),
            None => history,
        });
    }

    pub fn classify(&self, params: &ReprojectionPassParams) -> TileKind {
        TileKind::classify(
            self.max_variance,
            self.min_history,
            params.tile_variance_threshold,
            params.min_history_samples(),
        )
    }
}

/// Maximum number of workgroups a tile dispatch launches along `x`; longer
/// lists wrap into further rows along `y`.
///
/// This is the lowest `max_compute_workgroups_per_dimension` a device can
/// report, so lists of up to this many tiles fit into a single row.
pub const TILE_DISPATCH_WIDTH: u32 = 65535;

/// Arguments of an indirect dispatch, laid out as `wgpu` expects them.
#[repr(C)]
#[derive(Clone, Copy, Debug, PartialEq, Eq, Pod, Zeroable)]
pub struct DispatchArgs {
    pub x: u32,
    pub y: u32,
    pub z: u32,
}

impl DispatchArgs {
    /// Arguments that dispatch nothing; written by the reset-args kernel.
    pub const EMPTY: Self = Self { x: 0, y: 1, z: 1 };

    /// Arguments that launch (at least) one workgroup per tile of a list of
    /// given length.
    ///
    /// The reprojection kernel arrives at the same numbers by bumping `x` to
    /// `min(slot + 1, TILE_DISPATCH_WIDTH)` and `y` to
    /// `slot / TILE_DISPATCH_WIDTH + 1` for each appended slot.
    pub fn for_tiles(len: u32) -> Self {
        if len == 0 {
            return Self::EMPTY;
        }

        Self {
            x: len.min(TILE_DISPATCH_WIDTH),
            y: len.div_ceil(TILE_DISPATCH_WIDTH),
            z: 1,
        }
    }

    pub fn workgroups(&self) -> u64 {
        (self.x as u64) * (self.y as u64) * (self.z as u64)
    }
}

impl Default for DispatchArgs {
    fn default() -> Self {
        Self::EMPTY
    }
}

/// Header of a tile list: its dispatch arguments followed by its length.
///
/// A list whose length isn't a multiple of [`TILE_DISPATCH_WIDTH`] (and is
/// longer than it) launches spare workgroups in its last row; kernels skip
/// those through [`Self::slot()`].
#[repr(C)]
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Pod, Zeroable)]
pub struct TileArgs {
    pub dispatch: DispatchArgs,
    pub len: u32,
}

impl TileArgs {
    pub const EMPTY: Self = Self {
        dispatch: DispatchArgs::EMPTY,
        len: 0,
    };

    pub fn new(len: u32) -> Self {
        Self {
            dispatch: DispatchArgs::for_tiles(len),
            len,
        }
    }

    pub fn len(&self) -> usize {
        self.len as usize
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Returns which slot of the list given workgroup processes, or `None`
    /// for the spare workgroups past the list's end.
    pub fn slot(&self, workgroup_id: UVec2) -> Option<usize> {
        let slot = workgroup_id.y * TILE_DISPATCH_WIDTH + workgroup_id.x;

        (slot < self.len).then_some(slot as usize)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tile_grid_rounds_up() {
        assert_eq!(uvec2(2, 2), tile_grid(uvec2(16, 16)));
        assert_eq!(uvec2(3, 1), tile_grid(uvec2(17, 1)));
        assert_eq!(240 * 135, tile_count(uvec2(1920, 1080)));
    }

    #[test]
    fn pixels_are_clipped_to_screen() {
        let tile = TileCoord::new(1, 0);

        assert_eq!(64, tile.pixels(uvec2(16, 16)).count());
        assert_eq!(2 * 3, tile.pixels(uvec2(10, 3)).count());
        assert_eq!(0, tile.pixels(uvec2(8, 8)).count());
    }

    #[test]
    fn pack() {
        let tile = TileCoord::new(123, 0xcafe);

        assert_eq!(tile, TileCoord::unpack(tile.pack()));
    }

    #[test]
    fn classify() {
        let classify = |var, history| TileKind::classify(var, history, 0.05, 4);

        assert_eq!(TileKind::Copy, classify(0.01, Some(32)));
        assert_eq!(TileKind::Denoise, classify(0.5, Some(32)));
        assert_eq!(TileKind::Denoise, classify(0.01, Some(1)));
        assert_eq!(TileKind::Copy, classify(0.0, None));
    }

    #[test]
    fn stats() {
        let params = ReprojectionPassParams {
            tile_variance_threshold: 0.05,
            min_history_samples: 4.0,
            ..Default::default()
        };

        let mut target = TileStats::default();

        assert_eq!(TileKind::Copy, target.classify(&params));

        target.add(0.01, 32);
        target.add(0.02, 8);

        assert_eq!(0.02, target.max_variance);
        assert_eq!(Some(8), target.min_history);
        assert_eq!(TileKind::Copy, target.classify(&params));

        target.add(0.0, 2);

        assert_eq!(TileKind::Denoise, target.classify(&params));
    }

    #[test]
    fn dispatch_args() {
        let args = |len| {
            let args = DispatchArgs::for_tiles(len);

            (args.x, args.y, args.z)
        };

        assert_eq!((0, 1, 1), args(0));
        assert_eq!((1, 1, 1), args(1));
        assert_eq!((4, 1, 1), args(4));
        assert_eq!((65535, 1, 1), args(65535));
        assert_eq!((65535, 2, 1), args(65536));

        // 3840x2160
        assert_eq!((65535, 2, 1), args(129600));
    }

    #[test]
    fn dispatch_args_match_atomic_bumps() {
        for len in [1, 7, 65535, 65536, 129600, 200000] {
            let mut x = 0;
            let mut y = 1;

            for slot in 0..len {
                x = u32::max(x, (slot + 1).min(TILE_DISPATCH_WIDTH));
                y = u32::max(y, slot / TILE_DISPATCH_WIDTH + 1);
            }

            let args = DispatchArgs::for_tiles(len);

            assert_eq!((x, y), (args.x, args.y), "len={len}");
            assert!(args.workgroups() >= len as u64);
        }
    }

    #[test]
    fn spare_workgroups_are_skipped() {
        let target = TileArgs::new(65537);

        assert_eq!(Some(0), target.slot(uvec2(0, 0)));
        assert_eq!(Some(65534), target.slot(uvec2(65534, 0)));
        assert_eq!(Some(65535), target.slot(uvec2(0, 1)));
        assert_eq!(Some(65536), target.slot(uvec2(1, 1)));
        assert_eq!(None, target.slot(uvec2(2, 1)));
        assert_eq!(None, TileArgs::EMPTY.slot(uvec2(0, 0)));
    }
}
