use std::sync::atomic::{AtomicU32, AtomicU64, Ordering};

use derivative::Derivative;

use crate::gpu;

/// Append-only list of tiles, shared between worker threads the same way a
/// device-side list is shared between workgroups.
#[derive(Derivative)]
#[derivative(Debug)]
pub struct TileList {
    kind: gpu::TileKind,
    len: AtomicU32,

    #[derivative(Debug = "ignore")]
    slots: Vec<AtomicU64>,
}

impl TileList {
    pub fn new(kind: gpu::TileKind, capacity: usize) -> Self {
        Self {
            kind,
            len: AtomicU32::new(0),
            slots: (0..capacity).map(|_| AtomicU64::new(0)).collect(),
        }
    }

    pub fn kind(&self) -> gpu::TileKind {
        self.kind
    }

    pub fn capacity(&self) -> usize {
        self.slots.len()
    }

    /// Empties the list; slots past the length stay but are unreachable.
    pub fn reset(&self) {
        self.len.store(0, Ordering::Relaxed);
    }

    /// Appends a tile, returning the slot it landed in.
    ///
    /// # Panics
    ///
    /// Panics if the list is full.
    pub fn push(&self, tile: gpu::TileCoord) -> usize {
        let slot = self.len.fetch_add(1, Ordering::Relaxed) as usize;

        assert!(
            slot < self.slots.len(),
            "{:?} tile list overflowed its capacity of {}",
            self.kind,
            self.slots.len(),
        );

        self.slots[slot].store(tile.pack(), Ordering::Relaxed);
        slot
    }

    pub fn len(&self) -> usize {
        self.len.load(Ordering::Relaxed) as usize
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Header the device would hold for this list; see [`gpu::TileArgs`].
    pub fn args(&self) -> gpu::TileArgs {
        gpu::TileArgs::new(self.len() as u32)
    }

    pub fn tiles(&self) -> Vec<gpu::TileCoord> {
        self.slots[..self.len()]
            .iter()
            .map(|slot| gpu::TileCoord::unpack(slot.load(Ordering::Relaxed)))
            .collect()
    }
}
