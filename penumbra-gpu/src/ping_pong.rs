/// One side of a pair of physical buffers.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum PingPong {
    #[default]
    A,
    B,
}

impl PingPong {
    pub fn next(self) -> Self {
        match self {
            PingPong::A => PingPong::B,
            PingPong::B => PingPong::A,
        }
    }

    pub fn index(self) -> usize {
        match self {
            PingPong::A => 0,
            PingPong::B => 1,
        }
    }

    pub fn is_alternate(self) -> bool {
        self == PingPong::B
    }
}

/// Ping-pong state that advances once per frame; selects which moments
/// texture is written this frame and which one holds the previous frame's.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct TemporalPingPong(PingPong);

impl TemporalPingPong {
    pub fn new(side: PingPong) -> Self {
        Self(side)
    }

    pub fn next(self) -> Self {
        Self(self.0.next())
    }

    /// Side written during the current frame.
    pub fn curr(self) -> PingPong {
        self.0
    }

    /// Side written during the previous frame.
    pub fn prev(self) -> PingPong {
        self.0.next()
    }
}

/// Ping-pong state that advances once per à-trous iteration; selects which
/// texture of the working pair an iteration writes into.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct SpatialPingPong(PingPong);

impl SpatialPingPong {
    pub fn new(side: PingPong) -> Self {
        Self(side)
    }

    pub fn next(self) -> Self {
        Self(self.0.next())
    }

    /// Side the current iteration writes into.
    pub fn dst(self) -> PingPong {
        self.0
    }

    /// Side the previous iteration wrote into.
    pub fn src(self) -> PingPong {
        self.0.next()
    }
}
