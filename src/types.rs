use crate::zones::ZoneId;

/// OSC-style timetag handed through to the engines untouched.
pub type Timestamp = u64;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Polarity {
    North,
    South,
}

impl Polarity {
    /// South-polarity fields raise the sensor output, north-polarity fields
    /// lower it.
    pub fn from_deviation(value: i16) -> Self {
        if value < 0 {
            Self::North
        } else {
            Self::South
        }
    }

    pub const fn mask(self) -> PolarityMask {
        match self {
            Self::North => PolarityMask::NORTH,
            Self::South => PolarityMask::SOUTH,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PolarityMask(u16);

impl PolarityMask {
    pub const NONE: Self = Self(0);
    pub const NORTH: Self = Self(0x01);
    pub const SOUTH: Self = Self(0x02);
    pub const BOTH: Self = Self(0x03);

    pub const fn from_bits(bits: u16) -> Self {
        Self(bits & Self::BOTH.0)
    }

    pub const fn bits(self) -> u16 {
        self.0
    }

    pub const fn accepts(self, polarity: Polarity) -> bool {
        let bit = polarity.mask().0;
        self.0 & bit == bit
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct SessionId(pub u32);

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ContactState {
    /// Freshly interpolated, not yet related to the previous frame.
    Unassigned,
    Appeared,
    Persisted,
    Disappeared,
    /// New but below the appearance threshold; compacted out before dispatch.
    Ignored,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Contact {
    pub session: Option<SessionId>,
    pub polarity: Polarity,
    /// Ribbon coordinate in `[0, 1]`. Correspondence and list order use it.
    pub x: f32,
    /// Zone-relative coordinate reported to engines.
    pub position: f32,
    pub intensity: f32,
    pub above_threshold: bool,
    pub state: ContactState,
    pub zone: Option<ZoneId>,
}

impl Contact {
    pub fn new(polarity: Polarity, x: f32, intensity: f32, above_threshold: bool) -> Self {
        Self {
            session: None,
            polarity,
            x,
            position: x,
            intensity,
            above_threshold,
            state: ContactState::Unassigned,
            zone: None,
        }
    }
}

/// Arguments of an engine's frame-start hook.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct FrameInfo {
    pub frame_id: u32,
    pub now: Timestamp,
    pub offset: Timestamp,
    pub old_count: usize,
    pub new_count: usize,
}
