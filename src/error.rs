use core::fmt;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TrackError {
    /// The deviation vector does not match the configured sensor count.
    FrameLength { expected: usize, actual: usize },
    SensorCount { requested: usize, limit: usize },
    /// The scan produced more peaks than a frame can hold.
    PeakCapacity { limit: usize },
    ZoneIndex { index: usize },
    /// Zone bounds must lie in `[0, 1]` with `x0 < x1`.
    ZoneBounds,
    ZoneBuffer { needed: usize },
    EngineCapacity { limit: usize },
    EngineSlot { index: usize },
}

impl fmt::Display for TrackError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::FrameLength { expected, actual } => {
                write!(f, "frame has {actual} readings, expected {expected}")
            }
            Self::SensorCount { requested, limit } => {
                write!(f, "sensor count {requested} exceeds {limit}")
            }
            Self::PeakCapacity { limit } => write!(f, "more than {limit} peaks in one scan"),
            Self::ZoneIndex { index } => write!(f, "no zone at index {index}"),
            Self::ZoneBounds => f.write_str("zone bounds must satisfy 0 <= x0 < x1 <= 1"),
            Self::ZoneBuffer { needed } => write!(f, "zone buffer needs {needed} bytes"),
            Self::EngineCapacity { limit } => write!(f, "more than {limit} engines"),
            Self::EngineSlot { index } => write!(f, "no engine slot {index}"),
        }
    }
}
