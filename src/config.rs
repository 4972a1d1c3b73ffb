use crate::{error::TrackError, SENSOR_MAX};

pub const DEFAULT_PACEMAKER: u8 = 11;

/// Sub-sample interpolation strategy, global for all peaks of a tick.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Interpolation {
    Nearest,
    Linear,
    #[default]
    Quadratic,
    Cubic,
}

impl TryFrom<u8> for Interpolation {
    type Error = u8;

    fn try_from(order: u8) -> Result<Self, Self::Error> {
        match order {
            0 => Ok(Self::Nearest),
            1 => Ok(Self::Linear),
            2 => Ok(Self::Quadratic),
            3 => Ok(Self::Cubic),
            other => Err(other),
        }
    }
}

impl From<Interpolation> for u8 {
    fn from(value: Interpolation) -> Self {
        match value {
            Interpolation::Nearest => 0,
            Interpolation::Linear => 1,
            Interpolation::Quadratic => 2,
            Interpolation::Cubic => 3,
        }
    }
}

/// How a normalized magnitude indexes the calibration curve.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum CurveLookup {
    /// Entry at the truncated quantized magnitude.
    #[default]
    Exact,
    /// Blend of the two adjacent entries by the fractional part.
    Linear,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TrackerConfig {
    pub interpolation: Interpolation,
    /// Idle-bit ceiling of the heartbeat pacer. Beyond it an idle frame goes
    /// out every `2^pacemaker` ticks.
    pub pacemaker: u8,
    pub curve_lookup: CurveLookup,
}

impl Default for TrackerConfig {
    fn default() -> Self {
        Self {
            interpolation: Interpolation::default(),
            pacemaker: DEFAULT_PACEMAKER,
            curve_lookup: CurveLookup::default(),
        }
    }
}

/// Per-sensor threshold and the affine map from absolute deviation to a
/// normalized magnitude.
#[derive(Clone, Debug)]
pub struct RangeTable {
    count: usize,
    threshold: [u16; SENSOR_MAX],
    scale: [f32; SENSOR_MAX],
    offset: [f32; SENSOR_MAX],
}

impl RangeTable {
    pub fn uniform(count: usize, threshold: u16, scale: f32, offset: f32) -> Result<Self, TrackError> {
        if count == 0 || count > SENSOR_MAX {
            return Err(TrackError::SensorCount {
                requested: count,
                limit: SENSOR_MAX,
            });
        }
        Ok(Self {
            count,
            threshold: [threshold; SENSOR_MAX],
            scale: [scale; SENSOR_MAX],
            offset: [offset; SENSOR_MAX],
        })
    }

    pub fn set(
        &mut self,
        index: usize,
        threshold: u16,
        scale: f32,
        offset: f32,
    ) -> Result<(), TrackError> {
        if index >= self.count {
            return Err(TrackError::SensorCount {
                requested: index + 1,
                limit: self.count,
            });
        }
        self.threshold[index] = threshold;
        self.scale[index] = scale;
        self.offset[index] = offset;
        Ok(())
    }

    pub fn sensor_count(&self) -> usize {
        self.count
    }

    pub fn threshold(&self, index: usize) -> u16 {
        self.threshold[index]
    }

    /// Normalized magnitude of an absolute deviation; may leave `[0, 1]`.
    pub fn magnitude(&self, index: usize, abs_deviation: u16) -> f32 {
        abs_deviation as f32 * self.scale[index] - self.offset[index]
    }
}
