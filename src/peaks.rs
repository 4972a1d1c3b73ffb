use heapless::Vec;

use crate::{
    config::RangeTable, error::TrackError, types::Polarity, CONTACT_MAX, SENSOR_GUARD, SENSOR_MAX,
};

const SLOT_COUNT: usize = SENSOR_MAX + 2 * SENSOR_GUARD;

/// Per-sensor magnitudes of one scan, padded by [`SENSOR_GUARD`] zero slots
/// at both ends of the ribbon.
///
/// Slot `s` holds sensor `s - SENSOR_GUARD`. Guard slots always read as zero,
/// so interpolation can look two samples past any peak.
pub struct SampleBuffer {
    count: usize,
    spacing: f32,
    magnitude: [f32; SLOT_COUNT],
    polarity: [Polarity; SLOT_COUNT],
    above_threshold: [bool; SLOT_COUNT],
}

/// A local maximum of the flagged magnitudes, addressed by buffer slot.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Peak {
    pub slot: usize,
}

impl Peak {
    pub fn sensor(self) -> usize {
        self.slot - SENSOR_GUARD
    }
}

pub type PeakList = Vec<Peak, CONTACT_MAX>;

impl SampleBuffer {
    pub fn new(count: usize) -> Self {
        let count = count.min(SENSOR_MAX);
        Self {
            count,
            spacing: 1.0 / count.max(1) as f32,
            magnitude: [0.0; SLOT_COUNT],
            polarity: [Polarity::South; SLOT_COUNT],
            above_threshold: [false; SLOT_COUNT],
        }
    }

    pub fn sensor_count(&self) -> usize {
        self.count
    }

    /// Distance between neighbouring sensors on the unit ribbon.
    pub fn spacing(&self) -> f32 {
        self.spacing
    }

    /// Nominal coordinate of a slot: the centre of its sensor. Guard slots
    /// land outside `[0, 1]`.
    pub fn coordinate(&self, slot: usize) -> f32 {
        (slot as f32 - SENSOR_GUARD as f32 + 0.5) * self.spacing
    }

    pub fn magnitude(&self, slot: usize) -> f32 {
        self.magnitude[slot]
    }

    pub fn polarity(&self, slot: usize) -> Polarity {
        self.polarity[slot]
    }

    pub fn above_threshold(&self, slot: usize) -> bool {
        self.above_threshold[slot]
    }

    /// Loads a scan and returns its local maxima in ascending slot order.
    ///
    /// A sensor is flagged when twice its absolute deviation exceeds its
    /// threshold. Runs of adjacent flagged sensors form an area; each area is
    /// scanned with an up/down run direction and a descent after a rise emits
    /// the sample before it. Equal neighbours keep the direction, and a rise
    /// that lasts to the end of its area emits the area's last sample.
    pub fn load(&mut self, deviations: &[i16], range: &RangeTable) -> Result<PeakList, TrackError> {
        if deviations.len() != self.count || range.sensor_count() != self.count {
            return Err(TrackError::FrameLength {
                expected: self.count,
                actual: deviations.len(),
            });
        }

        let mut peaks = PeakList::new();
        let mut up = true;
        let mut prev: Option<usize> = None;

        for (sensor, &value) in deviations.iter().enumerate() {
            let slot = sensor + SENSOR_GUARD;
            let abs = value.unsigned_abs();
            let threshold = range.threshold(sensor);
            if (abs as u32) << 1 <= threshold as u32 {
                self.magnitude[slot] = 0.0;
                self.above_threshold[slot] = false;
                continue;
            }

            self.magnitude[slot] = range.magnitude(sensor, abs);
            self.polarity[slot] = Polarity::from_deviation(value);
            self.above_threshold[slot] = abs > threshold;

            match prev {
                Some(p0) if p0 + 1 == slot => {
                    if up {
                        if self.magnitude[slot] < self.magnitude[p0] {
                            push_peak(&mut peaks, p0)?;
                            up = false;
                        }
                    } else if self.magnitude[slot] > self.magnitude[p0] {
                        up = true;
                    }
                }
                Some(p0) => {
                    if up {
                        push_peak(&mut peaks, p0)?;
                    }
                    up = true;
                }
                None => {}
            }
            prev = Some(slot);
        }

        if let (Some(last), true) = (prev, up) {
            push_peak(&mut peaks, last)?;
        }

        Ok(peaks)
    }
}

fn push_peak(peaks: &mut PeakList, slot: usize) -> Result<(), TrackError> {
    peaks
        .push(Peak { slot })
        .map_err(|_| TrackError::PeakCapacity { limit: CONTACT_MAX })
}
