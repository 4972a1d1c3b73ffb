//! Sub-sample position and intensity of a peak.
//!
//! Every magnitude passes through the calibration curve (clamped into
//! `[0, 1]` first) before it takes part in a fit, and the final pair is
//! clamped into `[0, 1] x [0, 1]`. A non-finite fit result falls back to the
//! peak's nominal coordinate and looked-up intensity.

use fixed::types::I16F16;
use fixed_sqrt::FixedSqrt;

use crate::{
    calibration::{clamp_unit, CalibrationCurve},
    config::{CurveLookup, Interpolation},
    peaks::{Peak, SampleBuffer},
    types::Contact,
};

pub struct Interpolator<'a> {
    pub buffer: &'a SampleBuffer,
    pub curve: &'a CalibrationCurve,
    pub lookup: CurveLookup,
}

impl Interpolator<'_> {
    pub fn contact(&self, peak: Peak, strategy: Interpolation) -> Contact {
        let slot = peak.slot;
        let nominal = self.buffer.coordinate(slot);
        let fallback = self.sample(slot);

        let (x, y) = match strategy {
            Interpolation::Nearest => (nominal, fallback),
            Interpolation::Linear => self.linear(slot),
            Interpolation::Quadratic => self.quadratic(slot),
            Interpolation::Cubic => self.cubic(slot),
        };

        let x = if x.is_finite() { x } else { nominal };
        let y = if y.is_finite() { y } else { fallback };

        Contact::new(
            self.buffer.polarity(slot),
            clamp_unit(x),
            clamp_unit(y),
            self.buffer.above_threshold(slot),
        )
    }

    fn sample(&self, slot: usize) -> f32 {
        self.curve.lookup(self.buffer.magnitude(slot), self.lookup)
    }

    /// Straight line towards the larger neighbour, weighted by its share of
    /// the two intensities.
    fn linear(&self, slot: usize) -> (f32, f32) {
        let buffer = self.buffer;
        let x1 = buffer.coordinate(slot);
        let y1 = self.sample(slot);
        let neighbour = if buffer.magnitude(slot - 1) >= buffer.magnitude(slot + 1) {
            slot - 1
        } else {
            slot + 1
        };
        let x0 = buffer.coordinate(neighbour);
        let y0 = self.sample(neighbour);

        let total = y0 + y1;
        if total == 0.0 {
            return (x1, y1);
        }
        let x = x1 + (x0 - x1) * y0 / total;
        let slope = (y1 - y0) / (x1 - x0);
        let intercept = y0 - slope * x0;
        (x, slope * x + intercept)
    }

    /// Vertex of the parabola through the peak and its two neighbours.
    fn quadratic(&self, slot: usize) -> (f32, f32) {
        let y0 = self.sample(slot - 1);
        let y1 = self.sample(slot);
        let y2 = self.sample(slot + 1);
        let x1 = self.buffer.coordinate(slot);

        let divisor = y0 - 2.0 * y1 + y2;
        if divisor == 0.0 {
            return (x1, y1);
        }
        let skew = y0 - y2;
        let x = x1 + 0.5 * self.buffer.spacing() * skew / divisor;
        let y = y1 - skew * skew / (8.0 * divisor);
        (x, y)
    }

    /// Extremum of the Catmull-Rom segment between the peak and its larger
    /// neighbour, from the root of the spline's first derivative.
    fn cubic(&self, slot: usize) -> (f32, f32) {
        let buffer = self.buffer;
        let start = if buffer.magnitude(slot - 1) >= buffer.magnitude(slot + 1) {
            slot - 1
        } else {
            slot
        };
        let y0 = self.sample(start - 1);
        let y1 = self.sample(start);
        let y2 = self.sample(start + 1);
        let y3 = self.sample(start + 2);

        let a0 = -0.5 * y0 + 1.5 * y1 - 1.5 * y2 + 0.5 * y3;
        let a1 = y0 - 2.5 * y1 + 2.0 * y2 - 0.5 * y3;
        let a2 = -0.5 * y0 + 0.5 * y2;
        let a3 = y1;

        let mu = spline_extremum(3.0 * a0, 2.0 * a1, a2);
        let x = buffer.coordinate(start) + mu * buffer.spacing();
        let mu2 = mu * mu;
        (x, a0 * mu2 * mu + a1 * mu2 + a2 * mu + a3)
    }
}

/// Root of `a * mu^2 + b * mu + c` at which the segment reaches its maximum,
/// clamped onto the segment `[0, 1]`.
///
/// The maximum is `(-b - sqrt(d)) / 2a`. For `b < 0` it is evaluated as
/// `2c / (sqrt(d) - b)`, which stays finite as `a` vanishes and converges on
/// the root of the then linear derivative. A negative discriminant collapses
/// onto the real part `-b / 2a`; a constant derivative yields the segment
/// start.
fn spline_extremum(a: f32, b: f32, c: f32) -> f32 {
    let discriminant = b * b - 4.0 * a * c;
    let root = if a != 0.0 && discriminant <= 0.0 {
        -b / (2.0 * a)
    } else if b < 0.0 {
        2.0 * c / (sqrt_non_negative(discriminant) - b)
    } else if a != 0.0 {
        -(b + sqrt_non_negative(discriminant)) / (2.0 * a)
    } else if b != 0.0 {
        -c / b
    } else {
        0.0
    };
    clamp_unit(root)
}

fn sqrt_non_negative(value: f32) -> f32 {
    match I16F16::checked_from_num(value) {
        Some(fx) if fx > I16F16::ZERO => FixedSqrt::sqrt(fx).to_num::<f32>(),
        None if value > 0.0 => FixedSqrt::sqrt(I16F16::MAX).to_num::<f32>(),
        _ => 0.0,
    }
}
