use crate::config::CurveLookup;

pub const CURVE_LEN: usize = 0x800;
const CURVE_TOP: f32 = (CURVE_LEN - 1) as f32;

/// Monotonic lookup from normalized magnitude to normalized intensity.
#[derive(Clone, Debug)]
pub struct CalibrationCurve {
    table: [f32; CURVE_LEN],
}

impl CalibrationCurve {
    pub fn identity() -> Self {
        Self::from_fn(|magnitude| magnitude)
    }

    /// Samples `f` at every quantization step of `[0, 1]`.
    pub fn from_fn(mut f: impl FnMut(f32) -> f32) -> Self {
        let mut table = [0.0; CURVE_LEN];
        for (idx, slot) in table.iter_mut().enumerate() {
            *slot = f(idx as f32 / CURVE_TOP);
        }
        Self { table }
    }

    pub fn from_table(table: [f32; CURVE_LEN]) -> Self {
        Self { table }
    }

    /// Clamps `magnitude` into `[0, 1]` and looks it up.
    pub fn lookup(&self, magnitude: f32, mode: CurveLookup) -> f32 {
        let scaled = clamp_unit(magnitude) * CURVE_TOP;
        // Non-negative, so truncation is floor.
        let base = scaled as usize;
        match mode {
            CurveLookup::Exact => self.table[base],
            CurveLookup::Linear => {
                let Some(&next) = self.table.get(base + 1) else {
                    return self.table[base];
                };
                let frac = scaled - base as f32;
                self.table[base] + frac * (next - self.table[base])
            }
        }
    }
}

/// Clamp into `[0, 1]`, mapping NaN to zero.
pub(crate) fn clamp_unit(value: f32) -> f32 {
    if value.is_nan() {
        0.0
    } else {
        value.clamp(0.0, 1.0)
    }
}
