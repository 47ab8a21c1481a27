//! Ten-stage reflection-coefficient lattice filter.
//!
//! The vocal-tract model of the chip: one excitation sample scaled by the
//! frame energy drives the lattice from the highest stage down, each stage
//! mixing the forward value with its delay element through the stage's
//! reflection coefficient.  The delay line then shifts one slot toward the
//! higher indices and the new output enters at slot zero.  Stage order and
//! the post-loop shift determine correctness; reordering either produces a
//! different (wrong) filter.

/// Number of lattice stages.
pub const LATTICE_ORDER: usize = 10;

/// Delay-line length.  The slot past the last stage mirrors the chip's
/// pipeline latch and stays zero in this rendition.
pub const DELAY_SLOTS: usize = 11;

/// Lower clamp of the filter output (signed 14-bit).
pub const OUTPUT_FLOOR: i32 = -8192;

/// Upper clamp of the filter output (signed 14-bit).
pub const OUTPUT_CEIL: i32 = 8191;

/// Divisor converting a stored coefficient to its mathematical value.
const K_SCALE: f32 = 512.0;

/// Lattice filter state: eleven signed delay elements.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LatticeFilter {
    delay: [f32; DELAY_SLOTS],
}

impl LatticeFilter {
    #[must_use]
    pub const fn new() -> Self {
        Self {
            delay: [0.0; DELAY_SLOTS],
        }
    }

    pub fn reset(&mut self) {
        self.delay = [0.0; DELAY_SLOTS];
    }

    /// Filters one driven excitation sample (`excitation * energy`).
    ///
    /// `k` holds the ten reflection coefficients in the /512 scale.  The
    /// result is rounded to the nearest integer and clamped to the signed
    /// 14-bit range; the caller scales it to 16-bit PCM.
    pub fn filter(&mut self, driven: f32, k: &[i32; LATTICE_ORDER]) -> i32 {
        let mut forward = driven;
        for stage in (0..LATTICE_ORDER).rev() {
            let coeff = k[stage] as f32 / K_SCALE;
            let output = forward - coeff * self.delay[stage];
            self.delay[stage] += coeff * output;
            forward = output;
        }

        for slot in (1..LATTICE_ORDER).rev() {
            self.delay[slot] = self.delay[slot - 1];
        }
        self.delay[0] = forward;

        (libm::roundf(forward) as i32).clamp(OUTPUT_FLOOR, OUTPUT_CEIL)
    }
}

impl Default for LatticeFilter {
    fn default() -> Self {
        Self::new()
    }
}
