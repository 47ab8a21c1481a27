//! Coefficient ROM of the TMS5220.
//!
//! The chip stores its quantization tables in an on-die ROM: one energy
//! table, one pitch-period table, ten reflection-coefficient tables of
//! shrinking cardinality, the voiced chirp waveform, and the interpolation
//! divisor schedule.  Reflection coefficients are kept in the chip's own
//! fixed-point scale, a signed value that divided by 512.0 yields the
//! mathematical coefficient in (-1, 1).

/// Output sample rate of the chip in Hz.
pub const SAMPLE_RATE: u32 = 8_000;

/// Samples per 25 ms speech frame (40 frames per second).
pub const SAMPLES_PER_FRAME: usize = 200;

/// Interpolation sub-periods per frame.
pub const INTERP_PERIODS_PER_FRAME: usize = 8;

/// Samples per interpolation sub-period.
pub const SAMPLES_PER_INTERP_PERIOD: usize = 25;

/// Depth of the external-speech FIFO window the status flags describe.
pub const FIFO_WINDOW_BYTES: usize = 16;

/// ROM equivalent: `energytable`.
///
/// Index 0 codes silence and index 15 codes the stop condition; both map to
/// zero amplitude.  The remaining entries grow roughly exponentially.
pub const ENERGY_TABLE: [u8; 16] = [0, 1, 2, 3, 4, 6, 8, 11, 16, 23, 33, 47, 63, 85, 114, 0];

/// ROM equivalent: `pitchtable`.
///
/// Pitch periods in samples.  Index 0 is the unvoiced sentinel; the rest run
/// from 15 up to 159 samples with non-uniform steps.
pub const PITCH_TABLE: [u8; 64] = [
    0, 15, 16, 17, 18, 19, 20, 21, 22, 23, 24, 25, 26, 27, 28, 29, 30, 31, 32, 33, 34, 35, 36, 37,
    38, 39, 40, 41, 42, 44, 46, 48, 50, 52, 53, 56, 58, 60, 62, 65, 68, 70, 72, 76, 78, 80, 84, 86,
    91, 94, 98, 101, 105, 109, 114, 118, 122, 127, 132, 137, 142, 148, 153, 159,
];

/// ROM equivalent: `k1table` (5-bit index).
pub const K1_TABLE: [i16; 32] = [
    -501, -498, -497, -495, -493, -491, -488, -482, -478, -474, -469, -464, -459, -452, -445,
    -437, -412, -380, -339, -288, -227, -158, -81, -1, 80, 157, 226, 287, 337, 379, 411, 436,
];

/// ROM equivalent: `k2table` (5-bit index).
pub const K2_TABLE: [i16; 32] = [
    -328, -303, -274, -244, -211, -175, -138, -99, -59, -18, 24, 64, 105, 143, 180, 215, 248, 278,
    306, 331, 354, 374, 392, 408, 422, 435, 445, 455, 463, 470, 476, 506,
];

/// ROM equivalent: `k3table` (4-bit index).
pub const K3_TABLE: [i16; 16] = [
    -441, -387, -333, -279, -225, -171, -117, -63, -9, 45, 98, 152, 206, 260, 314, 368,
];

/// ROM equivalent: `k4table` (4-bit index).
pub const K4_TABLE: [i16; 16] = [
    -328, -273, -217, -161, -106, -50, 5, 61, 116, 172, 228, 283, 339, 394, 450, 506,
];

/// ROM equivalent: `k5table` (4-bit index).
pub const K5_TABLE: [i16; 16] = [
    -328, -282, -235, -189, -142, -96, -50, -3, 43, 90, 136, 182, 229, 275, 322, 368,
];

/// ROM equivalent: `k6table` (4-bit index).
pub const K6_TABLE: [i16; 16] = [
    -256, -212, -168, -123, -79, -35, 10, 54, 98, 143, 187, 232, 276, 320, 365, 409,
];

/// ROM equivalent: `k7table` (4-bit index).
pub const K7_TABLE: [i16; 16] = [
    -308, -260, -212, -164, -117, -69, -21, 27, 75, 122, 170, 218, 266, 314, 361, 409,
];

/// ROM equivalent: `k8table` (3-bit index).
pub const K8_TABLE: [i16; 8] = [-256, -161, -66, 29, 124, 219, 314, 409];

/// ROM equivalent: `k9table` (3-bit index).
pub const K9_TABLE: [i16; 8] = [-256, -176, -96, -15, 65, 146, 226, 307];

/// ROM equivalent: `k10table` (3-bit index).
pub const K10_TABLE: [i16; 8] = [-205, -132, -59, 14, 87, 160, 234, 307];

/// Number of quantization levels per reflection-coefficient stage.
pub const K_CARDINALITIES: [usize; 10] = [32, 32, 16, 16, 16, 16, 16, 8, 8, 8];

/// ROM equivalent: `chirptable`.
///
/// The voiced excitation pulse, replayed from position 0 once per pitch
/// period.  Pitch periods longer than the table play silence for the
/// remainder of the period; the trailing zeros make that explicit.
pub const CHIRP_TABLE: [i8; 53] = [
    0, 42, -44, 50, -78, 18, 37, 20, 2, -31, -59, 2, 95, 90, 5, 15, 38, -4, -91, -91, -42, -35,
    -36, -4, 37, 43, 34, 33, 15, -1, -8, -18, -19, -17, -9, -10, -6, 0, 3, 2, 1, 0, 0, 0, 0, 0, 0,
    0, 0, 0, 0, 0, 0,
];

/// ROM equivalent: `interp_coeff`.
///
/// Arithmetic right-shift applied to the (target - current) difference, one
/// entry per interpolation period.  A shift of zero snaps the parameter onto
/// its target.  The chip's interpolation-period counter visits the entries
/// in the order 1, 2, ..., 7, 0, so the snap lands on the final sub-period
/// of each frame.
pub const INTERP_SHIFTS: [u8; 8] = [0, 3, 3, 3, 2, 2, 1, 1];

/// Reflection-coefficient table for one lattice stage (0-based).
#[inline]
#[must_use]
pub fn k_table(stage: usize) -> &'static [i16] {
    match stage {
        0 => &K1_TABLE,
        1 => &K2_TABLE,
        2 => &K3_TABLE,
        3 => &K4_TABLE,
        4 => &K5_TABLE,
        5 => &K6_TABLE,
        6 => &K7_TABLE,
        7 => &K8_TABLE,
        8 => &K9_TABLE,
        _ => &K10_TABLE,
    }
}
