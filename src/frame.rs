//! Typed LPC frame model.
//!
//! A frame is the smallest encodable speech unit, nominally 25 ms.  Field
//! presence depends on the frame kind, so the kinds are a tagged union
//! rather than one struct with optional fields: a `Repeat` frame simply has
//! no coefficient indices to misread.

use log::warn;

use crate::tables::{self, ENERGY_TABLE, PITCH_TABLE};

/// Bit width of each reflection-coefficient index on the wire, K1 first.
pub const K_BIT_WIDTHS: [u32; 10] = [5, 5, 4, 4, 4, 4, 4, 3, 3, 3];

/// Energy-slot value that codes the stop condition.
pub const STOP_ENERGY_INDEX: u8 = 15;

/// One decoded LPC frame.
///
/// `energy`, `pitch` and `k` are quantization indices into the coefficient
/// ROM, not decoded values; use [`Frame::energy_value`] and friends to
/// resolve them.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Frame {
    /// Pitched excitation with a full set of ten coefficient indices.
    Voiced { energy: u8, pitch: u8, k: [u8; 10] },
    /// Noise excitation; only K1..K4 are transmitted, the rest are zero.
    Unvoiced { energy: u8, k: [u8; 4] },
    /// Re-uses the previous frame's coefficients with new energy and pitch.
    Repeat { energy: u8, pitch: u8 },
    /// Energy slot 0: one frame of decay toward zero.
    Silence,
    /// Energy slot 15: end of speech.
    Stop,
}

impl Frame {
    /// Value carried in the 4-bit energy slot.
    #[must_use]
    pub const fn energy_index(&self) -> u8 {
        match self {
            Frame::Voiced { energy, .. }
            | Frame::Unvoiced { energy, .. }
            | Frame::Repeat { energy, .. } => *energy,
            Frame::Silence => 0,
            Frame::Stop => STOP_ENERGY_INDEX,
        }
    }

    /// Pitch index, when the frame carries one.  Zero means unvoiced.
    #[must_use]
    pub const fn pitch_index(&self) -> Option<u8> {
        match self {
            Frame::Voiced { pitch, .. } | Frame::Repeat { pitch, .. } => Some(*pitch),
            Frame::Unvoiced { .. } => Some(0),
            Frame::Silence | Frame::Stop => None,
        }
    }

    /// Energy resolved through the ROM table.
    #[must_use]
    pub fn energy_value(&self) -> i32 {
        match self {
            Frame::Silence | Frame::Stop => 0,
            _ => i32::from(ENERGY_TABLE[clamped_index(
                self.energy_index() as usize,
                ENERGY_TABLE.len() - 1,
                "energy",
            )]),
        }
    }

    /// Pitch period in samples resolved through the ROM table.
    #[must_use]
    pub fn pitch_value(&self) -> Option<i32> {
        self.pitch_index().map(|index| {
            i32::from(PITCH_TABLE[clamped_index(index as usize, PITCH_TABLE.len(), "pitch")])
        })
    }

    /// All ten reflection coefficients in the /512 scale, zeros where the
    /// frame carries none.
    #[must_use]
    pub fn k_values(&self) -> [i32; 10] {
        let mut values = [0i32; 10];
        match self {
            Frame::Voiced { k, .. } => {
                for (stage, &index) in k.iter().enumerate() {
                    values[stage] = k_value(stage, index);
                }
            }
            Frame::Unvoiced { k, .. } => {
                for (stage, &index) in k.iter().enumerate() {
                    values[stage] = k_value(stage, index);
                }
            }
            _ => {}
        }
        values
    }

    /// True for the frame that terminates a stream.
    #[must_use]
    pub const fn is_terminal(&self) -> bool {
        matches!(self, Frame::Stop)
    }
}

/// Looks up one reflection coefficient, clamping an oversized index onto the
/// last table entry.
#[must_use]
pub(crate) fn k_value(stage: usize, index: u8) -> i32 {
    let table = tables::k_table(stage);
    i32::from(table[clamped_index(index as usize, table.len(), "k")])
}

fn clamped_index(index: usize, len: usize, what: &str) -> usize {
    if index < len {
        index
    } else {
        warn!("{what} index {index} out of range, clamping to {}", len - 1);
        len - 1
    }
}

/// Decoded synthesis parameters, directly usable by the engine.
///
/// This is the record the phoneme front end produces: energy and pitch as
/// plain values, reflection coefficients in the /512 scale.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SpeechParams {
    /// Excitation amplitude, 0..=114.
    pub energy: i32,
    /// Pitch period in samples: 0 for unvoiced, otherwise 15..=159.
    pub pitch: i32,
    /// Reflection coefficients scaled by 512, each in -511..=511.
    pub k: [i32; 10],
}

impl SpeechParams {
    /// Clamps every field onto its valid range, warning once per violation.
    ///
    /// Out-of-range values never abort synthesis; the nearest valid value is
    /// used instead.
    #[must_use]
    pub fn clamped(&self) -> Self {
        let mut out = *self;
        if !(0..=114).contains(&out.energy) {
            warn!("energy {} out of range, clamping", out.energy);
            out.energy = out.energy.clamp(0, 114);
        }
        match out.pitch {
            0 | 15..=159 => {}
            p => {
                warn!("pitch {p} out of range, clamping");
                out.pitch = p.clamp(15, 159);
            }
        }
        for (stage, k) in out.k.iter_mut().enumerate() {
            if !(-511..=511).contains(k) {
                warn!("k{} value {k} out of range, clamping", stage + 1);
                *k = (*k).clamp(-511, 511);
            }
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn energy_index_distinguishes_sentinels() {
        assert_eq!(Frame::Silence.energy_index(), 0);
        assert_eq!(Frame::Stop.energy_index(), 15);
        assert_eq!(
            Frame::Repeat { energy: 9, pitch: 4 }.energy_index(),
            9
        );
    }

    #[test]
    fn unvoiced_k_values_zero_the_back_stages() {
        let frame = Frame::Unvoiced {
            energy: 7,
            k: [24, 10, 8, 6],
        };
        let values = frame.k_values();
        assert_eq!(values[0], i32::from(crate::tables::K1_TABLE[24]));
        assert!(values[4..].iter().all(|&value| value == 0));
    }

    #[test]
    fn silence_and_stop_resolve_to_zero_energy() {
        assert_eq!(Frame::Silence.energy_value(), 0);
        assert_eq!(Frame::Stop.energy_value(), 0);
        assert_eq!(Frame::Silence.pitch_value(), None);
    }

    #[test]
    fn oversized_indices_clamp_to_the_last_entry() {
        let frame = Frame::Repeat {
            energy: 14,
            pitch: 0xFF,
        };
        assert_eq!(frame.pitch_value(), Some(i32::from(PITCH_TABLE[63])));
        assert_eq!(k_value(9, 200), i32::from(crate::tables::K10_TABLE[7]));
    }

    #[test]
    fn params_clamp_onto_valid_ranges() {
        let params = SpeechParams {
            energy: 400,
            pitch: 7,
            k: [600, -600, 0, 0, 0, 0, 0, 0, 0, 0],
        };
        let clamped = params.clamped();
        assert_eq!(clamped.energy, 114);
        assert_eq!(clamped.pitch, 15);
        assert_eq!(clamped.k[0], 511);
        assert_eq!(clamped.k[1], -511);

        let valid = SpeechParams {
            energy: 23,
            pitch: 0,
            k: [100; 10],
        };
        assert_eq!(valid.clamped(), valid);
    }
}
