//! Typed frames to packed bytes, the bit-exact inverse of the decoder.
//!
//! Authoring tools and the round-trip tests both depend on the encoder
//! emitting exactly the fields the decoder reads: energy, then for speaking
//! frames the repeat bit and pitch, then however many coefficient indices
//! the frame kind carries.

use alloc::vec::Vec;

use crate::bitstream::BitWriter;
use crate::frame::{Frame, K_BIT_WIDTHS, STOP_ENERGY_INDEX};

/// Encodes a frame list into a packed byte stream.
///
/// Frames after the first [`Frame::Stop`] are not encoded, since a decoder
/// would never reach them.  A list without a stop frame gets the terminal
/// stop nibble appended.  Trailing bits of the last byte are zero.
#[must_use]
pub fn encode_frames(frames: &[Frame]) -> Vec<u8> {
    let mut writer = BitWriter::new();
    let mut terminated = false;

    for frame in frames {
        encode_frame(&mut writer, frame);
        if frame.is_terminal() {
            terminated = true;
            break;
        }
    }
    if !terminated {
        writer.write_bits(u32::from(STOP_ENERGY_INDEX), 4);
    }

    writer.into_bytes()
}

fn encode_frame(writer: &mut BitWriter, frame: &Frame) {
    writer.write_bits(u32::from(frame.energy_index()), 4);

    match frame {
        Frame::Silence | Frame::Stop => {}
        Frame::Repeat { pitch, .. } => {
            writer.write_bits(1, 1);
            writer.write_bits(u32::from(*pitch), 6);
        }
        Frame::Unvoiced { k, .. } => {
            writer.write_bits(0, 1);
            writer.write_bits(0, 6);
            for (stage, &index) in k.iter().enumerate() {
                writer.write_bits(u32::from(index), K_BIT_WIDTHS[stage]);
            }
        }
        Frame::Voiced { pitch, k, .. } => {
            writer.write_bits(0, 1);
            writer.write_bits(u32::from(*pitch), 6);
            for (stage, &index) in k.iter().enumerate() {
                writer.write_bits(u32::from(index), K_BIT_WIDTHS[stage]);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::decoder::decode_frames;
    use alloc::vec;

    #[test]
    fn stop_alone_is_one_nibble() {
        assert_eq!(encode_frames(&[Frame::Stop]), vec![0x0F]);
    }

    #[test]
    fn silence_then_stop_packs_into_one_byte() {
        assert_eq!(encode_frames(&[Frame::Silence, Frame::Stop]), vec![0xF0]);
    }

    #[test]
    fn missing_stop_is_appended() {
        let bytes = encode_frames(&[Frame::Silence]);
        assert_eq!(bytes, vec![0xF0]);
    }

    #[test]
    fn frames_after_stop_are_dropped() {
        let bytes = encode_frames(&[Frame::Stop, Frame::Silence, Frame::Silence]);
        assert_eq!(bytes, vec![0x0F]);
    }

    #[test]
    fn voiced_frame_round_trips() {
        let frame = Frame::Voiced {
            energy: 8,
            pitch: 30,
            k: [16, 16, 8, 8, 8, 8, 8, 4, 4, 4],
        };
        let decoded = decode_frames(&encode_frames(&[frame]));
        assert_eq!(decoded.frames, vec![frame, Frame::Stop]);
        assert!(!decoded.truncated);
    }

    #[test]
    fn mixed_stream_round_trips() {
        let frames = vec![
            Frame::Voiced {
                energy: 11,
                pitch: 45,
                k: [31, 0, 15, 7, 9, 3, 12, 7, 0, 5],
            },
            Frame::Silence,
            Frame::Repeat {
                energy: 6,
                pitch: 50,
            },
            Frame::Unvoiced {
                energy: 7,
                k: [24, 10, 8, 6],
            },
            Frame::Stop,
        ];
        let decoded = decode_frames(&encode_frames(&frames));
        assert_eq!(decoded.frames, frames);
        assert!(!decoded.truncated);
    }
}
