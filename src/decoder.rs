//! Packed bytes to typed frames.
//!
//! Frame layout is context dependent: the 4-bit energy slot selects silence
//! and stop sentinels, the repeat bit short-circuits the coefficient block,
//! and a zero pitch cuts the coefficient block from ten indices down to
//! four.  The decoder reads exactly the fields a frame carries and never
//! looks past the terminal stop frame.

use alloc::vec::Vec;
use log::{debug, trace};

use crate::bitstream::BitReader;
use crate::frame::{Frame, K_BIT_WIDTHS, STOP_ENERGY_INDEX};

/// Decoding failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DecodeError {
    /// The stream ended in the middle of a frame field.
    OutOfBits,
}

impl core::fmt::Display for DecodeError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::OutOfBits => f.write_str("bitstream ended mid-field"),
        }
    }
}

impl core::error::Error for DecodeError {}

/// Pull decoder over a borrowed byte buffer.
///
/// Yields frames up to and including the terminal [`Frame::Stop`], then
/// reports itself finished.  Running out of bits mid-field is an error once;
/// afterwards the decoder is finished as well.
#[derive(Debug)]
pub struct FrameDecoder<'a> {
    reader: BitReader<'a>,
    finished: bool,
}

impl<'a> FrameDecoder<'a> {
    #[must_use]
    pub const fn new(data: &'a [u8]) -> Self {
        Self {
            reader: BitReader::new(data),
            finished: false,
        }
    }

    /// Decodes the next frame.
    ///
    /// Returns `Ok(None)` once the terminal stop frame has been produced or
    /// the buffer holds no further frame.
    pub fn next_frame(&mut self) -> Result<Option<Frame>, DecodeError> {
        if self.finished {
            return Ok(None);
        }
        // A fully drained buffer between frames is normal stream end, not a
        // malformed stream.
        if self.reader.bits_remaining() == 0 {
            self.finished = true;
            return Ok(None);
        }

        let frame = match self.parse_frame() {
            Ok(frame) => frame,
            Err(error) => {
                debug!(
                    "frame truncated at bit {} of the stream",
                    self.reader.position()
                );
                self.finished = true;
                return Err(error);
            }
        };

        trace!("decoded {frame:?}");
        if frame.is_terminal() {
            self.finished = true;
        }
        Ok(Some(frame))
    }

    fn parse_frame(&mut self) -> Result<Frame, DecodeError> {
        let energy = self.read(4)? as u8;
        if energy == STOP_ENERGY_INDEX {
            return Ok(Frame::Stop);
        }
        if energy == 0 {
            return Ok(Frame::Silence);
        }

        let repeat = self.read(1)? == 1;
        let pitch = self.read(6)? as u8;
        if repeat {
            return Ok(Frame::Repeat { energy, pitch });
        }

        if pitch == 0 {
            let mut k = [0u8; 4];
            for (stage, index) in k.iter_mut().enumerate() {
                *index = self.read(K_BIT_WIDTHS[stage])? as u8;
            }
            return Ok(Frame::Unvoiced { energy, k });
        }

        let mut k = [0u8; 10];
        for (stage, index) in k.iter_mut().enumerate() {
            *index = self.read(K_BIT_WIDTHS[stage])? as u8;
        }
        Ok(Frame::Voiced { energy, pitch, k })
    }

    fn read(&mut self, width: u32) -> Result<u32, DecodeError> {
        self.reader.read_bits(width).ok_or(DecodeError::OutOfBits)
    }

    /// True once the terminal frame was produced or the stream gave out.
    #[must_use]
    pub const fn finished(&self) -> bool {
        self.finished
    }

    /// Whole unread bytes left in the buffer (feeds the FIFO status flags).
    #[must_use]
    pub const fn bytes_remaining(&self) -> usize {
        self.reader.bytes_remaining()
    }
}

impl Iterator for FrameDecoder<'_> {
    type Item = Result<Frame, DecodeError>;

    fn next(&mut self) -> Option<Self::Item> {
        self.next_frame().transpose()
    }
}

/// Frames recovered from a byte stream.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodedFrames {
    pub frames: Vec<Frame>,
    /// Set when the stream ended mid-field; a stop frame has been appended
    /// in place of the unreadable remainder.
    pub truncated: bool,
}

/// Decodes a whole byte stream.
///
/// A stream that ends mid-field yields whatever frames were complete plus a
/// trailing [`Frame::Stop`], with `truncated` set; this mirrors how the
/// engine treats the condition, so callers can hand either form onward.
#[must_use]
pub fn decode_frames(data: &[u8]) -> DecodedFrames {
    let mut decoder = FrameDecoder::new(data);
    let mut frames = Vec::new();
    let mut truncated = false;

    loop {
        match decoder.next_frame() {
            Ok(Some(frame)) => frames.push(frame),
            Ok(None) => break,
            Err(DecodeError::OutOfBits) => {
                truncated = true;
                frames.push(Frame::Stop);
                break;
            }
        }
    }

    DecodedFrames { frames, truncated }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloc::vec;

    #[test]
    fn stop_only_stream() {
        let decoded = decode_frames(&[0x0F]);
        assert_eq!(decoded.frames, vec![Frame::Stop]);
        assert!(!decoded.truncated);
    }

    #[test]
    fn silence_then_stop_share_one_byte() {
        // Low nibble silence, high nibble stop.
        let decoded = decode_frames(&[0xF0]);
        assert_eq!(decoded.frames, vec![Frame::Silence, Frame::Stop]);
        assert!(!decoded.truncated);
    }

    #[test]
    fn decoder_stops_at_the_first_stop_frame() {
        // Stop followed by trailing garbage that must never be read.
        let mut decoder = FrameDecoder::new(&[0x0F, 0xAB, 0xCD]);
        assert_eq!(decoder.next_frame(), Ok(Some(Frame::Stop)));
        assert_eq!(decoder.next_frame(), Ok(None));
        assert!(decoder.finished());
    }

    #[test]
    fn truncated_field_is_reported_once() {
        // Energy 4 then nothing: the repeat bit is unreadable.
        let mut decoder = FrameDecoder::new(&[0x04]);
        assert_eq!(decoder.next_frame(), Err(DecodeError::OutOfBits));
        assert_eq!(decoder.next_frame(), Ok(None));
    }

    #[test]
    fn truncation_policy_appends_a_stop() {
        let decoded = decode_frames(&[0x04]);
        assert_eq!(decoded.frames, vec![Frame::Stop]);
        assert!(decoded.truncated);
    }

    #[test]
    fn stream_end_between_frames_is_clean() {
        let decoded = decode_frames(&[0xF0, 0x0F]);
        // Silence then stop; the second byte is never reached.
        assert_eq!(decoded.frames.len(), 2);
        assert!(!decoded.truncated);

        let empty = decode_frames(&[]);
        assert!(empty.frames.is_empty());
        assert!(!empty.truncated);
    }

    #[test]
    fn repeat_frame_skips_coefficients() {
        // energy=2, repeat=1, pitch=5, then the stop nibble; LSB-first
        // packing yields bytes 0xB2, 0x78.
        let decoded = decode_frames(&[0xB2, 0x78]);
        assert_eq!(
            decoded.frames,
            vec![Frame::Repeat { energy: 2, pitch: 5 }, Frame::Stop]
        );
    }

    #[test]
    fn iterator_yields_through_the_stop_frame() {
        let frames: Vec<_> = FrameDecoder::new(&[0xF0]).collect();
        assert_eq!(frames, vec![Ok(Frame::Silence), Ok(Frame::Stop)]);
    }
}
