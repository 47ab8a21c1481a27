//! Emulation of the TMS5220 speech synthesizer's LPC core.
//!
//! Two pure surfaces: a frame codec (`decode_frames` / `encode_frames`)
//! between packed byte streams and typed LPC frames, and a synthesis engine
//! ([`Synthesizer`]) that turns frames into 8 kHz mono 16-bit PCM with the
//! chip's coefficient ROM, chirp excitation, noise register and ten-stage
//! lattice filter.  All I/O stays with the caller: byte buffers in, sample
//! buffers out.

#![no_std]

extern crate alloc;

pub mod bitstream;
pub mod decoder;
pub mod encoder;
pub mod excitation;
pub mod frame;
pub mod lattice;
pub mod synth;
pub mod tables;

pub use decoder::{decode_frames, DecodeError, DecodedFrames, FrameDecoder};
pub use encoder::encode_frames;
pub use frame::{Frame, SpeechParams};
pub use synth::{fade_out_tail, Rendered, Status, Synthesizer, RENDER_SAMPLE_CAP};
