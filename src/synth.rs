//! The synthesis engine: parameter interpolation, excitation, lattice.
//!
//! The engine nests three time scales: samples (8 kHz), interpolation
//! sub-periods (25 samples) and frames (8 sub-periods).  At each sub-period
//! boundary the working parameters move toward their targets by a
//! table-driven arithmetic shift; at each frame boundary the targets are
//! promoted and the next frame is pulled from the source.  Everything else
//! is one excitation sample through the lattice per output sample.

use alloc::vec::Vec;
use bitflags::bitflags;
use log::{debug, trace};

use crate::decoder::FrameDecoder;
use crate::excitation::{chirp_sample, NoiseSource, UNVOICED_AMPLITUDE};
use crate::frame::{Frame, SpeechParams};
use crate::lattice::LatticeFilter;
use crate::tables::{INTERP_PERIODS_PER_FRAME, INTERP_SHIFTS, SAMPLES_PER_INTERP_PERIOD};

/// Default safety cap for [`Synthesizer::render`]: 30 s at 8 kHz.
pub const RENDER_SAMPLE_CAP: usize = 240_000;

bitflags! {
    /// Observable chip status word.
    ///
    /// `TALK` mirrors the speaking state.  The buffer flags describe the
    /// unread remainder of the borrowed bitstream against the chip's
    /// 16-byte FIFO window: `BUFFER_LOW` at half the window or less,
    /// `BUFFER_EMPTY` at zero.  They are informational for hosts emulating
    /// the external-speech handshake; the engine itself never consults
    /// them.
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct Status: u8 {
        const TALK = 1;
        const BUFFER_LOW = 1 << 1;
        const BUFFER_EMPTY = 1 << 2;
    }
}

/// Outcome of a render call.
///
/// Abnormal conditions ride alongside the samples instead of replacing
/// them: a capped or truncated stream still yields every sample produced up
/// to that point.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Rendered {
    pub samples: Vec<i16>,
    /// The sample cap was hit while the engine was still speaking.
    pub overlong: bool,
    /// The bitstream ended mid-field; synthesis stopped at that point.
    pub malformed: bool,
}

/// Where the engine pulls its frames from.
#[derive(Debug)]
enum Source<'a> {
    Stream(FrameDecoder<'a>),
    Frames {
        iter: core::slice::Iter<'a, Frame>,
        decay_queued: bool,
    },
    Params {
        iter: core::slice::Iter<'a, SpeechParams>,
        decay_queued: bool,
    },
}

/// What a frame pull produced.
enum Pulled {
    Frame(Frame),
    Params(SpeechParams),
    /// Frame list exhausted: one frame of decay toward silence.
    Decay,
    Exhausted,
    Malformed,
}

/// TMS5220 synthesis engine.
///
/// Owns a fixed-size state block and borrows its input for the duration of
/// a load; the per-sample path never allocates.  One engine serves one
/// stream at a time and [`Synthesizer::reset`] restores it bit for bit to
/// its constructor state.
#[derive(Debug)]
pub struct Synthesizer<'a> {
    current: SpeechParams,
    target: SpeechParams,
    /// Interpolation sub-period within the frame, 0..8.
    interp_period: usize,
    /// Sample within the sub-period, 0..25.
    sample_in_period: usize,
    /// Position within the current pitch period.
    pitch_cursor: i32,
    noise: NoiseSource,
    lattice: LatticeFilter,
    source: Option<Source<'a>>,
    speaking: bool,
    malformed: bool,
}

impl<'a> Synthesizer<'a> {
    #[must_use]
    pub const fn new() -> Self {
        Self {
            current: SpeechParams {
                energy: 0,
                pitch: 0,
                k: [0; 10],
            },
            target: SpeechParams {
                energy: 0,
                pitch: 0,
                k: [0; 10],
            },
            interp_period: 0,
            sample_in_period: 0,
            pitch_cursor: 0,
            noise: NoiseSource::new(),
            lattice: LatticeFilter::new(),
            source: None,
            speaking: false,
            malformed: false,
        }
    }

    /// Restores the constructor state, dropping any loaded stream.
    pub fn reset(&mut self) {
        *self = Self::new();
    }

    /// Buffers a byte stream and reads its first frame.
    ///
    /// The first frame's parameters become the targets while the working
    /// parameters stay zero, so the opening frame ramps up from silence.
    pub fn load(&mut self, stream: &'a [u8]) {
        self.reset();
        self.source = Some(Source::Stream(FrameDecoder::new(stream)));
        self.speaking = true;
        self.pull_next_frame();
    }

    /// Produces one PCM sample, or 0 when not speaking.
    pub fn step(&mut self) -> i16 {
        if !self.speaking {
            return 0;
        }
        if self.sample_in_period == 0 {
            self.interpolate();
        }

        // The noise register is clocked every sample; its value is only
        // read for unvoiced excitation.
        let noise = self.noise.clock();
        let excitation = if self.current.pitch > 0 {
            chirp_sample(self.pitch_cursor)
        } else {
            noise * UNVOICED_AMPLITUDE
        };
        let driven = (excitation * self.current.energy) as f32;
        let filtered = self.lattice.filter(driven, &self.current.k);
        let sample = (filtered * 4).clamp(i32::from(i16::MIN), i32::from(i16::MAX)) as i16;

        self.advance();
        sample
    }

    /// Renders a byte stream to completion, capped at
    /// [`RENDER_SAMPLE_CAP`] samples.
    pub fn render(&mut self, stream: &'a [u8]) -> Rendered {
        self.render_with_limit(stream, RENDER_SAMPLE_CAP)
    }

    /// Renders a byte stream with a caller-chosen safety cap.
    pub fn render_with_limit(&mut self, stream: &'a [u8], limit: usize) -> Rendered {
        self.load(stream);
        self.run(limit)
    }

    /// Renders a pre-decoded frame sequence, bypassing the bit decoder.
    ///
    /// After the last frame the engine appends one frame of decay toward
    /// silence, unless the list ends in an explicit [`Frame::Stop`].
    pub fn render_frames(&mut self, frames: &'a [Frame]) -> Rendered {
        self.reset();
        if frames.is_empty() {
            return self.run(RENDER_SAMPLE_CAP);
        }
        self.source = Some(Source::Frames {
            iter: frames.iter(),
            decay_queued: false,
        });
        self.speaking = true;
        self.pull_next_frame();
        self.run(RENDER_SAMPLE_CAP)
    }

    /// Renders direct synthesis parameters, one set per frame.
    ///
    /// Out-of-range values are clamped onto the valid ranges with a
    /// warning, never rejected.  Decay handling matches
    /// [`Synthesizer::render_frames`].
    pub fn render_params(&mut self, params: &'a [SpeechParams]) -> Rendered {
        self.reset();
        if params.is_empty() {
            return self.run(RENDER_SAMPLE_CAP);
        }
        self.source = Some(Source::Params {
            iter: params.iter(),
            decay_queued: false,
        });
        self.speaking = true;
        self.pull_next_frame();
        self.run(RENDER_SAMPLE_CAP)
    }

    /// Whether the engine is producing speech.
    #[must_use]
    pub const fn is_speaking(&self) -> bool {
        self.speaking
    }

    /// The bitstream ended mid-field during the current or last stream.
    #[must_use]
    pub const fn is_malformed(&self) -> bool {
        self.malformed
    }

    /// Observable status word (TS/BL/BE).
    #[must_use]
    pub fn status(&self) -> Status {
        let mut status = Status::empty();
        if self.speaking {
            status |= Status::TALK;
        }
        let remaining = match &self.source {
            Some(Source::Stream(decoder)) => decoder.bytes_remaining(),
            _ => 0,
        };
        if remaining <= crate::tables::FIFO_WINDOW_BYTES / 2 {
            status |= Status::BUFFER_LOW;
        }
        if remaining == 0 {
            status |= Status::BUFFER_EMPTY;
        }
        status
    }

    fn run(&mut self, limit: usize) -> Rendered {
        let mut samples = Vec::new();
        while self.speaking && samples.len() < limit {
            samples.push(self.step());
        }
        let overlong = self.speaking;
        if overlong {
            debug!("sample cap {limit} hit while still speaking");
        }
        Rendered {
            samples,
            overlong,
            malformed: self.malformed,
        }
    }

    /// Moves the working parameters one interpolation step toward their
    /// targets.
    ///
    /// The divisor table is visited in the chip's interpolation-period
    /// order 1, 2, ..., 7, 0, so the snap entry lands on the final
    /// sub-period of the frame and every frame converges onto its targets
    /// exactly before the next one is parsed.
    fn interpolate(&mut self) {
        let shift = INTERP_SHIFTS[(self.interp_period + 1) % INTERP_PERIODS_PER_FRAME];
        if shift == 0 {
            self.current = self.target;
            return;
        }
        // Arithmetic right shift: negative differences round toward
        // negative infinity, as on the chip.
        self.current.energy += (self.target.energy - self.current.energy) >> shift;
        self.current.pitch += (self.target.pitch - self.current.pitch) >> shift;
        for (current, target) in self.current.k.iter_mut().zip(self.target.k.iter()) {
            *current += (*target - *current) >> shift;
        }
    }

    fn advance(&mut self) {
        self.pitch_cursor += 1;
        if self.current.pitch <= 0 || self.pitch_cursor >= self.current.pitch {
            self.pitch_cursor = 0;
        }

        self.sample_in_period += 1;
        if self.sample_in_period < SAMPLES_PER_INTERP_PERIOD {
            return;
        }
        self.sample_in_period = 0;
        self.interp_period += 1;
        if self.interp_period < INTERP_PERIODS_PER_FRAME {
            return;
        }
        self.interp_period = 0;
        self.current = self.target;
        self.pull_next_frame();
    }

    fn pull_next_frame(&mut self) {
        match self.pull_next() {
            Pulled::Frame(frame) => self.apply_frame(&frame),
            Pulled::Params(params) => {
                trace!("params pulled: {params:?}");
                self.target = params.clamped();
            }
            Pulled::Decay => {
                trace!("frame list exhausted, decaying to silence");
                self.target = SpeechParams::default();
            }
            Pulled::Exhausted => {
                trace!("source exhausted, speech ends");
                self.speaking = false;
            }
            Pulled::Malformed => {
                debug!("bitstream ended mid-field, speech ends");
                self.malformed = true;
                self.speaking = false;
            }
        }
    }

    fn pull_next(&mut self) -> Pulled {
        match self.source.as_mut() {
            None => Pulled::Exhausted,
            Some(Source::Stream(decoder)) => match decoder.next_frame() {
                Ok(Some(frame)) => Pulled::Frame(frame),
                Ok(None) => Pulled::Exhausted,
                Err(_) => Pulled::Malformed,
            },
            Some(Source::Frames { iter, decay_queued }) => match iter.next() {
                Some(frame) => Pulled::Frame(*frame),
                None if !*decay_queued => {
                    *decay_queued = true;
                    Pulled::Decay
                }
                None => Pulled::Exhausted,
            },
            Some(Source::Params { iter, decay_queued }) => match iter.next() {
                Some(params) => Pulled::Params(*params),
                None if !*decay_queued => {
                    *decay_queued = true;
                    Pulled::Decay
                }
                None => Pulled::Exhausted,
            },
        }
    }

    fn apply_frame(&mut self, frame: &Frame) {
        trace!("frame pulled: {frame:?}");
        match frame {
            Frame::Stop => {
                self.speaking = false;
            }
            Frame::Silence => {
                self.target = SpeechParams::default();
            }
            Frame::Repeat { .. } => {
                // Coefficient targets carry over from the previous frame.
                self.target.energy = frame.energy_value();
                self.target.pitch = frame.pitch_value().unwrap_or(0);
            }
            Frame::Voiced { .. } | Frame::Unvoiced { .. } => {
                self.target.energy = frame.energy_value();
                self.target.pitch = frame.pitch_value().unwrap_or(0);
                self.target.k = frame.k_values();
            }
        }
    }
}

impl Default for Synthesizer<'_> {
    fn default() -> Self {
        Self::new()
    }
}

/// Linear fade over the tail of a rendered buffer.
///
/// The engine cuts to silence at a stop frame; hosts that want to suppress
/// the resulting click can fade the last few samples (100 or fewer is
/// plenty at 8 kHz) before playback.
pub fn fade_out_tail(samples: &mut [i16], length: usize) {
    let length = length.min(samples.len());
    if length == 0 {
        return;
    }
    let start = samples.len() - length;
    for (step, sample) in samples[start..].iter_mut().enumerate() {
        let remaining = (length - step - 1) as i32;
        *sample = (i32::from(*sample) * remaining / length as i32) as i16;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn idle_engine_emits_zeros() {
        let mut synth = Synthesizer::new();
        assert!(!synth.is_speaking());
        assert_eq!(synth.step(), 0);
        assert_eq!(synth.step(), 0);
    }

    #[test]
    fn stop_only_stream_never_speaks() {
        let mut synth = Synthesizer::new();
        let rendered = synth.render(&[0x0F]);
        assert!(rendered.samples.is_empty());
        assert!(!rendered.overlong);
        assert!(!rendered.malformed);
        assert!(!synth.is_speaking());
    }

    #[test]
    fn silence_frame_renders_200_zero_samples() {
        let mut synth = Synthesizer::new();
        let rendered = synth.render(&[0xF0]);
        assert_eq!(rendered.samples.len(), 200);
        assert!(rendered.samples.iter().all(|&sample| sample == 0));
    }

    #[test]
    fn truncated_stream_is_flagged_and_stops() {
        let mut synth = Synthesizer::new();
        let rendered = synth.render(&[0x04]);
        assert!(rendered.malformed);
        assert!(rendered.samples.is_empty());
        assert!(!synth.is_speaking());
    }

    #[test]
    fn status_reflects_talk_and_buffer_levels() {
        let mut synth = Synthesizer::new();
        assert_eq!(synth.status(), Status::BUFFER_LOW | Status::BUFFER_EMPTY);

        // 20 bytes: one silence+stop byte followed by padding the decoder
        // never reads, enough to clear the low-water mark after load.
        let mut stream = [0u8; 20];
        stream[0] = 0xF0;
        synth.load(&stream);
        let status = synth.status();
        assert!(status.contains(Status::TALK));
        assert!(!status.contains(Status::BUFFER_LOW));
        assert!(!status.contains(Status::BUFFER_EMPTY));
    }

    #[test]
    fn reset_restores_constructor_behaviour() {
        let frames = [Frame::Unvoiced {
            energy: 9,
            k: [20, 12, 9, 7],
        }];
        let mut used = Synthesizer::new();
        let first = used.render_frames(&frames);
        used.reset();
        let second = used.render_frames(&frames);
        assert_eq!(first, second);

        let mut fresh = Synthesizer::new();
        assert_eq!(fresh.render_frames(&frames), first);
    }

    #[test]
    fn empty_frame_list_renders_nothing() {
        let mut synth = Synthesizer::new();
        let rendered = synth.render_frames(&[]);
        assert!(rendered.samples.is_empty());
        assert!(!rendered.overlong);
    }

    #[test]
    fn fade_out_tail_ends_at_zero() {
        let mut samples = [1000i16; 10];
        fade_out_tail(&mut samples, 4);
        assert_eq!(&samples[..6], &[1000; 6]);
        assert_eq!(samples[9], 0);
        assert!(samples[6] > samples[7] && samples[7] > samples[8]);

        let mut short = [500i16; 2];
        fade_out_tail(&mut short, 100);
        assert_eq!(short[1], 0);
    }
}
