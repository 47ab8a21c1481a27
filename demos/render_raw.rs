//! Renders a short canned phrase-like sequence to raw PCM on stdout.
//!
//! Pipe into a player expecting signed 16-bit little-endian mono at 8 kHz:
//!
//! ```sh
//! cargo run --example render_raw | aplay -f S16_LE -r 8000 -c 1
//! ```

use std::io::Write;

use omilia::{encode_frames, fade_out_tail, Frame, Synthesizer};

fn main() -> std::io::Result<()> {
    let frames = [
        Frame::Voiced {
            energy: 10,
            pitch: 32,
            k: [18, 14, 9, 7, 8, 7, 8, 4, 4, 3],
        },
        Frame::Voiced {
            energy: 12,
            pitch: 30,
            k: [20, 12, 10, 8, 7, 8, 7, 3, 4, 4],
        },
        Frame::Repeat {
            energy: 11,
            pitch: 28,
        },
        Frame::Unvoiced {
            energy: 8,
            k: [24, 10, 8, 6],
        },
        Frame::Silence,
        Frame::Stop,
    ];

    let bitstream = encode_frames(&frames);
    eprintln!("bitstream: {} bytes", bitstream.len());

    let mut synth = Synthesizer::new();
    let mut rendered = synth.render(&bitstream);
    fade_out_tail(&mut rendered.samples, 80);
    eprintln!("rendered: {} samples", rendered.samples.len());

    let stdout = std::io::stdout();
    let mut out = stdout.lock();
    for sample in &rendered.samples {
        out.write_all(&sample.to_le_bytes())?;
    }
    Ok(())
}
