#![no_main]

use libfuzzer_sys::fuzz_target;
use omilia::{decode_frames, encode_frames, Synthesizer};

const MAX_STREAM: usize = 512;
const SAMPLE_LIMIT: usize = 48_000;

fuzz_target!(|data: &[u8]| {
    if data.len() > MAX_STREAM {
        return;
    }

    // Frame decoding must terminate on anything, and the truncation policy
    // guarantees the result ends in a stop frame.
    let decoded = decode_frames(data);
    if let Some(last) = decoded.frames.last() {
        assert!(last.is_terminal() || !decoded.truncated);
    }

    // Whatever decoded must survive the encoder, modulo the terminal stop
    // the encoder appends to an unterminated list.
    let reencoded = encode_frames(&decoded.frames);
    let again = decode_frames(&reencoded);
    let mut expected = decoded.frames.clone();
    if !expected.last().is_some_and(|frame| frame.is_terminal()) {
        expected.push(omilia::Frame::Stop);
    }
    assert_eq!(again.frames, expected);

    // Synthesis over arbitrary bytes stays within the sample cap and never
    // panics.
    let mut synth = Synthesizer::new();
    let rendered = synth.render_with_limit(data, SAMPLE_LIMIT);
    assert!(rendered.samples.len() <= SAMPLE_LIMIT);
});
