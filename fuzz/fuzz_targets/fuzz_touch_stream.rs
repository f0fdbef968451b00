//! Fuzz target: `GestureRecognizer::feed`
//!
//! Decodes the input as a stream of 7-byte touch samples
//! (`x: u16, y: u16, pressed: u8, dt: u16`) and checks that:
//! - No panics under any sample order or timing
//! - A gesture only resolves on a release
//! - The recogniser is idle again after every release
//!
//! cargo fuzz run fuzz_touch_stream

#![no_main]

use agendalight::config::GestureConfig;
use agendalight::gesture::{GestureRecognizer, TouchSample};
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    let mut rec = GestureRecognizer::new(GestureConfig::default());
    let mut t = 0u64;

    for chunk in data.chunks_exact(7) {
        let x = u16::from_le_bytes([chunk[0], chunk[1]]);
        let y = u16::from_le_bytes([chunk[2], chunk[3]]);
        let pressed = chunk[4] & 1 == 1;
        t += u64::from(u16::from_le_bytes([chunk[5], chunk[6]]));

        let sample = if pressed {
            TouchSample::press(x, y, t)
        } else {
            TouchSample::release(x, y, t)
        };
        let gesture = rec.feed(sample);

        if pressed {
            assert!(gesture.is_none(), "gesture resolved on a press");
        } else {
            assert!(!rec.is_tracking(), "still tracking after release");
        }
    }
});
