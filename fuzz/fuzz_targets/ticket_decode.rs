//! Fuzz target for ticket decoding.
//!
//! This fuzzer feeds arbitrary byte sequences to the ticket decoder,
//! checking for panics, crashes, or hangs.

#![no_main]

use flightshelf::catalog::decode;
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    if data.len() > 64 * 1024 {
        return;
    }

    let _ = decode(data);
});
