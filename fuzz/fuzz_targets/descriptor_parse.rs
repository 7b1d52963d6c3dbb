//! Fuzz target for Flight descriptor interpretation.
//!
//! The input is split on NUL bytes into path segments and also used whole
//! as a command payload.

#![no_main]

use arrow_flight::FlightDescriptor;
use flightshelf::catalog::DatasetDescriptor;
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    if data.len() > 64 * 1024 {
        return;
    }

    let segments: Vec<String> = data
        .split(|byte| *byte == 0)
        .map(|segment| String::from_utf8_lossy(segment).into_owned())
        .collect();
    let _ = DatasetDescriptor::try_from(&FlightDescriptor::new_path(segments));
    let _ = DatasetDescriptor::try_from(&FlightDescriptor::new_cmd(data.to_vec()));
});
