#![no_main]

use confound::dataset::Dataset;
use confound::loader::parse_records;
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    if let Ok(input) = std::str::from_utf8(data) {
        // Parsing and validation must reject bad input without panicking
        if let Ok(raw) = parse_records(input) {
            let _ = Dataset::from_raw(&raw);
        }
    }
});
