//! Fuzz target for search.json configuration parsing.
//!
//! Parsing and validation must reject malformed input with an error,
//! never a panic.

#![no_main]

use bop2_config::SearchConfig;
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    if let Ok(text) = std::str::from_utf8(data) {
        if let Ok(config) = SearchConfig::from_json_str(text) {
            // Validated configs must round-trip through serde_json.
            let _ = serde_json::to_string(&config);
            let _ = config.grid.point_count();
        }
    }
});
