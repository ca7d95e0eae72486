#![no_main]

use libfuzzer_sys::fuzz_target;
use tokio_formdata::boundary_from_content_type;

fuzz_target!(|data: &[u8]| {
    if let Ok(s) = std::str::from_utf8(data) {
        if let Ok(boundary) = boundary_from_content_type(s) {
            assert!(!boundary.token().is_empty());
        }
    }
});
