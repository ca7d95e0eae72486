#![no_main]

use libfuzzer_sys::fuzz_target;
use tokio_formdata::decode;

fuzz_target!(|data: &[u8]| {
    // Malformed input must only ever produce an error, never a panic or a hang.
    if let Ok(form) = decode(data, "multipart/form-data; boundary=boundary") {
        for (_, field) in &form {
            if let Some(file) = field.as_file() {
                assert!(!file.mime_type.is_empty());
            }
        }
    }
});
