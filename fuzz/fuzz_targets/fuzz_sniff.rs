#![no_main]

use libfuzzer_sys::fuzz_target;
use tokio_formdata::sniff;

fuzz_target!(|data: &[u8]| {
    let first = sniff(data).ok();
    assert_eq!(first, sniff(data).ok());
});
