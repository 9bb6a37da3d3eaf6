#![no_main]

use libfuzzer_sys::fuzz_target;
use skelgen::{format_source, parse};

fuzz_target!(|data: &[u8]| {
    let s = String::from_utf8_lossy(data);

    if let Ok(method) = parse(&s) {
        assert!(!method.receiver_type().is_empty());
        assert!(!method.name().is_empty());
        assert!(method.returns().iter().all(|r| !r.is_empty()));
    }

    // Either formats or reports an error; never panics.
    let _ = format_source(data);
});
