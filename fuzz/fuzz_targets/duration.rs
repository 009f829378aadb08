#![no_main]
use libfuzzer_sys::fuzz_target;
use oxsdate::DurationValue;
use std::str::FromStr;

fuzz_target!(|data: &str| {
    if let Ok(value) = DurationValue::from_str(data) {
        assert_eq!(DurationValue::from_str(&value.to_string()).unwrap(), value);
        if let Ok(normalized) = value.normalized() {
            assert!(normalized.is_valid());
        }
    }
});
