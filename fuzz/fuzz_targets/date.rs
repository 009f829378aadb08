#![no_main]
use libfuzzer_sys::fuzz_target;
use oxsdate::DateValue;
use std::str::FromStr;

fuzz_target!(|data: &str| {
    if let Ok(value) = DateValue::from_str(data) {
        let natural = DateValue::from_str(&value.to_string()).unwrap();
        assert_eq!(natural, value);
        let canonical = DateValue::from_str(value.canonical_string()).unwrap();
        assert_eq!(canonical, value);
        assert_eq!(canonical.canonical_string(), value.canonical_string());
    }
});
