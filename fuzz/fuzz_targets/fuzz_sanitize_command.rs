//! Fuzz target: the command sanitizer over arbitrary tokens.
//!
//! The deny-list/allow-list checks must never panic, and a deny-listed
//! character in any token must never survive sanitization.

#![no_main]

use libfuzzer_sys::fuzz_target;
use slipway_executor::{sanitize, CommandSpec, StepName, DENIED_CHARACTERS};

fuzz_target!(|data: &[u8]| {
    if let Ok(text) = std::str::from_utf8(data) {
        let mut tokens = text.split_whitespace();
        let program = tokens.next().unwrap_or("npm");
        let args: Vec<&str> = tokens.collect();
        let spec = CommandSpec::new(StepName::Compile, program, args.iter().copied());

        if sanitize(&spec).is_ok() {
            let clean = std::iter::once(spec.program.as_str())
                .chain(spec.args.iter().map(String::as_str))
                .all(|token| !token.contains(DENIED_CHARACTERS));
            assert!(clean, "sanitizer passed a deny-listed character");
        }
    }
});
