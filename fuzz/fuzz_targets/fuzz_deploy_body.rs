//! Fuzz target: JSON deserialization of the deployment request body.
//!
//! Verifies that arbitrary byte sequences fed to the JSON parser never cause
//! panics, UB, or unbounded resource consumption.

#![no_main]

use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    // Errors are expected and fine; panics are not.
    if let Ok(request) = serde_json::from_slice::<slipway_core::DeployRequest>(data) {
        // Validation over arbitrary decoded bodies must not panic either.
        let _ = slipway_core::validate_request(&request);
    }
});
