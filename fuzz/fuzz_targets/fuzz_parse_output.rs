//! Fuzz target: artifact extraction from arbitrary toolchain output.
//!
//! The pattern sets must never panic, whatever bytes the toolchain emits.

#![no_main]

use libfuzzer_sys::fuzz_target;
use slipway_core::PatternSet;

fuzz_target!(|data: &[u8]| {
    if let Ok(stdout) = std::str::from_utf8(data) {
        let evm = PatternSet::evm_v1().primary(stdout);
        // Absent means absent: extraction never produces empty strings.
        assert_ne!(evm.address.as_deref(), Some(""));
        assert_ne!(evm.transaction_hash.as_deref(), Some(""));

        let _ = PatternSet::move_v1().extract(stdout);
    }
});
