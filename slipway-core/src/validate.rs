//! Request validation.
//!
//! Pure and side-effect-free; runs before any filesystem or process work.
//! Checks are ordered: code shape, credential format, target address,
//! declared identifier. The first failure is reported and the rest are
//! skipped, which keeps rejection reasons deterministic.

use once_cell::sync::Lazy;
use regex::Regex;

use crate::error::ValidationError;
use crate::request::DeployRequest;

/// Maximum accepted source length, in characters.
pub const MAX_CODE_LENGTH: usize = 50_000;

/// Maximum accepted length for a declared contract or module name.
pub const MAX_IDENTIFIER_LENGTH: usize = 50;

#[expect(clippy::expect_used, reason = "patterns are fixed literals covered by tests")]
static CREDENTIAL_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(0x)?[0-9a-fA-F]{64}$").expect("credential pattern compiles"));

#[expect(clippy::expect_used, reason = "patterns are fixed literals covered by tests")]
static ADDRESS_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^0x[0-9a-fA-F]{40}$").expect("address pattern compiles"));

#[expect(clippy::expect_used, reason = "patterns are fixed literals covered by tests")]
static IDENTIFIER_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[a-zA-Z_][a-zA-Z0-9_]*$").expect("identifier pattern compiles"));

#[expect(clippy::expect_used, reason = "patterns are fixed literals covered by tests")]
static CONTRACT_DECL_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"contract\s+(\w+)").expect("contract declaration pattern compiles"));

#[expect(clippy::expect_used, reason = "patterns are fixed literals covered by tests")]
static MODULE_DECL_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"module\s+(?:\w+::)?(\w+)").expect("module declaration pattern compiles"));

/// The first contract or module name declared in `code`, if any.
///
/// Solidity `contract Name` is tried before Move `module addr::name`; the
/// scaffold uses the same lookup to pick source file and factory names.
#[must_use]
pub fn declared_identifier(code: &str) -> Option<&str> {
    CONTRACT_DECL_RE
        .captures(code)
        .or_else(|| MODULE_DECL_RE.captures(code))
        .and_then(|captures| captures.get(1))
        .map(|m| m.as_str())
}

/// Validate a deployment request against the fixed check order.
///
/// # Errors
/// Returns the first [`ValidationError`] encountered, in check order:
/// missing/oversized code, malformed credential, malformed target address,
/// malformed declared identifier.
pub fn validate_request(request: &DeployRequest) -> Result<(), ValidationError> {
    if request.code.is_empty() {
        return Err(ValidationError::CodeMissing);
    }
    if request.code.chars().count() > MAX_CODE_LENGTH {
        return Err(ValidationError::CodeTooLong { limit: MAX_CODE_LENGTH });
    }

    if !CREDENTIAL_RE.is_match(request.credential.expose()) {
        return Err(ValidationError::InvalidCredential);
    }

    if let Some(address) = request.target_address.as_deref() {
        if !ADDRESS_RE.is_match(address) {
            return Err(ValidationError::InvalidAddress);
        }
    }

    if let Some(name) = declared_identifier(&request.code) {
        if name.chars().count() > MAX_IDENTIFIER_LENGTH || !IDENTIFIER_RE.is_match(name) {
            return Err(ValidationError::InvalidIdentifier { name: name.to_owned() });
        }
    }

    Ok(())
}
