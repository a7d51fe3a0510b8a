//! Error types for the core crate.

/// Reasons a deployment request is rejected before reaching the pipeline.
///
/// Checks run in a fixed order and the first violation wins, so a request
/// with several problems always reports the same one.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[non_exhaustive]
pub enum ValidationError {
    /// No source code was submitted.
    #[error("contract code is required")]
    CodeMissing,

    /// The source exceeds the accepted length.
    #[error("code too long: maximum {limit} characters allowed")]
    CodeTooLong { limit: usize },

    /// The credential is not 64 hex characters with an optional 0x prefix.
    #[error("invalid credential format: must be 64 hex characters, with or without 0x prefix")]
    InvalidCredential,

    /// The supplied target address is not a 0x-prefixed 40-hex string.
    #[error("invalid target address format: must be 0x followed by 40 hex characters")]
    InvalidAddress,

    /// The declared contract or module name violates the identifier grammar
    /// or exceeds the length limit.
    #[error("invalid contract name '{name}': must start with a letter or underscore, contain only alphanumerics and underscores, and stay within the length limit")]
    InvalidIdentifier { name: String },
}
