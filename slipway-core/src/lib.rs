//! Core domain types for the Slipway contract deployment service.
//!
//! Defines the deployment request model, credential redaction, request
//! validation, and artifact extraction from toolchain output. Everything in
//! this crate is pure: no I/O, no process interaction, no shared state.

#![warn(clippy::pedantic)]
#![deny(clippy::unwrap_used)]

pub mod error;
pub mod parse;
pub mod request;
pub mod validate;

pub use error::ValidationError;
pub use parse::{DeployedArtifact, PatternSet, PRIMARY_LABEL};
pub use request::{ChainVariant, Credential, DeployRequest};
pub use validate::{declared_identifier, validate_request, MAX_CODE_LENGTH, MAX_IDENTIFIER_LENGTH};
