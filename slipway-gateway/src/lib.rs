//! HTTP API gateway for the Slipway contract deployment service.
//!
//! Exposes the deployment endpoint, applies request validation and
//! per-client rate limiting, and maps pipeline errors onto HTTP statuses.

#![warn(clippy::pedantic)]
#![deny(clippy::unwrap_used)]

pub mod error;
pub mod limiter;
pub mod routes;
