//! Deployment request model and credential handling.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Number of leading characters shown when a credential is rendered.
const REDACTED_PREFIX_LEN: usize = 10;

/// Target chain variant for a deployment, selected by the request path.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChainVariant {
    /// Solidity contract published through the Hardhat toolchain.
    Evm,
    /// Move package published through the Aptos CLI.
    Move,
}

impl ChainVariant {
    /// Parse a request path segment. Returns `None` for unknown names.
    #[must_use]
    pub fn parse(segment: &str) -> Option<Self> {
        match segment {
            "evm" => Some(Self::Evm),
            "move" => Some(Self::Move),
            _ => None,
        }
    }

    /// Lowercase name used in workspace prefixes and log fields.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Evm => "evm",
            Self::Move => "move",
        }
    }

    /// Human-readable language name for response messages.
    #[must_use]
    pub fn display_name(self) -> &'static str {
        match self {
            Self::Evm => "Solidity",
            Self::Move => "Move",
        }
    }
}

impl fmt::Display for ChainVariant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Private-key material supplied with a deployment request.
///
/// The raw value is unreachable through `Debug` and `Display`; both render a
/// fixed-length prefix followed by `...`. Call [`Credential::expose`] only at
/// the point where the value is handed to the toolchain environment. There
/// is no `Serialize` implementation; the value cannot appear in a response
/// body.
#[derive(Clone, PartialEq, Eq, Deserialize)]
#[serde(transparent)]
pub struct Credential(String);

impl Credential {
    /// Wrap raw key material.
    pub fn new(raw: impl Into<String>) -> Self {
        Self(raw.into())
    }

    /// The raw secret. The returned value must not be logged or echoed.
    #[must_use]
    pub fn expose(&self) -> &str {
        &self.0
    }

    /// Redacted form safe for logs: the first few characters plus `...`.
    #[must_use]
    pub fn redacted(&self) -> String {
        let prefix: String = self.0.chars().take(REDACTED_PREFIX_LEN).collect();
        format!("{prefix}...")
    }

    /// Replace every occurrence of the secret in `text` with `[REDACTED]`.
    ///
    /// Used to scrub captured toolchain output before it is attached to an
    /// error response.
    #[must_use]
    pub fn scrub(&self, text: &str) -> String {
        if self.0.is_empty() {
            return text.to_owned();
        }
        text.replace(&self.0, "[REDACTED]")
    }
}

impl fmt::Debug for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Credential({})", self.redacted())
    }
}

impl fmt::Display for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.redacted())
    }
}

/// A single deployment request, as decoded from the HTTP body.
///
/// Never persisted; dropped at the end of the request that created it.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeployRequest {
    /// Submitted contract or module source, written verbatim into the workspace.
    pub code: String,
    /// Signing key material for the publish step.
    pub credential: Credential,
    /// On-chain account address. Required by the Move toolchain manifest.
    #[serde(default)]
    pub target_address: Option<String>,
    /// Constructor arguments forwarded to the deploy script.
    #[serde(default)]
    pub constructor_args: Vec<String>,
}
