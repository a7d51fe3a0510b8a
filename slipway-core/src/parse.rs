//! Artifact extraction from toolchain output.
//!
//! Deployment tools announce results as free text on stdout. Each artifact
//! field is matched against an ordered pattern list; the first capture wins
//! and a stream with no match yields an absent field, never an empty string.
//! Pattern lists are versioned values, not inline literals, so a toolchain
//! release that changes its output format gets a new set without touching
//! the pipeline.

use indexmap::IndexMap;
use regex::Regex;
use serde::Serialize;

use crate::request::ChainVariant;

/// Label under which the main contract's artifact is reported.
pub const PRIMARY_LABEL: &str = "contract";

/// The address and transaction identifier recovered from one deployment.
///
/// `None` means the pattern list found nothing; callers must treat that as
/// "not found" and never substitute an empty string.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DeployedArtifact {
    /// Deployed contract address, if announced.
    pub address: Option<String>,
    /// Transaction identifier, if announced.
    pub transaction_hash: Option<String>,
}

/// Ordered patterns for a single artifact field.
///
/// Patterns are tried in priority order; each must carry exactly one capture
/// group holding the field value.
#[derive(Debug, Clone)]
struct FieldPatterns {
    patterns: Vec<Regex>,
}

impl FieldPatterns {
    #[expect(clippy::expect_used, reason = "pattern sources are fixed literals covered by tests")]
    fn new(sources: &[&str]) -> Self {
        Self {
            patterns: sources
                .iter()
                .map(|source| Regex::new(source).expect("artifact pattern compiles"))
                .collect(),
        }
    }

    fn first_match(&self, text: &str) -> Option<String> {
        self.patterns.iter().find_map(|pattern| {
            pattern
                .captures(text)
                .and_then(|captures| captures.get(1))
                .map(|capture| capture.as_str().to_owned())
        })
    }
}

/// Patterns for one labeled artifact: address and transaction hash lists.
#[derive(Debug, Clone)]
struct ArtifactPatterns {
    address: FieldPatterns,
    transaction_hash: FieldPatterns,
}

/// A versioned, labeled set of extraction patterns for one toolchain.
#[derive(Debug, Clone)]
pub struct PatternSet {
    version: &'static str,
    artifacts: IndexMap<String, ArtifactPatterns>,
}

impl PatternSet {
    /// Hardhat deploy-script output, as emitted by the generated
    /// `scripts/deploy.ts`.
    #[must_use]
    pub fn evm_v1() -> Self {
        let mut artifacts = IndexMap::new();
        artifacts.insert(
            PRIMARY_LABEL.to_owned(),
            ArtifactPatterns {
                address: FieldPatterns::new(&[
                    r"\w+ is deployed to: (0x[0-9a-fA-F]+)",
                    r"deployed to: (0x[0-9a-fA-F]+)",
                ]),
                transaction_hash: FieldPatterns::new(&[
                    r"Deployment transaction hash: (0x[0-9a-fA-F]+)",
                    r"(?i)transaction hash: (0x[0-9a-fA-F]+)",
                ]),
            },
        );
        Self { version: "evm-v1", artifacts }
    }

    /// Aptos CLI publish output. The CLI has shipped several formats; the
    /// bare 64-hex fallback is last on purpose.
    #[must_use]
    pub fn move_v1() -> Self {
        let mut artifacts = IndexMap::new();
        artifacts.insert(
            PRIMARY_LABEL.to_owned(),
            ArtifactPatterns {
                address: FieldPatterns::new(&[]),
                transaction_hash: FieldPatterns::new(&[
                    r"Transaction Hash: ([0-9a-fA-F]+)",
                    r#""hash":\s*"(?:0x)?([0-9a-fA-F]+)""#,
                    r"txn_hash:\s*([0-9a-fA-F]+)",
                    r"\b([0-9a-fA-F]{64})\b",
                ]),
            },
        );
        Self { version: "move-v1", artifacts }
    }

    /// The current pattern set for a chain variant.
    #[must_use]
    pub fn for_variant(variant: ChainVariant) -> Self {
        match variant {
            ChainVariant::Evm => Self::evm_v1(),
            ChainVariant::Move => Self::move_v1(),
        }
    }

    /// Version tag of this set, for logging.
    #[must_use]
    pub fn version(&self) -> &'static str {
        self.version
    }

    /// Extract every labeled artifact from `stdout`.
    ///
    /// Labels with no match still appear in the result with both fields
    /// absent, so callers can distinguish "parsed, nothing found" from
    /// "label unknown". The input is never mutated; extraction is
    /// idempotent.
    #[must_use]
    pub fn extract(&self, stdout: &str) -> IndexMap<String, DeployedArtifact> {
        self.artifacts
            .iter()
            .map(|(label, patterns)| {
                (
                    label.clone(),
                    DeployedArtifact {
                        address: patterns.address.first_match(stdout),
                        transaction_hash: patterns.transaction_hash.first_match(stdout),
                    },
                )
            })
            .collect()
    }

    /// The artifact for [`PRIMARY_LABEL`], or an empty artifact if this set
    /// has no such label.
    #[must_use]
    pub fn primary(&self, stdout: &str) -> DeployedArtifact {
        self.extract(stdout).shift_remove(PRIMARY_LABEL).unwrap_or_default()
    }
}
