//! Error types for existence proof operations.

use crate::webapi::ProofStatus;
use thiserror::Error;

/// Result type alias for existproof operations.
pub type Result<T> = std::result::Result<T, ProofError>;

/// Main error type for existproof operations.
#[derive(Error, Debug)]
pub enum ProofError {
    /// Invalid root data, timestamp or arguments supplied by the caller
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Structural violation in a proof document
    #[error("Malformed proof: {0}")]
    Malformed(#[from] MalformedProof),

    /// The proof is well formed but attests nothing about the supplied data
    #[error("Proof does not apply: no reference depends on the supplied data")]
    DoesNotApply,

    /// Serialization/deserialization errors
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// I/O errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Input validation errors (request schema, size limits)
    #[error("Validation error: {0}")]
    Validation(String),

    /// HTTP transport failures or unexpected status codes
    #[error("Transport error: {0}")]
    Transport(String),

    /// Structured error returned by the remote service
    #[error("Remote error: {0}")]
    Remote(String),

    /// The item exists remotely but no proof can be produced yet
    #[error("Not yet provable, status {0}")]
    NotYetProvable(ProofStatus),

    /// Configuration errors
    #[error("Configuration error: {0}")]
    Config(String),
}

/// Structural violations detected while validating a proof document.
///
/// Positions (`operation`, `reference`, `literal`) are zero-based offsets into
/// the corresponding document array; `index` is the raw signed index found in
/// the document.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum MalformedProof {
    #[error("proof contains no literal data")]
    NoLiteralData,

    #[error("literal data number {literal} is empty")]
    EmptyLiteral { literal: usize },

    #[error("proof contains no references")]
    NoReferences,

    #[error("operation {operation} uses unknown type '{name}'")]
    UnknownOperation { operation: usize, name: String },

    #[error("operation {operation} has no input")]
    EmptyOperationInput { operation: usize },

    #[error("operation {operation} refers to data {index} which is not yet produced")]
    DanglingReference { operation: usize, index: i64 },

    #[error("reference {reference} has an empty locator")]
    EmptyLocator { reference: usize },

    #[error("reference {reference} targets {index}, which is not a computed output")]
    InvalidReferenceTarget { reference: usize, index: i64 },
}

impl ProofError {
    /// Creates a new invalid input error.
    pub fn invalid_input<T: ToString>(msg: T) -> Self {
        Self::InvalidInput(msg.to_string())
    }

    /// Creates a new serialization error.
    pub fn serialization<T: ToString>(msg: T) -> Self {
        Self::Serialization(msg.to_string())
    }

    /// Creates a new validation error.
    pub fn validation<T: ToString>(msg: T) -> Self {
        Self::Validation(msg.to_string())
    }

    /// Creates a new transport error.
    pub fn transport<T: ToString>(msg: T) -> Self {
        Self::Transport(msg.to_string())
    }

    /// Creates a new remote error.
    pub fn remote<T: ToString>(msg: T) -> Self {
        Self::Remote(msg.to_string())
    }

    /// Creates a new configuration error.
    pub fn config<T: ToString>(msg: T) -> Self {
        Self::Config(msg.to_string())
    }

    /// Returns the structural violation if this is a malformed-proof error.
    pub fn as_malformed(&self) -> Option<&MalformedProof> {
        match self {
            Self::Malformed(m) => Some(m),
            _ => None,
        }
    }
}

impl From<reqwest::Error> for ProofError {
    fn from(err: reqwest::Error) -> Self {
        Self::Transport(err.to_string())
    }
}

impl From<serde_json::Error> for ProofError {
    fn from(err: serde_json::Error) -> Self {
        Self::Serialization(err.to_string())
    }
}
