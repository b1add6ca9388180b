//! The proof document and the values produced by verifying it.

use super::encoding;
use crate::error::{ProofError, Result};
use crate::validation::Validator;
use base64::{engine::general_purpose::STANDARD, Engine};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// An existence proof as sent between the issuing service and a client.
///
/// `data` holds the literal buffers. Operations address them with
/// non-negative indices and address the outputs of earlier operations with
/// negative indices: `-1` is the output of the first operation, `-2` of the
/// second and so on. References point at operation outputs that are
/// published somewhere outside the proof.
///
/// Decoding only checks the encoding. Whether the document makes sense is
/// decided by [`Verifier`](super::Verifier).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Proof {
    #[serde(
        default,
        deserialize_with = "encoding::null_as_default",
        skip_serializing_if = "Vec::is_empty"
    )]
    pub operations: Vec<Operation>,
    #[serde(
        default,
        with = "encoding::bytes_seq",
        skip_serializing_if = "Vec::is_empty"
    )]
    pub data: Vec<Vec<u8>>,
    #[serde(
        default,
        deserialize_with = "encoding::null_as_default",
        skip_serializing_if = "Vec::is_empty"
    )]
    pub references: Vec<Reference>,
}

/// One hash operation over the concatenation of its inputs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Operation {
    /// Registry key of the transform
    #[serde(rename = "type", default, deserialize_with = "encoding::null_as_default")]
    pub op_type: String,
    /// Signed indices of the inputs, concatenated in this order
    #[serde(rename = "data", default, deserialize_with = "encoding::null_as_default")]
    pub inputs: Vec<i64>,
}

/// A location where a computed output has been published.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Reference {
    /// Negative index of the published operation output
    #[serde(rename = "data", default)]
    pub target: i64,
    /// Approximate time of publication
    #[serde(
        default,
        deserialize_with = "encoding::optional_time",
        skip_serializing_if = "Option::is_none"
    )]
    pub timestamp: Option<DateTime<Utc>>,
    /// Description of the location, e.g. a permalink
    #[serde(rename = "ref", default, deserialize_with = "encoding::null_as_default")]
    pub locator: String,
}

impl Operation {
    pub fn new(op_type: impl Into<String>, inputs: Vec<i64>) -> Self {
        Self {
            op_type: op_type.into(),
            inputs,
        }
    }
}

impl Reference {
    pub fn new(target: i64, locator: impl Into<String>) -> Self {
        Self {
            target,
            timestamp: None,
            locator: locator.into(),
        }
    }

    pub fn with_timestamp(mut self, timestamp: DateTime<Utc>) -> Self {
        self.timestamp = Some(timestamp);
        self
    }
}

impl Proof {
    pub fn new() -> Self {
        Self::default()
    }

    /// Decodes a proof from its JSON form.
    pub fn from_json(json: &[u8]) -> Result<Self> {
        Validator::validate_proof_size(json)?;
        serde_json::from_slice(json)
            .map_err(|e| ProofError::serialization(format!("Failed to decode proof: {}", e)))
    }

    /// Encodes the proof as JSON.
    pub fn to_json(&self) -> Result<String> {
        serde_json::to_string(self)
            .map_err(|e| ProofError::serialization(format!("Failed to encode proof: {}", e)))
    }

    /// Appends a literal buffer and returns the index addressing it.
    pub fn push_literal(&mut self, data: impl Into<Vec<u8>>) -> i64 {
        self.data.push(data.into());
        (self.data.len() - 1) as i64
    }

    /// Appends an operation and returns the index addressing its output.
    pub fn push_operation(&mut self, op_type: impl Into<String>, inputs: Vec<i64>) -> i64 {
        self.operations.push(Operation::new(op_type, inputs));
        -(self.operations.len() as i64)
    }

    pub fn push_reference(&mut self, reference: Reference) {
        self.references.push(reference);
    }
}

/// A reference whose published data provably depends on the verified input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VerifiedReference {
    pub(crate) data: Vec<u8>,
    pub(crate) locator: String,
    pub(crate) published_at: Option<DateTime<Utc>>,
    pub(crate) hash_functions: Vec<String>,
}

impl VerifiedReference {
    /// The data that should be found at the locator.
    pub fn data(&self) -> &[u8] {
        &self.data
    }

    /// [`data`](Self::data) in standard base64.
    pub fn data_base64(&self) -> String {
        STANDARD.encode(&self.data)
    }

    /// Where the data is claimed to be published.
    pub fn locator(&self) -> &str {
        &self.locator
    }

    /// Claimed publication time, if the proof carried one.
    pub fn published_at(&self) -> Option<DateTime<Utc>> {
        self.published_at
    }

    /// Every operation type on the chain from the input to this reference,
    /// sorted and without duplicates.
    ///
    /// A client that no longer trusts one of these functions should discard
    /// the reference.
    pub fn hash_functions(&self) -> &[String] {
        &self.hash_functions
    }

    /// True if the chain relies only on functions in `trusted`.
    pub fn relies_only_on(&self, trusted: &[&str]) -> bool {
        self.hash_functions
            .iter()
            .all(|name| trusted.contains(&name.as_str()))
    }

    pub fn into_data(self) -> Vec<u8> {
        self.data
    }
}
