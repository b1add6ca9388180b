//! Request and response types of the proof service.
//!
//! Every endpoint is reached with `POST <endpoint>/<path>` and a JSON body.
//! Byte fields travel as standard base64 strings.

use crate::error::{ProofError, Result};
use crate::proof::{encoding, Proof};
use crate::validation::Validator;
use chrono::{DateTime, TimeZone, Utc};
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

pub const PATH_ADD: &str = "add";
pub const PATH_PROVE: &str = "prove";
pub const PATH_LATEST: &str = "latest";
pub const PATH_FIXPOINTS: &str = "fixpoints";
pub const PATH_HISTORY: &str = "history";

/// Processing state of a submitted item.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ProofStatus {
    /// Received by the service but not yet committed to storage
    Received,
    /// Stored in the chain, but nothing has been published externally yet
    InChain,
    /// Stored in the chain with references published externally
    Provable,
    /// The service does not know the item (yet)
    NotFound,
}

impl ProofStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Received => "received",
            Self::InChain => "chained",
            Self::Provable => "provable",
            Self::NotFound => "not found",
        }
    }
}

impl FromStr for ProofStatus {
    type Err = ProofError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "received" => Ok(Self::Received),
            "chained" => Ok(Self::InChain),
            "provable" => Ok(Self::Provable),
            other => Err(ProofError::remote(format!("unknown proof status: {}", other))),
        }
    }
}

impl fmt::Display for ProofStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A request the client knows how to send.
pub trait ApiRequest: Serialize {
    /// Path of the endpoint, relative to the service endpoint
    const PATH: &'static str;

    /// Type of a successful response body
    type Response: DeserializeOwned;

    /// Sanity checks performed before anything is sent.
    fn validate(&self) -> Result<()> {
        Ok(())
    }

    /// The encoded request body.
    fn body(&self) -> Result<Vec<u8>> {
        Ok(serde_json::to_vec(self)?)
    }
}

/// Submits the digests of a document.
///
/// It is the client's responsibility that both digests belong to the same
/// document; mismatched digests make every later prove request fail.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AddRequest {
    #[serde(with = "encoding::bytes")]
    pub sha2_256: Vec<u8>,
    #[serde(with = "encoding::bytes")]
    pub sha3_512: Vec<u8>,
}

impl ApiRequest for AddRequest {
    const PATH: &'static str = PATH_ADD;
    type Response = AddResponse;

    fn validate(&self) -> Result<()> {
        Validator::validate_sha2_256(&self.sha2_256)?;
        Validator::validate_sha3_512(&self.sha3_512)
    }
}

/// The secret token for a submitted document.
///
/// The token together with the document later retrieves the proof, so it
/// should be kept private.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AddResponse {
    #[serde(with = "encoding::bytes", default)]
    pub token: Vec<u8>,
    #[serde(default)]
    pub approximate_timestamp: String,
    #[serde(with = "encoding::bytes", default)]
    pub sha2_256: Vec<u8>,
    #[serde(with = "encoding::bytes", default)]
    pub sha3_512: Vec<u8>,
}

/// Asks for the proof of a submitted document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProveRequest {
    #[serde(with = "encoding::bytes")]
    pub token: Vec<u8>,
    #[serde(with = "encoding::bytes")]
    pub sha2_256: Vec<u8>,
}

impl ApiRequest for ProveRequest {
    const PATH: &'static str = PATH_PROVE;
    type Response = ProveResponse;

    fn validate(&self) -> Result<()> {
        Validator::validate_token_present(&self.token)?;
        Validator::validate_sha2_256(&self.sha2_256)
    }
}

/// The proof that a document was stored at `timestamp`.
///
/// `proof` must hold the 8-byte big-endian timestamp and at least one of the
/// two digests as separate literals on the chain of some reference.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProveResponse {
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub timestamp: String,
    #[serde(with = "encoding::bytes", default, skip_serializing_if = "Vec::is_empty")]
    pub sha2_256: Vec<u8>,
    #[serde(with = "encoding::bytes", default, skip_serializing_if = "Vec::is_empty")]
    pub sha3_512: Vec<u8>,
    #[serde(default)]
    pub proof: Proof,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub status: String,
}

/// Empty-bodied request for the latest chain state.
#[derive(Debug, Clone, Copy, Default, Serialize)]
pub struct LatestRequest;

impl ApiRequest for LatestRequest {
    const PATH: &'static str = PATH_LATEST;
    type Response = LatestResponse;

    fn body(&self) -> Result<Vec<u8>> {
        Ok(Vec::new())
    }
}

/// The latest state of the chain.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LatestResponse {
    /// Nanoseconds since the Unix epoch, as a decimal string
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub timestamp: String,
    #[serde(with = "encoding::bytes", default)]
    pub sha2_256: Vec<u8>,
    #[serde(with = "encoding::bytes", default, skip_serializing_if = "Vec::is_empty")]
    pub sha3_512: Vec<u8>,
}

impl LatestResponse {
    pub fn timestamp(&self) -> Result<DateTime<Utc>> {
        parse_nanos(&self.timestamp)
    }
}

/// Empty-bodied request for the service's fixpoints.
#[derive(Debug, Clone, Copy, Default, Serialize)]
pub struct FixpointsRequest;

impl ApiRequest for FixpointsRequest {
    const PATH: &'static str = PATH_FIXPOINTS;
    type Response = FixpointsResponse;

    fn body(&self) -> Result<Vec<u8>> {
        Ok(Vec::new())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FixpointsResponse {
    #[serde(rename = "fixpoints", default)]
    pub points: Option<Vec<Fixpoint>>,
}

/// A chain state stored by the service itself.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Fixpoint {
    #[serde(default)]
    pub timestamp: String,
    #[serde(with = "encoding::bytes", default)]
    pub sha2_256: Vec<u8>,
    #[serde(with = "encoding::bytes", default)]
    pub sha3_512: Vec<u8>,
}

/// Body of a 400 response.
#[derive(Debug, Clone, Deserialize)]
pub struct ErrorBody {
    #[serde(rename = "Error", default)]
    pub error: String,
}

/// Parses a decimal timestamp string.
pub fn parse_timestamp(s: &str) -> Result<i64> {
    s.trim()
        .parse::<i64>()
        .map_err(|_| ProofError::remote(format!("bad timestamp returned by server: '{}'", s)))
}

/// Parses a decimal nanosecond count into a UTC time.
pub fn parse_nanos(s: &str) -> Result<DateTime<Utc>> {
    Ok(Utc.timestamp_nanos(parse_timestamp(s)?))
}
