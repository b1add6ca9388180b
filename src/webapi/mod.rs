//! Web API of the proof service.
//!
//! ## Modules
//!
//! - `types`: request/response bodies, endpoint paths and item status
//! - `client`: async HTTP client that submits digests and verifies the
//!   returned proofs locally
//!
//! The proof verification itself lives in [`crate::proof`] and never touches
//! the network.

pub mod client;
pub mod types;

pub use client::{
    decode_response, verify_prove_response, ChainHead, Client, ClientConfig, ProvenDocument,
    DEFAULT_ENDPOINT,
};
pub use types::{
    AddRequest, AddResponse, ApiRequest, Fixpoint, FixpointsResponse, LatestResponse,
    ProofStatus, ProveRequest, ProveResponse, PATH_ADD, PATH_FIXPOINTS, PATH_HISTORY,
    PATH_LATEST, PATH_PROVE,
};
