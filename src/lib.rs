//! # existproof - existence proofs for documents
//!
//! An existence proof shows that a document was known no later than a
//! certain time. The proof is a DAG of one-way hash operations that derives,
//! from the document's digest, bytes that were published at some external
//! location at a known time.
//!
//! ## Features
//!
//! - **Offline verification**: [`proof::Verifier`] replays a proof and reports
//!   which published references depend on the caller's data, and through
//!   which hash functions
//! - **Extensible operations**: the [`proof::OperationRegistry`] maps operation
//!   names to transforms; SHA2-256 and SHA3-512 are built in
//! - **Service client**: [`webapi::Client`] submits digests to the proof
//!   service and verifies the proofs it returns
//!
//! ## Examples
//!
//! ### Verifying a proof
//!
//! ```rust
//! use existproof::proof::{Proof, Reference, SHA2_256, SHA3_512};
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let mut proof = Proof::new();
//! let doc = proof.push_literal(b"my document".to_vec());
//! let inner = proof.push_operation(SHA3_512, vec![doc]);
//! let outer = proof.push_operation(SHA2_256, vec![inner, doc]);
//! proof.push_reference(Reference::new(outer, "https://example.org/anchors/42"));
//!
//! let verified = proof.verify(b"my document", None)?;
//! assert_eq!(verified[0].locator(), "https://example.org/anchors/42");
//! assert_eq!(verified[0].hash_functions(), &["sha2_256", "sha3_512"]);
//! # Ok(())
//! # }
//! ```
//!
//! ### Proving a submitted document
//!
//! ```rust,no_run
//! use existproof::webapi::{Client, ClientConfig};
//! # async fn run(token: Vec<u8>) -> Result<(), Box<dyn std::error::Error>> {
//! let client = Client::new(ClientConfig::from_env()?)?;
//! let proven = client.prove_slice(b"my document", &token).await?;
//! for r in &proven.references {
//!     println!("look for {} at {}", r.data_base64(), r.locator());
//! }
//! # Ok(())
//! # }
//! ```

pub mod cli;
pub mod digest;
pub mod error;
pub mod proof;
pub mod validation;
pub mod webapi;

pub use error::{MalformedProof, ProofError, Result};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
