//! Existence proofs.
//!
//! An existence proof shows that a document was known at some point in time.
//! If bytes `B` can be derived from the document `A` through an unbroken
//! chain of one-way functions, then whoever produced `B` must have known `A`.
//! If `B` was published at a trusted place at a certain time, `A` existed at
//! that time.
//!
//! A [`Proof`] encodes such chains as a DAG of hash operations over literal
//! buffers. [`Verifier`] replays it for the caller's data and reports which
//! published references are derived from that data, and through which hash
//! functions.
//!
//! Checking that a locator really contains the derived bytes is left to the
//! caller, who decides which external sources to trust.
//!
//! # Example
//!
//! ```
//! use existproof::proof::Proof;
//!
//! let json = br#"{
//!     "operations": [
//!         {"type": "sha3_512", "data": [0]},
//!         {"type": "sha2_256", "data": [-1, 0]}],
//!     "data": ["AQIDBAUGBwgJCgsMDQ4PEBESExQ="],
//!     "references": [{"data": -2, "ref": "encyclopedia britannica"}]}"#;
//!
//! let proof = Proof::from_json(json)?;
//! let refs = proof.verify(&proof.data[0], None)?;
//! assert_eq!(refs[0].data_base64(), "avaZW1398UuMUV9tirLTXlc4XpjNeV5D9cTAZje0nNw=");
//! assert_eq!(refs[0].locator(), "encyclopedia britannica");
//! # Ok::<(), existproof::ProofError>(())
//! ```

pub mod encoding;
mod model;
pub mod registry;
mod verify;

pub use model::{Operation, Proof, Reference, VerifiedReference};
pub use registry::{HashFn, OperationRegistry, UnknownOperation, SHA2_256, SHA3_512};
pub use verify::Verifier;
