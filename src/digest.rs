//! Document digests.
//!
//! The web service identifies a document by two digests computed by the
//! client: SHA2-256 (FIPS 180-4) and SHA3-512 (FIPS 202). Both are computed in
//! a single pass over the input stream.

use crate::error::{ProofError, Result};
use crate::validation::{Validator, SHA2_256_LEN, SHA3_512_LEN};
use base64::{engine::general_purpose::STANDARD, Engine};
use sha2::Sha256;
use sha3::{Digest, Sha3_512};
use std::fmt;
use std::io::{ErrorKind, Read};

const READ_CHUNK: usize = 64 * 1024;

/// SHA2-256 of `data`
pub fn sha2_256(data: &[u8]) -> Vec<u8> {
    Sha256::digest(data).to_vec()
}

/// SHA3-512 of `data`
pub fn sha3_512(data: &[u8]) -> Vec<u8> {
    Sha3_512::digest(data).to_vec()
}

/// The digest pair identifying a document.
#[derive(Clone, PartialEq, Eq)]
pub struct Digests {
    sha2_256: [u8; SHA2_256_LEN],
    sha3_512: [u8; SHA3_512_LEN],
}

impl Digests {
    /// Reads `reader` until EOF and hashes everything read.
    ///
    /// Empty input is rejected: an empty document cannot be proven.
    pub fn from_reader<R: Read>(mut reader: R) -> Result<Self> {
        let mut h2 = Sha256::new();
        let mut h3 = Sha3_512::new();
        let mut buf = vec![0u8; READ_CHUNK];
        let mut total = 0usize;

        loop {
            let n = match reader.read(&mut buf) {
                Ok(0) => break,
                Ok(n) => n,
                Err(e) if e.kind() == ErrorKind::Interrupted => continue,
                Err(e) => return Err(e.into()),
            };
            h2.update(&buf[..n]);
            h3.update(&buf[..n]);
            total += n;
        }

        if total == 0 {
            return Err(ProofError::invalid_input("cannot use empty data"));
        }

        let mut sha3_512 = [0u8; SHA3_512_LEN];
        sha3_512.copy_from_slice(&h3.finalize());
        Ok(Self {
            sha2_256: h2.finalize().into(),
            sha3_512,
        })
    }

    /// Hashes an in-memory buffer.
    pub fn from_slice(data: &[u8]) -> Result<Self> {
        Self::from_reader(data)
    }

    /// Builds a pair from raw digests, checking their lengths.
    pub fn from_parts(sha2_256: &[u8], sha3_512: &[u8]) -> Result<Self> {
        Validator::validate_sha2_256(sha2_256)?;
        Validator::validate_sha3_512(sha3_512)?;
        let mut s2 = [0u8; SHA2_256_LEN];
        let mut s3 = [0u8; SHA3_512_LEN];
        s2.copy_from_slice(sha2_256);
        s3.copy_from_slice(sha3_512);
        Ok(Self {
            sha2_256: s2,
            sha3_512: s3,
        })
    }

    pub fn sha2_256(&self) -> &[u8; SHA2_256_LEN] {
        &self.sha2_256
    }

    pub fn sha3_512(&self) -> &[u8; SHA3_512_LEN] {
        &self.sha3_512
    }

    /// Hex form of the SHA2-256 digest.
    pub fn sha2_256_hex(&self) -> String {
        hex::encode(self.sha2_256)
    }

    /// Hex form of the SHA3-512 digest.
    pub fn sha3_512_hex(&self) -> String {
        hex::encode(self.sha3_512)
    }

    /// Base64 form of the SHA2-256 digest, as used on the wire.
    pub fn sha2_256_base64(&self) -> String {
        STANDARD.encode(self.sha2_256)
    }

    /// Base64 form of the SHA3-512 digest, as used on the wire.
    pub fn sha3_512_base64(&self) -> String {
        STANDARD.encode(self.sha3_512)
    }
}

impl fmt::Debug for Digests {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Digests(sha2_256={}..., sha3_512={}...)",
            &self.sha2_256_hex()[..16],
            &self.sha3_512_hex()[..16]
        )
    }
}
