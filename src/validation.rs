//! Input validation and size limits for existproof
//!
//! The verification engine accepts documents of any size; the limits here
//! guard the boundaries where untrusted bytes enter the process (files read
//! by the CLI, bodies returned by the web service, outgoing requests).

use crate::error::{ProofError, Result};

/// Length of a SHA2-256 digest in bytes
pub const SHA2_256_LEN: usize = 32;

/// Length of a SHA3-512 digest in bytes
pub const SHA3_512_LEN: usize = 64;

/// Length of the secret token returned by the add endpoint
pub const TOKEN_LEN: usize = 16;

/// Maximum accepted size of an encoded proof document (16MB)
pub const MAX_PROOF_SIZE: usize = 16 * 1024 * 1024;

/// Maximum accepted size of a web service response body (32MB)
pub const MAX_RESPONSE_SIZE: usize = 32 * 1024 * 1024;

/// Validation functions for input data
pub struct Validator;

impl Validator {
    /// Validate a SHA2-256 digest
    pub fn validate_sha2_256(digest: &[u8]) -> Result<()> {
        if digest.len() != SHA2_256_LEN {
            return Err(ProofError::validation(format!(
                "the sha2_256 hash must be {} bytes, got {}",
                SHA2_256_LEN,
                digest.len()
            )));
        }
        Ok(())
    }

    /// Validate a SHA3-512 digest
    pub fn validate_sha3_512(digest: &[u8]) -> Result<()> {
        if digest.len() != SHA3_512_LEN {
            return Err(ProofError::validation(format!(
                "the sha3_512 hash must be {} bytes, got {}",
                SHA3_512_LEN,
                digest.len()
            )));
        }
        Ok(())
    }

    /// Validate a token is present at all (server-side rule)
    pub fn validate_token_present(token: &[u8]) -> Result<()> {
        if token.is_empty() {
            return Err(ProofError::validation("must specify token and hash"));
        }
        Ok(())
    }

    /// Validate a token has the exact length handed out by the service
    pub fn validate_token(token: &[u8]) -> Result<()> {
        Self::validate_token_present(token)?;
        if token.len() != TOKEN_LEN {
            return Err(ProofError::validation(format!(
                "incorrect token provided: expected {} bytes, got {}",
                TOKEN_LEN,
                token.len()
            )));
        }
        Ok(())
    }

    /// Validate encoded proof document size
    pub fn validate_proof_size(data: &[u8]) -> Result<()> {
        if data.len() > MAX_PROOF_SIZE {
            return Err(ProofError::validation(format!(
                "Proof too large: {} bytes exceeds maximum of {} bytes",
                data.len(),
                MAX_PROOF_SIZE
            )));
        }
        Ok(())
    }

    /// Validate response body size
    pub fn validate_response_size(size: usize) -> Result<()> {
        if size > MAX_RESPONSE_SIZE {
            return Err(ProofError::validation(format!(
                "Response too large: {} bytes exceeds maximum of {} bytes",
                size, MAX_RESPONSE_SIZE
            )));
        }
        Ok(())
    }
}
