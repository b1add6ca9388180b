//! Utility functions for CLI operations.

use crate::error::{ProofError, Result};
use crate::proof::Proof;
use crate::validation::{Validator, MAX_PROOF_SIZE};
use base64::{engine::general_purpose::STANDARD, Engine};
use chrono::{DateTime, SecondsFormat, Utc};
use std::fs;
use std::io::Read;
use std::path::Path;

/// Read file contents
pub fn read_file(path: &Path) -> Result<Vec<u8>> {
    let mut file = fs::File::open(path)?;
    let mut contents = Vec::new();
    file.read_to_end(&mut contents)?;
    Ok(contents)
}

/// Open a file for streaming
pub fn open_file(path: &Path) -> Result<fs::File> {
    Ok(fs::File::open(path)?)
}

/// Read and decode a JSON proof document
pub fn read_proof(path: &Path) -> Result<Proof> {
    let size = fs::metadata(path)?.len();
    if size > MAX_PROOF_SIZE as u64 {
        return Err(ProofError::validation(format!(
            "Proof file too large: {} bytes",
            size
        )));
    }
    Proof::from_json(&read_file(path)?)
}

/// Decode a base64 token as printed by `add`
pub fn parse_token(token: &str) -> Result<Vec<u8>> {
    let bytes = STANDARD
        .decode(token.trim())
        .map_err(|e| ProofError::invalid_input(format!("Token is not valid base64: {}", e)))?;
    Validator::validate_token(&bytes)?;
    Ok(bytes)
}

/// Format a time for CLI display
pub fn format_time(time: DateTime<Utc>) -> String {
    time.to_rfc3339_opts(SecondsFormat::AutoSi, true)
}
