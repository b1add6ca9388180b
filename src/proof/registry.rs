//! Registry of one-way operations a proof may use.
//!
//! Each operation is a plain function pointer from bytes to bytes. Function
//! pointers carry no state, so a registry is `Send + Sync` and can be shared
//! by any number of concurrent verifications once it is built.

use crate::digest;
use crate::error::{ProofError, Result};
use std::collections::HashMap;
use std::sync::OnceLock;
use thiserror::Error;

/// Registry key of SHA2-256 (FIPS 180-4).
pub const SHA2_256: &str = "sha2_256";

/// Registry key of SHA3-512 (FIPS 202).
pub const SHA3_512: &str = "sha3_512";

/// A deterministic one-way transform.
///
/// Must be total over all byte strings and must terminate for any finite
/// input.
pub type HashFn = fn(&[u8]) -> Vec<u8>;

/// Returned by [`OperationRegistry::lookup`] for names that are not registered.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("unknown operation '{0}'")]
pub struct UnknownOperation(pub String);

/// Mapping from operation name to its transform.
#[derive(Clone)]
pub struct OperationRegistry {
    operations: HashMap<String, HashFn>,
}

impl OperationRegistry {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self {
            operations: HashMap::new(),
        }
    }

    /// Creates a registry holding the default operations.
    pub fn with_defaults() -> Self {
        let mut registry = Self::new();
        registry.operations.insert(SHA2_256.to_string(), digest::sha2_256);
        registry.operations.insert(SHA3_512.to_string(), digest::sha3_512);
        registry
    }

    /// Returns the shared registry of default operations.
    ///
    /// Built on first use and never modified afterwards.
    pub fn standard() -> &'static OperationRegistry {
        static STANDARD: OnceLock<OperationRegistry> = OnceLock::new();
        STANDARD.get_or_init(Self::with_defaults)
    }

    /// Registers `op` under `name`, returning the transform it replaced.
    pub fn register(&mut self, name: impl Into<String>, op: HashFn) -> Result<Option<HashFn>> {
        let name = name.into();
        if name.is_empty() {
            return Err(ProofError::invalid_input("operation name cannot be empty"));
        }
        Ok(self.operations.insert(name, op))
    }

    /// Looks up the transform registered under `name`.
    pub fn lookup(&self, name: &str) -> std::result::Result<HashFn, UnknownOperation> {
        self.get(name)
            .ok_or_else(|| UnknownOperation(name.to_string()))
    }

    pub fn get(&self, name: &str) -> Option<HashFn> {
        self.operations.get(name).copied()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.operations.contains_key(name)
    }

    /// Registered names in lexicographic order.
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.operations.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    pub fn len(&self) -> usize {
        self.operations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.operations.is_empty()
    }
}

impl Default for OperationRegistry {
    fn default() -> Self {
        Self::with_defaults()
    }
}

impl std::fmt::Debug for OperationRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OperationRegistry")
            .field("operations", &self.names())
            .finish()
    }
}
