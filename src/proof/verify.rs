//! Proof verification.
//!
//! Verification runs in four steps:
//!
//! 1. **Validate** the whole document structurally, without hashing anything.
//!    The first violation found is reported. Because every operation input
//!    must address a literal or an *earlier* output, a document that passes
//!    is acyclic by construction.
//! 2. **Materialize** every operation in declared order.
//! 3. **Attribute** trust: for every output, decide whether it depends on the
//!    caller's data (and on the claimed timestamp), and which operation types
//!    lie on those dependency paths.
//! 4. **Assemble** the accepted references in document order.
//!
//! The engine never looks at what is actually published at a locator.

use super::model::{Proof, VerifiedReference};
use super::registry::{HashFn, OperationRegistry, UnknownOperation};
use crate::error::{MalformedProof, ProofError, Result};
use std::collections::BTreeSet;
use tracing::{debug, trace, warn};

/// Verifies proofs against the operations of a registry.
#[derive(Debug, Clone, Copy)]
pub struct Verifier<'r> {
    registry: &'r OperationRegistry,
}

/// A resolved operation input.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Slot {
    Literal(usize),
    Output(usize),
}

/// Everything validation resolved, so later steps never index blindly.
struct Plan {
    transforms: Vec<HashFn>,
    inputs: Vec<Vec<Slot>>,
    targets: Vec<usize>,
}

/// Per-output trust attribution.
#[derive(Debug, Default, Clone)]
struct Attribution<'p> {
    root: bool,
    timestamp: bool,
    hashes: BTreeSet<&'p str>,
}

impl Attribution<'_> {
    fn matched(&self) -> bool {
        self.root || self.timestamp
    }
}

/// Resolves a signed index given `literals` literal buffers and `produced`
/// outputs computed so far.
fn resolve(index: i64, literals: usize, produced: usize) -> Option<Slot> {
    if index >= 0 {
        let i = usize::try_from(index).ok()?;
        (i < literals).then_some(Slot::Literal(i))
    } else {
        let k = usize::try_from(index.unsigned_abs()).ok()?;
        (k <= produced).then_some(Slot::Output(k - 1))
    }
}

/// The 8-byte big-endian form a timestamp takes as a literal.
///
/// Zero means no timestamp was claimed.
fn timestamp_literal(timestamp: Option<i64>) -> Option<[u8; 8]> {
    timestamp.filter(|&t| t != 0).map(i64::to_be_bytes)
}

impl<'r> Verifier<'r> {
    pub fn new(registry: &'r OperationRegistry) -> Self {
        Self { registry }
    }

    pub fn registry(&self) -> &'r OperationRegistry {
        self.registry
    }

    /// Verifies that `proof` contains an unbroken chain of one-way functions
    /// from `root` to at least one reference.
    ///
    /// Returns the references that depend on `root`, in document order. If
    /// `timestamp` is given and non-zero, a reference must also depend on a
    /// literal holding the timestamp's 8-byte big-endian encoding.
    ///
    /// # Errors
    ///
    /// - [`ProofError::InvalidInput`] if `root` is empty
    /// - [`ProofError::Malformed`] for the first structural violation found
    /// - [`ProofError::DoesNotApply`] if no reference depends on `root`
    pub fn verify(
        &self,
        proof: &Proof,
        root: &[u8],
        timestamp: Option<i64>,
    ) -> Result<Vec<VerifiedReference>> {
        if root.is_empty() {
            return Err(ProofError::invalid_input("no data to verify"));
        }

        let plan = self.plan(proof)?;
        let outputs = materialize(proof, &plan);

        let stamp = timestamp_literal(timestamp);
        let nodes = attribute(proof, &plan, root, stamp.as_ref());

        let verified: Vec<VerifiedReference> = proof
            .references
            .iter()
            .zip(&plan.targets)
            .filter_map(|(reference, &target)| {
                let node = &nodes[target];
                let accepted = node.root && (stamp.is_none() || node.timestamp);
                accepted.then(|| VerifiedReference {
                    data: outputs[target].clone(),
                    locator: reference.locator.clone(),
                    published_at: reference.timestamp,
                    hash_functions: node.hashes.iter().map(|s| s.to_string()).collect(),
                })
            })
            .collect();

        debug!(
            operations = proof.operations.len(),
            references = proof.references.len(),
            accepted = verified.len(),
            timestamped = stamp.is_some(),
            "Verified proof"
        );

        if verified.is_empty() {
            return Err(ProofError::DoesNotApply);
        }
        Ok(verified)
    }

    /// Validates `proof` and returns the output of every operation, in order.
    pub fn replay(&self, proof: &Proof) -> Result<Vec<Vec<u8>>> {
        let plan = self.plan(proof)?;
        Ok(materialize(proof, &plan))
    }

    /// Structural validation. Never hashes.
    pub fn validate(&self, proof: &Proof) -> std::result::Result<(), MalformedProof> {
        self.check(proof).map(|_| ())
    }

    fn plan(&self, proof: &Proof) -> Result<Plan> {
        self.check(proof).map_err(|e| {
            warn!(error = %e, "Rejecting malformed proof");
            ProofError::Malformed(e)
        })
    }

    fn check(&self, proof: &Proof) -> std::result::Result<Plan, MalformedProof> {
        if proof.data.is_empty() {
            return Err(MalformedProof::NoLiteralData);
        }
        if let Some(literal) = proof.data.iter().position(Vec::is_empty) {
            return Err(MalformedProof::EmptyLiteral { literal });
        }
        if proof.references.is_empty() {
            return Err(MalformedProof::NoReferences);
        }

        let transforms = proof
            .operations
            .iter()
            .enumerate()
            .map(|(operation, op)| {
                self.registry
                    .lookup(&op.op_type)
                    .map_err(|UnknownOperation(name)| MalformedProof::UnknownOperation {
                        operation,
                        name,
                    })
            })
            .collect::<std::result::Result<Vec<_>, _>>()?;

        if let Some(operation) = proof.operations.iter().position(|op| op.inputs.is_empty()) {
            return Err(MalformedProof::EmptyOperationInput { operation });
        }

        let literals = proof.data.len();
        let mut inputs = Vec::with_capacity(proof.operations.len());
        for (operation, op) in proof.operations.iter().enumerate() {
            // Operation `operation` may only see the outputs before it
            let slots = op
                .inputs
                .iter()
                .map(|&index| {
                    resolve(index, literals, operation)
                        .ok_or(MalformedProof::DanglingReference { operation, index })
                })
                .collect::<std::result::Result<Vec<_>, _>>()?;
            inputs.push(slots);
        }

        if let Some(reference) = proof.references.iter().position(|r| r.locator.is_empty()) {
            return Err(MalformedProof::EmptyLocator { reference });
        }

        // With no literals visible, only computed outputs resolve
        let produced = proof.operations.len();
        let targets = proof
            .references
            .iter()
            .enumerate()
            .map(|(reference, r)| match resolve(r.target, 0, produced) {
                Some(Slot::Output(target)) => Ok(target),
                _ => Err(MalformedProof::InvalidReferenceTarget {
                    reference,
                    index: r.target,
                }),
            })
            .collect::<std::result::Result<Vec<_>, _>>()?;

        Ok(Plan {
            transforms,
            inputs,
            targets,
        })
    }
}

impl Default for Verifier<'static> {
    fn default() -> Self {
        Self::new(OperationRegistry::standard())
    }
}

/// Runs every operation in declared order.
fn materialize(proof: &Proof, plan: &Plan) -> Vec<Vec<u8>> {
    let mut outputs: Vec<Vec<u8>> = Vec::with_capacity(plan.transforms.len());
    let mut buf: Vec<u8> = Vec::with_capacity(128);

    for (operation, (transform, slots)) in plan.transforms.iter().zip(&plan.inputs).enumerate() {
        buf.clear();
        for slot in slots {
            let part = match *slot {
                Slot::Literal(i) => &proof.data[i],
                Slot::Output(i) => &outputs[i],
            };
            buf.extend_from_slice(part);
        }
        let output = transform(&buf);
        trace!(
            operation,
            op_type = %proof.operations[operation].op_type,
            input_len = buf.len(),
            output_len = output.len(),
            "Materialized operation"
        );
        outputs.push(output);
    }

    outputs
}

/// Computes the attribution of every output.
///
/// Inputs only point backwards, so visiting operations in declared order
/// sees every input's attribution before it is needed. Each node is computed
/// once, and its hash set is the union of its matching inputs' sets, so an
/// ancestor reached along several paths still contributes its name once.
fn attribute<'p>(
    proof: &'p Proof,
    plan: &Plan,
    root: &[u8],
    stamp: Option<&[u8; 8]>,
) -> Vec<Attribution<'p>> {
    let literal_matches: Vec<(bool, bool)> = proof
        .data
        .iter()
        .map(|literal| {
            let root_match = literal.as_slice() == root;
            let stamp_match = stamp.is_some_and(|s| literal.as_slice() == s.as_slice());
            (root_match, stamp_match)
        })
        .collect();

    let mut nodes: Vec<Attribution<'p>> = Vec::with_capacity(plan.inputs.len());
    for (operation, slots) in plan.inputs.iter().enumerate() {
        let mut node = Attribution::default();
        for slot in slots {
            match *slot {
                Slot::Literal(i) => {
                    let (root_match, stamp_match) = literal_matches[i];
                    node.root |= root_match;
                    node.timestamp |= stamp_match;
                }
                Slot::Output(i) => {
                    let parent = &nodes[i];
                    if parent.matched() {
                        node.root |= parent.root;
                        node.timestamp |= parent.timestamp;
                        node.hashes.extend(parent.hashes.iter().copied());
                    }
                }
            }
        }
        if node.matched() {
            node.hashes.insert(proof.operations[operation].op_type.as_str());
        }
        nodes.push(node);
    }

    nodes
}

impl Proof {
    /// Verifies the proof with the standard operations.
    ///
    /// See [`Verifier::verify`].
    pub fn verify(&self, root: &[u8], timestamp: Option<i64>) -> Result<Vec<VerifiedReference>> {
        Verifier::default().verify(self, root, timestamp)
    }

    /// Verifies the proof with the operations of `registry`.
    pub fn verify_with(
        &self,
        registry: &OperationRegistry,
        root: &[u8],
        timestamp: Option<i64>,
    ) -> Result<Vec<VerifiedReference>> {
        Verifier::new(registry).verify(self, root, timestamp)
    }
}
