//! Command implementations for the existproof CLI.

use crate::{
    cli::utils::{format_time, open_file, parse_token, read_file, read_proof},
    digest::Digests,
    proof::{Proof, VerifiedReference},
    webapi::Client,
    ProofError, Result,
};
use base64::{engine::general_purpose::STANDARD, Engine};
use std::path::Path;
use tracing::info;

/// Execute digest command
pub fn digest(file: &Path) -> Result<()> {
    let digests = Digests::from_reader(open_file(file)?)?;

    info!(file = %file.display(), "Computed digests");
    println!("sha2_256 {} {}", digests.sha2_256_hex(), digests.sha2_256_base64());
    println!("sha3_512 {} {}", digests.sha3_512_hex(), digests.sha3_512_base64());
    Ok(())
}

/// Verify `proof` for the contents of `file`.
///
/// By default both digests of the file are tried as roots, the way the
/// service builds its proofs; with `raw` the file's bytes are the root.
/// Fails only if no root is attested.
pub fn verify_file(
    proof: &Proof,
    file: &Path,
    timestamp: Option<i64>,
    raw: bool,
) -> Result<Vec<VerifiedReference>> {
    let roots: Vec<Vec<u8>> = if raw {
        vec![read_file(file)?]
    } else {
        let digests = Digests::from_reader(open_file(file)?)?;
        vec![digests.sha2_256().to_vec(), digests.sha3_512().to_vec()]
    };

    let mut verified = Vec::new();
    for root in &roots {
        match proof.verify(root, timestamp) {
            Ok(refs) => verified.extend(refs),
            Err(ProofError::DoesNotApply) => continue,
            Err(e) => return Err(e),
        }
    }

    if verified.is_empty() {
        return Err(ProofError::DoesNotApply);
    }
    Ok(verified)
}

/// Execute verify command
pub fn verify(proof_file: &Path, file: &Path, timestamp: Option<i64>, raw: bool) -> Result<()> {
    info!(proof = %proof_file.display(), file = %file.display(), "Verifying proof");

    let proof = read_proof(proof_file)?;
    let verified = verify_file(&proof, file, timestamp, raw)?;

    info!(references = verified.len(), "✅ Proof applies to the document");
    print_references(&verified);
    Ok(())
}

/// Execute add command
pub async fn add(client: &Client, file: &Path) -> Result<()> {
    info!(file = %file.display(), endpoint = %client.config().endpoint, "Submitting document");

    let token = client.add(open_file(file)?).await?;

    info!("✅ Document submitted, keep the token to retrieve the proof");
    println!("{}", STANDARD.encode(token));
    Ok(())
}

/// Execute prove command
pub async fn prove(client: &Client, file: &Path, token: &str) -> Result<()> {
    let token = parse_token(token)?;
    info!(file = %file.display(), endpoint = %client.config().endpoint, "Requesting proof");

    let proven = client.prove(open_file(file)?, &token).await?;

    info!(
        stored_at = %format_time(proven.stored_at()),
        references = proven.references.len(),
        "✅ Existence proven"
    );
    println!("stored_at {}", format_time(proven.stored_at()));
    print_references(&proven.references);
    Ok(())
}

/// Execute latest command
pub async fn latest(client: &Client) -> Result<()> {
    let head = client.latest().await?;
    println!("timestamp {}", format_time(head.timestamp));
    println!("sha2_256  {}", hex::encode(&head.sha2_256));
    println!("sha3_512  {}", hex::encode(&head.sha3_512));
    Ok(())
}

/// Execute fixpoints command
pub async fn fixpoints(client: &Client) -> Result<()> {
    let points = client.fixpoints().await?;
    info!(count = points.len(), "Fetched fixpoints");
    for point in &points {
        println!(
            "{} {} {}",
            point.timestamp,
            hex::encode(&point.sha2_256),
            hex::encode(&point.sha3_512)
        );
    }
    Ok(())
}

fn print_references(references: &[VerifiedReference]) {
    for r in references {
        let published = r
            .published_at()
            .map(format_time)
            .unwrap_or_else(|| "-".to_string());
        println!(
            "{}\t{}\t{}\t{}",
            r.data_base64(),
            r.locator(),
            published,
            r.hash_functions().join(",")
        );
    }
}
