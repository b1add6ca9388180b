//! Async HTTP client for the proof service.
//!
//! Documents are hashed locally; only their digests are sent. Proofs
//! returned by the service are verified locally before they are handed to
//! the caller.

use super::types::{
    parse_nanos, parse_timestamp, AddRequest, ApiRequest, ErrorBody, Fixpoint, FixpointsRequest,
    LatestRequest, ProofStatus, ProveRequest, ProveResponse,
};
use crate::digest::Digests;
use crate::error::{ProofError, Result};
use crate::proof::{Verifier, VerifiedReference};
use crate::validation::{Validator, MAX_RESPONSE_SIZE};
use chrono::{DateTime, TimeZone, Utc};
use reqwest::header::CONTENT_TYPE;
use std::io::Read;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;
use tracing::{debug, info, instrument};

/// Default service endpoint
pub const DEFAULT_ENDPOINT: &str = "https://api.veriff.io/core";

/// Environment variable overriding the endpoint
pub const ENDPOINT_ENV: &str = "EXISTPROOF_ENDPOINT";

/// Environment variable overriding the request timeout, in seconds
pub const TIMEOUT_ENV: &str = "EXISTPROOF_TIMEOUT_SECS";

const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Client settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    /// Base URL of the service
    pub endpoint: String,
    /// Timeout of a single request
    pub timeout: Duration,
    /// Sent as `X-Client` with every request
    pub client_name: String,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            endpoint: DEFAULT_ENDPOINT.to_string(),
            timeout: DEFAULT_TIMEOUT,
            client_name: env!("CARGO_PKG_NAME").to_string(),
        }
    }
}

impl ClientConfig {
    /// Defaults, overridden by `EXISTPROOF_ENDPOINT` and `EXISTPROOF_TIMEOUT_SECS`.
    pub fn from_env() -> Result<Self> {
        Self::from_vars(|key| std::env::var(key).ok())
    }

    /// Like [`from_env`](Self::from_env), reading variables through `var`.
    pub fn from_vars<F>(var: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();
        if let Some(endpoint) = var(ENDPOINT_ENV).filter(|s| !s.trim().is_empty()) {
            config.endpoint = endpoint.trim().to_string();
        }
        if let Some(secs) = var(TIMEOUT_ENV) {
            let secs: u64 = secs.trim().parse().map_err(|_| {
                ProofError::config(format!("{} must be a number of seconds, got '{}'", TIMEOUT_ENV, secs))
            })?;
            config.timeout = Duration::from_secs(secs);
        }
        Ok(config)
    }

    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = endpoint.into();
        self
    }
}

/// A document proven to exist, with the references that show it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProvenDocument {
    /// Time the service stored the document, in nanoseconds since the epoch
    pub timestamp: i64,
    /// Accepted references for the SHA2-256 digest followed by those for the
    /// SHA3-512 digest
    pub references: Vec<VerifiedReference>,
}

impl ProvenDocument {
    pub fn stored_at(&self) -> DateTime<Utc> {
        Utc.timestamp_nanos(self.timestamp)
    }
}

/// The latest state of the service's chain.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChainHead {
    pub sha2_256: Vec<u8>,
    pub sha3_512: Vec<u8>,
    pub timestamp: DateTime<Utc>,
}

/// Client for the proof service.
///
/// Cheap to share between tasks; requests are independent.
#[derive(Debug)]
pub struct Client {
    http: reqwest::Client,
    config: ClientConfig,
    request_id: AtomicU64,
}

impl Client {
    pub fn new(config: ClientConfig) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| ProofError::config(format!("Failed to build HTTP client: {}", e)))?;
        Ok(Self {
            http,
            config,
            request_id: AtomicU64::new(1),
        })
    }

    /// Creates a client for `endpoint` with default settings.
    pub fn with_endpoint(endpoint: impl Into<String>) -> Result<Self> {
        Self::new(ClientConfig::default().with_endpoint(endpoint))
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.config.endpoint.trim_end_matches('/'), path)
    }

    async fn send<R: ApiRequest>(&self, request: &R) -> Result<R::Response> {
        request.validate()?;
        let body = request.body()?;
        let url = self.url(R::PATH);
        let id = self.request_id.fetch_add(1, Ordering::Relaxed);

        debug!(id, url = %url, body_len = body.len(), "Sending request");
        let mut response = self
            .http
            .post(&url)
            .header(CONTENT_TYPE, "application/json")
            .header("X-Client", &self.config.client_name)
            .body(body)
            .send()
            .await?;

        let status = response.status().as_u16();
        if let Some(len) = response.content_length() {
            Validator::validate_response_size(len as usize)?;
        }
        let body = read_body(&mut response, MAX_RESPONSE_SIZE).await?;
        debug!(id, status, body_len = body.len(), "Received response");

        decode_response(status, &body, &url)
    }

    /// Reads `data` until EOF, hashes it and submits the digests.
    ///
    /// Returns the secret token needed to retrieve the proof later.
    #[instrument(skip(self, data))]
    pub async fn add<D: Read>(&self, data: D) -> Result<Vec<u8>> {
        let digests = Digests::from_reader(data)?;
        let request = AddRequest {
            sha2_256: digests.sha2_256().to_vec(),
            sha3_512: digests.sha3_512().to_vec(),
        };
        let response = self.send(&request).await?;
        info!(
            sha2_256 = %digests.sha2_256_hex(),
            approximate_timestamp = %response.approximate_timestamp,
            "Submitted document"
        );
        Ok(response.token)
    }

    /// Like [`add`](Self::add) for an in-memory buffer.
    pub async fn add_slice(&self, data: &[u8]) -> Result<Vec<u8>> {
        self.add(data).await
    }

    /// Retrieves and verifies the proof for `data`, submitted earlier with
    /// [`add`](Self::add) which returned `token`.
    ///
    /// Returns [`ProofError::NotYetProvable`] while the service is still
    /// processing the item.
    #[instrument(skip(self, data, token))]
    pub async fn prove<D: Read>(&self, data: D, token: &[u8]) -> Result<ProvenDocument> {
        let digests = Digests::from_reader(data)?;
        Validator::validate_token(token)?;

        let request = ProveRequest {
            token: token.to_vec(),
            sha2_256: digests.sha2_256().to_vec(),
        };
        let response = self.send(&request).await?;
        let proven = verify_prove_response(&digests, &response)?;

        info!(
            timestamp = proven.timestamp,
            references = proven.references.len(),
            "Verified existence proof"
        );
        Ok(proven)
    }

    /// Like [`prove`](Self::prove) for an in-memory buffer.
    pub async fn prove_slice(&self, data: &[u8], token: &[u8]) -> Result<ProvenDocument> {
        self.prove(data, token).await
    }

    /// Fetches the latest state of the chain.
    #[instrument(skip(self))]
    pub async fn latest(&self) -> Result<ChainHead> {
        let response = self.send(&LatestRequest).await?;
        Ok(ChainHead {
            timestamp: parse_nanos(&response.timestamp)?,
            sha2_256: response.sha2_256,
            sha3_512: response.sha3_512,
        })
    }

    /// Fetches the fixpoints stored by the service.
    #[instrument(skip(self))]
    pub async fn fixpoints(&self) -> Result<Vec<Fixpoint>> {
        let response = self.send(&FixpointsRequest).await?;
        response
            .points
            .ok_or_else(|| ProofError::remote("empty response returned"))
    }
}

/// Reads a response body chunk by chunk, failing as soon as it exceeds
/// `limit` bytes.
async fn read_body(response: &mut reqwest::Response, limit: usize) -> Result<Vec<u8>> {
    let mut body = Vec::new();
    while let Some(chunk) = response.chunk().await? {
        if body.len() + chunk.len() > limit {
            return Err(ProofError::validation(format!(
                "Response too large: exceeds maximum of {} bytes",
                limit
            )));
        }
        body.extend_from_slice(&chunk);
    }
    Ok(body)
}

/// Maps a raw HTTP response to a typed result.
///
/// 404 is special cased: the service answers it for items it has not
/// handled yet.
pub fn decode_response<T: serde::de::DeserializeOwned>(
    status: u16,
    body: &[u8],
    url: &str,
) -> Result<T> {
    match status {
        200 => serde_json::from_slice(body)
            .map_err(|e| ProofError::serialization(format!("Failed to parse response: {}", e))),
        400 => {
            let err: ErrorBody = serde_json::from_slice(body).map_err(|e| {
                ProofError::serialization(format!("Failed to parse error response: {}", e))
            })?;
            Err(ProofError::remote(format!("400: {}", err.error)))
        }
        404 => Err(ProofError::NotYetProvable(ProofStatus::NotFound)),
        other => Err(ProofError::transport(format!(
            "unexpected response code {} {}",
            other, url
        ))),
    }
}

/// Checks a prove response against the locally computed digests and
/// verifies its proof for both of them.
pub fn verify_prove_response(digests: &Digests, response: &ProveResponse) -> Result<ProvenDocument> {
    if response.sha2_256.as_slice() != digests.sha2_256().as_slice() {
        return Err(ProofError::invalid_input(
            "the hash does not match, did you add inconsistent hashes? (sha2_256)",
        ));
    }
    if response.sha3_512.as_slice() != digests.sha3_512().as_slice() {
        return Err(ProofError::invalid_input(
            "the hash does not match, did you add inconsistent hashes? (sha3_512)",
        ));
    }

    match response.status.parse::<ProofStatus>()? {
        ProofStatus::Provable => {}
        status => return Err(ProofError::NotYetProvable(status)),
    }

    let timestamp = parse_timestamp(&response.timestamp)?;

    let verifier = Verifier::default();
    let mut references = verifier.verify(&response.proof, digests.sha2_256(), Some(timestamp))?;
    references.extend(verifier.verify(&response.proof, digests.sha3_512(), Some(timestamp))?);

    Ok(ProvenDocument {
        timestamp,
        references,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::proof::{Proof, Reference, SHA2_256, SHA3_512};
    use crate::webapi::types::{AddResponse, FixpointsResponse};
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::{TcpListener, TcpStream};
    use tokio::task::JoinHandle;

    const TS: i64 = 1_488_371_400_000_000_000;

    /// A provable response with the timestamp and both digests as separate
    /// literals feeding one anchored chain.
    fn provable_response(digests: &Digests) -> ProveResponse {
        let mut proof = Proof::new();
        let ts = proof.push_literal(TS.to_be_bytes().to_vec());
        let s2 = proof.push_literal(digests.sha2_256().to_vec());
        let s3 = proof.push_literal(digests.sha3_512().to_vec());
        let leaf = proof.push_operation(SHA2_256, vec![ts, s2, s3]);
        let anchor = proof.push_operation(SHA3_512, vec![leaf]);
        proof.push_reference(Reference::new(anchor, "https://example.org/anchor"));

        ProveResponse {
            timestamp: TS.to_string(),
            sha2_256: digests.sha2_256().to_vec(),
            sha3_512: digests.sha3_512().to_vec(),
            proof,
            status: "provable".to_string(),
        }
    }

    #[test]
    fn test_verify_prove_response() {
        let digests = Digests::from_slice(b"my document").unwrap();
        let proven = verify_prove_response(&digests, &provable_response(&digests)).unwrap();

        assert_eq!(proven.timestamp, TS);
        assert_eq!(proven.stored_at().timestamp(), 1_488_371_400);
        // Once for each digest
        assert_eq!(proven.references.len(), 2);
        assert_eq!(proven.references[0], proven.references[1]);
        assert_eq!(proven.references[0].hash_functions(), &["sha2_256", "sha3_512"]);
    }

    #[test]
    fn test_prove_response_digest_mismatch() {
        let digests = Digests::from_slice(b"my document").unwrap();
        let mut response = provable_response(&digests);
        response.sha3_512[0] ^= 1;
        assert!(matches!(
            verify_prove_response(&digests, &response),
            Err(ProofError::InvalidInput(_))
        ));
    }

    #[test]
    fn test_prove_response_status() {
        let digests = Digests::from_slice(b"my document").unwrap();
        let mut response = provable_response(&digests);

        response.status = "chained".to_string();
        assert!(matches!(
            verify_prove_response(&digests, &response),
            Err(ProofError::NotYetProvable(ProofStatus::InChain))
        ));

        response.status = "received".to_string();
        assert!(matches!(
            verify_prove_response(&digests, &response),
            Err(ProofError::NotYetProvable(ProofStatus::Received))
        ));

        response.status = "lost".to_string();
        assert!(matches!(
            verify_prove_response(&digests, &response),
            Err(ProofError::Remote(_))
        ));
    }

    #[test]
    fn test_prove_response_bad_timestamp() {
        let digests = Digests::from_slice(b"my document").unwrap();
        let mut response = provable_response(&digests);
        response.timestamp = "soon".to_string();
        assert!(matches!(
            verify_prove_response(&digests, &response),
            Err(ProofError::Remote(_))
        ));
    }

    #[test]
    fn test_prove_response_wrong_timestamp_does_not_apply() {
        let digests = Digests::from_slice(b"my document").unwrap();
        let mut response = provable_response(&digests);
        response.timestamp = (TS + 1).to_string();
        assert!(matches!(
            verify_prove_response(&digests, &response),
            Err(ProofError::DoesNotApply)
        ));
    }

    #[test]
    fn test_decode_response_codes() {
        let ok: AddResponse = decode_response(
            200,
            br#"{"token":"AAECAwQFBgcICQoLDA0ODw==","approximate_timestamp":"1"}"#,
            "u",
        )
        .unwrap();
        assert_eq!(ok.token, (0u8..16).collect::<Vec<u8>>());

        let err = decode_response::<AddResponse>(400, br#"{"Error":"bad hash"}"#, "u").unwrap_err();
        assert!(matches!(&err, ProofError::Remote(msg) if msg.contains("bad hash")));

        let err = decode_response::<FixpointsResponse>(404, b"", "u").unwrap_err();
        assert!(matches!(
            err,
            ProofError::NotYetProvable(ProofStatus::NotFound)
        ));

        let err = decode_response::<FixpointsResponse>(503, b"", "http://x/fixpoints").unwrap_err();
        assert!(matches!(&err, ProofError::Transport(msg) if msg.contains("503")));

        assert!(matches!(
            decode_response::<AddResponse>(200, b"<html>", "u"),
            Err(ProofError::Serialization(_))
        ));
    }

    #[test]
    fn test_config_from_vars() {
        let config = ClientConfig::from_vars(|_| None).unwrap();
        assert_eq!(config, ClientConfig::default());
        assert_eq!(config.endpoint, DEFAULT_ENDPOINT);

        let config = ClientConfig::from_vars(|key| match key {
            ENDPOINT_ENV => Some("http://localhost:8080/core/".to_string()),
            TIMEOUT_ENV => Some("5".to_string()),
            _ => None,
        })
        .unwrap();
        assert_eq!(config.endpoint, "http://localhost:8080/core/");
        assert_eq!(config.timeout, Duration::from_secs(5));

        let err = ClientConfig::from_vars(|key| (key == TIMEOUT_ENV).then(|| "soon".to_string()))
            .unwrap_err();
        assert!(matches!(err, ProofError::Config(_)));
    }

    /// Serves `response` verbatim to one connection and returns the raw
    /// request it received.
    async fn serve_once(response: String) -> (String, JoinHandle<String>) {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let endpoint = format!("http://{}/core", listener.local_addr().unwrap());
        let handle = tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.unwrap();
            let request = read_request(&mut socket).await;
            socket.write_all(response.as_bytes()).await.unwrap();
            socket.shutdown().await.unwrap();
            request
        });
        (endpoint, handle)
    }

    async fn read_request(socket: &mut TcpStream) -> String {
        let mut buf = Vec::new();
        let mut chunk = [0u8; 4096];
        loop {
            let n = socket.read(&mut chunk).await.unwrap();
            if n == 0 {
                break;
            }
            buf.extend_from_slice(&chunk[..n]);

            let text = String::from_utf8_lossy(&buf).to_string();
            if let Some(end) = text.find("\r\n\r\n") {
                let body_len = text[..end]
                    .lines()
                    .filter_map(|line| line.split_once(':'))
                    .find(|(name, _)| name.eq_ignore_ascii_case("content-length"))
                    .and_then(|(_, value)| value.trim().parse::<usize>().ok())
                    .unwrap_or(0);
                if buf.len() >= end + 4 + body_len {
                    break;
                }
            }
        }
        String::from_utf8(buf).unwrap()
    }

    fn http_response(status: &str, body: &str) -> String {
        format!(
            "HTTP/1.1 {}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
            status,
            body.len(),
            body
        )
    }

    #[tokio::test]
    async fn test_prove_over_http() {
        let document = b"my document";
        let digests = Digests::from_slice(document).unwrap();
        let body = serde_json::to_string(&provable_response(&digests)).unwrap();
        let (endpoint, server) = serve_once(http_response("200 OK", &body)).await;

        let client = Client::with_endpoint(endpoint).unwrap();
        let token = [7u8; 16];
        let proven = client.prove_slice(document, &token).await.unwrap();
        assert_eq!(proven.timestamp, TS);
        assert_eq!(proven.references.len(), 2);
        assert_eq!(proven.references[0].locator(), "https://example.org/anchor");

        let request = server.await.unwrap();
        let lower = request.to_ascii_lowercase();
        assert!(request.starts_with("POST /core/prove HTTP/1.1\r\n"));
        assert!(lower.contains("content-type: application/json\r\n"));
        assert!(lower.contains("x-client: existproof\r\n"));
        assert!(request.contains(&format!("\"sha2_256\":\"{}\"", digests.sha2_256_base64())));
        assert!(request.contains("\"token\":\"BwcHBwcHBwcHBwcHBwcHBw==\""));
    }

    #[tokio::test]
    async fn test_not_found_over_http() {
        let (endpoint, server) = serve_once(http_response("404 Not Found", "")).await;

        let client = Client::with_endpoint(endpoint).unwrap();
        let err = client.latest().await.unwrap_err();
        assert!(matches!(
            err,
            ProofError::NotYetProvable(ProofStatus::NotFound)
        ));

        let request = server.await.unwrap();
        assert!(request.starts_with("POST /core/latest HTTP/1.1\r\n"));
        assert!(request.ends_with("\r\n\r\n"));
    }

    #[tokio::test]
    async fn test_body_limit_without_content_length() {
        // Body delimited by connection close, no length announced
        let raw = format!("HTTP/1.1 200 OK\r\nConnection: close\r\n\r\n{}", "x".repeat(4096));
        let (endpoint, server) = serve_once(raw).await;

        let mut response = reqwest::Client::new()
            .post(format!("{}/latest", endpoint))
            .send()
            .await
            .unwrap();
        assert!(response.content_length().is_none());
        assert!(matches!(
            read_body(&mut response, 1024).await,
            Err(ProofError::Validation(_))
        ));
        let _ = server.await;
    }

    #[test]
    fn test_url_joining() {
        let client = Client::with_endpoint("http://localhost:8080/core/").unwrap();
        assert_eq!(client.url("prove"), "http://localhost:8080/core/prove");
        assert_eq!(client.config().client_name, "existproof");
    }
}
