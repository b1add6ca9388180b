//! Command-line argument parsing for existproof.

use crate::error::{ProofError, Result};
use std::path::PathBuf;

/// Command-line interface commands
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Digest {
        file: PathBuf,
    },
    Verify {
        proof_file: PathBuf,
        file: PathBuf,
        timestamp: Option<i64>,
        raw: bool,
    },
    Add {
        file: PathBuf,
    },
    Prove {
        file: PathBuf,
        token: String,
    },
    Latest,
    Fixpoints,
    Help,
}

/// Parsed command line
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Options {
    /// Service endpoint given with `--endpoint`
    pub endpoint: Option<String>,
    pub command: Command,
}

/// Parse the process arguments
pub fn parse_args() -> Result<Options> {
    let args: Vec<String> = std::env::args().skip(1).collect();
    parse_args_from(&args)
}

/// Parse arguments (without the program name) into options
pub fn parse_args_from(args: &[String]) -> Result<Options> {
    let mut endpoint = None;
    let mut raw = false;
    let mut positional: Vec<&str> = Vec::new();

    let mut iter = args.iter();
    while let Some(arg) = iter.next() {
        match arg.as_str() {
            "--endpoint" => {
                let url = iter
                    .next()
                    .ok_or_else(|| ProofError::invalid_input("--endpoint requires a URL"))?;
                endpoint = Some(url.clone());
            }
            "--raw" => raw = true,
            "-h" | "--help" => {
                return Ok(Options {
                    endpoint,
                    command: Command::Help,
                })
            }
            s if s.starts_with("--") => {
                return Err(ProofError::invalid_input(format!("Unknown option '{}'", s)))
            }
            s => positional.push(s),
        }
    }

    let Some((&name, rest)) = positional.split_first() else {
        return Ok(Options {
            endpoint,
            command: Command::Help,
        });
    };

    let command = match name {
        "digest" => {
            let [file] = expect_args::<1>(name, rest, "<file>")?;
            Command::Digest { file: file.into() }
        }

        "verify" => {
            if rest.len() == 3 {
                let timestamp = rest[2].parse::<i64>().map_err(|_| {
                    ProofError::invalid_input(format!("Invalid timestamp '{}'", rest[2]))
                })?;
                Command::Verify {
                    proof_file: rest[0].into(),
                    file: rest[1].into(),
                    timestamp: Some(timestamp),
                    raw,
                }
            } else {
                let [proof_file, file] =
                    expect_args::<2>(name, rest, "<proof.json> <file> [timestamp]")?;
                Command::Verify {
                    proof_file: proof_file.into(),
                    file: file.into(),
                    timestamp: None,
                    raw,
                }
            }
        }

        "add" => {
            let [file] = expect_args::<1>(name, rest, "<file>")?;
            Command::Add { file: file.into() }
        }

        "prove" => {
            let [file, token] = expect_args::<2>(name, rest, "<file> <token>")?;
            Command::Prove {
                file: file.into(),
                token: token.to_string(),
            }
        }

        "latest" => {
            expect_args::<0>(name, rest, "")?;
            Command::Latest
        }

        "fixpoints" => {
            expect_args::<0>(name, rest, "")?;
            Command::Fixpoints
        }

        "help" => Command::Help,

        other => {
            return Err(ProofError::invalid_input(format!(
                "Unknown command '{}'",
                other
            )))
        }
    };

    Ok(Options { endpoint, command })
}

fn expect_args<'a, const N: usize>(
    command: &str,
    args: &[&'a str],
    usage: &str,
) -> Result<[&'a str; N]> {
    <[&str; N]>::try_from(args).map_err(|_| {
        ProofError::invalid_input(format!(
            "Usage: existproof {} {}",
            command, usage
        ))
    })
}

/// Print usage information
pub fn print_usage() {
    println!("existproof - existence proofs for documents");
    println!("===========================================");
    println!();
    println!("Usage: existproof [--endpoint <url>] <command> [args...]");
    println!();
    println!("Commands:");
    println!("  digest <file>                                Print the SHA2-256 and SHA3-512 digests");
    println!("  verify [--raw] <proof.json> <file> [ts]      Verify a proof offline");
    println!("  add <file>                                   Submit a document's digests");
    println!("  prove <file> <token>                         Fetch and verify a proof");
    println!("  latest                                       Show the latest chain state");
    println!("  fixpoints                                    List the service's fixpoints");
    println!();
    println!("Options:");
    println!("  --endpoint <url>   Service endpoint (default from EXISTPROOF_ENDPOINT)");
    println!("  --raw              Verify against the file's bytes instead of its digests");
    println!();
    println!("Examples:");
    println!("  existproof add contract.pdf");
    println!("  existproof prove contract.pdf AAECAwQFBgcICQoLDA0ODw==");
    println!("  existproof verify proof.json contract.pdf 1488371400000000000");
}
