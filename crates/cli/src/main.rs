use anyhow::Context;
use clap::{Parser, Subcommand};
use std::collections::HashSet;
use std::convert::Infallible;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use vs_ueid::{
    checksum, max_attempts_from_env_value, normalize, validate, Ueid, UeidCodec, UeidConfig,
};

#[derive(Parser)]
#[command(name = "ueid")]
#[command(about = "Generate and check VS entity identifiers")]
struct Cli {
    /// Salt mixed into generated identifiers (overrides UEID_SALT)
    #[arg(long, global = true)]
    salt: Option<String>,
    /// Maximum generation attempts (overrides UEID_MAX_ATTEMPTS)
    #[arg(long, global = true)]
    max_attempts: Option<u32>,
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate a new UEID
    Generate {
        /// Entity the UEID is for, e.g. an account id
        #[arg(long)]
        context: String,
        /// File of UEIDs already in use, one per line
        #[arg(long)]
        existing: Option<PathBuf>,
    },
    /// Encode input bytes into a UEID
    Encode {
        /// Text to encode (or hex with --hex)
        input: String,
        /// Treat input as hex-encoded bytes
        #[arg(long)]
        hex: bool,
    },
    /// Print the canonical form of a UEID without checking its check character
    Normalize {
        /// Candidate UEID
        input: String,
    },
    /// Check a UEID
    Validate {
        /// Candidate UEID
        input: String,
        /// Print the result as JSON
        #[arg(long)]
        json: bool,
    },
    /// Compute the check character for an 11-character payload
    Checksum {
        /// Payload characters
        payload: String,
    },
}

fn main() -> anyhow::Result<ExitCode> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("vs_ueid=info".parse()?),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();

    if run(&cli)? {
        Ok(ExitCode::SUCCESS)
    } else {
        Ok(ExitCode::FAILURE)
    }
}

/// Runs one command; returns `false` when the input was rejected.
fn run(cli: &Cli) -> anyhow::Result<bool> {
    match &cli.command {
        Some(Commands::Generate { context, existing }) => {
            let codec = UeidCodec::new(resolve_config(cli)?)?;
            let existing = match existing {
                Some(path) => load_existing(path)?,
                None => HashSet::new(),
            };

            let ueid = codec
                .generate_with_collision_avoidance(context, |candidate| {
                    Ok::<_, Infallible>(existing.contains(candidate))
                })
                .context("failed to generate UEID")?;
            println!("{}", ueid);
        }
        Some(Commands::Encode { input, hex: is_hex }) => {
            let codec = UeidCodec::new(resolve_config(cli)?)?;
            let bytes = if *is_hex {
                hex::decode(input.trim()).context("input is not valid hex")?
            } else {
                input.as_bytes().to_vec()
            };
            println!("{}", codec.encode(&bytes)?);
        }
        Some(Commands::Normalize { input }) => match normalize(input) {
            Some(normalized) => println!("{}", normalized),
            None => {
                eprintln!("invalid format: {}", input);
                return Ok(false);
            }
        },
        Some(Commands::Validate { input, json }) => {
            let outcome = validate(input);
            if *json {
                println!("{}", serde_json::to_string(&outcome)?);
            } else if let Some(error) = outcome.error {
                match &outcome.normalized {
                    Some(normalized) => eprintln!("{}: {}", error.reason(), normalized),
                    None => eprintln!("{}: {}", error.reason(), input),
                }
            } else if let Some(normalized) = &outcome.normalized {
                println!("{}", normalized);
            }
            return Ok(outcome.valid);
        }
        Some(Commands::Checksum { payload }) => {
            let check = checksum(payload).context("cannot compute check character")?;
            println!("{}", check);
        }
        None => {
            println!("Use 'ueid --help' for commands");
        }
    }

    Ok(true)
}

/// Flags win over `UEID_SALT` / `UEID_MAX_ATTEMPTS`.
fn resolve_config(cli: &Cli) -> anyhow::Result<UeidConfig> {
    let salt = match &cli.salt {
        Some(salt) => salt.clone(),
        None => std::env::var("UEID_SALT").unwrap_or_default(),
    };
    let max_attempts = match cli.max_attempts {
        Some(n) => n,
        None => max_attempts_from_env_value(std::env::var("UEID_MAX_ATTEMPTS").ok())?,
    };

    Ok(UeidConfig::new(salt, max_attempts)?)
}

/// Reads UEIDs already in use. Blank lines are ignored; unreadable lines are skipped.
fn load_existing(path: &Path) -> anyhow::Result<HashSet<Ueid>> {
    let contents = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read existing UEIDs from {}", path.display()))?;

    let mut existing = HashSet::new();
    for (number, line) in contents.lines().enumerate() {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        match Ueid::parse(line) {
            Ok(ueid) => {
                existing.insert(ueid);
            }
            Err(e) => {
                tracing::warn!(
                    line = number + 1,
                    value = line,
                    error = %e,
                    "skipping unreadable UEID"
                );
            }
        }
    }

    tracing::debug!(count = existing.len(), "loaded existing UEIDs");
    Ok(existing)
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;
    use std::io::Write;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_flags_override_environment() {
        let cli = Cli::try_parse_from([
            "ueid",
            "--salt",
            "pepper",
            "--max-attempts",
            "3",
            "checksum",
            "00000000000",
        ])
        .unwrap();

        let config = resolve_config(&cli).unwrap();
        assert_eq!(config.salt(), "pepper");
        assert_eq!(config.max_attempts(), 3);
    }

    #[test]
    fn test_zero_max_attempts_is_rejected() {
        let cli = Cli::try_parse_from([
            "ueid",
            "--salt",
            "s",
            "--max-attempts",
            "0",
            "generate",
            "--context",
            "a",
        ])
        .unwrap();

        assert!(resolve_config(&cli).is_err());
    }

    #[test]
    fn test_load_existing_normalizes_and_skips_bad_lines() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "VS-WERC-8GMR-ZGEW").unwrap();
        writeln!(file, "  vs-q9wi-dfwf-o77z  ").unwrap();
        writeln!(file).unwrap();
        writeln!(file, "VS-WERC-8GMR-ZGE0").unwrap();
        writeln!(file, "garbage").unwrap();

        let existing = load_existing(file.path()).unwrap();

        assert_eq!(existing.len(), 2);
        assert!(existing.contains(&Ueid::parse("VS-WERC-8GMR-ZGEW").unwrap()));
        assert!(existing.contains(&Ueid::parse("VS-Q9W1-DFWF-077Z").unwrap()));
    }

    #[test]
    fn test_load_existing_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let err = load_existing(&dir.path().join("missing.txt")).unwrap_err();

        assert!(err.to_string().contains("failed to read existing UEIDs"));
    }

    #[test]
    fn test_run_reports_rejected_input() {
        let normalize_bad =
            Cli::try_parse_from(["ueid", "normalize", "AB-1234-5678-9ABC"]).unwrap();
        assert!(!run(&normalize_bad).unwrap());

        let validate_bad =
            Cli::try_parse_from(["ueid", "validate", "VS-WERC-8GMR-ZGE0"]).unwrap();
        assert!(!run(&validate_bad).unwrap());

        let validate_good =
            Cli::try_parse_from(["ueid", "validate", "--json", "vs werc 8gmr zgew"]).unwrap();
        assert!(run(&validate_good).unwrap());
    }

    #[test]
    fn test_run_checksum_rejects_bad_payload() {
        let cli = Cli::try_parse_from(["ueid", "checksum", "SHORT"]).unwrap();
        assert!(run(&cli).is_err());
    }

    #[test]
    fn test_run_encode_hex() {
        let args = ["ueid", "--salt", "", "--max-attempts", "1", "encode", "--hex"];

        let cli = Cli::try_parse_from(args.into_iter().chain(["00ff"])).unwrap();
        assert!(run(&cli).unwrap());

        let bad = Cli::try_parse_from(args.into_iter().chain(["zz"])).unwrap();
        assert!(run(&bad).is_err());
    }
}
