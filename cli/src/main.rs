//! CUSTOS operator CLI.
//!
//! Appends, verifies, and reports over an append-only JSONL audit journal.
//!
//! Usage:
//!   custos --journal audit.jsonl append --event-type USER_LOGIN --actor u1
//!   custos --journal audit.jsonl verify
//!   custos --journal audit.jsonl verify --from 1001 --anchor <hash>
//!   custos --journal audit.jsonl trail --actor clin-041
//!   custos --journal audit.jsonl summary
//!   custos --journal audit.jsonl seed
//!
//! `verify` exits 0 when the chain is intact and 2 when a break was found,
//! so scheduled jobs can alert on the exit code alone.

use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use custos_contracts::{AuditEvent, AuditQuery, CustosResult, MetadataValue, VerifyRequest};
use custos_core::{AuditChain, AuditStore, CustosConfig, EventRecorder, RecordOutcome};
use custos_store::JournalStore;
use custos_verify::{summarize, IntegrityVerifier};

// ── CLI definition ────────────────────────────────────────────────────────────

/// CUSTOS — tamper-evident audit trail tooling.
#[derive(Parser)]
#[command(
    name = "custos",
    about = "Tamper-evident audit trail: append, verify, report",
    long_about = "Operates on an append-only JSONL journal of hash-chained audit\n\
                  records. Verification recomputes every hash and chain link and\n\
                  reports the earliest divergence, if any."
)]
struct Cli {
    /// Path of the append-only JSONL journal.
    #[arg(long, global = true, default_value = "custos-journal.jsonl")]
    journal: PathBuf,

    /// Optional TOML configuration file.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Append one event to the chain.
    Append {
        /// Event-type tag, e.g. USER_LOGIN.
        #[arg(long)]
        event_type: String,
        /// Acting principal.
        #[arg(long)]
        actor: Option<String>,
        /// Subject record.
        #[arg(long)]
        subject: Option<String>,
        /// Metadata entry as key=value; repeatable.
        #[arg(long = "meta", value_parser = parse_meta)]
        meta: Vec<(String, MetadataValue)>,
    },
    /// Replay a range of the chain and report the earliest divergence.
    Verify {
        /// First sequence to verify (default: start of the journal).
        #[arg(long)]
        from: Option<u64>,
        /// Last sequence to verify, inclusive (default: tail).
        #[arg(long)]
        to: Option<u64>,
        /// Trusted hash of the record preceding --from, from a previous
        /// run's last_good_hash.
        #[arg(long)]
        anchor: Option<String>,
        /// Continue past the first break and flag the remainder suspect.
        #[arg(long)]
        full_report: bool,
    },
    /// List records matching the given filters, oldest first.
    Trail {
        #[arg(long)]
        event_type: Option<String>,
        #[arg(long)]
        actor: Option<String>,
        #[arg(long)]
        subject: Option<String>,
        #[arg(long)]
        limit: Option<u64>,
    },
    /// Aggregate counts by event type, actor, and day.
    Summary,
    /// Append the reference clinic-morning walkthrough events.
    Seed,
}

/// Parse a `key=value` metadata argument, inferring the scalar type.
fn parse_meta(s: &str) -> Result<(String, MetadataValue), String> {
    let (key, value) = s
        .split_once('=')
        .ok_or_else(|| format!("metadata '{}' is not key=value", s))?;
    if key.is_empty() {
        return Err(format!("metadata '{}' has an empty key", s));
    }

    let value = if let Ok(b) = value.parse::<bool>() {
        MetadataValue::Bool(b)
    } else if let Ok(i) = value.parse::<i64>() {
        MetadataValue::Int(i)
    } else if let Ok(f) = value.parse::<f64>() {
        MetadataValue::Float(f)
    } else {
        MetadataValue::Str(value.to_string())
    };

    Ok((key.to_string(), value))
}

// ── Entry point ───────────────────────────────────────────────────────────────

fn main() -> ExitCode {
    // Structured logging; set RUST_LOG=debug for verbose output.
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_target(false)
        .compact()
        .init();

    let cli = Cli::parse();

    match run(cli) {
        Ok(code) => code,
        Err(e) => {
            eprintln!("custos: {}", e);
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> CustosResult<ExitCode> {
    let config = match &cli.config {
        Some(path) => CustosConfig::from_file(path)?,
        None => CustosConfig::default(),
    };

    let store = Arc::new(JournalStore::open(&cli.journal)?);

    match cli.command {
        Command::Append {
            event_type,
            actor,
            subject,
            meta,
        } => {
            let mut event = AuditEvent::new(event_type);
            if let Some(actor) = actor {
                event = event.with_actor(actor);
            }
            if let Some(subject) = subject {
                event = event.with_subject(subject);
            }
            for (key, value) in meta {
                event = event.with_meta(key, value);
            }

            let chain = AuditChain::with_config(store, config.chain);
            let record = chain.append(event)?;
            println!(
                "{}",
                serde_json::json!({
                    "sequence": record.sequence,
                    "hash": record.hash,
                    "timestamp": record.timestamp,
                })
            );
            Ok(ExitCode::SUCCESS)
        }

        Command::Verify {
            from,
            to,
            anchor,
            full_report,
        } => {
            let report = IntegrityVerifier::new(&*store).verify(&VerifyRequest {
                from_seq: from,
                to_seq: to,
                anchor,
                full_report,
            })?;

            println!(
                "{}",
                serde_json::to_string_pretty(&report)
                    .expect("verification report serializes")
            );
            if report.valid {
                Ok(ExitCode::SUCCESS)
            } else {
                Ok(ExitCode::from(2))
            }
        }

        Command::Trail {
            event_type,
            actor,
            subject,
            limit,
        } => {
            let query = AuditQuery {
                event_type,
                actor_id: actor,
                subject_id: subject,
                limit,
                ..AuditQuery::default()
            };
            for record in store.query(&query)? {
                println!(
                    "{}",
                    serde_json::to_string(&record).expect("audit record serializes")
                );
            }
            Ok(ExitCode::SUCCESS)
        }

        Command::Summary => {
            let records = store.scan(custos_contracts::FIRST_SEQUENCE, None)?;
            let summary = summarize(&records);
            println!(
                "{}",
                serde_json::to_string_pretty(&summary).expect("audit summary serializes")
            );
            Ok(ExitCode::SUCCESS)
        }

        Command::Seed => {
            let chain = AuditChain::with_config(store, config.chain);
            let recorder = EventRecorder::spawn(chain, config.recorder)?;

            let mut recorded = 0u32;
            let mut suppressed = 0u32;
            for event in custos_ref_records::walkthrough::clinic_morning() {
                match recorder.record(event)? {
                    RecordOutcome::Recorded(_) => recorded += 1,
                    RecordOutcome::Suppressed => suppressed += 1,
                }
            }

            println!("seeded {} events ({} suppressed)", recorded, suppressed);
            Ok(ExitCode::SUCCESS)
        }
    }
}
