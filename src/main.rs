// src/main.rs
//! Batch dedupe report: feed a JSON file of incoming customer records
//! through the matching core against an in-memory store and report what
//! happened per record. Parsing and field validation happen upstream;
//! this binary only exercises the core the way the import flow does.

use anyhow::{Context, Result};
use clap::Parser;
use log::{info, warn};
use serde::Serialize;
use std::fs;
use std::path::PathBuf;

use cdp_lib::matching::merge_records;
use cdp_lib::{CustomerRecord, InMemoryStore, MatchEngine, MatchingConfig, MergeAction};

#[derive(Parser, Debug)]
#[command(
    name = "match-report",
    about = "Run the dedupe pipeline over a batch of customer records"
)]
struct Args {
    /// JSON file holding an array of incoming customer records
    #[arg(short, long)]
    input: PathBuf,

    /// Override CDP_MATCH_THRESHOLD for this run
    #[arg(long)]
    threshold: Option<f64>,

    /// Allow suggest-merge on document-blocked pairs (manual override)
    #[arg(long)]
    force_merge: bool,

    /// Source label recorded on created and merged records
    #[arg(long, default_value = "csv_import")]
    source: String,
}

#[derive(Debug, Default, Serialize)]
struct ImportSummary {
    processed: usize,
    created: usize,
    merged: usize,
    suggested: usize,
    rejected: usize,
    ambiguous: usize,
}

fn main() -> Result<()> {
    env_logger::init();
    let args = Args::parse();

    let mut config = MatchingConfig::from_env().context("Invalid matching configuration")?;
    if let Some(threshold) = args.threshold {
        config.match_threshold = threshold;
        config = config.validated().context("Invalid --threshold override")?;
    }
    let engine = MatchEngine::new(config);

    let raw = fs::read_to_string(&args.input)
        .with_context(|| format!("Failed to read {}", args.input.display()))?;
    let incoming: Vec<CustomerRecord> =
        serde_json::from_str(&raw).context("Input must be a JSON array of customer records")?;
    info!("Loaded {} incoming record(s) from {}", incoming.len(), args.input.display());

    let mut store = InMemoryStore::new();
    let mut summary = ImportSummary::default();

    for record in incoming {
        if record.is_empty() {
            warn!("Skipping record {} with no data fields", record.id);
            continue;
        }
        summary.processed += 1;

        let decision = engine.match_record(&record, &store, args.force_merge)?;
        if !decision.ambiguous_with.is_empty() {
            summary.ambiguous += 1;
        }

        match decision.action {
            MergeAction::AutoMerge => {
                let target_id = decision
                    .target_record_id
                    .context("auto-merge decision carried no target")?;
                let existing = store
                    .get(target_id)
                    .context("merge target missing from store")?
                    .clone();
                let (mut merged, changes) = merge_records(&existing, &record, &args.source);
                merged.confidence_score =
                    merged.confidence_score.max(decision.composite_score);
                info!(
                    "Merged {} into {} (score {:.3}, {} change(s))",
                    record.id,
                    target_id,
                    decision.composite_score,
                    changes.len()
                );
                store.upsert(merged);
                summary.merged += 1;
            }
            MergeAction::SuggestMerge => {
                info!(
                    "Suggested merge of {} into {:?} (score {:.3}); awaiting confirmation",
                    record.id, decision.target_record_id, decision.composite_score
                );
                summary.suggested += 1;
            }
            MergeAction::Reject => {
                warn!(
                    "Rejected merge of {} against {:?}: {} conflict(s)",
                    record.id,
                    decision.target_record_id,
                    decision.conflicts.len()
                );
                summary.rejected += 1;
            }
            MergeAction::CreateNew => {
                store.upsert(record);
                summary.created += 1;
            }
        }
    }

    info!(
        "Batch complete: {} processed, {} created, {} merged, store now holds {} record(s)",
        summary.processed,
        summary.created,
        summary.merged,
        store.len()
    );
    println!("{}", serde_json::to_string_pretty(&summary)?);
    Ok(())
}
