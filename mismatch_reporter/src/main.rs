use std::path::Path;
use std::process::ExitCode;

use anyhow::{Context, bail};
use clap::Parser;
use tracing_subscriber::EnvFilter;

use mismatch_vision::{BatchComparator, ComparisonPipeline, PairSource};

mod cli;
mod manifest;
mod report;

use cli::{Cli, Command};

#[tokio::main]
async fn main() -> anyhow::Result<ExitCode> {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&cli.log_level)))
        .with_target(true)
        .init();

    tracing::info!("mismatch_reporter v{}", env!("CARGO_PKG_VERSION"));

    let config = cli.detector_config()?;
    tracing::debug!(?config, "detector configuration");
    let pipeline = ComparisonPipeline::new(config)?;

    let mismatch_total = match &cli.command {
        Command::Compare {
            reference,
            candidate,
            out_dir,
        } => compare_one(&pipeline, reference, candidate, out_dir)?,
        Command::Batch {
            manifest,
            out_dir,
            workers,
        } => compare_batch(pipeline, manifest, out_dir, *workers).await?,
    };

    if cli.fail_on_mismatch && mismatch_total > 0 {
        tracing::warn!(mismatches = mismatch_total, "mismatches found");
        return Ok(ExitCode::FAILURE);
    }
    Ok(ExitCode::SUCCESS)
}

fn compare_one(pipeline: &ComparisonPipeline, reference: &Path, candidate: &Path, out_dir: &Path) -> anyhow::Result<usize> {
    let report = pipeline
        .compare_files(reference, candidate)
        .with_context(|| format!("comparing {} against {}", candidate.display(), reference.display()))?;
    let written = report::write_report(&report, reference, candidate, out_dir)?;
    println!(
        "{} mismatch(es) found. Report saved to {}",
        report.mismatches.len(),
        written.markdown.display()
    );
    Ok(report.mismatches.len())
}

async fn compare_batch(
    pipeline: ComparisonPipeline,
    manifest_path: &Path,
    out_dir: &Path,
    workers: Option<usize>,
) -> anyhow::Result<usize> {
    let entries = manifest::load(manifest_path)?;
    let comparator = match workers {
        Some(n) => BatchComparator::with_workers(pipeline, n),
        None => BatchComparator::new(pipeline),
    };
    tracing::info!(pairs = entries.len(), workers = comparator.worker_count(), "batch started");

    let sources = entries
        .iter()
        .map(|entry| PairSource::Files {
            reference: entry.reference.clone(),
            candidate: entry.candidate.clone(),
        })
        .collect();
    let results = comparator.compare_all(sources).await;
    comparator.shutdown().await;

    let mut mismatch_total = 0;
    let mut failures = 0;
    for (entry, result) in entries.iter().zip(results) {
        match result {
            Ok(report) => {
                let dir = out_dir.join(&entry.name);
                let written = report::write_report(&report, &entry.reference, &entry.candidate, &dir)?;
                println!(
                    "{}: {} mismatch(es). Report saved to {}",
                    entry.name,
                    report.mismatches.len(),
                    written.markdown.display()
                );
                mismatch_total += report.mismatches.len();
            }
            Err(err) => {
                tracing::error!(name = %entry.name, error = %err, "comparison failed");
                failures += 1;
            }
        }
    }

    if failures > 0 {
        bail!("{failures} of {} comparisons failed", entries.len());
    }
    Ok(mismatch_total)
}
