use std::path::PathBuf;

use anyhow::Context;
use clap::{Parser, Subcommand};

use mismatch_vision::{DetectorConfig, GroupingMode};

#[derive(Parser, Debug)]
#[command(
    name = "mismatch_reporter",
    about = "Compare rendered pages against reference images and report visual mismatches"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Path to a detector config file (JSON). Flags below override it.
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Minimum grayscale delta (0-255) for a pixel to count as different.
    #[arg(long, global = true)]
    pub threshold: Option<u8>,

    /// Maximum centroid distance in pixels for regions to be grouped.
    #[arg(long, global = true)]
    pub distance: Option<f64>,

    /// Context margin in pixels around each mismatch crop.
    #[arg(long, global = true)]
    pub margin: Option<u32>,

    /// Group regions transitively instead of first-match single pass.
    #[arg(long, global = true)]
    pub transitive: bool,

    /// Exit with status 1 when any mismatch is found.
    #[arg(long, global = true)]
    pub fail_on_mismatch: bool,

    /// Log level (trace, debug, info, warn, error).
    #[arg(long, default_value = "info", global = true)]
    pub log_level: String,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Compare one reference image against one candidate image.
    Compare {
        /// The expected image, e.g. the design mock-up.
        #[arg(required = true)]
        reference: PathBuf,
        /// The image under test, e.g. a screenshot of the live page.
        #[arg(required = true)]
        candidate: PathBuf,
        /// Directory for crops and reports.
        #[arg(long, default_value = "mismatches")]
        out_dir: PathBuf,
    },
    /// Compare every pair listed in a JSON manifest, concurrently.
    Batch {
        /// JSON array of `{ "name", "reference", "candidate" }` entries.
        #[arg(required = true)]
        manifest: PathBuf,
        /// Directory that receives one sub-directory per entry.
        #[arg(long, default_value = "mismatches")]
        out_dir: PathBuf,
        /// Number of worker tasks. Defaults to the number of CPUs.
        #[arg(long)]
        workers: Option<usize>,
    },
}

impl Cli {
    /// Loads the config file, if any, and applies the command-line overrides.
    pub fn detector_config(&self) -> anyhow::Result<DetectorConfig> {
        let mut config = match &self.config {
            Some(path) => {
                let data = std::fs::read_to_string(path)
                    .with_context(|| format!("reading config {}", path.display()))?;
                serde_json::from_str(&data).with_context(|| format!("parsing config {}", path.display()))?
            }
            None => DetectorConfig::default(),
        };

        if let Some(threshold) = self.threshold {
            config.threshold = threshold;
        }
        if let Some(distance) = self.distance {
            config.grouping_distance = distance;
        }
        if let Some(margin) = self.margin {
            config.margin = margin;
        }
        if self.transitive {
            config.grouping_mode = GroupingMode::Transitive;
        }
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn flags_override_defaults() {
        let cli = Cli::parse_from([
            "mismatch_reporter",
            "--threshold",
            "12",
            "--margin",
            "0",
            "--transitive",
            "compare",
            "a.png",
            "b.png",
        ]);
        let config = cli.detector_config().unwrap();
        assert_eq!(config.threshold, 12);
        assert_eq!(config.margin, 0);
        assert_eq!(config.grouping_distance, 50.0);
        assert_eq!(config.grouping_mode, GroupingMode::Transitive);
        match cli.command {
            Command::Compare { out_dir, .. } => assert_eq!(out_dir, PathBuf::from("mismatches")),
            other => panic!("unexpected command {other:?}"),
        }
    }

    #[test]
    fn config_file_is_read_then_overridden() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("detector.json");
        std::fs::write(&path, r#"{ "threshold": 5, "margin": 7 }"#).unwrap();

        let cli = Cli::parse_from([
            "mismatch_reporter",
            "--config",
            path.to_str().unwrap(),
            "--margin",
            "9",
            "batch",
            "pairs.json",
            "--workers",
            "2",
        ]);
        let config = cli.detector_config().unwrap();
        assert_eq!(config.threshold, 5);
        assert_eq!(config.margin, 9);
    }
}
