use std::fmt::Write as _;
use std::path::{Path, PathBuf};

use anyhow::Context;

use mismatch_vision::ComparisonReport;
use mismatch_vision::core_modules::utils::image_helper;

pub const MARKDOWN_FILE: &str = "mismatches.md";
pub const JSON_FILE: &str = "mismatches.json";

/// Files produced for one comparison.
#[derive(Debug)]
pub struct WrittenReport {
    pub markdown: PathBuf,
    pub json: PathBuf,
    pub crops: Vec<PathBuf>,
}

pub fn candidate_crop_name(index: usize) -> String {
    format!("mismatch_{index}.png")
}

pub fn reference_crop_name(index: usize) -> String {
    format!("ref_mismatch_{index}.png")
}

/// Writes the crops, the Markdown table and the JSON summary into `out_dir`.
pub fn write_report(
    report: &ComparisonReport,
    reference: &Path,
    candidate: &Path,
    out_dir: &Path,
) -> anyhow::Result<WrittenReport> {
    std::fs::create_dir_all(out_dir).with_context(|| format!("creating {}", out_dir.display()))?;

    let mut crops = Vec::with_capacity(report.mismatches.len() * 2);
    for record in &report.mismatches {
        let candidate_path = out_dir.join(candidate_crop_name(record.index()));
        let reference_path = out_dir.join(reference_crop_name(record.index()));
        image_helper::save_png(&candidate_path, &record.candidate_crop)
            .with_context(|| format!("writing {}", candidate_path.display()))?;
        image_helper::save_png(&reference_path, &record.reference_crop)
            .with_context(|| format!("writing {}", reference_path.display()))?;
        crops.push(candidate_path);
        crops.push(reference_path);
    }

    let markdown = out_dir.join(MARKDOWN_FILE);
    std::fs::write(&markdown, render_markdown(report, reference, candidate))
        .with_context(|| format!("writing {}", markdown.display()))?;

    let json = out_dir.join(JSON_FILE);
    let summary = serde_json::to_string_pretty(&report.summary())?;
    std::fs::write(&json, summary).with_context(|| format!("writing {}", json.display()))?;

    tracing::info!(
        dir = %out_dir.display(),
        mismatches = report.mismatches.len(),
        "report written"
    );

    Ok(WrittenReport { markdown, json, crops })
}

/// Renders the mismatch table: number, candidate crop, reference crop.
pub fn render_markdown(report: &ComparisonReport, reference: &Path, candidate: &Path) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "# Image Mismatches\n");
    let _ = writeln!(out, "- Reference image: `{}`", reference.display());
    let _ = writeln!(out, "- Candidate image: `{}`", candidate.display());
    let _ = writeln!(out, "- Size: {}x{}", report.width, report.height);
    let _ = writeln!(out, "- Mismatches: {}\n", report.mismatches.len());

    if report.is_match() {
        let _ = writeln!(out, "No mismatches found.");
        return out;
    }

    let _ = writeln!(out, "| No. | Mismatched Image | Reference Image |");
    let _ = writeln!(out, "| --- | --- | --- |");
    for record in &report.mismatches {
        let i = record.index();
        let _ = writeln!(
            out,
            "| {i} | ![mismatch {i}]({}) | ![reference {i}]({}) |",
            candidate_crop_name(i),
            reference_crop_name(i)
        );
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{DynamicImage, Rgb, RgbImage};
    use mismatch_vision::ComparisonPipeline;

    fn report_with_squares(origins: &[(u32, u32)]) -> ComparisonReport {
        let reference = RgbImage::from_pixel(300, 300, Rgb([255, 255, 255]));
        let mut candidate = reference.clone();
        for &(ox, oy) in origins {
            for y in oy..oy + 10 {
                for x in ox..ox + 10 {
                    candidate.put_pixel(x, y, Rgb([0, 0, 0]));
                }
            }
        }
        ComparisonPipeline::default()
            .compare(&DynamicImage::ImageRgb8(reference), &DynamicImage::ImageRgb8(candidate))
            .unwrap()
    }

    #[test]
    fn markdown_lists_every_mismatch() {
        let report = report_with_squares(&[(20, 20), (200, 200)]);
        let md = render_markdown(&report, Path::new("ref.png"), Path::new("shot.png"));
        assert!(md.starts_with("# Image Mismatches"));
        assert!(md.contains("| No. | Mismatched Image | Reference Image |"));
        assert!(md.contains("| 1 | ![mismatch 1](mismatch_1.png) | ![reference 1](ref_mismatch_1.png) |"));
        assert!(md.contains("| 2 | ![mismatch 2](mismatch_2.png)"));
    }

    #[test]
    fn markdown_for_matching_images() {
        let report = report_with_squares(&[]);
        let md = render_markdown(&report, Path::new("ref.png"), Path::new("shot.png"));
        assert!(md.contains("No mismatches found."));
        assert!(!md.contains("| No. |"));
    }

    #[test]
    fn writes_crops_and_summaries() {
        let dir = tempfile::tempdir().unwrap();
        let out = dir.path().join("home");
        let report = report_with_squares(&[(100, 100)]);

        let written = write_report(&report, Path::new("ref.png"), Path::new("shot.png"), &out).unwrap();

        assert_eq!(written.crops.len(), 2);
        for crop in &written.crops {
            assert!(crop.exists());
        }
        let saved = image_helper::load(out.join("mismatch_1.png")).unwrap();
        assert_eq!((saved.width(), saved.height()), (110, 110));

        let json: serde_json::Value =
            serde_json::from_str(&std::fs::read_to_string(&written.json).unwrap()).unwrap();
        assert_eq!(json["mismatches"].as_array().unwrap().len(), 1);
        assert_eq!(json["mismatches"][0]["bounds"]["x"], 50);
        assert!(written.markdown.exists());
    }
}
