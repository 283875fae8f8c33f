use std::collections::HashSet;
use std::path::{Path, PathBuf};

use anyhow::{Context, bail};
use serde::Deserialize;

/// One pair to compare in batch mode.
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct ManifestEntry {
    /// Output sub-directory name for this pair.
    pub name: String,
    pub reference: PathBuf,
    pub candidate: PathBuf,
}

/// Reads a manifest. Relative image paths resolve against the manifest's directory.
pub fn load(path: &Path) -> anyhow::Result<Vec<ManifestEntry>> {
    let data = std::fs::read_to_string(path).with_context(|| format!("reading manifest {}", path.display()))?;
    let base = path.parent().unwrap_or_else(|| Path::new("."));
    parse(&data, base)
}

pub fn parse(data: &str, base: &Path) -> anyhow::Result<Vec<ManifestEntry>> {
    let mut entries: Vec<ManifestEntry> = serde_json::from_str(data).context("parsing manifest")?;

    let mut names = HashSet::new();
    for entry in &mut entries {
        if entry.name.is_empty()
            || entry.name == "."
            || entry.name == ".."
            || entry.name.contains(['/', '\\'])
        {
            bail!("invalid entry name {:?}: must be a plain directory name", entry.name);
        }
        if !names.insert(entry.name.clone()) {
            bail!("duplicate entry name {:?}", entry.name);
        }
        if entry.reference.is_relative() {
            entry.reference = base.join(&entry.reference);
        }
        if entry.candidate.is_relative() {
            entry.candidate = base.join(&entry.candidate);
        }
    }
    Ok(entries)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn relative_paths_resolve_against_manifest_dir() {
        let entries = parse(
            r#"[
                { "name": "mobile", "reference": "mock/mobile.png", "candidate": "/shots/mobile.png" }
            ]"#,
            Path::new("/work"),
        )
        .unwrap();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].reference, PathBuf::from("/work/mock/mobile.png"));
        assert_eq!(entries[0].candidate, PathBuf::from("/shots/mobile.png"));
    }

    #[test]
    fn rejects_unsafe_and_duplicate_names() {
        let bad = r#"[{ "name": "../x", "reference": "a.png", "candidate": "b.png" }]"#;
        assert!(parse(bad, Path::new(".")).is_err());

        let dup = r#"[
            { "name": "a", "reference": "a.png", "candidate": "b.png" },
            { "name": "a", "reference": "c.png", "candidate": "d.png" }
        ]"#;
        assert!(parse(dup, Path::new(".")).is_err());
    }
}
