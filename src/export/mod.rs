//! JSON artifact export
//!
//! Serializes the ranked top list to a JSON array and writes it
//! all-or-nothing: the document lands in a temporary file next to the
//! target and is renamed into place, so a failed run never leaves a
//! partial artifact behind.

pub mod upload;

pub use upload::{ArtifactUploader, R2Uploader};

use anyhow::{Context, Result};
use std::fs;
use std::path::{Path, PathBuf};

use crate::models::ScoredTrend;

/// Writes the ranked top list to a local JSON artifact
pub struct JsonExporter {
    /// Target artifact path, overwritten wholesale each run
    output_path: PathBuf,
}

impl JsonExporter {
    pub fn new(output_path: impl Into<PathBuf>) -> Self {
        Self {
            output_path: output_path.into(),
        }
    }

    /// The artifact path this exporter writes to
    pub fn output_path(&self) -> &Path {
        &self.output_path
    }

    /// Serialize and atomically write the top list
    pub fn write(&self, top_list: &[ScoredTrend]) -> Result<()> {
        let document =
            serde_json::to_vec_pretty(top_list).context("Failed to serialize top list")?;

        if let Some(parent) = self.output_path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent).context("Failed to create output directory")?;
            }
        }

        // Write to a sibling temp file, then rename: all-or-nothing
        let tmp_path = self.output_path.with_extension("json.tmp");
        fs::write(&tmp_path, &document)
            .with_context(|| format!("Failed to write {}", tmp_path.display()))?;
        fs::rename(&tmp_path, &self.output_path)
            .with_context(|| format!("Failed to move artifact to {}", self.output_path.display()))?;

        tracing::info!(
            path = %self.output_path.display(),
            entries = top_list.len(),
            "Artifact written"
        );

        Ok(())
    }
}

/// Parse an artifact document back into a top list
pub fn read_artifact(path: &Path) -> Result<Vec<ScoredTrend>> {
    let content = fs::read_to_string(path)
        .with_context(|| format!("Failed to read artifact {}", path.display()))?;
    serde_json::from_str(&content).context("Failed to parse artifact")
}
