// Chart Export - Encodes and writes every requested format in parallel
// One blocking task per format; a failing format never stops the others

use std::path::{Path, PathBuf};
use std::sync::Arc;

use serde::Serialize;
use thiserror::Error;

use super::output::{write_artifact, OutputError, WrittenFile};
use crate::chart::{ChartStatistics, Difficulty};
use crate::encode::{ChartMetadata, OutputFormat};
use crate::groove::ChartGrid;

#[derive(Debug, Error)]
pub enum ExportError {
    #[error(transparent)]
    Io(#[from] OutputError),

    #[error("Export task failed: {0}")]
    Join(#[from] tokio::task::JoinError),

    #[error("Failed to serialize statistics: {0}")]
    Serialization(#[from] serde_json::Error),
}

pub type ExportResult<T> = Result<T, ExportError>;

/// Result of exporting one format
#[derive(Debug)]
pub struct FormatOutcome {
    pub format: OutputFormat,
    pub result: ExportResult<WrittenFile>,
}

impl FormatOutcome {
    pub fn is_ok(&self) -> bool {
        self.result.is_ok()
    }
}

/// Serializable view of a format outcome for reports and traces
#[derive(Debug, Clone, Serialize)]
pub struct OutcomeSummary {
    pub format: OutputFormat,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub path: Option<PathBuf>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sha256: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl From<&FormatOutcome> for OutcomeSummary {
    fn from(outcome: &FormatOutcome) -> Self {
        match &outcome.result {
            Ok(file) => OutcomeSummary {
                format: outcome.format,
                path: Some(file.path.clone()),
                sha256: Some(file.sha256.clone()),
                error: None,
            },
            Err(e) => OutcomeSummary {
                format: outcome.format,
                path: None,
                sha256: None,
                error: Some(e.to_string()),
            },
        }
    }
}

/// Encode `grid` in each format and write the files into `out_dir`
///
/// The directory is created first; failing that is fatal. After that each
/// format runs on its own blocking task and reports its own outcome, in the
/// order `formats` lists them.
pub async fn export_formats(
    grid: Arc<ChartGrid>,
    metadata: Arc<ChartMetadata>,
    formats: &[OutputFormat],
    out_dir: &Path,
) -> ExportResult<Vec<FormatOutcome>> {
    tokio::fs::create_dir_all(out_dir)
        .await
        .map_err(|e| OutputError::io(out_dir, e))?;

    let handles: Vec<_> = formats
        .iter()
        .map(|&format| {
            let grid = Arc::clone(&grid);
            let metadata = Arc::clone(&metadata);
            let out_dir = out_dir.to_path_buf();

            let handle = tokio::task::spawn_blocking(move || {
                let text = format.encode(&grid, &metadata);
                write_artifact(&out_dir, &format.file_name(metadata.difficulty), text.as_bytes())
            });
            (format, handle)
        })
        .collect();

    let mut outcomes = Vec::with_capacity(handles.len());
    for (format, handle) in handles {
        let result = match handle.await {
            Ok(written) => written.map_err(ExportError::from),
            Err(e) => Err(ExportError::from(e)),
        };

        match &result {
            Ok(file) => log::info!("Exported {}: {}", format.to_string(), file.path.display()),
            Err(e) => log::error!("Failed to export {}: {}", format.to_string(), e),
        }
        outcomes.push(FormatOutcome { format, result });
    }

    Ok(outcomes)
}

/// File name of the statistics export for a difficulty
pub fn statistics_file_name(difficulty: Difficulty) -> String {
    format!("chart_{}_stats.json", difficulty.to_string())
}

/// Write `chart_<difficulty>_stats.json` into `out_dir` on a blocking task
pub async fn export_statistics(
    stats: ChartStatistics,
    difficulty: Difficulty,
    out_dir: &Path,
) -> ExportResult<WrittenFile> {
    let out_dir = out_dir.to_path_buf();
    let written = tokio::task::spawn_blocking(move || -> ExportResult<WrittenFile> {
        let json = stats.to_json_pretty()?;
        Ok(write_artifact(&out_dir, &statistics_file_name(difficulty), json.as_bytes())?)
    })
    .await??;

    log::info!("Saved statistics: {}", written.path.display());
    Ok(written)
}
