// Conversion tracing
// Append-only JSONL log of pipeline stages for one conversion run

use chrono::Utc;
use serde::{Deserialize, Serialize};
use std::fs::OpenOptions;
use std::io::Write;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum TraceError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

pub type TraceResult<T> = Result<T, TraceError>;

/// Pipeline stages, in execution order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Stage {
    Load,
    Build,
    Statistics,
    Export,
}

impl Stage {
    pub fn to_string(&self) -> &'static str {
        match self {
            Stage::Load => "load",
            Stage::Build => "build",
            Stage::Statistics => "statistics",
            Stage::Export => "export",
        }
    }
}

/// One line of the trace file
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TraceEntry {
    /// RFC 3339 timestamp
    pub timestamp: String,

    pub stage: Stage,

    /// Stage progress in [0.0, 1.0]
    pub progress: f32,

    pub message: String,

    /// Stage-specific figures (note counts, output paths, ...)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<serde_json::Value>,
}

impl TraceEntry {
    pub fn new(stage: Stage, progress: f32, message: impl Into<String>) -> Self {
        TraceEntry {
            timestamp: Utc::now().to_rfc3339(),
            stage,
            progress: progress.clamp(0.0, 1.0),
            message: message.into(),
            data: None,
        }
    }

    pub fn with_data(mut self, data: serde_json::Value) -> Self {
        self.data = Some(data);
        self
    }

    pub fn started(stage: Stage, message: impl Into<String>) -> Self {
        TraceEntry::new(stage, 0.0, message)
    }

    pub fn completed(stage: Stage, message: impl Into<String>) -> Self {
        TraceEntry::new(stage, 1.0, message)
    }

    /// JSON line including the trailing newline
    pub fn to_json_line(&self) -> TraceResult<String> {
        let json = serde_json::to_string(self)?;
        Ok(format!("{}\n", json))
    }
}

/// Appends trace entries to a JSONL file, creating it on first write
pub struct TraceWriter {
    file_path: PathBuf,
}

impl TraceWriter {
    pub fn new(file_path: PathBuf) -> Self {
        TraceWriter { file_path }
    }

    pub fn write(&self, entry: &TraceEntry) -> TraceResult<()> {
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.file_path)?;

        file.write_all(entry.to_json_line()?.as_bytes())?;
        file.flush()?;
        Ok(())
    }

    /// Write an entry, logging instead of failing; tracing never aborts a conversion
    pub fn record(&self, entry: TraceEntry) {
        if let Err(e) = self.write(&entry) {
            log::warn!(
                "Failed to write trace entry to {}: {}",
                self.file_path.display(),
                e
            );
        }
    }

    pub fn path(&self) -> &Path {
        &self.file_path
    }
}

/// Read every entry of a JSONL trace file
pub fn read_trace_file(path: &Path) -> TraceResult<Vec<TraceEntry>> {
    let contents = std::fs::read_to_string(path)?;
    let mut entries = Vec::new();

    for line in contents.lines() {
        if line.trim().is_empty() {
            continue;
        }
        entries.push(serde_json::from_str(line)?);
    }

    Ok(entries)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_progress_clamping() {
        assert_eq!(TraceEntry::new(Stage::Load, -0.5, "x").progress, 0.0);
        assert_eq!(TraceEntry::new(Stage::Load, 1.5, "x").progress, 1.0);
    }

    #[test]
    fn test_stage_serializes_snake_case() {
        let line = TraceEntry::completed(Stage::Statistics, "done")
            .to_json_line()
            .unwrap();

        assert!(line.contains("\"stage\":\"statistics\""));
        assert!(!line.contains("\"data\""));
        assert!(line.ends_with('\n'));
    }

    #[test]
    fn test_write_and_read_back() {
        let temp_dir = TempDir::new().unwrap();
        let writer = TraceWriter::new(temp_dir.path().join("trace.jsonl"));

        writer
            .write(&TraceEntry::started(Stage::Build, "Building chart"))
            .unwrap();
        writer.record(
            TraceEntry::completed(Stage::Build, "Built chart")
                .with_data(serde_json::json!({ "placed": 12 })),
        );

        let entries = read_trace_file(writer.path()).unwrap();
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].stage, Stage::Build);
        assert_eq!(entries[0].progress, 0.0);
        assert_eq!(entries[1].data.as_ref().unwrap()["placed"], 12);
    }

    #[test]
    fn test_record_into_missing_directory_does_not_panic() {
        let writer = TraceWriter::new(PathBuf::from("/definitely/not/here/trace.jsonl"));
        writer.record(TraceEntry::started(Stage::Load, "Loading"));
    }
}
