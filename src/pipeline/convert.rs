// Conversion pipeline - MIDI file to chart files for one difficulty
// load -> build -> statistics -> export; nothing is written unless the build succeeds

use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use serde::Serialize;
use thiserror::Error;

use super::export::{
    export_formats, export_statistics, ExportError, ExportResult, FormatOutcome, OutcomeSummary,
};
use super::output::WrittenFile;
use super::trace::{Stage, TraceEntry, TraceWriter};
use crate::chart::{
    collect_statistics, BuildError, ChartBuilder, ChartStatistics, Difficulty, PlacementReport,
};
use crate::config::ChartConfig;
use crate::encode::{ChartMetadata, OutputFormat};
use crate::events::{load_midi_file, MidiError, MidiImportOptions, NoteEvent};

#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("Failed to load MIDI: {0}")]
    Midi(#[from] MidiError),

    #[error("Failed to build chart: {0}")]
    Build(#[from] BuildError),

    #[error("Failed to export chart: {0}")]
    Export(#[from] ExportError),
}

pub type PipelineResult<T> = Result<T, PipelineError>;

/// What to convert and where to put it
#[derive(Debug, Clone)]
pub struct ConvertRequest {
    pub input: PathBuf,
    pub difficulty: Difficulty,
    pub out_dir: PathBuf,
    pub bpm_override: Option<f64>,
    pub formats: Vec<OutputFormat>,
    pub write_statistics: bool,
}

impl ConvertRequest {
    /// Every format plus statistics, written next to the working directory
    pub fn new(input: impl Into<PathBuf>, difficulty: Difficulty) -> Self {
        ConvertRequest {
            input: input.into(),
            difficulty,
            out_dir: PathBuf::from("."),
            bpm_override: None,
            formats: OutputFormat::ALL.to_vec(),
            write_statistics: true,
        }
    }
}

/// Everything a conversion produced
#[derive(Debug)]
pub struct ConversionReport {
    pub metadata: ChartMetadata,
    pub spacing: usize,
    pub placement: PlacementReport,
    pub statistics: ChartStatistics,
    pub outputs: Vec<FormatOutcome>,
    pub statistics_file: Option<ExportResult<WrittenFile>>,
}

impl ConversionReport {
    pub fn all_succeeded(&self) -> bool {
        self.outputs.iter().all(FormatOutcome::is_ok)
            && self
                .statistics_file
                .as_ref()
                .map(|r| r.is_ok())
                .unwrap_or(true)
    }

    pub fn failed_count(&self) -> usize {
        let stats_failed = matches!(self.statistics_file, Some(Err(_)));
        self.outputs.iter().filter(|o| !o.is_ok()).count() + usize::from(stats_failed)
    }
}

impl fmt::Display for ConversionReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let stats = &self.statistics;
        let placement = &self.placement;

        writeln!(f, "Source:          {}", self.metadata.source_name)?;
        writeln!(
            f,
            "Difficulty:      {} ({}, spacing {})",
            self.metadata.difficulty.to_string(),
            self.metadata.difficulty.profile().description,
            self.spacing
        )?;
        writeln!(f, "BPM:             {:.2}", self.metadata.bpm)?;
        writeln!(f, "Events:          {}", placement.total_events)?;
        writeln!(f, "Placed:          {}", placement.placed)?;
        writeln!(f, "Collisions:      {}", placement.collisions)?;
        writeln!(f, "Out of range:    {}", placement.out_of_range)?;
        writeln!(f, "Total steps:     {}", stats.total_steps)?;
        writeln!(f, "Duration:        {:.2}s", stats.duration_seconds)?;
        writeln!(
            f,
            "Notes by column: {}",
            stats
                .notes_per_channel
                .iter()
                .enumerate()
                .map(|(c, n)| format!("{}={}", c, n))
                .collect::<Vec<_>>()
                .join(", ")
        )?;
        writeln!(f, "Max concurrent:  {}", stats.max_concurrent)?;
        writeln!(f, "Density:         {:.2}%", stats.density_percent)?;

        for outcome in &self.outputs {
            match &outcome.result {
                Ok(file) => writeln!(
                    f,
                    "  ok    {:<13} {} (sha256 {})",
                    outcome.format.to_string(),
                    file.path.display(),
                    file.sha256
                )?,
                Err(e) => writeln!(f, "  FAIL  {:<13} {}", outcome.format.to_string(), e)?,
            }
        }
        match &self.statistics_file {
            Some(Ok(file)) => writeln!(f, "  ok    {:<13} {}", "statistics", file.path.display())?,
            Some(Err(e)) => writeln!(f, "  FAIL  {:<13} {}", "statistics", e)?,
            None => {}
        }
        Ok(())
    }
}

#[derive(Serialize)]
struct ExportTrace {
    outputs: Vec<OutcomeSummary>,
}

/// Runs conversions for one chart configuration
pub struct Converter {
    config: ChartConfig,
    trace: Option<TraceWriter>,
}

impl Converter {
    pub fn new(config: ChartConfig) -> Self {
        Converter {
            config,
            trace: None,
        }
    }

    /// Append stage entries to a JSONL trace file
    pub fn with_trace(mut self, path: impl Into<PathBuf>) -> Self {
        self.trace = Some(TraceWriter::new(path.into()));
        self
    }

    pub fn config(&self) -> &ChartConfig {
        &self.config
    }

    fn record(&self, entry: TraceEntry) {
        if let Some(trace) = &self.trace {
            trace.record(entry);
        }
    }

    /// Load a MIDI file and convert its notes
    pub async fn convert_file(&self, request: &ConvertRequest) -> PipelineResult<ConversionReport> {
        self.record(TraceEntry::started(
            Stage::Load,
            format!("Loading {}", request.input.display()),
        ));

        let options = MidiImportOptions {
            bpm_override: request.bpm_override,
        };
        let song = load_midi_file(&request.input, &options)?;

        self.record(
            TraceEntry::completed(Stage::Load, format!("Loaded {} notes", song.notes.len()))
                .with_data(serde_json::json!({
                    "notes": song.notes.len(),
                    "tracks": song.track_count,
                    "bpm": song.bpm,
                })),
        );

        let metadata =
            ChartMetadata::from_source_path(&request.input, song.bpm, request.difficulty);
        self.convert_events(&song.notes, metadata, request).await
    }

    /// Build, summarize, and export a chart from note events
    pub async fn convert_events(
        &self,
        events: &[NoteEvent],
        metadata: ChartMetadata,
        request: &ConvertRequest,
    ) -> PipelineResult<ConversionReport> {
        let builder = ChartBuilder::for_difficulty(&self.config, metadata.difficulty);
        self.record(TraceEntry::started(
            Stage::Build,
            format!(
                "Building {} chart from {} events",
                metadata.difficulty.to_string(),
                events.len()
            ),
        ));

        let built = builder.build(events)?;

        self.record(
            TraceEntry::completed(Stage::Build, "Chart built").with_data(serde_json::json!({
                "steps": built.grid.step_count(),
                "placement": &built.placement,
            })),
        );

        let statistics = collect_statistics(&built.grid);
        self.record(
            TraceEntry::completed(Stage::Statistics, "Statistics collected")
                .with_data(serde_json::to_value(&statistics).unwrap_or_default()),
        );

        self.record(TraceEntry::started(
            Stage::Export,
            format!(
                "Exporting {} formats to {}",
                request.formats.len(),
                request.out_dir.display()
            ),
        ));

        let grid = Arc::new(built.grid);
        let metadata = Arc::new(metadata);
        let outputs =
            export_formats(grid, Arc::clone(&metadata), &request.formats, &request.out_dir).await?;

        let statistics_file = if request.write_statistics {
            let result =
                export_statistics(statistics.clone(), metadata.difficulty, &request.out_dir).await;
            if let Err(e) = &result {
                log::error!("Failed to save statistics: {}", e);
            }
            Some(result)
        } else {
            None
        };

        let summary = ExportTrace {
            outputs: outputs.iter().map(OutcomeSummary::from).collect(),
        };
        self.record(
            TraceEntry::completed(Stage::Export, "Export finished")
                .with_data(serde_json::to_value(&summary).unwrap_or_default()),
        );

        let metadata = Arc::try_unwrap(metadata).unwrap_or_else(|shared| (*shared).clone());

        Ok(ConversionReport {
            metadata,
            spacing: builder.spacing(),
            placement: built.placement,
            statistics,
            outputs,
            statistics_file,
        })
    }
}

/// Convert one MIDI file with the default configuration
pub async fn convert_file(
    path: &Path,
    difficulty: Difficulty,
    out_dir: &Path,
) -> PipelineResult<ConversionReport> {
    let request = ConvertRequest {
        out_dir: out_dir.to_path_buf(),
        ..ConvertRequest::new(path, difficulty)
    };
    Converter::new(ChartConfig::default()).convert_file(&request).await
}
