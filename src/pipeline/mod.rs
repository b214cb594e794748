// Pipeline module
// Orchestrates MIDI loading, chart building, and parallel multi-format export

pub mod convert;
pub mod export;
pub mod output;
pub mod trace;

pub use convert::{
    convert_file, ConversionReport, ConvertRequest, Converter, PipelineError, PipelineResult,
};
pub use export::{
    export_formats, export_statistics, statistics_file_name, ExportError, ExportResult,
    FormatOutcome, OutcomeSummary,
};
pub use output::{calculate_sha256, write_artifact, OutputError, OutputResult, WrittenFile};
pub use trace::{read_trace_file, Stage, TraceEntry, TraceError, TraceResult, TraceWriter};
