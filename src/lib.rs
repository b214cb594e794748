// Notechart - MIDI to rhythm-game chart converter
// Module declarations

pub mod chart;
pub mod cli;
pub mod config;
pub mod encode;
pub mod events;
pub mod groove;
pub mod pipeline;
pub mod playback;

pub use chart::{BuildError, ChartBuilder, ChartStatistics, Difficulty, PlacementReport};
pub use config::ChartConfig;
pub use encode::{ChartMetadata, OutputFormat};
pub use events::NoteEvent;
pub use groove::{ChartGrid, Step};
pub use pipeline::{ConversionReport, ConvertRequest, Converter};
