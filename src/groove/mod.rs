// Groove Engine - Tempo, step grid, quantization, and column mapping
// Fixed-rate timing primitives shared by the chart builder and encoders

pub mod columns;
pub mod grid;
pub mod quantize;
pub mod tempo;

pub use columns::{ColumnMap, ColumnMapKind};
pub use grid::{ChartGrid, Step, CHANNEL_COUNT};
pub use quantize::{quantize, quantize_checked};
pub use tempo::{TempoChange, TempoMap, DEFAULT_BPM};
