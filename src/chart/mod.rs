// Chart module
// Difficulty profiles, grid construction, and statistics

pub mod builder;
pub mod difficulty;
pub mod stats;

pub use builder::{
    BuildError, BuildResult, BuiltChart, ChartBuilder, PlacementReport, SkipReason,
};
pub use difficulty::{Difficulty, DifficultyProfile};
pub use stats::{collect as collect_statistics, ChartStatistics};
