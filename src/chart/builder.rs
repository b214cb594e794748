// Chart Builder - Places quantized, column-mapped notes on the step grid
// Earlier notes win: a note within `spacing` steps after an active cell in its column is dropped

use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::difficulty::Difficulty;
use crate::config::ChartConfig;
use crate::events::NoteEvent;
use crate::groove::{quantize_checked, ChartGrid, ColumnMap, CHANNEL_COUNT};

/// Conditions that make chart construction impossible
#[derive(Debug, Clone, Error, PartialEq)]
pub enum BuildError {
    #[error("No note events to place: the source produced no note-on messages")]
    EmptyInput,

    #[error("Step duration must be a positive number of seconds, got {0}")]
    InvalidStepDuration(f64),

    #[error("Latest event time is not a finite number of seconds: {0}")]
    InvalidEventTime(f64),

    #[error("Grid of {steps} steps exceeds the maximum of {max}")]
    GridTooLarge { steps: f64, max: usize },
}

pub type BuildResult<T> = Result<T, BuildError>;

/// Why a single note was left off the chart
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SkipReason {
    /// The note quantizes outside `[0, step_count)`
    GridOverflow,

    /// The note lands within the spacing window of an earlier note in its column
    Collision,
}

/// Placement counts for one build
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlacementReport {
    pub total_events: usize,
    pub placed: usize,
    pub collisions: usize,
    pub out_of_range: usize,
}

impl PlacementReport {
    fn record_skip(&mut self, reason: SkipReason) {
        match reason {
            SkipReason::GridOverflow => self.out_of_range += 1,
            SkipReason::Collision => self.collisions += 1,
        }
    }

    pub fn skipped(&self) -> usize {
        self.collisions + self.out_of_range
    }
}

/// A finished grid together with its placement counts
#[derive(Debug, Clone)]
pub struct BuiltChart {
    pub grid: ChartGrid,
    pub placement: PlacementReport,
}

/// Builds chart grids for one configuration and spacing
#[derive(Debug, Clone)]
pub struct ChartBuilder {
    step_duration: f64,
    trailing_margin: f64,
    max_steps: usize,
    column_map: ColumnMap,
    spacing: usize,
}

impl ChartBuilder {
    pub fn new(config: &ChartConfig, spacing: usize) -> Self {
        ChartBuilder {
            step_duration: config.step_duration,
            trailing_margin: config.trailing_margin,
            max_steps: config.max_steps,
            column_map: config.column_map.column_map(),
            spacing,
        }
    }

    pub fn for_difficulty(config: &ChartConfig, difficulty: Difficulty) -> Self {
        ChartBuilder::new(config, difficulty.spacing())
    }

    pub fn spacing(&self) -> usize {
        self.spacing
    }

    /// Build a chart grid from note events
    ///
    /// Algorithm:
    /// 1. Size the grid from the latest event time plus the trailing margin
    /// 2. Walk events in time order (simultaneous events keep input order)
    /// 3. Quantize each event and map its pitch to a column
    /// 4. Drop events outside the grid or inside an earlier note's spacing window
    pub fn build(&self, events: &[NoteEvent]) -> BuildResult<BuiltChart> {
        if events.is_empty() {
            return Err(BuildError::EmptyInput);
        }

        if !(self.step_duration.is_finite() && self.step_duration > 0.0) {
            return Err(BuildError::InvalidStepDuration(self.step_duration));
        }

        // f64::max skips NaN, so a single bad timestamp does not poison the length
        let max_time = events
            .iter()
            .map(|e| e.time)
            .fold(f64::NEG_INFINITY, f64::max);
        if !max_time.is_finite() {
            return Err(BuildError::InvalidEventTime(max_time));
        }

        let raw_length =
            ChartGrid::length_for(max_time, self.trailing_margin, self.step_duration).max(0.0);
        if raw_length > self.max_steps as f64 {
            return Err(BuildError::GridTooLarge {
                steps: raw_length,
                max: self.max_steps,
            });
        }

        let mut grid = ChartGrid::empty(self.step_duration, raw_length as usize);
        let mut placement = PlacementReport {
            total_events: events.len(),
            ..Default::default()
        };

        let mut ordered: Vec<&NoteEvent> = events.iter().collect();
        ordered.sort_by(|a, b| a.time.total_cmp(&b.time));

        for event in ordered {
            match self.place(&mut grid, event) {
                Ok((step, channel)) => {
                    placement.placed += 1;
                    log::trace!(
                        "Placed pitch {} at {:.3}s -> step {}, column {}",
                        event.pitch,
                        event.time,
                        step,
                        channel
                    );
                }
                Err(reason) => {
                    placement.record_skip(reason);
                    log::debug!(
                        "Skipped pitch {} at {:.3}s: {:?}",
                        event.pitch,
                        event.time,
                        reason
                    );
                }
            }
        }

        log::info!(
            "Built chart: {} steps, placed {}/{} notes (spacing {}, {} collisions, {} out of range)",
            grid.step_count(),
            placement.placed,
            placement.total_events,
            self.spacing,
            placement.collisions,
            placement.out_of_range
        );

        Ok(BuiltChart { grid, placement })
    }

    /// Place one event, returning its (step, column) or the reason it was dropped
    fn place(&self, grid: &mut ChartGrid, event: &NoteEvent) -> Result<(usize, usize), SkipReason> {
        let step = quantize_checked(event.time, self.step_duration)
            .and_then(|s| usize::try_from(s).ok())
            .filter(|&s| s < grid.step_count())
            .ok_or(SkipReason::GridOverflow)?;

        let channel = self.column_map.map_pitch(event.pitch);
        if channel >= CHANNEL_COUNT {
            return Err(SkipReason::GridOverflow);
        }

        // The window includes the target cell so a duplicate at the same step also collides
        let window = step.saturating_sub(self.spacing)..step + 1;
        if grid.any_active_in(channel, window) {
            return Err(SkipReason::Collision);
        }

        grid.activate(step, channel);
        Ok((step, channel))
    }
}
