// Chart Statistics - Read-only summary of a finished grid
// Note counts per column, peak concurrency, and fill density

use serde::{Deserialize, Serialize};

use crate::groove::{ChartGrid, CHANNEL_COUNT};

/// Summary figures for one chart
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ChartStatistics {
    pub total_steps: usize,
    pub duration_seconds: f64,
    pub notes_per_channel: [usize; CHANNEL_COUNT],
    pub total_notes: usize,

    /// Most columns active in any single step
    pub max_concurrent: usize,

    /// Active cells as a percentage of all cells (0 for an empty grid)
    pub density_percent: f64,
}

impl ChartStatistics {
    pub fn to_json_pretty(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}

/// Collect statistics in a single pass over the grid
pub fn collect(grid: &ChartGrid) -> ChartStatistics {
    let mut notes_per_channel = [0usize; CHANNEL_COUNT];
    let mut max_concurrent = 0;

    for step in grid.steps() {
        for (channel, count) in notes_per_channel.iter_mut().enumerate() {
            if step.is_active(channel) {
                *count += 1;
            }
        }
        max_concurrent = max_concurrent.max(step.active_count());
    }

    let total_notes: usize = notes_per_channel.iter().sum();
    let cells = grid.step_count() * CHANNEL_COUNT;
    let density_percent = if cells == 0 {
        0.0
    } else {
        total_notes as f64 / cells as f64 * 100.0
    };

    ChartStatistics {
        total_steps: grid.step_count(),
        duration_seconds: grid.duration_seconds(),
        notes_per_channel,
        total_notes,
        max_concurrent,
        density_percent,
    }
}
