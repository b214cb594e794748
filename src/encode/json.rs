// JSON Chart - Structured debug document that round-trips to a grid

use serde::{Deserialize, Serialize};

use super::{ChartMetadata, DecodeError, DecodeResult};
use crate::groove::{ChartGrid, Step, CHANNEL_COUNT};

/// Header of the debug document
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DocumentMetadata {
    /// Exact step length; documents without it fall back to `step_duration_ms`
    #[serde(default)]
    pub step_duration_s: Option<f64>,
    pub step_duration_ms: f64,
    pub source_name: String,
    pub bpm: f64,
    pub difficulty: String,
    pub channel_count: usize,
    pub step_count: usize,
    pub duration_seconds: f64,
}

/// `{"metadata": {...}, "chart": [[0|1; 4]; n]}`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChartDocument {
    pub metadata: DocumentMetadata,
    pub chart: Vec<[u8; CHANNEL_COUNT]>,
}

impl ChartDocument {
    pub fn from_grid(grid: &ChartGrid, metadata: &ChartMetadata) -> Self {
        let chart = grid
            .steps()
            .iter()
            .map(|step| step.channels().map(u8::from))
            .collect();

        ChartDocument {
            metadata: DocumentMetadata {
                step_duration_s: Some(grid.step_duration()),
                step_duration_ms: grid.step_duration() * 1000.0,
                source_name: metadata.source_name.clone(),
                bpm: metadata.bpm,
                difficulty: metadata.difficulty.to_string().to_string(),
                channel_count: grid.channel_count(),
                step_count: grid.step_count(),
                duration_seconds: grid.duration_seconds(),
            },
            chart,
        }
    }

    /// Rebuild the grid, checking the document against its own header
    pub fn into_grid(self) -> DecodeResult<ChartGrid> {
        if self.metadata.channel_count != CHANNEL_COUNT {
            return Err(DecodeError::malformed(
                0,
                format!(
                    "channel_count is {}, expected {}",
                    self.metadata.channel_count, CHANNEL_COUNT
                ),
            ));
        }
        if self.metadata.step_count != self.chart.len() {
            return Err(DecodeError::malformed(
                0,
                format!(
                    "step_count is {} but chart has {} rows",
                    self.metadata.step_count,
                    self.chart.len()
                ),
            ));
        }

        let mut steps = Vec::with_capacity(self.chart.len());
        for (index, row) in self.chart.iter().enumerate() {
            if row.iter().any(|&cell| cell > 1) {
                return Err(DecodeError::malformed(
                    index,
                    format!("row {:?} holds a value other than 0 or 1", row),
                ));
            }
            steps.push(Step::from_channels(row.map(|cell| cell == 1)));
        }

        let step_duration = self
            .metadata
            .step_duration_s
            .unwrap_or(self.metadata.step_duration_ms / 1000.0);
        Ok(ChartGrid::from_steps(step_duration, steps))
    }
}

/// Pretty-printed JSON document with two-space indentation
pub fn encode_json(grid: &ChartGrid, metadata: &ChartMetadata) -> String {
    let document = ChartDocument::from_grid(grid, metadata);
    serde_json::to_string_pretty(&document).expect("chart document has only plain fields")
}

pub fn decode_json(text: &str) -> DecodeResult<ChartGrid> {
    let document: ChartDocument = serde_json::from_str(text)?;
    document.into_grid()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chart::Difficulty;

    fn metadata() -> ChartMetadata {
        ChartMetadata::new("song.mid", 120.0, Difficulty::Normal)
    }

    #[test]
    fn test_round_trip_preserves_grid() {
        let grid = ChartGrid::from_packed(0.05, &[0x1, 0x0, 0xA, 0xF]);

        let decoded = decode_json(&encode_json(&grid, &metadata())).unwrap();

        assert_eq!(decoded, grid);
    }

    #[test]
    fn test_round_trip_keeps_exact_step_duration() {
        // 0.0131 * 1000.0 / 1000.0 is not 0.0131 in f64
        let grid = ChartGrid::from_packed(0.0131, &[0x3, 0x0, 0x8]);

        let decoded = decode_json(&encode_json(&grid, &metadata())).unwrap();

        assert_eq!(decoded.step_duration(), 0.0131);
        assert_eq!(decoded, grid);
    }

    #[test]
    fn test_document_without_seconds_uses_milliseconds() {
        let grid = ChartGrid::from_packed(0.05, &[0x1]);
        let mut document = ChartDocument::from_grid(&grid, &metadata());
        document.metadata.step_duration_s = None;
        let text = serde_json::to_string(&document).unwrap();
        let text = text.replace("\"step_duration_s\":null,", "");
        assert!(!text.contains("step_duration_s"));

        let decoded = decode_json(&text).unwrap();
        assert!((decoded.step_duration() - 0.05).abs() < 1e-12);
    }

    #[test]
    fn test_document_layout() {
        let grid = ChartGrid::from_packed(0.05, &[0x5, 0x0]);
        let text = encode_json(&grid, &metadata());

        let value: serde_json::Value = serde_json::from_str(&text).unwrap();
        assert_eq!(value["metadata"]["step_duration_ms"], 50.0);
        assert_eq!(value["metadata"]["step_duration_s"], 0.05);
        assert_eq!(value["metadata"]["source_name"], "song.mid");
        assert_eq!(value["metadata"]["channel_count"], 4);
        assert_eq!(value["metadata"]["step_count"], 2);
        assert_eq!(value["chart"][0], serde_json::json!([1, 0, 1, 0]));
        assert!(text.contains("\n  \"metadata\": {"));
    }

    #[test]
    fn test_step_count_mismatch_rejected() {
        let grid = ChartGrid::from_packed(0.05, &[0x1, 0x2]);
        let mut document = ChartDocument::from_grid(&grid, &metadata());
        document.metadata.step_count = 3;

        let result = document.into_grid();
        assert!(matches!(result, Err(DecodeError::Malformed { .. })));
    }

    #[test]
    fn test_non_binary_cell_rejected() {
        let grid = ChartGrid::from_packed(0.05, &[0x1]);
        let mut document = ChartDocument::from_grid(&grid, &metadata());
        document.chart[0][2] = 2;

        assert!(document.into_grid().is_err());
    }

    #[test]
    fn test_invalid_json_rejected() {
        assert!(matches!(decode_json("{"), Err(DecodeError::Json(_))));
    }
}
