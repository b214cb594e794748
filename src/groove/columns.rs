// Column Mapping - Static pitch-range partition onto game channels
// The first range whose upper bound exceeds the pitch wins;
// pitches past the table use the last channel

use serde::{Deserialize, Serialize};

use super::grid::CHANNEL_COUNT;

/// Bounds 64 / 67 / 70: low notes, E4-F#4, G4-A4, A#4 and up
const STANDARD_RANGES: &[(u8, usize)] = &[(64, 0), (67, 1), (70, 2)];

/// Bounds 64 / 68 / 72: four-semitone bands from E4 up to B4
const WIDE_RANGES: &[(u8, usize)] = &[(64, 0), (68, 1), (72, 2)];

/// Named pitch partitions
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "&'static str")]
pub enum ColumnMapKind {
    /// Narrow bands around the middle of a melody line
    Standard,

    /// Even four-semitone bands
    Wide,
}

impl ColumnMapKind {
    /// Convert from string representation, falling back to `Standard`
    pub fn from_string(s: &str) -> Self {
        match s.to_lowercase().as_str() {
            "standard" => ColumnMapKind::Standard,
            "wide" => ColumnMapKind::Wide,
            other => {
                log::warn!("Unknown column map '{}', using standard", other);
                ColumnMapKind::Standard
            }
        }
    }

    pub fn to_string(&self) -> &'static str {
        match self {
            ColumnMapKind::Standard => "standard",
            ColumnMapKind::Wide => "wide",
        }
    }

    pub fn column_map(&self) -> ColumnMap {
        match self {
            ColumnMapKind::Standard => ColumnMap::new(STANDARD_RANGES),
            ColumnMapKind::Wide => ColumnMap::new(WIDE_RANGES),
        }
    }
}

impl Default for ColumnMapKind {
    fn default() -> Self {
        ColumnMapKind::Standard
    }
}

impl From<String> for ColumnMapKind {
    fn from(s: String) -> Self {
        ColumnMapKind::from_string(&s)
    }
}

impl From<ColumnMapKind> for &'static str {
    fn from(kind: ColumnMapKind) -> Self {
        kind.to_string()
    }
}

/// Ordered `(upper_bound, channel)` table evaluated as a total function
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ColumnMap {
    ranges: &'static [(u8, usize)],
}

impl ColumnMap {
    fn new(ranges: &'static [(u8, usize)]) -> Self {
        ColumnMap { ranges }
    }

    /// Map a MIDI pitch to a channel in `0..CHANNEL_COUNT`
    pub fn map_pitch(&self, pitch: u8) -> usize {
        self.ranges
            .iter()
            .find(|&&(upper, _)| pitch < upper)
            .map(|&(_, channel)| channel)
            .unwrap_or(CHANNEL_COUNT - 1)
    }
}

impl Default for ColumnMap {
    fn default() -> Self {
        ColumnMapKind::Standard.column_map()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_standard_boundaries() {
        let map = ColumnMap::default();
        assert_eq!(map.map_pitch(0), 0);
        assert_eq!(map.map_pitch(60), 0);
        assert_eq!(map.map_pitch(63), 0);
        assert_eq!(map.map_pitch(64), 1);
        assert_eq!(map.map_pitch(66), 1);
        assert_eq!(map.map_pitch(67), 2);
        assert_eq!(map.map_pitch(69), 2);
        assert_eq!(map.map_pitch(70), 3);
        assert_eq!(map.map_pitch(127), 3);
    }

    #[test]
    fn test_wide_boundaries() {
        let map = ColumnMapKind::Wide.column_map();
        assert_eq!(map.map_pitch(59), 0);
        assert_eq!(map.map_pitch(63), 0);
        assert_eq!(map.map_pitch(64), 1);
        assert_eq!(map.map_pitch(67), 1);
        assert_eq!(map.map_pitch(68), 2);
        assert_eq!(map.map_pitch(71), 2);
        assert_eq!(map.map_pitch(72), 3);
        assert_eq!(map.map_pitch(100), 3);
    }

    #[test]
    fn test_mapping_is_total() {
        for kind in [ColumnMapKind::Standard, ColumnMapKind::Wide] {
            let map = kind.column_map();
            for pitch in 0..=127u8 {
                assert!(map.map_pitch(pitch) < CHANNEL_COUNT);
            }
        }
    }

    #[test]
    fn test_kind_from_string() {
        assert_eq!(ColumnMapKind::from_string("wide"), ColumnMapKind::Wide);
        assert_eq!(ColumnMapKind::from_string("STANDARD"), ColumnMapKind::Standard);
        assert_eq!(ColumnMapKind::from_string("zigzag"), ColumnMapKind::Standard);
    }

    #[test]
    fn test_kind_serde() {
        let json = serde_json::to_string(&ColumnMapKind::Wide).unwrap();
        assert_eq!(json, "\"wide\"");

        let kind: ColumnMapKind = serde_json::from_str("\"unknown\"").unwrap();
        assert_eq!(kind, ColumnMapKind::Standard);
    }
}
