// Difficulty Profiles - Static spacing table for chart generation
// Spacing is the minimum number of steps between two notes in the same column

use serde::{Deserialize, Serialize};

/// Chart difficulty
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Difficulty {
    Easy,
    Normal,
    Hard,
}

/// Parameters attached to a difficulty
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct DifficultyProfile {
    pub difficulty: Difficulty,

    /// Steps that must separate two notes in one column
    pub spacing: usize,

    /// Human-readable summary for reports
    pub description: &'static str,
}

impl Difficulty {
    pub const ALL: [Difficulty; 3] = [Difficulty::Easy, Difficulty::Normal, Difficulty::Hard];

    /// Convert from string representation
    /// Unrecognized names fall back to `Normal`
    pub fn from_string(s: &str) -> Self {
        match s.trim().to_lowercase().as_str() {
            "easy" => Difficulty::Easy,
            "normal" => Difficulty::Normal,
            "hard" => Difficulty::Hard,
            other => {
                log::warn!("Unknown difficulty '{}', using normal", other);
                Difficulty::Normal
            }
        }
    }

    pub fn to_string(&self) -> &'static str {
        match self {
            Difficulty::Easy => "easy",
            Difficulty::Normal => "normal",
            Difficulty::Hard => "hard",
        }
    }

    pub fn profile(&self) -> DifficultyProfile {
        match self {
            Difficulty::Easy => DifficultyProfile {
                difficulty: *self,
                spacing: 3,
                description: "relaxed rhythm",
            },
            Difficulty::Normal => DifficultyProfile {
                difficulty: *self,
                spacing: 2,
                description: "standard rhythm",
            },
            Difficulty::Hard => DifficultyProfile {
                difficulty: *self,
                spacing: 1,
                description: "dense rhythm",
            },
        }
    }

    pub fn spacing(&self) -> usize {
        self.profile().spacing
    }
}

impl Default for Difficulty {
    fn default() -> Self {
        Difficulty::Normal
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_spacing_table() {
        assert_eq!(Difficulty::Easy.spacing(), 3);
        assert_eq!(Difficulty::Normal.spacing(), 2);
        assert_eq!(Difficulty::Hard.spacing(), 1);
    }

    #[test]
    fn test_from_string() {
        assert_eq!(Difficulty::from_string("easy"), Difficulty::Easy);
        assert_eq!(Difficulty::from_string("HARD"), Difficulty::Hard);
        assert_eq!(Difficulty::from_string(" normal "), Difficulty::Normal);
    }

    #[test]
    fn test_unknown_falls_back_to_normal() {
        let difficulty = Difficulty::from_string("unknown");
        assert_eq!(difficulty, Difficulty::Normal);
        assert_eq!(difficulty.spacing(), 2);
    }

    #[test]
    fn test_string_round_trip() {
        for difficulty in Difficulty::ALL {
            assert_eq!(Difficulty::from_string(difficulty.to_string()), difficulty);
        }
    }
}
