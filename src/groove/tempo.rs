// Tempo Map - Converts MIDI tick positions to seconds
// Piecewise-constant tempo: each change applies from its tick until the next one

use serde::{Deserialize, Serialize};

/// Tempo assumed when a file carries no tempo change (MIDI default)
pub const DEFAULT_BPM: f64 = 120.0;

/// Microseconds per quarter note at 120 BPM
pub const DEFAULT_US_PER_BEAT: u32 = 500_000;

/// A tempo change at an absolute tick position
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TempoChange {
    /// Absolute tick where this tempo takes effect
    pub tick: u64,

    /// Microseconds per quarter note
    pub us_per_beat: u32,
}

impl TempoChange {
    pub fn bpm(&self) -> f64 {
        us_per_beat_to_bpm(self.us_per_beat)
    }
}

/// Ordered tempo changes for a metrical MIDI file
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TempoMap {
    /// Ticks per quarter note from the file header
    pub ticks_per_beat: u16,

    /// Tempo changes sorted by tick; the first one always sits at tick 0
    changes: Vec<TempoChange>,

    /// First tempo the file actually set, wherever it sits
    #[serde(default)]
    first_explicit: Option<TempoChange>,
}

impl TempoMap {
    /// Build a tempo map from raw changes in any order
    ///
    /// Changes at the same tick keep the last one seen. A default 120 BPM
    /// segment covers the start if the first change is after tick 0.
    pub fn new(ticks_per_beat: u16, mut changes: Vec<TempoChange>) -> Self {
        changes.retain(|c| c.us_per_beat > 0);
        changes.sort_by_key(|c| c.tick);

        let mut merged: Vec<TempoChange> = Vec::with_capacity(changes.len() + 1);
        for change in changes {
            match merged.last_mut() {
                Some(last) if last.tick == change.tick => *last = change,
                _ => merged.push(change),
            }
        }

        let first_explicit = merged.first().copied();

        if merged.first().map(|c| c.tick > 0).unwrap_or(true) {
            merged.insert(
                0,
                TempoChange {
                    tick: 0,
                    us_per_beat: DEFAULT_US_PER_BEAT,
                },
            );
        }

        TempoMap {
            ticks_per_beat: ticks_per_beat.max(1),
            changes: merged,
            first_explicit,
        }
    }

    /// Single tempo for the whole file
    pub fn constant(ticks_per_beat: u16, bpm: f64) -> Self {
        TempoMap::new(
            ticks_per_beat,
            vec![TempoChange {
                tick: 0,
                us_per_beat: bpm_to_us_per_beat(bpm),
            }],
        )
    }

    pub fn changes(&self) -> &[TempoChange] {
        &self.changes
    }

    /// Tempo reported for the song: the first explicit tempo in the file,
    /// even when it starts after tick 0
    pub fn initial_bpm(&self) -> f64 {
        self.first_explicit
            .as_ref()
            .map(TempoChange::bpm)
            .unwrap_or(DEFAULT_BPM)
    }

    /// Absolute time in seconds of an absolute tick position
    pub fn seconds_at(&self, tick: u64) -> f64 {
        let ticks_per_beat = self.ticks_per_beat as f64;
        let mut seconds = 0.0;

        for (i, change) in self.changes.iter().enumerate() {
            if change.tick >= tick {
                break;
            }
            let segment_end = self
                .changes
                .get(i + 1)
                .map(|next| next.tick.min(tick))
                .unwrap_or(tick);
            let ticks = (segment_end - change.tick) as f64;
            seconds += ticks / ticks_per_beat * change.us_per_beat as f64 / 1_000_000.0;
        }

        seconds
    }
}

/// Convert microseconds per quarter note to BPM
pub fn us_per_beat_to_bpm(us_per_beat: u32) -> f64 {
    60_000_000.0 / us_per_beat as f64
}

/// Convert BPM to microseconds per quarter note (24-bit MIDI range)
pub fn bpm_to_us_per_beat(bpm: f64) -> u32 {
    let bpm = if bpm.is_finite() && bpm > 0.0 { bpm } else { DEFAULT_BPM };
    ((60_000_000.0 / bpm).round() as u32).clamp(1, 0xFF_FFFF)
}
