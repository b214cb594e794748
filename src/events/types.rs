// Note event types
// Timestamped note-on events as delivered by the event source

use serde::{Deserialize, Serialize};

/// A single note-on event
///
/// Produced by the event source and consumed once by the chart builder.
/// Note-offs (velocity 0) never reach this type.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct NoteEvent {
    /// Absolute time in seconds from the start of the song
    pub time: f64,

    /// MIDI note number (0-127)
    pub pitch: u8,

    /// MIDI velocity (1-127)
    pub velocity: u8,

    /// Index of the source track
    pub track: usize,
}

impl NoteEvent {
    pub fn new(time: f64, pitch: u8, velocity: u8, track: usize) -> Self {
        NoteEvent {
            time,
            pitch: pitch & 0x7F,
            velocity: velocity & 0x7F,
            track,
        }
    }

    /// Shorthand for tests and synthetic input: full velocity on track 0
    pub fn at(time: f64, pitch: u8) -> Self {
        NoteEvent::new(time, pitch, 100, 0)
    }
}

/// Sort events by time, keeping source order for simultaneous notes
pub fn sort_by_time(events: &mut [NoteEvent]) {
    events.sort_by(|a, b| a.time.total_cmp(&b.time));
}
