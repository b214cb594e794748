// MIDI Import - Extracts note-on events from Standard MIDI Files using midly
// Tick positions are converted to seconds through the file's tempo map

use std::path::Path;

use midly::{MetaMessage, MidiMessage, Smf, Timing, TrackEventKind};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::types::{sort_by_time, NoteEvent};
use crate::groove::tempo::{TempoChange, TempoMap, DEFAULT_BPM};

#[derive(Debug, Error)]
pub enum MidiError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse MIDI: {0}")]
    Parse(#[from] midly::Error),

    #[error("BPM override must be a positive number, got {0}")]
    InvalidBpm(f64),
}

pub type MidiResult<T> = Result<T, MidiError>;

/// MIDI import options
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MidiImportOptions {
    /// Replace the file's tempo map with a constant tempo
    pub bpm_override: Option<f64>,
}

/// Notes and timing information extracted from a MIDI file
#[derive(Debug, Clone)]
pub struct MidiSong {
    /// Note-on events sorted by time
    pub notes: Vec<NoteEvent>,

    /// Tempo reported for the song (first tempo change, or the override)
    pub bpm: f64,

    /// Number of tracks in the file
    pub track_count: usize,

    /// Tempo changes found in the file (empty for timecode files)
    pub tempo_changes: Vec<TempoChange>,
}

impl MidiSong {
    /// Time range covered by the notes, if any
    pub fn time_range(&self) -> Option<(f64, f64)> {
        Some((self.notes.first()?.time, self.notes.last()?.time))
    }
}

/// Tick-to-seconds conversion for either timing mode
enum Clock {
    Metrical(TempoMap),
    Timecode { ticks_per_second: f64 },
}

impl Clock {
    fn seconds_at(&self, tick: u64) -> f64 {
        match self {
            Clock::Metrical(map) => map.seconds_at(tick),
            Clock::Timecode { ticks_per_second } => tick as f64 / ticks_per_second,
        }
    }
}

/// Load a MIDI file from disk
pub fn load_midi_file(path: &Path, options: &MidiImportOptions) -> MidiResult<MidiSong> {
    let bytes = std::fs::read(path)?;
    let song = parse_midi(&bytes, options)?;

    log::info!(
        "Loaded MIDI file {}: {} tracks, {} notes, {:.2} BPM",
        path.display(),
        song.track_count,
        song.notes.len(),
        song.bpm
    );
    if let Some((first, last)) = song.time_range() {
        log::debug!("Note time range: {:.2}s ~ {:.2}s", first, last);
    }

    Ok(song)
}

/// Parse MIDI file bytes into note events
///
/// Every note-on with non-zero velocity becomes a [`NoteEvent`]; note-ons
/// with velocity 0 are note-offs and are dropped.
pub fn parse_midi(bytes: &[u8], options: &MidiImportOptions) -> MidiResult<MidiSong> {
    if let Some(bpm) = options.bpm_override {
        if !(bpm.is_finite() && bpm > 0.0) {
            return Err(MidiError::InvalidBpm(bpm));
        }
    }

    let smf = Smf::parse(bytes)?;

    let tempo_changes = collect_tempo_changes(&smf);

    let (clock, bpm) = match smf.header.timing {
        Timing::Metrical(ticks_per_beat) => {
            let ticks_per_beat = ticks_per_beat.as_int();
            let map = match options.bpm_override {
                Some(bpm) => TempoMap::constant(ticks_per_beat, bpm),
                None => TempoMap::new(ticks_per_beat, tempo_changes.clone()),
            };
            let bpm = match options.bpm_override {
                Some(bpm) => bpm,
                None if tempo_changes.is_empty() => {
                    log::warn!("No tempo found in MIDI file, using default {} BPM", DEFAULT_BPM);
                    DEFAULT_BPM
                }
                None => map.initial_bpm(),
            };
            (Clock::Metrical(map), bpm)
        }
        Timing::Timecode(fps, subframe) => {
            let ticks_per_second = fps.as_f32() as f64 * subframe.max(1) as f64;
            let bpm = options.bpm_override.unwrap_or(DEFAULT_BPM);
            (Clock::Timecode { ticks_per_second }, bpm)
        }
    };

    let mut notes = Vec::new();

    for (track_idx, track) in smf.tracks.iter().enumerate() {
        let mut tick: u64 = 0;

        for event in track {
            tick += event.delta.as_int() as u64;

            if let TrackEventKind::Midi {
                message: MidiMessage::NoteOn { key, vel },
                ..
            } = &event.kind
            {
                if vel.as_int() > 0 {
                    notes.push(NoteEvent::new(
                        clock.seconds_at(tick),
                        key.as_int(),
                        vel.as_int(),
                        track_idx,
                    ));
                }
            }
        }
    }

    sort_by_time(&mut notes);

    Ok(MidiSong {
        notes,
        bpm,
        track_count: smf.tracks.len(),
        tempo_changes,
    })
}

/// Gather tempo meta events from every track at their absolute ticks
fn collect_tempo_changes(smf: &Smf) -> Vec<TempoChange> {
    let mut changes = Vec::new();

    for track in &smf.tracks {
        let mut tick: u64 = 0;
        for event in track {
            tick += event.delta.as_int() as u64;
            if let TrackEventKind::Meta(MetaMessage::Tempo(tempo)) = &event.kind {
                changes.push(TempoChange {
                    tick,
                    us_per_beat: tempo.as_int(),
                });
            }
        }
    }

    changes
}

#[cfg(test)]
mod tests {
    use super::*;
    use midly::{Format, Header, Track, TrackEvent};

    fn note_on(key: u8, vel: u8) -> TrackEventKind<'static> {
        TrackEventKind::Midi {
            channel: 0.into(),
            message: MidiMessage::NoteOn {
                key: key.into(),
                vel: vel.into(),
            },
        }
    }

    fn tempo(us_per_beat: u32) -> TrackEventKind<'static> {
        TrackEventKind::Meta(MetaMessage::Tempo(us_per_beat.into()))
    }

    /// Build single-track MIDI bytes from (absolute tick, event) pairs
    fn build_smf(events: Vec<(u32, TrackEventKind<'static>)>, ppq: u16) -> Vec<u8> {
        let header = Header {
            format: Format::SingleTrack,
            timing: Timing::Metrical(ppq.into()),
        };

        let mut track = Track::new();
        let mut last_tick = 0;
        for (tick, kind) in events {
            track.push(TrackEvent {
                delta: (tick - last_tick).into(),
                kind,
            });
            last_tick = tick;
        }
        track.push(TrackEvent {
            delta: 0.into(),
            kind: TrackEventKind::Meta(MetaMessage::EndOfTrack),
        });

        let smf = Smf {
            header,
            tracks: vec![track],
        };
        let mut bytes = Vec::new();
        smf.write(&mut bytes).unwrap();
        bytes
    }

    #[test]
    fn test_parse_converts_ticks_to_seconds() {
        let bytes = build_smf(
            vec![(0, tempo(500_000)), (0, note_on(60, 100)), (480, note_on(64, 90))],
            480,
        );

        let song = parse_midi(&bytes, &MidiImportOptions::default()).unwrap();

        assert_eq!(song.notes.len(), 2);
        assert!((song.bpm - 120.0).abs() < 1e-9);
        assert_eq!(song.notes[0].time, 0.0);
        assert!((song.notes[1].time - 0.5).abs() < 1e-9);
        assert_eq!(song.notes[1].pitch, 64);
        assert_eq!(song.notes[1].velocity, 90);
    }

    #[test]
    fn test_zero_velocity_note_on_is_dropped() {
        let bytes = build_smf(
            vec![(0, note_on(60, 100)), (240, note_on(60, 0)), (480, note_on(62, 80))],
            480,
        );

        let song = parse_midi(&bytes, &MidiImportOptions::default()).unwrap();

        assert_eq!(song.notes.len(), 2);
        assert!(song.notes.iter().all(|n| n.velocity > 0));
    }

    #[test]
    fn test_missing_tempo_defaults_to_120() {
        let bytes = build_smf(vec![(960, note_on(70, 100))], 480);

        let song = parse_midi(&bytes, &MidiImportOptions::default()).unwrap();

        assert!((song.bpm - DEFAULT_BPM).abs() < 1e-9);
        assert!((song.notes[0].time - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_bpm_override_replaces_tempo_map() {
        let bytes = build_smf(vec![(0, tempo(500_000)), (480, note_on(60, 100))], 480);

        let options = MidiImportOptions {
            bpm_override: Some(60.0),
        };
        let song = parse_midi(&bytes, &options).unwrap();

        assert!((song.bpm - 60.0).abs() < 1e-9);
        assert!((song.notes[0].time - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_invalid_bpm_override_rejected() {
        let bytes = build_smf(vec![(480, note_on(60, 100))], 480);

        for bpm in [0.0, -90.0, f64::NAN, f64::INFINITY] {
            let options = MidiImportOptions {
                bpm_override: Some(bpm),
            };
            let result = parse_midi(&bytes, &options);
            assert!(
                matches!(result, Err(MidiError::InvalidBpm(_))),
                "override {} was accepted",
                bpm
            );
        }
    }

    #[test]
    fn test_late_first_tempo_is_reported() {
        let bytes = build_smf(vec![(0, note_on(60, 100)), (480, tempo(1_000_000))], 480);

        let song = parse_midi(&bytes, &MidiImportOptions::default()).unwrap();

        assert!((song.bpm - 60.0).abs() < 1e-9);
    }

    #[test]
    fn test_tempo_change_applies_from_its_tick() {
        let bytes = build_smf(
            vec![
                (0, tempo(500_000)),
                (480, tempo(1_000_000)),
                (960, note_on(60, 100)),
            ],
            480,
        );

        let song = parse_midi(&bytes, &MidiImportOptions::default()).unwrap();

        assert_eq!(song.tempo_changes.len(), 2);
        assert!((song.notes[0].time - 1.5).abs() < 1e-9);
    }

    #[test]
    fn test_invalid_bytes_fail_to_parse() {
        let result = parse_midi(b"not a midi file", &MidiImportOptions::default());
        assert!(matches!(result, Err(MidiError::Parse(_))));
    }

    #[test]
    fn test_load_missing_file() {
        let result = load_midi_file(
            Path::new("/definitely/not/here.mid"),
            &MidiImportOptions::default(),
        );
        assert!(matches!(result, Err(MidiError::Io(_))));
    }
}
