// Event source module
// Note-on events and the MIDI file importer that produces them

pub mod midi;
pub mod types;

pub use midi::{load_midi_file, parse_midi, MidiError, MidiImportOptions, MidiResult, MidiSong};
pub use types::{sort_by_time, NoteEvent};
