// Playback module
// State machine for the game board's music controls (no audio device)

pub mod state;

pub use state::{PlaybackAction, PlaybackController, PlaybackState, StatusSample, Transition};
