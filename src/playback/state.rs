// Playback Controller - Decodes game-board status bytes into playback actions
// Edge-triggered on the death bit; while the game is over every other signal is ignored

use std::fmt;

use serde::Serialize;

/// One status byte from the game board
///
/// Bit layout: 5 death, 4 pause (play when clear), 3..2 song number,
/// 1 reset (active-low), 0 hit (active-low).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct StatusSample {
    pub raw: u8,
    pub death: bool,
    pub paused: bool,
    pub song: u8,
    pub reset: bool,
    pub hit: bool,
}

impl StatusSample {
    pub fn decode(raw: u8) -> Self {
        StatusSample {
            raw,
            death: (raw >> 5) & 0x01 == 1,
            paused: (raw >> 4) & 0x01 == 1,
            song: (raw >> 2) & 0x03,
            reset: (raw >> 1) & 0x01 == 0,
            hit: raw & 0x01 == 0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PlaybackState {
    Stopped,
    Playing,
    Paused,
    GameOver,
}

impl PlaybackState {
    pub fn to_string(&self) -> &'static str {
        match self {
            PlaybackState::Stopped => "stopped",
            PlaybackState::Playing => "playing",
            PlaybackState::Paused => "paused",
            PlaybackState::GameOver => "game_over",
        }
    }
}

/// Side effects requested by a transition, in the order they should run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case", tag = "action")]
pub enum PlaybackAction {
    /// Load a song and play it looped from the start
    Play { song: u8 },
    Pause,
    Resume,
    /// Play the current song from the start
    Restart { song: u8 },
    /// Stop the music because the game ended
    Stop,
    /// One-shot hit sound for a song
    HitSound { song: u8 },
}

impl fmt::Display for PlaybackAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PlaybackAction::Play { song } => write!(f, "play song {}", song),
            PlaybackAction::Pause => write!(f, "pause"),
            PlaybackAction::Resume => write!(f, "resume"),
            PlaybackAction::Restart { song } => write!(f, "restart song {}", song),
            PlaybackAction::Stop => write!(f, "stop (game over)"),
            PlaybackAction::HitSound { song } => write!(f, "hit sound {}", song),
        }
    }
}

/// Outcome of feeding one sample to the controller
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Transition {
    pub sample: StatusSample,
    pub from: PlaybackState,
    pub to: PlaybackState,
    pub actions: Vec<PlaybackAction>,
}

/// Playback state machine driven by consecutive status samples
#[derive(Debug, Clone)]
pub struct PlaybackController {
    state: PlaybackState,
    current_song: Option<u8>,
    death_latched: bool,
}

impl Default for PlaybackController {
    fn default() -> Self {
        PlaybackController {
            state: PlaybackState::Stopped,
            current_song: None,
            death_latched: false,
        }
    }
}

impl PlaybackController {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> PlaybackState {
        self.state
    }

    pub fn current_song(&self) -> Option<u8> {
        self.current_song
    }

    pub fn step_raw(&mut self, raw: u8) -> Transition {
        self.step(StatusSample::decode(raw))
    }

    pub fn step(&mut self, sample: StatusSample) -> Transition {
        let from = self.state;
        let mut actions = Vec::new();

        if sample.death && !self.death_latched {
            actions.push(PlaybackAction::Stop);
            self.state = PlaybackState::GameOver;
        } else if !sample.death && self.death_latched {
            let song = self.current_song.unwrap_or(sample.song);
            self.current_song = Some(song);
            actions.push(PlaybackAction::Restart { song });
            self.state = PlaybackState::Playing;
        }

        if sample.death {
            self.death_latched = true;
            return self.finish(sample, from, actions);
        }

        if sample.reset {
            if let Some(song) = self.current_song {
                actions.push(PlaybackAction::Restart { song });
                self.state = PlaybackState::Playing;
            }
        }

        if !sample.paused {
            if self.current_song != Some(sample.song) {
                actions.push(PlaybackAction::Play { song: sample.song });
                self.current_song = Some(sample.song);
                self.state = PlaybackState::Playing;
            } else if self.state != PlaybackState::Playing {
                actions.push(PlaybackAction::Resume);
                self.state = PlaybackState::Playing;
            }
        } else if self.state == PlaybackState::Playing {
            actions.push(PlaybackAction::Pause);
            self.state = PlaybackState::Paused;
        }

        if sample.hit {
            actions.push(PlaybackAction::HitSound { song: sample.song });
        }

        self.death_latched = false;
        self.finish(sample, from, actions)
    }

    fn finish(
        &self,
        sample: StatusSample,
        from: PlaybackState,
        actions: Vec<PlaybackAction>,
    ) -> Transition {
        if from != self.state {
            log::debug!(
                "Playback {} -> {} on {:#08b}",
                from.to_string(),
                self.state.to_string(),
                sample.raw
            );
        }
        Transition {
            sample,
            from,
            to: self.state,
            actions,
        }
    }
}
