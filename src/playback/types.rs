//! Commands, events and the media-handle seam shared by the playback driver
//! and the audio thread.

use std::time::Duration;

/// Identifies one binding of the media handle to a track. Increases on every load.
pub type Generation = u64;

#[derive(Debug, Clone, PartialEq)]
pub enum MediaCmd {
    /// Replace whatever is bound with `url`, paused at position zero.
    Load {
        generation: Generation,
        url: String,
        /// Fallback total duration when the decoder cannot tell.
        duration_hint: Option<Duration>,
    },
    /// Start or resume from the current position.
    Play,
    /// Pause at the current position.
    Pause,
    /// Stop playback and end the audio thread.
    Quit,
}

#[derive(Debug, Clone, PartialEq)]
pub enum MediaEvent {
    /// Periodic position report while playing.
    TimeUpdate {
        generation: Generation,
        position: Duration,
        total: Option<Duration>,
    },
    /// The bound track played to its end.
    Ended { generation: Generation },
    /// Fetching, decoding or playing the bound track failed.
    Failed {
        generation: Generation,
        message: String,
    },
}

impl MediaEvent {
    pub fn generation(&self) -> Generation {
        match self {
            MediaEvent::TimeUpdate { generation, .. }
            | MediaEvent::Ended { generation }
            | MediaEvent::Failed { generation, .. } => *generation,
        }
    }
}

/// Where the driver sends its commands. The audio thread in production,
/// a recorder in tests.
pub trait MediaHandle {
    fn send(&self, cmd: MediaCmd);
}
