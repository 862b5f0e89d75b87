//! Playback: the driver state machine and the audio thread behind it.
//!
//! The driver decides *what* the media handle should do when the selected
//! track or the playing flag change. The audio thread owns the single `rodio`
//! sink and reports positions back, tagged with the binding generation.

mod driver;
mod player;
mod sink;
mod thread;
mod types;

pub use driver::*;
pub use player::AudioPlayer;
pub use types::*;
