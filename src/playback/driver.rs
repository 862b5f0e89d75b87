//! The playback driver: an explicit transition table over
//! `Idle`, `Loaded-Paused` and `Loaded-Playing`.

use std::time::Duration;

use crate::catalog::{Track, TrackId};

use super::types::{Generation, MediaCmd, MediaEvent, MediaHandle};

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum DriverState {
    /// Nothing bound to the media handle yet.
    Idle,
    /// A track is bound; `playing` tells Loaded-Playing from Loaded-Paused.
    Loaded { playing: bool },
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum DriverEvent {
    /// The selected track changed. `playing` is the flag at that moment.
    Bind { playing: bool },
    /// The playing flag changed (or was re-asserted).
    SetPlaying(bool),
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Action {
    Load,
    Play,
    Pause,
}

/// The transition table. Pure, so every row can be tested directly.
pub fn transition(state: DriverState, event: DriverEvent) -> (DriverState, Vec<Action>) {
    use Action::*;
    use DriverEvent::*;
    use DriverState::*;

    match (state, event) {
        (_, Bind { playing: true }) => (Loaded { playing: true }, vec![Load, Play]),
        (_, Bind { playing: false }) => (Loaded { playing: false }, vec![Load, Pause]),
        (Idle, SetPlaying(_)) => (Idle, vec![]),
        (Loaded { playing: false }, SetPlaying(true)) => (Loaded { playing: true }, vec![Play]),
        (Loaded { playing: true }, SetPlaying(false)) => (Loaded { playing: false }, vec![Pause]),
        (Loaded { playing }, SetPlaying(_)) => (Loaded { playing }, vec![]),
    }
}

/// Percentage of `total` covered by `position`, or `None` while the total is unknown.
pub fn progress_percent(position: Duration, total: Option<Duration>) -> Option<f64> {
    let total = total?;
    if total.is_zero() {
        return None;
    }
    let pct = position.as_secs_f64() / total.as_secs_f64() * 100.0;
    pct.is_finite().then(|| pct.clamp(0.0, 100.0))
}

/// What the controller should apply after a media event.
#[derive(Debug, Clone, PartialEq)]
pub enum DriverUpdate {
    Progress {
        elapsed: Duration,
        /// `None` while the total duration is unknown.
        percent: Option<f64>,
    },
    Ended,
    Failed(String),
}

/// Binds the media handle to the selected track and the playing flag.
pub struct PlaybackDriver<M: MediaHandle> {
    media: M,
    state: DriverState,
    /// Track id and selection epoch of the current binding.
    bound: Option<(TrackId, u64)>,
    generation: Generation,
}

impl<M: MediaHandle> PlaybackDriver<M> {
    pub fn new(media: M) -> Self {
        Self {
            media,
            state: DriverState::Idle,
            bound: None,
            generation: 0,
        }
    }

    pub fn media(&self) -> &M {
        &self.media
    }

    #[cfg(test)]
    pub fn state(&self) -> DriverState {
        self.state
    }

    #[cfg(test)]
    pub fn generation(&self) -> Generation {
        self.generation
    }

    /// Reconcile the media handle with the controller's selection and flag.
    ///
    /// `selected` pairs the track with its selection epoch; a new epoch for the
    /// same track rebinds it from the start. Called once per event-loop
    /// iteration; emits nothing when nothing changed.
    pub fn sync(&mut self, selected: Option<(&Track, u64)>, is_playing: bool) {
        let key = selected.map(|(track, epoch)| (track.id, epoch));
        let selected = selected.map(|(track, _)| track);
        let event = match key {
            Some(key) if self.bound != Some(key) => {
                self.bound = Some(key);
                self.generation += 1;
                DriverEvent::Bind {
                    playing: is_playing,
                }
            }
            _ => DriverEvent::SetPlaying(is_playing),
        };

        let (next, actions) = transition(self.state, event);
        if next != self.state {
            tracing::debug!(from = ?self.state, to = ?next, "playback transition");
        }
        self.state = next;

        for action in actions {
            let cmd = match action {
                Action::Load => {
                    // Bind always comes with a selected track.
                    let Some(track) = selected else { continue };
                    tracing::info!(
                        id = track.id,
                        track = %track.display(),
                        generation = self.generation,
                        "binding track"
                    );
                    MediaCmd::Load {
                        generation: self.generation,
                        url: track.url.clone(),
                        duration_hint: track.duration_hint(),
                    }
                }
                Action::Play => MediaCmd::Play,
                Action::Pause => MediaCmd::Pause,
            };
            self.media.send(cmd);
        }
    }

    /// Translate a media event for the controller. Events from a replaced binding are dropped.
    pub fn accept(&mut self, event: MediaEvent) -> Option<DriverUpdate> {
        if self.bound.is_none() || event.generation() != self.generation {
            tracing::trace!(?event, current = self.generation, "dropping stale media event");
            return None;
        }

        match event {
            MediaEvent::TimeUpdate {
                position, total, ..
            } => Some(DriverUpdate::Progress {
                elapsed: position,
                percent: progress_percent(position, total),
            }),
            MediaEvent::Ended { .. } => {
                self.state = DriverState::Loaded { playing: false };
                Some(DriverUpdate::Ended)
            }
            MediaEvent::Failed { message, .. } => {
                self.state = DriverState::Loaded { playing: false };
                Some(DriverUpdate::Failed(message))
            }
        }
    }
}
