use std::sync::Mutex;
use std::sync::mpsc::{self, Receiver, Sender};
use std::thread::JoinHandle;
use std::time::Duration;

use super::thread::spawn_audio_thread;
use super::types::{MediaCmd, MediaEvent, MediaHandle};

/// Handle to the audio thread: commands go in, position reports come out.
pub struct AudioPlayer {
    tx: Sender<MediaCmd>,
    events: Receiver<MediaEvent>,
    join: Mutex<Option<JoinHandle<()>>>,
}

impl AudioPlayer {
    /// Spawn the audio thread. `tick` is the position report interval and
    /// `download_timeout` bounds fetching one track.
    pub fn new(tick: Duration, download_timeout: Duration) -> Self {
        let (tx, rx) = mpsc::channel::<MediaCmd>();
        let (event_tx, event_rx) = mpsc::channel::<MediaEvent>();

        let audio_handle = spawn_audio_thread(rx, event_tx, tick, download_timeout);

        Self {
            tx,
            events: event_rx,
            join: Mutex::new(Some(audio_handle)),
        }
    }

    /// Next pending event from the audio thread, if any.
    pub fn try_event(&self) -> Option<MediaEvent> {
        self.events.try_recv().ok()
    }

    /// Stop playback and wait for the audio thread to exit.
    pub fn quit(&self) {
        let _ = self.tx.send(MediaCmd::Quit);

        if let Ok(mut j) = self.join.lock() {
            if let Some(h) = j.take() {
                let _ = h.join();
            }
        }
    }
}

impl MediaHandle for AudioPlayer {
    fn send(&self, cmd: MediaCmd) {
        if let Err(e) = self.tx.send(cmd) {
            tracing::warn!(cmd = ?e.0, "audio thread is gone");
        }
    }
}
