use std::collections::VecDeque;
use std::sync::mpsc::{Receiver, RecvTimeoutError, Sender};
use std::thread;
use std::thread::JoinHandle;
use std::time::{Duration, Instant};

use rodio::{OutputStream, OutputStreamBuilder, Sink};

use super::sink::{AudioBytes, MediaError, create_sink, fetch_audio};
use super::types::{Generation, MediaCmd, MediaEvent};

/// The parts of a `rodio::Sink` the engine drives.
pub(super) trait AudioSink {
    fn play(&self);
    fn pause(&self);
    fn stop(&self);
    fn empty(&self) -> bool;
    fn is_paused(&self) -> bool;
    fn get_pos(&self) -> Duration;
}

impl AudioSink for Sink {
    fn play(&self) {
        Sink::play(self)
    }

    fn pause(&self) {
        Sink::pause(self)
    }

    fn stop(&self) {
        Sink::stop(self)
    }

    fn empty(&self) -> bool {
        Sink::empty(self)
    }

    fn is_paused(&self) -> bool {
        Sink::is_paused(self)
    }

    fn get_pos(&self) -> Duration {
        Sink::get_pos(self)
    }
}

/// Where audio comes from and where it is played.
pub(super) trait AudioBackend {
    type Sink: AudioSink;

    /// Fails early when nothing could ever be played.
    fn check_output(&self) -> Result<(), MediaError> {
        Ok(())
    }

    fn fetch(&self, url: &str) -> Result<AudioBytes, MediaError>;

    /// A paused sink over `bytes` from the start, plus the decoded total when known.
    fn open(&self, bytes: &AudioBytes) -> Result<(Self::Sink, Option<Duration>), MediaError>;
}

/// The real output device and HTTP client.
struct Device {
    stream: Option<OutputStream>,
    client: reqwest::blocking::Client,
}

impl AudioBackend for Device {
    type Sink = Sink;

    fn check_output(&self) -> Result<(), MediaError> {
        match self.stream {
            Some(_) => Ok(()),
            None => Err(MediaError::NoOutputDevice("output stream unavailable".into())),
        }
    }

    fn fetch(&self, url: &str) -> Result<AudioBytes, MediaError> {
        fetch_audio(&self.client, url)
    }

    fn open(&self, bytes: &AudioBytes) -> Result<(Sink, Option<Duration>), MediaError> {
        let stream = self
            .stream
            .as_ref()
            .ok_or_else(|| MediaError::NoOutputDevice("output stream unavailable".into()))?;
        create_sink(stream, bytes)
    }
}

/// The track currently bound to the sink.
struct Bound<S> {
    sink: S,
    bytes: AudioBytes,
    total: Option<Duration>,
    ended: bool,
}

/// Command handling of the audio thread, independent of the output device.
pub(super) struct Engine<B: AudioBackend> {
    backend: B,
    events: Sender<MediaEvent>,
    generation: Generation,
    bound: Option<Bound<B::Sink>>,
    pending: VecDeque<MediaCmd>,
}

impl<B: AudioBackend> Engine<B> {
    pub(super) fn new(backend: B, events: Sender<MediaEvent>) -> Self {
        Self {
            backend,
            events,
            generation: 0,
            bound: None,
            pending: VecDeque::new(),
        }
    }

    /// Process commands until `Quit` or until the sender is dropped.
    /// Reports the position every `tick`.
    pub(super) fn run(&mut self, rx: &Receiver<MediaCmd>, tick: Duration) {
        let mut last_report = Instant::now();

        loop {
            let next = match self.pending.pop_front() {
                Some(cmd) => Ok(cmd),
                None => rx.recv_timeout(tick),
            };

            match next {
                Ok(MediaCmd::Quit) | Err(RecvTimeoutError::Disconnected) => {
                    self.unbind();
                    break;
                }
                Ok(cmd) => {
                    if matches!(cmd, MediaCmd::Load { .. }) {
                        // Look ahead so a rebind already queued skips this download.
                        self.pending.extend(rx.try_iter());
                    }
                    self.apply(cmd);
                }
                Err(RecvTimeoutError::Timeout) => {}
            }

            if last_report.elapsed() >= tick {
                last_report = Instant::now();
                self.report();
            }
        }
    }

    pub(super) fn apply(&mut self, cmd: MediaCmd) {
        match cmd {
            MediaCmd::Load {
                generation,
                url,
                duration_hint,
            } => self.load(generation, &url, duration_hint),
            MediaCmd::Play => self.play(),
            MediaCmd::Pause => {
                if let Some(b) = self.bound.as_ref() {
                    b.sink.pause();
                }
            }
            MediaCmd::Quit => self.unbind(),
        }
    }

    fn superseded(&self) -> bool {
        self.pending
            .iter()
            .any(|c| matches!(c, MediaCmd::Load { .. } | MediaCmd::Quit))
    }

    fn unbind(&mut self) {
        if let Some(old) = self.bound.take() {
            old.sink.stop();
        }
    }

    fn load(&mut self, generation: Generation, url: &str, duration_hint: Option<Duration>) {
        self.unbind();
        self.generation = generation;

        if self.superseded() {
            tracing::debug!(generation, "load superseded before download");
            return;
        }

        let loaded = self.backend.check_output().and_then(|()| {
            let bytes = self.backend.fetch(url)?;
            let (sink, total) = self.backend.open(&bytes)?;
            Ok((sink, bytes, total))
        });

        match loaded {
            Ok((sink, bytes, total)) => {
                self.bound = Some(Bound {
                    sink,
                    bytes,
                    total: total.or(duration_hint),
                    ended: false,
                });
            }
            Err(e) => send_failure(&self.events, generation, e),
        }
    }

    fn play(&mut self) {
        let Some(b) = self.bound.as_mut() else {
            send_failure(&self.events, self.generation, MediaError::NotLoaded);
            return;
        };

        if b.sink.empty() {
            // Played to the end earlier: start over from the cached bytes.
            match self.backend.open(&b.bytes) {
                Ok((sink, _)) => {
                    b.sink.stop();
                    b.sink = sink;
                }
                Err(e) => {
                    send_failure(&self.events, self.generation, e);
                    return;
                }
            }
        }
        b.ended = false;
        b.sink.play();
    }

    /// Send a position report, or a single `Ended` once the sink drains.
    pub(super) fn report(&mut self) {
        let Some(b) = self.bound.as_mut() else {
            return;
        };
        if b.sink.is_paused() || b.ended {
            return;
        }

        let event = if b.sink.empty() {
            b.ended = true;
            MediaEvent::Ended {
                generation: self.generation,
            }
        } else {
            MediaEvent::TimeUpdate {
                generation: self.generation,
                position: b.sink.get_pos(),
                total: b.total,
            }
        };
        let _ = self.events.send(event);
    }
}

fn send_failure(events: &Sender<MediaEvent>, generation: Generation, err: MediaError) {
    tracing::warn!(generation, error = %err, "playback failed");
    let _ = events.send(MediaEvent::Failed {
        generation,
        message: err.to_string(),
    });
}

pub(super) fn spawn_audio_thread(
    rx: Receiver<MediaCmd>,
    events: Sender<MediaEvent>,
    tick: Duration,
    download_timeout: Duration,
) -> JoinHandle<()> {
    thread::spawn(move || {
        let stream = match OutputStreamBuilder::open_default_stream() {
            Ok(mut stream) => {
                // rodio logs to stderr when OutputStream is dropped, which
                // would scribble over the TUI.
                stream.log_on_drop(false);
                Some(stream)
            }
            Err(e) => {
                tracing::error!(error = %e, "failed to open audio output");
                None
            }
        };

        let client = match reqwest::blocking::Client::builder()
            .connect_timeout(Duration::from_secs(10))
            .timeout(download_timeout)
            .build()
        {
            Ok(c) => c,
            Err(e) => {
                tracing::error!(error = %e, "failed to build audio http client");
                return;
            }
        };

        Engine::new(Device { stream, client }, events).run(&rx, tick);
        tracing::debug!("audio thread stopped");
    })
}
