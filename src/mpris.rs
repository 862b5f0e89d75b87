//! MPRIS (`org.mpris.MediaPlayer2`) bridge so media keys and `playerctl`
//! can drive the player. Runs its own thread; commands flow back over a channel.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, mpsc::Sender};

use async_io::{Timer, block_on};
use zbus::{Connection, interface};
use zvariant::{OwnedValue, Value};

use crate::app::PlaybackState;
use crate::catalog::{Track, cover_url};

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ControlCmd {
    Quit,
    Play,
    Pause,
    PlayPause,
    Stop,
    Next,
    Prev,
}

#[derive(Debug, Default)]
struct SharedState {
    playback: PlaybackState,
    title: Option<String>,
    artist: Option<String>,
    art_url: Option<String>,
    /// Track length in microseconds, when the catalog gives one.
    length_us: Option<i64>,
}

pub struct MprisHandle {
    state: Arc<Mutex<SharedState>>,
}

impl MprisHandle {
    pub fn set_playback(&self, playback: PlaybackState) {
        if let Ok(mut s) = self.state.lock() {
            s.playback = playback;
        }
    }

    /// Publish `track` (or clear when `None`). Cover art resolves against `assets_url`.
    pub fn set_track_metadata(&self, track: Option<&Track>, assets_url: &str) {
        if let Ok(mut s) = self.state.lock() {
            s.title = track.map(|t| t.name.clone());
            s.artist = track
                .map(|t| t.artist.trim().to_string())
                .filter(|a| !a.is_empty());
            s.art_url = track
                .and_then(|t| t.cover.as_deref())
                .map(|c| cover_url(assets_url, c));
            s.length_us = track
                .and_then(Track::duration_hint)
                .and_then(|d| i64::try_from(d.as_micros()).ok());
        }
    }
}

struct RootIface {
    tx: Sender<ControlCmd>,
}

fn forward(tx: &Sender<ControlCmd>, cmd: ControlCmd) {
    if tx.send(cmd).is_err() {
        tracing::debug!("MPRIS command after the event loop stopped");
    }
}

#[interface(name = "org.mpris.MediaPlayer2")]
impl RootIface {
    /// A terminal cannot be raised.
    fn raise(&self) {}

    fn quit(&self) {
        forward(&self.tx, ControlCmd::Quit);
    }

    #[zbus(property)]
    fn can_quit(&self) -> bool {
        true
    }

    #[zbus(property)]
    fn can_raise(&self) -> bool {
        false
    }

    #[zbus(property)]
    fn has_track_list(&self) -> bool {
        false
    }

    #[zbus(property)]
    fn identity(&self) -> &str {
        "spindle"
    }

    #[zbus(property)]
    fn supported_uri_schemes(&self) -> Vec<String> {
        vec![]
    }

    #[zbus(property)]
    fn supported_mime_types(&self) -> Vec<String> {
        vec![]
    }
}

struct PlayerIface {
    tx: Sender<ControlCmd>,
    state: Arc<Mutex<SharedState>>,
}

#[interface(name = "org.mpris.MediaPlayer2.Player")]
impl PlayerIface {
    fn next(&self) {
        forward(&self.tx, ControlCmd::Next);
    }

    fn previous(&self) {
        forward(&self.tx, ControlCmd::Prev);
    }

    fn play(&self) {
        forward(&self.tx, ControlCmd::Play);
    }

    fn pause(&self) {
        forward(&self.tx, ControlCmd::Pause);
    }

    fn play_pause(&self) {
        forward(&self.tx, ControlCmd::PlayPause);
    }

    fn stop(&self) {
        forward(&self.tx, ControlCmd::Stop);
    }

    #[zbus(property)]
    fn playback_status(&self) -> &str {
        let Ok(s) = self.state.lock() else {
            return "Stopped";
        };
        status_str(s.playback)
    }

    #[zbus(property)]
    fn can_control(&self) -> bool {
        true
    }

    #[zbus(property)]
    fn can_play(&self) -> bool {
        true
    }

    #[zbus(property)]
    fn can_pause(&self) -> bool {
        true
    }

    #[zbus(property)]
    fn can_go_next(&self) -> bool {
        true
    }

    #[zbus(property)]
    fn can_go_previous(&self) -> bool {
        true
    }

    #[zbus(property)]
    fn metadata(&self) -> HashMap<String, OwnedValue> {
        let mut map = HashMap::new();
        let Ok(s) = self.state.lock() else {
            return map;
        };

        if let Some(title) = s.title.clone() {
            if let Ok(v) = OwnedValue::try_from(Value::from(title)) {
                map.insert("xesam:title".to_string(), v);
            }
        }
        if let Some(artist) = s.artist.clone() {
            if let Ok(v) = OwnedValue::try_from(Value::from(vec![artist])) {
                map.insert("xesam:artist".to_string(), v);
            }
        }
        if let Some(art) = s.art_url.clone() {
            if let Ok(v) = OwnedValue::try_from(Value::from(art)) {
                map.insert("mpris:artUrl".to_string(), v);
            }
        }
        if let Some(len) = s.length_us {
            if let Ok(v) = OwnedValue::try_from(Value::from(len)) {
                map.insert("mpris:length".to_string(), v);
            }
        }
        map
    }
}

fn status_str(playback: PlaybackState) -> &'static str {
    match playback {
        PlaybackState::Stopped => "Stopped",
        PlaybackState::Playing => "Playing",
        PlaybackState::Paused => "Paused",
    }
}

const BUS_NAME: &str = "org.mpris.MediaPlayer2.spindle";
const OBJECT_PATH: &str = "/org/mpris/MediaPlayer2";

/// Claim the bus name and serve both interfaces. Returns the live connection.
async fn serve(
    tx: Sender<ControlCmd>,
    state: Arc<Mutex<SharedState>>,
) -> zbus::Result<Connection> {
    let connection = Connection::session().await?;
    connection.request_name(BUS_NAME).await?;

    let server = connection.object_server();
    server.at(OBJECT_PATH, RootIface { tx: tx.clone() }).await?;
    server.at(OBJECT_PATH, PlayerIface { tx, state }).await?;
    Ok(connection)
}

/// Start the MPRIS service on its own thread.
///
/// A missing session bus only disables remote control; the player keeps running.
pub fn spawn_mpris(tx: Sender<ControlCmd>) -> MprisHandle {
    let state = Arc::new(Mutex::new(SharedState::default()));

    let shared = state.clone();
    std::thread::spawn(move || {
        block_on(async move {
            let _connection = match serve(tx, shared).await {
                Ok(c) => c,
                Err(e) => {
                    tracing::warn!(error = %e, "MPRIS unavailable");
                    return;
                }
            };
            tracing::info!(name = BUS_NAME, "MPRIS service registered");

            // The connection serves requests as long as it is alive.
            loop {
                Timer::after(std::time::Duration::from_secs(3600)).await;
            }
        });
    });

    MprisHandle { state }
}
