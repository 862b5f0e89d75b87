use std::path::PathBuf;

use serde::Deserialize;

/// Top-level application settings loaded from `config.toml`.
///
/// File format: TOML
/// Default path (Linux/XDG): `$XDG_CONFIG_HOME/spindle/config.toml` or `~/.config/spindle/config.toml`
///
/// Precedence (highest wins):
/// 1) Environment variables (prefix `SPINDLE__`, `__` as nested separator)
/// 2) Config file (if present)
/// 3) Struct defaults
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub catalog: CatalogSettings,
    pub ui: UiSettings,
    pub playback: PlaybackSettings,
    pub log: LogSettings,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct CatalogSettings {
    /// Endpoint returning the `{ "data": [...] }` song list.
    pub url: String,
    /// Base location that cover references are appended to.
    pub assets_url: String,
    /// Request timeout for the catalog fetch (seconds).
    pub timeout_secs: u64,
}

impl Default for CatalogSettings {
    fn default() -> Self {
        Self {
            url: "https://cms.samespace.com/items/songs".to_string(),
            assets_url: "https://cms.samespace.com/assets".to_string(),
            timeout_secs: 10,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct UiSettings {
    /// The text rendered inside the top header box.
    pub header_text: String,

    /// Terminals narrower than this many columns use the compact layout:
    /// the track list can be hidden and collapses after a selection.
    pub compact_breakpoint: u16,

    /// Tint the header and player with the selected track's accent color.
    pub accent_background: bool,
}

impl Default for UiSettings {
    fn default() -> Self {
        Self {
            header_text: " ~ spindle ~ ".to_string(),
            compact_breakpoint: 100,
            accent_background: true,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct PlaybackSettings {
    /// How often the audio thread reports the playback position (milliseconds).
    pub time_update_ms: u64,
    /// Start playing the first track as soon as the catalog arrives.
    pub autoplay_first: bool,
    /// Upper bound on downloading one track's audio (seconds). Tracks are
    /// fetched whole before they play.
    pub download_timeout_secs: u64,
}

impl Default for PlaybackSettings {
    fn default() -> Self {
        Self {
            time_update_ms: 250,
            autoplay_first: false,
            download_timeout_secs: 300,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LogSettings {
    /// `tracing_subscriber::EnvFilter` directives. `RUST_LOG` wins when set.
    pub filter: String,
    /// Log file path. Defaults to `$XDG_STATE_HOME/spindle/spindle.log`.
    pub file: Option<PathBuf>,
}

impl Default for LogSettings {
    fn default() -> Self {
        Self {
            filter: "info,reqwest=warn,hyper=warn,hyper_util=warn".to_string(),
            file: None,
        }
    }
}
