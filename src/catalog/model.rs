use std::time::Duration;

use serde::Deserialize;

/// Identity of a track inside the catalog.
pub type TrackId = u64;

/// A single catalog entry as returned by the content API.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Track {
    pub id: TrackId,
    pub name: String,
    pub artist: String,
    /// Asset reference for the cover image, resolved against the asset host.
    #[serde(default)]
    pub cover: Option<String>,
    /// Audio source.
    pub url: String,
    /// Display label such as `"3:45"`.
    #[serde(default)]
    pub duration: Option<String>,
    #[serde(default)]
    pub top_track: bool,
    /// Background color used while this track is selected (`#RRGGBB`).
    #[serde(default)]
    pub accent: Option<String>,
}

impl Track {
    /// `"name - artist"`, dropping the artist when blank.
    pub fn display(&self) -> String {
        match self.artist.trim() {
            "" => self.name.clone(),
            a => format!("{} - {}", self.name.trim(), a),
        }
    }

    /// Parse `accent` into RGB components. Accepts `#RRGGBB`, `RRGGBB` and `#RGB`.
    pub fn accent_rgb(&self) -> Option<(u8, u8, u8)> {
        parse_hex_color(self.accent.as_deref()?)
    }

    /// Duration parsed from the display label (`m:ss` or `h:mm:ss`).
    pub fn duration_hint(&self) -> Option<Duration> {
        parse_duration_label(self.duration.as_deref()?)
    }
}

/// The response envelope of the catalog endpoint.
#[derive(Debug, Deserialize)]
pub(crate) struct CatalogResponse {
    pub data: Vec<Track>,
}

pub(crate) fn parse_hex_color(raw: &str) -> Option<(u8, u8, u8)> {
    let hex = raw.trim().trim_start_matches('#');
    if !hex.is_ascii() {
        return None;
    }
    match hex.len() {
        6 => {
            let r = u8::from_str_radix(&hex[0..2], 16).ok()?;
            let g = u8::from_str_radix(&hex[2..4], 16).ok()?;
            let b = u8::from_str_radix(&hex[4..6], 16).ok()?;
            Some((r, g, b))
        }
        3 => {
            // #abc == #aabbcc
            let mut out = [0u8; 3];
            for (i, c) in hex.chars().enumerate() {
                let v = c.to_digit(16)? as u8;
                out[i] = v * 16 + v;
            }
            Some((out[0], out[1], out[2]))
        }
        _ => None,
    }
}

pub(crate) fn parse_duration_label(raw: &str) -> Option<Duration> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }

    let mut secs: u64 = 0;
    let mut parts = 0;
    for part in raw.split(':') {
        let v: u64 = part.trim().parse().ok()?;
        secs = secs.checked_mul(60)?.checked_add(v)?;
        parts += 1;
    }
    if parts > 3 {
        return None;
    }
    Some(Duration::from_secs(secs))
}
