use std::sync::mpsc::{self, Receiver};
use std::thread;
use std::time::Duration;

use reqwest::StatusCode;
use reqwest::header::ACCEPT;

use crate::config::CatalogSettings;

use super::model::{CatalogResponse, Track};

#[derive(Debug, thiserror::Error)]
pub enum CatalogError {
    #[error("catalog request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("catalog endpoint returned status {0}")]
    Status(StatusCode),
    #[error("catalog response is not valid: {0}")]
    Decode(#[from] serde_json::Error),
    #[error("catalog loader stopped before delivering a result")]
    LoaderGone,
}

/// Result of the one catalog fetch performed per session.
pub type LoadOutcome = Result<Vec<Track>, CatalogError>;

/// Parse the `{ "data": [...] }` envelope, preserving track order.
pub fn parse_catalog(body: &str) -> Result<Vec<Track>, serde_json::Error> {
    let response: CatalogResponse = serde_json::from_str(body)?;
    Ok(response.data)
}

/// Fetch the catalog with a single blocking request. No retries.
pub fn fetch_catalog(settings: &CatalogSettings) -> LoadOutcome {
    let client = reqwest::blocking::Client::builder()
        .timeout(Duration::from_secs(settings.timeout_secs))
        .build()?;

    let response = client
        .get(&settings.url)
        .header(ACCEPT, "application/json")
        .send()?;

    let status = response.status();
    if !status.is_success() {
        return Err(CatalogError::Status(status));
    }

    let body = response.text()?;
    let tracks = parse_catalog(&body)?;
    tracing::debug!(count = tracks.len(), "catalog parsed");
    Ok(tracks)
}

/// Run `fetch_catalog` on a background thread. The receiver yields exactly one outcome.
pub fn spawn_loader(settings: CatalogSettings) -> Receiver<LoadOutcome> {
    let (tx, rx) = mpsc::channel::<LoadOutcome>();
    thread::spawn(move || {
        tracing::info!(url = %settings.url, "fetching catalog");
        let outcome = fetch_catalog(&settings);
        // The UI may already be gone on quit.
        let _ = tx.send(outcome);
    });
    rx
}

/// Build the cover image URL from the asset host base and a track's cover reference.
pub fn cover_url(assets_base: &str, cover: &str) -> String {
    format!(
        "{}/{}",
        assets_base.trim_end_matches('/'),
        cover.trim_start_matches('/')
    )
}
