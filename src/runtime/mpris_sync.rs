use crate::app::App;
use crate::mpris::MprisHandle;

pub fn update_mpris(mpris: &MprisHandle, app: &App, assets_url: &str) {
    mpris.set_track_metadata(app.selected_track(), assets_url);
    mpris.set_playback(app.playback_state());
}
