use crate::config;

/// Load settings, falling back to defaults on any problem.
///
/// Logging is not up yet at this point, so the reason for a fallback is
/// returned for the caller to log once the subscriber exists.
pub fn load_settings() -> (config::Settings, Option<String>) {
    match config::Settings::load() {
        Ok(s) => {
            if let Err(msg) = s.validate() {
                let warning = format!("invalid config, using defaults: {msg}");
                eprintln!("spindle: {warning}");
                (config::Settings::default(), Some(warning))
            } else {
                (s, None)
            }
        }
        Err(e) => {
            // Config is optional; failures should not prevent the app from starting.
            let warning = format!("failed to load config, using defaults: {e}");
            eprintln!("spindle: {warning}");
            (config::Settings::default(), Some(warning))
        }
    }
}
