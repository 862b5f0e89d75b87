use super::load::{default_config_path, default_log_path, resolve_config_path};
use super::schema::*;
use std::sync::{Mutex, OnceLock};

static ENV_LOCK: OnceLock<Mutex<()>> = OnceLock::new();

fn env_lock() -> std::sync::MutexGuard<'static, ()> {
    ENV_LOCK.get_or_init(|| Mutex::new(())).lock().unwrap()
}

struct EnvGuard {
    key: &'static str,
    old: Option<std::ffi::OsString>,
}

impl EnvGuard {
    fn set(key: &'static str, val: &str) -> Self {
        let old = std::env::var_os(key);
        unsafe {
            std::env::set_var(key, val);
        }
        Self { key, old }
    }

    fn remove(key: &'static str) -> Self {
        let old = std::env::var_os(key);
        unsafe {
            std::env::remove_var(key);
        }
        Self { key, old }
    }
}

impl Drop for EnvGuard {
    fn drop(&mut self) {
        match self.old.take() {
            Some(v) => unsafe {
                std::env::set_var(self.key, v);
            },
            None => unsafe {
                std::env::remove_var(self.key);
            },
        }
    }
}

#[test]
fn resolve_config_path_prefers_spindle_config_path() {
    let _lock = env_lock();
    let _g1 = EnvGuard::set("SPINDLE_CONFIG_PATH", "/tmp/spindle-test-config.toml");
    assert_eq!(
        resolve_config_path().unwrap(),
        std::path::PathBuf::from("/tmp/spindle-test-config.toml")
    );
}

#[test]
fn default_config_path_prefers_xdg_config_home() {
    let _lock = env_lock();
    let _g1 = EnvGuard::set("XDG_CONFIG_HOME", "/tmp/xdg-config-home");
    let _g2 = EnvGuard::set("HOME", "/tmp/home-should-not-win");

    let p = default_config_path().unwrap();
    assert_eq!(
        p,
        std::path::PathBuf::from("/tmp/xdg-config-home")
            .join("spindle")
            .join("config.toml")
    );
}

#[test]
fn default_config_path_falls_back_to_home_dot_config() {
    let _lock = env_lock();
    let _g1 = EnvGuard::remove("XDG_CONFIG_HOME");
    let _g2 = EnvGuard::set("HOME", "/tmp/home-dir");

    let p = default_config_path().unwrap();
    assert_eq!(
        p,
        std::path::PathBuf::from("/tmp/home-dir")
            .join(".config")
            .join("spindle")
            .join("config.toml")
    );
}

#[test]
fn default_log_path_uses_xdg_state_home() {
    let _lock = env_lock();
    let _g1 = EnvGuard::set("XDG_STATE_HOME", "/tmp/xdg-state");

    assert_eq!(
        default_log_path(),
        std::path::PathBuf::from("/tmp/xdg-state")
            .join("spindle")
            .join("spindle.log")
    );
}

#[test]
fn default_log_path_falls_back_to_home_local_state() {
    let _lock = env_lock();
    let _g1 = EnvGuard::remove("XDG_STATE_HOME");
    let _g2 = EnvGuard::set("HOME", "/tmp/home-dir");

    assert_eq!(
        default_log_path(),
        std::path::PathBuf::from("/tmp/home-dir/.local/state")
            .join("spindle")
            .join("spindle.log")
    );
}

#[test]
fn defaults_point_at_public_catalog_and_validate() {
    let s = Settings::default();
    assert_eq!(s.catalog.url, "https://cms.samespace.com/items/songs");
    assert_eq!(s.catalog.assets_url, "https://cms.samespace.com/assets");
    assert_eq!(s.ui.compact_breakpoint, 100);
    assert!(!s.playback.autoplay_first);
    assert_eq!(s.playback.download_timeout_secs, 300);
    assert!(s.validate().is_ok());
}

#[test]
fn validate_rejects_unusable_values() {
    let mut s = Settings::default();
    s.catalog.url = "  ".into();
    assert!(s.validate().is_err());

    let mut s = Settings::default();
    s.catalog.timeout_secs = 0;
    assert!(s.validate().is_err());

    let mut s = Settings::default();
    s.playback.time_update_ms = 0;
    assert!(s.validate().is_err());

    let mut s = Settings::default();
    s.playback.download_timeout_secs = 0;
    assert!(s.validate().is_err());
}

#[test]
fn settings_load_from_config_file() {
    let _lock = env_lock();

    let dir = tempfile::tempdir().unwrap();
    let cfg_path = dir.path().join("config.toml");
    std::fs::write(
        &cfg_path,
        r#"
[catalog]
url = "http://localhost:8055/items/songs"
assets_url = "http://localhost:8055/assets"
timeout_secs = 3

[ui]
header_text = "hello"
compact_breakpoint = 80
accent_background = false

[playback]
time_update_ms = 500
autoplay_first = true
download_timeout_secs = 45

[log]
filter = "debug"
file = "/tmp/spindle-test.log"
"#,
    )
    .unwrap();

    let _g1 = EnvGuard::set("SPINDLE_CONFIG_PATH", cfg_path.to_str().unwrap());
    let _g2 = EnvGuard::remove("SPINDLE__UI__COMPACT_BREAKPOINT");

    let s = Settings::load().unwrap();
    assert_eq!(s.catalog.url, "http://localhost:8055/items/songs");
    assert_eq!(s.catalog.assets_url, "http://localhost:8055/assets");
    assert_eq!(s.catalog.timeout_secs, 3);
    assert_eq!(s.ui.header_text, "hello");
    assert_eq!(s.ui.compact_breakpoint, 80);
    assert!(!s.ui.accent_background);
    assert_eq!(s.playback.time_update_ms, 500);
    assert!(s.playback.autoplay_first);
    assert_eq!(s.playback.download_timeout_secs, 45);
    assert_eq!(s.log.filter, "debug");
    assert_eq!(
        s.log.file.as_deref(),
        Some(std::path::Path::new("/tmp/spindle-test.log"))
    );
}

#[test]
fn settings_missing_file_falls_back_to_defaults() {
    let _lock = env_lock();
    let dir = tempfile::tempdir().unwrap();
    let _g1 = EnvGuard::set(
        "SPINDLE_CONFIG_PATH",
        dir.path().join("absent.toml").to_str().unwrap(),
    );

    let s = Settings::load().unwrap();
    assert_eq!(s.ui.compact_breakpoint, 100);
    assert_eq!(s.playback.time_update_ms, 250);
}

#[test]
fn settings_env_overrides_config_file() {
    let _lock = env_lock();

    let dir = tempfile::tempdir().unwrap();
    let cfg_path = dir.path().join("config.toml");
    std::fs::write(
        &cfg_path,
        r#"
[ui]
compact_breakpoint = 80
"#,
    )
    .unwrap();

    let _g1 = EnvGuard::set("SPINDLE_CONFIG_PATH", cfg_path.to_str().unwrap());
    let _g2 = EnvGuard::set("SPINDLE__UI__COMPACT_BREAKPOINT", "120");

    let s = Settings::load().unwrap();
    assert_eq!(s.ui.compact_breakpoint, 120);
}
