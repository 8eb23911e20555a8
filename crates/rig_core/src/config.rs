//! Host-side settings: defaults, `rig.toml` overrides, then environment.

use std::{fs, path::PathBuf};

use serde::Deserialize;
use tracing::warn;

#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(default)]
pub struct Settings {
    /// Raw encoder counts per speed unit; sensor-specific.
    pub speed_scale: f64,
    pub n_trials: u32,
    pub mouse_id: u32,
    pub data_dir: PathBuf,
    /// Run the upcoming session in text (debug) protocol mode.
    pub debug: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            speed_scale: 0.082,
            n_trials: 200,
            mouse_id: 1,
            data_dir: "./data".into(),
            debug: false,
        }
    }
}

pub fn load_settings() -> Settings {
    let mut settings = Settings::default();

    if let Ok(raw) = fs::read_to_string("rig.toml") {
        match toml::from_str::<Settings>(&raw) {
            Ok(file_cfg) => settings = file_cfg,
            Err(err) => warn!(%err, "ignoring malformed rig.toml"),
        }
    }

    if let Ok(v) = std::env::var("RIG_SPEED_SCALE") {
        if let Ok(v) = v.parse() {
            settings.speed_scale = v;
        }
    }
    if let Ok(v) = std::env::var("RIG_N_TRIALS") {
        if let Ok(v) = v.parse() {
            settings.n_trials = v;
        }
    }
    if let Ok(v) = std::env::var("RIG_MOUSE_ID") {
        if let Ok(v) = v.parse() {
            settings.mouse_id = v;
        }
    }
    if let Ok(v) = std::env::var("RIG_DATA_DIR") {
        settings.data_dir = v.into();
    }
    if let Ok(v) = std::env::var("RIG_DEBUG") {
        settings.debug = v == "1" || v.eq_ignore_ascii_case("true");
    }

    settings
}
