use std::{fs, num::NonZeroUsize, path::Path, time::Duration};

use anyhow::Context;
use serde::Deserialize;
use session_core::SessionConfig;
use shared::script::{self, ScriptedMessage};

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub videos: Vec<String>,
    pub connect_latency_ms: u64,
    pub switch_latency_ms: u64,
    pub paywall_delay_secs: u64,
    pub default_display_name: String,
    pub chat_script: Vec<ScriptedMessage>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            videos: vec![
                "videos/sample1.mp4".into(),
                "videos/sample2.mp4".into(),
                "videos/sample3.mp4".into(),
            ],
            connect_latency_ms: 2_000,
            switch_latency_ms: 1_400,
            paywall_delay_secs: 35,
            default_display_name: "Guest".into(),
            chat_script: script::default_script(),
        }
    }
}

impl Settings {
    pub fn session_config(&self) -> anyhow::Result<SessionConfig> {
        let video_count = NonZeroUsize::new(self.videos.len())
            .context("settings must list at least one video source")?;
        Ok(SessionConfig {
            video_count,
            connect_latency: Duration::from_millis(self.connect_latency_ms),
            switch_latency: Duration::from_millis(self.switch_latency_ms),
            paywall_delay: Duration::from_secs(self.paywall_delay_secs),
            default_display_name: self.default_display_name.clone(),
            chat_script: self.chat_script.clone(),
        })
    }
}

/// Loads settings from an explicit file, falling back to `demo.toml` in the
/// working directory when present, then applies `DEMO__*` env overrides.
pub fn load_settings(path: Option<&Path>) -> anyhow::Result<Settings> {
    let mut settings = match path {
        Some(path) => {
            let raw = fs::read_to_string(path)
                .with_context(|| format!("failed to read settings file '{}'", path.display()))?;
            toml::from_str(&raw)
                .with_context(|| format!("failed to parse settings file '{}'", path.display()))?
        }
        None => match fs::read_to_string("demo.toml") {
            Ok(raw) => toml::from_str(&raw).context("failed to parse demo.toml")?,
            Err(_) => Settings::default(),
        },
    };

    if let Ok(v) = std::env::var("DEMO__CONNECT_LATENCY_MS") {
        if let Ok(parsed) = v.parse::<u64>() {
            settings.connect_latency_ms = parsed;
        }
    }
    if let Ok(v) = std::env::var("DEMO__SWITCH_LATENCY_MS") {
        if let Ok(parsed) = v.parse::<u64>() {
            settings.switch_latency_ms = parsed;
        }
    }
    if let Ok(v) = std::env::var("DEMO__PAYWALL_DELAY_SECS") {
        if let Ok(parsed) = v.parse::<u64>() {
            settings.paywall_delay_secs = parsed;
        }
    }
    if let Ok(v) = std::env::var("DEMO__DISPLAY_NAME") {
        settings.default_display_name = v;
    }

    Ok(settings)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_mirror_the_stock_call_flow() {
        let settings = Settings::default();
        assert_eq!(settings.videos.len(), 3);
        assert_eq!(settings.paywall_delay_secs, 35);
        assert_eq!(settings.connect_latency_ms, 2_000);
        assert_eq!(settings.chat_script.len(), 3);
    }

    #[test]
    fn partial_settings_files_keep_defaults_for_missing_keys() {
        let settings: Settings = toml::from_str(
            r#"
            videos = ["videos/only.mp4"]
            paywall_delay_secs = 10
            "#,
        )
        .expect("parse settings");

        assert_eq!(settings.videos, vec!["videos/only.mp4".to_string()]);
        assert_eq!(settings.paywall_delay_secs, 10);
        assert_eq!(settings.switch_latency_ms, 1_400);
        assert_eq!(settings.default_display_name, "Guest");
    }

    #[test]
    fn empty_video_list_is_rejected_at_session_config_time() {
        let settings: Settings = toml::from_str("videos = []").expect("parse settings");
        assert!(settings.session_config().is_err());
    }

    #[test]
    fn chat_script_is_overridable_from_settings() {
        let settings: Settings = toml::from_str(
            r#"
            [[chat_script]]
            delay_ms = 1000
            template = "hello {name}"
            "#,
        )
        .expect("parse settings");

        let config = settings.session_config().expect("session config");
        assert_eq!(config.chat_script.len(), 1);
        assert_eq!(config.chat_script[0].render("Sam"), "hello Sam");
    }
}
