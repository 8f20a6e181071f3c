use std::{fs, io::ErrorKind};

use anyhow::{bail, Context};
use client_core::DEFAULT_API_URL;
use serde::Deserialize;

pub const CONFIG_FILE: &str = "event_manager.toml";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "snake_case")]
pub enum DataSource {
    /// The `/events`, `/categories` and `/users` REST resources.
    Rest,
    /// One read-only `events.json` catalog.
    Static,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    pub api_url: String,
    pub source: DataSource,
    /// Path or URL of `events.json`; unset means the one served next to the API.
    pub static_catalog: Option<String>,
    pub log_filter: String,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            api_url: DEFAULT_API_URL.into(),
            source: DataSource::Rest,
            static_catalog: None,
            log_filter: "info".into(),
        }
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct FileSettings {
    api_url: Option<String>,
    source: Option<DataSource>,
    static_catalog: Option<String>,
    log: Option<String>,
}

pub fn load_settings() -> anyhow::Result<Settings> {
    let raw = match fs::read_to_string(CONFIG_FILE) {
        Ok(raw) => Some(raw),
        Err(err) if err.kind() == ErrorKind::NotFound => None,
        Err(err) => {
            return Err(err).with_context(|| format!("failed to read {CONFIG_FILE}"));
        }
    };
    resolve_settings(raw.as_deref(), |key| std::env::var(key).ok())
}

/// Layers defaults, then the config file, then environment variables.
pub fn resolve_settings(
    file: Option<&str>,
    env: impl Fn(&str) -> Option<String>,
) -> anyhow::Result<Settings> {
    let mut settings = Settings::default();

    if let Some(raw) = file {
        let file_cfg: FileSettings =
            toml::from_str(raw).with_context(|| format!("invalid {CONFIG_FILE}"))?;
        if let Some(v) = file_cfg.api_url {
            settings.api_url = v;
        }
        if let Some(v) = file_cfg.source {
            settings.source = v;
        }
        if let Some(v) = file_cfg.static_catalog {
            settings.static_catalog = Some(v);
        }
        if let Some(v) = file_cfg.log {
            settings.log_filter = v;
        }
    }

    if let Some(v) = env("EVENTS_API_URL") {
        settings.api_url = v;
    }
    if let Some(v) = env("APP__API_URL") {
        settings.api_url = v;
    }

    if let Some(v) = env("APP__DATA_SOURCE") {
        settings.source = parse_source(&v)?;
    }

    if let Some(v) = env("APP__STATIC_CATALOG") {
        settings.static_catalog = Some(v);
    }

    if let Some(v) = env("APP__LOG") {
        settings.log_filter = v;
    }

    Ok(settings)
}

fn parse_source(raw: &str) -> anyhow::Result<DataSource> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "rest" => Ok(DataSource::Rest),
        "static" => Ok(DataSource::Static),
        other => bail!("unknown data source {other:?}, expected \"rest\" or \"static\""),
    }
}

#[cfg(test)]
#[path = "tests/config_tests.rs"]
mod tests;
