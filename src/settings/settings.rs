use crate::domain_model::RoutePolicy;
use anyhow::{Result, anyhow};
use config::{Config, Environment, File, FileFormat};
use serde::Deserialize;
use std::path::PathBuf;
use std::time::Duration;

#[derive(Debug, Deserialize)]
pub struct Settings {
    pub auth: Auth,
    pub api: Api,
    pub session: Session,
    #[serde(default)]
    pub routes: RoutePolicy,
    pub log: Log,
}

#[derive(Debug, Deserialize)]
pub struct Auth {
    pub backend: String, // "fake" or "real"
}

#[derive(Debug, Deserialize)]
pub struct Api {
    pub base_url: String,
    pub timeout_secs: Option<u64>,
}

impl Api {
    pub fn timeout(&self) -> Option<Duration> {
        self.timeout_secs.map(Duration::from_secs)
    }
}

#[derive(Debug, Deserialize)]
pub struct Session {
    pub storage_dir: PathBuf,
    #[serde(default = "default_storage_key")]
    pub storage_key: String,
    #[serde(default = "default_validate_interval_secs")]
    pub validate_interval_secs: u64,
    #[serde(default = "default_coalesce_refresh")]
    pub coalesce_refresh: bool,
}

impl Session {
    pub fn validate_interval(&self) -> Duration {
        Duration::from_secs(self.validate_interval_secs)
    }
}

fn default_storage_key() -> String {
    "auth-storage".to_string()
}

fn default_validate_interval_secs() -> u64 {
    300
}

fn default_coalesce_refresh() -> bool {
    true
}

#[derive(Debug, Deserialize)]
pub struct Log {
    pub filter: String,
}

#[cfg(debug_assertions)]
const SETTINGS_PATH: &str = "settings/dev.toml";
#[cfg(not(debug_assertions))]
const SETTINGS_PATH: &str = "settings/release.toml";

const ENV_PREFIX: &str = "REVALYZE";

/// Loads the settings file, then applies `REVALYZE__<SECTION>__<KEY>` overrides.
pub fn parse_settings(path: Option<&str>) -> Result<Settings> {
    let path = path.unwrap_or(SETTINGS_PATH);

    let settings: Settings = Config::builder()
        .add_source(File::with_name(path))
        .add_source(Environment::with_prefix(ENV_PREFIX).separator("__"))
        .build()
        .map_err(|e| anyhow!(e))?
        .try_deserialize()
        .map_err(|e| anyhow!(e))?;

    validate(&settings)?;
    Ok(settings)
}

pub fn parse_settings_str(toml: &str) -> Result<Settings> {
    let settings: Settings = Config::builder()
        .add_source(File::from_str(toml, FileFormat::Toml))
        .build()
        .map_err(|e| anyhow!(e))?
        .try_deserialize()
        .map_err(|e| anyhow!(e))?;

    validate(&settings)?;
    Ok(settings)
}

fn validate(settings: &Settings) -> Result<()> {
    match settings.auth.backend.as_str() {
        "fake" | "real" => {}
        other => return Err(anyhow!("unknown auth backend {:?}", other)),
    }
    if settings.session.validate_interval_secs == 0 {
        return Err(anyhow!("session.validate_interval_secs must be positive"));
    }
    if settings.session.storage_key.is_empty() {
        return Err(anyhow!("session.storage_key must not be empty"));
    }
    Ok(())
}
