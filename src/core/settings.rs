use crate::core::models::Thresholds;
use anyhow::{Context, Result};
use serde::Deserialize;
use std::fmt;
use std::path::{Path, PathBuf};
use thiserror::Error;

pub const DEFAULT_SERVICENOW_URL: &str = "https://servicenow.com";
pub const DEFAULT_LUXAFOR_URL: &str = "https://api.luxafor.com/webhook/v1/actions";

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("{0} is NOT set")]
    Missing(&'static str),
}

/// Settings from one source; unset fields fall through to the next source.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct PartialSettings {
    /// Comma separated Luxafor webhook ids.
    pub luxafor_ids: Option<String>,
    pub username: Option<String>,
    pub password: Option<String>,
    pub assignment_group: Option<String>,
    pub servicenow_url: Option<String>,
    pub luxafor_url: Option<String>,
    pub low: Option<usize>,
    pub high: Option<usize>,
    pub verbose: Option<bool>,
    pub hold_on_upstream_error: Option<bool>,
}

impl PartialSettings {
    /// Fills every unset field from `fallback`.
    pub fn or(self, fallback: PartialSettings) -> Self {
        Self {
            luxafor_ids: self.luxafor_ids.or(fallback.luxafor_ids),
            username: self.username.or(fallback.username),
            password: self.password.or(fallback.password),
            assignment_group: self.assignment_group.or(fallback.assignment_group),
            servicenow_url: self.servicenow_url.or(fallback.servicenow_url),
            luxafor_url: self.luxafor_url.or(fallback.luxafor_url),
            low: self.low.or(fallback.low),
            high: self.high.or(fallback.high),
            verbose: self.verbose.or(fallback.verbose),
            hold_on_upstream_error: self
                .hold_on_upstream_error
                .or(fallback.hold_on_upstream_error),
        }
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))
    }
}

#[derive(Clone)]
pub struct ServiceNowSettings {
    pub base_url: String,
    pub username: String,
    pub password: String,
    pub assignment_group: String,
}

impl fmt::Debug for ServiceNowSettings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ServiceNowSettings")
            .field("base_url", &self.base_url)
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .field("assignment_group", &self.assignment_group)
            .finish()
    }
}

#[derive(Debug, Clone)]
pub struct LuxaforSettings {
    pub base_url: String,
}

#[derive(Debug, Clone)]
pub struct Settings {
    pub device_ids: Vec<String>,
    pub servicenow: ServiceNowSettings,
    pub luxafor: LuxaforSettings,
    pub thresholds: Thresholds,
    pub hold_on_upstream_error: bool,
    pub verbose: bool,
    /// Config file the values were merged from, if any.
    pub config_file: Option<PathBuf>,
}

impl Settings {
    pub fn config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|p| p.join("servicenow-flag").join("config.toml"))
    }

    /// Merges command line/environment values over the config file and defaults.
    ///
    /// An explicit `config_path` must exist; the default location is optional.
    pub fn load(overrides: PartialSettings, config_path: Option<&Path>) -> Result<Self> {
        let path = match config_path {
            Some(path) => Some(path.to_path_buf()),
            None => Self::config_path().filter(|path| path.exists()),
        };
        let file = match &path {
            Some(path) => PartialSettings::from_file(path)?,
            None => PartialSettings::default(),
        };

        let mut settings = Self::resolve(overrides.or(file));
        settings.config_file = path;
        Ok(settings)
    }

    pub fn resolve(partial: PartialSettings) -> Self {
        let defaults = Thresholds::default();

        Self {
            device_ids: parse_device_ids(partial.luxafor_ids.as_deref().unwrap_or_default()),
            servicenow: ServiceNowSettings {
                base_url: trim_base(partial.servicenow_url, DEFAULT_SERVICENOW_URL),
                username: partial.username.unwrap_or_default(),
                password: partial.password.unwrap_or_default(),
                assignment_group: partial.assignment_group.unwrap_or_default(),
            },
            luxafor: LuxaforSettings {
                base_url: trim_base(partial.luxafor_url, DEFAULT_LUXAFOR_URL),
            },
            thresholds: Thresholds {
                low: partial.low.unwrap_or(defaults.low),
                high: partial.high.unwrap_or(defaults.high),
            },
            hold_on_upstream_error: partial.hold_on_upstream_error.unwrap_or(false),
            verbose: partial.verbose.unwrap_or(false),
            config_file: None,
        }
    }

    /// Checks the required fields in the order they are reported to the user.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.validate_flags()?;
        self.validate_source()
    }

    pub fn validate_flags(&self) -> Result<(), ConfigError> {
        if self.device_ids.is_empty() {
            return Err(ConfigError::Missing("Luxafor API ID"));
        }
        Ok(())
    }

    pub fn validate_source(&self) -> Result<(), ConfigError> {
        if self.servicenow.username.is_empty() {
            return Err(ConfigError::Missing("ServiceNow username"));
        }
        if self.servicenow.password.is_empty() {
            return Err(ConfigError::Missing("ServiceNow password"));
        }
        if self.servicenow.assignment_group.is_empty() {
            return Err(ConfigError::Missing("ServiceNow assignment group"));
        }
        Ok(())
    }

    pub fn log_summary(&self) {
        tracing::debug!(ids = ?self.device_ids, "Luxafor API ID is set");
        tracing::debug!("ServiceNow username is set");
        tracing::debug!("ServiceNow password is set");
        tracing::debug!(
            group = %self.servicenow.assignment_group,
            "ServiceNow assignment group is set"
        );
        if self.servicenow.base_url != DEFAULT_SERVICENOW_URL {
            tracing::debug!(url = %self.servicenow.base_url, "Custom ServiceNow base-url is set");
        }
        tracing::debug!(
            low = self.thresholds.low,
            high = self.thresholds.high,
            "Thresholds are set"
        );
        if self.thresholds.low > self.thresholds.high {
            tracing::warn!(
                low = self.thresholds.low,
                high = self.thresholds.high,
                "Low threshold is above high threshold, blue will never be shown"
            );
        }
    }
}

pub fn parse_device_ids(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|id| !id.is_empty())
        .map(String::from)
        .collect()
}

fn trim_base(url: Option<String>, default: &str) -> String {
    url.filter(|u| !u.trim().is_empty())
        .map(|u| u.trim().trim_end_matches('/').to_string())
        .unwrap_or_else(|| default.to_string())
}
