//! Suite configuration
//!
//! Values are layered: built-in development defaults, then an optional TOML
//! file, then environment variables, then command line flags. The merged
//! [`ConfigSource`] is resolved once into a validated [`E2eConfig`].

use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};
use url::Url;

use crate::error::{E2eError, E2eResult};

/// Local API endpoint used when nothing else is configured
pub const DEFAULT_API_BASE_URL: &str = "http://localhost:3001";

/// Local UI endpoint used when nothing else is configured
pub const DEFAULT_UI_BASE_URL: &str = "http://localhost:3000";

pub const ENV_API_BASE_URL: &str = "API_BASE_URL";
pub const ENV_UI_BASE_URL: &str = "UI_BASE_URL";
pub const ENV_PROFILE: &str = "E2E_PROFILE";
pub const ENV_CDP_URL: &str = "CDP_URL";

/// Where the suite runs
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "snake_case")]
pub enum Profile {
    /// Local run; missing URLs fall back to the local defaults
    #[default]
    Development,
    /// Pipeline run; both base URLs must be given explicitly
    Ci,
}

impl std::str::FromStr for Profile {
    type Err = E2eError;

    fn from_str(s: &str) -> E2eResult<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "development" | "dev" => Ok(Profile::Development),
            "ci" => Ok(Profile::Ci),
            other => Err(E2eError::Config(format!("unknown profile '{}'", other))),
        }
    }
}

/// One configuration layer. Unset fields defer to lower layers.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ConfigSource {
    pub api_base_url: Option<String>,
    pub ui_base_url: Option<String>,
    pub profile: Option<Profile>,
    pub cdp_url: Option<String>,
    pub headless: Option<bool>,
    pub window_width: Option<u32>,
    pub window_height: Option<u32>,
    pub request_timeout_ms: Option<u64>,
    pub ui_timeout_ms: Option<u64>,
    pub poll_interval_ms: Option<u64>,
}

impl ConfigSource {
    /// Load a layer from a TOML file. A missing file yields an empty layer.
    pub fn load(path: &Path) -> E2eResult<Self> {
        if path.exists() {
            let content = std::fs::read_to_string(path)?;
            let source: Self = toml::from_str(&content)?;
            debug!("Loaded configuration from {}", path.display());
            Ok(source)
        } else {
            warn!("Configuration file {} not found, ignoring", path.display());
            Ok(Self::default())
        }
    }

    /// Build a layer from the process environment
    pub fn from_env() -> E2eResult<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build a layer from an arbitrary variable lookup. Empty values count as unset.
    pub fn from_lookup<F>(lookup: F) -> E2eResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        Ok(Self {
            api_base_url: get(ENV_API_BASE_URL),
            ui_base_url: get(ENV_UI_BASE_URL),
            profile: get(ENV_PROFILE).map(|p| p.parse()).transpose()?,
            cdp_url: get(ENV_CDP_URL),
            ..Default::default()
        })
    }

    /// Overlay `upper` on top of this layer
    pub fn merge(self, upper: ConfigSource) -> ConfigSource {
        ConfigSource {
            api_base_url: upper.api_base_url.or(self.api_base_url),
            ui_base_url: upper.ui_base_url.or(self.ui_base_url),
            profile: upper.profile.or(self.profile),
            cdp_url: upper.cdp_url.or(self.cdp_url),
            headless: upper.headless.or(self.headless),
            window_width: upper.window_width.or(self.window_width),
            window_height: upper.window_height.or(self.window_height),
            request_timeout_ms: upper.request_timeout_ms.or(self.request_timeout_ms),
            ui_timeout_ms: upper.ui_timeout_ms.or(self.ui_timeout_ms),
            poll_interval_ms: upper.poll_interval_ms.or(self.poll_interval_ms),
        }
    }

    /// Validate and fill defaults
    pub fn resolve(self) -> E2eResult<E2eConfig> {
        let profile = self.profile.unwrap_or_default();

        let api_base_url = resolve_base_url(
            "api_base_url",
            ENV_API_BASE_URL,
            self.api_base_url,
            DEFAULT_API_BASE_URL,
            profile,
        )?;
        let ui_base_url = resolve_base_url(
            "ui_base_url",
            ENV_UI_BASE_URL,
            self.ui_base_url,
            DEFAULT_UI_BASE_URL,
            profile,
        )?;

        let cdp_url = self.cdp_url.as_deref().map(Url::parse).transpose()?;

        let timeouts = Timeouts {
            request: Duration::from_millis(self.request_timeout_ms.unwrap_or(10_000)),
            ui: Duration::from_millis(self.ui_timeout_ms.unwrap_or(5_000)),
            poll_interval: Duration::from_millis(self.poll_interval_ms.unwrap_or(50)),
        };
        if timeouts.request.is_zero() || timeouts.ui.is_zero() || timeouts.poll_interval.is_zero() {
            return Err(E2eError::Config("timeouts must be greater than zero".to_string()));
        }
        if timeouts.poll_interval > timeouts.ui {
            return Err(E2eError::Config(format!(
                "poll interval ({:?}) exceeds the UI timeout ({:?})",
                timeouts.poll_interval, timeouts.ui
            )));
        }

        Ok(E2eConfig {
            api_base_url,
            ui_base_url,
            profile,
            browser: BrowserSettings {
                headless: self.headless.unwrap_or(true),
                cdp_url,
                window_width: self.window_width.unwrap_or(1280),
                window_height: self.window_height.unwrap_or(720),
            },
            timeouts,
        })
    }
}

fn resolve_base_url(
    key: &str,
    env: &str,
    value: Option<String>,
    default: &str,
    profile: Profile,
) -> E2eResult<Url> {
    let raw = match (value, profile) {
        (Some(v), _) => v,
        (None, Profile::Development) => default.to_string(),
        (None, Profile::Ci) => {
            return Err(E2eError::Config(format!(
                "{} must be set (via {} or the config file) in the ci profile",
                key, env
            )))
        }
    };

    let url = Url::parse(raw.trim())?;
    match url.scheme() {
        "http" | "https" => Ok(url),
        other => Err(E2eError::Config(format!(
            "{} must be an http(s) URL, got scheme '{}'",
            key, other
        ))),
    }
}

/// Validated configuration for a suite run
#[derive(Debug, Clone)]
pub struct E2eConfig {
    pub api_base_url: Url,
    pub ui_base_url: Url,
    pub profile: Profile,
    pub browser: BrowserSettings,
    pub timeouts: Timeouts,
}

impl Default for E2eConfig {
    fn default() -> Self {
        Self {
            api_base_url: Url::parse(DEFAULT_API_BASE_URL).expect("valid default URL"),
            ui_base_url: Url::parse(DEFAULT_UI_BASE_URL).expect("valid default URL"),
            profile: Profile::Development,
            browser: BrowserSettings::default(),
            timeouts: Timeouts::default(),
        }
    }
}

/// Browser launch settings
#[derive(Debug, Clone)]
pub struct BrowserSettings {
    pub headless: bool,
    /// Attach to an already running browser instead of launching one
    pub cdp_url: Option<Url>,
    pub window_width: u32,
    pub window_height: u32,
}

impl Default for BrowserSettings {
    fn default() -> Self {
        Self {
            headless: true,
            cdp_url: None,
            window_width: 1280,
            window_height: 720,
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub struct Timeouts {
    /// Per HTTP request
    pub request: Duration,
    /// Upper bound for a single UI wait
    pub ui: Duration,
    pub poll_interval: Duration,
}

impl Default for Timeouts {
    fn default() -> Self {
        Self {
            request: Duration::from_secs(10),
            ui: Duration::from_secs(5),
            poll_interval: Duration::from_millis(50),
        }
    }
}
