use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use directories::ProjectDirs;
use serde::{Deserialize, Serialize};

use crate::error::KiraError;
use crate::ncbi::DEFAULT_BASE_URL;

pub const CONFIG_FILE_NAME: &str = "kira-bsf.json";
pub const DEFAULT_TOOL: &str = "kira-bsf";
pub const DEFAULT_DELAY_MS: u64 = 400;
pub const DEFAULT_TIMEOUT_SECS: u64 = 60;

pub const EMAIL_ENV: &str = "NCBI_EMAIL";
pub const API_KEY_ENV: &str = "NCBI_API_KEY";

#[derive(Debug, Default, Deserialize, Serialize)]
pub struct Config {
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub api_key: Option<String>,
    #[serde(default)]
    pub tool: Option<String>,
    #[serde(default)]
    pub delay_ms: Option<u64>,
    #[serde(default)]
    pub timeout_secs: Option<u64>,
    #[serde(default)]
    pub base_url: Option<String>,
}

/// Values supplied on the command line; they win over file and environment.
#[derive(Debug, Default, Clone)]
pub struct ConfigOverrides {
    pub email: Option<String>,
    pub api_key: Option<String>,
    pub delay_ms: Option<u64>,
}

#[derive(Debug, Clone)]
pub struct ResolvedConfig {
    pub email: Option<String>,
    pub api_key: Option<String>,
    pub tool: String,
    pub delay: Duration,
    pub timeout: Duration,
    pub base_url: String,
}

pub struct ConfigLoader;

impl ConfigLoader {
    pub fn resolve(
        path: Option<&str>,
        overrides: ConfigOverrides,
    ) -> Result<ResolvedConfig, KiraError> {
        let config = Self::load(path)?;
        Self::resolve_config(config, overrides, |key| std::env::var(key).ok())
    }

    /// An explicit path must exist. Otherwise `kira-bsf.json` in the working
    /// directory, then the per-user config file, then defaults.
    pub fn load(path: Option<&str>) -> Result<Config, KiraError> {
        if let Some(path) = path {
            return Self::read(Path::new(path));
        }

        let local = PathBuf::from(CONFIG_FILE_NAME);
        if local.exists() {
            return Self::read(&local);
        }

        if let Some(user) = user_config_path() {
            if user.exists() {
                return Self::read(&user);
            }
        }

        Ok(Config::default())
    }

    pub fn read(path: &Path) -> Result<Config, KiraError> {
        tracing::debug!(path = %path.display(), "loading config");
        let content =
            fs::read_to_string(path).map_err(|_| KiraError::ConfigRead(path.to_path_buf()))?;
        serde_json::from_str(&content).map_err(|err| KiraError::ConfigParse(err.to_string()))
    }

    pub fn resolve_config<F>(
        config: Config,
        overrides: ConfigOverrides,
        env: F,
    ) -> Result<ResolvedConfig, KiraError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let email = non_blank(overrides.email)
            .or_else(|| non_blank(config.email))
            .or_else(|| non_blank(env(EMAIL_ENV)));
        if let Some(email) = &email {
            validate_email(email)?;
        }

        let api_key = non_blank(overrides.api_key)
            .or_else(|| non_blank(config.api_key))
            .or_else(|| non_blank(env(API_KEY_ENV)));

        let delay_ms = overrides
            .delay_ms
            .or(config.delay_ms)
            .unwrap_or(DEFAULT_DELAY_MS);
        let timeout_secs = config.timeout_secs.unwrap_or(DEFAULT_TIMEOUT_SECS);

        Ok(ResolvedConfig {
            email,
            api_key,
            tool: non_blank(config.tool).unwrap_or_else(|| DEFAULT_TOOL.to_string()),
            delay: Duration::from_millis(delay_ms),
            timeout: Duration::from_secs(timeout_secs),
            base_url: non_blank(config.base_url).unwrap_or_else(|| DEFAULT_BASE_URL.to_string()),
        })
    }
}

pub fn user_config_path() -> Option<PathBuf> {
    ProjectDirs::from("", "", "kira-bsf").map(|dirs| dirs.config_dir().join("config.json"))
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
}

fn validate_email(email: &str) -> Result<(), KiraError> {
    let valid = email
        .split_once('@')
        .map(|(local, domain)| !local.is_empty() && !domain.is_empty() && !domain.contains('@'))
        .unwrap_or(false);
    if !valid || email.chars().any(char::is_whitespace) {
        return Err(KiraError::InvalidEmail(email.to_string()));
    }
    Ok(())
}
