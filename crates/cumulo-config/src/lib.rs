//! Shared configuration for cumulo front ends.
//!
//! TOML profiles, credential resolution (keyring + env + plaintext),
//! and translation to `cumulo_core::PlatformConfig`. The CLI adds
//! flag-aware wrappers on top.

use std::collections::HashMap;
use std::path::PathBuf;
use std::time::Duration;

use directories::ProjectDirs;
use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use secrecy::SecretString;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use cumulo_core::{PlatformConfig, TenantCredentials, TlsVerification};

// ── Error ───────────────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid {field}: {reason}")]
    Validation { field: String, reason: String },

    #[error("no credentials configured for profile '{profile}'")]
    NoCredentials { profile: String },

    #[error("failed to serialize config: {0}")]
    Serialization(#[from] toml::ser::Error),

    #[error("config loading failed: {0}")]
    Figment(Box<figment::Error>),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<figment::Error> for ConfigError {
    fn from(err: figment::Error) -> Self {
        Self::Figment(Box::new(err))
    }
}

// ── TOML config structs ─────────────────────────────────────────────

/// Top-level TOML configuration.
#[derive(Debug, Deserialize, Serialize)]
pub struct Config {
    /// Default profile name.
    pub default_profile: Option<String>,

    /// Global defaults.
    #[serde(default)]
    pub defaults: Defaults,

    /// Named tenant profiles.
    #[serde(default)]
    pub profiles: HashMap<String, Profile>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            default_profile: Some("default".into()),
            defaults: Defaults::default(),
            profiles: HashMap::new(),
        }
    }
}

#[derive(Debug, Deserialize, Serialize)]
pub struct Defaults {
    #[serde(default = "default_output")]
    pub output: String,

    #[serde(default = "default_color")]
    pub color: String,

    #[serde(default)]
    pub insecure: bool,

    #[serde(default = "default_timeout")]
    pub timeout: u64,
}

impl Default for Defaults {
    fn default() -> Self {
        Self {
            output: default_output(),
            color: default_color(),
            insecure: false,
            timeout: default_timeout(),
        }
    }
}

fn default_output() -> String {
    "table".into()
}
fn default_color() -> String {
    "auto".into()
}
fn default_timeout() -> u64 {
    30
}

/// A named tenant profile.
#[derive(Debug, Default, Deserialize, Serialize)]
pub struct Profile {
    /// Tenant base URL (e.g., "https://acme.cumulocity.com").
    pub url: String,

    /// Tenant ID prefixed to the username. Optional — cloud tenants
    /// carry it in the host name.
    pub tenant: Option<String>,

    /// Username for Basic auth.
    pub username: Option<String>,

    /// Password (plaintext — prefer keyring or env var).
    pub password: Option<String>,

    /// Environment variable name containing the password.
    pub password_env: Option<String>,

    /// Path to custom CA certificate.
    pub ca_cert: Option<PathBuf>,

    /// Override insecure TLS setting.
    pub insecure: Option<bool>,

    /// Override timeout (seconds).
    pub timeout: Option<u64>,
}

// ── Config file path ────────────────────────────────────────────────

/// Resolve the config file path via XDG / platform conventions.
pub fn config_path() -> PathBuf {
    ProjectDirs::from("com", "cumulo", "cumulo").map_or_else(
        || {
            let mut p = dirs_fallback();
            p.push("config.toml");
            p
        },
        |dirs| dirs.config_dir().join("config.toml"),
    )
}

fn dirs_fallback() -> PathBuf {
    let mut p = PathBuf::from(std::env::var("HOME").unwrap_or_else(|_| ".".into()));
    p.push(".config");
    p.push("cumulo");
    p
}

// ── Config loading ──────────────────────────────────────────────────

/// Load the full Config from file + environment (`C8Y_*` variables).
pub fn load_config() -> Result<Config, ConfigError> {
    let path = config_path();

    let figment = Figment::new()
        .merge(Serialized::defaults(Config::default()))
        .merge(Toml::file(&path))
        .merge(Env::prefixed("C8Y_").split("_"));

    let config: Config = figment.extract()?;
    Ok(config)
}

/// Load config, returning a default if the file doesn't exist.
pub fn load_config_or_default() -> Config {
    load_config().unwrap_or_default()
}

// ── Config saving ───────────────────────────────────────────────────

/// Serialize config to TOML and write to the canonical config path.
pub fn save_config(cfg: &Config) -> Result<(), ConfigError> {
    let path = config_path();
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let toml_str = toml::to_string_pretty(cfg)?;
    std::fs::write(&path, toml_str)?;
    Ok(())
}

// ── Credential resolution (without CLI flags) ───────────────────────

/// Resolve a profile's password from the credential chain:
/// env-var indirection → keyring → plaintext config value.
pub fn resolve_password(profile: &Profile, profile_name: &str) -> Result<SecretString, ConfigError> {
    // 1. Profile's password_env → env var lookup
    if let Some(ref env_name) = profile.password_env {
        if let Ok(val) = std::env::var(env_name) {
            return Ok(SecretString::from(val));
        }
    }

    // 2. System keyring
    if let Ok(entry) = keyring::Entry::new("cumulo", &format!("{profile_name}/password")) {
        if let Ok(secret) = entry.get_password() {
            return Ok(SecretString::from(secret));
        }
    }

    // 3. Plaintext in config
    if let Some(ref pw) = profile.password {
        return Ok(SecretString::from(pw.clone()));
    }

    Err(ConfigError::NoCredentials {
        profile: profile_name.into(),
    })
}

/// Store a password in the system keyring for a profile.
pub fn store_password(profile_name: &str, password: &str) -> Result<(), ConfigError> {
    keyring::Entry::new("cumulo", &format!("{profile_name}/password"))
        .and_then(|entry| entry.set_password(password))
        .map_err(|e| ConfigError::Validation {
            field: "keyring".into(),
            reason: e.to_string(),
        })
}

/// Resolve full tenant credentials for a profile.
pub fn resolve_credentials(
    profile: &Profile,
    profile_name: &str,
) -> Result<TenantCredentials, ConfigError> {
    let username = profile
        .username
        .clone()
        .or_else(|| std::env::var("C8Y_USERNAME").ok())
        .ok_or_else(|| ConfigError::NoCredentials {
            profile: profile_name.into(),
        })?;

    let password = if let Ok(pw) = std::env::var("C8Y_PASSWORD") {
        SecretString::from(pw)
    } else {
        resolve_password(profile, profile_name)?
    };

    Ok(TenantCredentials {
        tenant: profile.tenant.clone(),
        username,
        password,
    })
}

/// Build a `PlatformConfig` from a profile — no CLI flag overrides.
///
/// Suitable for non-CLI consumers. Sets UI-friendly defaults:
/// `realtime_enabled: true`, `refresh_interval_secs: 300`.
pub fn profile_to_platform_config(
    profile: &Profile,
    profile_name: &str,
) -> Result<PlatformConfig, ConfigError> {
    let url: url::Url = profile.url.parse().map_err(|_| ConfigError::Validation {
        field: "url".into(),
        reason: format!("invalid URL: {}", profile.url),
    })?;

    let credentials = resolve_credentials(profile, profile_name)?;

    let tls = if profile.insecure.unwrap_or(false) {
        TlsVerification::DangerAcceptInvalid
    } else if let Some(ref ca_path) = profile.ca_cert {
        TlsVerification::CustomCa(ca_path.clone())
    } else {
        TlsVerification::SystemDefaults
    };

    let timeout = Duration::from_secs(profile.timeout.unwrap_or(30));

    Ok(PlatformConfig {
        url,
        credentials,
        tls,
        timeout,
        refresh_interval_secs: 300,
        realtime_enabled: true,
        page_size: 200,
    })
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn profile_resolves_plaintext_password_last() {
        let profile = Profile {
            url: "https://acme.cumulocity.com".into(),
            username: Some("alice".into()),
            password: Some("from-file".into()),
            ..Profile::default()
        };

        let creds = resolve_credentials(&profile, "test-no-such-profile").unwrap();
        assert_eq!(creds.username, "alice");
    }

    #[test]
    fn missing_credentials_is_an_error() {
        let profile = Profile {
            url: "https://acme.cumulocity.com".into(),
            ..Profile::default()
        };

        // No username anywhere (assuming C8Y_USERNAME unset in CI).
        if std::env::var("C8Y_USERNAME").is_err() {
            assert!(matches!(
                resolve_credentials(&profile, "empty"),
                Err(ConfigError::NoCredentials { .. })
            ));
        }
    }

    #[test]
    fn invalid_url_is_rejected() {
        let profile = Profile {
            url: "not a url".into(),
            username: Some("alice".into()),
            password: Some("pw".into()),
            ..Profile::default()
        };

        assert!(matches!(
            profile_to_platform_config(&profile, "p"),
            Err(ConfigError::Validation { .. })
        ));
    }

    #[test]
    fn insecure_profile_disables_verification() {
        let profile = Profile {
            url: "https://edge.local".into(),
            username: Some("admin".into()),
            password: Some("pw".into()),
            insecure: Some(true),
            ..Profile::default()
        };

        let cfg = profile_to_platform_config(&profile, "edge").unwrap();
        assert_eq!(cfg.tls, TlsVerification::DangerAcceptInvalid);
    }
}
