//! CLI-side configuration: profile selection and flag overrides.
//!
//! Wraps `cumulo-config` with `GlobalOpts`-aware resolution — flags win
//! over environment, environment wins over the profile file.

use cumulo_config::{Config, Profile};
use cumulo_core::{PlatformConfig, TenantCredentials, TlsVerification};
use secrecy::SecretString;

use crate::cli::GlobalOpts;
use crate::error::CliError;

pub use cumulo_config::{config_path, load_config_or_default, save_config};

/// The profile name to use: `--profile` flag, then the config default,
/// then `"default"`.
pub fn active_profile_name(global: &GlobalOpts, cfg: &Config) -> String {
    global
        .profile
        .clone()
        .or_else(|| cfg.default_profile.clone())
        .unwrap_or_else(|| "default".into())
}

/// Build a `PlatformConfig` from a profile with CLI flag overrides.
pub fn resolve_profile(
    profile: &Profile,
    profile_name: &str,
    global: &GlobalOpts,
) -> Result<PlatformConfig, CliError> {
    let mut config = cumulo_config::profile_to_platform_config(profile, profile_name)?;

    if let Some(ref url) = global.url {
        config.url = url.parse().map_err(|_| CliError::Validation {
            field: "url".into(),
            reason: format!("invalid URL: {url}"),
        })?;
    }
    if let Some(ref tenant) = global.tenant {
        config.credentials.tenant = Some(tenant.clone());
    }
    if let Some(ref username) = global.username {
        config.credentials.username.clone_from(username);
    }
    if global.insecure {
        config.tls = TlsVerification::DangerAcceptInvalid;
    }
    config.timeout = std::time::Duration::from_secs(global.timeout);

    // One-shot CLI use: no background refresh, no realtime unless the
    // command asks for it (watch flips this back on).
    config.refresh_interval_secs = 0;
    config.realtime_enabled = false;

    Ok(config)
}

/// Build a `PlatformConfig` from the config file, profile, and CLI
/// overrides — falling back to flags/env alone when no profile exists.
pub fn build_platform_config(global: &GlobalOpts) -> Result<PlatformConfig, CliError> {
    let cfg = load_config_or_default();
    let profile_name = active_profile_name(global, &cfg);

    if let Some(profile) = cfg.profiles.get(&profile_name) {
        return resolve_profile(profile, &profile_name, global);
    }

    // No profile found -- build from CLI flags / env vars alone.
    let url_str = global.url.as_deref().ok_or_else(|| CliError::NoConfig {
        path: config_path().display().to_string(),
    })?;

    let url: url::Url = url_str.parse().map_err(|_| CliError::Validation {
        field: "url".into(),
        reason: format!("invalid URL: {url_str}"),
    })?;

    let username = global
        .username
        .clone()
        .ok_or_else(|| CliError::NoCredentials {
            profile: profile_name.clone(),
        })?;
    let password = std::env::var("C8Y_PASSWORD")
        .map(SecretString::from)
        .map_err(|_| CliError::NoCredentials {
            profile: profile_name,
        })?;

    let tls = if global.insecure {
        TlsVerification::DangerAcceptInvalid
    } else {
        TlsVerification::SystemDefaults
    };

    Ok(PlatformConfig {
        url,
        credentials: TenantCredentials {
            tenant: global.tenant.clone(),
            username,
            password,
        },
        tls,
        timeout: std::time::Duration::from_secs(global.timeout),
        refresh_interval_secs: 0,
        realtime_enabled: false,
        page_size: 200,
    })
}
