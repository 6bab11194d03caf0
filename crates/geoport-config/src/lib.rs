//! Shared configuration for geoport tools.
//!
//! TOML profiles, credential resolution (keyring + no-echo prompt), and
//! translation to `geoport_core::StoredProfile`. The connector never
//! reads config files or secret stores -- this crate resolves everything
//! up front and hands over plain values.

pub mod credentials;

use std::collections::HashMap;
use std::path::PathBuf;

use directories::ProjectDirs;
use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use secrecy::SecretString;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use url::Url;

use geoport_core::StoredProfile;

pub use credentials::{CredentialResolver, KeyringStore, SecretPrompt, SecretStore, TtyPrompt};

// ── Error ───────────────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid {field}: {reason}")]
    Validation { field: String, reason: String },

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
    /// Default profile name (used when --profile is not specified).
    pub default_profile: Option<String>,

    /// Global defaults.
    #[serde(default)]
    pub defaults: Defaults,

    /// Named portal profiles.
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

    #[serde(default = "default_true")]
    pub verify_certificates: bool,

    /// Consult the secret store / prompt when credentials are missing.
    #[serde(default = "default_true")]
    pub use_secure_credentials: bool,

    #[serde(default = "default_timeout")]
    pub timeout: u64,
}

impl Default for Defaults {
    fn default() -> Self {
        Self {
            output: default_output(),
            verify_certificates: true,
            use_secure_credentials: true,
            timeout: default_timeout(),
        }
    }
}

fn default_output() -> String {
    "table".into()
}
fn default_true() -> bool {
    true
}
fn default_timeout() -> u64 {
    30
}

/// A named portal profile.
#[derive(Debug, Deserialize, Serialize)]
pub struct Profile {
    /// Portal base URL (e.g., "https://maps.example.com/portal").
    pub portal: String,

    /// Username to sign in as.
    pub username: Option<String>,

    /// Password (plaintext -- prefer keyring or env var).
    pub password: Option<String>,

    /// Environment variable name containing the password.
    pub password_env: Option<String>,

    /// Override certificate verification for this profile.
    pub verify_certificates: Option<bool>,

    /// Override timeout.
    pub timeout: Option<u64>,
}

// ── Config file path ────────────────────────────────────────────────

/// Resolve the config file path via XDG / platform conventions.
pub fn config_path() -> PathBuf {
    ProjectDirs::from("com", "geoport", "geoport").map_or_else(
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
    p.push("geoport");
    p
}

// ── Config loading / saving ─────────────────────────────────────────

/// Load the full Config from file + environment.
pub fn load_config() -> Result<Config, ConfigError> {
    let path = config_path();

    let figment = Figment::new()
        .merge(Serialized::defaults(Config::default()))
        .merge(Toml::file(&path))
        .merge(Env::prefixed("GEOPORT_").split("_"));

    let config: Config = figment.extract()?;
    Ok(config)
}

/// Load config, returning a default if the file doesn't exist.
pub fn load_config_or_default() -> Config {
    load_config().unwrap_or_default()
}

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

// ── Profile resolution ──────────────────────────────────────────────

/// Resolve the active profile name from an explicit flag and config.
pub fn active_profile_name(flag: Option<&str>, config: &Config) -> String {
    flag.map(str::to_string)
        .or_else(|| config.default_profile.clone())
        .unwrap_or_else(|| "default".into())
}

/// Resolve a profile's password from the credential chain:
/// env var named by `password_env`, then keyring, then plaintext.
pub fn resolve_profile_secret(profile: &Profile, profile_name: &str) -> Option<SecretString> {
    // 1. Profile's password_env → env var lookup
    if let Some(env_name) = &profile.password_env {
        if let Ok(val) = std::env::var(env_name) {
            return Some(SecretString::from(val));
        }
    }

    // 2. System keyring
    if let Ok(entry) = keyring::Entry::new(
        credentials::SERVICE_NAME,
        &format!("{profile_name}/password"),
    ) {
        if let Ok(secret) = entry.get_password() {
            return Some(SecretString::from(secret));
        }
    }

    // 3. Plaintext in config
    profile
        .password
        .as_ref()
        .map(|pw| SecretString::from(pw.clone()))
}

/// Translate one `Profile` into a connector `StoredProfile`.
///
/// This is the single boundary where config types cross into core types.
pub fn resolve_profile(profile: &Profile, profile_name: &str) -> Result<StoredProfile, ConfigError> {
    let url: Url = profile
        .portal
        .parse()
        .map_err(|_| ConfigError::Validation {
            field: "portal".into(),
            reason: format!("invalid URL: {}", profile.portal),
        })?;

    Ok(StoredProfile {
        url: Some(url),
        identity: profile.username.clone(),
        secret: resolve_profile_secret(profile, profile_name),
    })
}

/// Resolve every named profile for handing to the connector.
///
/// Profiles with an unparseable URL are skipped with a warning rather
/// than failing the whole map; a broken entry shouldn't block connecting
/// through a healthy one.
pub fn stored_profiles(config: &Config) -> HashMap<String, StoredProfile> {
    config
        .profiles
        .iter()
        .filter_map(|(name, profile)| match resolve_profile(profile, name) {
            Ok(stored) => Some((name.clone(), stored)),
            Err(e) => {
                tracing::warn!(profile = %name, error = %e, "skipping unusable profile");
                None
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn profile(portal: &str) -> Profile {
        Profile {
            portal: portal.into(),
            username: Some("alice".into()),
            password: Some("plaintext-pw".into()),
            password_env: None,
            verify_certificates: None,
            timeout: None,
        }
    }

    #[test]
    fn active_profile_prefers_the_explicit_flag() {
        let config = Config {
            default_profile: Some("from-config".into()),
            ..Config::default()
        };
        assert_eq!(active_profile_name(Some("from-flag"), &config), "from-flag");
        assert_eq!(active_profile_name(None, &config), "from-config");
    }

    #[test]
    fn resolve_profile_parses_the_portal_url() {
        let stored = resolve_profile(&profile("https://maps.example.com/portal"), "p").expect("ok");
        assert_eq!(
            stored.url.as_ref().map(Url::as_str),
            Some("https://maps.example.com/portal")
        );
        assert_eq!(stored.identity.as_deref(), Some("alice"));
        assert!(stored.secret.is_some());
    }

    #[test]
    fn resolve_profile_rejects_garbage_urls() {
        let err = resolve_profile(&profile("not a url"), "p").expect_err("invalid");
        assert!(matches!(err, ConfigError::Validation { .. }));
    }

    #[test]
    fn stored_profiles_skips_broken_entries() {
        let mut config = Config::default();
        config.profiles.insert("good".into(), profile("https://maps.example.com"));
        config.profiles.insert("bad".into(), profile("::::"));

        let resolved = stored_profiles(&config);
        assert!(resolved.contains_key("good"));
        assert!(!resolved.contains_key("bad"));
    }

    #[test]
    fn config_round_trips_through_toml() {
        let mut config = Config::default();
        config.profiles.insert("staging".into(), profile("https://maps.example.com"));

        let text = toml::to_string_pretty(&config).expect("serialize");
        let back: Config = toml::from_str(&text).expect("parse");
        assert_eq!(back.profiles["staging"].username.as_deref(), Some("alice"));
        assert!(back.defaults.verify_certificates);
    }
}
