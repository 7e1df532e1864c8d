//! Shared configuration for the medstock CLI and TUI.
//!
//! TOML profiles, token resolution (env + keyring + plaintext), and
//! translation to `medstock_core::InventoryConfig`. Both binaries depend
//! on this crate; the CLI layers its global flags on top.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::time::Duration;

use directories::ProjectDirs;
use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use secrecy::SecretString;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

use medstock_core::{InventoryConfig, TlsVerification};

/// Keyring service name tokens are stored under.
const KEYRING_SERVICE: &str = "medstock";

/// Environment variable that overrides the config file location.
pub const CONFIG_PATH_ENV: &str = "MEDSTOCK_CONFIG";

// ── Error ───────────────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid {field}: {reason}")]
    Validation { field: String, reason: String },

    #[error("profile '{profile}' not found")]
    UnknownProfile { profile: String },

    #[error("failed to serialize config: {0}")]
    Serialization(#[from] toml::ser::Error),

    #[error("config loading failed: {0}")]
    Figment(Box<figment::Error>),

    #[error("keyring error: {0}")]
    Keyring(#[from] keyring::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<figment::Error> for ConfigError {
    fn from(err: figment::Error) -> Self {
        Self::Figment(Box::new(err))
    }
}

// ── TOML config structs ─────────────────────────────────────────────

/// Top-level TOML configuration shared by CLI and TUI.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct Config {
    /// Default profile name.
    pub default_profile: Option<String>,

    /// Global defaults.
    #[serde(default)]
    pub defaults: Defaults,

    /// Named server profiles.
    #[serde(default)]
    pub profiles: BTreeMap<String, Profile>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            default_profile: Some("default".into()),
            defaults: Defaults::default(),
            profiles: BTreeMap::new(),
        }
    }
}

impl Config {
    /// Name of the profile in effect: explicit override, then the
    /// configured default, then `"default"`.
    pub fn active_profile_name(&self, requested: Option<&str>) -> String {
        requested
            .map(str::to_owned)
            .or_else(|| self.default_profile.clone())
            .unwrap_or_else(|| "default".into())
    }

    pub fn profile(&self, name: &str) -> Result<&Profile, ConfigError> {
        self.profiles
            .get(name)
            .ok_or_else(|| ConfigError::UnknownProfile {
                profile: name.into(),
            })
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
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

/// A named server profile.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct Profile {
    /// Server root URL (e.g., "https://inventory.example.org").
    pub api_url: String,

    /// Bearer token (plaintext -- prefer keyring or env var).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub token: Option<String>,

    /// Environment variable name containing the token.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub token_env: Option<String>,

    /// Path to custom CA certificate.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ca_cert: Option<PathBuf>,

    /// Override insecure TLS setting.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub insecure: Option<bool>,

    /// Override timeout (seconds).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timeout: Option<u64>,
}

impl Profile {
    pub fn new(api_url: impl Into<String>) -> Self {
        Self {
            api_url: api_url.into(),
            token: None,
            token_env: None,
            ca_cert: None,
            insecure: None,
            timeout: None,
        }
    }
}

// ── Config file path ────────────────────────────────────────────────

/// Resolve the config file path: `$MEDSTOCK_CONFIG`, else the platform
/// config directory.
pub fn config_path() -> PathBuf {
    if let Some(path) = std::env::var_os(CONFIG_PATH_ENV) {
        return PathBuf::from(path);
    }
    ProjectDirs::from("org", "medstock", "medstock").map_or_else(
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
    p.push("medstock");
    p
}

// ── Config loading ──────────────────────────────────────────────────

/// Load config from `path` + `MEDSTOCK_*` environment variables.
///
/// Nested keys use a double underscore:
/// `MEDSTOCK_DEFAULTS__TIMEOUT=60`.
pub fn load_config_from(path: &Path) -> Result<Config, ConfigError> {
    let figment = Figment::new()
        .merge(Serialized::defaults(Config::default()))
        .merge(Toml::file(path))
        .merge(Env::prefixed("MEDSTOCK_").split("__").only(&[
            "default_profile",
            "defaults.output",
            "defaults.color",
            "defaults.insecure",
            "defaults.timeout",
        ]));

    let config: Config = figment.extract()?;
    debug!(path = %path.display(), profiles = config.profiles.len(), "loaded config");
    Ok(config)
}

/// Load the full Config from the canonical path + environment.
pub fn load_config() -> Result<Config, ConfigError> {
    load_config_from(&config_path())
}

/// Load config, returning a default if the file is missing or unreadable.
pub fn load_config_or_default() -> Config {
    load_config().unwrap_or_default()
}

// ── Config saving ───────────────────────────────────────────────────

pub fn save_config_to(cfg: &Config, path: &Path) -> Result<(), ConfigError> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let toml_str = toml::to_string_pretty(cfg)?;
    std::fs::write(path, toml_str)?;
    Ok(())
}

/// Serialize config to TOML and write to the canonical config path.
pub fn save_config(cfg: &Config) -> Result<(), ConfigError> {
    save_config_to(cfg, &config_path())
}

// ── Token resolution ────────────────────────────────────────────────

/// Where a resolved token came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenSource {
    Env,
    Keyring,
    Plaintext,
}

impl std::fmt::Display for TokenSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            Self::Env => "environment",
            Self::Keyring => "system keyring",
            Self::Plaintext => "config file",
        })
    }
}

fn keyring_entry(profile_name: &str) -> Result<keyring::Entry, keyring::Error> {
    keyring::Entry::new(KEYRING_SERVICE, &format!("{profile_name}/token"))
}

/// Token lookup with injectable environment and keyring readers.
///
/// Order: `token_env` variable, keyring entry `{profile}/token`, then the
/// plaintext `token` field. `None` when no source has one.
pub fn resolve_token_from<E, K>(
    profile: &Profile,
    profile_name: &str,
    env: E,
    keyring: K,
) -> Option<(SecretString, TokenSource)>
where
    E: Fn(&str) -> Option<String>,
    K: Fn(&str) -> Option<String>,
{
    if let Some(val) = profile.token_env.as_deref().and_then(&env) {
        return Some((SecretString::from(val), TokenSource::Env));
    }
    if let Some(secret) = keyring(profile_name) {
        return Some((SecretString::from(secret), TokenSource::Keyring));
    }
    profile
        .token
        .clone()
        .map(|t| (SecretString::from(t), TokenSource::Plaintext))
}

/// Resolve a profile's token from the real environment and keyring.
pub fn resolve_token(profile: &Profile, profile_name: &str) -> Option<(SecretString, TokenSource)> {
    resolve_token_from(
        profile,
        profile_name,
        |name| std::env::var(name).ok(),
        |profile_name| keyring_entry(profile_name).ok()?.get_password().ok(),
    )
}

/// Store a token in the system keyring for `profile_name`.
pub fn store_token(profile_name: &str, token: &str) -> Result<(), ConfigError> {
    keyring_entry(profile_name)?.set_password(token)?;
    Ok(())
}

/// Remove a stored token. A missing entry is not an error.
pub fn delete_token(profile_name: &str) -> Result<(), ConfigError> {
    match keyring_entry(profile_name)?.delete_credential() {
        Ok(()) | Err(keyring::Error::NoEntry) => Ok(()),
        Err(e) => Err(e.into()),
    }
}

// ── Translation ─────────────────────────────────────────────────────

/// TLS mode from profile flags: insecure wins, then a custom CA, else
/// the system roots.
pub fn tls_for(profile: &Profile, force_insecure: bool) -> TlsVerification {
    if force_insecure || profile.insecure.unwrap_or(false) {
        TlsVerification::DangerAcceptInvalid
    } else if let Some(ref ca_path) = profile.ca_cert {
        TlsVerification::CustomCa(ca_path.clone())
    } else {
        TlsVerification::SystemDefaults
    }
}

pub fn parse_api_url(raw: &str) -> Result<url::Url, ConfigError> {
    let url: url::Url = raw.parse().map_err(|_| ConfigError::Validation {
        field: "api_url".into(),
        reason: format!("invalid URL: {raw}"),
    })?;
    if !matches!(url.scheme(), "http" | "https") {
        return Err(ConfigError::Validation {
            field: "api_url".into(),
            reason: format!("expected http or https, got '{}'", url.scheme()),
        });
    }
    Ok(url)
}

/// Build an `InventoryConfig` from a profile, no flag overrides.
pub fn profile_to_inventory_config(
    profile: &Profile,
    profile_name: &str,
    defaults: &Defaults,
) -> Result<InventoryConfig, ConfigError> {
    let url = parse_api_url(&profile.api_url)?;
    let mut config = InventoryConfig::new(url);
    config.token = resolve_token(profile, profile_name).map(|(token, _)| token);
    config.tls = tls_for(profile, defaults.insecure);
    config.timeout = Duration::from_secs(profile.timeout.unwrap_or(defaults.timeout));
    Ok(config)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use secrecy::ExposeSecret;

    use super::*;

    fn no_env(_: &str) -> Option<String> {
        None
    }

    #[test]
    fn save_and_load_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.toml");

        let mut cfg = Config::default();
        let mut profile = Profile::new("https://inventory.example.org");
        profile.token_env = Some("CLINIC_TOKEN".into());
        profile.timeout = Some(5);
        cfg.profiles.insert("clinic".into(), profile);
        cfg.default_profile = Some("clinic".into());

        save_config_to(&cfg, &path).unwrap();
        let loaded = load_config_from(&path).unwrap();
        assert_eq!(loaded, cfg);
        assert_eq!(loaded.active_profile_name(None), "clinic");
        assert_eq!(loaded.active_profile_name(Some("other")), "other");
    }

    #[test]
    fn missing_file_yields_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let loaded = load_config_from(&dir.path().join("absent.toml")).unwrap();
        assert_eq!(loaded.defaults, Defaults::default());
        assert!(loaded.profiles.is_empty());
        assert!(matches!(
            loaded.profile("default"),
            Err(ConfigError::UnknownProfile { .. })
        ));
    }

    #[test]
    fn token_sources_in_priority_order() {
        let mut profile = Profile::new("http://localhost:8080");
        profile.token = Some("plain".into());
        profile.token_env = Some("TOKEN_VAR".into());

        let env = |name: &str| (name == "TOKEN_VAR").then(|| "from-env".to_owned());
        let keyring = |name: &str| (name == "clinic").then(|| "from-keyring".to_owned());

        let (token, source) = resolve_token_from(&profile, "clinic", env, keyring).unwrap();
        assert_eq!((token.expose_secret(), source), ("from-env", TokenSource::Env));

        let (token, source) = resolve_token_from(&profile, "clinic", no_env, keyring).unwrap();
        assert_eq!(
            (token.expose_secret(), source),
            ("from-keyring", TokenSource::Keyring)
        );

        let (token, source) = resolve_token_from(&profile, "other", no_env, keyring).unwrap();
        assert_eq!((token.expose_secret(), source), ("plain", TokenSource::Plaintext));

        profile.token = None;
        assert!(resolve_token_from(&profile, "other", no_env, keyring).is_none());
    }

    #[test]
    fn tls_precedence() {
        let mut profile = Profile::new("https://x.org");
        assert_eq!(tls_for(&profile, false), TlsVerification::SystemDefaults);
        profile.ca_cert = Some(PathBuf::from("/etc/ca.pem"));
        assert_eq!(
            tls_for(&profile, false),
            TlsVerification::CustomCa(PathBuf::from("/etc/ca.pem"))
        );
        assert_eq!(tls_for(&profile, true), TlsVerification::DangerAcceptInvalid);
    }

    #[test]
    fn api_url_must_be_http() {
        assert!(parse_api_url("https://inventory.example.org").is_ok());
        assert!(parse_api_url("ftp://inventory.example.org").is_err());
        assert!(parse_api_url("not a url").is_err());
    }
}
