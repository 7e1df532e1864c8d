//! CLI configuration: thin wrapper around `medstock_config` shared types.
//!
//! Adds resolution that respects `GlobalOpts` flag overrides
//! (`--api`, `--token`, `--insecure`, `--timeout`).

use std::time::Duration;

use secrecy::SecretString;

use medstock_core::{InventoryConfig, TlsVerification};

use crate::cli::GlobalOpts;
use crate::error::CliError;

pub use medstock_config::{
    Config, Profile, TokenSource, config_path, load_config_or_default, save_config,
};

const DEFAULT_PROFILE: &str = "default";

/// Resolve the active profile name from CLI flags and config.
pub fn active_profile_name(global: &GlobalOpts, config: &Config) -> String {
    config.active_profile_name(global.profile.as_deref())
}

/// Comma-separated profile names, for error help text.
pub fn available_profiles(config: &Config) -> String {
    if config.profiles.is_empty() {
        "(none)".into()
    } else {
        config.profiles.keys().cloned().collect::<Vec<_>>().join(", ")
    }
}

/// Load the config file and translate it plus flags into an
/// `InventoryConfig`. Returns the profile name alongside for messages.
pub fn resolve(global: &GlobalOpts) -> Result<(String, InventoryConfig), CliError> {
    let cfg = load_config_or_default();
    resolve_with(global, &cfg, |profile, name| {
        medstock_config::resolve_token(profile, name).map(|(token, _)| token)
    })
}

/// Flag > profile > defaults, with the stored-token lookup injected.
pub fn resolve_with<T>(
    global: &GlobalOpts,
    cfg: &Config,
    stored_token: T,
) -> Result<(String, InventoryConfig), CliError>
where
    T: Fn(&Profile, &str) -> Option<SecretString>,
{
    let name = active_profile_name(global, cfg);
    let profile = cfg.profiles.get(&name);

    // An explicitly requested profile must exist; the implicit default may not.
    if profile.is_none() && global.profile.is_some() && name != DEFAULT_PROFILE {
        return Err(CliError::ProfileNotFound {
            available: available_profiles(cfg),
            name,
        });
    }

    // 1. Base URL (flag > env > profile)
    let url_str = global
        .api
        .as_deref()
        .or_else(|| profile.map(|p| p.api_url.as_str()))
        .filter(|s| !s.is_empty())
        .ok_or_else(|| CliError::NoConfig {
            path: config_path().display().to_string(),
        })?;
    let url = medstock_config::parse_api_url(url_str)?;

    // 2. Token (flag > env var > keyring > plaintext)
    let token = match global.token.as_deref() {
        Some(raw) => Some(SecretString::from(raw.to_owned())),
        None => profile.and_then(|p| stored_token(p, &name)),
    };

    // 3. TLS verification
    let force_insecure = global.insecure || cfg.defaults.insecure;
    let tls = match profile {
        Some(p) => medstock_config::tls_for(p, force_insecure),
        None if force_insecure => TlsVerification::DangerAcceptInvalid,
        None => TlsVerification::SystemDefaults,
    };

    // 4. Timeout
    let secs = global
        .timeout
        .or_else(|| profile.and_then(|p| p.timeout))
        .unwrap_or(cfg.defaults.timeout);

    let mut config = InventoryConfig::new(url);
    config.token = token;
    config.tls = tls;
    config.timeout = Duration::from_secs(secs);
    Ok((name, config))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use clap::Parser;
    use secrecy::ExposeSecret;

    use super::*;
    use crate::cli::Cli;

    fn global(args: &[&str]) -> GlobalOpts {
        let mut argv = vec!["medstock"];
        argv.extend_from_slice(args);
        argv.extend_from_slice(&["items", "list"]);
        Cli::try_parse_from(argv).unwrap().global
    }

    fn cfg_with_clinic() -> Config {
        let mut cfg = Config::default();
        let mut profile = Profile::new("https://clinic.example.org");
        profile.timeout = Some(12);
        profile.ca_cert = Some("/etc/clinic-ca.pem".into());
        cfg.profiles.insert("clinic".into(), profile);
        cfg.default_profile = Some("clinic".into());
        cfg
    }

    fn stored(_: &Profile, name: &str) -> Option<SecretString> {
        Some(SecretString::from(format!("stored-{name}")))
    }

    #[test]
    fn profile_supplies_url_token_tls_and_timeout() {
        let (name, config) = resolve_with(&global(&[]), &cfg_with_clinic(), stored).unwrap();
        assert_eq!(name, "clinic");
        assert_eq!(config.url.as_str(), "https://clinic.example.org/");
        assert_eq!(config.token.unwrap().expose_secret(), "stored-clinic");
        assert_eq!(
            config.tls,
            TlsVerification::CustomCa("/etc/clinic-ca.pem".into())
        );
        assert_eq!(config.timeout, Duration::from_secs(12));
    }

    #[test]
    fn flags_override_the_profile() {
        let opts = global(&[
            "--api",
            "http://localhost:9000",
            "--token",
            "flag-token",
            "--insecure",
            "--timeout",
            "3",
        ]);
        let (_, config) = resolve_with(&opts, &cfg_with_clinic(), stored).unwrap();
        assert_eq!(config.url.as_str(), "http://localhost:9000/");
        assert_eq!(config.token.unwrap().expose_secret(), "flag-token");
        assert_eq!(config.tls, TlsVerification::DangerAcceptInvalid);
        assert_eq!(config.timeout, Duration::from_secs(3));
    }

    #[test]
    fn api_flag_works_without_any_profile() {
        let opts = global(&["--api", "http://localhost:9000"]);
        let (name, config) = resolve_with(&opts, &Config::default(), stored).unwrap();
        assert_eq!(name, "default");
        assert!(config.token.is_none());
        assert_eq!(config.timeout, Duration::from_secs(30));
    }

    #[test]
    fn missing_url_reports_no_config() {
        let err = resolve_with(&global(&[]), &Config::default(), stored).unwrap_err();
        assert!(matches!(err, CliError::NoConfig { .. }), "got {err:?}");
    }

    #[test]
    fn unknown_explicit_profile_is_an_error() {
        let err =
            resolve_with(&global(&["--profile", "ward-9"]), &cfg_with_clinic(), stored).unwrap_err();
        match err {
            CliError::ProfileNotFound { name, available } => {
                assert_eq!(name, "ward-9");
                assert_eq!(available, "clinic");
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn non_http_url_is_rejected() {
        let opts = global(&["--api", "ftp://files.example.org"]);
        let err = resolve_with(&opts, &Config::default(), stored).unwrap_err();
        assert!(matches!(err, CliError::Validation { .. }), "got {err:?}");
    }
}
