//! `medstock-tui`: terminal dashboard for the medstock inventory server.
//!
//! Built on [ratatui](https://ratatui.rs). Screens are navigable via
//! number keys: a Dashboard with per-resource counts and status
//! breakdowns, then one searchable, filterable, sortable table per
//! resource the signed-in role may see.
//!
//! Logs are written to a file (default `/tmp/medstock-tui.log`) to avoid
//! corrupting the terminal UI. Fetches run as background tasks that
//! report back into the app's action loop.
//!
//! Entry point: CLI argument parsing, tracing setup, panic hooks, and app launch.

mod action;
mod app;
mod component;
mod event;
mod fetch;
mod screen;
mod screens;
mod theme;
mod tui;
mod widgets;

use std::path::PathBuf;
use std::time::Duration;

use clap::Parser;
use color_eyre::eyre::{Result, eyre};
use secrecy::SecretString;
use tracing::info;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

use medstock_config::{Config, Profile};
use medstock_core::{Inventory, InventoryConfig, TlsVerification};

use crate::app::App;

/// Terminal dashboard for browsing medical-supply inventory.
#[derive(Parser, Debug)]
#[command(name = "medstock-tui", version, about)]
struct Cli {
    /// Config profile to use
    #[arg(short = 'p', long, env = "MEDSTOCK_PROFILE")]
    profile: Option<String>,

    /// Server base URL (overrides the profile)
    #[arg(short = 'a', long, env = "MEDSTOCK_API")]
    api: Option<String>,

    /// Bearer token (overrides the profile's stored token)
    #[arg(long, env = "MEDSTOCK_TOKEN", hide_env_values = true)]
    token: Option<String>,

    /// Accept invalid TLS certificates
    #[arg(short = 'k', long)]
    insecure: bool,

    /// Log file path (defaults to /tmp/medstock-tui.log)
    #[arg(long, default_value = "/tmp/medstock-tui.log")]
    log_file: PathBuf,

    /// Increase log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

/// Set up file-based tracing. We MUST NOT log to stdout/stderr, that would
/// corrupt the TUI output. Returns a guard that must be held for the
/// lifetime of the application to ensure logs are flushed.
fn setup_tracing(cli: &Cli) -> WorkerGuard {
    let log_level = match cli.verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new(format!(
            "medstock_tui={log_level},medstock_core={log_level},medstock_api={log_level}"
        ))
    });

    let log_dir = cli
        .log_file
        .parent()
        .unwrap_or(std::path::Path::new("/tmp"));
    let log_filename = cli
        .log_file
        .file_name()
        .unwrap_or(std::ffi::OsStr::new("medstock-tui.log"));

    let file_appender = tracing_appender::rolling::never(log_dir, log_filename);
    let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

    tracing_subscriber::registry()
        .with(filter)
        .with(
            fmt::layer()
                .with_writer(non_blocking)
                .with_ansi(false)
                .with_target(true)
                .with_thread_ids(true),
        )
        .init();

    guard
}

/// Flags > profile > defaults. The stored-token lookup is injected so
/// tests never reach the keyring.
fn inventory_config<T>(cli: &Cli, cfg: &Config, stored_token: T) -> Result<(String, InventoryConfig)>
where
    T: Fn(&Profile, &str) -> Option<SecretString>,
{
    let name = cfg.active_profile_name(cli.profile.as_deref());
    let profile = cfg.profiles.get(&name);

    let url = cli
        .api
        .as_deref()
        .or_else(|| profile.map(|p| p.api_url.as_str()))
        .filter(|s| !s.is_empty())
        .ok_or_else(|| {
            eyre!(
                "no server configured for profile '{name}': run `medstock config init` or pass --api"
            )
        })?;

    let mut config = InventoryConfig::new(medstock_config::parse_api_url(url)?);
    config.timeout = Duration::from_secs(
        profile
            .and_then(|p| p.timeout)
            .unwrap_or(cfg.defaults.timeout),
    );
    match profile {
        Some(p) => {
            config.token = stored_token(p, &name);
            config.tls = medstock_config::tls_for(p, cfg.defaults.insecure);
        }
        None if cfg.defaults.insecure => config.tls = TlsVerification::DangerAcceptInvalid,
        None => {}
    }

    if let Some(raw) = &cli.token {
        config.token = Some(SecretString::from(raw.clone()));
    }
    if cli.insecure {
        config.tls = TlsVerification::DangerAcceptInvalid;
    }
    Ok((name, config))
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Install panic/error hooks BEFORE entering the terminal
    tui::install_hooks(&cli.log_file)?;

    // Tracing to file; hold the guard so logs flush on exit
    let _log_guard = setup_tracing(&cli);

    let cfg = medstock_config::load_config_or_default();
    let (profile, config) = inventory_config(&cli, &cfg, |p, name| {
        medstock_config::resolve_token(p, name).map(|(token, _)| token)
    })?;

    info!(profile = %profile, url = %config.url, "starting medstock-tui");

    let inventory = Inventory::new(config)?;
    let mut app = App::new(inventory, profile);
    app.run().await?;

    Ok(())
}
