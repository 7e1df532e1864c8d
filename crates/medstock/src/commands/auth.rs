//! Auth subcommand handlers: store, forget, and inspect tokens.

use std::collections::btree_map::Entry;
use std::time::Duration;

use chrono::{DateTime, Utc};
use secrecy::{ExposeSecret, SecretString};
use serde::Serialize;
use tabled::builder::Builder;
use tabled::settings::Style;

use medstock_core::SessionUser;

use crate::cli::{AuthArgs, AuthCommand, GlobalOpts};
use crate::config::{self, Profile};
use crate::error::CliError;
use crate::output;

// ── Whoami view ─────────────────────────────────────────────────────

#[derive(Debug, Serialize)]
struct WhoAmI {
    profile: String,
    source: String,
    subject: Option<String>,
    name: Option<String>,
    email: Option<String>,
    role: &'static str,
    storage: Option<String>,
    expires_at: Option<DateTime<Utc>>,
    expires: String,
}

impl WhoAmI {
    fn new(profile: String, source: String, user: SessionUser, now: DateTime<Utc>) -> Self {
        let expires = describe_expiry(user.expires_at, now);
        Self {
            profile,
            source,
            role: user.role_label(),
            storage: user.storage_name.or(user.storage_id),
            subject: user.subject,
            name: user.name,
            email: user.email,
            expires_at: user.expires_at,
            expires,
        }
    }
}

/// `in 1h 30m`, `expired 5m ago`, or `never`.
fn describe_expiry(expires_at: Option<DateTime<Utc>>, now: DateTime<Utc>) -> String {
    let Some(at) = expires_at else {
        return "never".into();
    };
    let whole_secs = |delta: chrono::TimeDelta| {
        humantime::format_duration(Duration::from_secs(delta.num_seconds().unsigned_abs()))
    };
    if at > now {
        format!("in {}", whole_secs(at - now))
    } else {
        format!("expired {} ago", whole_secs(now - at))
    }
}

fn whoami_detail(w: &WhoAmI) -> String {
    let dash = |v: &Option<String>| v.clone().unwrap_or_else(|| "-".into());
    let mut builder = Builder::default();
    builder.push_record(["Profile".to_owned(), w.profile.clone()]);
    builder.push_record(["Token from".to_owned(), w.source.clone()]);
    builder.push_record(["Subject".to_owned(), dash(&w.subject)]);
    builder.push_record(["Name".to_owned(), dash(&w.name)]);
    builder.push_record(["Email".to_owned(), dash(&w.email)]);
    builder.push_record(["Role".to_owned(), w.role.to_owned()]);
    builder.push_record(["Storage".to_owned(), dash(&w.storage)]);
    builder.push_record(["Expires".to_owned(), w.expires.clone()]);
    builder.build().with(Style::rounded()).to_string()
}

// ── Handler ─────────────────────────────────────────────────────────

pub fn handle(args: AuthArgs, global: &GlobalOpts) -> Result<(), CliError> {
    match args.command {
        AuthCommand::Login { plaintext } => login(plaintext, global),

        AuthCommand::Logout => {
            let mut cfg = config::load_config_or_default();
            let name = config::active_profile_name(global, &cfg);
            medstock_config::delete_token(&name)?;
            if let Some(profile) = cfg.profiles.get_mut(&name) {
                if profile.token.take().is_some() {
                    config::save_config(&cfg)?;
                }
            }
            if !global.quiet {
                eprintln!("✓ Signed out of profile '{name}'");
            }
            Ok(())
        }

        AuthCommand::Whoami => {
            let cfg = config::load_config_or_default();
            let name = config::active_profile_name(global, &cfg);

            let (token, source) = match global.token.as_deref() {
                Some(raw) => (SecretString::from(raw.to_owned()), "--token".to_owned()),
                None => cfg
                    .profiles
                    .get(&name)
                    .and_then(|p| medstock_config::resolve_token(p, &name))
                    .map(|(token, source)| (token, source.to_string()))
                    .ok_or_else(|| CliError::AuthFailed {
                        profile: name.clone(),
                    })?,
            };

            let user = SessionUser::from_token(token.expose_secret())?;
            let view = WhoAmI::new(name, source, user, Utc::now());
            let out = output::render_single(&global.output, &view, whoami_detail, |w| {
                w.subject.clone().unwrap_or_default()
            });
            output::print_output(&out, global.quiet);
            Ok(())
        }
    }
}

fn login(plaintext: bool, global: &GlobalOpts) -> Result<(), CliError> {
    let mut cfg = config::load_config_or_default();
    let name = config::active_profile_name(global, &cfg);

    let raw = match global.token.clone() {
        Some(token) => token,
        None => rpassword::prompt_password("Token: ")?,
    };
    let raw = raw.trim().to_owned();
    if raw.is_empty() {
        return Err(CliError::Validation {
            field: "token".into(),
            reason: "token cannot be empty".into(),
        });
    }

    // Refuse anything that does not decode before it is stored.
    let user = SessionUser::from_token(&raw)?;

    if let Some(ref api) = global.api {
        medstock_config::parse_api_url(api)?;
    }
    let profile = match cfg.profiles.entry(name.clone()) {
        Entry::Occupied(entry) => {
            let profile = entry.into_mut();
            if let Some(ref api) = global.api {
                profile.api_url.clone_from(api);
            }
            profile
        }
        Entry::Vacant(entry) => {
            let api = global.api.clone().ok_or_else(|| CliError::NoConfig {
                path: config::config_path().display().to_string(),
            })?;
            entry.insert(Profile::new(api))
        }
    };

    if plaintext {
        profile.token = Some(raw);
    } else {
        medstock_config::store_token(&name, &raw)?;
        profile.token = None;
    }
    if cfg.profiles.len() == 1 {
        cfg.default_profile = Some(name.clone());
    }
    config::save_config(&cfg)?;

    if !global.quiet {
        let who = user
            .name
            .as_deref()
            .or(user.email.as_deref())
            .or(user.subject.as_deref())
            .unwrap_or("unknown user");
        eprintln!(
            "✓ Signed in as {who} ({}) on profile '{name}'",
            user.role_label()
        );
        if user.is_expired() {
            eprintln!("  warning: this token has already expired");
        }
    }
    Ok(())
}
