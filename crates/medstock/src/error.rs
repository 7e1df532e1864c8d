//! CLI error types with miette diagnostics.
//!
//! Maps `CoreError` and `ConfigError` variants into user-facing errors
//! with actionable help text and a process exit code.

use miette::Diagnostic;
use thiserror::Error;

use medstock_config::ConfigError;
use medstock_core::CoreError;

/// Process exit codes.
#[allow(dead_code)]
pub mod exit_code {
    pub const SUCCESS: i32 = 0;
    pub const GENERAL: i32 = 1;
    pub const USAGE: i32 = 2;
    pub const AUTH: i32 = 3;
    pub const NOT_FOUND: i32 = 4;
    pub const PERMISSION: i32 = 5;
    pub const CONNECTION: i32 = 7;
    pub const TIMEOUT: i32 = 8;
}

#[derive(Debug, Error, Diagnostic)]
pub enum CliError {
    // ── Connection ───────────────────────────────────────────────────

    #[error("Could not connect to the inventory server at {url}")]
    #[diagnostic(
        code(medstock::connection_failed),
        help(
            "Check that the server is running and reachable.\n\
             URL: {url}\n\
             Self-signed certificate? Try --insecure (-k) or set ca_cert on the profile."
        )
    )]
    ConnectionFailed { url: String, reason: String },

    #[error("Request timed out")]
    #[diagnostic(
        code(medstock::timeout),
        help("Increase the timeout with --timeout or check server responsiveness.")
    )]
    Timeout,

    // ── Authentication ───────────────────────────────────────────────

    #[error("Not signed in or session expired")]
    #[diagnostic(
        code(medstock::auth_failed),
        help("Sign in again with: medstock auth login --profile {profile}")
    )]
    AuthFailed { profile: String },

    #[error("Token rejected: {reason}")]
    #[diagnostic(
        code(medstock::invalid_token),
        help("Paste the full token as issued by the server (three dot-separated parts).")
    )]
    InvalidToken { reason: String },

    #[error("Permission denied: {message}")]
    #[diagnostic(
        code(medstock::permission_denied),
        help("Your role cannot perform this operation. Check it with: medstock auth whoami")
    )]
    PermissionDenied { message: String },

    // ── Resources ────────────────────────────────────────────────────

    #[error("{resource_type} '{identifier}' not found")]
    #[diagnostic(
        code(medstock::not_found),
        help("Run: medstock {list_command} to see what exists")
    )]
    NotFound {
        resource_type: String,
        identifier: String,
        list_command: String,
    },

    // ── API ──────────────────────────────────────────────────────────

    #[error("API error ({code}): {message}")]
    #[diagnostic(code(medstock::api_error))]
    ApiError { code: String, message: String },

    #[error("Operation '{operation}' is not available")]
    #[diagnostic(
        code(medstock::unsupported),
        help("Run the command with --help to see what this resource supports.")
    )]
    Unsupported { operation: String },

    // ── Validation ───────────────────────────────────────────────────

    #[error("Invalid value for {field}: {reason}")]
    #[diagnostic(code(medstock::validation))]
    Validation { field: String, reason: String },

    // ── Configuration ────────────────────────────────────────────────

    #[error("Profile '{name}' not found in configuration")]
    #[diagnostic(
        code(medstock::profile_not_found),
        help(
            "Available profiles: {available}\n\
             Create one with: medstock config init"
        )
    )]
    ProfileNotFound { name: String, available: String },

    #[error("No server configured")]
    #[diagnostic(
        code(medstock::no_config),
        help(
            "Create a profile with: medstock config init\n\
             or pass --api <URL>. Expected config at: {path}"
        )
    )]
    NoConfig { path: String },

    #[error(transparent)]
    #[diagnostic(code(medstock::config))]
    Config(Box<ConfigError>),

    // ── Interactive ──────────────────────────────────────────────────

    #[error("Destructive operation '{action}' requires confirmation")]
    #[diagnostic(
        code(medstock::confirmation_required),
        help("Use --yes (-y) to skip confirmation in non-interactive contexts.")
    )]
    NonInteractiveRequiresYes { action: String },

    // ── IO / Serialization ────────────────────────────────────────────

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error("Invalid JSON payload: {0}")]
    #[diagnostic(code(medstock::json), help("Check the JSON file contents and try again."))]
    Json(#[from] serde_json::Error),
}

impl From<ConfigError> for CliError {
    fn from(err: ConfigError) -> Self {
        match err {
            ConfigError::Validation { field, reason } => Self::Validation { field, reason },
            ConfigError::UnknownProfile { profile } => Self::ProfileNotFound {
                name: profile,
                available: "(see: medstock config profiles)".into(),
            },
            other => Self::Config(Box::new(other)),
        }
    }
}

impl CliError {
    /// Map this error to an exit code for process termination.
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::ConnectionFailed { .. } => exit_code::CONNECTION,
            Self::Timeout => exit_code::TIMEOUT,
            Self::AuthFailed { .. } | Self::InvalidToken { .. } => exit_code::AUTH,
            Self::PermissionDenied { .. } => exit_code::PERMISSION,
            Self::NotFound { .. } => exit_code::NOT_FOUND,
            Self::Validation { .. }
            | Self::Unsupported { .. }
            | Self::NonInteractiveRequiresYes { .. } => exit_code::USAGE,
            _ => exit_code::GENERAL,
        }
    }

    /// Fill in the profile name on auth failures raised below the CLI.
    pub fn with_profile(self, name: &str) -> Self {
        match self {
            Self::AuthFailed { .. } => Self::AuthFailed {
                profile: name.to_owned(),
            },
            other => other,
        }
    }
}

// ── CoreError → CliError mapping ─────────────────────────────────────

impl From<CoreError> for CliError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::ConnectionFailed { url, reason } => Self::ConnectionFailed { url, reason },

            CoreError::Timeout => Self::Timeout,

            CoreError::Unauthorized => Self::AuthFailed {
                profile: "<active>".into(),
            },

            CoreError::InvalidToken { reason } => Self::InvalidToken { reason },

            CoreError::PermissionDenied { message } => Self::PermissionDenied { message },

            CoreError::NotFound {
                resource,
                identifier,
            } => Self::NotFound {
                list_command: format!("{} list", resource.to_lowercase()),
                resource_type: resource,
                identifier,
            },

            CoreError::Unsupported { operation } => Self::Unsupported { operation },

            CoreError::ValidationFailed { message } => Self::Validation {
                field: "input".into(),
                reason: message,
            },

            CoreError::MalformedResponse { message } => Self::ApiError {
                code: "malformed_response".into(),
                message,
            },

            CoreError::Api {
                message,
                code,
                status,
            } => Self::ApiError {
                code: code
                    .or_else(|| status.map(|s| s.to_string()))
                    .unwrap_or_else(|| "unknown".into()),
                message,
            },

            CoreError::Config { message } => Self::Validation {
                field: "config".into(),
                reason: message,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn core_errors_map_to_exit_codes() {
        let cases = [
            (CoreError::Timeout, exit_code::TIMEOUT),
            (CoreError::Unauthorized, exit_code::AUTH),
            (
                CoreError::InvalidToken { reason: "x".into() },
                exit_code::AUTH,
            ),
            (
                CoreError::PermissionDenied { message: "x".into() },
                exit_code::PERMISSION,
            ),
            (
                CoreError::NotFound {
                    resource: "Items".into(),
                    identifier: "9".into(),
                },
                exit_code::NOT_FOUND,
            ),
            (
                CoreError::ConnectionFailed {
                    url: "http://x".into(),
                    reason: "refused".into(),
                },
                exit_code::CONNECTION,
            ),
            (
                CoreError::Unsupported { operation: "x".into() },
                exit_code::USAGE,
            ),
            (
                CoreError::Api {
                    message: "boom".into(),
                    code: None,
                    status: Some(500),
                },
                exit_code::GENERAL,
            ),
        ];
        for (core, code) in cases {
            let label = core.to_string();
            assert_eq!(CliError::from(core).exit_code(), code, "{label}");
        }
    }

    #[test]
    fn not_found_suggests_the_list_command() {
        let err = CliError::from(CoreError::NotFound {
            resource: "Items".into(),
            identifier: "9".into(),
        });
        match err {
            CliError::NotFound { list_command, .. } => assert_eq!(list_command, "items list"),
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn api_error_code_falls_back_to_status() {
        let err = CliError::from(CoreError::Api {
            message: "boom".into(),
            code: None,
            status: Some(502),
        });
        assert_eq!(err.to_string(), "API error (502): boom");
    }
}
