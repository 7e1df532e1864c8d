// ── Core error types ──
//
// User-facing errors from medstock-core. Consumers never see raw HTTP
// status codes or JSON parse failures; the `From<medstock_api::Error>`
// impl translates transport-layer errors into these variants.
//
// The filter and sort engines have no error path at all. Only the
// inventory facade and token decoding can fail.

use thiserror::Error;

/// Unified error type for the core crate.
#[derive(Debug, Error)]
pub enum CoreError {
    // ── Connection errors ────────────────────────────────────────────
    #[error("Cannot reach inventory server at {url}: {reason}")]
    ConnectionFailed { url: String, reason: String },

    #[error("Request timed out")]
    Timeout,

    // ── Auth errors ──────────────────────────────────────────────────
    #[error("Not signed in or session expired")]
    Unauthorized,

    #[error("Permission denied: {message}")]
    PermissionDenied { message: String },

    #[error("Invalid token: {reason}")]
    InvalidToken { reason: String },

    // ── Data errors ──────────────────────────────────────────────────
    #[error("{resource} record not found: {identifier}")]
    NotFound {
        resource: String,
        identifier: String,
    },

    #[error("Unexpected response from server: {message}")]
    MalformedResponse { message: String },

    // ── Operation errors ─────────────────────────────────────────────
    #[error("Operation not supported: {operation}")]
    Unsupported { operation: String },

    #[error("Validation failed: {message}")]
    ValidationFailed { message: String },

    // ── API errors (wrapped, not exposed raw) ────────────────────────
    #[error("API error: {message}")]
    Api {
        message: String,
        code: Option<String>,
        status: Option<u16>,
    },

    // ── Configuration errors ─────────────────────────────────────────
    #[error("Configuration error: {message}")]
    Config { message: String },
}

// ── Conversion from transport-layer errors ───────────────────────────

impl From<medstock_api::Error> for CoreError {
    fn from(err: medstock_api::Error) -> Self {
        match err {
            medstock_api::Error::Unauthorized => CoreError::Unauthorized,
            medstock_api::Error::Forbidden { message } => CoreError::PermissionDenied { message },
            medstock_api::Error::NotFound { message } => CoreError::NotFound {
                resource: "Requested".into(),
                identifier: message,
            },
            medstock_api::Error::Transport(ref e) => {
                if e.is_timeout() {
                    CoreError::Timeout
                } else if e.is_connect() {
                    CoreError::ConnectionFailed {
                        url: e
                            .url()
                            .map_or_else(|| "<unknown>".into(), ToString::to_string),
                        reason: e.to_string(),
                    }
                } else {
                    CoreError::Api {
                        message: e.to_string(),
                        code: None,
                        status: e.status().map(|s| s.as_u16()),
                    }
                }
            }
            medstock_api::Error::InvalidUrl(e) => CoreError::Config {
                message: format!("invalid server URL: {e}"),
            },
            medstock_api::Error::Tls(message) => CoreError::ConnectionFailed {
                url: "<tls>".into(),
                reason: message,
            },
            medstock_api::Error::Api {
                status,
                message,
                code,
            } => CoreError::Api {
                message,
                code,
                status: Some(status),
            },
            medstock_api::Error::Deserialization { message, .. } => {
                CoreError::MalformedResponse { message }
            }
            medstock_api::Error::UnsupportedOperation(operation) => CoreError::Unsupported {
                operation: operation.into(),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn api_status_errors_translate() {
        let err: CoreError = medstock_api::Error::Unauthorized.into();
        assert!(matches!(err, CoreError::Unauthorized));

        let err: CoreError = medstock_api::Error::Api {
            status: 409,
            message: "duplicate lot number".into(),
            code: None,
        }
        .into();
        assert!(matches!(err, CoreError::Api { status: Some(409), .. }));
        assert_eq!(err.to_string(), "API error: duplicate lot number");
    }

    #[test]
    fn unsupported_keeps_operation_name() {
        let err: CoreError = medstock_api::Error::UnsupportedOperation("server-side search").into();
        assert_eq!(
            err.to_string(),
            "Operation not supported: server-side search"
        );
    }
}
