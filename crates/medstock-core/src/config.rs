// ── Runtime connection configuration ──
//
// Describes *how* to reach the inventory server. Carries the token and
// transport tuning but never touches disk; the CLI/TUI build an
// `InventoryConfig` from `medstock-config` and hand it in.

use std::time::Duration;

use secrecy::SecretString;
use url::Url;

/// TLS verification strategy.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum TlsVerification {
    /// System CA store (strict).
    #[default]
    SystemDefaults,
    /// Additional CA certificate file.
    CustomCa(std::path::PathBuf),
    /// Skip verification (development servers with self-signed certs).
    DangerAcceptInvalid,
}

/// Configuration for one inventory server.
#[derive(Debug, Clone)]
pub struct InventoryConfig {
    /// Server root, e.g. `https://inventory.example.org`.
    pub url: Url,
    /// Bearer token; signed in on construction when present.
    pub token: Option<SecretString>,
    pub tls: TlsVerification,
    pub timeout: Duration,
}

impl InventoryConfig {
    pub fn new(url: Url) -> Self {
        Self {
            url,
            token: None,
            tls: TlsVerification::default(),
            timeout: Duration::from_secs(30),
        }
    }

    pub(crate) fn transport(&self) -> medstock_api::TransportConfig {
        medstock_api::TransportConfig {
            tls: match &self.tls {
                TlsVerification::SystemDefaults => medstock_api::TlsMode::System,
                TlsVerification::CustomCa(path) => medstock_api::TlsMode::CustomCa(path.clone()),
                TlsVerification::DangerAcceptInvalid => medstock_api::TlsMode::DangerAcceptInvalid,
            },
            timeout: self.timeout,
        }
    }
}
