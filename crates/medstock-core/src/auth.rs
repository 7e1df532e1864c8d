// ── Auth context ──
//
// The bearer token is issued by the server and only ever *read* here:
// the payload segment is base64url-decoded for display and navigation
// gating. The signature is not verified and nothing in the filter/sort
// pipeline consults the session.

use std::sync::Arc;

use arc_swap::ArcSwapOption;
use base64::Engine as _;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use chrono::{DateTime, Utc};
use medstock_api::Resource;
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, info};

use crate::classify::{CodeTable, Role};
use crate::error::CoreError;

/// Claims the server puts in the token payload. All optional.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Claims {
    sub: Option<Value>,
    #[serde(alias = "id")]
    user_id: Option<Value>,
    name: Option<String>,
    email: Option<String>,
    role: Option<Value>,
    storage_id: Option<Value>,
    storage_name: Option<String>,
    exp: Option<i64>,
}

fn scalar_text(value: Option<Value>) -> Option<String> {
    match value? {
        Value::String(s) => Some(s),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

/// The signed-in user as described by the token.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SessionUser {
    pub subject: Option<String>,
    pub name: Option<String>,
    pub email: Option<String>,
    pub role: Option<Role>,
    pub storage_id: Option<String>,
    pub storage_name: Option<String>,
    pub expires_at: Option<DateTime<Utc>>,
}

impl SessionUser {
    /// Decode the payload segment of a `header.payload.signature` token.
    pub fn from_token(token: &str) -> Result<Self, CoreError> {
        let payload = token
            .trim()
            .split('.')
            .nth(1)
            .ok_or_else(|| CoreError::InvalidToken {
                reason: "expected three dot-separated segments".into(),
            })?;
        let bytes = URL_SAFE_NO_PAD
            .decode(payload.trim_end_matches('='))
            .map_err(|e| CoreError::InvalidToken {
                reason: format!("payload is not base64url: {e}"),
            })?;
        let claims: Claims = serde_json::from_slice(&bytes).map_err(|e| CoreError::InvalidToken {
            reason: format!("payload is not a JSON object: {e}"),
        })?;

        Ok(Self {
            subject: scalar_text(claims.sub).or_else(|| scalar_text(claims.user_id)),
            name: claims.name,
            email: claims.email,
            role: claims.role.as_ref().and_then(Role::from_value),
            storage_id: scalar_text(claims.storage_id),
            storage_name: claims.storage_name,
            expires_at: claims.exp.and_then(|exp| DateTime::from_timestamp(exp, 0)),
        })
    }

    pub fn role_label(&self) -> &'static str {
        self.role.map_or("Unknown", CodeTable::label)
    }

    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        self.expires_at.is_some_and(|exp| exp <= now)
    }

    pub fn is_expired(&self) -> bool {
        self.is_expired_at(Utc::now())
    }

    /// Resources this role's navigation shows.
    pub fn visible_resources(&self) -> &'static [Resource] {
        match self.role {
            Some(Role::Admin) => &[
                Resource::Accounts,
                Resource::Staff,
                Resource::Items,
                Resource::Storages,
                Resource::StorageCategories,
                Resource::ItemLots,
                Resource::LotStorageRequests,
                Resource::LotCreateRequests,
            ],
            Some(Role::Manager) => &[
                Resource::Staff,
                Resource::Items,
                Resource::Storages,
                Resource::StorageCategories,
                Resource::ItemLots,
                Resource::LotStorageRequests,
                Resource::LotCreateRequests,
            ],
            Some(Role::Staff) => &[
                Resource::Items,
                Resource::ItemLots,
                Resource::LotStorageRequests,
            ],
            Some(Role::Supplier) => &[Resource::Items, Resource::LotCreateRequests],
            Some(Role::Customer) | None => &[Resource::Items],
        }
    }

    pub fn can_view(&self, resource: Resource) -> bool {
        self.visible_resources().contains(&resource)
    }

    /// First screen after sign-in.
    pub fn landing(&self) -> Resource {
        self.visible_resources()
            .first()
            .copied()
            .unwrap_or(Resource::Items)
    }
}

struct Session {
    token: SecretString,
    user: SessionUser,
}

/// Process-wide sign-in state: `{ token, user, login(), logout() }`.
///
/// Created once at startup and handed to whatever needs it; leaf code
/// never reads credentials from anywhere else.
#[derive(Default)]
pub struct AuthContext {
    session: ArcSwapOption<Session>,
}

impl AuthContext {
    pub fn new() -> Self {
        Self::default()
    }

    /// Decode and adopt `token`. The previous session is replaced.
    pub fn login(&self, token: SecretString) -> Result<SessionUser, CoreError> {
        let user = SessionUser::from_token(token.expose_secret())?;
        info!(
            role = user.role_label(),
            subject = user.subject.as_deref().unwrap_or("-"),
            "signed in"
        );
        self.session.store(Some(Arc::new(Session {
            token,
            user: user.clone(),
        })));
        Ok(user)
    }

    pub fn logout(&self) {
        if self.session.swap(None).is_some() {
            debug!("signed out");
        }
    }

    pub fn user(&self) -> Option<SessionUser> {
        self.session.load().as_ref().map(|s| s.user.clone())
    }

    /// Copy of the raw token, for attaching to requests.
    pub fn token(&self) -> Option<SecretString> {
        self.session
            .load()
            .as_ref()
            .map(|s| SecretString::from(s.token.expose_secret().to_owned()))
    }

    pub fn is_authenticated(&self) -> bool {
        self.session.load().is_some()
    }
}

impl std::fmt::Debug for AuthContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthContext")
            .field("user", &self.user())
            .field("token", &self.is_authenticated().then_some("[REDACTED]"))
            .finish()
    }
}

/// Build an unsigned token carrying `claims`, for tests and fixtures.
pub fn encode_unsigned_token(claims: &Value) -> String {
    let header = URL_SAFE_NO_PAD.encode(br#"{"alg":"none","typ":"JWT"}"#);
    let payload = URL_SAFE_NO_PAD.encode(claims.to_string());
    format!("{header}.{payload}.")
}
