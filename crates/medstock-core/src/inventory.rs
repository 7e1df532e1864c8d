// ── Inventory facade ──
//
// Owns the API client and the auth context and keeps them in step:
// signing in stores the session *and* arms the client's bearer header.
// Reads return fresh snapshots; writes go straight to the server and
// callers refetch. There is no cache.

use std::sync::Arc;

use medstock_api::{InventoryClient, Resource};
use secrecy::{ExposeSecret, SecretString};
use tracing::{debug, warn};

use crate::auth::{AuthContext, SessionUser};
use crate::config::InventoryConfig;
use crate::error::CoreError;
use crate::model::Record;

struct InventoryInner {
    config: InventoryConfig,
    client: InventoryClient,
    auth: AuthContext,
}

/// Cheaply cloneable handle to one inventory server.
#[derive(Clone)]
pub struct Inventory {
    inner: Arc<InventoryInner>,
}

impl Inventory {
    /// Build the HTTP client and, when the config carries a token, sign in.
    pub fn new(config: InventoryConfig) -> Result<Self, CoreError> {
        let client = InventoryClient::new(config.url.as_str(), &config.transport())?;
        let inventory = Self {
            inner: Arc::new(InventoryInner {
                config,
                client,
                auth: AuthContext::new(),
            }),
        };

        if let Some(token) = inventory.inner.config.token.as_ref() {
            let token = SecretString::from(token.expose_secret().to_owned());
            let user = inventory.login(token)?;
            if user.is_expired() {
                warn!("stored token has expired; requests will likely be rejected");
            }
        }
        Ok(inventory)
    }

    pub fn config(&self) -> &InventoryConfig {
        &self.inner.config
    }

    pub fn auth(&self) -> &AuthContext {
        &self.inner.auth
    }

    // ── Session ──────────────────────────────────────────────────────

    pub fn login(&self, token: SecretString) -> Result<SessionUser, CoreError> {
        let raw = token.expose_secret().to_owned();
        let user = self.inner.auth.login(token)?;
        self.inner.client.set_token(SecretString::from(raw));
        Ok(user)
    }

    pub fn logout(&self) {
        self.inner.auth.logout();
        self.inner.client.clear_token();
    }

    pub fn session(&self) -> Option<SessionUser> {
        self.inner.auth.user()
    }

    // ── Reads ────────────────────────────────────────────────────────

    pub async fn list(&self, resource: Resource) -> Result<Vec<Record>, CoreError> {
        let client = &self.inner.client;
        let records: Vec<Record> = read_retrying(move || client.list::<Record>(resource)).await?;
        debug!(%resource, count = records.len(), "fetched");
        Ok(records)
    }

    /// One record by id, located in the full collection.
    pub async fn get(&self, resource: Resource, id: &str) -> Result<Record, CoreError> {
        self.list(resource)
            .await?
            .into_iter()
            .find(|r| r.id().as_deref() == Some(id))
            .ok_or_else(|| CoreError::NotFound {
                resource: resource.label().into(),
                identifier: id.into(),
            })
    }

    pub async fn list_storage_lots(&self, storage_id: &str) -> Result<Vec<Record>, CoreError> {
        let client = &self.inner.client;
        let records: Vec<Record> =
            read_retrying(move || client.list_storage_lots::<Record>(storage_id)).await?;
        debug!(storage_id, count = records.len(), "fetched storage lots");
        Ok(records)
    }

    /// Server-side `?query=` search. Separate from the client-side filter
    /// engine; the server decides what matches.
    pub async fn search_remote(
        &self,
        resource: Resource,
        query: &str,
    ) -> Result<Vec<Record>, CoreError> {
        Ok(self.inner.client.search(resource, query).await?)
    }

    // ── Writes ───────────────────────────────────────────────────────

    pub async fn create(&self, resource: Resource, record: &Record) -> Result<(), CoreError> {
        self.inner.client.create(resource, record).await?;
        debug!(%resource, "created");
        Ok(())
    }

    pub async fn update(
        &self,
        resource: Resource,
        id: &str,
        record: &Record,
    ) -> Result<(), CoreError> {
        self.inner.client.update(resource, id, record).await?;
        debug!(%resource, id, "updated");
        Ok(())
    }

    pub async fn delete(&self, resource: Resource, id: &str) -> Result<(), CoreError> {
        self.inner.client.delete(resource, id).await?;
        debug!(%resource, id, "deleted");
        Ok(())
    }
}

/// Run a read, repeating it once when the first attempt fails with a
/// timeout, refused connection, or gateway status. Writes never go
/// through here.
async fn read_retrying<T, F, Fut>(op: F) -> Result<T, medstock_api::Error>
where
    F: Fn() -> Fut,
    Fut: Future<Output = Result<T, medstock_api::Error>>,
{
    match op().await {
        Err(e) if e.is_transient() => {
            warn!(error = %e, "transient read failure, retrying once");
            op().await
        }
        result => result,
    }
}
