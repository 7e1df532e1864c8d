// Inventory REST client
//
// Bearer-token authenticated HTTP client for the medstock server.
// Collections are JSON arrays; a `{ "data": [...] }` envelope is also
// accepted. Writes return no body the client cares about.

use std::sync::Arc;

use arc_swap::ArcSwapOption;
use secrecy::{ExposeSecret, SecretString};
use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::debug;
use url::Url;

use crate::error::Error;
use crate::resource::Resource;
use crate::transport::TransportConfig;

/// A collection response: either a bare array or wrapped in `data`.
#[derive(serde::Deserialize)]
#[serde(untagged)]
enum ListBody<T> {
    Bare(Vec<T>),
    Envelope { data: Vec<T> },
}

impl<T> ListBody<T> {
    fn into_vec(self) -> Vec<T> {
        match self {
            Self::Bare(items) | Self::Envelope { data: items } => items,
        }
    }
}

/// Error payload the server sends on failures. Both keys are optional.
#[derive(serde::Deserialize)]
struct ErrorResponse {
    message: Option<String>,
    error: Option<String>,
    code: Option<String>,
}

/// Async client for the inventory REST API.
///
/// The bearer token is swapped atomically on login/logout, so a client
/// can be shared (behind `Arc`) by concurrent fetch tasks.
pub struct InventoryClient {
    http: reqwest::Client,
    base_url: Url,
    token: ArcSwapOption<SecretString>,
}

impl InventoryClient {
    /// Create a client for the server at `base_url`.
    pub fn new(base_url: &str, transport: &TransportConfig) -> Result<Self, Error> {
        let http = transport.build_client()?;
        Self::from_reqwest(base_url, http)
    }

    /// Create a client around an existing `reqwest::Client`.
    pub fn from_reqwest(base_url: &str, http: reqwest::Client) -> Result<Self, Error> {
        let base_url = Self::normalize_base_url(base_url)?;
        Ok(Self {
            http,
            base_url,
            token: ArcSwapOption::empty(),
        })
    }

    /// Ensure the base URL path ends with `/` so relative joins append.
    fn normalize_base_url(raw: &str) -> Result<Url, Error> {
        let mut url = Url::parse(raw)?;
        let path = url.path().trim_end_matches('/').to_owned();
        url.set_path(&format!("{path}/"));
        Ok(url)
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    // ── Token ────────────────────────────────────────────────────────

    /// Attach `token` as `Authorization: Bearer` on every later request.
    pub fn set_token(&self, token: SecretString) {
        self.token.store(Some(Arc::new(token)));
    }

    pub fn clear_token(&self) {
        self.token.store(None);
    }

    pub fn has_token(&self) -> bool {
        self.token.load().is_some()
    }

    // ── URL builder ──────────────────────────────────────────────────

    fn url(&self, path: &str) -> Result<Url, Error> {
        Ok(self.base_url.join(path)?)
    }

    /// `{base}/{resource path}/{segments...}` with each segment escaped.
    fn nested_url(&self, resource: Resource, segments: &[&str]) -> Result<Url, Error> {
        let mut url = self.url(resource.path())?;
        url.path_segments_mut()
            .map_err(|()| Error::InvalidUrl(url::ParseError::RelativeUrlWithCannotBeABaseBase))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    fn record_url(&self, resource: Resource, id: &str) -> Result<Url, Error> {
        self.nested_url(resource, &[id])
    }

    fn request(&self, method: reqwest::Method, url: Url) -> reqwest::RequestBuilder {
        let builder = self.http.request(method, url);
        match self.token.load_full() {
            Some(token) => builder.bearer_auth(token.expose_secret()),
            None => builder,
        }
    }

    // ── Reads ────────────────────────────────────────────────────────

    /// Fetch every record of a collection.
    pub async fn list<T: DeserializeOwned>(&self, resource: Resource) -> Result<Vec<T>, Error> {
        let url = self.url(resource.path())?;
        debug!("GET {url}");

        let resp = self.request(reqwest::Method::GET, url).send().await?;
        let body: ListBody<T> = self.handle_response(resp).await?;
        Ok(body.into_vec())
    }

    /// Fetch the item lots held by one storage.
    pub async fn list_storage_lots<T: DeserializeOwned>(
        &self,
        storage_id: &str,
    ) -> Result<Vec<T>, Error> {
        let url = self.nested_url(Resource::ItemLots, &["storage", storage_id])?;
        debug!("GET {url}");

        let resp = self.request(reqwest::Method::GET, url).send().await?;
        let body: ListBody<T> = self.handle_response(resp).await?;
        Ok(body.into_vec())
    }

    /// Run the server-side `?query=` search.
    ///
    /// Matching is whatever the server implements; it is not the
    /// client-side filter and results may differ for the same text.
    pub async fn search<T: DeserializeOwned>(
        &self,
        resource: Resource,
        query: &str,
    ) -> Result<Vec<T>, Error> {
        let path = resource
            .search_path()
            .ok_or(Error::UnsupportedOperation("server-side search"))?;
        let url = self.url(path)?;
        debug!("GET {url} query={query:?}");

        let resp = self
            .request(reqwest::Method::GET, url)
            .query(&[("query", query)])
            .send()
            .await?;
        let body: ListBody<T> = self.handle_response(resp).await?;
        Ok(body.into_vec())
    }

    // ── Writes ───────────────────────────────────────────────────────

    pub async fn create<B: Serialize + Sync>(
        &self,
        resource: Resource,
        body: &B,
    ) -> Result<(), Error> {
        Self::ensure_writable(resource)?;
        let url = self.url(resource.path())?;
        debug!("POST {url}");

        let resp = self
            .request(reqwest::Method::POST, url)
            .json(body)
            .send()
            .await?;
        self.handle_empty(resp).await
    }

    pub async fn update<B: Serialize + Sync>(
        &self,
        resource: Resource,
        id: &str,
        body: &B,
    ) -> Result<(), Error> {
        Self::ensure_writable(resource)?;
        let url = self.record_url(resource, id)?;
        debug!("PUT {url}");

        let resp = self
            .request(reqwest::Method::PUT, url)
            .json(body)
            .send()
            .await?;
        self.handle_empty(resp).await
    }

    pub async fn delete(&self, resource: Resource, id: &str) -> Result<(), Error> {
        Self::ensure_writable(resource)?;
        let url = self.record_url(resource, id)?;
        debug!("DELETE {url}");

        let resp = self.request(reqwest::Method::DELETE, url).send().await?;
        self.handle_empty(resp).await
    }

    fn ensure_writable(resource: Resource) -> Result<(), Error> {
        if resource.is_writable() {
            Ok(())
        } else {
            Err(Error::UnsupportedOperation("write on a read-only resource"))
        }
    }

    // ── Response handling ────────────────────────────────────────────

    async fn handle_response<T: DeserializeOwned>(
        &self,
        resp: reqwest::Response,
    ) -> Result<T, Error> {
        let status = resp.status();
        if status.is_success() {
            let body = resp.text().await?;
            serde_json::from_str(&body).map_err(|e| {
                let preview: String = body.chars().take(200).collect();
                Error::Deserialization {
                    message: format!("{e} (body preview: {preview:?})"),
                    body,
                }
            })
        } else {
            Err(self.parse_error(status, resp).await)
        }
    }

    async fn handle_empty(&self, resp: reqwest::Response) -> Result<(), Error> {
        let status = resp.status();
        if status.is_success() {
            Ok(())
        } else {
            Err(self.parse_error(status, resp).await)
        }
    }

    async fn parse_error(&self, status: reqwest::StatusCode, resp: reqwest::Response) -> Error {
        if status == reqwest::StatusCode::UNAUTHORIZED {
            return Error::Unauthorized;
        }

        let raw = resp.text().await.unwrap_or_default();
        let (message, code) = match serde_json::from_str::<ErrorResponse>(&raw) {
            Ok(err) => (
                err.message
                    .or(err.error)
                    .unwrap_or_else(|| status.to_string()),
                err.code,
            ),
            Err(_) if raw.trim().is_empty() => (status.to_string(), None),
            Err(_) => (raw, None),
        };

        match status {
            reqwest::StatusCode::FORBIDDEN => Error::Forbidden { message },
            reqwest::StatusCode::NOT_FOUND => Error::NotFound { message },
            _ => Error::Api {
                status: status.as_u16(),
                message,
                code,
            },
        }
    }
}
