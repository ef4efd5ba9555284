// Store HTTP client
//
// Wraps `reqwest::Client` with collection-scoped URL construction and
// status mapping. Every record endpoint of the store follows the same
// shape: `/{collection}` and `/{collection}/{id}`.

use std::time::Duration;

use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::{debug, trace};
use url::Url;

use crate::error::Error;
use crate::transport::TransportConfig;

/// Maximum number of body characters kept in error messages.
const BODY_PREVIEW_CHARS: usize = 200;

/// Raw HTTP client for the catalog store.
///
/// Speaks plain JSON: list endpoints return arrays, record endpoints
/// return a single object, and write endpoints echo the persisted record.
/// Retries are never attempted here; callers own the retry policy.
#[derive(Debug, Clone)]
pub struct StoreClient {
    http: reqwest::Client,
    base_url: Url,
    timeout: Duration,
}

impl StoreClient {
    // ── Constructors ─────────────────────────────────────────────────

    /// Build a client from a base URL (e.g. `http://localhost:3001`).
    pub fn new(base_url: &str, transport: &TransportConfig) -> Result<Self, Error> {
        let http = transport.build_client()?;
        Ok(Self {
            http,
            base_url: Url::parse(base_url)?,
            timeout: transport.timeout,
        })
    }

    /// Wrap an existing `reqwest::Client`.
    pub fn from_reqwest(base_url: &str, http: reqwest::Client) -> Result<Self, Error> {
        Ok(Self {
            http,
            base_url: Url::parse(base_url)?,
            timeout: TransportConfig::default().timeout,
        })
    }

    /// The store base URL.
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    // ── URL builder ──────────────────────────────────────────────────

    /// Append path segments to the base URL, percent-encoding each one.
    fn url(&self, segments: &[&str]) -> Result<Url, Error> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|()| Error::InvalidUrl(url::ParseError::RelativeUrlWithCannotBeABaseBase))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    // ── Collection operations ────────────────────────────────────────

    /// `GET /{collection}` with optional query filters
    /// (e.g. `[("isFavorite", "true")]`).
    pub async fn list<T: DeserializeOwned>(
        &self,
        collection: &str,
        params: &[(&str, String)],
    ) -> Result<Vec<T>, Error> {
        let url = self.url(&[collection])?;
        debug!("GET {url} params={params:?}");

        let resp = self
            .http
            .get(url)
            .query(params)
            .send()
            .await
            .map_err(|e| self.transport_error(e))?;
        self.handle_response(resp, collection, None).await
    }

    /// `GET /{collection}/{id}`
    pub async fn get<T: DeserializeOwned>(&self, collection: &str, id: &str) -> Result<T, Error> {
        let url = self.url(&[collection, id])?;
        debug!("GET {url}");

        let resp = self
            .http
            .get(url)
            .send()
            .await
            .map_err(|e| self.transport_error(e))?;
        self.handle_response(resp, collection, Some(id)).await
    }

    /// `POST /{collection}`
    pub async fn create<T: DeserializeOwned, B: Serialize + Sync>(
        &self,
        collection: &str,
        body: &B,
    ) -> Result<T, Error> {
        let url = self.url(&[collection])?;
        debug!("POST {url}");

        let resp = self
            .http
            .post(url)
            .json(body)
            .send()
            .await
            .map_err(|e| self.transport_error(e))?;
        self.handle_response(resp, collection, None).await
    }

    /// `PUT /{collection}/{id}` -- full-record replace.
    pub async fn replace<T: DeserializeOwned, B: Serialize + Sync>(
        &self,
        collection: &str,
        id: &str,
        body: &B,
    ) -> Result<T, Error> {
        let url = self.url(&[collection, id])?;
        debug!("PUT {url}");

        let resp = self
            .http
            .put(url)
            .json(body)
            .send()
            .await
            .map_err(|e| self.transport_error(e))?;
        self.handle_response(resp, collection, Some(id)).await
    }

    /// `PATCH /{collection}/{id}` -- partial update of the given fields.
    pub async fn patch<T: DeserializeOwned, B: Serialize + Sync>(
        &self,
        collection: &str,
        id: &str,
        body: &B,
    ) -> Result<T, Error> {
        let url = self.url(&[collection, id])?;
        debug!("PATCH {url}");

        let resp = self
            .http
            .patch(url)
            .json(body)
            .send()
            .await
            .map_err(|e| self.transport_error(e))?;
        self.handle_response(resp, collection, Some(id)).await
    }

    /// `DELETE /{collection}/{id}`
    pub async fn delete(&self, collection: &str, id: &str) -> Result<(), Error> {
        let url = self.url(&[collection, id])?;
        debug!("DELETE {url}");

        let resp = self
            .http
            .delete(url)
            .send()
            .await
            .map_err(|e| self.transport_error(e))?;
        self.check_status(resp, collection, Some(id)).await.map(drop)
    }

    // ── Response handling ────────────────────────────────────────────

    /// Translate reqwest timeouts into `Error::Timeout` so callers see the
    /// configured bound instead of an opaque transport failure.
    fn transport_error(&self, err: reqwest::Error) -> Error {
        if err.is_timeout() {
            Error::Timeout {
                timeout_secs: self.timeout.as_secs(),
            }
        } else {
            Error::Transport(err)
        }
    }

    async fn check_status(
        &self,
        resp: reqwest::Response,
        collection: &str,
        id: Option<&str>,
    ) -> Result<reqwest::Response, Error> {
        let status = resp.status();

        if status == reqwest::StatusCode::NOT_FOUND {
            return Err(Error::NotFound {
                collection: collection.to_owned(),
                id: id.unwrap_or_default().to_owned(),
            });
        }

        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(Error::Server {
                status: status.as_u16(),
                message: preview(&body),
            });
        }

        Ok(resp)
    }

    async fn handle_response<T: DeserializeOwned>(
        &self,
        resp: reqwest::Response,
        collection: &str,
        id: Option<&str>,
    ) -> Result<T, Error> {
        let resp = self.check_status(resp, collection, id).await?;
        let body = resp.text().await.map_err(|e| self.transport_error(e))?;
        trace!(bytes = body.len(), "response body received");

        serde_json::from_str(&body).map_err(|e| Error::Deserialization {
            message: format!("{e} (body preview: {:?})", preview(&body)),
            body,
        })
    }
}

/// First few characters of a body, safe on multi-byte text.
fn preview(body: &str) -> String {
    body.chars().take(BODY_PREVIEW_CHARS).collect()
}
