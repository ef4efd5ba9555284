// ── Entity store adapter ──
//
// Typed access to the five catalog collections. Everything above this
// layer speaks `EntityKind` + `ItemId`; path building, status mapping and
// JSON decoding stay in `staylist-api`. No retries happen here: a failed
// call surfaces once and the caller decides.

use serde::Serialize;
use tracing::debug;

use staylist_api::{StoreClient, TlsMode, TransportConfig};

use crate::config::{StoreConfig, TlsVerification};
use crate::error::CoreError;
use crate::model::{CatalogItem, EntityKind, ItemId};

/// Body of a partial favorite update.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FavoritePatch {
    pub is_favorite: bool,
}

/// A write against one record.
#[derive(Debug, Clone)]
pub enum ItemWrite {
    /// Merge the given fields into the stored record (`PATCH`).
    Patch(FavoritePatch),
    /// Replace the stored record wholesale (`PUT`).
    Replace(CatalogItem),
}

/// Server-side filter for `list`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ListQuery {
    /// Only records with `isFavorite == true`.
    pub favorites_only: bool,
}

impl ListQuery {
    pub fn favorites() -> Self {
        Self {
            favorites_only: true,
        }
    }

    fn params(self) -> Vec<(&'static str, String)> {
        let mut params = Vec::new();
        if self.favorites_only {
            params.push(("isFavorite", "true".to_owned()));
        }
        params
    }
}

/// Typed gateway to the remote store.
#[derive(Debug, Clone)]
pub struct StoreAdapter {
    client: StoreClient,
}

impl StoreAdapter {
    /// Build an adapter with its own HTTP client from runtime config.
    pub fn new(config: &StoreConfig) -> Result<Self, CoreError> {
        let transport = TransportConfig {
            tls: tls_to_transport(&config.tls),
            timeout: config.timeout,
        };
        let client = StoreClient::new(config.url.as_str(), &transport)?;
        Ok(Self { client })
    }

    /// Wrap an already-built client.
    pub fn from_client(client: StoreClient) -> Self {
        Self { client }
    }

    pub fn base_url(&self) -> &url::Url {
        self.client.base_url()
    }

    /// Fetch one record.
    pub async fn get(&self, kind: EntityKind, id: &ItemId) -> Result<CatalogItem, CoreError> {
        debug!(%kind, %id, "fetching record");
        Ok(self.client.get(kind.collection(), id.as_str()).await?)
    }

    /// Fetch every record of a kind, in store order.
    pub async fn list(
        &self,
        kind: EntityKind,
        query: ListQuery,
    ) -> Result<Vec<CatalogItem>, CoreError> {
        debug!(%kind, favorites_only = query.favorites_only, "listing collection");
        let items: Vec<CatalogItem> = self
            .client
            .list(kind.collection(), &query.params())
            .await?;
        debug!(%kind, count = items.len(), "collection listed");
        Ok(items)
    }

    /// Persist a change and return the record as the store now holds it.
    pub async fn write(
        &self,
        kind: EntityKind,
        id: &ItemId,
        write: &ItemWrite,
    ) -> Result<CatalogItem, CoreError> {
        let collection = kind.collection();
        match write {
            ItemWrite::Patch(patch) => {
                debug!(%kind, %id, is_favorite = patch.is_favorite, "patching record");
                Ok(self.client.patch(collection, id.as_str(), patch).await?)
            }
            ItemWrite::Replace(item) => {
                debug!(%kind, %id, is_favorite = item.is_favorite, "replacing record");
                Ok(self.client.replace(collection, id.as_str(), item).await?)
            }
        }
    }

    /// Create a record; the store assigns the id when the body has none.
    pub async fn create<B: Serialize + Sync>(
        &self,
        kind: EntityKind,
        body: &B,
    ) -> Result<CatalogItem, CoreError> {
        debug!(%kind, "creating record");
        Ok(self.client.create(kind.collection(), body).await?)
    }

    /// Delete a record.
    pub async fn delete(&self, kind: EntityKind, id: &ItemId) -> Result<(), CoreError> {
        debug!(%kind, %id, "deleting record");
        Ok(self.client.delete(kind.collection(), id.as_str()).await?)
    }
}

fn tls_to_transport(tls: &TlsVerification) -> TlsMode {
    match tls {
        TlsVerification::SystemDefaults => TlsMode::System,
        TlsVerification::CustomCa(path) => TlsMode::CustomCa(path.clone()),
        TlsVerification::DangerAcceptInvalid => TlsMode::DangerAcceptInvalid,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn favorites_query_adds_flag_param() {
        assert!(ListQuery::default().params().is_empty());
        assert_eq!(
            ListQuery::favorites().params(),
            vec![("isFavorite", "true".to_owned())]
        );
    }

    #[test]
    fn patch_body_is_camel_case() {
        let body = serde_json::to_value(FavoritePatch { is_favorite: true });
        assert!(matches!(body, Ok(v) if v == serde_json::json!({ "isFavorite": true })));
    }
}
