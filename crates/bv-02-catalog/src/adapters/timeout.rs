use std::future::Future;
use std::time::Duration;

use async_trait::async_trait;
use shared_types::{Card, CardSet, SetId};

use crate::domain::CatalogError;
use crate::ports::CatalogProvider;

/// Decorator bounding every call of an inner provider.
///
/// Callers never wait longer than `timeout` for the catalog, whatever the
/// adapter underneath does.
pub struct TimeoutCatalog<P> {
    inner: P,
    timeout: Duration,
}

impl<P: CatalogProvider> TimeoutCatalog<P> {
    pub fn new(inner: P, timeout: Duration) -> Self {
        Self { inner, timeout }
    }

    pub fn inner(&self) -> &P {
        &self.inner
    }

    async fn bounded<T>(
        &self,
        call: impl Future<Output = Result<T, CatalogError>>,
    ) -> Result<T, CatalogError> {
        tokio::time::timeout(self.timeout, call)
            .await
            .map_err(|_| CatalogError::Timeout {
                after: self.timeout,
            })?
    }
}

#[async_trait]
impl<P: CatalogProvider> CatalogProvider for TimeoutCatalog<P> {
    async fn list_cards(&self, set: &SetId) -> Result<Vec<Card>, CatalogError> {
        self.bounded(self.inner.list_cards(set)).await
    }

    async fn find_card(
        &self,
        set: &SetId,
        number: &str,
        preferred_language: Option<&str>,
    ) -> Result<Option<Card>, CatalogError> {
        self.bounded(self.inner.find_card(set, number, preferred_language))
            .await
    }

    async fn list_sets(&self) -> Result<Vec<CardSet>, CatalogError> {
        self.bounded(self.inner.list_sets()).await
    }
}
