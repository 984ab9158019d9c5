//! Outbound port to the external card catalog / price service.

use std::sync::Arc;

use async_trait::async_trait;
use shared_types::{Card, CardKey, CardSet, SetId};

use crate::domain::CatalogError;

/// External card catalog and price lookup.
///
/// Absence is a normal answer (`Ok(vec![])` / `Ok(None)`); `Err` means the
/// provider could not be asked.
#[async_trait]
pub trait CatalogProvider: Send + Sync {
    /// Every card of a set. Empty if the set is unknown.
    async fn list_cards(&self, set: &SetId) -> Result<Vec<Card>, CatalogError>;

    /// One card with its prices, preferring a printing in `preferred_language`
    /// and falling back to any language.
    async fn find_card(
        &self,
        set: &SetId,
        number: &str,
        preferred_language: Option<&str>,
    ) -> Result<Option<Card>, CatalogError>;

    /// Every known set, in provider order.
    async fn list_sets(&self) -> Result<Vec<CardSet>, CatalogError>;

    /// Convenience lookup by composite key.
    async fn find_by_key(
        &self,
        key: &CardKey,
        preferred_language: Option<&str>,
    ) -> Result<Option<Card>, CatalogError> {
        self.find_card(&key.set, &key.number, preferred_language)
            .await
    }
}

#[async_trait]
impl<P: CatalogProvider + ?Sized> CatalogProvider for Arc<P> {
    async fn list_cards(&self, set: &SetId) -> Result<Vec<Card>, CatalogError> {
        (**self).list_cards(set).await
    }

    async fn find_card(
        &self,
        set: &SetId,
        number: &str,
        preferred_language: Option<&str>,
    ) -> Result<Option<Card>, CatalogError> {
        (**self).find_card(set, number, preferred_language).await
    }

    async fn list_sets(&self) -> Result<Vec<CardSet>, CatalogError> {
        (**self).list_sets().await
    }
}
