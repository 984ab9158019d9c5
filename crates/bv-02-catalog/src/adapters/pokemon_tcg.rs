//! HTTP adapter for the public Pokémon TCG API (`api.pokemontcg.io/v2`).

use std::time::Duration;

use async_trait::async_trait;
use chrono::NaiveDate;
use reqwest::Client;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use shared_types::{Card, CardKey, CardPrices, CardSet, SetId};
use tracing::debug;

use crate::domain::CatalogError;
use crate::ports::CatalogProvider;

/// Default API root.
pub const DEFAULT_BASE_URL: &str = "https://api.pokemontcg.io/v2";

/// Cards requested per set listing; a full set fits in one page.
const CARDS_PAGE_SIZE: &str = "250";
const SETS_PAGE_SIZE: &str = "500";

/// Connection settings for [`PokemonTcgClient`].
#[derive(Debug, Clone)]
pub struct PokemonTcgConfig {
    pub base_url: String,
    pub api_key: Option<String>,
    pub request_timeout: Duration,
    pub connect_timeout: Duration,
}

impl Default for PokemonTcgConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            api_key: None,
            request_timeout: Duration::from_secs(10),
            connect_timeout: Duration::from_secs(3),
        }
    }
}

/// Catalog provider backed by the Pokémon TCG REST API.
pub struct PokemonTcgClient {
    client: Client,
    config: PokemonTcgConfig,
}

impl PokemonTcgClient {
    pub fn new(config: PokemonTcgConfig) -> Result<Self, CatalogError> {
        let client = Client::builder()
            .timeout(config.request_timeout)
            .connect_timeout(config.connect_timeout)
            .build()
            .map_err(|e| CatalogError::Http(e.to_string()))?;

        Ok(Self { client, config })
    }

    async fn get<R: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, &str)],
    ) -> Result<R, CatalogError> {
        let url = format!("{}/{}", self.config.base_url.trim_end_matches('/'), path);
        let mut request = self.client.get(&url).query(query);
        if let Some(key) = &self.config.api_key {
            request = request.header("X-Api-Key", key);
        }

        let response = request.send().await.map_err(|e| {
            if e.is_timeout() {
                CatalogError::Timeout {
                    after: self.config.request_timeout,
                }
            } else {
                CatalogError::Http(e.to_string())
            }
        })?;

        let status = response.status();
        if !status.is_success() {
            return Err(CatalogError::Status(status.as_u16()));
        }

        response
            .json::<R>()
            .await
            .map_err(|e| CatalogError::Parse(e.to_string()))
    }

    async fn search_cards(&self, q: &str, page_size: &str) -> Result<Vec<Card>, CatalogError> {
        debug!(query = q, "[bv-02] Searching cards");
        let page: Page<ApiCard> = self
            .get("cards", &[("q", q), ("pageSize", page_size)])
            .await?;
        Ok(page.data.into_iter().map(ApiCard::into_card).collect())
    }
}

#[async_trait]
impl CatalogProvider for PokemonTcgClient {
    async fn list_cards(&self, set: &SetId) -> Result<Vec<Card>, CatalogError> {
        self.search_cards(&format!("set.id:{}", set), CARDS_PAGE_SIZE)
            .await
    }

    async fn find_card(
        &self,
        set: &SetId,
        number: &str,
        preferred_language: Option<&str>,
    ) -> Result<Option<Card>, CatalogError> {
        let base = format!("set.id:{} number:{}", set, number);
        let mut queries = Vec::with_capacity(2);
        if let Some(lang) = preferred_language {
            queries.push(format!("{} language:{}", base, lang));
        }
        queries.push(base);

        for q in &queries {
            if let Some(card) = self.search_cards(q, "1").await?.into_iter().next() {
                return Ok(Some(card));
            }
        }
        Ok(None)
    }

    async fn list_sets(&self) -> Result<Vec<CardSet>, CatalogError> {
        let page: Page<ApiSet> = self.get("sets", &[("pageSize", SETS_PAGE_SIZE)]).await?;
        Ok(page.data.into_iter().map(ApiSet::into_set).collect())
    }
}

// =============================================================================
// WIRE TYPES
// =============================================================================

#[derive(Debug, Deserialize)]
struct Page<T> {
    #[serde(default = "Vec::new")]
    data: Vec<T>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ApiCard {
    name: String,
    number: String,
    rarity: Option<String>,
    set: ApiCardSet,
    #[serde(default)]
    images: ApiImages,
    cardmarket: Option<ApiCardmarket>,
}

#[derive(Debug, Deserialize)]
struct ApiCardSet {
    id: String,
}

#[derive(Debug, Default, Deserialize)]
struct ApiImages {
    large: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ApiCardmarket {
    #[serde(default)]
    prices: ApiPrices,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ApiPrices {
    low_price: Option<f64>,
    average_sell_price: Option<f64>,
    trend_price: Option<f64>,
}

impl ApiCard {
    fn into_card(self) -> Card {
        let prices = self
            .cardmarket
            .map(|cm| CardPrices {
                low: cm.prices.low_price,
                average_sell: cm.prices.average_sell_price,
                trend: cm.prices.trend_price,
            })
            .unwrap_or_default();

        Card {
            key: CardKey::new(SetId::new(self.set.id), self.number),
            name: self.name,
            rarity: self.rarity,
            image_url: self.images.large,
            prices,
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ApiSet {
    id: String,
    name: String,
    series: Option<String>,
    release_date: Option<String>,
}

impl ApiSet {
    fn into_set(self) -> CardSet {
        CardSet {
            id: SetId::new(self.id),
            name: self.name,
            series: self.series,
            release_date: self.release_date.as_deref().and_then(parse_release_date),
        }
    }
}

/// The API writes dates as `YYYY/MM/DD`; accept ISO dates too.
fn parse_release_date(raw: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(raw, "%Y/%m/%d")
        .or_else(|_| NaiveDate::parse_from_str(raw, "%Y-%m-%d"))
        .ok()
}
