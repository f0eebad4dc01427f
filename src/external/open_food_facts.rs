//! Open Food Facts search client.
//!
//! Uses the public, keyless v2 search endpoint. Nutriment values arrive as
//! numbers or numeric strings depending on the product; anything else counts
//! as absent. Ranking and failure absorption happen in
//! [`crate::core::remote`], so this client simply reports errors.

use crate::config::settings::RemoteSettings;
use crate::core::nutrients::Macros;
use crate::core::remote::{Candidate, FoodLookup};
use crate::errors::{Error, Result};
use async_trait::async_trait;
use serde::Deserialize;
use serde_json::{Map, Value};
use std::time::Duration;

const FIELDS: &str = "product_name,product_name_en,brands,nutriments";

#[derive(Debug, Deserialize)]
struct SearchResponse {
    #[serde(default)]
    products: Vec<Product>,
}

#[derive(Debug, Deserialize)]
struct Product {
    #[serde(default)]
    product_name: Option<String>,
    #[serde(default)]
    product_name_en: Option<String>,
    #[serde(default)]
    brands: Option<String>,
    #[serde(default)]
    nutriments: Option<Map<String, Value>>,
}

impl Product {
    fn into_candidate(self) -> Candidate {
        let n = &self.nutriments.unwrap_or_default();
        let calories = number(n, "energy-kcal_100g").or_else(|| number(n, "energy_kcal_100g"));
        Candidate {
            name: self.product_name,
            name_en: self.product_name_en,
            brand: self.brands,
            nutrients: Macros::from_optional(
                calories,
                number(n, "proteins_100g"),
                number(n, "carbohydrates_100g"),
                number(n, "fat_100g"),
            ),
        }
    }
}

fn number(nutriments: &Map<String, Value>, key: &str) -> Option<f64> {
    match nutriments.get(key)? {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

/// HTTP client for the Open Food Facts search API.
#[derive(Debug, Clone)]
pub struct OpenFoodFactsClient {
    settings: RemoteSettings,
    http_client: reqwest::Client,
}

impl OpenFoodFactsClient {
    /// Builds a client with the configured timeout and user agent.
    ///
    /// # Errors
    /// Returns `Error::Remote` if the HTTP client cannot be constructed.
    pub fn new(settings: RemoteSettings) -> Result<Self> {
        let http_client = reqwest::Client::builder()
            .timeout(Duration::from_secs(settings.timeout_secs))
            .user_agent(settings.user_agent.clone())
            .build()?;
        Ok(Self {
            settings,
            http_client,
        })
    }

    fn search_url(&self) -> String {
        format!("{}/api/v2/search", self.settings.base_url.trim_end_matches('/'))
    }
}

#[async_trait]
impl FoodLookup for OpenFoodFactsClient {
    async fn search(&self, query: &str) -> Result<Vec<Candidate>> {
        let page_size = self.settings.page_size.to_string();
        let response = self
            .http_client
            .get(self.search_url())
            .query(&[
                ("search_terms", query.trim()),
                ("page_size", page_size.as_str()),
                ("fields", FIELDS),
            ])
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(Error::Remote {
                message: format!("Open Food Facts returned HTTP {status}"),
            });
        }

        let body = response.text().await?;
        let candidates = parse_search_body(&body)?;
        tracing::debug!(query, products = candidates.len(), "open food facts search");
        Ok(candidates)
    }
}

/// Parses a raw search response body.
fn parse_search_body(body: &str) -> Result<Vec<Candidate>> {
    let response: SearchResponse = serde_json::from_str(body).map_err(|e| Error::Remote {
        message: format!("JSON parse error: {e}"),
    })?;
    Ok(response
        .products
        .into_iter()
        .map(Product::into_candidate)
        .collect())
}
