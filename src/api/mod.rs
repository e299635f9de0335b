//! HTTP client for the anti-waste catalog API
//!
//! Two endpoints are used:
//! - `GET {base}{endpoint}` returns the whole catalog
//! - `GET {base}/{category}` returns the products of one category

use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::Value;
use thiserror::Error;

use crate::config::ResolvedConfig;

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Could not build HTTP client: {0}")]
    Client(#[source] reqwest::Error),

    #[error("Invalid URL {url}: {source}")]
    InvalidUrl {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("Request to {url} failed: {source}")]
    Request {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("Malformed JSON from {url}: {source}")]
    Decode {
        url: String,
        #[source]
        source: serde_json::Error,
    },
}

/// A single listed item
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Product {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub description: String,
}

/// The full catalog returned by the base endpoint.
///
/// Each field is read on its own, so a bad or missing field only affects the
/// operation that uses it.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Catalog {
    /// `waste-count` as text, `None` when absent or not a scalar
    pub waste_count: Option<String>,

    /// Raw `waste-receipes`, decoded on demand by [`Catalog::receipes`]
    pub waste_receipes: Option<Value>,

    /// Anything other than an array becomes an empty list. Scalars inside the
    /// array are kept as their text form, nulls and nested values are dropped.
    pub categories: Vec<String>,
}

impl Catalog {
    /// Decode the recipe list. Fails when it is missing or not a list of products.
    pub fn receipes(&self) -> Result<Vec<Product>, serde_json::Error> {
        serde_json::from_value(self.waste_receipes.clone().unwrap_or(Value::Null))
    }
}

impl From<Value> for Catalog {
    fn from(value: Value) -> Self {
        let mut fields = match value {
            Value::Object(fields) => fields,
            _ => return Catalog::default(),
        };

        let categories = match fields.remove("categories") {
            Some(Value::Array(items)) => items.into_iter().filter_map(scalar_text).collect(),
            _ => Vec::new(),
        };

        Catalog {
            waste_count: fields.remove("waste-count").and_then(scalar_text),
            waste_receipes: fields.remove("waste-receipes"),
            categories,
        }
    }
}

fn scalar_text(value: Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

pub struct CatalogClient {
    http: reqwest::Client,
    api_base: String,
    catalog_url: String,
}

impl CatalogClient {
    pub fn new(config: &ResolvedConfig) -> Result<Self, ApiError> {
        let http = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(ApiError::Client)?;

        Ok(Self {
            http,
            api_base: config.api_base.clone(),
            catalog_url: config.catalog_url(),
        })
    }

    pub fn catalog_url(&self) -> &str {
        &self.catalog_url
    }

    /// URL of the category endpoint, with the name percent-encoded as one path segment
    pub fn category_url(&self, category: &str) -> String {
        format!("{}/{}", self.api_base, urlencoding::encode(category))
    }

    pub async fn fetch_catalog(&self) -> Result<Catalog, ApiError> {
        let value: Value = self.get_json(&self.catalog_url).await?;
        Ok(Catalog::from(value))
    }

    pub async fn fetch_category(&self, category: &str) -> Result<Vec<Product>, ApiError> {
        let url = self.category_url(category);
        self.get_json(&url).await
    }

    async fn get_json<T: DeserializeOwned>(&self, url: &str) -> Result<T, ApiError> {
        let request = self.http.get(url).build().map_err(|source| ApiError::InvalidUrl {
            url: url.to_string(),
            source,
        })?;

        let response = self.http.execute(request).await.map_err(|source| ApiError::Request {
            url: url.to_string(),
            source,
        })?;

        // The body is decoded whatever the status
        let status = response.status();
        if !status.is_success() {
            tracing::debug!("{} answered {}", url, status);
        }

        let body = response.bytes().await.map_err(|source| ApiError::Request {
            url: url.to_string(),
            source,
        })?;

        serde_json::from_slice(&body).map_err(|source| ApiError::Decode {
            url: url.to_string(),
            source,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn client_for(server: &MockServer) -> CatalogClient {
        let config = ResolvedConfig {
            api_base: server.uri(),
            ..ResolvedConfig::default()
        };
        CatalogClient::new(&config).unwrap()
    }

    #[test]
    fn test_catalog_decoding() {
        let catalog = Catalog::from(json!({
            "waste-count": 12,
            "waste-receipes": [
                { "title": "Soupe", "description": "Fanes de radis" },
                { "title": "Pain perdu" }
            ],
            "categories": ["Fruits", "Légumes"]
        }));

        assert_eq!(catalog.waste_count.as_deref(), Some("12"));
        let receipes = catalog.receipes().unwrap();
        assert_eq!(receipes.len(), 2);
        assert_eq!(receipes[1].description, "");
        assert_eq!(catalog.categories, vec!["Fruits", "Légumes"]);
    }

    #[test]
    fn test_count_accepts_any_scalar() {
        let count = |value| Catalog::from(json!({ "waste-count": value })).waste_count;

        assert_eq!(count(json!("12")), Some("12".to_string()));
        assert_eq!(count(json!(4.5)), Some("4.5".to_string()));
        assert_eq!(count(json!(false)), Some("false".to_string()));
        assert_eq!(count(json!(null)), None);
        assert_eq!(count(json!([1])), None);
    }

    #[test]
    fn test_categories_coerced_when_not_an_array() {
        for categories in [json!(null), json!("Fruits"), json!({ "a": 1 }), json!(3)] {
            let catalog = Catalog::from(json!({
                "waste-receipes": [],
                "categories": categories
            }));
            assert!(catalog.categories.is_empty());
        }

        let catalog = Catalog::from(json!({ "waste-receipes": [] }));
        assert!(catalog.categories.is_empty());
        assert_eq!(catalog.waste_count, None);

        assert_eq!(Catalog::from(json!(["not", "an", "object"])), Catalog::default());
    }

    #[test]
    fn test_category_scalars_stringified() {
        let catalog = Catalog::from(json!({
            "waste-receipes": [],
            "categories": ["Pain", 7, true, null, ["nested"]]
        }));
        assert_eq!(catalog.categories, vec!["Pain", "7", "true"]);
    }

    #[test]
    fn test_missing_recipes_only_fail_recipes() {
        let catalog = Catalog::from(json!({ "waste-count": 4, "categories": ["A", "B"] }));

        assert!(catalog.receipes().is_err());
        assert_eq!(catalog.waste_count.as_deref(), Some("4"));
        assert_eq!(catalog.categories, vec!["A", "B"]);

        let catalog = Catalog::from(json!({ "waste-receipes": { "title": "Soupe" } }));
        assert!(catalog.receipes().is_err());
    }

    #[test]
    fn test_category_url_is_percent_encoded() {
        let config = ResolvedConfig {
            api_base: "http://localhost:3004".to_string(),
            ..ResolvedConfig::default()
        };
        let client = CatalogClient::new(&config).unwrap();

        assert_eq!(
            client.category_url("Fruits & Légumes"),
            "http://localhost:3004/Fruits%20%26%20L%C3%A9gumes"
        );
        assert_eq!(client.category_url("a/b"), "http://localhost:3004/a%2Fb");
    }

    #[tokio::test]
    async fn test_fetch_catalog() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/antigaspi"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "waste-count": 3,
                "waste-receipes": [{ "title": "Compote", "description": "Pommes abîmées" }],
                "categories": ["Fruits"]
            })))
            .expect(1)
            .mount(&server)
            .await;

        let catalog = client_for(&server).fetch_catalog().await.unwrap();
        assert_eq!(catalog.receipes().unwrap()[0].title, "Compote");
        assert_eq!(catalog.categories, vec!["Fruits"]);
    }

    #[tokio::test]
    async fn test_fetch_category_hits_encoded_path() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/Fruits%20%26%20L%C3%A9gumes"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([
                { "title": "Smoothie", "description": "Bananes mûres" }
            ])))
            .expect(1)
            .mount(&server)
            .await;

        let products = client_for(&server)
            .fetch_category("Fruits & Légumes")
            .await
            .unwrap();
        assert_eq!(
            products,
            vec![Product {
                title: "Smoothie".to_string(),
                description: "Bananes mûres".to_string(),
            }]
        );
    }

    #[tokio::test]
    async fn test_error_status_without_json_body() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&server)
            .await;

        let err = client_for(&server).fetch_catalog().await.unwrap_err();
        assert!(matches!(err, ApiError::Decode { .. }));
    }

    #[tokio::test]
    async fn test_error_status_body_is_still_decoded() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/Pain"))
            .respond_with(ResponseTemplate::new(404).set_body_json(json!([
                { "title": "Croutons", "description": "Pain sec" }
            ])))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/antigaspi"))
            .respond_with(ResponseTemplate::new(500).set_body_json(json!({ "waste-count": 2 })))
            .mount(&server)
            .await;
        let client = client_for(&server);

        let products = client.fetch_category("Pain").await.unwrap();
        assert_eq!(products.len(), 1);
        assert_eq!(products[0].title, "Croutons");

        let catalog = client.fetch_catalog().await.unwrap();
        assert_eq!(catalog.waste_count.as_deref(), Some("2"));
    }

    #[tokio::test]
    async fn test_malformed_json() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/Pain"))
            .respond_with(ResponseTemplate::new(200).set_body_string("{ \"title\": \"not a list\" }"))
            .mount(&server)
            .await;

        let err = client_for(&server).fetch_category("Pain").await.unwrap_err();
        assert!(matches!(err, ApiError::Decode { .. }));
    }
}
