//! HTTP client for the hosted document store.
//!
//! The store exposes one REST collection per document type:
//!
//! ```text
//! GET    /{collection}?field=value      filtered listing
//! GET    /{collection}/{id}             single document
//! PUT    /{collection}/{id}             upsert
//! POST   /{collection}:batchUpsert      bulk upsert (array body)
//! DELETE /{collection}/{id}
//! ```
//!
//! The in-memory conflict index is authoritative for scheduling; this client
//! only loads state at startup and trails committed mutations.

use std::time::Duration;

use reqwest::{Method, RequestBuilder, StatusCode};
use serde::{de::DeserializeOwned, Serialize};

use crate::{config::StoreConfig, error::AppResult};

#[derive(Debug, Clone)]
pub struct StoreClient {
    http: reqwest::Client,
    base_url: String,
    api_key: Option<String>,
}

impl StoreClient {
    pub fn new(config: &StoreConfig) -> AppResult<Self> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .user_agent(concat!("quadrangle-server/", env!("CARGO_PKG_VERSION")))
            .build()?;
        Ok(Self {
            http,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            api_key: config.api_key.clone(),
        })
    }

    fn request(&self, method: Method, path: &str) -> RequestBuilder {
        let builder = self.http.request(method, format!("{}/{}", self.base_url, path));
        match &self.api_key {
            Some(key) => builder.bearer_auth(key),
            None => builder,
        }
    }

    /// List documents matching all equality filters
    pub async fn list<T: DeserializeOwned>(
        &self,
        collection: &str,
        filters: &[(&str, String)],
    ) -> AppResult<Vec<T>> {
        let response = self
            .request(Method::GET, collection)
            .query(filters)
            .send()
            .await?
            .error_for_status()?;
        Ok(response.json().await?)
    }

    /// Fetch one document, `None` when the store has no such id
    pub async fn get<T: DeserializeOwned>(
        &self,
        collection: &str,
        id: &str,
    ) -> AppResult<Option<T>> {
        let response = self
            .request(Method::GET, &format!("{}/{}", collection, id))
            .send()
            .await?;
        if response.status() == StatusCode::NOT_FOUND {
            return Ok(None);
        }
        let response = response.error_for_status()?;
        Ok(Some(response.json().await?))
    }

    /// Upsert one document under the given id
    pub async fn upsert<T: Serialize + ?Sized>(
        &self,
        collection: &str,
        id: &str,
        document: &T,
    ) -> AppResult<()> {
        self.request(Method::PUT, &format!("{}/{}", collection, id))
            .json(document)
            .send()
            .await?
            .error_for_status()?;
        Ok(())
    }

    /// Upsert a batch of documents in one round trip
    pub async fn upsert_many<T: Serialize>(
        &self,
        collection: &str,
        documents: &[T],
    ) -> AppResult<()> {
        self.request(Method::POST, &format!("{}:batchUpsert", collection))
            .json(documents)
            .send()
            .await?
            .error_for_status()?;
        Ok(())
    }

    /// Delete one document; deleting an absent id is not an error
    pub async fn delete(&self, collection: &str, id: &str) -> AppResult<()> {
        let response = self
            .request(Method::DELETE, &format!("{}/{}", collection, id))
            .send()
            .await?;
        if response.status() == StatusCode::NOT_FOUND {
            return Ok(());
        }
        response.error_for_status()?;
        Ok(())
    }
}
