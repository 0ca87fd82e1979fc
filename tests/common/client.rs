//! HTTP client for end-to-end tests
//!
//! Wraps reqwest with one method per library endpoint.
//! When API routes or request formats change, update only this file.

use super::constants::*;
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION};
use reqwest::Response;
use serde_json::{json, Value};
use std::time::Duration;

pub struct TestClient {
    /// The underlying reqwest client (public for custom requests in tests)
    pub client: reqwest::Client,
    /// The base URL of the test server
    pub base_url: String,
}

impl TestClient {
    /// Creates an anonymous client
    pub fn new(base_url: String) -> Self {
        Self::with_headers(base_url, HeaderMap::new())
    }

    /// Creates a client sending `token` in the Authorization header
    pub fn authenticated(base_url: String, token: &str) -> Self {
        let mut headers = HeaderMap::new();
        headers.insert(
            AUTHORIZATION,
            HeaderValue::from_str(&format!("Bearer {}", token)).expect("Invalid token"),
        );
        Self::with_headers(base_url, headers)
    }

    fn with_headers(base_url: String, headers: HeaderMap) -> Self {
        let client = reqwest::Client::builder()
            .cookie_store(true)
            .default_headers(headers)
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()
            .expect("Failed to build reqwest client");

        Self { client, base_url }
    }

    pub async fn home(&self) -> Response {
        self.client
            .get(format!("{}/", self.base_url))
            .send()
            .await
            .expect("Home request failed")
    }

    // ========================================================================
    // Library Entries
    // ========================================================================

    /// GET /v1/library-entries with the given query parameters
    pub async fn list_entries(&self, query: &[(&str, &str)]) -> Response {
        self.client
            .get(format!("{}/v1/library-entries", self.base_url))
            .query(query)
            .send()
            .await
            .expect("List entries request failed")
    }

    /// Lists entries and returns (ids, total_count), asserting a 200
    pub async fn list_entry_ids(&self, query: &[(&str, &str)]) -> (Vec<usize>, usize) {
        let response = self.list_entries(query).await;
        assert_eq!(response.status(), reqwest::StatusCode::OK);
        let body: Value = response.json().await.expect("Invalid list body");
        let ids = body["data"]
            .as_array()
            .expect("Missing data array")
            .iter()
            .map(|e| e["id"].as_u64().expect("Missing id") as usize)
            .collect();
        let total_count = body["total_count"].as_u64().expect("Missing total_count") as usize;
        (ids, total_count)
    }

    pub async fn get_entry(&self, id: usize) -> Response {
        self.client
            .get(format!("{}/v1/library-entries/{}", self.base_url, id))
            .send()
            .await
            .expect("Get entry request failed")
    }

    pub async fn create_entry(&self, body: Value) -> Response {
        self.client
            .post(format!("{}/v1/library-entries", self.base_url))
            .json(&body)
            .send()
            .await
            .expect("Create entry request failed")
    }

    /// Creates an entry with default fields and returns its id, asserting a 201
    pub async fn track(&self, media_type: &str, media_id: usize, private: bool) -> usize {
        let response = self
            .create_entry(json!({
                "media_type": media_type,
                "media_id": media_id,
                "status": "current",
                "private": private,
            }))
            .await;
        assert_eq!(response.status(), reqwest::StatusCode::CREATED);
        let body: Value = response.json().await.expect("Invalid entry body");
        body["id"].as_u64().expect("Missing id") as usize
    }

    pub async fn update_entry(&self, id: usize, body: Value) -> Response {
        self.client
            .patch(format!("{}/v1/library-entries/{}", self.base_url, id))
            .json(&body)
            .send()
            .await
            .expect("Update entry request failed")
    }

    pub async fn delete_entry(&self, id: usize) -> Response {
        self.client
            .delete(format!("{}/v1/library-entries/{}", self.base_url, id))
            .send()
            .await
            .expect("Delete entry request failed")
    }
}
