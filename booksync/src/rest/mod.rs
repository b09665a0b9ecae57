pub mod endpoints;

use reqwest::Client;
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;

use crate::error::{Result, SyncError};

/// Raw text outcome of a request that reached the server.
///
/// Status checks interpret non-success bodies themselves, so they use this
/// instead of [`BookHttpClient::get_json`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextResponse {
    pub ok: bool,
    pub status: u16,
    pub text: String,
}

/// HTTP client wrapper for the book server API.
#[derive(Debug, Clone)]
pub struct BookHttpClient {
    client: Client,
    base_url: String,
}

impl BookHttpClient {
    pub fn new(base_url: &str) -> Self {
        Self {
            client: Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// GET a text resource. Only transport failures are errors.
    pub async fn get_text(&self, path: &str) -> Result<TextResponse> {
        let resp = self
            .client
            .get(self.url(path))
            .header("cache-control", "no-store")
            .send()
            .await?;

        let status = resp.status();
        let text = resp.text().await?;
        Ok(TextResponse {
            ok: status.is_success(),
            status: status.as_u16(),
            text,
        })
    }

    /// GET a JSON resource.
    pub async fn get_json<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, &str)],
    ) -> Result<T> {
        let url = self.url(path);
        let resp = self
            .client
            .get(&url)
            .query(query)
            .header("cache-control", "no-store")
            .send()
            .await?;

        if !resp.status().is_success() {
            let status = resp.status().as_u16();
            let body = resp.text().await.unwrap_or_default();
            return Err(SyncError::Http {
                status,
                message: body,
            });
        }

        let body = resp.text().await?;
        serde_json::from_str(&body).map_err(|_| SyncError::Decode { url, body })
    }

    /// POST a JSON body and return the JSON answer.
    ///
    /// A success response that is not JSON is handed back as
    /// `{"message": <body>}`.
    pub async fn post_json<B: Serialize + ?Sized>(&self, path: &str, body: &B) -> Result<Value> {
        let resp = self.client.post(self.url(path)).json(body).send().await?;

        if !resp.status().is_success() {
            let status = resp.status().as_u16();
            let body = resp.text().await.unwrap_or_default();
            return Err(SyncError::Http {
                status,
                message: body,
            });
        }

        let text = resp.text().await?;
        Ok(serde_json::from_str(&text).unwrap_or_else(|_| serde_json::json!({ "message": text })))
    }

    /// Get the base URL.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }
}
