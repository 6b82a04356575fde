use reqwest::{Client, Response};
use serde::{de::DeserializeOwned, Serialize};
use std::time::Duration;

use crate::ports::{GatewayResult, TransportError};

pub struct CommentsClient {
    client: Client,
    base_url: String,
}

impl CommentsClient {
    pub fn new(base_url: &str, timeout: Duration) -> GatewayResult<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .user_agent(concat!("comment-hub/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| TransportError::Network(format!("Failed to create HTTP client: {e}")))?;

        // Resource paths are relative to the collection, which needs a trailing slash.
        let base_url = format!("{}/", base_url.trim_end_matches('/'));

        Ok(Self { client, base_url })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    pub async fn get<T: DeserializeOwned>(&self, path: &str) -> GatewayResult<T> {
        let url = self.url(path);
        tracing::debug!("GET {}", url);

        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| TransportError::Network(e.to_string()))?;

        self.handle_response(response).await
    }

    pub async fn post<T: DeserializeOwned, R: Serialize>(
        &self,
        path: &str,
        body: &R,
    ) -> GatewayResult<T> {
        let url = self.url(path);
        tracing::debug!("POST {}", url);

        let response = self
            .client
            .post(&url)
            .json(body)
            .send()
            .await
            .map_err(|e| TransportError::Network(e.to_string()))?;

        self.handle_response(response).await
    }

    pub async fn patch<T: DeserializeOwned, R: Serialize>(
        &self,
        path: &str,
        body: &R,
    ) -> GatewayResult<T> {
        let url = self.url(path);
        tracing::debug!("PATCH {}", url);

        let response = self
            .client
            .patch(&url)
            .json(body)
            .send()
            .await
            .map_err(|e| TransportError::Network(e.to_string()))?;

        self.handle_response(response).await
    }

    /// DELETE ignores whatever body the server sends back.
    pub async fn delete(&self, path: &str) -> GatewayResult<()> {
        let url = self.url(path);
        tracing::debug!("DELETE {}", url);

        let response = self
            .client
            .delete(&url)
            .send()
            .await
            .map_err(|e| TransportError::Network(e.to_string()))?;

        Self::ensure_success(response).await.map(|_| ())
    }

    async fn handle_response<T: DeserializeOwned>(&self, response: Response) -> GatewayResult<T> {
        let response = Self::ensure_success(response).await?;

        let response_text = response
            .text()
            .await
            .map_err(|e| TransportError::Network(e.to_string()))?;

        tracing::debug!("API Response: {}", response_text);

        serde_json::from_str(&response_text).map_err(|e| {
            TransportError::Decode(format!(
                "Failed to parse response: {}. Response was: {}",
                e, response_text
            ))
        })
    }

    async fn ensure_success(response: Response) -> GatewayResult<Response> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let body = response
            .text()
            .await
            .unwrap_or_else(|_| "Unknown error".to_string());
        Err(TransportError::Status {
            status: status.as_u16(),
            body,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_base_url_gets_trailing_slash() {
        let client =
            CommentsClient::new("http://localhost:8000/api/comments", Duration::from_secs(5))
                .unwrap();
        assert_eq!(client.base_url(), "http://localhost:8000/api/comments/");
        assert_eq!(client.url("7/"), "http://localhost:8000/api/comments/7/");

        let client =
            CommentsClient::new("http://localhost:8000/api/comments//", Duration::from_secs(5))
                .unwrap();
        assert_eq!(client.base_url(), "http://localhost:8000/api/comments/");
    }
}
