use async_trait::async_trait;
use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;

use crate::errors::{AppError, AppResult};

/// Opaque image hosting: payloads go in, stable references come out.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait MediaHost: Send + Sync {
    async fn upload(&self, payload: &str) -> AppResult<String>;
    async fn delete(&self, reference: &str) -> AppResult<()>;
}

/// Best-effort delete: a failing media host is logged and never reaches the
/// caller.
pub async fn discard_best_effort(media: &dyn MediaHost, reference: &str) {
    if let Err(e) = media.delete(reference).await {
        log::warn!("Failed to delete media {}: {}", reference, e);
    }
}

#[derive(Debug, Deserialize)]
struct UploadResponse {
    url: String,
}

pub struct HttpMediaHost {
    client: reqwest::Client,
    base_url: String,
    api_key: SecretString,
}

impl HttpMediaHost {
    pub fn new(base_url: &str, api_key: SecretString) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key,
        }
    }

    fn endpoint(&self, action: &str) -> String {
        format!("{}/{}", self.base_url, action)
    }

    async fn post(&self, action: &str, body: serde_json::Value) -> AppResult<reqwest::Response> {
        let response = self
            .client
            .post(self.endpoint(action))
            .bearer_auth(self.api_key.expose_secret())
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(AppError::UpstreamFailure(format!(
                "Media host {} returned {}",
                action, status
            )));
        }

        Ok(response)
    }
}

#[async_trait]
impl MediaHost for HttpMediaHost {
    async fn upload(&self, payload: &str) -> AppResult<String> {
        let response = self
            .post("upload", serde_json::json!({ "file": payload }))
            .await?;
        let uploaded: UploadResponse = response.json().await?;

        log::debug!("Uploaded media to {}", uploaded.url);
        Ok(uploaded.url)
    }

    async fn delete(&self, reference: &str) -> AppResult<()> {
        self.post("delete", serde_json::json!({ "url": reference }))
            .await?;
        Ok(())
    }
}
