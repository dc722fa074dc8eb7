use crate::models::ProviderSettings;
use crate::{Error, Result};
use reqwest::Client;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::time::Duration;

const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com";

/// Lightweight Gemini REST client used by the pose and image modules.
///
/// Construction resolves the API key (explicit settings first) and fails
/// with `MissingCredential` before any network call when none is
/// configured. A `base_url` override is passed through verbatim.
pub struct GeminiHttpClient {
    client: Client,
    api_key: String,
    model: String,
    base_url: String,
    timeout: Duration,
}

impl GeminiHttpClient {
    /// Construct a Gemini client.
    ///
    /// `model` should be the bare model ID (for example
    /// `gemini-2.5-flash-image`), not a `models/...`-prefixed path segment.
    pub fn new(settings: &ProviderSettings, model: String, timeout: Duration) -> Result<Self> {
        Self::new_with_client(settings, model, timeout, Client::new())
    }

    pub fn new_with_client(
        settings: &ProviderSettings,
        model: String,
        timeout: Duration,
        client: Client,
    ) -> Result<Self> {
        let api_key = settings.require_key()?.to_string();
        let model = model.strip_prefix("models/").unwrap_or(&model).to_string();
        let base_url = settings
            .base_url
            .clone()
            .unwrap_or_else(|| DEFAULT_BASE_URL.to_string());

        Ok(Self {
            client,
            api_key,
            model,
            base_url,
            timeout,
        })
    }

    /// Returns the configured model ID without the `models/` prefix.
    pub fn model(&self) -> &str {
        &self.model
    }

    /// Calls Gemini's `generateContent` endpoint.
    pub async fn generate_content<Req: Serialize, Resp: DeserializeOwned>(
        &self,
        request: &Req,
    ) -> Result<Resp> {
        let url = format!(
            "{}/v1beta/models/{}:generateContent",
            self.base_url, self.model
        );
        let response = self
            .client
            .post(&url)
            .timeout(self.timeout)
            .header("x-goog-api-key", &self.api_key)
            .header("Content-Type", "application/json")
            .json(request)
            .send()
            .await
            .map_err(|e| {
                tracing::error!("Failed to send request to Gemini: {}", e);
                e
            })?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response.text().await?;
            tracing::error!("Gemini API error (status {}): {}", status, error_text);
            return Err(Error::Provider {
                status: Some(status.as_u16()),
                message: format!("Gemini API error (status {}): {}", status, error_text),
            });
        }

        let body = response.text().await?;
        serde_json::from_str(&body).map_err(|e| {
            tracing::error!("Failed to parse Gemini response: {}\nBody: {}", e, body);
            Error::Provider {
                status: None,
                message: format!("Failed to parse Gemini response: {}", e),
            }
        })
    }
}
