//! Pose planning via Gemini structured output.
//!
//! One `generateContent` call asks the model for exactly six pose strings
//! as a JSON array. Provider failure after retries degrades to the fixed
//! fallback set; only credential resolution errors surface to the caller
//! (from construction, so the UI can redirect the user to settings).

use super::client::GeminiHttpClient;
use super::types::{Content, GenerateContentResponse, Part};
use crate::ai::PosePlanningService;
use crate::models::{PoseSet, ProviderSettings};
use crate::{prompts, retry, Error, Result};
use async_trait::async_trait;
use serde::Serialize;
use std::time::Duration;

#[derive(Debug, Serialize)]
struct PoseRequest {
    contents: Vec<Content>,
    #[serde(rename = "generationConfig")]
    generation_config: PoseGenerationConfig,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct PoseGenerationConfig {
    response_mime_type: String,
    response_schema: Schema,
}

/// Minimal response-schema declaration: the provider is constrained to
/// return a parseable array of strings rather than free text.
#[derive(Debug, Serialize)]
struct Schema {
    #[serde(rename = "type")]
    schema_type: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    items: Option<Box<Schema>>,
}

impl Schema {
    fn string_array() -> Self {
        Self {
            schema_type: "ARRAY".to_string(),
            items: Some(Box::new(Self {
                schema_type: "STRING".to_string(),
                items: None,
            })),
        }
    }
}

pub struct GeminiPosePlanner {
    http: GeminiHttpClient,
}

impl GeminiPosePlanner {
    pub fn new(settings: &ProviderSettings, model: String) -> Result<Self> {
        Self::new_with_client(settings, model, reqwest::Client::new())
    }

    pub fn new_with_client(
        settings: &ProviderSettings,
        model: String,
        client: reqwest::Client,
    ) -> Result<Self> {
        Ok(Self {
            http: GeminiHttpClient::new_with_client(
                settings,
                model,
                Duration::from_secs(30),
                client,
            )?,
        })
    }

    fn extract_text(response: &GenerateContentResponse) -> Option<String> {
        response.candidates.first().and_then(|c| {
            c.content.parts.iter().find_map(|p| match p {
                Part::Text { text } => Some(text.clone()),
                Part::InlineData { .. } => None,
            })
        })
    }

    /// Parse the structured payload. Non-array JSON or fewer than six
    /// entries yields `None`; six or more are truncated to the first six.
    fn parse_poses(text: &str) -> Option<PoseSet> {
        let suggestions: Vec<String> = serde_json::from_str(text).ok()?;
        PoseSet::from_suggestions(suggestions)
    }
}

#[async_trait]
impl PosePlanningService for GeminiPosePlanner {
    async fn suggest_poses(&self, master_prompt: &str) -> Result<PoseSet> {
        let prompt = prompts::render(prompts::POSE_DIRECTOR, &[("master_prompt", master_prompt)]);

        let request = PoseRequest {
            contents: vec![Content {
                role: Some("user".to_string()),
                parts: vec![Part::Text { text: prompt }],
            }],
            generation_config: PoseGenerationConfig {
                response_mime_type: "application/json".to_string(),
                response_schema: Schema::string_array(),
            },
        };

        let http = &self.http;
        let request = &request;
        let attempt = retry::with_retry(
            move || async move {
                let response: GenerateContentResponse = http.generate_content(request).await?;
                Ok::<_, Error>(Self::extract_text(&response))
            },
            retry::DEFAULT_MAX_RETRIES,
            retry::DEFAULT_BASE_DELAY,
        )
        .await;

        let poses = match attempt {
            Ok(Some(text)) => Self::parse_poses(&text).unwrap_or_else(|| {
                tracing::warn!("Pose response was not a six-string JSON array, using fallback poses");
                PoseSet::fallback()
            }),
            Ok(None) => {
                tracing::warn!("No text in pose response, using fallback poses");
                PoseSet::fallback()
            }
            Err(e) => {
                tracing::warn!("Pose planning failed after retries: {}, using fallback poses", e);
                PoseSet::fallback()
            }
        };

        Ok(poses)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ai::gemini::test_support;
    use wiremock::{MockServer, ResponseTemplate};

    const DEFAULT_MODEL: &str = "gemini-3-flash-preview";

    fn make_planner(server: &MockServer) -> GeminiPosePlanner {
        GeminiPosePlanner::new(
            &test_support::settings_for(server, "test-key"),
            DEFAULT_MODEL.to_string(),
        )
        .unwrap()
    }

    fn pose_body(poses: &[&str]) -> serde_json::Value {
        let text = serde_json::to_string(poses).unwrap();
        serde_json::json!({
            "candidates": [{
                "content": { "parts": [{ "text": text }] }
            }]
        })
    }

    #[tokio::test]
    async fn test_six_poses_are_returned_in_order() {
        let server = MockServer::start().await;

        test_support::post_path_regex(test_support::GENERATE_CONTENT_PATH_REGEX)
            .respond_with(
                ResponseTemplate::new(200).set_body_json(pose_body(&["A", "B", "C", "D", "E", "F"])),
            )
            .mount(&server)
            .await;

        let poses = make_planner(&server).suggest_poses("streetwear shoot").await.unwrap();
        assert_eq!(poses.as_slice(), &["A", "B", "C", "D", "E", "F"]);
    }

    #[tokio::test]
    async fn test_extra_poses_are_truncated_to_six() {
        let server = MockServer::start().await;

        test_support::post_path_regex(test_support::GENERATE_CONTENT_PATH_REGEX)
            .respond_with(ResponseTemplate::new(200).set_body_json(pose_body(&[
                "A", "B", "C", "D", "E", "F", "G", "H",
            ])))
            .mount(&server)
            .await;

        let poses = make_planner(&server).suggest_poses("prompt").await.unwrap();
        assert_eq!(poses.as_slice(), &["A", "B", "C", "D", "E", "F"]);
    }

    #[tokio::test]
    async fn test_short_list_falls_back_entirely() {
        let server = MockServer::start().await;

        test_support::post_path_regex(test_support::GENERATE_CONTENT_PATH_REGEX)
            .respond_with(ResponseTemplate::new(200).set_body_json(pose_body(&["A", "B", "C"])))
            .mount(&server)
            .await;

        let poses = make_planner(&server).suggest_poses("prompt").await.unwrap();
        assert_eq!(poses, PoseSet::fallback());
    }

    #[tokio::test]
    async fn test_non_array_payload_falls_back() {
        let server = MockServer::start().await;

        test_support::post_path_regex(test_support::GENERATE_CONTENT_PATH_REGEX)
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "candidates": [{
                    "content": { "parts": [{ "text": "{\"poses\": \"not an array\"}" }] }
                }]
            })))
            .mount(&server)
            .await;

        let poses = make_planner(&server).suggest_poses("prompt").await.unwrap();
        assert_eq!(poses, PoseSet::fallback());
    }

    #[tokio::test]
    async fn test_provider_error_degrades_to_fallback() {
        let server = MockServer::start().await;

        // 400 is non-transient, so no backoff sleeps are involved.
        test_support::post_path_regex(test_support::GENERATE_CONTENT_PATH_REGEX)
            .respond_with(ResponseTemplate::new(400).set_body_string("InvalidArgument"))
            .expect(1)
            .mount(&server)
            .await;

        let poses = make_planner(&server).suggest_poses("prompt").await.unwrap();
        assert_eq!(poses, PoseSet::fallback());
    }

    #[tokio::test]
    async fn test_missing_text_part_falls_back() {
        let server = MockServer::start().await;

        test_support::post_path_regex(test_support::GENERATE_CONTENT_PATH_REGEX)
            .respond_with(
                ResponseTemplate::new(200).set_body_json(serde_json::json!({ "candidates": [] })),
            )
            .mount(&server)
            .await;

        let poses = make_planner(&server).suggest_poses("prompt").await.unwrap();
        assert_eq!(poses, PoseSet::fallback());
    }

    #[tokio::test]
    async fn test_request_declares_json_schema() {
        let server = MockServer::start().await;

        test_support::post_path_regex(test_support::GENERATE_CONTENT_PATH_REGEX)
            .and(wiremock::matchers::body_string_contains(
                "\"responseMimeType\":\"application/json\"",
            ))
            .and(wiremock::matchers::body_string_contains("\"ARRAY\""))
            .and(wiremock::matchers::body_string_contains("\"STRING\""))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(pose_body(&["A", "B", "C", "D", "E", "F"])),
            )
            .expect(1)
            .mount(&server)
            .await;

        make_planner(&server).suggest_poses("prompt").await.unwrap();
    }

    #[test]
    fn test_missing_credential_surfaces_at_construction() {
        let err = GeminiPosePlanner::new(&ProviderSettings::default(), DEFAULT_MODEL.to_string())
            .map(|_| ())
            .unwrap_err();
        assert!(matches!(err, Error::MissingCredential));
    }
}
