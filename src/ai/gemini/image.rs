//! Campaign image synthesis via Gemini multimodal generation.
//!
//! One call per pose: a composed consistency instruction followed by the
//! hero and selling-item reference images as inline parts, in that order.

use super::client::GeminiHttpClient;
use super::types::{Content, GenerateContentResponse, InlineData, Part};
use crate::ai::ImageSynthesisService;
use crate::models::{GenerationRequest, ProviderSettings};
use crate::{prompts, retry, Error, Result};
use async_trait::async_trait;
use serde::Serialize;
use std::time::Duration;

/// Campaign shots are portrait-framed.
const ASPECT_RATIO: &str = "3:4";

#[derive(Debug, Serialize)]
struct ImageRequest {
    contents: Vec<Content>,
    #[serde(rename = "generationConfig")]
    generation_config: ImageGenerationConfig,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct ImageGenerationConfig {
    response_modalities: Vec<String>,
    image_config: ImageConfig,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct ImageConfig {
    aspect_ratio: String,
}

pub struct GeminiImageSynthesizer {
    http: GeminiHttpClient,
}

impl GeminiImageSynthesizer {
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
                Duration::from_secs(120),
                client,
            )?,
        })
    }

    fn build_request(request: &GenerationRequest) -> ImageRequest {
        let instruction = prompts::render(
            prompts::CAMPAIGN_IMAGE,
            &[
                ("master_prompt", request.master_prompt.as_str()),
                ("pose_directive", request.pose_directive.as_str()),
            ],
        );

        ImageRequest {
            contents: vec![Content {
                role: None,
                parts: vec![
                    Part::Text { text: instruction },
                    // Hero first, selling item second; the instruction text
                    // refers to them by position.
                    Part::InlineData {
                        inline_data: InlineData {
                            mime_type: request.hero.mime_type.clone(),
                            data: request.hero.to_base64(),
                        },
                    },
                    Part::InlineData {
                        inline_data: InlineData {
                            mime_type: request.item.mime_type.clone(),
                            data: request.item.to_base64(),
                        },
                    },
                ],
            }],
            generation_config: ImageGenerationConfig {
                response_modalities: vec!["IMAGE".to_string()],
                image_config: ImageConfig {
                    aspect_ratio: ASPECT_RATIO.to_string(),
                },
            },
        }
    }

    /// First inline-data part in the response, as a displayable data URI.
    fn extract_image(response: &GenerateContentResponse) -> Result<String> {
        let inline = response
            .candidates
            .first()
            .and_then(|c| {
                c.content.parts.iter().find_map(|p| match p {
                    Part::InlineData { inline_data } => Some(inline_data),
                    _ => None,
                })
            })
            .ok_or(Error::NoImageReturned)?;

        Ok(format!("data:{};base64,{}", inline.mime_type, inline.data))
    }
}

#[async_trait]
impl ImageSynthesisService for GeminiImageSynthesizer {
    async fn generate_campaign_image(&self, request: &GenerationRequest) -> Result<String> {
        let wire_request = Self::build_request(request);

        let http = &self.http;
        let wire_request = &wire_request;
        retry::with_retry(
            move || async move {
                let response: GenerateContentResponse =
                    http.generate_content(wire_request).await?;
                Self::extract_image(&response)
            },
            retry::DEFAULT_MAX_RETRIES,
            retry::DEFAULT_BASE_DELAY,
        )
        .await
    }
}
