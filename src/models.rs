//! Data models and structures
//!
//! Core types for campaign generation: reference image blobs, the fixed
//! six-pose set, per-run results, and environment configuration.

use crate::ai::mime::detect_image_mime;
use crate::{Error, Result};
use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine as _;
use serde::Serialize;

/// Every campaign plans and renders exactly this many poses.
pub const POSE_COUNT: usize = 6;

/// Fallback pose directives used when the planner cannot produce a valid
/// set. Stable across the application; order matches the fixed shot
/// categories (full-body, close-up, dynamic, seated, back-view, portrait).
const FALLBACK_POSES: [&str; POSE_COUNT] = [
    "Full body shot standing confidently, showcasing the full outfit.",
    "Close-up detail shot focusing on the upper body and accessories.",
    "Dynamic shot walking towards the camera with movement.",
    "Seated pose, relaxed and engaging with the environment.",
    "Angled view from behind, looking back over the shoulder.",
    "Intense portrait shot looking directly into the lens.",
];

/// A decoded reference image: mime type plus raw bytes.
#[derive(Debug, Clone, PartialEq)]
pub struct ImageBlob {
    pub mime_type: String,
    pub bytes: Vec<u8>,
}

impl ImageBlob {
    /// Decode a `data:<mime>;base64,<payload>` string.
    ///
    /// A missing or malformed header is tolerated: the mime type defaults
    /// to `image/jpeg` and any recognizable `data:image/...;base64,` prefix
    /// is stripped before decoding.
    pub fn from_data_uri(encoded: &str) -> Result<Self> {
        if let Some((mime_type, payload)) = split_data_uri(encoded) {
            return Ok(Self {
                mime_type: mime_type.to_string(),
                bytes: BASE64.decode(payload)?,
            });
        }

        Ok(Self {
            mime_type: "image/jpeg".to_string(),
            bytes: BASE64.decode(strip_image_prefix(encoded))?,
        })
    }

    /// Wrap raw file bytes, sniffing the mime type from magic bytes.
    pub fn from_bytes(bytes: Vec<u8>) -> Self {
        let mime_type = detect_image_mime(&bytes).to_string();
        Self { mime_type, bytes }
    }

    /// Base64 payload for the provider's inline-data wire format.
    pub fn to_base64(&self) -> String {
        BASE64.encode(&self.bytes)
    }

    /// Render as a displayable `data:` URI.
    pub fn to_data_uri(&self) -> String {
        format!("data:{};base64,{}", self.mime_type, self.to_base64())
    }
}

/// Split a well-formed image data URI into `(mime_type, payload)`.
fn split_data_uri(encoded: &str) -> Option<(&str, &str)> {
    let rest = encoded.strip_prefix("data:")?;
    let (mime_type, payload) = rest.split_once(";base64,")?;
    let subtype = mime_type.strip_prefix("image/")?;
    if subtype.is_empty()
        || !subtype.chars().all(|c| c.is_ascii_alphabetic())
        || payload.is_empty()
    {
        return None;
    }
    Some((mime_type, payload))
}

/// Strip a `data:image/<alpha>;base64,` prefix if one partially matches,
/// otherwise return the input unchanged.
fn strip_image_prefix(encoded: &str) -> &str {
    if let Some(rest) = encoded.strip_prefix("data:") {
        if let Some((mime_type, payload)) = rest.split_once(";base64,") {
            let recognizable = mime_type
                .strip_prefix("image/")
                .is_some_and(|s| !s.is_empty() && s.chars().all(|c| c.is_ascii_alphabetic()));
            if recognizable {
                return payload;
            }
        }
    }
    encoded
}

/// Input to one image synthesis call. Treated as immutable once built.
#[derive(Debug, Clone)]
pub struct GenerationRequest {
    pub hero: ImageBlob,
    pub item: ImageBlob,
    pub master_prompt: String,
    pub pose_directive: String,
}

/// Exactly [`POSE_COUNT`] ordered pose directives.
///
/// The constructors enforce the length invariant, so an orchestrator
/// holding a `PoseSet` never has to re-validate it.
#[derive(Debug, Clone, PartialEq)]
pub struct PoseSet(Vec<String>);

impl PoseSet {
    /// Build from provider suggestions. Returns `None` below six entries;
    /// truncates to the first six above, preserving order. Never pads.
    pub fn from_suggestions(suggestions: Vec<String>) -> Option<Self> {
        if suggestions.len() < POSE_COUNT {
            return None;
        }
        let mut poses = suggestions;
        poses.truncate(POSE_COUNT);
        Some(Self(poses))
    }

    /// The fixed fallback set.
    pub fn fallback() -> Self {
        Self(FALLBACK_POSES.iter().map(|s| s.to_string()).collect())
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(String::as_str)
    }

    pub fn as_slice(&self) -> &[String] {
        &self.0
    }
}

/// Aggregate outcome of one campaign run. Created fresh per run.
#[derive(Debug, Clone, Serialize)]
pub struct CampaignResult {
    /// Successful images as displayable data URIs, in pose order. Failed
    /// generations are excluded, never placeholder-filled.
    pub images: Vec<String>,
    pub failure_count: usize,
    pub summary_error: Option<String>,
}

// Configuration
#[derive(Debug, Clone)]
pub struct Config {
    pub api_key: Option<String>,
    pub base_url: Option<String>,
    pub pose_model: String,
    pub image_model: String,
}

impl Config {
    pub fn from_env() -> Self {
        dotenvy::dotenv().ok();

        Self {
            api_key: std::env::var("GEMINI_API_KEY").ok(),
            base_url: std::env::var("GEMINI_BASE_URL").ok(),
            pose_model: std::env::var("POSE_MODEL")
                .unwrap_or_else(|_| "gemini-3-flash-preview".to_string()),
            image_model: std::env::var("IMAGE_MODEL")
                .unwrap_or_else(|_| "gemini-2.5-flash-image".to_string()),
        }
    }
}

/// Credential and routing overrides injected into every provider client
/// construction. The core never reads ambient state directly.
#[derive(Debug, Clone, Default)]
pub struct ProviderSettings {
    pub api_key: Option<String>,
    pub base_url: Option<String>,
}

impl ProviderSettings {
    /// Merge explicit caller-supplied values over the process-level
    /// configuration. Explicit values always win.
    pub fn resolve(
        explicit_key: Option<String>,
        explicit_base_url: Option<String>,
        config: &Config,
    ) -> Self {
        Self {
            api_key: explicit_key.or_else(|| config.api_key.clone()),
            base_url: explicit_base_url.or_else(|| config.base_url.clone()),
        }
    }

    /// The resolved API key, or `MissingCredential` if none is configured.
    pub fn require_key(&self) -> Result<&str> {
        self.api_key.as_deref().ok_or(Error::MissingCredential)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn test_config() -> Config {
        Config {
            api_key: Some("env-key".to_string()),
            base_url: None,
            pose_model: "pose-model".to_string(),
            image_model: "image-model".to_string(),
        }
    }

    #[test]
    fn test_data_uri_with_header() {
        let blob = ImageBlob::from_data_uri("data:image/png;base64,AQID").unwrap();
        assert_eq!(blob.mime_type, "image/png");
        assert_eq!(blob.bytes, vec![1, 2, 3]);
    }

    #[test]
    fn test_data_uri_without_header_defaults_to_jpeg() {
        let blob = ImageBlob::from_data_uri("AQID").unwrap();
        assert_eq!(blob.mime_type, "image/jpeg");
        assert_eq!(blob.bytes, vec![1, 2, 3]);
    }

    #[test]
    fn test_data_uri_empty_payload_still_strips_prefix() {
        // An empty payload fails strict parsing, but the prefix is still
        // recognizable and gets stripped on the fallback path.
        let blob = ImageBlob::from_data_uri("data:image/png;base64,").unwrap();
        assert_eq!(blob.mime_type, "image/jpeg");
        assert!(blob.bytes.is_empty());
    }

    #[test]
    fn test_data_uri_non_alpha_subtype_falls_back() {
        let err = ImageBlob::from_data_uri("data:image/svg+xml;base64,AQID").unwrap_err();
        // Prefix is not recognizable, the whole string hits the decoder.
        assert!(matches!(err, Error::Decode(_)));
    }

    #[test]
    fn test_data_uri_roundtrip() {
        let blob = ImageBlob {
            mime_type: "image/webp".to_string(),
            bytes: vec![9, 8, 7],
        };
        let reparsed = ImageBlob::from_data_uri(&blob.to_data_uri()).unwrap();
        assert_eq!(reparsed, blob);
    }

    #[test]
    fn test_from_bytes_sniffs_mime() {
        let blob = ImageBlob::from_bytes(vec![0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A]);
        assert_eq!(blob.mime_type, "image/png");
    }

    #[test]
    fn test_pose_set_rejects_short_lists() {
        assert!(PoseSet::from_suggestions(vec![]).is_none());
        let five = (0..5).map(|i| format!("pose {}", i)).collect();
        assert!(PoseSet::from_suggestions(five).is_none());
    }

    #[test]
    fn test_pose_set_truncates_to_six_preserving_order() {
        let eight: Vec<String> = (0..8).map(|i| format!("pose {}", i)).collect();
        let set = PoseSet::from_suggestions(eight).unwrap();
        let expected: Vec<String> = (0..6).map(|i| format!("pose {}", i)).collect();
        assert_eq!(set.as_slice(), expected.as_slice());
    }

    #[test]
    fn test_fallback_pose_set_has_six_entries() {
        let set = PoseSet::fallback();
        assert_eq!(set.as_slice().len(), POSE_COUNT);
        assert!(set.iter().all(|pose| !pose.is_empty()));
    }

    #[test]
    fn test_settings_explicit_key_wins() {
        let settings =
            ProviderSettings::resolve(Some("explicit-key".to_string()), None, &test_config());
        assert_eq!(settings.require_key().unwrap(), "explicit-key");
    }

    #[test]
    fn test_settings_fall_back_to_config_key() {
        let settings = ProviderSettings::resolve(None, None, &test_config());
        assert_eq!(settings.require_key().unwrap(), "env-key");
    }

    #[test]
    fn test_settings_missing_key_fails() {
        let config = Config {
            api_key: None,
            ..test_config()
        };
        let settings = ProviderSettings::resolve(None, None, &config);
        assert!(matches!(
            settings.require_key(),
            Err(Error::MissingCredential)
        ));
    }

    #[test]
    fn test_settings_base_url_precedence() {
        let config = Config {
            base_url: Some("https://config-proxy.example".to_string()),
            ..test_config()
        };
        let settings =
            ProviderSettings::resolve(None, Some("https://cli-proxy.example".to_string()), &config);
        assert_eq!(settings.base_url.as_deref(), Some("https://cli-proxy.example"));

        let settings = ProviderSettings::resolve(None, None, &config);
        assert_eq!(
            settings.base_url.as_deref(),
            Some("https://config-proxy.example")
        );
    }
}
