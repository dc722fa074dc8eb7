//! AI service integration for pose planning and campaign image synthesis
//!
//! Provides Gemini-backed implementations plus injectable mocks for the two
//! generation capabilities the campaign workflow needs.

pub mod gemini;
pub mod mime;
pub mod mock;

pub use gemini::{GeminiImageSynthesizer, GeminiPosePlanner};
pub use mock::{MockImageSynthesizer, MockPosePlanner};

use crate::models::{GenerationRequest, PoseSet};
use crate::Result;
use async_trait::async_trait;

/// Plans the six pose directives for a master prompt.
#[async_trait]
pub trait PosePlanningService: Send + Sync {
    async fn suggest_poses(&self, master_prompt: &str) -> Result<PoseSet>;
}

/// Produces one composite campaign image for a pose directive.
///
/// The success value is a displayable `data:` URI.
#[async_trait]
pub trait ImageSynthesisService: Send + Sync {
    async fn generate_campaign_image(&self, request: &GenerationRequest) -> Result<String>;
}
