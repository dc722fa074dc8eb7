//! Concurrent campaign fan-out and partial-failure aggregation.
//!
//! One synthesis call per pose, all awaited together. A pose failing never
//! cancels or blocks the others; retries happen one layer down in
//! [`crate::retry`], never here. In-flight calls cannot be aborted once a
//! run starts (known gap, see tests).

use crate::ai::ImageSynthesisService;
use crate::error::user_message;
use crate::models::{CampaignResult, GenerationRequest, ImageBlob, PoseSet};
use futures::future::join_all;
use tracing::{info, warn};

pub struct CampaignRunner {
    synthesizer: Box<dyn ImageSynthesisService>,
}

impl CampaignRunner {
    pub fn new(synthesizer: Box<dyn ImageSynthesisService>) -> Self {
        Self { synthesizer }
    }

    /// Run one synthesis per pose and aggregate the settled outcomes.
    ///
    /// Returned images follow input pose order. The summary error is the
    /// first failure's normalized message when every pose fails, a count
    /// of failures on partial success, and absent when all succeed.
    pub async fn run(
        &self,
        hero: &ImageBlob,
        item: &ImageBlob,
        master_prompt: &str,
        poses: &PoseSet,
    ) -> CampaignResult {
        let outcomes = join_all(poses.iter().enumerate().map(|(index, pose)| {
            let request = GenerationRequest {
                hero: hero.clone(),
                item: item.clone(),
                master_prompt: master_prompt.to_string(),
                pose_directive: pose.to_string(),
            };
            async move {
                let outcome = self.synthesizer.generate_campaign_image(&request).await;
                if let Err(e) = &outcome {
                    warn!("Pose {} failed: {}", index + 1, e);
                }
                outcome
            }
        }))
        .await;

        let total = outcomes.len();
        let mut images = Vec::new();
        let mut failures = Vec::new();
        for outcome in outcomes {
            match outcome {
                Ok(image) => images.push(image),
                Err(e) => failures.push(e),
            }
        }

        let summary_error = if failures.len() == total {
            // First-failure-wins, not an aggregate of all six messages.
            failures.first().map(user_message)
        } else if !failures.is_empty() {
            Some(format!("Partial success: {} images failed.", failures.len()))
        } else {
            None
        };

        info!(
            "Campaign run settled: {} images, {} failures",
            images.len(),
            failures.len()
        );

        CampaignResult {
            images,
            failure_count: failures.len(),
            summary_error,
        }
    }
}
