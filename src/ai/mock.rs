use super::{ImageSynthesisService, PosePlanningService};
use crate::models::{GenerationRequest, PoseSet};
use crate::{Error, Result};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

/// Mock pose planner with queued responses. Clones share state so tests
/// can keep a probe handle after moving the mock into an `App`.
#[derive(Clone)]
pub struct MockPosePlanner {
    pose_responses: Arc<Mutex<Vec<PoseSet>>>,
    call_count: Arc<AtomicUsize>,
}

impl MockPosePlanner {
    pub fn new() -> Self {
        Self {
            pose_responses: Arc::new(Mutex::new(Vec::new())),
            call_count: Arc::new(AtomicUsize::new(0)),
        }
    }

    pub fn with_pose_response(self, poses: PoseSet) -> Self {
        self.pose_responses.lock().unwrap().push(poses);
        self
    }

    pub fn get_call_count(&self) -> usize {
        self.call_count.load(Ordering::SeqCst)
    }
}

impl Default for MockPosePlanner {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl PosePlanningService for MockPosePlanner {
    async fn suggest_poses(&self, _master_prompt: &str) -> Result<PoseSet> {
        let count = self.call_count.fetch_add(1, Ordering::SeqCst);

        let responses = self.pose_responses.lock().unwrap();
        if responses.is_empty() {
            Ok(PoseSet::fallback())
        } else {
            Ok(responses[count % responses.len()].clone())
        }
    }
}

/// Mock image synthesizer. Succeeds with a configured data URI unless a
/// failure is registered for the request's pose directive.
#[derive(Clone)]
pub struct MockImageSynthesizer {
    image_response: Arc<Mutex<String>>,
    failures: Arc<Mutex<HashMap<String, (Option<u16>, String)>>>,
    call_count: Arc<AtomicUsize>,
}

impl MockImageSynthesizer {
    pub fn new() -> Self {
        Self {
            image_response: Arc::new(Mutex::new(
                // Tiny stand-in payload; tests that care configure their own.
                "data:image/png;base64,iVBORw0KGgo=".to_string(),
            )),
            failures: Arc::new(Mutex::new(HashMap::new())),
            call_count: Arc::new(AtomicUsize::new(0)),
        }
    }

    pub fn with_image_response(self, data_uri: String) -> Self {
        *self.image_response.lock().unwrap() = data_uri;
        self
    }

    /// Register a failure for every request whose pose directive matches.
    pub fn with_failure_for(self, pose_directive: &str, status: Option<u16>, message: &str) -> Self {
        self.failures
            .lock()
            .unwrap()
            .insert(pose_directive.to_string(), (status, message.to_string()));
        self
    }

    pub fn get_call_count(&self) -> usize {
        self.call_count.load(Ordering::SeqCst)
    }
}

impl Default for MockImageSynthesizer {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ImageSynthesisService for MockImageSynthesizer {
    async fn generate_campaign_image(&self, request: &GenerationRequest) -> Result<String> {
        self.call_count.fetch_add(1, Ordering::SeqCst);

        if let Some((status, message)) = self
            .failures
            .lock()
            .unwrap()
            .get(&request.pose_directive)
            .cloned()
        {
            return Err(Error::Provider { status, message });
        }

        Ok(self.image_response.lock().unwrap().clone())
    }
}
