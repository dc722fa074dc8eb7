//! Application orchestration: plan poses, generate the campaign, write
//! the resulting images to a per-session output directory.

use crate::ai::{
    mime, GeminiImageSynthesizer, GeminiPosePlanner, ImageSynthesisService, PosePlanningService,
};
use crate::campaign::CampaignRunner;
use crate::models::{CampaignResult, Config, ImageBlob, PoseSet, ProviderSettings};
use crate::{Error, Result};
use chrono::Local;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{info, warn};
use uuid::Uuid;

/// Coordinates pose planning and concurrent image synthesis for one run.
pub struct App {
    planner: Box<dyn PosePlanningService>,
    runner: CampaignRunner,
    output_dir: PathBuf,
}

/// Injectable service bundle used to construct [`App`] in tests/harnesses.
pub struct AppServices {
    pub planner: Box<dyn PosePlanningService>,
    pub synthesizer: Box<dyn ImageSynthesisService>,
}

impl App {
    /// Build an app from concrete service dependencies.
    ///
    /// This is primarily useful for integration tests and local harnesses
    /// that need to inject mocks.
    pub fn with_services(services: AppServices, output_dir: PathBuf) -> Self {
        Self {
            planner: services.planner,
            runner: CampaignRunner::new(services.synthesizer),
            output_dir,
        }
    }

    /// Construct an app from environment configuration plus optional
    /// caller-supplied credential/endpoint overrides (overrides win).
    pub fn new(api_key: Option<String>, base_url: Option<String>) -> Result<Self> {
        let config = Config::from_env();
        let settings = ProviderSettings::resolve(api_key, base_url, &config);

        let date = Local::now().format("%Y-%m-%d").to_string();
        let session_id = Uuid::new_v4();
        let output_dir = PathBuf::from("output").join(format!("{}_{}", date, session_id));

        fs::create_dir_all(&output_dir)?;
        info!("Created output directory: {}", output_dir.display());

        // Reuse one HTTP connection pool across both provider clients.
        let http_client = reqwest::Client::new();

        let planner =
            GeminiPosePlanner::new_with_client(&settings, config.pose_model.clone(), http_client.clone())?;
        let synthesizer =
            GeminiImageSynthesizer::new_with_client(&settings, config.image_model.clone(), http_client)?;

        Ok(Self::with_services(
            AppServices {
                planner: Box::new(planner),
                synthesizer: Box::new(synthesizer),
            },
            output_dir,
        ))
    }

    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    /// Plan poses for the master prompt, then run the full campaign.
    pub async fn run(
        &self,
        master_prompt: &str,
        hero_path: &Path,
        item_path: &Path,
    ) -> Result<CampaignResult> {
        if master_prompt.trim().is_empty() {
            return Err(Error::Invariant(
                "master prompt must not be empty".to_string(),
            ));
        }

        let hero = ImageBlob::from_bytes(fs::read(hero_path)?);
        let item = ImageBlob::from_bytes(fs::read(item_path)?);
        info!(
            "Loaded references: hero {} ({} bytes), item {} ({} bytes)",
            hero.mime_type,
            hero.bytes.len(),
            item.mime_type,
            item.bytes.len()
        );

        let poses = self.plan_poses(master_prompt).await?;

        info!("Generating campaign images");
        let result = self.runner.run(&hero, &item, master_prompt, &poses).await;

        self.write_images(&result)?;

        if let Some(summary) = &result.summary_error {
            warn!("Campaign finished with errors: {}", summary);
        }

        Ok(result)
    }

    /// Plan the six pose directives for a master prompt.
    pub async fn plan_poses(&self, master_prompt: &str) -> Result<PoseSet> {
        info!("Planning poses for master prompt ({} chars)", master_prompt.len());
        let poses = self.planner.suggest_poses(master_prompt).await?;
        for (index, pose) in poses.iter().enumerate() {
            info!("Pose {}: {}", index + 1, pose);
        }
        Ok(poses)
    }

    fn write_images(&self, result: &CampaignResult) -> Result<()> {
        for (index, image) in result.images.iter().enumerate() {
            let blob = ImageBlob::from_data_uri(image)?;
            let filename = format!("pose_{}.{}", index + 1, mime::extension_for(&blob.mime_type));
            let path = self.output_dir.join(filename);
            fs::write(&path, &blob.bytes)?;
            info!("Saved image: {}", path.display());
        }
        Ok(())
    }
}
