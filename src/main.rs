use anyhow::Result;
use campaign_studio::app::App;
use clap::Parser;
use std::path::PathBuf;
use tracing::{error, info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Debug, Parser)]
#[command(name = "campaign-studio")]
#[command(about = "Generate a six-pose campaign image set from a master prompt and two reference photos")]
struct CliArgs {
    /// Master prompt describing the scene, mood, and style.
    #[arg(long, value_parser = parse_prompt_arg)]
    prompt: String,

    /// Path to the hero reference photo (subject to preserve).
    #[arg(long, value_name = "FILE")]
    hero: PathBuf,

    /// Path to the selling item reference photo (product to preserve).
    #[arg(long, value_name = "FILE")]
    item: PathBuf,

    /// API key override. Falls back to GEMINI_API_KEY.
    #[arg(long)]
    api_key: Option<String>,

    /// Proxy base URL override. Falls back to GEMINI_BASE_URL.
    #[arg(long)]
    base_url: Option<String>,
}

fn parse_prompt_arg(input: &str) -> std::result::Result<String, String> {
    if input.trim().len() < 10 {
        Err("Master prompt is too short. Describe the scene, mood, and style.".to_string())
    } else {
        Ok(input.to_string())
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "campaign_studio=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting campaign-studio");

    let args = CliArgs::parse();

    let app = match App::new(args.api_key, args.base_url) {
        Ok(app) => app,
        Err(e) => {
            error!("Failed to initialize application: {}", e);
            std::process::exit(1);
        }
    };

    match app.run(&args.prompt, &args.hero, &args.item).await {
        Ok(result) => {
            if let Some(summary) = &result.summary_error {
                warn!("{}", summary);
            }
            if result.images.is_empty() {
                error!("Campaign produced no images");
                std::process::exit(1);
            }
            info!(
                "Campaign complete: {} images in {}",
                result.images.len(),
                app.output_dir().display()
            );
            Ok(())
        }
        Err(e) => {
            error!("Campaign failed: {}", campaign_studio::error::user_message(&e));
            std::process::exit(1);
        }
    }
}
