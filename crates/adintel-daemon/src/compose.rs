//! Backend composition from configuration and user settings

use adintel_content::{
    AdContentPipeline, ChatTextGenerator, CloudVisionAnalyzer, ImageAnalyzer,
    PlaceholderImageAnalyzer, PlaceholderTextGenerator, TextGenerator,
};
use adintel_core::Settings;
use anyhow::Result;
use std::sync::Arc;
use std::time::Duration;
use tracing::info;

use crate::config::{Config, ContentBackend};

pub fn build_generator(config: &Config, settings: &Settings) -> Result<Arc<dyn TextGenerator>> {
    let generator: Arc<dyn TextGenerator> = match config.content.backend {
        ContentBackend::Placeholder => Arc::new(PlaceholderTextGenerator::new(placeholder_delay(config))),
        ContentBackend::Remote => Arc::new(ChatTextGenerator::from_config(
            config.chat.clone(),
            settings.openai_api_key.clone(),
        )?),
    };
    Ok(generator)
}

pub fn build_analyzer(config: &Config, settings: &Settings) -> Result<Arc<dyn ImageAnalyzer>> {
    let analyzer: Arc<dyn ImageAnalyzer> = match config.content.backend {
        ContentBackend::Placeholder => Arc::new(PlaceholderImageAnalyzer::new(placeholder_delay(config))),
        ContentBackend::Remote => Arc::new(CloudVisionAnalyzer::new(
            config.vision.clone(),
            settings.vision_api_key.clone(),
        )?),
    };
    Ok(analyzer)
}

pub fn build_pipeline(config: &Config, settings: &Settings) -> Result<AdContentPipeline> {
    let pipeline = AdContentPipeline::new(
        build_analyzer(config, settings)?,
        build_generator(config, settings)?,
    );
    info!(backend = ?config.content.backend, "Content pipeline ready");
    Ok(pipeline)
}

fn placeholder_delay(config: &Config) -> Duration {
    Duration::from_millis(config.content.placeholder_delay_ms)
}
