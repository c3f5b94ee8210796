//! Ad copy generation capability

use async_trait::async_trait;
use rand::seq::IndexedRandom;
use std::time::Duration;
use tracing::debug;

use crate::error::ContentError;

/// Copy shown on a freshly detected wall before any analysis has run
pub const WELCOME_AD: &str = "Welcome to AdvertisementIntelligence\nA smarter ad experience";

/// Canned copy used by [`PlaceholderTextGenerator`]
pub const PLACEHOLDER_ADS: [&str; 4] = [
    "New: the ultimate smart appliance\nA voice-controlled device from the future",
    "Time to relax at home\nExperience premium headphones",
    "Brighten every day\nThe latest smartwatch",
    "30% off for a limited time\nA mattress for restful sleep",
];

const FALLBACK_AD: &str = "Have a wonderful day\nAdvertisementIntelligence is here to help";

/// Turns a scene description into ad copy
///
/// The first line of the returned text is a title; following lines are a
/// short description.
#[async_trait]
pub trait TextGenerator: Send + Sync {
    async fn generate_ad(&self, scene_description: &str) -> Result<String, ContentError>;
}

/// Picks one of the canned ads after a fixed artificial delay
#[derive(Debug, Clone, Default)]
pub struct PlaceholderTextGenerator {
    delay: Duration,
}

impl PlaceholderTextGenerator {
    pub fn new(delay: Duration) -> Self {
        Self { delay }
    }
}

fn pick_placeholder() -> String {
    let mut rng = rand::rng();
    PLACEHOLDER_ADS
        .choose(&mut rng)
        .copied()
        .unwrap_or(FALLBACK_AD)
        .to_string()
}

#[async_trait]
impl TextGenerator for PlaceholderTextGenerator {
    async fn generate_ad(&self, scene_description: &str) -> Result<String, ContentError> {
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }
        let ad = pick_placeholder();
        debug!(scene = %scene_description, "Generated placeholder ad");
        Ok(ad)
    }
}
