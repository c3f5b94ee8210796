//! Frame analysis followed by ad copy generation

use adintel_capture::CapturedImage;
use std::sync::Arc;
use tracing::debug;

use crate::analyzer::{describe_scene, ImageAnalyzer, DEFAULT_SCENE};
use crate::error::ContentError;
use crate::generator::TextGenerator;

/// Analyzer + generator chain used for each ad refresh
#[derive(Clone)]
pub struct AdContentPipeline {
    analyzer: Arc<dyn ImageAnalyzer>,
    generator: Arc<dyn TextGenerator>,
}

impl AdContentPipeline {
    pub fn new(analyzer: Arc<dyn ImageAnalyzer>, generator: Arc<dyn TextGenerator>) -> Self {
        Self { analyzer, generator }
    }

    pub fn generator(&self) -> &Arc<dyn TextGenerator> {
        &self.generator
    }

    pub fn analyzer(&self) -> &Arc<dyn ImageAnalyzer> {
        &self.analyzer
    }

    /// Describe the frame (if any) and write ad copy for it
    pub async fn produce(&self, frame: Option<&CapturedImage>) -> Result<String, ContentError> {
        let description = match frame {
            Some(image) => {
                let labels = self.analyzer.analyze(image).await?;
                describe_scene(&labels)
            }
            None => DEFAULT_SCENE.to_string(),
        };

        debug!(scene = %description, "Requesting ad copy");
        self.generator.generate_ad(&description).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analyzer::{AnalysisLabel, PlaceholderImageAnalyzer};
    use async_trait::async_trait;
    use std::sync::Mutex;

    #[derive(Default)]
    struct EchoGenerator {
        seen: Mutex<Vec<String>>,
    }

    #[async_trait]
    impl TextGenerator for EchoGenerator {
        async fn generate_ad(&self, scene_description: &str) -> Result<String, ContentError> {
            self.seen.lock().unwrap().push(scene_description.to_string());
            Ok(format!("Ad\n{}", scene_description))
        }
    }

    struct FailingAnalyzer;

    #[async_trait]
    impl ImageAnalyzer for FailingAnalyzer {
        async fn analyze(&self, _image: &CapturedImage) -> Result<Vec<AnalysisLabel>, ContentError> {
            Err(ContentError::MissingCredential { service: "Vision" })
        }
    }

    #[tokio::test]
    async fn test_frame_is_described() {
        let generator = Arc::new(EchoGenerator::default());
        let pipeline = AdContentPipeline::new(Arc::new(PlaceholderImageAnalyzer::default()), generator.clone());

        let frame = CapturedImage::solid_color(2, 2, [1, 2, 3]).unwrap();
        let ad = pipeline.produce(Some(&frame)).await.unwrap();
        assert!(ad.starts_with("Ad\nindoor scene"));

        pipeline.produce(None).await.unwrap();
        assert_eq!(generator.seen.lock().unwrap()[1], DEFAULT_SCENE);
    }

    #[tokio::test]
    async fn test_analysis_failure_skips_generation() {
        let generator = Arc::new(EchoGenerator::default());
        let pipeline = AdContentPipeline::new(Arc::new(FailingAnalyzer), generator.clone());

        let frame = CapturedImage::solid_color(1, 1, [0, 0, 0]).unwrap();
        assert!(pipeline.produce(Some(&frame)).await.is_err());
        assert!(generator.seen.lock().unwrap().is_empty());
    }
}
