//! Image analysis capability

use adintel_capture::CapturedImage;
use async_trait::async_trait;
use std::time::Duration;
use tracing::debug;

use crate::error::ContentError;

/// Description used when no frame or no usable labels are available
pub const DEFAULT_SCENE: &str = "A wall in an indoor living space";

/// What kind of finding a label reports
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LabelKind {
    Object,
    Scene,
    Tone,
    Text,
}

impl LabelKind {
    pub fn label(&self) -> &'static str {
        match self {
            LabelKind::Object => "Object",
            LabelKind::Scene => "Scene",
            LabelKind::Tone => "Tone",
            LabelKind::Text => "Text detected",
        }
    }
}

/// One finding about an image
#[derive(Debug, Clone, PartialEq)]
pub struct AnalysisLabel {
    pub kind: LabelKind,
    pub description: String,
    /// Confidence in `0.0..=1.0`, when the analyzer reports one
    pub score: Option<f32>,
}

impl AnalysisLabel {
    pub fn new(kind: LabelKind, description: impl Into<String>, score: Option<f32>) -> Self {
        Self {
            kind,
            description: description.into(),
            score,
        }
    }
}

impl std::fmt::Display for AnalysisLabel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.kind.label(), self.description)?;
        if let Some(score) = self.score {
            write!(f, " ({:.0}%)", score * 100.0)?;
        }
        Ok(())
    }
}

/// Produces labelled findings for a captured frame
#[async_trait]
pub trait ImageAnalyzer: Send + Sync {
    async fn analyze(&self, image: &CapturedImage) -> Result<Vec<AnalysisLabel>, ContentError>;
}

/// Returns a fixed set of findings after an artificial delay
#[derive(Debug, Clone, Default)]
pub struct PlaceholderImageAnalyzer {
    delay: Duration,
}

impl PlaceholderImageAnalyzer {
    pub fn new(delay: Duration) -> Self {
        Self { delay }
    }

    pub fn sample_labels() -> Vec<AnalysisLabel> {
        vec![
            AnalysisLabel::new(LabelKind::Object, "smartphone", Some(0.95)),
            AnalysisLabel::new(LabelKind::Object, "table", Some(0.87)),
            AnalysisLabel::new(LabelKind::Scene, "indoor", Some(0.92)),
            AnalysisLabel::new(LabelKind::Tone, "bright", Some(0.78)),
            AnalysisLabel::new(LabelKind::Text, "none", None),
        ]
    }
}

#[async_trait]
impl ImageAnalyzer for PlaceholderImageAnalyzer {
    async fn analyze(&self, image: &CapturedImage) -> Result<Vec<AnalysisLabel>, ContentError> {
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }
        debug!(width = image.width(), height = image.height(), "Placeholder analysis");
        Ok(Self::sample_labels())
    }
}

/// Condense findings into a one-line scene description for ad generation
pub fn describe_scene(labels: &[AnalysisLabel]) -> String {
    let collect = |kind: LabelKind| -> Vec<&str> {
        labels
            .iter()
            .filter(|l| l.kind == kind)
            .map(|l| l.description.as_str())
            .collect()
    };

    let mut parts = Vec::new();

    let scenes = collect(LabelKind::Scene);
    if !scenes.is_empty() {
        parts.push(format!("{} scene", scenes.join(", ")));
    }

    let objects = collect(LabelKind::Object);
    if !objects.is_empty() {
        parts.push(format!("containing {}", objects.join(", ")));
    }

    let tones = collect(LabelKind::Tone);
    if !tones.is_empty() {
        parts.push(format!("{} tone", tones.join(", ")));
    }

    let text: Vec<&str> = collect(LabelKind::Text)
        .into_iter()
        .filter(|t| *t != "none")
        .collect();
    if !text.is_empty() {
        parts.push(format!("with visible text \"{}\"", text.join(" ")));
    }

    if parts.is_empty() {
        DEFAULT_SCENE.to_string()
    } else {
        parts.join(", ")
    }
}
