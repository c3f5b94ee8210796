//! AdIntel Content - Ad copy generation and image analysis
//!
//! Two capabilities, each with a placeholder and a network-backed
//! implementation selected when the application is composed:
//! - [`TextGenerator`]: scene description in, multi-line ad copy out
//! - [`ImageAnalyzer`]: captured frame in, labelled findings out
//!
//! [`AdContentPipeline`] chains them for the AR refresh loop.

pub mod analyzer;
pub mod chat;
pub mod error;
pub mod generator;
pub mod pipeline;
pub mod vision;

pub use analyzer::{describe_scene, AnalysisLabel, ImageAnalyzer, LabelKind, PlaceholderImageAnalyzer, DEFAULT_SCENE};
pub use chat::{ChatConfig, ChatTextGenerator, ChatTransport, HttpChatTransport};
pub use error::ContentError;
pub use generator::{PlaceholderTextGenerator, TextGenerator, PLACEHOLDER_ADS, WELCOME_AD};
pub use pipeline::AdContentPipeline;
pub use vision::{CloudVisionAnalyzer, VisionConfig};
