//! AdIntel Core - Anchors, placement math, ad queue, and settings
//!
//! This crate provides the foundational types for the AdIntel system:
//! - Anchor and pose types reported by an AR tracking source
//! - Nearest-wall selection and ad plane placement math
//! - Capacity-bounded FIFO queue for displayed ads
//! - Flat key/value settings with an explicit load/save boundary

pub mod anchor;
pub mod placement;
pub mod queue;
pub mod settings;

pub use anchor::{Anchor, AnchorId, PlaneAlignment, Pose};
pub use placement::{layout_text_bands, select_target, PlacementConfig, PlaneTransform, TextBand};
pub use queue::AdQueue;
pub use settings::{Settings, SettingsError, SettingsStore, Theme};
