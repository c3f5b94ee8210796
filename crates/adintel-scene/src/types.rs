//! Shared types for placed ads and user-visible status

use adintel_core::AnchorId;
use bevy_ecs::entity::Entity;
use bevy_math::Vec3;
use chrono::{DateTime, Utc};

/// User-visible placement status
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum PlacementStatus {
    #[default]
    SearchingForWalls,
    WallDetected,
    AnalyzingScene,
    AdsUpdated,
    /// No wall within range of the viewpoint; retried on the next tick
    NoTargetFound,
    Failed(String),
}

impl std::fmt::Display for PlacementStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PlacementStatus::SearchingForWalls => write!(f, "Searching for walls..."),
            PlacementStatus::WallDetected => write!(f, "Wall detected"),
            PlacementStatus::AnalyzingScene => write!(f, "Analyzing scene..."),
            PlacementStatus::AdsUpdated => write!(f, "Ads updated"),
            PlacementStatus::NoTargetFound => write!(f, "No wall in range"),
            PlacementStatus::Failed(reason) => write!(f, "Ad update failed: {}", reason),
        }
    }
}

/// An ad placed on an anchor
#[derive(Debug, Clone)]
pub struct AdRecord {
    pub anchor_id: AnchorId,
    pub text: String,
    /// Root entity of the poster in the scene graph
    pub entity: Entity,
    pub placed_at: DateTime<Utc>,
}

/// Read-only view of a placed ad
#[derive(Debug, Clone, PartialEq)]
pub struct AdSnapshot {
    pub anchor_id: AnchorId,
    pub lines: Vec<String>,
    pub position: Vec3,
    pub placed_at: DateTime<Utc>,
}
