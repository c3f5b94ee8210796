//! Placement manager
//!
//! Owns the set of known anchors, the bounded queue of placed ads and the
//! refresh cooldown. All scene mutation goes through here.

use adintel_content::{ContentError, WELCOME_AD};
use adintel_core::{select_target, AdQueue, Anchor, AnchorId, PlacementConfig, Pose, Settings};
use bevy_ecs::entity::Entity;
use std::time::Duration;
use tracing::{debug, info, warn};

use crate::scene::AdScene;
use crate::types::{AdRecord, AdSnapshot, PlacementStatus};

/// Runtime knobs for the manager, usually derived from [`Settings`]
#[derive(Debug, Clone, PartialEq)]
pub struct ManagerConfig {
    pub capacity: usize,
    pub cooldown: Duration,
    pub auto_refresh: bool,
    pub placement: PlacementConfig,
}

impl Default for ManagerConfig {
    fn default() -> Self {
        Self::from_settings(&Settings::default(), PlacementConfig::default())
    }
}

impl ManagerConfig {
    pub fn from_settings(settings: &Settings, placement: PlacementConfig) -> Self {
        Self {
            capacity: settings.max_ads(),
            cooldown: settings.refresh_interval(),
            auto_refresh: settings.auto_refresh_enabled,
            placement,
        }
    }
}

/// Proof that a refresh was started; hand it back to [`PlacementManager::complete_tick`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TickTicket {
    seq: u64,
    pub started_at: Duration,
}

pub struct PlacementManager {
    config: ManagerConfig,
    scene: Option<AdScene>,
    /// Known anchors in detection order
    anchors: Vec<Anchor>,
    ads: AdQueue<AdRecord>,
    viewpoint: Option<Pose>,
    last_refresh: Duration,
    in_flight: Option<u64>,
    next_seq: u64,
    status: PlacementStatus,
}

impl PlacementManager {
    /// Manager without a scene; every event is ignored until [`Self::attach_scene`]
    pub fn new(config: ManagerConfig) -> Self {
        let ads = AdQueue::new(config.capacity);
        Self {
            config,
            scene: None,
            anchors: Vec::new(),
            ads,
            viewpoint: None,
            last_refresh: Duration::ZERO,
            in_flight: None,
            next_seq: 0,
            status: PlacementStatus::SearchingForWalls,
        }
    }

    pub fn with_scene(config: ManagerConfig) -> Self {
        let mut manager = Self::new(config);
        manager.attach_scene(AdScene::new());
        manager
    }

    pub fn attach_scene(&mut self, scene: AdScene) {
        self.scene = Some(scene);
    }

    pub fn is_initialized(&self) -> bool {
        self.scene.is_some()
    }

    pub fn scene(&self) -> Option<&AdScene> {
        self.scene.as_ref()
    }

    pub fn config(&self) -> &ManagerConfig {
        &self.config
    }

    pub fn status(&self) -> &PlacementStatus {
        &self.status
    }

    pub fn is_busy(&self) -> bool {
        self.in_flight.is_some()
    }

    pub fn anchors(&self) -> &[Anchor] {
        &self.anchors
    }

    pub fn ads(&self) -> impl Iterator<Item = &AdRecord> {
        self.ads.iter()
    }

    pub fn ad_count(&self) -> usize {
        self.ads.len()
    }

    pub fn ad_for(&self, anchor_id: AnchorId) -> Option<&AdRecord> {
        self.ads.iter().find(|r| r.anchor_id == anchor_id)
    }

    /// A newly tracked plane. Walls get the welcome ad while there is room.
    pub fn on_anchor_detected(&mut self, anchor: Anchor) -> Option<Entity> {
        if self.scene.is_none() {
            debug!(anchor = %anchor.id, "Scene not initialized, ignoring anchor");
            return None;
        }

        self.upsert_anchor(anchor.clone());
        if !anchor.is_wall() {
            return None;
        }

        info!(anchor = %anchor.id, "Wall detected");
        self.status = PlacementStatus::WallDetected;

        if self.ads.len() < self.ads.capacity() {
            self.place_ad(&anchor, WELCOME_AD)
        } else {
            None
        }
    }

    /// Refined pose for a tracked plane; its ad follows
    pub fn on_anchor_updated(&mut self, anchor: Anchor) {
        if self.scene.is_none() {
            return;
        }

        self.upsert_anchor(anchor.clone());
        let entity = self.ad_for(anchor.id).map(|r| r.entity);
        if let (Some(entity), Some(scene)) = (entity, self.scene.as_mut()) {
            scene.reposition(entity, &anchor, &self.config.placement);
        }
    }

    /// Tracking lost a plane; its ad goes with it
    pub fn on_anchor_removed(&mut self, anchor_id: AnchorId) {
        if self.scene.is_none() {
            return;
        }

        self.anchors.retain(|a| a.id != anchor_id);
        if let Some(record) = self.ads.remove_first(|r| r.anchor_id == anchor_id) {
            info!(anchor = %anchor_id, "Anchor removed, detaching its ad");
            self.detach(record.entity);
        }
    }

    /// Record the viewpoint and start a refresh if the cooldown has elapsed
    /// and none is in flight.
    pub fn begin_tick(&mut self, viewpoint: Pose, timestamp: Duration) -> Option<TickTicket> {
        if self.scene.is_none() {
            return None;
        }

        self.viewpoint = Some(viewpoint);
        if !self.config.auto_refresh {
            return None;
        }
        if timestamp.saturating_sub(self.last_refresh) < self.config.cooldown {
            return None;
        }
        self.last_refresh = timestamp;

        if self.in_flight.is_some() {
            debug!("Refresh still in flight, skipping tick");
            return None;
        }

        let seq = self.next_seq;
        self.next_seq += 1;
        self.in_flight = Some(seq);
        self.status = PlacementStatus::AnalyzingScene;
        debug!(seq, timestamp = ?timestamp, "Refresh started");

        Some(TickTicket {
            seq,
            started_at: timestamp,
        })
    }

    /// Finish a refresh: place the new copy on the best wall for the current viewpoint
    pub fn complete_tick(
        &mut self,
        ticket: TickTicket,
        result: Result<String, ContentError>,
    ) -> Option<Entity> {
        if self.in_flight != Some(ticket.seq) {
            warn!(seq = ticket.seq, "Ignoring stale refresh result");
            return None;
        }
        self.in_flight = None;

        let text = match result {
            Ok(text) => text,
            Err(e) => {
                warn!(error = %e, "Ad content generation failed");
                self.status = PlacementStatus::Failed(e.to_string());
                return None;
            }
        };

        let Some(viewpoint) = self.viewpoint else {
            self.status = PlacementStatus::NoTargetFound;
            return None;
        };

        let target = select_target(viewpoint.position, &self.anchors, &self.config.placement).cloned();
        match target {
            Some(anchor) => {
                let entity = self.place_ad(&anchor, &text);
                self.status = PlacementStatus::AdsUpdated;
                entity
            }
            None => {
                debug!(position = ?viewpoint.position, "No wall in range");
                self.status = PlacementStatus::NoTargetFound;
                None
            }
        }
    }

    /// Put `text` on `anchor`, replacing any ad already there and evicting
    /// the oldest ad when the queue is full.
    pub fn place_ad(&mut self, anchor: &Anchor, text: &str) -> Option<Entity> {
        let scene = self.scene.as_mut()?;

        if let Some(previous) = self.ads.remove_first(|r| r.anchor_id == anchor.id) {
            debug!(anchor = %anchor.id, "Replacing existing ad");
            scene.detach(previous.entity);
        }

        let entity = scene.spawn_ad(anchor, text, &self.config.placement);
        let record = AdRecord {
            anchor_id: anchor.id,
            text: text.to_string(),
            entity,
            placed_at: chrono::Utc::now(),
        };

        if let Some(evicted) = self.ads.push(record) {
            info!(anchor = %evicted.anchor_id, "Evicting oldest ad");
            scene.detach(evicted.entity);
        }

        info!(anchor = %anchor.id, ads = self.ads.len(), "Placed ad");
        Some(entity)
    }

    /// Apply changed settings. Shrinking the capacity evicts the oldest ads.
    pub fn apply_settings(&mut self, settings: &Settings) {
        let placement = self.config.placement.clone();
        self.config = ManagerConfig::from_settings(settings, placement);

        let evicted = self.ads.set_capacity(self.config.capacity);
        for record in evicted {
            self.detach(record.entity);
        }
        info!(
            capacity = self.config.capacity,
            cooldown = ?self.config.cooldown,
            auto_refresh = self.config.auto_refresh,
            "Settings applied"
        );
    }

    /// Oldest-first view of every placed ad
    pub fn snapshot(&self) -> Vec<AdSnapshot> {
        let Some(scene) = self.scene.as_ref() else {
            return Vec::new();
        };

        self.ads
            .iter()
            .map(|record| AdSnapshot {
                anchor_id: record.anchor_id,
                lines: scene
                    .text_lines(record.entity)
                    .into_iter()
                    .map(|(line, _)| line.text)
                    .collect(),
                position: scene.position(record.entity).unwrap_or_default(),
                placed_at: record.placed_at,
            })
            .collect()
    }

    fn upsert_anchor(&mut self, anchor: Anchor) {
        match self.anchors.iter_mut().find(|a| a.id == anchor.id) {
            Some(existing) => *existing = anchor,
            None => self.anchors.push(anchor),
        }
    }

    fn detach(&mut self, entity: Entity) {
        if let Some(scene) = self.scene.as_mut() {
            scene.detach(entity);
        }
    }
}
