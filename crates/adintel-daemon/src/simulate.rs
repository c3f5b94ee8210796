//! Synthetic AR session
//!
//! Plays a scripted room (walls appearing and disappearing, a camera
//! walking a path) through the real session loop and reports the ads left
//! standing at the end.

use adintel_capture::CapturedImage;
use adintel_content::AdContentPipeline;
use adintel_core::{Anchor, AnchorId, PlaneAlignment, Pose};
use adintel_scene::{AdSnapshot, ArEvent, ArSession, PlacementManager, PlacementStatus};
use anyhow::{ensure, Context, Result};
use bevy_math::{Quat, Vec3};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info};

use crate::config::{SimulationConfig, WallConfig};

pub struct SimulationReport {
    pub ads: Vec<AdSnapshot>,
    pub anchors: Vec<Anchor>,
    pub status: PlacementStatus,
    pub ticks: usize,
}

pub fn wall_anchor(wall: &WallConfig) -> Anchor {
    let rotation = Quat::from_rotation_y(wall.yaw_degrees.to_radians());
    Anchor::wall(Pose::new(Vec3::from_array(wall.position), rotation))
}

/// Camera position at `progress` (0..=1) along the waypoints, one equal
/// share of the run per segment
pub fn camera_position(path: &[[f32; 3]], progress: f32) -> Vec3 {
    match path.len() {
        0 => Vec3::ZERO,
        1 => Vec3::from_array(path[0]),
        n => {
            let scaled = progress.clamp(0.0, 1.0) * (n - 1) as f32;
            let segment = (scaled.floor() as usize).min(n - 2);
            let t = scaled - segment as f32;
            Vec3::from_array(path[segment]).lerp(Vec3::from_array(path[segment + 1]), t)
        }
    }
}

/// Longest scripted time accepted, in seconds
const MAX_SCRIPT_SECS: f64 = 24.0 * 60.0 * 60.0;
/// Slowest playback accepted
const MIN_SPEED: f64 = 0.001;
const MAX_TICKS: f64 = 1_000_000.0;

fn at(secs: f64) -> Duration {
    Duration::try_from_secs_f64(secs.max(0.0)).unwrap_or(Duration::MAX)
}

fn check_time(name: &str, secs: f64) -> Result<()> {
    ensure!(
        secs.is_finite() && (0.0..=MAX_SCRIPT_SECS).contains(&secs),
        "{} must be between 0 and {} seconds, got {}",
        name,
        MAX_SCRIPT_SECS,
        secs
    );
    Ok(())
}

/// Reject timings that cannot be scheduled
pub fn validate(config: &SimulationConfig) -> Result<()> {
    ensure!(config.speed.is_finite(), "speed must be finite, got {}", config.speed);
    ensure!(
        config.speed <= 0.0 || config.speed >= MIN_SPEED,
        "speed must be at least {}, got {}",
        MIN_SPEED,
        config.speed
    );
    check_time("duration_secs", config.duration_secs)?;
    ensure!(
        config.tick_hz.is_finite() && config.tick_hz >= 0.0,
        "tick_hz must be a non-negative number, got {}",
        config.tick_hz
    );
    ensure!(
        config.duration_secs * config.tick_hz <= MAX_TICKS,
        "{} seconds at {} Hz exceeds {} ticks",
        config.duration_secs,
        config.tick_hz,
        MAX_TICKS
    );
    for wall in &config.walls {
        check_time("detected_at_secs", wall.detected_at_secs)?;
        if let Some(removed) = wall.removed_at_secs {
            check_time("removed_at_secs", removed)?;
        }
    }
    Ok(())
}

/// Timed event list for a run, in delivery order
pub fn script(config: &SimulationConfig, frame: Option<Arc<CapturedImage>>) -> Vec<(Duration, ArEvent)> {
    let mut events = Vec::new();

    if config.floor {
        let floor = Anchor::new(AnchorId::new(), Pose::IDENTITY, PlaneAlignment::Horizontal);
        events.push((Duration::ZERO, ArEvent::AnchorAdded(floor)));
    }

    for wall in &config.walls {
        let anchor = wall_anchor(wall);
        let id = anchor.id;
        events.push((at(wall.detected_at_secs), ArEvent::AnchorAdded(anchor)));
        if let Some(removed) = wall.removed_at_secs {
            events.push((at(removed), ArEvent::AnchorRemoved(id)));
        }
    }

    if config.tick_hz > 0.0 && config.duration_secs > 0.0 {
        let ticks = (config.duration_secs * config.tick_hz).floor() as usize;
        for i in 1..=ticks {
            let secs = i as f64 / config.tick_hz;
            let progress = (secs / config.duration_secs) as f32;
            events.push((
                at(secs),
                ArEvent::FrameTick {
                    pose: Pose::from_position(camera_position(&config.camera_path, progress)),
                    timestamp: at(secs),
                    frame: frame.clone(),
                },
            ));
        }
    }

    // Stable: anchors scheduled for the same instant stay ahead of ticks
    events.sort_by_key(|(time, _)| *time);
    events
}

pub async fn run_simulation(
    config: &SimulationConfig,
    manager: PlacementManager,
    pipeline: AdContentPipeline,
) -> Result<SimulationReport> {
    validate(config).context("invalid simulation config")?;

    let frame = if config.frames {
        Some(Arc::new(CapturedImage::solid_color(64, 48, [186, 176, 160])?))
    } else {
        None
    };

    let events = script(config, frame);
    let ticks = events
        .iter()
        .filter(|(_, e)| matches!(e, ArEvent::FrameTick { .. }))
        .count();
    let speed = if config.speed > 0.0 { config.speed } else { 1.0 };

    info!(
        walls = config.walls.len(),
        ticks,
        duration_secs = config.duration_secs,
        speed,
        "Starting simulation"
    );

    let (session, handle) = ArSession::new(manager, pipeline);
    let mut status = handle.subscribe();
    let task = tokio::spawn(session.run());

    let start = tokio::time::Instant::now();
    for (time, event) in events {
        tokio::time::sleep_until(start + time.div_f64(speed)).await;
        handle.send(event).await.context("session stopped early")?;

        if status.has_changed().unwrap_or(false) {
            let current = status.borrow_and_update().clone();
            info!(at = ?time, status = %current, "Status changed");
        }
    }

    drop(handle);
    let manager = task.await.context("session task failed")?;
    debug!(ads = manager.ad_count(), "Simulation finished");

    Ok(SimulationReport {
        ads: manager.snapshot(),
        anchors: manager.anchors().to_vec(),
        status: manager.status().clone(),
        ticks,
    })
}
