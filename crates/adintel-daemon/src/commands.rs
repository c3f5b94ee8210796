//! One-shot subcommands: content generation, still capture, settings

use adintel_capture::{AuthorizationStatus, CaptureController, FileCamera, StaticAuthorizer};
use adintel_content::describe_scene;
use adintel_core::{Settings, SettingsStore, Theme};
use anyhow::{Context, Result};
use std::path::Path;
use tracing::{info, warn};

use crate::compose::{build_analyzer, build_generator};
use crate::config::Config;

/// Print `key = value` for every setting; API keys are masked
pub fn show_settings(settings: &Settings) -> Result<Vec<String>> {
    Settings::KEYS
        .iter()
        .map(|key| -> Result<String> {
            let value = settings.get(key)?;
            let shown = if key.ends_with("api_key") {
                mask_secret(&value)
            } else if *key == "preferred_theme" {
                format!("{} ({})", value, settings.theme())
            } else {
                value
            };
            Ok(format!("{} = {}", key, shown))
        })
        .collect()
}

fn mask_secret(value: &str) -> String {
    let len = value.chars().count();
    if len == 0 {
        "(not set)".to_string()
    } else if len <= 4 {
        "****".to_string()
    } else {
        let tail: String = value.chars().rev().take(4).collect::<Vec<_>>().into_iter().rev().collect();
        format!("****{}", tail)
    }
}

pub fn set_setting(store: &SettingsStore, key: &str, value: &str) -> Result<Settings> {
    let mut settings = store.load()?;
    settings
        .set(key, value)
        .with_context(|| format!("setting {}", key))?;
    store.save(&settings)?;
    info!(key, path = %store.path().display(), "Setting saved");
    Ok(settings)
}

pub async fn generate(config: &Config, settings: &Settings, scene: &str) -> Result<String> {
    let generator = build_generator(config, settings)?;
    let ad = generator
        .generate_ad(scene)
        .await
        .context("ad generation failed")?;
    Ok(ad)
}

/// Outcome of the capture flow
pub struct CaptureReport {
    pub statuses: Vec<String>,
    pub labels: Vec<String>,
    pub scene: Option<String>,
}

pub async fn capture(
    config: &Config,
    settings: &Settings,
    image: &Path,
    permission: AuthorizationStatus,
    grant: bool,
) -> Result<CaptureReport> {
    let mut controller = CaptureController::new(
        StaticAuthorizer::new(permission, grant),
        FileCamera::new(image),
    );
    let mut statuses = Vec::new();

    let prepared = controller.prepare().await;
    statuses.extend(controller.status().map(str::to_string));
    if let Err(e) = prepared {
        warn!(error = %e, "Camera not available");
        return Ok(CaptureReport {
            statuses,
            labels: Vec::new(),
            scene: None,
        });
    }

    let captured = controller.capture().await;
    statuses.extend(controller.status().map(str::to_string));
    controller.stop().await;

    let frame = match captured {
        Ok(frame) => frame,
        Err(e) => {
            warn!(error = %e, "Capture failed");
            return Ok(CaptureReport {
                statuses,
                labels: Vec::new(),
                scene: None,
            });
        }
    };

    let analyzer = build_analyzer(config, settings)?;
    let labels = analyzer
        .analyze(&frame)
        .await
        .context("image analysis failed")?;

    Ok(CaptureReport {
        statuses,
        labels: labels.iter().map(|l| l.to_string()).collect(),
        scene: Some(describe_scene(&labels)),
    })
}

pub fn theme_labels() -> Vec<String> {
    Theme::ALL
        .iter()
        .map(|t| format!("{} = {}", t.index(), t.label()))
        .collect()
}
