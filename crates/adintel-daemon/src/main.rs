//! AdIntel - Main entry point
//!
//! Command-line front end over the placement engine: a synthetic AR session,
//! one-shot content generation and capture, and settings management.

mod commands;
mod compose;
mod config;
mod simulate;

use adintel_capture::AuthorizationStatus;
use adintel_core::SettingsStore;
use adintel_scene::{ManagerConfig, PlacementManager};
use anyhow::Result;
use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;

#[derive(Parser, Debug)]
#[command(name = "adintel")]
#[command(about = "Context-aware ad placement on tracked walls")]
#[command(version)]
struct Args {
    /// Path to configuration file
    #[arg(short, long, global = true, default_value = "adintel.toml")]
    config: PathBuf,

    /// Log level (trace, debug, info, warn, error)
    #[arg(short, long, global = true, default_value = "info")]
    log_level: String,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Run a synthetic AR session and print the ads left standing
    Simulate {
        /// Override playback speed
        #[arg(long)]
        speed: Option<f64>,
    },
    /// Request ad copy for a scene description
    Generate {
        #[arg(long)]
        scene: String,
    },
    /// Capture a still from an image file and analyze it
    Capture {
        #[arg(long)]
        image: PathBuf,
        /// Camera permission state to simulate
        #[arg(long, value_enum, default_value_t = Permission::Authorized)]
        permission: Permission,
        /// Answer to the permission prompt when undetermined
        #[arg(long)]
        deny_prompt: bool,
    },
    /// Show or change user settings
    Settings {
        #[command(subcommand)]
        action: SettingsAction,
    },
    /// Write a default configuration file
    InitConfig,
}

#[derive(Subcommand, Debug)]
enum SettingsAction {
    Show,
    Set { key: String, value: String },
    Reset,
}

#[derive(ValueEnum, Clone, Copy, Debug)]
enum Permission {
    Authorized,
    NotDetermined,
    Denied,
    Restricted,
}

impl From<Permission> for AuthorizationStatus {
    fn from(permission: Permission) -> Self {
        match permission {
            Permission::Authorized => AuthorizationStatus::Authorized,
            Permission::NotDetermined => AuthorizationStatus::NotDetermined,
            Permission::Denied => AuthorizationStatus::Denied,
            Permission::Restricted => AuthorizationStatus::Restricted,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_global_flags_after_subcommand() {
        let args = Args::try_parse_from([
            "adintel",
            "simulate",
            "--config",
            "room.toml",
            "--log-level",
            "debug",
        ])
        .unwrap();
        assert_eq!(args.config, PathBuf::from("room.toml"));
        assert_eq!(args.log_level, "debug");
        assert!(matches!(args.command, Command::Simulate { speed: None }));

        let args = Args::try_parse_from(["adintel", "settings", "show"]).unwrap();
        assert_eq!(args.config, PathBuf::from("adintel.toml"));
    }

    #[test]
    fn test_cli_definition() {
        use clap::CommandFactory;
        Args::command().debug_assert();
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    // Initialize logging
    let level = match args.log_level.to_lowercase().as_str() {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "info" => Level::INFO,
        "warn" => Level::WARN,
        "error" => Level::ERROR,
        _ => Level::INFO,
    };

    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(true)
        .finish();

    tracing::subscriber::set_global_default(subscriber)?;

    info!("AdIntel v{}", env!("CARGO_PKG_VERSION"));

    if let Command::InitConfig = args.command {
        config::save_default_config(&args.config)?;
        println!("Wrote default configuration to {}", args.config.display());
        return Ok(());
    }

    // Load configuration
    let mut config = config::load_config(&args.config)?;
    let store = SettingsStore::new(&config.settings.path);
    let settings = store.load()?;

    info!(
        backend = ?config.content.backend,
        settings = %store.path().display(),
        "Configuration loaded"
    );

    match args.command {
        Command::Simulate { speed } => {
            if let Some(speed) = speed {
                config.simulation.speed = speed;
            }

            let pipeline = compose::build_pipeline(&config, &settings)?;
            let manager = PlacementManager::with_scene(ManagerConfig::from_settings(
                &settings,
                config.placement.clone(),
            ));
            let report = simulate::run_simulation(&config.simulation, manager, pipeline).await?;

            println!("Final status: {}", report.status);
            println!(
                "{} ticks, {} tracked anchors, {} ads:",
                report.ticks,
                report.anchors.len(),
                report.ads.len()
            );
            for ad in &report.ads {
                let p = ad.position;
                println!(
                    "  - anchor {} at ({:.2}, {:.2}, {:.2}), placed {}",
                    ad.anchor_id,
                    p.x,
                    p.y,
                    p.z,
                    ad.placed_at.format("%H:%M:%S")
                );
                for line in &ad.lines {
                    println!("      {}", line);
                }
            }
        }
        Command::Generate { scene } => {
            let ad = commands::generate(&config, &settings, &scene).await?;
            println!("{}", ad);
        }
        Command::Capture {
            image,
            permission,
            deny_prompt,
        } => {
            let report =
                commands::capture(&config, &settings, &image, permission.into(), !deny_prompt)
                    .await?;
            for status in &report.statuses {
                println!("Status: {}", status);
            }
            for label in &report.labels {
                println!("  {}", label);
            }
            if let Some(scene) = &report.scene {
                println!("Scene: {}", scene);
            }
        }
        Command::Settings { action } => match action {
            SettingsAction::Show => {
                for line in commands::show_settings(&settings)? {
                    println!("{}", line);
                }
                println!("Themes:");
                for line in commands::theme_labels() {
                    println!("  {}", line);
                }
            }
            SettingsAction::Set { key, value } => {
                commands::set_setting(&store, &key, &value)?;
                println!("{} updated", key);
            }
            SettingsAction::Reset => {
                store.reset()?;
                println!("Settings reset to defaults");
            }
        },
        Command::InitConfig => {}
    }

    Ok(())
}
