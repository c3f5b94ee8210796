//! AdIntel Scene - Ad placement on tracked walls
//!
//! This crate owns everything that mutates the AR scene:
//! - An ECS scene graph of ad posters and their text lines
//! - The placement manager (anchor bookkeeping, bounded ad queue, cooldown)
//! - The session loop feeding tracking events to the manager

pub mod manager;
pub mod scene;
pub mod session;
pub mod types;

pub use manager::{ManagerConfig, PlacementManager, TickTicket};
pub use scene::{AdPoster, AdScene, AdTextLine, PosterBoard};
pub use session::{ArEvent, ArSession, SessionHandle};
pub use types::{AdRecord, AdSnapshot, PlacementStatus};
