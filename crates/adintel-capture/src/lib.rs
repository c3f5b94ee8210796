//! AdIntel Capture - Camera permissions and still-image capture
//!
//! Platform camera facilities sit behind two small traits: a
//! [`CameraAuthorizer`] answering the permission question and a
//! [`CameraDevice`] producing encoded stills. The [`CaptureController`]
//! drives the permission branches and turns every failure into a
//! user-visible status message.

pub mod controller;
pub mod device;
pub mod error;
pub mod frame;
pub mod permission;

pub use controller::CaptureController;
pub use device::{CameraDevice, FileCamera};
pub use error::CaptureError;
pub use frame::CapturedImage;
pub use permission::{AuthorizationStatus, CameraAuthorizer, StaticAuthorizer};
