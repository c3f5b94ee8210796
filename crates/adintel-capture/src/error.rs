//! Capture error types

use thiserror::Error;

#[derive(Error, Debug)]
pub enum CaptureError {
    #[error("Camera access was denied")]
    PermissionDenied,
    #[error("Camera access is denied or restricted")]
    PermissionRestricted,
    #[error("Camera unavailable: {0}")]
    DeviceUnavailable(String),
    #[error("Camera session is not running")]
    SessionNotRunning,
    #[error("Capture failed: {0}")]
    Device(String),
    #[error("Image decode error: {0}")]
    Decode(#[from] image::ImageError),
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}

impl CaptureError {
    /// Message suitable for the capture screen status line
    pub fn status_message(&self) -> String {
        match self {
            CaptureError::PermissionDenied => "Camera access was denied".to_string(),
            CaptureError::PermissionRestricted => {
                "Camera access is denied. Change the permission in Settings.".to_string()
            }
            CaptureError::DeviceUnavailable(_) => "Failed to initialize the camera".to_string(),
            CaptureError::SessionNotRunning => "Camera session is not running".to_string(),
            CaptureError::Device(reason) => format!("Error: {}", reason),
            CaptureError::IoError(e) => format!("Error: {}", e),
            CaptureError::Decode(_) => "Failed to process the image".to_string(),
        }
    }
}
