//! Camera devices producing encoded stills

use async_trait::async_trait;
use std::path::PathBuf;
use tracing::debug;

use crate::error::CaptureError;

/// A still camera
#[async_trait]
pub trait CameraDevice: Send + Sync {
    /// Configure inputs/outputs and start the session
    async fn start(&mut self) -> Result<(), CaptureError>;

    async fn stop(&mut self);

    fn is_running(&self) -> bool;

    /// Take one photo and return its encoded bytes
    async fn capture_still(&mut self) -> Result<Vec<u8>, CaptureError>;
}

/// Camera that "photographs" an image file on disk
#[derive(Debug, Clone)]
pub struct FileCamera {
    path: PathBuf,
    running: bool,
}

impl FileCamera {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            running: false,
        }
    }
}

#[async_trait]
impl CameraDevice for FileCamera {
    async fn start(&mut self) -> Result<(), CaptureError> {
        if !tokio::fs::try_exists(&self.path).await? {
            return Err(CaptureError::DeviceUnavailable(format!(
                "{} does not exist",
                self.path.display()
            )));
        }
        self.running = true;
        debug!(path = %self.path.display(), "File camera started");
        Ok(())
    }

    async fn stop(&mut self) {
        self.running = false;
    }

    fn is_running(&self) -> bool {
        self.running
    }

    async fn capture_still(&mut self) -> Result<Vec<u8>, CaptureError> {
        tokio::fs::read(&self.path)
            .await
            .map_err(|e| CaptureError::Device(e.to_string()))
    }
}
