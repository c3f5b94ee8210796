//! Capture flow: permission branches, session lifecycle, and still capture

use tracing::{info, warn};

use crate::device::CameraDevice;
use crate::error::CaptureError;
use crate::frame::CapturedImage;
use crate::permission::{AuthorizationStatus, CameraAuthorizer};

/// Drives a camera through permission checks and captures
///
/// Every outcome is mirrored into a status line for display; no failure
/// is retried automatically.
pub struct CaptureController<A, D> {
    authorizer: A,
    device: D,
    status: Option<String>,
}

impl<A: CameraAuthorizer, D: CameraDevice> CaptureController<A, D> {
    pub fn new(authorizer: A, device: D) -> Self {
        Self {
            authorizer,
            device,
            status: None,
        }
    }

    /// Latest user-visible status
    pub fn status(&self) -> Option<&str> {
        self.status.as_deref()
    }

    pub fn is_running(&self) -> bool {
        self.device.is_running()
    }

    /// Check camera permission and start the session when allowed
    pub async fn prepare(&mut self) -> Result<(), CaptureError> {
        match self.authorizer.status() {
            AuthorizationStatus::Authorized => self.start_session().await,
            AuthorizationStatus::NotDetermined => {
                info!("Requesting camera access");
                if self.authorizer.request_access().await {
                    self.start_session().await
                } else {
                    Err(self.fail(CaptureError::PermissionDenied))
                }
            }
            AuthorizationStatus::Denied | AuthorizationStatus::Restricted => {
                Err(self.fail(CaptureError::PermissionRestricted))
            }
        }
    }

    async fn start_session(&mut self) -> Result<(), CaptureError> {
        if let Err(e) = self.device.start().await {
            return Err(self.fail(e));
        }
        self.set_status("Camera is ready");
        Ok(())
    }

    /// Take a photo and decode it
    pub async fn capture(&mut self) -> Result<CapturedImage, CaptureError> {
        if !self.device.is_running() {
            return Err(self.fail(CaptureError::SessionNotRunning));
        }

        self.set_status("Capturing image...");
        let bytes = match self.device.capture_still().await {
            Ok(bytes) => bytes,
            Err(e) => return Err(self.fail(e)),
        };

        match CapturedImage::decode(bytes) {
            Ok(image) => {
                info!(
                    width = image.width(),
                    height = image.height(),
                    format = ?image.format(),
                    "Captured image"
                );
                self.set_status("Image captured");
                Ok(image)
            }
            Err(e) => Err(self.fail(e)),
        }
    }

    /// Stop the session if it is running
    pub async fn stop(&mut self) {
        if self.device.is_running() {
            self.device.stop().await;
            info!("Camera session stopped");
        }
    }

    fn set_status(&mut self, message: &str) {
        self.status = Some(message.to_string());
    }

    fn fail(&mut self, error: CaptureError) -> CaptureError {
        warn!(error = %error, "Capture flow failed");
        self.status = Some(error.status_message());
        error
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::permission::StaticAuthorizer;
    use async_trait::async_trait;

    struct FakeCamera {
        running: bool,
        starts: usize,
        payload: Result<Vec<u8>, String>,
    }

    impl FakeCamera {
        fn with_payload(payload: Result<Vec<u8>, String>) -> Self {
            Self {
                running: false,
                starts: 0,
                payload,
            }
        }

        fn png() -> Self {
            let image = CapturedImage::solid_color(2, 2, [10, 20, 30]).unwrap();
            Self::with_payload(Ok(image.bytes().to_vec()))
        }
    }

    #[async_trait]
    impl CameraDevice for FakeCamera {
        async fn start(&mut self) -> Result<(), CaptureError> {
            self.starts += 1;
            self.running = true;
            Ok(())
        }

        async fn stop(&mut self) {
            self.running = false;
        }

        fn is_running(&self) -> bool {
            self.running
        }

        async fn capture_still(&mut self) -> Result<Vec<u8>, CaptureError> {
            self.payload.clone().map_err(CaptureError::Device)
        }
    }

    #[tokio::test]
    async fn test_authorized_starts_session() {
        let mut controller = CaptureController::new(StaticAuthorizer::authorized(), FakeCamera::png());
        controller.prepare().await.unwrap();

        assert!(controller.is_running());
        assert_eq!(controller.status(), Some("Camera is ready"));

        let image = controller.capture().await.unwrap();
        assert_eq!((image.width(), image.height()), (2, 2));
        assert_eq!(controller.status(), Some("Image captured"));
    }

    #[tokio::test]
    async fn test_not_determined_granted() {
        let authorizer = StaticAuthorizer::new(AuthorizationStatus::NotDetermined, true);
        let mut controller = CaptureController::new(authorizer, FakeCamera::png());
        controller.prepare().await.unwrap();
        assert!(controller.is_running());
        assert_eq!(controller.authorizer.status(), AuthorizationStatus::Authorized);
    }

    #[tokio::test]
    async fn test_not_determined_refused() {
        let authorizer = StaticAuthorizer::new(AuthorizationStatus::NotDetermined, false);
        let mut controller = CaptureController::new(authorizer, FakeCamera::png());

        let result = controller.prepare().await;
        assert!(matches!(result, Err(CaptureError::PermissionDenied)));
        assert!(!controller.is_running());
        assert_eq!(controller.status(), Some("Camera access was denied"));
    }

    #[tokio::test]
    async fn test_denied_and_restricted() {
        for status in [AuthorizationStatus::Denied, AuthorizationStatus::Restricted] {
            let mut controller =
                CaptureController::new(StaticAuthorizer::new(status, true), FakeCamera::png());
            let result = controller.prepare().await;
            assert!(matches!(result, Err(CaptureError::PermissionRestricted)));
            assert_eq!(controller.device.starts, 0);
            assert!(controller.status().unwrap().contains("Settings"));
        }
    }

    #[tokio::test]
    async fn test_capture_without_session() {
        let mut controller = CaptureController::new(StaticAuthorizer::authorized(), FakeCamera::png());
        let result = controller.capture().await;
        assert!(matches!(result, Err(CaptureError::SessionNotRunning)));
        assert_eq!(controller.status(), Some("Camera session is not running"));
    }

    #[tokio::test]
    async fn test_device_error_and_bad_data() {
        let mut controller = CaptureController::new(
            StaticAuthorizer::authorized(),
            FakeCamera::with_payload(Err("shutter jammed".to_string())),
        );
        controller.prepare().await.unwrap();
        assert!(controller.capture().await.is_err());
        assert_eq!(controller.status(), Some("Error: shutter jammed"));

        let mut controller = CaptureController::new(
            StaticAuthorizer::authorized(),
            FakeCamera::with_payload(Ok(vec![1, 2, 3])),
        );
        controller.prepare().await.unwrap();
        assert!(matches!(controller.capture().await, Err(CaptureError::Decode(_))));
        assert_eq!(controller.status(), Some("Failed to process the image"));
    }

    #[tokio::test]
    async fn test_stop() {
        let mut controller = CaptureController::new(StaticAuthorizer::authorized(), FakeCamera::png());
        controller.prepare().await.unwrap();
        controller.stop().await;
        assert!(!controller.is_running());
    }

    #[tokio::test]
    async fn test_file_camera() {
        use crate::device::FileCamera;

        let temp_dir = tempfile::TempDir::new().unwrap();
        let path = temp_dir.path().join("shot.png");
        let png = CapturedImage::solid_color(3, 5, [0, 0, 0]).unwrap();
        std::fs::write(&path, png.bytes()).unwrap();

        let mut controller = CaptureController::new(StaticAuthorizer::authorized(), FileCamera::new(&path));
        controller.prepare().await.unwrap();
        let image = controller.capture().await.unwrap();
        assert_eq!((image.width(), image.height()), (3, 5));

        let mut missing = CaptureController::new(
            StaticAuthorizer::authorized(),
            FileCamera::new(temp_dir.path().join("missing.png")),
        );
        assert!(matches!(
            missing.prepare().await,
            Err(CaptureError::DeviceUnavailable(_))
        ));
    }
}
