//! Camera permission states and the authorizer seam

use async_trait::async_trait;
use std::sync::atomic::{AtomicU8, Ordering};

/// Camera authorization as reported by the platform
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthorizationStatus {
    Authorized,
    /// The user has not been asked yet
    NotDetermined,
    Denied,
    /// Blocked by policy (parental controls, MDM)
    Restricted,
}

/// Source of camera permission decisions
#[async_trait]
pub trait CameraAuthorizer: Send + Sync {
    fn status(&self) -> AuthorizationStatus;

    /// Prompt the user; returns whether access was granted
    async fn request_access(&self) -> bool;
}

/// Authorizer with a fixed status and a fixed answer to the prompt
///
/// After a prompt the status settles to `Authorized` or `Denied` like a
/// real platform would.
#[derive(Debug)]
pub struct StaticAuthorizer {
    status: AtomicU8,
    grant_on_request: bool,
}

impl StaticAuthorizer {
    pub fn new(status: AuthorizationStatus, grant_on_request: bool) -> Self {
        Self {
            status: AtomicU8::new(encode(status)),
            grant_on_request,
        }
    }

    pub fn authorized() -> Self {
        Self::new(AuthorizationStatus::Authorized, true)
    }
}

fn encode(status: AuthorizationStatus) -> u8 {
    match status {
        AuthorizationStatus::Authorized => 0,
        AuthorizationStatus::NotDetermined => 1,
        AuthorizationStatus::Denied => 2,
        AuthorizationStatus::Restricted => 3,
    }
}

fn decode(value: u8) -> AuthorizationStatus {
    match value {
        0 => AuthorizationStatus::Authorized,
        1 => AuthorizationStatus::NotDetermined,
        2 => AuthorizationStatus::Denied,
        _ => AuthorizationStatus::Restricted,
    }
}

#[async_trait]
impl CameraAuthorizer for StaticAuthorizer {
    fn status(&self) -> AuthorizationStatus {
        decode(self.status.load(Ordering::SeqCst))
    }

    async fn request_access(&self) -> bool {
        let settled = if self.grant_on_request {
            AuthorizationStatus::Authorized
        } else {
            AuthorizationStatus::Denied
        };
        self.status.store(encode(settled), Ordering::SeqCst);
        self.grant_on_request
    }
}
