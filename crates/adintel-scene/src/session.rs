//! AR session loop
//!
//! Tracking events arrive over an mpsc channel and are applied to the
//! [`PlacementManager`] one at a time on a single task. Content generation
//! runs on a spawned task and its result comes back over a second channel,
//! so the manager is never touched from two places at once.

use adintel_capture::CapturedImage;
use adintel_content::{AdContentPipeline, ContentError};
use adintel_core::{Anchor, AnchorId, Pose, Settings};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{mpsc, watch};
use tracing::{debug, info, warn};

use crate::manager::{PlacementManager, TickTicket};
use crate::types::PlacementStatus;

const EVENT_BUFFER: usize = 64;

/// Input from the tracking system
#[derive(Debug, Clone)]
pub enum ArEvent {
    AnchorAdded(Anchor),
    AnchorUpdated(Anchor),
    AnchorRemoved(AnchorId),
    /// Per-frame camera update; `timestamp` is time since session start
    FrameTick {
        pose: Pose,
        timestamp: Duration,
        frame: Option<Arc<CapturedImage>>,
    },
    SettingsChanged(Settings),
}

type TickResult = (TickTicket, Result<String, ContentError>);

/// Handle for feeding a running session and watching its status
#[derive(Clone)]
pub struct SessionHandle {
    events: mpsc::Sender<ArEvent>,
    status: watch::Receiver<PlacementStatus>,
}

impl SessionHandle {
    pub async fn send(&self, event: ArEvent) -> Result<(), mpsc::error::SendError<ArEvent>> {
        self.events.send(event).await
    }

    pub fn status(&self) -> PlacementStatus {
        self.status.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<PlacementStatus> {
        self.status.clone()
    }
}

pub struct ArSession {
    manager: PlacementManager,
    pipeline: AdContentPipeline,
    events: mpsc::Receiver<ArEvent>,
    status: watch::Sender<PlacementStatus>,
}

impl ArSession {
    pub fn new(manager: PlacementManager, pipeline: AdContentPipeline) -> (Self, SessionHandle) {
        let (events_tx, events_rx) = mpsc::channel(EVENT_BUFFER);
        let (status_tx, status_rx) = watch::channel(manager.status().clone());

        let session = Self {
            manager,
            pipeline,
            events: events_rx,
            status: status_tx,
        };
        let handle = SessionHandle {
            events: events_tx,
            status: status_rx,
        };
        (session, handle)
    }

    /// Run until every [`SessionHandle`] is dropped, then finish any
    /// in-flight refresh and hand back the manager.
    pub async fn run(mut self) -> PlacementManager {
        let (done_tx, mut done_rx) = mpsc::channel::<TickResult>(1);
        info!("AR session started");

        loop {
            tokio::select! {
                biased;

                event = self.events.recv() => {
                    match event {
                        Some(event) => self.handle_event(event, &done_tx),
                        None => break,
                    }
                }

                Some((ticket, result)) = done_rx.recv() => {
                    self.manager.complete_tick(ticket, result);
                }
            }
            self.publish_status();
        }

        drop(done_tx);
        if self.manager.is_busy() {
            debug!("Waiting for in-flight refresh");
            if let Some((ticket, result)) = done_rx.recv().await {
                self.manager.complete_tick(ticket, result);
                self.publish_status();
            }
        }

        info!(ads = self.manager.ad_count(), "AR session ended");
        self.manager
    }

    fn handle_event(&mut self, event: ArEvent, done_tx: &mpsc::Sender<TickResult>) {
        match event {
            ArEvent::AnchorAdded(anchor) => {
                self.manager.on_anchor_detected(anchor);
            }
            ArEvent::AnchorUpdated(anchor) => self.manager.on_anchor_updated(anchor),
            ArEvent::AnchorRemoved(id) => self.manager.on_anchor_removed(id),
            ArEvent::SettingsChanged(settings) => self.manager.apply_settings(&settings),
            ArEvent::FrameTick {
                pose,
                timestamp,
                frame,
            } => {
                let Some(ticket) = self.manager.begin_tick(pose, timestamp) else {
                    return;
                };

                let pipeline = self.pipeline.clone();
                let done_tx = done_tx.clone();
                tokio::spawn(async move {
                    let result = pipeline.produce(frame.as_deref()).await;
                    if done_tx.send((ticket, result)).await.is_err() {
                        warn!("Session ended before refresh completed");
                    }
                });
            }
        }
    }

    fn publish_status(&self) {
        self.status.send_if_modified(|current| {
            if current != self.manager.status() {
                *current = self.manager.status().clone();
                true
            } else {
                false
            }
        });
    }
}
