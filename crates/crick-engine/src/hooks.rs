//! Fire-and-forget collaborator hooks: notification dispatch and player
//! career aggregation.
//!
//! A scorer never calls a collaborator directly. It queues a [`HookEvent`]
//! on an unbounded channel and returns; a single [`HookDispatcher`] task
//! drains the queue in order. Failures are logged and swallowed; they never
//! fail, delay or roll back the scoring call that triggered them.

use std::sync::Arc;

use async_trait::async_trait;
use crick_ledger::InningsStats;
use crick_types::MatchId;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, warn};

use crate::result::MatchResult;

#[derive(Debug, Error)]
pub enum HookError {
    #[error("notification dispatch failed: {0}")]
    Dispatch(String),

    #[error("career sync failed: {0}")]
    CareerSync(String),

    #[error("hook channel closed")]
    ChannelClosed,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum NoticeKind {
    Wicket,
    Milestone,
    InningsComplete,
    MatchComplete,
}

/// Plain-text notification handed to the dispatch collaborator.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Notification {
    pub match_id: MatchId,
    pub kind: NoticeKind,
    pub title: String,
    pub body: String,
}

/// Per-match figures folded into long-run player records.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CareerRecord {
    pub match_id: MatchId,
    pub result: MatchResult,
    pub innings: Vec<InningsStats>,
}

#[async_trait]
pub trait Notifier: Send + Sync {
    async fn notify(&self, notification: &Notification) -> Result<(), HookError>;
}

#[async_trait]
pub trait CareerSync: Send + Sync {
    /// Called once when a match reaches `Finished`.
    async fn apply(&self, record: &CareerRecord) -> Result<(), HookError>;

    /// Called when an undo reopens a match that was already applied.
    async fn retract(&self, match_id: MatchId) -> Result<(), HookError>;
}

pub struct NoOpHooks;

#[async_trait]
impl Notifier for NoOpHooks {
    async fn notify(&self, _notification: &Notification) -> Result<(), HookError> {
        Ok(())
    }
}

#[async_trait]
impl CareerSync for NoOpHooks {
    async fn apply(&self, _record: &CareerRecord) -> Result<(), HookError> {
        Ok(())
    }

    async fn retract(&self, _match_id: MatchId) -> Result<(), HookError> {
        Ok(())
    }
}

/// Forwards notifications to an unbounded channel drained elsewhere.
pub struct ChannelNotifier {
    tx: mpsc::UnboundedSender<Notification>,
}

impl ChannelNotifier {
    pub fn new() -> (Self, mpsc::UnboundedReceiver<Notification>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { tx }, rx)
    }
}

#[async_trait]
impl Notifier for ChannelNotifier {
    async fn notify(&self, notification: &Notification) -> Result<(), HookError> {
        self.tx
            .send(notification.clone())
            .map_err(|_| HookError::ChannelClosed)
    }
}

/// Work queued by a scorer for the collaborators.
#[derive(Clone, Debug)]
pub enum HookEvent {
    Notify(Notification),
    ApplyCareer(CareerRecord),
    RetractCareer(MatchId),
}

/// Owns the collaborators and runs them off the scoring path.
pub struct HookDispatcher {
    notifier: Arc<dyn Notifier>,
    career: Arc<dyn CareerSync>,
}

impl Default for HookDispatcher {
    fn default() -> Self {
        Self {
            notifier: Arc::new(NoOpHooks),
            career: Arc::new(NoOpHooks),
        }
    }
}

impl HookDispatcher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_notifier(mut self, notifier: Arc<dyn Notifier>) -> Self {
        self.notifier = notifier;
        self
    }

    pub fn with_career_sync(mut self, career: Arc<dyn CareerSync>) -> Self {
        self.career = career;
        self
    }

    /// Start draining on the current tokio runtime. The task ends once
    /// every [`Hooks`] clone is dropped and the queue is empty.
    pub fn spawn(self) -> (Hooks, JoinHandle<()>) {
        let (tx, rx) = mpsc::unbounded_channel();
        let handle = tokio::spawn(self.run(rx));
        (Hooks { tx: Some(tx) }, handle)
    }

    async fn run(self, mut rx: mpsc::UnboundedReceiver<HookEvent>) {
        while let Some(event) = rx.recv().await {
            self.dispatch(event).await;
        }
        debug!("hook dispatcher stopped");
    }

    async fn dispatch(&self, event: HookEvent) {
        match event {
            HookEvent::Notify(notification) => {
                if let Err(err) = self.notifier.notify(&notification).await {
                    warn!(
                        match_id = %notification.match_id,
                        kind = ?notification.kind,
                        error = %err,
                        "notification dropped"
                    );
                }
            }
            HookEvent::ApplyCareer(record) => {
                if let Err(err) = self.career.apply(&record).await {
                    warn!(match_id = %record.match_id, error = %err, "career sync failed");
                }
            }
            HookEvent::RetractCareer(match_id) => {
                if let Err(err) = self.career.retract(match_id).await {
                    warn!(match_id = %match_id, error = %err, "career retraction failed");
                }
            }
        }
    }
}

/// Sending half a scorer reports through. The default is detached and
/// discards every event.
#[derive(Clone, Default)]
pub struct Hooks {
    tx: Option<mpsc::UnboundedSender<HookEvent>>,
}

impl Hooks {
    pub fn is_attached(&self) -> bool {
        self.tx.is_some()
    }

    fn send(&self, event: HookEvent) {
        let Some(tx) = &self.tx else {
            return;
        };
        if tx.send(event).is_err() {
            warn!("hook dispatcher has stopped; event dropped");
        }
    }

    pub(crate) fn notify(&self, notification: Notification) {
        self.send(HookEvent::Notify(notification));
    }

    pub(crate) fn sync_career(&self, record: CareerRecord) {
        self.send(HookEvent::ApplyCareer(record));
    }

    pub(crate) fn retract_career(&self, match_id: MatchId) {
        self.send(HookEvent::RetractCareer(match_id));
    }
}
