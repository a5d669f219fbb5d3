//! A trivial reporter that grabs the final counts
use super::{Reporter, RunContext};
use crate::event::Event;
use crate::state::{ReportState, RunSummary};
use anyhow;
use async_broadcast as broadcast;
use async_trait::async_trait;
use futures::channel::oneshot;
use futures::StreamExt;
use std::sync::Arc;
use tracing::warn;

/// A reporter that just sends the final per-worker counts somewhere. Often useful for tests or
/// custom follow-on processing.
pub struct Collect {
    dest: oneshot::Sender<RunSummary>,
}

impl Collect {
    /// Create a new `Collect` object and a corresponding receiver for the run summary
    pub fn new() -> (Self, oneshot::Receiver<RunSummary>) {
        let (tx, rx) = oneshot::channel();
        (Self { dest: tx }, rx)
    }
}

#[async_trait]
impl Reporter for Collect {
    async fn report(
        self: Box<Self>,
        _run: Arc<RunContext>,
        mut events: broadcast::Receiver<Event>,
    ) -> anyhow::Result<()> {
        let mut state = ReportState::new();

        while let Some(event) = events.next().await {
            if let Err(e) = state.apply(&event) {
                warn!(event = event.name(), "dropping event: {}", e);
            }
        }

        let _ = self.dest.send(state.summary());
        Ok(())
    }
}
