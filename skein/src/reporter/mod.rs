//! Writes output given lifecycle events

use crate::event::Event;
use crate::options::ReportOptions;
use crate::stats::RunStats;
use anyhow;
use async_broadcast as broadcast;
use async_std::io::Stdout;
use async_trait::async_trait;
use std::sync::Arc;

pub mod collect;
pub mod spec;
pub use collect::*;
pub use spec::*;

/// Everything a reporter may consult besides the events themselves
pub struct RunContext {
    /// Report options
    pub options: Arc<ReportOptions>,
    /// Statistics of the run. Always observes an event before reporters see it.
    pub stats: Arc<dyn RunStats>,
}

/// A Reporter takes [`crate::Event`]s from the engine and creates an output report from them.
#[async_trait]
pub trait Reporter: Send + Sync {
    /// Create an output report from input events. Returns once the event stream closes.
    async fn report(
        self: Box<Self>,
        run: Arc<RunContext>,
        events: broadcast::Receiver<Event>,
    ) -> anyhow::Result<()>;
}

/// The default type of reporter to create if none are specified
pub type DefaultReporter = SpecReporter<Stdout>;
