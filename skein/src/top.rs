//! Top level report driver

use crate::event::Event;
use crate::options::{ColorChoice, ReportOptions, ReportOptionsBuilder};
use crate::recorder::Recorder;
use crate::reporter::{DefaultReporter, Reporter, RunContext};
use crate::stats::RunStats;
use async_broadcast as broadcast;
use clap::App;
use futures::channel::mpsc;
use futures::future::join_all;
use futures::join;
use futures::{SinkExt, StreamExt};
use std::sync::Arc;
use tracing::{debug, info};

/// Sending half of a run's event queue. Each worker gets a clone.
pub type EventSender = mpsc::Sender<Event>;

/// Receiving half of a run's event queue
pub type EventReceiver = mpsc::Receiver<Event>;

/// Top level reporter. Takes the engine's events and hands them to every reporter.
pub struct Skein {
    reporters: Vec<Box<dyn Reporter>>,
    options: Arc<ReportOptions>,
    stats: Arc<dyn RunStats>,
}

impl Skein {
    /// Create a [`SkeinBuilder`] to customize this instance.
    pub fn builder() -> SkeinBuilder {
        SkeinBuilder::new()
    }

    /// The event queue of a run. Workers may run concurrently, but their events must all go
    /// through this one queue so that reporters see them one at a time.
    pub fn channel() -> (EventSender, EventReceiver) {
        mpsc::channel(256)
    }

    /// The options reporters will see
    pub fn options(&self) -> &Arc<ReportOptions> {
        &self.options
    }

    /// Report on events until the queue closes. Returns the first reporter error, if any.
    pub async fn run(mut self, events: EventReceiver) -> anyhow::Result<()> {
        info!(
            reporters = self.reporters.len(),
            realtime = self.options.realtime,
            "report starting"
        );

        let run = Arc::new(RunContext {
            options: self.options.clone(),
            stats: self.stats.clone(),
        });
        let (events_tx, events_rx) = broadcast::broadcast(256);

        let reporters: Vec<_> = self
            .reporters
            .drain(..)
            .map(|r| r.report(run.clone(), events_rx.clone()))
            .collect();
        let reporters = join_all(reporters);

        // Let them all run to completion
        drop(events_rx);
        let forward = Self::forward(self.stats.clone(), events, events_tx);
        let ((), results) = join!(forward, reporters);

        info!("report finished");
        results.into_iter().find(Result::is_err).unwrap_or(Ok(()))
    }

    /// Report on a fixed list of events
    pub async fn replay<I>(self, events: I) -> anyhow::Result<()>
    where
        I: IntoIterator<Item = Event>,
    {
        let (mut tx, rx) = Self::channel();
        let produce = async move {
            for event in events {
                if tx.send(event).await.is_err() {
                    break;
                }
            }
        };

        let (_, result) = join!(produce, self.run(rx));
        result
    }

    async fn forward(
        stats: Arc<dyn RunStats>,
        mut events: EventReceiver,
        reporters: broadcast::Sender<Event>,
    ) {
        // stats go first, so they are never behind what a reporter is looking at
        while let Some(event) = events.next().await {
            stats.observe(&event);
            // the channel closes once every reporter has returned, errors included
            if reporters.broadcast(event).await.is_err() {
                debug!("no reporters left, dropping remaining events");
                break;
            }
        }
    }
}

/// A builder for [`Skein`]
pub struct SkeinBuilder {
    options_builder: ReportOptionsBuilder,
    reporters: Vec<Box<dyn Reporter>>,
    stats: Option<Arc<dyn RunStats>>,
}

impl Default for SkeinBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl SkeinBuilder {
    /// Create a new [`SkeinBuilder`]
    pub fn new() -> Self {
        Self {
            options_builder: ReportOptionsBuilder::new(),
            reporters: vec![],
            stats: None,
        }
    }

    /// Create a [`Skein`] without looking at the command line. This resets the builder to its
    /// default state.
    pub fn build(&mut self) -> Skein {
        let options = self.options_builder.build();
        self.finish(options)
    }

    /// Create a [`Skein`] using a specified set of command line arguments. Report options are
    /// added to `app`. This resets the builder to its default state.
    pub fn build_with_app_from<I, T>(
        &mut self,
        app: App<'static, '_>,
        iter: I,
    ) -> anyhow::Result<Skein>
    where
        I: IntoIterator<Item = T>,
        T: Into<std::ffi::OsString> + Clone,
    {
        let options = self.options_builder.build_with_app_from(app, iter)?;
        Ok(self.finish(options))
    }

    fn finish(&mut self, options: ReportOptions) -> Skein {
        if self.reporters.is_empty() {
            self.reporter(DefaultReporter::default());
        }

        let mut obj = Self::new();
        std::mem::swap(&mut obj, self);
        let SkeinBuilder {
            reporters, stats, ..
        } = obj;

        Skein {
            reporters,
            options: Arc::new(options),
            stats: stats.unwrap_or_else(|| Arc::new(Recorder::new())),
        }
    }

    /// How many workers the engine runs at once. Exactly one streams output as events arrive.
    pub fn max_instances(&mut self, n: usize) -> &mut Self {
        self.options_builder.max_instances(n);
        self
    }

    /// When to color output. Default is never, unless set from the command line.
    pub fn color(&mut self, color: ColorChoice) -> &mut Self {
        self.options_builder.color(color);
        self
    }

    /// Glyph shown for passing tests
    pub fn ok_glyph<T: Into<String>>(&mut self, glyph: T) -> &mut Self {
        self.options_builder.ok_glyph(glyph);
        self
    }

    /// Lines to print after the cross-worker summary
    pub fn epilogue<F>(&mut self, epilogue: F) -> &mut Self
    where
        F: Fn(&dyn RunStats) -> Vec<String> + Send + Sync + 'static,
    {
        self.options_builder.epilogue(epilogue);
        self
    }

    /// Use an external statistics collector instead of recording one from the events
    pub fn stats(&mut self, stats: Arc<dyn RunStats>) -> &mut Self {
        self.stats = Some(stats);
        self
    }

    /// Add a reporter. Multiple reporters may be added. If no reporters are added, a
    /// [`DefaultReporter`] printing to stdout is used.
    pub fn reporter<T: Reporter + 'static>(&mut self, reporter: T) -> &mut Self {
        self.reporters.push(Box::new(reporter));
        self
    }
}
