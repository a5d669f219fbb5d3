//! Spec-style output: suites and tests as an indented tree, per worker
//!
//! With a single worker running at a time the tree is streamed as events arrive. Otherwise each
//! worker's report is printed in one piece once the worker ends, rebuilt from the run's
//! statistics, so reports of concurrent workers never interleave.
use super::{Reporter, RunContext};
use crate::error::ReportError;
use crate::event::{Event, RunnerEnd, RunnerStart, SuiteEvent, TestEvent};
use crate::options::ReportOptions;
use crate::render;
use crate::state::{RealtimeContext, ReportState};
use crate::stats::{RunStats, TestState};
use crate::symbol::Symbols;
use anyhow;
use async_broadcast as broadcast;
use async_std::io::{stdout, Stdout};
use async_trait::async_trait;
use futures::io::{AllowStdIo, AsyncWrite, AsyncWriteExt};
use futures::stream::StreamExt;
use std::io::Write;
use std::sync::Arc;
use tracing::{debug, warn};

/// Reporter that prints a spec-style tree to a stream
pub struct SpecReporter<T: AsyncWrite> {
    out: T,
}

impl<T: AsyncWrite + Send + Sync + 'static> From<T> for SpecReporter<T> {
    fn from(out: T) -> Self {
        Self { out }
    }
}

impl<T: Write + Send + Sync + 'static> From<T> for SpecReporter<AllowStdIo<T>> {
    fn from(out: T) -> Self {
        Self {
            out: AllowStdIo::new(out),
        }
    }
}

impl Default for SpecReporter<Stdout> {
    fn default() -> Self {
        Self::from(stdout())
    }
}

#[async_trait]
impl<T: AsyncWrite + Send + Sync + 'static> Reporter for SpecReporter<T> {
    async fn report(
        self: Box<Self>,
        run: Arc<RunContext>,
        events: broadcast::Receiver<Event>,
    ) -> anyhow::Result<()> {
        self.execute(run, events).await
    }
}

impl<T: AsyncWrite + Send + Sync + 'static> SpecReporter<T> {
    async fn execute(
        self,
        run: Arc<RunContext>,
        mut events: broadcast::Receiver<Event>,
    ) -> anyhow::Result<()> {
        let mut dispatcher = Dispatcher::new(run.options.clone(), run.stats.clone());
        let mut ended = false;

        let out = self.out;
        futures::pin_mut!(out);

        while let Some(event) = events.next().await {
            ended |= event == Event::End;

            let lines = dispatcher.react(&event);
            if lines.is_empty() {
                continue;
            }

            let mut text = lines.join("\n");
            text.push('\n');
            out.write_all(text.as_bytes())
                .await
                .map_err(ReportError::from)?;
            out.flush().await.map_err(ReportError::from)?;
        }

        if !ended {
            return Err(ReportError::Closed.into());
        }
        Ok(())
    }
}

/// The reaction table behind [`SpecReporter`]: updates the report state for each event and
/// returns the lines to print, if any.
///
/// Real-time mode is chosen once from the options and assumes at most one worker is active at a
/// time. If several are, their lines interleave.
pub struct Dispatcher {
    options: Arc<ReportOptions>,
    stats: Arc<dyn RunStats>,
    state: ReportState,
    // Numbers failing tests. Shared by the whole run when streaming, reset for every worker
    // report otherwise.
    symbols: Symbols,
}

impl Dispatcher {
    /// Create a dispatcher. `stats` must have observed each event before it is passed to
    /// [`Dispatcher::react`].
    pub fn new(options: Arc<ReportOptions>, stats: Arc<dyn RunStats>) -> Self {
        let state = if options.realtime {
            ReportState::realtime()
        } else {
            ReportState::new()
        };
        let symbols = Symbols::new(&options.theme);

        Self {
            options,
            stats,
            state,
            symbols,
        }
    }

    /// The accumulated report state
    pub fn state(&self) -> &ReportState {
        &self.state
    }

    /// React to one event. Events for workers that never started are dropped with a warning.
    pub fn react(&mut self, event: &Event) -> Vec<String> {
        debug!(cid = event.cid().unwrap_or("-"), event = event.name(), "dispatching");

        if let Err(e) = self.state.apply(event) {
            warn!(event = event.name(), "dropping event: {}", e);
            return vec![];
        }

        match event {
            Event::RunnerStart(start) => self.runner_start(start),
            Event::SuiteStart(suite) => self.suite_start(suite),
            Event::SuiteEnd(_) => self.suite_end(),
            Event::TestPending(test) => self.test_end(test, TestState::Pending),
            Event::TestPass(test) => self.test_end(test, TestState::Pass),
            Event::TestFail(test) => self.test_end(test, TestState::Fail),
            Event::RunnerEnd(end) => self.runner_end(end),
            Event::End => self.end(),
        }
    }

    fn runner_start(&mut self, start: &RunnerStart) -> Vec<String> {
        if let Some(ctx) = self.state.realtime.as_mut() {
            let caps = self.stats.capabilities(&start.cid);
            *ctx = RealtimeContext {
                runner: Some(start.cid.clone()),
                suite: None,
                preface: render::preface(&caps, &start.cid),
                header_printed: false,
            };
        }
        vec![]
    }

    fn suite_start(&mut self, suite: &SuiteEvent) -> Vec<String> {
        if !self.state.is_realtime() {
            return vec![];
        }

        let indent = self.state.indents.render(&suite.cid, &suite.uid);
        let specs = self
            .state
            .worker(&suite.cid)
            .map(|w| w.specs.clone())
            .unwrap_or_default();
        let ctx = match self.state.realtime.as_mut() {
            Some(ctx) => ctx,
            None => return vec![],
        };
        ctx.suite = Some(suite.clone());

        let mut lines = vec![];
        if !ctx.header_printed {
            ctx.header_printed = true;
            lines.extend(render::header(
                &ctx.preface,
                self.stats.session_id(&suite.cid).as_deref(),
                &specs,
                &self.stats.capabilities(&suite.cid),
            ));
        }
        lines.extend(render::suite_header(&ctx.preface, &indent, &suite.title));
        lines
    }

    fn suite_end(&mut self) -> Vec<String> {
        if let Some(ctx) = self.state.realtime.as_mut() {
            ctx.suite = None;
        }
        vec![]
    }

    fn test_end(&mut self, test: &TestEvent, state: TestState) -> Vec<String> {
        let ctx = match self.state.realtime.as_ref() {
            Some(ctx) => ctx,
            None => return vec![],
        };

        // a test reported after its suite ended has nothing to indent by
        let indent = match &ctx.suite {
            Some(suite) => self.state.indents.render(&suite.cid, &suite.uid),
            None => String::new(),
        };
        let glyph = self.symbols.symbol_for(state);
        vec![render::test_line(
            &self.options.theme,
            &ctx.preface,
            &indent,
            state,
            &glyph,
            &test.title,
        )]
    }

    fn runner_end(&mut self, end: &RunnerEnd) -> Vec<String> {
        let cid = end.cid.as_str();
        let theme = &self.options.theme;
        let counts = match self.state.worker(cid) {
            Ok(worker) => worker.counts,
            Err(_) => return vec![],
        };
        let caps = self.stats.capabilities(cid);
        let preface = render::preface(&caps, cid);
        let duration = self.stats.duration(cid);

        if self.state.is_realtime() {
            let summary = render::summary(theme, &preface, &counts, duration);
            if summary.is_empty() {
                return vec![];
            }
            let mut lines = vec![preface];
            lines.extend(summary);
            return lines;
        }

        let suites = self.stats.suites(cid);
        if suites.is_empty() {
            debug!(cid, "no suites ran, skipping report");
            return vec![];
        }

        let session_id = self.stats.session_id(cid);
        let specs = self
            .state
            .worker(cid)
            .map(|w| w.specs.clone())
            .unwrap_or_default();

        self.symbols.reset_errors();
        let mut lines = render::header(&preface, session_id.as_deref(), &specs, &caps);
        lines.extend(render::suite_tree(
            theme,
            &mut self.symbols,
            &self.state.indents,
            &preface,
            cid,
            &suites,
        ));
        lines.push(preface.clone());
        lines.extend(render::summary(theme, &preface, &counts, duration));

        let failures = self.stats.failures();
        lines.extend(render::failures(
            theme,
            &preface,
            failures.iter().filter(|f| f.cid == cid),
        ));
        lines.extend(render::job_link(
            &preface,
            self.stats.host(cid).as_deref(),
            session_id.as_deref(),
        ));
        lines
    }

    fn end(&mut self) -> Vec<String> {
        let workers = self.stats.worker_count();
        if workers <= 1 {
            return vec![];
        }

        let mut lines = render::run_summary(workers);
        if let Some(epilogue) = &self.options.epilogue {
            lines.extend(epilogue(self.stats.as_ref()));
        }
        lines
    }
}
