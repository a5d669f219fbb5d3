//! Per-worker report state, accumulated from events

use crate::error::ReportError;
use crate::event::{Event, RunnerStart, SuiteEvent};
use crate::indent::IndentTracker;
use crate::render::Counts;
use crate::stats::TestState;
use std::collections::HashMap;

/// What a reporter knows about one worker
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WorkerState {
    /// Spec files the worker runs
    pub specs: Vec<String>,
    /// Completed tests so far
    pub counts: Counts,
}

/// Bookkeeping for real-time output. Only one exists per reporter; it follows whichever worker
/// started last.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RealtimeContext {
    /// Worker currently being streamed
    pub runner: Option<String>,
    /// Innermost running suite. Cleared when any suite ends.
    pub suite: Option<SuiteEvent>,
    /// Label prefixed to every line of the worker
    pub preface: String,
    /// Whether the worker's header has been printed yet
    pub header_printed: bool,
}

/// Final counts of one worker
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorkerSummary {
    /// Worker id
    pub cid: String,
    /// Spec files the worker ran
    pub specs: Vec<String>,
    /// Completed tests
    pub counts: Counts,
}

/// Final counts of a run, by worker in the order they started
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunSummary {
    /// One entry per worker
    pub workers: Vec<WorkerSummary>,
}

impl RunSummary {
    /// Counts added up across all workers
    pub fn counts(&self) -> Counts {
        self.workers.iter().fold(Counts::default(), |mut acc, w| {
            acc.passing += w.counts.passing;
            acc.pending += w.counts.pending;
            acc.failing += w.counts.failing;
            acc
        })
    }
}

/// Mutable state of a report: per-worker counters and spec lists, suite indentation and, in
/// real-time mode, the active context.
///
/// Worker entries live until the report is dropped. Worker ids aren't reused within a run.
#[derive(Debug, Default)]
pub struct ReportState {
    workers: HashMap<String, WorkerState>,
    order: Vec<String>,
    /// Suite nesting per worker
    pub indents: IndentTracker,
    /// Present when streaming in real time
    pub realtime: Option<RealtimeContext>,
}

impl ReportState {
    /// State for batched output
    pub fn new() -> Self {
        Self::default()
    }

    /// State for real-time output
    pub fn realtime() -> Self {
        Self {
            realtime: Some(RealtimeContext::default()),
            ..Self::default()
        }
    }

    /// Whether output streams as events arrive
    pub fn is_realtime(&self) -> bool {
        self.realtime.is_some()
    }

    /// A worker that has started
    pub fn worker(&self, cid: &str) -> Result<&WorkerState, ReportError> {
        self.workers
            .get(cid)
            .ok_or_else(|| ReportError::UnknownWorker {
                cid: cid.to_string(),
            })
    }

    fn worker_mut(&mut self, cid: &str) -> Result<&mut WorkerState, ReportError> {
        self.workers
            .get_mut(cid)
            .ok_or_else(|| ReportError::UnknownWorker {
                cid: cid.to_string(),
            })
    }

    fn runner_started(&mut self, start: &RunnerStart) {
        if !self.workers.contains_key(&start.cid) {
            self.order.push(start.cid.clone());
        }
        self.workers.insert(
            start.cid.clone(),
            WorkerState {
                specs: start.specs.clone(),
                counts: Counts::default(),
            },
        );
        self.indents.reset(&start.cid);
    }

    /// Update counters and indentation for an event. Events for workers that never started are
    /// rejected without touching anything.
    pub fn apply(&mut self, event: &Event) -> Result<(), ReportError> {
        match event {
            Event::RunnerStart(start) => self.runner_started(start),
            Event::SuiteStart(suite) => {
                self.worker(&suite.cid)?;
                self.indents.record_suite_start(&suite.cid, &suite.uid);
            }
            Event::SuiteEnd(suite) => {
                self.worker(&suite.cid)?;
                self.indents.record_suite_end(&suite.cid);
            }
            Event::TestPending(test) => self.worker_mut(&test.cid)?.counts.add(TestState::Pending),
            Event::TestPass(test) => self.worker_mut(&test.cid)?.counts.add(TestState::Pass),
            Event::TestFail(test) => self.worker_mut(&test.cid)?.counts.add(TestState::Fail),
            Event::RunnerEnd(end) => {
                self.worker(&end.cid)?;
            }
            Event::End => (),
        }
        Ok(())
    }

    /// Number of distinct workers seen
    pub fn worker_count(&self) -> usize {
        self.order.len()
    }

    /// Counts of every worker, in the order they started
    pub fn summary(&self) -> RunSummary {
        let workers = self
            .order
            .iter()
            .filter_map(|cid| {
                self.workers.get(cid).map(|w| WorkerSummary {
                    cid: cid.clone(),
                    specs: w.specs.clone(),
                    counts: w.counts,
                })
            })
            .collect();
        RunSummary { workers }
    }
}
