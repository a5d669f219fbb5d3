//! An in-process [`RunStats`] collector
//!
//! The recorder watches the same event stream as the reporters and rebuilds everything they need
//! to ask about afterwards: environments, sessions, timings, the suite tree and the failures.

use crate::event::{Event, RunnerStart, SuiteEvent, TestEvent};
use crate::stats::{Capabilities, Failure, RunStats, SuiteStats, TestState, TestStats};
use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use std::collections::HashMap;
use std::fmt;
use std::time::Duration;

/// Source of timestamps
pub type Clock = Box<dyn Fn() -> DateTime<Utc> + Send + Sync>;

struct WorkerRecord {
    capabilities: Capabilities,
    session_id: Option<String>,
    host: Option<String>,
    started: DateTime<Utc>,
    ended: Option<DateTime<Utc>>,
    suites: Vec<SuiteStats>,
    // indices into `suites` of the suites that are still running
    open: Vec<usize>,
}

impl WorkerRecord {
    fn new(start: &RunnerStart, now: DateTime<Utc>) -> Self {
        Self {
            capabilities: start.capabilities.clone(),
            session_id: start.session_id.clone(),
            host: start.host.clone(),
            started: now,
            ended: None,
            suites: vec![],
            open: vec![],
        }
    }

    fn suite_started(&mut self, suite: &SuiteEvent) {
        self.suites.push(SuiteStats::new(&suite.uid, &suite.title));
        self.open.push(self.suites.len() - 1);
    }

    fn suite_ended(&mut self, suite: &SuiteEvent) {
        let suites = &self.suites;
        match self.open.iter().rposition(|&i| suites[i].uid == suite.uid) {
            Some(pos) => self.open.truncate(pos),
            None => {
                self.open.pop();
            }
        }
    }

    /// Records a completed test and returns the title of the suite it belongs to
    fn test_finished(&mut self, test: &TestEvent, state: TestState) -> Option<String> {
        let current = match self.open.last() {
            Some(&i) => &mut self.suites[i],
            None => return test.parent.clone(),
        };
        let uid = if test.uid.is_empty() {
            test.title.clone()
        } else {
            test.uid.clone()
        };
        let parent = test.parent.clone().or_else(|| Some(current.title.clone()));
        current.tests.push(TestStats {
            uid,
            title: test.title.clone(),
            parent: parent.clone(),
            state,
            error: test.error.clone(),
        });
        parent
    }
}

#[derive(Default)]
struct Inner {
    workers: HashMap<String, WorkerRecord>,
    failures: Vec<Failure>,
}

/// Collects run statistics by observing events
pub struct Recorder {
    clock: Clock,
    inner: Mutex<Inner>,
}

impl fmt::Debug for Recorder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let inner = self.inner.lock();
        f.debug_struct("Recorder")
            .field("workers", &inner.workers.len())
            .field("failures", &inner.failures.len())
            .finish()
    }
}

impl Default for Recorder {
    fn default() -> Self {
        Self::new()
    }
}

impl Recorder {
    /// A recorder using wall clock time
    pub fn new() -> Self {
        Self::with_clock(Box::new(Utc::now))
    }

    /// A recorder using a custom time source. Useful to get stable durations in tests.
    pub fn with_clock(clock: Clock) -> Self {
        Self {
            clock,
            inner: Mutex::new(Inner::default()),
        }
    }

    fn with_worker<T, F>(&self, cid: &str, default: T, f: F) -> T
    where
        F: FnOnce(&WorkerRecord) -> T,
    {
        self.inner.lock().workers.get(cid).map(f).unwrap_or(default)
    }
}

impl RunStats for Recorder {
    fn observe(&self, event: &Event) {
        let now = (self.clock)();
        let mut guard = self.inner.lock();
        let inner = &mut *guard;

        if let Event::RunnerStart(start) = event {
            inner
                .workers
                .insert(start.cid.clone(), WorkerRecord::new(start, now));
            return;
        }

        let cid = match event.cid() {
            Some(cid) => cid,
            None => return,
        };
        let worker = match inner.workers.get_mut(cid) {
            Some(w) => w,
            None => return,
        };

        match event {
            Event::SuiteStart(suite) => worker.suite_started(suite),
            Event::SuiteEnd(suite) => worker.suite_ended(suite),
            Event::TestPending(test) => {
                worker.test_finished(test, TestState::Pending);
            }
            Event::TestPass(test) => {
                worker.test_finished(test, TestState::Pass);
            }
            Event::TestFail(test) => {
                let parent = worker.test_finished(test, TestState::Fail);
                inner.failures.push(Failure {
                    cid: test.cid.clone(),
                    title: test.title.clone(),
                    parent,
                    error: test.error.clone(),
                });
            }
            Event::RunnerEnd(_) => worker.ended = Some(now),
            Event::RunnerStart(_) | Event::End => (),
        }
    }

    fn capabilities(&self, cid: &str) -> Capabilities {
        self.with_worker(cid, Capabilities::default(), |w| w.capabilities.clone())
    }

    fn session_id(&self, cid: &str) -> Option<String> {
        self.with_worker(cid, None, |w| w.session_id.clone())
    }

    fn host(&self, cid: &str) -> Option<String> {
        self.with_worker(cid, None, |w| w.host.clone())
    }

    fn suites(&self, cid: &str) -> Vec<SuiteStats> {
        self.with_worker(cid, vec![], |w| w.suites.clone())
    }

    fn duration(&self, cid: &str) -> Duration {
        self.with_worker(cid, Duration::default(), |w| match w.ended {
            Some(ended) => (ended - w.started).to_std().unwrap_or_default(),
            None => Duration::default(),
        })
    }

    fn failures(&self) -> Vec<Failure> {
        self.inner.lock().failures.clone()
    }

    fn worker_count(&self) -> usize {
        self.inner.lock().workers.len()
    }
}
