//! Per-worker suite nesting depth

use crate::error::ReportError;
use std::collections::HashMap;

/// One level of indentation
pub const INDENT_UNIT: &str = "    ";

#[derive(Debug, Default)]
struct WorkerIndent {
    depth: usize,
    suites: HashMap<String, usize>,
}

/// Tracks how deeply each suite of each worker is nested.
///
/// Every worker has a single running depth. It goes up on suite start and down on suite end,
/// whichever suite ended, so siblings at the same level reuse the same value. The depth of a
/// suite is fixed when it starts and never recomputed.
#[derive(Debug, Default)]
pub struct IndentTracker {
    workers: HashMap<String, WorkerIndent>,
}

impl IndentTracker {
    /// Create an empty tracker
    pub fn new() -> Self {
        Self::default()
    }

    /// Forget everything about a worker and start it at depth 0
    pub fn reset(&mut self, cid: &str) {
        self.workers.insert(cid.to_string(), WorkerIndent::default());
    }

    /// Record a suite start, returning the suite's depth
    pub fn record_suite_start(&mut self, cid: &str, uid: &str) -> usize {
        debug_assert!(self.workers.contains_key(cid), "suite start for unknown worker {}", cid);
        let worker = self.workers.entry(cid.to_string()).or_default();
        worker.depth += 1;
        worker.suites.insert(uid.to_string(), worker.depth);
        worker.depth
    }

    /// Record a suite end. Only the worker's running depth changes.
    pub fn record_suite_end(&mut self, cid: &str) {
        match self.workers.get_mut(cid) {
            Some(worker) => worker.depth = worker.depth.saturating_sub(1),
            None => debug_assert!(false, "suite end for unknown worker {}", cid),
        }
    }

    /// The worker's running depth
    pub fn current(&self, cid: &str) -> usize {
        self.workers.get(cid).map(|w| w.depth).unwrap_or(0)
    }

    /// The depth a suite was given when it started
    pub fn depth(&self, cid: &str, uid: &str) -> Result<usize, ReportError> {
        let worker = self
            .workers
            .get(cid)
            .ok_or_else(|| ReportError::UnknownWorker {
                cid: cid.to_string(),
            })?;
        worker
            .suites
            .get(uid)
            .copied()
            .ok_or_else(|| ReportError::UnknownSuite {
                cid: cid.to_string(),
                uid: uid.to_string(),
            })
    }

    /// Indentation for lines belonging to a suite: `depth - 1` units, so top-level suites get
    /// none.
    pub fn render(&self, cid: &str, uid: &str) -> String {
        let depth = match self.depth(cid, uid) {
            Ok(depth) => depth,
            Err(e) => {
                debug_assert!(false, "{}", e);
                0
            }
        };
        INDENT_UNIT.repeat(depth.saturating_sub(1))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn nested_suites_go_deeper() {
        let mut indents = IndentTracker::new();
        indents.reset("0-0");
        assert_eq!(indents.record_suite_start("0-0", "a"), 1);
        assert_eq!(indents.record_suite_start("0-0", "b"), 2);
        assert_eq!(indents.record_suite_start("0-0", "c"), 3);
        assert_eq!(indents.current("0-0"), 3);

        assert_eq!(indents.render("0-0", "a"), "");
        assert_eq!(indents.render("0-0", "b"), "    ");
        assert_eq!(indents.render("0-0", "c"), "        ");

        for _ in 0..3 {
            indents.record_suite_end("0-0");
        }
        assert_eq!(indents.current("0-0"), 0);
    }

    #[test]
    fn siblings_reuse_the_running_depth() {
        let mut indents = IndentTracker::new();
        indents.reset("0-0");
        indents.record_suite_start("0-0", "outer");
        indents.record_suite_start("0-0", "first");
        indents.record_suite_end("0-0");
        indents.record_suite_start("0-0", "second");
        indents.record_suite_end("0-0");
        indents.record_suite_end("0-0");

        assert_eq!(indents.depth("0-0", "first").unwrap(), 2);
        assert_eq!(indents.depth("0-0", "second").unwrap(), 2);
        assert_eq!(indents.current("0-0"), 0);
        // depth is looked up, not recomputed from the running counter
        assert_eq!(indents.render("0-0", "second"), "    ");
    }

    #[test]
    fn ending_any_suite_decrements() {
        let mut indents = IndentTracker::new();
        indents.reset("w");
        indents.record_suite_start("w", "a");
        indents.record_suite_start("w", "b");
        // the engine reported the outer suite ending first; only the counter moves
        indents.record_suite_end("w");
        assert_eq!(indents.current("w"), 1);
        assert_eq!(indents.depth("w", "b").unwrap(), 2);
    }

    #[test]
    fn workers_are_independent() {
        let mut indents = IndentTracker::new();
        indents.reset("0-0");
        indents.reset("0-1");
        indents.record_suite_start("0-0", "s");
        indents.record_suite_start("0-0", "t");
        indents.record_suite_start("0-1", "s");

        assert_eq!(indents.depth("0-0", "t").unwrap(), 2);
        assert_eq!(indents.depth("0-1", "s").unwrap(), 1);
    }

    #[test]
    fn unknown_lookups_are_errors() {
        let mut indents = IndentTracker::new();
        assert!(matches!(
            indents.depth("nope", "s"),
            Err(ReportError::UnknownWorker { .. })
        ));
        indents.reset("0-0");
        assert!(matches!(
            indents.depth("0-0", "s"),
            Err(ReportError::UnknownSuite { .. })
        ));
    }
}
