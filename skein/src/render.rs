//! Text blocks making up the report
//!
//! Every function here returns the lines of one block without printing anything. Lines don't
//! carry a trailing newline. Most blocks are prefixed line by line with the worker's *preface*,
//! a bracketed label naming the environment and the worker, e.g. `[chrome 100 Windows #0-0]`.

use crate::duration::format_duration;
use crate::environment::describe;
use crate::indent::IndentTracker;
use crate::stats::{Capabilities, Failure, SuiteStats, TestState};
use crate::symbol::{color_for, ColorKind, Symbols, Theme};
use std::time::Duration;

/// Suites whose id or title starts with this are setup hooks, not real suites
pub const BEFORE_ALL_MARKER: &str = "\"before all\" hook";

const RULE: &str = "------------------------------------------------------------------";
const BANNER: &str = "==================================================================";

/// Passing, pending and failing test counts
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Counts {
    /// Passed tests
    pub passing: usize,
    /// Skipped tests
    pub pending: usize,
    /// Failed tests
    pub failing: usize,
}

impl Counts {
    /// Count one more test in the given state
    pub fn add(&mut self, state: TestState) {
        match state {
            TestState::Pass => self.passing += 1,
            TestState::Pending => self.pending += 1,
            TestState::Fail => self.failing += 1,
            TestState::Unset => (),
        }
    }

    /// Total completed tests
    pub fn total(&self) -> usize {
        self.passing + self.pending + self.failing
    }
}

/// The label every line of a worker is prefixed with
pub fn preface(caps: &Capabilities, cid: &str) -> String {
    format!("[{} #{}]", describe(caps, false), cid)
}

/// Whether a suite is a before-all hook rather than a real suite
pub fn is_before_all(suite: &SuiteStats) -> bool {
    suite.uid.starts_with(BEFORE_ALL_MARKER) || suite.title.starts_with(BEFORE_ALL_MARKER)
}

/// The block opening a worker's output: a rule, its session, its spec files and where it runs
pub fn header(
    preface: &str,
    session_id: Option<&str>,
    specs: &[String],
    caps: &Capabilities,
) -> Vec<String> {
    let label = if specs.len() > 1 { "Specs" } else { "Spec" };
    vec![
        format!("{} {}", preface, RULE),
        format!("{} Session ID: {}", preface, session_id.unwrap_or("")),
        format!("{} {}: {}", preface, label, specs.join(", ")),
        format!("{} Running: {}", preface, describe(caps, true)),
    ]
}

/// A blank line followed by the suite title
pub fn suite_header(preface: &str, indent: &str, title: &str) -> Vec<String> {
    vec![
        preface.to_string(),
        format!("{} {}{}", preface, indent, title),
    ]
}

/// One test result. Test lines sit three spaces further in than their suite's header.
pub fn test_line(
    theme: &Theme,
    preface: &str,
    indent: &str,
    state: TestState,
    glyph: &str,
    title: &str,
) -> String {
    format!(
        "{}    {}{} {}",
        preface,
        indent,
        theme.paint(color_for(state), glyph),
        title
    )
}

/// Every suite and completed test of a worker, in the order given.
///
/// Before-all hooks don't get a header, but any tests recorded under them are still listed.
/// Tests that never completed are left out. Each failing test takes the next number from
/// `symbols`.
pub fn suite_tree(
    theme: &Theme,
    symbols: &mut Symbols,
    indents: &IndentTracker,
    preface: &str,
    cid: &str,
    suites: &[SuiteStats],
) -> Vec<String> {
    let mut lines = vec![];
    for suite in suites {
        let indent = indents.render(cid, &suite.uid);
        if !is_before_all(suite) {
            lines.extend(suite_header(preface, &indent, &suite.title));
        }

        for test in suite.tests.iter().filter(|t| t.state.is_set()) {
            let glyph = symbols.symbol_for(test.state);
            lines.push(test_line(theme, preface, &indent, test.state, &glyph, &test.title));
        }
    }
    lines
}

/// Passing, pending and failing counts, one line each, skipping zeros. Only the first line
/// printed carries the duration.
pub fn summary(theme: &Theme, preface: &str, counts: &Counts, duration: Duration) -> Vec<String> {
    let rows = [
        (counts.passing, "passing", ColorKind::Green),
        (counts.pending, "pending", ColorKind::Pending),
        (counts.failing, "failing", ColorKind::Fail),
    ];

    let mut lines: Vec<String> = vec![];
    for (count, name, color) in rows {
        if count == 0 {
            continue;
        }

        let mut line = format!(
            "{} {} {}",
            preface,
            theme.paint(Some(color), count.to_string()),
            theme.paint(Some(color), name)
        );
        if lines.is_empty() {
            line.push_str(&format!(" ({})", format_duration(duration)));
        }
        lines.push(line);
    }
    lines
}

/// Numbered failures with their messages and stack traces
pub fn failures<'a, I>(theme: &Theme, preface: &str, failures: I) -> Vec<String>
where
    I: IntoIterator<Item = &'a Failure>,
{
    let mut lines = vec![];
    for (n, failure) in failures.into_iter().enumerate() {
        lines.push(preface.to_string());

        let title = match &failure.parent {
            Some(parent) => format!("{} {}", parent, failure.title),
            None => failure.title.clone(),
        };
        lines.push(format!("{} {}) {}", preface, n + 1, title));

        let error = match &failure.error {
            Some(e) => e,
            None => {
                lines.push(format!("{} no stack available", preface));
                continue;
            }
        };

        lines.push(format!(
            "{} {}",
            preface,
            theme.paint(Some(ColorKind::Fail), &error.message)
        ));
        match &error.stack {
            Some(stack) => lines.extend(stack.lines().map(|line| {
                // blank lines still carry the preface
                if line.trim().is_empty() {
                    preface.to_string()
                } else {
                    format!("{} {}", preface, line)
                }
            })),
            None => lines.push(format!("{} no stack available", preface)),
        }
    }
    lines
}

/// Link to the job's page, for sessions that ran on Sauce Labs
pub fn job_link(preface: &str, host: Option<&str>, session_id: Option<&str>) -> Vec<String> {
    let (host, session_id) = match (host, session_id) {
        (Some(host), Some(session_id)) if host.contains("saucelabs.com") => (host, session_id),
        _ => return vec![],
    };

    let domain = host.strip_prefix("ondemand.").unwrap_or(host);
    let domain = if domain.starts_with("app.") {
        domain.to_string()
    } else {
        format!("app.{}", domain)
    };
    vec![
        preface.to_string(),
        format!(
            "{} Check out job at https://{}/tests/{}",
            preface, domain, session_id
        ),
    ]
}

/// The closing block of a run with several workers
pub fn run_summary(workers: usize) -> Vec<String> {
    vec![
        String::new(),
        BANNER.to_string(),
        format!("Number of specs: {}", workers),
    ]
}
