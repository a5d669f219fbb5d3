//! Run statistics consumed by reporters
//!
//! Reporters never own the suite tree or the timing information of a run. They query a
//! [`RunStats`] collaborator instead, which is fed the same event stream just before each
//! reaction (see [`RunStats::observe`]). [`crate::recorder::Recorder`] is the in-process
//! implementation.

use crate::event::Event;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;

/// Read access to the statistics of a run.
pub trait RunStats: Send + Sync {
    /// Called with every event before reporters react to it. Collectors that are fed some other
    /// way can ignore this.
    fn observe(&self, _event: &Event) {}

    /// The environment a worker executes in
    fn capabilities(&self, cid: &str) -> Capabilities;

    /// The remote session id of a worker
    fn session_id(&self, cid: &str) -> Option<String>;

    /// The host a worker's session runs on
    fn host(&self, cid: &str) -> Option<String>;

    /// All suites a worker ran, in the order they started. Nested suites follow their parent.
    fn suites(&self, cid: &str) -> Vec<SuiteStats>;

    /// How long a worker took
    fn duration(&self, cid: &str) -> Duration;

    /// Every failure of the run, across all workers, in the order they happened
    fn failures(&self) -> Vec<Failure>;

    /// Number of distinct workers that ran
    fn worker_count(&self) -> usize;
}

/// Description of the environment a worker executes in. Every field is optional; missing values
/// render as empty strings.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Capabilities {
    /// Mobile device name
    #[serde(rename = "deviceName", default, skip_serializing_if = "Option::is_none")]
    pub device_name: Option<String>,
    /// Browser name
    #[serde(rename = "browserName", default, skip_serializing_if = "Option::is_none")]
    pub browser_name: Option<String>,
    /// Alternative spelling of `browserName`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub browser: Option<String>,
    /// Browser version
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
    /// Mobile platform version
    #[serde(rename = "platformVersion", default, skip_serializing_if = "Option::is_none")]
    pub platform_version: Option<String>,
    /// Alternative spelling of `version`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub browser_version: Option<String>,
    /// Operating system. Preferred over `platform` when present.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub os: Option<String>,
    /// Operating system version, paired with `os`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub os_version: Option<String>,
    /// Generic platform name
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub platform: Option<String>,
    /// Mobile platform name
    #[serde(rename = "platformName", default, skip_serializing_if = "Option::is_none")]
    pub platform_name: Option<String>,
    /// Application under test, for mobile sessions
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub app: Option<String>,
}

/// The state of a test
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TestState {
    /// Not completed yet
    Unset,
    /// Skipped
    Pending,
    /// Passed
    Pass,
    /// Failed
    Fail,
}

impl Default for TestState {
    fn default() -> Self {
        Self::Unset
    }
}

impl TestState {
    /// Whether the test has completed
    pub fn is_set(&self) -> bool {
        *self != Self::Unset
    }
}

impl fmt::Display for TestState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            TestState::Unset => "",
            TestState::Pending => "pending",
            TestState::Pass => "pass",
            TestState::Fail => "fail",
        };
        f.write_str(s)
    }
}

/// An error produced by a failing test
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TestError {
    /// Error message
    pub message: String,
    /// Stack trace, one frame per line
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stack: Option<String>,
}

impl TestError {
    /// An error with no stack trace
    pub fn new<M: Into<String>>(message: M) -> Self {
        Self {
            message: message.into(),
            stack: None,
        }
    }

    /// Attach a stack trace
    pub fn with_stack<S: Into<String>>(mut self, stack: S) -> Self {
        self.stack = Some(stack.into());
        self
    }
}

/// A test, as recorded after the fact
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TestStats {
    /// Test id
    pub uid: String,
    /// Test title
    pub title: String,
    /// Title of the enclosing suite
    pub parent: Option<String>,
    /// What happened to the test
    pub state: TestState,
    /// Why it failed
    pub error: Option<TestError>,
}

impl TestStats {
    /// A test in the given state
    pub fn new<T: Into<String>>(title: T, state: TestState) -> Self {
        let title = title.into();
        Self {
            uid: title.clone(),
            title,
            parent: None,
            state,
            error: None,
        }
    }
}

/// A suite, as recorded after the fact
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SuiteStats {
    /// Suite id, unique within its worker
    pub uid: String,
    /// Suite title
    pub title: String,
    /// Tests directly inside this suite, in the order they completed
    pub tests: Vec<TestStats>,
}

impl SuiteStats {
    /// An empty suite
    pub fn new<U: Into<String>, T: Into<String>>(uid: U, title: T) -> Self {
        Self {
            uid: uid.into(),
            title: title.into(),
            tests: vec![],
        }
    }
}

/// A failed test, attributed to the worker it ran on
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Failure {
    /// Worker id
    pub cid: String,
    /// Test title
    pub title: String,
    /// Title of the enclosing suite
    pub parent: Option<String>,
    /// The error, if the engine reported one
    pub error: Option<TestError>,
}
