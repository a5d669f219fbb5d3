//! Lifecycle events sent to reporters

use crate::stats::{Capabilities, TestError};
use serde::{Deserialize, Serialize};

/// A lifecycle event emitted by the test-execution engine. Events from one worker arrive in
/// execution order; events from different workers may interleave arbitrarily.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event")]
pub enum Event {
    /// A worker has started and is about to run its spec files.
    #[serde(rename = "runner:start")]
    RunnerStart(RunnerStart),
    /// A suite has started
    #[serde(rename = "suite:start")]
    SuiteStart(SuiteEvent),
    /// A suite has finished
    #[serde(rename = "suite:end")]
    SuiteEnd(SuiteEvent),
    /// A test was skipped
    #[serde(rename = "test:pending")]
    TestPending(TestEvent),
    /// A test passed
    #[serde(rename = "test:pass")]
    TestPass(TestEvent),
    /// A test failed
    #[serde(rename = "test:fail")]
    TestFail(TestEvent),
    /// A worker has finished
    #[serde(rename = "runner:end")]
    RunnerEnd(RunnerEnd),
    /// Every worker has finished. Always the last event of a run.
    #[serde(rename = "end")]
    End,
}

impl Event {
    /// The worker this event belongs to, if any. [`Event::End`] belongs to no worker.
    pub fn cid(&self) -> Option<&str> {
        match self {
            Event::RunnerStart(e) => Some(&e.cid),
            Event::SuiteStart(e) | Event::SuiteEnd(e) => Some(&e.cid),
            Event::TestPending(e) | Event::TestPass(e) | Event::TestFail(e) => Some(&e.cid),
            Event::RunnerEnd(e) => Some(&e.cid),
            Event::End => None,
        }
    }

    /// The wire name of the event, e.g. `suite:start`
    pub fn name(&self) -> &'static str {
        match self {
            Event::RunnerStart(_) => "runner:start",
            Event::SuiteStart(_) => "suite:start",
            Event::SuiteEnd(_) => "suite:end",
            Event::TestPending(_) => "test:pending",
            Event::TestPass(_) => "test:pass",
            Event::TestFail(_) => "test:fail",
            Event::RunnerEnd(_) => "runner:end",
            Event::End => "end",
        }
    }
}

/// Payload of `runner:start`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RunnerStart {
    /// Worker id
    pub cid: String,
    /// Spec files this worker runs
    #[serde(default)]
    pub specs: Vec<String>,
    /// The environment the worker executes in. Only consumed by stats collectors.
    #[serde(default)]
    pub capabilities: Capabilities,
    /// Remote session id, if the worker drives a remote session
    #[serde(default)]
    pub session_id: Option<String>,
    /// Host the session runs on
    #[serde(default)]
    pub host: Option<String>,
}

impl RunnerStart {
    /// A runner start event with no environment information
    pub fn new<C: Into<String>>(cid: C, specs: Vec<String>) -> Self {
        Self {
            cid: cid.into(),
            specs,
            ..Default::default()
        }
    }
}

/// Payload of `suite:start` and `suite:end`
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SuiteEvent {
    /// Worker id
    pub cid: String,
    /// Suite id, unique within the worker
    pub uid: String,
    /// Suite title
    pub title: String,
    /// Title of the enclosing suite
    #[serde(default)]
    pub parent: Option<String>,
}

impl SuiteEvent {
    /// A top-level suite event
    pub fn new<C, U, T>(cid: C, uid: U, title: T) -> Self
    where
        C: Into<String>,
        U: Into<String>,
        T: Into<String>,
    {
        Self {
            cid: cid.into(),
            uid: uid.into(),
            title: title.into(),
            parent: None,
        }
    }
}

/// Payload of `test:pending`, `test:pass` and `test:fail`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TestEvent {
    /// Worker id
    pub cid: String,
    /// Test id. Falls back to the title when the engine doesn't provide one.
    #[serde(default)]
    pub uid: String,
    /// Test title
    pub title: String,
    /// Title of the enclosing suite
    #[serde(default)]
    pub parent: Option<String>,
    /// Why the test failed
    #[serde(default)]
    pub error: Option<TestError>,
}

impl TestEvent {
    /// A test event without a parent or error
    pub fn new<C: Into<String>, T: Into<String>>(cid: C, title: T) -> Self {
        let title = title.into();
        Self {
            cid: cid.into(),
            uid: title.clone(),
            title,
            parent: None,
            error: None,
        }
    }

    /// Attach the enclosing suite's title
    pub fn with_parent<P: Into<String>>(mut self, parent: P) -> Self {
        self.parent = Some(parent.into());
        self
    }

    /// Attach an error
    pub fn with_error(mut self, error: TestError) -> Self {
        self.error = Some(error);
        self
    }
}

/// Payload of `runner:end`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RunnerEnd {
    /// Worker id
    pub cid: String,
}

impl RunnerEnd {
    /// End of the given worker
    pub fn new<C: Into<String>>(cid: C) -> Self {
        Self { cid: cid.into() }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_wire_names() {
        let event: Event = serde_json::from_str(
            r#"{"event":"suite:start","cid":"0-0","uid":"s1","title":"login"}"#,
        )
        .unwrap();
        assert_eq!(event, Event::SuiteStart(SuiteEvent::new("0-0", "s1", "login")));
        assert_eq!(event.name(), "suite:start");
        assert_eq!(event.cid(), Some("0-0"));

        let event: Event = serde_json::from_str(r#"{"event":"end"}"#).unwrap();
        assert_eq!(event, Event::End);
        assert_eq!(event.cid(), None);
    }

    #[test]
    fn runner_start_fields_are_optional() {
        let event: Event = serde_json::from_str(
            r#"{"event":"runner:start","cid":"0-1","specs":["a.js"],"sessionId":"abc"}"#,
        )
        .unwrap();
        match event {
            Event::RunnerStart(start) => {
                assert_eq!(start.specs, vec!["a.js".to_string()]);
                assert_eq!(start.session_id.as_deref(), Some("abc"));
                assert!(start.host.is_none());
                assert_eq!(start.capabilities, Capabilities::default());
            }
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn failing_test_carries_error() {
        let event: Event = serde_json::from_str(
            r#"{"event":"test:fail","cid":"0-0","title":"t","error":{"message":"boom"}}"#,
        )
        .unwrap();
        match event {
            Event::TestFail(test) => {
                let error = test.error.unwrap();
                assert_eq!(error.message, "boom");
                assert!(error.stack.is_none());
            }
            other => panic!("unexpected {:?}", other),
        }
    }
}
