use async_std::task::block_on;
use chrono::{TimeZone, Utc};
use futures::io::AllowStdIo;
use indoc::indoc;
use skein::{
    Capabilities, Collect, Event, Recorder, ReportError, RunStats, RunnerEnd, RunnerStart, Skein,
    SpecReporter, SuiteEvent, TestError, TestEvent,
};
use std::io::{self, Write};
use std::sync::{Arc, Mutex};

/// A sink that can still be read after the reporter that owns it is gone
#[derive(Clone, Default)]
struct Buffer(Arc<Mutex<Vec<u8>>>);

impl Write for Buffer {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.lock().unwrap().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

/// A sink whose reader went away
struct BrokenPipe;

impl Write for BrokenPipe {
    fn write(&mut self, _buf: &[u8]) -> io::Result<usize> {
        Err(io::Error::new(io::ErrorKind::BrokenPipe, "reader gone"))
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl Buffer {
    fn text(&self) -> String {
        String::from_utf8(self.0.lock().unwrap().clone()).unwrap()
    }
}

fn frozen_recorder() -> Arc<Recorder> {
    Arc::new(Recorder::with_clock(Box::new(|| {
        Utc.timestamp_opt(1_600_000_000, 0).unwrap()
    })))
}

fn start(cid: &str, spec: &str, browser: &str, version: &str, platform: &str) -> Event {
    let mut start = RunnerStart::new(cid, vec![spec.to_string()]);
    start.capabilities = Capabilities {
        browser_name: Some(browser.into()),
        version: Some(version.into()),
        platform: Some(platform.into()),
        ..Default::default()
    };
    start.session_id = Some(format!("session-{}", cid));
    Event::RunnerStart(start)
}

fn suite_start(cid: &str, uid: &str, title: &str) -> Event {
    Event::SuiteStart(SuiteEvent::new(cid, uid, title))
}

fn suite_end(cid: &str, uid: &str, title: &str) -> Event {
    Event::SuiteEnd(SuiteEvent::new(cid, uid, title))
}

fn run(max_instances: usize, events: Vec<Event>) -> String {
    let out = Buffer::default();
    let skein = Skein::builder()
        .max_instances(max_instances)
        .stats(frozen_recorder())
        .reporter(SpecReporter::<AllowStdIo<Buffer>>::from(out.clone()))
        .build();
    block_on(skein.replay(events)).unwrap();
    out.text()
}

fn two_workers() -> Vec<Event> {
    let mut cart = match start("0-1", "./cart.js", "firefox", "98", "Linux") {
        Event::RunnerStart(s) => s,
        _ => unreachable!(),
    };
    cart.host = Some("ondemand.saucelabs.com".into());

    let error =
        TestError::new("expected prompt").with_stack("at login.js:10\nat run (runner.js:3)");
    vec![
        start("0-0", "./login.js", "chrome", "100", "Windows"),
        Event::RunnerStart(cart),
        suite_start("0-0", "s1", "login"),
        suite_start("0-1", "s1", "cart"),
        Event::TestPass(TestEvent::new("0-0", "accepts valid credentials")),
        suite_start("0-0", "s2", "with 2fa"),
        Event::TestPending(TestEvent::new("0-1", "applies coupon")),
        Event::TestFail(TestEvent::new("0-0", "asks for a code").with_error(error)),
        suite_end("0-0", "s2", "with 2fa"),
        Event::TestPass(TestEvent::new("0-1", "adds item")),
        suite_end("0-1", "s1", "cart"),
        Event::RunnerEnd(RunnerEnd::new("0-1")),
        Event::TestPass(TestEvent::new("0-0", "logs out")),
        suite_end("0-0", "s1", "login"),
        Event::RunnerEnd(RunnerEnd::new("0-0")),
        Event::End,
    ]
}

#[test]
fn batched_reports_each_worker_in_one_piece() {
    let expected = indoc! {"
        [firefox 98 Linux #0-1] ------------------------------------------------------------------
        [firefox 98 Linux #0-1] Session ID: session-0-1
        [firefox 98 Linux #0-1] Spec: ./cart.js
        [firefox 98 Linux #0-1] Running: firefox (v98) on Linux
        [firefox 98 Linux #0-1]
        [firefox 98 Linux #0-1] cart
        [firefox 98 Linux #0-1]    - applies coupon
        [firefox 98 Linux #0-1]    ✓ adds item
        [firefox 98 Linux #0-1]
        [firefox 98 Linux #0-1] 1 passing (0s)
        [firefox 98 Linux #0-1] 1 pending
        [firefox 98 Linux #0-1]
        [firefox 98 Linux #0-1] Check out job at https://app.saucelabs.com/tests/session-0-1
        [chrome 100 Windows #0-0] ------------------------------------------------------------------
        [chrome 100 Windows #0-0] Session ID: session-0-0
        [chrome 100 Windows #0-0] Spec: ./login.js
        [chrome 100 Windows #0-0] Running: chrome (v100) on Windows
        [chrome 100 Windows #0-0]
        [chrome 100 Windows #0-0] login
        [chrome 100 Windows #0-0]    ✓ accepts valid credentials
        [chrome 100 Windows #0-0]    ✓ logs out
        [chrome 100 Windows #0-0]
        [chrome 100 Windows #0-0]     with 2fa
        [chrome 100 Windows #0-0]        1) asks for a code
        [chrome 100 Windows #0-0]
        [chrome 100 Windows #0-0] 2 passing (0s)
        [chrome 100 Windows #0-0] 1 failing
        [chrome 100 Windows #0-0]
        [chrome 100 Windows #0-0] 1) with 2fa asks for a code
        [chrome 100 Windows #0-0] expected prompt
        [chrome 100 Windows #0-0] at login.js:10
        [chrome 100 Windows #0-0] at run (runner.js:3)

        ==================================================================
        Number of specs: 2
    "};
    assert_eq!(run(2, two_workers()), expected);
}

#[test]
fn realtime_streams_as_tests_finish() {
    let error = TestError::new("timed out");
    let events = vec![
        start("0-0", "./login.js", "chrome", "100", "Windows"),
        suite_start("0-0", "s1", "login"),
        Event::TestPass(TestEvent::new("0-0", "accepts valid credentials")),
        suite_start("0-0", "s2", "with 2fa"),
        Event::TestFail(TestEvent::new("0-0", "asks for a code").with_error(error)),
        Event::TestPending(TestEvent::new("0-0", "remembers device")),
        suite_end("0-0", "s2", "with 2fa"),
        suite_end("0-0", "s1", "login"),
        Event::RunnerEnd(RunnerEnd::new("0-0")),
        Event::End,
    ];

    let expected = indoc! {"
        [chrome 100 Windows #0-0] ------------------------------------------------------------------
        [chrome 100 Windows #0-0] Session ID: session-0-0
        [chrome 100 Windows #0-0] Spec: ./login.js
        [chrome 100 Windows #0-0] Running: chrome (v100) on Windows
        [chrome 100 Windows #0-0]
        [chrome 100 Windows #0-0] login
        [chrome 100 Windows #0-0]    ✓ accepts valid credentials
        [chrome 100 Windows #0-0]
        [chrome 100 Windows #0-0]     with 2fa
        [chrome 100 Windows #0-0]        1) asks for a code
        [chrome 100 Windows #0-0]        - remembers device
        [chrome 100 Windows #0-0]
        [chrome 100 Windows #0-0] 1 passing (0s)
        [chrome 100 Windows #0-0] 1 pending
        [chrome 100 Windows #0-0] 1 failing
    "};
    assert_eq!(run(1, events), expected);
}

#[test]
fn before_all_hooks_are_left_out_of_the_tree() {
    let events = vec![
        start("0-0", "./a.js", "chrome", "100", "Windows"),
        suite_start("0-0", "\"before all\" hook for setup", "\"before all\" hook for setup"),
        suite_end("0-0", "\"before all\" hook for setup", "\"before all\" hook for setup"),
        suite_start("0-0", "s1", "first"),
        Event::TestPass(TestEvent::new("0-0", "one")),
        suite_end("0-0", "s1", "first"),
        suite_start("0-0", "s2", "second"),
        Event::TestPass(TestEvent::new("0-0", "two")),
        suite_end("0-0", "s2", "second"),
        Event::RunnerEnd(RunnerEnd::new("0-0")),
        Event::End,
    ];

    let out = run(2, events);
    assert!(!out.contains("before all"), "{}", out);
    assert!(out.contains("[chrome 100 Windows #0-0] first\n"));
    assert!(out.contains("[chrome 100 Windows #0-0] second\n"));
    // a single worker gets no cross-worker summary
    assert!(!out.contains("Number of specs"));
}

#[test]
fn workers_without_suites_print_nothing() {
    let events = vec![
        start("0-0", "./empty.js", "chrome", "100", "Windows"),
        Event::RunnerEnd(RunnerEnd::new("0-0")),
        Event::End,
    ];
    assert_eq!(run(2, events.clone()), "");
    assert_eq!(run(1, events), "");
}

#[test]
fn epilogue_follows_the_cross_worker_summary() {
    let out = Buffer::default();
    let skein = Skein::builder()
        .max_instances(3)
        .stats(frozen_recorder())
        .epilogue(|stats: &dyn RunStats| vec![format!("{} failure(s)", stats.failures().len())])
        .reporter(SpecReporter::<AllowStdIo<Buffer>>::from(out.clone()))
        .build();
    block_on(skein.replay(two_workers())).unwrap();

    let expected = "==================================================================\n\
                    Number of specs: 2\n\
                    1 failure(s)\n";
    assert!(out.text().ends_with(expected), "{}", out.text());
}

#[test]
fn collect_counts_per_worker() {
    let (collect, summary) = Collect::new();
    let out = Buffer::default();
    let skein = Skein::builder()
        .max_instances(2)
        .reporter(collect)
        .reporter(SpecReporter::<AllowStdIo<Buffer>>::from(out.clone()))
        .build();
    block_on(skein.replay(two_workers())).unwrap();

    let summary = block_on(summary).unwrap();
    assert_eq!(summary.workers.len(), 2);
    assert_eq!(summary.workers[0].cid, "0-0");
    assert_eq!(summary.workers[0].counts.passing, 2);
    assert_eq!(summary.workers[0].counts.failing, 1);
    assert_eq!(summary.workers[1].counts.pending, 1);
    assert_eq!(summary.counts().total(), 5);
}

#[test]
fn closing_without_end_is_an_error() {
    let out = Buffer::default();
    let skein = Skein::builder()
        .reporter(SpecReporter::<AllowStdIo<Buffer>>::from(out.clone()))
        .build();
    let events = vec![start("0-0", "./a.js", "chrome", "100", "Windows")];
    let err = block_on(skein.replay(events)).unwrap_err();
    assert!(err.to_string().contains("closed before the run ended"));
}

#[test]
fn sink_errors_reach_the_caller() {
    let skein = Skein::builder()
        .max_instances(1)
        .reporter(SpecReporter::<AllowStdIo<BrokenPipe>>::from(BrokenPipe))
        .build();
    let events = vec![
        start("0-0", "./a.js", "chrome", "100", "Windows"),
        suite_start("0-0", "s1", "first"),
        suite_start("0-0", "s2", "second"),
        Event::TestPass(TestEvent::new("0-0", "one")),
        suite_end("0-0", "s2", "second"),
        suite_end("0-0", "s1", "first"),
        Event::RunnerEnd(RunnerEnd::new("0-0")),
        Event::End,
    ];

    let err = block_on(skein.replay(events)).unwrap_err();
    match err.downcast_ref::<ReportError>() {
        Some(ReportError::Io(e)) => assert_eq!(e.kind(), io::ErrorKind::BrokenPipe),
        other => panic!("expected an I/O error, got {:?}", other),
    }
}
