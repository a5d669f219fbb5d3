use assert_cmd::Command;
use std::path::PathBuf;

fn fixture(name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("fixtures")
        .join(name)
}

fn replay(args: &[&str], log: &str) -> String {
    let output = Command::cargo_bin("skein-replay")
        .unwrap()
        .args(args)
        .arg(fixture(log))
        .output()
        .unwrap();
    assert!(output.status.success(), "{:?}", output);
    String::from_utf8(output.stdout).unwrap()
}

#[test]
fn batched_replay() {
    let out = replay(&["--max-instances", "2", "--color", "never"], "two_workers.jsonl");
    let lines: Vec<&str> = out.lines().collect();

    // the worker that ended first is reported first
    assert_eq!(
        lines[0],
        "[firefox 98 Linux #0-1] ------------------------------------------------------------------"
    );
    assert!(lines.contains(&"[firefox 98 Linux #0-1]    - applies coupon"));
    let link = "[firefox 98 Linux #0-1] Check out job at https://app.saucelabs.com/tests/bbb";
    assert!(lines.contains(&link));
    assert!(lines.contains(&"[chrome 100 Windows #0-0] Running: chrome (v100) on Windows"));
    assert!(lines.contains(&"[chrome 100 Windows #0-0]    1) rejects a bad password"));
    assert!(lines.contains(&"[chrome 100 Windows #0-0] 1) login rejects a bad password"));
    assert!(lines.contains(&"[chrome 100 Windows #0-0] at login.js:22"));
    assert_eq!(
        &lines[lines.len() - 2..],
        &[
            "==================================================================",
            "Number of specs: 2",
        ]
    );
}

#[test]
fn realtime_is_the_default() {
    let out = replay(&["--color", "never"], "one_worker.jsonl");
    let lines: Vec<&str> = out.lines().collect();
    assert_eq!(lines[2], "[chrome 100 Windows #0-0] Spec: ./login.js");
    assert_eq!(
        &lines[4..10],
        &[
            "[chrome 100 Windows #0-0]",
            "[chrome 100 Windows #0-0] login",
            "[chrome 100 Windows #0-0]    ✓ accepts valid credentials",
            "[chrome 100 Windows #0-0]",
            "[chrome 100 Windows #0-0]     with 2fa",
            "[chrome 100 Windows #0-0]        1) asks for a code",
        ]
    );
    assert_eq!(lines.last(), Some(&"[chrome 100 Windows #0-0] 1 failing"));
    // one worker: no cross-worker summary
    assert!(!out.contains("Number of specs"));
}

#[test]
fn colors_are_only_escapes() {
    let plain = replay(&["--max-instances", "2", "--color", "never"], "two_workers.jsonl");
    let colored = replay(&["--max-instances", "2", "--color", "always"], "two_workers.jsonl");
    assert_ne!(plain, colored);

    let stripped = strip_ansi_escapes::strip_str(&colored);
    let same = |text: &str| {
        text.lines()
            .filter(|l| !l.contains(" passing ("))
            .map(String::from)
            .collect::<Vec<_>>()
    };
    assert_eq!(same(&plain), same(&stripped));
}

#[test]
fn bad_log_names_the_line() {
    Command::cargo_bin("skein-replay")
        .unwrap()
        .arg(fixture("broken.jsonl"))
        .assert()
        .failure()
        .stderr(predicates::str::contains("Invalid event on line 2"));
}

#[test]
fn missing_log_is_an_error() {
    Command::cargo_bin("skein-replay")
        .unwrap()
        .arg(fixture("nope.jsonl"))
        .assert()
        .failure();
}
