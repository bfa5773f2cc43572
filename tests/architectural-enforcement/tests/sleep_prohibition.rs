//! Integration Test: Sleep Prohibition
//!
//! **Policy**: Production code MUST NOT call sleep methods. Card motion is
//! driven by frames and polling by cadence timestamps, never by waiting.
//! **Exception**: the frame timer arm of the TUI event loop.

use architectural_enforcement::{assert_clean, rust_files, scan};

fn is_sleep(code: &str) -> bool {
    code.contains("::sleep(") || code.contains(".sleep(")
}

#[test]
fn test_no_sleep_in_wall_engine() {
    assert!(!rust_files("wall/core/src").is_empty(), "engine sources not found");
    let violations = scan("wall/core/src", |_, code| is_sleep(code));
    assert_clean("Sleep calls in the wall engine", &violations);
}

#[test]
fn test_tui_sleeps_only_for_frames() {
    let violations = scan("tui/src", |path, code| {
        let frame_timer = path.ends_with("tui/src/app.rs") && code.contains("FRAME_INTERVAL");
        is_sleep(code) && !frame_timer
    });
    assert_clean("Sleep calls outside the frame timer", &violations);
}

#[test]
fn test_no_thread_sleep_anywhere() {
    let mut violations = scan("wall/core/src", |_, code| code.contains("thread::sleep"));
    violations.extend(scan("tui/src", |_, code| code.contains("thread::sleep")));
    assert_clean("Blocking thread::sleep in async code", &violations);
}
