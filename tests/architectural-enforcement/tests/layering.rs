//! Integration Test: Layering
//!
//! **Policy**: the wall engine is headless. It must not know about the
//! terminal, and the terminal must not talk to the server on its own.

use std::fs;

use architectural_enforcement::{assert_clean, rust_files, scan, workspace_root};

const UI_CRATES: &[&str] = &["ratatui", "crossterm"];

#[test]
fn test_engine_sources_are_ui_free() {
    assert!(!rust_files("wall/core/src").is_empty(), "engine sources not found");
    let violations = scan("wall/core/src", |_, code| {
        UI_CRATES.iter().any(|krate| code.contains(&format!("{krate}::")))
    });
    assert_clean("Terminal crates used in the wall engine", &violations);
}

#[test]
fn test_engine_manifest_is_ui_free() {
    let manifest = fs::read_to_string(workspace_root().join("wall/core/Cargo.toml"))
        .expect("engine manifest readable");
    for krate in UI_CRATES {
        assert!(
            !manifest.lines().any(|l| l.trim_start().starts_with(krate)),
            "wall/core depends on {krate}"
        );
    }
}

#[test]
fn test_surface_reaches_server_through_engine() {
    let violations = scan("tui/src", |_, code| code.contains("reqwest::"));
    assert_clean("HTTP calls made directly from the terminal surface", &violations);
}
