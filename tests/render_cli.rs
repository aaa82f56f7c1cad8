//! Integration tests for the offline `render` subcommand.
//!
//! These exercise the built binary directly and need no network or LM
//! backend, so they never skip.

use std::fs;
use std::path::Path;
use std::process::{Command, Output};

fn render(input: &Path, extra: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_rdig"))
        .arg("render")
        .arg("--input")
        .arg(input)
        .args(extra)
        .output()
        .expect("run rdig render")
}

#[test]
fn terminal_rendering_prints_each_segment_with_a_rule() {
    let dir = tempfile::tempdir().expect("create temp dir");
    let input = dir.path().join("processed_repos_1700000000.md");
    fs::write(&input, "## first\nbody one\n---\n## second\nbody two\n").expect("write fixture");

    let output = render(&input, &["--terminal"]);
    assert!(
        output.status.success(),
        "stderr: {}",
        String::from_utf8_lossy(&output.stderr)
    );

    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("## first"));
    assert!(stdout.contains("## second"));
    assert_eq!(stdout.matches(&"-".repeat(80)).count(), 2);
    // Piped output carries no ANSI styling.
    assert!(!stdout.contains('\u{1b}'));
}

#[test]
fn html_rendering_writes_sibling_and_preserves_stylesheet() {
    let dir = tempfile::tempdir().expect("create temp dir");
    let input = dir.path().join("processed_repos_1700000001.md");
    fs::write(&input, "# Processed GitHub Repositories\n\n## repo\n").expect("write fixture");

    let output = render(&input, &[]);
    assert!(
        output.status.success(),
        "stderr: {}",
        String::from_utf8_lossy(&output.stderr)
    );

    let html_path = dir.path().join("processed_repos_1700000001.html");
    let page = fs::read_to_string(&html_path).expect("read rendered html");
    assert!(page.contains("custom.css"));
    assert!(page.contains("<h1>Processed GitHub Repositories</h1>"));

    // A user-tuned stylesheet survives a second render untouched.
    let css_path = dir.path().join("custom.css");
    assert!(css_path.exists());
    fs::write(&css_path, "/* tuned */").expect("overwrite stylesheet");
    let output = render(&input, &[]);
    assert!(output.status.success());
    assert_eq!(
        fs::read_to_string(&css_path).expect("read stylesheet"),
        "/* tuned */"
    );
}

#[test]
fn missing_input_fails_with_a_diagnostic() {
    let dir = tempfile::tempdir().expect("create temp dir");
    let input = dir.path().join("absent.md");

    let output = render(&input, &[]);
    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("absent.md"), "stderr: {stderr}");
}
