/*
 * cli_test.rs
 * Copyright (c) 2025 Posit, PBC
 *
 * End-to-end tests for the stylemerge binary.
 */

//! End-to-end tests for the stylemerge binary.
//!
//! Each test lays out a small project in a temporary directory and runs the
//! binary from inside it, so paths in bundle are relative to the project.

use std::fs;
use std::path::Path;

use assert_cmd::Command;
use predicates::prelude::*;
use predicates::str::contains;
use tempfile::TempDir;

use stylemerge_source_map::{SourceMap, SourceMapConsumer};

fn project(files: &[(&str, &str)]) -> TempDir {
    let dir = TempDir::new().expect("Failed to create temp directory");
    for (name, contents) in files {
        let path = dir.path().join(name);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).unwrap();
        }
        fs::write(path, contents).unwrap();
    }
    dir
}

fn stylemerge(dir: &Path) -> Command {
    let mut cmd = Command::cargo_bin("stylemerge").unwrap();
    cmd.current_dir(dir).env("RUST_LOG", "off");
    cmd
}

fn read(dir: &Path, name: &str) -> String {
    fs::read_to_string(dir.join(name)).unwrap()
}

#[test]
fn development_bundle_writes_stylesheet_and_map() {
    let dir = project(&[
        ("client/a.css", ".a {\n  color: red;\n}"),
        ("client/b.css", ".b {\n  color: blue;\n}\n@import 'theme.css';"),
    ]);

    stylemerge(dir.path())
        .args(["bundle", "client/a.css", "client/b.css"])
        .assert()
        .success()
        .stderr(contains("client/b.css: warn: There are some @import rules"));

    let css = read(dir.path(), "merged-stylesheets.css");
    assert!(css.starts_with("@import 'theme.css';\n\n.a {"));
    assert!(css.ends_with("/*# sourceMappingURL=merged-stylesheets.css.map */\n"));

    let map = SourceMap::from_json(&read(dir.path(), "merged-stylesheets.css.map")).unwrap();
    assert!(map.sources.iter().any(|s| s == "client/a.css"));
    assert!(map.sources.iter().any(|s| s == "client/b.css"));
    let consumer = SourceMapConsumer::new(&map).unwrap();
    let a = consumer.original_position_for(2, 0).unwrap();
    assert_eq!((a.source.as_str(), a.row, a.column), ("client/a.css", 0, 0));
}

#[test]
fn production_bundle_is_minified_without_map() {
    let dir = project(&[("a.css", ".a {\n  color: red;\n}"), ("b.css", ".b { top: 0 }")]);

    stylemerge(dir.path())
        .args(["bundle", "--mode", "production", "a.css", "b.css"])
        .assert()
        .success();

    assert_eq!(read(dir.path(), "merged-stylesheets.min.css"), ".a{color:red}.b{top:0}");
    assert!(!dir.path().join("merged-stylesheets.css").exists());
    assert!(!dir.path().join("merged-stylesheets.min.css.map").exists());
}

#[test]
fn broken_file_fails_build_but_others_are_bundled() {
    let dir = project(&[
        ("a.css", ".a {}"),
        ("bad.css", ".bad {\n  color: red;\n"),
        ("c.css", ".c {}"),
    ]);

    stylemerge(dir.path())
        .args(["bundle", "a.css", "bad.css", "c.css"])
        .assert()
        .failure()
        .stderr(contains("Css Syntax Error").and(contains("1 stylesheet error(s)")));

    let css = read(dir.path(), "merged-stylesheets.css");
    assert!(css.starts_with(".a {}\n\n.c {}"));
}

#[test]
fn configuration_file_selects_plugins() {
    let dir = project(&[
        (
            ".stylemergerc.json",
            r#"{ "plugins": ["nesting", "autoprefixer"] }"#,
        ),
        ("a.css", ".a {\n  .b { grid-gap: 1px; }\n}"),
    ]);

    stylemerge(dir.path())
        .args(["bundle", "a.css"])
        .assert()
        .success()
        .stderr(contains("a.css: warn:").and(contains("grid-gap")));

    let css = read(dir.path(), "merged-stylesheets.css");
    assert!(css.starts_with(".a .b {\n  grid-gap: 1px;\n}"));
}

#[test]
fn unknown_plugin_is_fatal() {
    let dir = project(&[
        ("stylemerge.toml", "plugins = [\"no-such-plugin\"]\n"),
        ("a.css", ".a {}"),
    ]);

    stylemerge(dir.path())
        .args(["bundle", "a.css"])
        .assert()
        .failure()
        .stderr(contains("Unknown plugin `no-such-plugin`"));

    assert!(!dir.path().join("merged-stylesheets.css").exists());
}

#[test]
fn json_diagnostics_name_the_file() {
    let dir = project(&[("bad.css", ".bad {")]);

    stylemerge(dir.path())
        .args(["bundle", "--format", "json", "bad.css"])
        .assert()
        .failure()
        .stderr(contains(r#""file":"bad.css""#));
}

#[test]
fn config_command_prints_resolved_configuration() {
    let dir = project(&[(
        ".stylemergerc.yaml",
        "plugins:\n  - strip-comments\noptions:\n  parser: safe\n  excludedPackages: [\"foo:bar\"]\n",
    )]);

    stylemerge(dir.path())
        .arg("config")
        .assert()
        .success()
        .stdout(
            contains(r#""strip-comments""#)
                .and(contains(r#""parser": "safe""#))
                .and(contains(r#""foo:bar""#)),
        );
}

#[test]
fn missing_input_file_is_reported() {
    let dir = project(&[]);

    stylemerge(dir.path())
        .args(["bundle", "nope.css"])
        .assert()
        .failure()
        .stderr(contains("Failed to read stylesheet nope.css"));
}
