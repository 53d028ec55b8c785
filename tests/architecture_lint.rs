//! Architecture enforcement tests.
//!
//! The crate is layered so the lower layers stay usable on their own:
//!
//! ```text
//! app            -> engine::dispatch
//! engine         -> help, completion, parse, model, core
//! help/completion-> engine::{resolver, builtin}, parse, model, core
//! parse          -> model, core
//! core           -> (nothing in the crate)
//! ```
//!
//! These tests read the sources and fail on imports that point up the
//! stack, so a layering slip shows up in CI rather than in review.
//!
//! # Test Categories
//!
//! 1. **Layer Imports** - Lower layers must not import upper ones
//! 2. **Output Discipline** - Library code writes through `Console` only
//! 3. **Entry Points** - Only `app` assembles a dispatcher

use std::fs;
use std::path::{Path, PathBuf};

/// Collect every `.rs` file below `dir`.
fn rust_files(dir: &Path) -> Vec<PathBuf> {
    let mut files = Vec::new();
    let mut pending = vec![dir.to_path_buf()];

    while let Some(current) = pending.pop() {
        for entry in fs::read_dir(&current)
            .unwrap_or_else(|_| panic!("Failed to read {}", current.display()))
        {
            let path = entry.expect("Failed to read entry").path();
            if path.is_dir() {
                pending.push(path);
            } else if path.extension().map(|e| e == "rs").unwrap_or(false) {
                files.push(path);
            }
        }
    }

    files.sort();
    files
}

/// Source lines with comments stripped, paired with their line number.
///
/// Doc links such as ``[`crate::app::App`]`` are allowed to point anywhere.
fn code_lines(path: &Path) -> Vec<(usize, String)> {
    let content = fs::read_to_string(path)
        .unwrap_or_else(|_| panic!("Failed to read {}", path.display()));

    content
        .lines()
        .enumerate()
        .filter(|(_, line)| !line.trim_start().starts_with("//"))
        .map(|(i, line)| (i + 1, line.to_string()))
        .collect()
}

/// Report every line under `dir` that mentions one of `forbidden`.
fn find_violations(dir: &str, forbidden: &[&str]) -> Vec<String> {
    let mut violations = Vec::new();

    for path in rust_files(Path::new(dir)) {
        for (number, line) in code_lines(&path) {
            for needle in forbidden {
                if line.contains(needle) {
                    violations.push(format!(
                        "{}:{}: references {}",
                        path.display(),
                        number,
                        needle
                    ));
                }
            }
        }
    }

    violations
}

// =============================================================================
// Layer Imports
// =============================================================================

/// `core` holds shared types, naming, console and configuration. It must
/// build without any other layer.
#[test]
fn core_does_not_import_upper_layers() {
    let violations = find_violations(
        "src/core",
        &[
            "crate::parse",
            "crate::model",
            "crate::engine",
            "crate::help",
            "crate::completion",
            "crate::app",
        ],
    );

    assert!(
        violations.is_empty(),
        "Architecture violations found:\n  {}",
        violations.join("\n  ")
    );
}

/// The tokenizer only needs the option table, which is derived from the
/// model. It knows nothing about resolution or invocation.
#[test]
fn parse_depends_only_on_model_and_core() {
    let violations = find_violations(
        "src/parse",
        &[
            "crate::engine",
            "crate::help",
            "crate::completion",
            "crate::app",
        ],
    );

    assert!(
        violations.is_empty(),
        "Architecture violations found:\n  {}",
        violations.join("\n  ")
    );
}

/// Help and completion render text. Deciding exit codes and running
/// commands belongs to the dispatcher.
#[test]
fn renderers_do_not_dispatch() {
    let mut violations = find_violations("src/help", &["engine::dispatch", "crate::app"]);
    violations.extend(find_violations(
        "src/completion",
        &["engine::dispatch", "crate::app", "crate::help"],
    ));

    assert!(
        violations.is_empty(),
        "Architecture violations found:\n  {}",
        violations.join("\n  ")
    );
}

// =============================================================================
// Output Discipline
// =============================================================================

/// Library code never prints or exits on its own. Everything goes through
/// `Console` so embedders and tests can capture it; `main.rs` is the only
/// place that talks to the process directly.
#[test]
fn library_writes_through_console() {
    let mut violations = Vec::new();

    for path in rust_files(Path::new("src")) {
        if path.file_name().map(|n| n == "main.rs").unwrap_or(false) {
            continue;
        }

        for (number, line) in code_lines(&path) {
            for needle in ["println!", "eprintln!", "print!(", "eprint!(", "process::exit"] {
                if line.contains(needle) {
                    violations.push(format!("{}:{}: uses {}", path.display(), number, needle));
                }
            }
        }
    }

    assert!(
        violations.is_empty(),
        "Library code must write through Console:\n  {}",
        violations.join("\n  ")
    );
}

// =============================================================================
// Entry Points
// =============================================================================

/// A `Dispatcher` is assembled in exactly one place, so every run goes
/// through the same runtime and interrupt setup.
#[test]
fn only_app_assembles_dispatcher() {
    let mut sites = Vec::new();

    for path in rust_files(Path::new("src")) {
        for (number, line) in code_lines(&path) {
            if line.contains("Dispatcher {") {
                sites.push(format!("{}:{}", path.display(), number));
            }
        }
    }

    assert_eq!(
        sites.len(),
        1,
        "Expected a single Dispatcher construction (in src/app.rs), found:\n  {}",
        sites.join("\n  ")
    );
    assert!(
        sites[0].starts_with(&format!("{}", Path::new("src").join("app.rs").display())),
        "Dispatcher must be constructed in src/app.rs, found at {}",
        sites[0]
    );
}
