//! Colored one-line messages for the command line.

use crate::core::warnings::Diagnostics;
use std::fmt;

const RESET: &str = "\x1b[0m";
const BOLD: &str = "\x1b[1m";

const FG_BLUE: &str = "\x1b[34m";
const FG_GREEN: &str = "\x1b[32m";
const FG_YELLOW: &str = "\x1b[33m";
const FG_RED: &str = "\x1b[31m";

const ICON_INFO: &str = "ℹ️";
const ICON_OK: &str = "✅";
const ICON_WARN: &str = "⚠️";
const ICON_ERR: &str = "❌";

/// Colors are dropped when `NO_COLOR` is set.
fn paint(color: &str, icon: &str) -> String {
    if std::env::var_os("NO_COLOR").is_some() {
        icon.to_string()
    } else {
        format!("{color}{BOLD}{icon}{RESET}")
    }
}

pub fn info<T: fmt::Display>(msg: T) {
    println!("{} {}", paint(FG_BLUE, ICON_INFO), msg);
}

pub fn success<T: fmt::Display>(msg: T) {
    println!("{} {}", paint(FG_GREEN, ICON_OK), msg);
}

pub fn warning<T: fmt::Display>(msg: T) {
    println!("{} {}", paint(FG_YELLOW, ICON_WARN), msg);
}

pub fn error<T: fmt::Display>(msg: T) {
    eprintln!("{} {}", paint(FG_RED, ICON_ERR), msg);
}

pub fn header<T: fmt::Display>(msg: T) {
    if std::env::var_os("NO_COLOR").is_some() {
        println!("== {msg}");
    } else {
        println!("{FG_BLUE}{BOLD}== {msg}{RESET}");
    }
}

/// One warning line per kind, e.g. `project p1: 2 open_span`.
pub fn diagnostics_summary(project_id: &str, diagnostics: &Diagnostics) {
    if diagnostics.is_empty() {
        return;
    }
    for (kind, count) in diagnostics.by_kind() {
        warning(format!("project {project_id}: {count} {kind}"));
    }
}
