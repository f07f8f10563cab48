// src/utils/log.rs

//! Console output for the CLI with server-style formatting.
//!
//! Diagnostics go through the `log` facade; this module prints the results
//! a user asked for: headers, items, summaries, and outcome lines.

use std::sync::OnceLock;

use chrono::Local;

/// Console verbosity
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Verbosity {
    Quiet,
    Normal,
}

static VERBOSITY: OnceLock<Verbosity> = OnceLock::new();

/// Set console verbosity once at startup.
pub fn init(quiet: bool) {
    let _ = VERBOSITY.set(if quiet {
        Verbosity::Quiet
    } else {
        Verbosity::Normal
    });
}

fn enabled() -> bool {
    VERBOSITY.get().copied().unwrap_or(Verbosity::Normal) > Verbosity::Quiet
}

/// Format a line with timestamp and tag
fn format_line(tag: &str, message: &str) -> String {
    let timestamp = Local::now().format("%Y-%m-%d %H:%M:%S");
    format!("[{}] [{}] {}", timestamp, tag, message)
}

pub fn info(message: &str) {
    if enabled() {
        println!("{}", format_line("INFO", message));
    }
}

/// Outcome of a user action; printed even when quiet.
pub fn success(message: &str) {
    println!("{}", format_line("OK", message));
}

/// Failed user action; always printed, to stderr.
pub fn failure(message: &str) {
    eprintln!("{}", format_line("FAILED", message));
}

pub fn header(title: &str) {
    if enabled() {
        let border = "═".repeat(60);
        println!("{}", format_line("INFO", &border));
        println!("{}", format_line("INFO", &format!("  {}", title)));
        println!("{}", format_line("INFO", &border));
    }
}

pub fn separator() {
    if enabled() {
        println!("{}", format_line("INFO", &"─".repeat(60)));
    }
}

/// Indented item under a header.
pub fn sub_item(message: &str) {
    if enabled() {
        println!("{}", format_line("INFO", &format!("    {}", message)));
    }
}

pub fn summary(title: &str, items: &[(&str, String)]) {
    if enabled() {
        println!();
        println!("{}", format_line("INFO", &format!("[SUMMARY] {}", title)));
        for (key, value) in items {
            println!("{}", format_line("INFO", &format!("    {}: {}", key, value)));
        }
    }
}

/// Dollar amount with two decimals.
pub fn money(amount: f64) -> String {
    format!("${:.2}", amount)
}

/// `[x]` or `[ ]` for boolean columns.
pub fn check(flag: bool) -> &'static str {
    if flag { "[x]" } else { "[ ]" }
}
