// violet ignore chunk
//! ## Features
//!
//! - Leveled logging (info, warn, error, debug, verbose, success)
//! - Multi-line message support with consistent prefixes
//! - Banner output for build summaries (`announce`)
//! - `tracing-subscriber` setup shared by the binaries
//! - All output to stderr, so stdout stays clean for command results
//!
//! ## Usage
//!
//! Call the functions directly, or use the macros, which also accept
//! `format!`-style arguments: `bentley::info!("embedded {} rows", n)`.

use chrono::Local;
use colored::*;
use std::sync::atomic::{AtomicBool, Ordering};
use tracing_subscriber::{filter::EnvFilter, fmt, prelude::*};

static VERBOSE: AtomicBool = AtomicBool::new(false);

/// Enable or disable `debug` and `verbose` output
pub fn set_verbose(enabled: bool) {
  VERBOSE.store(enabled, Ordering::Relaxed);
}

pub fn is_verbose() -> bool {
  VERBOSE.load(Ordering::Relaxed)
}

/// Install the global tracing subscriber.
///
/// `RUST_LOG` wins when set. Otherwise the filter is `tally=info,warn`, or
/// `debug` for every crate in verbose mode. Calling this twice is harmless.
pub fn init_tracing(verbose: bool) {
  set_verbose(verbose);

  let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
    if verbose {
      EnvFilter::new("debug,reqwest=info,hyper=info")
    } else {
      EnvFilter::new("tally=info,warn")
    }
  });

  let _ = tracing_subscriber::registry()
    .with(fmt::layer().with_writer(std::io::stderr))
    .with(filter)
    .try_init();
}

/// Core logging function that handles the actual output
pub fn log(message: &str) {
  for line in message.lines() {
    eprintln!("{line}");
  }
}

/// Format a colored prefix for log messages
fn format_prefix(color: Color, prefix: &str) -> String {
  let pad = 7usize.saturating_sub(prefix.len() + 2);
  format!("[{}]{:<pad$}", prefix.color(color).bold(), "")
}

fn log_with_prefix(color: Color, prefix: &str, message: &str) {
  let prefix = format_prefix(color, prefix);
  for line in message.lines() {
    log(&format!("{prefix} {line}"));
  }
}

/// Create a banner line of the specified length and character
pub fn banner_line(length: usize, char: char) -> String {
  char.to_string().repeat(length)
}

pub fn info(message: &str) {
  log_with_prefix(Color::Blue, "info", message);
}

pub fn warn(message: &str) {
  log_with_prefix(Color::Yellow, "warn", message);
}

pub fn error(message: &str) {
  log_with_prefix(Color::Red, "error", message);
}

pub fn success(message: &str) {
  log_with_prefix(Color::Green, "sccs", message);
}

/// Debug level logging, silent unless verbose output is enabled
pub fn debug(message: &str) {
  if is_verbose() {
    log_with_prefix(Color::Magenta, "debug", message);
  }
}

pub fn verbose(message: &str) {
  if is_verbose() {
    log_with_prefix(Color::Cyan, "verb", message);
  }
}

/// Timestamped banner for long-running steps such as an index build
pub fn announce(message: &str) {
  let timestamp = Local::now().format("%H:%M:%S").to_string();
  let banner = banner_line(50, '-');
  log(&banner.blue().bold().to_string());
  for line in message.lines() {
    log(&format!("[{}] {}", timestamp.cyan(), line.blue().bold()));
  }
  log(&banner.blue().bold().to_string());
}

/// Macros for coverage-excluded logging - these expand with LCOV_EXCL_LINE at call sites
#[macro_export]
macro_rules! info {
  ($msg:expr) => {
    $crate::info($msg) // LCOV_EXCL_LINE
  };
  ($fmt:expr, $($arg:tt)+) => {
    $crate::info(&format!($fmt, $($arg)+)) // LCOV_EXCL_LINE
  };
}

#[macro_export]
macro_rules! warn {
  ($msg:expr) => {
    $crate::warn($msg) // LCOV_EXCL_LINE
  };
  ($fmt:expr, $($arg:tt)+) => {
    $crate::warn(&format!($fmt, $($arg)+)) // LCOV_EXCL_LINE
  };
}

#[macro_export]
macro_rules! error {
  ($msg:expr) => {
    $crate::error($msg) // LCOV_EXCL_LINE
  };
  ($fmt:expr, $($arg:tt)+) => {
    $crate::error(&format!($fmt, $($arg)+)) // LCOV_EXCL_LINE
  };
}

#[macro_export]
macro_rules! success {
  ($msg:expr) => {
    $crate::success($msg) // LCOV_EXCL_LINE
  };
  ($fmt:expr, $($arg:tt)+) => {
    $crate::success(&format!($fmt, $($arg)+)) // LCOV_EXCL_LINE
  };
}

#[macro_export]
macro_rules! debug {
  ($msg:expr) => {
    $crate::debug($msg) // LCOV_EXCL_LINE
  };
  ($fmt:expr, $($arg:tt)+) => {
    $crate::debug(&format!($fmt, $($arg)+)) // LCOV_EXCL_LINE
  };
}

#[macro_export]
macro_rules! verbose {
  ($msg:expr) => {
    $crate::verbose($msg) // LCOV_EXCL_LINE
  };
  ($fmt:expr, $($arg:tt)+) => {
    $crate::verbose(&format!($fmt, $($arg)+)) // LCOV_EXCL_LINE
  };
}

#[macro_export]
macro_rules! announce {
  ($msg:expr) => {
    $crate::announce($msg) // LCOV_EXCL_LINE
  };
  ($fmt:expr, $($arg:tt)+) => {
    $crate::announce(&format!($fmt, $($arg)+)) // LCOV_EXCL_LINE
  };
}
