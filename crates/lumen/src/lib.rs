//! ## Features
//!
//! - Prefixed console levels (info, warn, debug, success)
//! - Multi-line message support with consistent formatting
//! - Banner helpers for run phases (announce, flourish)
//! - `tracing` subscriber setup shared by every reverie binary
//! - All output to stderr so stdout stays clean for reports and JSON
//!
//! ## Usage
//!
//! Call [`init_tracing`] once at startup, then use the `lumen::info!`-style macros for
//! console messages. Library crates emit `tracing` events which end up on the same stream.

use chrono::Local;
use colored::*;
use tracing_subscriber::EnvFilter;

/// Crate whose events are shown when `RUST_LOG` is not set
const DEFAULT_TARGET: &str = "reverie";

/// Install the global `tracing` subscriber.
///
/// `RUST_LOG` takes precedence; otherwise reverie events are shown at `info`,
/// or `debug` when `verbose` is set. Calling this twice is harmless.
pub fn init_tracing(verbose: bool) {
  let filter = EnvFilter::try_from_default_env()
    .unwrap_or_else(|_| EnvFilter::new(default_directive(verbose)));

  let _ = tracing_subscriber::fmt()
    .with_env_filter(filter)
    .with_writer(std::io::stderr)
    .with_target(false)
    .try_init();
}

fn default_directive(verbose: bool) -> String {
  let level = if verbose { "debug" } else { "info" };
  format!("{DEFAULT_TARGET}={level}")
}

/// Core logging function that handles the actual output
pub fn log(message: &str) {
  for line in message.lines() {
    eprintln!("{line}");
  }
}

fn format_prefix(color: Color, prefix: &str) -> String {
  let padding = 7usize.saturating_sub(prefix.len() + 2);
  format!("[{}]{:<padding$}", prefix.color(color).bold(), "")
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

/// Display a message with a banner around it
pub fn as_banner<F>(log_fn: F, message: &str, width: usize, border_char: char)
where
  F: Fn(&str),
{
  let banner = banner_line(width, border_char);

  log_fn(&banner);
  log_fn(message);
  log_fn(&banner);
}

/// Info level logging - general information
pub fn info(message: &str) {
  log_with_prefix(Color::Blue, "info", message);
}

/// Warning level logging - something needs attention
pub fn warn(message: &str) {
  log_with_prefix(Color::Yellow, "warn", message);
}

pub fn debug(message: &str) {
  log_with_prefix(Color::Magenta, "debug", message);
}

/// Success level logging - something completed successfully
pub fn success(message: &str) {
  log_with_prefix(Color::Green, "sccs", message);
}

/// Start of a run phase, stamped with the local time
pub fn announce(message: &str) {
  let stamped = format!("{} {}", Local::now().format("%H:%M:%S"), message);
  as_banner(|msg| log(&msg.blue().bold().to_string()), &stamped, 50, '-');
}

/// End of a run phase
pub fn flourish(message: &str) {
  as_banner(|msg| log(&msg.green().bold().to_string()), message, 50, '~');
}

// The macros take format arguments and expand with LCOV_EXCL_LINE at call sites

#[macro_export]
macro_rules! info {
  ($($arg:tt)*) => {
    $crate::info(&format!($($arg)*)); // LCOV_EXCL_LINE
  };
}

#[macro_export]
macro_rules! warn {
  ($($arg:tt)*) => {
    $crate::warn(&format!($($arg)*)); // LCOV_EXCL_LINE
  };
}

#[macro_export]
macro_rules! debug {
  ($($arg:tt)*) => {
    $crate::debug(&format!($($arg)*)); // LCOV_EXCL_LINE
  };
}

#[macro_export]
macro_rules! success {
  ($($arg:tt)*) => {
    $crate::success(&format!($($arg)*)); // LCOV_EXCL_LINE
  };
}

#[macro_export]
macro_rules! announce {
  ($($arg:tt)*) => {
    $crate::announce(&format!($($arg)*)); // LCOV_EXCL_LINE
  };
}

#[macro_export]
macro_rules! flourish {
  ($($arg:tt)*) => {
    $crate::flourish(&format!($($arg)*)); // LCOV_EXCL_LINE
  };
}
