use bentley::*;

#[test]
fn test_basic_logging_functions() {
  info("Test info message");
  warn("Test warning message");
  error("Test error message");
  debug("Test debug message");
  success("Test success message");
}

#[test]
fn test_multiline_messages() {
  let multiline_msg = "First line\nSecond line\nThird line";
  info(multiline_msg);
  warn(multiline_msg);
  announce(multiline_msg);
}

#[test]
fn test_macros_accept_format_arguments() {
  let rows = 42;
  bentley::info!("embedded {} rows", rows);
  bentley::warn!(&format!("skipped {rows} entries"));
  bentley::success!("done");
  bentley::debug!("dimension {}", 1024);
}

#[test]
fn test_init_tracing_is_idempotent() {
  init_tracing(false);
  init_tracing(true);
  set_verbose(false);
}
