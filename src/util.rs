//! Small utility helpers used across modules.

/// Human-readable size using base 1024 and at most two decimals ("1.5 KB").
pub fn format_file_size(bytes: u64) -> String {
  if bytes == 0 { return "0 Bytes".to_string(); }
  const UNITS: [&str; 3] = ["Bytes", "KB", "MB"];
  let mut unit = 0usize;
  let mut value = bytes as f64;
  while value >= 1024.0 && unit < UNITS.len() - 1 {
    value /= 1024.0;
    unit += 1;
  }
  let rounded = (value * 100.0).round() / 100.0;
  format!("{} {}", rounded, UNITS[unit])
}

/// Log-safe truncation for large strings.
/// Avoids spamming logs with huge request/response payloads.
pub fn trunc_for_log(s: &str, max: usize) -> String {
  if s.len() <= max { return s.to_string(); }
  let mut end = max;
  while !s.is_char_boundary(end) { end -= 1; }
  format!("{}… ({} bytes total)", &s[..end], s.len())
}

/// First `max` chars of `s`, used when echoing bodies back in error messages.
pub fn prefix_chars(s: &str, max: usize) -> String {
  s.chars().take(max).collect()
}
