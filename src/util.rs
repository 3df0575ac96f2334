//! Small utility helpers used across modules.

/// True if the char is hiragana, katakana or a CJK ideograph (unified or extension A).
/// These are the glyphs a substituted sentence may carry.
pub fn is_japanese(ch: char) -> bool {
  ('\u{3040}'..='\u{309F}').contains(&ch)
    || ('\u{30A0}'..='\u{30FF}').contains(&ch)
    || ('\u{4E00}'..='\u{9FAF}').contains(&ch)
    || ('\u{3400}'..='\u{4DBF}').contains(&ch)
}

/// Lowercase and trim edges. Inner whitespace is kept as typed.
pub fn normalize_answer(s: &str) -> String {
  s.trim().to_lowercase()
}

/// Log-safe truncation for large strings.
/// Cuts on a char boundary so multi-byte glyphs never split.
pub fn trunc_for_log(s: &str, max: usize) -> String {
  if s.len() <= max {
    return s.to_string();
  }
  let mut end = max;
  while !s.is_char_boundary(end) {
    end -= 1;
  }
  format!("{}… ({} bytes total)", &s[..end], s.len())
}
