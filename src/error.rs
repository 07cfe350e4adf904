//! Shared error utilities used across the compilation pipeline.
//!
//! Diagnostics are kept lightweight on purpose – these routines format
//! messages in a style reminiscent of chibicc, quoting the offending
//! source line and pointing at the offending byte with a caret.

use snafu::Snafu;

pub type CompileResult<T> = Result<T, CompileError>;

#[derive(Debug, Snafu)]
pub enum CompileError {
  #[snafu(display("{source_line}\n{marker} {message}"))]
  WithLocation {
    source_line: String,
    marker: String,
    message: String,
  },
}

impl CompileError {
  /// Construct an error anchored at a specific byte offset in the source.
  ///
  /// Programs span multiple lines, so only the line containing `loc` is
  /// quoted and the caret column is counted within that line.
  pub fn at(source: &str, loc: usize, message: impl Into<String>) -> Self {
    let safe_loc = loc.min(source.len());
    let line_start = source[..safe_loc].rfind('\n').map_or(0, |i| i + 1);
    let line_end = source[safe_loc..]
      .find('\n')
      .map_or(source.len(), |i| safe_loc + i);
    let source_line = format!("'{}'", &source[line_start..line_end]);
    let char_offset = source[line_start..safe_loc].chars().count() + 1; // account for opening quote
    let marker = format!("{}^", " ".repeat(char_offset));
    Self::WithLocation {
      source_line,
      marker,
      message: message.into(),
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn caret_points_at_the_offending_column() {
    let err = CompileError::at("let x = ;", 8, "boom");
    assert_eq!(err.to_string(), "'let x = ;'\n         ^ boom");
  }

  #[test]
  fn only_the_offending_line_is_quoted() {
    let source = "let x = 1;\nlet y = ;";
    let err = CompileError::at(source, 19, "expected a number");
    assert_eq!(
      err.to_string(),
      "'let y = ;'\n         ^ expected a number"
    );
  }

  #[test]
  fn a_loc_past_the_end_clamps_to_the_last_line() {
    let err = CompileError::at("print(x)", usize::MAX, "expected \";\"");
    assert_eq!(err.to_string(), "'print(x)'\n         ^ expected \";\"");
  }
}
