//! Lexical analysis: turns the raw input string into a vector of tokens.
//!
//! The scanner knows nothing about grammar. It classifies shapes
//! (identifier, keyword, integer literal, operator, punctuation) and
//! records where each token starts so diagnostics can point back into the
//! source. Two-character operators are matched before single-character
//! ones, and any byte that starts no token class is dropped without
//! complaint; the parser is the first stage that rejects anything.

/// Kinds of tokens recognised by the front end.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenKind {
  Identifier,
  Keyword,
  IntLiteral,
  Operator,
  Punctuation,
}

/// One lexeme: its classification, its text, and its byte offset.
#[derive(Debug, Clone)]
pub struct Token<'a> {
  pub kind: TokenKind,
  pub text: &'a str,
  pub loc: usize,
}

impl<'a> Token<'a> {
  /// Convenience constructor to keep the `tokenize` loop readable.
  fn new(kind: TokenKind, text: &'a str, loc: usize) -> Self {
    Self { kind, text, loc }
  }
}

/// Words with reserved meaning; everything else of the same shape is an
/// identifier.
const KEYWORDS: [&str; 2] = ["let", "print"];

/// Two-character operators, matched before their single-character prefixes.
const WIDE_OPERATORS: [&str; 4] = ["==", "!=", "<=", ">="];

/// Lex the input into a flat vector of tokens.
///
/// Never fails: whitespace and bytes that start no token are skipped
/// silently, so an empty or entirely unrecognisable input lexes to an
/// empty vector.
pub fn tokenize(input: &str) -> Vec<Token<'_>> {
  let mut tokens = Vec::new();
  let bytes = input.as_bytes();
  let mut i = 0;

  while i < bytes.len() {
    let c = bytes[i];

    if c.is_ascii_whitespace() {
      i += 1;
      continue;
    }

    // Identifiers and keywords share one shape; the keyword list decides.
    if c.is_ascii_alphabetic() || c == b'_' {
      let start = i;
      i += 1;
      while i < bytes.len() && (bytes[i].is_ascii_alphanumeric() || bytes[i] == b'_') {
        i += 1;
      }
      let text = &input[start..i];
      let kind = if KEYWORDS.contains(&text) {
        TokenKind::Keyword
      } else {
        TokenKind::Identifier
      };
      tokens.push(Token::new(kind, text, start));
      continue;
    }

    if c.is_ascii_digit() {
      let start = i;
      i += 1;
      while i < bytes.len() && bytes[i].is_ascii_digit() {
        i += 1;
      }
      tokens.push(Token::new(TokenKind::IntLiteral, &input[start..i], start));
      continue;
    }

    if i + 1 < bytes.len() && WIDE_OPERATORS.iter().any(|op| op.as_bytes() == &bytes[i..i + 2]) {
      tokens.push(Token::new(TokenKind::Operator, &input[i..i + 2], i));
      i += 2;
      continue;
    }

    if matches!(
      c,
      b'+' | b'-' | b'*' | b'/' | b'%' | b'(' | b')' | b'{' | b'}' | b';' | b'=' | b'<' | b'>'
    ) {
      let kind = match c {
        b'(' | b')' | b'{' | b'}' | b';' => TokenKind::Punctuation,
        _ => TokenKind::Operator,
      };
      tokens.push(Token::new(kind, &input[i..i + 1], i));
      i += 1;
      continue;
    }

    // No token class matched: drop the byte and move on. Advancing one
    // byte at a time also steps safely over multi-byte characters.
    i += 1;
  }

  tokens
}

/// Human-friendly token description used in diagnostics.
pub fn describe_token(token: Option<&Token>) -> String {
  match token {
    Some(token) => token.text.to_string(),
    None => "end of input".to_string(),
  }
}
