//! Recursive-descent parser producing the statement list and expression AST.
//!
//! The parser mirrors the classic chibicc structure: a lightweight cursor
//! over the token vector plus one small function per grammar rule, with the
//! left-associative operator loops folding the accumulated node into the
//! left child of each new binary node. One token of lookahead decides every
//! rule; the first mismatch aborts the parse with no recovery and no
//! partial AST.

use log::trace;

use crate::error::{CompileError, CompileResult};
use crate::tokenizer::{Token, TokenKind, describe_token};

/// Binary operators recognised by the grammar.
///
/// The tokenizer also produces comparison operators and `%`, but no rule
/// consumes them; they fail the parse wherever they appear.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinaryOp {
  Add,
  Sub,
  Mul,
  Div,
}

impl BinaryOp {
  /// Source-level spelling, reused by the TAC and assembly renderings.
  pub fn symbol(self) -> &'static str {
    match self {
      BinaryOp::Add => "+",
      BinaryOp::Sub => "-",
      BinaryOp::Mul => "*",
      BinaryOp::Div => "/",
    }
  }
}

/// Expression tree produced by the parser. Each node exclusively owns its
/// children; nothing is shared across statements.
#[derive(Debug, Clone, PartialEq)]
pub enum AstNode {
  Num {
    value: i64,
  },
  Var {
    name: String,
  },
  Binary {
    op: BinaryOp,
    lhs: Box<AstNode>,
    rhs: Box<AstNode>,
  },
}

impl AstNode {
  pub fn number(value: i64) -> Self {
    Self::Num { value }
  }

  pub fn var(name: impl Into<String>) -> Self {
    Self::Var { name: name.into() }
  }

  pub fn binary(op: BinaryOp, lhs: AstNode, rhs: AstNode) -> Self {
    Self::Binary {
      op,
      lhs: Box::new(lhs),
      rhs: Box::new(rhs),
    }
  }
}

/// Statement forms. A program is an ordered `Vec<Stmt>`.
#[derive(Debug, Clone, PartialEq)]
pub enum Stmt {
  /// `let name = value;`
  Assign { name: String, value: AstNode },
  /// `print(value);`
  Print { value: AstNode },
}

/// Parse a whole program from the token stream.
///
/// A program is any number of statements, so an empty token vector parses
/// to an empty program. Any token the grammar does not expect fails the
/// parse with an expected-vs-actual diagnostic anchored at that token.
pub fn parse<'a>(tokens: &'a [Token<'a>], source: &'a str) -> CompileResult<Vec<Stmt>> {
  let mut stream = TokenStream::new(tokens, source);
  let mut program = Vec::new();

  while !stream.is_eof() {
    program.push(parse_stmt(&mut stream)?);
  }

  Ok(program)
}

fn parse_stmt(stream: &mut TokenStream) -> CompileResult<Stmt> {
  match stream.peek().map(|token| token.text) {
    Some("let") => parse_let_stmt(stream),
    Some("print") => parse_print_stmt(stream),
    _ => {
      let got = describe_token(stream.peek());
      Err(stream.error_here(format!("expected \"let\" or \"print\", but got \"{got}\"")))
    }
  }
}

fn parse_let_stmt(stream: &mut TokenStream) -> CompileResult<Stmt> {
  trace!("parsing let statement");
  stream.skip("let")?;
  let name = stream.get_ident()?;
  stream.skip("=")?;
  let value = parse_expr(stream)?;
  stream.skip(";")?;
  Ok(Stmt::Assign { name, value })
}

fn parse_print_stmt(stream: &mut TokenStream) -> CompileResult<Stmt> {
  trace!("parsing print statement");
  stream.skip("print")?;
  stream.skip("(")?;
  let value = parse_expr(stream)?;
  stream.skip(")")?;
  stream.skip(";")?;
  Ok(Stmt::Print { value })
}

/// `expr := term (('+' | '-') term)*`, folded left-associatively.
fn parse_expr(stream: &mut TokenStream) -> CompileResult<AstNode> {
  let mut node = parse_term(stream)?;

  loop {
    let op = match stream.peek().map(|token| token.text) {
      Some("+") => BinaryOp::Add,
      Some("-") => BinaryOp::Sub,
      _ => break,
    };

    stream.skip(op.symbol())?;
    let rhs = parse_term(stream)?;
    node = AstNode::binary(op, node, rhs);
  }

  Ok(node)
}

/// `term := factor (('*' | '/') factor)*`, folded left-associatively.
fn parse_term(stream: &mut TokenStream) -> CompileResult<AstNode> {
  let mut node = parse_factor(stream)?;

  loop {
    let op = match stream.peek().map(|token| token.text) {
      Some("*") => BinaryOp::Mul,
      Some("/") => BinaryOp::Div,
      _ => break,
    };

    stream.skip(op.symbol())?;
    let rhs = parse_factor(stream)?;
    node = AstNode::binary(op, node, rhs);
  }

  Ok(node)
}

/// `factor := INTEGER | IDENT | '(' expr ')'`.
fn parse_factor(stream: &mut TokenStream) -> CompileResult<AstNode> {
  if stream.equal("(") {
    let node = parse_expr(stream)?;
    stream.skip(")")?;
    return Ok(node);
  }

  match stream.peek().map(|token| token.kind) {
    Some(TokenKind::IntLiteral) => {
      let value = stream.get_number()?;
      Ok(AstNode::number(value))
    }
    Some(TokenKind::Identifier) => {
      let name = stream.get_ident()?;
      Ok(AstNode::var(name))
    }
    _ => {
      let got = describe_token(stream.peek());
      Err(stream.error_here(format!(
        "expected a number, a variable or \"(\", but got \"{got}\""
      )))
    }
  }
}

/// Lightweight cursor over the token vector.
struct TokenStream<'a> {
  tokens: &'a [Token<'a>],
  source: &'a str,
  pos: usize,
}

impl<'a> TokenStream<'a> {
  fn new(tokens: &'a [Token<'a>], source: &'a str) -> Self {
    Self {
      tokens,
      source,
      pos: 0,
    }
  }

  fn peek(&self) -> Option<&Token<'a>> {
    self.tokens.get(self.pos)
  }

  fn is_eof(&self) -> bool {
    self.pos >= self.tokens.len()
  }

  /// Anchor an error at the current token, or at the end of the source
  /// once the tokens run out.
  fn error_here(&self, message: impl Into<String>) -> CompileError {
    let loc = self.peek().map_or(self.source.len(), |token| token.loc);
    CompileError::at(self.source, loc, message)
  }

  /// Consume the current token if its text matches `op`.
  fn equal(&mut self, op: &str) -> bool {
    if let Some(token) = self.peek()
      && token.text == op
    {
      self.pos += 1;
      return true;
    }
    false
  }

  /// Consume the current token, failing if it does not match `s`.
  fn skip(&mut self, s: &str) -> CompileResult<()> {
    if self.equal(s) {
      Ok(())
    } else {
      let got = describe_token(self.peek());
      Err(self.error_here(format!("expected \"{s}\", but got \"{got}\"")))
    }
  }

  /// Consume the current token as an integer literal, returning its value.
  fn get_number(&mut self) -> CompileResult<i64> {
    if let Some(token) = self.peek()
      && token.kind == TokenKind::IntLiteral
    {
      let value = token.text.parse::<i64>().map_err(|err| {
        CompileError::at(self.source, token.loc, format!("invalid number: {err}"))
      })?;
      self.pos += 1;
      return Ok(value);
    }

    let got = describe_token(self.peek());
    Err(self.error_here(format!("expected a number, but got \"{got}\"")))
  }

  /// Consume the current token as an identifier, returning its name.
  fn get_ident(&mut self) -> CompileResult<String> {
    if let Some(token) = self.peek()
      && token.kind == TokenKind::Identifier
    {
      let name = token.text.to_string();
      self.pos += 1;
      return Ok(name);
    }

    let got = describe_token(self.peek());
    Err(self.error_here(format!("expected an identifier, but got \"{got}\"")))
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::tokenizer::tokenize;

  fn parse_source(source: &str) -> CompileResult<Vec<Stmt>> {
    let tokens = tokenize(source);
    parse(&tokens, source)
  }

  fn parse_one(source: &str) -> Stmt {
    let mut program = parse_source(source).expect("program should parse");
    assert_eq!(program.len(), 1);
    program.remove(0)
  }

  #[test]
  fn multiplication_binds_tighter_than_addition() {
    let stmt = parse_one("let x = 1 + 2 * 3;");
    let expected = Stmt::Assign {
      name: "x".into(),
      value: AstNode::binary(
        BinaryOp::Add,
        AstNode::number(1),
        AstNode::binary(BinaryOp::Mul, AstNode::number(2), AstNode::number(3)),
      ),
    };
    assert_eq!(stmt, expected);
  }

  #[test]
  fn subtraction_is_left_associative() {
    let stmt = parse_one("let a = 5 - 2 - 1;");
    let expected = Stmt::Assign {
      name: "a".into(),
      value: AstNode::binary(
        BinaryOp::Sub,
        AstNode::binary(BinaryOp::Sub, AstNode::number(5), AstNode::number(2)),
        AstNode::number(1),
      ),
    };
    assert_eq!(stmt, expected);
  }

  #[test]
  fn parentheses_override_precedence() {
    let stmt = parse_one("let x = (1 + 2) * 3;");
    let expected = Stmt::Assign {
      name: "x".into(),
      value: AstNode::binary(
        BinaryOp::Mul,
        AstNode::binary(BinaryOp::Add, AstNode::number(1), AstNode::number(2)),
        AstNode::number(3),
      ),
    };
    assert_eq!(stmt, expected);
  }

  #[test]
  fn print_takes_a_full_expression() {
    let stmt = parse_one("print(x + 1);");
    let expected = Stmt::Print {
      value: AstNode::binary(BinaryOp::Add, AstNode::var("x"), AstNode::number(1)),
    };
    assert_eq!(stmt, expected);
  }

  #[test]
  fn empty_input_is_an_empty_program() {
    assert_eq!(parse_source("").expect("empty program"), vec![]);
  }

  #[test]
  fn consecutive_statements_parse_in_order() {
    let program = parse_source("let x = 1; print(x);").expect("program should parse");
    assert_eq!(program.len(), 2);
    assert!(matches!(program[0], Stmt::Assign { .. }));
    assert!(matches!(program[1], Stmt::Print { .. }));
  }

  #[test]
  fn missing_factor_is_rejected() {
    let err = parse_source("let x = ;").unwrap_err();
    assert!(err.to_string().contains("but got \";\""), "{err}");
  }

  #[test]
  fn missing_semicolon_is_reported_as_end_of_input() {
    let err = parse_source("print(x)").unwrap_err();
    assert!(err.to_string().contains("end of input"), "{err}");
  }

  #[test]
  fn unknown_statement_leader_is_rejected() {
    let err = parse_source("x = 1;").unwrap_err();
    assert!(
      err.to_string().contains("expected \"let\" or \"print\""),
      "{err}"
    );
  }

  #[test]
  fn keywords_are_not_variables() {
    assert!(parse_source("let x = print;").is_err());
    assert!(parse_source("let let = 1;").is_err());
  }

  #[test]
  fn comparison_operators_are_rejected_by_the_grammar() {
    assert!(parse_source("let x = 1 == 2;").is_err());
    assert!(parse_source("let x = <= 2;").is_err());
  }

  #[test]
  fn modulo_is_tokenized_but_rejected() {
    let err = parse_source("let x = 5 % 2;").unwrap_err();
    assert!(err.to_string().contains("expected \";\", but got \"%\""), "{err}");
  }

  #[test]
  fn unbalanced_parentheses_are_rejected() {
    let err = parse_source("print((1 + 2);").unwrap_err();
    assert!(err.to_string().contains("expected \")\""), "{err}");
  }

  #[test]
  fn oversized_literal_is_a_parse_error() {
    let err = parse_source("let x = 99999999999999999999;").unwrap_err();
    assert!(err.to_string().contains("invalid number"), "{err}");
  }
}
