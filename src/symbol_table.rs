//! Symbol table builder: a static listing of the last expression assigned
//! to each variable.
//!
//! The table is diagnostic output, not an evaluation context; later stages
//! never consult it. Reassigning a name overwrites the earlier entry, so
//! the listing reflects whatever a top-to-bottom reading of the program
//! leaves behind. `print` statements contribute nothing.

use std::collections::BTreeMap;

use crate::parser::{AstNode, Stmt};

/// Walk the program once, mapping each assigned name to the expression
/// most recently assigned to it.
pub fn build<'a>(program: &'a [Stmt]) -> BTreeMap<&'a str, &'a AstNode> {
  let mut table = BTreeMap::new();

  for stmt in program {
    if let Stmt::Assign { name, value } = stmt {
      table.insert(name.as_str(), value);
    }
  }

  table
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::parser::parse;
  use crate::tokenizer::tokenize;

  fn parse_program(source: &str) -> Vec<Stmt> {
    let tokens = tokenize(source);
    parse(&tokens, source).expect("program should parse")
  }

  #[test]
  fn records_the_last_assignment_per_name() {
    let program = parse_program("let x = 1; let y = 2; let x = 3;");
    let table = build(&program);
    assert_eq!(table.len(), 2);
    assert_eq!(table.get("x").copied(), Some(&AstNode::number(3)));
    assert_eq!(table.get("y").copied(), Some(&AstNode::number(2)));
  }

  #[test]
  fn entries_hold_whole_expressions() {
    let program = parse_program("let x = 1 + 2;");
    let table = build(&program);
    assert!(matches!(
      table.get("x").copied(),
      Some(AstNode::Binary { .. })
    ));
  }

  #[test]
  fn print_statements_contribute_nothing() {
    let program = parse_program("print(x); print(1 + 2);");
    assert!(build(&program).is_empty());
  }
}
