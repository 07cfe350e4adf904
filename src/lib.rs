//! Crate root: wires together the compilation pipeline.
//!
//! The stages are intentionally small and composable so they can be evolved
//! independently:
//! - `tokenizer` performs lexical analysis and produces a flat token stream.
//! - `parser` owns all syntactic knowledge and returns the statement AST.
//! - `symbol_table` lists the last expression assigned to each variable.
//! - `tac` lowers the AST to three-address code.
//! - `asm` rewrites the TAC onto a single-accumulator pseudo-assembly.
//! - `interpreter` executes the TAC and collects the program output.
//! - `grammar` analyses the language's own grammar (demo material).
//! - `error` centralises reporting utilities shared by the other modules.

pub mod asm;
pub mod error;
pub mod grammar;
pub mod interpreter;
pub mod parser;
pub mod symbol_table;
pub mod tac;
pub mod tokenizer;

pub use error::{CompileError, CompileResult};

use log::debug;

/// Every artifact of one compilation, in pipeline order.
///
/// The interpreter runs separately over `tac` (see [`interpreter::run`]),
/// and the symbol table is a borrowing view built on demand via
/// [`symbol_table::build`].
#[derive(Debug, Clone)]
pub struct Compilation<'a> {
  pub tokens: Vec<tokenizer::Token<'a>>,
  pub program: Vec<parser::Stmt>,
  pub tac: Vec<tac::Instruction>,
  pub asm: Vec<asm::Instruction>,
}

/// Compile a source string through every stage.
///
/// The only failure mode is a syntax error; lexing is infallible and the
/// two lowerings are total over well-formed ASTs.
pub fn compile(source: &str) -> CompileResult<Compilation<'_>> {
  let tokens = tokenizer::tokenize(source);
  debug!("{tokens:?}");

  let program = parser::parse(&tokens, source)?;
  let tac = tac::generate(&program);
  let asm = asm::generate(&tac);

  Ok(Compilation {
    tokens,
    program,
    tac,
    asm,
  })
}
