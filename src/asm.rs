//! Pseudo-assembly generation: a 1:1 rewrite of the TAC onto an implicit
//! single-accumulator machine.
//!
//! `Load` fills the accumulator (with a value or a whole rendered
//! arithmetic expression), `Store` persists it under a name, `Out` emits
//! it. Every TAC instruction becomes exactly two of these, in order. The
//! listing is display output only; execution always runs over the TAC
//! directly.

use std::fmt;

use log::debug;

use crate::tac;

/// One accumulator-machine instruction.
#[derive(Debug, Clone, PartialEq)]
pub enum Instruction {
  Load(String),
  Store(String),
  Out,
}

impl fmt::Display for Instruction {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      Instruction::Load(text) => write!(f, "LOAD {text}"),
      Instruction::Store(dest) => write!(f, "STORE {dest}"),
      Instruction::Out => write!(f, "OUT"),
    }
  }
}

/// Rewrite the TAC instruction by instruction; writes become a
/// `Load`/`Store` pair, prints a `Load`/`Out` pair.
pub fn generate(code: &[tac::Instruction]) -> Vec<Instruction> {
  let mut asm = Vec::with_capacity(code.len() * 2);

  for instr in code {
    asm.push(Instruction::Load(instr.rhs_text()));
    match instr {
      tac::Instruction::Compute { dest, .. } | tac::Instruction::Assign { dest, .. } => {
        asm.push(Instruction::Store(dest.clone()));
      }
      tac::Instruction::Print { .. } => asm.push(Instruction::Out),
    }
  }

  debug!(
    "rewrote {} TAC instruction(s) into {} assembly instruction(s)",
    code.len(),
    asm.len()
  );
  asm
}
