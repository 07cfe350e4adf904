//! Reference interpreter: executes the TAC sequence directly, never the
//! pseudo-assembly.
//!
//! Execution is deliberately forgiving. Any right-hand side that fails to
//! evaluate (an unassigned name, division by zero, overflow) stores zero
//! and execution keeps going, and `print` reads straight from memory with
//! a zero default. A run therefore never fails; it models a best-effort
//! runtime rather than a strict one.

use std::collections::BTreeMap;

use log::trace;

use crate::parser::BinaryOp;
use crate::tac::{Instruction, Operand};

/// Final state of a run: every slot written (temporaries included) and
/// the printed values in order.
#[derive(Debug, Clone, Default)]
pub struct Execution {
  pub memory: BTreeMap<String, i64>,
  pub printed: Vec<i64>,
}

/// Execute the TAC top to bottom.
pub fn run(code: &[Instruction]) -> Execution {
  let mut execution = Execution::default();

  for instr in code {
    trace!("executing {instr}");
    match instr {
      Instruction::Compute { dest, op, lhs, rhs } => {
        let value = eval_binary(*op, lhs, rhs, &execution.memory).unwrap_or(0);
        execution.memory.insert(dest.clone(), value);
      }
      Instruction::Assign { dest, src } => {
        let value = resolve(src, &execution.memory).unwrap_or(0);
        execution.memory.insert(dest.clone(), value);
      }
      Instruction::Print { src } => {
        // Print reads memory only. A literal operand was never stored
        // anywhere, so it falls back to zero like any other missing slot.
        let value = match src {
          Operand::Name(name) => execution.memory.get(name).copied().unwrap_or(0),
          Operand::Const(_) => 0,
        };
        execution.printed.push(value);
      }
    }
  }

  execution
}

/// A literal is its own value; a name reads current memory. `None` marks
/// an unassigned name.
fn resolve(operand: &Operand, memory: &BTreeMap<String, i64>) -> Option<i64> {
  match operand {
    Operand::Const(value) => Some(*value),
    Operand::Name(name) => memory.get(name).copied(),
  }
}

/// Checked arithmetic so division by zero and overflow fold into the
/// store-zero policy instead of aborting the run.
fn eval_binary(
  op: BinaryOp,
  lhs: &Operand,
  rhs: &Operand,
  memory: &BTreeMap<String, i64>,
) -> Option<i64> {
  let lhs = resolve(lhs, memory)?;
  let rhs = resolve(rhs, memory)?;
  match op {
    BinaryOp::Add => lhs.checked_add(rhs),
    BinaryOp::Sub => lhs.checked_sub(rhs),
    BinaryOp::Mul => lhs.checked_mul(rhs),
    BinaryOp::Div => lhs.checked_div(rhs),
  }
}
