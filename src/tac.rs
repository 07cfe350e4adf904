//! Three-address code: the linear intermediate representation between the
//! AST and the pseudo-assembly.
//!
//! Every binary operation gets its own `Compute` into a fresh temporary
//! (`t1`, `t2`, ...); literal and variable leaves never emit anything and
//! travel as operands instead. Instruction order is execution order, with
//! a node's left subtree lowered before its right.

use std::fmt;

use log::debug;

use crate::parser::{AstNode, BinaryOp, Stmt};

/// A TAC value reference: an integer literal, or the name of a source
/// variable or generated temporary.
#[derive(Debug, Clone, PartialEq)]
pub enum Operand {
  Const(i64),
  Name(String),
}

impl fmt::Display for Operand {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      Operand::Const(value) => write!(f, "{value}"),
      Operand::Name(name) => write!(f, "{name}"),
    }
  }
}

/// One three-address instruction.
#[derive(Debug, Clone, PartialEq)]
pub enum Instruction {
  /// `dest = lhs op rhs`, where `dest` is always a fresh temporary.
  Compute {
    dest: String,
    op: BinaryOp,
    lhs: Operand,
    rhs: Operand,
  },
  /// `dest = src`, writing a source variable.
  Assign { dest: String, src: Operand },
  /// `PRINT src`.
  Print { src: Operand },
}

impl Instruction {
  /// The right-hand-side text of the instruction, exactly as the
  /// pseudo-assembly loads it: `2 + 3` for a compute, the bare operand
  /// otherwise.
  pub fn rhs_text(&self) -> String {
    match self {
      Instruction::Compute { op, lhs, rhs, .. } => format!("{lhs} {} {rhs}", op.symbol()),
      Instruction::Assign { src, .. } | Instruction::Print { src } => src.to_string(),
    }
  }
}

impl fmt::Display for Instruction {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      Instruction::Compute { dest, op, lhs, rhs } => {
        write!(f, "{dest} = {lhs} {} {rhs}", op.symbol())
      }
      Instruction::Assign { dest, src } => write!(f, "{dest} = {src}"),
      Instruction::Print { src } => write!(f, "PRINT {src}"),
    }
  }
}

/// Lower a program to TAC.
///
/// The temporary counter lives inside this call, so repeated compilations
/// number their temps independently and identically.
pub fn generate(program: &[Stmt]) -> Vec<Instruction> {
  let mut generator = Generator::default();

  for stmt in program {
    generator.lower_stmt(stmt);
  }

  debug!(
    "lowered {} statement(s) to {} TAC instruction(s)",
    program.len(),
    generator.code.len()
  );
  generator.code
}

#[derive(Default)]
struct Generator {
  code: Vec<Instruction>,
  temps: u32,
}

impl Generator {
  /// Next temporary name: `t1`, `t2`, ...
  fn fresh_temp(&mut self) -> String {
    self.temps += 1;
    format!("t{}", self.temps)
  }

  fn lower_stmt(&mut self, stmt: &Stmt) {
    match stmt {
      Stmt::Assign { name, value } => {
        let src = self.lower_expr(value);
        self.code.push(Instruction::Assign {
          dest: name.clone(),
          src,
        });
      }
      Stmt::Print { value } => {
        let src = self.lower_expr(value);
        self.code.push(Instruction::Print { src });
      }
    }
  }

  /// Lower an expression, returning the operand that names its value.
  /// Leaves lower to themselves; only binary nodes emit an instruction.
  fn lower_expr(&mut self, expr: &AstNode) -> Operand {
    match expr {
      AstNode::Num { value } => Operand::Const(*value),
      AstNode::Var { name } => Operand::Name(name.clone()),
      AstNode::Binary { op, lhs, rhs } => {
        let lhs = self.lower_expr(lhs);
        let rhs = self.lower_expr(rhs);
        let dest = self.fresh_temp();
        self.code.push(Instruction::Compute {
          dest: dest.clone(),
          op: *op,
          lhs,
          rhs,
        });
        Operand::Name(dest)
      }
    }
  }
}
