//! Command-line shell around the compiler library.
//!
//! Reads a source file, drives the pipeline, and renders every stage to
//! stdout; `--demo-grammar` instead prints the grammar analysis of the
//! language itself. Purely presentational: all behavior lives in the
//! library.

use std::collections::BTreeSet;
use std::fs;
use std::process;

use clap::{Arg, ArgAction, Command};
use log::debug;

use minicc::grammar::Grammar;
use minicc::{Compilation, interpreter, symbol_table};

fn main() {
  env_logger::init();

  let matches = Command::new("minicc")
    .version(env!("CARGO_PKG_VERSION"))
    .about("Compiler for a small let/print language, down to TAC and pseudo-assembly")
    .arg(
      Arg::new("file")
        .value_name("FILE")
        .help("Source file to compile")
        .required_unless_present("demo-grammar"),
    )
    .arg(
      Arg::new("demo-grammar")
        .long("demo-grammar")
        .action(ArgAction::SetTrue)
        .help("Analyse the language grammar (FIRST/FOLLOW, left recursion, left factoring) and exit"),
    )
    .get_matches();

  if matches.get_flag("demo-grammar") {
    render_grammar_demo();
    return;
  }

  let path = matches.get_one::<String>("file").unwrap();
  let source = match fs::read_to_string(path) {
    Ok(source) => source,
    Err(err) => {
      eprintln!("{path}: {err}");
      process::exit(1);
    }
  };

  debug!("compiling {path}");
  let compilation = match minicc::compile(&source) {
    Ok(compilation) => compilation,
    Err(err) => {
      eprintln!("{err}");
      process::exit(1);
    }
  };

  render_stages(&compilation);
}

/// Print each pipeline stage under its banner, ending with the program
/// output from the interpreter.
fn render_stages(compilation: &Compilation) {
  let texts: Vec<&str> = compilation.tokens.iter().map(|token| token.text).collect();
  println!("\n=== TOKENS ===");
  println!("{texts:?}");

  println!("\n=== AST ===");
  for stmt in &compilation.program {
    println!("{stmt:?}");
  }

  println!("\n=== SYMBOL TABLE ===");
  for (name, expr) in symbol_table::build(&compilation.program) {
    println!("{name} = {expr:?}");
  }

  println!("\n=== THREE ADDRESS CODE (TAC) ===");
  for instr in &compilation.tac {
    println!("{instr}");
  }

  println!("\n=== ASSEMBLY CODE ===");
  for instr in &compilation.asm {
    println!("{instr}");
  }

  println!("\n=== OUTPUT ===");
  let execution = interpreter::run(&compilation.tac);
  for value in &execution.printed {
    println!("{value}");
  }
  debug!("final memory: {:?}", execution.memory);
}

/// Walk the grammar toolkit over the language's own grammar: sets first,
/// then the two rewrites, in the order a table-driven parser would need
/// them.
fn render_grammar_demo() {
  let grammar = Grammar::mini_language();
  println!("== Original Grammar ==");
  print!("{grammar}");

  let first = grammar.first_sets();
  println!("\nFIRST sets:");
  for name in &grammar.nonterminals {
    println!("FIRST({name}) = {}", render_set(&first[name]));
  }

  let follow = grammar.follow_sets(&first);
  println!("\nFOLLOW sets:");
  for name in &grammar.nonterminals {
    println!("FOLLOW({name}) = {}", render_set(&follow[name]));
  }

  let eliminated = grammar.eliminate_left_recursion();
  println!("\n== After Left Recursion Elimination ==");
  print!("{eliminated}");

  let factored = eliminated.left_factor();
  println!("\n== After Left Factoring ==");
  print!("{factored}");
}

fn render_set(symbols: &BTreeSet<String>) -> String {
  let items: Vec<&str> = symbols.iter().map(String::as_str).collect();
  format!("{{ {} }}", items.join(", "))
}
