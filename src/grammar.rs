//! Grammar analysis toolkit: FIRST and FOLLOW sets, immediate left
//! recursion elimination, and left factoring.
//!
//! Companion material for the parser rather than part of the pipeline.
//! The hand-written recursive-descent parser needs its grammar free of
//! left recursion, and these routines demonstrate the transformation on
//! the language's own grammar (see [`Grammar::mini_language`] and the
//! `--demo-grammar` flag). Everything operates on ordered collections,
//! so listings and transformations come out the same on every run.

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

/// The empty production symbol.
pub const EPSILON: &str = "ε";

/// End-of-input marker used in FOLLOW sets.
pub const END_MARKER: &str = "$";

/// A context-free grammar: alternatives per nonterminal, each alternative
/// a sequence of symbols. Alternatives keep declaration order; the
/// production map and the symbol sets keep name order.
#[derive(Debug, Clone, PartialEq)]
pub struct Grammar {
  pub start: String,
  pub productions: BTreeMap<String, Vec<Vec<String>>>,
  pub nonterminals: BTreeSet<String>,
  pub terminals: BTreeSet<String>,
}

/// Symbol sets keyed by symbol, the shape of FIRST and FOLLOW results.
pub type SymbolSets = BTreeMap<String, BTreeSet<String>>;

impl Grammar {
  /// The surface grammar of this compiler's own language, in its natural
  /// left-recursive form.
  pub fn mini_language() -> Self {
    let mut grammar = Grammar {
      start: "S".into(),
      productions: BTreeMap::new(),
      nonterminals: ["S", "ST", "E", "T", "F"].iter().map(|s| s.to_string()).collect(),
      terminals: ["let", "print", "id", "num", "=", ";", "(", ")", "+", "-", "*", "/"]
        .iter()
        .map(|s| s.to_string())
        .collect(),
    };

    grammar.add_production("S", &[&["ST"]]);
    grammar.add_production(
      "ST",
      &[
        &["let", "id", "=", "E", ";"],
        &["print", "(", "E", ")", ";"],
        &["ST", "ST"],
      ],
    );
    grammar.add_production("E", &[&["E", "+", "T"], &["E", "-", "T"], &["T"]]);
    grammar.add_production("T", &[&["T", "*", "F"], &["T", "/", "F"], &["F"]]);
    grammar.add_production("F", &[&["(", "E", ")"], &["id"], &["num"]]);
    grammar
  }

  /// Append alternatives for one nonterminal, keeping declaration order.
  fn add_production(&mut self, name: &str, alternatives: &[&[&str]]) {
    let entry = self.productions.entry(name.to_string()).or_default();
    for alternative in alternatives {
      entry.push(alternative.iter().map(|s| s.to_string()).collect());
    }
  }

  fn is_nonterminal(&self, symbol: &str) -> bool {
    self.nonterminals.contains(symbol)
  }

  /// Fixpoint FIRST computation over every grammar symbol. Terminals map
  /// to themselves; an alternative that derives nothing contributes `ε`.
  pub fn first_sets(&self) -> SymbolSets {
    let mut first: SymbolSets = BTreeMap::new();
    for terminal in &self.terminals {
      first
        .entry(terminal.clone())
        .or_default()
        .insert(terminal.clone());
    }
    for nonterminal in &self.nonterminals {
      first.entry(nonterminal.clone()).or_default();
    }

    let mut changed = true;
    while changed {
      changed = false;
      for (name, alternatives) in &self.productions {
        for alternative in alternatives {
          let (symbols, nullable) = self.first_of_sequence(alternative, &first);
          let entry = first.entry(name.clone()).or_default();
          for symbol in symbols {
            changed |= entry.insert(symbol);
          }
          if nullable {
            changed |= entry.insert(EPSILON.to_string());
          }
        }
      }
    }

    first
  }

  /// FIRST of a symbol sequence: the reachable leading terminals, plus
  /// whether the whole sequence can derive ε.
  fn first_of_sequence(&self, symbols: &[String], first: &SymbolSets) -> (BTreeSet<String>, bool) {
    let mut set = BTreeSet::new();

    for symbol in symbols {
      if symbol == EPSILON {
        continue;
      }
      if !self.is_nonterminal(symbol) {
        set.insert(symbol.clone());
        return (set, false);
      }
      let symbol_first = &first[symbol];
      set.extend(symbol_first.iter().filter(|s| *s != EPSILON).cloned());
      if !symbol_first.contains(EPSILON) {
        return (set, false);
      }
    }

    (set, true)
  }

  /// Fixpoint FOLLOW computation for every nonterminal. `$` marks end of
  /// input after the start symbol.
  pub fn follow_sets(&self, first: &SymbolSets) -> SymbolSets {
    let mut follow: SymbolSets = BTreeMap::new();
    for nonterminal in &self.nonterminals {
      follow.entry(nonterminal.clone()).or_default();
    }
    follow
      .entry(self.start.clone())
      .or_default()
      .insert(END_MARKER.to_string());

    let mut changed = true;
    while changed {
      changed = false;
      for (name, alternatives) in &self.productions {
        for alternative in alternatives {
          for (i, symbol) in alternative.iter().enumerate() {
            if !self.is_nonterminal(symbol) {
              continue;
            }
            let (mut addition, nullable) = self.first_of_sequence(&alternative[i + 1..], first);
            if nullable {
              addition.extend(follow.get(name).cloned().unwrap_or_default());
            }
            let entry = follow.entry(symbol.clone()).or_default();
            for sym in addition {
              changed |= entry.insert(sym);
            }
          }
        }
      }
    }

    follow
  }

  /// Remove immediate left recursion, rewriting `A -> A α | β` into
  /// `A -> β A'` and `A' -> α A' | ε`.
  pub fn eliminate_left_recursion(&self) -> Grammar {
    let mut grammar = self.clone();
    let order: Vec<String> = grammar.nonterminals.iter().cloned().collect();

    for name in order {
      let Some(alternatives) = grammar.productions.get(&name) else {
        continue;
      };

      let (recursive, rest): (Vec<_>, Vec<_>) = alternatives
        .iter()
        .cloned()
        .partition(|alt| alt.first() == Some(&name));
      if recursive.is_empty() {
        continue;
      }

      let primed = grammar.fresh_nonterminal(&name);
      grammar.nonterminals.insert(primed.clone());

      let mut base = Vec::new();
      for alternative in rest {
        let mut symbols: Vec<String> = alternative.into_iter().filter(|s| s != EPSILON).collect();
        symbols.push(primed.clone());
        base.push(symbols);
      }

      let mut primed_alts = Vec::new();
      for alternative in recursive {
        let mut symbols: Vec<String> = alternative.into_iter().skip(1).collect();
        symbols.push(primed.clone());
        primed_alts.push(symbols);
      }
      primed_alts.push(vec![EPSILON.to_string()]);

      grammar.productions.insert(name, base);
      grammar.productions.insert(primed, primed_alts);
    }

    grammar
  }

  /// Left factor the grammar: wherever one nonterminal has alternatives
  /// sharing a common prefix, hoist the prefix and push the differing
  /// tails into a primed nonterminal. Repeats until nothing changes.
  pub fn left_factor(&self) -> Grammar {
    let mut grammar = self.clone();
    grammar.dedup_alternatives();

    while let Some((name, prefix, group)) = grammar.find_factorable_prefix() {
      grammar.apply_factoring(&name, &prefix, &group);
    }

    grammar
  }

  /// Identical alternatives are redundant; drop them up front so
  /// factoring cannot chase a prefix equal to a duplicated alternative.
  fn dedup_alternatives(&mut self) {
    for alternatives in self.productions.values_mut() {
      let mut seen: BTreeSet<Vec<String>> = BTreeSet::new();
      alternatives.retain(|alternative| seen.insert(alternative.clone()));
    }
  }

  /// The first nonterminal with two or more alternatives sharing a
  /// non-trivial prefix, together with that prefix and those
  /// alternatives.
  fn find_factorable_prefix(&self) -> Option<(String, Vec<String>, Vec<Vec<String>>)> {
    for (name, alternatives) in &self.productions {
      let mut groups: BTreeMap<&String, Vec<&Vec<String>>> = BTreeMap::new();
      for alternative in alternatives {
        if let Some(head) = alternative.first()
          && head != EPSILON
        {
          groups.entry(head).or_default().push(alternative);
        }
      }

      for group in groups.values() {
        if group.len() < 2 {
          continue;
        }
        let prefix = longest_common_prefix(group);
        if !prefix.is_empty() {
          let members = group.iter().map(|alt| (*alt).clone()).collect();
          return Some((name.clone(), prefix, members));
        }
      }
    }

    None
  }

  fn apply_factoring(&mut self, name: &str, prefix: &[String], group: &[Vec<String>]) {
    let primed = self.fresh_nonterminal(name);
    self.nonterminals.insert(primed.clone());

    let mut tails = Vec::new();
    for alternative in group {
      let tail = alternative[prefix.len()..].to_vec();
      if tail.is_empty() {
        tails.push(vec![EPSILON.to_string()]);
      } else {
        tails.push(tail);
      }
    }

    let mut head = prefix.to_vec();
    head.push(primed.clone());

    let mut replacement = vec![head];
    if let Some(alternatives) = self.productions.get(name) {
      for alternative in alternatives {
        if !group.contains(alternative) {
          replacement.push(alternative.clone());
        }
      }
    }

    self.productions.insert(name.to_string(), replacement);
    self.productions.insert(primed, tails);
  }

  /// First unused primed variant of `name`: `E'`, then `E''`, ...
  fn fresh_nonterminal(&self, name: &str) -> String {
    let mut candidate = format!("{name}'");
    while self.nonterminals.contains(&candidate) || self.terminals.contains(&candidate) {
      candidate.push('\'');
    }
    candidate
  }
}

/// Longest prefix shared by every alternative in the group. The caller
/// guarantees at least one member.
fn longest_common_prefix(alternatives: &[&Vec<String>]) -> Vec<String> {
  let mut prefix = alternatives[0].clone();
  for alternative in &alternatives[1..] {
    let shared = prefix
      .iter()
      .zip(alternative.iter())
      .take_while(|(a, b)| a == b)
      .count();
    prefix.truncate(shared);
  }
  prefix
}

impl fmt::Display for Grammar {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    for (name, alternatives) in &self.productions {
      let rendered: Vec<String> = alternatives.iter().map(|alt| alt.join(" ")).collect();
      writeln!(f, "{name} -> {}", rendered.join(" | "))?;
    }
    Ok(())
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  fn set(items: &[&str]) -> BTreeSet<String> {
    items.iter().map(|s| s.to_string()).collect()
  }

  fn alts(alternatives: &[&[&str]]) -> Vec<Vec<String>> {
    alternatives
      .iter()
      .map(|alt| alt.iter().map(|s| s.to_string()).collect())
      .collect()
  }

  fn bare_grammar(start: &str, nonterminals: &[&str], terminals: &[&str]) -> Grammar {
    Grammar {
      start: start.into(),
      productions: BTreeMap::new(),
      nonterminals: nonterminals.iter().map(|s| s.to_string()).collect(),
      terminals: terminals.iter().map(|s| s.to_string()).collect(),
    }
  }

  #[test]
  fn first_sets_of_the_mini_language() {
    let grammar = Grammar::mini_language();
    let first = grammar.first_sets();
    assert_eq!(first["E"], set(&["(", "id", "num"]));
    assert_eq!(first["T"], set(&["(", "id", "num"]));
    assert_eq!(first["F"], set(&["(", "id", "num"]));
    assert_eq!(first["ST"], set(&["let", "print"]));
    assert_eq!(first["S"], set(&["let", "print"]));
    assert_eq!(first["+"], set(&["+"]));
  }

  #[test]
  fn follow_sets_of_the_mini_language() {
    let grammar = Grammar::mini_language();
    let follow = grammar.follow_sets(&grammar.first_sets());
    assert_eq!(follow["S"], set(&["$"]));
    assert_eq!(follow["ST"], set(&["$", "let", "print"]));
    assert_eq!(follow["E"], set(&[")", "+", "-", ";"]));
    assert_eq!(follow["T"], set(&[")", "*", "+", "-", "/", ";"]));
    assert_eq!(follow["F"], set(&[")", "*", "+", "-", "/", ";"]));
  }

  #[test]
  fn left_recursion_elimination_introduces_primed_tails() {
    let grammar = Grammar::mini_language().eliminate_left_recursion();
    assert_eq!(grammar.productions["E"], alts(&[&["T", "E'"]]));
    assert_eq!(
      grammar.productions["E'"],
      alts(&[&["+", "T", "E'"], &["-", "T", "E'"], &[EPSILON]])
    );
    assert_eq!(
      grammar.productions["ST"],
      alts(&[
        &["let", "id", "=", "E", ";", "ST'"],
        &["print", "(", "E", ")", ";", "ST'"],
      ])
    );
    assert_eq!(
      grammar.productions["ST'"],
      alts(&[&["ST", "ST'"], &[EPSILON]])
    );
    assert!(grammar.nonterminals.contains("T'"));
  }

  #[test]
  fn epsilon_alternatives_contribute_to_first() {
    let grammar = Grammar::mini_language().eliminate_left_recursion();
    let first = grammar.first_sets();
    assert_eq!(first["E'"], set(&["+", "-", EPSILON]));
    assert_eq!(first["E"], set(&["(", "id", "num"]));
  }

  #[test]
  fn follow_handles_nullable_tails() {
    let grammar = Grammar::mini_language().eliminate_left_recursion();
    let follow = grammar.follow_sets(&grammar.first_sets());
    assert_eq!(follow["E"], set(&[")", ";"]));
    assert_eq!(follow["E'"], set(&[")", ";"]));
    assert_eq!(follow["T"], set(&[")", "+", "-", ";"]));
  }

  #[test]
  fn left_factoring_leaves_a_factored_grammar_alone() {
    let grammar = Grammar::mini_language().eliminate_left_recursion();
    assert_eq!(grammar.left_factor(), grammar);
  }

  #[test]
  fn left_factoring_hoists_a_shared_prefix() {
    let mut grammar = bare_grammar("A", &["A"], &["a", "b", "c", "d", "e"]);
    grammar.add_production("A", &[&["a", "b", "c"], &["a", "b", "d"], &["e"]]);

    let factored = grammar.left_factor();
    assert_eq!(
      factored.productions["A"],
      alts(&[&["a", "b", "A'"], &["e"]])
    );
    assert_eq!(factored.productions["A'"], alts(&[&["c"], &["d"]]));
  }

  #[test]
  fn left_factoring_uses_epsilon_for_an_empty_tail() {
    let mut grammar = bare_grammar("A", &["A"], &["a", "b", "c"]);
    grammar.add_production("A", &[&["a", "b"], &["a", "b", "c"]]);

    let factored = grammar.left_factor();
    assert_eq!(factored.productions["A"], alts(&[&["a", "b", "A'"]]));
    assert_eq!(factored.productions["A'"], alts(&[&[EPSILON], &["c"]]));
  }

  #[test]
  fn duplicate_alternatives_collapse_before_factoring() {
    let mut grammar = bare_grammar("A", &["A"], &["a"]);
    grammar.add_production("A", &[&["a"], &["a"]]);
    assert_eq!(grammar.left_factor().productions["A"], alts(&[&["a"]]));
  }

  #[test]
  fn primed_names_never_collide() {
    let mut grammar = bare_grammar("A", &["A", "A'"], &["a", "b"]);
    grammar.add_production("A", &[&["A", "a"], &["b"]]);
    grammar.add_production("A'", &[&["a"]]);

    let eliminated = grammar.eliminate_left_recursion();
    assert_eq!(eliminated.productions["A"], alts(&[&["b", "A''"]]));
    assert_eq!(
      eliminated.productions["A''"],
      alts(&[&["a", "A''"], &[EPSILON]])
    );
  }

  #[test]
  fn displays_productions_with_alternatives_joined() {
    let text = Grammar::mini_language().to_string();
    assert!(text.contains("E -> E + T | E - T | T"), "{text}");
    assert!(text.contains("F -> ( E ) | id | num"), "{text}");
  }
}
