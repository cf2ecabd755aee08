#[macro_use]
extern crate lazy_static;

#[macro_use]
pub mod utils;

pub mod category;
pub mod chart;
pub mod edge;
pub mod forest;
pub mod grammar;
pub mod lexicon;
pub mod parse_grammar;
pub mod parser;
pub mod rules;
pub mod syntree;
pub mod unify;

pub use crate::category::{Category, Feature, Symbol};
pub use crate::chart::Chart;
pub use crate::forest::Forest;
pub use crate::grammar::Grammar;
pub use crate::lexicon::Lexicon;
pub use crate::parser::{AgendaOrder, Parser};
pub use crate::syntree::{SynTree, Tree};
pub use crate::utils::Err;

impl Grammar {
  /// Parses `input` and fills in the chart, for inspecting what was found
  pub fn parse_chart(&self, input: &[&str]) -> Chart {
    let mut parser = Parser::new(self);
    parser.parse(input);
    parser.into_chart()
  }

  /// Every parse tree for `input`. Use a `Parser` directly to enumerate them lazily.
  pub fn parse(&self, input: &[&str]) -> Vec<Tree> {
    let mut parser = Parser::new(self);
    parser.parse(input).trees().collect()
  }
}

#[test]
fn test_agreement_blocking() {
  let g = Grammar::from_sources(
    r#"
S -> NP.$n VP.$n
NP.$n -> Det.$n N.$n
VP.$n -> V.$n
"#,
    r#"
this Det.sg
these Det.pl
dog N.sg
dogs N.pl
barks V.sg
bark V.pl
"#,
  )
  .unwrap();

  assert_eq!(g.parse(&["this", "dog", "barks"]).len(), 1);
  assert_eq!(g.parse(&["these", "dogs", "bark"]).len(), 1);

  assert_eq!(g.parse(&["this", "dogs", "barks"]).len(), 0);
  assert_eq!(g.parse(&["these", "dogs", "barks"]).len(), 0);
  assert_eq!(g.parse(&["this", "dog", "bark"]).len(), 0);
  assert_eq!(g.parse(&["this", "dog"]).len(), 0);
}

#[test]
fn test_parse_chart() {
  let g = Grammar::from_sources("S -> S S", "x S").unwrap();
  let chart = g.parse_chart(&["x", "x", "x"]);

  // one S per span
  assert_eq!(chart.len(), 6);
  let s = |i, j| chart.get(&Category::bare("S"), i, j).unwrap();
  assert_eq!(s(0, 3).expansions().len(), 2);
  assert_eq!(s(0, 2).expansions().len(), 1);
  assert_eq!(s(1, 2).expansions().len(), 1);

  assert_eq!(g.parse(&["x", "x", "x"]).len(), 2);
}
