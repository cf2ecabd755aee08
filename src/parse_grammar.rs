/// Line-based parsing of grammar (`.g`) and lexicon (`.lex`) files
use std::fs;
use std::path::Path;
use std::str::FromStr;

use tracing::debug;

use crate::category::{Category, VarTable};
use crate::grammar::Grammar;
use crate::lexicon::Lexicon;
use crate::rules::Rule;
use crate::Err;

pub const ARROW: &str = "->";

/// Blank lines and lines starting with # carry nothing
fn is_skippable(line: &str) -> bool {
  regex_static!(BLANK_OR_COMMENT, r"^\s*(#.*)?$");
  BLANK_OR_COMMENT.is_match(line)
}

/// Checks the shape of a dotted category before handing it to Category::parse
fn check_category(s: &str) -> Result<&str, Err> {
  regex_static!(
    CATEGORY,
    r"^[A-Za-z0-9_\-']+(\.(\$[A-Za-z0-9_\-']+|[A-Za-z0-9_\-']+|\*))*$"
  );
  if CATEGORY.is_match(s) {
    Ok(s)
  } else {
    Err(format!("malformed category {:?}", s).into())
  }
}

fn line_error(lineno: usize, line: &str, err: Err) -> Err {
  format!("line {}: {}: {:?}", lineno + 1, err, line.trim()).into()
}

/// `LHS -> RHS1 RHS2 ...`. Variables are scoped to the line.
fn parse_rule(line: &str) -> Result<Rule, Err> {
  let mut parts = line.split_whitespace();
  let lhs = parts.next().ok_or("empty rule")?;
  match parts.next() {
    Some(ARROW) => {}
    Some(other) => return Err(format!("expected {} after lhs, got {:?}", ARROW, other).into()),
    None => return Err(format!("expected {} after lhs", ARROW).into()),
  }

  let mut table = VarTable::new();
  let lhs = Category::parse(check_category(lhs)?, Some(&mut table))?;
  let rhs = parts
    .map(|part| Category::parse(check_category(part)?, Some(&mut table)))
    .collect::<Result<Vec<_>, _>>()?;
  if rhs.is_empty() {
    return Err("empty productions are not supported".into());
  }

  Ok(Rule::new(lhs, rhs))
}

/// Parses every rule in a grammar file, in order
pub fn parse_rules(s: &str) -> Result<Vec<Rule>, Err> {
  s.lines()
    .enumerate()
    .filter(|(_, line)| !is_skippable(line))
    .map(|(lineno, line)| parse_rule(line).map_err(|e| line_error(lineno, line, e)))
    .collect()
}

impl FromStr for Lexicon {
  type Err = Err;

  /// One entry per line: `word CAT1 CAT2 ...`
  fn from_str(s: &str) -> Result<Self, Self::Err> {
    let mut lexicon = Lexicon::new();

    for (lineno, line) in s.lines().enumerate() {
      if is_skippable(line) {
        continue;
      }

      let mut parts = line.split_whitespace();
      let word = parts.next().ok_or("empty entry")?;
      let mut any = false;
      for part in parts {
        let category = check_category(part)
          .and_then(|c| c.parse::<Category>())
          .map_err(|e| line_error(lineno, line, e))?;
        lexicon.add(word, category);
        any = true;
      }

      if !any {
        return Err(line_error(lineno, line, format!("no categories for {:?}", word).into()));
      }
    }

    Ok(lexicon)
  }
}

impl Grammar {
  /// Builds a grammar from rule and lexicon text. The first rule's lhs is the
  /// start category.
  pub fn from_sources(grammar_src: &str, lexicon_src: &str) -> Result<Self, Err> {
    let rules = parse_rules(grammar_src)?;
    let lexicon: Lexicon = lexicon_src.parse()?;

    let start = match rules.first() {
      Some(first) => first.lhs.clone(),
      None => return Err("empty ruleset".into()),
    };

    Self::new(start, rules, lexicon)
  }

  /// Loads `<stem>.g` and `<stem>.lex`
  pub fn read_from_files(stem: impl AsRef<Path>) -> Result<Self, Err> {
    let stem = stem.as_ref();
    let grammar_path = stem.with_extension("g");
    let lexicon_path = stem.with_extension("lex");
    debug!(grammar = %grammar_path.display(), lexicon = %lexicon_path.display(), "loading grammar");

    let grammar_src = fs::read_to_string(&grammar_path)
      .map_err(|e| -> Err { format!("{}: {}", grammar_path.display(), e).into() })?;
    let lexicon_src = fs::read_to_string(&lexicon_path)
      .map_err(|e| -> Err { format!("{}: {}", lexicon_path.display(), e).into() })?;

    Self::from_sources(&grammar_src, &lexicon_src)
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  const FG0_G: &str = include_str!("../grammars/fg0.g");
  const FG0_LEX: &str = include_str!("../grammars/fg0.lex");

  #[test]
  fn test_parse_rules() {
    let rules = parse_rules(
      r#"
# a comment
VP.$f -> V.$f.t.$p NP.* PP.$p

S -> NP VP
"#,
    )
    .unwrap();

    assert_eq!(rules.len(), 2);
    assert_eq!(rules[0].to_string(), "VP.$0 -> V.$0.t.$1 NP.* PP.$1");
    assert_eq!(rules[0].num_vars(), 2);
    // variables don't leak between rules
    assert_eq!(rules[1].num_vars(), 0);
  }

  #[test]
  fn test_rule_errors() {
    assert!(parse_rules("S NP VP").is_err());
    assert!(parse_rules("S ->").is_err());
    assert!(parse_rules("S -> NP.(x) VP").is_err());

    let err = parse_rules("S -> NP VP\nNP => Det N").unwrap_err();
    assert!(err.to_string().starts_with("line 2:"), "{}", err);
  }

  #[test]
  fn test_lexicon() {
    let lex: Lexicon = FG0_LEX.parse().unwrap();
    assert_eq!(lex.parts("barked"), &["V.*.i.0".parse::<Category>().unwrap()]);

    let mut bark = lex
      .parts("bark")
      .iter()
      .map(|c| c.to_string())
      .collect::<Vec<_>>();
    bark.sort();
    assert_eq!(bark, vec!["N.sg", "V.pl.i.0"]);
  }

  #[test]
  fn test_lexicon_errors() {
    assert!("dog".parse::<Lexicon>().is_err());
    assert!("dog N.$n".parse::<Lexicon>().is_err());
  }

  #[test]
  fn test_fg0() {
    let g = Grammar::from_sources(FG0_G, FG0_LEX).unwrap();
    assert_eq!(g.start().to_string(), "S");
    assert_eq!(
      g.continuations("V")
        .iter()
        .map(|r| r.to_string())
        .collect::<Vec<_>>(),
      vec!["VP.$0 -> V.$0.i.0"]
    );
    assert_eq!(g.lexicon().parts("this"), &["Det.sg".parse::<Category>().unwrap()]);
  }

  #[test]
  fn test_start_must_be_ground() {
    assert!(Grammar::from_sources("NP.$n -> Det.$n N.$n", "this Det.sg").is_err());
    assert!(Grammar::from_sources("# nothing", "this Det.sg").is_err());
  }
}
