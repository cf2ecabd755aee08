use std::collections::HashMap;
use std::fmt;

use crate::category::Category;

/// Word <-> category index
#[derive(Debug, Default, Clone)]
pub struct Lexicon {
  parts: HashMap<String, Vec<Category>>,
  words: HashMap<String, Vec<String>>,
  /// words in first-seen order, for Display
  order: Vec<String>,
}

impl Lexicon {
  pub fn new() -> Self {
    Default::default()
  }

  /// Records that `word` can be read as `category`. Lexical categories have to
  /// be ground, and repeated entries are ignored.
  pub fn add(&mut self, word: impl Into<String>, category: Category) {
    assert!(
      category.is_ground(),
      "lexicon category {} has variables",
      category
    );

    let word = word.into();
    let parts = self.parts.entry(word.clone()).or_insert_with(|| {
      self.order.push(word.clone());
      Vec::new()
    });
    if parts.contains(&category) {
      return;
    }

    self
      .words
      .entry(category.head.name.clone())
      .or_default()
      .push(word);
    parts.push(category);
  }

  /// Categories `word` can take. Empty for unknown words.
  pub fn parts(&self, word: &str) -> &[Category] {
    self.parts.get(word).map(Vec::as_slice).unwrap_or(&[])
  }

  /// Words that have some category headed by `head`
  pub fn words(&self, head: &str) -> &[String] {
    self.words.get(head).map(Vec::as_slice).unwrap_or(&[])
  }

  pub fn contains(&self, word: &str) -> bool {
    self.parts.contains_key(word)
  }

  /// Number of distinct words
  pub fn len(&self) -> usize {
    self.order.len()
  }

  pub fn is_empty(&self) -> bool {
    self.len() == 0
  }
}

impl fmt::Display for Lexicon {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    for word in self.order.iter() {
      write!(f, "{}", word)?;
      for c in self.parts(word) {
        write!(f, " {}", c)?;
      }
      writeln!(f)?;
    }
    Ok(())
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_bidirectional() {
    let mut lex = Lexicon::new();
    lex.add("bark", "N.sg".parse().unwrap());
    lex.add("bark", "V.pl.i.0".parse().unwrap());
    lex.add("dog", "N.sg".parse().unwrap());
    lex.add("dog", "N.sg".parse().unwrap());

    assert_eq!(lex.parts("bark").len(), 2);
    assert_eq!(lex.parts("dog").len(), 1);
    assert_eq!(lex.words("N"), &["bark".to_string(), "dog".to_string()]);
    assert_eq!(lex.words("V"), &["bark".to_string()]);
    assert!(lex.parts("cat").is_empty());
    assert!(lex.words("Adj").is_empty());
    assert_eq!(lex.len(), 2);
    assert_eq!(lex.to_string(), "bark N.sg V.pl.i.0\ndog N.sg\n");
  }
}
