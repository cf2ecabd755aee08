use std::fmt;

use crate::category::Category;
use crate::unify::Bindings;

#[derive(Debug, Clone, PartialEq)]
pub struct Rule {
  pub lhs: Category,
  pub rhs: Vec<Category>,
  /// All-wildcard bindings, one per variable in the rule
  pub bindings: Bindings,
}

impl Rule {
  /// Builds a rule and sizes its bindings from the highest variable index it uses.
  /// Variables are local to the rule.
  pub fn new(lhs: Category, rhs: Vec<Category>) -> Self {
    let num_vars = std::iter::once(&lhs)
      .chain(rhs.iter())
      .filter_map(Category::max_var)
      .max()
      .map_or(0, |v| v + 1);

    Self {
      lhs,
      rhs,
      bindings: Bindings::fresh(num_vars),
    }
  }

  pub fn len(&self) -> usize {
    self.rhs.len()
  }

  pub fn is_empty(&self) -> bool {
    self.len() == 0
  }

  pub fn num_vars(&self) -> usize {
    self.bindings.len()
  }

  pub fn symbol_str(&self) -> &str {
    self.lhs.head_str()
  }

  /// Head symbol of the first rhs category, which is what the rule is indexed by
  pub fn first_str(&self) -> Option<&str> {
    self.rhs.first().map(Category::head_str)
  }
}

impl fmt::Display for Rule {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "{} ->", self.lhs)?;
    for c in self.rhs.iter() {
      write!(f, " {}", c)?;
    }
    Ok(())
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::category::VarTable;

  #[test]
  fn test_rule() {
    let mut t = VarTable::new();
    let lhs = Category::parse("VP.$f", Some(&mut t)).unwrap();
    let rhs = vec![
      Category::parse("V.$f.t.$p", Some(&mut t)).unwrap(),
      Category::parse("NP.*", Some(&mut t)).unwrap(),
      Category::parse("PP.$p", Some(&mut t)).unwrap(),
    ];
    let rule = Rule::new(lhs, rhs);

    assert_eq!(rule.num_vars(), 2);
    assert_eq!(rule.bindings, Bindings::fresh(2));
    assert_eq!(rule.len(), 3);
    assert_eq!(rule.first_str(), Some("V"));
    assert_eq!(rule.to_string(), "VP.$0 -> V.$0.t.$1 NP.* PP.$1");
  }

  #[test]
  fn test_rule_without_vars() {
    let rule = Rule::new(
      Category::bare("S"),
      vec!["NP".parse().unwrap(), "VP".parse().unwrap()],
    );
    assert_eq!(rule.num_vars(), 0);
    assert_eq!(rule.symbol_str(), "S");
  }
}
