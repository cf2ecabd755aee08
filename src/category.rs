use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

use crate::Err;

pub const WILDCARD_STR: &str = "*";

#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Symbol {
  pub name: String,
}

impl Symbol {
  pub fn new(name: impl Into<String>) -> Self {
    Self { name: name.into() }
  }

  pub fn as_str(&self) -> &str {
    &self.name
  }
}

impl fmt::Display for Symbol {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "{}", self.name)
  }
}

impl From<&str> for Symbol {
  fn from(s: &str) -> Self {
    Self::new(s)
  }
}

/// One feature slot of a category, after the head symbol
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Feature {
  /// A concrete value such as `sg` in `NP.sg`
  Ground(String),
  /// `*`, matches anything
  Wildcard,
  /// Index into the owning rule's bindings. Only rule templates have these.
  Var(usize),
}

impl Feature {
  pub fn ground(s: impl Into<String>) -> Self {
    Self::Ground(s.into())
  }

  pub fn is_var(&self) -> bool {
    matches!(self, Self::Var(_))
  }

  pub fn is_wildcard(&self) -> bool {
    matches!(self, Self::Wildcard)
  }

  pub fn var(&self) -> Option<usize> {
    match self {
      Self::Var(v) => Some(*v),
      _ => None,
    }
  }
}

impl fmt::Display for Feature {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      Self::Ground(s) => write!(f, "{}", s),
      Self::Wildcard => write!(f, "{}", WILDCARD_STR),
      Self::Var(v) => write!(f, "${}", v),
    }
  }
}

/// Maps variable names (`$n`) to rule-local indices, in order of first appearance
#[derive(Debug, Default, Clone)]
pub struct VarTable(HashMap<String, usize>);

impl VarTable {
  pub fn new() -> Self {
    Default::default()
  }

  pub fn len(&self) -> usize {
    self.0.len()
  }

  pub fn is_empty(&self) -> bool {
    self.len() == 0
  }

  pub fn get(&self, name: &str) -> Option<usize> {
    self.0.get(name).copied()
  }

  fn index_of(&mut self, name: &str) -> usize {
    let next = self.0.len();
    *self.0.entry(name.to_string()).or_insert(next)
  }
}

/// A grammar symbol with its feature slots, e.g. `V.$f.t.*`
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Category {
  pub head: Symbol,
  pub features: Vec<Feature>,
}

impl Category {
  pub fn new(head: impl Into<Symbol>, features: Vec<Feature>) -> Self {
    Self {
      head: head.into(),
      features,
    }
  }

  /// A category with no features at all, like the usual `S`
  pub fn bare(head: impl Into<Symbol>) -> Self {
    Self::new(head, Vec::new())
  }

  /// Number of slots, counting the head
  pub fn arity(&self) -> usize {
    self.features.len() + 1
  }

  pub fn head_str(&self) -> &str {
    self.head.as_str()
  }

  pub fn is_ground(&self) -> bool {
    !self.features.iter().any(Feature::is_var)
  }

  /// Largest variable index mentioned, if any
  pub fn max_var(&self) -> Option<usize> {
    self.features.iter().filter_map(Feature::var).max()
  }

  /// Parses a dotted category. `$name` slots are only accepted when a
  /// variable table is supplied.
  pub fn parse(s: &str, mut table: Option<&mut VarTable>) -> Result<Self, Err> {
    let mut parts = s.split('.');
    let head = match parts.next() {
      Some(h) if !h.is_empty() && !h.starts_with('$') && h != WILDCARD_STR => h,
      _ => return Err(format!("category needs a head symbol: {:?}", s).into()),
    };

    let mut features = Vec::new();
    for part in parts {
      if part.is_empty() {
        return Err(format!("empty feature in category {:?}", s).into());
      }

      let feature = if let Some(name) = part.strip_prefix('$') {
        match table.as_deref_mut() {
          Some(table) if !name.is_empty() => Feature::Var(table.index_of(name)),
          Some(_) => return Err(format!("unnamed variable in category {:?}", s).into()),
          None => return Err(format!("variables are not allowed here: {:?}", s).into()),
        }
      } else if part == WILDCARD_STR {
        Feature::Wildcard
      } else {
        Feature::ground(part)
      };
      features.push(feature);
    }

    Ok(Self::new(head, features))
  }
}

impl FromStr for Category {
  type Err = Err;

  /// Parses a ground (variable-free) category
  fn from_str(s: &str) -> Result<Self, Self::Err> {
    Self::parse(s, None)
  }
}

impl fmt::Display for Category {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "{}", self.head)?;
    for feature in self.features.iter() {
      write!(f, ".{}", feature)?;
    }
    Ok(())
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_display() {
    let cat = Category::new(
      "X",
      vec![Feature::ground("y"), Feature::Var(1), Feature::Var(0)],
    );
    assert_eq!(cat.to_string(), "X.y.$1.$0");
    assert_eq!(cat.arity(), 4);
    assert!(!cat.is_ground());
  }

  #[test]
  fn test_parse_shares_var_table() {
    let mut table = VarTable::new();
    let a = Category::parse("A.x.$x", Some(&mut table)).unwrap();
    assert_eq!(a, Category::new("A", vec![Feature::ground("x"), Feature::Var(0)]));

    let b = Category::parse("B.$y.int.$x", Some(&mut table)).unwrap();
    assert_eq!(
      b,
      Category::new(
        "B",
        vec![Feature::Var(1), Feature::ground("int"), Feature::Var(0)]
      )
    );

    let c = Category::parse("C.$y", Some(&mut table)).unwrap();
    assert_eq!(c, Category::new("C", vec![Feature::Var(1)]));
    assert_eq!(table.len(), 2);
    assert_eq!(table.get("x"), Some(0));
    assert_eq!(table.get("y"), Some(1));
  }

  #[test]
  fn test_parse_ground() {
    let cat: Category = "V.sg.i.*".parse().unwrap();
    assert_eq!(
      cat.features,
      vec![
        Feature::ground("sg"),
        Feature::ground("i"),
        Feature::Wildcard
      ]
    );
    assert!(cat.is_ground());
  }

  #[test]
  fn test_parse_rejects() {
    assert!("NP.$n".parse::<Category>().is_err());
    assert!("".parse::<Category>().is_err());
    assert!("NP..sg".parse::<Category>().is_err());
    assert!("*.sg".parse::<Category>().is_err());
  }
}
