//! Flat feature unification over categories: `meet`, `unify` and `subst`.

use std::fmt;

use crate::category::{Category, Feature};

/// Current values of a rule's variables, indexed by `Feature::Var`.
/// Never holds a `Var` itself.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Bindings(Vec<Feature>);

impl Bindings {
  /// `n` unbound (wildcard) variables
  pub fn fresh(n: usize) -> Self {
    Self(vec![Feature::Wildcard; n])
  }

  pub fn len(&self) -> usize {
    self.0.len()
  }

  pub fn is_empty(&self) -> bool {
    self.len() == 0
  }

  pub fn get(&self, var: usize) -> Option<&Feature> {
    self.0.get(var)
  }
}

impl From<Vec<Feature>> for Bindings {
  fn from(values: Vec<Feature>) -> Self {
    assert!(
      values.iter().all(|v| !v.is_var()),
      "bindings cannot hold variables"
    );
    Self(values)
  }
}

impl fmt::Display for Bindings {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    for (idx, value) in self.0.iter().enumerate() {
      if idx > 0 {
        write!(f, " ")?;
      }
      write!(f, "{}", value)?;
    }
    Ok(())
  }
}

/// Greatest lower bound of two values. `*` gives way to anything, and two ground
/// values only meet if they are equal.
pub fn meet(a: &Feature, b: &Feature) -> Option<Feature> {
  debug_assert!(!a.is_var() && !b.is_var(), "meet on an unresolved variable");

  if a == b {
    Some(a.clone())
  } else if a.is_wildcard() {
    Some(b.clone())
  } else if b.is_wildcard() {
    Some(a.clone())
  } else {
    None
  }
}

/// Matches a rule `template` against a fully instantiated category, returning the
/// extended bindings, or None if they don't fit. `bindings` is never modified.
///
/// Panics if `ground` contains a variable: ground categories come out of the
/// lexicon or the chart, so a variable there means the grammar was built wrong.
pub fn unify(template: &Category, ground: &Category, bindings: &Bindings) -> Option<Bindings> {
  assert!(
    ground.is_ground(),
    "unify: {} has unresolved variables",
    ground
  );

  if template.head != ground.head || template.features.len() != ground.features.len() {
    return None;
  }

  let mut result = bindings.clone();
  for (slot, value) in template.features.iter().zip(ground.features.iter()) {
    match slot {
      Feature::Var(v) => {
        let current = result
          .0
          .get(*v)
          .unwrap_or_else(|| panic!("unify: ${} out of range for bindings [{}]", v, bindings));
        let merged = meet(current, value)?;
        result.0[*v] = merged;
      }
      _ => {
        meet(slot, value)?;
      }
    }
  }

  Some(result)
}

/// Instantiates `template` by replacing its variables with their bound values
pub fn subst(bindings: &Bindings, template: &Category) -> Category {
  let features = template
    .features
    .iter()
    .map(|slot| match slot {
      Feature::Var(v) => bindings
        .get(*v)
        .cloned()
        .unwrap_or_else(|| panic!("subst: ${} out of range for bindings [{}]", v, bindings)),
      other => other.clone(),
    })
    .collect();

  Category {
    head: template.head.clone(),
    features,
  }
}
