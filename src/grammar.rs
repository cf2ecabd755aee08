use std::collections::HashMap;
use std::fmt;
use std::rc::Rc;

use tracing::debug;

use crate::category::Category;
use crate::lexicon::Lexicon;
use crate::rules::Rule;
use crate::syntree::{Constituent, SynTree, Tree, Word};
use crate::unify::{subst, unify, Bindings};
use crate::Err;

#[derive(Debug)]
pub struct Grammar {
  pub start: Category,
  pub rules: Vec<Rc<Rule>>,
  pub lexicon: Lexicon,
  /// rules by lhs head symbol
  expansions: HashMap<String, Vec<Rc<Rule>>>,
  /// rules by the head symbol of their first rhs category
  continuations: HashMap<String, Vec<Rc<Rule>>>,
}

impl fmt::Display for Grammar {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    writeln!(f, "# start: {}", self.start)?;
    for rule in self.rules.iter() {
      writeln!(f, "{}", rule)?;
    }
    Ok(())
  }
}

impl Grammar {
  /// Builds the rule indices. Both keep the declared rule order.
  ///
  /// The start category has to be ground, and rules with an empty right-hand
  /// side aren't supported.
  pub fn new(start: Category, rules: Vec<Rule>, lexicon: Lexicon) -> Result<Self, Err> {
    if !start.is_ground() {
      return Err(format!("start category {} has variables", start).into());
    }

    let mut expansions: HashMap<String, Vec<Rc<Rule>>> = HashMap::new();
    let mut continuations: HashMap<String, Vec<Rc<Rule>>> = HashMap::new();
    let mut shared = Vec::with_capacity(rules.len());

    for rule in rules {
      let first = match rule.first_str() {
        Some(first) => first.to_string(),
        None => return Err(format!("empty productions are not supported: {}", rule).into()),
      };

      let rule = Rc::new(rule);
      expansions
        .entry(rule.symbol_str().to_string())
        .or_default()
        .push(rule.clone());
      continuations.entry(first).or_default().push(rule.clone());
      shared.push(rule);
    }

    debug!(
      start = %start,
      rules = shared.len(),
      words = lexicon.len(),
      "built grammar"
    );

    Ok(Self {
      start,
      rules: shared,
      lexicon,
      expansions,
      continuations,
    })
  }

  pub fn start(&self) -> &Category {
    &self.start
  }

  pub fn lexicon(&self) -> &Lexicon {
    &self.lexicon
  }

  /// Rules that build `head`
  pub fn expansions(&self, head: &str) -> &[Rc<Rule>] {
    self.expansions.get(head).map(Vec::as_slice).unwrap_or(&[])
  }

  /// Rules whose first right-hand category is headed by `head`
  pub fn continuations(&self, head: &str) -> &[Rc<Rule>] {
    self.continuations.get(head).map(Vec::as_slice).unwrap_or(&[])
  }

  /// A symbol with no rules, i.e. one only the lexicon provides
  pub fn is_terminal(&self, head: &str) -> bool {
    self.expansions(head).is_empty()
  }

  /// Builds one sentence top-down from the start category. Rules are tried in
  /// declared order and words in lexicon order, so the result is always the same.
  /// Features agree across the whole tree, and the tree has the shape the parser
  /// would give it. Errors if nothing can be derived from the start category.
  pub fn generate(&self) -> Result<Tree, Err> {
    let mut path = Vec::new();
    match self.generate_from(&self.start, 0, &mut path) {
      Some((tree, _)) => Ok(tree),
      None => Err(format!("no sentence can be generated from {}", self.start).into()),
    }
  }

  /// Returns the tree along with the category it was built as, which can be
  /// narrower than `want` where `want` has wildcards.
  fn generate_from(
    &self,
    want: &Category,
    pos: usize,
    path: &mut Vec<Category>,
  ) -> Option<(Tree, Category)> {
    // expanding a category already open on the path would never bottom out
    let from_rules = if self.is_terminal(want.head_str()) || path.contains(want) {
      None
    } else {
      path.push(want.clone());
      let found = self
        .expansions(want.head_str())
        .iter()
        .find_map(|rule| self.generate_rule(rule, want, pos, path));
      path.pop();
      found
    };

    from_rules.or_else(|| self.generate_word(want, pos))
  }

  fn generate_rule(
    &self,
    rule: &Rule,
    want: &Category,
    pos: usize,
    path: &mut Vec<Category>,
  ) -> Option<(Tree, Category)> {
    let mut bindings = unify(&rule.lhs, want, &rule.bindings)?;
    let mut children = Vec::with_capacity(rule.len());
    let mut end = pos;

    for part in rule.rhs.iter() {
      let (child, got) = self.generate_from(&subst(&bindings, part), end, path)?;
      bindings = unify(part, &got, &bindings)?;
      end = child.span().1;
      children.push(child);
    }

    let category = subst(&bindings, &rule.lhs);
    let cons = Constituent {
      value: category.clone(),
      span: (pos, end),
    };
    Some((SynTree::Branch(cons, children), category))
  }

  /// First word in the lexicon with a category that fits `want`
  fn generate_word(&self, want: &Category, pos: usize) -> Option<(Tree, Category)> {
    let no_vars = Bindings::fresh(0);
    let span = (pos, pos + 1);

    self.lexicon.words(want.head_str()).iter().find_map(|word| {
      let category = self
        .lexicon
        .parts(word)
        .iter()
        .find(|c| unify(want, c, &no_vars).is_some())?;
      let leaf = SynTree::Leaf(Word {
        value: word.clone(),
        span,
      });
      let cons = Constituent {
        value: category.clone(),
        span,
      };
      Some((SynTree::Branch(cons, vec![leaf]), category.clone()))
    })
  }
}
