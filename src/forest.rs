use std::rc::Rc;

use crate::category::Category;
use crate::chart::{Chart, Expansion, NodeId};
use crate::syntree::{Constituent, SynTree, Tree, Word};

/// The packed result of a parse: the chart plus the goal node, if the parse succeeded.
/// Trees are only built when asked for.
#[derive(Debug, Clone, Copy)]
pub struct Forest<'c> {
  chart: &'c Chart,
  root: Option<NodeId>,
}

impl<'c> Forest<'c> {
  pub fn new(chart: &'c Chart, root: Option<NodeId>) -> Self {
    Self { chart, root }
  }

  pub fn chart(&self) -> &'c Chart {
    self.chart
  }

  /// True if the input didn't parse. A non-empty forest always has at least one tree
  /// unless every derivation of the root runs through a unary cycle.
  pub fn is_empty(&self) -> bool {
    self.root.is_none()
  }

  /// Lazily enumerates every tree. Calling this again starts over.
  pub fn trees(&self) -> Trees<'c> {
    Trees(
      self
        .root
        .map(|root| NodeTrees::new(self.chart, root, Rc::new(Vec::new()))),
    )
  }

  /// The first `k` trees, without building the rest
  pub fn first(&self, k: usize) -> Vec<Tree> {
    self.trees().take(k).collect()
  }
}

/// Iterator over the trees of a forest
#[derive(Debug, Clone)]
pub struct Trees<'c>(Option<NodeTrees<'c>>);

impl Iterator for Trees<'_> {
  type Item = Tree;

  fn next(&mut self) -> Option<Tree> {
    self.0.as_mut()?.next()
  }
}

/// Enumerates the trees rooted at one node: each alternative expansion in order,
/// and for a list of children, every combination of the children's trees.
#[derive(Debug, Clone)]
struct NodeTrees<'c> {
  chart: &'c Chart,
  id: NodeId,
  /// ancestors of this node in the tree being built, plus the node itself
  path: Rc<Vec<NodeId>>,
  alt: usize,
  current: Option<Product<'c>>,
}

impl<'c> NodeTrees<'c> {
  fn new(chart: &'c Chart, id: NodeId, ancestors: Rc<Vec<NodeId>>) -> Self {
    let mut path = Vec::with_capacity(ancestors.len() + 1);
    path.extend_from_slice(&ancestors);
    path.push(id);

    Self {
      chart,
      id,
      path: Rc::new(path),
      alt: 0,
      current: None,
    }
  }

  fn constituent(&self) -> Constituent<Category> {
    let node = self.chart.node(self.id);
    Constituent {
      value: node.category.clone(),
      span: node.span(),
    }
  }
}

impl Iterator for NodeTrees<'_> {
  type Item = Tree;

  fn next(&mut self) -> Option<Tree> {
    loop {
      if let Some(product) = self.current.as_mut() {
        if let Some(children) = product.next() {
          return Some(SynTree::Branch(self.constituent(), children));
        }
        self.current = None;
      }

      let chart = self.chart;
      let node = chart.node(self.id);
      let expansion = node.expansions().get(self.alt)?;
      self.alt += 1;

      match expansion {
        Expansion::Word(w) => {
          let leaf = SynTree::Leaf(Word {
            value: w.clone(),
            span: node.span(),
          });
          return Some(SynTree::Branch(self.constituent(), vec![leaf]));
        }
        Expansion::Children(children) => {
          // a unary cycle would nest this node inside itself forever
          if children.iter().any(|c| self.path.contains(c)) {
            continue;
          }
          self.current = Some(Product::new(chart, children, self.path.clone()));
        }
      }
    }
  }
}

/// Ordered cartesian product of the children's tree sequences. The last child
/// varies fastest.
#[derive(Debug, Clone)]
struct Product<'c> {
  chart: &'c Chart,
  children: &'c [NodeId],
  path: Rc<Vec<NodeId>>,
  iters: Vec<NodeTrees<'c>>,
  current: Vec<Tree>,
  started: bool,
  done: bool,
}

impl<'c> Product<'c> {
  fn new(chart: &'c Chart, children: &'c [NodeId], path: Rc<Vec<NodeId>>) -> Self {
    Self {
      chart,
      children,
      path,
      iters: Vec::with_capacity(children.len()),
      current: Vec::with_capacity(children.len()),
      started: false,
      done: false,
    }
  }

  fn fresh(&self, idx: usize) -> NodeTrees<'c> {
    NodeTrees::new(self.chart, self.children[idx], self.path.clone())
  }

  /// Restarts every position from `from` on with a fresh iterator.
  /// False if some child has no trees at all.
  fn refill(&mut self, from: usize) -> bool {
    self.iters.truncate(from);
    self.current.truncate(from);
    for idx in from..self.children.len() {
      let mut iter = self.fresh(idx);
      match iter.next() {
        Some(tree) => {
          self.current.push(tree);
          self.iters.push(iter);
        }
        None => return false,
      }
    }
    true
  }
}

impl Iterator for Product<'_> {
  type Item = Vec<Tree>;

  fn next(&mut self) -> Option<Vec<Tree>> {
    if self.done {
      return None;
    }

    if !self.started {
      self.started = true;
      if !self.refill(0) {
        self.done = true;
        return None;
      }
      return Some(self.current.clone());
    }

    // odometer: bump the rightmost position that still has trees, restart the rest
    let mut idx = self.children.len();
    while idx > 0 {
      idx -= 1;
      if let Some(tree) = self.iters[idx].next() {
        self.current[idx] = tree;
        if self.refill(idx + 1) {
          return Some(self.current.clone());
        }
        break;
      }
    }

    self.done = true;
    None
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  fn leaf(chart: &mut Chart, cat: &str, word: &str, start: usize) -> NodeId {
    chart
      .add_node(cat.parse().unwrap(), Expansion::Word(word.into()), start, start + 1)
      .id()
  }

  fn branch(chart: &mut Chart, cat: &str, children: Vec<NodeId>) -> NodeId {
    let start = chart.node(children[0]).start;
    let end = chart.node(*children.last().unwrap()).end;
    chart
      .add_node(cat.parse().unwrap(), Expansion::Children(children), start, end)
      .id()
  }

  #[test]
  fn test_empty_forest() {
    let chart = Chart::new();
    let forest = Forest::new(&chart, None);
    assert!(forest.is_empty());
    assert_eq!(forest.trees().count(), 0);
  }

  #[test]
  fn test_product_order() {
    // two ambiguous children with two readings each -> four trees, last child fastest
    let mut chart = Chart::new();
    let a1 = leaf(&mut chart, "A", "x", 0);
    chart.add_node("A".parse().unwrap(), Expansion::Word("X".into()), 0, 1);
    let b1 = leaf(&mut chart, "B", "y", 1);
    chart.add_node("B".parse().unwrap(), Expansion::Word("Y".into()), 1, 2);
    let s = branch(&mut chart, "S", vec![a1, b1]);

    let forest = Forest::new(&chart, Some(s));
    let yields = forest
      .trees()
      .map(|t| t.terminal_string())
      .collect::<Vec<_>>();
    assert_eq!(yields, vec!["x y", "x Y", "X y", "X Y"]);

    // restartable
    assert_eq!(forest.trees().count(), 4);
    assert_eq!(forest.first(1)[0].terminal_string(), "x y");
  }

  #[test]
  fn test_shared_subtrees_multiply() {
    let mut chart = Chart::new();
    let mut children = Vec::new();
    for i in 0..10 {
      let id = leaf(&mut chart, "A", "a", i);
      chart.add_node("A".parse().unwrap(), Expansion::Word("b".into()), i, i + 1);
      children.push(id);
    }
    let s = branch(&mut chart, "S", children);
    let forest = Forest::new(&chart, Some(s));

    let mut trees = forest.trees();
    assert_eq!(
      trees.next().unwrap().terminal_string(),
      "a a a a a a a a a a"
    );
    assert_eq!(
      trees.next().unwrap().terminal_string(),
      "a a a a a a a a a b"
    );
    assert_eq!(forest.trees().count(), 1024);
  }

  #[test]
  fn test_skips_unary_cycles() {
    let mut chart = Chart::new();
    let x = leaf(&mut chart, "X", "x", 0);
    let a = branch(&mut chart, "A", vec![x]);
    let s = branch(&mut chart, "S", vec![a]);
    // A -> S closes a loop over the same span
    chart.add_node("A".parse().unwrap(), Expansion::Children(vec![s]), 0, 1);

    let forest = Forest::new(&chart, Some(s));
    let trees = forest.trees().collect::<Vec<_>>();
    assert_eq!(trees.len(), 1);
    assert_eq!(trees[0], "(S (A (X x)))".parse::<Tree>().unwrap());
    assert_eq!(
      trees[0].get_branch().unwrap().0.value,
      Category::bare("S")
    );
  }
}
