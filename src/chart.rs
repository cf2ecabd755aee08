use std::collections::{HashMap, HashSet};
use std::fmt;

use crate::category::Category;

/// Index type for the node arena
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(pub u32);

/// One way of building a node
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Expansion {
  /// The node was read straight from an input token
  Word(String),
  /// The node was completed from these constituents, left to right
  Children(Vec<NodeId>),
}

impl Expansion {
  pub fn word(&self) -> Option<&str> {
    match self {
      Self::Word(w) => Some(w),
      _ => None,
    }
  }

  pub fn children(&self) -> Option<&[NodeId]> {
    match self {
      Self::Children(c) => Some(c),
      _ => None,
    }
  }
}

/// A finished constituent: a ground category over the input span start..end.
/// Every distinct derivation of it is packed in as an expansion.
#[derive(Debug, Clone, PartialEq)]
pub struct Node {
  pub category: Category,
  pub start: usize,
  pub end: usize,
  expansions: Vec<Expansion>,
  seen: HashSet<Expansion>,
}

impl Node {
  fn new(category: Category, expansion: Expansion, start: usize, end: usize) -> Self {
    assert!(start <= end, "node span {}..{} is backwards", start, end);
    let mut node = Self {
      category,
      start,
      end,
      expansions: Vec::new(),
      seen: HashSet::new(),
    };
    node.pack(expansion);
    node
  }

  /// Adds an alternative expansion, returning false if it was already there
  fn pack(&mut self, expansion: Expansion) -> bool {
    if self.seen.contains(&expansion) {
      false
    } else {
      self.seen.insert(expansion.clone());
      self.expansions.push(expansion);
      true
    }
  }

  /// Alternatives in the order they were found
  pub fn expansions(&self) -> &[Expansion] {
    &self.expansions
  }

  pub fn span(&self) -> (usize, usize) {
    (self.start, self.end)
  }
}

impl fmt::Display for Node {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "[{} {} {}]", self.start, self.category, self.end)
  }
}

/// What `Chart::add_node` did
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Added {
  /// A node for this category and span didn't exist before
  New(NodeId),
  /// The node existed and got a new alternative expansion
  Packed(NodeId),
  /// The node already had this exact expansion
  Duplicate(NodeId),
}

impl Added {
  pub fn id(self) -> NodeId {
    match self {
      Self::New(id) | Self::Packed(id) | Self::Duplicate(id) => id,
    }
  }

  pub fn is_new(self) -> bool {
    matches!(self, Self::New(_))
  }
}

/// Arena of nodes, keyed by (start, end) and then category
#[derive(Debug, Default, Clone)]
pub struct Chart {
  nodes: Vec<Node>,
  index: HashMap<(usize, usize), HashMap<Category, NodeId>>,
}

impl Chart {
  pub fn new() -> Self {
    Default::default()
  }

  pub fn len(&self) -> usize {
    self.nodes.len()
  }

  pub fn is_empty(&self) -> bool {
    self.len() == 0
  }

  pub fn clear(&mut self) {
    self.nodes.clear();
    self.index.clear();
  }

  /// Finds or creates the node for `category` over start..end and packs `expansion` into it
  pub fn add_node(
    &mut self,
    category: Category,
    expansion: Expansion,
    start: usize,
    end: usize,
  ) -> Added {
    assert!(
      category.is_ground(),
      "chart category {} has variables",
      category
    );

    if let Some(id) = self.find(&category, start, end) {
      if self.get_mut(id).pack(expansion) {
        Added::Packed(id)
      } else {
        Added::Duplicate(id)
      }
    } else {
      let id = NodeId(self.nodes.len() as u32);
      self
        .index
        .entry((start, end))
        .or_default()
        .insert(category.clone(), id);
      self.nodes.push(Node::new(category, expansion, start, end));
      Added::New(id)
    }
  }

  pub fn find(&self, category: &Category, start: usize, end: usize) -> Option<NodeId> {
    self.index.get(&(start, end))?.get(category).copied()
  }

  pub fn get(&self, category: &Category, start: usize, end: usize) -> Option<&Node> {
    self.find(category, start, end).map(|id| self.node(id))
  }

  /// Get a node. Assumes valid, panics on OOB
  pub fn node(&self, id: NodeId) -> &Node {
    self.nodes.get(id.0 as usize).expect("Invalid NodeId")
  }

  fn get_mut(&mut self, id: NodeId) -> &mut Node {
    self.nodes.get_mut(id.0 as usize).expect("Invalid NodeId")
  }

  /// Nodes in creation order
  pub fn iter(&self) -> impl Iterator<Item = (NodeId, &Node)> {
    self
      .nodes
      .iter()
      .enumerate()
      .map(|(idx, node)| (NodeId(idx as u32), node))
  }
}

impl fmt::Display for Chart {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    let mut nodes = self.iter().collect::<Vec<_>>();
    nodes.sort_by_key(|(_, n)| (n.start, n.end));

    for (_, node) in nodes {
      writeln!(f, "{}..{}: {}", node.start, node.end, node.category)?;
      for expansion in node.expansions() {
        match expansion {
          Expansion::Word(w) => writeln!(f, "    {:?}", w)?,
          Expansion::Children(children) => {
            write!(f, "   ")?;
            for child in children {
              write!(f, " {}", self.node(*child))?;
            }
            writeln!(f)?;
          }
        }
      }
    }
    Ok(())
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_add_node_packs() {
    let mut chart = Chart::new();
    let det = chart.add_node("Det.sg".parse().unwrap(), Expansion::Word("this".into()), 0, 1);
    let n = chart.add_node("N.sg".parse().unwrap(), Expansion::Word("dog".into()), 1, 2);
    assert!(det.is_new() && n.is_new());

    let children = Expansion::Children(vec![det.id(), n.id()]);
    let np = chart.add_node("NP.sg".parse().unwrap(), children.clone(), 0, 2);
    assert!(np.is_new());

    // same thing again: no new node, no new alternative
    let again = chart.add_node("NP.sg".parse().unwrap(), children, 0, 2);
    assert_eq!(again, Added::Duplicate(np.id()));
    assert_eq!(chart.node(np.id()).expansions().len(), 1);

    let other = chart.add_node(
      "NP.sg".parse().unwrap(),
      Expansion::Children(vec![n.id()]),
      0,
      2,
    );
    assert_eq!(other, Added::Packed(np.id()));
    assert_eq!(chart.node(np.id()).expansions().len(), 2);
    assert_eq!(chart.len(), 3);

    let np_node = chart.get(&"NP.sg".parse().unwrap(), 0, 2).unwrap();
    assert_eq!(np_node.to_string(), "[0 NP.sg 2]");
    assert!(chart.get(&"NP.pl".parse().unwrap(), 0, 2).is_none());
  }

  #[test]
  fn test_find_by_span() {
    let mut chart = Chart::new();
    let a = chart.add_node("N.sg".parse().unwrap(), Expansion::Word("dog".into()), 1, 2);
    let b = chart.add_node("V.pl".parse().unwrap(), Expansion::Word("dog".into()), 1, 2);
    let c = chart.add_node("N.sg".parse().unwrap(), Expansion::Word("dog".into()), 4, 5);
    assert!(a.is_new() && b.is_new() && c.is_new());
    assert_ne!(a.id(), c.id());

    let n_sg = "N.sg".parse().unwrap();
    assert_eq!(chart.find(&n_sg, 1, 2), Some(a.id()));
    assert_eq!(chart.find(&n_sg, 4, 5), Some(c.id()));
    assert_eq!(chart.find(&n_sg, 1, 5), None);
    assert_eq!(chart.find(&"V.pl".parse().unwrap(), 1, 2), Some(b.id()));

    chart.clear();
    assert_eq!(chart.find(&n_sg, 1, 2), None);
  }

  #[test]
  fn test_display() {
    let mut chart = Chart::new();
    let v = chart.add_node("V.sg.t.*".parse().unwrap(), Expansion::Word("chases".into()), 2, 3);
    chart.add_node("VP.sg".parse().unwrap(), Expansion::Children(vec![v.id()]), 2, 3);

    assert_eq!(
      chart.to_string(),
      "2..3: V.sg.t.*\n    \"chases\"\n2..3: VP.sg\n    [2 V.sg.t.* 3]\n"
    );
  }

  #[test]
  #[should_panic]
  fn test_rejects_variables() {
    let mut chart = Chart::new();
    let mut table = crate::category::VarTable::new();
    let cat = Category::parse("NP.$n", Some(&mut table)).unwrap();
    chart.add_node(cat, Expansion::Word("x".into()), 0, 1);
  }
}
