//! Bottom-up, agenda-driven chart parsing.
//!
//! Tokens are shifted in one at a time. Each new chart node starts edges for the
//! rules whose first constituent it matches, and extends edges that end where it
//! begins and are waiting for its head symbol. An edge that runs out of rhs
//! completes into a new node. All the work for a position is drained before the
//! next token is shifted.

use std::collections::{HashMap, VecDeque};
use std::fmt;

use tracing::{debug, trace};

use crate::category::{Category, Symbol};
use crate::chart::{Added, Chart, Expansion, NodeId};
use crate::edge::Edge;
use crate::forest::Forest;
use crate::grammar::Grammar;
use crate::unify::{subst, unify};

/// Which end of the agenda work is taken from. The chart (and so the set of
/// trees) comes out the same either way; only the order of alternatives differs.
#[derive(Debug, Default, Copy, Clone, PartialEq, Eq)]
pub enum AgendaOrder {
  /// Newest first (depth-first)
  #[default]
  Lifo,
  /// Oldest first (breadth-first)
  Fifo,
}

/// A pending unit of work
#[derive(Debug, Clone, PartialEq)]
pub enum Task {
  AddNode {
    category: Category,
    expansion: Expansion,
    start: usize,
    end: usize,
  },
  AddEdge(Edge),
}

impl fmt::Display for Task {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      Self::AddNode {
        category,
        start,
        end,
        ..
      } => write!(f, "node [{} {} {}]", start, category, end),
      Self::AddEdge(edge) => write!(
        f,
        "edge {} {}..{} dot {}",
        edge.rule, edge.start, edge.end, edge.dot()
      ),
    }
  }
}

/// Parser state for one sentence at a time. Everything is cleared by `reset`, which
/// `parse` calls before doing anything else.
#[derive(Debug)]
pub struct Parser<'g> {
  grammar: &'g Grammar,
  order: AgendaOrder,
  chart: Chart,
  /// incomplete edges by (end, head symbol wanted after the dot)
  edges: HashMap<(usize, Symbol), Vec<Edge>>,
  agenda: VecDeque<Task>,
  words: Vec<String>,
}

impl<'g> Parser<'g> {
  pub fn new(grammar: &'g Grammar) -> Self {
    Self {
      grammar,
      order: AgendaOrder::default(),
      chart: Chart::new(),
      edges: HashMap::new(),
      agenda: VecDeque::new(),
      words: Vec::new(),
    }
  }

  pub fn with_agenda_order(mut self, order: AgendaOrder) -> Self {
    self.order = order;
    self
  }

  pub fn chart(&self) -> &Chart {
    &self.chart
  }

  pub fn into_chart(self) -> Chart {
    self.chart
  }

  pub fn words(&self) -> &[String] {
    &self.words
  }

  /// Incomplete edges ending at `end` that want a `head` next
  pub fn edges_at(&self, end: usize, head: &str) -> &[Edge] {
    self
      .edges
      .get(&(end, Symbol::new(head)))
      .map(Vec::as_slice)
      .unwrap_or(&[])
  }

  /// Tasks still on the agenda, oldest first
  pub fn pending(&self) -> impl Iterator<Item = &Task> {
    self.agenda.iter()
  }

  /// Throws away all state from the previous sentence and loads a new one
  pub fn reset<S: AsRef<str>>(&mut self, words: &[S]) {
    self.chart.clear();
    self.edges.clear();
    self.agenda.clear();
    self.words = words.iter().map(|w| w.as_ref().to_string()).collect();
  }

  /// Parses a tokenized sentence. The forest is empty if the start category doesn't
  /// span the whole input, including when the input is empty.
  pub fn parse<S: AsRef<str>>(&mut self, words: &[S]) -> Forest<'_> {
    self.reset(words);

    for j in 1..=self.words.len() {
      self.shift(j);
      while self.step() {}
    }

    let n = self.words.len();
    let root = self.chart.find(self.grammar.start(), 0, n);
    debug!(
      words = n,
      nodes = self.chart.len(),
      edges = self.edges.values().map(Vec::len).sum::<usize>(),
      parsed = root.is_some(),
      "parsed sentence"
    );

    Forest::new(&self.chart, root)
  }

  /// Queues a lexical node for every category of the j-th word (1-based)
  pub fn shift(&mut self, j: usize) {
    assert!(
      (1..=self.words.len()).contains(&j),
      "shift: word {} out of range for {} words",
      j,
      self.words.len()
    );
    let word = &self.words[j - 1];
    let parts = self.grammar.lexicon().parts(word);
    if parts.is_empty() {
      debug!(word = %word, position = j - 1, "no lexicon entries");
    }

    for category in parts {
      self.agenda.push_back(Task::AddNode {
        category: category.clone(),
        expansion: Expansion::Word(word.clone()),
        start: j - 1,
        end: j,
      });
    }
  }

  /// Runs one task off the agenda. False if there was nothing to do.
  pub fn step(&mut self) -> bool {
    let task = match self.order {
      AgendaOrder::Lifo => self.agenda.pop_back(),
      AgendaOrder::Fifo => self.agenda.pop_front(),
    };

    match task {
      Some(Task::AddNode {
        category,
        expansion,
        start,
        end,
      }) => self.add_node(category, expansion, start, end),
      Some(Task::AddEdge(edge)) => self.add_edge(edge),
      None => return false,
    }
    true
  }

  fn add_node(&mut self, category: Category, expansion: Expansion, start: usize, end: usize) {
    match self.chart.add_node(category, expansion, start, end) {
      Added::New(id) => {
        trace!(node = %self.chart.node(id), "new node");
        self.start(id);
        self.combine(id);
      }
      // start and combine already ran when the node was created
      Added::Packed(id) => trace!(node = %self.chart.node(id), "packed alternative"),
      Added::Duplicate(_) => {}
    }
  }

  /// Begins an edge for every rule whose first rhs category unifies with the node.
  /// Rules are tried in grammar order.
  fn start(&mut self, id: NodeId) {
    let node = self.chart.node(id);
    for rule in self.grammar.continuations(node.category.head_str()) {
      if let Some(bindings) = unify(&rule.rhs[0], &node.category, &rule.bindings) {
        let edge = Edge::new(rule, id, bindings, node.start, node.end);
        self.agenda.push_back(Task::AddEdge(edge));
      }
    }
  }

  /// Extends every edge that ends where the node starts and wants its head symbol
  fn combine(&mut self, id: NodeId) {
    let node = self.chart.node(id);
    let key = (node.start, node.category.head.clone());
    let Some(edges) = self.edges.get(&key) else {
      return;
    };

    for edge in edges {
      let wanted = edge.afterdot().expect("indexed edge is complete");
      if let Some(bindings) = unify(wanted, &node.category, &edge.bindings) {
        self
          .agenda
          .push_back(Task::AddEdge(edge.extend(id, bindings, node.end)));
      }
    }
  }

  fn add_edge(&mut self, edge: Edge) {
    trace!(edge = %edge.display(&self.chart), "add edge");
    match edge.afterdot() {
      Some(next) => {
        let key = (edge.end, next.head.clone());
        self.edges.entry(key).or_default().push(edge);
      }
      None => self.complete(edge),
    }
  }

  fn complete(&mut self, edge: Edge) {
    let category = subst(&edge.bindings, &edge.rule.lhs);
    self.agenda.push_back(Task::AddNode {
      category,
      expansion: Expansion::Children(edge.children),
      start: edge.start,
      end: edge.end,
    });
  }
}
