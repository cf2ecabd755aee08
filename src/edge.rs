use std::fmt;
use std::rc::Rc;

use crate::category::Category;
use crate::chart::{Chart, NodeId};
use crate::rules::Rule;
use crate::unify::Bindings;

/// A rule instance with its first `dot()` rhs categories matched against chart nodes
#[derive(Debug, Clone, PartialEq)]
pub struct Edge {
  pub rule: Rc<Rule>,
  pub children: Vec<NodeId>,
  pub bindings: Bindings,
  pub start: usize,
  pub end: usize,
}

impl Edge {
  /// An edge whose first constituent is `node`, spanning start..end
  pub fn new(rule: &Rc<Rule>, node: NodeId, bindings: Bindings, start: usize, end: usize) -> Self {
    Self {
      rule: rule.clone(),
      children: vec![node],
      bindings,
      start,
      end,
    }
  }

  pub fn dot(&self) -> usize {
    self.children.len()
  }

  /// The rhs category waiting to be matched, or None if complete
  pub fn afterdot(&self) -> Option<&Category> {
    self.rule.rhs.get(self.dot())
  }

  pub fn is_complete(&self) -> bool {
    self.afterdot().is_none()
  }

  /// A new edge with `node` matched at the dot. The node has to start where this
  /// edge ends.
  pub fn extend(&self, node: NodeId, bindings: Bindings, end: usize) -> Self {
    assert!(!self.is_complete(), "tried to extend a complete edge");
    assert!(end >= self.end, "edge can't extend backwards");

    let mut children = Vec::with_capacity(self.children.len() + 1);
    children.extend_from_slice(&self.children);
    children.push(node);

    Self {
      rule: self.rule.clone(),
      children,
      bindings,
      start: self.start,
      end,
    }
  }

  pub fn display<'a>(&'a self, chart: &'a Chart) -> EdgeDisplay<'a> {
    EdgeDisplay { edge: self, chart }
  }
}

/// Helper struct for displaying an edge, which needs the chart to show its nodes
#[derive(Clone)]
pub struct EdgeDisplay<'a> {
  pub edge: &'a Edge,
  pub chart: &'a Chart,
}

impl fmt::Display for EdgeDisplay<'_> {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    let edge = self.edge;
    write!(f, "{} ->", edge.rule.lhs)?;
    for child in edge.children.iter() {
      write!(f, " {}", self.chart.node(*child))?;
    }
    write!(f, " *")?;
    for c in edge.rule.rhs[edge.dot()..].iter() {
      write!(f, " {}", c)?;
    }
    write!(f, " : {}", edge.bindings)
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::category::VarTable;
  use crate::chart::Expansion;
  use crate::unify::unify;

  #[test]
  fn test_edge() {
    let mut t = VarTable::new();
    let lhs = Category::parse("VP.$f", Some(&mut t)).unwrap();
    let rhs = vec![
      Category::parse("V.$f.t.$p", Some(&mut t)).unwrap(),
      Category::parse("NP.*", Some(&mut t)).unwrap(),
      Category::parse("PP.$p", Some(&mut t)).unwrap(),
    ];
    let rule = Rc::new(Rule::new(lhs, rhs));

    let mut chart = Chart::new();
    let v_cat: Category = "V.sg.t.*".parse().unwrap();
    let v = chart
      .add_node(v_cat.clone(), Expansion::Word("chases".into()), 2, 3)
      .id();

    let bindings = unify(&rule.rhs[0], &v_cat, &rule.bindings).unwrap();
    let edge = Edge::new(&rule, v, bindings, 2, 3);

    assert_eq!(edge.dot(), 1);
    assert_eq!(edge.afterdot().map(|c| c.to_string()), Some("NP.*".to_string()));
    assert!(!edge.is_complete());
    assert_eq!(
      edge.display(&chart).to_string(),
      "VP.$0 -> [2 V.sg.t.* 3] * NP.* PP.$1 : sg *"
    );

    let np_cat: Category = "NP.pl".parse().unwrap();
    let np = chart
      .add_node(np_cat.clone(), Expansion::Word("dogs".into()), 3, 4)
      .id();
    let bindings = unify(edge.afterdot().unwrap(), &np_cat, &edge.bindings).unwrap();
    let longer = edge.extend(np, bindings, 4);

    assert_eq!(longer.dot(), 2);
    assert_eq!((longer.start, longer.end), (2, 4));
    // the original edge is untouched
    assert_eq!(edge.dot(), 1);
    assert_eq!(
      longer.display(&chart).to_string(),
      "VP.$0 -> [2 V.sg.t.* 3] [3 NP.pl 4] * PP.$1 : sg *"
    );
  }
}
