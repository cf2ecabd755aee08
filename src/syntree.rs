use std::fmt;
use std::str::FromStr;

use crate::category::Category;
use crate::Err;

#[derive(Debug, PartialEq, Clone)]
pub struct Constituent<T> {
  pub value: T,
  pub span: (usize, usize),
}

impl<T> fmt::Display for Constituent<T>
where
  T: fmt::Display,
{
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "{}..{}: {}", self.span.0, self.span.1, self.value)
  }
}

#[derive(Debug, PartialEq, Clone)]
pub struct Word<U> {
  pub value: U,
  pub span: (usize, usize),
}

impl<U> fmt::Display for Word<U>
where
  U: fmt::Display,
{
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "{}..{}: {}", self.span.0, self.span.1, self.value)
  }
}

#[derive(Debug, PartialEq, Clone)]
pub enum SynTree<T, U> {
  Branch(Constituent<T>, Vec<SynTree<T, U>>),
  Leaf(Word<U>),
}

/// A parse tree as the parser produces it: categories on branches, tokens on leaves
pub type Tree = SynTree<Category, String>;

impl<T, U> SynTree<T, U> {
  pub fn is_leaf(&self) -> bool {
    matches!(self, Self::Leaf(_))
  }

  pub fn get_leaf(&self) -> Option<&Word<U>> {
    match self {
      Self::Leaf(w) => Some(w),
      _ => None,
    }
  }

  pub fn get_branch(&self) -> Option<(&Constituent<T>, &Vec<SynTree<T, U>>)> {
    match self {
      Self::Branch(c, cs) => Some((c, cs)),
      _ => None,
    }
  }

  pub fn span(&self) -> (usize, usize) {
    match self {
      Self::Branch(c, _) => c.span,
      Self::Leaf(w) => w.span,
    }
  }

  /// Leaf values, left to right
  pub fn leaves(&self) -> Vec<&U> {
    let mut out = Vec::new();
    self.collect_leaves(&mut out);
    out
  }

  fn collect_leaves<'a>(&'a self, out: &mut Vec<&'a U>) {
    match self {
      Self::Leaf(w) => out.push(&w.value),
      Self::Branch(_, children) => {
        for c in children.iter() {
          c.collect_leaves(out);
        }
      }
    }
  }

  pub fn map<V, W>(
    &self,
    map_branch: fn(&Constituent<T>) -> V,
    map_leaf: fn(&Word<U>) -> W,
  ) -> SynTree<V, W> {
    match self {
      Self::Branch(t, children) => {
        let children = children
          .iter()
          .map(|c| c.map(map_branch, map_leaf))
          .collect::<Vec<_>>();
        SynTree::Branch(
          Constituent {
            span: t.span,
            value: map_branch(t),
          },
          children,
        )
      }
      Self::Leaf(u) => SynTree::Leaf(Word {
        span: u.span,
        value: map_leaf(u),
      }),
    }
  }
}

impl<T, U> SynTree<T, U>
where
  U: fmt::Display,
{
  /// The words under this tree joined by spaces
  pub fn terminal_string(&self) -> String {
    self
      .leaves()
      .iter()
      .map(|w| w.to_string())
      .collect::<Vec<_>>()
      .join(" ")
  }
}

/// Bracketed form: `(S (NP (Det the) (N dog)) (VP (V barks)))`, with nested
/// constituents broken onto indented lines
impl<T, U> fmt::Display for SynTree<T, U>
where
  T: fmt::Display,
  U: fmt::Display,
{
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      Self::Leaf(w) => write!(f, "{}", w.value),
      Self::Branch(t, ts) => {
        write!(f, "({}", t.value)?;
        if ts.len() == 1 && ts[0].is_leaf() {
          write!(f, " {})", ts[0])
        } else {
          for t in ts.iter() {
            let fmt = format!("{}", t);
            for line in fmt.lines() {
              write!(f, "\n  {}", line)?;
            }
          }
          write!(f, ")")
        }
      }
    }
  }
}

fn tokenize(s: &str) -> Vec<&str> {
  regex_static!(TREE_TOKEN, r"\(|\)|[^()\s]+");
  TREE_TOKEN.find_iter(s).map(|m| m.as_str()).collect()
}

fn next_token<'a>(tokens: &[&'a str], pos: &mut usize) -> Result<&'a str, Err> {
  let tok = tokens.get(*pos).ok_or("unexpected end of tree")?;
  *pos += 1;
  Ok(*tok)
}

/// Parses one `(Cat child...)` starting at tokens[*pos]. `offset` counts words
/// seen so far, for spans.
fn parse_subtree(tokens: &[&str], pos: &mut usize, offset: &mut usize) -> Result<Tree, Err> {
  if next_token(tokens, pos)? != "(" {
    return Err(format!("expected ( at token {}", *pos - 1).into());
  }
  let category: Category = match next_token(tokens, pos)? {
    "(" | ")" => return Err(format!("expected a category at token {}", *pos - 1).into()),
    label => label.parse()?,
  };

  let start = *offset;
  let mut children = Vec::new();
  loop {
    match tokens.get(*pos).copied() {
      None => return Err("unclosed (".into()),
      Some(")") => {
        *pos += 1;
        break;
      }
      Some("(") => children.push(parse_subtree(tokens, pos, offset)?),
      Some(word) => {
        *pos += 1;
        children.push(SynTree::Leaf(Word {
          value: word.to_string(),
          span: (*offset, *offset + 1),
        }));
        *offset += 1;
      }
    }
  }

  if children.is_empty() {
    return Err(format!("{} has no children", category).into());
  }

  Ok(SynTree::Branch(
    Constituent {
      value: category,
      span: (start, *offset),
    },
    children,
  ))
}

impl FromStr for Tree {
  type Err = Err;

  fn from_str(s: &str) -> Result<Self, Self::Err> {
    let tokens = tokenize(s);
    let mut pos = 0;
    let mut offset = 0;
    let tree = parse_subtree(&tokens, &mut pos, &mut offset)?;
    if pos != tokens.len() {
      return Err(format!("trailing input after tree: {:?}", &tokens[pos..]).into());
    }
    Ok(tree)
  }
}
