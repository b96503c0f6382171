//! Structural patterns and the matcher that runs them against trees.

use indexmap::IndexMap;
use quasi_core::{Ident, Literal, Metadata, Node, Scalar, Symbol};

/// A tree-shaped matcher. Metadata never takes part in a match.
#[derive(Clone, Debug, PartialEq)]
pub enum Pattern {
    /// Matches anything, binds nothing.
    Wildcard,
    /// Matches anything and captures it.
    Bind(Ident),
    Lit(Scalar),
    /// Inert variable data: matches a reference to this exact identifier.
    Ident(Ident),
    Op {
        /// Matched against the operator as an atom.
        operator: Box<Pattern>,
        meta: MetaPattern,
        /// Matched against the arguments as a list.
        args: Box<Pattern>,
    },
    /// Element-wise prefix, then `tail` against whatever remains.
    List {
        items: Vec<Pattern>,
        tail: Option<Box<Pattern>>,
    },
    Pair(Box<Pattern>, Box<Pattern>),
}

/// The metadata slot of an operation pattern.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub enum MetaPattern {
    #[default]
    Any,
    Bind(Ident),
}

/// What a binder captured.
#[derive(Clone, Debug, PartialEq)]
pub enum Binding {
    Tree(Node),
    Meta(Metadata),
}

/// Captures produced by a successful match, in binding order.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Bindings(IndexMap<Ident, Binding>);

impl Bindings {
    pub fn get(&self, ident: &Ident) -> Option<&Binding> {
        self.0.get(ident)
    }

    /// The tree captured by `ident`, if it captured a tree.
    pub fn tree(&self, ident: &Ident) -> Option<&Node> {
        match self.0.get(ident)? {
            Binding::Tree(node) => Some(node),
            Binding::Meta(_) => None,
        }
    }

    /// Shorthand for a context-free identifier.
    pub fn tree_named(&self, name: Symbol) -> Option<&Node> {
        self.tree(&Ident::plain(name))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&Ident, &Binding)> {
        self.0.iter()
    }

    /// Insert a capture. A repeated binder must capture the same shape again.
    fn bind(&mut self, ident: Ident, binding: Binding) -> bool {
        match self.0.get(&ident) {
            None => {
                self.0.insert(ident, binding);
                true
            }
            Some(Binding::Tree(old)) => {
                matches!(&binding, Binding::Tree(new) if old.same_shape(new))
            }
            Some(Binding::Meta(old)) => matches!(&binding, Binding::Meta(new) if old == new),
        }
    }
}

impl Pattern {
    /// A pattern for ordinary code: variables bind, `_` matches anything,
    /// literals match themselves, operations match with any metadata.
    pub fn from_code(node: &Node) -> Self {
        match node {
            Node::Var(var) if var.is_wildcard() => Pattern::Wildcard,
            Node::Var(var) => Pattern::Bind(var.ident()),
            Node::Lit(Literal::Scalar(scalar)) => Pattern::Lit(scalar.clone()),
            Node::Lit(Literal::List { items, tail }) => Pattern::List {
                items: items.iter().map(Pattern::from_code).collect(),
                tail: tail.as_deref().map(|tail| Box::new(Pattern::from_code(tail))),
            },
            Node::Lit(Literal::Pair(left, right)) => Pattern::Pair(
                Box::new(Pattern::from_code(left)),
                Box::new(Pattern::from_code(right)),
            ),
            Node::Op(op) => Pattern::Op {
                operator: Box::new(Pattern::Lit(Scalar::Atom(op.operator))),
                meta: MetaPattern::Any,
                args: Box::new(Pattern::List {
                    items: op.args.iter().map(Pattern::from_code).collect(),
                    tail: None,
                }),
            },
        }
    }

    /// Match `node`, returning the captures on success.
    pub fn matches(&self, node: &Node) -> Option<Bindings> {
        let mut bindings = Bindings::default();
        self.match_node(node, &mut bindings).then_some(bindings)
    }

    /// Identifiers this pattern can bind, in first-occurrence order.
    pub fn binders(&self) -> Vec<Ident> {
        let mut out = Vec::new();
        self.collect_binders(&mut out);
        out
    }

    fn collect_binders(&self, out: &mut Vec<Ident>) {
        match self {
            Pattern::Bind(ident) => {
                if !out.contains(ident) {
                    out.push(*ident);
                }
            }
            Pattern::Op {
                operator,
                meta,
                args,
            } => {
                operator.collect_binders(out);
                if let MetaPattern::Bind(ident) = meta
                    && !out.contains(ident)
                {
                    out.push(*ident);
                }
                args.collect_binders(out);
            }
            Pattern::List { items, tail } => {
                for item in items {
                    item.collect_binders(out);
                }
                if let Some(tail) = tail {
                    tail.collect_binders(out);
                }
            }
            Pattern::Pair(left, right) => {
                left.collect_binders(out);
                right.collect_binders(out);
            }
            Pattern::Wildcard | Pattern::Lit(_) | Pattern::Ident(_) => {}
        }
    }

    fn match_node(&self, node: &Node, bindings: &mut Bindings) -> bool {
        match (self, node) {
            (Pattern::Wildcard, _) => true,
            (Pattern::Bind(ident), _) => bindings.bind(*ident, Binding::Tree(node.clone())),
            (Pattern::Lit(expected), Node::Lit(Literal::Scalar(actual))) => expected == actual,
            (Pattern::Ident(ident), Node::Var(var)) => var.ident() == *ident,
            (
                Pattern::Op {
                    operator,
                    meta,
                    args,
                },
                Node::Op(op),
            ) => {
                operator.match_node(&Node::atom(op.operator), bindings)
                    && meta.match_meta(&op.meta, bindings)
                    && args.match_node(&Node::list(op.args.clone()), bindings)
            }
            (
                Pattern::List { items, tail },
                Node::Lit(Literal::List {
                    items: actual,
                    tail: actual_tail,
                }),
            ) => match_sequence(items, tail.as_deref(), actual, actual_tail.as_deref(), bindings),
            (Pattern::Pair(left, right), Node::Lit(Literal::Pair(l, r))) => {
                left.match_node(l, bindings) && right.match_node(r, bindings)
            }
            _ => false,
        }
    }
}

impl MetaPattern {
    fn match_meta(&self, meta: &Metadata, bindings: &mut Bindings) -> bool {
        match self {
            MetaPattern::Any => true,
            MetaPattern::Bind(ident) => bindings.bind(*ident, Binding::Meta(meta.clone())),
        }
    }
}

fn match_sequence(
    items: &[Pattern],
    tail: Option<&Pattern>,
    actual: &[Node],
    actual_tail: Option<&Node>,
    bindings: &mut Bindings,
) -> bool {
    if actual.len() < items.len() {
        return false;
    }
    let (prefix, rest) = actual.split_at(items.len());
    if !items
        .iter()
        .zip(prefix)
        .all(|(item, node)| item.match_node(node, bindings))
    {
        return false;
    }
    match tail {
        None => rest.is_empty() && actual_tail.is_none(),
        Some(tail) => {
            let remainder = match (rest, actual_tail) {
                ([], Some(actual_tail)) => actual_tail.clone(),
                (rest, actual_tail) => Node::Lit(Literal::List {
                    items: rest.to_vec(),
                    tail: actual_tail.map(|t| Box::new(t.clone())),
                }),
            };
            tail.match_node(&remainder, bindings)
        }
    }
}
