//! The tree model shared by every stage of the engine.
//!
//! A [`Node`] is closed over three variants: an operation, a variable
//! reference, or a literal. Literals are scalars or raw lists/pairs whose
//! elements are again nodes.

use indexmap::IndexMap;

use crate::Symbol;

/// Metadata key conventionally holding the source line.
pub const LINE: &str = "line";

/// Inert scalar data.
#[derive(Clone, Debug, PartialEq)]
pub enum Scalar {
    Nil,
    Bool(bool),
    Int(i64),
    Float(f64),
    Str(String),
    Atom(Symbol),
}

/// Position and compile hints attached to a node.
///
/// Never significant to matching. Keys keep insertion order so rendered
/// output is stable.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Metadata(IndexMap<String, Scalar>);

impl Metadata {
    pub fn new() -> Self {
        Self::default()
    }

    /// Metadata holding only a source line.
    pub fn at_line(line: u32) -> Self {
        Self::new().with(LINE, Scalar::Int(i64::from(line)))
    }

    /// Builder-style insert.
    pub fn with(mut self, key: impl Into<String>, value: Scalar) -> Self {
        self.0.insert(key.into(), value);
        self
    }

    pub fn insert(&mut self, key: impl Into<String>, value: Scalar) -> Option<Scalar> {
        self.0.insert(key.into(), value)
    }

    pub fn get(&self, key: &str) -> Option<&Scalar> {
        self.0.get(key)
    }

    /// The source line, if recorded as a non-negative integer.
    pub fn line(&self) -> Option<u32> {
        match self.0.get(LINE)? {
            Scalar::Int(n) => u32::try_from(*n).ok(),
            _ => None,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Scalar)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v))
    }
}

/// Variable identity: a name plus its disambiguation context.
///
/// Two references denote the same variable only when both parts agree.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Ident {
    pub name: Symbol,
    pub context: Option<Symbol>,
}

impl Ident {
    pub fn new(name: Symbol, context: Option<Symbol>) -> Self {
        Self { name, context }
    }

    /// Identity without a context.
    pub fn plain(name: Symbol) -> Self {
        Self {
            name,
            context: None,
        }
    }
}

/// A variable-reference leaf.
#[derive(Clone, Debug, PartialEq)]
pub struct VarRef {
    pub name: Symbol,
    pub meta: Metadata,
    pub context: Option<Symbol>,
}

impl VarRef {
    pub fn new(name: Symbol, context: Option<Symbol>) -> Self {
        Self {
            name,
            meta: Metadata::new(),
            context,
        }
    }

    #[inline]
    pub fn ident(&self) -> Ident {
        Ident::new(self.name, self.context)
    }

    /// `_` never binds anything.
    #[inline]
    pub fn is_wildcard(&self) -> bool {
        self.name == Symbol::WILDCARD
    }
}

/// An operation node: operator, metadata, ordered children.
#[derive(Clone, Debug, PartialEq)]
pub struct Op {
    pub operator: Symbol,
    pub meta: Metadata,
    pub args: Vec<Node>,
}

/// Literal leaves: scalars and raw ordered/paired structures.
#[derive(Clone, Debug, PartialEq)]
pub enum Literal {
    Scalar(Scalar),
    /// Ordered list. `tail` is set for improper lists (`[a b | t]`).
    List {
        items: Vec<Node>,
        tail: Option<Box<Node>>,
    },
    Pair(Box<Node>, Box<Node>),
}

/// The universal code shape.
#[derive(Clone, Debug, PartialEq)]
pub enum Node {
    Op(Op),
    Var(VarRef),
    Lit(Literal),
}

impl Node {
    pub fn op(operator: Symbol, args: Vec<Node>) -> Self {
        Node::Op(Op {
            operator,
            meta: Metadata::new(),
            args,
        })
    }

    pub fn op_with_meta(operator: Symbol, meta: Metadata, args: Vec<Node>) -> Self {
        Node::Op(Op {
            operator,
            meta,
            args,
        })
    }

    pub fn var(name: Symbol) -> Self {
        Node::Var(VarRef::new(name, None))
    }

    pub fn var_in(name: Symbol, context: Symbol) -> Self {
        Node::Var(VarRef::new(name, Some(context)))
    }

    pub fn scalar(value: Scalar) -> Self {
        Node::Lit(Literal::Scalar(value))
    }

    pub fn nil() -> Self {
        Self::scalar(Scalar::Nil)
    }

    pub fn int(value: i64) -> Self {
        Self::scalar(Scalar::Int(value))
    }

    pub fn str(value: impl Into<String>) -> Self {
        Self::scalar(Scalar::Str(value.into()))
    }

    pub fn atom(value: Symbol) -> Self {
        Self::scalar(Scalar::Atom(value))
    }

    pub fn list(items: Vec<Node>) -> Self {
        Node::Lit(Literal::List { items, tail: None })
    }

    pub fn improper(items: Vec<Node>, tail: Node) -> Self {
        Node::Lit(Literal::List {
            items,
            tail: Some(Box::new(tail)),
        })
    }

    pub fn pair(left: Node, right: Node) -> Self {
        Node::Lit(Literal::Pair(Box::new(left), Box::new(right)))
    }

    /// Metadata of the node, if its variant carries any.
    pub fn meta(&self) -> Option<&Metadata> {
        match self {
            Node::Op(op) => Some(&op.meta),
            Node::Var(var) => Some(&var.meta),
            Node::Lit(_) => None,
        }
    }

    /// Apply `f` to every metadata slot in the tree, depth-first.
    pub fn map_metadata(&mut self, f: &mut impl FnMut(&mut Metadata)) {
        match self {
            Node::Op(op) => {
                f(&mut op.meta);
                for arg in &mut op.args {
                    arg.map_metadata(f);
                }
            }
            Node::Var(var) => f(&mut var.meta),
            Node::Lit(Literal::Scalar(_)) => {}
            Node::Lit(Literal::List { items, tail }) => {
                for item in items {
                    item.map_metadata(f);
                }
                if let Some(tail) = tail {
                    tail.map_metadata(f);
                }
            }
            Node::Lit(Literal::Pair(left, right)) => {
                left.map_metadata(f);
                right.map_metadata(f);
            }
        }
    }

    /// Empty every metadata slot.
    pub fn strip_metadata(mut self) -> Self {
        self.map_metadata(&mut |meta| *meta = Metadata::new());
        self
    }

    /// Structural equality that ignores metadata.
    pub fn same_shape(&self, other: &Node) -> bool {
        match (self, other) {
            (Node::Op(a), Node::Op(b)) => {
                a.operator == b.operator && same_shape_all(&a.args, &b.args)
            }
            (Node::Var(a), Node::Var(b)) => a.ident() == b.ident(),
            (Node::Lit(Literal::Scalar(a)), Node::Lit(Literal::Scalar(b))) => a == b,
            (
                Node::Lit(Literal::List { items: a, tail: at }),
                Node::Lit(Literal::List { items: b, tail: bt }),
            ) => {
                same_shape_all(a, b)
                    && match (at, bt) {
                        (None, None) => true,
                        (Some(a), Some(b)) => a.same_shape(b),
                        _ => false,
                    }
            }
            (Node::Lit(Literal::Pair(al, ar)), Node::Lit(Literal::Pair(bl, br))) => {
                al.same_shape(bl) && ar.same_shape(br)
            }
            _ => false,
        }
    }
}

fn same_shape_all(a: &[Node], b: &[Node]) -> bool {
    a.len() == b.len() && a.iter().zip(b).all(|(a, b)| a.same_shape(b))
}
