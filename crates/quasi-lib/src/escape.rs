//! Escaping: live trees to inert data and back.
//!
//! An escaped tree mirrors the node shape, but nothing in it is live code.
//! Variable references become operations tagged with [`Symbol::RAW`] whose
//! two arguments are the name atom and the context atom (or `nil`), so later
//! stages can find them and decide whether to bring them back.

use quasi_core::{Literal, Metadata, Node, Op, Scalar, Symbol, VarRef};

use crate::Result;
use crate::bridge::Expander;
use crate::error::Error;

/// Data-level mirror of a [`Node`].
#[derive(Clone, Debug, PartialEq)]
pub enum Escaped {
    Scalar(Scalar),
    List {
        items: Vec<Escaped>,
        tail: Option<Box<Escaped>>,
    },
    Pair(Box<Escaped>, Box<Escaped>),
    Op {
        operator: Symbol,
        meta: Metadata,
        args: Vec<Escaped>,
    },
    /// A variable reference the resolver brought back to life.
    Var(VarRef),
    /// The argument of an unquote point, carried through live.
    Unquoted(Box<Node>),
}

/// Switches for [`escape`].
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct EscapeOptions {
    /// Replace every metadata slot with empty metadata.
    pub prune_metadata: bool,
    /// Stop at one-argument `unquote` operations and keep their argument live.
    pub unquote: bool,
}

impl EscapeOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn prune_metadata(mut self, value: bool) -> Self {
        self.prune_metadata = value;
        self
    }

    pub fn unquote(mut self, value: bool) -> Self {
        self.unquote = value;
        self
    }
}

impl Escaped {
    /// The escaped form of a variable reference.
    pub fn raw_var(var: &VarRef, meta: Metadata) -> Self {
        let context = match var.context {
            Some(context) => Scalar::Atom(context),
            None => Scalar::Nil,
        };
        Escaped::Op {
            operator: Symbol::RAW,
            meta,
            args: vec![
                Escaped::Scalar(Scalar::Atom(var.name)),
                Escaped::Scalar(context),
            ],
        }
    }

    /// Read back a raw variable marker. `None` for anything else, including
    /// raw markers whose arguments do not have the variable shape.
    pub fn as_raw_var(&self) -> Option<VarRef> {
        let Escaped::Op {
            operator: Symbol::RAW,
            meta,
            args,
        } = self
        else {
            return None;
        };
        let [Escaped::Scalar(Scalar::Atom(name)), context] = args.as_slice() else {
            return None;
        };
        let context = match context {
            Escaped::Scalar(Scalar::Atom(context)) => Some(*context),
            Escaped::Scalar(Scalar::Nil) => None,
            _ => return None,
        };
        Some(VarRef {
            name: *name,
            meta: meta.clone(),
            context,
        })
    }

    /// Source line recorded on the node, if it carries metadata.
    pub fn line(&self) -> Option<u32> {
        match self {
            Escaped::Op { meta, .. } => meta.line(),
            Escaped::Var(var) => var.meta.line(),
            Escaped::Unquoted(node) => node.meta().and_then(Metadata::line),
            _ => None,
        }
    }
}

/// Turn a live tree into inert data. Total.
pub fn escape(node: &Node, options: EscapeOptions) -> Escaped {
    let meta = |meta: &Metadata| {
        if options.prune_metadata {
            Metadata::new()
        } else {
            meta.clone()
        }
    };
    match node {
        Node::Op(Op { operator, args, .. })
            if options.unquote && *operator == Symbol::UNQUOTE && args.len() == 1 =>
        {
            Escaped::Unquoted(Box::new(args[0].clone()))
        }
        Node::Op(op) => Escaped::Op {
            operator: op.operator,
            meta: meta(&op.meta),
            args: op.args.iter().map(|arg| escape(arg, options)).collect(),
        },
        Node::Var(var) => Escaped::raw_var(var, meta(&var.meta)),
        Node::Lit(Literal::Scalar(scalar)) => Escaped::Scalar(scalar.clone()),
        Node::Lit(Literal::List { items, tail }) => Escaped::List {
            items: items.iter().map(|item| escape(item, options)).collect(),
            tail: tail.as_ref().map(|tail| Box::new(escape(tail, options))),
        },
        Node::Lit(Literal::Pair(left, right)) => Escaped::Pair(
            Box::new(escape(left, options)),
            Box::new(escape(right, options)),
        ),
    }
}

/// Fully reverse an escape, passing every rebuilt operation through
/// `expander`.
pub fn reverse_escape(escaped: &Escaped, expander: &dyn Expander) -> Result<Node> {
    match escaped {
        Escaped::Scalar(scalar) => Ok(Node::scalar(scalar.clone())),
        Escaped::List { items, tail } => {
            let items = items
                .iter()
                .map(|item| reverse_escape(item, expander))
                .collect::<Result<Vec<_>>>()?;
            Ok(match tail {
                Some(tail) => Node::improper(items, reverse_escape(tail, expander)?),
                None => Node::list(items),
            })
        }
        Escaped::Pair(left, right) => Ok(Node::pair(
            reverse_escape(left, expander)?,
            reverse_escape(right, expander)?,
        )),
        Escaped::Op {
            operator: Symbol::RAW,
            ..
        } => match escaped.as_raw_var() {
            Some(var) => Ok(Node::Var(var)),
            None => Err(Error::unsupported(
                "raw marker without a variable shape",
                escaped.line(),
            )),
        },
        Escaped::Op {
            operator,
            meta,
            args,
        } => {
            let args = args
                .iter()
                .map(|arg| reverse_escape(arg, expander))
                .collect::<Result<Vec<_>>>()?;
            expander.expand(Node::op_with_meta(*operator, meta.clone(), args))
        }
        Escaped::Var(var) => Ok(Node::Var(var.clone())),
        Escaped::Unquoted(node) => Ok(node.as_ref().clone()),
    }
}
