//! Templates: live trees with slots for captured values.

use quasi_core::{Interner, Literal, Metadata, Node, Printer, Scalar, Symbol, VarRef};

use crate::Result;
use crate::error::Error;
use crate::pattern::{Binding, Bindings};

/// A tree to reconstruct, possibly referring to bound variables.
#[derive(Clone, Debug, PartialEq)]
pub enum Template {
    Lit(Scalar),
    List {
        items: Vec<Template>,
        tail: Option<Box<Template>>,
    },
    Pair(Box<Template>, Box<Template>),
    Op {
        operator: Symbol,
        meta: Metadata,
        args: Vec<Template>,
    },
    /// Live reference to a variable bound in scope.
    Ref(VarRef),
    /// Variable that was not bound; reproduced as data.
    Quoted(VarRef),
    /// Code embedded at an unquote point.
    Code(Node),
}

impl Template {
    /// Empty every metadata slot, embedded code included.
    pub fn strip_metadata(self) -> Self {
        match self {
            Template::Lit(_) => self,
            Template::List { items, tail } => Template::List {
                items: items.into_iter().map(Template::strip_metadata).collect(),
                tail: tail.map(|tail| Box::new(tail.strip_metadata())),
            },
            Template::Pair(left, right) => Template::Pair(
                Box::new(left.strip_metadata()),
                Box::new(right.strip_metadata()),
            ),
            Template::Op { operator, args, .. } => Template::Op {
                operator,
                meta: Metadata::new(),
                args: args.into_iter().map(Template::strip_metadata).collect(),
            },
            Template::Ref(var) => Template::Ref(VarRef {
                meta: Metadata::new(),
                ..var
            }),
            Template::Quoted(var) => Template::Quoted(VarRef {
                meta: Metadata::new(),
                ..var
            }),
            Template::Code(node) => Template::Code(node.strip_metadata()),
        }
    }

    /// Whether any slot refers to a live variable.
    pub fn has_references(&self) -> bool {
        match self {
            Template::Ref(_) => true,
            Template::Code(node) => code_has_variables(node),
            Template::List { items, tail } => {
                items.iter().any(Template::has_references)
                    || tail.as_deref().is_some_and(Template::has_references)
            }
            Template::Pair(left, right) => left.has_references() || right.has_references(),
            Template::Op { args, .. } => args.iter().any(Template::has_references),
            Template::Lit(_) | Template::Quoted(_) => false,
        }
    }

    /// Build the tree, filling references and variables in embedded code
    /// from `bindings`. Quoted variables are reproduced as they are.
    pub fn instantiate(&self, bindings: &Bindings, interner: &Interner) -> Result<Node> {
        match self {
            Template::Lit(scalar) => Ok(Node::scalar(scalar.clone())),
            Template::List { items, tail } => {
                let items = items
                    .iter()
                    .map(|item| item.instantiate(bindings, interner))
                    .collect::<Result<Vec<_>>>()?;
                Ok(match tail {
                    Some(tail) => Node::improper(items, tail.instantiate(bindings, interner)?),
                    None => Node::list(items),
                })
            }
            Template::Pair(left, right) => Ok(Node::pair(
                left.instantiate(bindings, interner)?,
                right.instantiate(bindings, interner)?,
            )),
            Template::Op {
                operator,
                meta,
                args,
            } => {
                let args = args
                    .iter()
                    .map(|arg| arg.instantiate(bindings, interner))
                    .collect::<Result<Vec<_>>>()?;
                Ok(Node::op_with_meta(*operator, meta.clone(), args))
            }
            Template::Ref(var) => lookup(var, bindings, interner),
            Template::Quoted(var) => Ok(Node::Var(var.clone())),
            Template::Code(node) => substitute(node, bindings, interner),
        }
    }
}

fn lookup(var: &VarRef, bindings: &Bindings, interner: &Interner) -> Result<Node> {
    match bindings.get(&var.ident()) {
        Some(Binding::Tree(node)) => Ok(node.clone()),
        Some(Binding::Meta(_)) => Err(Error::unsupported(
            format!(
                "`{}` captured metadata, not a tree",
                display_name(var, interner)
            ),
            var.meta.line(),
        )),
        None => Err(Error::Unbound(display_name(var, interner))),
    }
}

fn substitute(node: &Node, bindings: &Bindings, interner: &Interner) -> Result<Node> {
    match node {
        Node::Var(var) if var.is_wildcard() => Ok(node.clone()),
        Node::Var(var) => lookup(var, bindings, interner),
        Node::Op(op) => {
            let args = op
                .args
                .iter()
                .map(|arg| substitute(arg, bindings, interner))
                .collect::<Result<Vec<_>>>()?;
            Ok(Node::op_with_meta(op.operator, op.meta.clone(), args))
        }
        Node::Lit(Literal::Scalar(_)) => Ok(node.clone()),
        Node::Lit(Literal::List { items, tail }) => {
            let items = items
                .iter()
                .map(|item| substitute(item, bindings, interner))
                .collect::<Result<Vec<_>>>()?;
            Ok(match tail {
                Some(tail) => Node::improper(items, substitute(tail, bindings, interner)?),
                None => Node::list(items),
            })
        }
        Node::Lit(Literal::Pair(left, right)) => Ok(Node::pair(
            substitute(left, bindings, interner)?,
            substitute(right, bindings, interner)?,
        )),
    }
}

fn code_has_variables(node: &Node) -> bool {
    match node {
        Node::Var(var) => !var.is_wildcard(),
        Node::Op(op) => op.args.iter().any(code_has_variables),
        Node::Lit(Literal::Scalar(_)) => false,
        Node::Lit(Literal::List { items, tail }) => {
            items.iter().any(code_has_variables) || tail.as_deref().is_some_and(code_has_variables)
        }
        Node::Lit(Literal::Pair(left, right)) => {
            code_has_variables(left) || code_has_variables(right)
        }
    }
}

fn display_name(var: &VarRef, interner: &Interner) -> String {
    let mut out = String::new();
    Printer::new(interner).write_ident(&mut out, var.name, var.context);
    out
}
