//! Scope-aware resolution of escaped variable references.
//!
//! Without a scope table every escaped variable is brought back to life, so
//! identifiers in a pattern capture. With a table only variables bound in
//! the enclosing scope come back; everything else stays inert data.

use indexmap::IndexMap;
use quasi_core::{Ident, VarRef};

use crate::escape::Escaped;

/// Variables bound in the lexical environment, keyed by `(name, context)`,
/// mapped to their binding version.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ScopeTable {
    bindings: IndexMap<Ident, u32>,
}

impl ScopeTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a binding, returning the version it shadows.
    pub fn insert(&mut self, ident: Ident, version: u32) -> Option<u32> {
        self.bindings.insert(ident, version)
    }

    /// Builder-style [`ScopeTable::insert`].
    pub fn with(mut self, ident: Ident, version: u32) -> Self {
        self.insert(ident, version);
        self
    }

    pub fn version(&self, ident: &Ident) -> Option<u32> {
        self.bindings.get(ident).copied()
    }

    pub fn contains(&self, ident: &Ident) -> bool {
        self.bindings.contains_key(ident)
    }

    pub fn len(&self) -> usize {
        self.bindings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bindings.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&Ident, u32)> {
        self.bindings.iter().map(|(ident, version)| (ident, *version))
    }
}

impl FromIterator<(Ident, u32)> for ScopeTable {
    fn from_iter<I: IntoIterator<Item = (Ident, u32)>>(iter: I) -> Self {
        Self {
            bindings: iter.into_iter().collect(),
        }
    }
}

/// Decide the fate of a single escaped node.
///
/// Only raw variable markers are affected. With `scope == None` the marker is
/// always reversed. With a table it is reversed when `(name, context)` is
/// bound, or else when `(name, nil)` is bound; the second case drops the
/// context from the revived reference.
pub fn maybe_unescape(escaped: Escaped, scope: Option<&ScopeTable>) -> Escaped {
    let Some(var) = escaped.as_raw_var() else {
        return escaped;
    };
    let Some(table) = scope else {
        return Escaped::Var(var);
    };
    if table.contains(&var.ident()) {
        tracing::trace!(name = ?var.name, context = ?var.context, "bound in scope");
        return Escaped::Var(var);
    }
    if var.context.is_some() && table.contains(&Ident::plain(var.name)) {
        tracing::trace!(name = ?var.name, context = ?var.context, "bound without context");
        return Escaped::Var(VarRef {
            context: None,
            ..var
        });
    }
    tracing::trace!(name = ?var.name, context = ?var.context, "left inert");
    escaped
}

/// Apply [`maybe_unescape`] depth-first over a whole escaped tree.
pub fn resolve(escaped: Escaped, scope: Option<&ScopeTable>) -> Escaped {
    let escaped = match escaped {
        Escaped::List { items, tail } => Escaped::List {
            items: items.into_iter().map(|item| resolve(item, scope)).collect(),
            tail: tail.map(|tail| Box::new(resolve(*tail, scope))),
        },
        Escaped::Pair(left, right) => Escaped::Pair(
            Box::new(resolve(*left, scope)),
            Box::new(resolve(*right, scope)),
        ),
        Escaped::Op {
            operator,
            meta,
            args,
        } => Escaped::Op {
            operator,
            meta,
            args: args.into_iter().map(|arg| resolve(arg, scope)).collect(),
        },
        leaf => leaf,
    };
    maybe_unescape(escaped, scope)
}
