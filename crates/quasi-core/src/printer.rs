//! Renders trees in the notation accepted by [`crate::read`].
//!
//! The `write_*` primitives are public so that other renderings (patterns,
//! templates) share symbol resolution, escaping and coloring.

use crate::tree::{Literal, Metadata, Node, Scalar};
use crate::{Colors, Interner, Symbol};

/// Tree renderer bound to the interner the tree was built with.
#[derive(Clone, Copy, Debug)]
pub struct Printer<'a> {
    interner: &'a Interner,
    colors: Colors,
    metadata: bool,
}

impl<'a> Printer<'a> {
    pub fn new(interner: &'a Interner) -> Self {
        Self {
            interner,
            colors: Colors::OFF,
            metadata: true,
        }
    }

    /// Set whether to use colored output.
    pub fn colored(mut self, enabled: bool) -> Self {
        self.colors = Colors::new(enabled);
        self
    }

    /// Set whether metadata is rendered.
    pub fn metadata(mut self, enabled: bool) -> Self {
        self.metadata = enabled;
        self
    }

    pub fn colors(&self) -> &Colors {
        &self.colors
    }

    /// Resolve a symbol, falling back to its index for foreign symbols.
    pub fn symbol(&self, sym: Symbol) -> std::borrow::Cow<'a, str> {
        match self.interner.try_resolve(sym) {
            Some(text) => text.into(),
            None => format!("#{}", sym.as_u32()).into(),
        }
    }

    pub fn node(&self, node: &Node) -> String {
        let mut out = String::new();
        self.write_node(&mut out, node);
        out
    }

    pub fn write_node(&self, out: &mut String, node: &Node) {
        match node {
            Node::Op(op) => {
                self.write_delim(out, '(');
                self.write_operator(out, op.operator);
                self.write_meta(out, &op.meta);
                for arg in &op.args {
                    out.push(' ');
                    self.write_node(out, arg);
                }
                self.write_delim(out, ')');
            }
            Node::Var(var) => {
                self.write_ident(out, var.name, var.context);
                self.write_meta(out, &var.meta);
            }
            Node::Lit(Literal::Scalar(s)) => self.write_scalar(out, s),
            Node::Lit(Literal::List { items, tail }) => {
                self.write_seq(out, items, tail.as_deref(), |out, n| self.write_node(out, n));
            }
            Node::Lit(Literal::Pair(left, right)) => {
                self.write_delim(out, '{');
                self.write_node(out, left);
                out.push(' ');
                self.write_node(out, right);
                self.write_delim(out, '}');
            }
        }
    }

    /// `[a b]` or `[a b | t]`, with a caller-supplied element writer.
    pub fn write_seq<T>(
        &self,
        out: &mut String,
        items: &[T],
        tail: Option<&T>,
        mut write: impl FnMut(&mut String, &T),
    ) {
        self.write_delim(out, '[');
        for (i, item) in items.iter().enumerate() {
            if i > 0 {
                out.push(' ');
            }
            write(out, item);
        }
        if let Some(tail) = tail {
            out.push_str(" | ");
            write(out, tail);
        }
        self.write_delim(out, ']');
    }

    /// Brackets and other structure, dimmed.
    pub fn write_delim(&self, out: &mut String, c: char) {
        out.push_str(self.colors.dim);
        out.push(c);
        out.push_str(self.colors.reset);
    }

    pub fn write_operator(&self, out: &mut String, operator: Symbol) {
        out.push_str(self.colors.blue);
        out.push_str(&self.symbol(operator));
        out.push_str(self.colors.reset);
    }

    pub fn write_ident(&self, out: &mut String, name: Symbol, context: Option<Symbol>) {
        out.push_str(&self.symbol(name));
        if let Some(context) = context {
            out.push_str(self.colors.dim);
            out.push('@');
            out.push_str(&self.symbol(context));
            out.push_str(self.colors.reset);
        }
    }

    /// ` #k=v` per entry; nothing when metadata rendering is off.
    pub fn write_meta(&self, out: &mut String, meta: &Metadata) {
        if !self.metadata {
            return;
        }
        for (key, value) in meta.iter() {
            out.push(' ');
            out.push_str(self.colors.dim);
            out.push('#');
            out.push_str(key);
            out.push('=');
            self.write_scalar_plain(out, value);
            out.push_str(self.colors.reset);
        }
    }

    pub fn write_scalar(&self, out: &mut String, scalar: &Scalar) {
        match scalar {
            Scalar::Str(_) | Scalar::Atom(_) => {
                out.push_str(self.colors.green);
                self.write_scalar_plain(out, scalar);
                out.push_str(self.colors.reset);
            }
            _ => self.write_scalar_plain(out, scalar),
        }
    }

    fn write_scalar_plain(&self, out: &mut String, scalar: &Scalar) {
        match scalar {
            Scalar::Nil => out.push_str("nil"),
            Scalar::Bool(b) => out.push_str(if *b { "true" } else { "false" }),
            Scalar::Int(n) => out.push_str(&n.to_string()),
            Scalar::Float(f) => out.push_str(&format!("{f:?}")),
            Scalar::Str(s) => {
                out.push('"');
                out.push_str(&escape_string(s));
                out.push('"');
            }
            Scalar::Atom(sym) => {
                out.push(':');
                out.push_str(&self.symbol(*sym));
            }
        }
    }
}

fn escape_string(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '"' => out.push_str("\\\""),
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\t' => out.push_str("\\t"),
            c => out.push(c),
        }
    }
    out
}
