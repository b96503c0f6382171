use quasi_core::{Ident, Interner, Node, Printer, Scalar, Symbol, read};

use crate::inspect::Render;
use crate::{Env, Pattern, Stage, TranslateError, Translator};

/// Interner plus helpers for writing trees and rendering results in tests.
pub struct Fixture {
    pub interner: Interner,
}

impl Fixture {
    pub fn new() -> Self {
        Self {
            interner: Interner::new(),
        }
    }

    pub fn read(&mut self, source: &str) -> Node {
        read(source, &mut self.interner).unwrap()
    }

    pub fn sym(&mut self, name: &str) -> Symbol {
        self.interner.intern(name)
    }

    /// `x` or `x@Ctx`.
    pub fn ident(&mut self, text: &str) -> Ident {
        match text.split_once('@') {
            Some((name, context)) => Ident::new(self.sym(name), Some(self.sym(context))),
            None => Ident::plain(self.sym(text)),
        }
    }

    pub fn render(&self, value: &dyn Render) -> String {
        value.render(&Printer::new(&self.interner))
    }

    pub fn node(&self, node: &Node) -> String {
        Printer::new(&self.interner).node(node)
    }
}

/// Translator that wraps trees in `(canon ...)` and `(ssa ...)` so tests can
/// see which stages ran. `from_canonical` unwraps the `canon` layer again.
pub struct Tagging {
    pub canon: Symbol,
    pub ssa: Symbol,
}

impl Tagging {
    pub fn new(f: &mut Fixture) -> Self {
        Self {
            canon: f.sym("canon"),
            ssa: f.sym("ssa"),
        }
    }
}

impl Translator for Tagging {
    fn to_canonical(&self, node: &Node, _env: &Env<'_>) -> Result<Node, TranslateError> {
        Ok(Node::op(self.canon, vec![node.clone()]))
    }

    fn from_canonical(&self, pattern: Pattern, _env: &Env<'_>) -> Result<Pattern, TranslateError> {
        if let Pattern::Op { operator, args, .. } = &pattern
            && **operator == Pattern::Lit(Scalar::Atom(self.canon))
            && let Pattern::List { items, tail: None } = args.as_ref()
            && let [inner] = items.as_slice()
        {
            return Ok(inner.clone());
        }
        Ok(pattern)
    }

    fn to_ssa(&self, node: &Node) -> Result<Node, TranslateError> {
        Ok(Node::op(self.ssa, vec![node.clone()]))
    }
}

/// Translator that fails every stage.
pub struct Failing;

impl Translator for Failing {
    fn to_canonical(&self, _node: &Node, _env: &Env<'_>) -> Result<Node, TranslateError> {
        Err(TranslateError::new(Stage::ToCanonical, "no canonical form"))
    }

    fn from_canonical(&self, _pattern: Pattern, _env: &Env<'_>) -> Result<Pattern, TranslateError> {
        Err(TranslateError::new(Stage::FromCanonical, "not canonical"))
    }

    fn to_ssa(&self, _node: &Node) -> Result<Node, TranslateError> {
        Err(TranslateError::new(Stage::ToSsa, "no SSA form"))
    }
}
