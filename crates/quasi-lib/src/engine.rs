//! Mode dispatch: one engine for both directions.
//!
//! ```text
//! pattern:  normalize? -> escape -> resolve (no scope) -> to_pattern -> untranslate?
//! template: translate? -> escape (unquote) -> resolve (scope) -> to_template -> strip?
//! ```
//!
//! `isolate` skips the resolve step in both directions.

use quasi_core::{Interner, Node, Printer};

use crate::Result;
use crate::bridge::{self, Expander, NoExpand, Passthrough, Translator};
use crate::escape::{EscapeOptions, escape};
use crate::inspect::{Inspector, NoopInspector, Render};
use crate::options::{Declaration, OptionLayer, Options};
use crate::pattern::Pattern;
use crate::resolve::{ScopeTable, resolve};
use crate::template::Template;
use crate::traverse::{to_pattern, to_template};

/// Lexical environment of a call site.
#[derive(Clone, Debug)]
pub struct Env<'a> {
    matching: bool,
    scope: &'a ScopeTable,
    defaults: OptionLayer,
}

impl<'a> Env<'a> {
    /// A call site in a match position: builds patterns.
    pub fn matching(scope: &'a ScopeTable) -> Self {
        Self {
            matching: true,
            scope,
            defaults: OptionLayer::default(),
        }
    }

    /// A call site in an evaluating position: builds templates.
    pub fn evaluating(scope: &'a ScopeTable) -> Self {
        Self {
            matching: false,
            scope,
            defaults: OptionLayer::default(),
        }
    }

    /// Set the declaration-level defaults.
    pub fn defaults(mut self, defaults: OptionLayer) -> Self {
        self.defaults = defaults;
        self
    }

    /// Take defaults from the enclosing declaration.
    pub fn declaration(self, declaration: &Declaration) -> Result<Self> {
        Ok(self.defaults(declaration.defaults()?))
    }

    pub fn is_matching(&self) -> bool {
        self.matching
    }

    pub fn scope(&self) -> &'a ScopeTable {
        self.scope
    }

    pub fn default_options(&self) -> &OptionLayer {
        &self.defaults
    }

    /// Call-site options over this environment's defaults.
    pub fn options(&self, call_site: &OptionLayer) -> Options {
        call_site.merged_over(&self.defaults).resolve()
    }
}

/// What [`Engine::build`] produced.
#[derive(Clone, Debug, PartialEq)]
pub enum Built {
    Pattern(Pattern),
    Template(Template),
}

impl Built {
    pub fn as_pattern(&self) -> Option<&Pattern> {
        match self {
            Built::Pattern(pattern) => Some(pattern),
            Built::Template(_) => None,
        }
    }

    pub fn as_template(&self) -> Option<&Template> {
        match self {
            Built::Template(template) => Some(template),
            Built::Pattern(_) => None,
        }
    }

    pub fn into_pattern(self) -> Option<Pattern> {
        match self {
            Built::Pattern(pattern) => Some(pattern),
            Built::Template(_) => None,
        }
    }

    pub fn into_template(self) -> Option<Template> {
        match self {
            Built::Template(template) => Some(template),
            Built::Pattern(_) => None,
        }
    }
}

/// Builds patterns and templates from code trees.
///
/// Collaborators default to no-ops; swap them in with the builder methods.
pub struct Engine<'i, T = Passthrough, X = NoExpand, I = NoopInspector> {
    interner: &'i Interner,
    translator: T,
    expander: X,
    inspector: I,
}

impl<'i> Engine<'i> {
    pub fn new(interner: &'i Interner) -> Self {
        Self {
            interner,
            translator: Passthrough,
            expander: NoExpand,
            inspector: NoopInspector,
        }
    }
}

impl<'i, T, X, I> Engine<'i, T, X, I>
where
    T: Translator,
    X: Expander,
    I: Inspector,
{
    pub fn translator<T2: Translator>(self, translator: T2) -> Engine<'i, T2, X, I> {
        Engine {
            interner: self.interner,
            translator,
            expander: self.expander,
            inspector: self.inspector,
        }
    }

    pub fn expander<X2: Expander>(self, expander: X2) -> Engine<'i, T, X2, I> {
        Engine {
            interner: self.interner,
            translator: self.translator,
            expander,
            inspector: self.inspector,
        }
    }

    pub fn inspector<I2: Inspector>(self, inspector: I2) -> Engine<'i, T, X, I2> {
        Engine {
            interner: self.interner,
            translator: self.translator,
            expander: self.expander,
            inspector,
        }
    }

    pub fn interner(&self) -> &'i Interner {
        self.interner
    }

    /// Build in the direction the environment asks for.
    pub fn build(&self, tree: &Node, options: &OptionLayer, env: &Env<'_>) -> Result<Built> {
        let options = env.options(options);
        let built = if env.is_matching() {
            Built::Pattern(self.pattern(tree, &options, env)?)
        } else {
            Built::Template(self.template(tree, &options, env)?)
        };
        self.inspect(&built, &options);
        Ok(built)
    }

    pub fn build_pattern(
        &self,
        tree: &Node,
        options: &OptionLayer,
        env: &Env<'_>,
    ) -> Result<Pattern> {
        let options = env.options(options);
        let pattern = self.pattern(tree, &options, env)?;
        self.inspect(&pattern, &options);
        Ok(pattern)
    }

    pub fn build_template(
        &self,
        tree: &Node,
        options: &OptionLayer,
        env: &Env<'_>,
    ) -> Result<Template> {
        let options = env.options(options);
        let template = self.template(tree, &options, env)?;
        self.inspect(&template, &options);
        Ok(template)
    }

    fn pattern(&self, tree: &Node, options: &Options, env: &Env<'_>) -> Result<Pattern> {
        tracing::debug!(isolate = options.isolate, canonical = ?options.to_canonical, "building pattern");
        let tree = bridge::maybe_normalize(&self.translator, tree, env, options)?;
        let escaped = escape(&tree, EscapeOptions::new());
        let escaped = if options.isolate {
            escaped
        } else {
            resolve(escaped, None)
        };
        tracing::trace!(escaped = %escaped.render(&self.printer()), "resolved");
        let pattern = to_pattern(&escaped, &self.expander)?;
        bridge::maybe_untranslate(&self.translator, pattern, env, options)
    }

    fn template(&self, tree: &Node, options: &Options, env: &Env<'_>) -> Result<Template> {
        tracing::debug!(
            isolate = options.isolate,
            canonical = ?options.to_canonical,
            to_ssa = options.to_ssa,
            keep_metadata = options.keep_metadata,
            scope = env.scope().len(),
            "building template"
        );
        let tree = bridge::maybe_translate(&self.translator, tree, env, options)?;
        let escape_options = EscapeOptions::new()
            .prune_metadata(!options.keep_metadata)
            .unquote(!options.isolate);
        let escaped = escape(&tree, escape_options);
        let escaped = if options.isolate {
            escaped
        } else {
            resolve(escaped, Some(env.scope()))
        };
        tracing::trace!(escaped = %escaped.render(&self.printer()), "resolved");
        let template = to_template(&escaped)?;
        Ok(if options.keep_metadata {
            template
        } else {
            template.strip_metadata()
        })
    }

    /// Runs after a successful build only; never touches the value.
    fn inspect(&self, value: &dyn Render, options: &Options) {
        if !options.debug.is_enabled() {
            return;
        }
        self.inspector
            .inspect(&self.printer(), value, options.debug.label());
    }

    fn printer(&self) -> Printer<'i> {
        Printer::new(self.interner)
    }
}
