//! Collaborators the engine calls out to, and the glue that decides when.
//!
//! The canonical-form and SSA translators live outside this crate. The
//! engine only knows them through [`Translator`], and propagates their
//! errors unchanged.

use quasi_core::Node;

use crate::Result;
use crate::engine::Env;
use crate::error::TranslateError;
use crate::options::{CanonicalMode, Options};
use crate::pattern::Pattern;

/// Bridge to the canonical and single-assignment forms.
pub trait Translator {
    fn to_canonical(&self, node: &Node, env: &Env<'_>) -> std::result::Result<Node, TranslateError>;

    /// Render a pattern built over canonical form back into surface shape.
    fn from_canonical(
        &self,
        pattern: Pattern,
        env: &Env<'_>,
    ) -> std::result::Result<Pattern, TranslateError>;

    /// One-way: there is no way back from SSA.
    fn to_ssa(&self, node: &Node) -> std::result::Result<Node, TranslateError>;
}

/// Translator whose forms coincide with the surface tree.
#[derive(Clone, Copy, Debug, Default)]
pub struct Passthrough;

impl Translator for Passthrough {
    fn to_canonical(&self, node: &Node, _env: &Env<'_>) -> std::result::Result<Node, TranslateError> {
        Ok(node.clone())
    }

    fn from_canonical(
        &self,
        pattern: Pattern,
        _env: &Env<'_>,
    ) -> std::result::Result<Pattern, TranslateError> {
        Ok(pattern)
    }

    fn to_ssa(&self, node: &Node) -> std::result::Result<Node, TranslateError> {
        Ok(node.clone())
    }
}

/// Name and macro expansion for operations rebuilt by reverse-escaping.
pub trait Expander {
    fn expand(&self, node: Node) -> Result<Node>;
}

/// Leaves every operation as written.
#[derive(Clone, Copy, Debug, Default)]
pub struct NoExpand;

impl Expander for NoExpand {
    #[inline(always)]
    fn expand(&self, node: Node) -> Result<Node> {
        Ok(node)
    }
}

/// Template direction: translate to canonical form (`On` and `Force` alike),
/// then to SSA if asked. `to_ssa` is ignored when translation is off.
pub fn maybe_translate(
    translator: &impl Translator,
    node: &Node,
    env: &Env<'_>,
    options: &Options,
) -> Result<Node> {
    if options.to_canonical == CanonicalMode::Off {
        return Ok(node.clone());
    }
    tracing::debug!(mode = ?options.to_canonical, to_ssa = options.to_ssa, "translating template input");
    let canonical = translator.to_canonical(node, env)?;
    if !options.to_ssa {
        return Ok(canonical);
    }
    Ok(translator.to_ssa(&canonical)?)
}

/// Pattern direction, before escaping: only `Force` normalizes the input.
pub fn maybe_normalize(
    translator: &impl Translator,
    node: &Node,
    env: &Env<'_>,
    options: &Options,
) -> Result<Node> {
    if options.to_canonical != CanonicalMode::Force {
        return Ok(node.clone());
    }
    tracing::debug!("normalizing pattern input to canonical form");
    Ok(translator.to_canonical(node, env)?)
}

/// Pattern direction, after traversal: `On` and `Force` render the pattern
/// back from canonical form.
pub fn maybe_untranslate(
    translator: &impl Translator,
    pattern: Pattern,
    env: &Env<'_>,
    options: &Options,
) -> Result<Pattern> {
    if options.to_canonical == CanonicalMode::Off {
        return Ok(pattern);
    }
    tracing::debug!(mode = ?options.to_canonical, "rendering pattern from canonical form");
    Ok(translator.from_canonical(pattern, env)?)
}
