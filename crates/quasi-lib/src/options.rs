//! Options record, partial option layers and declaration defaults.
//!
//! Precedence is call site, then the enclosing declaration's defaults, then
//! [`Options::default`]. Layers are plain data so both the declaration
//! attribute and call sites can be deserialized into them.

use indexmap::IndexMap;
use serde::Deserialize;

use crate::Result;
use crate::error::Error;

/// Attribute of a [`Declaration`] holding its default options.
pub const DEFAULTS_ATTRIBUTE: &str = "quasi";

/// Whether and how to inspect the built value.
#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(from = "DebugRepr")]
pub enum DebugMode {
    #[default]
    Off,
    On,
    /// Inspect, printing the label alongside.
    Label(String),
}

#[derive(Deserialize)]
#[serde(untagged)]
enum DebugRepr {
    Flag(bool),
    Label(String),
}

impl From<DebugRepr> for DebugMode {
    fn from(repr: DebugRepr) -> Self {
        match repr {
            DebugRepr::Flag(false) => DebugMode::Off,
            DebugRepr::Flag(true) => DebugMode::On,
            DebugRepr::Label(label) => DebugMode::Label(label),
        }
    }
}

impl DebugMode {
    pub fn is_enabled(&self) -> bool {
        !matches!(self, DebugMode::Off)
    }

    pub fn label(&self) -> Option<&str> {
        match self {
            DebugMode::Label(label) => Some(label),
            _ => None,
        }
    }
}

/// Canonical-form translation.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(try_from = "CanonicalRepr")]
pub enum CanonicalMode {
    #[default]
    Off,
    On,
    /// Also normalize pattern input before escaping.
    Force,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum CanonicalRepr {
    Flag(bool),
    Name(String),
}

impl TryFrom<CanonicalRepr> for CanonicalMode {
    type Error = String;

    fn try_from(repr: CanonicalRepr) -> std::result::Result<Self, Self::Error> {
        match repr {
            CanonicalRepr::Flag(false) => Ok(CanonicalMode::Off),
            CanonicalRepr::Flag(true) => Ok(CanonicalMode::On),
            CanonicalRepr::Name(name) if name == "force" => Ok(CanonicalMode::Force),
            CanonicalRepr::Name(name) => Err(format!(
                "expected `true`, `false` or \"force\" for to_canonical, got {name:?}"
            )),
        }
    }
}

/// Fully resolved options for one build.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Options {
    pub(crate) debug: DebugMode,
    pub(crate) to_canonical: CanonicalMode,
    pub(crate) to_ssa: bool,
    pub(crate) isolate: bool,
    pub(crate) keep_metadata: bool,
}

impl Options {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the debug inspection mode.
    pub fn debug(mut self, value: DebugMode) -> Self {
        self.debug = value;
        self
    }

    /// Set canonical-form translation.
    pub fn to_canonical(mut self, value: CanonicalMode) -> Self {
        self.to_canonical = value;
        self
    }

    /// Set whether canonical output continues to SSA form.
    pub fn to_ssa(mut self, value: bool) -> Self {
        self.to_ssa = value;
        self
    }

    /// Set whether variable resolution is skipped.
    pub fn isolate(mut self, value: bool) -> Self {
        self.isolate = value;
        self
    }

    /// Set whether templates keep metadata.
    pub fn keep_metadata(mut self, value: bool) -> Self {
        self.keep_metadata = value;
        self
    }
}

/// A partial set of options. Unset fields defer to the layer below.
#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct OptionLayer {
    pub debug: Option<DebugMode>,
    pub to_canonical: Option<CanonicalMode>,
    pub to_ssa: Option<bool>,
    pub isolate: Option<bool>,
    pub keep_metadata: Option<bool>,
}

impl OptionLayer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn debug(mut self, value: DebugMode) -> Self {
        self.debug = Some(value);
        self
    }

    pub fn to_canonical(mut self, value: CanonicalMode) -> Self {
        self.to_canonical = Some(value);
        self
    }

    pub fn to_ssa(mut self, value: bool) -> Self {
        self.to_ssa = Some(value);
        self
    }

    pub fn isolate(mut self, value: bool) -> Self {
        self.isolate = Some(value);
        self
    }

    pub fn keep_metadata(mut self, value: bool) -> Self {
        self.keep_metadata = Some(value);
        self
    }

    /// This layer over `base`: fields set here win.
    pub fn merged_over(&self, base: &OptionLayer) -> OptionLayer {
        OptionLayer {
            debug: self.debug.clone().or_else(|| base.debug.clone()),
            to_canonical: self.to_canonical.or(base.to_canonical),
            to_ssa: self.to_ssa.or(base.to_ssa),
            isolate: self.isolate.or(base.isolate),
            keep_metadata: self.keep_metadata.or(base.keep_metadata),
        }
    }

    /// Fill unset fields from [`Options::default`].
    pub fn resolve(&self) -> Options {
        let defaults = Options::default();
        Options {
            debug: self.debug.clone().unwrap_or(defaults.debug),
            to_canonical: self.to_canonical.unwrap_or(defaults.to_canonical),
            to_ssa: self.to_ssa.unwrap_or(defaults.to_ssa),
            isolate: self.isolate.unwrap_or(defaults.isolate),
            keep_metadata: self.keep_metadata.unwrap_or(defaults.keep_metadata),
        }
    }
}

impl From<&Options> for OptionLayer {
    fn from(options: &Options) -> Self {
        OptionLayer {
            debug: Some(options.debug.clone()),
            to_canonical: Some(options.to_canonical),
            to_ssa: Some(options.to_ssa),
            isolate: Some(options.isolate),
            keep_metadata: Some(options.keep_metadata),
        }
    }
}

/// Attributes attached to the declaration enclosing a call site.
#[derive(Clone, Debug, Default, PartialEq, Deserialize)]
#[serde(transparent)]
pub struct Declaration {
    attributes: IndexMap<String, serde_json::Value>,
}

impl Declaration {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_attribute(mut self, name: impl Into<String>, value: serde_json::Value) -> Self {
        self.attributes.insert(name.into(), value);
        self
    }

    pub fn attribute(&self, name: &str) -> Option<&serde_json::Value> {
        self.attributes.get(name)
    }

    /// Default options from [`DEFAULTS_ATTRIBUTE`]; empty when absent.
    pub fn defaults(&self) -> Result<OptionLayer> {
        let Some(value) = self.attribute(DEFAULTS_ATTRIBUTE) else {
            return Ok(OptionLayer::default());
        };
        OptionLayer::deserialize(value).map_err(|err| Error::InvalidDefaults(err.to_string()))
    }
}
