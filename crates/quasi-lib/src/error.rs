use std::fmt;

/// Errors raised while building or instantiating patterns and templates.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum Error {
    /// A splice or inline-quote marker with the wrong argument shape.
    #[error(
        "malformed `{marker}` marker: expected {}, got {arity} argument(s){}",
        marker.expected_shape(),
        at_line(line)
    )]
    MalformedMarker {
        marker: Marker,
        arity: usize,
        line: Option<u32>,
    },

    /// Failure reported by a canonical-form or SSA translator, untouched.
    #[error(transparent)]
    Translate(#[from] TranslateError),

    /// A tree the engine cannot interpret in the position it occupies.
    #[error("unsupported tree shape: {what}{}", at_line(line))]
    UnsupportedShape { what: String, line: Option<u32> },

    #[error("expansion failed: {0}")]
    Expansion(String),

    /// The declaration's defaults attribute is not a flat option list.
    #[error("invalid declaration defaults: {0}")]
    InvalidDefaults(String),

    /// Template instantiation reached a reference with no binding.
    #[error("unbound variable `{0}`")]
    Unbound(String),
}

/// Result type for engine operations.
pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    pub(crate) fn unsupported(what: impl Into<String>, line: Option<u32>) -> Self {
        Error::UnsupportedShape {
            what: what.into(),
            line,
        }
    }
}

/// Translation stage that failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    ToCanonical,
    FromCanonical,
    ToSsa,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Stage::ToCanonical => "canonical translation",
            Stage::FromCanonical => "canonical back-translation",
            Stage::ToSsa => "SSA translation",
        })
    }
}

/// Error reported by a [`crate::Translator`].
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{stage} failed: {message}")]
pub struct TranslateError {
    pub stage: Stage,
    pub message: String,
}

impl TranslateError {
    pub fn new(stage: Stage, message: impl Into<String>) -> Self {
        Self {
            stage,
            message: message.into(),
        }
    }
}

/// Marker operations recognized in the pattern direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Marker {
    Unquote,
    UnquoteSplicing,
}

impl Marker {
    fn expected_shape(self) -> &'static str {
        match self {
            Marker::Unquote => "1 or 3 arguments",
            Marker::UnquoteSplicing => "exactly one list argument",
        }
    }
}

impl fmt::Display for Marker {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Marker::Unquote => "unquote",
            Marker::UnquoteSplicing => "unquote_splicing",
        })
    }
}

fn at_line(line: &Option<u32>) -> String {
    match line {
        Some(line) => format!(" (line {line})"),
        None => String::new(),
    }
}
