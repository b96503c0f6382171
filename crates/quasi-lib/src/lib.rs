//! Quasi: quasiquotation over code trees.
//!
//! Turns a code snippet into a [`Pattern`] (in a match position) or a
//! [`Template`] (everywhere else). Identifiers in a pattern capture;
//! identifiers in a template only refer to something when the enclosing
//! scope binds them.
//!
//! # Example
//!
//! ```
//! use quasi_core::{Interner, read};
//! use quasi_lib::{Engine, Env, OptionLayer, ScopeTable};
//!
//! let mut interner = Interner::new();
//! let source = read("(+ x y)", &mut interner).unwrap();
//! let subject = read("(+ 1 (* 2 3))", &mut interner).unwrap();
//!
//! let scope = ScopeTable::new();
//! let engine = Engine::new(&interner);
//! let pattern = engine
//!     .build_pattern(&source, &OptionLayer::new(), &Env::matching(&scope))
//!     .unwrap();
//!
//! let bindings = pattern.matches(&subject).unwrap();
//! assert_eq!(bindings.len(), 2);
//! ```

#![cfg_attr(coverage_nightly, feature(coverage_attribute))]

pub mod bridge;
pub mod engine;
pub mod escape;
pub mod inspect;
pub mod options;
pub mod pattern;
pub mod resolve;
pub mod template;
pub mod traverse;

mod error;

#[cfg(test)]
mod bridge_tests;
#[cfg(test)]
mod pattern_tests;
#[cfg(test)]
mod resolve_tests;
#[cfg(test)]
mod test_utils;
#[cfg(test)]
mod traverse_tests;

pub use bridge::{Expander, NoExpand, Passthrough, Translator};
pub use engine::{Built, Engine, Env};
pub use error::{Error, Marker, Result, Stage, TranslateError};
pub use escape::{EscapeOptions, Escaped, escape, reverse_escape};
pub use inspect::{Inspector, NoopInspector, PrintInspector, RecordingInspector, Render};
pub use options::{
    CanonicalMode, DEFAULTS_ATTRIBUTE, DebugMode, Declaration, OptionLayer, Options,
};
pub use pattern::{Binding, Bindings, MetaPattern, Pattern};
pub use resolve::{ScopeTable, maybe_unescape, resolve};
pub use template::Template;
pub use traverse::{SpecialForm, to_pattern, to_template};
