#![cfg_attr(coverage_nightly, feature(coverage_attribute))]

//! Core data structures for the quasi engine.
//!
//! - [`Node`]: the closed three-variant code tree (operation, variable, literal)
//! - [`Interner`] / [`Symbol`]: interned names, with the reserved markers seeded
//! - [`read`] / [`Printer`]: the textual notation used by tests and the inspector
//!
//! # Example
//!
//! ```
//! use quasi_core::{Interner, Printer, read};
//!
//! let mut interner = Interner::new();
//! let tree = read("(+ #line=3 x 1)", &mut interner).unwrap();
//! let printer = Printer::new(&interner).metadata(false);
//! assert_eq!(printer.node(&tree), "(+ x 1)");
//! ```

mod colors;
mod interner;
mod printer;
mod read;
mod tree;


pub use colors::Colors;
pub use interner::{Interner, RESERVED, Symbol};
pub use printer::Printer;
pub use read::{MAX_DEPTH, ReadError, read};
pub use tree::{Ident, LINE, Literal, Metadata, Node, Op, Scalar, VarRef};
