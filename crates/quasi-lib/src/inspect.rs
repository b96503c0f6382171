//! Debug inspection of built patterns and templates.
//!
//! Rendering reuses the core [`Printer`] primitives. Pattern notation adds a
//! few markers on top of the tree notation:
//!
//! ```text
//! ?x        binder
//! _         wildcard
//! 'x        inert variable (matched or reproduced literally)
//! ~(f x)    code embedded at an unquote point
//! #?m       metadata binder
//! ```
//!
//! [`NoopInspector`] is the default; its hook is inlined away, so a build
//! with debugging off pays nothing beyond the option check.

use std::cell::RefCell;

use quasi_core::{Colors, Printer, Scalar};

use crate::engine::Built;
use crate::escape::Escaped;
use crate::pattern::{MetaPattern, Pattern};
use crate::template::Template;

/// Values that have a textual rendering.
pub trait Render {
    fn write(&self, printer: &Printer<'_>, out: &mut String);

    fn render(&self, printer: &Printer<'_>) -> String {
        let mut out = String::new();
        self.write(printer, &mut out);
        out
    }
}

/// Receives the built pattern or template when the debug option is on.
pub trait Inspector {
    fn inspect(&self, printer: &Printer<'_>, value: &dyn Render, label: Option<&str>);
}

impl<I: Inspector + ?Sized> Inspector for &I {
    fn inspect(&self, printer: &Printer<'_>, value: &dyn Render, label: Option<&str>) {
        (**self).inspect(printer, value, label);
    }
}

/// Inspector that does nothing.
#[derive(Clone, Copy, Debug, Default)]
pub struct NoopInspector;

impl Inspector for NoopInspector {
    #[inline(always)]
    fn inspect(&self, _printer: &Printer<'_>, _value: &dyn Render, _label: Option<&str>) {}
}

/// Inspector that writes one line per build to stderr.
#[derive(Clone, Copy, Debug, Default)]
pub struct PrintInspector {
    colors: Colors,
}

impl PrintInspector {
    pub fn new(colors: Colors) -> Self {
        Self { colors }
    }

    /// The line written for `value`.
    pub fn format(&self, printer: &Printer<'_>, value: &dyn Render, label: Option<&str>) -> String {
        let printer = printer.colored(self.colors.is_enabled());
        let rendered = value.render(&printer);
        match label {
            Some(label) => format!("{}{label}:{} {rendered}", self.colors.dim, self.colors.reset),
            None => rendered,
        }
    }
}

impl Inspector for PrintInspector {
    fn inspect(&self, printer: &Printer<'_>, value: &dyn Render, label: Option<&str>) {
        eprintln!("{}", self.format(printer, value, label));
    }
}

/// Inspector that keeps every rendering, for callers that assert on them.
#[derive(Debug, Default)]
pub struct RecordingInspector {
    lines: RefCell<Vec<String>>,
}

impl RecordingInspector {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn lines(&self) -> Vec<String> {
        self.lines.borrow().clone()
    }
}

impl Inspector for RecordingInspector {
    fn inspect(&self, printer: &Printer<'_>, value: &dyn Render, label: Option<&str>) {
        let line = PrintInspector::default().format(printer, value, label);
        self.lines.borrow_mut().push(line);
    }
}

impl Render for Built {
    fn write(&self, printer: &Printer<'_>, out: &mut String) {
        match self {
            Built::Pattern(pattern) => pattern.write(printer, out),
            Built::Template(template) => template.write(printer, out),
        }
    }
}

impl Render for Pattern {
    fn write(&self, printer: &Printer<'_>, out: &mut String) {
        let colors = printer.colors();
        match self {
            Pattern::Wildcard => {
                out.push_str(colors.dim);
                out.push('_');
                out.push_str(colors.reset);
            }
            Pattern::Bind(ident) => {
                out.push_str(colors.yellow);
                out.push('?');
                printer.write_ident(out, ident.name, ident.context);
                out.push_str(colors.reset);
            }
            Pattern::Lit(scalar) => printer.write_scalar(out, scalar),
            Pattern::Ident(ident) => {
                out.push('\'');
                printer.write_ident(out, ident.name, ident.context);
            }
            Pattern::Op {
                operator,
                meta,
                args,
            } => {
                printer.write_delim(out, '(');
                match operator.as_ref() {
                    Pattern::Lit(Scalar::Atom(op)) => printer.write_operator(out, *op),
                    other => other.write(printer, out),
                }
                if let MetaPattern::Bind(ident) = meta {
                    out.push(' ');
                    out.push_str(colors.yellow);
                    out.push_str("#?");
                    printer.write_ident(out, ident.name, ident.context);
                    out.push_str(colors.reset);
                }
                match args.as_ref() {
                    Pattern::List { items, tail } => {
                        for item in items {
                            out.push(' ');
                            item.write(printer, out);
                        }
                        if let Some(tail) = tail {
                            out.push_str(" | ");
                            tail.write(printer, out);
                        }
                    }
                    other => {
                        out.push_str(" | ");
                        other.write(printer, out);
                    }
                }
                printer.write_delim(out, ')');
            }
            Pattern::List { items, tail } => {
                printer.write_seq(out, items, tail.as_deref(), |out, item| {
                    item.write(printer, out)
                });
            }
            Pattern::Pair(left, right) => write_pair(printer, out, left.as_ref(), right.as_ref()),
        }
    }
}

impl Render for Template {
    fn write(&self, printer: &Printer<'_>, out: &mut String) {
        let colors = printer.colors();
        match self {
            Template::Lit(scalar) => printer.write_scalar(out, scalar),
            Template::List { items, tail } => {
                printer.write_seq(out, items, tail.as_deref(), |out, item| {
                    item.write(printer, out)
                });
            }
            Template::Pair(left, right) => write_pair(printer, out, left.as_ref(), right.as_ref()),
            Template::Op {
                operator,
                meta,
                args,
            } => {
                printer.write_delim(out, '(');
                printer.write_operator(out, *operator);
                printer.write_meta(out, meta);
                for arg in args {
                    out.push(' ');
                    arg.write(printer, out);
                }
                printer.write_delim(out, ')');
            }
            Template::Ref(var) => {
                out.push_str(colors.yellow);
                printer.write_ident(out, var.name, var.context);
                out.push_str(colors.reset);
                printer.write_meta(out, &var.meta);
            }
            Template::Quoted(var) => {
                out.push('\'');
                printer.write_ident(out, var.name, var.context);
                printer.write_meta(out, &var.meta);
            }
            Template::Code(node) => {
                out.push('~');
                printer.write_node(out, node);
            }
        }
    }
}

impl Render for Escaped {
    fn write(&self, printer: &Printer<'_>, out: &mut String) {
        match self {
            Escaped::Scalar(scalar) => printer.write_scalar(out, scalar),
            Escaped::List { items, tail } => {
                printer.write_seq(out, items, tail.as_deref(), |out, item| {
                    item.write(printer, out)
                });
            }
            Escaped::Pair(left, right) => write_pair(printer, out, left.as_ref(), right.as_ref()),
            Escaped::Op {
                operator,
                meta,
                args,
            } => {
                printer.write_delim(out, '(');
                printer.write_operator(out, *operator);
                printer.write_meta(out, meta);
                for arg in args {
                    out.push(' ');
                    arg.write(printer, out);
                }
                printer.write_delim(out, ')');
            }
            Escaped::Var(var) => {
                printer.write_ident(out, var.name, var.context);
                printer.write_meta(out, &var.meta);
            }
            Escaped::Unquoted(node) => {
                out.push('~');
                printer.write_node(out, node);
            }
        }
    }
}

fn write_pair<T: Render>(printer: &Printer<'_>, out: &mut String, left: &T, right: &T) {
    printer.write_delim(out, '{');
    left.write(printer, out);
    out.push(' ');
    right.write(printer, out);
    printer.write_delim(out, '}');
}
