//! The central rewrite: escaped trees to patterns or templates.
//!
//! Pattern direction recognizes two marker forms before anything else:
//!
//! ```text
//! (unquote x)                  inline quote: x read as ordinary code
//! (unquote op meta [args...])  inline quote with explicit parts
//! (unquote_splicing [a b])     splice: [a b | _]
//! ```
//!
//! A splice in the last position of an argument list or list literal
//! extends that enclosing sequence instead of nesting.

use quasi_core::{Literal, Metadata, Node, Scalar, Symbol};

use crate::Result;
use crate::bridge::Expander;
use crate::error::{Error, Marker};
use crate::escape::{Escaped, reverse_escape};
use crate::pattern::{MetaPattern, Pattern};
use crate::template::Template;

/// How the traverser treats an escaped node, decided before descending.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum SpecialForm<'a> {
    /// `(unquote x)`
    InlineQuote(&'a Escaped),
    /// `(unquote op meta args)`
    InlineQuoteOp {
        operator: &'a Escaped,
        meta: &'a Escaped,
        args: &'a Escaped,
    },
    /// `(unquote_splicing [items | tail])`
    Splice {
        items: &'a [Escaped],
        tail: Option<&'a Escaped>,
    },
    Generic,
}

impl<'a> SpecialForm<'a> {
    /// Classify `escaped`, rejecting markers with the wrong argument shape.
    pub fn classify(escaped: &'a Escaped) -> Result<Self> {
        let Escaped::Op {
            operator,
            meta,
            args,
        } = escaped
        else {
            return Ok(SpecialForm::Generic);
        };
        match (*operator, args.as_slice()) {
            (Symbol::UNQUOTE, [quoted]) => Ok(SpecialForm::InlineQuote(quoted)),
            (Symbol::UNQUOTE, [operator, meta, args]) => Ok(SpecialForm::InlineQuoteOp {
                operator,
                meta,
                args,
            }),
            (Symbol::UNQUOTE, _) => Err(malformed(Marker::Unquote, args.len(), meta)),
            (Symbol::UNQUOTE_SPLICING, [Escaped::List { items, tail }]) => {
                Ok(SpecialForm::Splice {
                    items: items.as_slice(),
                    tail: tail.as_deref(),
                })
            }
            (Symbol::UNQUOTE_SPLICING, _) => {
                Err(malformed(Marker::UnquoteSplicing, args.len(), meta))
            }
            _ => Ok(SpecialForm::Generic),
        }
    }
}

fn malformed(marker: Marker, arity: usize, meta: &Metadata) -> Error {
    Error::MalformedMarker {
        marker,
        arity,
        line: meta.line(),
    }
}

/// Build a pattern from a resolved escaped tree.
pub fn to_pattern(escaped: &Escaped, expander: &dyn Expander) -> Result<Pattern> {
    PatternBuilder { expander }.pattern(escaped)
}

struct PatternBuilder<'a> {
    expander: &'a dyn Expander,
}

impl PatternBuilder<'_> {
    fn pattern(&self, escaped: &Escaped) -> Result<Pattern> {
        match SpecialForm::classify(escaped)? {
            SpecialForm::InlineQuote(quoted) => {
                let code = reverse_escape(quoted, self.expander)?;
                Ok(Pattern::from_code(&code))
            }
            SpecialForm::InlineQuoteOp {
                operator,
                meta,
                args,
            } => self.inline_op(operator, meta, args, escaped.line()),
            SpecialForm::Splice { items, tail } => {
                let (items, tail) = self.splice(items, tail)?;
                Ok(Pattern::List {
                    items,
                    tail: Some(Box::new(tail)),
                })
            }
            SpecialForm::Generic => self.generic(escaped),
        }
    }

    fn generic(&self, escaped: &Escaped) -> Result<Pattern> {
        match escaped {
            Escaped::Scalar(scalar) => Ok(Pattern::Lit(scalar.clone())),
            Escaped::List { items, tail } => self.sequence(items, tail.as_deref()),
            Escaped::Pair(left, right) => Ok(Pattern::Pair(
                Box::new(self.pattern(left)?),
                Box::new(self.pattern(right)?),
            )),
            Escaped::Op {
                operator: Symbol::RAW,
                ..
            } => match escaped.as_raw_var() {
                Some(var) => Ok(Pattern::Ident(var.ident())),
                None => Err(Error::unsupported(
                    "raw marker without a variable shape",
                    escaped.line(),
                )),
            },
            Escaped::Op { operator, args, .. } => Ok(Pattern::Op {
                operator: Box::new(Pattern::Lit(Scalar::Atom(*operator))),
                meta: MetaPattern::Any,
                args: Box::new(self.sequence(args, None)?),
            }),
            Escaped::Var(var) if var.is_wildcard() => Ok(Pattern::Wildcard),
            Escaped::Var(var) => Ok(Pattern::Bind(var.ident())),
            Escaped::Unquoted(code) => Ok(Pattern::from_code(code)),
        }
    }

    /// Element-wise; a trailing splice extends the sequence.
    fn sequence(&self, items: &[Escaped], tail: Option<&Escaped>) -> Result<Pattern> {
        let mut out = Vec::with_capacity(items.len());
        let mut rest = match tail {
            Some(tail) => Some(Box::new(self.pattern(tail)?)),
            None => None,
        };
        for (i, item) in items.iter().enumerate() {
            let last = i + 1 == items.len();
            if last
                && rest.is_none()
                && let SpecialForm::Splice {
                    items: spliced,
                    tail: spliced_tail,
                } = SpecialForm::classify(item)?
            {
                let (spliced, spliced_tail) = self.splice(spliced, spliced_tail)?;
                out.extend(spliced);
                rest = Some(Box::new(spliced_tail));
                break;
            }
            out.push(self.pattern(item)?);
        }
        Ok(Pattern::List {
            items: out,
            tail: rest,
        })
    }

    /// Prefix patterns and the pattern for whatever follows them.
    fn splice(&self, items: &[Escaped], tail: Option<&Escaped>) -> Result<(Vec<Pattern>, Pattern)> {
        let prefix = items
            .iter()
            .map(|item| self.code(item))
            .collect::<Result<Vec<_>>>()?;
        let rest = match tail {
            Some(tail) => self.code(tail)?,
            None => Pattern::Wildcard,
        };
        Ok((prefix, rest))
    }

    fn code(&self, escaped: &Escaped) -> Result<Pattern> {
        Ok(Pattern::from_code(&reverse_escape(escaped, self.expander)?))
    }

    fn inline_op(
        &self,
        operator: &Escaped,
        meta: &Escaped,
        args: &Escaped,
        line: Option<u32>,
    ) -> Result<Pattern> {
        let operator = match reverse_escape(operator, self.expander)? {
            Node::Var(var) if var.is_wildcard() => Pattern::Wildcard,
            Node::Var(var) => Pattern::Bind(var.ident()),
            Node::Lit(Literal::Scalar(Scalar::Atom(atom))) => {
                Pattern::Lit(Scalar::Atom(atom))
            }
            _ => {
                return Err(Error::unsupported(
                    "inline-quote operator must be an atom or a variable",
                    line,
                ));
            }
        };
        let meta = match reverse_escape(meta, self.expander)? {
            Node::Var(var) if var.is_wildcard() => MetaPattern::Any,
            Node::Var(var) => MetaPattern::Bind(var.ident()),
            _ => {
                return Err(Error::unsupported(
                    "inline-quote metadata must be a variable or `_`",
                    line,
                ));
            }
        };
        let args = match reverse_escape(args, self.expander)? {
            code @ (Node::Var(_) | Node::Lit(Literal::List { .. })) => {
                Pattern::from_code(&code)
            }
            _ => {
                return Err(Error::unsupported(
                    "inline-quote arguments must be a list or a variable",
                    line,
                ));
            }
        };
        Ok(Pattern::Op {
            operator: Box::new(operator),
            meta,
            args: Box::new(args),
        })
    }
}

/// Build a template from a resolved escaped tree.
///
/// Live variables become references, inert ones quoted data, and unquoted
/// code is embedded as is.
pub fn to_template(escaped: &Escaped) -> Result<Template> {
    match escaped {
        Escaped::Scalar(scalar) => Ok(Template::Lit(scalar.clone())),
        Escaped::List { items, tail } => Ok(Template::List {
            items: items.iter().map(to_template).collect::<Result<_>>()?,
            tail: match tail {
                Some(tail) => Some(Box::new(to_template(tail)?)),
                None => None,
            },
        }),
        Escaped::Pair(left, right) => Ok(Template::Pair(
            Box::new(to_template(left)?),
            Box::new(to_template(right)?),
        )),
        Escaped::Op {
            operator: Symbol::RAW,
            ..
        } => match escaped.as_raw_var() {
            Some(var) => Ok(Template::Quoted(var)),
            None => Err(Error::unsupported(
                "raw marker without a variable shape",
                escaped.line(),
            )),
        },
        Escaped::Op {
            operator,
            meta,
            args,
        } => Ok(Template::Op {
            operator: *operator,
            meta: meta.clone(),
            args: args.iter().map(to_template).collect::<Result<_>>()?,
        }),
        Escaped::Var(var) => Ok(Template::Ref(var.clone())),
        Escaped::Unquoted(code) => Ok(Template::Code(code.as_ref().clone())),
    }
}
