//! Reader for the textual tree notation.
//!
//! ```text
//! (op #line=3 arg ...)   operation, metadata directly after the operator
//! name  name@ctx         variable reference, optional context
//! nil true 12 1.5 "s" :a scalars
//! [a b]  [a b | t]       lists, improper tail after `|`
//! {a b}                  pair
//! ```
//!
//! Commas are whitespace; `;` starts a line comment. `__raw__` is reserved
//! for escaped variables and is rejected in operator position. Nesting is
//! capped at [`MAX_DEPTH`] levels.

use std::ops::Range;

use logos::Logos;

use crate::tree::{Metadata, Node, Scalar, VarRef};
use crate::{Interner, Symbol};

#[derive(Logos, Debug, Clone, Copy, PartialEq, Eq)]
enum Token {
    #[token("(")]
    ParenOpen,
    #[token(")")]
    ParenClose,
    #[token("[")]
    BracketOpen,
    #[token("]")]
    BracketClose,
    #[token("{")]
    BraceOpen,
    #[token("}")]
    BraceClose,
    #[token("|")]
    Pipe,
    #[token("@")]
    At,

    #[regex(r"-?[0-9]+")]
    Int,
    #[regex(r"-?[0-9]+\.[0-9]+")]
    Float,
    #[regex(r#""(?:[^"\\]|\\.)*""#)]
    Str,
    #[regex(r":[a-zA-Z_][a-zA-Z0-9_?!]*")]
    #[regex(r":[+\-*/<>=!&^%~.]+")]
    Atom,
    #[regex(r"#[a-zA-Z_][a-zA-Z0-9_]*=")]
    MetaKey,
    #[regex(r"[a-zA-Z_][a-zA-Z0-9_?!]*")]
    Ident,
    #[regex(r"[+\-*/<>=!&^%~.]+")]
    Operator,

    #[regex(r"[ \t\r\n\f,]+")]
    Whitespace,
    #[regex(r";[^\n]*", allow_greedy = true)]
    Comment,
}

/// Deepest nesting of operations, lists and pairs the reader accepts.
pub const MAX_DEPTH: u32 = 512;

/// Error produced by [`read`].
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{message} at offset {offset}")]
pub struct ReadError {
    pub message: String,
    pub offset: usize,
}

/// Read exactly one node from `source`, interning every name.
pub fn read(source: &str, interner: &mut Interner) -> Result<Node, ReadError> {
    let mut reader = Reader::new(source, interner)?;
    let node = reader.node()?;
    if let Some((_, span)) = reader.peek() {
        return Err(ReadError {
            message: "trailing input after node".to_owned(),
            offset: span.start,
        });
    }
    Ok(node)
}

struct Reader<'s, 'i> {
    source: &'s str,
    interner: &'i mut Interner,
    tokens: Vec<(Token, Range<usize>)>,
    pos: usize,
    depth: u32,
}

impl<'s, 'i> Reader<'s, 'i> {
    fn new(source: &'s str, interner: &'i mut Interner) -> Result<Self, ReadError> {
        let mut tokens = Vec::new();
        let mut lexer = Token::lexer(source);
        while let Some(token) = lexer.next() {
            match token {
                Ok(Token::Whitespace | Token::Comment) => {}
                Ok(token) => tokens.push((token, lexer.span())),
                Err(()) => {
                    return Err(ReadError {
                        message: format!("unexpected character `{}`", lexer.slice()),
                        offset: lexer.span().start,
                    });
                }
            }
        }
        Ok(Self {
            source,
            interner,
            tokens,
            pos: 0,
            depth: 0,
        })
    }

    fn peek(&self) -> Option<(Token, Range<usize>)> {
        self.tokens.get(self.pos).cloned()
    }

    fn bump(&mut self) -> Option<(Token, Range<usize>)> {
        let token = self.peek();
        if token.is_some() {
            self.pos += 1;
        }
        token
    }

    fn eof_error(&self, expected: &str) -> ReadError {
        ReadError {
            message: format!("expected {expected}, found end of input"),
            offset: self.source.len(),
        }
    }

    fn text(&self, span: &Range<usize>) -> &'s str {
        &self.source[span.clone()]
    }

    fn node(&mut self) -> Result<Node, ReadError> {
        let Some((token, span)) = self.bump() else {
            return Err(self.eof_error("a node"));
        };
        match token {
            Token::ParenOpen | Token::BracketOpen | Token::BraceOpen => {
                self.enter_nesting(&span)?;
                let node = match token {
                    Token::ParenOpen => self.operation(span),
                    Token::BracketOpen => self.list(),
                    _ => self.pair(),
                };
                self.depth -= 1;
                node
            }
            Token::Ident => {
                let text = self.text(&span);
                match text {
                    "nil" => Ok(Node::nil()),
                    "true" => Ok(Node::scalar(Scalar::Bool(true))),
                    "false" => Ok(Node::scalar(Scalar::Bool(false))),
                    _ => self.variable(text),
                }
            }
            _ => self.scalar(token, span).map(Node::scalar),
        }
    }

    fn enter_nesting(&mut self, open: &Range<usize>) -> Result<(), ReadError> {
        if self.depth >= MAX_DEPTH {
            return Err(ReadError {
                message: "nesting too deep".to_owned(),
                offset: open.start,
            });
        }
        self.depth += 1;
        Ok(())
    }

    fn pair(&mut self) -> Result<Node, ReadError> {
        let left = self.node()?;
        let right = self.node()?;
        self.expect(Token::BraceClose, "`}`")?;
        Ok(Node::pair(left, right))
    }

    fn operation(&mut self, open: Range<usize>) -> Result<Node, ReadError> {
        let operator = match self.bump() {
            Some((Token::Ident | Token::Operator, span)) => {
                let text = self.text(&span);
                let operator = self.interner.intern(text);
                if operator == Symbol::RAW {
                    return Err(ReadError {
                        message: "`__raw__` is reserved and cannot be an operator".to_owned(),
                        offset: span.start,
                    });
                }
                operator
            }
            Some((_, span)) => {
                return Err(ReadError {
                    message: "expected an operator".to_owned(),
                    offset: span.start,
                });
            }
            None => return Err(self.eof_error("an operator")),
        };
        let meta = self.metadata()?;
        let mut args = Vec::new();
        loop {
            match self.peek() {
                Some((Token::ParenClose, _)) => {
                    self.pos += 1;
                    return Ok(Node::op_with_meta(operator, meta, args));
                }
                Some(_) => args.push(self.node()?),
                None => {
                    return Err(ReadError {
                        message: "unclosed operation".to_owned(),
                        offset: open.start,
                    });
                }
            }
        }
    }

    fn list(&mut self) -> Result<Node, ReadError> {
        let mut items = Vec::new();
        loop {
            match self.peek() {
                Some((Token::BracketClose, _)) => {
                    self.pos += 1;
                    return Ok(Node::list(items));
                }
                Some((Token::Pipe, span)) => {
                    self.pos += 1;
                    if items.is_empty() {
                        return Err(ReadError {
                            message: "improper tail needs at least one element".to_owned(),
                            offset: span.start,
                        });
                    }
                    let tail = self.node()?;
                    self.expect(Token::BracketClose, "`]`")?;
                    return Ok(Node::improper(items, tail));
                }
                Some(_) => items.push(self.node()?),
                None => return Err(self.eof_error("`]`")),
            }
        }
    }

    fn variable(&mut self, name: &str) -> Result<Node, ReadError> {
        let name = self.interner.intern(name);
        let mut context: Option<Symbol> = None;
        if let Some((Token::At, _)) = self.peek() {
            self.pos += 1;
            match self.bump() {
                Some((Token::Ident, span)) => {
                    let text = self.text(&span);
                    context = Some(self.interner.intern(text));
                }
                Some((_, span)) => {
                    return Err(ReadError {
                        message: "expected a context name after `@`".to_owned(),
                        offset: span.start,
                    });
                }
                None => return Err(self.eof_error("a context name")),
            }
        }
        let meta = self.metadata()?;
        Ok(Node::Var(VarRef {
            name,
            meta,
            context,
        }))
    }

    fn metadata(&mut self) -> Result<Metadata, ReadError> {
        let mut meta = Metadata::new();
        while let Some((Token::MetaKey, span)) = self.peek() {
            self.pos += 1;
            let text = self.text(&span);
            let key = &text[1..text.len() - 1];
            let value = match self.bump() {
                Some((Token::Ident, span)) => match self.text(&span) {
                    "nil" => Scalar::Nil,
                    "true" => Scalar::Bool(true),
                    "false" => Scalar::Bool(false),
                    _ => {
                        return Err(ReadError {
                            message: "metadata values must be scalars".to_owned(),
                            offset: span.start,
                        });
                    }
                },
                Some((token, span)) => self.scalar(token, span)?,
                None => return Err(self.eof_error("a metadata value")),
            };
            meta.insert(key, value);
        }
        Ok(meta)
    }

    fn scalar(&mut self, token: Token, span: Range<usize>) -> Result<Scalar, ReadError> {
        let text = self.text(&span);
        let invalid = |message: &str| ReadError {
            message: message.to_owned(),
            offset: span.start,
        };
        match token {
            Token::Int => text
                .parse()
                .map(Scalar::Int)
                .map_err(|_| invalid("integer out of range")),
            Token::Float => text
                .parse()
                .map(Scalar::Float)
                .map_err(|_| invalid("invalid float")),
            Token::Str => Ok(Scalar::Str(unescape(&text[1..text.len() - 1]))),
            Token::Atom => Ok(Scalar::Atom(self.interner.intern(&text[1..]))),
            _ => Err(invalid("unexpected token")),
        }
    }

    fn expect(&mut self, expected: Token, what: &str) -> Result<(), ReadError> {
        match self.bump() {
            Some((token, _)) if token == expected => Ok(()),
            Some((_, span)) => Err(ReadError {
                message: format!("expected {what}"),
                offset: span.start,
            }),
            None => Err(self.eof_error(what)),
        }
    }
}

fn unescape(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    let mut chars = raw.chars();
    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        match chars.next() {
            Some('n') => out.push('\n'),
            Some('t') => out.push('\t'),
            Some(other) => out.push(other),
            None => out.push('\\'),
        }
    }
    out
}
