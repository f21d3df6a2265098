//! Tokenizer and S-expression reader.
//!
//! The reader turns source text into a flat concrete syntax tree ([`Cst`]) of atoms,
//! parenthesised forms and bracketed forms. It does not assign meaning to forms;
//! that is done by [`Builder`](crate::builder::Builder), which lowers the CST into
//! the node [`Arena`](crate::arena::Arena).
//!
//! Both passes are iterative: nesting depth only costs heap memory.

use crate::errors::ParseError;
use crate::nodes::{Span, SubRun};

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub(crate) enum TokenKind {
    Open,
    Close,
    OpenBracket,
    CloseBracket,
    Comma,
    Int,
    Str,
    Name,
}

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub(crate) struct Token {
    pub(crate) kind: TokenKind,
    pub(crate) span: Span,
}

fn is_name_start(c: u8) -> bool {
    c.is_ascii_alphabetic() || c == b'_'
}

fn is_name_continue(c: u8) -> bool {
    c.is_ascii_alphanumeric() || matches!(c, b'_' | b'-' | b'\'' | b'?' | b'!')
}

/// Splits `source` into tokens. Whitespace and `;` line comments are skipped.
pub(crate) fn tokenize(source: &str) -> Result<Vec<Token>, ParseError> {
    if u32::try_from(source.len()).is_err() {
        return Err(ParseError::SourceTooLarge);
    }
    let bytes = source.as_bytes();
    let mut tokens = Vec::new();
    let mut i = 0;
    #[allow(clippy::cast_possible_truncation)]
    let span = |start: usize, end: usize| Span::new(start as u32, end as u32);
    while i < bytes.len() {
        let c = bytes[i];
        let start = i;
        let kind = match c {
            b' ' | b'\t' | b'\r' | b'\n' => {
                i += 1;
                continue;
            }
            b';' => {
                while i < bytes.len() && bytes[i] != b'\n' {
                    i += 1;
                }
                continue;
            }
            b'(' => {
                i += 1;
                TokenKind::Open
            }
            b')' => {
                i += 1;
                TokenKind::Close
            }
            b'[' => {
                i += 1;
                TokenKind::OpenBracket
            }
            b']' => {
                i += 1;
                TokenKind::CloseBracket
            }
            b',' => {
                i += 1;
                TokenKind::Comma
            }
            b'"' => {
                i += 1;
                loop {
                    match bytes.get(i) {
                        None => {
                            return Err(ParseError::UnterminatedString {
                                span: span(start, bytes.len()),
                            });
                        }
                        Some(b'"') => {
                            i += 1;
                            break;
                        }
                        Some(b'\\') => i += 2,
                        Some(_) => i += 1,
                    }
                }
                TokenKind::Str
            }
            c if c.is_ascii_digit() => {
                while i < bytes.len() && bytes[i].is_ascii_digit() {
                    i += 1;
                }
                TokenKind::Int
            }
            c if is_name_start(c) => {
                while i < bytes.len() && is_name_continue(bytes[i]) {
                    i += 1;
                }
                TokenKind::Name
            }
            _ => {
                let found = source[start..].chars().next().unwrap_or('\u{fffd}');
                return Err(ParseError::UnexpectedChar {
                    found,
                    span: span(start, start + found.len_utf8()),
                });
            }
        };
        tokens.push(Token {
            kind,
            span: span(start, i),
        });
    }
    Ok(tokens)
}

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub(crate) enum CstKind {
    Name,
    Int,
    Str,
    /// `( ... )`; `tuple` is set when the elements are comma separated.
    Paren { tuple: bool },
    /// `[ ... ]`
    Bracket,
}

#[derive(Clone, Copy, Debug)]
pub(crate) struct CstNode {
    pub(crate) kind: CstKind,
    pub(crate) span: Span,
    pub(crate) subs: SubRun,
}

/// Flat concrete syntax tree: nodes plus one shared child-index array.
#[derive(Debug, Default)]
pub(crate) struct Cst {
    nodes: Vec<CstNode>,
    child_indices: Vec<u32>,
    top_level: Vec<u32>,
}

impl Cst {
    pub(crate) fn node(&self, index: u32) -> CstNode {
        self.nodes[index as usize]
    }

    pub(crate) fn children(&self, index: u32) -> &[u32] {
        &self.child_indices[self.node(index).subs.range()]
    }

    pub(crate) fn top_level(&self) -> &[u32] {
        &self.top_level
    }

    pub(crate) fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Returns the atom text of `index` if it is a name.
    pub(crate) fn name<'s>(&self, index: u32, source: &'s str) -> Option<&'s str> {
        let node = self.node(index);
        matches!(node.kind, CstKind::Name).then(|| node.span.text(source))
    }

    fn push(&mut self, kind: CstKind, span: Span, children: &[u32]) -> u32 {
        #[allow(clippy::cast_possible_truncation)]
        let subs = SubRun {
            start: self.child_indices.len() as u32,
            len: children.len() as u32,
        };
        self.child_indices.extend_from_slice(children);
        #[allow(clippy::cast_possible_truncation)]
        let index = self.nodes.len() as u32;
        self.nodes.push(CstNode { kind, span, subs });
        index
    }
}

/// An open `(` or `[` whose elements are being collected.
struct Frame {
    open: TokenKind,
    start: u32,
    pending_start: usize,
    commas: u32,
    since_comma: u32,
}

impl Frame {
    fn open_char(&self) -> char {
        if self.open == TokenKind::OpenBracket {
            '['
        } else {
            '('
        }
    }
}

/// Reads the token stream into a [`Cst`].
pub(crate) fn read(source: &str) -> Result<Cst, ParseError> {
    let tokens = tokenize(source)?;
    let mut cst = Cst {
        nodes: Vec::with_capacity(tokens.len()),
        child_indices: Vec::with_capacity(tokens.len()),
        top_level: Vec::new(),
    };
    // Elements of every open form, innermost last.
    let mut pending: Vec<u32> = Vec::new();
    let mut frames: Vec<Frame> = Vec::new();

    for token in tokens {
        let leaf = match token.kind {
            TokenKind::Name => Some(CstKind::Name),
            TokenKind::Int => Some(CstKind::Int),
            TokenKind::Str => Some(CstKind::Str),
            TokenKind::Open | TokenKind::OpenBracket => {
                frames.push(Frame {
                    open: token.kind,
                    start: token.span.start,
                    pending_start: pending.len(),
                    commas: 0,
                    since_comma: 0,
                });
                None
            }
            TokenKind::Comma => {
                match frames.last_mut() {
                    Some(frame) if frame.open == TokenKind::Open && frame.since_comma == 1 => {
                        frame.commas += 1;
                        frame.since_comma = 0;
                    }
                    Some(frame) if frame.open == TokenKind::Open => {
                        return Err(ParseError::MalformedTuple { span: token.span });
                    }
                    _ => {
                        return Err(ParseError::UnexpectedChar {
                            found: ',',
                            span: token.span,
                        });
                    }
                }
                None
            }
            TokenKind::Close | TokenKind::CloseBracket => {
                let found = if token.kind == TokenKind::Close { ')' } else { ']' };
                let expected_open = if token.kind == TokenKind::Close {
                    TokenKind::Open
                } else {
                    TokenKind::OpenBracket
                };
                let frame = match frames.pop() {
                    Some(frame) if frame.open == expected_open => frame,
                    _ => {
                        return Err(ParseError::UnexpectedClose {
                            found,
                            span: token.span,
                        });
                    }
                };
                let span = Span::new(frame.start, token.span.end);
                if frame.commas > 0 && frame.since_comma != 1 {
                    return Err(ParseError::MalformedTuple { span });
                }
                let kind = if frame.open == TokenKind::OpenBracket {
                    CstKind::Bracket
                } else {
                    CstKind::Paren {
                        tuple: frame.commas > 0,
                    }
                };
                let index = cst.push(kind, span, &pending[frame.pending_start..]);
                pending.truncate(frame.pending_start);
                pending.push(index);
                if let Some(parent) = frames.last_mut() {
                    parent.since_comma += 1;
                }
                None
            }
        };
        if let Some(kind) = leaf {
            let index = cst.push(kind, token.span, &[]);
            pending.push(index);
            if let Some(parent) = frames.last_mut() {
                parent.since_comma += 1;
            }
        }
    }

    if let Some(frame) = frames.last() {
        #[allow(clippy::cast_possible_truncation)]
        let end = source.len() as u32;
        return Err(ParseError::Unclosed {
            open: frame.open_char(),
            span: Span::new(frame.start, end),
        });
    }
    cst.top_level = pending;
    Ok(cst)
}
