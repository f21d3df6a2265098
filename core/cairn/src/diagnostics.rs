//! Human-readable rendering of checker diagnostics and reader errors.
//!
//! ```text
//! error: type mismatch: expected `I32`, found `(?, ?)`
//!  --> 2:14
//!   |
//! 1 | (def pair (Fn I32)
//! 2 |   (fn () I32 (2, 3)))
//!   |              ^^^^^^
//! ```
//!
//! The excerpt shows the line holding the start of the span plus one line of
//! context on each side. A span running over several lines is underlined up to
//! the end of its first line.

use cairn_ast::{errors::ParseError, nodes::Span};
use cairn_type_checker::{errors::Diagnostic, typed_context::TypedContext};

/// A 1-based source position. Columns count characters, not bytes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LineCol {
    pub line: usize,
    pub column: usize,
}

/// Position of byte `offset` in `source`. Offsets past the end are clamped.
#[must_use]
pub fn line_col(source: &str, offset: u32) -> LineCol {
    let offset = (offset as usize).min(source.len());
    let before = &source.as_bytes()[..offset];
    let line = before.iter().filter(|byte| **byte == b'\n').count() + 1;
    let line_start = before
        .iter()
        .rposition(|byte| *byte == b'\n')
        .map_or(0, |newline| newline + 1);
    let column = source
        .get(line_start..offset)
        .map_or(offset - line_start, |text| text.chars().count());
    LineCol {
        line,
        column: column + 1,
    }
}

/// Renders one checker diagnostic of `ctx`.
#[must_use]
pub fn render(ctx: &TypedContext, source: &str, diagnostic: &Diagnostic) -> String {
    let error = ctx.error(diagnostic, source);
    render_message(source, &error.to_string(), Some(error.location()))
}

/// Renders every diagnostic of `ctx`, in discovery order.
#[must_use]
pub fn render_all(ctx: &TypedContext, source: &str) -> Vec<String> {
    ctx.diagnostics()
        .iter()
        .map(|diagnostic| render(ctx, source, diagnostic))
        .collect()
}

#[must_use]
pub fn render_parse_error(source: &str, error: &ParseError) -> String {
    let message = error.to_string();
    // The reader prefixes its messages with the raw span.
    let message = match error.span() {
        Some(span) => message
            .strip_prefix(&format!("{span}: "))
            .unwrap_or(&message)
            .to_string(),
        None => message,
    };
    render_message(source, &message, error.span())
}

fn render_message(source: &str, message: &str, span: Option<Span>) -> String {
    let mut out = format!("error: {message}\n");
    let Some(span) = span else {
        return out;
    };
    let start = line_col(source, span.start);
    out.push_str(&format!(" --> {}:{}\n", start.line, start.column));
    excerpt(&mut out, source, span, start);
    out
}

fn excerpt(out: &mut String, source: &str, span: Span, start: LineCol) {
    let lines: Vec<&str> = source.split('\n').collect();
    let first = start.line.saturating_sub(1).max(1);
    let last = (start.line + 1).min(lines.len());
    let width = last.to_string().len();
    out.push_str(&format!("{:width$} |\n", ""));
    for number in first..=last {
        let text = lines[number - 1].trim_end_matches('\r');
        if text.is_empty() {
            out.push_str(&format!("{number:>width$} |\n"));
        } else {
            out.push_str(&format!("{number:>width$} | {text}\n"));
        }
        if number != start.line {
            continue;
        }
        let underlined = text
            .chars()
            .skip(start.column - 1)
            .take(span.len() as usize)
            .count();
        let byte_start = span.start as usize;
        let byte_end = (span.end as usize).min(byte_start + text.len());
        let carets = source
            .get(byte_start..byte_end)
            .map_or(underlined, |covered| {
                covered.chars().take_while(|c| *c != '\n').count()
            })
            .max(1);
        out.push_str(&format!(
            "{:width$} | {:pad$}{}\n",
            "",
            "",
            "^".repeat(carets),
            pad = start.column - 1
        ));
    }
}
