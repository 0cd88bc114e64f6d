// MIT License
//
// Copyright (c) 2024 Jerome Johnson
//
// Permission is hereby granted, free of charge, to any person obtaining a copy
// of this software and associated documentation files (the "Software"), to deal
// in the Software without restriction, including without limitation the rights
// to use, copy, modify, merge, publish, distribute, sublicense, and/or sell
// copies of the Software, and to permit persons to whom the Software is
// furnished to do so, subject to the following conditions:
//
// The above copyright notice and this permission notice shall be included in all
// copies or substantial portions of the Software.
//
// THE SOFTWARE IS PROVIDED "AS IS", WITHOUT WARRANTY OF ANY KIND, EXPRESS OR
// IMPLIED, INCLUDING BUT NOT LIMITED TO THE WARRANTIES OF MERCHANTABILITY,
// FITNESS FOR A PARTICULAR PURPOSE AND NONINFRINGEMENT. IN NO EVENT SHALL THE
// AUTHORS OR COPYRIGHT HOLDERS BE LIABLE FOR ANY CLAIM, DAMAGES OR OTHER
// LIABILITY, WHETHER IN AN ACTION OF CONTRACT, TORT OR OTHERWISE, ARISING FROM,
// OUT OF OR IN CONNECTION WITH THE SOFTWARE OR THE USE OR OTHER DEALINGS IN THE
// SOFTWARE.

//! Directive classification
//!
//! Turns the content of a scanned `{{ ... }}` span into a [`Directive`].
//!
//! ## Interpolation
//! ```text
//! {{ var: $user->name }}
//! ```
//!
//! ## Translation
//! ```text
//! {{_ "Welcome back" }}
//! ```
//!
//! ## Conditionals
//! ```text
//! {{ if $logged_in }} ... {{ else }} ... {{ /if }}
//! ```
//!
//! ## Blocks
//! ```text
//! {{ block:card title="Hello" }} ... {{ /block:card }}
//! ```
//!
//! Anything else is [`Directive::Unknown`] and is written back verbatim.

use crate::error::{Error, Result};
use crate::parser::expression::Expression;

/// A classified directive
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Directive<'a> {
    /// `var: <expression>`
    Var(&'a str),
    /// `_ "<literal>"`, the literal keeps its quotes
    Translate(&'a str),
    /// `if <expression>`
    If(&'a str),
    /// `else`
    Else,
    /// `/if`
    EndIf,
    /// `block:<name> <attributes>`
    Open {
        /// Block name
        name: &'a str,
        /// Unparsed attribute text
        attributes: &'a str,
    },
    /// `/block:<name>`
    Close(&'a str),
    /// Not part of the grammar
    Unknown,
}

/// Finds the end of a double-quoted string literal, returning the index just
/// past the closing quote.
fn find_end_of_string(src: &str) -> Option<usize> {
    let mut escaped = false;
    for (i, c) in src.char_indices().skip(1) {
        match c {
            _ if escaped => escaped = false,
            '\\' => escaped = true,
            '"' => return Some(i + 1),
            _ => (),
        }
    }
    None
}

/// Strips `keyword` when it is followed by whitespace or ends the content
fn keyword<'a>(content: &'a str, word: &str) -> Option<&'a str> {
    let rest = content.strip_prefix(word)?;
    match rest.chars().next() {
        None => Some(rest),
        Some(c) if c.is_whitespace() => Some(rest.trim_start()),
        _ => None,
    }
}

fn translation(rest: &str) -> Directive<'_> {
    let literal = rest.trim();
    if literal.starts_with('"') && find_end_of_string(literal) == Some(literal.len()) {
        Directive::Translate(literal)
    } else {
        Directive::Unknown
    }
}

fn open_block<'a>(rest: &'a str, expression: &Expression<'a>) -> Result<Directive<'a>> {
    let end = rest.find(char::is_whitespace).unwrap_or(rest.len());
    let name = &rest[..end];
    if name.is_empty() {
        return Err(Error::malformed("expected block name", expression.raw));
    }
    Ok(Directive::Open {
        name,
        attributes: rest[end..].trim(),
    })
}

fn close_block<'a>(rest: &'a str, expression: &Expression<'a>) -> Result<Directive<'a>> {
    if rest.is_empty() || rest.contains(char::is_whitespace) {
        return Err(Error::malformed("expected block name", expression.raw));
    }
    Ok(Directive::Close(rest))
}

impl<'a> Directive<'a> {
    /// Classifies the full directive grammar
    pub fn parse(expression: &Expression<'a>) -> Result<Self> {
        let content = expression.content.trim();
        if let Some(rest) = content.strip_prefix("var:") {
            let rest = rest.trim();
            if rest.is_empty() {
                return Err(Error::malformed("expected expression after var:", expression.raw));
            }
            return Ok(Self::Var(rest));
        }
        if let Some(rest) = content.strip_prefix('_') {
            return Ok(match rest.chars().next() {
                Some(c) if c == '"' || c.is_whitespace() => translation(rest),
                _ => Self::Unknown,
            });
        }
        if let Some(rest) = keyword(content, "if") {
            if rest.is_empty() {
                return Err(Error::malformed("expected expression after if", expression.raw));
            }
            return Ok(Self::If(rest));
        }
        Ok(match content {
            "else" => Self::Else,
            "/if" => Self::EndIf,
            _ => return Self::parse_blocks(expression),
        })
    }

    /// Classifies block directives only; everything else is [`Directive::Unknown`]
    pub fn parse_blocks(expression: &Expression<'a>) -> Result<Self> {
        let content = expression.content.trim();
        if let Some(rest) = content.strip_prefix("block:") {
            return open_block(rest, expression);
        }
        if let Some(rest) = content.strip_prefix("/block:") {
            return close_block(rest, expression);
        }
        Ok(Self::Unknown)
    }
}
