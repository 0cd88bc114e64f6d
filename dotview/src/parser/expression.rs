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

//! Directive scanning
//!
//! This module splits template text into literal text and `{{ ... }}` spans.
//! It does not interpret what is inside the braces; that is the job of
//! [`Directive`](crate::parser::directive::Directive).
//!
//! # Expression Types
//!
//! - Directives: `{{ var: $name }}`, `{{ if $x }}`, `{{ block:card }}`, ...
//! - Escaped braces: `\{{` emits a literal `{{`
//!
//! # Examples
//!
//! ```rust
//! use dotview::parser::expression::{Expression, ExpressionType};
//!
//! let template = "Hello {{ var: $name }}!";
//! let expr = Expression::from(template).unwrap().unwrap();
//! assert_eq!(expr.expression_type, ExpressionType::Directive);
//! assert_eq!(expr.content, " var: $name ");
//! assert_eq!(expr.postfix, "!");
//! ```

use std::fmt::Display;

use crate::error::{Error, Result};

/// Types of scanned spans
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExpressionType {
    /// A `{{ ... }}` directive
    Directive,
    /// A backslash-escaped `\{{`
    Escaped,
}

/// A scanned span and the text around it
#[derive(Debug, Clone, Copy)]
pub struct Expression<'a> {
    /// The type of expression
    pub expression_type: ExpressionType,
    /// Text before the expression
    pub prefix: &'a str,
    /// Text between the delimiters (`{{` for an escape)
    pub content: &'a str,
    /// Text after the expression
    pub postfix: &'a str,
    /// The complete expression including delimiters
    pub raw: &'a str,
}

/// Finds the `}}` closing a directive body, skipping over quoted strings.
///
/// A quote only opens at the start of a word, so `it's` is plain text. When
/// a quote is never closed, or runs into the next `{{`, the first `}}` wins
/// and a stray apostrophe cannot swallow the directives after it.
fn find_close(body: &str) -> Option<usize> {
    let bytes = body.as_bytes();
    let mut quote: Option<u8> = None;
    let mut escaped = false;
    let mut i = 0;
    while i < bytes.len() {
        let b = bytes[i];
        match quote {
            Some(_) if b == b'{' && bytes.get(i + 1) == Some(&b'{') => break,
            Some(q) => {
                if escaped {
                    escaped = false;
                } else if b == b'\\' {
                    escaped = true;
                } else if b == q {
                    quote = None;
                }
            }
            None => match b {
                b'"' | b'\'' if i == 0 || !is_word_byte(bytes[i - 1]) => quote = Some(b),
                b'}' if bytes.get(i + 1) == Some(&b'}') => return Some(i),
                _ => (),
            },
        }
        i += 1;
    }
    quote.and_then(|_| body.find("}}"))
}

fn is_word_byte(b: u8) -> bool {
    b.is_ascii_alphanumeric() || b == b'_' || b >= 0x80
}

impl<'a> Expression<'a> {
    /// Parses the next expression from a template string
    pub fn from(src: &'a str) -> Result<Option<Self>> {
        let Some(start) = src.find("{{") else {
            return Ok(None);
        };
        if start > 0 && src.as_bytes()[start - 1] == b'\\' {
            return Ok(Some(Self {
                expression_type: ExpressionType::Escaped,
                prefix: &src[..start - 1],
                content: &src[start..start + 2],
                postfix: &src[start + 2..],
                raw: &src[start - 1..start + 2],
            }));
        }
        let body = &src[start + 2..];
        let close = find_close(body)
            .ok_or_else(|| Error::malformed("unclosed directive", &src[start..]))?;
        Ok(Some(Self {
            expression_type: ExpressionType::Directive,
            prefix: &src[..start],
            content: &body[..close],
            postfix: &body[close + 2..],
            raw: &src[start..start + close + 4],
        }))
    }

    /// Parses the next expression after this one
    pub fn next(&self) -> Result<Option<Self>> {
        Self::from(self.postfix)
    }
}

impl<'a> Display for Expression<'a> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.raw)
    }
}
