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

//! Block compilation
//!
//! A block is a named, paired directive whose inner content is handed to a
//! registered [`BlockHandler`](crate::registry::BlockHandler):
//!
//! ```text
//! {{ block:card title="Hello" wide }}
//!     <p>Body</p>
//! {{ /block:card }}
//! ```
//!
//! The handler receives the already-rendered inner content, the attributes of
//! the opening directive and the render context. Its return value replaces
//! the whole span, directives included.
//!
//! # Attributes
//!
//! - `key="value"` or `key='value'`: backslash escapes are removed
//! - `key=value`: value runs to the next whitespace
//! - `key`: a flag with an empty value

use std::sync::LazyLock;

use regex::Regex;
use tracing::warn;

use crate::context::Context;
use crate::error::{Error, Result};
use crate::options::BlockPolicy;
use crate::registry::{Attributes, BlockRegistry};

static ATTRIBUTE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(concat!(
        r#"([A-Za-z_][\w.:-]*)"#,
        r#"(?:\s*=\s*(?:"((?:[^"\\]|\\.)*)"|'((?:[^'\\]|\\.)*)'|([^\s"']+)))?"#,
    ))
    .expect("attribute pattern is valid")
});

static ESCAPE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)\\(.)").expect("unescape pattern is valid"));

/// Parses the attribute text of an opening block directive
pub fn parse_attributes(src: &str) -> Attributes {
    ATTRIBUTE
        .captures_iter(src)
        .map(|captures| {
            let key = captures[1].to_string();
            let value = match (captures.get(2), captures.get(3), captures.get(4)) {
                (Some(quoted), _, _) | (_, Some(quoted), _) => {
                    ESCAPE.replace_all(quoted.as_str(), "$1").into_owned()
                }
                (_, _, Some(bare)) => bare.as_str().to_string(),
                _ => String::new(),
            };
            (key, value)
        })
        .collect()
}

/// A parsed block span awaiting its handler
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Block<'a> {
    /// Block name
    pub name: &'a str,
    /// Unparsed attribute text
    pub attributes: &'a str,
    /// Opening directive as written
    pub open: &'a str,
    /// Closing directive as written
    pub close: &'a str,
}

impl<'a> Block<'a> {
    /// Replaces the block span with its handler's output
    pub fn render(
        &self,
        inner: &str,
        blocks: &BlockRegistry,
        context: &Context,
        policy: BlockPolicy,
    ) -> Result<String> {
        match blocks.get(self.name) {
            Some(handler) => Ok(handler(inner, &parse_attributes(self.attributes), context)),
            None => match policy {
                BlockPolicy::Fail => Err(Error::UnknownBlock(self.name.to_string())),
                BlockPolicy::Verbatim => {
                    warn!(block = self.name, "no handler registered, keeping block as written");
                    Ok(format!("{}{}{}", self.open, inner, self.close))
                }
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn attributes(pairs: &[(&str, &str)]) -> Attributes {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn attribute_forms() {
        assert_eq!(
            parse_attributes(r#"title="Hello world" size='lg' count=3 wide"#),
            attributes(&[
                ("title", "Hello world"),
                ("size", "lg"),
                ("count", "3"),
                ("wide", ""),
            ])
        );
    }

    #[test]
    fn quoted_values_are_unescaped() {
        assert_eq!(
            parse_attributes(r#"say="a \"quoted\" word" path='c:\\dir'"#),
            attributes(&[("say", r#"a "quoted" word"#), ("path", r"c:\dir")])
        );
    }

    #[test]
    fn spaces_around_equals() {
        assert_eq!(
            parse_attributes(r#"data-id = "7""#),
            attributes(&[("data-id", "7")])
        );
    }

    #[test]
    fn empty_attributes() {
        assert!(parse_attributes("").is_empty());
    }

    fn card() -> Block<'static> {
        Block {
            name: "card",
            attributes: r#"title="Hi""#,
            open: r#"{{ block:card title="Hi" }}"#,
            close: "{{ /block:card }}",
        }
    }

    #[test]
    fn handler_receives_attributes_and_context() {
        let mut blocks = BlockRegistry::new();
        blocks.add("card", |inner: &str, attributes: &Attributes, context: &Context| {
            let user = context.view_var("user").and_then(|v| v.as_str()).unwrap_or("");
            format!("<h2>{}</h2>{inner}<p>{user}</p>", attributes["title"])
        });
        let mut context = Context::new();
        context.set_view_var("user", "Ada");
        assert_eq!(
            card().render("body", &blocks, &context, BlockPolicy::Fail).unwrap(),
            "<h2>Hi</h2>body<p>Ada</p>"
        );
    }

    #[test]
    fn unknown_block_fails_by_default() {
        let result = card().render("body", &BlockRegistry::new(), &Context::new(), BlockPolicy::Fail);
        assert!(matches!(result, Err(Error::UnknownBlock(name)) if name == "card"));
    }

    #[test]
    fn unknown_block_verbatim() {
        let result = card()
            .render("body", &BlockRegistry::new(), &Context::new(), BlockPolicy::Verbatim)
            .unwrap();
        assert_eq!(result, r#"{{ block:card title="Hi" }}body{{ /block:card }}"#);
    }
}
