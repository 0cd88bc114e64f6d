//! Server-code escape filter
//!
//! Removes embedded server-executed code from content before it is trusted
//! as template source. A template author (or anything pasted into one) must
//! not be able to smuggle raw instructions past the directive compiler.
//!
//! Removed:
//! - `<?php ... ?>`, `<?= ... ?>` and short `<? ... ?>` tags (an unclosed tag
//!   runs to the end of the input)
//! - `<script language="php"> ... </script>`
//!
//! Named processing instructions such as `<?xml version="1.0"?>` are left alone.

use std::borrow::Cow;
use std::sync::LazyLock;

use regex::Regex;
use tracing::warn;

static FILTER: LazyLock<EscapeFilter> = LazyLock::new(EscapeFilter::new);

/// Compiled patterns for server-code removal
#[derive(Debug, Clone)]
pub struct EscapeFilter {
    pattern: Regex,
}

impl Default for EscapeFilter {
    fn default() -> Self {
        Self::new()
    }
}

impl EscapeFilter {
    pub fn new() -> Self {
        Self {
            pattern: Regex::new(concat!(
                r"(?is)<\?(?:php\b|=|\s).*?(?:\?>|\z)",
                r#"|<script\b[^>]*\blanguage\s*=\s*["']?php\b["']?[^>]*>.*?(?:</script\s*>|\z)"#,
            ))
            .expect("escape pattern is valid"),
        }
    }

    /// Returns the shared filter
    pub fn shared() -> &'static Self {
        &FILTER
    }

    /// Whether `src` contains anything this filter would remove
    pub fn is_unsafe(&self, src: &str) -> bool {
        self.pattern.is_match(src)
    }

    /// Removes server-code segments, borrowing when nothing matched
    ///
    /// Removal repeats until nothing matches, since taking one segment out
    /// can join the text around it into a new one (`<<?php ?>?php`).
    pub fn sanitize<'a>(&self, src: &'a str) -> Cow<'a, str> {
        let mut text = Cow::Borrowed(src);
        let mut removed = 0;
        loop {
            let found = self.pattern.find_iter(&text).count();
            if found == 0 {
                break;
            }
            removed += found;
            text = Cow::Owned(self.pattern.replace_all(&text, "").into_owned());
        }
        if removed > 0 {
            warn!(removed, "removed embedded server code from template content");
        }
        text
    }
}

/// Removes embedded server code from `src`
pub fn escape_php(src: &str) -> String {
    EscapeFilter::shared().sanitize(src).into_owned()
}
