//! Output minifiers
//!
//! Three independent, pure transforms: [`minify_html`], [`minify_css`] and
//! [`minify_js`]. Each one is idempotent: running it on its own output
//! changes nothing.
//!
//! ```rust
//! use dotview::minify::{minify_css, minify_html, minify_js};
//!
//! assert_eq!(minify_html("<ul>\n  <li> One </li>\n</ul>"), "<ul><li>One</li></ul>");
//! assert_eq!(minify_css("a { color : red ; }"), "a{color:red}");
//! assert_eq!(minify_js("let a = 1 ;"), "let a=1;");
//! ```

mod css;
mod html;
mod js;

pub use css::minify_css;
pub use html::minify_html;
pub use js::minify_js;

use serde::{Deserialize, Serialize};

/// The output dialect a minifier understands
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Dialect {
    Html,
    Css,
    Js,
}

impl Dialect {
    /// Runs the matching minifier
    pub fn minify(self, src: &str) -> String {
        match self {
            Dialect::Html => minify_html(src),
            Dialect::Css => minify_css(src),
            Dialect::Js => minify_js(src),
        }
    }
}
