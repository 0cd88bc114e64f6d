//! Directive templates compiled to view code
//!
//! `dotview` compiles a small directive dialect into instructions for a host
//! evaluator, resolves named blocks through registered handlers, minifies
//! markup, stylesheets and scripts, and post-processes output through named
//! renderers.
//!
//! # Directives
//!
//! - `{{ var: $user->name }}` becomes `<?= $user->name ?>`
//! - `{{_ "Welcome" }}` becomes `<?= translate("Welcome") ?>`
//! - `{{ if $cond }} ... {{ else }} ... {{ /if }}` becomes
//!   `<? if ($cond): ?> ... <? else: ?> ... <? endif; ?>`
//! - `{{ block:name key="value" }} ... {{ /block:name }}` is replaced by the
//!   output of the block handler registered as `name`
//! - `\{{` is a literal `{{`; any other `{{ ... }}` is left as written
//!
//! # Example
//!
//! ```rust
//! use dotview::{Attributes, Context, Engine, BLOCK_RENDERER};
//!
//! let mut engine = Engine::new();
//! engine.add_block("card", |inner: &str, attributes: &Attributes, _: &Context| {
//!     format!("<div class=\"card\"><h2>{}</h2>{inner}</div>", attributes["title"])
//! });
//!
//! let code = engine
//!     .render(r#"{{ block:card title="News" }}{{ var: $body }}{{ /block:card }}"#, &[])
//!     .unwrap();
//! assert_eq!(code, r#"<div class="card"><h2>News</h2><?= $body ?></div>"#);
//!
//! let code = engine
//!     .render_with(BLOCK_RENDERER, "{{ block:card title=Hi }}{{ var: $x }}{{ /block:card }}")
//!     .unwrap();
//! assert_eq!(code, r#"<div class="card"><h2>Hi</h2>{{ var: $x }}</div>"#);
//! ```
//!
//! # Logging
//!
//! The crate logs through `tracing` and never installs a subscriber.

pub mod context;
pub mod engine;
pub mod error;
pub mod escape;
pub mod minify;
pub mod options;
pub mod parser;
pub mod registry;
pub mod source;

pub use context::Context;
pub use engine::{BLOCK_RENDERER, BLOCK_RENDERER_ALIAS, Engine};
pub use error::{Error, Result};
pub use escape::{EscapeFilter, escape_php};
pub use minify::{Dialect, minify_css, minify_html, minify_js};
pub use options::{BlockPolicy, Options};
pub use registry::{Attributes, BlockHandler, BlockRegistry, Renderer, RendererRegistry};
pub use source::{DirectorySource, MemorySource, TEMPLATE_EXTENSIONS, TemplateSource};
