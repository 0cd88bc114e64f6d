//! Named renderer and block handler registries
//!
//! Both registries map a name to a shared callable. Registering under a name
//! that already exists replaces the previous entry.

use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::sync::Arc;

use tracing::trace;

use crate::context::Context;
use crate::error::{Error, Result};

/// Post-processes compiled output
pub type Renderer = Arc<dyn Fn(&str) -> String + Send + Sync>;

/// Attributes parsed from a block's opening directive
pub type Attributes = BTreeMap<String, String>;

/// Renders a block from its inner content, attributes and the render context
pub type BlockHandler = Arc<dyn Fn(&str, &Attributes, &Context) -> String + Send + Sync>;

/// Registry of named renderers
#[derive(Clone, Default)]
pub struct RendererRegistry {
    renderers: HashMap<String, Renderer>,
}

impl RendererRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `renderer` under `name`, replacing any previous entry
    pub fn add<F>(&mut self, name: impl Into<String>, renderer: F)
    where
        F: Fn(&str) -> String + Send + Sync + 'static,
    {
        let name = name.into();
        trace!(renderer = %name, "registered renderer");
        self.renderers.insert(name, Arc::new(renderer));
    }

    /// Looks up a renderer
    pub fn get(&self, name: &str) -> Result<Renderer> {
        self.renderers
            .get(name)
            .cloned()
            .ok_or_else(|| Error::UnknownRenderer(name.to_string()))
    }

    /// Removes a renderer, returning it if it was registered
    pub fn remove(&mut self, name: &str) -> Option<Renderer> {
        self.renderers.remove(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.renderers.contains_key(name)
    }

    /// A copy of every registration
    pub fn snapshot(&self) -> HashMap<String, Renderer> {
        self.renderers.clone()
    }

    /// Looks up `name` and applies it to `code`
    pub fn render_with(&self, name: &str, code: &str) -> Result<String> {
        Ok(self.get(name)?(code))
    }
}

impl fmt::Debug for RendererRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut names: Vec<_> = self.renderers.keys().collect();
        names.sort();
        f.debug_struct("RendererRegistry").field("renderers", &names).finish()
    }
}

/// Registry of named block handlers
#[derive(Clone, Default)]
pub struct BlockRegistry {
    handlers: HashMap<String, BlockHandler>,
}

impl BlockRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `handler` under `name`, replacing any previous entry
    pub fn add<F>(&mut self, name: impl Into<String>, handler: F)
    where
        F: Fn(&str, &Attributes, &Context) -> String + Send + Sync + 'static,
    {
        let name = name.into();
        trace!(block = %name, "registered block");
        self.handlers.insert(name, Arc::new(handler));
    }

    pub fn get(&self, name: &str) -> Option<&BlockHandler> {
        self.handlers.get(name)
    }

    /// Removes a handler, returning it if it was registered
    pub fn remove(&mut self, name: &str) -> Option<BlockHandler> {
        self.handlers.remove(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.handlers.contains_key(name)
    }

    pub fn is_empty(&self) -> bool {
        self.handlers.is_empty()
    }
}

impl fmt::Debug for BlockRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut names: Vec<_> = self.handlers.keys().collect();
        names.sort();
        f.debug_struct("BlockRegistry").field("handlers", &names).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lookup_and_invoke() {
        let mut registry = RendererRegistry::new();
        registry.add("upper", |code: &str| code.to_uppercase());
        assert_eq!(registry.get("upper").unwrap()("abc"), "ABC");
        assert_eq!(registry.render_with("upper", "abc").unwrap(), "ABC");
    }

    #[test]
    fn unknown_renderer() {
        let registry = RendererRegistry::new();
        assert!(matches!(
            registry.render_with("pdf", "x"),
            Err(Error::UnknownRenderer(name)) if name == "pdf"
        ));
    }

    #[test]
    fn registering_again_overwrites() {
        let mut registry = RendererRegistry::new();
        registry.add("r", |_: &str| "first".to_string());
        registry.add("r", |_: &str| "second".to_string());
        assert_eq!(registry.render_with("r", "").unwrap(), "second");
        assert_eq!(registry.snapshot().len(), 1);
    }

    #[test]
    fn snapshot_is_a_copy() {
        let mut registry = RendererRegistry::new();
        registry.add("a", |code: &str| code.to_string());
        let mut copy = registry.snapshot();
        copy.remove("a");
        assert!(registry.contains("a"));
    }

    #[test]
    fn remove_renderer() {
        let mut registry = RendererRegistry::new();
        registry.add("a", |code: &str| code.to_string());
        assert!(registry.remove("a").is_some());
        assert!(!registry.contains("a"));
        assert!(registry.remove("a").is_none());
    }

    #[test]
    fn block_handlers() {
        let mut blocks = BlockRegistry::new();
        assert!(blocks.is_empty());
        blocks.add("test", |inner: &str, _: &Attributes, _: &Context| {
            format!("<div>{inner}</div>")
        });
        let handler = blocks.get("test").unwrap();
        assert_eq!(handler("x", &Attributes::new(), &Context::new()), "<div>x</div>");
        assert!(blocks.get("missing").is_none());
        assert!(blocks.remove("test").is_some());
        assert!(!blocks.contains("test"));
    }

    #[test]
    fn debug_lists_names() {
        let mut registry = RendererRegistry::new();
        registry.add("b", |code: &str| code.to_string());
        registry.add("a", |code: &str| code.to_string());
        assert_eq!(format!("{registry:?}"), r#"RendererRegistry { renderers: ["a", "b"] }"#);
    }
}
