//! The view engine
//!
//! An [`Engine`] owns everything a render needs: options, the render context,
//! the active layout and view, the renderer and block registries and an
//! optional [`TemplateSource`]. Nothing is global, so two engines never see
//! each other's registrations.

use std::collections::HashMap;

use tracing::debug;

use crate::context::Context;
use crate::error::{Error, Result};
use crate::minify::Dialect;
use crate::options::Options;
use crate::parser::compiler::Compiler;
use crate::registry::{Attributes, BlockRegistry, Renderer, RendererRegistry};
use crate::source::TemplateSource;

/// Renderer name that resolves block directives and nothing else
pub const BLOCK_RENDERER: &str = "dotview.block";

/// Another name for [`BLOCK_RENDERER`], used by existing templates and callers
pub const BLOCK_RENDERER_ALIAS: &str = "dotapp.block";

/// A view engine instance
#[derive(Default)]
pub struct Engine {
    options: Options,
    context: Context,
    layout: Option<String>,
    view: Option<String>,
    renderers: RendererRegistry,
    blocks: BlockRegistry,
    source: Option<Box<dyn TemplateSource>>,
}

impl std::fmt::Debug for Engine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Engine")
            .field("options", &self.options)
            .field("context", &self.context)
            .field("layout", &self.layout)
            .field("view", &self.view)
            .field("renderers", &self.renderers)
            .field("blocks", &self.blocks)
            .field("source", &self.source.is_some())
            .finish()
    }
}

impl Engine {
    /// Creates an engine with default options and no template source
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_options(options: Options) -> Self {
        Self {
            options,
            ..Self::default()
        }
    }

    /// Sets the template source used by [`compile_view`](Self::compile_view)
    /// and [`compile_layout`](Self::compile_layout)
    pub fn with_source(mut self, source: impl TemplateSource + 'static) -> Self {
        self.source = Some(Box::new(source));
        self
    }

    pub fn options(&self) -> &Options {
        &self.options
    }

    pub fn options_mut(&mut self) -> &mut Options {
        &mut self.options
    }

    pub fn context(&self) -> &Context {
        &self.context
    }

    pub fn context_mut(&mut self) -> &mut Context {
        &mut self.context
    }

    /// Selects the active layout
    pub fn set_layout(&mut self, name: impl Into<String>) {
        self.layout = Some(name.into());
    }

    pub fn layout(&self) -> Option<&str> {
        self.layout.as_deref()
    }

    /// Selects the active view
    pub fn set_view(&mut self, name: impl Into<String>) {
        self.view = Some(name.into());
    }

    pub fn view(&self) -> Option<&str> {
        self.view.as_deref()
    }

    /// Compiles a template with the engine's context and blocks
    pub fn compile(&self, template: &str, escape: bool) -> Result<String> {
        Compiler::new(&self.options, &self.blocks).compile(template, &self.context, escape)
    }

    pub fn minify(&self, dialect: Dialect, text: &str) -> String {
        dialect.minify(text)
    }

    /// Compiles, minifies when configured, then applies `renderers` in order
    pub fn render(&self, template: &str, renderers: &[&str]) -> Result<String> {
        let mut code = self.compile(template, self.options.escape)?;
        if let Some(dialect) = self.options.minify {
            code = dialect.minify(&code);
        }
        for name in renderers {
            code = self.render_with(name, &code)?;
        }
        debug!(len = code.len(), renderers = renderers.len(), "rendered template");
        Ok(code)
    }

    fn read(&self, name: Option<&str>, kind: &'static str) -> Result<String> {
        let source = self.source.as_ref().ok_or(Error::NoTemplateSource)?;
        let name = name.ok_or(Error::NoActiveTemplate(kind))?;
        source.read(name)
    }

    /// Reads and compiles the active view
    pub fn compile_view(&self) -> Result<String> {
        let template = self.read(self.view(), "view")?;
        self.compile(&template, self.options.escape)
    }

    /// Reads and compiles the active layout
    pub fn compile_layout(&self) -> Result<String> {
        let template = self.read(self.layout(), "layout")?;
        self.compile(&template, self.options.escape)
    }

    /// Registers a renderer, replacing any previous one with the same name
    pub fn add_renderer<F>(&mut self, name: impl Into<String>, renderer: F)
    where
        F: Fn(&str) -> String + Send + Sync + 'static,
    {
        self.renderers.add(name, renderer);
    }

    pub fn renderer(&self, name: &str) -> Result<Renderer> {
        self.renderers.get(name)
    }

    /// Applies the renderer called `name` to `code`
    ///
    /// [`BLOCK_RENDERER`] and [`BLOCK_RENDERER_ALIAS`] resolve block
    /// directives unless a renderer has been registered under that name.
    pub fn render_with(&self, name: &str, code: &str) -> Result<String> {
        let builtin = name == BLOCK_RENDERER || name == BLOCK_RENDERER_ALIAS;
        if builtin && !self.renderers.contains(name) {
            return Compiler::new(&self.options, &self.blocks).resolve_blocks(code, &self.context);
        }
        self.renderers.render_with(name, code)
    }

    /// A copy of the renderer registry
    pub fn custom_renderers(&self) -> HashMap<String, Renderer> {
        self.renderers.snapshot()
    }

    pub fn remove_renderer(&mut self, name: &str) -> Option<Renderer> {
        self.renderers.remove(name)
    }

    pub fn has_renderer(&self, name: &str) -> bool {
        self.renderers.contains(name)
    }

    /// Registers a block handler, replacing any previous one with the same name
    pub fn add_block<F>(&mut self, name: impl Into<String>, handler: F)
    where
        F: Fn(&str, &Attributes, &Context) -> String + Send + Sync + 'static,
    {
        self.blocks.add(name, handler);
    }

    pub fn remove_block(&mut self, name: &str) -> bool {
        self.blocks.remove(name).is_some()
    }

    pub fn has_block(&self, name: &str) -> bool {
        self.blocks.contains(name)
    }
}
