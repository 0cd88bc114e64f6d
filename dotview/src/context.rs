//! Render context
//!
//! Two independent variable bags: one for the layout and one for the view.
//! A lookup in one never falls back to the other.

use std::collections::HashMap;

use serde::Serialize;
use serde_json::Value;

/// Layout and view variables visible while a template is compiled
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Context {
    layout: HashMap<String, Value>,
    view: HashMap<String, Value>,
}

impl Context {
    /// Creates an empty context
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets a layout variable, replacing any previous value
    pub fn set_layout_var(&mut self, key: impl Into<String>, value: impl Into<Value>) {
        self.layout.insert(key.into(), value.into());
    }

    /// Reads a layout variable
    pub fn layout_var(&self, key: &str) -> Option<&Value> {
        self.layout.get(key)
    }

    /// Sets a view variable, replacing any previous value
    pub fn set_view_var(&mut self, key: impl Into<String>, value: impl Into<Value>) {
        self.view.insert(key.into(), value.into());
    }

    /// Reads a view variable
    pub fn view_var(&self, key: &str) -> Option<&Value> {
        self.view.get(key)
    }

    pub fn layout_vars(&self) -> &HashMap<String, Value> {
        &self.layout
    }

    pub fn view_vars(&self) -> &HashMap<String, Value> {
        &self.view
    }

    /// Drops every variable, e.g. at the end of a request
    pub fn clear(&mut self) {
        self.layout.clear();
        self.view.clear();
    }
}
