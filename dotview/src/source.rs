//! Template sources
//!
//! The engine never touches the filesystem directly. It reads templates by
//! name through a [`TemplateSource`].

use std::collections::HashMap;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use tracing::debug;
use walkdir::WalkDir;

use crate::error::{Error, Result};

/// Extensions tried, in order, when a name has none
pub const TEMPLATE_EXTENSIONS: &[&str] = &[".html", ".htm", ".tpl", ".view"];

/// Reads templates by name
pub trait TemplateSource: Send + Sync {
    /// Returns the text of the template called `name`
    fn read(&self, name: &str) -> Result<String>;

    /// Lists every template name, sorted
    fn names(&self) -> Result<Vec<String>>;
}

/// Templates held in memory
#[derive(Debug, Clone, Default)]
pub struct MemorySource {
    templates: HashMap<String, String>,
}

impl MemorySource {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds or replaces a template
    pub fn insert(&mut self, name: impl Into<String>, text: impl Into<String>) {
        self.templates.insert(name.into(), text.into());
    }

    pub fn with(mut self, name: impl Into<String>, text: impl Into<String>) -> Self {
        self.insert(name, text);
        self
    }
}

impl TemplateSource for MemorySource {
    fn read(&self, name: &str) -> Result<String> {
        self.templates
            .get(name)
            .cloned()
            .ok_or_else(|| Error::TemplateNotFound(name.to_string()))
    }

    fn names(&self) -> Result<Vec<String>> {
        let mut names: Vec<_> = self.templates.keys().cloned().collect();
        names.sort();
        Ok(names)
    }
}

/// Templates in a directory tree
///
/// `read("pages/home")` finds `pages/home.html` (or `.htm`, `.tpl`,
/// `.view`); `read("pages/home.html")` finds the same file directly.
#[derive(Debug, Clone)]
pub struct DirectorySource {
    root: PathBuf,
}

fn is_template(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| TEMPLATE_EXTENSIONS.iter().any(|known| known[1..] == *ext))
}

impl DirectorySource {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn candidates(&self, name: &str) -> Vec<PathBuf> {
        let mut paths = vec![self.root.join(name)];
        paths.extend(
            TEMPLATE_EXTENSIONS
                .iter()
                .map(|ext| self.root.join(format!("{name}{ext}"))),
        );
        paths
    }
}

impl TemplateSource for DirectorySource {
    fn read(&self, name: &str) -> Result<String> {
        let escapes_root = Path::new(name)
            .components()
            .any(|c| !matches!(c, std::path::Component::Normal(_)));
        if name.is_empty() || escapes_root {
            return Err(Error::TemplateNotFound(name.to_string()));
        }
        for path in self.candidates(name) {
            match fs::read_to_string(&path) {
                Ok(text) => {
                    debug!(path = %path.display(), "read template");
                    return Ok(text);
                }
                Err(e) if e.kind() == io::ErrorKind::NotFound => continue,
                Err(e) if path.is_dir() => {
                    debug!(path = %path.display(), error = %e, "skipping directory");
                    continue;
                }
                Err(e) => return Err(e.into()),
            }
        }
        Err(Error::TemplateNotFound(name.to_string()))
    }

    fn names(&self) -> Result<Vec<String>> {
        let mut names = Vec::new();
        for entry in WalkDir::new(&self.root) {
            let entry = entry?;
            let path = entry.path();
            if !entry.file_type().is_file() || !is_template(path) {
                continue;
            }
            let Ok(relative) = path.strip_prefix(&self.root) else {
                continue;
            };
            let name = relative
                .with_extension("")
                .components()
                .map(|c| c.as_os_str().to_string_lossy())
                .collect::<Vec<_>>()
                .join("/");
            names.push(name);
        }
        names.sort();
        Ok(names)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn write(root: &Path, name: &str, text: &str) {
        let path = root.join(name);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).unwrap();
        }
        fs::write(path, text).unwrap();
    }

    #[test]
    fn memory_source() {
        let source = MemorySource::new().with("b", "B").with("a", "A");
        assert_eq!(source.read("a").unwrap(), "A");
        assert_eq!(source.names().unwrap(), vec!["a", "b"]);
        assert!(matches!(source.read("c"), Err(Error::TemplateNotFound(name)) if name == "c"));
    }

    #[test]
    fn directory_read_with_and_without_extension() {
        let dir = tempfile::tempdir().unwrap();
        write(dir.path(), "home.html", "<p>home</p>");
        write(dir.path(), "pages/about.tpl", "<p>about</p>");
        let source = DirectorySource::new(dir.path());

        assert_eq!(source.read("home").unwrap(), "<p>home</p>");
        assert_eq!(source.read("home.html").unwrap(), "<p>home</p>");
        assert_eq!(source.read("pages/about").unwrap(), "<p>about</p>");
        assert!(matches!(source.read("missing"), Err(Error::TemplateNotFound(_))));
    }

    #[test]
    fn directory_names() {
        let dir = tempfile::tempdir().unwrap();
        write(dir.path(), "layout.html", "");
        write(dir.path(), "pages/home.view", "");
        write(dir.path(), "pages/notes.txt", "");
        let source = DirectorySource::new(dir.path());
        assert_eq!(source.names().unwrap(), vec!["layout", "pages/home"]);
    }

    #[test]
    fn parent_paths_are_rejected() {
        let dir = tempfile::tempdir().unwrap();
        write(dir.path(), "inner/a.html", "a");
        let source = DirectorySource::new(dir.path().join("inner"));
        assert_eq!(source.read("a").unwrap(), "a");
        assert!(matches!(source.read("../inner/a"), Err(Error::TemplateNotFound(_))));
        assert!(matches!(source.read(""), Err(Error::TemplateNotFound(_))));
    }

    #[test]
    fn directory_name_is_not_a_template() {
        let dir = tempfile::tempdir().unwrap();
        write(dir.path(), "pages/index.html", "index");
        let source = DirectorySource::new(dir.path());
        assert!(matches!(source.read("pages"), Err(Error::TemplateNotFound(_))));
    }
}
