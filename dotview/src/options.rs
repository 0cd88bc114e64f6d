//! Engine configuration

use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::minify::Dialect;

/// What to do with a block directive whose name has no handler
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum BlockPolicy {
    /// Fail the compile with [`Error::UnknownBlock`](crate::Error::UnknownBlock)
    #[default]
    Fail,
    /// Keep the directive text around the rendered inner content
    Verbatim,
}

/// Engine options
///
/// All fields have defaults, so a JSON config only needs the keys it changes:
///
/// ```rust
/// use dotview::{BlockPolicy, Options};
///
/// let options = Options::from_json(r#"{ "translator": "t", "unknown_blocks": "verbatim" }"#).unwrap();
/// assert_eq!(options.translator, "t");
/// assert_eq!(options.unknown_blocks, BlockPolicy::Verbatim);
/// assert!(options.escape);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct Options {
    /// Name of the translation function emitted for `{{_ "..." }}`
    pub translator: String,
    /// Run the escape filter before compiling in [`Engine::render`](crate::Engine::render)
    pub escape: bool,
    /// Minify rendered output as this dialect
    pub minify: Option<Dialect>,
    /// Unknown block handling
    pub unknown_blocks: BlockPolicy,
}

impl Default for Options {
    fn default() -> Self {
        Self {
            translator: "translate".to_string(),
            escape: true,
            minify: None,
            unknown_blocks: BlockPolicy::Fail,
        }
    }
}

impl Options {
    /// Parses options from a JSON document
    pub fn from_json(src: &str) -> Result<Self> {
        Ok(serde_json::from_str(src)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Error;

    #[test]
    fn empty_config_is_default() {
        assert_eq!(Options::from_json("{}").unwrap(), Options::default());
    }

    #[test]
    fn minify_dialect() {
        let options = Options::from_json(r#"{ "minify": "html", "escape": false }"#).unwrap();
        assert_eq!(options.minify, Some(Dialect::Html));
        assert!(!options.escape);
    }

    #[test]
    fn unknown_keys_are_rejected() {
        assert!(matches!(
            Options::from_json(r#"{ "minfy": "html" }"#),
            Err(Error::Config(_))
        ));
    }
}
