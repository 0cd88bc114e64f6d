//! Error handling for the view engine
//!
//! Every fallible operation returns [`Result`]. Compile errors carry a short
//! excerpt of the template around the failure so they can be located without
//! a line/column map.

use thiserror::Error;

/// Errors raised while compiling, resolving or rendering templates.
#[derive(Error, Debug)]
pub enum Error {
    /// A directive is structurally broken: unbalanced `if`/`/if` or
    /// `block`/`/block`, an unterminated `{{`, or a missing expression.
    #[error("{message} near \"{near}\"")]
    MalformedDirective {
        /// What went wrong
        message: String,
        /// Template excerpt around the failure
        near: String,
    },

    /// No renderer is registered under this name.
    #[error("unknown renderer: {0}")]
    UnknownRenderer(String),

    /// A block directive names a block with no registered handler.
    #[error("unknown block: {0}")]
    UnknownBlock(String),

    /// The template source has nothing under this name.
    #[error("template not found: {0}")]
    TemplateNotFound(String),

    /// The engine was asked to load a template but has no source.
    #[error("no template source configured")]
    NoTemplateSource,

    /// The engine was asked to compile the active layout or view but none is set.
    #[error("no active {0} selected")]
    NoActiveTemplate(&'static str),

    /// I/O failure while reading a template.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Failure while walking a template directory.
    #[error("directory walk failed: {0}")]
    Walk(#[from] walkdir::Error),

    /// Configuration could not be parsed.
    #[error("invalid configuration: {0}")]
    Config(#[from] serde_json::Error),
}

/// Result type for view engine operations
pub type Result<T> = std::result::Result<T, Error>;

/// Returns at most the first 32 bytes of a string for error context
pub(crate) fn cap(src: &str) -> &str {
    static CAP_AT: usize = 32;

    if src.len() > CAP_AT {
        let mut end = CAP_AT;
        while !src.is_char_boundary(end) {
            end -= 1;
        }
        &src[..end]
    } else {
        src
    }
}

impl Error {
    pub(crate) fn malformed(message: impl Into<String>, near: &str) -> Self {
        Self::MalformedDirective {
            message: message.into(),
            near: cap(near).to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn malformed_display_includes_context() {
        let error = Error::malformed("unclosed block", "{{ if $x }}abc");
        assert_eq!(error.to_string(), "unclosed block near \"{{ if $x }}abc\"");
    }

    #[test]
    fn context_is_capped_on_char_boundary() {
        let long = "é".repeat(40);
        let capped = cap(&long);
        assert!(capped.len() <= 32);
        assert!(capped.chars().all(|c| c == 'é'));
    }

    #[test]
    fn unknown_renderer_display() {
        let error = Error::UnknownRenderer("pdf".to_string());
        assert_eq!(error.to_string(), "unknown renderer: pdf");
    }

    #[test]
    fn error_is_send_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<Error>();
    }
}
