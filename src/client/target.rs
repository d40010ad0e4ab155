//! Where a search is sent, and whether it can be sent there at all.

use crate::document_model::{DocumentTree, markup};
use crate::error::{Error, Result};
use std::fs;
use std::path::Path;

/// Location prefixes of privileged pages that refuse injection.
pub const RESTRICTED_SCHEMES: &[&str] = &["chrome://", "chrome-extension://", "edge://", "about:"];

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Target {
    location: String,
}

impl Target {
    pub fn new(location: impl Into<String>) -> Self {
        Self {
            location: location.into(),
        }
    }

    pub fn location(&self) -> &str {
        &self.location
    }

    pub fn is_restricted(&self) -> bool {
        RESTRICTED_SCHEMES
            .iter()
            .any(|scheme| self.location.starts_with(scheme))
    }

    /// Fail with `RestrictedContext` for privileged locations.
    pub fn check_access(&self) -> Result<()> {
        if self.is_restricted() {
            return Err(Error::RestrictedContext(self.location.clone()));
        }
        Ok(())
    }

    /// Read and parse the document behind this target.
    pub fn load(&self) -> Result<DocumentTree> {
        self.check_access()?;
        let path = self
            .location
            .strip_prefix("file://")
            .unwrap_or(&self.location);
        let source = fs::read_to_string(Path::new(path))
            .map_err(|e| Error::Connection(format!("{}: {e}", self.location)))?;
        Ok(markup::parse(&source))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_restricted_schemes() {
        assert!(Target::new("chrome://settings").is_restricted());
        assert!(Target::new("about:blank").is_restricted());
        assert!(!Target::new("page.html").is_restricted());
        assert!(matches!(
            Target::new("chrome-extension://abc/popup.html").load(),
            Err(Error::RestrictedContext(_))
        ));
    }

    #[test]
    fn test_missing_file_is_connection_error() {
        let err = Target::new("/definitely/not/here.html").load().unwrap_err();
        assert!(matches!(err, Error::Connection(_)));
    }

    #[test]
    fn test_load_file_and_file_scheme() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "<p>hello</p>").unwrap();
        let path = file.path().display().to_string();

        let tree = Target::new(path.clone()).load().unwrap();
        assert_eq!(tree.text_content(tree.root()), "hello");

        let tree = Target::new(format!("file://{path}")).load().unwrap();
        assert_eq!(tree.text_content(tree.root()), "hello");
    }
}
