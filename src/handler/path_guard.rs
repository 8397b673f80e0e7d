//! Path containment check for CGI programs.

use std::io;
use std::path::{Path, PathBuf};

/// Decides whether a path may be used to launch a program.
///
/// A path is accepted iff it contains no `..`, resolves (symlinks included)
/// and its canonical form lies inside the canonical server root.
#[derive(Debug, Clone)]
pub struct PathGuard {
    root: PathBuf,
}

impl PathGuard {
    /// Canonicalizes `root` once up front.
    pub fn new(root: impl AsRef<Path>) -> io::Result<Self> {
        Ok(Self {
            root: root.as_ref().canonicalize()?,
        })
    }

    pub fn validate(&self, path: &Path) -> bool {
        if path.to_string_lossy().contains("..") {
            return false;
        }

        match path.canonicalize() {
            Ok(resolved) => resolved.starts_with(&self.root),
            Err(e) => {
                tracing::debug!(path = %path.display(), error = %e, "Path does not resolve");
                false
            }
        }
    }
}
