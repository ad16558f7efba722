//! Working-tree and repository paths
//!
//! Hooks see files through two lenses. [`AbsPath`] is where a file lives on
//! disk; [`RelPath`] is how git names it, relative to the repository root and
//! always rendered with `/`.
//!
//! ```
//! use hookgate_core::path::{AbsPath, RelPath};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let root = AbsPath::new("/work/repo".into())?;
//! let file = RelPath::from_slash("src/main.py")?;
//! assert_eq!(root.join(&file), std::path::Path::new("/work/repo/src/main.py"));
//! # Ok(())
//! # }
//! ```

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Component, Path, PathBuf};

/// A location on disk, always absolute
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "PathBuf", into = "PathBuf")]
pub struct AbsPath(PathBuf);

impl AbsPath {
    /// Wrap `path`, rejecting relative input
    ///
    /// # Errors
    ///
    /// Returns [`Error::PathNotAbsolute`] for a relative path.
    pub fn new(path: PathBuf) -> Result<Self> {
        if !path.is_absolute() {
            return Err(Error::PathNotAbsolute { path });
        }
        Ok(Self(path))
    }

    pub fn as_path(&self) -> &Path {
        &self.0
    }

    /// On-disk location of a repository path below this directory
    pub fn join(&self, rel: &RelPath) -> PathBuf {
        self.0.join(&rel.0)
    }

    /// Name this path relative to `root`
    ///
    /// ```
    /// use hookgate_core::path::AbsPath;
    ///
    /// # fn main() -> Result<(), Box<dyn std::error::Error>> {
    /// let root = AbsPath::new("/work/repo".into())?;
    /// let cfg = AbsPath::new("/work/repo/setup.cfg".into())?;
    /// assert_eq!(cfg.relative_to(&root)?.to_slash(), "setup.cfg");
    /// # Ok(())
    /// # }
    /// ```
    ///
    /// # Errors
    ///
    /// Returns [`Error::OutsideRoot`] when the path does not live below `root`.
    pub fn relative_to(&self, root: &AbsPath) -> Result<RelPath> {
        match self.0.strip_prefix(&root.0) {
            Ok(rest) => Ok(RelPath(rest.to_path_buf())),
            Err(_) => Err(Error::OutsideRoot {
                path: self.0.clone(),
                root: root.0.clone(),
            }),
        }
    }
}

impl TryFrom<PathBuf> for AbsPath {
    type Error = Error;

    fn try_from(path: PathBuf) -> Result<Self> {
        Self::new(path)
    }
}

impl From<AbsPath> for PathBuf {
    fn from(path: AbsPath) -> Self {
        path.0
    }
}

impl fmt::Display for AbsPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.display())
    }
}

/// A file as git names it, relative to the repository root
///
/// Sorting compares component by component, which is the order `git ls-files`
/// prints.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct RelPath(PathBuf);

impl RelPath {
    /// # Errors
    ///
    /// Returns [`Error::PathNotRelative`] for an absolute path.
    pub fn new(path: PathBuf) -> Result<Self> {
        if path.has_root() || path.is_absolute() {
            return Err(Error::PathNotRelative { path });
        }
        Ok(Self(path))
    }

    /// Parse an index entry name such as `docs/index.md`
    ///
    /// # Errors
    ///
    /// Returns [`Error::PathNotRelative`] when the name starts at the root.
    pub fn from_slash(name: &str) -> Result<Self> {
        Self::new(name.split('/').collect())
    }

    pub fn as_path(&self) -> &Path {
        &self.0
    }

    /// Containing directory, `None` at the top of the repository
    pub fn parent(&self) -> Option<Self> {
        let dir = self.0.parent()?;
        if dir.as_os_str().is_empty() {
            None
        } else {
            Some(Self(dir.to_path_buf()))
        }
    }

    pub fn file_name(&self) -> Option<&str> {
        self.0.file_name()?.to_str()
    }

    /// Extension in lower case, so `INFO.JSON` and `info.json` match alike
    pub fn extension(&self) -> Option<String> {
        let ext = self.0.extension()?.to_str()?;
        Some(ext.to_ascii_lowercase())
    }

    /// `/`-joined form used by file filters and reports
    pub fn to_slash(&self) -> String {
        let mut out = String::new();
        for component in self.0.components() {
            if let Component::Normal(part) = component {
                if !out.is_empty() {
                    out.push('/');
                }
                out.push_str(&part.to_string_lossy());
            }
        }
        out
    }
}

impl fmt::Display for RelPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_slash())
    }
}
