//! File discovery
//!
//! Determines which files a run looks at. Inside a git repository the index is
//! the source of truth (staged changes, or every tracked file); outside of one
//! the working directory is walked.

use hookgate_core::{Error, RelPath, Result};
use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

/// Helper function to convert git2 errors to `hookgate_core` errors
#[inline]
#[allow(clippy::needless_pass_by_value)]
fn git_err(e: git2::Error) -> Error {
    Error::Git(e.message().to_string())
}

/// Source of candidate file paths
pub trait FileProvider {
    /// Files added, modified, renamed or copied in the index relative to `HEAD`
    ///
    /// # Errors
    ///
    /// Returns an error if the index or `HEAD` cannot be read.
    fn staged(&self) -> Result<Vec<RelPath>>;

    /// Every file known to the repository
    ///
    /// # Errors
    ///
    /// Returns an error if the listing fails.
    fn tracked(&self) -> Result<Vec<RelPath>>;

    /// Tracked files whose working-tree content differs from the index
    ///
    /// Hooks read the working tree, so for these files they do not see what
    /// will be committed.
    ///
    /// # Errors
    ///
    /// Returns an error if the comparison fails.
    fn unstaged(&self) -> Result<Vec<RelPath>> {
        Ok(Vec::new())
    }
}

/// Find the working tree root containing `start`
///
/// # Errors
///
/// Returns an error if `start` is not inside a git working tree.
pub fn discover_root(start: &Path) -> Result<PathBuf> {
    let repo = git2::Repository::discover(start).map_err(git_err)?;
    repo.workdir()
        .map(Path::to_path_buf)
        .ok_or_else(|| Error::Git("bare repositories have no working tree".to_string()))
}

/// Location of the repository's hooks directory
///
/// Honors `core.hooksPath` when configured.
///
/// # Errors
///
/// Returns an error if `root` is not a git repository.
pub fn hooks_dir(root: &Path) -> Result<PathBuf> {
    let repo = git2::Repository::open(root).map_err(git_err)?;

    if let Ok(config) = repo.config()
        && let Ok(custom) = config.get_path("core.hooksPath")
    {
        return Ok(if custom.is_absolute() {
            custom
        } else {
            root.join(custom)
        });
    }

    Ok(repo.path().join("hooks"))
}

/// Provider backed by the git index, using git2 (libgit2)
pub struct GitIndex {
    repo: git2::Repository,
}

impl GitIndex {
    /// Open the repository at `root`
    ///
    /// # Errors
    ///
    /// Returns an error if `root` is not a git repository.
    pub fn open(root: &Path) -> Result<Self> {
        let repo = git2::Repository::open(root).map_err(git_err)?;
        Ok(Self { repo })
    }

    fn head_tree(&self) -> Result<Option<git2::Tree<'_>>> {
        match self.repo.head() {
            Ok(head) => head.peel_to_tree().map(Some).map_err(git_err),
            // Initial commit: everything in the index is staged
            Err(e)
                if e.code() == git2::ErrorCode::UnbornBranch
                    || e.code() == git2::ErrorCode::NotFound =>
            {
                Ok(None)
            }
            Err(e) => Err(git_err(e)),
        }
    }
}

impl FileProvider for GitIndex {
    fn staged(&self) -> Result<Vec<RelPath>> {
        let index = self.repo.index().map_err(git_err)?;
        let tree = self.head_tree()?;
        let diff = self
            .repo
            .diff_tree_to_index(tree.as_ref(), Some(&index), None)
            .map_err(git_err)?;

        let mut paths = BTreeSet::new();
        for delta in diff.deltas() {
            if delta.status() == git2::Delta::Deleted {
                continue;
            }
            if let Some(path) = delta.new_file().path() {
                paths.insert(RelPath::new(path.to_path_buf())?);
            }
        }

        tracing::debug!(count = paths.len(), "Collected staged files");
        Ok(paths.into_iter().collect())
    }

    fn tracked(&self) -> Result<Vec<RelPath>> {
        let index = self.repo.index().map_err(git_err)?;

        // Conflicted entries appear once per stage
        let paths: BTreeSet<RelPath> = index
            .iter()
            .map(|entry| RelPath::from_slash(&String::from_utf8_lossy(&entry.path)))
            .collect::<Result<_>>()?;

        tracing::debug!(count = paths.len(), "Collected tracked files");
        Ok(paths.into_iter().collect())
    }

    fn unstaged(&self) -> Result<Vec<RelPath>> {
        let index = self.repo.index().map_err(git_err)?;
        let diff = self
            .repo
            .diff_index_to_workdir(Some(&index), None)
            .map_err(git_err)?;

        let mut paths = BTreeSet::new();
        for delta in diff.deltas() {
            if let Some(path) = delta.old_file().path() {
                paths.insert(RelPath::new(path.to_path_buf())?);
            }
        }
        Ok(paths.into_iter().collect())
    }
}

/// Provider for directories that are not git repositories
///
/// Both listings return every regular file below the root, skipping `.git`.
pub struct DirectoryWalk {
    root: PathBuf,
}

impl DirectoryWalk {
    /// Walk files below `root`
    #[must_use]
    pub fn new(root: &Path) -> Self {
        Self {
            root: root.to_path_buf(),
        }
    }
}

impl FileProvider for DirectoryWalk {
    fn staged(&self) -> Result<Vec<RelPath>> {
        self.tracked()
    }

    fn tracked(&self) -> Result<Vec<RelPath>> {
        let mut paths = Vec::new();

        for entry in walkdir::WalkDir::new(&self.root)
            .sort_by_file_name()
            .into_iter()
            .filter_entry(|e| e.file_name() != ".git")
        {
            let entry = entry.map_err(|e| Error::Message(format!("Failed to walk directory: {e}")))?;
            if !entry.file_type().is_file() {
                continue;
            }
            if let Ok(relative) = entry.path().strip_prefix(&self.root) {
                paths.push(RelPath::new(relative.to_path_buf())?);
            }
        }

        paths.sort();
        Ok(paths)
    }
}

/// Pick the provider for `root`: the git index when available, a directory walk otherwise
#[must_use]
pub fn provider_for(root: &Path) -> Box<dyn FileProvider> {
    match GitIndex::open(root) {
        Ok(index) => Box::new(index),
        Err(e) => {
            tracing::debug!(error = %e, "Not a git repository, walking the directory instead");
            Box::new(DirectoryWalk::new(root))
        }
    }
}
