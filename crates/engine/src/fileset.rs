//! The set of files a pipeline run operates on
//!
//! Content is read once when the set is built. Fixers replace content through
//! [`FileSet::replace`], which writes to the working tree immediately so that
//! external tools and later hooks observe the result.

use hookgate_core::{Error, RelPath, Result};
use indexmap::IndexMap;
use std::fs;
use std::path::{Path, PathBuf};

/// Bytes inspected when deciding whether a file is text
const BINARY_SNIFF_LEN: usize = 8000;

/// A borrowed view of one file
#[derive(Debug, Clone, Copy)]
pub struct FileRef<'a> {
    /// Repository-relative path
    pub path: &'a RelPath,
    /// Current content
    pub content: &'a [u8],
}

impl FileRef<'_> {
    /// A file is binary when a NUL byte appears near its start
    #[must_use]
    pub fn is_binary(&self) -> bool {
        let end = self.content.len().min(BINARY_SNIFF_LEN);
        self.content[..end].contains(&0)
    }
}

#[derive(Debug, Clone)]
struct TrackedFile {
    original: Vec<u8>,
    current: Vec<u8>,
}

/// Files under consideration for one commit attempt
#[derive(Debug)]
pub struct FileSet {
    root: PathBuf,
    files: IndexMap<RelPath, TrackedFile>,
    generation: u64,
}

impl FileSet {
    /// An empty set rooted at `root`
    #[must_use]
    pub fn empty(root: &Path) -> Self {
        Self {
            root: root.to_path_buf(),
            files: IndexMap::new(),
            generation: 0,
        }
    }

    /// Read the given repository paths from the working tree
    ///
    /// Only regular files are kept. Deleted paths, submodules and symlinks are
    /// skipped; a symlink is never followed, so no hook can write to its target.
    ///
    /// # Errors
    ///
    /// Returns an error if an existing file cannot be read.
    pub fn load<I>(root: &Path, paths: I) -> Result<Self>
    where
        I: IntoIterator<Item = RelPath>,
    {
        let mut set = Self::empty(root);

        for path in paths {
            let on_disk = root.join(path.as_path());
            match fs::symlink_metadata(&on_disk) {
                Ok(meta) if meta.is_file() => {}
                Ok(meta) => {
                    tracing::debug!(
                        path = %path,
                        symlink = meta.file_type().is_symlink(),
                        "Skipping non-regular file"
                    );
                    continue;
                }
                Err(_) => {
                    tracing::debug!(path = %path, "Skipping missing file");
                    continue;
                }
            }

            let content = fs::read(&on_disk).map_err(|source| Error::FileRead {
                path: on_disk.clone(),
                source,
            })?;

            set.files.insert(
                path,
                TrackedFile {
                    original: content.clone(),
                    current: content,
                },
            );
        }

        set.files.sort_keys();
        tracing::debug!(files = set.files.len(), "Loaded file set");
        Ok(set)
    }

    /// Repository root all paths are relative to
    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Number of files in the set
    #[must_use]
    pub fn len(&self) -> usize {
        self.files.len()
    }

    /// Whether the set holds no files
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }

    /// Whether `path` is part of the set
    #[must_use]
    pub fn contains(&self, path: &RelPath) -> bool {
        self.files.contains_key(path)
    }

    /// Paths in sorted order
    pub fn paths(&self) -> impl Iterator<Item = &RelPath> {
        self.files.keys()
    }

    /// Current view of one file
    #[must_use]
    pub fn get(&self, path: &RelPath) -> Option<FileRef<'_>> {
        self.files.get_key_value(path).map(|(path, file)| FileRef {
            path,
            content: &file.current,
        })
    }

    /// Current view of every file
    pub fn iter(&self) -> impl Iterator<Item = FileRef<'_>> {
        self.files.iter().map(|(path, file)| FileRef {
            path,
            content: &file.current,
        })
    }

    /// Counter bumped on every content change
    ///
    /// Equal generations guarantee identical content.
    #[must_use]
    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Replace the content of a file, writing it to the working tree
    ///
    /// Returns `false` (and writes nothing) when the content is unchanged.
    ///
    /// # Errors
    ///
    /// Returns an error if the path is not part of the set or the write fails.
    pub fn replace(&mut self, path: &RelPath, content: Vec<u8>) -> Result<bool> {
        let on_disk = self.root.join(path.as_path());
        let file = self
            .files
            .get_mut(path)
            .ok_or_else(|| Error::Message(format!("{path} is not part of this run")))?;

        if file.current == content {
            return Ok(false);
        }

        fs::write(&on_disk, &content).map_err(|source| Error::FileWrite {
            path: on_disk,
            source,
        })?;

        file.current = content;
        self.generation += 1;
        Ok(true)
    }

    /// Re-read a file after an external tool had the chance to modify it
    ///
    /// Returns whether the content changed.
    ///
    /// # Errors
    ///
    /// Returns an error if the path is not part of the set or cannot be read.
    pub fn refresh(&mut self, path: &RelPath) -> Result<bool> {
        let on_disk = self.root.join(path.as_path());
        let file = self
            .files
            .get_mut(path)
            .ok_or_else(|| Error::Message(format!("{path} is not part of this run")))?;

        // A tool deleting a file counts as a change to empty content
        let content = match fs::read(&on_disk) {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Vec::new(),
            Err(source) => {
                return Err(Error::FileRead {
                    path: on_disk,
                    source,
                });
            }
        };

        if file.current == content {
            return Ok(false);
        }

        file.current = content;
        self.generation += 1;
        Ok(true)
    }

    /// Files whose content differs from what was read at load time
    ///
    /// Yields `(path, original, current)`.
    pub fn changed(&self) -> impl Iterator<Item = (&RelPath, &[u8], &[u8])> {
        self.files
            .iter()
            .filter(|(_, file)| file.original != file.current)
            .map(|(path, file)| (path, file.original.as_slice(), file.current.as_slice()))
    }
}
