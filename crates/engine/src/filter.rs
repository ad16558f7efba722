//! File selection for hooks
//!
//! A hook sees a file when the `files` regex matches its `/`-separated path,
//! the `exclude` regex does not, and every required type tag is present.

use crate::fileset::FileRef;
use hookgate_config::PipelineConfig;
use hookgate_core::{Error, Result};
use regex::Regex;
use std::collections::BTreeSet;

/// Tags derived from the file name extension
const EXTENSION_TAGS: &[(&str, &[&str])] = &[
    ("python", &["py", "pyi", "pyw"]),
    ("json", &["json"]),
    ("toml", &["toml"]),
    ("yaml", &["yaml", "yml"]),
    ("markdown", &["md", "markdown"]),
    ("shell", &["sh", "bash"]),
    ("rust", &["rs"]),
];

/// Tags derived from the content rather than the name
const CONTENT_TAGS: &[&str] = &["file", "text", "binary"];

/// Whether `tag` is a type this filter understands
#[must_use]
pub fn is_known_tag(tag: &str) -> bool {
    CONTENT_TAGS.contains(&tag) || EXTENSION_TAGS.iter().any(|(name, _)| *name == tag)
}

/// All tags that apply to a file
#[must_use]
pub fn tags_for(file: FileRef<'_>) -> BTreeSet<&'static str> {
    let mut tags = BTreeSet::from(["file"]);
    tags.insert(if file.is_binary() { "binary" } else { "text" });

    if let Some(ext) = file.path.extension() {
        for (tag, extensions) in EXTENSION_TAGS {
            if extensions.contains(&ext.as_str()) {
                tags.insert(*tag);
            }
        }
    }

    tags
}

/// Include/exclude regexes plus required type tags
#[derive(Debug, Clone, Default)]
pub struct FileFilter {
    files: Option<Regex>,
    exclude: Option<Regex>,
    types: Vec<String>,
}

impl FileFilter {
    /// Build a filter
    ///
    /// # Errors
    ///
    /// Returns an error if a regex does not compile or a type tag is unknown.
    pub fn new(files: Option<&str>, exclude: Option<&str>, types: &[String]) -> Result<Self> {
        for tag in types {
            if !is_known_tag(tag) {
                return Err(Error::Config(format!("Unknown file type '{tag}'")));
            }
        }

        Ok(Self {
            files: compile(files)?,
            exclude: compile(exclude)?,
            types: types.to_vec(),
        })
    }

    /// The top-level `files`/`exclude` filter of a configuration
    ///
    /// # Errors
    ///
    /// Returns an error if a regex does not compile.
    pub fn global(config: &PipelineConfig) -> Result<Self> {
        Self::new(config.files.as_deref(), config.exclude.as_deref(), &[])
    }

    /// Required type tags
    #[must_use]
    pub fn types(&self) -> &[String] {
        &self.types
    }

    /// Whether the file passes this filter
    #[must_use]
    pub fn matches(&self, file: FileRef<'_>) -> bool {
        let path = file.path.to_slash();

        if let Some(files) = &self.files
            && !files.is_match(&path)
        {
            return false;
        }
        if let Some(exclude) = &self.exclude
            && exclude.is_match(&path)
        {
            return false;
        }
        if self.types.is_empty() {
            return true;
        }

        let tags = tags_for(file);
        self.types.iter().all(|t| tags.contains(t.as_str()))
    }
}

fn compile(pattern: Option<&str>) -> Result<Option<Regex>> {
    pattern
        .filter(|p| !p.is_empty())
        .map(|p| Regex::new(p).map_err(|e| Error::Config(format!("Invalid regex '{p}': {e}"))))
        .transpose()
}
