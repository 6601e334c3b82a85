//! Decides which files the transform applies to.
//!
//! A path is selected when it matches at least one include pattern and no
//! exclude pattern. Patterns that start with `*` or are absolute are used as
//! written; other relative patterns (such as `./src/shaders/*.glsl`) are
//! resolved against the selector root, as are relative candidate paths.

use globset::{Glob, GlobBuilder, GlobSet, GlobSetBuilder};
use serde::{Deserialize, Serialize};
use std::path::{Component, Path, PathBuf};
use thiserror::Error;

/// Shader extensions selected when no include patterns are configured.
pub const DEFAULT_INCLUDE: &[&str] = &[
    "**/*.vs",
    "**/*.fs",
    "**/*.vert",
    "**/*.frag",
    "**/*.glsl",
    "**/*.glslx",
];

#[derive(Error, Debug)]
pub enum SelectorError {
    #[error("Invalid glob pattern '{pattern}'")]
    InvalidPattern {
        pattern: String,
        #[source]
        source: globset::Error,
    },
}

/// One glob pattern or a list of them. Deserializes from either form.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "OneOrMany", into = "Vec<String>")]
pub struct Patterns(pub Vec<String>);

#[derive(Deserialize)]
#[serde(untagged)]
enum OneOrMany {
    One(String),
    Many(Vec<String>),
}

impl From<OneOrMany> for Patterns {
    fn from(value: OneOrMany) -> Self {
        match value {
            OneOrMany::One(pattern) => Self(vec![pattern]),
            OneOrMany::Many(patterns) => Self(patterns),
        }
    }
}

impl From<Patterns> for Vec<String> {
    fn from(value: Patterns) -> Self {
        value.0
    }
}

impl Patterns {
    /// The default shader extension patterns.
    pub fn default_include() -> Self {
        Self(DEFAULT_INCLUDE.iter().map(|p| (*p).to_owned()).collect())
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(String::as_str)
    }
}

impl<S: Into<String>> FromIterator<S> for Patterns {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        Self(iter.into_iter().map(Into::into).collect())
    }
}

/// Include/exclude filter over file paths.
#[derive(Debug, Clone)]
pub struct FileSelector {
    root: PathBuf,
    include: Option<GlobSet>,
    exclude: Option<GlobSet>,
}

impl FileSelector {
    /// Builds a selector. `root` should be absolute; it anchors relative
    /// patterns and relative candidate paths.
    ///
    /// An empty include list selects every path that is not excluded.
    pub fn new(
        root: impl Into<PathBuf>,
        include: &Patterns,
        exclude: &Patterns,
    ) -> Result<Self, SelectorError> {
        let root = root.into();
        let include = compile(&root, include)?;
        let exclude = compile(&root, exclude)?;
        Ok(Self {
            root,
            include,
            exclude,
        })
    }

    /// Selector with the default shader extensions, no excludes, rooted at `root`.
    pub fn with_defaults(root: impl Into<PathBuf>) -> Result<Self, SelectorError> {
        Self::new(root, &Patterns::default_include(), &Patterns::default())
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Whether `path` is in scope. Pure and total.
    pub fn should_transform(&self, path: &Path) -> bool {
        let candidate = normalize(&self.root, path);
        let included = self
            .include
            .as_ref()
            .map_or(true, |set| set.is_match(&candidate));
        let excluded = self
            .exclude
            .as_ref()
            .is_some_and(|set| set.is_match(&candidate));
        included && !excluded
    }
}

fn compile(root: &Path, patterns: &Patterns) -> Result<Option<GlobSet>, SelectorError> {
    if patterns.is_empty() {
        return Ok(None);
    }
    let mut builder = GlobSetBuilder::new();
    for pattern in patterns.iter() {
        builder.add(glob(&anchor(root, pattern), pattern)?);
    }
    builder
        .build()
        .map(Some)
        .map_err(|source| SelectorError::InvalidPattern {
            pattern: patterns.0.join(", "),
            source,
        })
}

fn glob(anchored: &str, original: &str) -> Result<Glob, SelectorError> {
    GlobBuilder::new(anchored)
        .literal_separator(true)
        .build()
        .map_err(|source| SelectorError::InvalidPattern {
            pattern: original.to_owned(),
            source,
        })
}

fn anchor(root: &Path, pattern: &str) -> String {
    if pattern.starts_with('*') || Path::new(pattern).is_absolute() {
        pattern.replace('\\', "/")
    } else {
        normalize(root, Path::new(pattern))
    }
}

/// Joins `path` onto `root` when relative, drops `.` segments, folds `..`
/// segments and renders the result with `/` separators.
fn normalize(root: &Path, path: &Path) -> String {
    let joined = if path.is_absolute() {
        path.to_path_buf()
    } else {
        root.join(path)
    };

    let mut prefix = String::new();
    let mut rooted = false;
    let mut parts: Vec<String> = Vec::new();
    for component in joined.components() {
        match component {
            Component::Prefix(p) => prefix = p.as_os_str().to_string_lossy().into_owned(),
            Component::RootDir => rooted = true,
            Component::CurDir => {}
            Component::ParentDir => {
                parts.pop();
            }
            Component::Normal(part) => parts.push(part.to_string_lossy().into_owned()),
        }
    }

    let body = parts.join("/");
    if rooted {
        format!("{prefix}/{body}")
    } else {
        format!("{prefix}{body}")
    }
}
