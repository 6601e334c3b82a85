use crate::selector::Patterns;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt::Debug;
use std::path::{Path, PathBuf};

/// Marker line a dependency-inlining preprocessor prepends to its output.
pub const INLINE_MARKER: &str = "#define GLSLIFY 1\n";

/// Removes the leading inline marker line from preprocessed text.
///
/// Text without the marker passes through unchanged, so applying this to
/// already stripped text is a no-op.
pub fn strip_inline_marker(text: &str) -> &str {
    text.strip_prefix(INLINE_MARKER).unwrap_or(text)
}

/// Preprocessor configuration as supplied by the host. Shared read-only
/// between invocations.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ResolverConfig {
    /// Explicit dependency root. When unset each file resolves against its
    /// own directory.
    pub basedir: Option<PathBuf>,
    pub include: Patterns,
    pub exclude: Patterns,
    /// Any further options, handed to the preprocessor verbatim.
    pub extra: BTreeMap<String, String>,
}

impl ResolverConfig {
    /// Computes the options for one file: the explicit basedir if configured,
    /// else the directory containing `source_path`. Never mutates `self`.
    pub fn options_for(&self, source_path: &Path) -> ResolveOptions {
        let basedir = self.basedir.clone().unwrap_or_else(|| {
            source_path
                .parent()
                .map(Path::to_path_buf)
                .unwrap_or_default()
        });
        ResolveOptions {
            file: source_path.to_path_buf(),
            basedir,
            include: self.include.clone(),
            exclude: self.exclude.clone(),
            extra: self.extra.clone(),
        }
    }
}

/// Per-call preprocessor input options.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ResolveOptions {
    /// The file being transformed.
    pub file: PathBuf,
    /// Directory relative dependency references resolve against.
    pub basedir: PathBuf,
    pub include: Patterns,
    pub exclude: Patterns,
    pub extra: BTreeMap<String, String>,
}

/// Inlines textual dependencies (`#include` style directives) into shader source.
///
/// Implementations return the inlined text, conventionally prefixed with
/// [`INLINE_MARKER`]. Errors are opaque to the transform and abort the file.
pub trait DependencyResolver: Send + Sync + Debug {
    fn resolve(&self, source: &str, options: &ResolveOptions) -> anyhow::Result<String>;

    /// Short name used in log output.
    fn name(&self) -> &'static str;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strip_marker_present() {
        assert_eq!(strip_inline_marker("#define GLSLIFY 1\nvoid main(){}"), "void main(){}");
    }

    #[test]
    fn test_strip_marker_absent() {
        assert_eq!(strip_inline_marker("void main(){}"), "void main(){}");
    }

    #[test]
    fn test_strip_marker_removes_only_the_injected_line() {
        // A second, user-written define right after the marker survives
        let text = "#define GLSLIFY 1\n#define GLSLIFY 1\nvoid main(){}";
        assert_eq!(strip_inline_marker(text), "#define GLSLIFY 1\nvoid main(){}");
    }

    #[test]
    fn test_strip_marker_only_as_prefix() {
        let text = "float a;\n#define GLSLIFY 1\n";
        assert_eq!(strip_inline_marker(text), text);
    }

    #[test]
    fn test_basedir_defaults_to_source_directory() {
        let config = ResolverConfig::default();
        let options = config.options_for(Path::new("/project/shaders/wind.glsl"));
        assert_eq!(options.basedir, PathBuf::from("/project/shaders"));
        assert_eq!(options.file, PathBuf::from("/project/shaders/wind.glsl"));
        // Computed default is not written back
        assert!(config.basedir.is_none());
    }

    #[test]
    fn test_explicit_basedir_wins() {
        let config = ResolverConfig {
            basedir: Some(PathBuf::from("/lib/glsl")),
            ..ResolverConfig::default()
        };
        let a = config.options_for(Path::new("/project/a/one.glsl"));
        let b = config.options_for(Path::new("/project/b/two.glsl"));
        assert_eq!(a.basedir, PathBuf::from("/lib/glsl"));
        assert_eq!(b.basedir, PathBuf::from("/lib/glsl"));
    }

    #[test]
    fn test_options_pass_configuration_verbatim() {
        let mut extra = BTreeMap::new();
        extra.insert("transform".to_owned(), "glslify-hex".to_owned());
        let config = ResolverConfig {
            basedir: None,
            include: Patterns(vec!["**/*.glsl".to_owned()]),
            exclude: Patterns(vec!["**/vendor/**".to_owned()]),
            extra,
        };
        let options = config.options_for(Path::new("x/y.glsl"));
        assert_eq!(options.include, config.include);
        assert_eq!(options.exclude, config.exclude);
        assert_eq!(options.extra.get("transform").map(String::as_str), Some("glslify-hex"));
        assert_eq!(options.basedir, PathBuf::from("x"));
    }
}
