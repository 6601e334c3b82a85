//! Built-in dependency inliner for `#include` directives.
//!
//! Handles `#include "path"`, `#include <path>` and `#pragma include "path"`.
//! Top-level includes resolve against the base directory, nested ones against
//! the directory of the file that includes them. Each file is inlined at most
//! once per call, which also breaks include cycles. The include/exclude
//! patterns decide which files get transformed, not which dependencies get
//! inlined, so they are not consulted here.

use crate::ExecError;
use shader_core::resolver::INLINE_MARKER;
use shader_core::{DependencyResolver, ResolveOptions};
use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Default)]
pub struct IncludeInliner;

impl IncludeInliner {
    pub fn new() -> Self {
        Self
    }
}

/// State for one `resolve` call.
struct Expansion<'a> {
    visited: HashSet<PathBuf>,
    file: &'a Path,
}

impl Expansion<'_> {
    fn expand(
        &mut self,
        source: &str,
        current: &Path,
        dir: &Path,
        out: &mut String,
    ) -> Result<(), ExecError> {
        for (index, line) in source.lines().enumerate() {
            let Some(target) = parse_directive(line) else {
                out.push_str(line);
                out.push('\n');
                continue;
            };
            let target = target.ok_or_else(|| ExecError::Directive {
                file: current.to_path_buf(),
                line: index + 1,
                directive: line.trim().to_owned(),
            })?;

            let path = dir.join(target);
            let canonical = path.canonicalize().map_err(|source| ExecError::Include {
                path: path.clone(),
                source,
            })?;
            if !self.visited.insert(canonical.clone()) {
                log::warn!(
                    "Skipping repeated include of {} from {}",
                    canonical.display(),
                    self.file.display()
                );
                continue;
            }

            let text = fs::read_to_string(&canonical).map_err(|source| ExecError::Include {
                path: canonical.clone(),
                source,
            })?;
            let nested_dir = canonical.parent().map(Path::to_path_buf).unwrap_or_default();
            self.expand(&text, &canonical, &nested_dir, out)?;
        }
        Ok(())
    }
}

/// Recognises an include directive. Returns `None` for ordinary lines,
/// `Some(None)` for a directive whose target cannot be parsed.
fn parse_directive(line: &str) -> Option<Option<&str>> {
    let trimmed = line.trim_start();
    let rest = trimmed
        .strip_prefix("#include")
        .or_else(|| {
            trimmed
                .strip_prefix("#pragma")
                .map(str::trim_start)
                .and_then(|r| r.strip_prefix("include"))
        })?;
    // `#includeFoo` is not a directive
    if !rest.is_empty()
        && !rest.starts_with(char::is_whitespace)
        && !rest.starts_with(['"', '<'])
    {
        return None;
    }
    let rest = rest.trim();
    let target = rest
        .strip_prefix('"')
        .and_then(|r| r.strip_suffix('"'))
        .or_else(|| rest.strip_prefix('<').and_then(|r| r.strip_suffix('>')))
        .filter(|t| !t.is_empty());
    Some(target)
}

impl DependencyResolver for IncludeInliner {
    fn resolve(&self, source: &str, options: &ResolveOptions) -> anyhow::Result<String> {
        let mut expansion = Expansion {
            visited: HashSet::new(),
            file: &options.file,
        };
        // The top-level file counts as visited so self-includes are dropped.
        if let Ok(canonical) = options.file.canonicalize() {
            expansion.visited.insert(canonical);
        }

        let mut out = String::with_capacity(INLINE_MARKER.len() + source.len());
        out.push_str(INLINE_MARKER);
        expansion.expand(source, &options.file, &options.basedir, &mut out)?;
        Ok(out)
    }

    fn name(&self) -> &'static str {
        "include inliner"
    }
}
