//! The per-file transform: select, resolve, compile, synthesize.
//!
//! A `ShaderTransform` holds only read-only configuration and its two
//! collaborators, so one instance can serve concurrent calls.

use crate::compiler::{CompileOptions, ShaderCompiler};
use crate::module::GeneratedModule;
use crate::resolver::{strip_inline_marker, DependencyResolver, ResolverConfig};
use crate::selector::FileSelector;
use crate::synthesizer::Synthesizer;
use crate::TransformError;
use std::path::Path;

/// A file handed over by the host: its path and raw text.
#[derive(Debug, Clone, Copy)]
pub struct SourceUnit<'a> {
    pub path: &'a Path,
    pub code: &'a str,
}

impl<'a> SourceUnit<'a> {
    pub fn new(path: &'a Path, code: &'a str) -> Self {
        Self { path, code }
    }
}

/// Shader-to-module transform.
#[derive(Debug)]
pub struct ShaderTransform {
    selector: FileSelector,
    resolver: Box<dyn DependencyResolver>,
    compiler: Box<dyn ShaderCompiler>,
    resolver_config: ResolverConfig,
    compile_options: CompileOptions,
    synthesizer: Synthesizer,
}

impl ShaderTransform {
    /// Creates a transform with default compile options and naming.
    pub fn new(
        selector: FileSelector,
        resolver: Box<dyn DependencyResolver>,
        compiler: Box<dyn ShaderCompiler>,
    ) -> Self {
        Self {
            selector,
            resolver,
            compiler,
            resolver_config: ResolverConfig::default(),
            compile_options: CompileOptions::default(),
            synthesizer: Synthesizer::default(),
        }
    }

    pub fn with_resolver_config(mut self, config: ResolverConfig) -> Self {
        self.resolver_config = config;
        self
    }

    pub fn with_compile_options(mut self, options: CompileOptions) -> Self {
        self.compile_options = options;
        self
    }

    pub fn with_synthesizer(mut self, synthesizer: Synthesizer) -> Self {
        self.synthesizer = synthesizer;
        self
    }

    pub fn selector(&self) -> &FileSelector {
        &self.selector
    }

    /// Whether `path` is in scope for [`ShaderTransform::transform`].
    pub fn should_transform(&self, path: &Path) -> bool {
        self.selector.should_transform(path)
    }

    /// Transforms one file.
    ///
    /// Returns `Ok(None)` for files outside the selector; the host passes
    /// those through unmodified. Any error aborts this file only and leaves
    /// no partial output.
    pub fn transform(&self, unit: SourceUnit<'_>) -> Result<Option<GeneratedModule>, TransformError> {
        if !self.should_transform(unit.path) {
            log::trace!("Skipping {} (not selected)", unit.path.display());
            return Ok(None);
        }

        let options = self.resolver_config.options_for(unit.path);
        log::debug!(
            "Resolving {} with {} (basedir {})",
            unit.path.display(),
            self.resolver.name(),
            options.basedir.display()
        );
        let inlined = self
            .resolver
            .resolve(unit.code, &options)
            .map_err(|source| TransformError::Resolution {
                path: unit.path.to_path_buf(),
                source,
            })?;
        let preprocessed = strip_inline_marker(&inlined);

        log::debug!("Compiling {} with {}", unit.path.display(), self.compiler.name());
        let result = self
            .compiler
            .compile(preprocessed, &self.compile_options)
            .map_err(|source| TransformError::Compiler {
                path: unit.path.to_path_buf(),
                source,
            })?;
        let bundle = result.into_bundle(unit.path)?;

        let module = self
            .synthesizer
            .synthesize(&bundle)
            .map_err(|e| TransformError::structure(unit.path, e))?;
        Ok(Some(module))
    }
}
