use crate::bundle::CompiledBundle;
use crate::{StructureError, TransformError};
use serde::{Deserialize, Serialize};
use std::fmt::Debug;
use std::path::Path;

/// Input name the compiler uses in diagnostics for text it was handed directly.
pub const PLACEHOLDER_INPUT_NAME: &str = "<stdin>";

/// Output format requested from the compiler.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// Machine-readable `{"shaders": [...]}`; the only format the synthesizer reads.
    #[default]
    Json,
}

impl OutputFormat {
    pub fn as_str(self) -> &'static str {
        match self {
            OutputFormat::Json => "json",
        }
    }
}

/// Which identifiers the compiler may rename.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Renaming {
    All,
    /// Only internal identifiers; exported names stay stable.
    #[default]
    InternalOnly,
    None,
}

impl Renaming {
    pub fn as_str(self) -> &'static str {
        match self {
            Renaming::All => "all",
            Renaming::InternalOnly => "internal-only",
            Renaming::None => "none",
        }
    }
}

/// Options handed to the shader compiler.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CompileOptions {
    pub disable_rewriting: bool,
    pub format: OutputFormat,
    pub keep_symbols: bool,
    pub pretty_print: bool,
    pub renaming: Renaming,
}

impl Default for CompileOptions {
    /// Structured, minified output with internal-only renaming.
    fn default() -> Self {
        Self {
            disable_rewriting: false,
            format: OutputFormat::Json,
            keep_symbols: false,
            pretty_print: false,
            renaming: Renaming::InternalOnly,
        }
    }
}

impl CompileOptions {
    /// Renders the options as command-line flags. Boolean switches appear
    /// only when enabled.
    pub fn to_flags(&self) -> Vec<String> {
        let mut flags = vec![
            format!("--format={}", self.format.as_str()),
            format!("--renaming={}", self.renaming.as_str()),
        ];
        if self.disable_rewriting {
            flags.push("--disable-rewriting".to_owned());
        }
        if self.keep_symbols {
            flags.push("--keep-symbols".to_owned());
        }
        if self.pretty_print {
            flags.push("--pretty-print".to_owned());
        }
        flags
    }
}

/// Raw compiler result: a diagnostic log, structured output, or both.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct CompilerResult {
    #[serde(default)]
    pub log: Option<String>,
    #[serde(default)]
    pub output: Option<String>,
}

impl CompilerResult {
    pub fn success(output: impl Into<String>) -> Self {
        Self {
            log: None,
            output: Some(output.into()),
        }
    }

    pub fn failure(log: impl Into<String>) -> Self {
        Self {
            log: Some(log.into()),
            output: None,
        }
    }

    /// Turns the result into a bundle for `source_path`.
    ///
    /// A non-empty log wins over any output and becomes a
    /// `TransformError::Compilation` with every placeholder input name
    /// replaced by `source_path`.
    pub fn into_bundle(self, source_path: &Path) -> Result<CompiledBundle, TransformError> {
        if let Some(log) = self.log.filter(|log| !log.is_empty()) {
            let path = source_path.display().to_string();
            return Err(TransformError::Compilation {
                path: source_path.to_path_buf(),
                log: log.replace(PLACEHOLDER_INPUT_NAME, &path),
            });
        }
        let output = self
            .output
            .ok_or_else(|| TransformError::structure(source_path, StructureError::EmptyResult))?;
        CompiledBundle::from_json(&output).map_err(|e| TransformError::structure(source_path, e))
    }
}

/// Compiles preprocessed shader text into named snippets.
pub trait ShaderCompiler: Send + Sync + Debug {
    /// Compiles `source`. An `Err` means the compiler could not be run;
    /// compile errors in the shader come back as `CompilerResult::log`.
    fn compile(&self, source: &str, options: &CompileOptions) -> anyhow::Result<CompilerResult>;

    /// Short name used in log output.
    fn name(&self) -> &'static str;
}
