//! Command-line arguments and layered configuration.
//!
//! Configuration is resolved once per run, lowest precedence first:
//! built-in defaults, the TOML file, `SHADER_FORGE_*` environment variables
//! (nested keys separated by `__`), then command-line flags.

use crate::error::AppError;
use anyhow::Context;
use clap::{Parser, ValueEnum};
use figment::providers::{Env, Format, Serialized, Toml};
use figment::Figment;
use log::LevelFilter;
use serde::{Deserialize, Serialize};
use shader_core::{CompileOptions, Patterns, ResolverConfig, SynthesisOptions};
use shader_exec::ExternalCommand;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

/// Configuration file picked up from the working directory when present.
pub const CONFIG_FILE: &str = "shader-forge.toml";

/// Prefix of configuration environment variables.
pub const ENV_PREFIX: &str = "SHADER_FORGE_";

/// Compiler executable used when none is configured.
pub const DEFAULT_COMPILER: &str = "glslx";

/// Log verbosity.
#[derive(ValueEnum, Serialize, Deserialize, Clone, Copy, Debug, Default, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Error,
    Warn,
    #[default]
    Info,
    Debug,
    Trace,
}

impl LogLevel {
    pub fn as_str(self) -> &'static str {
        match self {
            LogLevel::Error => "error",
            LogLevel::Warn => "warn",
            LogLevel::Info => "info",
            LogLevel::Debug => "debug",
            LogLevel::Trace => "trace",
        }
    }
}

impl From<LogLevel> for LevelFilter {
    fn from(level: LogLevel) -> Self {
        match level {
            LogLevel::Error => LevelFilter::Error,
            LogLevel::Warn => LevelFilter::Warn,
            LogLevel::Info => LevelFilter::Info,
            LogLevel::Debug => LevelFilter::Debug,
            LogLevel::Trace => LevelFilter::Trace,
        }
    }
}

/// Command-line interface of the `shader-forge` binary.
#[derive(Parser, Debug)]
#[command(author, version, about = "Compile shader sources into importable JavaScript modules", long_about = None)]
pub struct Cli {
    /// Shader files or directories (searched recursively) to transform.
    #[arg(value_name = "INPUT", required = true)]
    pub inputs: Vec<PathBuf>,

    /// TOML configuration file. Defaults to shader-forge.toml if present.
    #[arg(short, long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Write generated modules under this directory, mirroring the input layout.
    #[arg(short, long, value_name = "DIR")]
    pub out_dir: Option<PathBuf>,

    /// Include glob pattern (repeatable). Replaces configured patterns.
    #[arg(long, value_name = "GLOB")]
    pub include: Vec<String>,

    /// Exclude glob pattern (repeatable). Replaces configured patterns.
    #[arg(long, value_name = "GLOB")]
    pub exclude: Vec<String>,

    /// Directory that #include references resolve against.
    #[arg(long, value_name = "DIR")]
    pub basedir: Option<PathBuf>,

    /// External shader compiler executable.
    #[arg(long, value_name = "PROGRAM")]
    pub compiler: Option<PathBuf>,

    /// External preprocessor executable. The built-in inliner is used when unset.
    #[arg(long, value_name = "PROGRAM")]
    pub preprocessor: Option<PathBuf>,

    /// Import path of the createProgram runtime helper.
    #[arg(long, value_name = "PATH")]
    pub helper_path: Option<String>,

    /// Also write an (empty) source map next to each module.
    #[arg(long, default_value_t = false)]
    pub emit_source_map: bool,

    /// Number of worker threads.
    #[arg(short, long, value_name = "N")]
    pub jobs: Option<usize>,

    /// Log verbosity. RUST_LOG takes precedence when set.
    #[arg(long, value_enum)]
    pub log_level: Option<LogLevel>,
}

/// Fully resolved configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ForgeConfig {
    /// Directory relative include/exclude patterns are anchored to.
    /// Defaults to the working directory.
    pub root: Option<PathBuf>,
    pub include: Patterns,
    pub exclude: Patterns,
    /// Dependency base directory. Defaults to each file's own directory.
    pub basedir: Option<PathBuf>,
    /// Extra options handed to the preprocessor verbatim.
    pub resolver_options: BTreeMap<String, String>,
    pub preprocessor: Option<ExternalCommand>,
    pub compiler: ExternalCommand,
    pub compile: CompileOptions,
    pub synthesis: SynthesisOptions,
    pub out_dir: Option<PathBuf>,
    /// Appended to the input file name to form the module name.
    pub extension: String,
    pub emit_source_map: bool,
    pub jobs: Option<usize>,
    pub log_level: LogLevel,
}

impl Default for ForgeConfig {
    fn default() -> Self {
        Self {
            root: None,
            include: Patterns::default_include(),
            exclude: Patterns::default(),
            basedir: None,
            resolver_options: BTreeMap::new(),
            preprocessor: None,
            compiler: ExternalCommand::new(DEFAULT_COMPILER),
            compile: CompileOptions::default(),
            synthesis: SynthesisOptions::default(),
            out_dir: None,
            extension: ".js".to_owned(),
            emit_source_map: false,
            jobs: None,
            log_level: LogLevel::default(),
        }
    }
}

#[derive(Serialize)]
struct ProgramOverride {
    program: PathBuf,
}

#[derive(Serialize)]
struct SynthesisOverride {
    helper_path: String,
}

/// Values given on the command line. Absent flags are not serialized, so
/// they never mask lower layers.
#[derive(Serialize, Default)]
struct CliOverrides {
    #[serde(skip_serializing_if = "Option::is_none")]
    include: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    exclude: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    basedir: Option<PathBuf>,
    #[serde(skip_serializing_if = "Option::is_none")]
    compiler: Option<ProgramOverride>,
    #[serde(skip_serializing_if = "Option::is_none")]
    preprocessor: Option<ProgramOverride>,
    #[serde(skip_serializing_if = "Option::is_none")]
    synthesis: Option<SynthesisOverride>,
    #[serde(skip_serializing_if = "Option::is_none")]
    out_dir: Option<PathBuf>,
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    emit_source_map: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    jobs: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    log_level: Option<LogLevel>,
}

impl From<&Cli> for CliOverrides {
    fn from(cli: &Cli) -> Self {
        let non_empty = |patterns: &Vec<String>| (!patterns.is_empty()).then(|| patterns.clone());
        Self {
            include: non_empty(&cli.include),
            exclude: non_empty(&cli.exclude),
            basedir: cli.basedir.clone(),
            compiler: cli.compiler.clone().map(|program| ProgramOverride { program }),
            preprocessor: cli.preprocessor.clone().map(|program| ProgramOverride { program }),
            synthesis: cli
                .helper_path
                .clone()
                .map(|helper_path| SynthesisOverride { helper_path }),
            out_dir: cli.out_dir.clone(),
            emit_source_map: cli.emit_source_map,
            jobs: cli.jobs,
            log_level: cli.log_level,
        }
    }
}

impl ForgeConfig {
    /// Builds the layered configuration for `cli`.
    ///
    /// An explicitly named config file must exist; the implicit
    /// `shader-forge.toml` is optional.
    pub fn figment(cli: &Cli) -> Result<Figment, AppError> {
        let file = match &cli.config {
            Some(path) if !path.is_file() => {
                return Err(AppError::Config(format!(
                    "Configuration file not found: {}",
                    path.display()
                )));
            }
            Some(path) => path.clone(),
            None => PathBuf::from(CONFIG_FILE),
        };

        Ok(Figment::from(Serialized::defaults(ForgeConfig::default()))
            .merge(Toml::file(file))
            .merge(Env::prefixed(ENV_PREFIX).split("__"))
            .merge(Serialized::defaults(CliOverrides::from(cli))))
    }

    pub fn load(cli: &Cli) -> Result<Self, AppError> {
        let config: Self = Self::figment(cli)?
            .extract()
            .context("Invalid shader-forge configuration")?;
        log::trace!("Resolved configuration: {:?}", config);
        Ok(config)
    }

    /// Root for pattern anchoring: the configured root or the working directory.
    pub fn selector_root(&self) -> Result<PathBuf, AppError> {
        let cwd = std::env::current_dir()?;
        Ok(match &self.root {
            Some(root) if root.is_absolute() => root.clone(),
            Some(root) => cwd.join(root),
            None => cwd,
        })
    }

    /// Preprocessor configuration shared by every file of the run.
    pub fn resolver_config(&self) -> ResolverConfig {
        ResolverConfig {
            basedir: self.basedir.clone(),
            include: self.include.clone(),
            exclude: self.exclude.clone(),
            extra: self.resolver_options.clone(),
        }
    }

    pub fn out_dir(&self) -> Option<&Path> {
        self.out_dir.as_deref()
    }
}
