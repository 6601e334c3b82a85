//! Drives the transform over every selected input file.

use crate::config::ForgeConfig;
use crate::error::AppError;
use crate::output;
use rayon::prelude::*;
use shader_core::{DependencyResolver, ShaderTransform, SourceUnit, Synthesizer};
use shader_exec::{CommandCompiler, CommandResolver, IncludeInliner};
use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};

/// A file picked up from the command line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Candidate {
    pub path: PathBuf,
    /// Path below the input directory it was found in (or the bare file name
    /// for files given directly). Mirrored under the output directory.
    pub relative: PathBuf,
}

#[derive(Debug)]
pub enum Outcome {
    Written {
        module: PathBuf,
        map: Option<PathBuf>,
    },
    Failed(anyhow::Error),
}

#[derive(Debug)]
pub struct FileReport {
    pub input: PathBuf,
    pub outcome: Outcome,
}

/// Result of one run over all inputs.
#[derive(Debug, Default)]
pub struct RunSummary {
    pub reports: Vec<FileReport>,
    /// Files seen that the selector did not pick.
    pub skipped: usize,
}

impl RunSummary {
    pub fn written(&self) -> usize {
        self.reports
            .iter()
            .filter(|r| matches!(r.outcome, Outcome::Written { .. }))
            .count()
    }

    pub fn failed(&self) -> usize {
        self.reports.len() - self.written()
    }
}

/// Assembles the transform pipeline described by `config`.
pub fn build_transform(config: &ForgeConfig) -> Result<ShaderTransform, AppError> {
    let root = config.selector_root()?;
    let selector = shader_core::FileSelector::new(&root, &config.include, &config.exclude)?;

    let resolver: Box<dyn DependencyResolver> = match &config.preprocessor {
        Some(command) => {
            log::info!("Using preprocessor {}", command.program_name());
            Box::new(CommandResolver::new(command.clone()))
        }
        None => Box::new(IncludeInliner::new()),
    };
    log::info!("Using compiler {}", config.compiler.program_name());

    Ok(ShaderTransform::new(
        selector,
        resolver,
        Box::new(CommandCompiler::new(config.compiler.clone())),
    )
    .with_resolver_config(config.resolver_config())
    .with_compile_options(config.compile.clone())
    .with_synthesizer(Synthesizer::new(config.synthesis.clone())))
}

/// Expands the inputs into the files to transform, in a stable order.
///
/// Directories are walked recursively and only selected files are kept. A
/// file reached through several inputs is kept once, at its first
/// occurrence. Returns the candidates and the number of files passed over.
pub fn collect_inputs(
    inputs: &[PathBuf],
    transform: &ShaderTransform,
) -> Result<(Vec<Candidate>, usize), AppError> {
    let mut candidates = Vec::new();
    let mut seen = HashSet::new();
    let mut skipped = 0;

    for input in inputs {
        let input = absolute(input)?;
        if input.is_dir() {
            let mut files = Vec::new();
            walk(&input, &mut files)?;
            for path in files {
                if transform.should_transform(&path) {
                    if seen.insert(path.clone()) {
                        let relative = path.strip_prefix(&input).unwrap_or(&path).to_path_buf();
                        candidates.push(Candidate { path, relative });
                    }
                } else {
                    skipped += 1;
                }
            }
        } else if input.is_file() {
            if transform.should_transform(&input) {
                if seen.insert(input.clone()) {
                    let relative = input.file_name().map(PathBuf::from).unwrap_or_default();
                    candidates.push(Candidate { path: input, relative });
                }
            } else {
                log::info!("{} does not match the include patterns, skipping", input.display());
                skipped += 1;
            }
        } else {
            return Err(AppError::Config(format!(
                "Input not found: {}",
                input.display()
            )));
        }
    }

    Ok((candidates, skipped))
}

fn absolute(path: &Path) -> Result<PathBuf, AppError> {
    if path.is_absolute() {
        Ok(path.to_path_buf())
    } else {
        Ok(std::env::current_dir()?.join(path))
    }
}

fn walk(dir: &Path, files: &mut Vec<PathBuf>) -> Result<(), AppError> {
    let mut entries = fs::read_dir(dir)?
        .map(|entry| entry.map(|e| e.path()))
        .collect::<Result<Vec<_>, _>>()?;
    entries.sort();
    for path in entries {
        if path.is_dir() {
            walk(&path, files)?;
        } else {
            files.push(path);
        }
    }
    Ok(())
}

fn process_file(transform: &ShaderTransform, config: &ForgeConfig, candidate: &Candidate) -> Outcome {
    let result = (|| -> anyhow::Result<Option<(PathBuf, Option<PathBuf>)>> {
        let code = fs::read_to_string(&candidate.path)?;
        let Some(module) = transform.transform(SourceUnit::new(&candidate.path, &code))? else {
            return Ok(None);
        };
        let target = output::module_path(
            &candidate.path,
            &candidate.relative,
            config.out_dir(),
            &config.extension,
        );
        let map = output::write_module(&module, &target, config.emit_source_map)?;
        Ok(Some((target, map)))
    })();

    match result {
        Ok(Some((module, map))) => {
            log::info!("Transformed {} -> {}", candidate.path.display(), module.display());
            Outcome::Written { module, map }
        }
        // Candidates are pre-filtered, so this only happens if the selector changed.
        Ok(None) => Outcome::Failed(anyhow::anyhow!("file is no longer selected")),
        Err(e) => {
            log::error!("{:#}", e);
            Outcome::Failed(e)
        }
    }
}

/// Transforms every selected input, in parallel. One file failing does not
/// stop the others.
pub fn run(config: &ForgeConfig, inputs: &[PathBuf]) -> Result<RunSummary, AppError> {
    let transform = build_transform(config)?;
    let (candidates, skipped) = collect_inputs(inputs, &transform)?;
    log::info!(
        "Transforming {} shader file(s), {} skipped",
        candidates.len(),
        skipped
    );

    let pool = rayon::ThreadPoolBuilder::new()
        .num_threads(config.jobs.unwrap_or(0))
        .build()
        .map_err(|e| AppError::Config(format!("Failed to build worker pool: {}", e)))?;

    let reports = pool.install(|| {
        candidates
            .par_iter()
            .map(|candidate| FileReport {
                input: candidate.path.clone(),
                outcome: process_file(&transform, config, candidate),
            })
            .collect()
    });

    Ok(RunSummary { reports, skipped })
}
