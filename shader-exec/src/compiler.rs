use crate::command::ExternalCommand;
use serde::Deserialize;
use shader_core::{CompileOptions, CompilerResult, ShaderCompiler};
use std::collections::BTreeMap;

/// Runs an external shader compiler (a `glslx`-style command line tool).
///
/// The preprocessed source is written to stdin and the compile options are
/// appended as flags. A non-zero exit or anything printed to stderr is the
/// diagnostic log; otherwise stdout is the structured output. Tools that
/// already print a `{"log": ..., "output": ...}` envelope are understood too.
#[derive(Debug, Clone)]
pub struct CommandCompiler {
    command: ExternalCommand,
}

impl CommandCompiler {
    pub fn new(command: ExternalCommand) -> Self {
        Self { command }
    }
}

#[derive(Deserialize)]
struct Envelope {
    log: Option<String>,
    output: Option<String>,
}

/// Interprets stdout of a successful run.
fn parse_stdout(stdout: String) -> CompilerResult {
    if let Ok(Envelope { log, output }) = serde_json::from_str::<Envelope>(&stdout) {
        if log.is_some() || output.is_some() {
            return CompilerResult { log, output };
        }
    }
    CompilerResult::success(stdout)
}

impl ShaderCompiler for CommandCompiler {
    fn compile(&self, source: &str, options: &CompileOptions) -> anyhow::Result<CompilerResult> {
        let output = self
            .command
            .run(source, &options.to_flags(), &BTreeMap::new(), None)?;

        let stderr = output.stderr.trim();
        if !output.status.success() || !stderr.is_empty() {
            let log = if stderr.is_empty() {
                format!(
                    "{} exited with {} and no diagnostics",
                    self.command.program_name(),
                    output.status
                )
            } else {
                stderr.to_owned()
            };
            return Ok(CompilerResult::failure(log));
        }
        Ok(parse_stdout(output.stdout))
    }

    fn name(&self) -> &'static str {
        "external compiler"
    }
}
