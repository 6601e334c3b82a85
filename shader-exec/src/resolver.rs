use crate::command::ExternalCommand;
use crate::ExecError;
use shader_core::{DependencyResolver, ResolveOptions};
use std::collections::BTreeMap;

/// Runs an external dependency-inlining preprocessor.
///
/// The source goes in on stdin and the inlined text is read from stdout. The
/// command runs in the base directory, and its arguments may reference
/// `{basedir}`, `{file}`, `{include}`, `{exclude}` (comma separated) and any
/// key of the configured extra options.
#[derive(Debug, Clone)]
pub struct CommandResolver {
    command: ExternalCommand,
}

impl CommandResolver {
    pub fn new(command: ExternalCommand) -> Self {
        Self { command }
    }
}

fn placeholders(options: &ResolveOptions) -> BTreeMap<&str, String> {
    let mut vars: BTreeMap<&str, String> = options
        .extra
        .iter()
        .map(|(key, value)| (key.as_str(), value.clone()))
        .collect();
    vars.insert("basedir", options.basedir.display().to_string());
    vars.insert("file", options.file.display().to_string());
    vars.insert("include", options.include.0.join(","));
    vars.insert("exclude", options.exclude.0.join(","));
    vars
}

impl DependencyResolver for CommandResolver {
    fn resolve(&self, source: &str, options: &ResolveOptions) -> anyhow::Result<String> {
        let output = self.command.run(
            source,
            &[],
            &placeholders(options),
            Some(&options.basedir),
        )?;
        if !output.status.success() {
            return Err(ExecError::Failed {
                program: self.command.program_name(),
                status: output.status,
                stderr: output.stderr.trim().to_owned(),
            }
            .into());
        }
        Ok(output.stdout)
    }

    fn name(&self) -> &'static str {
        "external preprocessor"
    }
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;
    use shader_core::ResolverConfig;
    use std::path::Path;

    #[test]
    fn test_placeholders_reach_the_command() {
        let tmp = tempfile::tempdir().unwrap();
        let resolver = CommandResolver::new(
            ExternalCommand::new("sh").with_args(["-c", "printf '%s|' \"$0\" \"$1\"; cat", "{basedir}", "{mode}"]),
        );
        let mut config = ResolverConfig::default();
        config.extra.insert("mode".to_owned(), "fast".to_owned());
        let file = tmp.path().join("a.glsl");
        let options = config.options_for(&file);

        let out = resolver.resolve("void main(){}", &options).unwrap();
        assert_eq!(
            out,
            format!("{}|fast|void main(){{}}", tmp.path().display())
        );
    }

    #[test]
    fn test_failure_carries_stderr() {
        let resolver = CommandResolver::new(
            ExternalCommand::new("sh").with_args(["-c", "echo 'cannot find glsl-noise' >&2; exit 1"]),
        );
        let options = ResolverConfig::default().options_for(Path::new("/tmp/a.glsl"));
        let err = resolver.resolve("", &options).unwrap_err();
        assert!(err.to_string().contains("cannot find glsl-noise"));
    }
}
