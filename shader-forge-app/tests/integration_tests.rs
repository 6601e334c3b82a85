use assert_cmd::prelude::*; // Add methods on commands
use predicates::prelude::*; // Used for writing assertions
use std::fs;
use std::path::Path;
use std::process::Command; // Run programs
use tempfile::tempdir; // Create temporary directories for testing

// A "compiler" that echoes its stdin, so a shader file holding compiler-style
// JSON passes straight through to the synthesizer.
const ECHO_CONFIG: &str = r#"
[compiler]
program = "sh"
args = ["-c", "cat", "glslx"]
"#;

// A compiler that always fails, reporting against the placeholder name.
const FAILING_CONFIG: &str = r#"
[compiler]
program = "sh"
args = ["-c", "echo '<stdin>:1:1: error: unexpected token' >&2; exit 1", "glslx"]
"#;

const SCENE_JSON: &str = r#"{"shaders":[
{"name":"drawVertex","contents":"attribute vec2 a;"},
{"name":"drawFragment","contents":"uniform sampler2D t;"},
{"name":"tint","contents":"float tint;"}
]}"#;

const SCENE_MODULE: &str = "import {createProgram} from \"../util\";\n\
    \n\
    export const draw = gl => createProgram(gl, \"attribute vec2 a;\", \"uniform sampler2D t;\");\n\
    \n\
    export const tint = \"float tint;\";\n";

fn write(dir: &Path, name: &str, contents: &str) {
    let path = dir.join(name);
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).expect("Failed to create fixture directory");
    }
    fs::write(path, contents).expect("Failed to write fixture");
}

fn shader_forge(dir: &Path) -> Command {
    let mut cmd = Command::cargo_bin("shader-forge").expect("binary is built");
    cmd.current_dir(dir);
    cmd.env("RUST_LOG", "info"); // Set log level for test run
    cmd
}

#[test]
fn test_directory_run_writes_modules() -> Result<(), Box<dyn std::error::Error>> {
    let tmp_dir = tempdir()?;
    write(tmp_dir.path(), "shader-forge.toml", ECHO_CONFIG);
    write(tmp_dir.path(), "shaders/scene.glsl", SCENE_JSON);
    write(tmp_dir.path(), "shaders/notes.txt", "not a shader");

    shader_forge(tmp_dir.path())
        .arg("shaders")
        .assert()
        .success()
        .stdout(predicate::str::contains("1 written, 0 failed, 1 skipped"))
        .stderr(predicate::str::contains("Transformed"));

    let module = fs::read_to_string(tmp_dir.path().join("shaders/scene.glsl.js"))?;
    assert_eq!(module, SCENE_MODULE);
    assert!(!tmp_dir.path().join("shaders/notes.txt.js").exists());

    Ok(())
}

#[test]
fn test_includes_are_inlined_before_compiling() -> Result<(), Box<dyn std::error::Error>> {
    let tmp_dir = tempdir()?;
    write(tmp_dir.path(), "shader-forge.toml", ECHO_CONFIG);
    write(
        tmp_dir.path(),
        "shaders/scene.glsl",
        "{\"shaders\":[\n#include \"lib/entries.inc\"\n]}\n",
    );
    write(
        tmp_dir.path(),
        "shaders/lib/entries.inc",
        "{\"name\":\"main\",\"contents\":\"void main(){}\"}\n",
    );

    shader_forge(tmp_dir.path())
        .arg("shaders/scene.glsl")
        .assert()
        .success();

    let module = fs::read_to_string(tmp_dir.path().join("shaders/scene.glsl.js"))?;
    assert!(module.ends_with("\nexport default \"void main(){}\";\n"), "{module}");

    Ok(())
}

#[test]
fn test_out_dir_and_source_maps() -> Result<(), Box<dyn std::error::Error>> {
    let tmp_dir = tempdir()?;
    write(tmp_dir.path(), "shader-forge.toml", ECHO_CONFIG);
    write(tmp_dir.path(), "shaders/fx/scene.glsl", SCENE_JSON);

    shader_forge(tmp_dir.path())
        .args(["--out-dir", "gen", "--emit-source-map", "--helper-path", "./gl.js"])
        .arg("shaders")
        .assert()
        .success();

    let module = fs::read_to_string(tmp_dir.path().join("gen/fx/scene.glsl.js"))?;
    assert!(module.starts_with("import {createProgram} from \"./gl.js\";\n"));
    let map = fs::read_to_string(tmp_dir.path().join("gen/fx/scene.glsl.js.map"))?;
    assert!(map.contains("\"mappings\":\"\""));
    assert!(!tmp_dir.path().join("shaders/fx/scene.glsl.js").exists());

    Ok(())
}

#[test]
fn test_compile_errors_name_the_real_file() -> Result<(), Box<dyn std::error::Error>> {
    let tmp_dir = tempdir()?;
    write(tmp_dir.path(), "shader-forge.toml", FAILING_CONFIG);
    write(tmp_dir.path(), "broken.glsl", "void main() { oops }\n");

    shader_forge(tmp_dir.path())
        .arg("broken.glsl")
        .assert()
        .failure()
        .stderr(predicate::str::contains("broken.glsl:1:1: error: unexpected token"))
        .stderr(predicate::str::contains("<stdin>").not());

    assert!(!tmp_dir.path().join("broken.glsl.js").exists());

    Ok(())
}

#[test]
fn test_missing_shaders_field_fails() -> Result<(), Box<dyn std::error::Error>> {
    let tmp_dir = tempdir()?;
    write(tmp_dir.path(), "shader-forge.toml", ECHO_CONFIG);
    write(tmp_dir.path(), "empty.glsl", "{}\n");

    shader_forge(tmp_dir.path())
        .arg("empty.glsl")
        .assert()
        .failure()
        .stderr(predicate::str::contains("1 of 1 shader file(s) failed"));

    Ok(())
}

#[test]
fn test_missing_config_file_is_reported() -> Result<(), Box<dyn std::error::Error>> {
    let tmp_dir = tempdir()?;

    shader_forge(tmp_dir.path())
        .args(["--config", "absent.toml", "shaders"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Configuration file not found"));

    Ok(())
}

#[test]
fn test_excluded_libraries_are_still_inlined() -> Result<(), Box<dyn std::error::Error>> {
    let tmp_dir = tempdir()?;
    write(tmp_dir.path(), "shader-forge.toml", ECHO_CONFIG);
    write(
        tmp_dir.path(),
        "shaders/scene.glsl",
        "{\"shaders\":[\n#include \"lib/entries.inc\"\n]}\n",
    );
    write(
        tmp_dir.path(),
        "shaders/lib/entries.inc",
        "{\"name\":\"main\",\"contents\":\"void main(){}\"}\n",
    );

    shader_forge(tmp_dir.path())
        .args(["--exclude", "**/lib/**"])
        .arg("shaders/scene.glsl")
        .assert()
        .success()
        .stdout(predicate::str::contains("1 written, 0 failed"));

    let module = fs::read_to_string(tmp_dir.path().join("shaders/scene.glsl.js"))?;
    assert!(module.ends_with("\nexport default \"void main(){}\";\n"), "{module}");

    Ok(())
}

#[test]
fn test_repeated_inputs_are_transformed_once() -> Result<(), Box<dyn std::error::Error>> {
    let tmp_dir = tempdir()?;
    write(tmp_dir.path(), "shader-forge.toml", ECHO_CONFIG);
    write(tmp_dir.path(), "shaders/a.glsl", SCENE_JSON);
    write(tmp_dir.path(), "shaders/b.glsl", SCENE_JSON);

    shader_forge(tmp_dir.path())
        .args(["shaders/a.glsl", "shaders/b.glsl", "shaders/a.glsl", "shaders"])
        .assert()
        .success()
        .stdout(predicate::str::contains("2 written, 0 failed, 0 skipped"));

    Ok(())
}
