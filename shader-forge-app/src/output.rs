use anyhow::{Context, Result};
use shader_core::GeneratedModule;
use std::ffi::OsString;
use std::fs;
use std::path::{Path, PathBuf};

/// Where the module generated for `input` goes.
///
/// Without an output directory the module sits next to its source
/// (`wind.glsl` becomes `wind.glsl.js`). With one, `relative` (the path of
/// the input below the directory it was found in) is mirrored under it.
pub fn module_path(input: &Path, relative: &Path, out_dir: Option<&Path>, extension: &str) -> PathBuf {
    let base = match out_dir {
        Some(dir) => dir.join(relative),
        None => input.to_path_buf(),
    };
    let mut name = OsString::from(base.as_os_str());
    name.push(extension);
    PathBuf::from(name)
}

/// Source map location for a module path.
pub fn map_path(module: &Path) -> PathBuf {
    let mut name = OsString::from(module.as_os_str());
    name.push(".map");
    PathBuf::from(name)
}

/// Writes the module code and, if asked, its source map. Returns the map path
/// when one was written.
pub fn write_module(module: &GeneratedModule, path: &Path, emit_map: bool) -> Result<Option<PathBuf>> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create output directory: {:?}", parent))?;
    }
    fs::write(path, &module.code)
        .with_context(|| format!("Failed to write module: {:?}", path))?;

    if !emit_map {
        return Ok(None);
    }
    let map = map_path(path);
    let json = serde_json::to_string(&module.map).context("Failed to serialize source map")?;
    fs::write(&map, json).with_context(|| format!("Failed to write source map: {:?}", map))?;
    Ok(Some(map))
}

#[cfg(test)]
mod tests {
    use super::*;
    use shader_core::SourceMap;

    #[test]
    fn test_module_next_to_source() {
        let path = module_path(Path::new("src/wind.glsl"), Path::new("wind.glsl"), None, ".js");
        assert_eq!(path, PathBuf::from("src/wind.glsl.js"));
    }

    #[test]
    fn test_module_mirrored_under_out_dir() {
        let path = module_path(
            Path::new("src/shaders/fx/wind.glsl"),
            Path::new("fx/wind.glsl"),
            Some(Path::new("gen")),
            ".js",
        );
        assert_eq!(path, PathBuf::from("gen/fx/wind.glsl.js"));
    }

    #[test]
    fn test_write_module_with_map() {
        let dir = tempfile::tempdir().unwrap();
        let module = GeneratedModule {
            code: "import {createProgram} from \"../util\";\n".to_owned(),
            map: SourceMap::empty(),
        };
        let path = dir.path().join("nested/a.glsl.js");

        let map = write_module(&module, &path, true).unwrap();
        assert_eq!(fs::read_to_string(&path).unwrap(), module.code);
        let map = map.unwrap();
        assert_eq!(map, dir.path().join("nested/a.glsl.js.map"));
        let json: serde_json::Value = serde_json::from_str(&fs::read_to_string(map).unwrap()).unwrap();
        assert_eq!(json["version"], 3);
        assert_eq!(json["mappings"], "");
    }

    #[test]
    fn test_write_module_without_map() {
        let dir = tempfile::tempdir().unwrap();
        let module = GeneratedModule {
            code: String::new(),
            map: SourceMap::empty(),
        };
        let path = dir.path().join("a.glsl.js");
        assert!(write_module(&module, &path, false).unwrap().is_none());
        assert!(!map_path(&path).exists());
    }
}
