//! Intermediate representation of a generated JavaScript module and the
//! single step that renders it to source text.
//!
//! Pairing logic only ever builds a [`ModuleIr`]; formatting lives here so the
//! two can be tested separately.

use crate::StructureError;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// Name of the runtime helper every generated module imports.
pub const CREATE_PROGRAM: &str = "createProgram";

/// Default import location of the runtime helper.
pub const DEFAULT_HELPER_PATH: &str = "../util";

/// Words that cannot be used as `export const` names.
const RESERVED_WORDS: &[&str] = &[
    "await", "break", "case", "catch", "class", "const", "continue", "debugger", "default",
    "delete", "do", "else", "enum", "export", "extends", "false", "finally", "for", "function",
    "if", "implements", "import", "in", "instanceof", "interface", "let", "new", "null",
    "package", "private", "protected", "public", "return", "static", "super", "switch", "this",
    "throw", "true", "try", "typeof", "var", "void", "while", "with", "yield",
];

/// A single export statement of the generated module.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExportDecl {
    /// `export const name = gl => createProgram(gl, vertex, fragment);`
    Program {
        name: String,
        vertex: String,
        fragment: String,
    },
    /// `export const name = "source";`
    Value { name: String, source: String },
    /// `export default "source";`
    Default { source: String },
}

impl ExportDecl {
    /// The exported binding name, `None` for the default export.
    pub fn name(&self) -> Option<&str> {
        match self {
            ExportDecl::Program { name, .. } | ExportDecl::Value { name, .. } => Some(name),
            ExportDecl::Default { .. } => None,
        }
    }

    fn render(&self) -> String {
        match self {
            ExportDecl::Program {
                name,
                vertex,
                fragment,
            } => format!(
                "export const {name} = gl => {CREATE_PROGRAM}(gl, {}, {});",
                js_string(vertex),
                js_string(fragment)
            ),
            ExportDecl::Value { name, source } => {
                format!("export const {name} = {};", js_string(source))
            }
            ExportDecl::Default { source } => format!("export default {};", js_string(source)),
        }
    }
}

/// The ordered export list of one generated module.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModuleIr {
    /// Import path of the `createProgram` helper.
    pub helper_path: String,
    pub exports: Vec<ExportDecl>,
}

impl ModuleIr {
    pub fn new(helper_path: impl Into<String>) -> Self {
        Self {
            helper_path: helper_path.into(),
            exports: Vec::new(),
        }
    }

    pub fn push(&mut self, decl: ExportDecl) {
        self.exports.push(decl);
    }

    /// Names of all named exports, in declaration order.
    pub fn export_names(&self) -> impl Iterator<Item = &str> {
        self.exports.iter().filter_map(ExportDecl::name)
    }

    /// The default export, if any.
    pub fn default_export(&self) -> Option<&str> {
        self.exports.iter().find_map(|decl| match decl {
            ExportDecl::Default { source } => Some(source.as_str()),
            _ => None,
        })
    }

    /// Checks that every named export is a unique, valid identifier and that
    /// there is at most one default export.
    pub fn validate(&self) -> Result<(), StructureError> {
        let mut seen = HashSet::new();
        let mut has_default = false;
        for decl in &self.exports {
            match decl.name() {
                Some(name) => {
                    if !is_identifier(name) {
                        return Err(StructureError::InvalidExportName(name.to_owned()));
                    }
                    if !seen.insert(name) {
                        return Err(StructureError::DuplicateExport(name.to_owned()));
                    }
                }
                None => {
                    if has_default {
                        return Err(StructureError::DuplicateExport("default".to_owned()));
                    }
                    has_default = true;
                }
            }
        }
        Ok(())
    }

    /// Renders the module source. Exports are separated by blank lines.
    pub fn render(&self) -> GeneratedModule {
        let mut code = format!(
            "import {{{CREATE_PROGRAM}}} from {};\n",
            js_string(&self.helper_path)
        );
        for decl in &self.exports {
            code.push('\n');
            code.push_str(&decl.render());
            code.push('\n');
        }
        GeneratedModule {
            code,
            map: SourceMap::empty(),
        }
    }
}

/// Source map attached to a generated module. Always empty: the generated
/// text has no meaningful mapping back to the shader source.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceMap {
    pub version: u8,
    pub sources: Vec<String>,
    pub names: Vec<String>,
    pub mappings: String,
}

impl SourceMap {
    pub fn empty() -> Self {
        Self {
            version: 3,
            sources: Vec::new(),
            names: Vec::new(),
            mappings: String::new(),
        }
    }
}

/// Replacement source for one shader file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeneratedModule {
    pub code: String,
    pub map: SourceMap,
}

/// Quotes text as a JavaScript string literal using JSON escaping.
pub fn js_string(text: &str) -> String {
    serde_json::Value::String(text.to_owned()).to_string()
}

/// Whether `name` can be bound with `export const`.
pub fn is_identifier(name: &str) -> bool {
    let mut chars = name.chars();
    let Some(first) = chars.next() else {
        return false;
    };
    (first.is_ascii_alphabetic() || first == '_' || first == '$')
        && chars.all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '$')
        && !RESERVED_WORDS.contains(&name)
}
