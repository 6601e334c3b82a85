use crate::StructureError;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// One named snippet produced by the shader compiler.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompiledShaderEntry {
    /// Snippet name, possibly carrying a stage suffix.
    pub name: String,
    /// Compiled GLSL text.
    pub contents: String,
}

impl CompiledShaderEntry {
    pub fn new(name: impl Into<String>, contents: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            contents: contents.into(),
        }
    }
}

/// Shape of the compiler's structured output. Other top-level fields
/// (renaming tables and the like) are ignored.
#[derive(Deserialize, Debug)]
struct StructuredOutput {
    shaders: Option<Vec<CompiledShaderEntry>>,
}

/// Ordered snippets compiled from one source file. Entry names are unique.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CompiledBundle {
    entries: Vec<CompiledShaderEntry>,
}

impl CompiledBundle {
    /// Creates a bundle, rejecting duplicate entry names.
    ///
    /// # Errors
    ///
    /// Returns `StructureError::DuplicateEntry` naming the first repeated entry.
    pub fn new(entries: Vec<CompiledShaderEntry>) -> Result<Self, StructureError> {
        let mut seen = HashSet::with_capacity(entries.len());
        for entry in &entries {
            if !seen.insert(entry.name.as_str()) {
                return Err(StructureError::DuplicateEntry(entry.name.clone()));
            }
        }
        Ok(Self { entries })
    }

    /// Parses the compiler's JSON output (`{"shaders": [{name, contents}, ...]}`).
    pub fn from_json(output: &str) -> Result<Self, StructureError> {
        let parsed: StructuredOutput = serde_json::from_str(output)?;
        let shaders = parsed.shaders.ok_or(StructureError::MissingShaders)?;
        Self::new(shaders)
    }

    pub fn entries(&self) -> &[CompiledShaderEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
