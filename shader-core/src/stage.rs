use serde::{Deserialize, Serialize};
use std::fmt;

/// Pipeline stage a compiled snippet belongs to, as told by its name suffix.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ShaderStage {
    Vertex,
    Fragment,
}

impl fmt::Display for ShaderStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ShaderStage::Vertex => write!(f, "vertex"),
            ShaderStage::Fragment => write!(f, "fragment"),
        }
    }
}

/// The trailing name markers that identify stage snippets.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StageSuffixes {
    pub vertex: String,
    pub fragment: String,
}

impl Default for StageSuffixes {
    fn default() -> Self {
        Self {
            vertex: "Vertex".to_owned(),
            fragment: "Fragment".to_owned(),
        }
    }
}

impl StageSuffixes {
    /// Splits a snippet name into its stage and stripped key.
    ///
    /// The fragment marker is checked first. Names carrying neither marker
    /// come back unchanged with no stage.
    pub fn classify<'a>(&self, name: &'a str) -> (Option<ShaderStage>, &'a str) {
        if let Some(key) = strip_marker(name, &self.fragment) {
            (Some(ShaderStage::Fragment), key)
        } else if let Some(key) = strip_marker(name, &self.vertex) {
            (Some(ShaderStage::Vertex), key)
        } else {
            (None, name)
        }
    }

    /// Re-attaches a stage marker to a stripped key.
    pub fn suffixed(&self, key: &str, stage: ShaderStage) -> String {
        match stage {
            ShaderStage::Vertex => format!("{key}{}", self.vertex),
            ShaderStage::Fragment => format!("{key}{}", self.fragment),
        }
    }
}

fn strip_marker<'a>(name: &'a str, marker: &str) -> Option<&'a str> {
    // An empty marker would classify every name
    if marker.is_empty() {
        return None;
    }
    name.strip_suffix(marker)
}
