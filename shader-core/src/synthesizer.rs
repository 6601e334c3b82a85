//! Classification of compiled snippets by stage and synthesis of the
//! replacement module.
//!
//! Snippets named `<key>Vertex` and `<key>Fragment` are paired into a single
//! program constructor exported as `<key>`. Unpaired stage snippets keep their
//! suffixed name, and every other snippet is exported under its own name, with
//! the designated default name becoming the module's default export.
//!
//! Every snippet contributes to exactly one export.

use crate::bundle::CompiledBundle;
use crate::module::{ExportDecl, GeneratedModule, ModuleIr, DEFAULT_HELPER_PATH};
use crate::stage::{ShaderStage, StageSuffixes};
use crate::StructureError;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// Name of the snippet that becomes the module's default export.
pub const DEFAULT_EXPORT_NAME: &str = "main";

/// Insertion-ordered `key -> contents` map with unique keys.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StageMap {
    entries: Vec<(String, String)>,
}

impl StageMap {
    /// Inserts a new key. Returns `false` and leaves the map untouched if the
    /// key is already present.
    fn insert(&mut self, key: &str, contents: &str) -> bool {
        if self.contains_key(key) {
            return false;
        }
        self.entries.push((key.to_owned(), contents.to_owned()));
        true
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, contents)| contents.as_str())
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.get(key).is_some()
    }

    /// Iterates in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(k, _)| k.as_str())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// A bundle split into vertex, fragment and other snippets.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ClassifiedShaders {
    /// Stripped key -> vertex source.
    pub vertex: StageMap,
    /// Stripped key -> fragment source.
    pub fragment: StageMap,
    /// Unchanged name -> source.
    pub other: StageMap,
}

impl ClassifiedShaders {
    /// Classifies every entry of `bundle` by its name suffix.
    ///
    /// # Errors
    ///
    /// `StructureError::StageCollision` if two entries strip to the same key
    /// within one stage. Collisions are rejected rather than resolved by
    /// iteration order.
    pub fn classify(
        bundle: &CompiledBundle,
        suffixes: &StageSuffixes,
    ) -> Result<Self, StructureError> {
        let mut classified = Self::default();
        for entry in bundle.entries() {
            let (stage, key) = suffixes.classify(&entry.name);
            let map = match stage {
                Some(ShaderStage::Vertex) => &mut classified.vertex,
                Some(ShaderStage::Fragment) => &mut classified.fragment,
                None => &mut classified.other,
            };
            if !map.insert(key, &entry.contents) {
                return Err(match stage {
                    Some(stage) => StructureError::StageCollision {
                        stage,
                        key: key.to_owned(),
                    },
                    None => StructureError::DuplicateEntry(key.to_owned()),
                });
            }
        }
        log::trace!(
            "Classified {} vertex, {} fragment, {} other snippets",
            classified.vertex.len(),
            classified.fragment.len(),
            classified.other.len()
        );
        Ok(classified)
    }
}

/// Naming conventions used while synthesizing a module.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SynthesisOptions {
    pub suffixes: StageSuffixes,
    /// Snippet name exported as the module default.
    pub default_export: String,
    /// Import path of the `createProgram` runtime helper.
    pub helper_path: String,
}

impl Default for SynthesisOptions {
    fn default() -> Self {
        Self {
            suffixes: StageSuffixes::default(),
            default_export: DEFAULT_EXPORT_NAME.to_owned(),
            helper_path: DEFAULT_HELPER_PATH.to_owned(),
        }
    }
}

/// Builds replacement modules from compiled bundles.
#[derive(Debug, Clone, Default)]
pub struct Synthesizer {
    options: SynthesisOptions,
}

impl Synthesizer {
    pub fn new(options: SynthesisOptions) -> Self {
        Self { options }
    }

    pub fn options(&self) -> &SynthesisOptions {
        &self.options
    }

    /// Pairs classified snippets into an export list.
    ///
    /// Order: the vertex map in insertion order (a paired program or a
    /// vertex-only export per key), then fragments that were not paired, then
    /// the other snippets.
    pub fn plan(&self, classified: &ClassifiedShaders) -> ModuleIr {
        let suffixes = &self.options.suffixes;
        let mut ir = ModuleIr::new(self.options.helper_path.clone());
        let mut consumed: HashSet<&str> = HashSet::new();

        for (key, vertex) in classified.vertex.iter() {
            match classified.fragment.get(key) {
                Some(fragment) => {
                    consumed.insert(key);
                    ir.push(ExportDecl::Program {
                        name: key.to_owned(),
                        vertex: vertex.to_owned(),
                        fragment: fragment.to_owned(),
                    });
                }
                None => ir.push(ExportDecl::Value {
                    name: suffixes.suffixed(key, ShaderStage::Vertex),
                    source: vertex.to_owned(),
                }),
            }
        }

        for (key, fragment) in classified.fragment.iter() {
            if consumed.contains(key) {
                continue;
            }
            ir.push(ExportDecl::Value {
                name: suffixes.suffixed(key, ShaderStage::Fragment),
                source: fragment.to_owned(),
            });
        }

        for (name, source) in classified.other.iter() {
            if name == self.options.default_export {
                ir.push(ExportDecl::Default {
                    source: source.to_owned(),
                });
            } else {
                ir.push(ExportDecl::Value {
                    name: name.to_owned(),
                    source: source.to_owned(),
                });
            }
        }

        ir
    }

    /// Classifies, pairs, validates and renders `bundle`.
    pub fn synthesize(&self, bundle: &CompiledBundle) -> Result<GeneratedModule, StructureError> {
        let classified = ClassifiedShaders::classify(bundle, &self.options.suffixes)?;
        let ir = self.plan(&classified);
        ir.validate()?;
        log::debug!(
            "Synthesized {} exports from {} snippets",
            ir.exports.len(),
            bundle.len()
        );
        Ok(ir.render())
    }
}
