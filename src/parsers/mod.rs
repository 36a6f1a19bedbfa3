pub mod common;
pub mod cpp;
pub mod csharp;
pub mod declarations;
pub mod java;
pub mod javascript;
pub mod manifest;
pub mod python;
pub mod rust;

use std::path::Path;
use tracing::{debug, warn};

use crate::config::{AnalysisConfig, DisplayCaps};
use crate::core::{Deadline, FileDependencySet, Language, RelationAnalysis};
use crate::error::SketchResult;
use common::{fallback_summary, read_source};
use manifest::{is_manifest, ManifestParser};

/// Per-call state handed to a rule set: the pattern budget for this file and
/// the display caps for structure listings.
#[derive(Debug, Clone, Copy)]
pub struct ScanContext {
    pub deadline: Deadline,
    pub caps: DisplayCaps,
}

impl ScanContext {
    /// Starts the deadline now.
    pub fn new(config: &AnalysisConfig) -> Self {
        Self {
            deadline: config.deadline(),
            caps: config.caps,
        }
    }

    pub fn unbounded() -> Self {
        Self {
            deadline: Deadline::unbounded(),
            caps: DisplayCaps::default(),
        }
    }
}

/// Heuristic rules for one language family.
///
/// Every capability reads raw text with regular expressions; none of them
/// parses. Errors are limited to [`crate::error::SketchError::PatternTimeout`]
/// and are absorbed by the free functions of this module.
pub trait LanguageRules {
    fn language_name(&self) -> &str;

    /// Display lines grouped by kind, each group preceded by a blank line.
    fn structure(&self, source: &str, cx: &ScanContext) -> SketchResult<Vec<String>>;

    fn dependencies(&self, _source: &str, _cx: &ScanContext) -> SketchResult<FileDependencySet> {
        Ok(FileDependencySet::new())
    }

    fn relations(&self, _source: &str, _cx: &ScanContext) -> SketchResult<RelationAnalysis> {
        Ok(RelationAnalysis::default())
    }
}

pub struct RulesFactory;

impl RulesFactory {
    pub fn new() -> Self {
        Self
    }

    pub fn get_rules(&self, language: Language) -> Option<Box<dyn LanguageRules + Send + Sync>> {
        match language {
            Language::Python => Some(Box::new(python::PythonRules::new())),
            Language::JavaScript => Some(Box::new(javascript::JavaScriptRules::new(false))),
            Language::TypeScript => Some(Box::new(javascript::JavaScriptRules::new(true))),
            Language::Rust => Some(Box::new(rust::RustRules::new())),
            Language::Java => Some(Box::new(java::JavaRules::new())),
            Language::C => Some(Box::new(cpp::CppRules::new(false))),
            Language::Cpp => Some(Box::new(cpp::CppRules::new(true))),
            Language::CSharp => Some(Box::new(csharp::CSharpRules::new())),
            Language::Other(_) | Language::Unknown => None,
        }
    }
}

impl Default for RulesFactory {
    fn default() -> Self {
        Self::new()
    }
}

/// Structure listing of `source`. Never fails: languages without rules get
/// line counts, and a failed scan becomes a single `Error parsing file:` line.
pub fn extract_structure(source: &str, language: Language, cx: &ScanContext) -> Vec<String> {
    let Some(rules) = RulesFactory::new().get_rules(language) else {
        return fallback_summary(source, language.as_str());
    };
    rules
        .structure(source, cx)
        .unwrap_or_else(|err| vec![format!("Error parsing file: {err}")])
}

pub fn extract_file_structure(path: &Path, language: Language, cx: &ScanContext) -> Vec<String> {
    match read_source(path) {
        Ok(source) => extract_structure(&source, language, cx),
        Err(err) => vec![format!("Error parsing file: {err}")],
    }
}

/// Imports, exports and declared symbols of a file. Manifests go to
/// `manifests` untouched; anything that fails contributes an empty set.
pub fn extract_dependencies(
    path: &Path,
    language: Language,
    manifests: &dyn ManifestParser,
    cx: &ScanContext,
) -> FileDependencySet {
    if is_manifest(path) {
        debug!(path = %path.display(), "routing to manifest parser");
        return manifests.parse(path);
    }
    let Some(rules) = RulesFactory::new().get_rules(language) else {
        return FileDependencySet::new();
    };

    let result = read_source(path).and_then(|source| rules.dependencies(&source, cx));
    result.unwrap_or_else(|err| {
        warn!("Error extracting dependencies from {}: {err}", path.display());
        FileDependencySet::new()
    })
}

/// Symbol table and relation map of `source`; empty when the language has no
/// rules. [`analyze_file_relations`] absorbs the error case.
pub fn analyze_internal_relations(
    source: &str,
    language: Language,
    cx: &ScanContext,
) -> SketchResult<RelationAnalysis> {
    match RulesFactory::new().get_rules(language) {
        Some(rules) => rules.relations(source, cx),
        None => Ok(RelationAnalysis::default()),
    }
}

pub fn analyze_file_relations(path: &Path, language: Language, cx: &ScanContext) -> RelationAnalysis {
    let result = read_source(path).and_then(|source| analyze_internal_relations(&source, language, cx));
    result.unwrap_or_else(|err| {
        warn!("Error analyzing internal relations in {}: {err}", path.display());
        RelationAnalysis::default()
    })
}
