use anyhow::Result;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

use super::{FileDependencySet, FileInfo, FileScanner, Language, RelationAnalysis};
use crate::config::AnalysisConfig;
use crate::error::SketchError;
use crate::parsers::manifest::{DefaultManifestParser, ManifestParser};
use crate::parsers::{analyze_file_relations, extract_dependencies, extract_file_structure, ScanContext};

/// Everything the relation report needs to know about one file.
#[derive(Debug, Clone)]
pub struct FileReport {
    pub path: PathBuf,
    pub relative: String,
    pub language: Language,
    pub dependencies: FileDependencySet,
    /// Present in single-file mode and at depth 3.
    pub relations: Option<RelationAnalysis>,
}

#[derive(Debug, Clone)]
pub struct RelationSet {
    pub root_is_dir: bool,
    pub files: Vec<FileReport>,
}

impl RelationSet {
    /// One file given directly, rendered as its internal relationships.
    pub fn is_single_file(&self) -> bool {
        !self.root_is_dir && self.files.len() == 1
    }
}

#[derive(Debug, Clone)]
pub struct StructureReport {
    pub relative: String,
    pub language: Language,
    pub lines: Vec<String>,
}

#[derive(Debug, Clone)]
pub struct StructureSet {
    pub root_name: String,
    pub root_is_dir: bool,
    pub files: Vec<StructureReport>,
}

pub struct CodebaseAnalyzer {
    file_scanner: FileScanner,
    manifests: Box<dyn ManifestParser + Send + Sync>,
    config: AnalysisConfig,
}

impl Default for CodebaseAnalyzer {
    fn default() -> Self {
        Self::new()
    }
}

impl CodebaseAnalyzer {
    pub fn new() -> Self {
        Self::with_config(AnalysisConfig::default())
    }

    pub fn with_config(config: AnalysisConfig) -> Self {
        Self {
            file_scanner: FileScanner::from_config(&config),
            manifests: Box::new(DefaultManifestParser::new()),
            config,
        }
    }

    fn collect(&self, root_path: &Path, code_only: bool) -> Result<(bool, Vec<FileInfo>)> {
        if !root_path.exists() {
            return Err(SketchError::PathNotFound(root_path.to_path_buf()).into());
        }
        if !root_path.is_dir() {
            return Ok((false, vec![FileInfo::single(root_path)]));
        }

        info!("Scanning {}...", root_path.display());
        let files = if code_only {
            self.file_scanner.scan_code_files(root_path)
        } else {
            self.file_scanner.scan_relation_files(root_path)
        };
        info!("Found {} files to analyze", files.len());
        Ok((true, files))
    }

    /// Dependency sets for every collected file, plus internal relations when
    /// the report will show them.
    pub fn analyze_relations(&self, root_path: &Path, depth: u8) -> Result<RelationSet> {
        let (root_is_dir, files) = self.collect(root_path, false)?;
        let with_relations = !root_is_dir || depth >= 3;

        let mut reports = Vec::with_capacity(files.len());
        for file in files {
            debug!(file = %file.relative, language = %file.language, "extracting dependencies");
            let dependencies = extract_dependencies(
                &file.path,
                file.language,
                self.manifests.as_ref(),
                &ScanContext::new(&self.config),
            );
            let relations = with_relations.then(|| {
                analyze_file_relations(&file.path, file.language, &ScanContext::new(&self.config))
            });
            reports.push(FileReport {
                path: file.path,
                relative: file.relative,
                language: file.language,
                dependencies,
                relations,
            });
        }

        Ok(RelationSet {
            root_is_dir,
            files: reports,
        })
    }

    /// Structure listings for every code file, or for the single file given.
    /// `language` overrides detection.
    pub fn analyze_structure(
        &self,
        root_path: &Path,
        language: Option<Language>,
    ) -> Result<StructureSet> {
        let (root_is_dir, files) = self.collect(root_path, true)?;

        let mut reports = Vec::with_capacity(files.len());
        for file in files {
            let language = language.unwrap_or(file.language);
            debug!(file = %file.relative, %language, "extracting structure");
            let lines = extract_file_structure(&file.path, language, &ScanContext::new(&self.config));
            reports.push(StructureReport {
                relative: file.relative,
                language,
                lines,
            });
        }

        Ok(StructureSet {
            root_name: display_name(root_path),
            root_is_dir,
            files: reports,
        })
    }
}

/// Base name of a path, resolving `.` and `..` first.
pub fn display_name(path: &Path) -> String {
    let resolved = path.canonicalize().unwrap_or_else(|_| path.to_path_buf());
    resolved
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| resolved.display().to_string())
}
