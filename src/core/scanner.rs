use std::path::{Path, PathBuf};
use tracing::{debug, warn};
use walkdir::{DirEntry, WalkDir};

use super::language::{classify_path, Language};
use crate::config::{AnalysisConfig, DEFAULT_EXCLUDED_DIRS, DEFAULT_MAX_FILE_SIZE};

/// Extensions collected for relation analysis.
const RELATION_EXTENSIONS: &[&str] = &[
    // web
    "py", "js", "jsx", "ts", "tsx", "html", "css", "scss", "sass", "less", "php", "vue", "svelte",
    "astro",
    // mobile and desktop
    "java", "kt", "kts", "swift", "m", "h", "dart", "cs", "fs", "fsx", "vb", "xaml", "cshtml",
    // systems
    "c", "cpp", "cc", "cxx", "hpp", "rs", "go", "zig", "d", "nim",
    // scripting
    "rb", "erb", "pl", "pm", "sh", "bash", "zsh", "ps1", "lua", "tcl",
    // functional
    "hs", "elm", "ml", "ex", "exs", "erl", "clj", "cljs",
    // data science
    "r", "jl", "ipynb",
    // configuration
    "json", "xml", "yaml", "yml", "toml", "ini", "sql", "graphql", "proto",
];

/// Build and project files collected for relation analysis by exact name.
const PROJECT_FILE_NAMES: &[&str] = &[
    "pom.xml", "build.gradle", "build.sbt", "package.json", "tsconfig.json", "webpack.config.js",
    "rollup.config.js", "next.config.js", "nuxt.config.js", "pyproject.toml", "setup.py",
    "Pipfile", "requirements.txt", "Gemfile", "Rakefile", "Cargo.toml", "go.mod",
    "CMakeLists.txt", "Makefile", ".gitlab-ci.yml", ".travis.yml", "appveyor.yml",
    "azure-pipelines.yml", "Jenkinsfile", "Dockerfile", "docker-compose.yml",
    "docker-compose.yaml", "serverless.yml", "Chart.yaml", "kustomization.yaml",
];

/// Build and project files collected for relation analysis by extension.
const PROJECT_EXTENSIONS: &[&str] = &[
    "csproj", "fsproj", "vbproj", "sln", "props", "targets", "gradle", "cmake", "make", "mk",
    "tf", "tfvars", "hcl",
];

/// Extensions the code report lists.
const CODE_EXTENSIONS: &[&str] = &[
    "py", "js", "jsx", "mjs", "ts", "tsx", "java", "c", "h", "cpp", "cc", "cxx", "hpp", "rs",
    "cs", "rb", "go",
];

#[derive(Debug, Clone)]
pub struct FileInfo {
    pub path: PathBuf,
    /// Path relative to the scanned root, with forward slashes.
    pub relative: String,
    pub language: Language,
}

impl FileInfo {
    /// A file given directly on the command line; its relative name is its
    /// base name.
    pub fn single(path: &Path) -> Self {
        let relative = path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());
        Self {
            path: path.to_path_buf(),
            relative,
            language: classify_path(path),
        }
    }
}

/// Sorted, filtered directory walk.
pub struct FileScanner {
    max_file_size: u64,
    excluded_dirs: Vec<String>,
}

impl Default for FileScanner {
    fn default() -> Self {
        Self::new()
    }
}

impl FileScanner {
    pub fn new() -> Self {
        Self {
            max_file_size: DEFAULT_MAX_FILE_SIZE,
            excluded_dirs: DEFAULT_EXCLUDED_DIRS.iter().map(|d| d.to_string()).collect(),
        }
    }

    pub fn from_config(config: &AnalysisConfig) -> Self {
        Self {
            max_file_size: config.max_file_size,
            excluded_dirs: config.excluded_dirs.clone(),
        }
    }

    /// Source and project files that take part in a relation report.
    pub fn scan_relation_files(&self, root_path: &Path) -> Vec<FileInfo> {
        self.scan(root_path, |path| {
            let name = path.file_name().and_then(|n| n.to_str()).unwrap_or("");
            let extension = lower_extension(path);
            RELATION_EXTENSIONS.contains(&extension.as_str())
                || PROJECT_EXTENSIONS.contains(&extension.as_str())
                || PROJECT_FILE_NAMES.contains(&name)
        })
    }

    /// Files with a code extension, for the code report.
    pub fn scan_code_files(&self, root_path: &Path) -> Vec<FileInfo> {
        self.scan(root_path, |path| {
            CODE_EXTENSIONS.contains(&lower_extension(path).as_str())
        })
    }

    fn is_excluded(&self, entry: &DirEntry) -> bool {
        entry.depth() > 0
            && entry.file_type().is_dir()
            && entry
                .file_name()
                .to_str()
                .is_some_and(|name| self.excluded_dirs.iter().any(|dir| dir == name))
    }

    fn scan(&self, root_path: &Path, keep: impl Fn(&Path) -> bool) -> Vec<FileInfo> {
        let mut files = Vec::new();

        let walker = WalkDir::new(root_path)
            .follow_links(false)
            .sort_by_file_name()
            .into_iter()
            .filter_entry(|entry| !self.is_excluded(entry));

        for entry in walker {
            let entry = match entry {
                Ok(entry) => entry,
                Err(err) => {
                    warn!("Skipping unreadable entry: {err}");
                    continue;
                }
            };
            if !entry.file_type().is_file() || !keep(entry.path()) {
                continue;
            }

            match entry.metadata() {
                Ok(metadata) if metadata.len() > self.max_file_size => {
                    debug!(path = %entry.path().display(), size = metadata.len(), "skipping large file");
                    continue;
                }
                Ok(_) => {}
                Err(err) => {
                    warn!("Skipping {}: {err}", entry.path().display());
                    continue;
                }
            }

            let path = entry.path();
            let relative = path
                .strip_prefix(root_path)
                .unwrap_or(path)
                .components()
                .map(|part| part.as_os_str().to_string_lossy())
                .collect::<Vec<_>>()
                .join("/");
            files.push(FileInfo {
                path: path.to_path_buf(),
                relative,
                language: classify_path(path),
            });
        }

        files
    }
}

fn lower_extension(path: &Path) -> String {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(str::to_ascii_lowercase)
        .unwrap_or_default()
}
