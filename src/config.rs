use std::time::Duration;

use crate::core::Deadline;

/// Files larger than this are skipped during collection.
pub const DEFAULT_MAX_FILE_SIZE: u64 = 1024 * 1024;

/// Wall-clock budget for the pattern rules applied to a single file.
pub const DEFAULT_PATTERN_BUDGET: Duration = Duration::from_millis(2000);

/// Tooling and build directories never descended into.
pub const DEFAULT_EXCLUDED_DIRS: &[&str] = &[
    "node_modules",
    "venv",
    ".venv",
    "env",
    ".env",
    ".git",
    "__pycache__",
    "dist",
    "build",
    "target",
    "bin",
    "obj",
];

/// How many entries of one kind a structure listing shows before it
/// collapses the rest into a `... and N more` line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DisplayCaps {
    pub imports: usize,
    pub variables: usize,
    pub functions: usize,
}

impl Default for DisplayCaps {
    fn default() -> Self {
        Self {
            imports: 5,
            variables: 10,
            functions: 15,
        }
    }
}

/// Settings shared by the scanner, the rule sets and the formatters.
#[derive(Debug, Clone)]
pub struct AnalysisConfig {
    pub caps: DisplayCaps,
    pub pattern_budget: Duration,
    pub max_file_size: u64,
    pub excluded_dirs: Vec<String>,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            caps: DisplayCaps::default(),
            pattern_budget: DEFAULT_PATTERN_BUDGET,
            max_file_size: DEFAULT_MAX_FILE_SIZE,
            excluded_dirs: DEFAULT_EXCLUDED_DIRS
                .iter()
                .map(|dir| dir.to_string())
                .collect(),
        }
    }
}

impl AnalysisConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_pattern_budget(mut self, budget: Duration) -> Self {
        self.pattern_budget = budget;
        self
    }

    pub fn with_max_file_size(mut self, bytes: u64) -> Self {
        self.max_file_size = bytes;
        self
    }

    /// Starts a fresh per-file deadline from the configured budget.
    pub fn deadline(&self) -> Deadline {
        Deadline::after(self.pattern_budget)
    }
}
