use anyhow::{Context, Result};
use std::fs;
use std::path::Path;

use super::{BRANCH, LAST_BRANCH};
use crate::core::analyzer::display_name;
use crate::error::{SketchError, SketchResult};

/// Filesystem tree with box-drawing connectors.
#[derive(Debug, Clone, Default)]
pub struct DirectoryFormatter {
    max_depth: Option<usize>,
}

impl DirectoryFormatter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Levels below the root to descend; `Some(0)` prints the root alone.
    pub fn with_max_depth(mut self, max_depth: Option<usize>) -> Self {
        self.max_depth = max_depth;
        self
    }

    pub fn format_to_file(&self, root_path: &Path, output_path: &Path) -> Result<()> {
        let diagram = self.format(root_path)?;
        fs::write(output_path, diagram)
            .with_context(|| format!("failed to write {}", output_path.display()))?;
        Ok(())
    }

    pub fn format(&self, root_path: &Path) -> Result<String> {
        if !root_path.exists() {
            return Err(SketchError::PathNotFound(root_path.to_path_buf()).into());
        }

        let mut lines = vec![display_name(root_path)];
        if root_path.is_dir() {
            self.walk(&mut lines, root_path, "", 0)
                .with_context(|| format!("failed to list {}", root_path.display()))?;
        }
        Ok(lines.join("\n"))
    }

    fn walk(
        &self,
        lines: &mut Vec<String>,
        dir: &Path,
        prefix: &str,
        depth: usize,
    ) -> SketchResult<()> {
        if self.max_depth.is_some_and(|max| depth >= max) {
            return Ok(());
        }

        let mut entries = fs::read_dir(dir)?.collect::<std::io::Result<Vec<_>>>()?;
        entries.sort_by_key(|entry| entry.file_name());

        let count = entries.len();
        for (idx, entry) in entries.into_iter().enumerate() {
            let is_last = idx + 1 == count;
            let connector = if is_last { LAST_BRANCH } else { BRANCH };
            lines.push(format!(
                "{prefix}{connector}{}",
                entry.file_name().to_string_lossy()
            ));

            // Symlinked directories are listed but not entered.
            let is_dir = entry.file_type().map(|kind| kind.is_dir()).unwrap_or(false);
            if is_dir {
                let continuation = if is_last { "    " } else { "│   " };
                self.walk(lines, &entry.path(), &format!("{prefix}{continuation}"), depth + 1)?;
            }
        }
        Ok(())
    }
}
