use anyhow::{Context, Result};
use std::fs;
use std::path::Path;

use crate::core::StructureSet;

const RULE_WIDTH: usize = 50;

/// Per-file listing of declared constructs.
#[derive(Debug, Clone, Default)]
pub struct CodeFormatter;

impl CodeFormatter {
    pub fn new() -> Self {
        Self
    }

    pub fn format_to_file(&self, structure: &StructureSet, output_path: &Path) -> Result<()> {
        fs::write(output_path, self.format(structure))
            .with_context(|| format!("failed to write {}", output_path.display()))?;
        Ok(())
    }

    pub fn format(&self, structure: &StructureSet) -> String {
        let mut lines = Vec::new();
        if structure.root_is_dir {
            lines.push(format!("Code Diagram for Directory: {}", structure.root_name));
            lines.push("=".repeat(RULE_WIDTH));
            for file in &structure.files {
                lines.push(format!("\nFile: {} ({})", file.relative, file.language));
                lines.push("-".repeat(RULE_WIDTH));
                lines.extend(file.lines.iter().cloned());
            }
        } else {
            lines.push(format!("Code Diagram for File: {}", structure.root_name));
            lines.push("=".repeat(RULE_WIDTH));
            for file in &structure.files {
                lines.extend(file.lines.iter().cloned());
            }
        }
        lines.join("\n")
    }
}
