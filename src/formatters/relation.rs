use anyhow::{Context, Result};
use std::fs;
use std::path::Path;

use super::LAST_BRANCH;
use crate::core::{CallGraph, CrossFileIndex, FileReport, Relation, RelationAnalysis, RelationSet};

/// Relation report at a given analysis depth (1 to 3).
///
/// A single file given directly is rendered as its internal symbol
/// relationships. Anything else is rendered as file dependencies, followed
/// by cross-file symbol usage at depth 2 and the merged use graph at depth 3.
#[derive(Debug, Clone)]
pub struct RelationFormatter {
    depth: u8,
}

impl Default for RelationFormatter {
    fn default() -> Self {
        Self::new(1)
    }
}

impl RelationFormatter {
    pub fn new(depth: u8) -> Self {
        Self { depth }
    }

    pub fn format_to_file(&self, relations: &RelationSet, output_path: &Path) -> Result<()> {
        fs::write(output_path, self.format(relations))
            .with_context(|| format!("failed to write {}", output_path.display()))?;
        Ok(())
    }

    pub fn format(&self, relations: &RelationSet) -> String {
        let mut lines = Vec::new();
        if relations.is_single_file() {
            let empty = RelationAnalysis::default();
            let analysis = relations.files[0].relations.as_ref().unwrap_or(&empty);
            format_internal(&mut lines, analysis);
        } else {
            let index = CrossFileIndex::build(&relations.files);
            format_dependencies(&mut lines, &relations.files, &index);
            if self.depth >= 2 {
                format_usage(&mut lines, &relations.files, &index);
                if self.depth >= 3 {
                    format_call_graph(&mut lines, &relations.files, &index);
                }
            }
        }
        lines.join("\n")
    }
}

fn format_internal(lines: &mut Vec<String>, analysis: &RelationAnalysis) {
    lines.push("Internal Symbol Relationships:".to_string());
    lines.push("Symbol Types:".to_string());
    for record in analysis.symbols.iter() {
        lines.push(format!("  {LAST_BRANCH}{} [{}]", record.name, record.describe()));
    }

    lines.push("\nRelationships:".to_string());
    for (source, targets) in analysis.relations.iter() {
        if targets.is_empty() {
            continue;
        }
        lines.push(format!("\n{source} [{}]", analysis.symbols.describe(source)));
        for target in targets {
            match target {
                Relation::Uses(used) => lines.push(format!(
                    "  {LAST_BRANCH}uses {used} [{}]",
                    analysis.symbols.describe(used)
                )),
                structural => lines.push(format!("  {LAST_BRANCH}{structural}")),
            }
        }
    }
}

fn format_dependencies(lines: &mut Vec<String>, files: &[FileReport], index: &CrossFileIndex) {
    lines.push("File Dependencies:".to_string());
    for report in files {
        let imports = &report.dependencies.imports;
        if imports.is_empty() {
            continue;
        }
        lines.push(format!("\n{}", report.relative));
        lines.push(format!("  {LAST_BRANCH}imports from:"));
        for imported in imports {
            let sources = index.sources_of(&report.relative, imported);
            if sources.is_empty() {
                lines.push(format!("      {LAST_BRANCH}{imported} (external)"));
            }
            for source in sources {
                lines.push(format!("      {LAST_BRANCH}{imported} (from {source})"));
            }
        }
    }
}

fn format_usage(lines: &mut Vec<String>, files: &[FileReport], index: &CrossFileIndex) {
    lines.push("\n\nSymbol Usage Across Files:".to_string());
    for report in files {
        let symbols = &report.dependencies.symbols;
        if symbols.is_empty() {
            continue;
        }
        lines.push(format!("\n{} defines:", report.relative));
        for symbol in symbols {
            lines.push(format!("  {LAST_BRANCH}{symbol}"));
            let users: Vec<&String> = index
                .importers_of(symbol)
                .iter()
                .filter(|importer| **importer != report.relative)
                .collect();
            if users.is_empty() {
                continue;
            }
            lines.push(format!("      {LAST_BRANCH}used by:"));
            for user in users {
                lines.push(format!("          {LAST_BRANCH}{user}"));
            }
        }
    }
}

fn format_call_graph(lines: &mut Vec<String>, files: &[FileReport], index: &CrossFileIndex) {
    lines.push("\n\nFunction Call Graph:".to_string());
    let calls = CallGraph::merge(files);
    for (caller, callees) in calls.callers() {
        let defining = index.defining_files(caller);
        let location = if defining.is_empty() {
            "unknown".to_string()
        } else {
            defining.join(", ")
        };
        lines.push(format!("\n{caller} (in {location})"));
        for (callee, file) in callees {
            lines.push(format!("  {LAST_BRANCH}calls {callee} (in {file})"));
        }
    }
}
