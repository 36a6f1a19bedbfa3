use petgraph::graph::{EdgeIndex, NodeIndex};
use petgraph::visit::EdgeRef;
use petgraph::{Directed, Direction, Graph};
use std::collections::HashMap;

use super::analyzer::FileReport;
use super::language::Language;
use super::symbols::Relation;

#[derive(Debug, Clone)]
pub struct FileNode {
    pub relative: String,
    pub language: Language,
}

/// One imported name resolved to the file that exports it.
#[derive(Debug, Clone)]
pub struct ImportEdge {
    pub symbol: String,
}

/// Importer → exporter edges, one per resolved imported name.
pub type FileGraph = Graph<FileNode, ImportEdge, Directed>;

pub struct GraphBuilder {
    graph: FileGraph,
    node_map: HashMap<String, NodeIndex>,
}

impl Default for GraphBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl GraphBuilder {
    pub fn new() -> Self {
        Self {
            graph: Graph::new(),
            node_map: HashMap::new(),
        }
    }

    pub fn add_file(&mut self, node: FileNode) -> NodeIndex {
        if let Some(&index) = self.node_map.get(&node.relative) {
            return index;
        }
        let relative = node.relative.clone();
        let index = self.graph.add_node(node);
        self.node_map.insert(relative, index);
        index
    }

    pub fn add_import(&mut self, importer: &str, exporter: &str, symbol: &str) -> Option<EdgeIndex> {
        let source_idx = self.node_map.get(importer)?;
        let target_idx = self.node_map.get(exporter)?;
        Some(self.graph.add_edge(
            *source_idx,
            *target_idx,
            ImportEdge {
                symbol: symbol.to_string(),
            },
        ))
    }

    pub fn get_node_index(&self, relative: &str) -> Option<NodeIndex> {
        self.node_map.get(relative).copied()
    }

    pub fn build(self) -> FileGraph {
        self.graph
    }
}

/// Text after the last `.` or `::` separator: `models.User` → `User`,
/// `crate::core::Deadline` → `Deadline`.
pub fn base_symbol(name: &str) -> &str {
    let dot = name.rfind('.').map(|idx| idx + 1);
    let path = name.rfind("::").map(|idx| idx + 2);
    match dot.max(path) {
        Some(start) => &name[start..],
        None => name,
    }
}

fn push_unique(map: &mut HashMap<String, Vec<String>>, key: &str, file: &str) {
    let files = map.entry(key.to_string()).or_default();
    if !files.iter().any(|existing| existing == file) {
        files.push(file.to_string());
    }
}

/// Lookup tables joining exporting files to importing files.
pub struct CrossFileIndex {
    graph: FileGraph,
    node_map: HashMap<String, NodeIndex>,
    exporters: HashMap<String, Vec<String>>,
    definers: HashMap<String, Vec<String>>,
    importers: HashMap<String, Vec<String>>,
}

impl CrossFileIndex {
    pub fn build(reports: &[FileReport]) -> Self {
        let mut exporters = HashMap::new();
        let mut definers = HashMap::new();
        let mut importers = HashMap::new();
        for report in reports {
            let file = report.relative.as_str();
            for export in &report.dependencies.exports {
                push_unique(&mut exporters, export, file);
            }
            for symbol in &report.dependencies.symbols {
                push_unique(&mut definers, symbol, file);
            }
            for imported in &report.dependencies.imports {
                push_unique(&mut importers, base_symbol(imported), file);
            }
        }

        let mut builder = GraphBuilder::new();
        for report in reports {
            builder.add_file(FileNode {
                relative: report.relative.clone(),
                language: report.language,
            });
        }
        for report in reports {
            for imported in &report.dependencies.imports {
                let sources = exporters
                    .get(imported.as_str())
                    .or_else(|| exporters.get(base_symbol(imported)));
                for source in sources.into_iter().flatten() {
                    builder.add_import(&report.relative, source, imported);
                }
            }
        }

        let node_map = reports
            .iter()
            .filter_map(|report| {
                builder
                    .get_node_index(&report.relative)
                    .map(|idx| (report.relative.clone(), idx))
            })
            .collect();

        Self {
            graph: builder.build(),
            node_map,
            exporters,
            definers,
            importers,
        }
    }

    pub fn graph(&self) -> &FileGraph {
        &self.graph
    }

    /// Files that `file`'s import of `imported` resolved to, in scan order.
    pub fn sources_of(&self, file: &str, imported: &str) -> Vec<&str> {
        let Some(&index) = self.node_map.get(file) else {
            return Vec::new();
        };
        let mut targets: Vec<NodeIndex> = self
            .graph
            .edges_directed(index, Direction::Outgoing)
            .filter(|edge| edge.weight().symbol == imported)
            .map(|edge| edge.target())
            .collect();
        targets.sort();
        targets.dedup();
        targets
            .into_iter()
            .map(|target| self.graph[target].relative.as_str())
            .collect()
    }

    pub fn exporting_files(&self, export: &str) -> &[String] {
        self.exporters.get(export).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn defining_files(&self, symbol: &str) -> &[String] {
        self.definers.get(symbol).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Files importing something whose base name is `symbol`.
    pub fn importers_of(&self, symbol: &str) -> &[String] {
        self.importers.get(symbol).map(Vec::as_slice).unwrap_or(&[])
    }
}

/// Use edges of every file merged by caller, each tagged with the file that
/// recorded it.
#[derive(Debug, Default)]
pub struct CallGraph {
    callers: Vec<(String, Vec<(String, String)>)>,
    index: HashMap<String, usize>,
}

impl CallGraph {
    pub fn merge(reports: &[FileReport]) -> Self {
        let mut graph = Self::default();
        for report in reports {
            let Some(analysis) = &report.relations else {
                continue;
            };
            for (caller, relations) in analysis.relations.iter() {
                let slot = graph.slot(caller);
                for relation in relations {
                    if let Relation::Uses(callee) = relation {
                        graph.callers[slot]
                            .1
                            .push((callee.clone(), report.relative.clone()));
                    }
                }
            }
        }
        graph
    }

    fn slot(&mut self, caller: &str) -> usize {
        if let Some(&slot) = self.index.get(caller) {
            return slot;
        }
        self.index.insert(caller.to_string(), self.callers.len());
        self.callers.push((caller.to_string(), Vec::new()));
        self.callers.len() - 1
    }

    /// Callers with at least one use edge, in first-seen order.
    pub fn callers(&self) -> impl Iterator<Item = (&str, &[(String, String)])> {
        self.callers
            .iter()
            .filter(|(_, callees)| !callees.is_empty())
            .map(|(caller, callees)| (caller.as_str(), callees.as_slice()))
    }
}
