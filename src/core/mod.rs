pub mod analyzer;
pub mod deadline;
pub mod graph;
pub mod language;
pub mod scanner;
pub mod symbols;

pub use analyzer::{CodebaseAnalyzer, FileReport, RelationSet, StructureReport, StructureSet};
pub use deadline::Deadline;
pub use graph::{CallGraph, CrossFileIndex, FileGraph, FileNode, GraphBuilder, ImportEdge};
pub use language::{classify, classify_path, Language};
pub use scanner::{FileInfo, FileScanner};
pub use symbols::{
    FileDependencySet, Relation, RelationAnalysis, RelationMap, SymbolKind, SymbolRecord,
    SymbolTable,
};
