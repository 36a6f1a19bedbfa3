use std::collections::{BTreeSet, HashMap};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SymbolKind {
    Class,
    Interface,
    Enum,
    Struct,
    Trait,
    Record,
    Function,
    Method,
    Property,
    Variable,
    Namespace,
}

impl SymbolKind {
    pub fn as_str(self) -> &'static str {
        match self {
            SymbolKind::Class => "class",
            SymbolKind::Interface => "interface",
            SymbolKind::Enum => "enum",
            SymbolKind::Struct => "struct",
            SymbolKind::Trait => "trait",
            SymbolKind::Record => "record",
            SymbolKind::Function => "function",
            SymbolKind::Method => "method",
            SymbolKind::Property => "property",
            SymbolKind::Variable => "variable",
            SymbolKind::Namespace => "namespace",
        }
    }

    /// Kinds that can own methods and carry inheritance edges.
    pub fn is_type(self) -> bool {
        matches!(
            self,
            SymbolKind::Class
                | SymbolKind::Interface
                | SymbolKind::Enum
                | SymbolKind::Struct
                | SymbolKind::Trait
                | SymbolKind::Record
        )
    }
}

impl fmt::Display for SymbolKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A declared name found by a heuristic rule.
///
/// `owner` names the enclosing type of a method or property. It always refers
/// to a type recorded earlier in the same [`SymbolTable`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SymbolRecord {
    pub name: String,
    pub kind: SymbolKind,
    pub owner: Option<String>,
}

impl SymbolRecord {
    pub fn new(name: impl Into<String>, kind: SymbolKind) -> Self {
        Self {
            name: name.into(),
            kind,
            owner: None,
        }
    }

    pub fn member_of(name: impl Into<String>, kind: SymbolKind, owner: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            kind,
            owner: Some(owner.into()),
        }
    }

    pub fn is_member(&self) -> bool {
        self.owner.is_some()
    }

    /// `class`, `function`, `method of User`, ...
    pub fn describe(&self) -> String {
        match &self.owner {
            Some(owner) => format!("{} of {}", self.kind, owner),
            None => self.kind.to_string(),
        }
    }
}

/// Insertion-ordered symbol table. A name is classified once; later
/// inserts of the same name are ignored.
#[derive(Debug, Clone, Default)]
pub struct SymbolTable {
    records: Vec<SymbolRecord>,
    index: HashMap<String, usize>,
}

impl SymbolTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns `false` when the name was already classified.
    pub fn insert(&mut self, record: SymbolRecord) -> bool {
        if self.index.contains_key(&record.name) {
            return false;
        }
        self.index.insert(record.name.clone(), self.records.len());
        self.records.push(record);
        true
    }

    pub fn get(&self, name: &str) -> Option<&SymbolRecord> {
        self.index.get(name).map(|&idx| &self.records[idx])
    }

    pub fn contains(&self, name: &str) -> bool {
        self.index.contains_key(name)
    }

    pub fn describe(&self, name: &str) -> String {
        self.get(name).map(SymbolRecord::describe).unwrap_or_default()
    }

    pub fn iter(&self) -> impl Iterator<Item = &SymbolRecord> {
        self.records.iter()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

/// A labeled fact about one symbol.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Relation {
    InheritsFrom(String),
    HasMethod(String),
    Uses(String),
}

impl fmt::Display for Relation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Relation::InheritsFrom(parent) => write!(f, "inherits from {parent}"),
            Relation::HasMethod(method) => write!(f, "has method {method}"),
            Relation::Uses(target) => write!(f, "uses {target}"),
        }
    }
}

/// Source symbol → relations, both in discovery order. Duplicate edges are
/// kept.
#[derive(Debug, Clone, Default)]
pub struct RelationMap {
    entries: Vec<(String, Vec<Relation>)>,
    index: HashMap<String, usize>,
}

impl RelationMap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, source: &str, relation: Relation) {
        let idx = match self.index.get(source) {
            Some(&idx) => idx,
            None => {
                self.index.insert(source.to_string(), self.entries.len());
                self.entries.push((source.to_string(), Vec::new()));
                self.entries.len() - 1
            }
        };
        self.entries[idx].1.push(relation);
    }

    pub fn get(&self, source: &str) -> &[Relation] {
        self.index
            .get(source)
            .map(|&idx| self.entries[idx].1.as_slice())
            .unwrap_or(&[])
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &[Relation])> {
        self.entries
            .iter()
            .map(|(source, relations)| (source.as_str(), relations.as_slice()))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Output of the internal relation analysis of one file.
#[derive(Debug, Clone, Default)]
pub struct RelationAnalysis {
    pub symbols: SymbolTable,
    pub relations: RelationMap,
}

impl RelationAnalysis {
    pub fn is_empty(&self) -> bool {
        self.symbols.is_empty() && self.relations.is_empty()
    }
}

/// Imported, exported and declared names of one file.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FileDependencySet {
    pub imports: BTreeSet<String>,
    pub exports: BTreeSet<String>,
    pub symbols: BTreeSet<String>,
}

impl FileDependencySet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.imports.is_empty() && self.exports.is_empty() && self.symbols.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn symbol_kind_is_assigned_once() {
        let mut table = SymbolTable::new();
        assert!(table.insert(SymbolRecord::member_of("save", SymbolKind::Method, "User")));
        assert!(!table.insert(SymbolRecord::new("save", SymbolKind::Function)));
        assert_eq!(table.describe("save"), "method of User");
        assert_eq!(table.len(), 1);
    }

    #[test]
    fn relation_map_keeps_duplicates_in_order() {
        let mut map = RelationMap::new();
        map.push("A", Relation::InheritsFrom("B".into()));
        map.push("A", Relation::InheritsFrom("B".into()));
        map.push("A", Relation::HasMethod("run".into()));
        let labels: Vec<String> = map.get("A").iter().map(ToString::to_string).collect();
        assert_eq!(
            labels,
            vec!["inherits from B", "inherits from B", "has method run"]
        );
    }
}
