//! Two-pass symbol resolution shared by every rule set.
//!
//! Rule sets only report what their patterns saw: type declarations with
//! their bases and bodies, scopes that own callables (type bodies, Rust
//! `impl` blocks), callables with their positions and bodies. [`Declarations::resolve`]
//! turns that into a [`RelationAnalysis`].

use std::collections::{HashMap, HashSet};
use std::ops::Range;

use super::common::{bounded_slice, words, CALLABLE_SLICE, TYPE_SLICE};
use crate::core::{Deadline, Relation, RelationAnalysis, SymbolKind, SymbolRecord};
use crate::error::SketchResult;

const IMPLICIT_BASES: &[&str] = &["object"];

struct Scope {
    owner: String,
    body: Range<usize>,
}

struct Callable {
    name: String,
    kind: SymbolKind,
    at: usize,
    body: Option<Range<usize>>,
    owner: Option<String>,
}

#[derive(Default)]
pub struct Declarations {
    types: Vec<(String, SymbolKind)>,
    others: Vec<(String, SymbolKind)>,
    bases: HashMap<String, Vec<String>>,
    bodies: HashMap<String, Range<usize>>,
    scopes: Vec<Scope>,
    callables: Vec<Callable>,
}

impl Declarations {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records a type. Its body, when known, also becomes an owning scope.
    pub fn add_type(&mut self, name: &str, kind: SymbolKind, body: Option<Range<usize>>) {
        self.types.push((name.to_string(), kind));
        if let Some(body) = body {
            self.bodies
                .entry(name.to_string())
                .or_insert_with(|| body.clone());
            self.add_scope(name, body);
        }
    }

    /// A block whose callables belong to `owner` without being its
    /// declaration, e.g. `impl Display for User { .. }`.
    pub fn add_scope(&mut self, owner: &str, body: Range<usize>) {
        self.scopes.push(Scope {
            owner: owner.to_string(),
            body,
        });
    }

    pub fn add_base(&mut self, child: &str, parent: &str) {
        self.bases
            .entry(child.to_string())
            .or_default()
            .push(parent.to_string());
    }

    pub fn add_callable(&mut self, name: &str, at: usize, body: Option<Range<usize>>) {
        self.add_member(name, SymbolKind::Method, at, body);
    }

    /// A callable or property whose owner is decided by the innermost scope
    /// containing `at`. Without a scope, methods fall back to functions and
    /// properties are dropped.
    pub fn add_member(
        &mut self,
        name: &str,
        kind: SymbolKind,
        at: usize,
        body: Option<Range<usize>>,
    ) {
        self.callables.push(Callable {
            name: name.to_string(),
            kind,
            at,
            body,
            owner: None,
        });
    }

    /// A method whose owner is spelled out, like C++ `Widget::draw`.
    pub fn add_qualified_method(
        &mut self,
        owner: &str,
        name: &str,
        at: usize,
        body: Option<Range<usize>>,
    ) {
        self.callables.push(Callable {
            name: name.to_string(),
            kind: SymbolKind::Method,
            at,
            body,
            owner: Some(owner.to_string()),
        });
    }

    /// Variables, namespaces and anything else that never owns members.
    pub fn add_symbol(&mut self, name: &str, kind: SymbolKind, body: Option<Range<usize>>) {
        self.others.push((name.to_string(), kind));
        if let Some(body) = body {
            self.bodies.entry(name.to_string()).or_insert(body);
        }
    }

    fn enclosing_scope(&self, at: usize) -> Option<&str> {
        self.scopes
            .iter()
            .filter(|scope| scope.body.contains(&at))
            .min_by_key(|scope| scope.body.len())
            .map(|scope| scope.owner.as_str())
    }

    pub fn resolve(mut self, source: &str, deadline: &Deadline) -> SketchResult<RelationAnalysis> {
        let mut analysis = RelationAnalysis::default();
        let mut owned: HashMap<String, Vec<String>> = HashMap::new();

        for (name, kind) in &self.types {
            analysis.symbols.insert(SymbolRecord::new(name.clone(), *kind));
        }

        self.callables.sort_by_key(|callable| callable.at);
        let owners: Vec<Option<String>> = self
            .callables
            .iter()
            .map(|callable| {
                callable
                    .owner
                    .as_deref()
                    .or_else(|| self.enclosing_scope(callable.at))
                    .filter(|owner| {
                        analysis
                            .symbols
                            .get(owner)
                            .is_some_and(|record| record.kind.is_type())
                    })
                    .map(str::to_string)
            })
            .collect();

        // A name owned by a type anywhere in the file is a method, even when a
        // free callable of the same name comes first.
        let claimed: HashSet<String> = self
            .callables
            .iter()
            .zip(&owners)
            .filter(|(_, owner)| owner.is_some())
            .map(|(callable, _)| callable.name.clone())
            .collect();

        for (callable, owner) in self.callables.iter().zip(&owners) {
            if let Some(existing) = analysis.symbols.get(&callable.name) {
                if existing.kind.is_type() {
                    continue;
                }
            }

            match owner {
                Some(owner) => {
                    let inserted = analysis.symbols.insert(SymbolRecord::member_of(
                        callable.name.clone(),
                        callable.kind,
                        owner.clone(),
                    ));
                    let same_owner = analysis
                        .symbols
                        .get(&callable.name)
                        .is_some_and(|record| record.owner.as_deref() == Some(owner.as_str()));
                    if inserted || same_owner {
                        owned
                            .entry(owner.clone())
                            .or_default()
                            .push(callable.name.clone());
                    }
                }
                None if callable.kind == SymbolKind::Method => {
                    if !claimed.contains(&callable.name) {
                        analysis
                            .symbols
                            .insert(SymbolRecord::new(callable.name.clone(), SymbolKind::Function));
                    }
                }
                None => {}
            }

            if let Some(body) = &callable.body {
                self.bodies
                    .entry(callable.name.clone())
                    .or_insert_with(|| body.clone());
            }
        }

        for (name, kind) in &self.others {
            analysis.symbols.insert(SymbolRecord::new(name.clone(), *kind));
        }

        let referable: Vec<&str> = analysis
            .symbols
            .iter()
            .filter(|record| !record.is_member() && record.kind != SymbolKind::Namespace)
            .map(|record| record.name.as_str())
            .collect();

        for record in analysis.symbols.iter() {
            if record.is_member() {
                continue;
            }
            deadline.check()?;

            let name = record.name.as_str();
            for parent in self.bases.get(name).into_iter().flatten() {
                if !IMPLICIT_BASES.contains(&parent.as_str()) {
                    analysis
                        .relations
                        .push(name, Relation::InheritsFrom(parent.clone()));
                }
            }
            for method in owned.get(name).into_iter().flatten() {
                analysis
                    .relations
                    .push(name, Relation::HasMethod(method.clone()));
            }

            let limit = if record.kind.is_type() {
                TYPE_SLICE
            } else {
                CALLABLE_SLICE
            };
            let Some(body) = self.bodies.get(name) else {
                continue;
            };
            let seen = words(bounded_slice(source, body, limit));
            for target in &referable {
                if *target != name && seen.contains(target) {
                    analysis
                        .relations
                        .push(name, Relation::Uses(target.to_string()));
                }
            }
        }

        Ok(analysis)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn callables_inside_type_bodies_become_methods() {
        let src = "class A { run() { helper() } } function helper() {}";
        let mut decls = Declarations::new();
        decls.add_type("A", SymbolKind::Class, Some(9..29));
        decls.add_callable("run", 10, Some(17..27));
        decls.add_callable("helper", 40, Some(50..51));

        let analysis = decls.resolve(src, &Deadline::unbounded()).unwrap();
        assert_eq!(analysis.symbols.describe("run"), "method of A");
        assert_eq!(analysis.symbols.describe("helper"), "function");
        assert_eq!(analysis.relations.get("A")[0], Relation::HasMethod("run".into()));
        assert!(analysis
            .relations
            .get("A")
            .contains(&Relation::Uses("helper".into())));
    }

    #[test]
    fn constructors_named_like_their_type_are_skipped() {
        let mut decls = Declarations::new();
        decls.add_type("User", SymbolKind::Class, Some(0..40));
        decls.add_callable("User", 5, None);

        let analysis = decls.resolve(&" ".repeat(40), &Deadline::unbounded()).unwrap();
        assert_eq!(analysis.symbols.len(), 1);
        assert!(analysis.relations.get("User").is_empty());
    }

    #[test]
    fn a_method_name_is_owned_by_its_first_type_only() {
        let mut decls = Declarations::new();
        decls.add_type("Named", SymbolKind::Trait, Some(0..20));
        decls.add_type("Store", SymbolKind::Struct, None);
        decls.add_scope("Store", 30..50);
        decls.add_callable("name", 40, None);
        decls.add_callable("name", 10, None);
        decls.add_callable("len", 60, None);
        decls.add_callable("len", 45, None);

        let analysis = decls.resolve(&" ".repeat(70), &Deadline::unbounded()).unwrap();
        assert_eq!(analysis.symbols.describe("name"), "method of Named");
        assert_eq!(analysis.symbols.describe("len"), "method of Store");
        assert_eq!(
            analysis.relations.get("Named"),
            &[Relation::HasMethod("name".into())]
        );
        assert_eq!(
            analysis.relations.get("Store"),
            &[Relation::HasMethod("len".into())]
        );
    }

    #[test]
    fn implicit_object_base_is_dropped_and_duplicates_kept() {
        let mut decls = Declarations::new();
        decls.add_type("A", SymbolKind::Class, None);
        decls.add_base("A", "object");
        decls.add_base("A", "Base");
        decls.add_base("A", "Base");

        let analysis = decls.resolve("", &Deadline::unbounded()).unwrap();
        assert_eq!(
            analysis.relations.get("A"),
            &[
                Relation::InheritsFrom("Base".into()),
                Relation::InheritsFrom("Base".into())
            ]
        );
    }
}
