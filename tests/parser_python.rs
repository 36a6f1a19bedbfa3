use codesketch::config::DisplayCaps;
use codesketch::core::{Deadline, Language, Relation};
use codesketch::parsers::manifest::DefaultManifestParser;
use codesketch::parsers::{analyze_internal_relations, extract_dependencies, extract_structure, ScanContext};
use proptest::prelude::*;
use std::fs;
use std::time::Duration;

const SERVICE: &str = r#"
import os, sys as system
from models import User, Role as R
from . import utils

__all__ = ['Service', '_private']

class Service(Base):
    def __init__(self, repo):
        self.repo = repo

    def find(self, id):
        return helper(id)

def helper(x):
    return x

def _hidden():
    pass
"#;

#[test]
fn structure_lists_classes_with_methods_then_functions() {
    let lines = extract_structure(SERVICE, Language::Python, &ScanContext::unbounded());
    assert_eq!(
        lines,
        vec![
            "",
            "Class: Service extends Base",
            "  └── Method: __init__(self, repo)",
            "  └── Method: find(self, id)",
            "",
            "Functions:",
            "  └── helper(x)",
            "  └── _hidden()",
        ]
    );
}

#[test]
fn long_function_lists_are_truncated() {
    let source: String = (0..17).map(|i| format!("def f{i}():\n    pass\n")).collect();
    let lines = extract_structure(&source, Language::Python, &ScanContext::unbounded());
    assert_eq!(lines.len(), 2 + 15 + 1);
    assert_eq!(lines[16], "  └── f14()");
    assert_eq!(lines[17], "  └── ... and 2 more functions");
}

#[test]
fn display_caps_come_from_the_scan_context() {
    let source: String = (0..4).map(|i| format!("def f{i}():\n    pass\n")).collect();
    let cx = ScanContext {
        deadline: Deadline::unbounded(),
        caps: DisplayCaps {
            functions: 2,
            ..DisplayCaps::default()
        },
    };
    let lines = extract_structure(&source, Language::Python, &cx);
    assert_eq!(lines.last().unwrap(), "  └── ... and 2 more functions");
}

#[test]
fn dependencies_cover_imports_exports_and_symbols() {
    let dir = tempfile::TempDir::new().unwrap();
    let file = dir.path().join("service.py");
    fs::write(&file, SERVICE).unwrap();

    let deps = extract_dependencies(
        &file,
        Language::Python,
        &DefaultManifestParser::new(),
        &ScanContext::unbounded(),
    );

    let imports: Vec<&str> = deps.imports.iter().map(String::as_str).collect();
    assert_eq!(imports, vec![".utils", "models.Role", "models.User", "os", "sys"]);

    // __all__ entries plus public top-level names
    assert!(deps.exports.contains("Service"));
    assert!(deps.exports.contains("_private"));
    assert!(deps.exports.contains("helper"));
    assert!(!deps.exports.contains("_hidden"));
    assert!(!deps.exports.contains("find"));

    for symbol in ["Service", "__init__", "find", "helper", "_hidden"] {
        assert!(deps.symbols.contains(symbol), "missing symbol {symbol}");
    }
}

#[test]
fn relations_record_inheritance_methods_and_uses() {
    let analysis =
        analyze_internal_relations(SERVICE, Language::Python, &ScanContext::unbounded()).unwrap();

    assert_eq!(analysis.symbols.describe("Service"), "class");
    assert_eq!(analysis.symbols.describe("find"), "method of Service");
    assert_eq!(analysis.symbols.describe("helper"), "function");
    assert_eq!(
        analysis.relations.get("Service"),
        &[
            Relation::InheritsFrom("Base".into()),
            Relation::HasMethod("__init__".into()),
            Relation::HasMethod("find".into()),
            Relation::Uses("helper".into()),
        ]
    );
}

#[test]
fn a_name_owned_by_a_class_stays_a_method_in_either_order() {
    let function_first = "def save():\n    return 1\n\nclass User:\n    def save(self):\n        return 2\n";
    let method_first = "class User:\n    def save(self):\n        return 2\n\ndef save():\n    return 1\n";

    for source in [function_first, method_first] {
        let analysis =
            analyze_internal_relations(source, Language::Python, &ScanContext::unbounded()).unwrap();
        assert_eq!(analysis.symbols.describe("save"), "method of User");
        assert_eq!(analysis.symbols.len(), 2);
        assert_eq!(
            analysis.relations.get("User"),
            &[Relation::HasMethod("save".into())]
        );
    }
}

#[test]
fn object_base_is_implicit() {
    let source = "class Plain(object):\n    pass\n";
    let analysis =
        analyze_internal_relations(source, Language::Python, &ScanContext::unbounded()).unwrap();
    assert!(analysis.relations.get("Plain").is_empty());
}

#[test]
fn expired_deadline_degrades_to_a_single_error_line() {
    let cx = ScanContext {
        deadline: Deadline::after(Duration::ZERO),
        caps: DisplayCaps::default(),
    };
    let lines = extract_structure(SERVICE, Language::Python, &cx);
    assert_eq!(lines.len(), 1);
    assert!(lines[0].starts_with("Error parsing file:"));

    let err = analyze_internal_relations(SERVICE, Language::Python, &cx).unwrap_err();
    assert!(err.is_timeout());
}

proptest! {
    #[test]
    fn structure_extraction_is_deterministic(body in "[a-z_():\n ]{0,200}") {
        let source = format!("class A:\n    def run(self):\n{body}\n");
        let cx = ScanContext::unbounded();
        let first = extract_structure(&source, Language::Python, &cx);
        let second = extract_structure(&source, Language::Python, &cx);
        prop_assert_eq!(first, second);
    }

    #[test]
    fn dependency_extraction_is_idempotent(
        module in "[a-z]{1,8}",
        names in prop::collection::vec("[A-Za-z][a-z_]{0,8}", 1..5),
        body in "[a-z_():\n ]{0,120}",
    ) {
        let dir = tempfile::TempDir::new().unwrap();
        let manifests = DefaultManifestParser::new();
        let cx = ScanContext::unbounded();

        let python = dir.path().join("mod.py");
        fs::write(
            &python,
            format!("from {module} import {}\nimport {module}\n\ndef run():\n{body}\n", names.join(", ")),
        )
        .unwrap();
        let first = extract_dependencies(&python, Language::Python, &manifests, &cx);
        let second = extract_dependencies(&python, Language::Python, &manifests, &cx);
        prop_assert_eq!(first, second);

        let script = dir.path().join("mod.js");
        fs::write(
            &script,
            format!("import {{ {} }} from './{module}';\nexport function run() {{}}\n", names.join(", ")),
        )
        .unwrap();
        let first = extract_dependencies(&script, Language::JavaScript, &manifests, &cx);
        let second = extract_dependencies(&script, Language::JavaScript, &manifests, &cx);
        prop_assert_eq!(first, second);
    }
}
