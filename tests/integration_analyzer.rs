use codesketch::core::CodebaseAnalyzer;
use codesketch::formatters::RelationFormatter;
use std::fs;
use std::path::Path;

const MODELS: &str = "class User:
    def save(self):
        return True

def load_users():
    return [User()]
";

const SERVICES: &str = "from models import User

class Service:
    def run(self):
        return User()

def main():
    return Service()
";

fn project() -> tempfile::TempDir {
    let dir = tempfile::TempDir::new().unwrap();
    fs::write(dir.path().join("models.py"), MODELS).unwrap();
    fs::write(dir.path().join("services.py"), SERVICES).unwrap();
    dir
}

fn relation_diagram(root: &Path, depth: u8) -> String {
    let relations = CodebaseAnalyzer::new().analyze_relations(root, depth).unwrap();
    RelationFormatter::new(depth).format(&relations)
}

#[test]
fn depth_one_shows_resolved_file_dependencies() {
    let dir = project();
    let diagram = relation_diagram(dir.path(), 1);
    assert_eq!(
        diagram,
        "File Dependencies:\n\
         \n\
         services.py\n  \
         └── imports from:\n      \
         └── models.User (from models.py)"
    );
}

#[test]
fn unresolved_imports_are_external() {
    let dir = project();
    fs::write(dir.path().join("cli.py"), "import argparse\n").unwrap();
    let diagram = relation_diagram(dir.path(), 1);
    assert!(diagram.contains("\ncli.py\n  └── imports from:\n      └── argparse (external)"));
}

#[test]
fn depth_two_adds_cross_file_usage() {
    let dir = project();
    let diagram = relation_diagram(dir.path(), 2);
    let usage = diagram
        .split("\n\nSymbol Usage Across Files:")
        .nth(1)
        .expect("usage section");
    assert_eq!(
        usage,
        "\n\
         \nmodels.py defines:\
         \n  └── User\
         \n      └── used by:\
         \n          └── services.py\
         \n  └── load_users\
         \n  └── save\
         \n\
         \nservices.py defines:\
         \n  └── Service\
         \n  └── main\
         \n  └── run"
    );
    assert!(!diagram.contains("Function Call Graph:"));
}

#[test]
fn depth_three_adds_the_merged_call_graph() {
    let dir = project();
    let diagram = relation_diagram(dir.path(), 3);
    let calls = diagram
        .split("\n\nFunction Call Graph:")
        .nth(1)
        .expect("call graph section");
    assert_eq!(
        calls,
        "\n\
         \nload_users (in models.py)\
         \n  └── calls User (in models.py)\
         \n\
         \nmain (in services.py)\
         \n  └── calls Service (in services.py)"
    );
}

#[test]
fn a_single_file_shows_internal_relationships() {
    let dir = project();
    let diagram = relation_diagram(&dir.path().join("models.py"), 1);
    assert_eq!(
        diagram,
        "Internal Symbol Relationships:\
         \nSymbol Types:\
         \n  └── User [class]\
         \n  └── save [method of User]\
         \n  └── load_users [function]\
         \n\
         \nRelationships:\
         \n\
         \nUser [class]\
         \n  └── has method save\
         \n\
         \nload_users [function]\
         \n  └── uses User [class]"
    );
}

#[test]
fn manifests_take_part_in_the_relation_scan() {
    let dir = project();
    fs::write(
        dir.path().join("package.json"),
        r#"{ "name": "web", "dependencies": { "react": "^18.2.0" } }"#,
    )
    .unwrap();
    let diagram = relation_diagram(dir.path(), 1);
    assert!(diagram.contains("\npackage.json\n  └── imports from:\n      └── dependency:react (^18.2.0) (external)"));
}

#[test]
fn missing_paths_fail_the_command() {
    let dir = tempfile::TempDir::new().unwrap();
    let err = CodebaseAnalyzer::new()
        .analyze_relations(&dir.path().join("nope"), 1)
        .unwrap_err();
    assert!(err.to_string().ends_with("does not exist"));
}
