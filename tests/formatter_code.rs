use codesketch::config::AnalysisConfig;
use codesketch::core::{CodebaseAnalyzer, Language};
use codesketch::formatters::CodeFormatter;
use std::fs;
use std::time::Duration;

fn project() -> tempfile::TempDir {
    let dir = tempfile::TempDir::new().unwrap();
    fs::write(dir.path().join("app.py"), "def main():\n    pass\n").unwrap();
    fs::write(dir.path().join("tool.go"), "package main\n\nfunc main() {}\n").unwrap();
    fs::write(dir.path().join("notes.md"), "# not code\n").unwrap();
    dir
}

#[test]
fn directory_report_lists_each_code_file() {
    let dir = project();
    let structure = CodebaseAnalyzer::new()
        .analyze_structure(dir.path(), None)
        .unwrap();
    let diagram = CodeFormatter::new().format(&structure);

    let rule = "=".repeat(50);
    let thin = "-".repeat(50);
    let expected = format!(
        "Code Diagram for Directory: {}\n{rule}\n\
         \nFile: app.py (python)\n{thin}\n\
         \nFunctions:\n  └── main()\n\
         \nFile: tool.go (go)\n{thin}\n\
         \nLanguage 'go' parsing not fully implemented.\
         \nShowing basic file information:\
         \n  └── Lines of code: 4\
         \n  └── Non-empty, non-comment lines: 2",
        structure.root_name
    );
    assert_eq!(diagram, expected);
}

#[test]
fn single_file_report_has_no_file_headers() {
    let dir = project();
    let structure = CodebaseAnalyzer::new()
        .analyze_structure(&dir.path().join("app.py"), None)
        .unwrap();
    let diagram = CodeFormatter::new().format(&structure);
    assert_eq!(
        diagram,
        format!(
            "Code Diagram for File: app.py\n{}\n\nFunctions:\n  └── main()",
            "=".repeat(50)
        )
    );
}

#[test]
fn language_override_applies_to_every_file() {
    let dir = tempfile::TempDir::new().unwrap();
    let file = dir.path().join("script.txt");
    fs::write(&file, "def run():\n    pass\n").unwrap();

    let structure = CodebaseAnalyzer::new()
        .analyze_structure(&file, Some(Language::Python))
        .unwrap();
    assert_eq!(structure.files[0].language, Language::Python);
    assert!(structure.files[0].lines.contains(&"  └── run()".to_string()));
}

#[test]
fn expired_budget_yields_an_error_line_for_that_file_only() {
    let dir = project();
    let config = AnalysisConfig::new().with_pattern_budget(Duration::ZERO);
    let structure = CodebaseAnalyzer::with_config(config)
        .analyze_structure(dir.path(), None)
        .unwrap();

    let python = &structure.files[0];
    assert_eq!(python.lines.len(), 1);
    assert!(python.lines[0].starts_with("Error parsing file:"));

    let go = &structure.files[1];
    assert!(go.lines.iter().any(|line| line.contains("Lines of code: 4")));
}
