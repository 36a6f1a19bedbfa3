use codesketch::formatters::DirectoryFormatter;
use std::fs;

fn tree() -> tempfile::TempDir {
    let dir = tempfile::TempDir::new().unwrap();
    let root = dir.path();
    fs::write(root.join("b.txt"), "").unwrap();
    fs::write(root.join("a.txt"), "").unwrap();
    fs::create_dir_all(root.join("sub/inner")).unwrap();
    fs::write(root.join("sub/c.txt"), "").unwrap();
    fs::write(root.join("sub/inner/d.txt"), "").unwrap();
    dir
}

fn root_name(dir: &tempfile::TempDir) -> String {
    dir.path()
        .canonicalize()
        .unwrap()
        .file_name()
        .unwrap()
        .to_string_lossy()
        .into_owned()
}

#[test]
fn entries_are_sorted_with_box_connectors() {
    let dir = tree();
    let diagram = DirectoryFormatter::new().format(dir.path()).unwrap();
    let expected = format!(
        "{}\n├── a.txt\n├── b.txt\n└── sub\n    ├── c.txt\n    └── inner\n        └── d.txt",
        root_name(&dir)
    );
    assert_eq!(diagram, expected);
}

#[test]
fn max_depth_limits_recursion() {
    let dir = tree();
    let diagram = DirectoryFormatter::new()
        .with_max_depth(Some(1))
        .format(dir.path())
        .unwrap();
    let expected = format!("{}\n├── a.txt\n├── b.txt\n└── sub", root_name(&dir));
    assert_eq!(diagram, expected);
}

#[test]
fn continuation_bars_follow_non_last_directories() {
    let dir = tempfile::TempDir::new().unwrap();
    fs::create_dir_all(dir.path().join("a")).unwrap();
    fs::write(dir.path().join("a/x.txt"), "").unwrap();
    fs::write(dir.path().join("z.txt"), "").unwrap();

    let diagram = DirectoryFormatter::new().format(dir.path()).unwrap();
    let lines: Vec<&str> = diagram.lines().skip(1).collect();
    assert_eq!(lines, vec!["├── a", "│   └── x.txt", "└── z.txt"]);
}

#[test]
fn format_to_file_writes_the_diagram() {
    let dir = tree();
    let out = tempfile::TempDir::new().unwrap();
    let output = out.path().join("directory_diagram.txt");
    DirectoryFormatter::new()
        .format_to_file(dir.path(), &output)
        .unwrap();
    let written = fs::read_to_string(&output).unwrap();
    assert!(written.starts_with(&root_name(&dir)));
    assert!(written.ends_with("└── d.txt"));
}

#[test]
fn missing_root_is_an_error() {
    let dir = tempfile::TempDir::new().unwrap();
    assert!(DirectoryFormatter::new()
        .format(&dir.path().join("absent"))
        .is_err());
}
