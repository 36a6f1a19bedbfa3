//! Project manifests: package descriptors, lock-style requirement lists,
//! container and build files.
//!
//! Manifests produce the same `(imports, exports, symbols)` triple as source
//! files, with each entry prefixed by what it is (`dependency:`, `Port:`,
//! `Artifact:`, ...). Unrecognized or malformed manifests yield an empty set.

use regex::Regex;
use serde::Deserialize;
use std::collections::BTreeMap;
use std::path::Path;
use std::sync::LazyLock;
use tracing::{debug, warn};

use super::common::{compile, read_source};
use crate::core::FileDependencySet;
use crate::error::{SketchError, SketchResult};

const MANIFEST_NAMES: &[&str] = &[
    "package.json",
    "requirements.txt",
    "Dockerfile",
    "docker-compose.yml",
    "docker-compose.yaml",
    "go.mod",
    "pom.xml",
    "build.gradle",
    "Cargo.toml",
    "Gemfile",
    "pyproject.toml",
    "Pipfile",
    ".gitlab-ci.yml",
    ".travis.yml",
    "tsconfig.json",
    "CMakeLists.txt",
    "Makefile",
    "serverless.yml",
    "Chart.yaml",
    "kustomization.yaml",
];

const MANIFEST_EXTENSIONS: &[&str] = &["csproj", "fsproj", "vbproj", "sln", "gradle", "tf"];

/// Whether `path` names a manifest rather than a source file.
pub fn is_manifest(path: &Path) -> bool {
    let name = path.file_name().and_then(|n| n.to_str()).unwrap_or("");
    let extension = path
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_ascii_lowercase)
        .unwrap_or_default();
    MANIFEST_NAMES.contains(&name) || MANIFEST_EXTENSIONS.contains(&extension.as_str())
}

/// Reads a manifest into a dependency set. Implementations never fail; a
/// manifest they cannot read contributes nothing.
pub trait ManifestParser {
    fn parse(&self, path: &Path) -> FileDependencySet;
}

#[derive(Debug, Default, Clone, Copy)]
pub struct DefaultManifestParser;

impl DefaultManifestParser {
    pub fn new() -> Self {
        Self
    }

    fn try_parse(&self, path: &Path) -> SketchResult<FileDependencySet> {
        let name = path.file_name().and_then(|n| n.to_str()).unwrap_or("");
        let extension = path
            .extension()
            .and_then(|e| e.to_str())
            .map(str::to_ascii_lowercase)
            .unwrap_or_default();

        match (name, extension.as_str()) {
            ("package.json", _) => parse_package_json(path),
            ("requirements.txt", _) => Ok(parse_requirements(&read_source(path)?)),
            ("Dockerfile", _) => Ok(parse_dockerfile(&read_source(path)?)),
            ("go.mod", _) => Ok(parse_go_mod(&read_source(path)?)),
            ("pom.xml", _) => parse_pom(path),
            ("Cargo.toml", _) => parse_cargo_toml(path),
            (_, "gradle") => Ok(parse_gradle(&read_source(path)?)),
            (_, "csproj" | "fsproj" | "vbproj") => Ok(parse_msbuild(&read_source(path)?)),
            (_, "sln") => Ok(parse_solution(&read_source(path)?)),
            _ => {
                debug!(path = %path.display(), "no manifest reader, contributing nothing");
                Ok(FileDependencySet::new())
            }
        }
    }
}

impl ManifestParser for DefaultManifestParser {
    fn parse(&self, path: &Path) -> FileDependencySet {
        self.try_parse(path).unwrap_or_else(|err| {
            warn!("Error parsing project file {}: {err}", path.display());
            FileDependencySet::new()
        })
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
struct PackageManifest {
    name: Option<String>,
    version: Option<String>,
    dependencies: BTreeMap<String, serde_json::Value>,
    dev_dependencies: BTreeMap<String, serde_json::Value>,
    peer_dependencies: BTreeMap<String, serde_json::Value>,
    scripts: BTreeMap<String, serde_json::Value>,
}

fn json_text(value: &serde_json::Value) -> String {
    match value {
        serde_json::Value::String(text) => text.clone(),
        other => other.to_string(),
    }
}

fn parse_package_json(path: &Path) -> SketchResult<FileDependencySet> {
    let manifest: PackageManifest =
        serde_json::from_str(&read_source(path)?).map_err(|err| SketchError::ManifestParse {
            path: path.to_path_buf(),
            reason: err.to_string(),
        })?;

    let mut deps = FileDependencySet::new();
    if let Some(name) = manifest.name {
        deps.exports.insert(format!("Package:{name}"));
    }
    if let Some(version) = manifest.version {
        deps.symbols.insert(format!("Version:{version}"));
    }
    let groups = [
        ("dependency", &manifest.dependencies),
        ("devDependency", &manifest.dev_dependencies),
        ("peerDependency", &manifest.peer_dependencies),
    ];
    for (label, group) in groups {
        for (name, version) in group {
            deps.imports
                .insert(format!("{label}:{name} ({})", json_text(version)));
        }
    }
    deps.symbols.extend(
        manifest
            .scripts
            .keys()
            .map(|script| format!("Script:{script}")),
    );
    Ok(deps)
}

fn parse_requirements(text: &str) -> FileDependencySet {
    let mut deps = FileDependencySet::new();
    deps.imports.extend(
        text.lines()
            .map(str::trim)
            .filter(|line| !line.is_empty() && !line.starts_with('#'))
            .map(|line| format!("Requirement:{line}")),
    );
    deps
}

static DOCKER_FROM: LazyLock<Regex> =
    LazyLock::new(|| compile(r"(?im)^[ \t]*FROM\s+(?:--\S+\s+)*(\S+)(?:\s+AS\s+(\S+))?"));
static DOCKER_EXPOSE: LazyLock<Regex> =
    LazyLock::new(|| compile(r"(?im)^[ \t]*EXPOSE\s+([^\n]+)"));
static DOCKER_ENV: LazyLock<Regex> =
    LazyLock::new(|| compile(r"(?im)^[ \t]*ENV\s+([^\s=]+)(?:\s+|=)"));

fn parse_dockerfile(text: &str) -> FileDependencySet {
    let mut deps = FileDependencySet::new();
    for caps in DOCKER_FROM.captures_iter(text) {
        deps.imports.insert(format!("BaseImage:{}", &caps[1]));
        if let Some(stage) = caps.get(2) {
            deps.symbols.insert(format!("Stage:{}", stage.as_str()));
        }
    }
    for caps in DOCKER_EXPOSE.captures_iter(text) {
        deps.symbols.extend(
            caps[1]
                .split_whitespace()
                .map(|port| format!("Port:{port}")),
        );
    }
    for caps in DOCKER_ENV.captures_iter(text) {
        deps.symbols.insert(format!("Env:{}", &caps[1]));
    }
    deps
}

static GO_MODULE: LazyLock<Regex> = LazyLock::new(|| compile(r"(?m)^module\s+(\S+)"));
static GO_REQUIRE: LazyLock<Regex> =
    LazyLock::new(|| compile(r"(?m)^require\s+([^\s(]+)\s+(\S+)"));
static GO_REQUIRE_BLOCK: LazyLock<Regex> =
    LazyLock::new(|| compile(r"(?ms)^require\s*\((.*?)^\)"));

fn parse_go_mod(text: &str) -> FileDependencySet {
    let mut deps = FileDependencySet::new();
    if let Some(caps) = GO_MODULE.captures(text) {
        deps.exports.insert(format!("Module:{}", &caps[1]));
    }
    for caps in GO_REQUIRE.captures_iter(text) {
        deps.imports
            .insert(format!("Require:{} ({})", &caps[1], &caps[2]));
    }
    for caps in GO_REQUIRE_BLOCK.captures_iter(text) {
        for line in caps[1].lines() {
            let line = line.split("//").next().unwrap_or("");
            let mut parts = line.split_whitespace();
            if let (Some(module), Some(version)) = (parts.next(), parts.next()) {
                deps.imports.insert(format!("Require:{module} ({version})"));
            }
        }
    }
    deps
}

static POM_NESTED: LazyLock<Regex> = LazyLock::new(|| {
    compile(
        r"(?s)<parent>.*?</parent>|<dependencies>.*?</dependencies>|<dependencyManagement>.*?</dependencyManagement>|<build>.*?</build>|<profiles>.*?</profiles>",
    )
});
static POM_DEPENDENCY: LazyLock<Regex> =
    LazyLock::new(|| compile(r"(?s)<dependency>(.*?)</dependency>"));

fn xml_text<'t>(fragment: &'t str, tag: &str) -> Option<&'t str> {
    let open = format!("<{tag}>");
    let close = format!("</{tag}>");
    let start = fragment.find(&open)? + open.len();
    let end = fragment[start..].find(&close)? + start;
    Some(fragment[start..end].trim()).filter(|text| !text.is_empty())
}

fn parse_pom(path: &Path) -> SketchResult<FileDependencySet> {
    let text = read_source(path)?;
    if !text.contains("<project") {
        return Err(SketchError::ManifestParse {
            path: path.to_path_buf(),
            reason: "missing <project> root element".to_string(),
        });
    }

    let mut deps = FileDependencySet::new();
    let own = POM_NESTED.replace_all(&text, "");
    if let Some(artifact) = xml_text(&own, "artifactId") {
        deps.exports.insert(format!("Artifact:{artifact}"));
        if let Some(group) = xml_text(&own, "groupId") {
            deps.symbols.insert(format!("GroupId:{group}"));
        }
        if let Some(version) = xml_text(&own, "version") {
            deps.symbols.insert(format!("Version:{version}"));
        }
    }

    for caps in POM_DEPENDENCY.captures_iter(&text) {
        let dependency = &caps[1];
        let (Some(group), Some(artifact)) = (
            xml_text(dependency, "groupId"),
            xml_text(dependency, "artifactId"),
        ) else {
            continue;
        };
        match xml_text(dependency, "version") {
            Some(version) => deps
                .imports
                .insert(format!("Dependency:{group}:{artifact} ({version})")),
            None => deps.imports.insert(format!("Dependency:{group}:{artifact}")),
        };
    }
    Ok(deps)
}

static GRADLE_DEPENDENCY: LazyLock<Regex> = LazyLock::new(|| {
    compile(
        r#"\b(implementation|api|compileOnly|runtimeOnly|testImplementation|testRuntimeOnly|testCompileOnly|annotationProcessor|kapt)\s*\(?\s*['"]([^'"]+)['"]"#,
    )
});
static GRADLE_PLUGIN: LazyLock<Regex> = LazyLock::new(|| {
    compile(r#"(?m)apply\s+plugin\s*:\s*['"]([^'"]+)['"]|^[ \t]*id\s*\(?\s*['"]([^'"]+)['"]"#)
});

fn parse_gradle(text: &str) -> FileDependencySet {
    let mut deps = FileDependencySet::new();
    for caps in GRADLE_DEPENDENCY.captures_iter(text) {
        deps.imports.insert(format!("{}:{}", &caps[1], &caps[2]));
    }
    for caps in GRADLE_PLUGIN.captures_iter(text) {
        if let Some(plugin) = caps.get(1).or_else(|| caps.get(2)) {
            deps.symbols.insert(format!("Plugin:{}", plugin.as_str()));
        }
    }
    deps
}

fn cargo_requirement(spec: &toml::Value) -> Option<String> {
    match spec {
        toml::Value::String(version) => Some(version.clone()),
        toml::Value::Table(table) => table
            .get("version")
            .and_then(|v| v.as_str())
            .map(String::from),
        _ => None,
    }
}

fn parse_cargo_toml(path: &Path) -> SketchResult<FileDependencySet> {
    let manifest: toml::Table =
        toml::from_str(&read_source(path)?).map_err(|err| SketchError::ManifestParse {
            path: path.to_path_buf(),
            reason: err.to_string(),
        })?;

    let mut deps = FileDependencySet::new();
    if let Some(package) = manifest.get("package").and_then(|p| p.as_table()) {
        if let Some(name) = package.get("name").and_then(|n| n.as_str()) {
            deps.exports.insert(format!("Crate:{name}"));
        }
        if let Some(version) = package.get("version").and_then(|v| v.as_str()) {
            deps.symbols.insert(format!("Version:{version}"));
        }
    }

    let sections = [
        ("dependencies", "dependency"),
        ("dev-dependencies", "devDependency"),
        ("build-dependencies", "buildDependency"),
    ];
    for (section, label) in sections {
        let Some(table) = manifest.get(section).and_then(|s| s.as_table()) else {
            continue;
        };
        for (name, spec) in table {
            match cargo_requirement(spec) {
                Some(version) => deps.imports.insert(format!("{label}:{name} ({version})")),
                None => deps.imports.insert(format!("{label}:{name}")),
            };
        }
    }
    Ok(deps)
}

static MSBUILD_ITEM: LazyLock<Regex> =
    LazyLock::new(|| compile(r"<(PackageReference|ProjectReference)\b([^>]*)>"));
static MSBUILD_ATTR: LazyLock<Regex> = LazyLock::new(|| compile(r#"(\w+)\s*=\s*"([^"]*)""#));
static MSBUILD_FRAMEWORK: LazyLock<Regex> =
    LazyLock::new(|| compile(r"<TargetFrameworks?>([^<]+)</TargetFrameworks?>"));

fn parse_msbuild(text: &str) -> FileDependencySet {
    let mut deps = FileDependencySet::new();
    for caps in MSBUILD_ITEM.captures_iter(text) {
        let attrs: BTreeMap<&str, &str> = MSBUILD_ATTR
            .captures_iter(caps.get(2).map_or("", |m| m.as_str()))
            .filter_map(|attr| {
                Some((attr.get(1)?.as_str(), attr.get(2)?.as_str()))
            })
            .collect();
        let Some(include) = attrs.get("Include") else {
            continue;
        };
        match (&caps[1], attrs.get("Version")) {
            ("PackageReference", Some(version)) => deps
                .imports
                .insert(format!("PackageReference:{include} ({version})")),
            ("PackageReference", None) => deps.imports.insert(format!("PackageReference:{include}")),
            _ => deps.imports.insert(format!("ProjectReference:{include}")),
        };
    }
    for caps in MSBUILD_FRAMEWORK.captures_iter(text) {
        deps.symbols.extend(
            caps[1]
                .split(';')
                .map(str::trim)
                .filter(|framework| !framework.is_empty())
                .map(|framework| format!("TargetFramework:{framework}")),
        );
    }
    deps
}

static SLN_PROJECT: LazyLock<Regex> =
    LazyLock::new(|| compile(r#"(?m)^Project\("[^"]*"\)\s*=\s*"([^"]+)",\s*"([^"]+)""#));

fn parse_solution(text: &str) -> FileDependencySet {
    let mut deps = FileDependencySet::new();
    for caps in SLN_PROJECT.captures_iter(text) {
        deps.symbols.insert(format!("Project:{}", &caps[1]));
        deps.imports.insert(format!("ProjectReference:{}", &caps[2]));
    }
    deps
}
