use codesketch::parsers::manifest::{DefaultManifestParser, ManifestParser};
use std::fs;
use std::path::PathBuf;

fn write(dir: &tempfile::TempDir, name: &str, content: &str) -> PathBuf {
    let path = dir.path().join(name);
    fs::write(&path, content).unwrap();
    path
}

#[test]
fn package_json_lists_dependencies_scripts_and_name() {
    let dir = tempfile::TempDir::new().unwrap();
    let path = write(
        &dir,
        "package.json",
        r#"{
  "name": "web-app",
  "version": "1.2.0",
  "scripts": { "build": "vite build", "test": "vitest" },
  "dependencies": { "react": "^18.2.0" },
  "devDependencies": { "vite": "^5.0.0" },
  "peerDependencies": { "react-dom": "^18.0.0" }
}"#,
    );

    let deps = DefaultManifestParser::new().parse(&path);
    assert!(deps.exports.contains("Package:web-app"));
    assert!(deps.symbols.contains("Version:1.2.0"));
    assert!(deps.symbols.contains("Script:build"));
    assert!(deps.symbols.contains("Script:test"));
    let imports: Vec<&str> = deps.imports.iter().map(String::as_str).collect();
    assert_eq!(
        imports,
        vec![
            "dependency:react (^18.2.0)",
            "devDependency:vite (^5.0.0)",
            "peerDependency:react-dom (^18.0.0)",
        ]
    );
}

#[test]
fn malformed_manifests_contribute_nothing() {
    let dir = tempfile::TempDir::new().unwrap();
    let parser = DefaultManifestParser::new();

    let json = write(&dir, "package.json", "{ \"name\": ");
    assert!(parser.parse(&json).is_empty());

    let cargo = write(&dir, "Cargo.toml", "[package\nname = ");
    assert!(parser.parse(&cargo).is_empty());

    let pom = write(&dir, "pom.xml", "<settings></settings>");
    assert!(parser.parse(&pom).is_empty());

    let missing = dir.path().join("go.mod");
    assert!(parser.parse(&missing).is_empty());
}

#[test]
fn cargo_manifest_labels_each_dependency_table() {
    let dir = tempfile::TempDir::new().unwrap();
    let path = write(
        &dir,
        "Cargo.toml",
        r#"[package]
name = "sketch"
version = "0.3.1"

[dependencies]
regex = "1.10"
serde = { version = "1.0", features = ["derive"] }
local = { path = "../local" }

[dev-dependencies]
tempfile = "3.8"

[build-dependencies]
cc = "1"
"#,
    );

    let deps = DefaultManifestParser::new().parse(&path);
    assert!(deps.exports.contains("Crate:sketch"));
    assert!(deps.symbols.contains("Version:0.3.1"));
    for import in [
        "dependency:regex (1.10)",
        "dependency:serde (1.0)",
        "dependency:local",
        "devDependency:tempfile (3.8)",
        "buildDependency:cc (1)",
    ] {
        assert!(deps.imports.contains(import), "missing import {import}");
    }
}

#[test]
fn pom_reads_own_coordinates_and_dependencies() {
    let dir = tempfile::TempDir::new().unwrap();
    let path = write(
        &dir,
        "pom.xml",
        r#"<project>
  <parent><groupId>org.parent</groupId><artifactId>parent</artifactId><version>9</version></parent>
  <groupId>com.example</groupId>
  <artifactId>orders</artifactId>
  <version>2.0.0</version>
  <dependencies>
    <dependency>
      <groupId>junit</groupId>
      <artifactId>junit</artifactId>
      <version>4.13.2</version>
    </dependency>
    <dependency>
      <groupId>org.slf4j</groupId>
      <artifactId>slf4j-api</artifactId>
    </dependency>
  </dependencies>
</project>"#,
    );

    let deps = DefaultManifestParser::new().parse(&path);
    let exports: Vec<&str> = deps.exports.iter().map(String::as_str).collect();
    assert_eq!(exports, vec!["Artifact:orders"]);
    assert!(deps.symbols.contains("GroupId:com.example"));
    assert!(deps.symbols.contains("Version:2.0.0"));
    assert!(deps.imports.contains("Dependency:junit:junit (4.13.2)"));
    assert!(deps.imports.contains("Dependency:org.slf4j:slf4j-api"));
}

#[test]
fn requirements_and_gradle_files() {
    let dir = tempfile::TempDir::new().unwrap();
    let parser = DefaultManifestParser::new();

    let requirements = write(&dir, "requirements.txt", "# pinned\nrequests==2.31.0\n\nflask>=3\n");
    let imports: Vec<String> = parser.parse(&requirements).imports.into_iter().collect();
    assert_eq!(imports, vec!["Requirement:flask>=3", "Requirement:requests==2.31.0"]);

    let gradle = write(
        &dir,
        "build.gradle",
        "plugins {\n    id 'java'\n}\ndependencies {\n    implementation 'com.google.guava:guava:33.0.0-jre'\n    testImplementation(\"junit:junit:4.13.2\")\n}\n",
    );
    let deps = parser.parse(&gradle);
    assert!(deps.symbols.contains("Plugin:java"));
    assert!(deps.imports.contains("implementation:com.google.guava:guava:33.0.0-jre"));
    assert!(deps.imports.contains("testImplementation:junit:junit:4.13.2"));
}

#[test]
fn go_mod_reads_single_and_block_requires() {
    let dir = tempfile::TempDir::new().unwrap();
    let path = write(
        &dir,
        "go.mod",
        "module example.com/app\n\ngo 1.22\n\nrequire github.com/pkg/errors v0.9.1\n\nrequire (\n\tgolang.org/x/sync v0.6.0 // indirect\n\tgithub.com/spf13/cobra v1.8.0\n)\n",
    );

    let deps = DefaultManifestParser::new().parse(&path);
    assert!(deps.exports.contains("Module:example.com/app"));
    let imports: Vec<&str> = deps.imports.iter().map(String::as_str).collect();
    assert_eq!(
        imports,
        vec![
            "Require:github.com/pkg/errors (v0.9.1)",
            "Require:github.com/spf13/cobra (v1.8.0)",
            "Require:golang.org/x/sync (v0.6.0)",
        ]
    );
}

#[test]
fn msbuild_projects_list_package_and_project_references() {
    let dir = tempfile::TempDir::new().unwrap();
    let path = write(
        &dir,
        "Api.csproj",
        r#"<Project Sdk="Microsoft.NET.Sdk.Web">
  <PropertyGroup>
    <TargetFramework>net8.0</TargetFramework>
  </PropertyGroup>
  <ItemGroup>
    <PackageReference Include="Serilog" Version="3.1.1" />
    <PackageReference Include="Dapper" />
    <ProjectReference Include="..\Core\Core.csproj" />
  </ItemGroup>
</Project>"#,
    );

    let deps = DefaultManifestParser::new().parse(&path);
    assert!(deps.symbols.contains("TargetFramework:net8.0"));
    assert!(deps.imports.contains("PackageReference:Serilog (3.1.1)"));
    assert!(deps.imports.contains("PackageReference:Dapper"));
    assert!(deps.imports.contains(r"ProjectReference:..\Core\Core.csproj"));
}
