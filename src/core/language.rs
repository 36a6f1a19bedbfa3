use std::fmt;
use std::path::Path;

/// Language family a file is analyzed as.
///
/// Only the named variants have rule sets. Tags that are recognized but have
/// no rules (`go`, `kotlin`, `npm`, ...) travel as [`Language::Other`] so that
/// reports can still name them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Language {
    Python,
    JavaScript,
    TypeScript,
    Rust,
    Java,
    C,
    Cpp,
    CSharp,
    Other(&'static str),
    Unknown,
}

impl Language {
    pub fn as_str(self) -> &'static str {
        match self {
            Language::Python => "python",
            Language::JavaScript => "javascript",
            Language::TypeScript => "typescript",
            Language::Rust => "rust",
            Language::Java => "java",
            Language::C => "c",
            Language::Cpp => "cpp",
            Language::CSharp => "csharp",
            Language::Other(tag) => tag,
            Language::Unknown => "unknown",
        }
    }

    /// Parses a user supplied language name, accepting common aliases.
    pub fn from_tag(tag: &str) -> Language {
        let tag = tag.trim().to_ascii_lowercase();
        match tag.as_str() {
            "python" | "py" => Language::Python,
            "javascript" | "js" => Language::JavaScript,
            "typescript" | "ts" => Language::TypeScript,
            "rust" | "rs" => Language::Rust,
            "java" => Language::Java,
            "c" => Language::C,
            "cpp" | "c++" => Language::Cpp,
            "csharp" | "cs" | "c#" => Language::CSharp,
            other => EXTENSIONS
                .iter()
                .chain(FILE_NAMES)
                .find(|(_, known)| *known == other)
                .map(|(_, known)| from_table_tag(known))
                .unwrap_or(Language::Unknown),
        }
    }

    pub fn has_rules(self) -> bool {
        !matches!(self, Language::Other(_) | Language::Unknown)
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Exact file names, checked before extensions.
const FILE_NAMES: &[(&str, &str)] = &[
    ("BUILD", "bazel"),
    ("WORKSPACE", "bazel"),
    ("Makefile", "make"),
    ("CMakeLists.txt", "cmake"),
    ("package.json", "npm"),
    ("Cargo.toml", "cargo"),
    ("Gemfile", "bundler"),
    ("Pipfile", "pipenv"),
    ("pyproject.toml", "python-project"),
    ("requirements.txt", "pip"),
    ("pom.xml", "maven"),
    ("build.gradle", "gradle"),
    ("build.sbt", "sbt"),
    ("mix.exs", "mix"),
    ("rebar.config", "rebar"),
    ("composer.json", "composer"),
    ("go.mod", "go-modules"),
    ("Dockerfile", "docker"),
    ("docker-compose.yml", "docker-compose"),
    ("docker-compose.yaml", "docker-compose"),
    ("Jenkinsfile", "jenkins"),
    (".gitlab-ci.yml", "gitlab-ci"),
    (".travis.yml", "travis-ci"),
    ("appveyor.yml", "appveyor"),
    ("azure-pipelines.yml", "azure-pipelines"),
    ("cloudbuild.yaml", "cloud-build"),
    ("serverless.yml", "serverless"),
    ("Chart.yaml", "helm"),
    ("kustomization.yaml", "kustomize"),
    ("Vagrantfile", "vagrant"),
    ("Brewfile", "homebrew"),
];

/// Lower-case extensions without the leading dot.
const EXTENSIONS: &[(&str, &str)] = &[
    // web
    ("py", "python"),
    ("pyi", "python"),
    ("pyw", "python"),
    ("js", "javascript"),
    ("jsx", "javascript"),
    ("mjs", "javascript"),
    ("cjs", "javascript"),
    ("ts", "typescript"),
    ("tsx", "typescript"),
    ("html", "html"),
    ("css", "css"),
    ("scss", "scss"),
    ("sass", "sass"),
    ("less", "less"),
    ("php", "php"),
    ("vue", "vue"),
    ("svelte", "svelte"),
    ("astro", "astro"),
    ("cshtml", "razor"),
    ("razor", "razor"),
    ("jsp", "jsp"),
    ("aspx", "aspx"),
    // mobile and jvm
    ("java", "java"),
    ("kt", "kotlin"),
    ("kts", "kotlin"),
    ("swift", "swift"),
    ("m", "objective-c"),
    ("dart", "dart"),
    ("gradle", "gradle"),
    ("plist", "plist"),
    ("scala", "scala"),
    ("groovy", "groovy"),
    ("clj", "clojure"),
    ("cljs", "clojure"),
    ("cljc", "clojure"),
    // systems
    ("c", "c"),
    ("h", "c"),
    ("cpp", "cpp"),
    ("cc", "cpp"),
    ("cxx", "cpp"),
    ("hpp", "cpp"),
    ("hh", "cpp"),
    ("rs", "rust"),
    ("go", "go"),
    ("zig", "zig"),
    ("d", "d"),
    ("nim", "nim"),
    ("nims", "nim"),
    // .net
    ("cs", "csharp"),
    ("fs", "fsharp"),
    ("fsx", "fsharp"),
    ("vb", "vb"),
    ("csproj", "csproj"),
    ("fsproj", "fsproj"),
    ("vbproj", "vbproj"),
    ("vcxproj", "vcxproj"),
    ("sln", "sln"),
    ("xaml", "xaml"),
    ("cake", "cake"),
    ("props", "msbuild"),
    ("targets", "msbuild"),
    ("proj", "msbuild"),
    // scripting
    ("rb", "ruby"),
    ("erb", "erb"),
    ("rake", "ruby"),
    ("pl", "perl"),
    ("pm", "perl"),
    ("sh", "shell"),
    ("bash", "shell"),
    ("zsh", "shell"),
    ("fish", "fish"),
    ("ps1", "powershell"),
    ("psm1", "powershell"),
    ("lua", "lua"),
    ("tcl", "tcl"),
    // functional
    ("hs", "haskell"),
    ("lhs", "haskell"),
    ("elm", "elm"),
    ("ml", "ocaml"),
    ("mli", "ocaml"),
    ("ex", "elixir"),
    ("exs", "elixir"),
    ("erl", "erlang"),
    ("hrl", "erlang"),
    ("rkt", "racket"),
    ("scm", "scheme"),
    // data science
    ("r", "r"),
    ("rmd", "rmarkdown"),
    ("jl", "julia"),
    ("ipynb", "jupyter"),
    ("stan", "stan"),
    // configuration and data
    ("json", "json"),
    ("xml", "xml"),
    ("yaml", "yaml"),
    ("yml", "yaml"),
    ("toml", "toml"),
    ("ini", "ini"),
    ("conf", "conf"),
    ("properties", "properties"),
    ("sql", "sql"),
    ("graphql", "graphql"),
    ("proto", "protobuf"),
    ("avsc", "avro"),
    ("thrift", "thrift"),
    // documentation
    ("md", "markdown"),
    ("rst", "restructuredtext"),
    ("tex", "latex"),
    ("adoc", "asciidoc"),
    // hardware
    ("v", "verilog"),
    ("sv", "systemverilog"),
    ("vhd", "vhdl"),
    ("vhdl", "vhdl"),
    ("f90", "fortran"),
    ("f95", "fortran"),
    ("s", "assembly"),
    ("asm", "assembly"),
    // build and infrastructure
    ("pbxproj", "xcode"),
    ("pro", "qmake"),
    ("pri", "qmake"),
    ("cmake", "cmake"),
    ("make", "make"),
    ("mk", "make"),
    ("bazel", "bazel"),
    ("bzl", "bazel"),
    ("tf", "terraform"),
    ("tfvars", "terraform"),
    ("hcl", "hcl"),
];

fn from_table_tag(tag: &'static str) -> Language {
    match tag {
        "python" => Language::Python,
        "javascript" => Language::JavaScript,
        "typescript" => Language::TypeScript,
        "rust" => Language::Rust,
        "java" => Language::Java,
        "c" => Language::C,
        "cpp" => Language::Cpp,
        "csharp" => Language::CSharp,
        other => Language::Other(other),
    }
}

/// Classifies a file name (`Makefile`, `models.py`) or a bare extension
/// (`.py`, `PY`). Never fails; unrecognized input maps to
/// [`Language::Unknown`].
pub fn classify(name_or_extension: &str) -> Language {
    if let Some((_, tag)) = FILE_NAMES
        .iter()
        .find(|(name, _)| *name == name_or_extension)
    {
        return from_table_tag(tag);
    }

    let extension = match name_or_extension.rfind('.') {
        Some(dot) => &name_or_extension[dot + 1..],
        None => name_or_extension,
    }
    .to_ascii_lowercase();

    EXTENSIONS
        .iter()
        .find(|(ext, _)| *ext == extension)
        .map(|(_, tag)| from_table_tag(tag))
        .unwrap_or(Language::Unknown)
}

pub fn classify_path(path: &Path) -> Language {
    path.file_name()
        .and_then(|name| name.to_str())
        .map(classify)
        .unwrap_or(Language::Unknown)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extensions_are_case_insensitive() {
        assert_eq!(classify("MODELS.PY"), Language::Python);
        assert_eq!(classify(".Rs"), Language::Rust);
        assert_eq!(classify("tsx"), Language::TypeScript);
    }

    #[test]
    fn exact_file_names_win_over_extensions() {
        assert_eq!(classify("Makefile"), Language::Other("make"));
        assert_eq!(classify("package.json"), Language::Other("npm"));
        assert_eq!(classify("data.json"), Language::Other("json"));
    }

    #[test]
    fn unknown_input_defaults_to_unknown() {
        assert_eq!(classify("notes.weird"), Language::Unknown);
        assert_eq!(classify(""), Language::Unknown);
    }
}
