use regex::Regex;
use std::collections::HashSet;
use std::ops::Range;
use std::sync::LazyLock;

use super::common::{brace_body, captures, compact, compile, group, split_names, Section};
use super::declarations::Declarations;
use super::{LanguageRules, ScanContext};
use crate::core::{Deadline, FileDependencySet, RelationAnalysis, SymbolKind};
use crate::error::SketchResult;

static NAMED_IMPORT: LazyLock<Regex> = LazyLock::new(|| {
    compile(r#"\bimport\s+(?:type\s+)?\{([^}]*)\}\s*from\s*['"]([^'"]+)['"]"#)
});
static DEFAULT_IMPORT: LazyLock<Regex> = LazyLock::new(|| {
    compile(r#"\bimport\s+(?:type\s+)?(\w+)\s*(?:,\s*\{([^}]*)\})?\s*from\s*['"]([^'"]+)['"]"#)
});
static NAMESPACE_IMPORT: LazyLock<Regex> = LazyLock::new(|| {
    compile(r#"\bimport\s+\*\s*as\s+(\w+)\s+from\s*['"]([^'"]+)['"]"#)
});
static BARE_IMPORT: LazyLock<Regex> =
    LazyLock::new(|| compile(r#"(?m)^\s*import\s*['"]([^'"]+)['"]"#));
static REQUIRE: LazyLock<Regex> =
    LazyLock::new(|| compile(r#"\brequire\s*\(\s*['"]([^'"]+)['"]\s*\)"#));

static CLASS: LazyLock<Regex> = LazyLock::new(|| {
    compile(
        r"\bclass\s+(\w+)(?:\s*<[^>{]*>)?(?:\s+extends\s+([\w.]+)(?:\s*<[^>{]*>)?)?(?:\s+implements\s+([\w.,<>\s]+?))?\s*\{",
    )
});
static INTERFACE: LazyLock<Regex> = LazyLock::new(|| {
    compile(r"\binterface\s+(\w+)(?:\s*<[^>{]*>)?(?:\s+extends\s+([^{]+?))?\s*\{")
});
static ENUM: LazyLock<Regex> = LazyLock::new(|| compile(r"\benum\s+(\w+)\s*\{"));

static FUNCTION_DECL: LazyLock<Regex> = LazyLock::new(|| {
    compile(r"\bfunction\b\s*\*?\s*(\w+)\s*(?:<[^>(]*>)?\s*\(([^)]*)\)")
});
static FUNCTION_EXPR: LazyLock<Regex> = LazyLock::new(|| {
    compile(r"\b(?:const|let|var)\s+(\w+)\s*=\s*(?:async\s+)?function\b\s*\*?\s*\w*\s*\(([^)]*)\)")
});
static ARROW: LazyLock<Regex> = LazyLock::new(|| {
    compile(
        r"\b(?:const|let|var)\s+(\w+)\s*(?::[^=\n]+)?=\s*(?:async\s+)?(?:\(([^)]*)\)|(\w+))\s*(?::\s*[^=\n]+?)?\s*=>",
    )
});
static METHOD: LazyLock<Regex> = LazyLock::new(|| {
    compile(
        r"(?m)^[ \t]*(?:(?:public|private|protected|static|async|readonly|abstract|override|get|set)\s+)*\*?\s*(#?\w+)\s*(?:<[^>(]*>)?\s*\(([^)]*)\)\s*(?::\s*[^{;]+?)?\s*\{",
    )
});
static VARIABLE: LazyLock<Regex> = LazyLock::new(|| {
    compile(r"(?m)^(?:export\s+)?(?:const|let|var)\s+(\w+)\s*(?::[^=\n]+)?=")
});

static EXPORT_DECL: LazyLock<Regex> = LazyLock::new(|| {
    compile(
        r"\bexport\s+(?:default\s+)?(?:declare\s+)?(?:async\s+)?(?:abstract\s+)?(?:class|function|const|let|var|interface|type|enum)\b\s*\*?\s*(\w+)",
    )
});
static EXPORT_LIST: LazyLock<Regex> =
    LazyLock::new(|| compile(r"\bexport\s*(?:type\s+)?\{([^}]*)\}"));
static EXPORT_DEFAULT: LazyLock<Regex> =
    LazyLock::new(|| compile(r"\bexport\s+default\s+(\w+)"));
static SYMBOL: LazyLock<Regex> = LazyLock::new(|| {
    compile(r"\b(?:class|interface|const|let|var)\s+(\w+)|\bfunction\b\s*\*?\s*(\w+)")
});

const NOT_METHODS: &[&str] = &[
    "if", "for", "while", "switch", "catch", "return", "function", "constructor", "super",
    "else", "do", "with",
];

const DECLARATION_KEYWORDS: &[&str] = &[
    "class", "function", "async", "abstract", "interface", "new", "enum", "const", "let", "var",
];

struct JsClass {
    name: String,
    extends: Option<String>,
    implements: Option<String>,
    body: Option<Range<usize>>,
}

struct JsFunction {
    name: String,
    params: String,
    at: usize,
    body: Option<Range<usize>>,
}

struct JsImport {
    at: usize,
    display: String,
}

/// Names of an import or export list: `a, b as c, type D`.
fn list_entries(list: &str) -> impl Iterator<Item = (&str, &str)> {
    list.split(',').filter_map(|entry| {
        let entry = entry.trim();
        let entry = entry.strip_prefix("type ").unwrap_or(entry).trim();
        let mut parts = entry.split_whitespace();
        let original = parts.next()?;
        let alias = match (parts.next(), parts.next()) {
            (Some("as"), Some(alias)) => alias,
            _ => original,
        };
        Some((original, alias))
    })
}

/// Rule set for JavaScript and, with `typescript` set, TypeScript.
pub struct JavaScriptRules {
    typescript: bool,
}

impl JavaScriptRules {
    pub fn new(typescript: bool) -> Self {
        Self { typescript }
    }

    fn classes(&self, source: &str, deadline: &Deadline) -> SketchResult<Vec<JsClass>> {
        Ok(captures(&CLASS, source, deadline)?
            .into_iter()
            .map(|caps| {
                let open = caps.get(0).map_or(0, |m| m.end() - 1);
                JsClass {
                    name: caps[1].to_string(),
                    extends: group(&caps, 2).map(String::from),
                    implements: group(&caps, 3).map(compact),
                    body: brace_body(source, open, 0),
                }
            })
            .collect())
    }

    /// Named functions in every declaration style, ordered by position and
    /// deduplicated by name.
    fn functions(&self, source: &str, deadline: &Deadline) -> SketchResult<Vec<JsFunction>> {
        let mut found = Vec::new();
        for (pattern, window) in [(&*FUNCTION_DECL, 200), (&*FUNCTION_EXPR, 200), (&*ARROW, 16)] {
            for caps in captures(pattern, source, deadline)? {
                let whole = caps.get(0).map_or(0..0, |m| m.range());
                let params = group(&caps, 2).or_else(|| group(&caps, 3)).unwrap_or("");
                found.push(JsFunction {
                    name: caps[1].to_string(),
                    params: compact(params),
                    at: whole.start,
                    body: brace_body(source, whole.end, window),
                });
            }
        }
        found.sort_by_key(|function| function.at);

        let mut seen = HashSet::new();
        found.retain(|function| seen.insert(function.name.clone()));
        Ok(found)
    }

    fn variables(
        &self,
        source: &str,
        functions: &[JsFunction],
        deadline: &Deadline,
    ) -> SketchResult<Vec<String>> {
        let callable: HashSet<&str> = functions.iter().map(|f| f.name.as_str()).collect();
        Ok(captures(&VARIABLE, source, deadline)?
            .into_iter()
            .map(|caps| caps[1].to_string())
            .filter(|name| !callable.contains(name.as_str()))
            .collect())
    }

    fn imports(&self, source: &str, deadline: &Deadline) -> SketchResult<Vec<JsImport>> {
        let mut imports = Vec::new();
        for caps in captures(&NAMED_IMPORT, source, deadline)? {
            let names: Vec<String> = caps[1]
                .split(',')
                .map(compact)
                .filter(|name| !name.is_empty())
                .collect();
            imports.push(JsImport {
                at: caps.get(0).map_or(0, |m| m.start()),
                display: format!("Import: {{{}}} from '{}'", names.join(", "), &caps[2]),
            });
        }
        for (pattern, module) in [(&*DEFAULT_IMPORT, 3), (&*NAMESPACE_IMPORT, 2)] {
            for caps in captures(pattern, source, deadline)? {
                imports.push(JsImport {
                    at: caps.get(0).map_or(0, |m| m.start()),
                    display: format!("Import: {} from '{}'", &caps[1], &caps[module]),
                });
            }
        }
        imports.sort_by_key(|import| import.at);
        Ok(imports)
    }
}

impl LanguageRules for JavaScriptRules {
    fn language_name(&self) -> &str {
        if self.typescript {
            "typescript"
        } else {
            "javascript"
        }
    }

    fn structure(&self, source: &str, cx: &ScanContext) -> SketchResult<Vec<String>> {
        let deadline = &cx.deadline;
        let imports = self.imports(source, deadline)?;

        let mut interfaces = Section::new("Interfaces");
        if self.typescript {
            for caps in captures(&INTERFACE, source, deadline)? {
                match group(&caps, 2) {
                    Some(parents) => {
                        interfaces.push(format!("Interface: {} extends {}", &caps[1], compact(parents)))
                    }
                    None => interfaces.push(format!("Interface: {}", &caps[1])),
                }
            }
        }

        let mut classes = Section::new("Classes");
        for class in self.classes(source, deadline)? {
            let mut item = format!("Class: {}", class.name);
            if let Some(parent) = &class.extends {
                item.push_str(&format!(" extends {parent}"));
            }
            if let Some(interfaces) = &class.implements {
                item.push_str(&format!(" implements {interfaces}"));
            }
            classes.push(item);
        }

        let functions = self.functions(source, deadline)?;
        let variables = self.variables(source, &functions, deadline)?;

        let mut lines = Vec::new();
        Section::new("Imports")
            .capped(cx.caps.imports, "imports")
            .extend(imports.into_iter().map(|import| import.display))
            .render_into(&mut lines);
        interfaces.render_into(&mut lines);
        classes.render_into(&mut lines);
        Section::new("Functions")
            .capped(cx.caps.functions, "functions")
            .extend(
                functions
                    .iter()
                    .map(|f| format!("Function: {}({})", f.name, f.params)),
            )
            .render_into(&mut lines);
        Section::new("Top-level Variables")
            .capped(cx.caps.variables, "variables")
            .extend(variables.into_iter().map(|name| format!("Variable: {name}")))
            .render_into(&mut lines);

        Ok(lines)
    }

    fn dependencies(&self, source: &str, cx: &ScanContext) -> SketchResult<FileDependencySet> {
        let deadline = &cx.deadline;
        let mut deps = FileDependencySet::new();

        for caps in captures(&NAMED_IMPORT, source, deadline)? {
            let module = &caps[2];
            for (name, _) in list_entries(&caps[1]) {
                deps.imports.insert(format!("{module}.{name}"));
            }
        }
        for caps in captures(&DEFAULT_IMPORT, source, deadline)? {
            let module = &caps[3];
            deps.imports.insert(format!("{module}.{}", &caps[1]));
            if let Some(named) = group(&caps, 2) {
                for (name, _) in list_entries(named) {
                    deps.imports.insert(format!("{module}.{name}"));
                }
            }
        }
        for caps in captures(&NAMESPACE_IMPORT, source, deadline)? {
            deps.imports.insert(format!("{}.{}", &caps[2], &caps[1]));
        }
        for pattern in [&*BARE_IMPORT, &*REQUIRE] {
            for caps in captures(pattern, source, deadline)? {
                deps.imports.insert(caps[1].to_string());
            }
        }

        for caps in captures(&EXPORT_DECL, source, deadline)? {
            deps.exports.insert(caps[1].to_string());
        }
        for caps in captures(&EXPORT_LIST, source, deadline)? {
            deps.exports.extend(
                list_entries(&caps[1])
                    .map(|(_, alias)| alias)
                    .filter(|alias| *alias != "default")
                    .map(String::from),
            );
        }
        for caps in captures(&EXPORT_DEFAULT, source, deadline)? {
            if !DECLARATION_KEYWORDS.contains(&&caps[1]) {
                deps.exports.insert(caps[1].to_string());
            }
        }

        for caps in captures(&SYMBOL, source, deadline)? {
            if let Some(name) = group(&caps, 1).or_else(|| group(&caps, 2)) {
                deps.symbols.insert(name.to_string());
            }
        }

        Ok(deps)
    }

    fn relations(&self, source: &str, cx: &ScanContext) -> SketchResult<RelationAnalysis> {
        let deadline = &cx.deadline;
        let mut decls = Declarations::new();

        let classes = self.classes(source, deadline)?;
        let class_bodies: Vec<Range<usize>> =
            classes.iter().filter_map(|class| class.body.clone()).collect();
        for class in classes {
            decls.add_type(&class.name, SymbolKind::Class, class.body);
            if let Some(parent) = &class.extends {
                decls.add_base(&class.name, parent);
            }
            for interface in class.implements.as_deref().map(split_names).unwrap_or_default() {
                decls.add_base(&class.name, &interface);
            }
        }

        if self.typescript {
            for caps in captures(&INTERFACE, source, deadline)? {
                let open = caps.get(0).map_or(0, |m| m.end() - 1);
                decls.add_type(&caps[1], SymbolKind::Interface, brace_body(source, open, 0));
                for parent in group(&caps, 2).map(split_names).unwrap_or_default() {
                    decls.add_base(&caps[1], &parent);
                }
            }
            for caps in captures(&ENUM, source, deadline)? {
                let open = caps.get(0).map_or(0, |m| m.end() - 1);
                decls.add_type(&caps[1], SymbolKind::Enum, brace_body(source, open, 0));
            }
        }

        for caps in captures(&METHOD, source, deadline)? {
            let (Some(name), Some(whole)) = (caps.get(1), caps.get(0)) else {
                continue;
            };
            let in_class = class_bodies.iter().any(|body| body.contains(&name.start()));
            if in_class && !NOT_METHODS.contains(&name.as_str()) {
                decls.add_callable(
                    name.as_str(),
                    name.start(),
                    brace_body(source, whole.end() - 1, 0),
                );
            }
        }

        let functions = self.functions(source, deadline)?;
        for variable in self.variables(source, &functions, deadline)? {
            decls.add_symbol(&variable, SymbolKind::Variable, None);
        }
        for function in functions {
            decls.add_callable(&function.name, function.at, function.body);
        }

        decls.resolve(source, deadline)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn list_entries_resolve_aliases() {
        let entries: Vec<_> = list_entries(" a, b as c , type D ,").collect();
        assert_eq!(entries, vec![("a", "a"), ("b", "c"), ("D", "D")]);
    }

    #[test]
    fn arrow_functions_are_not_variables() {
        let rules = JavaScriptRules::new(false);
        let src = "const add = (a, b) => a + b;\nconst LIMIT = 10;\n";
        let deadline = Deadline::unbounded();
        let functions = rules.functions(src, &deadline).unwrap();
        let variables = rules.variables(src, &functions, &deadline).unwrap();
        assert_eq!(functions.len(), 1);
        assert_eq!(functions[0].params, "a, b");
        assert_eq!(variables, vec!["LIMIT"]);
    }
}
