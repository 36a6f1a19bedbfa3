use regex::Regex;
use std::sync::LazyLock;

use super::common::{brace_body, captures, compact, compile, group, split_names, Section};
use super::declarations::Declarations;
use super::{LanguageRules, ScanContext};
use crate::core::{Deadline, FileDependencySet, RelationAnalysis, SymbolKind};
use crate::error::SketchResult;

static NAMESPACE: LazyLock<Regex> = LazyLock::new(|| compile(r"\bnamespace\s+(\w+)\s*\{"));
static CLASS: LazyLock<Regex> = LazyLock::new(|| {
    compile(r"\bclass\s+(\w+)(?:\s+final)?(?:\s*:\s*([^{;]+))?\s*\{")
});
static STRUCT: LazyLock<Regex> = LazyLock::new(|| {
    compile(r"\bstruct\s+(\w+)(?:\s+final)?(?:\s*:\s*([^{;]+))?\s*\{")
});
static FUNCTION: LazyLock<Regex> = LazyLock::new(|| {
    compile(
        r"(?m)^[ \t]*(?:template\s*<[^>]*>\s*)?((?:[\w:<>,]+[ \t*&]+)+)(~?[\w:]+)\s*\(([^)]*)\)\s*(?:const\s*)?(?:noexcept\s*)?(?:override\s*)?(?:final\s*)?(\{|;)",
    )
});
static INCLUDE: LazyLock<Regex> =
    LazyLock::new(|| compile(r#"(?m)^[ \t]*#\s*include\s*[<"]([^>"]+)[>"]"#));

/// Leading words that make a line a statement rather than a declaration.
const NOT_RETURN_TYPES: &[&str] = &[
    "return", "else", "new", "delete", "throw", "case", "goto", "using", "typedef", "co_return",
];
const NOT_FUNCTIONS: &[&str] = &["if", "for", "while", "switch", "catch", "sizeof", "return"];
const ACCESS: &[&str] = &["public", "protected", "private", "virtual"];

struct CFunction {
    name: String,
    params: String,
    at: usize,
    has_body: bool,
    end: usize,
}

fn functions(source: &str, deadline: &Deadline) -> SketchResult<Vec<CFunction>> {
    let mut found = Vec::new();
    for caps in captures(&FUNCTION, source, deadline)? {
        let first_word = caps[1].split_whitespace().next().unwrap_or("");
        let name = &caps[2];
        if NOT_RETURN_TYPES.contains(&first_word) || NOT_FUNCTIONS.contains(&name) {
            continue;
        }
        found.push(CFunction {
            name: name.to_string(),
            params: compact(&caps[3]),
            at: caps.get(2).map_or(0, |m| m.start()),
            has_body: &caps[4] == "{",
            end: caps.get(0).map_or(0, |m| m.end()),
        });
    }
    Ok(found)
}

/// `public Base, private virtual Other<T>` → `[Base, Other]`.
fn base_names(clause: &str) -> Vec<String> {
    split_names(clause)
        .into_iter()
        .filter_map(|base| {
            base.split_whitespace()
                .rfind(|word| !ACCESS.contains(word))
                .map(String::from)
        })
        .collect()
}

/// Rule set for C and, with `cpp` set, C++.
pub struct CppRules {
    cpp: bool,
}

impl CppRules {
    pub fn new(cpp: bool) -> Self {
        Self { cpp }
    }
}

impl LanguageRules for CppRules {
    fn language_name(&self) -> &str {
        if self.cpp {
            "cpp"
        } else {
            "c"
        }
    }

    fn structure(&self, source: &str, cx: &ScanContext) -> SketchResult<Vec<String>> {
        let deadline = &cx.deadline;
        let mut lines = Vec::new();

        if self.cpp {
            Section::new("Namespaces")
                .extend(
                    captures(&NAMESPACE, source, deadline)?
                        .into_iter()
                        .map(|caps| format!("Namespace: {}", &caps[1])),
                )
                .render_into(&mut lines);
            Section::new("Classes")
                .extend(captures(&CLASS, source, deadline)?.into_iter().map(|caps| {
                    match group(&caps, 2) {
                        Some(bases) => format!("Class: {} : {}", &caps[1], compact(bases)),
                        None => format!("Class: {}", &caps[1]),
                    }
                }))
                .render_into(&mut lines);
        }

        Section::new("Structs")
            .extend(
                captures(&STRUCT, source, deadline)?
                    .into_iter()
                    .map(|caps| format!("Struct: {}", &caps[1])),
            )
            .render_into(&mut lines);

        Section::new("Functions")
            .capped(cx.caps.functions, "functions")
            .extend(
                functions(source, deadline)?
                    .into_iter()
                    .filter(|f| !f.name.contains("::") && !f.name.starts_with("operator"))
                    .map(|f| format!("Function: {}({})", f.name, f.params)),
            )
            .render_into(&mut lines);

        Ok(lines)
    }

    fn dependencies(&self, source: &str, cx: &ScanContext) -> SketchResult<FileDependencySet> {
        let deadline = &cx.deadline;
        let mut deps = FileDependencySet::new();

        for caps in captures(&INCLUDE, source, deadline)? {
            deps.imports.insert(caps[1].to_string());
        }

        let mut types = vec![&*STRUCT];
        if self.cpp {
            types.push(&*CLASS);
        }
        for pattern in types {
            for caps in captures(pattern, source, deadline)? {
                deps.symbols.insert(caps[1].to_string());
            }
        }
        for function in functions(source, deadline)? {
            let name = function.name.rsplit("::").next().unwrap_or(&function.name);
            deps.symbols.insert(name.to_string());
        }

        Ok(deps)
    }

    fn relations(&self, source: &str, cx: &ScanContext) -> SketchResult<RelationAnalysis> {
        let deadline = &cx.deadline;
        let mut decls = Declarations::new();

        let mut types = vec![(&*STRUCT, SymbolKind::Struct)];
        if self.cpp {
            types.insert(0, (&*CLASS, SymbolKind::Class));
            for caps in captures(&NAMESPACE, source, deadline)? {
                decls.add_symbol(&caps[1], SymbolKind::Namespace, None);
            }
        }
        for (pattern, kind) in types {
            for caps in captures(pattern, source, deadline)? {
                let open = caps.get(0).map_or(0, |m| m.end() - 1);
                decls.add_type(&caps[1], kind, brace_body(source, open, 0));
                for base in group(&caps, 2).map(base_names).unwrap_or_default() {
                    decls.add_base(&caps[1], &base);
                }
            }
        }

        for function in functions(source, deadline)? {
            let body = if function.has_body {
                brace_body(source, function.end - 1, 0)
            } else {
                None
            };
            match function.name.rsplit_once("::") {
                Some((owner, name)) => {
                    let owner = owner.rsplit("::").next().unwrap_or(owner);
                    decls.add_qualified_method(owner, name, function.at, body);
                }
                None => decls.add_callable(&function.name, function.at, body),
            }
        }

        decls.resolve(source, deadline)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn base_names_drop_access_specifiers() {
        assert_eq!(
            base_names("public Shape, private virtual Named<T>"),
            vec!["Shape", "Named"]
        );
    }

    #[test]
    fn statements_are_not_functions() {
        let src = "int main(void) {\n    return compute(1);\n}\nstatic int compute(int x);\n";
        let found = functions(src, &Deadline::unbounded()).unwrap();
        let names: Vec<&str> = found.iter().map(|f| f.name.as_str()).collect();
        assert_eq!(names, vec!["main", "compute"]);
        assert!(found[0].has_body);
        assert!(!found[1].has_body);
    }
}
