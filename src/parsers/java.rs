use regex::Regex;
use std::sync::LazyLock;

use super::common::{brace_body, captures, compact, compile, group, split_names, Section};
use super::declarations::Declarations;
use super::{LanguageRules, ScanContext};
use crate::core::{Deadline, FileDependencySet, RelationAnalysis, SymbolKind};
use crate::error::SketchResult;

const MODIFIERS: &str = r"((?:(?:public|protected|private|abstract|final|static|sealed|non-sealed|strictfp)\s+)*)";

static PACKAGE: LazyLock<Regex> = LazyLock::new(|| compile(r"\bpackage\s+([\w.]+)\s*;"));
static IMPORT: LazyLock<Regex> =
    LazyLock::new(|| compile(r"\bimport\s+(?:static\s+)?([\w.*]+)\s*;"));
static CLASS: LazyLock<Regex> = LazyLock::new(|| {
    compile(&format!(
        r"{MODIFIERS}class\s+(\w+)(?:\s*<[^{{]*?>)?(?:\s+extends\s+([\w.]+)(?:\s*<[^{{]*?>)?)?(?:\s+implements\s+([^{{]+?))?\s*\{{"
    ))
});
static INTERFACE: LazyLock<Regex> = LazyLock::new(|| {
    compile(&format!(
        r"{MODIFIERS}interface\s+(\w+)(?:\s*<[^{{]*?>)?(?:\s+extends\s+([^{{]+?))?\s*\{{"
    ))
});
static ENUM: LazyLock<Regex> = LazyLock::new(|| {
    compile(&format!(r"{MODIFIERS}enum\s+(\w+)(?:\s+implements\s+([^{{]+?))?\s*\{{"))
});
static METHOD: LazyLock<Regex> = LazyLock::new(|| {
    compile(
        r"(?m)^[ \t]*((?:(?:public|protected|private|static|final|abstract|synchronized|native|default)\s+)*)(?:<[^>\n]*>\s+)?([\w.]+(?:<[^;{}()\n]*>)?(?:\[\])*)\s+(\w+)\s*\(([^)]*)\)\s*(?:throws\s+[\w.,\s]+?)?\s*(\{|;)",
    )
});

/// Words that can sit where a return type is expected without the line
/// being a method declaration.
const NOT_RETURN_TYPES: &[&str] = &[
    "return", "new", "else", "throw", "case", "public", "protected", "private", "static", "final",
];
const NOT_METHODS: &[&str] = &["if", "for", "while", "switch", "catch", "synchronized"];

struct JavaMethod {
    name: String,
    params: String,
    exported: bool,
    at: usize,
    body_from: Option<usize>,
}

fn is_exported(modifiers: &str) -> bool {
    modifiers
        .split_whitespace()
        .any(|word| word == "public" || word == "protected")
}

fn methods(source: &str, deadline: &Deadline) -> SketchResult<Vec<JavaMethod>> {
    let mut found = Vec::new();
    for caps in captures(&METHOD, source, deadline)? {
        let return_type = &caps[2];
        let name = &caps[3];
        if NOT_RETURN_TYPES.contains(&return_type) || NOT_METHODS.contains(&name) {
            continue;
        }
        let whole = caps.get(0).map_or(0..0, |m| m.range());
        found.push(JavaMethod {
            name: name.to_string(),
            params: compact(&caps[4]),
            exported: is_exported(&caps[1]),
            at: caps.get(3).map_or(0, |m| m.start()),
            body_from: (&caps[5] == "{").then(|| whole.end - 1),
        });
    }
    Ok(found)
}

pub struct JavaRules;

impl JavaRules {
    pub fn new() -> Self {
        Self
    }
}

impl Default for JavaRules {
    fn default() -> Self {
        Self::new()
    }
}

impl LanguageRules for JavaRules {
    fn language_name(&self) -> &str {
        "java"
    }

    fn structure(&self, source: &str, cx: &ScanContext) -> SketchResult<Vec<String>> {
        let deadline = &cx.deadline;
        let mut lines = Vec::new();

        deadline.check()?;
        if let Some(caps) = PACKAGE.captures(source) {
            lines.push(String::new());
            lines.push(format!("Package: {}", &caps[1]));
        }

        Section::new("Imports")
            .capped(cx.caps.imports, "imports")
            .extend(
                captures(&IMPORT, source, deadline)?
                    .into_iter()
                    .map(|caps| format!("Import: {}", &caps[1])),
            )
            .render_into(&mut lines);

        let classes = captures(&CLASS, source, deadline)?;
        let class_names: Vec<&str> = classes
            .iter()
            .filter_map(|caps| caps.get(2).map(|m| m.as_str()))
            .collect();
        Section::new("Classes")
            .extend(classes.iter().map(|caps| {
                let mut item = format!("Class: {}", &caps[2]);
                if let Some(parent) = group(caps, 3) {
                    item.push_str(&format!(" extends {parent}"));
                }
                if let Some(interfaces) = group(caps, 4) {
                    item.push_str(&format!(" implements {}", compact(interfaces)));
                }
                item
            }))
            .render_into(&mut lines);

        Section::new("Interfaces")
            .extend(
                captures(&INTERFACE, source, deadline)?
                    .into_iter()
                    .map(|caps| match group(&caps, 3) {
                        Some(parents) => {
                            format!("Interface: {} extends {}", &caps[2], compact(parents))
                        }
                        None => format!("Interface: {}", &caps[2]),
                    }),
            )
            .render_into(&mut lines);

        Section::new("Enums")
            .extend(
                captures(&ENUM, source, deadline)?
                    .into_iter()
                    .map(|caps| match group(&caps, 3) {
                        Some(interfaces) => {
                            format!("Enum: {} implements {}", &caps[2], compact(interfaces))
                        }
                        None => format!("Enum: {}", &caps[2]),
                    }),
            )
            .render_into(&mut lines);

        Section::new("Methods")
            .capped(cx.caps.functions, "methods")
            .extend(
                methods(source, deadline)?
                    .into_iter()
                    .filter(|method| !class_names.contains(&method.name.as_str()))
                    .map(|method| format!("Method: {}({})", method.name, method.params)),
            )
            .render_into(&mut lines);

        Ok(lines)
    }

    fn dependencies(&self, source: &str, cx: &ScanContext) -> SketchResult<FileDependencySet> {
        let deadline = &cx.deadline;
        let mut deps = FileDependencySet::new();

        for caps in captures(&IMPORT, source, deadline)? {
            deps.imports.insert(caps[1].to_string());
        }

        for pattern in [&*CLASS, &*INTERFACE, &*ENUM] {
            for caps in captures(pattern, source, deadline)? {
                let name = caps[2].to_string();
                if is_exported(&caps[1]) {
                    deps.exports.insert(name.clone());
                }
                deps.symbols.insert(name);
            }
        }

        for method in methods(source, deadline)? {
            if method.exported {
                deps.symbols.insert(method.name);
            }
        }

        Ok(deps)
    }

    fn relations(&self, source: &str, cx: &ScanContext) -> SketchResult<RelationAnalysis> {
        let deadline = &cx.deadline;
        let mut decls = Declarations::new();

        let kinds = [
            (&*CLASS, SymbolKind::Class),
            (&*INTERFACE, SymbolKind::Interface),
            (&*ENUM, SymbolKind::Enum),
        ];
        for (pattern, kind) in kinds {
            for caps in captures(pattern, source, deadline)? {
                let name = &caps[2];
                let open = caps.get(0).map_or(0, |m| m.end() - 1);
                decls.add_type(name, kind, brace_body(source, open, 0));

                // class: extends (3) and implements (4); interface: extends
                // list (3); enum: implements list (3)
                let mut bases: Vec<String> = group(&caps, 3).map(split_names).unwrap_or_default();
                if kind == SymbolKind::Class {
                    bases.extend(group(&caps, 4).map(split_names).unwrap_or_default());
                }
                for base in &bases {
                    decls.add_base(name, base);
                }
            }
        }

        for method in methods(source, deadline)? {
            let body = method.body_from.and_then(|open| brace_body(source, open, 0));
            decls.add_callable(&method.name, method.at, body);
        }

        decls.resolve(source, deadline)
    }
}
