use regex::Regex;
use std::sync::LazyLock;

use super::common::{brace_body, captures, compact, compile, group, split_names, Section};
use super::declarations::Declarations;
use super::{LanguageRules, ScanContext};
use crate::core::{Deadline, FileDependencySet, RelationAnalysis, SymbolKind};
use crate::error::SketchResult;

static USING: LazyLock<Regex> =
    LazyLock::new(|| compile(r"(?m)^[ \t]*(?:global\s+)?using\s+(?:static\s+)?([\w.]+)\s*;"));
static NAMESPACE: LazyLock<Regex> =
    LazyLock::new(|| compile(r"\bnamespace\s+([\w.]+)\s*[{;]"));
static TYPE: LazyLock<Regex> = LazyLock::new(|| {
    compile(
        r"((?:(?:public|internal|private|protected|abstract|sealed|static|partial|readonly|ref|file)\s+)*)\b(class|interface|struct|enum|record)\s+(?:(?:class|struct)\s+)?(\w+)(?:\s*<[^>{;]*>)?(?:\s*\([^)]*\))?(?:\s*:\s*([^{;]+?))?\s*(?:\bwhere\b[^{;]*)?([{;])",
    )
});
static METHOD: LazyLock<Regex> = LazyLock::new(|| {
    compile(
        r"(?m)^[ \t]*((?:(?:public|internal|private|protected|static|virtual|abstract|override|async|sealed|new|extern|partial|unsafe)\s+)*)([\w.]+(?:<[^;{}()\n]*>)?(?:\[\])?\??)\s+(\w+)\s*(?:<[^>(\n]*>)?\s*\(([^)]*)\)\s*(?:\bwhere\b[^{;=]*)?(\{|=>|;)",
    )
});
static PROPERTY: LazyLock<Regex> = LazyLock::new(|| {
    compile(
        r"(?m)^[ \t]*((?:(?:public|internal|private|protected|static|virtual|abstract|override|sealed|new|required)\s+)*)([\w.]+(?:<[^;{}()\n]*>)?(?:\[\])?\??)\s+(\w+)\s*\{\s*(?:get|set|init)\b",
    )
});

const NOT_RETURN_TYPES: &[&str] = &[
    "return", "new", "else", "throw", "case", "await", "public", "internal", "private",
    "protected", "static", "yield",
];
const NOT_METHODS: &[&str] = &[
    "if", "for", "foreach", "while", "switch", "catch", "using", "lock", "fixed", "nameof",
];

struct CsType {
    name: String,
    kind: SymbolKind,
    keyword: String,
    bases: Option<String>,
    body_from: Option<usize>,
}

struct CsMember {
    name: String,
    params: Option<String>,
    at: usize,
    body_from: Option<usize>,
}

fn kind_of(keyword: &str) -> SymbolKind {
    match keyword {
        "interface" => SymbolKind::Interface,
        "struct" => SymbolKind::Struct,
        "enum" => SymbolKind::Enum,
        "record" => SymbolKind::Record,
        _ => SymbolKind::Class,
    }
}

fn capitalized(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

fn namespace(source: &str, deadline: &Deadline) -> SketchResult<Option<String>> {
    deadline.check()?;
    Ok(NAMESPACE.captures(source).map(|caps| caps[1].to_string()))
}

fn types(source: &str, deadline: &Deadline) -> SketchResult<Vec<CsType>> {
    Ok(captures(&TYPE, source, deadline)?
        .into_iter()
        .map(|caps| CsType {
            name: caps[3].to_string(),
            kind: kind_of(&caps[2]),
            keyword: caps[2].to_string(),
            bases: group(&caps, 4).map(compact),
            body_from: (&caps[5] == "{").then(|| caps.get(5).map_or(0, |m| m.start())),
        })
        .collect())
}

fn methods(source: &str, deadline: &Deadline) -> SketchResult<Vec<CsMember>> {
    let mut found = Vec::new();
    for caps in captures(&METHOD, source, deadline)? {
        let name = &caps[3];
        if NOT_RETURN_TYPES.contains(&&caps[2]) || NOT_METHODS.contains(&name) {
            continue;
        }
        found.push(CsMember {
            name: name.to_string(),
            params: Some(compact(&caps[4])),
            at: caps.get(3).map_or(0, |m| m.start()),
            body_from: caps.get(5).filter(|m| m.as_str() == "{").map(|m| m.start()),
        });
    }
    Ok(found)
}

fn properties(source: &str, deadline: &Deadline) -> SketchResult<Vec<CsMember>> {
    Ok(captures(&PROPERTY, source, deadline)?
        .into_iter()
        .filter(|caps| !NOT_RETURN_TYPES.contains(&&caps[2]))
        .map(|caps| CsMember {
            name: caps[3].to_string(),
            params: None,
            at: caps.get(3).map_or(0, |m| m.start()),
            body_from: caps.get(0).map(|m| m.end()).and_then(|end| {
                source[..end].rfind('{')
            }),
        })
        .collect())
}

pub struct CSharpRules;

impl CSharpRules {
    pub fn new() -> Self {
        Self
    }
}

impl Default for CSharpRules {
    fn default() -> Self {
        Self::new()
    }
}

impl LanguageRules for CSharpRules {
    fn language_name(&self) -> &str {
        "csharp"
    }

    fn structure(&self, source: &str, cx: &ScanContext) -> SketchResult<Vec<String>> {
        let deadline = &cx.deadline;
        let mut lines = Vec::new();

        if let Some(namespace) = namespace(source, deadline)? {
            lines.push(String::new());
            lines.push(format!("Namespace: {namespace}"));
        }

        Section::new("Usings")
            .capped(cx.caps.imports, "usings")
            .extend(
                captures(&USING, source, deadline)?
                    .into_iter()
                    .map(|caps| format!("Using: {}", &caps[1])),
            )
            .render_into(&mut lines);

        let types = types(source, deadline)?;
        Section::new("Types")
            .extend(types.iter().map(|ty| match &ty.bases {
                Some(bases) => format!("{}: {} : {bases}", capitalized(&ty.keyword), ty.name),
                None => format!("{}: {}", capitalized(&ty.keyword), ty.name),
            }))
            .render_into(&mut lines);

        Section::new("Methods")
            .capped(cx.caps.functions, "methods")
            .extend(
                methods(source, deadline)?
                    .into_iter()
                    .filter(|method| !types.iter().any(|ty| ty.name == method.name))
                    .map(|method| {
                        format!("Method: {}({})", method.name, method.params.unwrap_or_default())
                    }),
            )
            .render_into(&mut lines);

        Ok(lines)
    }

    fn dependencies(&self, source: &str, cx: &ScanContext) -> SketchResult<FileDependencySet> {
        let deadline = &cx.deadline;
        let mut deps = FileDependencySet::new();

        for caps in captures(&USING, source, deadline)? {
            deps.imports.insert(caps[1].to_string());
        }

        let namespace = namespace(source, deadline)?;
        if let Some(namespace) = &namespace {
            deps.exports.insert(format!("namespace:{namespace}"));
        }

        let types = types(source, deadline)?;
        for ty in &types {
            deps.symbols.insert(ty.name.clone());
            match &namespace {
                Some(namespace) => deps.exports.insert(format!("{namespace}.{}", ty.name)),
                None => deps.exports.insert(ty.name.clone()),
            };
        }

        let members = methods(source, deadline)?
            .into_iter()
            .chain(properties(source, deadline)?);
        for member in members {
            deps.symbols.insert(member.name);
        }

        Ok(deps)
    }

    fn relations(&self, source: &str, cx: &ScanContext) -> SketchResult<RelationAnalysis> {
        let deadline = &cx.deadline;
        let mut decls = Declarations::new();

        if let Some(namespace) = namespace(source, deadline)? {
            decls.add_symbol(&format!("namespace:{namespace}"), SymbolKind::Namespace, None);
        }

        for ty in types(source, deadline)? {
            let body = ty.body_from.and_then(|open| brace_body(source, open, 0));
            decls.add_type(&ty.name, ty.kind, body);
            for base in ty.bases.as_deref().map(split_names).unwrap_or_default() {
                decls.add_base(&ty.name, &base);
            }
        }

        for method in methods(source, deadline)? {
            let body = method.body_from.and_then(|open| brace_body(source, open, 0));
            decls.add_callable(&method.name, method.at, body);
        }
        for property in properties(source, deadline)? {
            let body = property
                .body_from
                .and_then(|open| brace_body(source, open, 0));
            decls.add_member(&property.name, SymbolKind::Property, property.at, body);
        }

        decls.resolve(source, deadline)
    }
}
