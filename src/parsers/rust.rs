use regex::Regex;
use std::sync::LazyLock;

use super::common::{brace_body, captures, compact, compile, group, Section};
use super::declarations::Declarations;
use super::{LanguageRules, ScanContext};
use crate::core::{FileDependencySet, RelationAnalysis, SymbolKind};
use crate::error::SketchResult;

static STRUCT: LazyLock<Regex> = LazyLock::new(|| compile(r"\bstruct\s+(\w+)"));
static ENUM: LazyLock<Regex> = LazyLock::new(|| compile(r"\benum\s+(\w+)"));
static TRAIT: LazyLock<Regex> = LazyLock::new(|| {
    compile(r"\btrait\s+(\w+)(?:\s*<[^>{]*>)?(?:\s*:\s*([^{]+?))?\s*(?:where\b[^{]*)?\{")
});
static IMPL: LazyLock<Regex> = LazyLock::new(|| {
    compile(r"\bimpl\b(?:\s*<[^>{]*>)?\s+(?:([^\s{]+)\s+for\s+)?([^\s{<]+)(?:<[^{]*?>)?\s*(?:where\b[^{]*)?\{")
});
static FN: LazyLock<Regex> =
    LazyLock::new(|| compile(r"\bfn\s+(\w+)\s*(?:<[^>(]*>)?\s*\(([^)]*)\)"));
static USE: LazyLock<Regex> = LazyLock::new(|| {
    compile(r"(?m)^[ \t]*(pub(?:\([^)]*\))?\s+)?use\s+([^;]+);")
});
static PUB_ITEM: LazyLock<Regex> = LazyLock::new(|| {
    compile(
        r#"\bpub(?:\([^)]*\))?\s+(?:(?:async|unsafe|const|extern\s+"[^"]*")\s+)*(?:struct|enum|trait|fn|type|mod|const|static|union)\s+(\w+)"#,
    )
});
static ITEM: LazyLock<Regex> =
    LazyLock::new(|| compile(r"\b(?:struct|enum|trait|fn|type|mod|union)\s+(\w+)"));

/// Expands one level of brace grouping in a `use` tree:
/// `std::{fs, io::Read}` → `std::fs`, `std::io::Read`.
fn expand_use(tree: &str) -> Vec<String> {
    let tree = compact(tree).replace(" :: ", "::");
    let (Some(open), Some(close)) = (tree.find('{'), tree.rfind('}')) else {
        return vec![tree];
    };
    if close < open {
        return vec![tree];
    }
    let prefix = &tree[..open];

    let mut items = Vec::new();
    let mut depth = 0usize;
    let mut start = open + 1;
    for (offset, ch) in tree[open + 1..close].char_indices() {
        let idx = open + 1 + offset;
        match ch {
            '{' => depth += 1,
            '}' => depth = depth.saturating_sub(1),
            ',' if depth == 0 => {
                items.push(&tree[start..idx]);
                start = idx + 1;
            }
            _ => {}
        }
    }
    items.push(&tree[start..close]);

    items
        .into_iter()
        .map(str::trim)
        .filter(|item| !item.is_empty())
        .map(|item| match item {
            "self" => prefix.trim_end_matches("::").to_string(),
            _ => format!("{prefix}{item}"),
        })
        .collect()
}

/// Name a `use` path binds: the alias, or its last segment.
fn bound_name(path: &str) -> Option<&str> {
    let name = match path.split_once(" as ") {
        Some((_, alias)) => alias.trim(),
        None => path.rsplit("::").next()?.trim(),
    };
    (!name.is_empty() && name != "*" && name != "self" && !name.contains('{')).then_some(name)
}

/// `fmt::Display<T>` → `Display`.
fn plain_type(path: &str) -> &str {
    let path = path.split('<').next().unwrap_or(path);
    path.rsplit("::").next().unwrap_or(path)
}

pub struct RustRules;

impl RustRules {
    pub fn new() -> Self {
        Self
    }
}

impl Default for RustRules {
    fn default() -> Self {
        Self::new()
    }
}

impl LanguageRules for RustRules {
    fn language_name(&self) -> &str {
        "rust"
    }

    fn structure(&self, source: &str, cx: &ScanContext) -> SketchResult<Vec<String>> {
        let deadline = &cx.deadline;

        let structs = captures(&STRUCT, source, deadline)?
            .into_iter()
            .map(|caps| format!("Struct: {}", &caps[1]));
        let enums = captures(&ENUM, source, deadline)?
            .into_iter()
            .map(|caps| format!("Enum: {}", &caps[1]));
        let traits = captures(&TRAIT, source, deadline)?
            .into_iter()
            .map(|caps| match group(&caps, 2) {
                Some(bounds) => format!("Trait: {} : {}", &caps[1], compact(bounds)),
                None => format!("Trait: {}", &caps[1]),
            });
        let impls = captures(&IMPL, source, deadline)?
            .into_iter()
            .map(|caps| match group(&caps, 1) {
                Some(trait_name) => format!("Impl: {trait_name} for {}", &caps[2]),
                None => format!("Impl: {}", &caps[2]),
            });
        let functions = captures(&FN, source, deadline)?
            .into_iter()
            .map(|caps| format!("Function: {}({})", &caps[1], compact(&caps[2])));

        let mut lines = Vec::new();
        Section::new("Structs").extend(structs).render_into(&mut lines);
        Section::new("Enums").extend(enums).render_into(&mut lines);
        Section::new("Traits").extend(traits).render_into(&mut lines);
        Section::new("Implementations").extend(impls).render_into(&mut lines);
        Section::new("Functions")
            .capped(cx.caps.functions, "functions")
            .extend(functions)
            .render_into(&mut lines);

        Ok(lines)
    }

    fn dependencies(&self, source: &str, cx: &ScanContext) -> SketchResult<FileDependencySet> {
        let deadline = &cx.deadline;
        let mut deps = FileDependencySet::new();

        for caps in captures(&USE, source, deadline)? {
            let paths = expand_use(&caps[2]);
            if caps.get(1).is_some() {
                deps.exports
                    .extend(paths.iter().filter_map(|path| bound_name(path)).map(String::from));
            }
            deps.imports.extend(paths);
        }

        for caps in captures(&PUB_ITEM, source, deadline)? {
            deps.exports.insert(caps[1].to_string());
        }
        for caps in captures(&ITEM, source, deadline)? {
            deps.symbols.insert(caps[1].to_string());
        }
        for caps in captures(&IMPL, source, deadline)? {
            if let Some(trait_name) = group(&caps, 1) {
                deps.symbols.insert(plain_type(trait_name).to_string());
            }
            deps.symbols.insert(plain_type(&caps[2]).to_string());
        }

        Ok(deps)
    }

    fn relations(&self, source: &str, cx: &ScanContext) -> SketchResult<RelationAnalysis> {
        let deadline = &cx.deadline;
        let mut decls = Declarations::new();

        for (pattern, kind) in [(&*STRUCT, SymbolKind::Struct), (&*ENUM, SymbolKind::Enum)] {
            for caps in captures(pattern, source, deadline)? {
                let end = caps.get(0).map_or(0, |m| m.end());
                decls.add_type(&caps[1], kind, brace_body(source, end, 200));
            }
        }
        for caps in captures(&TRAIT, source, deadline)? {
            let open = caps.get(0).map_or(0, |m| m.end() - 1);
            decls.add_type(&caps[1], SymbolKind::Trait, brace_body(source, open, 0));
        }

        for caps in captures(&IMPL, source, deadline)? {
            let target = plain_type(&caps[2]);
            let open = caps.get(0).map_or(0, |m| m.end() - 1);
            if let Some(body) = brace_body(source, open, 0) {
                decls.add_scope(target, body);
            }
            if let Some(trait_name) = group(&caps, 1) {
                decls.add_base(target, &format!("trait:{}", plain_type(trait_name)));
            }
        }

        for caps in captures(&FN, source, deadline)? {
            let (Some(name), Some(whole)) = (caps.get(1), caps.get(0)) else {
                continue;
            };
            decls.add_callable(
                name.as_str(),
                name.start(),
                brace_body(source, whole.end(), 200),
            );
        }

        decls.resolve(source, deadline)
    }
}
