use regex::Regex;
use std::ops::Range;
use std::sync::LazyLock;

use super::common::{captures, compact, compile, group, indented_body, push_items, split_names, Section};
use super::declarations::Declarations;
use super::{LanguageRules, ScanContext};
use crate::core::{Deadline, FileDependencySet, RelationAnalysis, SymbolKind};
use crate::error::SketchResult;

static CLASS: LazyLock<Regex> =
    LazyLock::new(|| compile(r"(?m)^([ \t]*)class\s+(\w+)\s*(?:\(([^)]*)\))?\s*:"));
static DEF: LazyLock<Regex> = LazyLock::new(|| {
    compile(r"(?m)^([ \t]*)(?:async\s+)?def\s+(\w+)\s*\(([^)]*)\)\s*(?:->\s*[^:\n]+)?:")
});
static IMPORT: LazyLock<Regex> = LazyLock::new(|| {
    compile(r"(?m)^[ \t]*import\s+([\w.]+(?:\s+as\s+\w+)?(?:[ \t]*,[ \t]*[\w.]+(?:\s+as\s+\w+)?)*)")
});
static FROM_IMPORT: LazyLock<Regex> = LazyLock::new(|| {
    compile(r"(?m)^[ \t]*from\s+([\w.]+)\s+import\s+(?:\(([^)]*)\)|([^\n#]+))")
});
static ALL: LazyLock<Regex> =
    LazyLock::new(|| compile(r"(?m)^__all__\s*(?:\+)?=\s*[\[(]([^\])]*)[\])]"));
static QUOTED: LazyLock<Regex> = LazyLock::new(|| compile(r#"['"](\w+)['"]"#));

struct PyClass {
    name: String,
    bases: Option<String>,
    top_level: bool,
    body: Range<usize>,
}

struct PyDef {
    name: String,
    params: String,
    top_level: bool,
    at: usize,
    body: Range<usize>,
}

fn scan(source: &str, deadline: &Deadline) -> SketchResult<(Vec<PyClass>, Vec<PyDef>)> {
    let mut classes = Vec::new();
    for caps in captures(&CLASS, source, deadline)? {
        let indent = caps.get(1).map_or(0, |m| m.as_str().len());
        let header_end = caps.get(0).map_or(0, |m| m.end());
        classes.push(PyClass {
            name: caps[2].to_string(),
            bases: group(&caps, 3).map(compact),
            top_level: indent == 0,
            body: indented_body(source, header_end, indent),
        });
    }

    let mut defs = Vec::new();
    for caps in captures(&DEF, source, deadline)? {
        let indent = caps.get(1).map_or(0, |m| m.as_str().len());
        let header_end = caps.get(0).map_or(0, |m| m.end());
        defs.push(PyDef {
            name: caps[2].to_string(),
            params: compact(&caps[3]),
            top_level: indent == 0,
            at: caps.get(2).map_or(0, |m| m.start()),
            body: indented_body(source, header_end, indent),
        });
    }

    Ok((classes, defs))
}

/// Index of the innermost class whose body contains `at`.
fn enclosing_class(classes: &[PyClass], at: usize) -> Option<usize> {
    classes
        .iter()
        .enumerate()
        .filter(|(_, class)| class.body.contains(&at))
        .min_by_key(|(_, class)| class.body.len())
        .map(|(idx, _)| idx)
}

fn is_public(name: &str) -> bool {
    !name.starts_with('_') || (name.starts_with("__") && name.ends_with("__"))
}

/// `a.b as c` → `a.b`; `*` and empty fragments are dropped.
fn imported_name(fragment: &str) -> Option<&str> {
    let name = fragment
        .trim()
        .trim_end_matches('\\')
        .split_whitespace()
        .next()?;
    (name != "*").then_some(name)
}

pub struct PythonRules;

impl PythonRules {
    pub fn new() -> Self {
        Self
    }
}

impl Default for PythonRules {
    fn default() -> Self {
        Self::new()
    }
}

impl LanguageRules for PythonRules {
    fn language_name(&self) -> &str {
        "python"
    }

    fn structure(&self, source: &str, cx: &ScanContext) -> SketchResult<Vec<String>> {
        let (classes, defs) = scan(source, &cx.deadline)?;

        let mut methods: Vec<Vec<String>> = vec![Vec::new(); classes.len()];
        let mut functions = Section::new("Functions").capped(cx.caps.functions, "functions");
        for def in &defs {
            let item = format!("{}({})", def.name, def.params);
            match enclosing_class(&classes, def.at) {
                Some(idx) => methods[idx].push(format!("Method: {item}")),
                None => functions.push(item),
            }
        }

        let mut lines = Vec::new();
        for (class, methods) in classes.iter().zip(&methods) {
            lines.push(String::new());
            match &class.bases {
                Some(bases) => lines.push(format!("Class: {} extends {bases}", class.name)),
                None => lines.push(format!("Class: {}", class.name)),
            }
            push_items(&mut lines, "  ", methods, Some((cx.caps.functions, "methods")));
        }
        functions.render_into(&mut lines);

        Ok(lines)
    }

    fn dependencies(&self, source: &str, cx: &ScanContext) -> SketchResult<FileDependencySet> {
        let mut deps = FileDependencySet::new();

        for caps in captures(&IMPORT, source, &cx.deadline)? {
            deps.imports
                .extend(caps[1].split(',').filter_map(imported_name).map(String::from));
        }

        for caps in captures(&FROM_IMPORT, source, &cx.deadline)? {
            let module = &caps[1];
            let names = group(&caps, 2).or_else(|| group(&caps, 3)).unwrap_or("");
            for name in names.split(',').filter_map(imported_name) {
                let entry = if module.ends_with('.') {
                    format!("{module}{name}")
                } else {
                    format!("{module}.{name}")
                };
                deps.imports.insert(entry);
            }
        }

        cx.deadline.check()?;
        if let Some(caps) = ALL.captures(source) {
            deps.exports.extend(
                QUOTED
                    .captures_iter(&caps[1])
                    .map(|entry| entry[1].to_string()),
            );
        }

        let (classes, defs) = scan(source, &cx.deadline)?;
        let declared = classes
            .iter()
            .map(|class| (class.name.as_str(), class.top_level))
            .chain(defs.iter().map(|def| (def.name.as_str(), def.top_level)));
        for (name, top_level) in declared {
            deps.symbols.insert(name.to_string());
            if top_level && is_public(name) {
                deps.exports.insert(name.to_string());
            }
        }

        Ok(deps)
    }

    fn relations(&self, source: &str, cx: &ScanContext) -> SketchResult<RelationAnalysis> {
        let (classes, defs) = scan(source, &cx.deadline)?;
        let mut decls = Declarations::new();

        for class in classes {
            decls.add_type(&class.name, SymbolKind::Class, Some(class.body));
            let bases = class.bases.as_deref().map(split_names).unwrap_or_default();
            for base in bases.iter().filter(|base| !base.contains('=')) {
                decls.add_base(&class.name, base);
            }
        }
        for def in defs {
            decls.add_callable(&def.name, def.at, Some(def.body));
        }

        decls.resolve(source, &cx.deadline)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn import_fragments_drop_aliases_and_wildcards() {
        assert_eq!(imported_name(" os.path as p"), Some("os.path"));
        assert_eq!(imported_name(" * "), None);
        assert_eq!(imported_name("   "), None);
    }

    #[test]
    fn dunder_names_are_public() {
        assert!(is_public("__init__"));
        assert!(is_public("run"));
        assert!(!is_public("_helper"));
        assert!(!is_public("__mangled"));
    }
}
