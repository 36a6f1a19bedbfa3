use regex::{Captures, Regex};
use std::collections::HashSet;
use std::fs::File;
use std::io::{BufReader, Read};
use std::ops::Range;
use std::path::Path;

use crate::core::Deadline;
use crate::error::{SketchError, SketchResult};

/// Upper bound on how far a body scan walks past its declaration.
pub const MAX_BODY_SCAN: usize = 64 * 1024;

/// How much of a type body is searched for use references.
pub const TYPE_SLICE: usize = 2000;

/// How much of a callable body is searched for use references.
pub const CALLABLE_SLICE: usize = 1000;

const MATCHES_PER_CHECK: usize = 64;

pub fn compile(pattern: &str) -> Regex {
    Regex::new(pattern).expect("built-in pattern must compile")
}

/// Reads a file as text, replacing invalid UTF-8 rather than failing.
pub fn read_source(file_path: &Path) -> SketchResult<String> {
    let to_error = |source| SketchError::FileRead {
        path: file_path.to_path_buf(),
        source,
    };

    let file = File::open(file_path).map_err(to_error)?;
    let file_size = file.metadata().map_err(to_error)?.len() as usize;

    let mut reader = BufReader::with_capacity(file_size.clamp(1, 8192), file);
    let mut bytes = Vec::with_capacity(file_size);
    reader.read_to_end(&mut bytes).map_err(to_error)?;

    Ok(String::from_utf8_lossy(&bytes).into_owned())
}

/// Collects every match of `re`, checking the deadline before the scan and
/// periodically while iterating.
pub fn captures<'t>(re: &Regex, text: &'t str, deadline: &Deadline) -> SketchResult<Vec<Captures<'t>>> {
    deadline.check()?;
    let mut out = Vec::new();
    for (i, caps) in re.captures_iter(text).enumerate() {
        if i % MATCHES_PER_CHECK == MATCHES_PER_CHECK - 1 {
            deadline.check()?;
        }
        out.push(caps);
    }
    Ok(out)
}

pub fn group<'t>(caps: &Captures<'t>, idx: usize) -> Option<&'t str> {
    caps.get(idx)
        .map(|m| m.as_str().trim())
        .filter(|text| !text.is_empty())
}

/// Collapses runs of whitespace (including newlines) into single spaces.
pub fn compact(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Splits a comma separated list of type names, dropping generic arguments
/// and empty entries: `Base<T>, Other` → `[Base, Other]`.
pub fn split_names(list: &str) -> Vec<String> {
    let mut names = Vec::new();
    let mut depth = 0usize;
    let mut current = String::new();
    for ch in list.chars() {
        match ch {
            '<' | '[' | '(' => depth += 1,
            '>' | ']' | ')' => depth = depth.saturating_sub(1),
            ',' if depth == 0 => {
                names.push(std::mem::take(&mut current));
            }
            _ if depth == 0 => current.push(ch),
            _ => {}
        }
    }
    names.push(current);

    names
        .into_iter()
        .map(|name| compact(&name))
        .filter(|name| !name.is_empty())
        .collect()
}

/// Returns the end of the bracket that opens at `open`, scanning at most
/// [`MAX_BODY_SCAN`] bytes.
pub fn matching_brace(source: &str, open: usize) -> Option<usize> {
    let bytes = source.as_bytes();
    let limit = (open + MAX_BODY_SCAN).min(bytes.len());
    let mut depth = 0usize;
    for (idx, &byte) in bytes.iter().enumerate().take(limit).skip(open) {
        match byte {
            b'{' => depth += 1,
            b'}' => {
                depth = depth.saturating_sub(1);
                if depth == 0 {
                    return Some(idx);
                }
            }
            _ => {}
        }
    }
    None
}

/// Body of a brace-delimited declaration whose header ends at `from`.
///
/// The opening brace must appear within `window` bytes and before any `;`,
/// otherwise the declaration has no body (a prototype or an expression-bodied
/// arrow function). An unbalanced body runs to the scan bound.
pub fn brace_body(source: &str, from: usize, window: usize) -> Option<Range<usize>> {
    let rest = source.get(from..)?;
    let mut open = None;
    for (offset, ch) in rest.char_indices() {
        if offset > window || ch == ';' {
            break;
        }
        if ch == '{' {
            open = Some(from + offset);
            break;
        }
    }
    let open = open?;
    let close = matching_brace(source, open)
        .unwrap_or_else(|| floor_boundary(source, (open + MAX_BODY_SCAN).min(source.len())));
    Some(open + 1..close)
}

/// Body of an indentation-delimited block (Python). `header_end` is the
/// offset right after the declaration's `:`, `indent` the width of the
/// declaration line's leading whitespace.
pub fn indented_body(source: &str, header_end: usize, indent: usize) -> Range<usize> {
    let limit = (header_end + MAX_BODY_SCAN).min(source.len());
    let line_end = |pos: usize| source[pos..].find('\n').map_or(source.len(), |i| pos + i);

    let mut end = line_end(header_end);
    let mut pos = end + 1;
    while pos < limit {
        let next = line_end(pos);
        let line = &source[pos..next];
        let trimmed = line.trim_start();
        if !trimmed.is_empty() && !trimmed.starts_with('#') {
            if line.len() - trimmed.len() <= indent {
                break;
            }
            end = next;
        }
        pos = next + 1;
    }
    header_end..end
}

pub fn floor_boundary(source: &str, mut idx: usize) -> usize {
    idx = idx.min(source.len());
    while !source.is_char_boundary(idx) {
        idx -= 1;
    }
    idx
}

/// At most `limit` bytes of `range`, cut on a char boundary.
pub fn bounded_slice<'a>(source: &'a str, range: &Range<usize>, limit: usize) -> &'a str {
    let start = floor_boundary(source, range.start);
    let end = floor_boundary(source, range.end.min(range.start + limit));
    source.get(start..end.max(start)).unwrap_or("")
}

/// Identifier-like words of a text.
pub fn words(text: &str) -> HashSet<&str> {
    text.split(|c: char| !(c.is_alphanumeric() || c == '_'))
        .filter(|word| !word.is_empty())
        .collect()
}

/// Listing of one kind of construct in a structure report.
///
/// Renders as a blank line, `Title:`, one `  └── item` line per entry, and,
/// when a cap applies and is exceeded, a trailing `... and N more <noun>`.
pub struct Section {
    title: &'static str,
    items: Vec<String>,
    cap: Option<(usize, &'static str)>,
}

impl Section {
    pub fn new(title: &'static str) -> Self {
        Self {
            title,
            items: Vec::new(),
            cap: None,
        }
    }

    pub fn capped(mut self, cap: usize, noun: &'static str) -> Self {
        self.cap = Some((cap, noun));
        self
    }

    pub fn push(&mut self, item: impl Into<String>) {
        self.items.push(item.into());
    }

    pub fn extend<I: IntoIterator<Item = String>>(mut self, items: I) -> Self {
        self.items.extend(items);
        self
    }

    pub fn render_into(&self, lines: &mut Vec<String>) {
        if self.items.is_empty() {
            return;
        }
        lines.push(String::new());
        lines.push(format!("{}:", self.title));
        push_items(lines, "  ", &self.items, self.cap);
    }
}

/// Appends `{indent}└── item` lines, truncated at the cap.
pub fn push_items(
    lines: &mut Vec<String>,
    indent: &str,
    items: &[String],
    cap: Option<(usize, &'static str)>,
) {
    let shown = cap.map_or(items.len(), |(cap, _)| cap.min(items.len()));
    for item in &items[..shown] {
        lines.push(format!("{indent}└── {item}"));
    }
    if let Some((cap, noun)) = cap {
        if items.len() > cap {
            lines.push(format!("{indent}└── ... and {} more {noun}", items.len() - cap));
        }
    }
}

/// Line counts shown for languages without a rule set.
pub fn fallback_summary(source: &str, language: &str) -> Vec<String> {
    let lines: Vec<&str> = source.split('\n').collect();
    let meaningful = lines
        .iter()
        .map(|line| line.trim())
        .filter(|line| {
            !line.is_empty() && !["//", "#", "/*", "*", "*/"].iter().any(|p| line.starts_with(p))
        })
        .count();

    vec![
        String::new(),
        format!("Language '{language}' parsing not fully implemented."),
        "Showing basic file information:".to_string(),
        format!("  └── Lines of code: {}", lines.len()),
        format!("  └── Non-empty, non-comment lines: {meaningful}"),
    ]
}
