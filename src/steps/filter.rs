//! Glob filtering of step names.

use globset::{GlobBuilder, GlobMatcher};

use super::ConfigValidationError;

/// Narrows step names to those matching an optional glob pattern.
///
/// Matching is case-sensitive and follows shell `fnmatch` rules: `*`, `?`,
/// `[...]` and `[!...]` are special, everything else is literal. Braces and
/// backslashes carry no meaning and an unclosed `[` matches itself. `*` also
/// matches `/`.
#[derive(Clone, Debug)]
pub struct StepFilter {
    matcher: Option<GlobMatcher>,
}

impl StepFilter {
    /// Compiles the filter. `None` keeps every name.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigValidationError::InvalidFilter`] when a character
    /// class cannot be compiled, such as a reversed range `[z-a]`.
    pub fn new(pattern: Option<&str>) -> Result<Self, ConfigValidationError> {
        let matcher = pattern
            .map(|glob| {
                GlobBuilder::new(&fnmatch_to_glob(glob))
                    .backslash_escape(false)
                    .build()
                    .map(|compiled| compiled.compile_matcher())
                    .map_err(|err| ConfigValidationError::InvalidFilter {
                        pattern: glob.to_owned(),
                        message: err.kind().to_string(),
                    })
            })
            .transpose()?;
        Ok(Self { matcher })
    }

    /// Returns `true` when `name` passes the filter.
    #[must_use]
    pub fn matches(&self, name: &str) -> bool {
        self.matcher
            .as_ref()
            .is_none_or(|matcher| matcher.is_match(name))
    }

    /// Keeps matching names in their input order. Callers sort first so the
    /// result is deterministic.
    #[must_use]
    pub fn apply(&self, names: Vec<String>) -> Vec<String> {
        if self.matcher.is_none() {
            return names;
        }
        names.into_iter().filter(|name| self.matches(name)).collect()
    }
}

/// Rewrites an `fnmatch` pattern into globset syntax. Braces become literal
/// classes, an unclosed `[` becomes `[[]` and a leading `^` inside a class
/// is moved so it stays literal.
fn fnmatch_to_glob(pattern: &str) -> String {
    let chars = pattern.chars().collect::<Vec<_>>();
    let mut glob = String::with_capacity(pattern.len());
    let mut pos = 0;
    while let Some(&ch) = chars.get(pos) {
        match ch {
            '{' => glob.push_str("[{]"),
            '}' => glob.push_str("[}]"),
            '[' => {
                if let Some(end) = class_end(&chars, pos + 1) {
                    let body = chars
                        .get(pos + 1..end)
                        .map(|slice| slice.iter().collect::<String>())
                        .unwrap_or_default();
                    push_class(&mut glob, &body);
                    pos = end;
                } else {
                    glob.push_str("[[]");
                }
            }
            other => glob.push(other),
        }
        pos += 1;
    }
    glob
}

/// Index of the `]` closing a class whose body starts at `start`. A `]`
/// directly after `[` or `[!` belongs to the body.
fn class_end(chars: &[char], start: usize) -> Option<usize> {
    let mut pos = start;
    if chars.get(pos) == Some(&'!') {
        pos += 1;
    }
    if chars.get(pos) == Some(&']') {
        pos += 1;
    }
    while *chars.get(pos)? != ']' {
        pos += 1;
    }
    Some(pos)
}

fn push_class(glob: &mut String, body: &str) {
    let Some(rest) = body.strip_prefix('^') else {
        glob.push('[');
        glob.push_str(body);
        glob.push(']');
        return;
    };
    if rest.is_empty() {
        glob.push('^');
        return;
    }
    glob.push('[');
    match rest.strip_suffix('-') {
        Some(head) if !head.is_empty() => {
            glob.push_str(head);
            glob.push_str("^-");
        }
        _ => {
            glob.push_str(rest);
            glob.push('^');
        }
    }
    glob.push(']');
}
