//! Path templates: segment splitting, variable extraction and expansion.
//!
//! A template such as `/repos/{owner}/{repo}/pulls` or `/files/{path:.+/.+}`
//! holds `{name}` or `{name:regex}` placeholders. The regex part may contain
//! `/` and even nested braces, so every scan tracks the brace depth instead
//! of splitting naively.

use indexmap::IndexMap;
use tracing::trace;

use crate::encoding::{encode_partially_encoded, path_decode};
use crate::structured::{MultiMap, matrix_params};

/// A path template before parameter substitution.
///
/// # Example
///
/// ```
/// use stencil_core::PathTemplate;
///
/// let template = PathTemplate::new("/repos/{owner}/{repo}/pulls");
/// assert_eq!(template.variables(), vec!["owner", "repo"]);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct PathTemplate(String);

impl PathTemplate {
    /// Create a new path template.
    #[must_use]
    pub fn new(template: impl Into<String>) -> Self {
        Self(template.into())
    }

    /// Get the template string.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Split the template into segments, see [`path_segments`].
    #[must_use]
    pub fn segments(&self, decode: bool, ignore_last_slash: bool) -> Vec<PathSegment> {
        path_segments(&self.0, decode, ignore_last_slash)
    }

    /// Variable names in order of appearance, see [`template_variables`].
    #[must_use]
    pub fn variables(&self) -> Vec<String> {
        template_variables(&self.0)
    }

    /// Substitute every variable with its encoded path parameter.
    ///
    /// # Errors
    ///
    /// Returns [`Error::MissingPathParameter`](crate::Error::MissingPathParameter)
    /// if a variable has no value in `params`.
    pub fn expand(&self, params: &IndexMap<String, String>) -> crate::Result<String> {
        expand_template(&self.0, params)
    }
}

impl std::fmt::Display for PathTemplate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl AsRef<str> for PathTemplate {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl From<&str> for PathTemplate {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

impl From<String> for PathTemplate {
    fn from(value: String) -> Self {
        Self::new(value)
    }
}

/// One segment of a path, as found between two `/` separators.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PathSegment {
    raw: String,
    decoded: Option<String>,
}

impl PathSegment {
    /// Create a segment, decoding it when requested.
    #[must_use]
    pub fn new(raw: impl Into<String>, decode: bool) -> Self {
        let raw = raw.into();
        let decoded = decode.then(|| path_decode(&raw));
        Self { raw, decoded }
    }

    /// The segment exactly as it appears in the path.
    #[must_use]
    pub fn original(&self) -> &str {
        &self.raw
    }

    /// The decoded segment, if decoding was requested.
    #[must_use]
    pub fn decoded(&self) -> Option<&str> {
        self.decoded.as_deref()
    }

    /// The segment value without its matrix parameters.
    #[must_use]
    pub fn path(&self) -> &str {
        let value = self.decoded.as_deref().unwrap_or(&self.raw);
        value.split_once(';').map_or(value, |(path, _)| path)
    }

    /// Matrix parameters (`;name=value`) attached to this segment.
    #[must_use]
    pub fn matrix_params(&self) -> MultiMap {
        matrix_params(&self.raw, self.decoded.is_some())
    }
}

/// Parse a path into segments, respecting template definitions.
///
/// A `/` inside a `{...}` template definition (e.g. `/my/path/{a:b/c}`) does
/// not separate segments. When the braces are unbalanced the remainder after
/// the last real separator is split naively on `/`.
///
/// A trailing `/` adds an empty segment when `ignore_last_slash` is set, a
/// `/` segment otherwise.
///
/// # Example
///
/// ```
/// use stencil_core::path_template::path_segments;
///
/// let segments = path_segments("/my/path/{a:b/c}", false, true);
/// let values: Vec<_> = segments.iter().map(|s| s.original()).collect();
/// assert_eq!(values, vec!["my", "path", "{a:b/c}"]);
/// ```
#[must_use]
pub fn path_segments(path: &str, decode: bool, ignore_last_slash: bool) -> Vec<PathSegment> {
    let mut segments = Vec::new();
    let mut depth: i32 = 0;
    let mut start = 0;

    for (index, current) in path.char_indices() {
        match current {
            '/' if depth != 0 => {}
            '/' => {
                if start != index {
                    segments.push(PathSegment::new(&path[start..index], decode));
                }
                start = index + 1;
            }
            '{' => depth += 1,
            // may go negative with an unbalanced template
            '}' => depth -= 1,
            _ => {}
        }
    }

    let trailing_slash = || {
        let value = if ignore_last_slash { "" } else { "/" };
        PathSegment::new(value, false)
    };

    if depth != 0 {
        trace!(path, "unbalanced template braces, splitting remainder on '/'");
        segments.extend(
            path[start..]
                .split('/')
                .filter(|part| !part.is_empty())
                .map(|part| PathSegment::new(part, decode)),
        );
        if path.ends_with('/') {
            segments.push(trailing_slash());
        }
    } else if start == path.len() && start > 0 && path.ends_with('/') {
        segments.push(trailing_slash());
    } else if !path.is_empty() {
        segments.push(PathSegment::new(&path[start..], decode));
    }

    segments
}

/// A `{...}` placeholder found in a template.
struct Placeholder<'a> {
    /// Byte range of the placeholder, braces included.
    start: usize,
    end: usize,
    /// Variable name, regex stripped.
    name: &'a str,
}

/// Find every balanced top-level `{...}` placeholder.
fn placeholders(template: &str) -> Vec<Placeholder<'_>> {
    let mut found = Vec::new();
    let mut depth = 0_usize;
    let mut open = 0;

    for (index, current) in template.char_indices() {
        match current {
            '{' => {
                if depth == 0 {
                    open = index;
                }
                depth += 1;
            }
            '}' if depth > 0 => {
                depth -= 1;
                if depth == 0 {
                    let inner = &template[open + 1..index];
                    let name = inner.split_once(':').map_or(inner, |(name, _)| name).trim();
                    found.push(Placeholder {
                        start: open,
                        end: index + 1,
                        name,
                    });
                }
            }
            _ => {}
        }
    }

    found
}

/// Extract variable names from a path template, in order of appearance.
///
/// Regexes (`{name:regex}`) and braces are stripped; a name that appears
/// several times is listed once.
///
/// # Example
///
/// ```
/// use stencil_core::path_template::template_variables;
///
/// assert_eq!(
///     template_variables("/files/{id:\\d{3}}/{path:.+/.+}"),
///     vec!["id", "path"]
/// );
/// ```
#[must_use]
pub fn template_variables(template: &str) -> Vec<String> {
    let mut names: Vec<String> = Vec::new();
    for placeholder in placeholders(template) {
        if !placeholder.name.is_empty() && !names.iter().any(|name| name == placeholder.name) {
            names.push(placeholder.name.to_string());
        }
    }
    names
}

fn expand_template(template: &str, params: &IndexMap<String, String>) -> crate::Result<String> {
    let mut out = String::with_capacity(template.len() + 16);
    let mut last = 0;

    for placeholder in placeholders(template) {
        let value = params
            .get(placeholder.name)
            .ok_or_else(|| crate::Error::missing_path_parameter(template, placeholder.name))?;
        out.push_str(&encode_partially_encoded(&template[last..placeholder.start], false));
        out.push_str(&encode_partially_encoded(value, false));
        last = placeholder.end;
    }
    out.push_str(&encode_partially_encoded(&template[last..], false));

    if tracing::enabled!(tracing::Level::TRACE) {
        let used = template_variables(template);
        for name in params.keys().filter(|name| !used.contains(name)) {
            trace!(template, name, "path parameter not used by template");
        }
    }

    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn originals(segments: &[PathSegment]) -> Vec<&str> {
        segments.iter().map(PathSegment::original).collect()
    }

    #[test]
    fn path_template_as_str() {
        let template = PathTemplate::new("/users/{id}/posts/{post_id}");
        assert_eq!(template.as_str(), "/users/{id}/posts/{post_id}");
        assert_eq!(template.to_string(), "/users/{id}/posts/{post_id}");
    }

    #[test]
    fn path_template_as_ref() {
        let template = PathTemplate::from("/users/{id}");
        let s: &str = template.as_ref();
        assert_eq!(s, "/users/{id}");
    }

    #[test]
    fn segments_simple() {
        let segments = path_segments("/repos/{owner}/{repo}/pulls", false, true);
        assert_eq!(
            originals(&segments),
            vec!["repos", "{owner}", "{repo}", "pulls"]
        );
    }

    #[test]
    fn segments_keep_slash_in_template() {
        let segments = path_segments("/my/path/{a:b/c}", false, true);
        assert_eq!(originals(&segments), vec!["my", "path", "{a:b/c}"]);
    }

    #[test]
    fn segments_skip_empty() {
        let segments = path_segments("//a///b", false, true);
        assert_eq!(originals(&segments), vec!["a", "b"]);
    }

    #[test]
    fn segments_trailing_slash() {
        let ignored = path_segments("/a/b/", false, true);
        assert_eq!(originals(&ignored), vec!["a", "b", ""]);

        let kept = path_segments("/a/b/", false, false);
        assert_eq!(originals(&kept), vec!["a", "b", "/"]);
    }

    #[test]
    fn segments_empty_and_root() {
        assert!(path_segments("", false, true).is_empty());
        assert_eq!(originals(&path_segments("/", false, true)), vec![""]);
        assert_eq!(originals(&path_segments("/", false, false)), vec!["/"]);
    }

    #[test]
    fn segments_unbalanced_open_brace() {
        let segments = path_segments("/a/{b/c//d/", false, false);
        assert_eq!(originals(&segments), vec!["a", "{b", "c", "d", "/"]);
    }

    #[test]
    fn segments_unbalanced_close_brace() {
        let segments = path_segments("/a/b}/c", false, true);
        assert_eq!(originals(&segments), vec!["a", "b}", "c"]);
    }

    #[test]
    fn segments_decode() {
        let segments = path_segments("/a%20b/c", true, true);
        let first = segments.first().expect("first segment");
        assert_eq!(first.original(), "a%20b");
        assert_eq!(first.decoded(), Some("a b"));
        assert_eq!(first.path(), "a b");
    }

    #[test]
    fn segment_matrix_params() {
        let segments = path_segments("/cars;color=red;year=2024/engine", false, true);
        let cars = segments.first().expect("cars segment");
        assert_eq!(cars.path(), "cars");

        let matrix = cars.matrix_params();
        assert_eq!(matrix.get_first("color"), Some("red"));
        assert_eq!(matrix.get_first("year"), Some("2024"));

        let engine = segments.get(1).expect("engine segment");
        assert!(engine.matrix_params().is_empty());
    }

    #[test]
    fn variables_in_order() {
        assert_eq!(
            template_variables("/repos/{owner}/{repo}/pulls"),
            vec!["owner", "repo"]
        );
    }

    #[test]
    fn variables_strip_regex() {
        assert_eq!(
            template_variables("/my/path/{a:b/c}/{ id : \\d+ }"),
            vec!["a", "id"]
        );
        assert_eq!(template_variables("/x/{n:[0-9]{2,4}}"), vec!["n"]);
    }

    #[test]
    fn variables_none() {
        assert!(template_variables("/health").is_empty());
        assert!(template_variables("/broken/{open").is_empty());
    }

    #[test]
    fn expand_template_values() {
        let mut params = IndexMap::new();
        params.insert("owner".to_string(), "apache".to_string());
        params.insert("repo".to_string(), "red".to_string());

        let template = PathTemplate::new("/repos/{owner}/{repo}/pulls");
        assert_eq!(
            template.expand(&params).expect("expand"),
            "/repos/apache/red/pulls"
        );
    }

    #[test]
    fn expand_encodes_values() {
        let mut params = IndexMap::new();
        params.insert("name".to_string(), "a b?c%2F".to_string());
        params.insert("unused".to_string(), "ignored".to_string());

        let template = PathTemplate::new("/files/{name:.+}");
        assert_eq!(
            template.expand(&params).expect("expand"),
            "/files/a%20b%3Fc%2F"
        );
    }

    #[test]
    fn expand_encodes_literal_text() {
        let mut params = IndexMap::new();
        params.insert("x".to_string(), "y z".to_string());

        let template = PathTemplate::new("/a b/{x}/c%2Fd;v=1");
        assert_eq!(
            template.expand(&params).expect("expand"),
            "/a%20b/y%20z/c%2Fd;v=1"
        );
    }

    #[test]
    fn segment_matrix_params_decoded() {
        let segments = path_segments("/cars;color=dark%20red", true, true);
        let cars = segments.first().expect("cars segment");
        assert_eq!(cars.matrix_params().get_first("color"), Some("dark red"));
    }

    #[test]
    fn expand_missing_parameter() {
        let template = PathTemplate::new("/repos/{owner}/{repo}");
        let mut params = IndexMap::new();
        params.insert("owner".to_string(), "apache".to_string());

        let err = template.expand(&params).expect_err("missing repo");
        assert_eq!(err.missing_variable(), Some("repo"));
    }
}
