//! Structured parameter strings: query strings and matrix parameters.
//!
//! `name=value&name=value` (or `;name=value` for matrix parameters) is parsed
//! into an ordered [`MultiMap`]: duplicate names keep every value, and a name
//! without `=` keeps no value at all (distinct from an empty value).

use std::fmt;

use indexmap::IndexMap;

use crate::encoding::{path_decode, url_decode};

/// Ordered multi-valued mapping from parameter names to values.
///
/// A `None` value marks a name given without `=`.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct MultiMap {
    entries: IndexMap<String, Vec<Option<String>>>,
}

impl MultiMap {
    /// Creates an empty map.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a value for `name`, keeping previous ones.
    pub fn add(&mut self, name: impl Into<String>, value: Option<String>) {
        self.entries.entry(name.into()).or_default().push(value);
    }

    /// All values for `name`, in insertion order.
    #[must_use]
    pub fn get_all(&self, name: &str) -> &[Option<String>] {
        self.entries.get(name).map_or(&[], Vec::as_slice)
    }

    /// First value for `name`, if it has one.
    #[must_use]
    pub fn get_first(&self, name: &str) -> Option<&str> {
        self.get_all(name).first().and_then(Option::as_deref)
    }

    /// Returns `true` if `name` was present, with or without a value.
    #[must_use]
    pub fn contains_key(&self, name: &str) -> bool {
        self.entries.contains_key(name)
    }

    /// Number of distinct names.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns `true` if no name was parsed.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterate over names and their values, in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &[Option<String>])> {
        self.entries
            .iter()
            .map(|(name, values)| (name.as_str(), values.as_slice()))
    }

    /// Serialize back to `name=value` pairs joined by `separator`.
    ///
    /// Values are written as stored, without encoding.
    #[must_use]
    pub fn join(&self, separator: &str) -> String {
        let mut parts = Vec::new();
        for (name, values) in &self.entries {
            for value in values {
                match value {
                    Some(value) => parts.push(format!("{name}={value}")),
                    None => parts.push(name.clone()),
                }
            }
        }
        parts.join(separator)
    }
}

impl fmt::Display for MultiMap {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.join("&"))
    }
}

impl FromIterator<(String, Option<String>)> for MultiMap {
    fn from_iter<I: IntoIterator<Item = (String, Option<String>)>>(iter: I) -> Self {
        let mut map = Self::new();
        for (name, value) in iter {
            map.add(name, value);
        }
        map
    }
}

/// Options for [`parse_structured_params`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseOptions {
    separator: String,
    decode: bool,
    decode_plus: bool,
    value_is_collection: bool,
}

impl Default for ParseOptions {
    fn default() -> Self {
        Self::query()
    }
}

impl ParseOptions {
    /// Query string parsing: `&` separator, names and values decoded.
    #[must_use]
    pub fn query() -> Self {
        Self {
            separator: "&".to_string(),
            decode: true,
            decode_plus: true,
            value_is_collection: false,
        }
    }

    /// Matrix parameter parsing: `;` separator, path decoding, `+` kept.
    #[must_use]
    pub fn matrix() -> Self {
        Self {
            separator: ";".to_string(),
            decode: true,
            decode_plus: false,
            value_is_collection: false,
        }
    }

    /// Set the separator between `name=value` parts.
    #[must_use]
    pub fn separator(mut self, separator: impl Into<String>) -> Self {
        self.separator = separator.into();
        self
    }

    /// Percent-decode names and values.
    #[must_use]
    pub const fn decode(mut self, decode: bool) -> Self {
        self.decode = decode;
        self
    }

    /// Turn `+` into a space in values before decoding.
    #[must_use]
    pub const fn decode_plus(mut self, decode_plus: bool) -> Self {
        self.decode_plus = decode_plus;
        self
    }

    /// Split each value on `,` and add one entry per element.
    #[must_use]
    pub const fn value_is_collection(mut self, value_is_collection: bool) -> Self {
        self.value_is_collection = value_is_collection;
        self
    }

    fn is_matrix(&self) -> bool {
        self.separator == ";"
    }
}

/// Parse a structured parameter string into an ordered multimap.
///
/// Blank input yields an empty map; empty parts (e.g. `a=1&&b=2`) are skipped.
///
/// # Example
///
/// ```
/// use stencil_core::structured::{ParseOptions, parse_structured_params};
///
/// let params = parse_structured_params("tag=a&tag=b&flag&q=x+y", &ParseOptions::query());
/// assert_eq!(params.get_all("tag"), &[Some("a".to_string()), Some("b".to_string())]);
/// assert_eq!(params.get_all("flag"), &[None]);
/// assert_eq!(params.get_first("q"), Some("x y"));
/// ```
#[must_use]
pub fn parse_structured_params(input: &str, options: &ParseOptions) -> MultiMap {
    let mut map = MultiMap::new();
    if is_blank(input) {
        return map;
    }

    for part in input.split(options.separator.as_str()) {
        if part.is_empty() {
            continue;
        }
        let (name, value) = match part.split_once('=') {
            Some((name, value)) => (name, Some(value)),
            None => (part, None),
        };

        if options.value_is_collection {
            if let Some(value) = value {
                for item in collection_items(value) {
                    add_part(&mut map, options, name, Some(item));
                }
            }
        } else {
            add_part(&mut map, options, name, value);
        }
    }

    map
}

/// Matrix parameters of a path segment (everything after its first `;`).
#[must_use]
pub fn matrix_params(path: &str, decode: bool) -> MultiMap {
    path.split_once(';')
        .map(|(_, params)| parse_structured_params(params, &ParseOptions::matrix().decode(decode)))
        .unwrap_or_default()
}

/// Split a collection value on `,`, dropping trailing empty items.
///
/// A value without any `,` is a single item, even when empty.
fn collection_items(value: &str) -> Vec<&str> {
    let mut items: Vec<&str> = value.split(',').collect();
    if value.contains(',') {
        while items.last().is_some_and(|item| item.is_empty()) {
            items.pop();
        }
    }
    items
}

fn add_part(map: &mut MultiMap, options: &ParseOptions, name: &str, value: Option<&str>) {
    let value = value.map(|value| {
        let value = if options.decode_plus && value.contains('+') {
            value.replace('+', " ")
        } else {
            value.to_string()
        };
        if !options.decode {
            value
        } else if options.is_matrix() {
            path_decode(&value)
        } else {
            url_decode(&value)
        }
    });

    let name = if options.decode {
        url_decode(name)
    } else {
        name.to_string()
    };
    map.add(name, value);
}

fn is_blank(input: &str) -> bool {
    input.chars().all(|c| c <= ' ')
}
