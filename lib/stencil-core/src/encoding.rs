//! Percent-encoding for path and query components.
//!
//! Reserved characters keep their structural meaning: they are emitted as-is
//! while every run between them is URL-encoded. Already well-formed
//! percent-triples can be preserved with [`encode_partially_encoded`].

use std::borrow::Cow;

use percent_encoding::percent_decode_str;
use url::form_urlencoded;

/// Characters left untouched when encoding a query component.
pub const QUERY_RESERVED_CHARACTERS: &str = "?/,";

/// Characters left untouched when encoding a path component.
///
/// `*` is not listed since URL-encoding never touches it.
pub const PATH_RESERVED_CHARACTERS: &str = "=@/:!$&'(),;~";

/// URL-encode a value with form rules.
///
/// ASCII alphanumerics and `.`, `-`, `*`, `_` are kept, a space becomes `+`,
/// every other byte of the UTF-8 form becomes `%XX`.
///
/// # Example
///
/// ```
/// use stencil_core::encoding::url_encode;
///
/// assert_eq!(url_encode("a b/c"), "a+b%2Fc");
/// ```
#[must_use]
pub fn url_encode(value: &str) -> String {
    form_urlencoded::byte_serialize(value.as_bytes()).collect()
}

/// Encode `value`, leaving every character of `reserved` unescaped.
#[must_use]
pub fn component_encode(reserved: &str, value: &str) -> String {
    let mut buffer: Option<String> = None;
    let mut start = 0;

    for (index, current) in value.char_indices() {
        if !reserved.contains(current) {
            continue;
        }
        let out = buffer.get_or_insert_with(|| String::with_capacity(value.len() + 8));
        if index != start {
            out.push_str(&url_encode(&value[start..index]));
        }
        out.push(current);
        start = index + current.len_utf8();
    }

    match buffer {
        None => url_encode(value),
        Some(mut out) => {
            if start < value.len() {
                out.push_str(&url_encode(&value[start..]));
            }
            out
        }
    }
}

/// Encode a query component.
///
/// # Example
///
/// ```
/// use stencil_core::encoding::query_encode;
///
/// assert_eq!(query_encode("a b&c/d"), "a+b%26c/d");
/// ```
#[must_use]
pub fn query_encode(value: &str) -> String {
    component_encode(QUERY_RESERVED_CHARACTERS, value)
}

/// Encode a path component.
///
/// Form encoding turns a space into `+` and a `+` into `%2B`; a path needs
/// the opposite, so both are swapped back.
///
/// # Example
///
/// ```
/// use stencil_core::encoding::path_encode;
///
/// assert_eq!(path_encode("a b+c"), "a%20b+c");
/// ```
#[must_use]
pub fn path_encode(value: &str) -> String {
    let result = component_encode(PATH_RESERVED_CHARACTERS, value);
    let result = if result.contains('+') {
        result.replace('+', "%20")
    } else {
        result
    };
    if result.contains("%2B") {
        result.replace("%2B", "+")
    } else {
        result
    }
}

/// Encode a fully or partially encoded value.
///
/// Every `%` followed by two hexadecimal digits passes through untouched,
/// the text between those triples is encoded with query or path rules.
///
/// # Example
///
/// ```
/// use stencil_core::encoding::encode_partially_encoded;
///
/// assert_eq!(encode_partially_encoded("a%20b c", false), "a%20b%20c");
/// ```
#[must_use]
pub fn encode_partially_encoded(encoded: &str, query: bool) -> String {
    let encode = |part: &str| {
        if query {
            query_encode(part)
        } else {
            path_encode(part)
        }
    };

    let bytes = encoded.as_bytes();
    let mut out = String::with_capacity(encoded.len() + 8);
    let mut start = 0;
    let mut index = 0;

    while index < bytes.len() {
        if is_percent_triple(bytes, index) {
            out.push_str(&encode(&encoded[start..index]));
            out.push_str(&encoded[index..index + 3]);
            index += 3;
            start = index;
        } else {
            index += 1;
        }
    }
    out.push_str(&encode(&encoded[start..]));

    out
}

fn is_percent_triple(bytes: &[u8], index: usize) -> bool {
    matches!(
        bytes.get(index..index + 3),
        Some([b'%', high, low]) if high.is_ascii_hexdigit() && low.is_ascii_hexdigit()
    )
}

/// Decode a path component: `%XX` sequences are decoded, `+` is kept.
#[must_use]
pub fn path_decode(value: &str) -> String {
    percent_decode_str(value).decode_utf8_lossy().into_owned()
}

/// Decode a query component: `+` becomes a space, then `%XX` is decoded.
#[must_use]
pub fn url_decode(value: &str) -> String {
    let value: Cow<'_, str> = if value.contains('+') {
        Cow::Owned(value.replace('+', " "))
    } else {
        Cow::Borrowed(value)
    };
    percent_decode_str(&value).decode_utf8_lossy().into_owned()
}
