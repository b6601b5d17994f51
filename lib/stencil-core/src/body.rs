//! Body serialization utilities.

use serde::Serialize;

use crate::Result;

/// Media type of JSON bodies, also the default `accept` value.
pub const APPLICATION_JSON: &str = "application/json";

/// Name of the content type header, as stored in a request.
pub const CONTENT_TYPE: &str = "content-type";

/// Name of the accept header, as stored in a request.
pub const ACCEPT: &str = "accept";

/// Serialize a value to a compact JSON string.
///
/// # Errors
///
/// Returns an error if JSON serialization fails.
///
/// # Example
///
/// ```
/// use stencil_core::to_json;
/// use serde::Serialize;
///
/// #[derive(Serialize)]
/// struct Draft { draft: bool }
///
/// let body = to_json(&Draft { draft: true }).expect("serialize");
/// assert_eq!(body, r#"{"draft":true}"#);
/// ```
pub fn to_json<T: Serialize + ?Sized>(value: &T) -> Result<String> {
    serde_json::to_string(value).map_err(Into::into)
}

/// Serialize a value to an indented JSON string.
///
/// # Errors
///
/// Returns an error if JSON serialization fails.
pub fn to_json_pretty<T: Serialize + ?Sized>(value: &T) -> Result<String> {
    serde_json::to_string_pretty(value).map_err(Into::into)
}

pub(crate) fn render_body(value: &serde_json::Value, pretty: bool) -> Result<String> {
    if pretty {
        to_json_pretty(value)
    } else {
        to_json(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Serialize)]
    struct Orange {
        draft: bool,
        owner: &'static str,
    }

    #[test]
    fn to_json_compact() {
        let body = to_json(&Orange {
            draft: true,
            owner: "apache",
        })
        .expect("serialize");
        assert_eq!(body, r#"{"draft":true,"owner":"apache"}"#);
    }

    #[test]
    fn to_json_indented() {
        let body = to_json_pretty(&Orange {
            draft: false,
            owner: "apache",
        })
        .expect("serialize");
        assert_eq!(body, "{\n  \"draft\": false,\n  \"owner\": \"apache\"\n}");
    }

    #[test]
    fn render_body_value() {
        let value = serde_json::json!({"draft": true});
        assert_eq!(render_body(&value, false).expect("compact"), r#"{"draft":true}"#);
        assert_eq!(
            render_body(&value, true).expect("pretty"),
            "{\n  \"draft\": true\n}"
        );
    }

    #[test]
    fn to_json_failure() {
        let mut map = std::collections::BTreeMap::new();
        map.insert((1, 2), "tuple keys are not JSON");
        let err = to_json(&map).expect_err("non-string keys");
        assert!(matches!(err, crate::Error::BodySerialization(_)));
    }
}
