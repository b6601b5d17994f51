//! URI assembly.
//!
//! The path template is expanded with encoded path parameters, then the
//! query parameters are appended in insertion order. Values that already
//! contain `%XX` triples are not encoded twice.

use indexmap::IndexMap;
use tracing::trace;

use crate::encoding::encode_partially_encoded;
use crate::path_template::PathTemplate;
use crate::{Request, Result};

/// Build `path?query` from a template and parameter maps.
///
/// A missing template yields an empty path, an empty query map no `?`.
///
/// # Errors
///
/// Returns [`Error::MissingPathParameter`](crate::Error::MissingPathParameter)
/// if a template variable has no path parameter.
///
/// # Example
///
/// ```
/// use indexmap::IndexMap;
/// use stencil_core::assemble_uri;
///
/// let path = IndexMap::from([("name".to_string(), "a b".to_string())]);
/// let query = IndexMap::from([("q".to_string(), "x&y".to_string())]);
///
/// let uri = assemble_uri(Some("/files/{name}"), &path, &query).expect("uri");
/// assert_eq!(uri, "/files/a%20b?q=x%26y");
/// ```
pub fn assemble_uri(
    template: Option<&str>,
    path_params: &IndexMap<String, String>,
    query_params: &IndexMap<String, String>,
) -> Result<String> {
    let mut uri = match template {
        Some(template) => PathTemplate::new(template).expand(path_params)?,
        None => String::new(),
    };

    if !query_params.is_empty() {
        let query = query_params
            .iter()
            .map(|(name, value)| {
                format!(
                    "{}={}",
                    encode_partially_encoded(name, true),
                    encode_partially_encoded(value, true)
                )
            })
            .collect::<Vec<_>>()
            .join("&");
        uri.push('?');
        uri.push_str(&query);
    }

    trace!(uri, "assembled uri");
    Ok(uri)
}

impl Request {
    /// The request URI: expanded path followed by the query string.
    ///
    /// # Errors
    ///
    /// Returns [`Error::MissingPathParameter`](crate::Error::MissingPathParameter)
    /// if a template variable has no path parameter.
    ///
    /// # Example
    ///
    /// ```
    /// use stencil_core::Request;
    ///
    /// let request = Request::target("/repos/{owner}/{repo}", ["apache", "tomee"])
    ///     .expect("target")
    ///     .with_query("state", "open");
    /// assert_eq!(request.uri().expect("uri"), "/repos/apache/tomee?state=open");
    /// ```
    pub fn uri(&self) -> Result<String> {
        assemble_uri(self.path(), self.path_params(), self.query_params())
    }

    /// The absolute request URL, resolved against `base`.
    ///
    /// The URI is appended to the path of `base`, so a base of
    /// `https://api.example.com/v3/` keeps its `/v3/` prefix. The scheme
    /// and host always come from `base`, whatever the parameter values.
    ///
    /// # Errors
    ///
    /// Returns an error if the URI cannot be assembled or `base` cannot
    /// carry a path.
    pub fn url(&self, base: &url::Url) -> Result<url::Url> {
        if base.cannot_be_a_base() {
            return Err(url::ParseError::RelativeUrlWithCannotBeABaseBase.into());
        }
        let uri = self.uri()?;
        let (path, query) = uri.split_once('?').unwrap_or((&uri, ""));

        let mut url = base.clone();
        url.set_path(&format!("{}{path}", base.path().trim_end_matches('/')));
        url.set_query((!query.is_empty()).then_some(query));
        url.set_fragment(None);
        Ok(url)
    }

    /// Convert into an [`http::Request`] against `base`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidRequest`](crate::Error::InvalidRequest) if the
    /// request has no method or a header is not valid for HTTP, or any error
    /// of [`Request::url`].
    pub fn to_http(&self, base: &url::Url) -> Result<http::Request<String>> {
        let method = self
            .method()
            .ok_or_else(|| crate::Error::invalid_request("request has no HTTP method"))?;
        let url = self.url(base)?;

        let mut builder = http::Request::builder()
            .method(http::Method::from(method))
            .uri(url.as_str());
        for (name, value) in self.header_params() {
            builder = builder.header(name.as_str(), value.as_str());
        }

        builder
            .body(self.body().unwrap_or_default().to_string())
            .map_err(|err| crate::Error::invalid_request(err.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use assert2::{check, let_assert};
    use insta::assert_snapshot;

    use super::*;
    use crate::Method;

    fn pulls() -> Request {
        Request::builder()
            .method(Method::Get)
            .path("/repos/{owner}/{repo}/pulls")
            .path_param("owner", "apache")
            .path_param("repo", "red")
            .query("state", "closed")
            .query("head", "cabeza")
            .query("link", "http://foo.example.com/")
            .build()
    }

    #[test]
    fn uri_expands_and_encodes() {
        let uri = pulls().uri().expect("uri");
        assert_snapshot!(uri, @"/repos/apache/red/pulls?state=closed&head=cabeza&link=http%3A//foo.example.com/");
    }

    #[test]
    fn uri_without_query() {
        let request = Request::builder().path("/health").build();
        check!(request.uri().expect("uri") == "/health");
    }

    #[test]
    fn uri_without_path() {
        let request = Request::builder().query("q", "a b").build();
        check!(request.uri().expect("uri") == "?q=a+b");
    }

    #[test]
    fn uri_keeps_encoded_values() {
        let request = Request::builder()
            .path("/files/{name}")
            .path_param("name", "a%20b c")
            .query("q", "50%25 off")
            .build();
        assert_snapshot!(request.uri().expect("uri"), @"/files/a%20b%20c?q=50%25+off");
    }

    #[test]
    fn uri_collection_value() {
        let request = Request::builder()
            .path("/primes")
            .query("values", "2,3,5,7,11,13,17")
            .build();
        check!(request.uri().expect("uri") == "/primes?values=2,3,5,7,11,13,17");
    }

    #[test]
    fn uri_missing_path_param() {
        let request = Request::builder().path("/repos/{owner}").build();
        let err = request.uri().expect_err("missing owner");
        check!(err.missing_variable() == Some("owner"));
    }

    #[test]
    fn url_against_base() {
        let base = url::Url::parse("https://api.example.com/v3/").expect("base");
        let url = pulls().url(&base).expect("url");
        check!(url.path() == "/v3/repos/apache/red/pulls");
        check!(url.query() == Some("state=closed&head=cabeza&link=http%3A//foo.example.com/"));

        let root = url::Url::parse("https://api.example.com").expect("root");
        let url = pulls().url(&root).expect("url");
        check!(url.path() == "/repos/apache/red/pulls");
    }

    #[test]
    fn url_keeps_base_host_for_network_path_value() {
        let base = url::Url::parse("https://api.example.com/").expect("base");
        let request = Request::target("/{path}", ["//evil.example.net/x"]).expect("target");

        let url = request.url(&base).expect("url");
        check!(url.scheme() == "https");
        check!(url.host_str() == Some("api.example.com"));
        check!(url.path() == "///evil.example.net/x");
    }

    #[test]
    fn url_keeps_base_scheme_for_scheme_like_value() {
        let base = url::Url::parse("https://api.example.com/").expect("base");
        let request = Request::target("/{id}", ["urn:isbn:123"]).expect("target");

        let url = request.url(&base).expect("url");
        check!(url.scheme() == "https");
        check!(url.host_str() == Some("api.example.com"));
        check!(url.path() == "/urn:isbn:123");
    }

    #[test]
    fn url_replaces_base_query() {
        let base = url::Url::parse("https://api.example.com/v3?page=2#top").expect("base");
        let request = Request::builder().path("/health").build();

        let url = request.url(&base).expect("url");
        check!(url.as_str() == "https://api.example.com/v3/health");
    }

    #[test]
    fn url_against_opaque_base() {
        let base = url::Url::parse("mailto:ops@example.com").expect("base");
        let_assert!(Err(crate::Error::InvalidUrl(_)) = pulls().url(&base));
    }

    #[test]
    fn uri_encodes_template_text() {
        let request = Request::target("/a b/{x}", ["y"]).expect("target");
        check!(request.uri().expect("uri") == "/a%20b/y");
    }

    #[test]
    fn to_http_request() {
        let base = url::Url::parse("https://api.example.com").expect("base");
        let request = pulls()
            .with_header("Link", "http://bar.example.com/")
            .with_body(r#"{"draft":true}"#);

        let http_request = request.to_http(&base).expect("http request");
        check!(http_request.method() == http::Method::GET);
        check!(http_request.uri().path() == "/repos/apache/red/pulls");
        check!(http_request.headers()["link"] == "http://bar.example.com/");
        check!(http_request.headers()["content-type"] == "application/json");
        check!(http_request.body() == r#"{"draft":true}"#);
    }

    #[test]
    fn to_http_without_method() {
        let base = url::Url::parse("https://api.example.com").expect("base");
        let request = Request::builder().path("/health").build();
        let_assert!(Err(crate::Error::InvalidRequest(message)) = request.to_http(&base));
        check!(message == "request has no HTTP method");
    }
}
