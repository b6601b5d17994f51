//! Immutable request values.
//!
//! A [`Request`] is the intermediate representation of an HTTP call: method,
//! path template, path/query/header parameters, body and expected response
//! type. It is never mutated; [`RequestBuilder`] creates new values and the
//! `with_*` methods return modified copies.
//!
//! # Example
//!
//! ```
//! use stencil_core::{Method, Request};
//!
//! let request = Request::builder()
//!     .method(Method::Get)
//!     .path("/repos/{owner}/{repo}/pulls")
//!     .path_param("owner", "apache")
//!     .path_param("repo", "tomee")
//!     .query("state", "open")
//!     .header("Accept", "application/json")
//!     .build();
//!
//! assert_eq!(request.header("accept"), Some("application/json"));
//! ```

use std::fmt::Display;

use indexmap::IndexMap;
use serde::Serialize;
use tracing::debug;

use crate::body::{APPLICATION_JSON, CONTENT_TYPE, to_json};
use crate::path_template::template_variables;
use crate::structured::{ParseOptions, parse_structured_params};
use crate::{Method, PathTemplate, ResponseType, Result};

/// An HTTP request description, before any URI is assembled.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Request {
    method: Option<Method>,
    path: Option<String>,
    body: Option<String>,
    response_type: Option<ResponseType>,
    path_params: IndexMap<String, String>,
    query_params: IndexMap<String, String>,
    header_params: IndexMap<String, String>,
}

impl Request {
    /// Creates a new [`RequestBuilder`].
    #[must_use]
    pub fn builder() -> RequestBuilder {
        RequestBuilder::default()
    }

    /// Request positioned on `template`, positional values bound to its
    /// variables in order of appearance.
    ///
    /// Fewer values than variables is allowed; the remaining variables are
    /// left for later binding.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ExcessPathParameters`](crate::Error::ExcessPathParameters)
    /// when more values than variables are supplied.
    ///
    /// # Example
    ///
    /// ```
    /// use stencil_core::Request;
    ///
    /// let request = Request::target("/repos/{owner}/{repo}", ["apache"]).expect("target");
    /// assert_eq!(request.path_param("owner"), Some("apache"));
    /// assert_eq!(request.path_param("repo"), None);
    /// ```
    pub fn target<I>(template: &str, positional: I) -> Result<Self>
    where
        I: IntoIterator,
        I::Item: Display,
    {
        let variables = template_variables(template);
        let values: Vec<String> = positional.into_iter().map(|v| v.to_string()).collect();
        if values.len() > variables.len() {
            return Err(crate::Error::excess_path_parameters(
                template,
                variables.len(),
                values.len(),
            ));
        }

        Ok(Self::builder()
            .path(template)
            .path_params(variables.into_iter().zip(values))
            .build())
    }

    /// HTTP method, if known.
    #[must_use]
    pub const fn method(&self) -> Option<Method> {
        self.method
    }

    /// Path template, before substitution.
    #[must_use]
    pub fn path(&self) -> Option<&str> {
        self.path.as_deref()
    }

    /// Path template as a [`PathTemplate`].
    #[must_use]
    pub fn path_template(&self) -> Option<PathTemplate> {
        self.path.as_deref().map(PathTemplate::new)
    }

    /// Serialized body.
    #[must_use]
    pub fn body(&self) -> Option<&str> {
        self.body.as_deref()
    }

    /// Returns `true` if the request carries a body.
    #[must_use]
    pub const fn has_body(&self) -> bool {
        self.body.is_some()
    }

    /// Expected response type.
    #[must_use]
    pub const fn response_type(&self) -> Option<ResponseType> {
        self.response_type
    }

    /// Path parameters, in insertion order.
    #[must_use]
    pub fn path_params(&self) -> &IndexMap<String, String> {
        &self.path_params
    }

    /// Query parameters, in insertion order.
    #[must_use]
    pub fn query_params(&self) -> &IndexMap<String, String> {
        &self.query_params
    }

    /// Header parameters, names lower-cased.
    #[must_use]
    pub fn header_params(&self) -> &IndexMap<String, String> {
        &self.header_params
    }

    /// Single path parameter by name.
    #[must_use]
    pub fn path_param(&self, name: &str) -> Option<&str> {
        self.path_params.get(name).map(String::as_str)
    }

    /// Single query parameter by name.
    #[must_use]
    pub fn query(&self, name: &str) -> Option<&str> {
        self.query_params.get(name).map(String::as_str)
    }

    /// Single header by name, case-insensitive.
    #[must_use]
    pub fn header(&self, name: &str) -> Option<&str> {
        self.header_params
            .get(&name.to_ascii_lowercase())
            .map(String::as_str)
    }

    /// A builder pre-filled with this request.
    #[must_use]
    pub fn to_builder(&self) -> RequestBuilder {
        RequestBuilder {
            method: self.method,
            path: self.path.clone(),
            body: self.body.clone(),
            response_type: self.response_type,
            path_params: self.path_params.clone(),
            query_params: self.query_params.clone(),
            header_params: self.header_params.clone(),
        }
    }

    /// Copy with one more path parameter.
    #[must_use]
    pub fn with_path_param(&self, name: impl Into<String>, value: impl Display) -> Self {
        self.to_builder().path_param(name, value).build()
    }

    /// Copy with one more query parameter.
    #[must_use]
    pub fn with_query(&self, name: impl Into<String>, value: impl Display) -> Self {
        self.to_builder().query(name, value).build()
    }

    /// Copy with one more header.
    #[must_use]
    pub fn with_header(&self, name: &str, value: impl Display) -> Self {
        self.to_builder().header(name, value).build()
    }

    /// Copy with a serialized body.
    #[must_use]
    pub fn with_body(&self, body: impl Into<String>) -> Self {
        self.to_builder().body(body).build()
    }

    /// Copy with a JSON body.
    ///
    /// # Errors
    ///
    /// Returns an error if JSON serialization fails.
    pub fn with_json<T: Serialize + ?Sized>(&self, value: &T) -> Result<Self> {
        Ok(self.to_builder().json(value)?.build())
    }

    /// Copy expecting a `T` response.
    #[must_use]
    pub fn with_response<T: ?Sized>(&self) -> Self {
        self.to_builder().response::<T>().build()
    }

    /// Overlay `other` on this request.
    ///
    /// Parameters of `other` win key by key, the others are kept. The body,
    /// path, method and response type of `other` replace this request's
    /// ones when present. A body in `other` implies a content type.
    ///
    /// # Example
    ///
    /// ```
    /// use stencil_core::Request;
    ///
    /// let base = Request::builder().query("a", 1).query("b", 2).build();
    /// let other = Request::builder().query("b", 3).build();
    ///
    /// let merged = base.merge(&other);
    /// assert_eq!(merged.query("a"), Some("1"));
    /// assert_eq!(merged.query("b"), Some("3"));
    /// ```
    #[must_use]
    pub fn merge(&self, other: &Self) -> Self {
        debug!(
            base_path = self.path.as_deref(),
            override_path = other.path.as_deref(),
            "merging requests"
        );

        let mut merged = self
            .to_builder()
            .path_params(other.path_params.clone())
            .query_params(other.query_params.clone())
            .header_params(other.header_params.clone());

        if let Some(body) = &other.body {
            merged = merged.body(body.clone());
        }
        if let Some(path) = &other.path {
            merged = merged.path(path.clone());
        }
        if let Some(method) = other.method {
            merged = merged.method(method);
        }
        if let Some(response_type) = other.response_type {
            merged = merged.response_type(response_type);
        }

        merged.build()
    }
}

/// Builder for constructing [`Request`] instances.
#[derive(Debug, Clone, Default)]
pub struct RequestBuilder {
    method: Option<Method>,
    path: Option<String>,
    body: Option<String>,
    response_type: Option<ResponseType>,
    path_params: IndexMap<String, String>,
    query_params: IndexMap<String, String>,
    header_params: IndexMap<String, String>,
}

impl RequestBuilder {
    /// Creates a new builder.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the HTTP method.
    #[must_use]
    pub const fn method(mut self, method: Method) -> Self {
        self.method = Some(method);
        self
    }

    /// Sets the path template.
    #[must_use]
    pub fn path(mut self, path: impl Into<String>) -> Self {
        self.path = Some(path.into());
        self
    }

    /// Sets a path parameter.
    #[must_use]
    pub fn path_param(mut self, name: impl Into<String>, value: impl Display) -> Self {
        self.path_params.insert(name.into(), value.to_string());
        self
    }

    /// Sets multiple path parameters.
    #[must_use]
    pub fn path_params(mut self, params: impl IntoIterator<Item = (String, String)>) -> Self {
        self.path_params.extend(params);
        self
    }

    /// Sets a query parameter.
    #[must_use]
    pub fn query(mut self, name: impl Into<String>, value: impl Display) -> Self {
        self.query_params.insert(name.into(), value.to_string());
        self
    }

    /// Sets multiple query parameters.
    #[must_use]
    pub fn query_params(mut self, params: impl IntoIterator<Item = (String, String)>) -> Self {
        self.query_params.extend(params);
        self
    }

    /// Sets the query parameters found in a raw query string.
    ///
    /// Names and values are decoded. A repeated name keeps all its values
    /// joined with `,`, a name without `=` gets an empty value.
    #[must_use]
    pub fn query_string(mut self, query: &str) -> Self {
        let query = query.strip_prefix('?').unwrap_or(query);
        for (name, values) in parse_structured_params(query, &ParseOptions::query()).iter() {
            let value = values
                .iter()
                .flatten()
                .map(String::as_str)
                .collect::<Vec<_>>()
                .join(",");
            self.query_params.insert(name.to_string(), value);
        }
        self
    }

    /// Sets a header; the name is lower-cased.
    #[must_use]
    pub fn header(mut self, name: &str, value: impl Display) -> Self {
        self.header_params
            .insert(name.to_ascii_lowercase(), value.to_string());
        self
    }

    /// Sets multiple headers; names are lower-cased.
    #[must_use]
    pub fn header_params(mut self, headers: impl IntoIterator<Item = (String, String)>) -> Self {
        self.header_params.extend(
            headers
                .into_iter()
                .map(|(name, value)| (name.to_ascii_lowercase(), value)),
        );
        self
    }

    /// Sets the serialized body.
    ///
    /// A JSON content type is added unless one is already set.
    #[must_use]
    pub fn body(mut self, body: impl Into<String>) -> Self {
        self.body = Some(body.into());
        self.header_params
            .entry(CONTENT_TYPE.to_string())
            .or_insert_with(|| APPLICATION_JSON.to_string());
        self
    }

    /// Sets a JSON body.
    ///
    /// # Errors
    ///
    /// Returns an error if JSON serialization fails.
    pub fn json<T: Serialize + ?Sized>(self, value: &T) -> Result<Self> {
        let body = to_json(value)?;
        Ok(self.body(body))
    }

    /// Expect a `T` response.
    #[must_use]
    pub fn response<T: ?Sized>(self) -> Self {
        self.response_type(ResponseType::of::<T>())
    }

    /// Sets the expected response type.
    #[must_use]
    pub const fn response_type(mut self, response_type: ResponseType) -> Self {
        self.response_type = Some(response_type);
        self
    }

    /// Builds the request.
    #[must_use]
    pub fn build(self) -> Request {
        Request {
            method: self.method,
            path: self.path,
            body: self.body,
            response_type: self.response_type,
            path_params: self.path_params,
            query_params: self.query_params,
            header_params: self.header_params,
        }
    }
}
