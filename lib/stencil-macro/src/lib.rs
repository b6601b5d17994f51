//! Procedural macros for stencil request synthesis.
//!
//! This crate provides the proc-macros that build descriptor tables at
//! compile time:
//! - `#[stencil]` - Turn a trait into a set of request-synthesizing methods
//! - `#[get]`, `#[post]`, `#[put]`, `#[delete]`, `#[patch]`, `#[head]`, `#[options]` - HTTP method markers
//! - `#[path]`, `#[query]`, `#[header]`, `#[body]` - Parameter roles
//! - `#[derive(RequestFields)]` - Field roles of a struct
//!
//! # Example
//!
//! ```ignore
//! use stencil::prelude::*;
//!
//! #[stencil]
//! pub trait PullsApi {
//!     #[get("/repos/{owner}/{repo}/pulls")]
//!     fn pulls(&self, #[path] owner: &str, #[path] repo: &str) -> Vec<Pull>;
//! }
//!
//! let request = SynthesisConfig::default().pulls("apache", "tomee")?;
//! ```

mod attrs;
mod expand;
mod fields_derive;

use proc_macro::TokenStream;

/// Turn a trait into request-synthesizing methods.
///
/// Each method must take `&self`, carry exactly one HTTP method marker and
/// may tag its parameters with `#[path]`, `#[query]`, `#[header]` (an
/// optional string argument sets the wire name) or `#[body]`. A parameter
/// without a tag is an object implementing `RequestFields` whose fields
/// are merged under the tagged parameters.
///
/// The declared result type is recorded as the expected response type and
/// every method is rewritten to return `stencil::Result<stencil::Request>`.
/// The trait is implemented for every `stencil::Synthesis` type.
///
/// # Example
///
/// ```ignore
/// #[stencil]
/// pub trait PullsApi {
///     #[put("/repos/{owner}/{repo}/pulls")]
///     fn update(&self, #[path("repo")] name: &str, #[header("Link")] link: &str, pull: &Pull);
/// }
///
/// let request = Synthesizer::default().update("red", "http://foo.example.com/", &pull)?;
/// ```
#[proc_macro_attribute]
pub fn stencil(attr: TokenStream, item: TokenStream) -> TokenStream {
    expand::expand_stencil_trait(attr.into(), item.into())
        .unwrap_or_else(|e| e.to_compile_error())
        .into()
}

/// Mark a method of a `#[stencil]` trait as a GET request.
///
/// # Example
///
/// ```ignore
/// #[get("/users/{id}")]
/// fn get_user(&self, #[path] id: u64) -> User;
/// ```
#[proc_macro_attribute]
pub fn get(_attr: TokenStream, item: TokenStream) -> TokenStream {
    expand::misplaced_marker("get", item.into()).into()
}

/// Mark a method of a `#[stencil]` trait as a POST request.
///
/// # Example
///
/// ```ignore
/// #[post("/users")]
/// fn create_user(&self, #[body] user: &CreateUser) -> User;
/// ```
#[proc_macro_attribute]
pub fn post(_attr: TokenStream, item: TokenStream) -> TokenStream {
    expand::misplaced_marker("post", item.into()).into()
}

/// Mark a method of a `#[stencil]` trait as a PUT request.
#[proc_macro_attribute]
pub fn put(_attr: TokenStream, item: TokenStream) -> TokenStream {
    expand::misplaced_marker("put", item.into()).into()
}

/// Mark a method of a `#[stencil]` trait as a DELETE request.
#[proc_macro_attribute]
pub fn delete(_attr: TokenStream, item: TokenStream) -> TokenStream {
    expand::misplaced_marker("delete", item.into()).into()
}

/// Mark a method of a `#[stencil]` trait as a PATCH request.
#[proc_macro_attribute]
pub fn patch(_attr: TokenStream, item: TokenStream) -> TokenStream {
    expand::misplaced_marker("patch", item.into()).into()
}

/// Mark a method of a `#[stencil]` trait as a HEAD request.
#[proc_macro_attribute]
pub fn head(_attr: TokenStream, item: TokenStream) -> TokenStream {
    expand::misplaced_marker("head", item.into()).into()
}

/// Mark a method of a `#[stencil]` trait as an OPTIONS request.
#[proc_macro_attribute]
pub fn options(_attr: TokenStream, item: TokenStream) -> TokenStream {
    expand::misplaced_marker("options", item.into()).into()
}

/// Derive the `RequestFields` trait for a struct.
///
/// Only fields tagged with `#[param(...)]` are request fields; the others
/// are ignored. The body is the JSON object of the body fields.
///
/// # Struct Attributes
///
/// - `#[param(rename_all = "camelCase")]` - Default wire names from field names
///
/// Supported case conventions: `lowercase`, `UPPERCASE`, `camelCase`,
/// `PascalCase`, `snake_case`, `SCREAMING_SNAKE_CASE`, `kebab-case`,
/// `Train-Case`.
///
/// # Field Attributes
///
/// - `#[param(path)]`, `#[param(path = "name")]` - Path parameter
/// - `#[param(query)]`, `#[param(query = "name")]` - Query parameter
/// - `#[param(header)]`, `#[param(header = "name")]` - Header
/// - `#[param(body)]`, `#[param(body = "name")]` - Body member
///
/// # Example
///
/// ```ignore
/// #[derive(RequestFields)]
/// struct Orange {
///     #[param(path)]
///     owner: String,
///     #[param(query)]
///     state: Option<State>,
///     #[param(header = "Link")]
///     link: String,
///     #[param(body)]
///     draft: bool,
/// }
/// ```
#[proc_macro_derive(RequestFields, attributes(param))]
pub fn derive_request_fields(input: TokenStream) -> TokenStream {
    fields_derive::expand_fields_derive(input.into())
        .unwrap_or_else(|e| e.to_compile_error())
        .into()
}
