//! Declarative HTTP request synthesis for Rust.
//!
//! Describe an HTTP API as an annotated trait and get immutable request
//! values back: method, path template, path/query/header parameters, body
//! and expected response type. Requests can be merged, rendered to a URI and
//! converted to `http::Request`.
//!
//! # Example
//!
//! ```ignore
//! use stencil::prelude::*;
//!
//! #[derive(Debug, Deserialize)]
//! pub struct Pull {
//!     number: u64,
//!     title: String,
//! }
//!
//! #[stencil]
//! pub trait PullsApi {
//!     #[get("/repos/{owner}/{repo}/pulls")]
//!     fn pulls(&self, #[path] owner: &str, #[path] repo: &str, #[query] state: &str) -> Vec<Pull>;
//! }
//!
//! let synthesizer = Synthesizer::default().with_base_url("https://api.github.com")?;
//! let request = synthesizer.pulls("apache", "tomee", "open")?;
//! assert_eq!(request.uri()?, "/repos/apache/tomee/pulls?state=open");
//! ```

pub mod prelude;
mod synthesizer;

pub use synthesizer::Synthesizer;

// Re-export core types
pub use stencil_core::{
    ACCEPT, APPLICATION_JSON, Arg, CONTENT_TYPE, Error, Field, FieldDescriptor, Method,
    MethodDescriptor, MultiMap, ObjectDescriptor, OwnedRecord, ParamDescriptor, ParseOptions,
    PathSegment, PathTemplate, Record, Request, RequestBuilder, RequestFields, ResponseType,
    Result, Role, Synthesis, SynthesisConfig, SynthesisConfigBuilder, assemble_uri, encoding,
    path_template, structured, to_json, to_json_pretty,
};

// Re-export crates for macro-generated code
pub use http;
pub use indexmap;
pub use serde_json;
pub use url;

// Re-export macros
pub use stencil_macro::{RequestFields, delete, get, head, options, patch, post, put, stencil};
