//! Core types for stencil request synthesis.
//!
//! This crate turns declarative interface descriptions into immutable
//! request values and assembles their URIs:
//! - [`Method`] - HTTP method enum
//! - [`Request`] and [`RequestBuilder`] - immutable request values, with merge
//! - [`MethodDescriptor`], [`ParamDescriptor`] and [`Arg`] - method calls to synthesize
//! - [`RequestFields`] - objects whose fields carry parameter roles
//! - [`ObjectDescriptor`] and [`Record`] - runtime-described objects
//! - [`PathTemplate`] - path template parsing and expansion
//! - [`encoding`] and [`structured`] - component encoding and parameter parsing
//! - [`SynthesisConfig`] - synthesis defaults
//! - [`Error`] and [`Result`] - Error handling

mod body;
mod config;
pub mod encoding;
mod error;
mod method;
mod params;
pub mod path_template;
pub mod prelude;
mod record;
mod request;
pub mod structured;
mod synthesis;
mod uri;

pub use body::{ACCEPT, APPLICATION_JSON, CONTENT_TYPE, to_json, to_json_pretty};
pub use config::{Synthesis, SynthesisConfig, SynthesisConfigBuilder};
pub use error::{Error, Result};
pub use method::Method;
pub use params::{Arg, Field, MethodDescriptor, ParamDescriptor, RequestFields, ResponseType, Role};
pub use path_template::{PathSegment, PathTemplate};
pub use record::{FieldDescriptor, ObjectDescriptor, OwnedRecord, Record};
pub use request::{Request, RequestBuilder};
pub use structured::{MultiMap, ParseOptions};
pub use uri::assemble_uri;
