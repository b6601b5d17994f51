//! Prelude module for convenient imports.
//!
//! This module re-exports the most commonly used types, traits and macros
//! for easy glob importing:
//!
//! ```ignore
//! use stencil::prelude::*;
//! ```

pub use crate::{
    Arg, Error, Field, Method, MethodDescriptor, ObjectDescriptor, ParamDescriptor, Record,
    Request, RequestBuilder, RequestFields, ResponseType, Result, Role, Synthesis,
    SynthesisConfig, Synthesizer, delete, get, head, options, patch, post, put, stencil,
};
pub use serde::{Deserialize, Serialize};
