//! Prelude module for convenient imports.
//!
//! ```ignore
//! use stencil_core::prelude::*;
//! ```

pub use crate::{
    Arg, Error, Field, Method, MethodDescriptor, ObjectDescriptor, ParamDescriptor, Record,
    Request, RequestBuilder, RequestFields, ResponseType, Result, Role, Synthesis, SynthesisConfig,
};
