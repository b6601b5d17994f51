//! Parameter roles and the descriptor tables consumed by request synthesis.
//!
//! A [`MethodDescriptor`] is built once per interface method (usually by the
//! `#[stencil]` macro) and paired with the runtime [`Arg`] list of a call.
//! Objects expose their annotated fields through [`RequestFields`], usually
//! implemented by `#[derive(RequestFields)]`.

use std::fmt;

use serde::Serialize;

use crate::{Method, Result};

/// Where a parameter is sent in the HTTP request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Role {
    /// Path parameter (e.g., `/users/{id}`)
    Path,
    /// Query parameter (e.g., `?limit=10`)
    Query,
    /// Header parameter
    Header,
    /// Request body (JSON)
    Body,
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Path => write!(f, "path"),
            Self::Query => write!(f, "query"),
            Self::Header => write!(f, "header"),
            Self::Body => write!(f, "body"),
        }
    }
}

/// Declared type of a method result.
///
/// Only the name is kept; a method without result has no `ResponseType`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ResponseType(&'static str);

impl ResponseType {
    /// Response type with an explicit name.
    #[must_use]
    pub const fn new(name: &'static str) -> Self {
        Self(name)
    }

    /// Response type of `T`.
    #[must_use]
    pub fn of<T: ?Sized>() -> Self {
        Self(std::any::type_name::<T>())
    }

    /// The type name.
    #[must_use]
    pub const fn name(&self) -> &'static str {
        self.0
    }

    /// Returns `true` for the unit type, which is treated as "no result".
    #[must_use]
    pub fn is_unit(&self) -> bool {
        self.0 == "()"
    }
}

impl fmt::Display for ResponseType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.0)
    }
}

/// Declared parameter of an interface method.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ParamDescriptor {
    /// Wire name for path, query and header parameters; the declared
    /// argument name otherwise.
    pub name: &'static str,
    /// Role of the parameter, `None` when it carries no annotation.
    pub role: Option<Role>,
}

impl ParamDescriptor {
    /// Path parameter bound to template variable `name`.
    #[must_use]
    pub const fn path(name: &'static str) -> Self {
        Self {
            name,
            role: Some(Role::Path),
        }
    }

    /// Query parameter `name`.
    #[must_use]
    pub const fn query(name: &'static str) -> Self {
        Self {
            name,
            role: Some(Role::Query),
        }
    }

    /// Header parameter `name`.
    #[must_use]
    pub const fn header(name: &'static str) -> Self {
        Self {
            name,
            role: Some(Role::Header),
        }
    }

    /// Explicit body parameter.
    #[must_use]
    pub const fn body(name: &'static str) -> Self {
        Self {
            name,
            role: Some(Role::Body),
        }
    }

    /// Parameter without annotation: an inferred body object.
    #[must_use]
    pub const fn inferred(name: &'static str) -> Self {
        Self { name, role: None }
    }
}

/// Descriptor of an interface method, built once and reused for every call.
///
/// # Example
///
/// ```
/// use stencil_core::{Method, MethodDescriptor, ParamDescriptor, ResponseType};
///
/// static GET_USER: MethodDescriptor = MethodDescriptor {
///     name: "get_user",
///     markers: &[Method::Get],
///     path: Some("/users/{id}"),
///     params: &[ParamDescriptor::path("id")],
///     response: Some(ResponseType::new("User")),
/// };
/// assert_eq!(GET_USER.http_method().expect("one marker"), Method::Get);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MethodDescriptor {
    /// The method name, used in error messages.
    pub name: &'static str,
    /// HTTP-method markers declared on the method; exactly one is expected.
    pub markers: &'static [Method],
    /// The path template.
    pub path: Option<&'static str>,
    /// Declared parameters, in call order.
    pub params: &'static [ParamDescriptor],
    /// Declared result type, `None` for methods without result.
    pub response: Option<ResponseType>,
}

impl MethodDescriptor {
    /// Resolve the HTTP method from the declared markers.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidMethodSignature`](crate::Error::InvalidMethodSignature)
    /// unless exactly one marker is declared.
    pub fn http_method(&self) -> Result<Method> {
        Method::from_markers(self.name, self.markers)
    }

    /// Returns `true` if the method declares a non-unit result.
    #[must_use]
    pub fn returns_value(&self) -> bool {
        self.response.is_some_and(|response| !response.is_unit())
    }
}

/// Runtime argument of a call, matched positionally with a [`ParamDescriptor`].
pub enum Arg<'a> {
    /// Value of an annotated parameter.
    Value(std::result::Result<serde_json::Value, serde_json::Error>),
    /// Unannotated argument, introspected for its own fields.
    Object(&'a dyn RequestFields),
}

impl<'a> Arg<'a> {
    /// Argument for an annotated parameter.
    ///
    /// Conversion errors surface when the call is classified.
    pub fn value<T: Serialize + ?Sized>(value: &T) -> Self {
        Self::Value(serde_json::to_value(value))
    }

    /// Argument for an unannotated parameter.
    pub fn object(object: &'a dyn RequestFields) -> Self {
        Self::Object(object)
    }
}

impl fmt::Debug for Arg<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Value(value) => f.debug_tuple("Value").field(value).finish(),
            Self::Object(object) => f.debug_tuple("Object").field(&object.type_name()).finish(),
        }
    }
}

/// A declared field of an object with its resolved value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Field {
    /// Role of the field.
    pub role: Role,
    /// Wire name of the field.
    pub name: String,
    /// Rendered value, `None` when the field is null.
    pub value: Option<String>,
}

impl Field {
    /// Create a field with an already rendered value.
    #[must_use]
    pub fn new(role: Role, name: impl Into<String>, value: Option<String>) -> Self {
        Self {
            role,
            name: name.into(),
            value,
        }
    }

    /// Create a field by rendering a serializable value.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ParamSerialization`](crate::Error::ParamSerialization)
    /// if the value cannot be serialized.
    pub fn from_serialize<T: Serialize + ?Sized>(
        role: Role,
        name: impl Into<String>,
        value: &T,
    ) -> Result<Self> {
        let name = name.into();
        let value = render_param(&name, serde_json::to_value(value))?;
        Ok(Self { role, name, value })
    }

    /// A field that belongs to the body; its value is part of the whole
    /// object serialization.
    #[must_use]
    pub fn body(name: impl Into<String>) -> Self {
        Self::new(Role::Body, name, None)
    }
}

/// Metadata provider for an annotated object.
///
/// Usually derived with `#[derive(RequestFields)]`.
pub trait RequestFields {
    /// Name of the type, used in error messages.
    fn type_name(&self) -> &'static str {
        std::any::type_name::<Self>()
    }

    /// Every declared field with its role, wire name and current value.
    ///
    /// # Errors
    ///
    /// Returns [`Error::FieldAccess`](crate::Error::FieldAccess) if a field
    /// cannot be read.
    fn fields(&self) -> Result<Vec<Field>>;

    /// The body representation of the object, `None` if it has no body field.
    ///
    /// # Errors
    ///
    /// Returns [`Error::BodySerialization`](crate::Error::BodySerialization)
    /// if the serialization collaborator fails.
    fn body(&self) -> Result<Option<serde_json::Value>> {
        Ok(None)
    }
}

impl<T: RequestFields + ?Sized> RequestFields for &T {
    fn type_name(&self) -> &'static str {
        (**self).type_name()
    }

    fn fields(&self) -> Result<Vec<Field>> {
        (**self).fields()
    }

    fn body(&self) -> Result<Option<serde_json::Value>> {
        (**self).body()
    }
}

impl<T: RequestFields + ?Sized> RequestFields for Box<T> {
    fn type_name(&self) -> &'static str {
        (**self).type_name()
    }

    fn fields(&self) -> Result<Vec<Field>> {
        (**self).fields()
    }

    fn body(&self) -> Result<Option<serde_json::Value>> {
        (**self).body()
    }
}

/// A missing object contributes nothing.
impl<T: RequestFields> RequestFields for Option<T> {
    fn type_name(&self) -> &'static str {
        self.as_ref()
            .map_or_else(|| std::any::type_name::<T>(), RequestFields::type_name)
    }

    fn fields(&self) -> Result<Vec<Field>> {
        self.as_ref().map_or_else(|| Ok(Vec::new()), RequestFields::fields)
    }

    fn body(&self) -> Result<Option<serde_json::Value>> {
        self.as_ref().map_or(Ok(None), RequestFields::body)
    }
}

/// Render a converted argument as a parameter value.
///
/// `null` is dropped, strings are kept verbatim, arrays are joined with `,`
/// and objects are written as compact JSON.
pub(crate) fn render_param(
    name: &str,
    value: std::result::Result<serde_json::Value, serde_json::Error>,
) -> Result<Option<String>> {
    let value = value.map_err(|err| crate::Error::param_serialization(name, err.to_string()))?;
    Ok(render_value(&value))
}

fn render_value(value: &serde_json::Value) -> Option<String> {
    match value {
        serde_json::Value::Null => None,
        serde_json::Value::String(text) => Some(text.clone()),
        serde_json::Value::Array(items) => Some(
            items
                .iter()
                .filter_map(render_value)
                .collect::<Vec<_>>()
                .join(","),
        ),
        other => Some(other.to_string()),
    }
}
