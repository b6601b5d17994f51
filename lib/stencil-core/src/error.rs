//! Error types for stencil.
//!
//! Every variant is raised while a [`Request`](crate::Request) is being
//! synthesized or assembled. None of them is transient: they describe a
//! mistake in a descriptor table, a call, or a value, so nothing is retried.

use derive_more::{Display, Error, From};

/// Main error type for stencil operations.
#[derive(Debug, Display, Error, From)]
pub enum Error {
    /// The method being converted carries no HTTP-method marker (or several).
    #[display("invalid method signature `{method}`: {message}")]
    #[from(skip)]
    InvalidMethodSignature {
        /// Name of the offending method.
        method: String,
        /// What is wrong with it.
        message: String,
    },

    /// More than one argument of a single call could be the request body.
    #[display(
        "ambiguous body in `{method}`: methods may only have one non-annotated parameter, found {count}"
    )]
    #[from(skip)]
    AmbiguousBody {
        /// Name of the offending method.
        method: String,
        /// Number of body candidates found.
        count: usize,
    },

    /// More positional path values than the template has variables.
    #[display(
        "excess path parameters supplied: path {path} contains {expected} parameters, but {supplied} were supplied"
    )]
    #[from(skip)]
    ExcessPathParameters {
        /// The path template.
        path: String,
        /// Number of variables in the template.
        expected: usize,
        /// Number of values supplied.
        supplied: usize,
    },

    /// The template references a variable that has no path parameter.
    #[display("missing path parameter `{name}` for path {path}")]
    #[from(skip)]
    MissingPathParameter {
        /// The path template.
        path: String,
        /// The unresolved variable.
        name: String,
    },

    /// The serialization collaborator failed on a body value.
    #[display("body serialization error: {_0}")]
    #[from]
    BodySerialization(serde_json::Error),

    /// A declared field could not be read from its object.
    #[display("cannot get value of field `{field}` on `{type_name}`")]
    #[from(skip)]
    FieldAccess {
        /// Type (or schema) owning the field.
        type_name: String,
        /// The field that could not be read.
        field: String,
    },

    /// A call argument could not be turned into a parameter value.
    #[display("cannot convert parameter `{name}`: {message}")]
    #[from(skip)]
    ParamSerialization {
        /// Wire name of the parameter.
        name: String,
        /// Error message.
        message: String,
    },

    /// URL parsing error.
    #[display("invalid URL: {_0}")]
    #[from]
    InvalidUrl(url::ParseError),

    /// The request cannot be turned into an HTTP request.
    #[display("invalid request: {_0}")]
    #[from(skip)]
    InvalidRequest(#[error(not(source))] String),
}

/// Result type alias using [`crate::Error`].
pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    /// Create an invalid method signature error.
    #[must_use]
    pub fn invalid_method_signature(method: impl Into<String>, message: impl Into<String>) -> Self {
        Self::InvalidMethodSignature {
            method: method.into(),
            message: message.into(),
        }
    }

    /// Create an ambiguous body error.
    #[must_use]
    pub fn ambiguous_body(method: impl Into<String>, count: usize) -> Self {
        Self::AmbiguousBody {
            method: method.into(),
            count,
        }
    }

    /// Create an excess path parameters error.
    #[must_use]
    pub fn excess_path_parameters(path: impl Into<String>, expected: usize, supplied: usize) -> Self {
        Self::ExcessPathParameters {
            path: path.into(),
            expected,
            supplied,
        }
    }

    /// Create a missing path parameter error.
    #[must_use]
    pub fn missing_path_parameter(path: impl Into<String>, name: impl Into<String>) -> Self {
        Self::MissingPathParameter {
            path: path.into(),
            name: name.into(),
        }
    }

    /// Create a field access error.
    #[must_use]
    pub fn field_access(type_name: impl Into<String>, field: impl Into<String>) -> Self {
        Self::FieldAccess {
            type_name: type_name.into(),
            field: field.into(),
        }
    }

    /// Create a parameter serialization error.
    #[must_use]
    pub fn param_serialization(name: impl Into<String>, message: impl Into<String>) -> Self {
        Self::ParamSerialization {
            name: name.into(),
            message: message.into(),
        }
    }

    /// Create an invalid request error.
    #[must_use]
    pub fn invalid_request(message: impl Into<String>) -> Self {
        Self::InvalidRequest(message.into())
    }

    /// Returns `true` if the error comes from a malformed descriptor or call
    /// shape rather than from a value.
    #[must_use]
    pub const fn is_signature_error(&self) -> bool {
        matches!(
            self,
            Self::InvalidMethodSignature { .. } | Self::AmbiguousBody { .. }
        )
    }

    /// Returns `true` if the error comes from path template resolution.
    #[must_use]
    pub const fn is_path_error(&self) -> bool {
        matches!(
            self,
            Self::ExcessPathParameters { .. } | Self::MissingPathParameter { .. }
        )
    }

    /// Returns the unresolved variable name for a missing path parameter.
    #[must_use]
    pub fn missing_variable(&self) -> Option<&str> {
        match self {
            Self::MissingPathParameter { name, .. } => Some(name),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_display() {
        let err = Error::ambiguous_body("orange", 2);
        assert_eq!(
            err.to_string(),
            "ambiguous body in `orange`: methods may only have one non-annotated parameter, found 2"
        );

        let err = Error::excess_path_parameters("/users/{id}", 1, 3);
        assert_eq!(
            err.to_string(),
            "excess path parameters supplied: path /users/{id} contains 1 parameters, but 3 were supplied"
        );

        let err = Error::missing_path_parameter("/repos/{owner}", "owner");
        assert_eq!(
            err.to_string(),
            "missing path parameter `owner` for path /repos/{owner}"
        );

        let err = Error::field_access("Orange", "draft");
        assert_eq!(
            err.to_string(),
            "cannot get value of field `draft` on `Orange`"
        );
    }

    #[test]
    fn error_kinds() {
        assert!(Error::invalid_method_signature("get", "no marker").is_signature_error());
        assert!(Error::ambiguous_body("get", 2).is_signature_error());
        assert!(!Error::invalid_request("boom").is_signature_error());

        assert!(Error::missing_path_parameter("/{a}", "a").is_path_error());
        assert!(Error::excess_path_parameters("/{a}", 1, 2).is_path_error());
        assert!(!Error::field_access("T", "f").is_path_error());
    }

    #[test]
    fn error_missing_variable() {
        let err = Error::missing_path_parameter("/repos/{owner}", "owner");
        assert_eq!(err.missing_variable(), Some("owner"));
        assert_eq!(Error::invalid_request("boom").missing_variable(), None);
    }

    #[test]
    fn error_from_serde_json() {
        let json_err = serde_json::from_str::<u32>("nope").expect_err("invalid json");
        let err = Error::from(json_err);
        assert!(matches!(err, Error::BodySerialization(_)));
        assert!(err.to_string().starts_with("body serialization error"));
    }

    #[test]
    fn error_from_url() {
        let url_err = url::Url::parse("not a url").expect_err("invalid url");
        let err = Error::from(url_err);
        assert!(matches!(err, Error::InvalidUrl(_)));
    }
}
