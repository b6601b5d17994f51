//! Request synthesis from method descriptors and annotated objects.
//!
//! A call is turned into two requests: one from the single unannotated
//! argument (if any), one from the annotated parameters. The second is
//! merged over the first, so an explicit parameter always beats the same
//! field of the object.

use indexmap::IndexMap;
use tracing::{debug, trace};

use crate::body::{ACCEPT, CONTENT_TYPE, render_body};
use crate::params::render_param;
use crate::{Arg, MethodDescriptor, Request, RequestFields, Result, Role, SynthesisConfig};

/// Values collected per role, before they become a [`Request`].
#[derive(Debug, Default)]
struct Classified {
    path: IndexMap<String, String>,
    query: IndexMap<String, String>,
    header: IndexMap<String, String>,
    body: Option<serde_json::Value>,
}

impl Classified {
    /// Store a rendered value; null values are dropped.
    fn insert(&mut self, role: Role, name: &str, value: Option<String>) {
        let Some(value) = value else {
            trace!(%role, name, "dropping null parameter");
            return;
        };
        match role {
            Role::Path => {
                self.path.insert(name.to_string(), value);
            }
            Role::Query => {
                self.query.insert(name.to_string(), value);
            }
            Role::Header => {
                self.header.insert(name.to_ascii_lowercase(), value);
            }
            Role::Body => {}
        }
    }

    fn into_request(mut self, config: &SynthesisConfig) -> Result<crate::RequestBuilder> {
        let body = self
            .body
            .as_ref()
            .map(|body| render_body(body, config.pretty_json))
            .transpose()?;
        if body.is_some() {
            self.header
                .entry(CONTENT_TYPE.to_string())
                .or_insert_with(|| config.content_type.clone());
        }

        let mut builder = Request::builder()
            .path_params(self.path)
            .query_params(self.query)
            .header_params(self.header);
        if let Some(body) = body {
            builder = builder.body(body);
        }
        Ok(builder)
    }
}

fn classify_object(object: &dyn RequestFields) -> Result<Classified> {
    let mut classified = Classified::default();
    let mut has_body = false;

    for field in object.fields()? {
        if field.role == Role::Body {
            has_body = true;
        } else {
            classified.insert(field.role, &field.name, field.value);
        }
    }
    if has_body {
        classified.body = object.body()?;
    }

    Ok(classified)
}

/// Append `media_type` to an `accept` value, keeping existing types first
/// and dropping duplicates.
fn merge_accept(existing: Option<&str>, media_type: &str) -> String {
    let mut types: Vec<&str> = Vec::new();
    let candidates = existing
        .into_iter()
        .flat_map(|value| value.split(','))
        .chain(std::iter::once(media_type))
        .map(str::trim);
    for candidate in candidates {
        if !candidate.is_empty() && !types.contains(&candidate) {
            types.push(candidate);
        }
    }
    types.join(", ")
}

impl Request {
    /// Build a request from an annotated object, with default configuration.
    ///
    /// # Errors
    ///
    /// See [`Request::from_object_with`].
    pub fn from_object(template: Option<&str>, object: &dyn RequestFields) -> Result<Self> {
        Self::from_object_with(template, object, &SynthesisConfig::default())
    }

    /// Build a request from an annotated object.
    ///
    /// Every non-null path, query and header field becomes a parameter.
    /// The object is serialized as body only when one of its fields has the
    /// body role.
    ///
    /// # Errors
    ///
    /// Returns [`Error::FieldAccess`](crate::Error::FieldAccess) if a field
    /// cannot be read, or [`Error::BodySerialization`](crate::Error::BodySerialization)
    /// if the body cannot be serialized.
    pub fn from_object_with(
        template: Option<&str>,
        object: &dyn RequestFields,
        config: &SynthesisConfig,
    ) -> Result<Self> {
        let classified = classify_object(object)?;
        debug!(
            object = object.type_name(),
            path = classified.path.len(),
            query = classified.query.len(),
            header = classified.header.len(),
            body = classified.body.is_some(),
            "classified object fields"
        );

        let mut builder = classified.into_request(config)?;
        if let Some(template) = template {
            builder = builder.path(template);
        }
        Ok(builder.build())
    }

    /// Build a request from a method call, with default configuration.
    ///
    /// # Errors
    ///
    /// See [`Request::from_call_with`].
    pub fn from_call(descriptor: &MethodDescriptor, args: Vec<Arg<'_>>) -> Result<Self> {
        Self::from_call_with(descriptor, args, &SynthesisConfig::default())
    }

    /// Build a request from a method call.
    ///
    /// `args` are matched positionally with the descriptor parameters.
    /// Annotated parameters fill their maps (or the body), the single
    /// unannotated argument is introspected with
    /// [`Request::from_object_with`] and the parameters are merged over it,
    /// so a `#[body]` parameter replaces the body of the object.
    /// Methods with a result get the configured media type in `accept`.
    ///
    /// # Errors
    ///
    /// - [`Error::InvalidMethodSignature`](crate::Error::InvalidMethodSignature)
    ///   if the arguments do not match the descriptor, or the method has no
    ///   single HTTP-method marker.
    /// - [`Error::AmbiguousBody`](crate::Error::AmbiguousBody) if more than
    ///   one parameter is unannotated.
    /// - Any error of [`Request::from_object_with`] or of the value conversions.
    pub fn from_call_with(
        descriptor: &MethodDescriptor,
        args: Vec<Arg<'_>>,
        config: &SynthesisConfig,
    ) -> Result<Self> {
        let name = descriptor.name;
        if args.len() != descriptor.params.len() {
            return Err(crate::Error::invalid_method_signature(
                name,
                format!(
                    "expected {} arguments, got {}",
                    descriptor.params.len(),
                    args.len()
                ),
            ));
        }

        let body_candidates = descriptor
            .params
            .iter()
            .filter(|param| param.role.is_none())
            .count();
        if body_candidates > 1 {
            return Err(crate::Error::ambiguous_body(name, body_candidates));
        }

        let mut params = Classified::default();
        let mut object_request = Self::default();

        for (param, arg) in descriptor.params.iter().zip(args) {
            match (param.role, arg) {
                (None, Arg::Object(object)) => {
                    object_request = Self::from_object_with(None, object, config)?;
                }
                (None, Arg::Value(_)) => {
                    return Err(crate::Error::invalid_method_signature(
                        name,
                        format!(
                            "parameter `{}` has no annotation and does not describe its fields",
                            param.name
                        ),
                    ));
                }
                (Some(role), Arg::Object(object)) => {
                    return Err(crate::Error::invalid_method_signature(
                        name,
                        format!(
                            "{role} parameter `{}` was given an object of type `{}`",
                            param.name,
                            object.type_name()
                        ),
                    ));
                }
                (Some(Role::Body), Arg::Value(value)) => {
                    let value = value?;
                    if !value.is_null() {
                        params.body = Some(value);
                    }
                }
                (Some(role), Arg::Value(value)) => {
                    let value = render_param(param.name, value)?;
                    params.insert(role, param.name, value);
                }
            }
        }

        let method = descriptor.http_method()?;

        if descriptor.returns_value() {
            let existing = params
                .header
                .get(ACCEPT)
                .map(String::as_str)
                .or_else(|| object_request.header(ACCEPT));
            let accept = merge_accept(existing, &config.default_accept);
            params.header.insert(ACCEPT.to_string(), accept);
        }

        let mut params_request = params.into_request(config)?.method(method);
        if let Some(path) = descriptor.path {
            params_request = params_request.path(path);
        }
        if let Some(response_type) = descriptor.response {
            params_request = params_request.response_type(response_type);
        }

        let request = object_request.merge(&params_request.build());
        debug!(
            method = name,
            http_method = %method,
            path = request.path(),
            has_body = request.has_body(),
            "synthesized request from call"
        );
        Ok(request)
    }
}

#[cfg(test)]
mod tests {
    use assert2::{check, let_assert};
    use serde::Serialize;

    use super::*;
    use crate::{Field, Method, ParamDescriptor, ResponseType};

    #[derive(Serialize)]
    struct Orange {
        #[serde(skip)]
        owner: String,
        #[serde(skip)]
        state: Option<String>,
        #[serde(skip)]
        link: String,
        draft: bool,
    }

    impl RequestFields for Orange {
        fn fields(&self) -> Result<Vec<Field>> {
            Ok(vec![
                Field::from_serialize(Role::Path, "owner", &self.owner)?,
                Field::from_serialize(Role::Query, "state", &self.state)?,
                Field::from_serialize(Role::Header, "Link", &self.link)?,
                Field::body("draft"),
            ])
        }

        fn body(&self) -> Result<Option<serde_json::Value>> {
            Ok(Some(serde_json::to_value(self)?))
        }
    }

    struct Filter {
        sort: &'static str,
    }

    impl RequestFields for Filter {
        fn fields(&self) -> Result<Vec<Field>> {
            Ok(vec![Field::new(Role::Query, "sort", Some(self.sort.to_string()))])
        }
    }

    fn orange() -> Orange {
        Orange {
            owner: "apache".to_string(),
            state: Some("closed".to_string()),
            link: "http://bar.example.com/".to_string(),
            draft: true,
        }
    }

    #[test]
    fn object_fields_are_classified() {
        let request = Request::from_object(Some("/repos/{owner}/pulls"), &orange()).expect("object");

        check!(request.path() == Some("/repos/{owner}/pulls"));
        check!(request.path_param("owner") == Some("apache"));
        check!(request.query("state") == Some("closed"));
        check!(request.header("link") == Some("http://bar.example.com/"));
        check!(request.body() == Some(r#"{"draft":true}"#));
        check!(request.header("content-type") == Some("application/json"));
        check!(request.method().is_none());
    }

    #[test]
    fn object_null_fields_are_dropped() {
        let object = Orange {
            state: None,
            ..orange()
        };
        let request = Request::from_object(None, &object).expect("object");
        check!(request.query("state").is_none());
        check!(request.query_params().is_empty());
    }

    #[test]
    fn object_without_body_field_has_no_body() {
        let request = Request::from_object(None, &Filter { sort: "popularity" }).expect("object");
        check!(!request.has_body());
        check!(request.header("content-type").is_none());
        check!(request.query("sort") == Some("popularity"));
    }

    #[test]
    fn object_body_uses_config() {
        let config = SynthesisConfig::builder()
            .content_type("application/vnd.orange+json")
            .pretty_json(true)
            .build();
        let request = Request::from_object_with(None, &orange(), &config).expect("object");
        check!(request.body() == Some("{\n  \"draft\": true\n}"));
        check!(request.header("content-type") == Some("application/vnd.orange+json"));
    }

    static PULLS: MethodDescriptor = MethodDescriptor {
        name: "pulls",
        markers: &[Method::Get],
        path: Some("/repos/{owner}/{repo}/pulls"),
        params: &[
            ParamDescriptor::path("repo"),
            ParamDescriptor::query("state"),
            ParamDescriptor::inferred("orange"),
        ],
        response: Some(ResponseType::new("Pulls")),
    };

    #[test]
    fn call_merges_params_over_object() {
        let object = orange();
        let request = Request::from_call(
            &PULLS,
            vec![Arg::value("red"), Arg::value("open"), Arg::object(&object)],
        )
        .expect("call");

        check!(request.method() == Some(Method::Get));
        check!(request.path() == Some("/repos/{owner}/{repo}/pulls"));
        check!(request.path_param("owner") == Some("apache"));
        check!(request.path_param("repo") == Some("red"));
        check!(request.query("state") == Some("open"));
        check!(request.body() == Some(r#"{"draft":true}"#));
        check!(request.header("accept") == Some("application/json"));
        check!(request.response_type() == Some(ResponseType::new("Pulls")));
    }

    #[test]
    fn call_null_param_keeps_object_value() {
        let object = orange();
        let state: Option<&str> = None;
        let request = Request::from_call(
            &PULLS,
            vec![Arg::value("red"), Arg::value(&state), Arg::object(&object)],
        )
        .expect("call");
        check!(request.query("state") == Some("closed"));
    }

    #[test]
    fn call_argument_count_mismatch() {
        let err = Request::from_call(&PULLS, vec![Arg::value("red")]).expect_err("count");
        let_assert!(crate::Error::InvalidMethodSignature { method, message } = err);
        check!(method == "pulls");
        check!(message == "expected 3 arguments, got 1");
    }

    #[test]
    fn call_with_two_objects_is_ambiguous() {
        static TWO: MethodDescriptor = MethodDescriptor {
            name: "two",
            markers: &[Method::Post],
            path: None,
            params: &[ParamDescriptor::inferred("a"), ParamDescriptor::inferred("b")],
            response: None,
        };
        let filter = Filter { sort: "a" };
        let err = Request::from_call(&TWO, vec![Arg::object(&filter), Arg::object(&filter)])
            .expect_err("ambiguous");
        let_assert!(crate::Error::AmbiguousBody { count, .. } = err);
        check!(count == 2);
    }

    static MIXED: MethodDescriptor = MethodDescriptor {
        name: "mixed",
        markers: &[Method::Post],
        path: None,
        params: &[ParamDescriptor::body("payload"), ParamDescriptor::inferred("object")],
        response: None,
    };

    #[test]
    fn call_with_object_and_explicit_body() {
        let filter = Filter { sort: "a" };
        let request = Request::from_call(&MIXED, vec![Arg::value(&[1]), Arg::object(&filter)])
            .expect("call");

        check!(request.body() == Some("[1]"));
        check!(request.query("sort") == Some("a"));
        check!(request.header("content-type") == Some("application/json"));
    }

    #[test]
    fn explicit_body_replaces_object_body() {
        let object = orange();
        let request = Request::from_call(&MIXED, vec![Arg::value("payload"), Arg::object(&object)])
            .expect("call");

        check!(request.body() == Some(r#""payload""#));
        check!(request.path_param("owner") == Some("apache"));
        check!(request.query("state") == Some("closed"));
    }

    #[test]
    fn null_explicit_body_keeps_object_body() {
        let object = orange();
        let payload: Option<u8> = None;
        let request = Request::from_call(&MIXED, vec![Arg::value(&payload), Arg::object(&object)])
            .expect("call");

        check!(request.body() == Some(r#"{"draft":true}"#));
    }

    /// A map with non-string keys cannot become JSON.
    fn unserializable() -> std::collections::BTreeMap<(u8, u8), u8> {
        std::collections::BTreeMap::from([((1, 2), 3)])
    }

    struct Broken;

    impl RequestFields for Broken {
        fn fields(&self) -> Result<Vec<Field>> {
            Ok(vec![Field::from_serialize(Role::Query, "grid", &unserializable())?])
        }
    }

    #[test]
    fn call_body_serialization_failure() {
        static CREATE: MethodDescriptor = MethodDescriptor {
            name: "create",
            markers: &[Method::Post],
            path: Some("/items"),
            params: &[ParamDescriptor::body("item")],
            response: None,
        };
        let err = Request::from_call(&CREATE, vec![Arg::value(&unserializable())])
            .expect_err("body");
        let_assert!(crate::Error::BodySerialization(_) = err);
    }

    #[test]
    fn call_param_serialization_failure() {
        let object = orange();
        let err = Request::from_call(
            &PULLS,
            vec![Arg::value("red"), Arg::value(&unserializable()), Arg::object(&object)],
        )
        .expect_err("param");
        let_assert!(crate::Error::ParamSerialization { name, .. } = err);
        check!(name == "state");
    }

    #[test]
    fn object_field_serialization_failure() {
        let err = Request::from_object(None, &Broken).expect_err("field");
        let_assert!(crate::Error::ParamSerialization { name, .. } = err);
        check!(name == "grid");
    }

    #[test]
    fn call_object_field_serialization_failure() {
        static FIND: MethodDescriptor = MethodDescriptor {
            name: "find",
            markers: &[Method::Get],
            path: Some("/items"),
            params: &[ParamDescriptor::inferred("filter")],
            response: None,
        };
        let err = Request::from_call(&FIND, vec![Arg::object(&Broken)]).expect_err("field");
        let_assert!(crate::Error::ParamSerialization { .. } = err);
    }

    #[test]
    fn call_explicit_body() {
        static CREATE: MethodDescriptor = MethodDescriptor {
            name: "create",
            markers: &[Method::Post],
            path: Some("/items"),
            params: &[ParamDescriptor::body("item")],
            response: None,
        };
        let request =
            Request::from_call(&CREATE, vec![Arg::value(&vec!["a", "b"])]).expect("call");
        check!(request.body() == Some(r#"["a","b"]"#));
        check!(request.header("content-type") == Some("application/json"));
        check!(request.header("accept").is_none());
    }

    #[test]
    fn call_without_marker() {
        static BARE: MethodDescriptor = MethodDescriptor {
            name: "bare",
            markers: &[],
            path: None,
            params: &[],
            response: None,
        };
        let err = Request::from_call(&BARE, vec![]).expect_err("no marker");
        check!(err.is_signature_error());
    }

    #[test]
    fn call_value_for_unannotated_param() {
        static LOOSE: MethodDescriptor = MethodDescriptor {
            name: "loose",
            markers: &[Method::Get],
            path: None,
            params: &[ParamDescriptor::inferred("x")],
            response: None,
        };
        let err = Request::from_call(&LOOSE, vec![Arg::value(&1)]).expect_err("not an object");
        let_assert!(crate::Error::InvalidMethodSignature { .. } = err);
    }

    #[test]
    fn call_accept_keeps_existing_types() {
        static LIST: MethodDescriptor = MethodDescriptor {
            name: "list",
            markers: &[Method::Get],
            path: Some("/items"),
            params: &[ParamDescriptor::header("Accept")],
            response: Some(ResponseType::new("Items")),
        };
        let request =
            Request::from_call(&LIST, vec![Arg::value("text/plain , application/json")])
                .expect("call");
        check!(request.header("accept") == Some("text/plain, application/json"));
    }

    #[test]
    fn merge_accept_values() {
        check!(merge_accept(None, "application/json") == "application/json");
        check!(merge_accept(Some("text/plain"), "application/json") == "text/plain, application/json");
        check!(
            merge_accept(Some("application/json,text/plain"), "application/json")
                == "application/json, text/plain"
        );
        check!(merge_accept(Some(" , "), "application/json") == "application/json");
    }
}
