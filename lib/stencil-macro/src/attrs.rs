//! Attribute parsing for stencil proc-macros.

use syn::{Attribute, Ident, LitStr};

/// HTTP method marker on a trait method.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum HttpMethod {
    Get,
    Post,
    Put,
    Delete,
    Patch,
    Head,
    Options,
}

impl HttpMethod {
    const ALL: [Self; 7] = [
        Self::Get,
        Self::Post,
        Self::Put,
        Self::Delete,
        Self::Patch,
        Self::Head,
        Self::Options,
    ];

    /// Variant name of `stencil::Method`, for code generation.
    #[must_use]
    pub(crate) const fn as_str(self) -> &'static str {
        match self {
            Self::Get => "Get",
            Self::Post => "Post",
            Self::Put => "Put",
            Self::Delete => "Delete",
            Self::Patch => "Patch",
            Self::Head => "Head",
            Self::Options => "Options",
        }
    }

    /// Attribute name of the marker.
    #[must_use]
    pub(crate) const fn attr_name(self) -> &'static str {
        match self {
            Self::Get => "get",
            Self::Post => "post",
            Self::Put => "put",
            Self::Delete => "delete",
            Self::Patch => "patch",
            Self::Head => "head",
            Self::Options => "options",
        }
    }

    /// The marker carried by `attr`, if any.
    pub(crate) fn from_attr(attr: &Attribute) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|method| attr.path().is_ident(method.attr_name()))
    }
}

/// HTTP method markers and path template of a trait method.
#[derive(Debug)]
pub(crate) struct MethodAttrs {
    /// The HTTP method.
    pub(crate) method: HttpMethod,
    /// The path template (e.g., "/users/{id}").
    pub(crate) path: Option<String>,
}

/// Parse the HTTP method marker of a trait method.
///
/// Exactly one marker is expected; its optional string argument is the path
/// template.
pub(crate) fn parse_method_attrs(
    method_name: &Ident,
    attrs: &[Attribute],
) -> syn::Result<MethodAttrs> {
    let mut found: Option<(HttpMethod, &Attribute)> = None;

    for attr in attrs {
        let Some(method) = HttpMethod::from_attr(attr) else {
            continue;
        };
        if let Some((first, _)) = found {
            return Err(syn::Error::new_spanned(
                attr,
                format!(
                    "method `{method_name}` must carry exactly one HTTP method marker, found #[{}] and #[{}]",
                    first.attr_name(),
                    method.attr_name()
                ),
            ));
        }
        found = Some((method, attr));
    }

    let Some((method, attr)) = found else {
        return Err(syn::Error::new_spanned(
            method_name,
            format!(
                "method `{method_name}` must be marked with one of #[get], #[post], #[put], #[delete], #[patch], #[head] or #[options]"
            ),
        ));
    };

    Ok(MethodAttrs {
        method,
        path: parse_optional_string_arg(attr)?,
    })
}

/// Role of a trait method parameter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum ParamKind {
    /// `#[path]` or `#[path("name")]`
    Path(Option<String>),
    /// `#[query]` or `#[query("name")]`
    Query(Option<String>),
    /// `#[header]` or `#[header("name")]`
    Header(Option<String>),
    /// `#[body]`
    Body,
}

/// Parameter attribute names, stripped from the generated signatures.
pub(crate) const PARAM_ATTRS: &[&str] = &["path", "query", "header", "body"];

/// Returns `true` if `attr` is a parameter role attribute.
pub(crate) fn is_param_attr(attr: &Attribute) -> bool {
    PARAM_ATTRS.iter().any(|name| attr.path().is_ident(name))
}

/// Parse a parameter attribute and return its kind.
pub(crate) fn parse_param_attr(attr: &Attribute) -> syn::Result<Option<ParamKind>> {
    let path = attr.path();

    let kind = if path.is_ident("path") {
        ParamKind::Path(parse_optional_string_arg(attr)?)
    } else if path.is_ident("query") {
        ParamKind::Query(parse_optional_string_arg(attr)?)
    } else if path.is_ident("header") {
        ParamKind::Header(parse_optional_string_arg(attr)?)
    } else if path.is_ident("body") {
        if !matches!(attr.meta, syn::Meta::Path(_)) {
            return Err(syn::Error::new_spanned(attr, "#[body] takes no argument"));
        }
        ParamKind::Body
    } else {
        return Ok(None);
    };

    Ok(Some(kind))
}

/// A parsed trait method parameter.
#[derive(Debug)]
pub(crate) struct MethodParam {
    /// Parameter name from the function signature.
    pub(crate) name: Ident,
    /// Role, `None` for an inferred-body object.
    pub(crate) kind: Option<ParamKind>,
}

impl MethodParam {
    /// Wire name: the attribute argument, or the parameter name.
    pub(crate) fn wire_name(&self) -> String {
        let alias = match &self.kind {
            Some(ParamKind::Path(alias) | ParamKind::Query(alias) | ParamKind::Header(alias)) => {
                alias.clone()
            }
            Some(ParamKind::Body) | None => None,
        };
        alias.unwrap_or_else(|| self.name.to_string())
    }
}

/// Parse an optional string argument: `#[attr]` or `#[attr("value")]`.
fn parse_optional_string_arg(attr: &Attribute) -> syn::Result<Option<String>> {
    match &attr.meta {
        syn::Meta::Path(_) => Ok(None),
        syn::Meta::List(meta_list) => {
            let str_lit: LitStr = syn::parse2(meta_list.tokens.clone())?;
            Ok(Some(str_lit.value()))
        }
        syn::Meta::NameValue(_) => Err(syn::Error::new_spanned(
            attr,
            "expected `#[name]` or `#[name(\"value\")]`",
        )),
    }
}

#[cfg(test)]
mod tests {
    use quote::format_ident;
    use syn::parse_quote;

    use super::*;

    #[test]
    fn http_method_as_str() {
        assert_eq!(HttpMethod::Get.as_str(), "Get");
        assert_eq!(HttpMethod::Post.as_str(), "Post");
        assert_eq!(HttpMethod::Options.attr_name(), "options");
    }

    #[test]
    fn method_attrs_with_path() {
        let attrs: Vec<Attribute> = vec![
            parse_quote!(#[doc = "List pulls"]),
            parse_quote!(#[get("/repos/{owner}/{repo}/pulls")]),
        ];
        let parsed = parse_method_attrs(&format_ident!("pulls"), &attrs).expect("parse");
        assert_eq!(parsed.method, HttpMethod::Get);
        assert_eq!(parsed.path.as_deref(), Some("/repos/{owner}/{repo}/pulls"));
    }

    #[test]
    fn method_attrs_without_path() {
        let attrs: Vec<Attribute> = vec![parse_quote!(#[options])];
        let parsed = parse_method_attrs(&format_ident!("lookup"), &attrs).expect("parse");
        assert_eq!(parsed.method, HttpMethod::Options);
        assert!(parsed.path.is_none());
    }

    #[test]
    fn method_attrs_missing_marker() {
        let attrs: Vec<Attribute> = vec![parse_quote!(#[doc = "nothing"])];
        let err = parse_method_attrs(&format_ident!("bare"), &attrs).expect_err("no marker");
        assert!(err.to_string().contains("must be marked"));
    }

    #[test]
    fn method_attrs_several_markers() {
        let attrs: Vec<Attribute> = vec![parse_quote!(#[get("/a")]), parse_quote!(#[post("/a")])];
        let err = parse_method_attrs(&format_ident!("both"), &attrs).expect_err("two markers");
        assert!(err.to_string().contains("#[get] and #[post]"));
    }

    #[test]
    fn param_attr_kinds() {
        let attr: Attribute = parse_quote!(#[path("owner")]);
        assert_eq!(
            parse_param_attr(&attr).expect("path"),
            Some(ParamKind::Path(Some("owner".to_string())))
        );

        let attr: Attribute = parse_quote!(#[query]);
        assert_eq!(parse_param_attr(&attr).expect("query"), Some(ParamKind::Query(None)));

        let attr: Attribute = parse_quote!(#[body]);
        assert_eq!(parse_param_attr(&attr).expect("body"), Some(ParamKind::Body));

        let attr: Attribute = parse_quote!(#[allow(unused)]);
        assert_eq!(parse_param_attr(&attr).expect("other"), None);
    }

    #[test]
    fn param_attr_invalid() {
        let attr: Attribute = parse_quote!(#[body("payload")]);
        assert!(parse_param_attr(&attr).is_err());

        let attr: Attribute = parse_quote!(#[header = "Link"]);
        assert!(parse_param_attr(&attr).is_err());
    }

    #[test]
    fn wire_name_defaults_to_param_name() {
        let param = MethodParam {
            name: format_ident!("state"),
            kind: Some(ParamKind::Query(None)),
        };
        assert_eq!(param.wire_name(), "state");

        let param = MethodParam {
            name: format_ident!("link"),
            kind: Some(ParamKind::Header(Some("Link".to_string()))),
        };
        assert_eq!(param.wire_name(), "Link");
    }
}
