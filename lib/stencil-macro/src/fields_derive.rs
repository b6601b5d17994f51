//! `RequestFields` derive macro implementation.

use proc_macro2::TokenStream;
use quote::quote;
use syn::{DeriveInput, Fields, LitStr, parse2};

/// Struct-level options parsed from `#[param(...)]` attributes.
#[derive(Debug, Clone, Default)]
struct StructOptions {
    /// Rename all fields using the given case convention.
    rename_all: Option<RenameRule>,
}

/// Case conversion rules for `rename_all`.
#[derive(Debug, Clone, Copy)]
#[allow(clippy::enum_variant_names)]
enum RenameRule {
    /// `lowercase`
    LowerCase,
    /// `UPPERCASE`
    UpperCase,
    /// `camelCase`
    CamelCase,
    /// `PascalCase`
    PascalCase,
    /// `snake_case`
    SnakeCase,
    /// `SCREAMING_SNAKE_CASE`
    ScreamingSnakeCase,
    /// `kebab-case`
    KebabCase,
    /// `Train-Case`, the usual header spelling
    TrainCase,
}

impl RenameRule {
    fn parse(s: &str) -> Option<Self> {
        match s {
            "lowercase" => Some(Self::LowerCase),
            "UPPERCASE" => Some(Self::UpperCase),
            "camelCase" => Some(Self::CamelCase),
            "PascalCase" => Some(Self::PascalCase),
            "snake_case" => Some(Self::SnakeCase),
            "SCREAMING_SNAKE_CASE" => Some(Self::ScreamingSnakeCase),
            "kebab-case" => Some(Self::KebabCase),
            "Train-Case" => Some(Self::TrainCase),
            _ => None,
        }
    }

    /// Apply the rename rule to a `snake_case` field name.
    fn apply(self, name: &str) -> String {
        match self {
            Self::LowerCase => name.replace('_', "").to_lowercase(),
            Self::UpperCase => name.replace('_', "").to_uppercase(),
            Self::CamelCase => to_camel_case(name),
            Self::PascalCase => to_pascal_case(name),
            Self::SnakeCase => name.to_string(),
            Self::ScreamingSnakeCase => name.to_uppercase(),
            Self::KebabCase => name.replace('_', "-"),
            Self::TrainCase => name
                .split('_')
                .map(capitalize)
                .collect::<Vec<_>>()
                .join("-"),
        }
    }
}

fn capitalize(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// Convert a `snake_case` name to `camelCase`.
fn to_camel_case(s: &str) -> String {
    let mut result = String::new();
    let mut capitalize_next = false;
    for c in s.chars() {
        if c == '_' {
            capitalize_next = true;
        } else if capitalize_next {
            result.extend(c.to_uppercase());
            capitalize_next = false;
        } else {
            result.push(c);
        }
    }
    result
}

/// Convert a `snake_case` name to `PascalCase`.
fn to_pascal_case(s: &str) -> String {
    capitalize(&to_camel_case(s))
}

/// Role of a field, parsed from `#[param(...)]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum FieldRole {
    Path,
    Query,
    Header,
    Body,
}

impl FieldRole {
    fn from_path(path: &syn::Path) -> Option<Self> {
        if path.is_ident("path") {
            Some(Self::Path)
        } else if path.is_ident("query") {
            Some(Self::Query)
        } else if path.is_ident("header") {
            Some(Self::Header)
        } else if path.is_ident("body") {
            Some(Self::Body)
        } else {
            None
        }
    }

    fn tokens(self) -> TokenStream {
        match self {
            Self::Path => quote! { ::stencil::Role::Path },
            Self::Query => quote! { ::stencil::Role::Query },
            Self::Header => quote! { ::stencil::Role::Header },
            Self::Body => quote! { ::stencil::Role::Body },
        }
    }
}

/// Field options parsed from `#[param(...)]` attributes.
#[derive(Debug, Clone, Default)]
struct FieldOptions {
    /// Role of the field, `None` when the field is not a request field.
    role: Option<FieldRole>,
    /// Explicit wire name.
    rename: Option<String>,
}

/// Expand the `#[derive(RequestFields)]` macro.
pub fn expand_fields_derive(input: TokenStream) -> syn::Result<TokenStream> {
    let input: DeriveInput = parse2(input)?;
    let name = &input.ident;
    let type_name = name.to_string();
    let (impl_generics, ty_generics, where_clause) = input.generics.split_for_impl();

    let struct_options = parse_struct_options(&input.attrs)?;

    // Only support structs with named fields
    let fields = match &input.data {
        syn::Data::Struct(data) => match &data.fields {
            Fields::Named(fields) => &fields.named,
            _ => {
                return Err(syn::Error::new_spanned(
                    &input,
                    "RequestFields derive only supports structs with named fields",
                ));
            }
        },
        _ => {
            return Err(syn::Error::new_spanned(
                &input,
                "RequestFields derive only supports structs",
            ));
        }
    };

    let mut field_entries = Vec::new();
    let mut body_entries = Vec::new();

    for field in fields {
        let Some(field_name) = field.ident.as_ref() else {
            continue;
        };
        let options = parse_field_options(&field.attrs)?;
        let Some(role) = options.role else {
            continue;
        };

        // Explicit name > rename_all > field name
        let key = if let Some(rename) = options.rename {
            rename
        } else {
            let raw = field_name.to_string();
            let raw = raw.strip_prefix("r#").unwrap_or(&raw);
            struct_options
                .rename_all
                .map_or_else(|| raw.to_string(), |rule| rule.apply(raw))
        };

        if role == FieldRole::Body {
            field_entries.push(quote! { ::stencil::Field::body(#key) });
            body_entries.push(quote! {
                body.insert(
                    ::std::string::String::from(#key),
                    ::stencil::serde_json::to_value(&self.#field_name)?,
                );
            });
        } else {
            let role = role.tokens();
            field_entries.push(quote! {
                ::stencil::Field::from_serialize(#role, #key, &self.#field_name)?
            });
        }
    }

    let body_fn = if body_entries.is_empty() {
        quote! {}
    } else {
        quote! {
            fn body(&self) -> ::stencil::Result<::std::option::Option<::stencil::serde_json::Value>> {
                let mut body = ::stencil::serde_json::Map::new();
                #(#body_entries)*
                ::std::result::Result::Ok(::std::option::Option::Some(
                    ::stencil::serde_json::Value::Object(body),
                ))
            }
        }
    };

    Ok(quote! {
        impl #impl_generics ::stencil::RequestFields for #name #ty_generics #where_clause {
            fn type_name(&self) -> &'static str {
                #type_name
            }

            fn fields(&self) -> ::stencil::Result<::std::vec::Vec<::stencil::Field>> {
                ::std::result::Result::Ok(::std::vec![#(#field_entries),*])
            }

            #body_fn
        }
    })
}

/// Parse struct-level options from `#[param(...)]` attributes.
fn parse_struct_options(attrs: &[syn::Attribute]) -> syn::Result<StructOptions> {
    let mut options = StructOptions::default();

    for attr in attrs {
        if !attr.path().is_ident("param") {
            continue;
        }

        attr.parse_nested_meta(|meta| {
            if meta.path.is_ident("rename_all") {
                let value: LitStr = meta.value()?.parse()?;
                let rule = RenameRule::parse(&value.value()).ok_or_else(|| {
                    syn::Error::new_spanned(
                        &value,
                        format!(
                            "unknown rename_all value: \"{}\". Expected one of: \
                             lowercase, UPPERCASE, camelCase, PascalCase, \
                             snake_case, SCREAMING_SNAKE_CASE, kebab-case, Train-Case",
                            value.value()
                        ),
                    )
                })?;
                options.rename_all = Some(rule);
                Ok(())
            } else {
                Err(meta.error("unsupported struct-level param attribute"))
            }
        })?;
    }

    Ok(options)
}

/// Parse field options from `#[param(...)]` attributes.
///
/// Accepted forms: `#[param(path)]`, `#[param(query = "name")]`,
/// `#[param(header = "Link")]`, `#[param(body)]`.
fn parse_field_options(attrs: &[syn::Attribute]) -> syn::Result<FieldOptions> {
    let mut options = FieldOptions::default();

    for attr in attrs {
        if !attr.path().is_ident("param") {
            continue;
        }

        attr.parse_nested_meta(|meta| {
            let Some(role) = FieldRole::from_path(&meta.path) else {
                return Err(meta.error("expected one of `path`, `query`, `header` or `body`"));
            };
            if options.role.is_some() {
                return Err(meta.error("a field can carry only one role"));
            }
            options.role = Some(role);
            if meta.input.peek(syn::Token![=]) {
                let value: LitStr = meta.value()?.parse()?;
                options.rename = Some(value.value());
            }
            Ok(())
        })?;
    }

    Ok(options)
}
