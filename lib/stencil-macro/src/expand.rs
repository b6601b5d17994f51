//! Macro expansion logic for `#[stencil]`.

use proc_macro2::TokenStream;
use quote::{format_ident, quote};
use syn::{FnArg, ItemTrait, Pat, ReturnType, TraitItem, TraitItemFn, Type, parse2};

use crate::attrs::{
    MethodAttrs, MethodParam, ParamKind, is_param_attr, parse_method_attrs, parse_param_attr,
};

/// Information about a parsed trait method.
struct TraitMethodInfo {
    /// The method signature, as declared.
    sig: syn::Signature,
    /// HTTP method marker and path template.
    attrs: MethodAttrs,
    /// Parsed parameters, in declaration order.
    params: Vec<MethodParam>,
    /// Declared result type, `None` for `()`.
    response: Option<Type>,
    /// Documentation and lint attributes.
    docs: Vec<syn::Attribute>,
}

/// Expand the `#[stencil]` attribute on a trait.
///
/// Emits the trait with every method returning
/// `stencil::Result<stencil::Request>`, and an implementation for every
/// `stencil::Synthesis` type.
pub fn expand_stencil_trait(attr: TokenStream, item: TokenStream) -> syn::Result<TokenStream> {
    if !attr.is_empty() {
        return Err(syn::Error::new_spanned(attr, "#[stencil] takes no arguments"));
    }
    let trait_def: ItemTrait = parse2(item)?;

    if !trait_def.generics.params.is_empty() || trait_def.generics.where_clause.is_some() {
        return Err(syn::Error::new_spanned(
            &trait_def.generics,
            "#[stencil] traits cannot be generic",
        ));
    }
    if !trait_def.supertraits.is_empty() {
        return Err(syn::Error::new_spanned(
            &trait_def.supertraits,
            "#[stencil] traits cannot have supertraits",
        ));
    }

    let methods = extract_trait_methods(&trait_def)?;
    let clean_trait = generate_clean_trait(&trait_def, &methods);
    let synthesis_impl = generate_synthesis_impl(&trait_def.ident, &methods);

    Ok(quote! {
        #clean_trait
        #synthesis_impl
    })
}

/// Compile error for an HTTP method marker outside a `#[stencil]` trait.
pub fn misplaced_marker(marker: &str, item: TokenStream) -> TokenStream {
    let message = format!("#[{marker}] must be used on a method of a #[stencil] trait");
    let error = syn::Error::new_spanned(&item, message).to_compile_error();
    quote! {
        #error
        #item
    }
}

/// Extract methods from a trait definition.
fn extract_trait_methods(trait_def: &ItemTrait) -> syn::Result<Vec<TraitMethodInfo>> {
    let mut methods = Vec::new();

    for item in &trait_def.items {
        let TraitItem::Fn(method) = item else {
            return Err(syn::Error::new_spanned(
                item,
                "#[stencil] traits may only contain methods",
            ));
        };
        check_signature(method)?;

        let attrs = parse_method_attrs(&method.sig.ident, &method.attrs)?;
        let params = parse_trait_method_params(method)?;
        let response = response_type(&method.sig.output)?;
        let docs = method
            .attrs
            .iter()
            .filter(|a| a.path().is_ident("doc") || a.path().is_ident("allow"))
            .cloned()
            .collect();

        methods.push(TraitMethodInfo {
            sig: method.sig.clone(),
            attrs,
            params,
            response,
            docs,
        });
    }

    Ok(methods)
}

fn check_signature(method: &TraitItemFn) -> syn::Result<()> {
    let sig = &method.sig;
    if let Some(asyncness) = &sig.asyncness {
        return Err(syn::Error::new_spanned(
            asyncness,
            "request synthesis is synchronous, remove `async`",
        ));
    }
    if let Some(body) = &method.default {
        return Err(syn::Error::new_spanned(
            body,
            "#[stencil] methods must not have a body",
        ));
    }
    match sig.receiver() {
        Some(receiver) if receiver.reference.is_some() && receiver.mutability.is_none() => Ok(()),
        Some(receiver) => Err(syn::Error::new_spanned(
            receiver,
            "#[stencil] methods must take `&self`",
        )),
        None => Err(syn::Error::new_spanned(
            sig,
            "#[stencil] methods must take `&self`",
        )),
    }
}

/// Parse method parameters from a trait method.
///
/// A parameter with a role attribute keeps that role; a parameter without
/// one is an inferred-body object. Ambiguous bodies are left to the runtime
/// check, which reports them with the argument count.
fn parse_trait_method_params(method: &TraitItemFn) -> syn::Result<Vec<MethodParam>> {
    let mut params = Vec::new();

    for input in &method.sig.inputs {
        let FnArg::Typed(pat_type) = input else {
            continue;
        };
        let Pat::Ident(pat_ident) = pat_type.pat.as_ref() else {
            return Err(syn::Error::new_spanned(
                &pat_type.pat,
                "#[stencil] parameters must be plain identifiers",
            ));
        };

        let mut kind = None;
        for attr in &pat_type.attrs {
            if let Some(parsed) = parse_param_attr(attr)? {
                if kind.is_some() {
                    return Err(syn::Error::new_spanned(
                        attr,
                        "a parameter can carry only one of #[path], #[query], #[header] or #[body]",
                    ));
                }
                kind = Some(parsed);
            }
        }

        params.push(MethodParam {
            name: pat_ident.ident.clone(),
            kind,
        });
    }

    Ok(params)
}

/// The declared result type; `()` and no type both mean no result.
fn response_type(output: &ReturnType) -> syn::Result<Option<Type>> {
    match output {
        ReturnType::Default => Ok(None),
        ReturnType::Type(_, ty) => match ty.as_ref() {
            Type::Tuple(tuple) if tuple.elems.is_empty() => Ok(None),
            Type::ImplTrait(_) => Err(syn::Error::new_spanned(
                ty,
                "#[stencil] methods must declare a nameable result type",
            )),
            other => Ok(Some(other.clone())),
        },
    }
}

/// Generate the trait with role attributes stripped and the synthesized
/// return type.
fn generate_clean_trait(original: &ItemTrait, methods: &[TraitMethodInfo]) -> TokenStream {
    let vis = &original.vis;
    let name = &original.ident;
    let trait_attrs: Vec<_> = original
        .attrs
        .iter()
        .filter(|a| {
            let path = a.path();
            path.is_ident("doc") || path.is_ident("allow") || path.is_ident("cfg")
        })
        .collect();

    let method_signatures: Vec<_> = methods
        .iter()
        .map(|m| {
            let docs = &m.docs;
            let sig = synthesized_signature(&m.sig, true);
            quote! {
                #(#docs)*
                #sig;
            }
        })
        .collect();

    quote! {
        #(#trait_attrs)*
        #vis trait #name {
            #(#method_signatures)*
        }
    }
}

/// Strip role attributes and replace the output with the request type.
///
/// Trait declarations without a body cannot bind `mut` patterns, so those
/// are dropped too when `declaration` is set.
fn synthesized_signature(sig: &syn::Signature, declaration: bool) -> syn::Signature {
    let mut clean_sig = sig.clone();
    clean_sig.inputs = sig
        .inputs
        .iter()
        .map(|arg| match arg {
            FnArg::Typed(pat_type) => {
                let mut clean = pat_type.clone();
                clean.attrs.retain(|attr| !is_param_attr(attr));
                if declaration && let Pat::Ident(pat_ident) = clean.pat.as_mut() {
                    pat_ident.mutability = None;
                }
                FnArg::Typed(clean)
            }
            FnArg::Receiver(receiver) => FnArg::Receiver(receiver.clone()),
        })
        .collect();
    clean_sig.output = syn::parse_quote!(-> ::stencil::Result<::stencil::Request>);
    clean_sig
}

/// Generate the implementation for every `stencil::Synthesis` type.
fn generate_synthesis_impl(trait_name: &syn::Ident, methods: &[TraitMethodInfo]) -> TokenStream {
    let method_impls: Vec<_> = methods
        .iter()
        .map(|m| {
            let sig = synthesized_signature(&m.sig, false);
            let body = generate_method_body(m);
            quote! {
                #sig {
                    #body
                }
            }
        })
        .collect();

    quote! {
        impl<__StencilS: ::stencil::Synthesis + ?Sized> #trait_name for __StencilS {
            #(#method_impls)*
        }
    }
}

/// Generate the body of a method implementation: a descriptor table and a
/// call to the synthesis engine.
fn generate_method_body(method: &TraitMethodInfo) -> TokenStream {
    let method_name = method.sig.ident.to_string();
    let marker = format_ident!("{}", method.attrs.method.as_str());

    let path = match &method.attrs.path {
        Some(path) => quote! { ::std::option::Option::Some(#path) },
        None => quote! { ::std::option::Option::None },
    };

    let response = match &method.response {
        Some(ty) => quote! {
            ::std::option::Option::Some(::stencil::ResponseType::of::<#ty>())
        },
        None => quote! { ::std::option::Option::None },
    };

    let descriptors: Vec<_> = method.params.iter().map(param_descriptor).collect();
    let args: Vec<_> = method
        .params
        .iter()
        .map(|param| {
            let name = &param.name;
            if param.kind.is_some() {
                quote! { ::stencil::Arg::value(&#name) }
            } else {
                quote! { ::stencil::Arg::object(&#name) }
            }
        })
        .collect();

    quote! {
        const MARKERS: &[::stencil::Method] = &[::stencil::Method::#marker];
        const PARAMS: &[::stencil::ParamDescriptor] = &[#(#descriptors),*];
        let descriptor = ::stencil::MethodDescriptor {
            name: #method_name,
            markers: MARKERS,
            path: #path,
            params: PARAMS,
            response: #response,
        };
        ::stencil::Request::from_call_with(
            &descriptor,
            ::std::vec![#(#args),*],
            ::stencil::Synthesis::synthesis_config(self),
        )
    }
}

fn param_descriptor(param: &MethodParam) -> TokenStream {
    let name = param.wire_name();
    match &param.kind {
        Some(ParamKind::Path(_)) => quote! { ::stencil::ParamDescriptor::path(#name) },
        Some(ParamKind::Query(_)) => quote! { ::stencil::ParamDescriptor::query(#name) },
        Some(ParamKind::Header(_)) => quote! { ::stencil::ParamDescriptor::header(#name) },
        Some(ParamKind::Body) => quote! { ::stencil::ParamDescriptor::body(#name) },
        None => quote! { ::stencil::ParamDescriptor::inferred(#name) },
    }
}
