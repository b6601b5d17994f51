//! Request synthesizer.
//!
//! This module provides [`Synthesizer`], the default receiver of
//! `#[stencil]` traits: a [`SynthesisConfig`] plus an optional base URL
//! used to resolve synthesized requests.

use tracing::debug;
use url::Url;

use crate::{Arg, MethodDescriptor, Request, RequestFields, Result, Synthesis, SynthesisConfig};

/// Synthesizes requests from method calls and annotated objects.
///
/// Every `#[stencil]` trait is implemented for `Synthesizer`, so its
/// methods can be called directly on it.
///
/// # Example
///
/// ```ignore
/// use stencil::prelude::*;
///
/// let synthesizer = Synthesizer::default().with_base_url("https://api.github.com")?;
/// let request = synthesizer.pulls("apache", "tomee")?;
/// let url = synthesizer.url(&request)?;
/// ```
#[derive(Debug, Clone, Default)]
pub struct Synthesizer {
    config: SynthesisConfig,
    base_url: Option<Url>,
}

impl Synthesizer {
    /// Create a synthesizer with the given configuration.
    #[must_use]
    pub fn new(config: SynthesisConfig) -> Self {
        debug!(
            accept = %config.default_accept,
            content_type = %config.content_type,
            pretty_json = config.pretty_json,
            "created synthesizer"
        );
        Self {
            config,
            base_url: None,
        }
    }

    /// Set the base URL requests are resolved against.
    ///
    /// # Errors
    ///
    /// Returns an error if the URL cannot be parsed.
    pub fn with_base_url(self, base_url: impl AsRef<str>) -> Result<Self> {
        let base_url = Url::parse(base_url.as_ref())?;
        Ok(self.with_url(base_url))
    }

    /// Set a pre-parsed base URL.
    #[must_use]
    pub fn with_url(mut self, base_url: Url) -> Self {
        self.base_url = Some(base_url);
        self
    }

    /// The synthesis configuration.
    #[must_use]
    pub const fn config(&self) -> &SynthesisConfig {
        &self.config
    }

    /// The base URL, if one was set.
    #[must_use]
    pub const fn base_url(&self) -> Option<&Url> {
        self.base_url.as_ref()
    }

    /// Synthesize a request from a method call.
    ///
    /// # Errors
    ///
    /// See [`Request::from_call_with`].
    pub fn from_call(&self, descriptor: &MethodDescriptor, args: Vec<Arg<'_>>) -> Result<Request> {
        Request::from_call_with(descriptor, args, &self.config)
    }

    /// Synthesize a request from an annotated object.
    ///
    /// # Errors
    ///
    /// See [`Request::from_object_with`].
    pub fn from_object(&self, template: Option<&str>, object: &dyn RequestFields) -> Result<Request> {
        Request::from_object_with(template, object, &self.config)
    }

    /// Resolve a request against the base URL.
    ///
    /// Without a base URL the request URI must already be absolute.
    ///
    /// # Errors
    ///
    /// Returns an error if the URI cannot be assembled or parsed.
    pub fn url(&self, request: &Request) -> Result<Url> {
        match &self.base_url {
            Some(base) => request.url(base),
            None => Ok(Url::parse(&request.uri()?)?),
        }
    }

    /// Convert a request into an `http::Request` against the base URL.
    ///
    /// # Errors
    ///
    /// Returns an error if no base URL is set, or if the request has no
    /// method or cannot be assembled.
    pub fn to_http(&self, request: &Request) -> Result<http::Request<String>> {
        let Some(base) = &self.base_url else {
            return Err(crate::Error::invalid_request("synthesizer has no base URL"));
        };
        request.to_http(base)
    }
}

impl Synthesis for Synthesizer {
    fn synthesis_config(&self) -> &SynthesisConfig {
        &self.config
    }
}

impl From<SynthesisConfig> for Synthesizer {
    fn from(config: SynthesisConfig) -> Self {
        Self::new(config)
    }
}
