//! Synthesis configuration types.

use crate::body::APPLICATION_JSON;

/// Configuration for request synthesis.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SynthesisConfig {
    /// Media type appended to `accept` for methods with a result.
    pub default_accept: String,
    /// Content type set when a body is synthesized.
    pub content_type: String,
    /// Whether bodies are written as indented JSON.
    pub pretty_json: bool,
}

impl Default for SynthesisConfig {
    fn default() -> Self {
        Self {
            default_accept: APPLICATION_JSON.to_string(),
            content_type: APPLICATION_JSON.to_string(),
            pretty_json: false,
        }
    }
}

impl SynthesisConfig {
    /// Create a new configuration builder.
    #[must_use]
    pub fn builder() -> SynthesisConfigBuilder {
        SynthesisConfigBuilder::default()
    }
}

/// Provider of the configuration used by `#[stencil]` traits.
///
/// Every `#[stencil]` trait is implemented for every `Synthesis` type.
pub trait Synthesis {
    /// The configuration applied to synthesized requests.
    fn synthesis_config(&self) -> &SynthesisConfig;
}

impl Synthesis for SynthesisConfig {
    fn synthesis_config(&self) -> &SynthesisConfig {
        self
    }
}

/// Builder for [`SynthesisConfig`].
#[derive(Debug, Clone, Default)]
pub struct SynthesisConfigBuilder {
    default_accept: Option<String>,
    content_type: Option<String>,
    pretty_json: Option<bool>,
}

impl SynthesisConfigBuilder {
    /// Set the media type appended to `accept`.
    #[must_use]
    pub fn default_accept(mut self, media_type: impl Into<String>) -> Self {
        self.default_accept = Some(media_type.into());
        self
    }

    /// Set the content type of synthesized bodies.
    #[must_use]
    pub fn content_type(mut self, media_type: impl Into<String>) -> Self {
        self.content_type = Some(media_type.into());
        self
    }

    /// Write bodies as indented JSON.
    #[must_use]
    pub const fn pretty_json(mut self, pretty: bool) -> Self {
        self.pretty_json = Some(pretty);
        self
    }

    /// Build the configuration.
    #[must_use]
    pub fn build(self) -> SynthesisConfig {
        let defaults = SynthesisConfig::default();
        SynthesisConfig {
            default_accept: self.default_accept.unwrap_or(defaults.default_accept),
            content_type: self.content_type.unwrap_or(defaults.content_type),
            pretty_json: self.pretty_json.unwrap_or(defaults.pretty_json),
        }
    }
}
