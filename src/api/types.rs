//! Wire records for the control plane
//!
//! These mirror the JSON bodies of `/api/models` and `/api/keys`. Optional
//! fields are omitted from requests when unset.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

/// Upstream provider a model routes to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ModelProvider {
    OpenAi,
    Anthropic,
    Azure,
    Cohere,
    Google,
    Replicate,
    HuggingFace,
}

impl ModelProvider {
    pub const ALL: &'static [ModelProvider] = &[
        ModelProvider::OpenAi,
        ModelProvider::Anthropic,
        ModelProvider::Azure,
        ModelProvider::Cohere,
        ModelProvider::Google,
        ModelProvider::Replicate,
        ModelProvider::HuggingFace,
    ];

    /// Wire names, in declaration order
    pub const NAMES: &'static [&'static str] = &[
        "openai",
        "anthropic",
        "azure",
        "cohere",
        "google",
        "replicate",
        "huggingface",
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            ModelProvider::OpenAi => "openai",
            ModelProvider::Anthropic => "anthropic",
            ModelProvider::Azure => "azure",
            ModelProvider::Cohere => "cohere",
            ModelProvider::Google => "google",
            ModelProvider::Replicate => "replicate",
            ModelProvider::HuggingFace => "huggingface",
        }
    }
}

impl fmt::Display for ModelProvider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ModelProvider {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ModelProvider::ALL
            .iter()
            .copied()
            .find(|p| p.as_str() == s)
            .ok_or_else(|| format!("unknown model provider: {}", s))
    }
}

/// A logical model name mapped to an upstream provider model.
///
/// `model_provider` stays a plain string on the wire so that reading a model
/// configured out-of-band with a provider this crate does not know about still
/// decodes; the declared side is checked against [`ModelProvider::NAMES`].
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Model {
    pub name: String,
    pub model_provider: String,
    pub model_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_base: Option<String>,
    /// Write-only; the service never echoes it back
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub metadata: BTreeMap<String, String>,
}

/// An issued API credential scoped to a team and a set of models
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Key {
    pub key_alias: String,
    pub team_id: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub models: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_budget: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expires_at: Option<String>,
    /// Secret value, only present in the response to a create
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub key: Option<String>,
}
