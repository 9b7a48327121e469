//! Explainer
//!
//! The three explanation tiers over an [`LlmProvider`]:
//!
//! - **Bulk**: several items per call, cheap model, 1-2 sentences each
//! - **Single**: one item, high-fidelity model, free text ("deep dive")
//! - **File**: one file's truncated contents, high-fidelity model, structured
//!
//! Provider transport errors propagate as `Err`. Output that arrives but
//! cannot be used is returned as [`ProviderOutput::Unparseable`] together with
//! the usage, since those tokens were still paid for.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use tracing::{debug, warn};

use super::prompt::{self, SYSTEM_PROMPT};
use super::provider::{CompletionRequest, SharedProvider, TokenUsage};
use super::validation::extract_json_from_response;
use crate::constants::{content, explain, models};
use crate::types::{NodeKind, Result};

// =============================================================================
// Inputs and Outputs
// =============================================================================

/// One item of a bulk request
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BatchItem {
    pub name: String,
    pub kind: NodeKind,
    /// Folder child listing (already capped)
    pub context: Option<String>,
    pub extension: Option<String>,
}

impl BatchItem {
    pub fn folder(name: impl Into<String>, listing: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            kind: NodeKind::Folder,
            context: Some(listing.into()),
            extension: None,
        }
    }

    pub fn file(name: impl Into<String>, extension: Option<String>) -> Self {
        Self {
            name: name.into(),
            kind: NodeKind::File,
            context: None,
            extension,
        }
    }
}

/// Tagged provider result: usable value, or explicitly unusable
#[derive(Debug, Clone, PartialEq)]
pub enum ProviderOutput<T> {
    Parsed(T),
    Unparseable { preview: String },
}

impl<T> ProviderOutput<T> {
    pub fn parsed(self) -> Option<T> {
        match self {
            Self::Parsed(value) => Some(value),
            Self::Unparseable { .. } => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Explained<T> {
    pub output: ProviderOutput<T>,
    pub usage: TokenUsage,
}

pub type ExplanationMap = BTreeMap<String, String>;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeyPoint {
    pub name: String,
    pub explanation: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Dependency {
    pub name: String,
    pub why: String,
}

/// Structured explanation of one file
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct FileInsights {
    pub summary: String,
    #[serde(alias = "keyFunctions")]
    pub key_points: Vec<KeyPoint>,
    pub dependencies: Vec<Dependency>,
    #[serde(alias = "thingsToKnow")]
    pub notes: Vec<String>,
}

impl FileInsights {
    /// Static fallback when the provider output cannot be used
    pub fn unexplained() -> Self {
        Self {
            summary: content::UNEXPLAINED_SUMMARY.to_string(),
            ..Default::default()
        }
    }
}

// =============================================================================
// Explainer
// =============================================================================

pub struct Explainer {
    provider: SharedProvider,
    bulk_model: String,
    detail_model: String,
}

impl Explainer {
    pub fn new(provider: SharedProvider) -> Self {
        Self::with_models(provider, models::BULK_MODEL, models::DETAIL_MODEL)
    }

    pub fn with_models(
        provider: SharedProvider,
        bulk_model: impl Into<String>,
        detail_model: impl Into<String>,
    ) -> Self {
        Self {
            provider,
            bulk_model: bulk_model.into(),
            detail_model: detail_model.into(),
        }
    }

    pub fn provider_name(&self) -> &str {
        self.provider.name()
    }

    /// Bulk tier. Only names that were asked about are kept in the result.
    pub async fn explain_batch(
        &self,
        items: &[BatchItem],
        description: &str,
    ) -> Result<Explained<ExplanationMap>> {
        if items.is_empty() {
            return Ok(Explained {
                output: ProviderOutput::Parsed(ExplanationMap::new()),
                usage: TokenUsage::default(),
            });
        }

        let max_tokens = explain::BULK_MIN_MAX_TOKENS
            .max(items.len() as u32 * explain::BULK_MAX_TOKENS_PER_ITEM);
        let request = CompletionRequest {
            model: self.bulk_model.clone(),
            system: SYSTEM_PROMPT.to_string(),
            prompt: prompt::build_batch_prompt(
                items.iter().map(|item| {
                    (
                        item.name.as_str(),
                        item.kind,
                        item.context.as_deref(),
                        item.extension.as_deref(),
                    )
                }),
                description,
            ),
            max_tokens,
        };

        let response = self.provider.complete(&request).await?;
        let output = match extract_json_from_response(&response.content) {
            Ok(value) => {
                let map = explanation_map(&value, items);
                debug!(
                    requested = items.len(),
                    answered = map.len(),
                    "Bulk explanations parsed"
                );
                ProviderOutput::Parsed(map)
            }
            Err(err) => {
                warn!(preview = %err.preview, "Bulk explanation output was not JSON");
                ProviderOutput::Unparseable {
                    preview: err.preview,
                }
            }
        };

        Ok(Explained {
            output,
            usage: response.usage,
        })
    }

    /// High-fidelity single item, plain text
    pub async fn explain_single(
        &self,
        item: &BatchItem,
        path: &str,
        description: &str,
    ) -> Result<Explained<String>> {
        let request = CompletionRequest {
            model: self.detail_model.clone(),
            system: SYSTEM_PROMPT.to_string(),
            prompt: prompt::build_single_prompt(
                &item.name,
                item.kind,
                path,
                item.context.as_deref(),
                item.extension.as_deref(),
                description,
            ),
            max_tokens: explain::SINGLE_MAX_TOKENS,
        };

        let response = self.provider.complete(&request).await?;
        let text = response.content.trim();
        let output = if text.is_empty() {
            warn!(item = %item.name, "Deep dive returned no text");
            ProviderOutput::Unparseable {
                preview: String::new(),
            }
        } else {
            ProviderOutput::Parsed(text.to_string())
        };

        Ok(Explained {
            output,
            usage: response.usage,
        })
    }

    /// High-fidelity structured file explanation. Truncates `source` first.
    pub async fn explain_file(
        &self,
        name: &str,
        path: &str,
        language: &str,
        source: &str,
        description: &str,
    ) -> Result<Explained<FileInsights>> {
        let (body, truncated) = prompt::truncate_content(source);
        if truncated {
            debug!(path, "File content truncated before sending");
        }

        let request = CompletionRequest {
            model: self.detail_model.clone(),
            system: SYSTEM_PROMPT.to_string(),
            prompt: prompt::build_file_prompt(name, path, language, &body, description),
            max_tokens: explain::FILE_MAX_TOKENS,
        };

        let response = self.provider.complete(&request).await?;
        let output = match extract_json_from_response(&response.content)
            .ok()
            .and_then(|value| serde_json::from_value::<FileInsights>(value).ok())
        {
            Some(insights) if !insights.summary.trim().is_empty() => {
                ProviderOutput::Parsed(insights)
            }
            _ => {
                warn!(path, "File explanation output was unusable");
                ProviderOutput::Unparseable {
                    preview: response.content.chars().take(200).collect(),
                }
            }
        };

        Ok(Explained {
            output,
            usage: response.usage,
        })
    }
}

/// `{"explanations": {...}}`, or a bare name map, restricted to requested names
fn explanation_map(value: &Value, items: &[BatchItem]) -> ExplanationMap {
    let Some(object) = value
        .get("explanations")
        .and_then(Value::as_object)
        .or_else(|| value.as_object())
    else {
        return ExplanationMap::new();
    };

    items
        .iter()
        .filter_map(|item| {
            let text = object.get(&item.name)?.as_str()?.trim();
            (!text.is_empty()).then(|| (item.name.clone(), text.to_string()))
        })
        .collect()
}
