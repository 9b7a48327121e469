//! Request and response shapes for the service boundary.

use serde::{Deserialize, Serialize};

use crate::ai::{BatchItem, Dependency, ExplanationMap, FileInsights, KeyPoint, TokenUsage};
use crate::constants::content;
use crate::source::LanguageInfo;
use crate::types::{RepoId, RepoMeta, TreeNode};

#[derive(Debug, Clone)]
pub struct LoadedRepo {
    pub meta: RepoMeta,
    pub tree: Vec<TreeNode>,
}

/// Explain several items of one folder (`scope`)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExplainRequest {
    pub repo: RepoId,
    pub scope: String,
    pub items: Vec<BatchItem>,
    /// Repository description, used as project context
    pub description: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExplainResponse {
    /// Only names that have an explanation; absent names were not answered
    pub explanations: ExplanationMap,
    pub usage: TokenUsage,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileDetailRequest {
    pub repo: RepoId,
    pub path: String,
    pub description: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeepDiveRequest {
    pub item: BatchItem,
    pub path: String,
    pub description: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeepDiveResponse {
    /// `None` when the provider answered with nothing usable
    pub explanation: Option<String>,
    pub usage: TokenUsage,
}

/// Everything the file pane shows
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FileDetail {
    pub name: String,
    pub path: String,
    pub language: String,
    pub language_explanation: String,
    pub summary: String,
    pub key_points: Vec<KeyPoint>,
    pub dependencies: Vec<Dependency>,
    pub notes: Vec<String>,
    pub content: String,
    pub binary: bool,
}

impl FileDetail {
    pub fn explained(
        name: String,
        path: String,
        language: LanguageInfo,
        insights: FileInsights,
        content: String,
    ) -> Self {
        Self {
            name,
            path,
            language: language.name.to_string(),
            language_explanation: language.explanation.to_string(),
            summary: insights.summary,
            key_points: insights.key_points,
            dependencies: insights.dependencies,
            notes: insights.notes,
            content,
            binary: false,
        }
    }

    /// Static placeholder; the provider never sees binary content
    pub fn binary(name: String, path: String, language: LanguageInfo) -> Self {
        Self {
            name,
            path,
            language: language.name.to_string(),
            language_explanation: language.explanation.to_string(),
            summary: content::BINARY_SUMMARY.to_string(),
            key_points: Vec::new(),
            dependencies: Vec::new(),
            notes: vec![content::BINARY_NOTE.to_string()],
            content: content::BINARY_CONTENT.to_string(),
            binary: true,
        }
    }

    /// Path-only detail: the loading pane, or a failure message in `summary`
    pub fn placeholder(path: &str, summary: impl Into<String>) -> Self {
        Self {
            name: crate::source::file_name(path).to_string(),
            path: path.to_string(),
            language: String::new(),
            language_explanation: String::new(),
            summary: summary.into(),
            key_points: Vec::new(),
            dependencies: Vec::new(),
            notes: Vec::new(),
            content: String::new(),
            binary: false,
        }
    }
}
