//! Repository Source
//!
//! Where trees and file contents come from. The service layer only sees the
//! [`SourceHost`] trait; [`GitHubClient`] is the production implementation.

mod content;
mod filter;
mod github;
mod language;
#[cfg(test)]
pub(crate) mod mock;
mod tree;

pub use content::{decode_text, is_binary};
pub use filter::is_hidden;
pub use github::{GitHubClient, is_valid_token, parse_github_url};
pub use language::{LanguageInfo, language_info};
pub use tree::{child_listing, children_at_path, file_name};

use async_trait::async_trait;
use std::sync::Arc;

use crate::types::{RepoId, RepoMeta, Result, TreeNode};

#[async_trait]
pub trait SourceHost: Send + Sync {
    async fn fetch_repo_meta(&self, repo: &RepoId) -> Result<RepoMeta>;

    /// Full recursive tree at `branch`
    async fn fetch_tree(&self, repo: &RepoId, branch: &str) -> Result<Vec<TreeNode>>;

    /// Raw file bytes
    async fn fetch_file(&self, repo: &RepoId, path: &str) -> Result<Vec<u8>>;
}

pub type SharedSource = Arc<dyn SourceHost>;
