//! Repository Domain Types
//!
//! Identity, metadata and tree shapes shared by the source client, the
//! service layer and the explorer state.

use std::fmt;

use serde::{Deserialize, Serialize};

// =============================================================================
// Repository Identity
// =============================================================================

/// `owner/repo` identity used in every cache key
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct RepoId {
    pub owner: String,
    pub repo: String,
}

impl RepoId {
    pub fn new(owner: impl Into<String>, repo: impl Into<String>) -> Self {
        Self {
            owner: owner.into(),
            repo: repo.into(),
        }
    }
}

impl fmt::Display for RepoId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.owner, self.repo)
    }
}

/// Repository metadata as reported by the source host
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RepoMeta {
    pub id: RepoId,
    pub description: String,
    pub default_branch: String,
    pub stars: u64,
    pub language: String,
}

// =============================================================================
// Tree
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NodeKind {
    Folder,
    File,
}

impl NodeKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            NodeKind::Folder => "folder",
            NodeKind::File => "file",
        }
    }
}

impl fmt::Display for NodeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One entry of the recursive repository tree
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TreeNode {
    pub path: String,
    pub kind: NodeKind,
    pub sha: String,
    pub size: Option<u64>,
}

/// A direct child of a folder, as listed in one explorer column
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExplorerItem {
    pub name: String,
    pub path: String,
    pub kind: NodeKind,
    /// Extension including the leading dot (`.rs`)
    pub extension: Option<String>,
    /// Visible children, folders only
    pub child_count: Option<usize>,
    pub size: Option<u64>,
}
