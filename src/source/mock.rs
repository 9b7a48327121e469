//! In-memory source host for tests.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};

use super::SourceHost;
use crate::types::{GlanceError, NodeKind, RepoId, RepoMeta, Result, TreeNode};

#[derive(Debug)]
pub struct MockSource {
    pub meta: RepoMeta,
    pub tree: Vec<TreeNode>,
    files: HashMap<String, Vec<u8>>,
    file_fetches: AtomicUsize,
}

impl MockSource {
    pub fn new(repo: RepoId) -> Self {
        Self {
            meta: RepoMeta {
                id: repo,
                description: "A demo project".to_string(),
                default_branch: "main".to_string(),
                stars: 1,
                language: "Rust".to_string(),
            },
            tree: Vec::new(),
            files: HashMap::new(),
            file_fetches: AtomicUsize::new(0),
        }
    }

    pub fn with_folder(mut self, path: &str) -> Self {
        self.tree.push(TreeNode {
            path: path.to_string(),
            kind: NodeKind::Folder,
            sha: format!("sha-{path}"),
            size: None,
        });
        self
    }

    pub fn with_file(mut self, path: &str, bytes: &[u8]) -> Self {
        self.tree.push(TreeNode {
            path: path.to_string(),
            kind: NodeKind::File,
            sha: format!("sha-{path}"),
            size: Some(bytes.len() as u64),
        });
        self.files.insert(path.to_string(), bytes.to_vec());
        self
    }

    pub fn file_fetches(&self) -> usize {
        self.file_fetches.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl SourceHost for MockSource {
    async fn fetch_repo_meta(&self, repo: &RepoId) -> Result<RepoMeta> {
        if repo == &self.meta.id {
            Ok(self.meta.clone())
        } else {
            Err(GlanceError::upstream(404, "Repository not found."))
        }
    }

    async fn fetch_tree(&self, _repo: &RepoId, _branch: &str) -> Result<Vec<TreeNode>> {
        Ok(self.tree.clone())
    }

    async fn fetch_file(&self, _repo: &RepoId, path: &str) -> Result<Vec<u8>> {
        self.file_fetches.fetch_add(1, Ordering::SeqCst);
        self.files
            .get(path)
            .cloned()
            .ok_or_else(|| GlanceError::upstream(404, format!("File not found: {path}")))
    }
}
