//! Cache Keys
//!
//! Composite identities for the two explanation namespaces. Keys are
//! structured rather than joined strings, so `("a:b", "c")` and
//! `("a", "b:c")` can never collide.

use std::fmt;

use crate::types::RepoId;

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum CacheKey {
    /// `(ownerRepo, folderPath, itemName)` for folder-scoped explanations
    Item {
        repo: RepoId,
        scope: String,
        name: String,
    },
    /// `(ownerRepo, filePath)` for file-level detail
    File { repo: RepoId, path: String },
}

impl CacheKey {
    pub fn item(repo: &RepoId, scope: &str, name: &str) -> Self {
        Self::Item {
            repo: repo.clone(),
            scope: scope.to_string(),
            name: name.to_string(),
        }
    }

    pub fn file(repo: &RepoId, path: &str) -> Self {
        Self::File {
            repo: repo.clone(),
            path: path.to_string(),
        }
    }

    pub fn repo(&self) -> &RepoId {
        match self {
            Self::Item { repo, .. } | Self::File { repo, .. } => repo,
        }
    }
}

impl fmt::Display for CacheKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Item { repo, scope, name } => write!(f, "{}:{}:{}", repo, scope, name),
            Self::File { repo, path } => write!(f, "{}:{}", repo, path),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_item_key_display() {
        let repo = RepoId::new("vercel", "next.js");
        let key = CacheKey::item(&repo, "packages", "next");
        assert_eq!(key.to_string(), "vercel/next.js:packages:next");
        assert_eq!(key.repo(), &repo);
    }

    #[test]
    fn test_keys_do_not_collide_across_fields() {
        let repo = RepoId::new("o", "r");
        assert_ne!(
            CacheKey::item(&repo, "a:b", "c"),
            CacheKey::item(&repo, "a", "b:c")
        );
    }

    #[test]
    fn test_keys_do_not_collide_across_repos() {
        let a = CacheKey::file(&RepoId::new("o", "r1"), "src/main.rs");
        let b = CacheKey::file(&RepoId::new("o", "r2"), "src/main.rs");
        assert_ne!(a, b);
    }

    #[test]
    fn test_item_and_file_namespaces_are_distinct() {
        let repo = RepoId::new("o", "r");
        assert_ne!(CacheKey::item(&repo, "", "src"), CacheKey::file(&repo, "src"));
    }
}
