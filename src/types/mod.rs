pub mod error;
pub mod repo;

pub use error::{ErrorCategory, ErrorClassifier, GlanceError, LlmError, Result};
pub use repo::{ExplorerItem, NodeKind, RepoId, RepoMeta, TreeNode};
