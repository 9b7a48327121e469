//! repoglance - Plain-English Explorer for GitHub Repositories
//!
//! Browses a public GitHub repository as a column view and annotates each
//! file and folder with a short AI explanation aimed at non-programmers.
//!
//! ## Core Features
//!
//! - **Column Explorer**: Folder-by-folder navigation over the full tree
//! - **Bulk Explanations**: Small chunks sent one at a time, partial answers kept
//! - **File Detail**: Summary, key parts and dependencies for a single file
//! - **Deep Dive**: Longer answer from the detail model on request
//! - **Shared Cache**: Expiring, bounded stores reused across sessions
//! - **Cost Awareness**: Estimates before spending, running usage ledger
//!
//! ## Quick Start
//!
//! ```ignore
//! use repoglance::{ConfigLoader, cli::CommandContext};
//!
//! let ctx = CommandContext::from_config(ConfigLoader::load()?)?;
//! let orchestrator = ctx.orchestrator(false);
//! orchestrator.load_repo("https://github.com/owner/repo").await?;
//! let items = orchestrator.snapshot().columns[0].items.iter().map(|v| v.item.clone()).collect::<Vec<_>>();
//! orchestrator.request_explanations("", &items).await?;
//! ```
//!
//! ## Modules
//!
//! - [`ai`]: Provider abstraction, prompts, estimates and usage ledger
//! - [`cache`]: TTL + LRU explanation stores
//! - [`source`]: GitHub access, tree filtering, language labels
//! - [`service`]: Request handlers shared across sessions
//! - [`explorer`]: Per-session state, reducer and request orchestration

pub mod ai;
pub mod cache;
pub mod cli;
pub mod config;
pub mod constants;
pub mod explorer;
pub mod service;
pub mod source;
pub mod types;

// =============================================================================
// Core Re-exports
// =============================================================================

// Configuration
pub use config::{Config, ConfigLoader};

// Error Types
pub use types::error::{ErrorCategory, GlanceError, Result};

// Domain
pub use types::{ExplorerItem, NodeKind, RepoId, RepoMeta, TreeNode};

// =============================================================================
// Service Re-exports
// =============================================================================

pub use explorer::{ExplainApi, ExplorerState, Orchestrator};
pub use service::ExplanationService;

// =============================================================================
// AI Re-exports
// =============================================================================

pub use ai::{CostEstimate, Explainer, LlmProvider, LlmResponse, TokenUsage, UsageLedger};
