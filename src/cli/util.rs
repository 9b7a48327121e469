//! CLI Common Utilities
//!
//! Shared initialization and context management for CLI commands.

use std::sync::Arc;

use tracing::debug;

use crate::ai::{
    CostEstimate, DisabledProvider, Explainer, SharedProvider, UsageLedger, create_provider,
};
use crate::cli::ui::Output;
use crate::config::{Config, ConfigLoader};
use crate::explorer::{ExplainApi, ExplorerState, Orchestrator};
use crate::service::ExplanationService;
use crate::source::GitHubClient;
use crate::types::{ExplorerItem, GlanceError, NodeKind, Result};

/// Command execution context
///
/// Config plus the process-wide explanation service. Every command that
/// talks to GitHub or the provider builds one of these.
pub struct CommandContext {
    pub config: Config,
    pub service: Arc<ExplanationService>,
    /// Why no provider could be built; browsing still works without one
    provider_error: Option<String>,
}

impl CommandContext {
    /// Context for commands that spend; fails without a usable provider
    pub fn load() -> Result<Self> {
        let ctx = Self::load_for_browsing()?;
        ctx.require_provider()?;
        Ok(ctx)
    }

    /// Context that tolerates a missing provider key
    pub fn load_for_browsing() -> Result<Self> {
        Self::from_config(ConfigLoader::load()?)
    }

    pub fn from_config(config: Config) -> Result<Self> {
        let source = GitHubClient::new(
            &config.github.api_base,
            config.github.token.clone(),
            config.llm.timeout_secs,
        )?;

        let (provider, provider_error): (SharedProvider, Option<String>) =
            match create_provider(&config.llm.provider_config()) {
                Ok(provider) => (provider, None),
                Err(err) => {
                    let reason = match err {
                        GlanceError::Config(message) => message,
                        other => other.to_string(),
                    };
                    debug!(reason = %reason, "Provider unavailable, explanations disabled");
                    (Arc::new(DisabledProvider::new(reason.clone())), Some(reason))
                }
            };
        let explainer =
            Explainer::with_models(provider, &config.llm.bulk_model, &config.llm.detail_model);

        let service = ExplanationService::new(
            explainer,
            Arc::new(source),
            config.cache.store_config(),
        );

        Ok(Self {
            config,
            service: Arc::new(service),
            provider_error,
        })
    }

    pub fn can_explain(&self) -> bool {
        self.provider_error.is_none()
    }

    pub fn require_provider(&self) -> Result<()> {
        match &self.provider_error {
            Some(reason) => Err(GlanceError::Config(reason.clone())),
            None => Ok(()),
        }
    }

    /// Fresh session over the shared service
    pub fn orchestrator(&self, show_hidden: bool) -> Orchestrator<ExplanationService> {
        let state = ExplorerState::new(UsageLedger::new(self.config.pricing.ledger.clone()))
            .with_hidden(show_hidden || self.config.explain.show_hidden);

        Orchestrator::new(Arc::clone(&self.service), state)
            .with_chunk_size(self.config.explain.chunk_size)
            .with_child_listing_cap(self.config.explain.child_listing_cap)
    }
}

/// Show the estimate and ask before spending. Free operations and `--yes`
/// skip the prompt.
pub fn approve_spend(output: &Output, estimate: &CostEstimate, assume_yes: bool) -> Result<bool> {
    if estimate.is_free() {
        return Ok(true);
    }
    output.estimate(estimate);
    if assume_yes {
        return Ok(true);
    }
    output.confirm("Proceed?")
}

/// Split a repository path into its folder segments, ignoring stray slashes
pub fn path_segments(path: &str) -> Vec<&str> {
    path.split('/').filter(|s| !s.is_empty()).collect()
}

/// Open every folder along `path`, column by column. Returns the scope of the
/// last opened folder (`""` for the root).
pub fn open_folder<A: ExplainApi>(
    orchestrator: &Orchestrator<A>,
    path: &str,
) -> Result<String> {
    let mut scope = String::new();
    for (depth, segment) in path_segments(path).into_iter().enumerate() {
        let target = if scope.is_empty() {
            segment.to_string()
        } else {
            format!("{}/{}", scope, segment)
        };

        let is_folder = orchestrator
            .snapshot()
            .column(&scope)
            .and_then(|col| col.items.iter().find(|view| view.item.path == target))
            .is_some_and(|view| view.item.kind == NodeKind::Folder);
        if !is_folder {
            return Err(GlanceError::upstream(404, format!("Folder not found: {}", target)));
        }

        orchestrator.select_folder(depth, &target);
        scope = target;
    }
    Ok(scope)
}

/// Open the parent folders of `path` and return `(depth, scope, item)`
pub fn locate_item<A: ExplainApi>(
    orchestrator: &Orchestrator<A>,
    path: &str,
) -> Result<(usize, String, ExplorerItem)> {
    let segments = path_segments(path);
    let Some((_, parents)) = segments.split_last() else {
        return Err(GlanceError::upstream(404, "Path is empty"));
    };

    let scope = open_folder(orchestrator, &parents.join("/"))?;
    let target = segments.join("/");
    let item = orchestrator
        .snapshot()
        .column(&scope)
        .and_then(|col| col.items.iter().find(|view| view.item.path == target))
        .map(|view| view.item.clone())
        .ok_or_else(|| GlanceError::upstream(404, format!("Not found: {}", target)))?;

    Ok((parents.len(), scope, item))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ai::provider::mock::MockProvider;
    use crate::cache::StoreConfig;
    use crate::source::mock::MockSource;
    use crate::types::RepoId;

    async fn session() -> Orchestrator<ExplanationService> {
        let source = MockSource::new(RepoId::new("octo", "demo"))
            .with_folder("src")
            .with_folder("src/util")
            .with_file("src/util/fmt.rs", b"pub fn f() {}")
            .with_file("README.md", b"# demo");
        let service = ExplanationService::new(
            Explainer::new(Arc::new(MockProvider::new(vec![]))),
            Arc::new(source),
            StoreConfig::default(),
        );
        let orchestrator = Orchestrator::new(Arc::new(service), ExplorerState::default());
        orchestrator
            .load_repo("https://github.com/octo/demo")
            .await
            .unwrap();
        orchestrator
    }

    #[test]
    fn test_context_without_provider_still_browses() {
        let mut config = Config::default();
        config.llm.provider = "nonexistent".to_string();

        let ctx = CommandContext::from_config(config).unwrap();
        assert!(!ctx.can_explain());
        let err = ctx.require_provider().unwrap_err();
        assert!(err.to_string().contains("Unknown provider"));
    }

    #[test]
    fn test_context_with_provider_can_explain() {
        let mut config = Config::default();
        config.llm.api_key = Some("sk-ant-test".to_string());

        let ctx = CommandContext::from_config(config).unwrap();
        assert!(ctx.can_explain());
        assert!(ctx.require_provider().is_ok());
    }

    #[test]
    fn test_path_segments() {
        assert_eq!(path_segments("/src//util/"), vec!["src", "util"]);
        assert!(path_segments("").is_empty());
    }

    #[tokio::test]
    async fn test_open_folder_builds_columns() {
        let orchestrator = session().await;

        let scope = open_folder(&orchestrator, "src/util").unwrap();
        assert_eq!(scope, "src/util");

        let state = orchestrator.snapshot();
        assert_eq!(state.columns.len(), 3);
        assert_eq!(state.columns[0].selected.as_deref(), Some("src"));
        assert_eq!(state.columns[1].selected.as_deref(), Some("src/util"));
        assert!(state.item("src/util", "fmt.rs").is_some());
    }

    #[tokio::test]
    async fn test_open_folder_rejects_files_and_unknown_paths() {
        let orchestrator = session().await;
        assert!(open_folder(&orchestrator, "README.md").is_err());
        assert!(open_folder(&orchestrator, "docs").is_err());
        assert_eq!(open_folder(&orchestrator, "").unwrap(), "");
    }

    #[tokio::test]
    async fn test_locate_item() {
        let orchestrator = session().await;

        let (depth, scope, item) = locate_item(&orchestrator, "src/util/fmt.rs").unwrap();
        assert_eq!(depth, 2);
        assert_eq!(scope, "src/util");
        assert_eq!(item.name, "fmt.rs");

        let (depth, scope, item) = locate_item(&orchestrator, "src").unwrap();
        assert_eq!((depth, scope.as_str()), (0, ""));
        assert_eq!(item.kind, NodeKind::Folder);

        assert!(locate_item(&orchestrator, "src/missing.rs").is_err());
    }
}
