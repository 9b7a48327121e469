//! Explanation Service
//!
//! Request handlers shared by every session in the process. Owns the two
//! explanation stores and is the only place that talks to both the source
//! host and the explainer.
//!
//! ## Caching
//!
//! - Folder items are cached per `(repo, folder, name)`, one entry per item,
//!   so siblings of an answered item are still reusable
//! - File detail is cached per `(repo, path)`, binary placeholders included
//! - Deep dives are never cached

mod types;

pub use types::{
    DeepDiveRequest, DeepDiveResponse, ExplainRequest, ExplainResponse, FileDetail,
    FileDetailRequest, LoadedRepo,
};

use tracing::{debug, info, warn};

use crate::ai::{BatchItem, Explainer, FileInsights, ProviderOutput, TokenUsage};
use crate::cache::{CacheKey, ExplanationStore, StoreConfig};
use crate::source::{self, SharedSource};
use crate::types::{GlanceError, Result};

pub struct ExplanationService {
    explainer: Explainer,
    source: SharedSource,
    items: ExplanationStore<String>,
    files: ExplanationStore<FileDetail>,
}

impl ExplanationService {
    pub fn new(explainer: Explainer, source: SharedSource, store: StoreConfig) -> Self {
        Self {
            explainer,
            source,
            items: ExplanationStore::new(store),
            files: ExplanationStore::new(store),
        }
    }

    /// Build with explicit stores (tests inject a manual clock this way)
    pub fn with_stores(
        explainer: Explainer,
        source: SharedSource,
        items: ExplanationStore<String>,
        files: ExplanationStore<FileDetail>,
    ) -> Self {
        Self {
            explainer,
            source,
            items,
            files,
        }
    }

    pub fn item_store(&self) -> &ExplanationStore<String> {
        &self.items
    }

    pub fn file_store(&self) -> &ExplanationStore<FileDetail> {
        &self.files
    }

    /// Parse the URL, then fetch metadata and the tree at the default branch
    pub async fn load_repo(&self, url: &str) -> Result<LoadedRepo> {
        let id = source::parse_github_url(url)?;
        let meta = self.source.fetch_repo_meta(&id).await?;
        let tree = self.source.fetch_tree(&id, &meta.default_branch).await?;
        info!(repo = %id, nodes = tree.len(), "Repository loaded");
        Ok(LoadedRepo { meta, tree })
    }

    /// Bulk explain one folder's items.
    ///
    /// Cached items are answered from the store. The rest go to the provider
    /// in a single call; unparseable output yields no explanations but still
    /// reports usage. Rate limits surface as `GlanceError::RateLimited`.
    pub async fn explain(&self, request: &ExplainRequest) -> Result<ExplainResponse> {
        let mut response = ExplainResponse::default();
        let mut uncached: Vec<BatchItem> = Vec::new();

        for item in &request.items {
            let key = CacheKey::item(&request.repo, &request.scope, &item.name);
            match self.items.get(&key) {
                Some(text) => {
                    response.explanations.insert(item.name.clone(), text);
                }
                None => uncached.push(item.clone()),
            }
        }

        debug!(
            repo = %request.repo,
            scope = %request.scope,
            cached = response.explanations.len(),
            uncached = uncached.len(),
            "Explain request partitioned"
        );

        if uncached.is_empty() {
            return Ok(response);
        }

        let explained = self
            .explainer
            .explain_batch(&uncached, &request.description)
            .await
            .map_err(GlanceError::surface_rate_limit)?;
        response.usage = explained.usage;

        match explained.output {
            ProviderOutput::Parsed(map) => {
                for (name, text) in map {
                    self.items
                        .set(CacheKey::item(&request.repo, &request.scope, &name), text.clone());
                    response.explanations.insert(name, text);
                }
            }
            ProviderOutput::Unparseable { .. } => {
                warn!(scope = %request.scope, "Provider output unusable; no items answered");
            }
        }

        Ok(response)
    }

    /// One file's structured explanation; binary files never reach the provider
    pub async fn file_detail(
        &self,
        request: &FileDetailRequest,
    ) -> Result<(FileDetail, TokenUsage)> {
        let key = CacheKey::file(&request.repo, &request.path);
        if let Some(detail) = self.files.get(&key) {
            debug!(path = %request.path, "File detail cache hit");
            return Ok((detail, TokenUsage::default()));
        }

        let bytes = self.source.fetch_file(&request.repo, &request.path).await?;
        let name = source::file_name(&request.path).to_string();
        let language = source::language_info(&name);

        if source::is_binary(&bytes) {
            info!(path = %request.path, "Binary file, skipping provider");
            let detail = FileDetail::binary(name, request.path.clone(), language);
            self.files.set(key, detail.clone());
            return Ok((detail, TokenUsage::default()));
        }

        let text = source::decode_text(&bytes);
        let explained = self
            .explainer
            .explain_file(&name, &request.path, language.name, &text, &request.description)
            .await
            .map_err(GlanceError::surface_rate_limit)?;

        // The fallback is returned but not cached, so the next open retries
        let detail = match explained.output {
            ProviderOutput::Parsed(insights) => {
                let detail =
                    FileDetail::explained(name, request.path.clone(), language, insights, text);
                self.files.set(key, detail.clone());
                detail
            }
            ProviderOutput::Unparseable { .. } => FileDetail::explained(
                name,
                request.path.clone(),
                language,
                FileInsights::unexplained(),
                text,
            ),
        };

        Ok((detail, explained.usage))
    }

    /// High-fidelity single item. Bypasses the item store entirely.
    pub async fn deep_dive(&self, request: &DeepDiveRequest) -> Result<DeepDiveResponse> {
        let explained = self
            .explainer
            .explain_single(&request.item, &request.path, &request.description)
            .await
            .map_err(GlanceError::surface_rate_limit)?;

        if matches!(explained.output, ProviderOutput::Unparseable { .. }) {
            warn!(path = %request.path, "Deep dive came back empty");
        }

        Ok(DeepDiveResponse {
            explanation: explained.output.parsed(),
            usage: explained.usage,
        })
    }
}

// =============================================================================
// Tests
// =============================================================================
