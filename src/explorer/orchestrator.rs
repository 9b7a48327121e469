//! Orchestrator
//!
//! Drives the explorer's network work and feeds results into [`reduce`].
//!
//! ## Explain flow
//!
//! ```text
//! items ─┬─ in flight ──────────────► skipped
//!        ├─ in client mirror ───────► surfaced immediately
//!        └─ uncached ─► mark loading ─► chunk 1 ─► apply ─► chunk 2 ─► apply ...
//! ```
//!
//! Chunks are strictly sequential: chunk `k + 1` is not sent until chunk
//! `k`'s result (success or failure) is in the state. A failed chunk gets
//! placeholders and the loop moves on.
//!
//! The state lock is never held across an `.await`.

use std::collections::HashSet;
use std::sync::{Arc, Mutex, MutexGuard};

use tracing::{debug, error, info, warn};
use uuid::Uuid;

use super::api::ExplainApi;
use super::state::{Event, ExplorerState, FailureKind, reduce};
use crate::ai::{BatchItem, ExplanationMap, TokenUsage};
use crate::constants::explain;
use crate::service::{DeepDiveRequest, ExplainRequest, FileDetail, FileDetailRequest};
use crate::source::child_listing;
use crate::types::{ExplorerItem, GlanceError, NodeKind, RepoId, Result};

/// Tally of one "explain these items" action
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExplainOutcome {
    pub request_id: Uuid,
    /// Served from the client mirror
    pub cached: usize,
    /// Already loading; left alone
    pub in_flight: usize,
    pub explained: usize,
    pub unanswered: usize,
    pub failed: usize,
    pub chunks: usize,
    pub usage: TokenUsage,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeepDiveOutcome {
    Explained(String),
    /// The provider answered with nothing usable; the prior text was restored
    Unusable,
    /// A request for this item is already outstanding
    AlreadyInFlight,
}

pub struct Orchestrator<A: ExplainApi> {
    api: Arc<A>,
    state: Arc<Mutex<ExplorerState>>,
    chunk_size: usize,
    child_listing_cap: usize,
}

impl<A: ExplainApi> Orchestrator<A> {
    pub fn new(api: Arc<A>, state: ExplorerState) -> Self {
        Self {
            api,
            state: Arc::new(Mutex::new(state)),
            chunk_size: explain::CHUNK_SIZE,
            child_listing_cap: explain::CHILD_LISTING_CAP,
        }
    }

    pub fn with_chunk_size(mut self, chunk_size: usize) -> Self {
        self.chunk_size = chunk_size.max(1);
        self
    }

    pub fn with_child_listing_cap(mut self, cap: usize) -> Self {
        self.child_listing_cap = cap;
        self
    }

    pub fn api(&self) -> &A {
        &self.api
    }

    /// Handle to the live state, for observers
    pub fn shared_state(&self) -> Arc<Mutex<ExplorerState>> {
        Arc::clone(&self.state)
    }

    pub fn snapshot(&self) -> ExplorerState {
        self.lock().clone()
    }

    pub fn dispatch(&self, event: Event) {
        reduce(&mut self.lock(), event);
    }

    fn lock(&self) -> MutexGuard<'_, ExplorerState> {
        self.state.lock().unwrap_or_else(|poisoned| {
            error!("Explorer state mutex poisoned, recovering");
            poisoned.into_inner()
        })
    }

    // =========================================================================
    // Navigation
    // =========================================================================

    pub async fn load_repo(&self, url: &str) -> Result<()> {
        self.dispatch(Event::RepoLoadStarted);

        match self.api.load_repo(url).await {
            Ok(loaded) => {
                self.dispatch(Event::RepoLoaded {
                    meta: loaded.meta,
                    tree: loaded.tree,
                });
                Ok(())
            }
            Err(err) => {
                warn!(url, error = %err, "Repository load failed");
                self.dispatch(Event::RepoLoadFailed(err.to_string()));
                Err(err)
            }
        }
    }

    /// Open a folder; mirrored explanations show up, nothing is requested
    pub fn select_folder(&self, depth: usize, path: &str) {
        self.dispatch(Event::FolderSelected {
            depth,
            path: path.to_string(),
        });
    }

    pub fn navigate_to_depth(&self, depth: usize) {
        self.dispatch(Event::NavigatedToDepth(depth));
    }

    pub fn toggle_hidden(&self) {
        self.dispatch(Event::HiddenToggled);
    }

    pub fn reset_ledger(&self) {
        self.dispatch(Event::LedgerReset);
    }

    /// Open a file and fetch its detail. On error the pane shows the message.
    pub async fn select_file(&self, depth: usize, path: &str) -> Result<FileDetail> {
        let (repo, description) = {
            let mut state = self.lock();
            let context = repo_context(&state)?;
            reduce(
                &mut state,
                Event::FileSelected {
                    depth,
                    path: path.to_string(),
                },
            );
            context
        };

        let request = FileDetailRequest {
            repo,
            path: path.to_string(),
            description,
        };

        match self.api.file_detail(&request).await {
            Ok((detail, usage)) => {
                let mut state = self.lock();
                reduce(&mut state, Event::FileDetailLoaded(detail.clone()));
                record_usage(&mut state, usage);
                Ok(detail)
            }
            Err(err) => {
                warn!(path, error = %err, "File detail failed");
                self.dispatch(Event::FileDetailFailed {
                    path: path.to_string(),
                    message: err.to_string(),
                });
                Err(err)
            }
        }
    }

    // =========================================================================
    // Explanations
    // =========================================================================

    /// Explain `items` of folder `scope`. Every submitted item ends in a
    /// terminal state: explained, unanswered, or failed.
    pub async fn request_explanations(
        &self,
        scope: &str,
        items: &[ExplorerItem],
    ) -> Result<ExplainOutcome> {
        let mut outcome = ExplainOutcome {
            request_id: Uuid::new_v4(),
            ..Default::default()
        };

        let (repo, description, batch) = {
            let mut state = self.lock();
            let (repo, description) = repo_context(&state)?;

            let mut cached = ExplanationMap::new();
            let mut deep_dived = 0;
            let mut pending: Vec<&ExplorerItem> = Vec::new();
            let mut seen = HashSet::new();
            for item in items {
                if !seen.insert(item.name.as_str()) {
                    continue;
                }
                if state.is_loading(scope, &item.name) {
                    outcome.in_flight += 1;
                } else if state.deep_dive_text(scope, &item.name).is_some() {
                    // Already showing the better answer
                    deep_dived += 1;
                } else if let Some(text) = state.cached_explanation(scope, &item.name) {
                    cached.insert(item.name.clone(), text.to_string());
                } else {
                    pending.push(item);
                }
            }

            outcome.cached = cached.len() + deep_dived;
            if !cached.is_empty() {
                reduce(
                    &mut state,
                    Event::ExplanationsReceived {
                        scope: scope.to_string(),
                        explanations: cached,
                    },
                );
            }

            if !pending.is_empty() {
                reduce(
                    &mut state,
                    Event::ItemsMarkedLoading {
                        scope: scope.to_string(),
                        names: pending.iter().map(|item| item.name.clone()).collect(),
                    },
                );
            }

            let batch: Vec<BatchItem> = pending
                .into_iter()
                .map(|item| self.batch_item(&state, item))
                .collect();
            (repo, description, batch)
        };

        if batch.is_empty() {
            debug!(
                request_id = %outcome.request_id,
                scope,
                cached = outcome.cached,
                in_flight = outcome.in_flight,
                "Nothing to request"
            );
            return Ok(outcome);
        }

        outcome.chunks = batch.len().div_ceil(self.chunk_size);
        info!(
            request_id = %outcome.request_id,
            scope,
            items = batch.len(),
            chunks = outcome.chunks,
            "Explaining folder"
        );

        for (index, chunk) in batch.chunks(self.chunk_size).enumerate() {
            let names: Vec<String> = chunk.iter().map(|item| item.name.clone()).collect();
            info!(
                request_id = %outcome.request_id,
                chunk = index + 1,
                total = outcome.chunks,
                items = %names.join(", "),
                "Sending chunk"
            );

            let request = ExplainRequest {
                repo: repo.clone(),
                scope: scope.to_string(),
                items: chunk.to_vec(),
                description: description.clone(),
            };

            match self.api.explain(&request).await {
                Ok(response) => {
                    let explanations: ExplanationMap = response
                        .explanations
                        .into_iter()
                        .filter(|(name, _)| names.contains(name))
                        .collect();
                    let unanswered: Vec<String> = names
                        .iter()
                        .filter(|name| !explanations.contains_key(*name))
                        .cloned()
                        .collect();

                    info!(
                        request_id = %outcome.request_id,
                        chunk = index + 1,
                        answered = explanations.len(),
                        unanswered = unanswered.len(),
                        "Chunk applied"
                    );
                    outcome.explained += explanations.len();
                    outcome.unanswered += unanswered.len();
                    outcome.usage += response.usage;

                    let mut state = self.lock();
                    if !explanations.is_empty() {
                        reduce(
                            &mut state,
                            Event::ExplanationsReceived {
                                scope: scope.to_string(),
                                explanations,
                            },
                        );
                    }
                    if !unanswered.is_empty() {
                        reduce(
                            &mut state,
                            Event::BatchUnanswered {
                                scope: scope.to_string(),
                                names: unanswered,
                            },
                        );
                    }
                    record_usage(&mut state, response.usage);
                }
                Err(err) => {
                    let (kind, message) = if err.is_rate_limit() {
                        (FailureKind::RateLimited, explain::RATE_LIMIT_MESSAGE)
                    } else {
                        (FailureKind::Failed, explain::FAILED_PLACEHOLDER)
                    };
                    error!(
                        request_id = %outcome.request_id,
                        chunk = index + 1,
                        error = %err,
                        "Chunk failed"
                    );
                    outcome.failed += names.len();
                    self.dispatch(Event::BatchFailed {
                        scope: scope.to_string(),
                        names,
                        kind,
                        message: message.to_string(),
                    });
                }
            }
        }

        info!(
            request_id = %outcome.request_id,
            explained = outcome.explained,
            unanswered = outcome.unanswered,
            failed = outcome.failed,
            "All chunks complete"
        );
        Ok(outcome)
    }

    /// High-fidelity re-explanation of one item. Failure restores whatever
    /// the item showed before.
    pub async fn request_deep_dive(
        &self,
        scope: &str,
        item: &ExplorerItem,
    ) -> Result<DeepDiveOutcome> {
        let (description, previous, batch_item) = {
            let mut state = self.lock();
            let (_, description) = repo_context(&state)?;
            if state.is_loading(scope, &item.name) {
                debug!(scope, item = %item.name, "Deep dive already in flight");
                return Ok(DeepDiveOutcome::AlreadyInFlight);
            }
            let previous = state
                .item(scope, &item.name)
                .and_then(|view| view.explanation.clone());
            reduce(
                &mut state,
                Event::ItemsMarkedLoading {
                    scope: scope.to_string(),
                    names: vec![item.name.clone()],
                },
            );
            (description, previous, self.batch_item(&state, item))
        };

        let request = DeepDiveRequest {
            item: batch_item,
            path: item.path.clone(),
            description,
        };

        let revert = Event::DeepDiveFailed {
            scope: scope.to_string(),
            name: item.name.clone(),
            previous,
        };

        match self.api.deep_dive(&request).await {
            Ok(response) => {
                let mut state = self.lock();
                record_usage(&mut state, response.usage);
                match response.explanation {
                    Some(text) => {
                        reduce(
                            &mut state,
                            Event::DeepDiveSucceeded {
                                scope: scope.to_string(),
                                name: item.name.clone(),
                                explanation: text.clone(),
                            },
                        );
                        Ok(DeepDiveOutcome::Explained(text))
                    }
                    None => {
                        reduce(&mut state, revert);
                        Ok(DeepDiveOutcome::Unusable)
                    }
                }
            }
            Err(err) => {
                warn!(path = %item.path, error = %err, "Deep dive failed, restoring");
                self.dispatch(revert);
                Err(err)
            }
        }
    }

    fn batch_item(&self, state: &ExplorerState, item: &ExplorerItem) -> BatchItem {
        match item.kind {
            NodeKind::Folder => BatchItem::folder(
                item.name.clone(),
                child_listing(
                    &state.tree,
                    &item.path,
                    state.show_hidden,
                    self.child_listing_cap,
                ),
            ),
            NodeKind::File => BatchItem::file(item.name.clone(), item.extension.clone()),
        }
    }
}

fn repo_context(state: &ExplorerState) -> Result<(RepoId, String)> {
    let meta = state.repo.as_ref().ok_or(GlanceError::NoRepository)?;
    Ok((meta.id.clone(), meta.description.clone()))
}

/// Cache hits report zero usage and leave the ledger untouched
fn record_usage(state: &mut ExplorerState, usage: TokenUsage) {
    if !usage.is_zero() {
        reduce(state, Event::UsageRecorded(usage));
    }
}

// =============================================================================
// Tests
// =============================================================================
