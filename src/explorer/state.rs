//! Explorer State
//!
//! Everything the column browser shows, changed only through [`reduce`].
//! The reducer is synchronous and never performs I/O; the orchestrator owns
//! the awaits and feeds their results back in as [`Event`]s.

use std::collections::{BTreeMap, HashMap, HashSet};

use crate::ai::{ExplanationMap, TokenUsage, UsageLedger};
use crate::constants::explain;
use crate::service::FileDetail;
use crate::source::children_at_path;
use crate::types::{ExplorerItem, RepoMeta, TreeNode};

// =============================================================================
// State
// =============================================================================

/// Why an item ended without a fresh explanation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureKind {
    /// The response succeeded but did not mention this item
    Unanswered,
    /// Transport or provider error for the item's chunk
    Failed,
    RateLimited,
}

/// One row of a column
#[derive(Debug, Clone, PartialEq)]
pub struct ItemView {
    pub item: ExplorerItem,
    pub explanation: Option<String>,
    pub loading: bool,
    /// Produced by the high-fidelity tier
    pub deep_dive: bool,
    pub failure: Option<FailureKind>,
}

impl ItemView {
    pub fn new(item: ExplorerItem) -> Self {
        Self {
            item,
            explanation: None,
            loading: false,
            deep_dive: false,
            failure: None,
        }
    }

    pub fn name(&self) -> &str {
        &self.item.name
    }
}

/// One open folder
#[derive(Debug, Clone, PartialEq)]
pub struct Column {
    /// Folder path; `""` for the repository root
    pub path: String,
    pub items: Vec<ItemView>,
    /// Path of the selected child, if any
    pub selected: Option<String>,
}

impl Column {
    fn item_mut(&mut self, name: &str) -> Option<&mut ItemView> {
        self.items.iter_mut().find(|view| view.item.name == name)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct FileDetailView {
    pub detail: FileDetail,
    pub loading: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ExplorerState {
    pub repo: Option<RepoMeta>,
    pub tree: Vec<TreeNode>,
    pub columns: Vec<Column>,
    pub file_detail: Option<FileDetailView>,
    pub show_hidden: bool,
    pub loading_repo: bool,
    pub error: Option<String>,
    /// Client mirror of answered explanations: scope -> name -> text
    pub explanations: HashMap<String, BTreeMap<String, String>>,
    /// Deep-dive answers, shown in place of the bulk text: scope -> name -> text
    pub deep_dives: HashMap<String, BTreeMap<String, String>>,
    /// Items with an outstanding request: scope -> names. Outlives the
    /// columns, so a reopened folder still knows what is pending.
    pub in_flight: HashMap<String, HashSet<String>>,
    pub ledger: UsageLedger,
}

impl Default for ExplorerState {
    fn default() -> Self {
        Self::new(UsageLedger::default())
    }
}

impl ExplorerState {
    pub fn new(ledger: UsageLedger) -> Self {
        Self {
            repo: None,
            tree: Vec::new(),
            columns: Vec::new(),
            file_detail: None,
            show_hidden: false,
            loading_repo: false,
            error: None,
            explanations: HashMap::new(),
            deep_dives: HashMap::new(),
            in_flight: HashMap::new(),
            ledger,
        }
    }

    pub fn with_hidden(mut self, show_hidden: bool) -> Self {
        self.show_hidden = show_hidden;
        self
    }

    pub fn column(&self, scope: &str) -> Option<&Column> {
        self.columns.iter().find(|col| col.path == scope)
    }

    pub fn item(&self, scope: &str, name: &str) -> Option<&ItemView> {
        self.column(scope)?
            .items
            .iter()
            .find(|view| view.item.name == name)
    }

    pub fn cached_explanation(&self, scope: &str, name: &str) -> Option<&str> {
        self.explanations
            .get(scope)
            .and_then(|names| names.get(name))
            .map(String::as_str)
    }

    pub fn deep_dive_text(&self, scope: &str, name: &str) -> Option<&str> {
        self.deep_dives
            .get(scope)
            .and_then(|names| names.get(name))
            .map(String::as_str)
    }

    pub fn is_loading(&self, scope: &str, name: &str) -> bool {
        self.in_flight
            .get(scope)
            .is_some_and(|names| names.contains(name))
    }

    fn settle(&mut self, scope: &str, names: impl IntoIterator<Item = impl AsRef<str>>) {
        if let Some(pending) = self.in_flight.get_mut(scope) {
            for name in names {
                pending.remove(name.as_ref());
            }
            if pending.is_empty() {
                self.in_flight.remove(scope);
            }
        }
    }

    /// Items of `scope` that still show a loading indicator
    pub fn loading_items(&self, scope: &str) -> Vec<&str> {
        self.column(scope)
            .map(|col| {
                col.items
                    .iter()
                    .filter(|view| view.loading)
                    .map(ItemView::name)
                    .collect()
            })
            .unwrap_or_default()
    }

    fn columns_for(&mut self, scope: &str) -> impl Iterator<Item = &mut Column> {
        self.columns.iter_mut().filter(move |col| col.path == scope)
    }

    /// Fresh column for `path`, with mirrored explanations and pending
    /// requests applied
    fn build_column(&self, path: &str) -> Column {
        let items = children_at_path(&self.tree, path, self.show_hidden)
            .into_iter()
            .map(|item| {
                let deep = self.deep_dive_text(path, &item.name);
                let explanation = deep
                    .or_else(|| self.cached_explanation(path, &item.name))
                    .map(str::to_string);
                ItemView {
                    explanation,
                    loading: self.is_loading(path, &item.name),
                    deep_dive: deep.is_some(),
                    ..ItemView::new(item)
                }
            })
            .collect();

        Column {
            path: path.to_string(),
            items,
            selected: None,
        }
    }
}

// =============================================================================
// Events
// =============================================================================

#[derive(Debug, Clone, PartialEq)]
pub enum Event {
    RepoLoadStarted,
    RepoLoaded {
        meta: RepoMeta,
        tree: Vec<TreeNode>,
    },
    RepoLoadFailed(String),

    /// Open the folder at `path` from column `depth`
    FolderSelected {
        depth: usize,
        path: String,
    },
    FileSelected {
        depth: usize,
        path: String,
    },
    FileDetailLoaded(FileDetail),
    FileDetailFailed {
        path: String,
        message: String,
    },

    ItemsMarkedLoading {
        scope: String,
        names: Vec<String>,
    },
    /// Explanations for named items, from the mirror or a successful chunk
    ExplanationsReceived {
        scope: String,
        explanations: ExplanationMap,
    },
    /// A successful chunk that did not mention these names
    BatchUnanswered {
        scope: String,
        names: Vec<String>,
    },
    BatchFailed {
        scope: String,
        names: Vec<String>,
        kind: FailureKind,
        message: String,
    },

    DeepDiveSucceeded {
        scope: String,
        name: String,
        explanation: String,
    },
    /// Restores the explanation shown before the deep dive started
    DeepDiveFailed {
        scope: String,
        name: String,
        previous: Option<String>,
    },

    UsageRecorded(TokenUsage),
    LedgerReset,
    HiddenToggled,
    NavigatedToDepth(usize),
}

// =============================================================================
// Reducer
// =============================================================================

pub fn reduce(state: &mut ExplorerState, event: Event) {
    match event {
        Event::RepoLoadStarted => {
            state.loading_repo = true;
            state.error = None;
        }

        Event::RepoLoadFailed(message) => {
            state.loading_repo = false;
            state.error = Some(message);
        }

        Event::RepoLoaded { meta, tree } => {
            state.repo = Some(meta);
            state.tree = tree;
            // Mirror keys are folder paths only; a new repository starts clean
            state.explanations.clear();
            state.deep_dives.clear();
            state.in_flight.clear();
            state.columns = vec![state.build_column("")];
            state.file_detail = None;
            state.loading_repo = false;
            state.error = None;
        }

        Event::FolderSelected { depth, path } => {
            select_in_column(state, depth, &path);
            let column = state.build_column(&path);
            state.columns.push(column);
            state.file_detail = None;
        }

        Event::FileSelected { depth, path } => {
            select_in_column(state, depth, &path);
            state.file_detail = Some(FileDetailView {
                detail: FileDetail::placeholder(&path, ""),
                loading: true,
            });
        }

        Event::FileDetailLoaded(detail) => {
            // Ignore results for a file the user already navigated away from
            if let Some(view) = state.file_detail.as_mut()
                && view.detail.path == detail.path
            {
                view.detail = detail;
                view.loading = false;
            }
        }

        Event::FileDetailFailed { path, message } => {
            if let Some(view) = state.file_detail.as_mut()
                && view.detail.path == path
            {
                view.detail = FileDetail::placeholder(&path, message);
                view.loading = false;
            }
        }

        Event::ItemsMarkedLoading { scope, names } => {
            state
                .in_flight
                .entry(scope.clone())
                .or_default()
                .extend(names.iter().cloned());
            for column in state.columns_for(&scope) {
                for name in &names {
                    if let Some(view) = column.item_mut(name) {
                        view.loading = true;
                    }
                }
            }
        }

        Event::ExplanationsReceived {
            scope,
            explanations,
        } => {
            for column in state.columns_for(&scope) {
                for (name, text) in &explanations {
                    if let Some(view) = column.item_mut(name) {
                        view.explanation = Some(text.clone());
                        view.loading = false;
                        view.deep_dive = false;
                        view.failure = None;
                    }
                }
            }
            state.settle(&scope, explanations.keys());
            state
                .explanations
                .entry(scope)
                .or_default()
                .extend(explanations);
        }

        Event::BatchUnanswered { scope, names } => {
            state.settle(&scope, &names);
            for column in state.columns_for(&scope) {
                for name in &names {
                    if let Some(view) = column.item_mut(name) {
                        view.loading = false;
                        view.failure = Some(FailureKind::Unanswered);
                        if view.explanation.is_none() {
                            view.explanation = Some(explain::UNANSWERED_PLACEHOLDER.to_string());
                        }
                    }
                }
            }
        }

        Event::BatchFailed {
            scope,
            names,
            kind,
            message,
        } => {
            state.settle(&scope, &names);
            for column in state.columns_for(&scope) {
                for name in &names {
                    if let Some(view) = column.item_mut(name) {
                        view.loading = false;
                        view.failure = Some(kind);
                        view.explanation = Some(message.clone());
                    }
                }
            }
        }

        Event::DeepDiveSucceeded {
            scope,
            name,
            explanation,
        } => {
            state.settle(&scope, [&name]);
            for column in state.columns_for(&scope) {
                if let Some(view) = column.item_mut(&name) {
                    view.explanation = Some(explanation.clone());
                    view.loading = false;
                    view.deep_dive = true;
                    view.failure = None;
                }
            }
            state
                .deep_dives
                .entry(scope)
                .or_default()
                .insert(name, explanation);
        }

        Event::DeepDiveFailed {
            scope,
            name,
            previous,
        } => {
            state.settle(&scope, [&name]);
            for column in state.columns_for(&scope) {
                if let Some(view) = column.item_mut(&name) {
                    view.explanation = previous.clone();
                    view.loading = false;
                }
            }
        }

        Event::UsageRecorded(usage) => state.ledger.add(usage),

        Event::LedgerReset => state.ledger.reset(),

        Event::HiddenToggled => {
            state.show_hidden = !state.show_hidden;
            let previous = std::mem::take(&mut state.columns);
            let rebuilt: Vec<Column> = previous
                .into_iter()
                .map(|old| {
                    let mut column = state.build_column(&old.path);
                    column.selected = old.selected;
                    // Keep placeholder rows as they were
                    for view in &mut column.items {
                        if let Some(prior) = old.items.iter().find(|p| p.item.name == view.item.name)
                        {
                            view.explanation = prior.explanation.clone();
                            view.deep_dive = prior.deep_dive;
                            view.failure = prior.failure;
                        }
                    }
                    column
                })
                .collect();
            state.columns = rebuilt;
        }

        Event::NavigatedToDepth(depth) => {
            state.columns.truncate(depth + 1);
            if let Some(column) = state.columns.get_mut(depth) {
                column.selected = None;
            }
            state.file_detail = None;
        }
    }
}

/// Drop columns right of `depth` and mark `path` selected in column `depth`
fn select_in_column(state: &mut ExplorerState, depth: usize, path: &str) {
    state.columns.truncate(depth + 1);
    if let Some(column) = state.columns.get_mut(depth) {
        column.selected = Some(path.to_string());
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{NodeKind, RepoId};

    fn node(path: &str, kind: NodeKind) -> TreeNode {
        TreeNode {
            path: path.to_string(),
            kind,
            sha: String::new(),
            size: None,
        }
    }

    fn loaded() -> ExplorerState {
        let mut state = ExplorerState::default();
        reduce(
            &mut state,
            Event::RepoLoaded {
                meta: RepoMeta {
                    id: RepoId::new("octo", "demo"),
                    description: String::new(),
                    default_branch: "main".to_string(),
                    stars: 0,
                    language: String::new(),
                },
                tree: vec![
                    node("src", NodeKind::Folder),
                    node("src/main.rs", NodeKind::File),
                    node("src/lib.rs", NodeKind::File),
                    node("node_modules", NodeKind::Folder),
                    node("README.md", NodeKind::File),
                ],
            },
        );
        state
    }

    fn map(pairs: &[(&str, &str)]) -> ExplanationMap {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn test_repo_loaded_builds_root_column() {
        let state = loaded();
        assert_eq!(state.columns.len(), 1);
        let names: Vec<&str> = state.columns[0].items.iter().map(ItemView::name).collect();
        assert_eq!(names, vec!["src", "README.md"]);
        assert!(!state.loading_repo);
    }

    #[test]
    fn test_repo_load_failure_is_blocking_error() {
        let mut state = ExplorerState::default();
        reduce(&mut state, Event::RepoLoadStarted);
        assert!(state.loading_repo);
        reduce(&mut state, Event::RepoLoadFailed("Repository not found.".into()));
        assert!(!state.loading_repo);
        assert_eq!(state.error.as_deref(), Some("Repository not found."));
    }

    #[test]
    fn test_loading_cleared_only_for_answered_names() {
        let mut state = loaded();
        reduce(
            &mut state,
            Event::ItemsMarkedLoading {
                scope: String::new(),
                names: vec!["src".into(), "README.md".into()],
            },
        );
        reduce(
            &mut state,
            Event::ExplanationsReceived {
                scope: String::new(),
                explanations: map(&[("src", "The code")]),
            },
        );

        assert!(!state.is_loading("", "src"));
        assert!(state.is_loading("", "README.md"));
        assert_eq!(state.cached_explanation("", "src"), Some("The code"));
    }

    #[test]
    fn test_unanswered_keeps_prior_explanation() {
        let mut state = loaded();
        reduce(
            &mut state,
            Event::ExplanationsReceived {
                scope: String::new(),
                explanations: map(&[("src", "Earlier")]),
            },
        );
        reduce(
            &mut state,
            Event::BatchUnanswered {
                scope: String::new(),
                names: vec!["src".into(), "README.md".into()],
            },
        );

        let src = state.item("", "src").unwrap();
        assert_eq!(src.explanation.as_deref(), Some("Earlier"));
        assert_eq!(src.failure, Some(FailureKind::Unanswered));

        let readme = state.item("", "README.md").unwrap();
        assert_eq!(
            readme.explanation.as_deref(),
            Some(explain::UNANSWERED_PLACEHOLDER)
        );
        assert!(!readme.loading);
        assert_eq!(state.cached_explanation("", "README.md"), None);
    }

    #[test]
    fn test_failed_items_are_not_mirrored() {
        let mut state = loaded();
        reduce(
            &mut state,
            Event::BatchFailed {
                scope: String::new(),
                names: vec!["src".into()],
                kind: FailureKind::Failed,
                message: explain::FAILED_PLACEHOLDER.into(),
            },
        );

        let src = state.item("", "src").unwrap();
        assert_eq!(src.explanation.as_deref(), Some(explain::FAILED_PLACEHOLDER));
        assert!(!src.loading);
        assert!(state.explanations.is_empty());
    }

    #[test]
    fn test_folder_selection_applies_mirror_and_truncates() {
        let mut state = loaded();
        reduce(
            &mut state,
            Event::FolderSelected {
                depth: 0,
                path: "src".into(),
            },
        );
        reduce(
            &mut state,
            Event::ExplanationsReceived {
                scope: "src".into(),
                explanations: map(&[("main.rs", "Starts it")]),
            },
        );
        reduce(&mut state, Event::NavigatedToDepth(0));
        assert_eq!(state.columns.len(), 1);
        assert_eq!(state.columns[0].selected, None);

        reduce(
            &mut state,
            Event::FolderSelected {
                depth: 0,
                path: "src".into(),
            },
        );
        assert_eq!(state.columns.len(), 2);
        assert_eq!(state.columns[0].selected.as_deref(), Some("src"));
        assert_eq!(
            state.item("src", "main.rs").unwrap().explanation.as_deref(),
            Some("Starts it")
        );
        assert_eq!(state.item("src", "lib.rs").unwrap().explanation, None);
    }

    #[test]
    fn test_file_detail_for_stale_path_is_ignored() {
        let mut state = loaded();
        reduce(
            &mut state,
            Event::FileSelected {
                depth: 0,
                path: "README.md".into(),
            },
        );
        assert!(state.file_detail.as_ref().unwrap().loading);

        reduce(
            &mut state,
            Event::FileDetailLoaded(FileDetail::placeholder("src/main.rs", "other")),
        );
        assert!(state.file_detail.as_ref().unwrap().loading);

        reduce(
            &mut state,
            Event::FileDetailFailed {
                path: "README.md".into(),
                message: "Failed to load file details.".into(),
            },
        );
        let view = state.file_detail.as_ref().unwrap();
        assert!(!view.loading);
        assert_eq!(view.detail.summary, "Failed to load file details.");
    }

    #[test]
    fn test_deep_dive_failure_restores_previous() {
        let mut state = loaded();
        reduce(
            &mut state,
            Event::ExplanationsReceived {
                scope: String::new(),
                explanations: map(&[("src", "Short")]),
            },
        );
        reduce(
            &mut state,
            Event::ItemsMarkedLoading {
                scope: String::new(),
                names: vec!["src".into()],
            },
        );
        reduce(
            &mut state,
            Event::DeepDiveFailed {
                scope: String::new(),
                name: "src".into(),
                previous: Some("Short".into()),
            },
        );

        let src = state.item("", "src").unwrap();
        assert_eq!(src.explanation.as_deref(), Some("Short"));
        assert!(!src.loading);
        assert!(!src.deep_dive);
    }

    #[test]
    fn test_toggle_hidden_rebuilds_and_keeps_rows() {
        let mut state = loaded();
        reduce(
            &mut state,
            Event::ItemsMarkedLoading {
                scope: String::new(),
                names: vec!["src".into()],
            },
        );
        reduce(&mut state, Event::HiddenToggled);

        assert!(state.show_hidden);
        assert!(state.item("", "node_modules").is_some());
        assert!(state.is_loading("", "src"));

        reduce(&mut state, Event::HiddenToggled);
        assert!(state.item("", "node_modules").is_none());
    }

    #[test]
    fn test_new_repo_clears_mirror_but_not_ledger() {
        let mut state = loaded();
        reduce(
            &mut state,
            Event::ExplanationsReceived {
                scope: String::new(),
                explanations: map(&[("src", "Code")]),
            },
        );
        reduce(&mut state, Event::UsageRecorded(TokenUsage::new(10, 5)));

        let meta = state.repo.clone().unwrap();
        reduce(
            &mut state,
            Event::RepoLoaded {
                meta,
                tree: Vec::new(),
            },
        );
        assert!(state.explanations.is_empty());
        assert_eq!(state.ledger.input_tokens(), 10);

        reduce(&mut state, Event::LedgerReset);
        assert!(state.ledger.is_empty());
    }

    #[test]
    fn test_reopened_folder_restores_pending_and_deep_dive() {
        let mut state = loaded();
        let open_src = |state: &mut ExplorerState| {
            reduce(
                state,
                Event::FolderSelected {
                    depth: 0,
                    path: "src".into(),
                },
            )
        };
        open_src(&mut state);
        reduce(
            &mut state,
            Event::ItemsMarkedLoading {
                scope: "src".into(),
                names: vec!["main.rs".into(), "lib.rs".into()],
            },
        );
        reduce(
            &mut state,
            Event::DeepDiveSucceeded {
                scope: "src".into(),
                name: "lib.rs".into(),
                explanation: "Long".into(),
            },
        );

        reduce(&mut state, Event::NavigatedToDepth(0));
        open_src(&mut state);

        let main = state.item("src", "main.rs").unwrap();
        assert!(main.loading);
        assert!(state.is_loading("src", "main.rs"));

        let lib = state.item("src", "lib.rs").unwrap();
        assert!(!lib.loading);
        assert!(lib.deep_dive);
        assert_eq!(lib.explanation.as_deref(), Some("Long"));

        reduce(
            &mut state,
            Event::BatchFailed {
                scope: "src".into(),
                names: vec!["main.rs".into()],
                kind: FailureKind::Failed,
                message: explain::FAILED_PLACEHOLDER.into(),
            },
        );
        assert!(!state.is_loading("src", "main.rs"));
        assert!(state.in_flight.is_empty());
    }

    #[test]
    fn test_new_repo_forgets_pending_requests() {
        let mut state = loaded();
        reduce(
            &mut state,
            Event::ItemsMarkedLoading {
                scope: String::new(),
                names: vec!["src".into()],
            },
        );
        let meta = state.repo.clone().unwrap();
        let tree = state.tree.clone();
        reduce(&mut state, Event::RepoLoaded { meta, tree });

        assert!(!state.is_loading("", "src"));
        assert!(!state.item("", "src").unwrap().loading);
    }
}
