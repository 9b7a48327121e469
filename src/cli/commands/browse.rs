//! Browse Command
//!
//! List one folder of a repository. Talks to GitHub only; nothing is spent.

use crate::cli::ui::Output;
use crate::cli::util::{CommandContext, open_folder};
use crate::explorer::{ExplainApi, Orchestrator};
use crate::types::Result;

pub async fn run(url: &str, path: &str, all: bool) -> Result<()> {
    let ctx = CommandContext::load_for_browsing()?;
    let output = Output::new();
    let orchestrator = ctx.orchestrator(all);

    orchestrator.load_repo(url).await?;
    if let Some(meta) = orchestrator.snapshot().repo {
        output.header(&format!("{} ★ {}", meta.id, meta.stars));
        if !meta.description.is_empty() {
            println!("{}", meta.description);
        }
    }

    let scope = open_folder(&orchestrator, path)?;
    list_folder(&orchestrator, &output, &scope);
    Ok(())
}

/// Print `scope`'s column with whatever explanations it already has
pub fn list_folder<A: ExplainApi>(orchestrator: &Orchestrator<A>, output: &Output, scope: &str) {
    let state = orchestrator.snapshot();
    output.section(if scope.is_empty() { "/" } else { scope });

    let Some(column) = state.column(scope).filter(|col| !col.items.is_empty()) else {
        output.info("Nothing to show here");
        return;
    };
    for view in &column.items {
        if view.explanation.is_some() {
            output.item_view(view);
        } else {
            output.item(&view.item);
        }
    }
}
