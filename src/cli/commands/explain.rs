//! Explain Command
//!
//! Bulk-explain every item of one folder, chunk by chunk.

use crate::ai::{PricingTable, estimate_bulk_cost};
use crate::cli::ui::Output;
use crate::cli::util::{CommandContext, approve_spend, open_folder};
use crate::explorer::{ExplainApi, Orchestrator};
use crate::types::Result;

pub async fn run(url: &str, path: &str, all: bool, yes: bool) -> Result<()> {
    let ctx = CommandContext::load()?;
    let output = Output::new();
    let orchestrator = ctx.orchestrator(all);

    orchestrator.load_repo(url).await?;
    let scope = open_folder(&orchestrator, path)?;
    explain_folder(&orchestrator, &ctx.config.pricing, &output, &scope, yes).await?;
    output.ledger(&orchestrator.snapshot().ledger);

    Ok(())
}

/// Estimate, confirm, then explain everything listed in `scope`'s column
pub async fn explain_folder<A: ExplainApi>(
    orchestrator: &Orchestrator<A>,
    pricing: &PricingTable,
    output: &Output,
    scope: &str,
    yes: bool,
) -> Result<()> {
    let state = orchestrator.snapshot();
    let items: Vec<_> = state
        .column(scope)
        .map(|col| col.items.iter().map(|view| view.item.clone()).collect())
        .unwrap_or_default();
    if items.is_empty() {
        output.info("Nothing to explain here");
        return Ok(());
    }

    let uncached = items
        .iter()
        .filter(|item| {
            !state.is_loading(scope, &item.name)
                && state.deep_dive_text(scope, &item.name).is_none()
                && state.cached_explanation(scope, &item.name).is_none()
        })
        .count();
    let estimate = estimate_bulk_cost(uncached, pricing);
    if !approve_spend(output, &estimate, yes)? {
        output.warning("Cancelled");
        return Ok(());
    }

    let outcome = orchestrator.request_explanations(scope, &items).await?;

    let state = orchestrator.snapshot();
    output.section(if scope.is_empty() { "/" } else { scope });
    if let Some(column) = state.column(scope) {
        for view in &column.items {
            output.item_view(view);
        }
    }

    if outcome.failed > 0 {
        output.warning(&format!("{} item(s) could not be explained", outcome.failed));
    }
    if outcome.unanswered > 0 {
        output.warning(&format!(
            "{} item(s) got no answer; run again to retry them",
            outcome.unanswered
        ));
    }

    Ok(())
}
