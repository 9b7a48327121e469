//! File Command
//!
//! Structured explanation of a single file.

use crate::ai::{PricingTable, estimate_file_cost};
use crate::cli::ui::Output;
use crate::cli::util::{CommandContext, approve_spend, locate_item};
use crate::explorer::{ExplainApi, Orchestrator};
use crate::types::{GlanceError, NodeKind, Result};

pub async fn run(url: &str, path: &str, yes: bool) -> Result<()> {
    let ctx = CommandContext::load()?;
    let output = Output::new();
    let orchestrator = ctx.orchestrator(true);

    orchestrator.load_repo(url).await?;
    show_file(&orchestrator, &ctx.config.pricing, &output, path, yes).await?;
    output.ledger(&orchestrator.snapshot().ledger);

    Ok(())
}

pub async fn show_file<A: ExplainApi>(
    orchestrator: &Orchestrator<A>,
    pricing: &PricingTable,
    output: &Output,
    path: &str,
    yes: bool,
) -> Result<()> {
    let (depth, _, item) = locate_item(orchestrator, path)?;
    if item.kind == NodeKind::Folder {
        return Err(GlanceError::upstream(
            400,
            format!("{} is a folder; explain it instead", item.path),
        ));
    }

    let estimate = estimate_file_cost(item.size.unwrap_or(0), pricing);
    if !approve_spend(output, &estimate, yes)? {
        output.warning("Cancelled");
        return Ok(());
    }

    let detail = orchestrator.select_file(depth, &item.path).await?;
    output.file_detail(&detail);
    Ok(())
}
