//! Deep Dive Command
//!
//! Longer, high-fidelity explanation of one file or folder.

use crate::ai::{PricingTable, estimate_deep_dive_cost};
use crate::cli::ui::Output;
use crate::cli::util::{CommandContext, approve_spend, locate_item};
use crate::explorer::{DeepDiveOutcome, ExplainApi, Orchestrator};
use crate::types::Result;

pub async fn run(url: &str, path: &str, yes: bool) -> Result<()> {
    let ctx = CommandContext::load()?;
    let output = Output::new();
    let orchestrator = ctx.orchestrator(true);

    orchestrator.load_repo(url).await?;
    deep_dive(&orchestrator, &ctx.config.pricing, &output, path, yes).await?;
    output.ledger(&orchestrator.snapshot().ledger);

    Ok(())
}

pub async fn deep_dive<A: ExplainApi>(
    orchestrator: &Orchestrator<A>,
    pricing: &PricingTable,
    output: &Output,
    path: &str,
    yes: bool,
) -> Result<()> {
    let (_, scope, item) = locate_item(orchestrator, path)?;

    let estimate = estimate_deep_dive_cost(pricing);
    if !approve_spend(output, &estimate, yes)? {
        output.warning("Cancelled");
        return Ok(());
    }

    match orchestrator.request_deep_dive(&scope, &item).await? {
        DeepDiveOutcome::Explained(text) => {
            output.header(&item.path);
            println!("{}", text);
        }
        DeepDiveOutcome::Unusable => {
            output.warning("The AI answered with nothing usable. Try again.");
        }
        DeepDiveOutcome::AlreadyInFlight => {
            output.info("A deep dive for this item is already running");
        }
    }
    Ok(())
}
