//! Estimate Command
//!
//! Print a cost projection without calling anything.

use crate::ai::{estimate_bulk_cost, estimate_deep_dive_cost, estimate_file_cost};
use crate::cli::ui::Output;
use crate::config::ConfigLoader;
use crate::types::Result;

#[derive(Debug, Clone, Copy)]
pub enum EstimateTarget {
    Bulk { items: usize },
    File { bytes: u64 },
    DeepDive,
}

pub fn run(target: EstimateTarget) -> Result<()> {
    let config = ConfigLoader::load()?;
    let estimate = match target {
        EstimateTarget::Bulk { items } => estimate_bulk_cost(items, &config.pricing),
        EstimateTarget::File { bytes } => estimate_file_cost(bytes, &config.pricing),
        EstimateTarget::DeepDive => estimate_deep_dive_cost(&config.pricing),
    };

    Output::new().estimate(&estimate);
    Ok(())
}
