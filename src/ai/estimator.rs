//! Cost Estimator
//!
//! Pre-flight token and dollar projections, shown before the user commits to
//! a paid call. Pure and deterministic: identical inputs give identical
//! estimates.
//!
//! The heuristics are rough on purpose. Being within 2x is good enough to
//! tell "a fraction of a cent" from "a few dollars".

use serde::{Deserialize, Serialize};

use crate::constants::{estimate, pricing};

// =============================================================================
// Pricing Table
// =============================================================================

/// Per-tier price in dollars per million tokens
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TierPricing {
    /// Display label ("Haiku", "Sonnet")
    pub label: String,
    pub input_per_mtok: f64,
    pub output_per_mtok: f64,
}

impl TierPricing {
    pub fn cost(&self, input_tokens: u64, output_tokens: u64) -> f64 {
        (input_tokens as f64 * self.input_per_mtok + output_tokens as f64 * self.output_per_mtok)
            / 1_000_000.0
    }
}

/// Pricing for every tier plus the rate the usage ledger charges at
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PricingTable {
    pub bulk: TierPricing,
    pub detail: TierPricing,
    /// Single rate applied to session totals
    pub ledger: TierPricing,
}

impl Default for PricingTable {
    fn default() -> Self {
        let detail = TierPricing {
            label: pricing::DETAIL_LABEL.to_string(),
            input_per_mtok: pricing::DETAIL_INPUT_PER_MTOK,
            output_per_mtok: pricing::DETAIL_OUTPUT_PER_MTOK,
        };
        Self {
            bulk: TierPricing {
                label: pricing::BULK_LABEL.to_string(),
                input_per_mtok: pricing::BULK_INPUT_PER_MTOK,
                output_per_mtok: pricing::BULK_OUTPUT_PER_MTOK,
            },
            ledger: TierPricing {
                label: "Blended".to_string(),
                ..detail.clone()
            },
            detail,
        }
    }
}

impl PricingTable {
    /// Every price must be finite and non-negative
    pub fn validate(&self) -> Result<(), String> {
        for (tier, p) in [("bulk", &self.bulk), ("detail", &self.detail), ("ledger", &self.ledger)] {
            for (side, price) in [("input", p.input_per_mtok), ("output", p.output_per_mtok)] {
                if !price.is_finite() || price < 0.0 {
                    return Err(format!(
                        "pricing.{}.{}_per_mtok must be a non-negative number, got {}",
                        tier, side, price
                    ));
                }
            }
        }
        Ok(())
    }
}

// =============================================================================
// Estimates
// =============================================================================

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CostEstimate {
    pub input_tokens: u64,
    pub output_tokens: u64,
    pub estimated_cost: f64,
    pub item_count: usize,
    /// Tier label the estimate was priced at
    pub tier_label: String,
    /// "3 items", "1 file", "Deep dive"
    pub description: String,
    /// Rough wall-clock hint
    pub estimated_seconds: u64,
}

impl CostEstimate {
    pub fn is_free(&self) -> bool {
        self.input_tokens == 0 && self.output_tokens == 0
    }
}

/// Bulk tier: per-call overhead plus a fixed allowance per item.
///
/// Zero items is a valid request that costs nothing.
pub fn estimate_bulk_cost(item_count: usize, table: &PricingTable) -> CostEstimate {
    let description = format!("{} item{}", item_count, if item_count == 1 { "" } else { "s" });

    if item_count == 0 {
        return CostEstimate {
            input_tokens: 0,
            output_tokens: 0,
            estimated_cost: 0.0,
            item_count: 0,
            tier_label: table.bulk.label.clone(),
            description,
            estimated_seconds: 0,
        };
    }

    let n = item_count as u64;
    let input_tokens = n
        .saturating_mul(estimate::BULK_INPUT_PER_ITEM)
        .saturating_add(estimate::BULK_CALL_OVERHEAD);
    let output_tokens = n.saturating_mul(estimate::BULK_OUTPUT_PER_ITEM);

    CostEstimate {
        input_tokens,
        output_tokens,
        estimated_cost: table.bulk.cost(input_tokens, output_tokens),
        item_count,
        tier_label: table.bulk.label.clone(),
        description,
        estimated_seconds: n
            .saturating_mul(estimate::BULK_SECONDS_PER_ITEM)
            .max(estimate::BULK_MIN_SECONDS),
    }
}

/// File tier: content tokens are capped at what survives truncation
pub fn estimate_file_cost(size_bytes: u64, table: &PricingTable) -> CostEstimate {
    let content_tokens = size_bytes
        .div_ceil(estimate::BYTES_PER_TOKEN)
        .min(estimate::FILE_CONTENT_TOKEN_CAP);
    let input_tokens = estimate::FILE_CALL_OVERHEAD + content_tokens;
    let output_tokens = estimate::FILE_OUTPUT_TOKENS;

    CostEstimate {
        input_tokens,
        output_tokens,
        estimated_cost: table.detail.cost(input_tokens, output_tokens),
        item_count: 1,
        tier_label: table.detail.label.clone(),
        description: "1 file".to_string(),
        estimated_seconds: estimate::FILE_SECONDS,
    }
}

pub fn estimate_deep_dive_cost(table: &PricingTable) -> CostEstimate {
    let input_tokens = estimate::DEEP_DIVE_INPUT_TOKENS;
    let output_tokens = estimate::DEEP_DIVE_OUTPUT_TOKENS;

    CostEstimate {
        input_tokens,
        output_tokens,
        estimated_cost: table.detail.cost(input_tokens, output_tokens),
        item_count: 1,
        tier_label: table.detail.label.clone(),
        description: "Deep dive".to_string(),
        estimated_seconds: estimate::DEEP_DIVE_SECONDS,
    }
}

/// `<$0.01` below a cent, `~$x.xx` otherwise
pub fn format_cost(cost: f64) -> String {
    if cost < pricing::NEGLIGIBLE_COST {
        "<$0.01".to_string()
    } else {
        format!("~${:.2}", cost)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_bulk_estimate_five_items() {
        let table = PricingTable::default();
        let estimate = estimate_bulk_cost(5, &table);

        assert_eq!(estimate.input_tokens, 1100);
        assert_eq!(estimate.output_tokens, 750);
        assert_eq!(estimate.item_count, 5);
        assert_eq!(estimate.tier_label, "Haiku");
        assert_eq!(estimate.description, "5 items");
        assert_eq!(estimate.estimated_seconds, 10);
        assert!((estimate.estimated_cost - 0.00388).abs() < 1e-12);
    }

    #[test]
    fn test_bulk_estimate_is_deterministic() {
        let table = PricingTable::default();
        let a = estimate_bulk_cost(5, &table);
        let b = estimate_bulk_cost(5, &table);
        assert_eq!(a, b);
        assert_eq!(a.estimated_cost.to_bits(), b.estimated_cost.to_bits());
    }

    #[test]
    fn test_bulk_estimate_zero_items() {
        let estimate = estimate_bulk_cost(0, &PricingTable::default());
        assert_eq!(estimate.input_tokens, 0);
        assert_eq!(estimate.output_tokens, 0);
        assert_eq!(estimate.estimated_cost, 0.0);
        assert!(estimate.is_free());
        assert_eq!(estimate.description, "0 items");
    }

    #[test]
    fn test_bulk_estimate_singular_description() {
        let estimate = estimate_bulk_cost(1, &PricingTable::default());
        assert_eq!(estimate.description, "1 item");
        assert_eq!(estimate.estimated_seconds, 2);
    }

    #[test]
    fn test_bulk_estimate_huge_count_saturates() {
        let estimate = estimate_bulk_cost(usize::MAX, &PricingTable::default());
        assert_eq!(estimate.input_tokens, u64::MAX);
        assert_eq!(estimate.output_tokens, u64::MAX);
        assert_eq!(estimate.estimated_seconds, u64::MAX);
        assert!(estimate.estimated_cost.is_finite());
        assert!(estimate.estimated_cost > 0.0);
    }

    #[test]
    fn test_file_estimate_max_size() {
        let estimate = estimate_file_cost(u64::MAX, &PricingTable::default());
        assert_eq!(estimate.input_tokens, 200 + 3750);
    }

    #[test]
    fn test_file_estimate_rounds_up_and_caps() {
        let table = PricingTable::default();

        let small = estimate_file_cost(10, &table);
        assert_eq!(small.input_tokens, 200 + 3);
        assert_eq!(small.output_tokens, 500);
        assert_eq!(small.tier_label, "Sonnet");

        let huge = estimate_file_cost(10_000_000, &table);
        assert_eq!(huge.input_tokens, 200 + 3750);

        let empty = estimate_file_cost(0, &table);
        assert_eq!(empty.input_tokens, 200);
    }

    #[test]
    fn test_deep_dive_estimate() {
        let estimate = estimate_deep_dive_cost(&PricingTable::default());
        assert_eq!(estimate.input_tokens, 200);
        assert_eq!(estimate.output_tokens, 300);
        assert_eq!(estimate.estimated_seconds, 5);
        assert!((estimate.estimated_cost - 0.0051).abs() < 1e-12);
    }

    #[test]
    fn test_detail_tier_costs_more_per_token() {
        let table = PricingTable::default();
        assert!(table.detail.cost(1000, 1000) > table.bulk.cost(1000, 1000));
    }

    #[test]
    fn test_format_cost() {
        assert_eq!(format_cost(0.0), "<$0.01");
        assert_eq!(format_cost(0.0099), "<$0.01");
        assert_eq!(format_cost(0.01), "~$0.01");
        assert_eq!(format_cost(1.234), "~$1.23");
    }

    #[test]
    fn test_pricing_validation() {
        let mut table = PricingTable::default();
        assert!(table.validate().is_ok());

        table.bulk.output_per_mtok = -1.0;
        let err = table.validate().unwrap_err();
        assert!(err.contains("pricing.bulk.output_per_mtok"));
    }

    proptest! {
        #[test]
        fn prop_bulk_estimate_grows_with_items(n in 0usize..10_000) {
            let table = PricingTable::default();
            let a = estimate_bulk_cost(n, &table);
            let b = estimate_bulk_cost(n + 1, &table);
            prop_assert!(b.input_tokens > a.input_tokens);
            prop_assert!(b.estimated_cost > a.estimated_cost);
        }
    }
}
