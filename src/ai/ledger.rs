//! Usage Ledger
//!
//! Session-wide running totals of tokens spent. Cost is recomputed from the
//! totals at a single rate on every update, so it never drifts from the
//! token counts.

use serde::Serialize;
use std::fmt;

use super::estimator::{TierPricing, format_cost};
use super::provider::TokenUsage;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct UsageLedger {
    input_tokens: u64,
    output_tokens: u64,
    estimated_cost: f64,
    calls: u64,
    #[serde(skip)]
    rate: TierPricing,
}

impl UsageLedger {
    pub fn new(rate: TierPricing) -> Self {
        Self {
            input_tokens: 0,
            output_tokens: 0,
            estimated_cost: 0.0,
            calls: 0,
            rate,
        }
    }

    /// Record one completed provider call
    pub fn add(&mut self, usage: TokenUsage) {
        self.input_tokens = self.input_tokens.saturating_add(usage.input_tokens);
        self.output_tokens = self.output_tokens.saturating_add(usage.output_tokens);
        self.calls += 1;
        self.estimated_cost = self.rate.cost(self.input_tokens, self.output_tokens);
    }

    pub fn reset(&mut self) {
        self.input_tokens = 0;
        self.output_tokens = 0;
        self.estimated_cost = 0.0;
        self.calls = 0;
    }

    pub fn input_tokens(&self) -> u64 {
        self.input_tokens
    }

    pub fn output_tokens(&self) -> u64 {
        self.output_tokens
    }

    pub fn estimated_cost(&self) -> f64 {
        self.estimated_cost
    }

    pub fn calls(&self) -> u64 {
        self.calls
    }

    pub fn totals(&self) -> TokenUsage {
        TokenUsage::new(self.input_tokens, self.output_tokens)
    }

    pub fn is_empty(&self) -> bool {
        self.input_tokens == 0 && self.output_tokens == 0
    }
}

impl Default for UsageLedger {
    fn default() -> Self {
        Self::new(super::estimator::PricingTable::default().ledger)
    }
}

impl fmt::Display for UsageLedger {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_empty() {
            return f.write_str("No tokens used yet");
        }
        write!(
            f,
            "{} in / {} out ({})",
            self.input_tokens,
            self.output_tokens,
            format_cost(self.estimated_cost)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_add_accumulates_and_prices_totals() {
        let mut ledger = UsageLedger::default();
        ledger.add(TokenUsage::new(1000, 200));
        ledger.add(TokenUsage::new(500, 100));

        assert_eq!(ledger.input_tokens(), 1500);
        assert_eq!(ledger.output_tokens(), 300);
        assert_eq!(ledger.calls(), 2);
        // 1500 * 3 + 300 * 15 = 9000 micro-dollars
        assert!((ledger.estimated_cost() - 0.009).abs() < 1e-12);
    }

    #[test]
    fn test_reset_zeroes_everything() {
        let mut ledger = UsageLedger::default();
        ledger.add(TokenUsage::new(123, 456));
        ledger.reset();

        assert_eq!(ledger.input_tokens(), 0);
        assert_eq!(ledger.output_tokens(), 0);
        assert_eq!(ledger.estimated_cost(), 0.0);
        assert!(ledger.is_empty());
    }

    #[test]
    fn test_display() {
        let mut ledger = UsageLedger::default();
        assert_eq!(ledger.to_string(), "No tokens used yet");

        ledger.add(TokenUsage::new(100_000, 10_000));
        assert_eq!(ledger.to_string(), "100000 in / 10000 out (~$0.45)");
    }

    proptest! {
        #[test]
        fn prop_totals_equal_sum_of_adds(calls in proptest::collection::vec((0u64..1_000_000, 0u64..1_000_000), 0..50)) {
            let mut ledger = UsageLedger::default();
            let mut prev = TokenUsage::default();
            for (input, output) in &calls {
                ledger.add(TokenUsage::new(*input, *output));
                prop_assert!(ledger.input_tokens() >= prev.input_tokens);
                prop_assert!(ledger.output_tokens() >= prev.output_tokens);
                prev = ledger.totals();
            }

            let expected_in: u64 = calls.iter().map(|(i, _)| i).sum();
            let expected_out: u64 = calls.iter().map(|(_, o)| o).sum();
            prop_assert_eq!(ledger.input_tokens(), expected_in);
            prop_assert_eq!(ledger.output_tokens(), expected_out);

            ledger.reset();
            prop_assert_eq!(ledger.totals(), TokenUsage::default());
            prop_assert_eq!(ledger.estimated_cost(), 0.0);
        }
    }
}
