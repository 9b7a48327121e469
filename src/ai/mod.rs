//! AI Integration Layer
//!
//! Provider access, prompt construction, cost estimation and usage tracking
//! for plain-English repository explanations.

pub mod estimator;
pub mod explainer;
pub mod ledger;
pub mod prompt;
pub mod provider;
pub mod validation;

pub use estimator::{
    CostEstimate, PricingTable, TierPricing, estimate_bulk_cost, estimate_deep_dive_cost,
    estimate_file_cost, format_cost,
};
pub use explainer::{
    BatchItem, Dependency, Explained, ExplanationMap, Explainer, FileInsights, KeyPoint,
    ProviderOutput,
};
pub use ledger::UsageLedger;
pub use provider::{
    AnthropicProvider, CompletionRequest, DisabledProvider, LlmProvider, LlmResponse,
    ProviderConfig, SharedProvider, TokenUsage, create_provider,
};
pub use validation::{JsonRepairer, UnparseablePayload, extract_json_from_response};
