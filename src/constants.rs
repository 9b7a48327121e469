//! Global Constants
//!
//! Centralized constants for configuration and tuning.
//! All magic numbers should be defined here with documentation.

/// Pricing defaults ($ per 1M tokens)
///
/// These seed `PricingTable::default()`; the live values come from config.
pub mod pricing {
    /// Bulk tier (short multi-item explanations)
    pub const BULK_LABEL: &str = "Haiku";
    pub const BULK_INPUT_PER_MTOK: f64 = 0.80;
    pub const BULK_OUTPUT_PER_MTOK: f64 = 4.0;

    /// High-fidelity tier (file detail and deep dives)
    pub const DETAIL_LABEL: &str = "Sonnet";
    pub const DETAIL_INPUT_PER_MTOK: f64 = 3.0;
    pub const DETAIL_OUTPUT_PER_MTOK: f64 = 15.0;

    /// Below this, costs are displayed as "<$0.01"
    pub const NEGLIGIBLE_COST: f64 = 0.01;
}

/// Default model identifiers per tier
pub mod models {
    pub const BULK_MODEL: &str = "claude-haiku-4-5-20251001";
    pub const DETAIL_MODEL: &str = "claude-sonnet-4-5-20250929";
}

/// Token heuristics used by the cost estimator
///
/// Rough numbers; within 2x of reality is good enough for a pre-flight prompt.
pub mod estimate {
    /// Shared system prompt overhead per bulk call
    pub const BULK_CALL_OVERHEAD: u64 = 100;
    /// Prompt tokens per item (name, type, child listing)
    pub const BULK_INPUT_PER_ITEM: u64 = 200;
    /// Output tokens per item (1-2 sentences)
    pub const BULK_OUTPUT_PER_ITEM: u64 = 150;

    /// Bytes of source per token
    pub const BYTES_PER_TOKEN: u64 = 4;
    /// Prompt overhead for a file explanation
    pub const FILE_CALL_OVERHEAD: u64 = 200;
    /// Content tokens after truncation (15,000 chars / 4)
    pub const FILE_CONTENT_TOKEN_CAP: u64 = 3750;
    /// Output tokens for a file explanation
    pub const FILE_OUTPUT_TOKENS: u64 = 500;

    pub const DEEP_DIVE_INPUT_TOKENS: u64 = 200;
    pub const DEEP_DIVE_OUTPUT_TOKENS: u64 = 300;

    /// Wall-clock hints shown next to an estimate (seconds)
    pub const BULK_SECONDS_PER_ITEM: u64 = 2;
    pub const BULK_MIN_SECONDS: u64 = 2;
    pub const FILE_SECONDS: u64 = 8;
    pub const DEEP_DIVE_SECONDS: u64 = 5;
}

/// Server-side cache constants
pub mod cache {
    /// Maximum entries per store
    pub const MAX_ENTRIES: usize = 5000;

    /// Entry lifetime (30 minutes)
    pub const TTL_SECS: u64 = 30 * 60;
}

/// Batch explain constants
pub mod explain {
    /// Items per provider call. Kept small so results stream in and the
    /// structured output stays parseable.
    pub const CHUNK_SIZE: usize = 2;

    /// Child names shown in a folder's auxiliary context
    pub const CHILD_LISTING_CAP: usize = 10;

    /// Minimum `max_tokens` for a bulk call
    pub const BULK_MIN_MAX_TOKENS: u32 = 512;
    /// Additional `max_tokens` per bulk item
    pub const BULK_MAX_TOKENS_PER_ITEM: u32 = 100;
    pub const SINGLE_MAX_TOKENS: u32 = 500;
    pub const FILE_MAX_TOKENS: u32 = 1500;

    /// Placeholder for items whose chunk failed
    pub const FAILED_PLACEHOLDER: &str = "Unable to explain this item.";
    /// Placeholder for items a successful response did not mention
    pub const UNANSWERED_PLACEHOLDER: &str = "No explanation came back for this item. Try again.";
    /// Shown when the provider signals a rate limit
    pub const RATE_LIMIT_MESSAGE: &str =
        "AI rate limit reached. Please wait a moment and try again.";
}

/// File content handling
pub mod content {
    /// Lines sent to the provider
    pub const MAX_LINES: usize = 500;
    /// Characters sent to the provider
    pub const MAX_CHARS: usize = 15_000;
    /// Appended when content was cut
    pub const TRUNCATION_MARKER: &str = "\n... (truncated)";

    /// Prefix inspected for binary detection
    pub const BINARY_SNIFF_BYTES: usize = 1000;
    /// Share of control bytes above which content counts as binary
    pub const BINARY_CONTROL_RATIO: f64 = 0.10;

    pub const BINARY_SUMMARY: &str =
        "This is a binary file (like an image or compiled code). It's not human-readable text.";
    pub const BINARY_NOTE: &str = "Binary files can't be displayed as text. They contain data in a format that only specific programs can read.";
    pub const BINARY_CONTENT: &str = "[Binary file - cannot display as text]";

    /// Fallback when the provider output cannot be parsed
    pub const UNEXPLAINED_SUMMARY: &str = "Unable to generate explanation for this file.";
}

/// HTTP/Network constants
pub mod network {
    /// Default request timeout (seconds)
    pub const DEFAULT_TIMEOUT_SECS: u64 = 120;

    pub const GITHUB_API_BASE: &str = "https://api.github.com";
    pub const ANTHROPIC_API_BASE: &str = "https://api.anthropic.com/v1";
    pub const ANTHROPIC_VERSION: &str = "2023-06-01";

    pub const USER_AGENT: &str = concat!("repoglance/", env!("CARGO_PKG_VERSION"));
}
