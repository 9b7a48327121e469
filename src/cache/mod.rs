//! Explanation Cache
//!
//! Process-wide memoization of AI explanations so that identical requests
//! are served without a provider call.

mod clock;
mod key;
mod store;

pub use clock::{Clock, ManualClock, SystemClock};
pub use key::CacheKey;
pub use store::{CacheStats, ExplanationStore, StoreConfig};
