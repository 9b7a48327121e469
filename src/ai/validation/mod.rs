//! AI Response Validation
//!
//! Model output is loosely-typed text. Everything downstream consumes it
//! through [`extract_json_from_response`], which either yields a JSON value
//! or an explicit [`UnparseablePayload`].

mod json_repair;

pub use json_repair::{JsonRepairer, UnparseablePayload, extract_json_from_response};
