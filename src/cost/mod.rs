//! Request cost estimation
//!
//! Token counts use the ceil(len/4) heuristic over the prompt's byte length.
//! The same formula feeds the per-request budget filter and the mock client's
//! cost accounting; after a real call the provider-reported cost is what gets
//! charged.

use crate::config::ProviderSpec;

/// Estimate the token count of a prompt
pub fn estimate_tokens(prompt: &str) -> u64 {
    (prompt.len() as u64).div_ceil(4)
}

/// Estimated cost of sending `prompt` to `spec`, in USD
pub fn estimate(prompt: &str, spec: &ProviderSpec) -> f64 {
    estimate_tokens(prompt) as f64 * spec.cost_per_token
}
