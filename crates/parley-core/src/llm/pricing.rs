//! Cost estimation from registry pricing.
//!
//! Cost estimates are clearly labeled as approximate (`~$0.12`).

use parley_types::llm::Usage;

use super::registry::ModelRegistry;

/// Compute cost in USD given token counts and per-million rates.
pub fn compute_cost(
    input_tokens: u32,
    output_tokens: u32,
    input_cost_per_million: f64,
    output_cost_per_million: f64,
) -> f64 {
    let input_cost = (input_tokens as f64 / 1_000_000.0) * input_cost_per_million;
    let output_cost = (output_tokens as f64 / 1_000_000.0) * output_cost_per_million;
    input_cost + output_cost
}

/// Estimate the USD cost of `usage` on `model`.
///
/// Returns `None` when the registry has no pricing for the model, so an
/// unknown model is never reported as free.
pub fn estimate_cost(registry: &ModelRegistry, model: &str, usage: &Usage) -> Option<f64> {
    let (input, output) = registry.get_model_pricing(model).ok()?;
    Some(compute_cost(
        usage.prompt_tokens,
        usage.completion_tokens,
        input,
        output,
    ))
}

/// Format a cost estimate as a human-readable string.
///
/// Always prefixed with `~` to indicate the value is an estimate.
/// - Costs below $0.01 use 3 decimal places: `~$0.001`
/// - Costs $0.01 and above use 2 decimal places: `~$0.12`
pub fn format_cost(cost: f64) -> String {
    if cost < 0.01 {
        format!("~${cost:.3}")
    } else {
        format!("~${cost:.2}")
    }
}
