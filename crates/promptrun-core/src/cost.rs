//! Cost calculator — token usage × per-model pricing.
//!
//! Pure and deterministic; pricing is expressed per million tokens.

use crate::registry::schema::ModelPricing;
use crate::types::{CostBreakdown, TokenUsage};

const TOKENS_PER_PRICE_UNIT: f64 = 1_000_000.0;

/// Compute the cost breakdown for one call.
pub fn compute(tokens: TokenUsage, pricing: ModelPricing) -> CostBreakdown {
    let prompt = tokens.prompt as f64 / TOKENS_PER_PRICE_UNIT * pricing.prompt_per_million;
    let completion =
        tokens.completion as f64 / TOKENS_PER_PRICE_UNIT * pricing.completion_per_million;
    CostBreakdown {
        prompt,
        completion,
        total: prompt + completion,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cost_linearity() {
        // One million prompt tokens costs exactly the prompt price
        let pricing = ModelPricing {
            prompt_per_million: 2.5,
            completion_per_million: 10.0,
        };
        let cost = compute(TokenUsage::new(1_000_000, 0), pricing);

        assert_eq!(cost.prompt, 2.5);
        assert_eq!(cost.completion, 0.0);
        assert_eq!(cost.total, 2.5);
    }

    #[test]
    fn test_total_is_sum_of_parts() {
        let pricing = ModelPricing {
            prompt_per_million: 3.0,
            completion_per_million: 15.0,
        };
        let cost = compute(TokenUsage::new(200_000, 50_000), pricing);

        assert_eq!(cost.prompt, 0.6);
        assert_eq!(cost.completion, 0.75);
        assert_eq!(cost.total, cost.prompt + cost.completion);
    }

    #[test]
    fn test_zero_tokens_cost_nothing() {
        let pricing = ModelPricing {
            prompt_per_million: 2.5,
            completion_per_million: 10.0,
        };
        assert_eq!(compute(TokenUsage::default(), pricing), CostBreakdown::default());
    }

    #[test]
    fn test_unpriced_model_costs_nothing() {
        let cost = compute(TokenUsage::new(500_000, 500_000), ModelPricing::default());
        assert_eq!(cost.total, 0.0);
    }
}
