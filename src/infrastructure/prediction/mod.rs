// Profit estimation

use rust_decimal::Decimal;
use std::sync::Arc;

use crate::domain::models::ProfitPrediction;
use crate::domain::service::{ProfitEstimator, RandomSource};

pub const MIN_PROFIT_PERCENT: f64 = -5.0;
pub const MAX_PROFIT_PERCENT: f64 = 15.0;
pub const MIN_CONFIDENCE: f64 = 0.5;
pub const MAX_CONFIDENCE: f64 = 0.99;

/// Placeholder model: profit percent uniform in `[-5, 15)`, confidence
/// uniform in `[0.5, 0.99)`. Symbol and price do not influence the draw.
pub struct MockProfitEstimator {
    rng: Arc<dyn RandomSource>,
}

impl MockProfitEstimator {
    pub fn new(rng: Arc<dyn RandomSource>) -> Self {
        Self { rng }
    }
}

impl ProfitEstimator for MockProfitEstimator {
    fn predict_profit(&self, symbol: &str, current_price: Decimal) -> ProfitPrediction {
        let profit_percent = self.rng.uniform(MIN_PROFIT_PERCENT, MAX_PROFIT_PERCENT);
        let confidence = self.rng.uniform(MIN_CONFIDENCE, MAX_CONFIDENCE);

        log::debug!(
            "Predicted {:.2}% on {} @ {} (confidence {:.2})",
            profit_percent,
            symbol,
            current_price,
            confidence
        );

        ProfitPrediction {
            profit_percent,
            confidence,
        }
    }
}
