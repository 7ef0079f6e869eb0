//! Progression ratio: percentage bound to multiplicative growth factor

use rust_decimal::Decimal;
use rust_decimal_macros::dec;

use crate::config::ProgressionRules;
use crate::error::CalculationError;

/// Convert a progression percentage into a growth factor
///
/// `percent` must lie within `[rules.min_percent, rules.max_percent]`; the
/// result is `1 + percent / 100` (0 → 1.00, 5 → 1.05, 20 → 1.20).
pub fn calculate_progression_ratio(
    percent: i64,
    rules: &ProgressionRules,
) -> Result<Decimal, CalculationError> {
    if percent < rules.min_percent || percent > rules.max_percent {
        return Err(CalculationError::OutOfRange {
            field: "progression percentage".to_string(),
            value: percent,
            min: rules.min_percent,
            max: rules.max_percent,
        });
    }

    Ok(dec!(1) + Decimal::from(percent) / dec!(100))
}
