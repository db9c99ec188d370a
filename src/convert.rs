use std::collections::HashMap;

use rust_decimal::{Decimal, RoundingStrategy};
use tracing::warn;

use crate::types::{ConversionError, CurrencyCode, Money};

/// Currency conversion capability supplied by the caller.
pub trait CurrencyConverter {
    /// Convert `money` into `to`. The result carries the target currency's
    /// native precision.
    ///
    /// # Errors
    ///
    /// Returns [`ConversionError`] when no rate is known for either currency
    /// or the arithmetic overflows.
    fn convert(
        &self,
        money: &Money,
        to: &CurrencyCode,
        international_rounding: bool,
    ) -> Result<Money, ConversionError>;
}

/// Convert, falling back to a zero amount in `to` when the converter fails.
pub fn convert_or_zero(
    converter: &dyn CurrencyConverter,
    money: &Money,
    to: &CurrencyCode,
    decimals: u32,
    international_rounding: bool,
) -> Money {
    if money.is_in(to) {
        return money.clone();
    }
    match converter.convert(money, to, international_rounding) {
        Ok(converted) => converted,
        Err(e) => {
            warn!(error = %e, amount = %money, "Conversion failed, using zero");
            Money::zero(to.clone(), decimals)
        }
    }
}

#[derive(Debug, Clone, Copy)]
struct Rate {
    per_reference_unit: Decimal,
    decimals: u32,
}

/// Fixed rates against one reference unit.
///
/// Each rate is the number of currency units per reference unit, so converting
/// divides by the source rate and multiplies by the target rate.
#[derive(Debug, Clone)]
pub struct RateTable {
    reference: CurrencyCode,
    rates: HashMap<CurrencyCode, Rate>,
}

impl RateTable {
    /// A table holding only the reference currency itself, at two decimals.
    #[must_use]
    pub fn new(reference: impl Into<CurrencyCode>) -> Self {
        let reference = reference.into();
        let mut rates = HashMap::new();
        rates.insert(
            reference.clone(),
            Rate {
                per_reference_unit: Decimal::ONE,
                decimals: 2,
            },
        );
        Self { reference, rates }
    }

    #[must_use]
    pub fn with_rate(mut self, currency: impl Into<CurrencyCode>, per_reference_unit: Decimal, decimals: u32) -> Self {
        self.rates.insert(
            currency.into(),
            Rate {
                per_reference_unit,
                decimals,
            },
        );
        self
    }

    #[must_use]
    pub fn reference(&self) -> &CurrencyCode {
        &self.reference
    }

    #[must_use]
    pub fn decimals(&self, currency: &CurrencyCode) -> Option<u32> {
        self.rates.get(currency).map(|r| r.decimals)
    }

    fn rate(&self, from: &CurrencyCode, to: &CurrencyCode, currency: &CurrencyCode) -> Result<Rate, ConversionError> {
        self.rates
            .get(currency)
            .copied()
            .filter(|r| !r.per_reference_unit.is_zero())
            .ok_or_else(|| ConversionError::MissingRate {
                from: from.clone(),
                to: to.clone(),
            })
    }
}

impl CurrencyConverter for RateTable {
    fn convert(
        &self,
        money: &Money,
        to: &CurrencyCode,
        international_rounding: bool,
    ) -> Result<Money, ConversionError> {
        let from = money.currency();
        let source = self.rate(from, to, from)?;
        let target = self.rate(from, to, to)?;
        if from == to {
            return Ok(Money::new(money.amount(), to.clone(), target.decimals));
        }

        let overflow = || ConversionError::Overflow {
            from: from.clone(),
            to: to.clone(),
        };
        let amount = money
            .amount()
            .checked_div(source.per_reference_unit)
            .and_then(|units| units.checked_mul(target.per_reference_unit))
            .ok_or_else(overflow)?;

        // International rounding never undercharges.
        let strategy = if international_rounding {
            RoundingStrategy::AwayFromZero
        } else {
            RoundingStrategy::MidpointAwayFromZero
        };
        Ok(Money::new(
            amount.round_dp_with_strategy(target.decimals, strategy),
            to.clone(),
            target.decimals,
        ))
    }
}
