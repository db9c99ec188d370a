use std::fmt;

use rust_decimal::{Decimal, RoundingStrategy};

/// Three-letter currency code, e.g. `USD` or the neutral unit `NUC`.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CurrencyCode(String);

impl CurrencyCode {
    #[must_use]
    pub fn new(code: impl Into<String>) -> Self {
        Self(code.into())
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for CurrencyCode {
    fn from(code: &str) -> Self {
        Self(code.to_owned())
    }
}

impl fmt::Display for CurrencyCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// An amount in a specific currency, carrying that currency's native precision.
///
/// Every charge the engine handles flows through this type: filed charges,
/// discounted amounts, reference-currency comparisons and the committed
/// surcharges in the itinerary's calculation currency.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Money {
    amount: Decimal,
    currency: CurrencyCode,
    decimals: u32,
}

impl Money {
    #[must_use]
    pub fn new(amount: Decimal, currency: impl Into<CurrencyCode>, decimals: u32) -> Self {
        Self {
            amount,
            currency: currency.into(),
            decimals,
        }
    }

    /// A zero amount in the given currency.
    #[must_use]
    pub fn zero(currency: impl Into<CurrencyCode>, decimals: u32) -> Self {
        Self::new(Decimal::ZERO, currency, decimals)
    }

    #[must_use]
    pub fn amount(&self) -> Decimal {
        self.amount
    }

    #[must_use]
    pub fn currency(&self) -> &CurrencyCode {
        &self.currency
    }

    #[must_use]
    pub fn decimals(&self) -> u32 {
        self.decimals
    }

    #[must_use]
    pub fn is_zero(&self) -> bool {
        self.amount.is_zero()
    }

    #[must_use]
    pub fn is_in(&self, currency: &CurrencyCode) -> bool {
        &self.currency == currency
    }

    /// Drop digits beyond the currency's native precision (rounding toward zero).
    #[must_use]
    pub fn truncated(&self) -> Self {
        Self {
            amount: self
                .amount
                .round_dp_with_strategy(self.decimals, RoundingStrategy::ToZero),
            currency: self.currency.clone(),
            decimals: self.decimals,
        }
    }

    /// Multiply the amount, keeping currency and precision.
    #[must_use]
    pub fn scaled(&self, multiplier: Decimal) -> Self {
        Self {
            amount: self.amount * multiplier,
            currency: self.currency.clone(),
            decimals: self.decimals,
        }
    }
}

impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let shown = self
            .amount
            .round_dp_with_strategy(self.decimals, RoundingStrategy::ToZero);
        write!(f, "{shown} {}", self.currency)
    }
}
