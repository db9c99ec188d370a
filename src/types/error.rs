use thiserror::Error;

use super::money::CurrencyCode;

/// Failure reported by a [`CurrencyConverter`](crate::CurrencyConverter).
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConversionError {
    #[error("no rate from {from} to {to}")]
    MissingRate { from: CurrencyCode, to: CurrencyCode },

    #[error("conversion from {from} to {to} overflowed")]
    Overflow { from: CurrencyCode, to: CurrencyCode },
}
