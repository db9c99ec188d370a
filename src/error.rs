use thiserror::Error;

use crate::parse::ParseError;
use crate::ConversionError;

/// Unified error type covering filed-text parsing and currency conversion.
///
/// Returned by convenience methods like
/// [`RelationalRuleSet::from_filing()`](crate::RelationalRuleSet::from_filing).
#[derive(Debug, Error)]
pub enum TransferRuleError {
    #[error(transparent)]
    Parse(#[from] ParseError),

    #[error(transparent)]
    Conversion(#[from] ConversionError),
}
