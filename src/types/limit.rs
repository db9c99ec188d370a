use std::cmp::Ordering;
use std::fmt;

/// A filed cap on a number of transfers or charge occurrences.
///
/// `Unlimited` compares greater than every `Limited` value, so `max` picks the
/// more permissive of two limits and `saturating_add` keeps `Unlimited`
/// absorbing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum TransferLimit {
    Limited(u16),
    Unlimited,
}

impl TransferLimit {
    /// Whether `count` occurrences stay within the limit.
    #[must_use]
    pub fn allows(self, count: u16) -> bool {
        match self {
            TransferLimit::Limited(max) => count <= max,
            TransferLimit::Unlimited => true,
        }
    }

    #[must_use]
    pub fn is_unlimited(self) -> bool {
        matches!(self, TransferLimit::Unlimited)
    }

    /// The numeric cap, or `None` when unlimited.
    #[must_use]
    pub fn count(self) -> Option<u16> {
        match self {
            TransferLimit::Limited(max) => Some(max),
            TransferLimit::Unlimited => None,
        }
    }

    #[must_use]
    pub fn saturating_add(self, other: TransferLimit) -> TransferLimit {
        match (self, other) {
            (TransferLimit::Limited(a), TransferLimit::Limited(b)) => {
                TransferLimit::Limited(a.saturating_add(b))
            }
            _ => TransferLimit::Unlimited,
        }
    }

    /// Parse a filed count field: `XX` is unlimited, digits are a cap, and a
    /// blank field yields `None`.
    ///
    /// # Errors
    ///
    /// Returns [`ParseError`](crate::parse::ParseError) for anything else.
    pub fn parse_filed(text: &str) -> Result<Option<TransferLimit>, crate::parse::ParseError> {
        crate::parse::parse_limit(text)
    }
}

impl Ord for TransferLimit {
    fn cmp(&self, other: &Self) -> Ordering {
        match (self, other) {
            (TransferLimit::Limited(a), TransferLimit::Limited(b)) => a.cmp(b),
            (TransferLimit::Limited(_), TransferLimit::Unlimited) => Ordering::Less,
            (TransferLimit::Unlimited, TransferLimit::Limited(_)) => Ordering::Greater,
            (TransferLimit::Unlimited, TransferLimit::Unlimited) => Ordering::Equal,
        }
    }
}

impl PartialOrd for TransferLimit {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl fmt::Display for TransferLimit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TransferLimit::Limited(n) => write!(f, "{n}"),
            TransferLimit::Unlimited => write!(f, "XX"),
        }
    }
}
