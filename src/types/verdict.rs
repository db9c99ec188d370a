use std::fmt;

/// Outcome of a fare-component or segment-level validation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[must_use]
pub enum Verdict {
    Pass,
    Fail,
    /// Passed so far; the pricing-unit pass decides.
    SoftPass,
}

impl Verdict {
    #[must_use]
    pub fn is_fail(self) -> bool {
        self == Verdict::Fail
    }
}

impl fmt::Display for Verdict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Verdict::Pass => write!(f, "PASS"),
            Verdict::Fail => write!(f, "FAIL"),
            Verdict::SoftPass => write!(f, "SOFTPASS"),
        }
    }
}

/// Outcome of pricing-unit finalization for one fare usage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[must_use]
pub enum UnitVerdict {
    Pass,
    Fail,
    /// Validation failed for a command-priced fare; charges were still
    /// computed so they can be quoted, but the itinerary is not valid.
    QuoteOnly,
}

impl UnitVerdict {
    #[must_use]
    pub fn is_pass(self) -> bool {
        self == UnitVerdict::Pass
    }
}

impl fmt::Display for UnitVerdict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            UnitVerdict::Pass => write!(f, "PASS"),
            UnitVerdict::Fail => write!(f, "FAIL"),
            UnitVerdict::QuoteOnly => write!(f, "QUOTE ONLY"),
        }
    }
}
