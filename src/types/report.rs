use std::fmt;

use super::pricing::{FareUsageId, SegmentId};

/// Per-segment result as shown in transfer diagnostics.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum SegmentStatus {
    Pass,
    /// Passed without any governing item.
    NotApplicable,
    /// Passed on the least-restrictive cap without a direct match.
    LeastRestrictive,
    /// Failed with a matched item.
    Fail,
    /// Failed because no item matched.
    NoMatch,
    /// Not passed but tolerated for now.
    Pending,
    MaxExceeded,
    /// Command pricing only: the in/out total was exceeded.
    InOutOnly,
}

impl fmt::Display for SegmentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            SegmentStatus::Pass => "PASS",
            SegmentStatus::NotApplicable => "N/A",
            SegmentStatus::LeastRestrictive => "LEAST RESTRICTIVE",
            SegmentStatus::Fail => "FAIL",
            SegmentStatus::NoMatch => "NO MATCH",
            SegmentStatus::Pending => "----",
            SegmentStatus::MaxExceeded => "MAX EXCEEDED",
            SegmentStatus::InOutOnly => "I/O ONLY",
        };
        f.write_str(s)
    }
}

/// Whether a segment was judged across the pricing unit or within its fare component.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Scope {
    PricingUnit,
    FareComponent,
}

impl fmt::Display for Scope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Scope::PricingUnit => write!(f, "PU"),
            Scope::FareComponent => write!(f, "FC"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SegmentOutcome {
    pub segment: SegmentId,
    pub fare_usage: FareUsageId,
    pub is_transfer: bool,
    pub status: SegmentStatus,
    pub item_no: Option<u32>,
    pub scope: Scope,
}

impl fmt::Display for SegmentOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:>3} ", self.segment.0)?;
        f.write_str(if self.is_transfer { "TFR " } else { "    " })?;
        write!(f, "{}", self.status)?;
        if let Some(item) = self.item_no {
            write!(f, " {item}")?;
        }
        write!(f, " {}", self.scope)
    }
}

/// Structured summary of a validation run, one outcome per tracked segment
/// in itinerary order.
///
/// Returned by [`TransferValidator::report()`](crate::TransferValidator::report).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[must_use]
pub struct ValidationReport {
    outcomes: Vec<SegmentOutcome>,
}

impl ValidationReport {
    pub(crate) fn new(outcomes: Vec<SegmentOutcome>) -> Self {
        Self { outcomes }
    }

    #[must_use]
    pub fn outcomes(&self) -> &[SegmentOutcome] {
        &self.outcomes
    }

    #[must_use]
    pub fn outcome(&self, segment: SegmentId) -> Option<&SegmentOutcome> {
        self.outcomes.iter().find(|o| o.segment == segment)
    }

    /// Transfer outcomes only.
    pub fn transfers(&self) -> impl Iterator<Item = &SegmentOutcome> {
        self.outcomes.iter().filter(|o| o.is_transfer)
    }

    /// Whether any transfer ended in a failing status.
    #[must_use]
    pub fn has_failures(&self) -> bool {
        self.transfers().any(|o| {
            matches!(
                o.status,
                SegmentStatus::Fail
                    | SegmentStatus::NoMatch
                    | SegmentStatus::MaxExceeded
                    | SegmentStatus::InOutOnly
            )
        })
    }
}

impl fmt::Display for ValidationReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, outcome) in self.outcomes.iter().enumerate() {
            if i > 0 {
                writeln!(f)?;
            }
            write!(f, "{outcome}")?;
        }
        Ok(())
    }
}
