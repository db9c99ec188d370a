use std::collections::BTreeMap;

use super::money::Money;
use super::pricing::{FareUsageId, SegmentId};
use super::record::RuleLocator;

/// Item number recorded for a transfer that no rule item governs but that is
/// nevertheless accepted (shown as not applicable).
pub const NOT_APPLICABLE_ITEM: u32 = u32::MAX;

/// The rule that governs a transfer segment.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct RuleMatch {
    pub item_no: u32,
    pub locator: RuleLocator,
    /// `true` when matched through the fare rule, `false` for the general rule.
    pub fare_rule: bool,
}

/// Match progress of a transfer segment.
///
/// `Tentative` may be upgraded to `Definite`; a `Definite` match is final.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum MatchState {
    #[default]
    Unmatched,
    Tentative(RuleMatch),
    Definite(RuleMatch),
}

impl MatchState {
    #[must_use]
    pub fn rule_match(&self) -> Option<&RuleMatch> {
        match self {
            MatchState::Unmatched => None,
            MatchState::Tentative(m) | MatchState::Definite(m) => Some(m),
        }
    }

    #[must_use]
    pub fn item_no(&self) -> Option<u32> {
        self.rule_match().map(|m| m.item_no)
    }

    #[must_use]
    pub fn is_matched(&self) -> bool {
        !matches!(self, MatchState::Unmatched)
    }

    #[must_use]
    pub fn is_definite(&self) -> bool {
        matches!(self, MatchState::Definite(_))
    }

    #[must_use]
    pub fn is_tentative(&self) -> bool {
        matches!(self, MatchState::Tentative(_))
    }
}

/// Outcome of [`SegmentState::record_match`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatchTransition {
    Recorded,
    Upgraded,
    Kept,
}

/// Which pricing-unit total a segment pushed over its cap.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum MaxExceeded {
    TotalMax,
    TotalInOut,
}

/// A charge recorded against a transfer segment, not yet committed to the
/// fare usage.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Surcharge {
    /// Amount to commit; already in the reference currency when the filed
    /// slot or a discount needed converting.
    pub amount: Money,
    /// The filed-currency amount, after any discount.
    pub local: Money,
    pub is_segment_specific: bool,
    pub is_primary_charge: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SegmentState {
    pub segment: SegmentId,
    pub fare_usage: FareUsageId,
    pub is_transfer: bool,
    pub validate_entire_rule: bool,
    pub match_state: MatchState,
    pub passed_validation: bool,
    pub passed_by_least_restrictive: bool,
    pub recurring_fc_scope: bool,
    pub no_match_tolerant: bool,
    pub max_exceeded: Option<MaxExceeded>,
    pub surcharges: Vec<Surcharge>,
}

impl SegmentState {
    #[must_use]
    pub fn new(segment: SegmentId, fare_usage: FareUsageId) -> Self {
        Self {
            segment,
            fare_usage,
            is_transfer: false,
            validate_entire_rule: false,
            match_state: MatchState::Unmatched,
            passed_validation: false,
            passed_by_least_restrictive: false,
            recurring_fc_scope: false,
            no_match_tolerant: false,
            max_exceeded: None,
            surcharges: Vec::new(),
        }
    }

    /// Apply a rule match. An unmatched segment takes any match; a tentative
    /// match yields to a definite one, dropping its surcharges and pass flag;
    /// anything else is kept as is.
    pub fn record_match(&mut self, rule_match: RuleMatch, tentative: bool) -> MatchTransition {
        let next = if tentative {
            MatchState::Tentative(rule_match)
        } else {
            MatchState::Definite(rule_match)
        };

        match (&self.match_state, tentative) {
            (MatchState::Unmatched, _) => {
                self.match_state = next;
                self.passed_validation = false;
                MatchTransition::Recorded
            }
            (MatchState::Tentative(_), false) => {
                self.surcharges.clear();
                self.match_state = next;
                self.passed_validation = false;
                MatchTransition::Upgraded
            }
            _ => MatchTransition::Kept,
        }
    }
}

/// Segment states keyed by itinerary position, created on first reference.
#[derive(Debug, Clone, Default)]
pub struct SegmentTable {
    states: BTreeMap<SegmentId, SegmentState>,
}

impl SegmentTable {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// The state for `segment`, created for `fare_usage` if absent. An existing
    /// state keeps its original owner.
    pub fn entry(&mut self, segment: SegmentId, fare_usage: FareUsageId) -> &mut SegmentState {
        self.states
            .entry(segment)
            .or_insert_with(|| SegmentState::new(segment, fare_usage))
    }

    #[must_use]
    pub fn get(&self, segment: SegmentId) -> Option<&SegmentState> {
        self.states.get(&segment)
    }

    pub fn get_mut(&mut self, segment: SegmentId) -> Option<&mut SegmentState> {
        self.states.get_mut(&segment)
    }

    /// States in itinerary order.
    pub fn iter(&self) -> impl Iterator<Item = &SegmentState> {
        self.states.values()
    }

    /// Transfer segments in itinerary order.
    pub fn transfers(&self) -> impl Iterator<Item = &SegmentState> {
        self.states.values().filter(|s| s.is_transfer)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.states.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.states.is_empty()
    }

    pub fn clear(&mut self) {
        self.states.clear();
    }
}
