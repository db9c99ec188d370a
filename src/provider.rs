use std::collections::{HashMap, HashSet};

use crate::types::{RuleEntry, RuleRecord};

/// Access to filed rule data and the checks that gate whether a record of a
/// relational set participates.
pub trait RuleDataProvider {
    fn rule_record(&self, item_no: u32) -> Option<&RuleRecord>;

    /// Whether the entry's directionality holds for this fare component.
    /// Soft passes count as passes.
    fn direction_passes(&self, _entry: &RuleEntry, _loc_swapped: bool) -> bool {
        true
    }

    /// Whether the record's date-override table says to skip it.
    fn date_override_skips(&self, _record: &RuleRecord) -> bool {
        false
    }
}

/// Rule records held in memory, keyed by item number.
#[derive(Debug, Clone, Default)]
pub struct InMemoryRuleData {
    records: HashMap<u32, RuleRecord>,
    /// Items whose directionality fails when origin and destination are swapped.
    one_way: HashSet<u32>,
    /// Override table items that are out of date.
    expired_overrides: HashSet<u32>,
}

impl InMemoryRuleData {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_record(mut self, record: RuleRecord) -> Self {
        self.insert(record);
        self
    }

    /// Mark `item_no` as applying only in its filed direction.
    #[must_use]
    pub fn with_one_way(mut self, item_no: u32) -> Self {
        self.one_way.insert(item_no);
        self
    }

    /// Mark override table `override_item` as out of date, so records that
    /// reference it are skipped.
    #[must_use]
    pub fn with_expired_override(mut self, override_item: u32) -> Self {
        self.expired_overrides.insert(override_item);
        self
    }

    pub fn insert(&mut self, record: RuleRecord) {
        self.records.insert(record.item_no, record);
    }
}

impl RuleDataProvider for InMemoryRuleData {
    fn rule_record(&self, item_no: u32) -> Option<&RuleRecord> {
        self.records.get(&item_no)
    }

    fn direction_passes(&self, entry: &RuleEntry, loc_swapped: bool) -> bool {
        !(loc_swapped && self.one_way.contains(&entry.item_no))
    }

    fn date_override_skips(&self, record: &RuleRecord) -> bool {
        record
            .override_date_item
            .is_some_and(|item| self.expired_overrides.contains(&item))
    }
}
