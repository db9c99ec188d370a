use std::collections::BTreeSet;

use crate::provider::RuleDataProvider;
use crate::types::{CategoryRule, CurrencyCode, FareUsageId, TransferLimit};

/// Engine-wide settings.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct EngineConfig {
    /// Neutral unit used to compare charges filed in different currencies and
    /// to apply passenger discounts.
    pub reference_currency: CurrencyCode,
    pub reference_decimals: u32,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            reference_currency: CurrencyCode::new("NUC"),
            reference_decimals: 2,
        }
    }
}

/// Output of the rule-set preprocessor for one pricing unit.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct Preprocessing {
    pub apply_least_restrictive: bool,
    pub least_restrictive_cap: TransferLimit,
    pub fc_scope: bool,
    pub fails_pu: bool,
    pub category_rule: Option<CategoryRule>,
    pub pu_scope_fare_usages: BTreeSet<FareUsageId>,
}

impl Default for Preprocessing {
    fn default() -> Self {
        Self {
            apply_least_restrictive: false,
            least_restrictive_cap: TransferLimit::Unlimited,
            fc_scope: false,
            fails_pu: false,
            category_rule: None,
            pu_scope_fare_usages: BTreeSet::new(),
        }
    }
}

impl Preprocessing {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_least_restrictive(mut self, cap: TransferLimit) -> Self {
        self.apply_least_restrictive = true;
        self.least_restrictive_cap = cap;
        self
    }

    #[must_use]
    pub fn with_category_rule(mut self, rule: CategoryRule) -> Self {
        self.category_rule = Some(rule);
        self
    }

    #[must_use]
    pub fn with_pu_scope(mut self, fare_usage: FareUsageId) -> Self {
        self.pu_scope_fare_usages.insert(fare_usage);
        self
    }

    #[must_use]
    pub fn with_fc_scope(mut self, fc_scope: bool) -> Self {
        self.fc_scope = fc_scope;
        self
    }

    #[must_use]
    pub fn with_fails_pu(mut self, fails_pu: bool) -> Self {
        self.fails_pu = fails_pu;
        self
    }

    /// Enable least-restrictive provisioning with the cap derived from the
    /// category rule: AND members sum, OR members and separate sets take the
    /// most permissive. Entries that fail directionality or are skipped by
    /// their date override do not count; blank counts read as unlimited.
    ///
    /// Without a category rule, or when nothing contributes, the settings are
    /// left unchanged.
    #[must_use]
    pub fn with_derived_least_restrictive(self, provider: &dyn RuleDataProvider, loc_swapped: bool) -> Self {
        let cap = self.category_rule.as_ref().and_then(|rule| {
            rule.fold_cap(|entry| {
                if !provider.direction_passes(entry, loc_swapped) {
                    return None;
                }
                provider
                    .rule_record(entry.item_no)
                    .filter(|record| !provider.date_override_skips(record))
                    .map(|record| record.effective_max_transfers())
            })
        });
        match cap {
            Some(cap) => self.with_least_restrictive(cap),
            None => self,
        }
    }

    #[must_use]
    pub fn has_pu_scope(&self, fare_usage: FareUsageId) -> bool {
        self.pu_scope_fare_usages.contains(&fare_usage)
    }
}
