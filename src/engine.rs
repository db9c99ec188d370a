use tracing::{debug, error};

use crate::charge::ChargeSelector;
use crate::config::{EngineConfig, Preprocessing};
use crate::convert::CurrencyConverter;
use crate::provider::RuleDataProvider;
use crate::types::{
    FarePath, FareUsageId, MatchState, MatchTransition, MaxExceeded, PricingUnit, Relation,
    RelationalRuleSet, RuleLocator, RuleMatch, RuleRecord, Scope, SegmentId, SegmentOutcome,
    SegmentState, SegmentStatus, SegmentTable, Surcharge, TransferLimit, TransferSurcharge,
    UnitVerdict, ValidationReport, Verdict, NOT_APPLICABLE_ITEM,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SegmentCheck {
    Passed,
    /// Passed apart from matches that are still tentative.
    Tentative,
    Failed,
}

/// A charge counted against the bound rule's occurrence caps.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct CountedCharge {
    item_no: u32,
    primary: bool,
}

/// Validates transfers against the bound transfer rule and accumulates the
/// surcharges they owe.
///
/// One validator serves one rule evaluation over one itinerary. Segment state
/// persists across [`finalize_component`](Self::finalize_component) and
/// [`finalize_pricing_unit`](Self::finalize_pricing_unit) until
/// [`clear_results`](Self::clear_results).
pub struct TransferValidator<'a> {
    provider: &'a dyn RuleDataProvider,
    converter: &'a dyn CurrencyConverter,
    config: EngineConfig,
    pre: Preprocessing,

    fc_scope: bool,
    fails_pu: bool,
    ignore_no_match: bool,
    locator: RuleLocator,
    is_fare_rule: bool,
    relation_and: bool,
    relation_or: bool,

    record: Option<RuleRecord>,
    max_transfers: TransferLimit,
    committed: Vec<CountedCharge>,
    charge1_count: u16,
    charge2_count: u16,

    segments: SegmentTable,
    current_fare_usage: Option<FareUsageId>,
    need_to_process: bool,
}

impl<'a> TransferValidator<'a> {
    #[must_use]
    pub fn new(provider: &'a dyn RuleDataProvider, converter: &'a dyn CurrencyConverter) -> Self {
        Self {
            provider,
            converter,
            config: EngineConfig::default(),
            pre: Preprocessing::default(),
            fc_scope: false,
            fails_pu: false,
            ignore_no_match: false,
            locator: RuleLocator::default(),
            is_fare_rule: true,
            relation_and: false,
            relation_or: false,
            record: None,
            max_transfers: TransferLimit::Unlimited,
            committed: Vec::new(),
            charge1_count: 0,
            charge2_count: 0,
            segments: SegmentTable::new(),
            current_fare_usage: None,
            need_to_process: false,
        }
    }

    #[must_use]
    pub fn with_config(mut self, config: EngineConfig) -> Self {
        self.config = config;
        self
    }

    #[must_use]
    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    // -- Preprocessing & rule binding ---------------------------------------

    /// Take the rule-set preprocessor's output for the pricing unit.
    ///
    /// Charges already committed on participating fare usages governed by the
    /// rule's carrier are remembered, so that occurrence caps keep counting
    /// across fare components.
    pub fn preprocess(&mut self, pre: Preprocessing, fare_path: &FarePath) {
        self.fc_scope = pre.fc_scope;
        self.fails_pu = pre.fails_pu;
        self.relation_and = false;
        self.relation_or = false;
        self.committed.clear();

        if let Some(rule) = &pre.category_rule {
            self.locator = rule.locator.clone();
            let (has_and, has_or) = rule.relation_indicators();
            self.relation_and = has_and;
            self.relation_or = has_or;
        }

        for fu_id in &pre.pu_scope_fare_usages {
            let Some(fu) = fare_path.fare_usage(*fu_id) else {
                continue;
            };
            if fu.governing_carrier != self.locator.carrier {
                continue;
            }
            self.committed.extend(fu.transfer_surcharges.iter().filter_map(|s| {
                s.matched_item.map(|item_no| CountedCharge {
                    item_no,
                    primary: s.is_primary_charge,
                })
            }));
        }
        debug!(
            rule = %self.locator,
            seeded = self.committed.len(),
            least_restrictive = pre.apply_least_restrictive,
            "Preprocessed transfer rule"
        );
        self.pre = pre;
    }

    /// Identify the filed rule that subsequent matches come from.
    pub fn set_rule_locator(&mut self, locator: RuleLocator, is_fare_rule: bool) {
        self.locator = locator;
        self.is_fare_rule = is_fare_rule;
    }

    /// Bind `record` as the current rule and reset its occurrence counters,
    /// re-seeded from committed charges of the same item.
    pub fn set_current_rule(&mut self, record: &RuleRecord) {
        let (primary, secondary) = self
            .committed
            .iter()
            .filter(|c| c.item_no == record.item_no)
            .fold((0u16, 0u16), |(p, s), c| {
                if c.primary {
                    (p.saturating_add(1), s)
                } else {
                    (p, s.saturating_add(1))
                }
            });
        self.charge1_count = primary;
        self.charge2_count = secondary;
        self.max_transfers = record.effective_max_transfers();
        self.record = Some(record.clone());
    }

    /// Bind `record` as reached through `set`. For a `THEN`/`AND` set the
    /// current max becomes the summed cap of the set's usable transfer entries.
    pub fn set_current_rule_in_set(&mut self, record: &RuleRecord, set: &RelationalRuleSet, loc_swapped: bool) {
        self.set_current_rule(record);

        let indicator = set.relation_indicator();
        self.relation_and = indicator == Some(Relation::And);
        self.relation_or = indicator == Some(Relation::Or);
        if !self.relation_and {
            return;
        }

        let provider = self.provider;
        let summed = set.fold_cap(|entry| {
            // Soft passes on direction still count, so valid fares are not failed early.
            if !provider.direction_passes(entry, loc_swapped) {
                return None;
            }
            provider
                .rule_record(entry.item_no)
                .filter(|r| !provider.date_override_skips(r))
                .map(RuleRecord::effective_max_transfers)
        });
        self.max_transfers = summed.unwrap_or(TransferLimit::Limited(0));
        debug!(set = %set, max = %self.max_transfers, "Summed THEN/AND transfer max");
    }

    /// Max transfers in force for the bound rule.
    #[must_use]
    pub fn current_max_transfers(&self) -> TransferLimit {
        self.max_transfers
    }

    #[must_use]
    pub fn current_rule(&self) -> Option<&RuleRecord> {
        self.record.as_ref()
    }

    #[must_use]
    pub fn relation_indicators(&self) -> (bool, bool) {
        (self.relation_and, self.relation_or)
    }

    #[must_use]
    pub fn has_pu_scope(&self, fare_usage: FareUsageId) -> bool {
        self.pre.has_pu_scope(fare_usage)
    }

    #[must_use]
    pub fn transfer_fc_scope(&self) -> bool {
        self.fc_scope
    }

    /// Switch to fare-component scope, e.g. when a recurring segment is
    /// validated per component.
    pub fn set_transfer_fc_scope(&mut self, fc_scope: bool) {
        self.fc_scope = fc_scope;
    }

    /// Fare-component scope as preprocessed or implied by a blank max, ignoring
    /// later switches.
    #[must_use]
    pub fn transfer_fc_scope_real(&self) -> bool {
        self.pre.fc_scope
            || self
                .record
                .as_ref()
                .is_some_and(|r| r.max_transfers.is_none())
    }

    pub fn set_transfer_fails_pu(&mut self, fails: bool) {
        self.fails_pu = fails;
    }

    pub fn set_ignore_no_match(&mut self, ignore: bool) {
        self.ignore_no_match = ignore;
    }

    #[must_use]
    pub fn need_to_process_results(&self) -> bool {
        self.need_to_process
    }

    // -- Segment state ------------------------------------------------------

    pub fn mark_transfer(&mut self, segment: SegmentId, fare_usage: FareUsageId, validate_entire_rule: bool) {
        let state = self.segments.entry(segment, fare_usage);
        state.is_transfer = true;
        state.validate_entire_rule = validate_entire_rule;
        self.need_to_process = true;
    }

    pub fn mark_passed(
        &mut self,
        segment: SegmentId,
        fare_usage: FareUsageId,
        via_least_restrictive: bool,
        recurring_fc_scope: bool,
    ) {
        let state = self.segments.entry(segment, fare_usage);
        state.passed_validation = true;
        state.passed_by_least_restrictive = via_least_restrictive;
        state.recurring_fc_scope = recurring_fc_scope;
        self.need_to_process = true;
    }

    /// Record that `item_no` of the current rule governs `segment`.
    pub fn record_rule_match(&mut self, segment: SegmentId, fare_usage: FareUsageId, item_no: u32, tentative: bool) {
        let rule_match = RuleMatch {
            item_no,
            locator: self.locator.clone(),
            fare_rule: self.is_fare_rule,
        };
        let transition = self
            .segments
            .entry(segment, fare_usage)
            .record_match(rule_match, tentative);
        if transition == MatchTransition::Upgraded {
            debug!(segment = segment.0, item_no, "Tentative match replaced by definite match");
        }
        self.need_to_process = true;
    }

    pub fn mark_max_exceeded(&mut self, segment: SegmentId, fare_usage: FareUsageId, kind: MaxExceeded) {
        self.segments.entry(segment, fare_usage).max_exceeded = Some(kind);
        self.need_to_process = true;
    }

    #[must_use]
    pub fn is_transfer(&self, segment: SegmentId) -> bool {
        self.segments.get(segment).is_some_and(|s| s.is_transfer)
    }

    #[must_use]
    pub fn has_passed(&self, segment: SegmentId) -> bool {
        self.segments.get(segment).is_some_and(|s| s.passed_validation)
    }

    #[must_use]
    pub fn rule_match(&self, segment: SegmentId) -> Option<&MatchState> {
        self.segments.get(segment).map(|s| &s.match_state)
    }

    #[must_use]
    pub fn segment(&self, segment: SegmentId) -> Option<&SegmentState> {
        self.segments.get(segment)
    }

    #[must_use]
    pub fn segments(&self) -> &SegmentTable {
        &self.segments
    }

    /// Whether any segment of the pricing unit was marked as exceeding a max.
    #[must_use]
    pub fn check_max_exceeded(&self, fare_path: &FarePath, pu: &PricingUnit) -> bool {
        self.need_to_process
            && pu
                .fare_usages
                .iter()
                .filter_map(|id| fare_path.fare_usage(*id))
                .flat_map(|fu| fu.segments.iter())
                .filter_map(|seg| self.segments.get(*seg))
                .any(|s| s.max_exceeded.is_some())
    }

    // -- Pass/fail ----------------------------------------------------------

    fn segment_check(&self) -> SegmentCheck {
        if self.ignore_no_match {
            return SegmentCheck::Passed;
        }

        let apply_least_restrictive = self.pre.apply_least_restrictive;
        let mut transfer_count: u16 = 0;
        let mut tentative = false;

        for state in self.segments.transfers() {
            if !state.passed_validation {
                if !state.no_match_tolerant {
                    return SegmentCheck::Failed;
                }
                if Some(state.fare_usage) != self.current_fare_usage && !state.match_state.is_matched() {
                    continue;
                }
            }

            if apply_least_restrictive {
                transfer_count = transfer_count.saturating_add(1);
                if !self.pre.least_restrictive_cap.allows(transfer_count) {
                    return SegmentCheck::Failed;
                }
            } else {
                match state.match_state {
                    MatchState::Unmatched => return SegmentCheck::Failed,
                    MatchState::Tentative(_) => tentative = true,
                    MatchState::Definite(_) => {}
                }
            }
        }

        if tentative {
            SegmentCheck::Tentative
        } else {
            SegmentCheck::Passed
        }
    }

    /// Whether every transfer is accounted for: passed (or tolerated), and
    /// either definitely matched or within the least-restrictive cap.
    #[must_use]
    pub fn check_all_passed(&self) -> bool {
        self.segment_check() == SegmentCheck::Passed
    }

    // -- Finalization -------------------------------------------------------

    /// Fare-component verdict for `fare_usage`.
    pub fn finalize_component(&mut self, fare_usage: FareUsageId) -> Verdict {
        self.current_fare_usage = Some(fare_usage);
        let check = if self.need_to_process {
            self.segment_check()
        } else {
            SegmentCheck::Passed
        };

        let verdict = match check {
            SegmentCheck::Failed => Verdict::Fail,
            SegmentCheck::Tentative => Verdict::SoftPass,
            SegmentCheck::Passed if self.has_pu_scope(fare_usage) && !self.fc_scope => Verdict::SoftPass,
            SegmentCheck::Passed => Verdict::Pass,
        };
        debug!(fare_usage = fare_usage.0, verdict = %verdict, "Fare component transfer validation");
        verdict
    }

    /// Pricing-unit verdict for `fare_usage`, the `pu`-th pricing unit of
    /// `fare_path`. Call once per fare usage, in pricing-unit order.
    ///
    /// Command-priced fares that fail still get their charges processed and
    /// return [`UnitVerdict::QuoteOnly`].
    pub fn finalize_pricing_unit(
        &mut self,
        fare_path: &mut FarePath,
        pu: usize,
        fare_usage: FareUsageId,
        process_charges: bool,
    ) -> UnitVerdict {
        self.current_fare_usage = Some(fare_usage);
        let Some(unit) = fare_path.pricing_units.get(pu) else {
            debug!(pu, "Unknown pricing unit");
            return UnitVerdict::Fail;
        };
        let is_last = unit.is_last(fare_usage);
        let command_priced = fare_path
            .fare_usage(fare_usage)
            .is_some_and(|fu| fu.command_priced);

        self.no_match_validation(fare_path, unit, fare_usage);

        let pu_scoped = self.has_pu_scope(fare_usage) && !self.fc_scope;
        if pu_scoped {
            let counted = self.owned_transfers(fare_usage).count();
            let allowed = self.max_transfers_allowed();
            let unit = &mut fare_path.pricing_units[pu];
            if let Some(TransferLimit::Limited(max)) = allowed {
                unit.restrict_max_transfer(max);
            }
            let counted = u16::try_from(counted).unwrap_or(u16::MAX);
            unit.total_transfers = unit.total_transfers.saturating_add(counted);
        }

        let exceeds = fare_path.pricing_units[pu].exceeds_most_restrictive();
        let failed = (self.need_to_process && !self.check_all_passed())
            || self.fails_pu
            || (is_last && command_priced && exceeds);

        if failed && !command_priced {
            debug!(fare_usage = fare_usage.0, "Transfers fail pricing unit validation");
            return UnitVerdict::Fail;
        }
        let quote_only = failed;

        self.record_winning_rules(fare_path, fare_usage, quote_only);

        if is_last && !command_priced && exceeds {
            debug!(fare_usage = fare_usage.0, "Transfers exceed pricing unit max");
            return UnitVerdict::Fail;
        }

        if self.need_to_process && process_charges {
            self.process_surcharges(fare_path, fare_usage);
        }

        if command_priced {
            let unit = &mut fare_path.pricing_units[pu];
            if self.relation_and {
                if self.fc_scope || !self.has_pu_scope(fare_usage) {
                    unit.has_transfer_fc_scope = true;
                }
            } else if let Some(record) = &self.record {
                match record.max_transfers {
                    Some(TransferLimit::Limited(max)) => unit.restrict_max_transfer(max),
                    _ => unit.has_transfer_fc_scope = true,
                }
            }
        }

        let verdict = if quote_only {
            UnitVerdict::QuoteOnly
        } else {
            UnitVerdict::Pass
        };
        debug!(fare_usage = fare_usage.0, verdict = %verdict, "Pricing unit transfer validation");
        verdict
    }

    fn owned_transfers(&self, fare_usage: FareUsageId) -> impl Iterator<Item = &SegmentState> {
        self.segments
            .transfers()
            .filter(move |s| s.fare_usage == fare_usage)
    }

    /// Max transfers allowed by the category's sets, counting only items that
    /// matched a transfer and skipping blank counts.
    fn max_transfers_allowed(&self) -> Option<TransferLimit> {
        let rule = self.pre.category_rule.as_ref()?;
        let provider = self.provider;
        rule.fold_cap(|entry| {
            let matched = self
                .segments
                .transfers()
                .any(|s| s.match_state.item_no() == Some(entry.item_no));
            if !matched {
                return None;
            }
            provider.rule_record(entry.item_no)?.max_transfers
        })
    }

    fn record_winning_rules(&self, fare_path: &mut FarePath, fare_usage: FareUsageId, quote_only: bool) {
        let Some(fu) = fare_path.fare_usage_mut(fare_usage) else {
            return;
        };
        for state in self.owned_transfers(fare_usage) {
            if quote_only && (!state.passed_validation || !state.no_match_tolerant) {
                continue;
            }
            let Some(m) = state.match_state.rule_match() else {
                continue;
            };
            if m.fare_rule {
                fu.matching_fare_rule = Some(m.locator.clone());
            } else {
                fu.matching_general_rule = Some(m.locator.clone());
            }
        }
    }

    /// Flag transfers of other fare usages in `pu` that may remain unmatched
    /// until their own fare usage is finalized.
    pub fn no_match_validation(&mut self, fare_path: &FarePath, pu: &PricingUnit, current: FareUsageId) {
        if !self.need_to_process {
            return;
        }
        for fu_id in &pu.fare_usages {
            if !self.pre.has_pu_scope(*fu_id) {
                continue;
            }
            let Some(fu) = fare_path.fare_usage(*fu_id) else {
                continue;
            };
            for seg in &fu.segments {
                let is_air = fare_path
                    .itinerary
                    .segment(*seg)
                    .is_some_and(|s| s.is_air);
                if !is_air {
                    continue;
                }
                let Some(state) = self.segments.get_mut(*seg) else {
                    continue;
                };
                if state.is_transfer
                    && !state.passed_validation
                    && state.fare_usage != current
                    && state.validate_entire_rule
                {
                    state.no_match_tolerant = true;
                }
            }
        }
    }

    // -- Charges ------------------------------------------------------------

    /// Record the bound rule's charge for `segment`.
    ///
    /// The first charge applies until its occurrence cap is reached (or the
    /// second is forced); after that the second applies while its own cap
    /// allows. Returns `false` only when `fare_usage` is unknown.
    pub fn add_surcharge(
        &mut self,
        fare_path: &FarePath,
        segment: SegmentId,
        fare_usage: FareUsageId,
        segment_specific: bool,
        force_charge2: bool,
    ) -> bool {
        let Some(fu) = fare_path.fare_usage(fare_usage) else {
            return false;
        };
        self.segments.entry(segment, fare_usage);

        let Some(record) = &self.record else {
            return true;
        };
        let selector = ChargeSelector::new(self.converter, &self.config);
        let Some(charge) = selector.prepare(record, fu, &fare_path.passenger) else {
            self.need_to_process = true;
            return true;
        };

        let switch = force_charge2
            || matches!(record.charge1_max, TransferLimit::Limited(max) if self.charge1_count >= max);
        let surcharge = if switch {
            if !record.charge2_max.allows(self.charge2_count.saturating_add(1)) {
                self.need_to_process = true;
                return true;
            }
            self.charge2_count = self.charge2_count.saturating_add(1);
            Surcharge {
                amount: charge.second,
                local: charge.second_local,
                is_segment_specific: segment_specific,
                is_primary_charge: false,
            }
        } else {
            self.charge1_count = self.charge1_count.saturating_add(1);
            Surcharge {
                amount: charge.first,
                local: charge.first_local,
                is_segment_specific: segment_specific,
                is_primary_charge: true,
            }
        };

        debug!(segment = segment.0, amount = %surcharge.amount, primary = surcharge.is_primary_charge, "Transfer surcharge");
        self.segments.entry(segment, fare_usage).surcharges.push(surcharge);
        self.need_to_process = true;
        true
    }

    /// Commit the pending surcharges of `fare_usage` to the fare path, in the
    /// itinerary's calculation currency. Every transfer segment is also added
    /// to its owner's transfer set.
    pub fn process_surcharges(&mut self, fare_path: &mut FarePath, fare_usage: FareUsageId) {
        let calc = fare_path.itinerary.calculation_currency.clone();
        let rounding = fare_path.itinerary.international_rounding;
        let segment_ids: Vec<SegmentId> = fare_path.itinerary.segment_ids().collect();

        for seg in segment_ids {
            let Some(state) = self.segments.get(seg) else {
                continue;
            };
            if !state.is_transfer {
                continue;
            }
            let Some(owner) = fare_path.fare_usage_mut(state.fare_usage) else {
                continue;
            };
            owner.transfers.insert(seg);
            if state.fare_usage != fare_usage {
                continue;
            }

            for sc in &state.surcharges {
                let amount = if sc.amount.is_in(&calc) {
                    sc.amount.clone()
                } else {
                    match self.converter.convert(&sc.amount, &calc, rounding) {
                        Ok(converted) => converted,
                        Err(e) => {
                            error!(segment = seg.0, error = %e, "Transfer surcharge omitted");
                            continue;
                        }
                    }
                };

                let value = amount.amount();
                let Some(owner) = fare_path.fare_usage_mut(fare_usage) else {
                    break;
                };
                owner.transfer_surcharges.push(TransferSurcharge {
                    segment: seg,
                    amount,
                    unconverted: sc.local.clone(),
                    is_segment_specific: sc.is_segment_specific,
                    is_primary_charge: sc.is_primary_charge,
                    matched_item: state.match_state.item_no(),
                    matched_rule: state.match_state.rule_match().map(|m| m.locator.clone()),
                });
                fare_path.total_amount += value;
                fare_path.plus_up_amount += value;
                fare_path.plus_up_applied = true;
            }
        }
    }

    /// Forget every segment state and counter so the validator can be reused.
    pub fn clear_results(&mut self) {
        self.segments.clear();
        self.charge1_count = 0;
        self.charge2_count = 0;
        self.need_to_process = false;
        self.ignore_no_match = false;
        self.max_transfers = TransferLimit::Unlimited;
        self.current_fare_usage = None;
    }

    // -- Reporting ----------------------------------------------------------

    /// Per-segment outcome of the validation so far.
    pub fn report(&self, fare_path: &FarePath) -> ValidationReport {
        let outcomes = self
            .segments
            .iter()
            .map(|state| {
                let command_priced = fare_path
                    .fare_usage(state.fare_usage)
                    .is_some_and(|fu| fu.command_priced);
                let item_no = state
                    .match_state
                    .item_no()
                    .filter(|item| *item != NOT_APPLICABLE_ITEM);
                let scope = if self.has_pu_scope(state.fare_usage)
                    && !self.fc_scope
                    && !state.recurring_fc_scope
                {
                    Scope::PricingUnit
                } else {
                    Scope::FareComponent
                };
                SegmentOutcome {
                    segment: state.segment,
                    fare_usage: state.fare_usage,
                    is_transfer: state.is_transfer,
                    status: self.status_of(state, command_priced),
                    item_no,
                    scope,
                }
            })
            .collect();
        ValidationReport::new(outcomes)
    }

    fn status_of(&self, state: &SegmentState, command_priced: bool) -> SegmentStatus {
        if command_priced && state.max_exceeded == Some(MaxExceeded::TotalInOut) {
            return SegmentStatus::InOutOnly;
        }
        if state.passed_validation {
            return match state.match_state.item_no() {
                Some(NOT_APPLICABLE_ITEM) => SegmentStatus::NotApplicable,
                None if state.passed_by_least_restrictive => SegmentStatus::LeastRestrictive,
                _ => SegmentStatus::Pass,
            };
        }
        if state.max_exceeded == Some(MaxExceeded::TotalMax) {
            return SegmentStatus::MaxExceeded;
        }
        if state.no_match_tolerant || self.ignore_no_match {
            return SegmentStatus::Pending;
        }
        if state.match_state.is_matched() {
            SegmentStatus::Fail
        } else {
            SegmentStatus::NoMatch
        }
    }
}
