mod fixtures;

use fixtures::{adult, charging_record, infant, one_component_path, rates, record};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use transfer_rules::{
    CategoryRule, InMemoryRuleData, Preprocessing, RelationalRuleSet, RuleLocator, SegmentId,
    TransferLimit, TransferValidator, UnitVerdict, Verdict,
};

#[test]
fn two_matching_connections_over_a_max_of_one_fail() {
    let data = InMemoryRuleData::new();
    let rates = rates();
    let (fp, fu) = one_component_path(adult(), dec!(300), "USD");
    let rule = record(1001, Some(TransferLimit::Limited(1)));

    let mut v = TransferValidator::new(&data, &rates);
    v.set_current_rule(&rule);
    assert_eq!(v.current_max_transfers(), TransferLimit::Limited(1));

    // The first connection is within the max, the second is not.
    for seg in [SegmentId(0), SegmentId(1)] {
        v.mark_transfer(seg, fu, false);
        v.record_rule_match(seg, fu, rule.item_no, false);
    }
    v.mark_passed(SegmentId(0), fu, false, false);

    assert!(!v.check_all_passed());
    assert_eq!(v.finalize_component(fu), Verdict::Fail);
    assert!(v.report(&fp).has_failures());
}

#[test]
fn least_restrictive_cap_of_one_fails_second_connection() {
    let data = InMemoryRuleData::new();
    let rates = rates();
    let (fp, fu) = one_component_path(adult(), dec!(300), "USD");

    let mut v = TransferValidator::new(&data, &rates);
    v.preprocess(
        Preprocessing::new().with_least_restrictive(TransferLimit::Limited(1)),
        &fp,
    );
    v.mark_transfer(SegmentId(0), fu, false);
    v.mark_passed(SegmentId(0), fu, true, false);
    assert!(v.check_all_passed());

    v.mark_transfer(SegmentId(1), fu, false);
    v.mark_passed(SegmentId(1), fu, true, false);
    assert!(!v.check_all_passed());
    assert_eq!(v.finalize_component(fu), Verdict::Fail);
}

#[test]
fn first_charge_then_second_after_cap() {
    let data = InMemoryRuleData::new();
    let rates = rates();
    let (mut fp, fu) = one_component_path(adult(), dec!(300), "USD");
    let rule = charging_record(1001, "USD", dec!(25), TransferLimit::Limited(1), dec!(10));

    let mut v = TransferValidator::new(&data, &rates);
    v.set_current_rule(&rule);
    for seg in [SegmentId(0), SegmentId(1)] {
        v.mark_transfer(seg, fu, false);
        v.record_rule_match(seg, fu, rule.item_no, false);
        v.mark_passed(seg, fu, false, false);
        assert!(v.add_surcharge(&fp, seg, fu, true, false));
    }

    assert_eq!(v.finalize_pricing_unit(&mut fp, 0, fu, true), UnitVerdict::Pass);

    let usage = fp.fare_usage(fu).unwrap();
    let amounts: Vec<Decimal> = usage
        .transfer_surcharges
        .iter()
        .map(|s| s.amount.amount())
        .collect();
    assert_eq!(amounts, vec![dec!(25), dec!(10)]);
    assert!(usage.transfer_surcharges[0].is_primary_charge);
    assert!(!usage.transfer_surcharges[1].is_primary_charge);
    assert_eq!(usage.transfer_surcharges[0].matched_item, Some(1001));
    assert_eq!(fp.plus_up_amount, dec!(35));
    assert!(fp.plus_up_applied);
    assert_eq!(
        usage.transfers.iter().copied().collect::<Vec<_>>(),
        vec![SegmentId(0), SegmentId(1)]
    );
}

#[test]
fn or_alternatives_without_direct_match_allow_the_larger_cap() {
    let data = InMemoryRuleData::new()
        .with_record(record(1, Some(TransferLimit::Limited(1))))
        .with_record(record(3, Some(TransferLimit::Limited(3))));
    let rates = rates();
    let (fp, fu) = one_component_path(adult(), dec!(300), "USD");

    let category = CategoryRule::new(
        RuleLocator::default(),
        vec![RelationalRuleSet::from_filing("THEN 1 OR 3").unwrap()],
    );
    let pre = Preprocessing::new()
        .with_category_rule(category)
        .with_derived_least_restrictive(&data, false);
    assert_eq!(pre.least_restrictive_cap, TransferLimit::Limited(3));

    let mut v = TransferValidator::new(&data, &rates);
    v.preprocess(pre, &fp);
    for seg in [SegmentId(0), SegmentId(1), SegmentId(2)] {
        v.mark_transfer(seg, fu, false);
        v.mark_passed(seg, fu, true, false);
    }
    assert!(v.check_all_passed());
    assert_eq!(v.finalize_component(fu), Verdict::Pass);
}

#[test]
fn free_infant_is_never_charged() {
    let data = InMemoryRuleData::new();
    let rates = rates();
    let (mut fp, fu) = one_component_path(infant(), Decimal::ZERO, "USD");
    let rule = charging_record(1001, "USD", dec!(25), TransferLimit::Unlimited, dec!(10));

    let mut v = TransferValidator::new(&data, &rates);
    v.set_current_rule(&rule);
    v.mark_transfer(SegmentId(0), fu, false);
    v.record_rule_match(SegmentId(0), fu, rule.item_no, false);
    v.mark_passed(SegmentId(0), fu, false, false);
    assert!(v.add_surcharge(&fp, SegmentId(0), fu, true, false));
    assert!(v.segment(SegmentId(0)).unwrap().surcharges.is_empty());

    assert_eq!(v.finalize_pricing_unit(&mut fp, 0, fu, true), UnitVerdict::Pass);
    assert!(fp.fare_usage(fu).unwrap().transfer_surcharges.is_empty());
    assert_eq!(fp.plus_up_amount, Decimal::ZERO);
    assert!(!fp.plus_up_applied);
}

#[test]
fn committed_surcharges_sum_to_plus_up() {
    let data = InMemoryRuleData::new();
    let rates = rates();
    let (mut fp, fu) = one_component_path(adult(), dec!(300), "USD");
    // Filed in EUR, committed in USD.
    let rule = charging_record(1001, "EUR", dec!(20), TransferLimit::Limited(2), dec!(7.5));

    let mut v = TransferValidator::new(&data, &rates);
    v.set_current_rule(&rule);
    for seg in [SegmentId(0), SegmentId(1), SegmentId(2)] {
        v.mark_transfer(seg, fu, false);
        v.record_rule_match(seg, fu, rule.item_no, false);
        v.mark_passed(seg, fu, false, false);
        assert!(v.add_surcharge(&fp, seg, fu, false, false));
    }
    let before = fp.total_amount;
    assert_eq!(v.finalize_pricing_unit(&mut fp, 0, fu, true), UnitVerdict::Pass);

    let usage = fp.fare_usage(fu).unwrap();
    assert_eq!(usage.transfer_surcharges.len(), 3);
    assert_eq!(usage.surcharge_total(), fp.plus_up_amount);
    assert_eq!(fp.total_amount - before, fp.plus_up_amount);
    assert_eq!(usage.surcharge_total(), dec!(95));
    assert!(usage
        .transfer_surcharges
        .iter()
        .all(|s| s.amount.currency().as_str() == "USD" && s.unconverted.currency().as_str() == "EUR"));
}

#[test]
fn clear_results_then_rerun_is_identical() {
    let data = InMemoryRuleData::new();
    let rates = rates();
    let (fp, fu) = one_component_path(adult(), dec!(300), "USD");
    let rule = charging_record(1001, "USD", dec!(25), TransferLimit::Limited(1), dec!(10));

    let run = |v: &mut TransferValidator<'_>| {
        v.set_current_rule(&rule);
        v.mark_transfer(SegmentId(0), fu, false);
        v.record_rule_match(SegmentId(0), fu, rule.item_no, false);
        v.mark_passed(SegmentId(0), fu, false, false);
        v.add_surcharge(&fp, SegmentId(0), fu, true, false);
        v.mark_transfer(SegmentId(1), fu, false);
        v.record_rule_match(SegmentId(1), fu, rule.item_no, true);
        v.mark_passed(SegmentId(1), fu, false, false);
        v.add_surcharge(&fp, SegmentId(1), fu, true, false);
        (v.finalize_component(fu), v.report(&fp), v.segments().len())
    };

    let mut v = TransferValidator::new(&data, &rates);
    let first = run(&mut v);
    v.clear_results();
    assert!(v.segments().is_empty());
    assert!(!v.need_to_process_results());
    let second = run(&mut v);

    assert_eq!(first, second);
    assert_eq!(first.0, Verdict::SoftPass);
}

#[test]
fn single_rule_and_single_entry_set_agree() {
    let rule = record(1001, Some(TransferLimit::Limited(2)));
    let data = InMemoryRuleData::new().with_record(rule.clone());
    let rates = rates();
    let (_, fu) = one_component_path(adult(), dec!(300), "USD");

    let mut direct = TransferValidator::new(&data, &rates);
    let mut relational = TransferValidator::new(&data, &rates);
    direct.set_current_rule(&rule);
    relational.set_current_rule_in_set(&rule, &RelationalRuleSet::single(1001), false);
    assert_eq!(direct.current_max_transfers(), relational.current_max_transfers());

    for v in [&mut direct, &mut relational] {
        v.mark_transfer(SegmentId(0), fu, false);
        v.record_rule_match(SegmentId(0), fu, 1001, false);
        v.mark_passed(SegmentId(0), fu, false, false);
        v.mark_transfer(SegmentId(1), fu, false);
    }
    assert_eq!(direct.check_all_passed(), relational.check_all_passed());
    assert!(!direct.check_all_passed());

    for v in [&mut direct, &mut relational] {
        v.record_rule_match(SegmentId(1), fu, 1001, false);
        v.mark_passed(SegmentId(1), fu, false, false);
    }
    assert_eq!(direct.check_all_passed(), relational.check_all_passed());
    assert!(direct.check_all_passed());
}
