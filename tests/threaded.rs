mod fixtures;

use std::sync::Arc;
use std::thread;

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use transfer_rules::{
    InMemoryRuleData, RateTable, RuleDataProvider, RuleRecord, SegmentId, TransferLimit,
    TransferValidator, UnitVerdict,
};

/// Price one fare path on its own validator, sharing the rule data and rates.
fn price(data: &InMemoryRuleData, rates: &RateTable, calc: &str, transfers: usize) -> (UnitVerdict, Decimal) {
    let (mut fp, fu) = fixtures::one_component_path(fixtures::adult(), dec!(300), calc);
    let rule = data
        .rule_record(1001)
        .cloned()
        .unwrap_or_else(|| RuleRecord::new(1001));

    let mut v = TransferValidator::new(data, rates);
    v.set_current_rule(&rule);
    for i in 0..transfers {
        let seg = SegmentId(i);
        v.mark_transfer(seg, fu, false);
        v.record_rule_match(seg, fu, rule.item_no, false);
        v.mark_passed(seg, fu, false, false);
        v.add_surcharge(&fp, seg, fu, true, false);
    }
    let verdict = v.finalize_pricing_unit(&mut fp, 0, fu, true);
    (verdict, fp.plus_up_amount)
}

#[test]
fn validate_across_threads() {
    let data = Arc::new(InMemoryRuleData::new().with_record(fixtures::charging_record(
        1001,
        "USD",
        dec!(25),
        TransferLimit::Limited(1),
        dec!(10),
    )));
    let rates = Arc::new(fixtures::rates());

    let cases: Vec<(&'static str, usize, Decimal)> = vec![
        ("USD", 1, dec!(25)),
        ("USD", 3, dec!(45)),
        // 25 USD -> 25 NUC -> 12.50 EUR
        ("EUR", 1, dec!(12.50)),
        ("CAD", 2, dec!(43.75)),
    ];

    let handles: Vec<_> = cases
        .into_iter()
        .map(|(calc, transfers, expected)| {
            let data = Arc::clone(&data);
            let rates = Arc::clone(&rates);
            thread::spawn(move || (price(&data, &rates, calc, transfers), expected))
        })
        .collect();

    for handle in handles {
        let ((verdict, plus_up), expected) = handle.join().unwrap();
        assert_eq!(verdict, UnitVerdict::Pass);
        assert_eq!(plus_up, expected);
    }
}

#[test]
fn validators_do_not_share_state() {
    let data = InMemoryRuleData::new().with_record(fixtures::charging_record(
        1001,
        "USD",
        dec!(25),
        TransferLimit::Limited(1),
        dec!(10),
    ));
    let rates = fixtures::rates();

    let results: Vec<(UnitVerdict, Decimal)> = thread::scope(|s| {
        let handles: Vec<_> = (0..4)
            .map(|_| s.spawn(|| price(&data, &rates, "USD", 2)))
            .collect();
        handles.into_iter().map(|h| h.join().unwrap()).collect()
    });

    assert!(results.iter().all(|r| *r == (UnitVerdict::Pass, dec!(35))));
}
