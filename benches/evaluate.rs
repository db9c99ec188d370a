use criterion::{black_box, criterion_group, criterion_main, Criterion};
use rust_decimal::Decimal;
use transfer_rules::{
    ChargeSlot, Fare, FarePath, FareUsageId, InMemoryRuleData, Itinerary, Money, Passenger,
    PassengerClass, RateTable, RelationalRuleSet, RuleRecord, SegmentId, TransferLimit,
    TransferValidator, TravelSegment,
};

/// A one-component fare path over `n` segments, priced in `calc`.
fn build_path(n: usize, calc: &str) -> (FarePath, FareUsageId) {
    let segments = (0..n)
        .map(|i| TravelSegment::air(&format!("P{i}"), &format!("P{}", i + 1), "AA"))
        .collect();
    let mut fp = FarePath::new(
        Itinerary::new(segments, calc),
        Passenger::new("ADT", PassengerClass::Adult),
    );
    let ids: Vec<SegmentId> = fp.itinerary.segment_ids().collect();
    let fu = fp.push_fare_usage(ids, Fare::new(Money::new(Decimal::new(50000, 2), calc, 2)), "AA");
    fp.push_pricing_unit(vec![fu]);
    (fp, fu)
}

fn charging_record() -> RuleRecord {
    let mut record = RuleRecord::new(1001);
    record.max_transfers = Some(TransferLimit::Unlimited);
    record.currency1 = Some(ChargeSlot::new("USD", 2, Decimal::new(2500, 2), Decimal::new(1000, 2)));
    record.currency2 = Some(ChargeSlot::new("EUR", 2, Decimal::new(2000, 2), Decimal::new(800, 2)));
    record.charge1_max = TransferLimit::Limited(2);
    record
}

fn rates() -> RateTable {
    RateTable::new("NUC")
        .with_rate("USD", Decimal::ONE, 2)
        .with_rate("EUR", Decimal::new(5, 1), 2)
        .with_rate("CAD", Decimal::new(125, 2), 2)
}

/// Mark, match, pass and charge every connection, then finalize.
fn validate(data: &InMemoryRuleData, rates: &RateTable, record: &RuleRecord, template: &FarePath, fu: FareUsageId) -> Decimal {
    let mut fp = template.clone();
    let mut v = TransferValidator::new(data, rates);
    v.set_current_rule(record);
    let connections = fp.itinerary.segments.len().saturating_sub(1);
    for i in 0..connections {
        let seg = SegmentId(i);
        v.mark_transfer(seg, fu, false);
        v.record_rule_match(seg, fu, record.item_no, false);
        v.mark_passed(seg, fu, false, false);
        v.add_surcharge(&fp, seg, fu, true, false);
    }
    let _ = v.finalize_component(fu);
    let _ = v.finalize_pricing_unit(&mut fp, 0, fu, true);
    fp.plus_up_amount
}

fn bench_validate(c: &mut Criterion) {
    let mut group = c.benchmark_group("validate");
    let data = InMemoryRuleData::new();
    let rates = rates();
    let record = charging_record();

    for &n in &[2, 8, 24] {
        let (fp, fu) = build_path(n, "USD");
        group.bench_function(&format!("{n}_segments_same_currency"), |b| {
            b.iter(|| validate(&data, &rates, black_box(&record), black_box(&fp), fu));
        });

        let (fp, fu) = build_path(n, "CAD");
        group.bench_function(&format!("{n}_segments_converted"), |b| {
            b.iter(|| validate(&data, &rates, black_box(&record), black_box(&fp), fu));
        });
    }

    group.finish();
}

fn filing(n: usize) -> String {
    let mut text = String::from("THEN 1");
    for i in 2..=n {
        let relation = if i % 3 == 0 { "OR" } else { "AND" };
        text.push_str(&format!(" {relation} {i}"));
    }
    text
}

fn bench_relational(c: &mut Criterion) {
    let mut group = c.benchmark_group("relational");

    for &n in &[4, 16, 64] {
        let text = filing(n);
        group.bench_function(&format!("parse_{n}_entries"), |b| {
            b.iter(|| RelationalRuleSet::from_filing(black_box(&text)));
        });

        let Ok(set) = RelationalRuleSet::from_filing(&text) else {
            continue;
        };
        group.bench_function(&format!("fold_{n}_entries"), |b| {
            b.iter(|| {
                black_box(&set).fold_cap(|e| Some(TransferLimit::Limited((e.item_no % 4) as u16)))
            });
        });
    }

    group.finish();
}

criterion_group!(benches, bench_validate, bench_relational);
criterion_main!(benches);
