#![allow(dead_code)]

use rust_decimal::Decimal;
use transfer_rules::{
    ChargeSlot, Fare, FarePath, FareUsageId, Itinerary, Money, Passenger, PassengerClass,
    RateTable, RuleRecord, SegmentId, TransferLimit, TravelSegment,
};

/// JFK-ORD-DEN-LAX-SFO on one carrier: four segments, three connections.
pub fn itinerary(calculation_currency: &str) -> Itinerary {
    Itinerary::new(
        vec![
            TravelSegment::air("JFK", "ORD", "AA"),
            TravelSegment::air("ORD", "DEN", "AA"),
            TravelSegment::air("DEN", "LAX", "AA"),
            TravelSegment::air("LAX", "SFO", "AA"),
        ],
        calculation_currency,
    )
}

pub fn adult() -> Passenger {
    Passenger::new("ADT", PassengerClass::Adult)
}

pub fn child() -> Passenger {
    Passenger::new("CNN", PassengerClass::Child)
}

pub fn infant() -> Passenger {
    Passenger::new("INF", PassengerClass::Infant)
}

/// One fare component over the whole itinerary, in its own pricing unit.
pub fn one_component_path(passenger: Passenger, fare_amount: Decimal, currency: &str) -> (FarePath, FareUsageId) {
    let mut fp = FarePath::new(itinerary(currency), passenger);
    let segments: Vec<SegmentId> = fp.itinerary.segment_ids().collect();
    let fu = fp.push_fare_usage(segments, Fare::new(Money::new(fare_amount, currency, 2)), "AA");
    fp.push_pricing_unit(vec![fu]);
    (fp, fu)
}

/// Round trip: outbound JFK-ORD-DEN, inbound DEN-LAX-SFO, one pricing unit.
pub fn two_component_path(passenger: Passenger, fare_amount: Decimal, currency: &str) -> (FarePath, FareUsageId, FareUsageId) {
    let mut fp = FarePath::new(itinerary(currency), passenger);
    let out = fp.push_fare_usage(
        vec![SegmentId(0), SegmentId(1)],
        Fare::new(Money::new(fare_amount, currency, 2)),
        "AA",
    );
    let inb = fp.push_fare_usage(
        vec![SegmentId(2), SegmentId(3)],
        Fare::new(Money::new(fare_amount, currency, 2)),
        "AA",
    );
    fp.push_pricing_unit(vec![out, inb]);
    (fp, out, inb)
}

pub fn rates() -> RateTable {
    RateTable::new("NUC")
        .with_rate("USD", Decimal::ONE, 2)
        .with_rate("EUR", Decimal::new(5, 1), 2)
        .with_rate("CAD", Decimal::new(125, 2), 2)
}

pub fn record(item_no: u32, max: Option<TransferLimit>) -> RuleRecord {
    let mut r = RuleRecord::new(item_no);
    r.max_transfers = max;
    r
}

/// A record charging `first` for up to `first_cap` transfers, then `second`.
pub fn charging_record(
    item_no: u32,
    currency: &str,
    first: Decimal,
    first_cap: TransferLimit,
    second: Decimal,
) -> RuleRecord {
    let mut r = record(item_no, Some(TransferLimit::Unlimited));
    r.currency1 = Some(ChargeSlot::new(currency, 2, first, second));
    r.charge1_max = first_cap;
    r.charge2_max = TransferLimit::Unlimited;
    r
}
