use std::collections::BTreeSet;

use rust_decimal::Decimal;

use super::money::{CurrencyCode, Money};
use super::record::RuleLocator;

/// Position of a travel segment in its itinerary. Assigned once when the
/// itinerary is built; ordering follows itinerary order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SegmentId(pub usize);

/// Position of a fare usage in its fare path.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct FareUsageId(pub usize);

#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TravelSegment {
    pub origin: String,
    pub destination: String,
    pub carrier: String,
    /// `false` for surface (ARNK) segments.
    pub is_air: bool,
}

impl TravelSegment {
    #[must_use]
    pub fn air(origin: &str, destination: &str, carrier: &str) -> Self {
        Self {
            origin: origin.to_owned(),
            destination: destination.to_owned(),
            carrier: carrier.to_owned(),
            is_air: true,
        }
    }

    #[must_use]
    pub fn surface(origin: &str, destination: &str) -> Self {
        Self {
            origin: origin.to_owned(),
            destination: destination.to_owned(),
            carrier: String::new(),
            is_air: false,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Itinerary {
    pub segments: Vec<TravelSegment>,
    pub calculation_currency: CurrencyCode,
    pub international_rounding: bool,
}

impl Itinerary {
    #[must_use]
    pub fn new(segments: Vec<TravelSegment>, calculation_currency: impl Into<CurrencyCode>) -> Self {
        Self {
            segments,
            calculation_currency: calculation_currency.into(),
            international_rounding: false,
        }
    }

    pub fn segment_ids(&self) -> impl Iterator<Item = SegmentId> + '_ {
        (0..self.segments.len()).map(SegmentId)
    }

    #[must_use]
    pub fn segment(&self, id: SegmentId) -> Option<&TravelSegment> {
        self.segments.get(id.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum PassengerClass {
    Adult,
    Child,
    Infant,
}

#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Passenger {
    pub code: String,
    pub class: PassengerClass,
}

impl Passenger {
    #[must_use]
    pub fn new(code: &str, class: PassengerClass) -> Self {
        Self {
            code: code.to_owned(),
            class,
        }
    }

    #[must_use]
    pub fn is_child(&self) -> bool {
        self.class == PassengerClass::Child
    }

    #[must_use]
    pub fn is_infant(&self) -> bool {
        self.class == PassengerClass::Infant
    }

    #[must_use]
    pub fn is_adult(&self) -> bool {
        self.class == PassengerClass::Adult
    }
}

/// Discount data of a discounted fare. `percent` is the share of the base
/// charge the passenger pays, not the share taken off.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct DiscountInfo {
    pub percent: Decimal,
    /// Only calculated discounts carry over to transfer charges.
    pub calculated: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Fare {
    pub amount: Money,
    pub vendor: String,
    pub international: bool,
    pub discount: Option<DiscountInfo>,
}

impl Fare {
    #[must_use]
    pub fn new(amount: Money) -> Self {
        Self {
            amount,
            vendor: "ATP".to_owned(),
            international: false,
            discount: None,
        }
    }

    #[must_use]
    pub fn currency(&self) -> &CurrencyCode {
        self.amount.currency()
    }

    #[must_use]
    pub fn is_discounted(&self) -> bool {
        self.discount.is_some()
    }
}

/// A surcharge committed to a fare usage, in the itinerary's calculation currency.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TransferSurcharge {
    pub segment: SegmentId,
    pub amount: Money,
    pub unconverted: Money,
    pub is_segment_specific: bool,
    pub is_primary_charge: bool,
    pub matched_item: Option<u32>,
    pub matched_rule: Option<RuleLocator>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct FareUsage {
    pub id: FareUsageId,
    pub segments: Vec<SegmentId>,
    pub fare: Fare,
    /// The undiscounted base of a fare created by discounting another fare.
    pub discount_parent: Option<Fare>,
    pub governing_carrier: String,
    pub command_priced: bool,
    pub transfer_surcharges: Vec<TransferSurcharge>,
    pub transfers: BTreeSet<SegmentId>,
    pub matching_fare_rule: Option<RuleLocator>,
    pub matching_general_rule: Option<RuleLocator>,
}

impl FareUsage {
    #[must_use]
    pub fn new(id: FareUsageId, segments: Vec<SegmentId>, fare: Fare, governing_carrier: &str) -> Self {
        Self {
            id,
            segments,
            fare,
            discount_parent: None,
            governing_carrier: governing_carrier.to_owned(),
            command_priced: false,
            transfer_surcharges: Vec::new(),
            transfers: BTreeSet::new(),
            matching_fare_rule: None,
            matching_general_rule: None,
        }
    }

    /// The fare whose discount applies to transfer charges: this fare when it
    /// is discounted, else its discounted parent.
    #[must_use]
    pub fn discounted_fare(&self) -> Option<&Fare> {
        if self.fare.is_discounted() {
            Some(&self.fare)
        } else {
            self.discount_parent.as_ref().filter(|f| f.is_discounted())
        }
    }

    /// Sum of committed surcharges in the calculation currency.
    #[must_use]
    pub fn surcharge_total(&self) -> Decimal {
        self.transfer_surcharges.iter().map(|s| s.amount.amount()).sum()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PricingUnit {
    pub fare_usages: Vec<FareUsageId>,
    /// Tightest filed max across the unit's rules; `None` until one is seen.
    pub most_restrictive_max_transfer: Option<u16>,
    pub total_transfers: u16,
    pub has_transfer_fc_scope: bool,
}

impl PricingUnit {
    #[must_use]
    pub fn new(fare_usages: Vec<FareUsageId>) -> Self {
        Self {
            fare_usages,
            ..Self::default()
        }
    }

    #[must_use]
    pub fn is_last(&self, fare_usage: FareUsageId) -> bool {
        self.fare_usages.last() == Some(&fare_usage)
    }

    /// Tighten the most-restrictive max with `max`.
    pub fn restrict_max_transfer(&mut self, max: u16) {
        match self.most_restrictive_max_transfer {
            Some(current) if current <= max => {}
            _ => self.most_restrictive_max_transfer = Some(max),
        }
    }

    #[must_use]
    pub fn exceeds_most_restrictive(&self) -> bool {
        match self.most_restrictive_max_transfer {
            Some(max) => self.total_transfers > 0 && self.total_transfers > max,
            None => false,
        }
    }
}

/// The priced combination of fares for one passenger over one itinerary.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct FarePath {
    pub itinerary: Itinerary,
    pub passenger: Passenger,
    pub fare_usages: Vec<FareUsage>,
    pub pricing_units: Vec<PricingUnit>,
    pub total_amount: Decimal,
    pub plus_up_amount: Decimal,
    pub plus_up_applied: bool,
}

impl FarePath {
    #[must_use]
    pub fn new(itinerary: Itinerary, passenger: Passenger) -> Self {
        Self {
            itinerary,
            passenger,
            fare_usages: Vec::new(),
            pricing_units: Vec::new(),
            total_amount: Decimal::ZERO,
            plus_up_amount: Decimal::ZERO,
            plus_up_applied: false,
        }
    }

    #[must_use]
    pub fn fare_usage(&self, id: FareUsageId) -> Option<&FareUsage> {
        self.fare_usages.get(id.0)
    }

    pub fn fare_usage_mut(&mut self, id: FareUsageId) -> Option<&mut FareUsage> {
        self.fare_usages.get_mut(id.0)
    }

    /// Append a fare usage covering `segments`, returning its id.
    pub fn push_fare_usage(&mut self, segments: Vec<SegmentId>, fare: Fare, governing_carrier: &str) -> FareUsageId {
        let id = FareUsageId(self.fare_usages.len());
        self.fare_usages
            .push(FareUsage::new(id, segments, fare, governing_carrier));
        id
    }

    /// Group fare usages into a pricing unit, returning its index.
    pub fn push_pricing_unit(&mut self, fare_usages: Vec<FareUsageId>) -> usize {
        self.pricing_units.push(PricingUnit::new(fare_usages));
        self.pricing_units.len() - 1
    }
}
