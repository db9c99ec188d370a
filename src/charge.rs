//! Charge selection for a transfer: which passengers pay, which filed currency
//! applies, and how passenger discounts carry over.

use rust_decimal::Decimal;

use crate::config::EngineConfig;
use crate::convert::{convert_or_zero, CurrencyConverter};
use crate::types::{
    ChargeApplicability, ChargeSlot, Fare, FareUsage, Money, Passenger, RuleRecord,
};

/// The two amounts a transfer may be charged, ready to be recorded.
///
/// `first`/`second` are what gets committed; `first_local`/`second_local` are
/// the same charges in the filed currency.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PreparedCharge {
    pub first: Money,
    pub second: Money,
    pub first_local: Money,
    pub second_local: Money,
}

/// The filed slot chosen for a fare and the amounts charged from it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectedSlot {
    /// The slot as it appears on the rule.
    pub filed: ChargeSlot,
    /// The filed slot itself, or its reference-currency conversion when
    /// neither slot is filed in the fare's currency.
    pub charge: ChargeSlot,
}

impl SelectedSlot {
    fn as_filed(slot: &ChargeSlot) -> Self {
        Self {
            filed: slot.clone(),
            charge: slot.clone(),
        }
    }
}

pub struct ChargeSelector<'a> {
    converter: &'a dyn CurrencyConverter,
    config: &'a EngineConfig,
}

impl<'a> ChargeSelector<'a> {
    #[must_use]
    pub fn new(converter: &'a dyn CurrencyConverter, config: &'a EngineConfig) -> Self {
        Self { converter, config }
    }

    /// Whether the passenger pays under `applicability`. A free-travelling
    /// infant (zero fare) never does.
    #[must_use]
    pub fn chargeable(applicability: ChargeApplicability, passenger: &Passenger, fare: &Fare) -> bool {
        if fare.amount.is_zero() && passenger.is_infant() {
            return false;
        }
        match applicability {
            ChargeApplicability::Any | ChargeApplicability::AdultChildDiscountedInfantDiscounted => true,
            ChargeApplicability::Child => passenger.is_child(),
            ChargeApplicability::Adult => passenger.is_adult(),
            ChargeApplicability::Infant => passenger.is_infant(),
            ChargeApplicability::AdultChild
            | ChargeApplicability::AdultChildDiscounted
            | ChargeApplicability::AdultChildInfantFree
            | ChargeApplicability::AdultChildDiscountedInfantFree => !passenger.is_infant(),
        }
    }

    /// Pick the currency slot that applies to `fare`.
    ///
    /// A lone slot wins. With two, the one filed in the fare's currency wins;
    /// failing that both are compared in the reference currency (lower first
    /// amount, then lower second amount, then the first slot) and the winner
    /// is charged at its converted amounts.
    #[must_use]
    pub fn select_slot(&self, record: &RuleRecord, fare: &Fare) -> Option<SelectedSlot> {
        match (&record.currency1, &record.currency2) {
            (None, None) => None,
            (Some(slot), None) | (None, Some(slot)) => Some(SelectedSlot::as_filed(slot)),
            (Some(first), Some(second)) => {
                if &first.currency == fare.currency() {
                    return Some(SelectedSlot::as_filed(first));
                }
                if &second.currency == fare.currency() {
                    return Some(SelectedSlot::as_filed(second));
                }
                let a = self.to_reference(first, fare.international);
                let b = self.to_reference(second, fare.international);
                let second_wins = b.charge1 < a.charge1 || (b.charge1 == a.charge1 && b.charge2 < a.charge2);
                let (filed, charge) = if second_wins { (second, b) } else { (first, a) };
                Some(SelectedSlot {
                    filed: filed.clone(),
                    charge,
                })
            }
        }
    }

    fn to_reference(&self, slot: &ChargeSlot, international: bool) -> ChargeSlot {
        let reference = &self.config.reference_currency;
        let decimals = self.config.reference_decimals;
        if slot.charge1.is_zero() && slot.charge2.is_zero() {
            return ChargeSlot::new(reference.clone(), decimals, Decimal::ZERO, Decimal::ZERO);
        }
        let c1 = convert_or_zero(self.converter, &slot.charge1_money(), reference, decimals, international);
        let c2 = convert_or_zero(self.converter, &slot.charge2_money(), reference, decimals, international);
        ChargeSlot::new(reference.clone(), c1.decimals(), c1.amount(), c2.amount())
    }

    /// Apply the passenger's discount to `slot`.
    ///
    /// Returns the adjusted slot and the multiplier that was applied, if any.
    #[must_use]
    pub fn apply_discount(
        slot: &ChargeSlot,
        fare_usage: &FareUsage,
        passenger: &Passenger,
        applicability: ChargeApplicability,
    ) -> (ChargeSlot, Option<Decimal>) {
        let Some(fare) = fare_usage.discounted_fare() else {
            return (slot.clone(), None);
        };
        if passenger.is_infant() && applicability.infant_free() {
            let free = ChargeSlot::new(slot.currency.clone(), slot.decimals, Decimal::ZERO, Decimal::ZERO);
            return (free, None);
        }
        let Some(discount) = fare.discount.filter(|d| d.calculated) else {
            return (slot.clone(), None);
        };

        // The filed percentage is the share the passenger pays.
        let multiplier = discount.percent / Decimal::ONE_HUNDRED;
        let applies = (passenger.is_child() && applicability.discounts_child())
            || (passenger.is_infant() && applicability.discounts_infant());
        if !applies {
            return (slot.clone(), Some(multiplier));
        }
        let discounted = ChargeSlot::new(
            slot.currency.clone(),
            slot.decimals,
            slot.charge1 * multiplier,
            slot.charge2 * multiplier,
        );
        (discounted, Some(multiplier))
    }

    /// Re-derive discounted amounts in the reference currency: convert the
    /// undiscounted amounts, truncate, apply the multiplier, truncate again.
    #[must_use]
    pub fn discount_in_reference(&self, slot: &ChargeSlot, multiplier: Decimal, international: bool) -> (Money, Money) {
        let reference = &self.config.reference_currency;
        let decimals = self.config.reference_decimals;
        let convert = |m: Money| {
            convert_or_zero(self.converter, &m, reference, decimals, international)
                .truncated()
                .scaled(multiplier)
                .truncated()
        };
        (convert(slot.charge1_money()), convert(slot.charge2_money()))
    }

    /// Everything above in order. `None` when the passenger is not charged or
    /// the record files no charge.
    #[must_use]
    pub fn prepare(&self, record: &RuleRecord, fare_usage: &FareUsage, passenger: &Passenger) -> Option<PreparedCharge> {
        let fare = &fare_usage.fare;
        if !Self::chargeable(record.applicability, passenger, fare) {
            return None;
        }
        let selected = self.select_slot(record, fare)?;
        let (charged, multiplier) =
            Self::apply_discount(&selected.charge, fare_usage, passenger, record.applicability);
        let (local, _) = Self::apply_discount(&selected.filed, fare_usage, passenger, record.applicability);

        let changed = charged.charge1 != selected.charge.charge1 || charged.charge2 != selected.charge.charge2;
        let (first, second) = match multiplier {
            Some(m) if changed && !m.is_zero() => self.discount_in_reference(&selected.filed, m, fare.international),
            _ => (charged.charge1_money(), charged.charge2_money()),
        };
        Some(PreparedCharge {
            first,
            second,
            first_local: local.charge1_money(),
            second_local: local.charge2_money(),
        })
    }
}
