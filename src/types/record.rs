use std::fmt;

use rust_decimal::Decimal;

use super::limit::TransferLimit;
use super::money::{CurrencyCode, Money};

/// Identity of the filed rule that a record was retrieved through:
/// vendor, carrier, tariff, rule number and sequence.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct RuleLocator {
    pub vendor: String,
    pub carrier: String,
    pub tariff: u16,
    pub rule: String,
    pub sequence: u32,
}

impl fmt::Display for RuleLocator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}/{}/{}/{}/{}",
            self.vendor, self.carrier, self.tariff, self.rule, self.sequence
        )
    }
}

/// One currency slot of a rule record. `charge1` is the amount applied to the
/// first chargeable transfers, `charge2` the amount applied after the switch.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ChargeSlot {
    pub currency: CurrencyCode,
    pub decimals: u32,
    pub charge1: Decimal,
    pub charge2: Decimal,
}

impl ChargeSlot {
    #[must_use]
    pub fn new(currency: impl Into<CurrencyCode>, decimals: u32, charge1: Decimal, charge2: Decimal) -> Self {
        Self {
            currency: currency.into(),
            decimals,
            charge1,
            charge2,
        }
    }

    #[must_use]
    pub fn charge1_money(&self) -> Money {
        Money::new(self.charge1, self.currency.clone(), self.decimals)
    }

    #[must_use]
    pub fn charge2_money(&self) -> Money {
        Money::new(self.charge2, self.currency.clone(), self.decimals)
    }
}

/// Which passengers pay the transfer charge, and whether children and infants
/// pay a discounted amount or travel free.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ChargeApplicability {
    #[default]
    Any,
    Child,
    AdultChild,
    AdultChildDiscounted,
    Adult,
    AdultChildDiscountedInfantDiscounted,
    AdultChildInfantFree,
    AdultChildDiscountedInfantFree,
    Infant,
}

impl ChargeApplicability {
    /// Children pay the fare's discounted percentage of the charge.
    #[must_use]
    pub fn discounts_child(self) -> bool {
        matches!(
            self,
            ChargeApplicability::AdultChildDiscounted
                | ChargeApplicability::AdultChildDiscountedInfantDiscounted
                | ChargeApplicability::AdultChildDiscountedInfantFree
        )
    }

    #[must_use]
    pub fn discounts_infant(self) -> bool {
        self == ChargeApplicability::AdultChildDiscountedInfantDiscounted
    }

    #[must_use]
    pub fn infant_free(self) -> bool {
        matches!(
            self,
            ChargeApplicability::AdultChildInfantFree
                | ChargeApplicability::AdultChildDiscountedInfantFree
        )
    }
}

/// Filed transfer rule data for one rule item.
///
/// `max_transfers` is `None` when the field is blank: validation treats that as
/// unlimited, pricing-unit tallies skip it, and it implies fare-component scope.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct RuleRecord {
    pub item_no: u32,
    pub max_transfers: Option<TransferLimit>,
    pub charge1_max: TransferLimit,
    pub charge2_max: TransferLimit,
    pub currency1: Option<ChargeSlot>,
    pub currency2: Option<ChargeSlot>,
    pub applicability: ChargeApplicability,
    pub override_date_item: Option<u32>,
}

impl RuleRecord {
    /// A record with blank fields: no cap, no charges.
    #[must_use]
    pub fn new(item_no: u32) -> Self {
        Self {
            item_no,
            max_transfers: None,
            charge1_max: TransferLimit::Unlimited,
            charge2_max: TransferLimit::Unlimited,
            currency1: None,
            currency2: None,
            applicability: ChargeApplicability::Any,
            override_date_item: None,
        }
    }

    /// The cap used during validation, with a blank field read as unlimited.
    #[must_use]
    pub fn effective_max_transfers(&self) -> TransferLimit {
        self.max_transfers.unwrap_or(TransferLimit::Unlimited)
    }
}
