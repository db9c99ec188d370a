mod error;
mod limit;
mod money;
mod pricing;
mod record;
mod relational;
mod report;
mod segment;
mod verdict;

pub use error::ConversionError;
pub use limit::TransferLimit;
pub use money::{CurrencyCode, Money};
pub use pricing::{
    DiscountInfo, Fare, FarePath, FareUsage, FareUsageId, Itinerary, Passenger, PassengerClass,
    PricingUnit, SegmentId, TransferSurcharge, TravelSegment,
};
pub use record::{ChargeApplicability, ChargeSlot, RuleLocator, RuleRecord};
pub use relational::{CategoryRule, RelationalRuleSet, Relation, RuleEntry, RuleTree, TRANSFER_CATEGORY};
pub use report::{Scope, SegmentOutcome, SegmentStatus, ValidationReport};
pub use segment::{
    MatchState, MatchTransition, MaxExceeded, RuleMatch, SegmentState, SegmentTable, Surcharge,
    NOT_APPLICABLE_ITEM,
};
pub use verdict::{UnitVerdict, Verdict};
