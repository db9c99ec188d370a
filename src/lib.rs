mod charge;
mod config;
mod convert;
mod engine;
mod error;
pub mod parse;
mod provider;
mod types;

pub use charge::{ChargeSelector, PreparedCharge, SelectedSlot};
pub use config::{EngineConfig, Preprocessing};
pub use convert::{convert_or_zero, CurrencyConverter, RateTable};
pub use engine::TransferValidator;
pub use error::TransferRuleError;
pub use provider::{InMemoryRuleData, RuleDataProvider};
pub use types::{
    CategoryRule, ChargeApplicability, ChargeSlot, ConversionError, CurrencyCode, DiscountInfo,
    Fare, FarePath, FareUsage, FareUsageId, Itinerary, MatchState, MatchTransition, MaxExceeded,
    Money, Passenger, PassengerClass, PricingUnit, RelationalRuleSet, Relation, RuleEntry,
    RuleLocator, RuleMatch, RuleRecord, RuleTree, Scope, SegmentId, SegmentOutcome, SegmentState,
    SegmentStatus, SegmentTable, Surcharge, TransferLimit, TransferSurcharge, TravelSegment,
    UnitVerdict, ValidationReport, Verdict, NOT_APPLICABLE_ITEM, TRANSFER_CATEGORY,
};
