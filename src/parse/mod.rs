mod error;
mod grammar;

pub use error::ParseError;

use winnow::Parser;

use crate::types::{CategoryRule, RelationalRuleSet, TransferLimit};

/// Parse one filed relational set, e.g. `THEN 1001 AND 1002 IF 2001/3`.
///
/// # Errors
///
/// Returns [`ParseError`] if the input is not a single well-formed set.
pub fn parse_rule_set(input: &str) -> Result<RelationalRuleSet, ParseError> {
    grammar::single_rule_set
        .parse(input)
        .map_err(|e| ParseError::new(e.to_string()))
}

/// Parse every set filed under one rule. Each set opens with `THEN`.
///
/// The returned rule carries a default locator; callers set it.
///
/// # Errors
///
/// Returns [`ParseError`] if any set is malformed.
pub fn parse_rule_sets(input: &str) -> Result<CategoryRule, ParseError> {
    grammar::rule_sets
        .parse(input)
        .map_err(|e| ParseError::new(e.to_string()))
}

/// Parse a filed count field: `XX`, digits, or blank.
///
/// # Errors
///
/// Returns [`ParseError`] for any other content.
pub fn parse_limit(input: &str) -> Result<Option<TransferLimit>, ParseError> {
    grammar::limit_field
        .parse(input)
        .map_err(|e| ParseError::new(e.to_string()))
}
