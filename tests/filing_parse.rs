use transfer_rules::parse::{parse_limit, parse_rule_sets};
use transfer_rules::{
    InMemoryRuleData, Preprocessing, Relation, RelationalRuleSet, RuleRecord, TransferLimit,
    TransferRuleError,
};

fn record(item_no: u32, max: &str) -> RuleRecord {
    let mut r = RuleRecord::new(item_no);
    r.max_transfers = TransferLimit::parse_filed(max).unwrap();
    r
}

#[test]
fn filed_rule_derives_least_restrictive_cap() {
    let filing = r#"
# carrier AA, rule 0100
THEN 100 AND 200
THEN 300 OR 400 IF 900/3
"#;
    let rule = parse_rule_sets(filing).unwrap();
    assert_eq!(rule.sets.len(), 2);
    assert_eq!(rule.relation_indicators(), (true, true));

    let data = InMemoryRuleData::new()
        .with_record(record(100, "1"))
        .with_record(record(200, " 2"))
        .with_record(record(300, "2"))
        .with_record(record(400, ""))
        .with_record(record(900, "XX"));

    // 100 AND 200 sums to 3; 400 is blank, so unlimited, and wins its set.
    let pre = Preprocessing::new()
        .with_category_rule(rule)
        .with_derived_least_restrictive(&data, false);
    assert_eq!(pre.least_restrictive_cap, TransferLimit::Unlimited);
}

#[test]
fn qualifiers_never_contribute() {
    let set = RelationalRuleSet::from_filing("THEN 1 IF 2").unwrap();
    assert_eq!(set.alternatives().len(), 1);
    assert_eq!(set.relation_indicator(), None);
    let cap = set.fold_cap(|e| match e.item_no {
        1 => Some(TransferLimit::Limited(1)),
        _ => Some(TransferLimit::Unlimited),
    });
    assert_eq!(cap, Some(TransferLimit::Limited(1)));
}

#[test]
fn other_categories_never_contribute() {
    let set = RelationalRuleSet::from_filing("THEN 1 AND 2/3").unwrap();
    assert_eq!(set.relation_indicator(), Some(Relation::And));
    assert!(!set.entries()[1].is_transfer());
    let cap = set.fold_cap(|_| Some(TransferLimit::Limited(2)));
    assert_eq!(cap, Some(TransferLimit::Limited(2)));
}

#[test]
fn tree_groups_and_chains_under_or() {
    let set = RelationalRuleSet::from_filing("THEN 1 AND 2 OR 3 AND 4 OR 5").unwrap();
    assert_eq!(set.tree().to_string(), "((1 AND 2) OR (3 AND 4) OR 5)");
    assert_eq!(set.to_string(), "THEN 1 AND 2 OR 3 AND 4 OR 5");
}

#[test]
fn malformed_filing_is_a_parse_error() {
    let err = RelationalRuleSet::from_filing("THEN 1 AND").unwrap_err();
    assert!(matches!(err, TransferRuleError::Parse(_)));
    assert!(err.to_string().starts_with("parse error:"));

    assert!(parse_rule_sets("").is_err());
    assert!(parse_rule_sets("THEN 1 THEN").is_err());
}

#[test]
fn count_fields() {
    assert_eq!(parse_limit("xx").unwrap(), Some(TransferLimit::Unlimited));
    assert_eq!(parse_limit("0").unwrap(), Some(TransferLimit::Limited(0)));
    assert!(parse_limit("-1").is_err());
    assert!(TransferLimit::parse_filed("two").is_err());
}
