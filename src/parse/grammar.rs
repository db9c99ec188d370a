use winnow::ascii::{dec_uint, space0, till_line_ending};
use winnow::combinator::{alt, cut_err, delimited, opt, preceded, repeat};
use winnow::error::{ModalResult, StrContext, StrContextValue};
use winnow::prelude::*;
use winnow::token::take_while;

use crate::types::{CategoryRule, RelationalRuleSet, Relation, RuleEntry, RuleLocator, TransferLimit};

// -- Whitespace & comments --------------------------------------------------

fn ws(input: &mut &str) -> ModalResult<()> {
    let _: () = repeat(
        0..,
        alt((
            take_while(1.., |c: char| c.is_ascii_whitespace()).void(),
            ('#', till_line_ending).void(),
        )),
    )
    .parse_next(input)?;
    Ok(())
}

// -- Entries ----------------------------------------------------------------

fn combining_relation(input: &mut &str) -> ModalResult<Relation> {
    ws.parse_next(input)?;
    alt((
        alt(("AND", "and")).value(Relation::And),
        alt(("OR", "or")).value(Relation::Or),
        alt(("IF", "if")).value(Relation::If),
    ))
    .parse_next(input)
}

/// `1001` or `1001/3`; the category defaults to transfers.
fn item_ref(input: &mut &str) -> ModalResult<(u32, Option<u16>)> {
    ws.parse_next(input)?;
    let item_no = dec_uint::<_, u32, _>
        .context(StrContext::Expected(StrContextValue::Description(
            "item number",
        )))
        .parse_next(input)?;
    let category = opt(preceded(
        '/',
        cut_err(dec_uint::<_, u16, _>).context(StrContext::Expected(
            StrContextValue::Description("category number"),
        )),
    ))
    .parse_next(input)?;
    Ok((item_no, category))
}

fn entry(relation: Relation, (item_no, category): (u32, Option<u16>)) -> RuleEntry {
    let entry = RuleEntry::new(relation, item_no);
    match category {
        Some(c) => entry.in_category(c),
        None => entry,
    }
}

// -- Sets -------------------------------------------------------------------

pub fn rule_set(input: &mut &str) -> ModalResult<RelationalRuleSet> {
    ws.parse_next(input)?;
    alt(("THEN", "then"))
        .context(StrContext::Expected(StrContextValue::StringLiteral("THEN")))
        .parse_next(input)?;
    let first = cut_err(item_ref).parse_next(input)?;

    let rest: Vec<(Relation, (u32, Option<u16>))> =
        repeat(0.., (combining_relation, cut_err(item_ref))).parse_next(input)?;

    let mut entries = Vec::with_capacity(rest.len() + 1);
    entries.push(entry(Relation::Then, first));
    entries.extend(rest.into_iter().map(|(rel, item)| entry(rel, item)));
    Ok(RelationalRuleSet::new(entries))
}

/// One or more sets, each opened by `THEN`.
pub fn rule_sets(input: &mut &str) -> ModalResult<CategoryRule> {
    let sets: Vec<RelationalRuleSet> = repeat(1.., rule_set).parse_next(input)?;
    ws.parse_next(input)?;
    Ok(CategoryRule::new(RuleLocator::default(), sets))
}

pub fn single_rule_set(input: &mut &str) -> ModalResult<RelationalRuleSet> {
    let set = rule_set(input)?;
    ws.parse_next(input)?;
    Ok(set)
}

// -- Count fields -----------------------------------------------------------

pub fn limit_field(input: &mut &str) -> ModalResult<Option<TransferLimit>> {
    delimited(
        space0,
        opt(alt((
            alt(("XX", "xx")).value(TransferLimit::Unlimited),
            dec_uint::<_, u16, _>.map(TransferLimit::Limited),
        ))),
        space0,
    )
    .parse_next(input)
}
