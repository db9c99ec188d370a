use std::fmt;

use super::limit::TransferLimit;
use super::record::RuleLocator;

/// Category number of transfer rules. Entries of other categories can share a
/// relational set but never contribute to a transfer cap.
pub const TRANSFER_CATEGORY: u16 = 9;

/// How an entry relates to its predecessor in a filed set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Relation {
    Then,
    And,
    Or,
    /// Starts the qualifier part of the set; nothing from here on is an alternative.
    If,
}

impl fmt::Display for Relation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Relation::Then => write!(f, "THEN"),
            Relation::And => write!(f, "AND"),
            Relation::Or => write!(f, "OR"),
            Relation::If => write!(f, "IF"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct RuleEntry {
    pub relation: Relation,
    pub category: u16,
    pub item_no: u32,
}

impl RuleEntry {
    #[must_use]
    pub fn new(relation: Relation, item_no: u32) -> Self {
        Self {
            relation,
            category: TRANSFER_CATEGORY,
            item_no,
        }
    }

    #[must_use]
    pub fn in_category(mut self, category: u16) -> Self {
        self.category = category;
        self
    }

    #[must_use]
    pub fn is_transfer(&self) -> bool {
        self.category == TRANSFER_CATEGORY
    }
}

/// Combination of rule alternatives as a tagged tree.
///
/// A cap folds as: `And` sums its members, `Or` takes the most permissive.
/// Members whose leaf evaluator yields `None` are skipped.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RuleTree {
    Leaf(RuleEntry),
    And(Vec<RuleTree>),
    Or(Vec<RuleTree>),
}

impl RuleTree {
    pub fn fold_cap<F>(&self, leaf: &mut F) -> Option<TransferLimit>
    where
        F: FnMut(&RuleEntry) -> Option<TransferLimit>,
    {
        match self {
            RuleTree::Leaf(entry) => leaf(entry),
            RuleTree::And(children) => children
                .iter()
                .filter_map(|c| c.fold_cap(leaf))
                .reduce(TransferLimit::saturating_add),
            RuleTree::Or(children) => children.iter().filter_map(|c| c.fold_cap(leaf)).max(),
        }
    }
}

impl fmt::Display for RuleTree {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RuleTree::Leaf(entry) => write!(f, "{}", entry.item_no),
            RuleTree::And(children) => write_joined(f, children, " AND "),
            RuleTree::Or(children) => write_joined(f, children, " OR "),
        }
    }
}

fn write_joined(f: &mut fmt::Formatter<'_>, children: &[RuleTree], sep: &str) -> fmt::Result {
    write!(f, "(")?;
    for (i, child) in children.iter().enumerate() {
        if i > 0 {
            f.write_str(sep)?;
        }
        write!(f, "{child}")?;
    }
    write!(f, ")")
}

/// One filed set of rule entries: a leading `THEN`, then `AND`/`OR`
/// alternatives, then optional `IF` qualifiers.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct RelationalRuleSet {
    entries: Vec<RuleEntry>,
}

impl RelationalRuleSet {
    #[must_use]
    pub fn new(entries: Vec<RuleEntry>) -> Self {
        Self { entries }
    }

    /// A set holding one rule and nothing else.
    #[must_use]
    pub fn single(item_no: u32) -> Self {
        Self::new(vec![RuleEntry::new(Relation::Then, item_no)])
    }

    /// Parse the filed notation, e.g. `THEN 100 AND 200 OR 300 IF 400/3`.
    ///
    /// # Errors
    ///
    /// Returns [`TransferRuleError::Parse`](crate::TransferRuleError::Parse)
    /// if the text is not a valid filing.
    pub fn from_filing(input: &str) -> Result<Self, crate::TransferRuleError> {
        Ok(crate::parse::parse_rule_set(input)?)
    }

    #[must_use]
    pub fn entries(&self) -> &[RuleEntry] {
        &self.entries
    }

    /// Entries before the first `IF`.
    #[must_use]
    pub fn alternatives(&self) -> &[RuleEntry] {
        let end = self
            .entries
            .iter()
            .position(|e| e.relation == Relation::If)
            .unwrap_or(self.entries.len());
        &self.entries[..end]
    }

    /// The first combining relation of the set: `And`, `Or`, or `None` for a
    /// plain `THEN` set. Scanning stops at `IF`.
    #[must_use]
    pub fn relation_indicator(&self) -> Option<Relation> {
        self.alternatives()
            .iter()
            .map(|e| e.relation)
            .find(|r| matches!(r, Relation::And | Relation::Or))
    }

    /// Build the tree: `OR` (and `THEN`) start a new alternative, `AND`
    /// extends the current one.
    #[must_use]
    pub fn tree(&self) -> RuleTree {
        let mut alternatives: Vec<Vec<RuleTree>> = Vec::new();
        for entry in self.alternatives() {
            if entry.relation == Relation::And {
                if let Some(chain) = alternatives.last_mut() {
                    chain.push(RuleTree::Leaf(*entry));
                    continue;
                }
            }
            alternatives.push(vec![RuleTree::Leaf(*entry)]);
        }

        let mut ors: Vec<RuleTree> = alternatives
            .into_iter()
            .map(|mut chain| {
                if chain.len() == 1 {
                    chain.remove(0)
                } else {
                    RuleTree::And(chain)
                }
            })
            .collect();

        if ors.len() == 1 {
            ors.remove(0)
        } else {
            RuleTree::Or(ors)
        }
    }

    /// Fold the transfer entries of this set into a cap. Entries of other
    /// categories are skipped before `leaf` is consulted.
    pub fn fold_cap<F>(&self, mut leaf: F) -> Option<TransferLimit>
    where
        F: FnMut(&RuleEntry) -> Option<TransferLimit>,
    {
        self.tree().fold_cap(&mut |entry: &RuleEntry| {
            if entry.is_transfer() {
                leaf(entry)
            } else {
                None
            }
        })
    }
}

impl fmt::Display for RelationalRuleSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, entry) in self.entries.iter().enumerate() {
            if i > 0 {
                write!(f, " ")?;
            }
            write!(f, "{} {}", entry.relation, entry.item_no)?;
            if !entry.is_transfer() {
                write!(f, "/{}", entry.category)?;
            }
        }
        Ok(())
    }
}

/// All relational sets filed under one rule for the transfer category.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CategoryRule {
    pub locator: RuleLocator,
    pub sets: Vec<RelationalRuleSet>,
}

impl CategoryRule {
    #[must_use]
    pub fn new(locator: RuleLocator, sets: Vec<RelationalRuleSet>) -> Self {
        Self { locator, sets }
    }

    /// Whether any set combines with `AND`, and whether any combines with `OR`.
    #[must_use]
    pub fn relation_indicators(&self) -> (bool, bool) {
        let mut has_and = false;
        let mut has_or = false;
        for set in &self.sets {
            match set.relation_indicator() {
                Some(Relation::And) => has_and = true,
                Some(Relation::Or) => has_or = true,
                _ => {}
            }
        }
        (has_and, has_or)
    }

    /// Sets are alternatives of each other, so the category folds to the most
    /// permissive set cap.
    pub fn fold_cap<F>(&self, mut leaf: F) -> Option<TransferLimit>
    where
        F: FnMut(&RuleEntry) -> Option<TransferLimit>,
    {
        self.sets.iter().filter_map(|s| s.fold_cap(&mut leaf)).max()
    }
}
