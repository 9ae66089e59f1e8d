//! Filters and orderings for listing results.
//!
//! Mirrors the lookup surface the presentation layer drives: restrict by
//! user, outcome set, association, asset, or grading-context codes, and
//! order by recency or score.

use std::cmp::Ordering;

use serde::{Deserialize, Serialize};

use crate::refs::{AssetRef, AssociationRef, OutcomeId, UserId};
use crate::result::OutcomeResult;

/// Restriction on the grading contexts a query spans.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ContextCodeFilter {
    /// No restriction; results from every context match.
    All,

    /// Only results whose context code is in the given set match. A record
    /// with no context code matches nothing here.
    Codes(Vec<String>),
}

impl ContextCodeFilter {
    /// Builds a code-set filter from anything yielding code strings.
    #[must_use]
    pub fn codes<I, S>(codes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::Codes(codes.into_iter().map(Into::into).collect())
    }

    /// True when a record with the given context code passes this filter.
    #[must_use]
    pub fn matches(&self, code: Option<&str>) -> bool {
        match self {
            Self::All => true,
            Self::Codes(codes) => code.is_some_and(|code| codes.iter().any(|c| c == code)),
        }
    }
}

impl Default for ContextCodeFilter {
    fn default() -> Self {
        Self::All
    }
}

/// Conjunctive filter over result records. Unset dimensions match
/// everything.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ResultFilter {
    /// Restrict to one user's results.
    pub user: Option<UserId>,
    /// Restrict to results tracking any of these outcomes.
    pub outcome_ids: Option<Vec<OutcomeId>>,
    /// Restrict to results attached to one association.
    pub association: Option<AssociationRef>,
    /// Restrict to results scoring one asset.
    pub asset: Option<AssetRef>,
    /// Restrict by grading-context code.
    pub context_codes: ContextCodeFilter,
}

impl ResultFilter {
    /// Creates a filter matching every record.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Restrict to one user's results.
    #[must_use]
    pub fn for_user(mut self, user: UserId) -> Self {
        self.user = Some(user);
        self
    }

    /// Restrict to results tracking any of the given outcomes.
    #[must_use]
    pub fn for_outcomes(mut self, outcome_ids: impl IntoIterator<Item = OutcomeId>) -> Self {
        self.outcome_ids = Some(outcome_ids.into_iter().collect());
        self
    }

    /// Restrict to results attached to the given association.
    #[must_use]
    pub fn for_association(mut self, association: AssociationRef) -> Self {
        self.association = Some(association);
        self
    }

    /// Restrict to results scoring the given asset.
    #[must_use]
    pub fn for_asset(mut self, asset: AssetRef) -> Self {
        self.asset = Some(asset);
        self
    }

    /// Restrict by grading-context code.
    #[must_use]
    pub fn for_context_codes(mut self, context_codes: ContextCodeFilter) -> Self {
        self.context_codes = context_codes;
        self
    }

    /// True when the record passes every set dimension of this filter.
    #[must_use]
    pub fn matches(&self, result: &OutcomeResult) -> bool {
        if let Some(user) = self.user {
            if result.user != user {
                return false;
            }
        }
        if let Some(outcome_ids) = &self.outcome_ids {
            if !outcome_ids.contains(&result.outcome) {
                return false;
            }
        }
        if let Some(association) = self.association {
            if result.association != association {
                return false;
            }
        }
        if let Some(asset) = self.asset {
            if result.asset != Some(asset) {
                return false;
            }
        }
        self.context_codes.matches(result.context_code.as_deref())
    }
}

/// Result list orderings. Records missing the ordering key sort last under
/// every variant; ties keep their stored order.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResultOrdering {
    /// Most recently assessed first.
    #[default]
    Recent,

    /// Highest score first.
    Highest,

    /// Lowest score first.
    Lowest,
}

impl ResultOrdering {
    /// Parses a request-parameter string.
    ///
    /// Accepts `recent`, `highest`, `oldest` (the historical name for the
    /// lowest-score ordering), and `default`; anything unrecognized maps to
    /// the default ordering.
    #[must_use]
    pub fn parse_param(param: &str) -> Self {
        match param {
            "highest" => Self::Highest,
            "oldest" => Self::Lowest,
            _ => Self::Recent,
        }
    }

    /// Sorts a result list in place under this ordering.
    pub fn sort(self, results: &mut [OutcomeResult]) {
        match self {
            Self::Recent => results
                .sort_by(|a, b| cmp_desc_unset_last(a.assessed_at.as_ref(), b.assessed_at.as_ref())),
            Self::Highest => {
                results.sort_by(|a, b| cmp_desc_unset_last(a.score.as_ref(), b.score.as_ref()));
            }
            Self::Lowest => {
                results.sort_by(|a, b| cmp_asc_unset_last(a.score.as_ref(), b.score.as_ref()));
            }
        }
    }
}

fn cmp_desc_unset_last<T: Ord>(a: Option<&T>, b: Option<&T>) -> Ordering {
    match (a, b) {
        (Some(a), Some(b)) => b.cmp(a),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}

fn cmp_asc_unset_last<T: Ord>(a: Option<&T>, b: Option<&T>) -> Ordering {
    match (a, b) {
        (Some(a), Some(b)) => a.cmp(b),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}
