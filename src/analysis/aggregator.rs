//! Ballot aggregation and statistics.
//!
//! This module folds loaded submissions into per-label, per-product and
//! per-user tallies, and keeps one detailed record per decisive ballot.

use crate::models::{Submission, VariantLabel, Vote};
use std::collections::{BTreeMap, HashSet};

/// Vote counts per variant label.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Tally {
    counts: BTreeMap<VariantLabel, u64>,
}

impl Tally {
    /// Add one vote for `label`, inserting a zero count first if needed.
    pub fn increment(&mut self, label: &VariantLabel) {
        *self.counts.entry(label.clone()).or_insert(0) += 1;
    }

    /// Count for `label`, zero when it never received a vote.
    pub fn get(&self, label: &VariantLabel) -> u64 {
        self.counts.get(label).copied().unwrap_or(0)
    }

    /// Sum of all counts. A multi-select ballot contributes once per label.
    pub fn total(&self) -> u64 {
        self.counts.values().sum()
    }

    /// Labels with at least one vote, known labels first in report order.
    pub fn iter(&self) -> impl Iterator<Item = (&VariantLabel, u64)> {
        self.counts.iter().map(|(label, count)| (label, *count))
    }

    /// Known labels plus any extra labels that received votes, in report order.
    pub fn labels_for_report(&self) -> Vec<VariantLabel> {
        let mut labels: Vec<VariantLabel> = VariantLabel::KNOWN.to_vec();
        labels.extend(
            self.counts
                .keys()
                .filter(|l| matches!(l, VariantLabel::Other(_)))
                .cloned(),
        );
        labels
    }
}

/// One decisive ballot, flattened for export.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DetailedRecord {
    pub user_id: String,
    pub product_id: String,
    pub product_name: String,
    pub vote: Vote,
    pub display_order: Vec<String>,
    pub timestamp: String,
}

/// Complete rollup of every decisive ballot in a run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Aggregate {
    /// Distinct voter ids seen, whether or not they cast a decisive vote.
    pub total_voters: u64,
    /// Ballots carrying a "none" vote or at least one selection.
    pub total_evaluations: u64,
    pub version_counts: Tally,
    /// Per-product tallies in first-seen order.
    pub product_counts: Vec<(String, Tally)>,
    pub user_counts: BTreeMap<String, Tally>,
    /// Detailed records in submission order.
    pub records: Vec<DetailedRecord>,
}

impl Aggregate {
    /// Tally for a product id, if it received any decisive ballot.
    #[cfg(test)]
    pub fn product_tally(&self, product_id: &str) -> Option<&Tally> {
        self.product_counts
            .iter()
            .find(|(id, _)| id == product_id)
            .map(|(_, tally)| tally)
    }

    /// Products ordered by numeric id.
    ///
    /// Non-numeric ids sort as 0; the sort is stable so they keep first-seen order.
    pub fn sorted_products(&self) -> Vec<(&str, &Tally)> {
        let mut products: Vec<(&str, &Tally)> = self
            .product_counts
            .iter()
            .map(|(id, tally)| (id.as_str(), tally))
            .collect();
        products.sort_by_key(|(id, _)| numeric_key(id));
        products
    }

    fn product_tally_mut(&mut self, product_id: &str) -> &mut Tally {
        let idx = match self.product_counts.iter().position(|(id, _)| id == product_id) {
            Some(idx) => idx,
            None => {
                self.product_counts
                    .push((product_id.to_string(), Tally::default()));
                self.product_counts.len() - 1
            }
        };
        &mut self.product_counts[idx].1
    }
}

fn numeric_key(id: &str) -> u64 {
    if !id.is_empty() && id.chars().all(|c| c.is_ascii_digit()) {
        id.parse().unwrap_or(u64::MAX)
    } else {
        0
    }
}

/// Percentage of `count` over `total`, 0.0 when `total` is zero.
pub fn percentage(count: u64, total: u64) -> f64 {
    if total == 0 {
        0.0
    } else {
        count as f64 / total as f64 * 100.0
    }
}

/// Fold all submissions into an [`Aggregate`].
///
/// Ballots without any vote signal are skipped: they add no tally and no record.
pub fn aggregate(submissions: &[Submission]) -> Aggregate {
    let mut agg = Aggregate::default();
    let mut seen_users: HashSet<&str> = HashSet::new();

    for submission in submissions {
        let user_id = submission.user_id.as_str();
        if seen_users.insert(user_id) {
            agg.total_voters += 1;
        }

        for ballot in &submission.results {
            let Some(vote) = ballot.shape().vote() else {
                continue;
            };

            agg.total_evaluations += 1;
            for label in vote.labels() {
                agg.version_counts.increment(&label);
                agg.product_tally_mut(&ballot.product_id).increment(&label);
                agg.user_counts
                    .entry(user_id.to_string())
                    .or_default()
                    .increment(&label);
            }

            agg.records.push(DetailedRecord {
                user_id: user_id.to_string(),
                product_id: ballot.product_id.clone(),
                product_name: ballot.product_name.clone(),
                vote,
                display_order: ballot.order.clone(),
                timestamp: submission.timestamp.clone(),
            });
        }
    }

    agg
}
