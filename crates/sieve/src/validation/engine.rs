//! Rule engine: runs a rule set over a profiled dataset.

use tracing::debug;

use super::checks::{self, Finding, ScanContext};
use super::issue::Issue;
use super::rules::{Rule, RuleSet};
use crate::input::Dataset;
use crate::schema::ColumnProfile;

/// Applies a [`RuleSet`] to a dataset and its profiles.
///
/// Output order depends only on the data and the rules, never on the order
/// rules are listed in: issues are grouped by category (missing values,
/// duplicates, type mismatches, formats, ranges, outliers, then skipped
/// rules) and ordered by row, then column, then rule name inside each group.
#[derive(Debug, Clone, Copy, Default)]
pub struct RuleEngine;

impl RuleEngine {
    pub fn new() -> Self {
        Self
    }

    /// Evaluate every enabled rule and return the ordered issues.
    pub fn evaluate(
        &self,
        dataset: &Dataset,
        profiles: &[ColumnProfile],
        rules: &RuleSet,
    ) -> Vec<Issue> {
        let ctx = ScanContext::new(dataset, profiles, rules);

        let mut ordered: Vec<&Rule> = rules.enabled().collect();
        ordered.sort_by_key(|rule| rule.kind.category());

        let mut findings: Vec<Finding> = Vec::new();
        for rule in ordered {
            let before = findings.len();
            checks::run(rule, &ctx, &mut findings);
            debug!(
                rule = %rule.name,
                category = %rule.kind.category(),
                issues = findings.len() - before,
                "evaluated rule"
            );
        }

        findings.sort_by(|a, b| {
            a.key
                .cmp(&b.key)
                .then_with(|| a.issue.rule.cmp(&b.issue.rule))
        });
        findings.into_iter().map(|f| f.issue).collect()
    }
}
