//! Detection logic for each rule variant.

use std::collections::hash_map::Entry;
use std::collections::{HashMap, HashSet};

use tracing::{debug, warn};

use super::issue::{Issue, IssueCategory};
use super::patterns::Format;
use super::rules::{CustomCheck, Rule, RuleKind, RuleSet};
use crate::inference::values;
use crate::input::Dataset;
use crate::schema::{ColumnProfile, ColumnType};

/// Ordering key: category rank, anchor row, row, column position.
///
/// The anchor is the row itself for cell issues and the first occurrence for
/// duplicate rows. Column- and dataset-scoped issues have no row and sort
/// first within their category.
pub(crate) type SortKey = (u8, Option<usize>, Option<usize>, Option<usize>);

/// An issue paired with its ordering key.
#[derive(Debug)]
pub(crate) struct Finding {
    pub key: SortKey,
    pub issue: Issue,
}

/// Read-only state shared by every rule of one run.
pub(crate) struct ScanContext<'a> {
    dataset: &'a Dataset,
    profiles: &'a [ColumnProfile],
    /// Columns whose missing values are reported by a `required` format rule.
    required: HashSet<usize>,
    /// Date columns whose unparsable values a type-mismatch rule reports.
    date_typed: HashSet<usize>,
}

impl<'a> ScanContext<'a> {
    pub fn new(dataset: &'a Dataset, profiles: &'a [ColumnProfile], rules: &RuleSet) -> Self {
        let mut ctx = Self {
            dataset,
            profiles,
            required: HashSet::new(),
            date_typed: HashSet::new(),
        };

        let mut required = HashSet::new();
        let mut date_typed = HashSet::new();
        for rule in rules.enabled() {
            match &rule.kind {
                RuleKind::FormatViolation {
                    column,
                    format,
                    required: true,
                } => {
                    if let Ok(targets) = ctx.format_targets(column, *format) {
                        required.extend(targets.iter().map(|(p, _)| p.position));
                    }
                }
                RuleKind::TypeMismatch { column, expected } => {
                    let expected = *expected;
                    if let Ok(targets) = ctx.targets(column) {
                        date_typed.extend(
                            targets
                                .iter()
                                .filter(|p| {
                                    expected.unwrap_or_else(|| p.effective_type())
                                        == ColumnType::Date
                                })
                                .map(|p| p.position),
                        );
                    }
                }
                _ => {}
            }
        }
        ctx.required = required;
        ctx.date_typed = date_typed;
        ctx
    }

    fn profile(&self, name: &str) -> Option<&'a ColumnProfile> {
        self.profiles.iter().find(|p| p.name == name)
    }

    /// The named column, or every column.
    fn targets(&self, column: &Option<String>) -> Result<Vec<&'a ColumnProfile>, String> {
        match column {
            Some(name) => self
                .profile(name)
                .map(|p| vec![p])
                .ok_or_else(|| name.clone()),
            None => Ok(self.profiles.iter().collect()),
        }
    }

    /// Columns and formats a format rule applies to.
    fn format_targets(
        &self,
        column: &Option<String>,
        format: Option<Format>,
    ) -> Result<Vec<(&'a ColumnProfile, Format)>, String> {
        match column {
            Some(name) => {
                let profile = self.profile(name).ok_or_else(|| name.clone())?;
                Ok(format
                    .or_else(|| Format::for_column_name(name))
                    .map(|f| vec![(profile, f)])
                    .unwrap_or_default())
            }
            None => Ok(self
                .profiles
                .iter()
                .filter_map(|p| Format::for_column_name(&p.name).map(|f| (p, f)))
                .collect()),
        }
    }

    /// Non-missing values of a column with their row index.
    fn present(&self, profile: &ColumnProfile) -> impl Iterator<Item = (usize, &'a str)> {
        self.dataset
            .column_values(profile.position)
            .enumerate()
            .filter_map(|(row, v)| v.map(|v| (row, v)))
    }
}

/// Collects findings for a single rule.
struct Emitter<'r> {
    rule: &'r Rule,
    out: &'r mut Vec<Finding>,
}

impl Emitter<'_> {
    fn push(&mut self, key: SortKey, issue: Issue) {
        let issue = issue.with_severity(self.rule.severity).with_rule(&self.rule.name);
        self.out.push(Finding { key, issue });
    }

    fn category(&self) -> IssueCategory {
        self.rule.kind.category()
    }

    fn cell(&mut self, profile: &ColumnProfile, row: usize, message: String) {
        let category = self.category();
        let issue = Issue::new(category, message)
            .with_column(&profile.name)
            .with_row(row);
        self.push((category.rank(), Some(row), Some(row), Some(profile.position)), issue);
    }

    fn column(&mut self, profile: &ColumnProfile, message: String) {
        let category = self.category();
        let issue = Issue::new(category, message).with_column(&profile.name);
        self.push((category.rank(), None, None, Some(profile.position)), issue);
    }

    fn duplicate(&mut self, row: usize, first: usize, message: String) {
        let category = self.category();
        let issue = Issue::new(category, message).with_row(row);
        self.push((category.rank(), Some(first), Some(row), None), issue);
    }

    fn skip(&mut self, reason: String) {
        warn!(rule = %self.rule.name, reason = %reason, "rule skipped");
        let message = format!("Rule '{}' skipped: {}", self.rule.name, reason);
        let issue = Issue::new(IssueCategory::RuleSkipped, message).with_rule(&self.rule.name);
        self.out.push(Finding {
            key: (IssueCategory::RuleSkipped.rank(), None, None, None),
            issue,
        });
    }

    fn missing_column(&mut self, name: String) {
        self.skip(format!("column '{}' not found", name));
    }
}

/// Run one rule, appending its findings.
pub(crate) fn run(rule: &Rule, ctx: &ScanContext<'_>, out: &mut Vec<Finding>) {
    let mut em = Emitter { rule, out };

    match &rule.kind {
        RuleKind::MissingValue { column, threshold } => missing_values(ctx, &mut em, column, *threshold),
        RuleKind::DuplicateRow { columns } => duplicate_rows(ctx, &mut em, columns.as_deref()),
        RuleKind::TypeMismatch { column, expected } => type_mismatches(ctx, &mut em, column, *expected),
        RuleKind::FormatViolation {
            column,
            format,
            required,
        } => format_violations(ctx, &mut em, column, *format, *required),
        RuleKind::RangeViolation { column, min, max } => {
            range_violations(ctx, &mut em, column, *min, *max)
        }
        RuleKind::Outlier {
            column,
            multiplier,
            min_values,
        } => outliers(ctx, &mut em, column, *multiplier, *min_values),
        RuleKind::Custom { column, check } => custom(ctx, &mut em, column, check),
    }
}

fn missing_values(
    ctx: &ScanContext<'_>,
    em: &mut Emitter<'_>,
    column: &Option<String>,
    threshold: Option<f64>,
) {
    let targets = match ctx.targets(column) {
        Ok(t) => t,
        Err(name) => return em.missing_column(name),
    };

    for profile in targets {
        if ctx.required.contains(&profile.position) {
            continue;
        }

        match threshold {
            Some(threshold) => {
                if profile.null_ratio() > threshold {
                    em.column(
                        profile,
                        format!(
                            "Column '{}' is {:.1}% missing ({} of {} values, threshold {:.1}%)",
                            profile.name,
                            profile.null_percentage(),
                            profile.null_count,
                            profile.count,
                            threshold * 100.0
                        ),
                    );
                }
            }
            None => {
                let missing_rows = ctx
                    .dataset
                    .column_values(profile.position)
                    .enumerate()
                    .filter(|(_, v)| v.is_none())
                    .map(|(row, _)| row);
                for row in missing_rows {
                    em.cell(
                        profile,
                        row,
                        format!("Missing value in column '{}' at row {}", profile.name, row + 1),
                    );
                }
            }
        }
    }
}

fn duplicate_rows(ctx: &ScanContext<'_>, em: &mut Emitter<'_>, columns: Option<&[String]>) {
    let indices: Vec<usize> = match columns {
        None => (0..ctx.dataset.column_count()).collect(),
        Some(names) => {
            let mut indices = Vec::with_capacity(names.len());
            for name in names {
                match ctx.profile(name) {
                    Some(profile) => indices.push(profile.position),
                    None => return em.missing_column(name.clone()),
                }
            }
            indices
        }
    };

    let mut first_seen: HashMap<Vec<Option<&str>>, usize> = HashMap::new();
    for row in 0..ctx.dataset.row_count() {
        let key: Vec<Option<&str>> = indices.iter().map(|&col| ctx.dataset.get(row, col)).collect();
        match first_seen.entry(key) {
            Entry::Occupied(entry) => {
                let first = *entry.get();
                em.duplicate(
                    row,
                    first,
                    format!("Row {} duplicates row {}", row + 1, first + 1),
                );
            }
            Entry::Vacant(entry) => {
                entry.insert(row);
            }
        }
    }
}

fn type_mismatches(
    ctx: &ScanContext<'_>,
    em: &mut Emitter<'_>,
    column: &Option<String>,
    expected: Option<ColumnType>,
) {
    let targets = match ctx.targets(column) {
        Ok(t) => t,
        Err(name) => return em.missing_column(name),
    };

    for profile in targets {
        let column_type = expected.unwrap_or_else(|| profile.effective_type());
        if !column_type.is_typed() {
            continue;
        }

        for (row, value) in ctx.present(profile) {
            if !values::conforms_to(column_type, value) {
                em.cell(
                    profile,
                    row,
                    format!(
                        "Value '{}' in column '{}' at row {} is not a valid {}",
                        value,
                        profile.name,
                        row + 1,
                        column_type
                    ),
                );
            }
        }
    }
}

fn format_violations(
    ctx: &ScanContext<'_>,
    em: &mut Emitter<'_>,
    column: &Option<String>,
    format: Option<Format>,
    required: bool,
) {
    let targets = match ctx.format_targets(column, format) {
        Ok(t) => t,
        Err(name) => return em.missing_column(name),
    };

    for (profile, format) in targets {
        // Name-designated date checks defer to the type check on date columns.
        let reported_as_type = column.is_none()
            && format == Format::Date
            && ctx.date_typed.contains(&profile.position);

        for (row, value) in ctx.dataset.column_values(profile.position).enumerate() {
            match value {
                Some(value) if !reported_as_type && !format.matches(value) => em.cell(
                    profile,
                    row,
                    format!(
                        "Value '{}' in column '{}' at row {} is not a valid {}",
                        value,
                        profile.name,
                        row + 1,
                        format
                    ),
                ),
                None if required => em.cell(
                    profile,
                    row,
                    format!(
                        "Missing required {} in column '{}' at row {}",
                        format,
                        profile.name,
                        row + 1
                    ),
                ),
                _ => {}
            }
        }
    }
}

/// Resolve a single named column that must be numeric.
///
/// `None` means the rule has nothing to do: the column is all-missing, or the
/// rule was already recorded as skipped.
fn numeric_column<'a>(
    ctx: &ScanContext<'a>,
    em: &mut Emitter<'_>,
    name: &str,
) -> Option<&'a ColumnProfile> {
    let Some(profile) = ctx.profile(name) else {
        em.missing_column(name.to_string());
        return None;
    };

    match profile.effective_type() {
        ColumnType::Unknown => None,
        t if t.is_numeric() => Some(profile),
        t => {
            em.skip(format!("column '{}' is {}, not numeric", name, t));
            None
        }
    }
}

fn range_violations(
    ctx: &ScanContext<'_>,
    em: &mut Emitter<'_>,
    column: &str,
    min: Option<f64>,
    max: Option<f64>,
) {
    let Some(profile) = numeric_column(ctx, em, column) else {
        return;
    };

    let range = match (min, max) {
        (Some(lo), Some(hi)) => format!("[{}, {}]", lo, hi),
        (Some(lo), None) => format!(">= {}", lo),
        (None, Some(hi)) => format!("<= {}", hi),
        (None, None) => return,
    };

    for (row, value) in ctx.present(profile) {
        let Some(n) = values::parse_number(value) else {
            continue;
        };
        let below = min.is_some_and(|lo| n < lo);
        let above = max.is_some_and(|hi| n > hi);
        if below || above {
            em.cell(
                profile,
                row,
                format!(
                    "Value {} in column '{}' at row {} is outside the allowed range {}",
                    value.trim(),
                    profile.name,
                    row + 1,
                    range
                ),
            );
        }
    }
}

fn outliers(
    ctx: &ScanContext<'_>,
    em: &mut Emitter<'_>,
    column: &Option<String>,
    multiplier: f64,
    min_values: usize,
) {
    let targets: Vec<&ColumnProfile> = match column {
        Some(name) => numeric_column(ctx, em, name).into_iter().collect(),
        None => ctx
            .profiles
            .iter()
            .filter(|p| p.effective_type().is_numeric())
            .collect(),
    };

    for profile in targets {
        let Some(stats) = &profile.numeric else {
            continue;
        };
        if stats.count < min_values || stats.iqr() <= 0.0 {
            debug!(
                column = %profile.name,
                values = stats.count,
                iqr = stats.iqr(),
                "outlier detection not applicable"
            );
            continue;
        }

        let (lower, upper) = stats.iqr_bounds(multiplier);
        for (row, value) in ctx.present(profile) {
            let Some(n) = values::parse_number(value) else {
                continue;
            };
            if n < lower || n > upper {
                em.cell(
                    profile,
                    row,
                    format!(
                        "Value {} in column '{}' at row {} is an outlier (expected between {} and {})",
                        value.trim(),
                        profile.name,
                        row + 1,
                        lower,
                        upper
                    ),
                );
            }
        }
    }
}

fn custom(ctx: &ScanContext<'_>, em: &mut Emitter<'_>, column: &str, check: &CustomCheck) {
    let Some(profile) = ctx.profile(column) else {
        return em.missing_column(column.to_string());
    };

    for (row, value) in ctx.present(profile) {
        let violation = match check {
            CustomCheck::Pattern(re) if !re.is_match(value) => {
                format!("does not match pattern '{}'", re.as_str())
            }
            CustomCheck::AllowedValues(allowed) if !allowed.iter().any(|a| a == value.trim()) => {
                "is not one of the allowed values".to_string()
            }
            _ => continue,
        };
        em.cell(
            profile,
            row,
            format!(
                "Value '{}' in column '{}' at row {} {}",
                value,
                profile.name,
                row + 1,
                violation
            ),
        );
    }
}
