//! End-to-end validation scenarios.

use sieve::{
    Dataset, HistoryStore, IssueCategory, ReadinessLevel, RuleSet, SessionComparator,
    SessionSummary, Sieve, SieveError, Trend, ValidationResult,
};

fn customers() -> Dataset {
    Dataset::from_strings(
        &["id", "name", "email", "age"],
        &[
            vec!["1", "Alice", "alice@example.com", "30"],
            vec!["2", "Bob", "", "27"],
            vec!["3", "Charlie", "charlie@example.com", "not_a_number"],
            vec!["4", "", "david@example.com", "45"],
            vec!["5", "Eve", "eve@example.com", ""],
        ],
    )
    .expect("valid dataset")
}

fn validate(dataset: &Dataset) -> ValidationResult {
    Sieve::new()
        .validate(dataset, &RuleSet::default_rules())
        .expect("validation failed")
}

// =============================================================================
// Scenario 1: missing values and a type mismatch
// =============================================================================

#[test]
fn test_missing_values_and_type_mismatch() {
    let result = validate(&customers());

    let found: Vec<(IssueCategory, Option<usize>, Option<&str>)> = result
        .issues
        .iter()
        .map(|i| (i.category, i.row, i.column.as_deref()))
        .collect();

    // Rows are zero-based: row 2 in the table is index 1.
    assert_eq!(
        found,
        vec![
            (IssueCategory::MissingValue, Some(1), Some("email")),
            (IssueCategory::MissingValue, Some(3), Some("name")),
            (IssueCategory::MissingValue, Some(4), Some("age")),
            (IssueCategory::TypeMismatch, Some(2), Some("age")),
        ]
    );
    assert_eq!(result.summary.by_category[&IssueCategory::DuplicateRow], 0);
    assert!(result.issues[3].message.contains("not_a_number"));
}

#[test]
fn test_scenario_one_score() {
    let result = validate(&customers());
    // 3 medium (1.5) + 1 high (3) = 7.5 deducted
    assert_eq!(result.ml_score, 93);
    assert_eq!(result.ml_level, ReadinessLevel::Excellent);
    assert_eq!(result.recommendations.len(), 2);
    assert_eq!(result.rows, 5);
    assert_eq!(result.columns, 4);
    assert_eq!(result.profiles.len(), 4);
}

// =============================================================================
// Scenario 2: duplicate rows
// =============================================================================

#[test]
fn test_duplicate_rows_reference_first_occurrence() {
    let row = vec!["1", "Alice", "alice@example.com", "30"];
    let dataset = Dataset::from_strings(
        &["id", "name", "email", "age"],
        &vec![row; 5],
    )
    .unwrap();

    let result = validate(&dataset);
    let duplicates: Vec<_> = result
        .issues
        .iter()
        .filter(|i| i.category == IssueCategory::DuplicateRow)
        .collect();

    assert_eq!(duplicates.len(), 4);
    for (issue, row) in duplicates.iter().zip(1..) {
        assert_eq!(issue.row, Some(row));
        assert!(issue.message.ends_with("duplicates row 1"));
    }
}

// =============================================================================
// Scenario 3: outliers
// =============================================================================

#[test]
fn test_outlier_flags_only_extreme_value() {
    let dataset = Dataset::from_strings(
        &["reading"],
        &[
            vec!["10"],
            vec!["11"],
            vec!["9"],
            vec!["10"],
            vec!["12"],
            vec!["1000"],
        ],
    )
    .unwrap();

    let result = validate(&dataset);
    let outliers: Vec<_> = result
        .issues
        .iter()
        .filter(|i| i.category == IssueCategory::Outlier)
        .collect();

    assert_eq!(outliers.len(), 1);
    assert_eq!(outliers[0].row, Some(5));
    assert!(outliers[0].message.contains("1000"));
}

// =============================================================================
// Scenario 4: comparing sessions
// =============================================================================

#[test]
fn test_fewer_issues_is_improving() {
    let mut baseline = validate(&customers());
    baseline.summary.total = 20;
    let mut current = baseline.clone();
    current.summary.total = 15;

    let mut store = HistoryStore::new();
    let first = store.insert(SessionSummary::from_result("customers.csv", &baseline));
    let second = store.insert(SessionSummary::from_result("customers.csv", &current));

    let comparison = SessionComparator::new()
        .compare(&store, first, second)
        .unwrap();
    assert_eq!(comparison.total_issues_change_pct, -25.0);
    assert_eq!(comparison.trend, Trend::Improving);
}

// =============================================================================
// Scenario 5: invalid datasets
// =============================================================================

#[test]
fn test_zero_column_dataset_fails() {
    let err = Dataset::new(Vec::new(), Vec::new()).unwrap_err();
    assert!(matches!(err, SieveError::InvalidDataset(_)));
}

#[test]
fn test_ragged_dataset_fails() {
    let err = Dataset::new(
        vec!["a".into(), "b".into()],
        vec![vec![Some("1".into())]],
    )
    .unwrap_err();
    assert!(matches!(err, SieveError::InvalidDataset(_)));
}

#[test]
fn test_zero_row_dataset_is_valid() {
    let dataset = Dataset::new(vec!["a".into(), "email".into()], Vec::new()).unwrap();
    let result = validate(&dataset);
    assert!(result.issues.is_empty());
    assert_eq!(result.ml_score, 100);
    assert_eq!(result.profiles.len(), 2);
}

// =============================================================================
// Invariants
// =============================================================================

#[test]
fn test_issue_columns_exist_in_profiles() {
    let result = validate(&customers());
    for issue in &result.issues {
        if let Some(column) = &issue.column {
            assert!(result.profiles.iter().any(|p| &p.name == column));
        }
    }
}

#[test]
fn test_repeated_runs_are_identical_except_timestamp() {
    let dataset = customers();
    let mut a = validate(&dataset);
    let b = validate(&dataset);
    a.created_at = b.created_at;

    assert_eq!(
        serde_json::to_string(&a).unwrap(),
        serde_json::to_string(&b).unwrap()
    );
}
