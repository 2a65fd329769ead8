//! Dataset composition figures reported alongside the readiness score.

use serde::{Deserialize, Serialize};

use crate::schema::{ColumnProfile, ColumnType};

/// Columns missing more than this fraction of their values are listed as
/// drop candidates.
pub const HIGH_MISSING_RATIO: f64 = 0.5;

/// Shape, column-kind counts and missingness of a profiled dataset.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ReadinessSummary {
    pub total_rows: usize,
    pub total_columns: usize,
    /// Integer and float columns.
    pub numeric_columns: usize,
    /// String and boolean columns.
    pub categorical_columns: usize,
    /// Date and datetime columns.
    pub datetime_columns: usize,
    /// Missing cells over all cells, as a percentage rounded to two decimals.
    pub missing_data_pct: f64,
    /// Columns more than half missing, in column order.
    pub high_missing_columns: Vec<String>,
}

impl ReadinessSummary {
    /// Summarize column profiles. Kinds follow each column's effective type;
    /// all-missing columns count towards no kind.
    pub fn from_profiles(rows: usize, profiles: &[ColumnProfile]) -> Self {
        let mut summary = Self {
            total_rows: rows,
            total_columns: profiles.len(),
            ..Self::default()
        };

        let mut missing = 0usize;
        for profile in profiles {
            match profile.effective_type() {
                ColumnType::Integer | ColumnType::Float => summary.numeric_columns += 1,
                ColumnType::String | ColumnType::Boolean => summary.categorical_columns += 1,
                ColumnType::Date => summary.datetime_columns += 1,
                ColumnType::Unknown => {}
            }

            missing += profile.null_count;
            if profile.null_ratio() > HIGH_MISSING_RATIO {
                summary.high_missing_columns.push(profile.name.clone());
            }
        }

        let cells = rows * profiles.len();
        if cells > 0 {
            let pct = missing as f64 / cells as f64 * 100.0;
            summary.missing_data_pct = (pct * 100.0).round() / 100.0;
        }

        summary
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::inference::ColumnProfiler;
    use crate::input::Dataset;

    #[test]
    fn test_counts_kinds_and_missing_cells() {
        let ds = Dataset::from_strings(
            &["id", "name", "joined", "note", "active"],
            &[
                vec!["1", "Ann", "2024-01-01", "", "yes"],
                vec!["2", "Bo", "2024-02-01", "", "no"],
                vec!["3", "", "2024-03-01", "x", "yes"],
            ],
        )
        .unwrap();
        let profiles = ColumnProfiler::new().profile(&ds);
        let summary = ReadinessSummary::from_profiles(ds.row_count(), &profiles);

        assert_eq!(summary.total_rows, 3);
        assert_eq!(summary.total_columns, 5);
        assert_eq!(summary.numeric_columns, 1);
        assert_eq!(summary.categorical_columns, 3);
        assert_eq!(summary.datetime_columns, 1);
        // 3 of 15 cells.
        assert_eq!(summary.missing_data_pct, 20.0);
        assert_eq!(summary.high_missing_columns, vec!["note".to_string()]);
    }

    #[test]
    fn test_exactly_half_missing_is_not_listed() {
        let ds = Dataset::from_strings(&["a", "b"], &[vec!["1", ""], vec!["", ""]]).unwrap();
        let profiles = ColumnProfiler::new().profile(&ds);
        let summary = ReadinessSummary::from_profiles(ds.row_count(), &profiles);

        assert_eq!(summary.high_missing_columns, vec!["b".to_string()]);
        assert_eq!(summary.missing_data_pct, 75.0);
        // The all-missing column has no kind.
        assert_eq!(summary.numeric_columns, 1);
        assert_eq!(summary.categorical_columns, 0);
    }

    #[test]
    fn test_zero_rows() {
        let ds = Dataset::new(vec!["a".into()], Vec::new()).unwrap();
        let profiles = ColumnProfiler::new().profile(&ds);
        let summary = ReadinessSummary::from_profiles(0, &profiles);
        assert_eq!(summary.missing_data_pct, 0.0);
        assert!(summary.high_missing_columns.is_empty());
    }
}
