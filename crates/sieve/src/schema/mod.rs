//! Column profile types.

mod column;
mod types;

pub use column::{ColumnProfile, NumericStatistics};
pub use types::ColumnType;
