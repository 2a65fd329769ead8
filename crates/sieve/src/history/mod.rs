//! Session history and quality trends across repeated validations.

mod comparison;
mod store;

pub use comparison::{ComparisonResult, SessionComparator, SeverityDelta, Trend, TrendResult};
pub use store::{HistoryStore, SessionHistory, SessionId, SessionSummary};
