//! ML readiness scoring.

mod readiness;
mod summary;

pub use readiness::{ReadinessLevel, ReadinessScore, ReadinessScorer, recommendation};
pub use summary::{HIGH_MISSING_RATIO, ReadinessSummary};
