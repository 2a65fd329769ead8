//! Column type inference and profiling.

mod profiler;
pub mod values;

pub use profiler::ColumnProfiler;
