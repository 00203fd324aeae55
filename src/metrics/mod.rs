//! Class and method metrics from an external static-analysis tool.

pub mod calculator;
pub mod csv;
pub mod scratch;
pub mod types;

pub use calculator::{DesigniteCalculator, MetricsError, MetricsSource};
pub use scratch::ScratchDir;
pub use types::{ClassMetrics, ClassReport, MethodMetrics, MetricsReport};
