pub mod checkpoint;
pub mod config;
pub mod evaluator;
pub mod metrics;
pub mod trainer;

pub use config::{DevicePlacement, HyperParams, ModelVariant};
pub use metrics::{AccuracyAccumulator, MetricSeries, MetricsLogger};
pub use trainer::{train, RunMetrics};
