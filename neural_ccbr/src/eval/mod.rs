//! Evaluation of episodes.

mod metrics;

pub use metrics::{confusion, evaluate, EpisodeMetrics, MetricsTracker};
