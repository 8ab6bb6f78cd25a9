pub mod aggregate;
pub mod metrics;
pub mod pipeline;
pub mod potential;

pub use aggregate::TrendAnalyzer;
pub use metrics::{age_hours, engagement_rate, parse_timestamp, views_per_day, views_per_hour};
pub use pipeline::AnalysisPipeline;
pub use potential::{
    engagement_points, recency_points, trend_status, velocity_points, viral_potential,
};
