//! Feature computation module
//!
//! Per-entity feature engineering over a transaction table:
//! - Time ordering and grouping-key partitioning
//! - Rolling window aggregates with label-delay correction
//! - Recency (time since the entity's previous transaction)
//! - Calendar encodings of the transaction timestamp
//! - Content-hash memoization of computed tables

pub mod assembler;
pub mod cache;
pub mod calendar;
pub mod delay;
pub mod orderer;
pub mod partition;
pub mod recency;
pub mod window;

pub use assembler::{aggregate_feature, AssemblerOptions, FeatureAssembler};
pub use cache::{CacheStats, FeatureCache};
pub use calendar::{add_calendar_features, encode_day_time, is_night, is_weekday, DayTimeEncoding};
pub use delay::DelayCorrector;
pub use orderer::TimeOrderer;
pub use partition::{partition_by, GroupKey, GroupPartition};
pub use recency::{time_since_previous, time_since_previous_cached, TIME_SINCE_LAST_TX};
pub use window::WindowedAggregator;
