pub mod account_summary;
pub mod statistics;
pub mod usage_record;

pub use account_summary::AccountSummary;
pub use statistics::{StatisticMetadata, StatisticsPoint};
pub use usage_record::UsageRecord;
