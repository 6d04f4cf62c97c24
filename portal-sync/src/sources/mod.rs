pub mod account_summary;
pub mod csv_feed;
pub mod usage_history;

pub use account_summary::LinkedAccounts;
pub use csv_feed::CsvRow;
pub use usage_history::UsageHistorySource;
