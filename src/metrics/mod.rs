pub mod summary;
pub mod timeseries;

pub use summary::{DegenerateReason, Statistic, SummaryStats, TRADING_DAYS_PER_YEAR};
pub use timeseries::{drawdown_series, max_drawdown, running_max, write_drawdown_csv, DrawdownPoint};
