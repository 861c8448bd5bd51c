//plots and summarizes the results table of a long/short factor backtest

pub mod chart;
pub mod config;
pub mod data;
pub mod error;
pub mod metrics;

//prelude module for convenient imports
pub mod prelude {
    pub use crate::chart::{render_cumulative_returns, ChartConfig};
    pub use crate::config::ReportConfig;
    pub use crate::data::{load_results, parse_date, ResultRow, ResultsTable};
    pub use crate::error::ReportError;
    pub use crate::metrics::{
        drawdown_series, max_drawdown, running_max, write_drawdown_csv, DegenerateReason,
        DrawdownPoint, Statistic, SummaryStats,
    };
}
