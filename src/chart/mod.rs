pub mod cumulative;

pub use cumulative::{render_cumulative_returns, ChartConfig};
