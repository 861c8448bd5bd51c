use crate::data::ResultsTable;
use crate::error::ReportError;
use crate::metrics::timeseries::{drawdown_series, max_drawdown};
use chrono::NaiveDate;
use prettytable::{Cell, Row, Table};
use statrs::statistics::Statistics;
use std::fmt;

pub const TRADING_DAYS_PER_YEAR: f64 = 252.0;
pub const MIN_ROWS: usize = 2;

//why a statistic could not be computed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DegenerateReason {
    InsufficientRows { rows: usize, required: usize },
    ZeroVariance,
    NonFinite,
}

impl fmt::Display for DegenerateReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DegenerateReason::InsufficientRows { rows, required } => {
                write!(f, "need at least {} rows, got {}", required, rows)
            }
            DegenerateReason::ZeroVariance => write!(f, "long/short returns have zero variance"),
            DegenerateReason::NonFinite => write!(f, "result is not finite"),
        }
    }
}

//a computed statistic, or the reason it is undefined
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Statistic {
    Defined(f64),
    Undefined(DegenerateReason),
}

impl Statistic {
    fn checked(value: f64) -> Self {
        if value.is_finite() {
            Statistic::Defined(value)
        } else {
            Statistic::Undefined(DegenerateReason::NonFinite)
        }
    }

    pub fn value(&self) -> Option<f64> {
        match self {
            Statistic::Defined(value) => Some(*value),
            Statistic::Undefined(_) => None,
        }
    }

    pub fn is_defined(&self) -> bool {
        matches!(self, Statistic::Defined(_))
    }

    //formats as a percentage with 2 decimals
    pub fn format_pct(&self) -> String {
        match self {
            Statistic::Defined(value) => format!("{:.2}%", unsigned_zero(value * 100.0)),
            Statistic::Undefined(reason) => format!("undefined ({})", reason),
        }
    }

    //formats as a plain decimal with 2 decimals
    pub fn format_decimal(&self) -> String {
        match self {
            Statistic::Defined(value) => format!("{:.2}", unsigned_zero(*value)),
            Statistic::Undefined(reason) => format!("undefined ({})", reason),
        }
    }
}

//summary statistics for a backtest results table
#[derive(Debug, Clone)]
pub struct SummaryStats {
    pub rows: usize,
    pub first_date: NaiveDate,
    pub last_date: NaiveDate,
    pub total_return: Statistic,
    pub sharpe_ratio: Statistic,
    pub max_drawdown: Statistic,
    pub mean_return: f64,
    pub std_return: f64,
    pub mean_long_return: Option<f64>,
    pub mean_short_return: Option<f64>,
}

impl SummaryStats {
    //calculate summary statistics assuming daily rows
    pub fn from_table(table: &ResultsTable) -> Result<Self, ReportError> {
        Self::from_table_with_periods(table, TRADING_DAYS_PER_YEAR)
    }

    pub fn from_table_with_periods(
        table: &ResultsTable,
        periods_per_year: f64,
    ) -> Result<Self, ReportError> {
        let (first, last) = match (table.first(), table.last()) {
            (Some(first), Some(last)) => (first, last),
            _ => return Err(ReportError::EmptyData),
        };

        let returns = table.long_short_returns();
        let mean_return = returns.as_slice().mean();
        let std_return = returns.as_slice().std_dev();

        let (total_return, sharpe_ratio, max_dd) = if table.len() < MIN_ROWS {
            let reason = DegenerateReason::InsufficientRows {
                rows: table.len(),
                required: MIN_ROWS,
            };
            (
                Statistic::Undefined(reason),
                Statistic::Undefined(reason),
                Statistic::Undefined(reason),
            )
        } else {
            (
                Statistic::checked(last.cum_return - 1.0),
                sharpe_ratio(&returns, periods_per_year),
                Statistic::checked(max_drawdown(&drawdown_series(table))),
            )
        };

        Ok(SummaryStats {
            rows: table.len(),
            first_date: first.date,
            last_date: last.date,
            total_return,
            sharpe_ratio,
            max_drawdown: max_dd,
            mean_return,
            std_return,
            mean_long_return: leg_mean(&table.long_returns()),
            mean_short_return: leg_mean(&table.short_returns()),
        })
    }

    pub fn all_defined(&self) -> bool {
        self.total_return.is_defined()
            && self.sharpe_ratio.is_defined()
            && self.max_drawdown.is_defined()
    }

    //the three report lines, in print order
    pub fn report_lines(&self) -> [String; 3] {
        [
            format!("Total Return: {}", self.total_return.format_pct()),
            format!("Annualized Sharpe: {}", self.sharpe_ratio.format_decimal()),
            format!("Max Drawdown: {}", self.max_drawdown.format_pct()),
        ]
    }

    pub fn print(&self) {
        for line in self.report_lines() {
            println!("{}", line);
        }
    }

    //prints the extended statistics in a formatted table
    pub fn pretty_print_table(&self) {
        let mut table = Table::new();

        table.add_row(Row::new(vec![Cell::new("Metric"), Cell::new("Value")]));

        table.add_row(Row::new(vec![
            Cell::new("Rows"),
            Cell::new(&format!("{}", self.rows)),
        ]));

        table.add_row(Row::new(vec![
            Cell::new("Period"),
            Cell::new(&format!("{} to {}", self.first_date, self.last_date)),
        ]));

        table.add_row(Row::new(vec![
            Cell::new("Total Return"),
            Cell::new(&self.total_return.format_pct()),
        ]));

        table.add_row(Row::new(vec![
            Cell::new("Annualized Sharpe"),
            Cell::new(&self.sharpe_ratio.format_decimal()),
        ]));

        table.add_row(Row::new(vec![
            Cell::new("Max Drawdown"),
            Cell::new(&self.max_drawdown.format_pct()),
        ]));

        table.add_row(Row::new(vec![
            Cell::new("Mean Daily Return"),
            Cell::new(&format_optional_pct(Some(self.mean_return), 4)),
        ]));

        table.add_row(Row::new(vec![
            Cell::new("Daily Volatility"),
            Cell::new(&format_optional_pct(Some(self.std_return), 4)),
        ]));

        if self.mean_long_return.is_some() || self.mean_short_return.is_some() {
            table.add_row(Row::new(vec![
                Cell::new("Mean Long Leg Return"),
                Cell::new(&format_optional_pct(self.mean_long_return, 4)),
            ]));

            table.add_row(Row::new(vec![
                Cell::new("Mean Short Leg Return"),
                Cell::new(&format_optional_pct(self.mean_short_return, 4)),
            ]));
        }

        table.printstd();
    }
}

fn sharpe_ratio(returns: &[f64], periods_per_year: f64) -> Statistic {
    let mean = returns.mean();
    //sample standard deviation (n - 1)
    let std_dev = returns.std_dev();

    //constant returns leave rounding noise in the deviation rather than an exact zero
    let constant = returns.windows(2).all(|pair| pair[0] == pair[1]);
    let noise = mean.abs() * f64::EPSILON * returns.len() as f64;
    if constant || std_dev <= noise {
        return Statistic::Undefined(DegenerateReason::ZeroVariance);
    }

    Statistic::checked((mean / std_dev) * periods_per_year.sqrt())
}

//values that round to zero at 2 decimals print without a sign
fn unsigned_zero(value: f64) -> f64 {
    if (value * 100.0).round() == 0.0 {
        0.0
    } else {
        value
    }
}

fn leg_mean(returns: &[f64]) -> Option<f64> {
    if returns.is_empty() {
        None
    } else {
        Some(returns.mean())
    }
}

fn format_optional_pct(value: Option<f64>, decimals: usize) -> String {
    match value {
        Some(value) if value.is_finite() => format!("{:.*}%", decimals, value * 100.0),
        _ => "n/a".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::ResultRow;

    fn table(rows: &[(f64, f64)]) -> ResultsTable {
        let start = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        ResultsTable::new(
            rows.iter()
                .enumerate()
                .map(|(i, &(cum, ls))| {
                    ResultRow::new(start + chrono::Days::new(i as u64), cum, ls)
                })
                .collect(),
        )
    }

    #[test]
    fn scenario_with_a_peak_and_a_loss() {
        let stats = SummaryStats::from_table(&table(&[(1.0, 0.0), (1.10, 0.10), (0.99, -0.10)]))
            .unwrap();

        let [total, sharpe, max_dd] = stats.report_lines();
        assert_eq!(total, "Total Return: -1.00%");
        assert_eq!(sharpe, "Annualized Sharpe: 0.00");
        assert_eq!(max_dd, "Max Drawdown: 10.00%");
        assert!(stats.sharpe_ratio.value().unwrap().abs() < 1e-9);
        assert!(stats.all_defined());
    }

    #[test]
    fn near_zero_prints_without_sign() {
        assert_eq!(Statistic::Defined(-1e-17).format_decimal(), "0.00");
        assert_eq!(Statistic::Defined(-4e-5).format_pct(), "0.00%");
        assert_eq!(Statistic::Defined(-0.0051).format_decimal(), "-0.01");
        assert_eq!(Statistic::Defined(-0.0123).format_pct(), "-1.23%");
    }

    #[test]
    fn constant_nonzero_returns_are_degenerate() {
        for value in [0.01, 0.1, 0.07, 0.001, 1e-4] {
            for rows in [10, 100, 252, 1000] {
                let series: Vec<(f64, f64)> = (0..rows).map(|_| (1.0, value)).collect();
                let stats = SummaryStats::from_table(&table(&series)).unwrap();
                assert_eq!(
                    stats.sharpe_ratio,
                    Statistic::Undefined(DegenerateReason::ZeroVariance),
                    "value={value} rows={rows}"
                );
            }
        }
    }

    #[test]
    fn small_but_real_variance_is_still_defined() {
        let stats =
            SummaryStats::from_table(&table(&[(1.0, 0.0100), (1.0, 0.0101), (1.0, 0.0099)]))
                .unwrap();
        assert!(stats.sharpe_ratio.is_defined());
    }

    #[test]
    fn flat_series_has_no_return_or_drawdown() {
        let stats =
            SummaryStats::from_table(&table(&[(1.0, 0.01), (1.0, -0.01), (1.0, 0.02)])).unwrap();
        assert_eq!(stats.total_return, Statistic::Defined(0.0));
        assert_eq!(stats.max_drawdown, Statistic::Defined(0.0));
    }

    #[test]
    fn increasing_series_has_no_drawdown() {
        let stats =
            SummaryStats::from_table(&table(&[(1.0, 0.0), (1.01, 0.01), (1.05, 0.04)])).unwrap();
        assert_eq!(stats.max_drawdown, Statistic::Defined(0.0));
    }

    #[test]
    fn sharpe_uses_sample_deviation_and_annualizes() {
        let returns = [0.01, 0.02, 0.03];
        let rows: Vec<(f64, f64)> = returns.iter().map(|&r| (1.0, r)).collect();
        let stats = SummaryStats::from_table(&table(&rows)).unwrap();

        //mean 0.02, sample stdev 0.01
        let expected = 2.0 * 252.0_f64.sqrt();
        let sharpe = stats.sharpe_ratio.value().unwrap();
        assert!((sharpe - expected).abs() < 1e-9);
    }

    #[test]
    fn custom_period_count() {
        let rows = [(1.0, 0.01), (1.0, 0.02), (1.0, 0.03)];
        let stats = SummaryStats::from_table_with_periods(&table(&rows), 12.0).unwrap();
        let sharpe = stats.sharpe_ratio.value().unwrap();
        assert!((sharpe - 2.0 * 12.0_f64.sqrt()).abs() < 1e-9);
    }

    #[test]
    fn constant_returns_are_degenerate() {
        let stats =
            SummaryStats::from_table(&table(&[(1.0, 0.0), (1.0, 0.0), (1.0, 0.0)])).unwrap();

        assert_eq!(
            stats.sharpe_ratio,
            Statistic::Undefined(DegenerateReason::ZeroVariance)
        );
        assert!(!stats.all_defined());
        assert_eq!(
            stats.report_lines()[1],
            "Annualized Sharpe: undefined (long/short returns have zero variance)"
        );
    }

    #[test]
    fn single_row_is_degenerate() {
        let stats = SummaryStats::from_table(&table(&[(1.05, 0.05)])).unwrap();
        let reason = DegenerateReason::InsufficientRows {
            rows: 1,
            required: 2,
        };
        assert_eq!(stats.total_return, Statistic::Undefined(reason));
        assert_eq!(stats.sharpe_ratio, Statistic::Undefined(reason));
        assert_eq!(stats.max_drawdown, Statistic::Undefined(reason));
    }

    #[test]
    fn empty_table_is_an_error() {
        assert!(matches!(
            SummaryStats::from_table(&ResultsTable::default()),
            Err(ReportError::EmptyData)
        ));
    }

    #[test]
    fn nan_input_is_reported() {
        let stats =
            SummaryStats::from_table(&table(&[(1.0, 0.01), (f64::NAN, 0.02), (1.1, 0.03)]))
                .unwrap();
        assert_eq!(
            stats.max_drawdown,
            Statistic::Undefined(DegenerateReason::NonFinite)
        );
    }

    #[test]
    fn leg_means_only_when_present() {
        let start = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        let with_legs = ResultsTable::new(vec![
            ResultRow::new(start, 1.0, 0.01).with_legs(0.02, 0.01),
            ResultRow::new(start, 1.01, 0.03).with_legs(0.04, 0.01),
        ]);
        let stats = SummaryStats::from_table(&with_legs).unwrap();
        assert!((stats.mean_long_return.unwrap() - 0.03).abs() < 1e-12);
        assert!((stats.mean_short_return.unwrap() - 0.01).abs() < 1e-12);

        let stats = SummaryStats::from_table(&table(&[(1.0, 0.0), (1.0, 0.1)])).unwrap();
        assert_eq!(stats.mean_long_return, None);
    }
}
