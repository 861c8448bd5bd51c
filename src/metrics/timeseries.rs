use crate::data::ResultsTable;
use crate::error::ReportError;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::path::Path;

//a point on the drawdown curve
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DrawdownPoint {
    pub date: NaiveDate,
    pub cum_return: f64,
    pub peak: f64,
    pub drawdown: f64,
}

//prefix maximum of a series, including the current value
pub fn running_max(values: &[f64]) -> Vec<f64> {
    let mut peak = f64::NEG_INFINITY;
    values
        .iter()
        .map(|&value| {
            peak = peak.max(value);
            peak
        })
        .collect()
}

//proportional decline from the running peak at every row
pub fn drawdown_series(table: &ResultsTable) -> Vec<DrawdownPoint> {
    let values = table.cum_returns();
    let peaks = running_max(&values);

    table
        .rows()
        .iter()
        .zip(peaks)
        .map(|(row, peak)| DrawdownPoint {
            date: row.date,
            cum_return: row.cum_return,
            peak,
            drawdown: (peak - row.cum_return) / peak,
        })
        .collect()
}

//largest drawdown across the curve
//nan if any point is undefined (a zero peak or nan input)
pub fn max_drawdown(curve: &[DrawdownPoint]) -> f64 {
    let mut worst = 0.0_f64;
    for point in curve {
        if point.drawdown.is_nan() {
            return f64::NAN;
        }
        worst = worst.max(point.drawdown);
    }
    worst
}

//writes the drawdown curve as date,cum_return,peak,drawdown
pub fn write_drawdown_csv<P: AsRef<Path>>(
    curve: &[DrawdownPoint],
    path: P,
) -> Result<(), ReportError> {
    let mut writer = csv::Writer::from_path(path)?;
    for point in curve {
        writer.serialize(point)?;
    }
    writer.flush()?;
    Ok(())
}
