use crate::data::record::{parse_date, ResultRow, ResultsTable};
use crate::error::ReportError;
use csv::{ReaderBuilder, StringRecord, Trim};
use serde::Deserialize;
use std::path::Path;
use tracing::debug;

pub const REQUIRED_COLUMNS: [&str; 3] = ["date", "cum_return", "long_short"];

#[derive(Debug, Deserialize)]
struct CsvRecord {
    date: String,
    cum_return: f64,
    long_short: f64,
    #[serde(default)]
    long_return: Option<f64>,
    #[serde(default)]
    short_return: Option<f64>,
}

//loads the backtest results table from a csv file
pub fn load_results<P: AsRef<Path>>(path: P) -> Result<ResultsTable, ReportError> {
    let path = path.as_ref();
    if !path.is_file() {
        return Err(ReportError::FileNotFound {
            path: path.to_path_buf(),
        });
    }

    let mut reader = ReaderBuilder::new()
        .has_headers(true)
        .trim(Trim::All)
        .from_path(path)?;

    //report a missing column by name before any row fails on it
    let headers = reader.headers()?.clone();
    for column in REQUIRED_COLUMNS {
        if !headers.iter().any(|header| header == column) {
            return Err(ReportError::MissingColumn {
                column: column.to_string(),
            });
        }
    }

    let mut rows = Vec::new();
    let mut record = StringRecord::new();

    loop {
        let more = reader.read_record(&mut record).map_err(|err| ReportError::Parse {
            line: error_line(&err),
            message: err.to_string(),
        })?;
        if !more {
            break;
        }

        //physical file line, so blank lines and quoted newlines are counted
        let line = record
            .position()
            .map(|position| position.line() as usize)
            .unwrap_or_default();

        let parsed: CsvRecord = record
            .deserialize(Some(&headers))
            .map_err(|err| ReportError::Parse {
                line,
                message: err.to_string(),
            })?;

        let date = parse_date(&parsed.date).ok_or_else(|| ReportError::InvalidDate {
            line,
            value: parsed.date.clone(),
        })?;

        rows.push(ResultRow {
            date,
            cum_return: parsed.cum_return,
            long_short: parsed.long_short,
            long_return: parsed.long_return,
            short_return: parsed.short_return,
        });
    }

    debug!(rows = rows.len(), path = %path.display(), "loaded results table");

    Ok(ResultsTable::new(rows))
}

fn error_line(err: &csv::Error) -> usize {
    err.position()
        .map(|position| position.line() as usize)
        .unwrap_or_default()
}
