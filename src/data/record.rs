use chrono::{DateTime, NaiveDate, NaiveDateTime};

//one day of backtest output
#[derive(Debug, Clone, PartialEq)]
pub struct ResultRow {
    pub date: NaiveDate,
    pub cum_return: f64,
    pub long_short: f64,
    pub long_return: Option<f64>,
    pub short_return: Option<f64>,
}

impl ResultRow {
    pub fn new(date: NaiveDate, cum_return: f64, long_short: f64) -> Self {
        ResultRow {
            date,
            cum_return,
            long_short,
            long_return: None,
            short_return: None,
        }
    }

    //attaches the long and short basket returns
    pub fn with_legs(mut self, long_return: f64, short_return: f64) -> Self {
        self.long_return = Some(long_return);
        self.short_return = Some(short_return);
        self
    }
}

//the full results table, kept in file order
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ResultsTable {
    rows: Vec<ResultRow>,
}

impl ResultsTable {
    pub fn new(rows: Vec<ResultRow>) -> Self {
        ResultsTable { rows }
    }

    pub fn rows(&self) -> &[ResultRow] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn first(&self) -> Option<&ResultRow> {
        self.rows.first()
    }

    pub fn last(&self) -> Option<&ResultRow> {
        self.rows.last()
    }

    pub fn dates(&self) -> Vec<NaiveDate> {
        self.rows.iter().map(|row| row.date).collect()
    }

    pub fn cum_returns(&self) -> Vec<f64> {
        self.rows.iter().map(|row| row.cum_return).collect()
    }

    pub fn long_short_returns(&self) -> Vec<f64> {
        self.rows.iter().map(|row| row.long_short).collect()
    }

    //leg returns, skipping rows where the column was blank
    pub fn long_returns(&self) -> Vec<f64> {
        self.rows.iter().filter_map(|row| row.long_return).collect()
    }

    pub fn short_returns(&self) -> Vec<f64> {
        self.rows.iter().filter_map(|row| row.short_return).collect()
    }
}

const DATE_FORMATS: [&str; 3] = ["%Y-%m-%d", "%Y/%m/%d", "%Y%m%d"];
const DATETIME_FORMATS: [&str; 3] = ["%Y-%m-%dT%H:%M:%S", "%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S%.f"];

//parses a calendar date from the common iso-like layouts,
//dropping any time-of-day component
pub fn parse_date(value: &str) -> Option<NaiveDate> {
    let value = value.trim();

    for format in DATE_FORMATS {
        if let Ok(date) = NaiveDate::parse_from_str(value, format) {
            return Some(date);
        }
    }

    if let Ok(timestamp) = DateTime::parse_from_rfc3339(value) {
        return Some(timestamp.date_naive());
    }

    DATETIME_FORMATS
        .iter()
        .find_map(|format| NaiveDateTime::parse_from_str(value, format).ok())
        .map(|timestamp| timestamp.date())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ymd(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn parses_plain_dates() {
        assert_eq!(parse_date("2024-03-15"), Some(ymd(2024, 3, 15)));
        assert_eq!(parse_date("2024/03/15"), Some(ymd(2024, 3, 15)));
        assert_eq!(parse_date("20240315"), Some(ymd(2024, 3, 15)));
        assert_eq!(parse_date("  2024-03-15 "), Some(ymd(2024, 3, 15)));
    }

    #[test]
    fn parses_timestamps_to_their_date() {
        assert_eq!(parse_date("2024-03-15T16:00:00Z"), Some(ymd(2024, 3, 15)));
        assert_eq!(parse_date("2024-03-15T16:00:00+02:00"), Some(ymd(2024, 3, 15)));
        assert_eq!(parse_date("2024-03-15 09:30:00"), Some(ymd(2024, 3, 15)));
        assert_eq!(parse_date("2024-03-15T09:30:00.250"), Some(ymd(2024, 3, 15)));
    }

    #[test]
    fn rejects_garbage() {
        assert_eq!(parse_date(""), None);
        assert_eq!(parse_date("yesterday"), None);
        assert_eq!(parse_date("2024-13-01"), None);
    }

    #[test]
    fn table_accessors_follow_row_order() {
        let table = ResultsTable::new(vec![
            ResultRow::new(ymd(2024, 1, 2), 1.0, 0.0).with_legs(0.01, 0.01),
            ResultRow::new(ymd(2024, 1, 3), 1.02, 0.02),
        ]);

        assert_eq!(table.len(), 2);
        assert_eq!(table.cum_returns(), vec![1.0, 1.02]);
        assert_eq!(table.long_short_returns(), vec![0.0, 0.02]);
        assert_eq!(table.long_returns(), vec![0.01]);
        assert_eq!(table.last().map(|row| row.date), Some(ymd(2024, 1, 3)));
    }
}
