use crate::chart::ChartConfig;
use crate::error::ReportError;
use crate::metrics::TRADING_DAYS_PER_YEAR;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

pub const DEFAULT_INPUT: &str = "out/results.csv";
pub const DEFAULT_OUTPUT: &str = "out/cumulative_returns.png";

//complete report configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReportConfig {
    //input
    pub input_path: PathBuf,

    //chart
    pub output_path: PathBuf,
    pub plot: bool,
    pub create_dirs: bool,
    pub dpi: u32,
    pub width_in: f64,
    pub height_in: f64,

    //statistics
    pub periods_per_year: f64,

    //optional outputs
    pub drawdown_csv: Option<PathBuf>,
}

impl Default for ReportConfig {
    fn default() -> Self {
        ReportConfig {
            input_path: PathBuf::from(DEFAULT_INPUT),
            output_path: PathBuf::from(DEFAULT_OUTPUT),
            plot: true,
            create_dirs: false,
            dpi: 300,
            width_in: 10.0,
            height_in: 6.0,
            periods_per_year: TRADING_DAYS_PER_YEAR,
            drawdown_csv: None,
        }
    }
}

impl ReportConfig {
    //load configuration from a JSON file
    pub fn from_json_file<P: AsRef<Path>>(path: P) -> Result<Self, ReportError> {
        let contents = std::fs::read_to_string(path)?;
        let config: ReportConfig = serde_json::from_str(&contents)
            .map_err(|err| ReportError::Config(err.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    //save configuration to a JSON file
    pub fn to_json_file<P: AsRef<Path>>(&self, path: P) -> Result<(), ReportError> {
        let json =
            serde_json::to_string_pretty(self).map_err(|err| ReportError::Config(err.to_string()))?;
        std::fs::write(path, json)?;
        Ok(())
    }

    pub fn validate(&self) -> Result<(), ReportError> {
        if self.dpi == 0 {
            return Err(ReportError::Config("dpi must be positive".to_string()));
        }
        if !(self.width_in > 0.0 && self.height_in > 0.0) {
            return Err(ReportError::Config(format!(
                "canvas size must be positive, got {}x{} in",
                self.width_in, self.height_in
            )));
        }
        if !(self.periods_per_year > 0.0 && self.periods_per_year.is_finite()) {
            return Err(ReportError::Config(format!(
                "periods_per_year must be positive, got {}",
                self.periods_per_year
            )));
        }
        Ok(())
    }

    //chart settings derived from this configuration
    pub fn chart_config(&self) -> ChartConfig {
        ChartConfig {
            output_path: self.output_path.clone(),
            dpi: self.dpi,
            width_in: self.width_in,
            height_in: self.height_in,
            create_dirs: self.create_dirs,
            ..ChartConfig::default()
        }
    }
}
