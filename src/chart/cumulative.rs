use crate::data::ResultsTable;
use crate::error::ReportError;
use chrono::{Datelike, NaiveDate};
use plotters::coord::Shift;
use plotters::prelude::*;
use std::ops::Range;
use std::path::PathBuf;
use tracing::{debug, info};

//points per inch, used to scale font sizes and line widths with dpi
const POINTS_PER_INCH: f64 = 72.0;
const X_LABELS: usize = 8;
//room right of the plot for half of the last date label
const RIGHT_MARGIN_PT: f64 = 36.0;

//cumulative return chart settings
#[derive(Debug, Clone)]
pub struct ChartConfig {
    pub output_path: PathBuf,
    pub dpi: u32,
    pub width_in: f64,
    pub height_in: f64,
    pub create_dirs: bool,
    pub title: String,
    pub series_label: String,
    pub x_label: String,
    pub y_label: String,
    pub series_color: RGBColor,
    pub reference_level: f64,
}

impl Default for ChartConfig {
    fn default() -> Self {
        ChartConfig {
            output_path: PathBuf::from("out/cumulative_returns.png"),
            dpi: 300,
            width_in: 10.0,
            height_in: 6.0,
            create_dirs: false,
            title: "Multi-Factor Long/Short Strategy Backtest".to_string(),
            series_label: "Long/Short Cumulative Return".to_string(),
            x_label: "Date".to_string(),
            y_label: "Portfolio Value (Initial = 1.0)".to_string(),
            series_color: BLUE,
            reference_level: 1.0,
        }
    }
}

impl ChartConfig {
    //canvas size in pixels
    pub fn pixel_size(&self) -> (u32, u32) {
        (
            (self.width_in * self.dpi as f64).round() as u32,
            (self.height_in * self.dpi as f64).round() as u32,
        )
    }

    //converts a size in points to pixels at the configured dpi
    pub fn px(&self, points: f64) -> f64 {
        points * self.dpi as f64 / POINTS_PER_INCH
    }

    fn px_u32(&self, points: f64) -> u32 {
        self.px(points).round().max(1.0) as u32
    }

    //legend swatch length and the area reserved for it, leaving a gap before the label
    pub fn legend_geometry(&self) -> (i32, u32) {
        let swatch = self.px_u32(14.0);
        (swatch as i32, swatch + self.px_u32(8.0))
    }
}

//renders cumulative return against date and writes the image
pub fn render_cumulative_returns(
    table: &ResultsTable,
    config: &ChartConfig,
) -> Result<(), ReportError> {
    if table.is_empty() {
        return Err(ReportError::EmptyData);
    }

    ensure_output_dir(config)?;

    let (width, height) = config.pixel_size();
    debug!(width, height, dpi = config.dpi, "rendering chart");

    let root = BitMapBackend::new(&config.output_path, (width, height)).into_drawing_area();
    draw_chart(&root, table, config).map_err(|err| ReportError::Plot(err.to_string()))?;
    root.present().map_err(|err| ReportError::Plot(err.to_string()))?;

    info!(path = %config.output_path.display(), "chart saved");
    Ok(())
}

fn ensure_output_dir(config: &ChartConfig) -> Result<(), ReportError> {
    let parent = match config.output_path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => return Ok(()),
    };

    if parent.is_dir() {
        return Ok(());
    }

    if config.create_dirs {
        debug!(dir = %parent.display(), "creating output directory");
        std::fs::create_dir_all(parent)?;
        Ok(())
    } else {
        Err(ReportError::OutputDirMissing {
            path: parent.to_path_buf(),
        })
    }
}

fn draw_chart<DB: DrawingBackend>(
    root: &DrawingArea<DB, Shift>,
    table: &ResultsTable,
    config: &ChartConfig,
) -> Result<(), DrawingAreaErrorKind<DB::ErrorType>> {
    root.fill(&WHITE)?;

    let x_range = date_range(&table.dates());
    let y_range = value_range(&table.cum_returns(), config.reference_level);

    let text_size = config.px(10.0);
    let mut chart = ChartBuilder::on(root)
        .caption(&config.title, ("sans-serif", config.px(12.0)).into_font())
        .margin(config.px_u32(10.0))
        .margin_right(config.px_u32(RIGHT_MARGIN_PT))
        .x_label_area_size(config.px_u32(36.0))
        .y_label_area_size(config.px_u32(48.0))
        .build_cartesian_2d(x_range.clone(), y_range)?;

    chart
        .configure_mesh()
        .x_desc(config.x_label.as_str())
        .y_desc(config.y_label.as_str())
        .axis_desc_style(("sans-serif", text_size))
        .label_style(("sans-serif", config.px(9.0)))
        .x_labels(X_LABELS)
        .y_labels(8)
        .x_label_formatter(&|day| format_day(*day))
        .y_label_formatter(&|value| format!("{:.2}", value))
        .bold_line_style(&BLACK.mix(0.15))
        .light_line_style(&BLACK.mix(0.05))
        .draw()?;

    //dashed reference line in pixel space, kept out of the legend
    let (left, level_y) = chart.backend_coord(&(x_range.start, config.reference_level));
    let (right, _) = chart.backend_coord(&(x_range.end, config.reference_level));
    let reference_style = BLACK.stroke_width(config.px_u32(0.8));
    let dash = config.px(4.0).round() as i32;
    for (start, end) in dash_segments(left, right, dash, dash) {
        root.draw(&PathElement::new(
            vec![(start, level_y), (end, level_y)],
            reference_style,
        ))?;
    }

    let series_style = config.series_color.stroke_width(config.px_u32(1.5));
    let (swatch_length, legend_area) = config.legend_geometry();
    let points: Vec<(i32, f64)> = table
        .rows()
        .iter()
        .map(|row| (day_number(row.date), row.cum_return))
        .collect();

    chart
        .draw_series(LineSeries::new(points, series_style))?
        .label(config.series_label.as_str())
        .legend(move |(x, y)| PathElement::new(vec![(x, y), (x + swatch_length, y)], series_style));

    chart
        .configure_series_labels()
        .position(SeriesLabelPosition::UpperLeft)
        .label_font(("sans-serif", text_size))
        .legend_area_size(legend_area)
        .margin(config.px_u32(6.0))
        .background_style(&WHITE.mix(0.8))
        .border_style(&BLACK)
        .draw()?;

    Ok(())
}

//dates are plotted as whole day numbers so every tick lands on a calendar day
fn day_number(date: NaiveDate) -> i32 {
    date.num_days_from_ce()
}

fn format_day(day: i32) -> String {
    NaiveDate::from_num_days_from_ce_opt(day)
        .map(|date| date.format("%Y-%m-%d").to_string())
        .unwrap_or_default()
}

//x range spanning every date, widened by a day on each side if there is only one
pub(crate) fn date_range(dates: &[NaiveDate]) -> Range<i32> {
    let start = dates.iter().map(|&date| day_number(date)).min();
    let end = dates.iter().map(|&date| day_number(date)).max();

    match (start, end) {
        (Some(start), Some(end)) if start < end => start..end,
        (Some(day), _) => (day - 1)..(day + 1),
        _ => -1..1,
    }
}

//y range covering every finite value and the reference level, with a 5% margin
pub(crate) fn value_range(values: &[f64], reference: f64) -> Range<f64> {
    let (min, max) = values
        .iter()
        .copied()
        .filter(|value| value.is_finite())
        .fold((reference, reference), |(lo, hi), value| {
            (lo.min(value), hi.max(value))
        });

    let span = max - min;
    let margin = if span > 0.0 {
        span * 0.05
    } else {
        (max.abs() * 0.05).max(0.05)
    };

    (min - margin)..(max + margin)
}

//pixel spans of a dashed line from `start` to `end`
pub(crate) fn dash_segments(start: i32, end: i32, dash: i32, gap: i32) -> Vec<(i32, i32)> {
    let dash = dash.max(1);
    let step = (dash + gap.max(0)) as usize;
    (start..end)
        .step_by(step)
        .map(|x| (x, (x + dash).min(end)))
        .collect()
}
