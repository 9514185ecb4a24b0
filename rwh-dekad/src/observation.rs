use crate::error::{DekadError, Result};
use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;

/// Days of the month on which decadal reporting points fall.
pub const DEKAD_ANCHOR_DAYS: [u32; 3] = [1, 11, 21];

/// The single mid-month anchor day for the monthly window.
pub const MONTHLY_ANCHOR_DAY: u32 = 11;

/// Quarter-end months carrying a quarterly reporting point.
pub const QUARTER_END_MONTHS: [u32; 4] = [3, 6, 9, 12];

/// The temporal aggregation window of a rainfall measurement.
#[derive(Debug, PartialEq, Eq, PartialOrd, Ord, Clone, Copy, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Window {
    Dekad,
    Monthly,
    Quarterly,
}

impl Window {
    /// Whether a date is a native reporting point of this window.
    ///
    /// Every input row is a decadal date, so the dekad window keeps all
    /// rows. Monthly values are restated on every dekad; only the
    /// mid-month anchor is a new reporting point. Quarterly values are
    /// kept at the mid-month anchor of quarter-end months only.
    pub fn keeps(&self, date: &NaiveDate) -> bool {
        match self {
            Window::Dekad => true,
            Window::Monthly => date.day() == MONTHLY_ANCHOR_DAY,
            Window::Quarterly => {
                date.day() == MONTHLY_ANCHOR_DAY && QUARTER_END_MONTHS.contains(&date.month())
            }
        }
    }
}

impl fmt::Display for Window {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let tag = match self {
            Window::Dekad => "dekad",
            Window::Monthly => "monthly",
            Window::Quarterly => "quarterly",
        };
        write!(f, "{}", tag)
    }
}

/// The measurement type carried by a wide-format column.
#[derive(Debug, PartialEq, Eq, Clone, Copy, Hash)]
pub enum MeasureKind {
    /// Observed rainfall in mm
    Observed,
    /// Long-term average rainfall in mm
    Average,
    /// Anomaly as percent of the long-term average
    Anomaly,
}

/// Parse a wide-format measure column name into its window and kind tags.
///
/// The prefix selects the window (`rf` dekad, `r1` monthly, `r3`
/// quarterly) and the suffix selects the kind (`h` observed, `h_avg`
/// average, `q` anomaly).
pub fn parse_measure_column(name: &str) -> Result<(Window, MeasureKind)> {
    let (prefix, suffix) = name
        .split_at_checked(2)
        .ok_or_else(|| DekadError::UnknownMeasure(name.to_string()))?;
    let window = match prefix {
        "rf" => Window::Dekad,
        "r1" => Window::Monthly,
        "r3" => Window::Quarterly,
        _ => return Err(DekadError::UnknownMeasure(name.to_string())),
    };
    let kind = match suffix {
        "h" => MeasureKind::Observed,
        "h_avg" => MeasureKind::Average,
        "q" => MeasureKind::Anomaly,
        _ => return Err(DekadError::UnknownMeasure(name.to_string())),
    };
    Ok((window, kind))
}

/// A single tidy rainfall observation for one location, resolution and
/// aggregation window.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Observation {
    pub location_code: String,
    /// Pixel count of the aggregation area (resolution)
    pub n_pixels: u32,
    pub window: Window,
    pub date: NaiveDate,
    pub observed_mm: f64,
    pub long_term_avg_mm: f64,
    pub anomaly_pct: f64,
}

impl Ord for Observation {
    fn cmp(&self, other: &Self) -> Ordering {
        self.date.cmp(&other.date)
    }
}

impl Eq for Observation {}

impl PartialEq for Observation {
    fn eq(&self, other: &Self) -> bool {
        self.date == other.date
            && self.location_code == other.location_code
            && self.n_pixels == other.n_pixels
            && self.window == other.window
    }
}

impl PartialOrd for Observation {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}
