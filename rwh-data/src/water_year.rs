use chrono::{Datelike, NaiveDate};
use log::info;
use rwh_dekad::error::{DekadError, Result};
use rwh_dekad::observation::Observation;
use rwh_utils::dates::water_year_for_date;
use serde::{Deserialize, Serialize};

/// The calendar month (1-12) at which the local water year begins: the
/// historically wettest month of the climatology. Computed once per
/// reference series and passed explicitly to every downstream consumer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct WaterYearStart(pub u32);

impl WaterYearStart {
    pub fn month(&self) -> u32 {
        self.0
    }
}

/// An observation tagged with its water year and the running observed
/// rainfall within that water year.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AlignedObservation {
    pub location_code: String,
    pub n_pixels: u32,
    pub date: NaiveDate,
    pub observed_mm: f64,
    pub long_term_avg_mm: f64,
    pub anomaly_pct: f64,
    /// Water year label: months before the start month carry the
    /// previous label
    pub water_year: i32,
    /// Running sum of observed_mm, reset at each water-year boundary
    pub cumulative_observed_mm: f64,
}

/// Derive the water-year start month from a reference climatology.
///
/// Groups `long_term_avg_mm` by calendar month across the full series
/// and picks the month with the maximum mean. When several months tie
/// for the maximum, the month whose first record occurs earliest in
/// date order wins.
pub fn water_year_start(series: &[Observation]) -> Result<WaterYearStart> {
    if series.is_empty() {
        return Err(DekadError::EmptySeries(
            "cannot derive water year start from an empty series".to_string(),
        ));
    }

    struct MonthClimatology {
        sum: f64,
        count: usize,
        first_date: NaiveDate,
    }
    let mut by_month: [Option<MonthClimatology>; 12] = std::array::from_fn(|_| None);
    for observation in series {
        let slot = &mut by_month[observation.date.month0() as usize];
        match slot {
            Some(climatology) => {
                climatology.sum += observation.long_term_avg_mm;
                climatology.count += 1;
                if observation.date < climatology.first_date {
                    climatology.first_date = observation.date;
                }
            }
            None => {
                *slot = Some(MonthClimatology {
                    sum: observation.long_term_avg_mm,
                    count: 1,
                    first_date: observation.date,
                });
            }
        }
    }

    let mut best: Option<(u32, f64, NaiveDate)> = None;
    for (month0, slot) in by_month.iter().enumerate() {
        let Some(climatology) = slot else { continue };
        let mean = climatology.sum / climatology.count as f64;
        let candidate = (month0 as u32 + 1, mean, climatology.first_date);
        best = match best {
            None => Some(candidate),
            Some(current) => {
                if mean > current.1 || (mean == current.1 && candidate.2 < current.2) {
                    Some(candidate)
                } else {
                    Some(current)
                }
            }
        };
    }

    // series is non-empty, so best is set
    let (month, mean, _) = best.unwrap();
    info!(
        "Water year starts in month {} (long-term average {:.1} mm)",
        month, mean
    );
    Ok(WaterYearStart(month))
}

/// Tag each observation with its water year and running cumulative
/// rainfall.
///
/// The input must be sorted by strictly ascending date; anything else is
/// reported as a shape error rather than producing a non-monotonic
/// cumulative series.
pub fn align(series: &[Observation], start: WaterYearStart) -> Result<Vec<AlignedObservation>> {
    for window in series.windows(2) {
        if window[1].date <= window[0].date {
            return Err(DekadError::NonMonotonicDates {
                location_code: window[1].location_code.clone(),
                window: window[1].window.to_string(),
                date: window[1].date,
            });
        }
    }

    let mut aligned = Vec::with_capacity(series.len());
    let mut current_year = None;
    let mut cumulative = 0.0;
    for observation in series {
        let water_year = water_year_for_date(&observation.date, start.month());
        if current_year != Some(water_year) {
            current_year = Some(water_year);
            cumulative = 0.0;
        }
        cumulative += observation.observed_mm;
        aligned.push(AlignedObservation {
            location_code: observation.location_code.clone(),
            n_pixels: observation.n_pixels,
            date: observation.date,
            observed_mm: observation.observed_mm,
            long_term_avg_mm: observation.long_term_avg_mm,
            anomaly_pct: observation.anomaly_pct,
            water_year,
            cumulative_observed_mm: cumulative,
        });
    }
    Ok(aligned)
}
