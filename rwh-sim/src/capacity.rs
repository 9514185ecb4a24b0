//! Ideal-capacity sizing against a representative dry year.
//!
//! Picks the base year at a target exceedance probability over the
//! historical yearly rainfall totals, sizes the capture area so the
//! threshold rainfall meets the yearly demand, then replays the base
//! year to find the storage needed to carry the wet-season surplus
//! through the dry season.

use crate::balance::MM_TO_M3_PER_M2;
use crate::error::{Result, SimError};
use chrono::NaiveDate;
use rwh_data::water_year::AlignedObservation;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Configuration of one capacity sizing run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CapacityConfig {
    /// Fixed yearly demand, drawn down uniformly per month
    pub demand_volume_m3_per_year: f64,
    /// Capture efficiency in (0, 1]
    pub efficiency: f64,
    /// Fraction of years allowed to fall short of the design rainfall;
    /// 0.05 sizes against rainfall exceeded in 95% of years
    pub exceedance_probability: f64,
}

impl CapacityConfig {
    /// Reject out-of-range parameters before any sizing work.
    pub fn validate(&self) -> Result<()> {
        if self.efficiency <= 0.0 || self.efficiency > 1.0 {
            return Err(SimError::EfficiencyOutOfRange(self.efficiency));
        }
        if self.exceedance_probability <= 0.0 || self.exceedance_probability >= 1.0 {
            return Err(SimError::ExceedanceOutOfRange(self.exceedance_probability));
        }
        Ok(())
    }
}

/// Year-end observed rainfall total of one water year.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct YearlyTotal {
    pub water_year: i32,
    pub total_mm: f64,
}

/// One month of the base-year replay.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BaseCaseRecord {
    pub date: NaiveDate,
    pub observed_mm: f64,
    /// Captured volume this month
    pub capture_m3: f64,
    /// Demand drawn this month
    pub need_m3: f64,
    /// Cumulative capture
    pub supply_m3: f64,
    /// Cumulative demand
    pub demand_m3: f64,
    /// supply - demand; its maximum is the required storage
    pub diff_m3: f64,
}

/// The sizing result: selected base year, derived capture area and
/// storage, and the full base-year replay.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CapacityPlan {
    pub base_year: i32,
    pub base_year_total_mm: f64,
    pub base_threshold_mm: f64,
    pub required_capture_area_m2: f64,
    pub required_storage_m3: f64,
    /// Month at which the supply surplus peaks
    pub critical_month: NaiveDate,
    pub base_case: Vec<BaseCaseRecord>,
}

/// Year-end totals per water year: the maximum cumulative rainfall
/// reached within each year.
pub fn yearly_totals(series: &[AlignedObservation]) -> Vec<YearlyTotal> {
    let mut totals: BTreeMap<i32, f64> = BTreeMap::new();
    for observation in series {
        let entry = totals.entry(observation.water_year).or_insert(0.0);
        if observation.cumulative_observed_mm > *entry {
            *entry = observation.cumulative_observed_mm;
        }
    }
    totals
        .into_iter()
        .map(|(water_year, total_mm)| YearlyTotal {
            water_year,
            total_mm,
        })
        .collect()
}

/// R's default quantile algorithm (type=7) over pre-sorted values.
pub fn quantile(sorted: &[f64], p: f64) -> f64 {
    let n = sorted.len();
    let h = (n - 1) as f64 * p;
    let lo = h.floor() as usize;
    let hi = (lo + 1).min(n - 1);
    sorted[lo] + (h - h.floor()) * (sorted[hi] - sorted[lo])
}

/// Size the capture area and storage for a fixed yearly demand.
///
/// The base year is the driest year still at or above the design
/// threshold (ties to the earliest water year) — a deliberately
/// conservative selection even when a wetter year would be more
/// typical.
pub fn size(series: &[AlignedObservation], config: &CapacityConfig) -> Result<CapacityPlan> {
    config.validate()?;
    if series.is_empty() {
        return Err(SimError::EmptySeries(
            "no aligned observations to size against".to_string(),
        ));
    }

    let totals = yearly_totals(series);
    let mut sorted: Vec<f64> = totals.iter().map(|total| total.total_mm).collect();
    sorted.sort_by(|a, b| a.total_cmp(b));
    let threshold = quantile(&sorted, config.exceedance_probability);
    if threshold <= 0.0 || threshold.is_nan() {
        return Err(SimError::DegenerateThreshold(threshold));
    }

    let base = totals
        .iter()
        .filter(|total| total.total_mm >= threshold)
        .min_by(|a, b| {
            a.total_mm
                .total_cmp(&b.total_mm)
                .then(a.water_year.cmp(&b.water_year))
        })
        .ok_or(SimError::NoQualifyingYear {
            threshold_mm: threshold,
        })?;

    let area =
        config.demand_volume_m3_per_year / (config.efficiency * threshold * MM_TO_M3_PER_M2);

    let capture_factor = MM_TO_M3_PER_M2 * area * config.efficiency;
    let need = config.demand_volume_m3_per_year / 12.0;
    let mut supply = 0.0;
    let mut demand = 0.0;
    let mut max_diff = f64::NEG_INFINITY;
    let mut critical_month = None;
    let mut base_case = Vec::new();
    for observation in series
        .iter()
        .filter(|observation| observation.water_year == base.water_year)
    {
        let capture = observation.observed_mm * capture_factor;
        supply += capture;
        demand += need;
        let diff = supply - demand;
        if diff > max_diff {
            max_diff = diff;
            critical_month = Some(observation.date);
        }
        base_case.push(BaseCaseRecord {
            date: observation.date,
            observed_mm: observation.observed_mm,
            capture_m3: capture,
            need_m3: need,
            supply_m3: supply,
            demand_m3: demand,
            diff_m3: diff,
        });
    }

    // base year came from the totals, so the replay is non-empty
    let critical_month = critical_month.expect("base year without observations");
    Ok(CapacityPlan {
        base_year: base.water_year,
        base_year_total_mm: base.total_mm,
        base_threshold_mm: threshold,
        required_capture_area_m2: area,
        required_storage_m3: max_diff,
        critical_month,
        base_case,
    })
}
