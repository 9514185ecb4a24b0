//! Bounded-storage monthly balance simulation.
//!
//! One pass over a date-ordered monthly series produces a balance,
//! overflow and deficit record per month, then per-calendar-month
//! outcome probabilities across all years in the simulated range.

use crate::error::{Result, SimError};
use chrono::{Datelike, NaiveDate};
use rwh_data::water_year::AlignedObservation;
use serde::{Deserialize, Serialize};

/// Conversion from mm of rainfall over one m2 to m3.
pub const MM_TO_M3_PER_M2: f64 = 0.001;

/// Configuration of one balance simulation run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BalanceConfig {
    /// Fixed yearly demand, drawn down uniformly per month
    pub demand_volume_m3_per_year: f64,
    /// Capture efficiency in (0, 1]
    pub efficiency: f64,
    /// Capture (roof) area in m2
    pub capture_area_m2: f64,
    /// Tank capacity in m3; zero means every surplus overflows
    pub storage_capacity_m3: f64,
    /// First month included in the simulation
    pub start_date: NaiveDate,
}

impl BalanceConfig {
    /// Reject out-of-range parameters before any simulation work.
    pub fn validate(&self) -> Result<()> {
        if self.efficiency <= 0.0 || self.efficiency > 1.0 {
            return Err(SimError::EfficiencyOutOfRange(self.efficiency));
        }
        if self.capture_area_m2 <= 0.0 {
            return Err(SimError::NonPositiveArea(self.capture_area_m2));
        }
        if self.storage_capacity_m3 < 0.0 {
            return Err(SimError::NegativeStorage(self.storage_capacity_m3));
        }
        Ok(())
    }
}

/// The outcome scenario of one simulated month. The three cases are
/// mutually exclusive and exhaustive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Outcome {
    /// 0 <= unrestrained balance <= storage
    Balance,
    /// unrestrained balance > storage
    Overflow,
    /// unrestrained balance < 0
    Deficit,
}

/// One month of the simulated water balance.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BalanceRecord {
    pub date: NaiveDate,
    pub inflow_m3: f64,
    pub outflow_m3: f64,
    /// Balance before clamping to [0, storage]
    pub unrestrained_balance_m3: f64,
    pub balance_m3: f64,
    pub overflow_m3: f64,
    pub deficit_m3: f64,
    pub outcome: Outcome,
}

/// Run the balance recurrence over all months from the configured start
/// date onward.
///
/// The series is assumed date-ordered (the aligner guarantees it); the
/// storage starts empty. An empty series after the start-date filter is
/// a configuration error, not a silent empty result.
pub fn simulate(series: &[AlignedObservation], config: &BalanceConfig) -> Result<Vec<BalanceRecord>> {
    config.validate()?;
    let months: Vec<&AlignedObservation> = series
        .iter()
        .filter(|observation| observation.date >= config.start_date)
        .collect();
    if months.is_empty() {
        return Err(SimError::EmptySeries(format!(
            "no observations on or after {}",
            config.start_date
        )));
    }

    let outflow = config.demand_volume_m3_per_year / 12.0;
    let storage = config.storage_capacity_m3;
    let mut records = Vec::with_capacity(months.len());
    let mut balance = 0.0;
    for observation in months {
        let inflow =
            observation.observed_mm * MM_TO_M3_PER_M2 * config.capture_area_m2 * config.efficiency;
        let unrestrained = balance + inflow - outflow;
        balance = unrestrained.clamp(0.0, storage);
        let overflow = (unrestrained - storage).max(0.0);
        let deficit = (-unrestrained).max(0.0);
        let outcome = if unrestrained < 0.0 {
            Outcome::Deficit
        } else if unrestrained > storage {
            Outcome::Overflow
        } else {
            Outcome::Balance
        };
        records.push(BalanceRecord {
            date: observation.date,
            inflow_m3: inflow,
            outflow_m3: outflow,
            unrestrained_balance_m3: unrestrained,
            balance_m3: balance,
            overflow_m3: overflow,
            deficit_m3: deficit,
            outcome,
        });
    }
    Ok(records)
}

/// Outcome counts and frequencies for one calendar month, aggregated
/// across all simulated years.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MonthOutcome {
    /// Calendar month 1-12
    pub month: u32,
    /// Number of simulated records for this month
    pub n_observed: usize,
    pub balance_count: usize,
    pub overflow_count: usize,
    pub deficit_count: usize,
    pub p_balance: f64,
    pub p_overflow: f64,
    pub p_deficit: f64,
}

/// Aggregate simulated records into per-calendar-month outcome
/// probabilities. The three frequencies of each month sum to 1.
pub fn outcome_probabilities(records: &[BalanceRecord]) -> Vec<MonthOutcome> {
    let mut counts = [[0usize; 3]; 12];
    for record in records {
        let month0 = record.date.month0() as usize;
        let scenario = match record.outcome {
            Outcome::Balance => 0,
            Outcome::Overflow => 1,
            Outcome::Deficit => 2,
        };
        counts[month0][scenario] += 1;
    }

    (0..12u32)
        .filter_map(|month0| {
            let [balance_count, overflow_count, deficit_count] = counts[month0 as usize];
            let n_observed = balance_count + overflow_count + deficit_count;
            if n_observed == 0 {
                return None;
            }
            let n = n_observed as f64;
            Some(MonthOutcome {
                month: month0 + 1,
                n_observed,
                balance_count,
                overflow_count,
                deficit_count,
                p_balance: balance_count as f64 / n,
                p_overflow: overflow_count as f64 / n,
                p_deficit: deficit_count as f64 / n,
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rwh_dekad::date_range::MonthRange;

    fn aligned(date: NaiveDate, observed: f64) -> AlignedObservation {
        AlignedObservation {
            location_code: "100101".to_string(),
            n_pixels: 64,
            date,
            observed_mm: observed,
            long_term_avg_mm: 50.0,
            anomaly_pct: 100.0,
            water_year: if date.month() >= 9 {
                date.year()
            } else {
                date.year() - 1
            },
            cumulative_observed_mm: 0.0,
        }
    }

    /// Three years of mid-month observations with a wet season around
    /// September and a dry season in spring.
    fn three_year_series() -> Vec<AlignedObservation> {
        let start = NaiveDate::from_ymd_opt(2018, 7, 11).unwrap();
        let end = NaiveDate::from_ymd_opt(2021, 6, 11).unwrap();
        MonthRange(start, end)
            .map(|date| {
                let observed = match date.month() {
                    7..=10 => 150.0,
                    11 | 6 => 60.0,
                    _ => 5.0,
                };
                aligned(date, observed)
            })
            .collect()
    }

    fn config() -> BalanceConfig {
        BalanceConfig {
            demand_volume_m3_per_year: 60.0,
            efficiency: 0.8,
            capture_area_m2: 120.0,
            storage_capacity_m3: 10.0,
            start_date: NaiveDate::from_ymd_opt(2018, 7, 1).unwrap(),
        }
    }

    #[test]
    fn test_balance_is_clamped_unrestrained() {
        let records = simulate(&three_year_series(), &config()).unwrap();
        let storage = config().storage_capacity_m3;
        for record in &records {
            assert_eq!(
                record.balance_m3,
                record.unrestrained_balance_m3.clamp(0.0, storage)
            );
        }
    }

    #[test]
    fn test_overflow_and_deficit_are_mutually_exclusive() {
        let records = simulate(&three_year_series(), &config()).unwrap();
        for record in &records {
            assert_eq!(record.overflow_m3 * record.deficit_m3, 0.0);
        }
    }

    #[test]
    fn test_recurrence_carries_previous_balance() {
        let records = simulate(&three_year_series(), &config()).unwrap();
        for window in records.windows(2) {
            let expected =
                window[0].balance_m3 + window[1].inflow_m3 - window[1].outflow_m3;
            assert!((window[1].unrestrained_balance_m3 - expected).abs() < 1e-9);
        }
    }

    #[test]
    fn test_zero_storage_overflows_every_surplus() {
        let mut zero_storage = config();
        zero_storage.storage_capacity_m3 = 0.0;
        let records = simulate(&three_year_series(), &zero_storage).unwrap();
        for record in &records {
            assert_eq!(record.balance_m3, 0.0);
            if record.unrestrained_balance_m3 > 0.0 {
                assert_eq!(record.outcome, Outcome::Overflow);
                assert_eq!(record.overflow_m3, record.unrestrained_balance_m3);
            }
        }
    }

    #[test]
    fn test_probabilities_sum_to_one() {
        let records = simulate(&three_year_series(), &config()).unwrap();
        let outcomes = outcome_probabilities(&records);
        assert_eq!(outcomes.len(), 12);
        for month in &outcomes {
            let sum = month.p_balance + month.p_overflow + month.p_deficit;
            assert!((sum - 1.0).abs() < 1e-12, "month {} sums to {}", month.month, sum);
        }
    }

    #[test]
    fn test_wet_season_overflows_dry_season_runs_deficit() {
        let records = simulate(&three_year_series(), &config()).unwrap();
        let outcomes = outcome_probabilities(&records);
        let september = outcomes.iter().find(|m| m.month == 9).unwrap();
        let march = outcomes.iter().find(|m| m.month == 3).unwrap();
        assert_eq!(september.p_overflow, 1.0);
        assert_eq!(march.p_deficit, 1.0);
    }

    #[test]
    fn test_start_date_filter() {
        let mut late_start = config();
        late_start.start_date = NaiveDate::from_ymd_opt(2020, 9, 1).unwrap();
        let records = simulate(&three_year_series(), &late_start).unwrap();
        assert!(records
            .iter()
            .all(|record| record.date >= late_start.start_date));
        assert_eq!(records.len(), 10);
    }

    #[test]
    fn test_empty_series_after_filter_is_an_error() {
        let mut future_start = config();
        future_start.start_date = NaiveDate::from_ymd_opt(2030, 1, 1).unwrap();
        assert!(matches!(
            simulate(&three_year_series(), &future_start),
            Err(SimError::EmptySeries(_))
        ));
    }

    #[test]
    fn test_configuration_validation() {
        let series = three_year_series();

        let mut bad = config();
        bad.efficiency = 0.0;
        assert!(matches!(
            simulate(&series, &bad),
            Err(SimError::EfficiencyOutOfRange(_))
        ));

        let mut bad = config();
        bad.efficiency = 1.5;
        assert!(matches!(
            simulate(&series, &bad),
            Err(SimError::EfficiencyOutOfRange(_))
        ));

        let mut bad = config();
        bad.capture_area_m2 = 0.0;
        assert!(matches!(
            simulate(&series, &bad),
            Err(SimError::NonPositiveArea(_))
        ));

        let mut bad = config();
        bad.storage_capacity_m3 = -1.0;
        assert!(matches!(
            simulate(&series, &bad),
            Err(SimError::NegativeStorage(_))
        ));
    }
}
