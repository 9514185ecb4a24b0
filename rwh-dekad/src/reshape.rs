//! Wide-to-tidy reshaping of rainfall records.
//!
//! Unpivots the nine measurement columns of each wide record into
//! (window, kind, value) triples, re-pivots by kind so each aggregation
//! window gets its own observed/average/anomaly series, then resamples
//! monthly and quarterly windows to their native reporting points.

use crate::error::{DekadError, Result};
use crate::observation::{MeasureKind, Observation, Window};
use crate::record::RawRecord;
use itertools::Itertools;
use log::warn;
use serde::Serialize;
use std::collections::BTreeMap;

/// Identifies one tidy series: a location at one resolution and window.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct SeriesKey {
    pub location_code: String,
    pub n_pixels: u32,
    pub window: Window,
}

/// All tidy series produced from one wide record set, keyed by
/// (location, resolution, window). BTreeMap keeps group order
/// deterministic.
pub type ReshapedSeries = BTreeMap<SeriesKey, Vec<Observation>>;

const ALL_WINDOWS: [Window; 3] = [Window::Dekad, Window::Monthly, Window::Quarterly];

/// Reshape wide records into tidy per-window observation series.
///
/// Rows are grouped by (location_code, n_pixels); within each group the
/// monthly and quarterly windows keep only their anchor-day rows while
/// the dekad window keeps every row. A group whose filter leaves zero
/// rows yields an empty series, not an error. Duplicate dates within a
/// group are a shape error.
pub fn reshape(records: &[RawRecord]) -> Result<ReshapedSeries> {
    let mut sorted = records.to_vec();
    sorted.sort_by(|a, b| {
        (&a.location_code, a.n_pixels, a.date).cmp(&(&b.location_code, b.n_pixels, b.date))
    });

    let mut series = ReshapedSeries::new();
    for ((location_code, n_pixels), group) in &sorted
        .iter()
        .chunk_by(|record| (record.location_code.clone(), record.n_pixels))
    {
        let rows = group.collect::<Vec<_>>();
        for window in ALL_WINDOWS {
            let observations = pivot_window(&location_code, n_pixels, window, &rows)?;
            if observations.is_empty() {
                warn!(
                    "No {} reporting points for {} at {} pixels",
                    window, location_code, n_pixels
                );
            }
            series.insert(
                SeriesKey {
                    location_code: location_code.clone(),
                    n_pixels,
                    window,
                },
                observations,
            );
        }
    }
    Ok(series)
}

/// Re-pivot one window of a group: anchor-day filter plus typed access
/// to the window's observed/average/anomaly columns.
fn pivot_window(
    location_code: &str,
    n_pixels: u32,
    window: Window,
    rows: &[&RawRecord],
) -> Result<Vec<Observation>> {
    let mut observations = Vec::with_capacity(rows.len());
    let mut previous_date = None;
    for row in rows {
        if !window.keeps(&row.date) {
            continue;
        }
        if previous_date == Some(row.date) {
            return Err(DekadError::NonMonotonicDates {
                location_code: location_code.to_string(),
                window: window.to_string(),
                date: row.date,
            });
        }
        previous_date = Some(row.date);
        observations.push(Observation {
            location_code: location_code.to_string(),
            n_pixels,
            window,
            date: row.date,
            observed_mm: row.measure(window, MeasureKind::Observed),
            long_term_avg_mm: row.measure(window, MeasureKind::Average),
            anomaly_pct: row.measure(window, MeasureKind::Anomaly),
        });
    }
    Ok(observations)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::read_raw_records;
    use chrono::NaiveDate;

    fn record(date: (i32, u32, u32), location: &str, pixels: u32, base: f64) -> RawRecord {
        RawRecord {
            date: NaiveDate::from_ymd_opt(date.0, date.1, date.2).unwrap(),
            n_pixels: pixels,
            location_code: location.to_string(),
            rfh: base,
            rfh_avg: base + 1.0,
            rfq: base + 2.0,
            r1h: base + 3.0,
            r1h_avg: base + 4.0,
            r1q: base + 5.0,
            r3h: base + 6.0,
            r3h_avg: base + 7.0,
            r3q: base + 8.0,
        }
    }

    #[test]
    fn test_reshape_filters_to_anchor_days() {
        // One month of dekads plus the mid-month dekad of a quarter-end month
        let records = vec![
            record((2020, 5, 1), "100101", 64, 10.0),
            record((2020, 5, 11), "100101", 64, 20.0),
            record((2020, 5, 21), "100101", 64, 30.0),
            record((2020, 6, 11), "100101", 64, 40.0),
        ];
        let series = reshape(&records).unwrap();

        let dekads = &series[&SeriesKey {
            location_code: "100101".to_string(),
            n_pixels: 64,
            window: Window::Dekad,
        }];
        assert_eq!(dekads.len(), 4);

        let monthly = &series[&SeriesKey {
            location_code: "100101".to_string(),
            n_pixels: 64,
            window: Window::Monthly,
        }];
        assert_eq!(monthly.len(), 2);
        assert_eq!(monthly[0].date, NaiveDate::from_ymd_opt(2020, 5, 11).unwrap());
        assert_eq!(monthly[0].observed_mm, 23.0);

        let quarterly = &series[&SeriesKey {
            location_code: "100101".to_string(),
            n_pixels: 64,
            window: Window::Quarterly,
        }];
        assert_eq!(quarterly.len(), 1);
        assert_eq!(quarterly[0].date, NaiveDate::from_ymd_opt(2020, 6, 11).unwrap());
        assert_eq!(quarterly[0].observed_mm, 46.0);
    }

    #[test]
    fn test_reshape_empty_filter_is_not_an_error() {
        // A single start-of-month dekad: no monthly or quarterly anchors
        let records = vec![record((2020, 5, 1), "100101", 64, 10.0)];
        let series = reshape(&records).unwrap();
        let monthly = &series[&SeriesKey {
            location_code: "100101".to_string(),
            n_pixels: 64,
            window: Window::Monthly,
        }];
        assert!(monthly.is_empty());
    }

    #[test]
    fn test_reshape_rejects_duplicate_dates() {
        let records = vec![
            record((2020, 5, 11), "100101", 64, 10.0),
            record((2020, 5, 11), "100101", 64, 20.0),
        ];
        let err = reshape(&records).unwrap_err();
        assert!(matches!(err, DekadError::NonMonotonicDates { .. }));
    }

    #[test]
    fn test_reshape_keeps_groups_separate() {
        let records = vec![
            record((2020, 5, 11), "100101", 64, 10.0),
            record((2020, 5, 11), "100102", 64, 20.0),
            record((2020, 5, 11), "100101", 256, 30.0),
        ];
        let series = reshape(&records).unwrap();
        // three groups x three windows
        assert_eq!(series.len(), 9);
    }

    #[test]
    fn test_round_trip_recovers_wide_values() {
        // At a quarterly anchor all three windows report, so the original
        // nine wide values can be reassembled from the tidy output.
        let original = record((2020, 6, 11), "100101", 64, 50.0);
        let series = reshape(&[original.clone()]).unwrap();

        for (window, kind, value) in original.measures().unwrap() {
            let observations = &series[&SeriesKey {
                location_code: original.location_code.clone(),
                n_pixels: original.n_pixels,
                window,
            }];
            assert_eq!(observations.len(), 1);
            let recovered = match kind {
                MeasureKind::Observed => observations[0].observed_mm,
                MeasureKind::Average => observations[0].long_term_avg_mm,
                MeasureKind::Anomaly => observations[0].anomaly_pct,
            };
            assert_eq!(recovered, value);
        }
    }

    #[test]
    fn test_reshape_already_tidy_input_is_rejected_upstream() {
        // Tidy long-format output lacks the wide measure columns, so
        // feeding it back through the reader fails the header check.
        let tidy = "\
location_code,n_pixels,window,date,observed_mm,long_term_avg_mm,anomaly_pct
100101,64,dekad,2020-05-01,10.0,11.0,12.0
";
        assert!(matches!(
            read_raw_records(tidy.as_bytes()),
            Err(DekadError::MissingColumn(_))
        ));
    }
}
