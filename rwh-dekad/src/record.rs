//! Wide-format input records.
//!
//! One raw record per (date, location, resolution) carrying nine
//! measurement columns: three aggregation windows, each with observed,
//! long-term-average and anomaly values.

use crate::error::{DekadError, Result};
use crate::observation::{MeasureKind, Window};
use chrono::NaiveDate;
use csv::ReaderBuilder;
use serde::{Deserialize, Serialize};
use std::io::Read;

/// The nine measurement column names in header order.
pub const MEASURE_COLUMNS: [&str; 9] = [
    "rfh", "rfh_avg", "rfq", "r1h", "r1h_avg", "r1q", "r3h", "r3h_avg", "r3q",
];

/// Non-measurement columns every wide record must carry.
pub const KEY_COLUMNS: [&str; 3] = ["date", "n_pixels", "location_code"];

/// One wide-format rainfall record as delivered by the acquisition layer.
///
/// Fields are accessed by name throughout; nothing in this crate indexes
/// columns positionally.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawRecord {
    pub date: NaiveDate,
    pub n_pixels: u32,
    pub location_code: String,
    pub rfh: f64,
    pub rfh_avg: f64,
    pub rfq: f64,
    pub r1h: f64,
    pub r1h_avg: f64,
    pub r1q: f64,
    pub r3h: f64,
    pub r3h_avg: f64,
    pub r3q: f64,
}

impl RawRecord {
    /// The value of one measurement column, selected by its parsed tags.
    pub fn measure(&self, window: Window, kind: MeasureKind) -> f64 {
        match (window, kind) {
            (Window::Dekad, MeasureKind::Observed) => self.rfh,
            (Window::Dekad, MeasureKind::Average) => self.rfh_avg,
            (Window::Dekad, MeasureKind::Anomaly) => self.rfq,
            (Window::Monthly, MeasureKind::Observed) => self.r1h,
            (Window::Monthly, MeasureKind::Average) => self.r1h_avg,
            (Window::Monthly, MeasureKind::Anomaly) => self.r1q,
            (Window::Quarterly, MeasureKind::Observed) => self.r3h,
            (Window::Quarterly, MeasureKind::Average) => self.r3h_avg,
            (Window::Quarterly, MeasureKind::Anomaly) => self.r3q,
        }
    }

    /// Unpivot this record into (window, kind, value) triples, one per
    /// measurement column.
    pub fn measures(&self) -> Result<Vec<(Window, MeasureKind, f64)>> {
        MEASURE_COLUMNS
            .iter()
            .map(|name| {
                let (window, kind) = crate::observation::parse_measure_column(name)?;
                Ok((window, kind, self.measure(window, kind)))
            })
            .collect()
    }
}

/// Read wide records from a CSV reader with a header row.
///
/// The header is checked up front so a missing column is reported by
/// name rather than as a per-row deserialization failure.
pub fn read_raw_records<R: Read>(reader: R) -> Result<Vec<RawRecord>> {
    let mut csv_reader = ReaderBuilder::new().has_headers(true).from_reader(reader);
    let headers = csv_reader.headers()?.clone();
    for expected in KEY_COLUMNS.iter().chain(MEASURE_COLUMNS.iter()) {
        if !headers.iter().any(|h| h == *expected) {
            return Err(DekadError::MissingColumn(expected.to_string()));
        }
    }
    csv_reader
        .deserialize()
        .map(|row| row.map_err(DekadError::from))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    const WIDE_CSV: &str = "\
date,n_pixels,location_code,rfh,rfh_avg,rfq,r1h,r1h_avg,r1q,r3h,r3h_avg,r3q
2020-01-01,64,100101,12.5,10.0,125.0,30.0,28.0,107.1,95.0,90.0,105.6
2020-01-11,64,100101,8.0,9.5,84.2,28.5,27.0,105.6,93.0,88.0,105.7
";

    #[test]
    fn test_read_raw_records() {
        let records = read_raw_records(WIDE_CSV.as_bytes()).unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].location_code, "100101");
        assert_eq!(records[0].n_pixels, 64);
        assert_eq!(records[0].rfh, 12.5);
        assert_eq!(records[1].r3q, 105.7);
    }

    #[test]
    fn test_read_raw_records_missing_column() {
        let csv = "\
date,n_pixels,location_code,rfh,rfh_avg,rfq,r1h,r1h_avg,r1q,r3h,r3h_avg
2020-01-01,64,100101,12.5,10.0,125.0,30.0,28.0,107.1,95.0,90.0
";
        let err = read_raw_records(csv.as_bytes()).unwrap_err();
        match err {
            DekadError::MissingColumn(name) => assert_eq!(name, "r3q"),
            other => panic!("expected MissingColumn, got {:?}", other),
        }
    }

    #[test]
    fn test_measures_unpivots_all_nine_columns() {
        let records = read_raw_records(WIDE_CSV.as_bytes()).unwrap();
        let triples = records[0].measures().unwrap();
        assert_eq!(triples.len(), 9);
        assert!(triples
            .iter()
            .any(|(w, k, v)| *w == Window::Dekad && *k == MeasureKind::Observed && *v == 12.5));
        assert!(triples
            .iter()
            .any(|(w, k, v)| *w == Window::Quarterly && *k == MeasureKind::Anomaly && *v == 105.6));
    }
}
