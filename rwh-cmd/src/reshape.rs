//! Reshape and align commands.

use chrono::NaiveDate;
use log::info;
use rwh_data::water_year::align;
use rwh_dekad::location::{name_for, Location};
use rwh_dekad::observation::Window;
use rwh_dekad::record::read_raw_records;
use rwh_dekad::reshape::reshape;
use serde::Serialize;
use std::fs::File;

/// One row of the tidy long-format output, enriched with the display
/// name where the location catalog knows the code.
#[derive(Debug, Serialize)]
struct TidyRow {
    location_code: String,
    location_name: Option<String>,
    n_pixels: u32,
    window: Window,
    date: NaiveDate,
    observed_mm: f64,
    long_term_avg_mm: f64,
    anomaly_pct: f64,
}

/// Reshape a wide rainfall extract into tidy per-window series.
///
/// Reads the wide CSV, unpivots and resamples it, joins location names
/// from the embedded catalog (unmatched codes keep an empty name), and
/// writes one long-format CSV covering every (location, resolution,
/// window) group.
pub fn run_reshape(input_csv: &str, output_csv: &str) -> anyhow::Result<()> {
    let records = read_raw_records(File::open(input_csv)?)?;
    info!("Read {} wide records from {}", records.len(), input_csv);

    let series = reshape(&records)?;
    let catalog = Location::name_map()?;

    let mut writer = csv::Writer::from_path(output_csv)?;
    let mut rows = 0usize;
    for (key, observations) in &series {
        let location_name = name_for(&catalog, &key.location_code);
        for observation in observations {
            writer.serialize(TidyRow {
                location_code: observation.location_code.clone(),
                location_name: location_name.clone(),
                n_pixels: observation.n_pixels,
                window: observation.window,
                date: observation.date,
                observed_mm: observation.observed_mm,
                long_term_avg_mm: observation.long_term_avg_mm,
                anomaly_pct: observation.anomaly_pct,
            })?;
            rows += 1;
        }
    }
    writer.flush()?;

    info!(
        "Reshape complete. {} series, {} rows written to {}",
        series.len(),
        rows,
        output_csv
    );
    Ok(())
}

/// Align the monthly series of one location to its water year.
///
/// The water-year start month comes from the reference climatology
/// unless overridden, and is logged so downstream runs can pass it
/// explicitly.
pub fn run_align(
    input_csv: &str,
    location: &str,
    n_pixels: Option<u32>,
    start_month: Option<u32>,
    output_csv: &str,
) -> anyhow::Result<()> {
    let records = read_raw_records(File::open(input_csv)?)?;
    let series = reshape(&records)?;
    let monthly = crate::monthly_series(&series, location, n_pixels)?;
    let start = crate::resolve_start_month(&monthly, start_month)?;

    info!(
        "Aligning {} monthly observations for {} (water year starts month {})",
        monthly.len(),
        location,
        start.month()
    );

    let aligned = align(&monthly, start)?;
    let mut writer = csv::Writer::from_path(output_csv)?;
    for record in &aligned {
        writer.serialize(record)?;
    }
    writer.flush()?;

    info!("Alignment complete. Output: {}", output_csv);
    Ok(())
}
