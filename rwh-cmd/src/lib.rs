//! Command implementations for the RWH CLI.
//!
//! Provides subcommands for reshaping wide rainfall extracts, aligning
//! them to the local water year, and running the balance and capacity
//! simulations.

use clap::Subcommand;
use rwh_dekad::observation::{Observation, Window};
use rwh_dekad::reshape::{ReshapedSeries, SeriesKey};

pub mod reshape;
pub mod simulate;

#[derive(Subcommand)]
pub enum Command {
    /// Reshape a wide rainfall extract into tidy per-window series
    Reshape {
        /// Path to the wide-format rainfall CSV
        #[arg(short = 'i', long)]
        input_csv: String,

        /// Output path for the tidy long-format CSV
        #[arg(short = 'o', long)]
        output_csv: String,
    },

    /// Align the monthly series of one location to its water year
    Align {
        /// Path to the wide-format rainfall CSV
        #[arg(short = 'i', long)]
        input_csv: String,

        /// Location code of the reference series
        #[arg(short = 'l', long)]
        location: String,

        /// Resolution (pixel count); defaults to the highest available
        #[arg(long)]
        n_pixels: Option<u32>,

        /// Water-year start month 1-12; derived from the climatology
        /// when omitted
        #[arg(long)]
        start_month: Option<u32>,

        /// Output path for the aligned CSV
        #[arg(short = 'o', long)]
        output_csv: String,
    },

    /// Simulate the monthly storage balance for one location
    Simulate {
        /// Path to the wide-format rainfall CSV
        #[arg(short = 'i', long)]
        input_csv: String,

        /// Location code to simulate
        #[arg(short = 'l', long)]
        location: String,

        /// Resolution (pixel count); defaults to the highest available
        #[arg(long)]
        n_pixels: Option<u32>,

        /// Water-year start month 1-12; derived from the climatology
        /// when omitted
        #[arg(long)]
        start_month: Option<u32>,

        /// Yearly demand volume in m3
        #[arg(short = 'd', long)]
        demand: f64,

        /// Capture efficiency in (0, 1]
        #[arg(short = 'e', long)]
        efficiency: f64,

        /// Capture area in m2
        #[arg(short = 'a', long)]
        area: f64,

        /// Storage capacity in m3
        #[arg(short = 's', long)]
        storage: f64,

        /// First simulated month, YYYY-MM-DD
        #[arg(long)]
        start_date: String,

        /// Output path for the balance CSV
        #[arg(short = 'o', long)]
        output_csv: String,

        /// Optional output path for the per-month outcome
        /// probabilities JSON
        #[arg(short = 'p', long)]
        probabilities_json: Option<String>,
    },

    /// Size the capture area and storage for a fixed yearly demand
    Size {
        /// Path to the wide-format rainfall CSV
        #[arg(short = 'i', long)]
        input_csv: String,

        /// Location code to size for
        #[arg(short = 'l', long)]
        location: String,

        /// Resolution (pixel count); defaults to the highest available
        #[arg(long)]
        n_pixels: Option<u32>,

        /// Water-year start month 1-12; derived from the climatology
        /// when omitted
        #[arg(long)]
        start_month: Option<u32>,

        /// Yearly demand volume in m3
        #[arg(short = 'd', long)]
        demand: f64,

        /// Capture efficiency in (0, 1]
        #[arg(short = 'e', long)]
        efficiency: f64,

        /// Exceedance probability in (0, 1)
        #[arg(short = 'x', long)]
        exceedance: f64,

        /// Output path for the capacity plan JSON
        #[arg(short = 'o', long)]
        output_json: String,
    },
}

pub fn run(command: Command) -> anyhow::Result<()> {
    match command {
        Command::Reshape {
            input_csv,
            output_csv,
        } => reshape::run_reshape(&input_csv, &output_csv),
        Command::Align {
            input_csv,
            location,
            n_pixels,
            start_month,
            output_csv,
        } => reshape::run_align(&input_csv, &location, n_pixels, start_month, &output_csv),
        Command::Simulate {
            input_csv,
            location,
            n_pixels,
            start_month,
            demand,
            efficiency,
            area,
            storage,
            start_date,
            output_csv,
            probabilities_json,
        } => simulate::run_simulate(simulate::SimulateArgs {
            input_csv,
            location,
            n_pixels,
            start_month,
            demand,
            efficiency,
            area,
            storage,
            start_date,
            output_csv,
            probabilities_json,
        }),
        Command::Size {
            input_csv,
            location,
            n_pixels,
            start_month,
            demand,
            efficiency,
            exceedance,
            output_json,
        } => simulate::run_size(simulate::SizeArgs {
            input_csv,
            location,
            n_pixels,
            start_month,
            demand,
            efficiency,
            exceedance,
            output_json,
        }),
    }
}

/// Select the monthly tidy series for a location, at the requested
/// resolution or the highest one available.
pub(crate) fn monthly_series(
    series: &ReshapedSeries,
    location: &str,
    n_pixels: Option<u32>,
) -> anyhow::Result<Vec<Observation>> {
    let resolution = match n_pixels {
        Some(pixels) => pixels,
        None => series
            .keys()
            .filter(|key| key.location_code == location && key.window == Window::Monthly)
            .map(|key| key.n_pixels)
            .max()
            .ok_or_else(|| anyhow::anyhow!("No monthly series for location {}", location))?,
    };
    let key = SeriesKey {
        location_code: location.to_string(),
        n_pixels: resolution,
        window: Window::Monthly,
    };
    let observations = series
        .get(&key)
        .ok_or_else(|| {
            anyhow::anyhow!(
                "No monthly series for location {} at {} pixels",
                location,
                resolution
            )
        })?
        .clone();
    if observations.is_empty() {
        anyhow::bail!(
            "Monthly series for location {} at {} pixels is empty",
            location,
            resolution
        );
    }
    Ok(observations)
}

/// Resolve the water-year start: an explicit month wins over the
/// derived climatology.
pub(crate) fn resolve_start_month(
    reference: &[Observation],
    start_month: Option<u32>,
) -> anyhow::Result<rwh_data::water_year::WaterYearStart> {
    use rwh_data::water_year::{water_year_start, WaterYearStart};
    match start_month {
        Some(month) => {
            anyhow::ensure!(
                (1..=12).contains(&month),
                "Water-year start month must be 1-12, got {}",
                month
            );
            Ok(WaterYearStart(month))
        }
        None => Ok(water_year_start(reference)?),
    }
}
