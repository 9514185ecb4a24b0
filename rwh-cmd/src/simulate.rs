//! Balance simulation and capacity sizing commands.

use log::info;
use rwh_data::water_year::align;
use rwh_dekad::record::read_raw_records;
use rwh_dekad::reshape::reshape;
use rwh_sim::balance::{outcome_probabilities, simulate, BalanceConfig};
use rwh_sim::capacity::{size, CapacityConfig};
use rwh_utils::dates::parse_date;
use std::fs::File;

pub struct SimulateArgs {
    pub input_csv: String,
    pub location: String,
    pub n_pixels: Option<u32>,
    pub start_month: Option<u32>,
    pub demand: f64,
    pub efficiency: f64,
    pub area: f64,
    pub storage: f64,
    pub start_date: String,
    pub output_csv: String,
    pub probabilities_json: Option<String>,
}

pub struct SizeArgs {
    pub input_csv: String,
    pub location: String,
    pub n_pixels: Option<u32>,
    pub start_month: Option<u32>,
    pub demand: f64,
    pub efficiency: f64,
    pub exceedance: f64,
    pub output_json: String,
}

/// Run the monthly storage balance for one location and write the
/// balance records as CSV, optionally with the per-month outcome
/// probabilities as JSON.
pub fn run_simulate(args: SimulateArgs) -> anyhow::Result<()> {
    let records = read_raw_records(File::open(&args.input_csv)?)?;
    let series = reshape(&records)?;
    let monthly = crate::monthly_series(&series, &args.location, args.n_pixels)?;
    let start = crate::resolve_start_month(&monthly, args.start_month)?;
    let aligned = align(&monthly, start)?;

    let config = BalanceConfig {
        demand_volume_m3_per_year: args.demand,
        efficiency: args.efficiency,
        capture_area_m2: args.area,
        storage_capacity_m3: args.storage,
        start_date: parse_date(&args.start_date)?,
    };
    let balance = simulate(&aligned, &config)?;

    info!(
        "Simulated {} months for {} from {}",
        balance.len(),
        args.location,
        config.start_date
    );

    let mut writer = csv::Writer::from_path(&args.output_csv)?;
    for record in &balance {
        writer.serialize(record)?;
    }
    writer.flush()?;
    info!("Balance records written to {}", args.output_csv);

    if let Some(path) = &args.probabilities_json {
        let outcomes = outcome_probabilities(&balance);
        serde_json::to_writer_pretty(File::create(path)?, &outcomes)?;
        info!("Outcome probabilities written to {}", path);
    }
    Ok(())
}

/// Size the capture area and storage for one location and write the
/// capacity plan as JSON.
pub fn run_size(args: SizeArgs) -> anyhow::Result<()> {
    let records = read_raw_records(File::open(&args.input_csv)?)?;
    let series = reshape(&records)?;
    let monthly = crate::monthly_series(&series, &args.location, args.n_pixels)?;
    let start = crate::resolve_start_month(&monthly, args.start_month)?;
    let aligned = align(&monthly, start)?;

    let config = CapacityConfig {
        demand_volume_m3_per_year: args.demand,
        efficiency: args.efficiency,
        exceedance_probability: args.exceedance,
    };
    let plan = size(&aligned, &config)?;

    info!(
        "Base year {} ({} mm): {:.0} m2 capture area, {:.1} m3 storage",
        plan.base_year,
        plan.base_year_total_mm,
        plan.required_capture_area_m2,
        plan.required_storage_m3
    );

    serde_json::to_writer_pretty(File::create(&args.output_json)?, &plan)?;
    info!("Capacity plan written to {}", args.output_json);
    Ok(())
}
