//! Water-year alignment for rainfall observation series.
//!
//! This crate turns tidy per-window series into water-year-tagged series
//! suitable for balance simulation and capacity sizing.

pub mod water_year;
