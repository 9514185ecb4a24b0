//! Storage balance simulation and capacity sizing for rainwater
//! harvesting installations.
//!
//! Both simulations consume the same water-year-aligned monthly series:
//! `balance` runs a bounded-storage recurrence with overflow/deficit
//! accounting, `capacity` sizes the tank and capture area against a
//! conservatively selected base year.

pub mod balance;
pub mod capacity;
pub mod error;
