//! Shared utility functions for RWH crates.

/// Date utility functions
pub mod dates {
    use chrono::NaiveDate;

    /// Format a NaiveDate as "YYYY-MM-DD"
    pub fn format_date(date: &NaiveDate) -> String {
        date.format("%Y-%m-%d").to_string()
    }

    /// Parse a date string in "YYYY-MM-DD" format
    pub fn parse_date(s: &str) -> anyhow::Result<NaiveDate> {
        Ok(NaiveDate::parse_from_str(s, "%Y-%m-%d")?)
    }

    /// Get the water year label for a given date and water-year start month.
    ///
    /// The label is the calendar year of the months at and after the start
    /// month; months before the start month belong to the previous label.
    /// e.g. with a September start, Sep 15 2020 -> 2020, Aug 15 2020 -> 2019.
    pub fn water_year_for_date(date: &NaiveDate, start_month: u32) -> i32 {
        use chrono::Datelike;
        let month = date.month();
        let year = date.year();
        if month >= start_month {
            year
        } else {
            year - 1
        }
    }

    /// Add `n` calendar months to a date, keeping the day of month.
    ///
    /// Returns None if the resulting day does not exist in the target month
    /// (e.g. Jan 31 + 1 month). Anchor days used across this workspace
    /// (1/11/21) exist in every month.
    pub fn add_months(date: &NaiveDate, n: u32) -> Option<NaiveDate> {
        use chrono::Datelike;
        let zero_based = date.month0() + n;
        let year = date.year() + (zero_based / 12) as i32;
        let month = zero_based % 12 + 1;
        NaiveDate::from_ymd_opt(year, month, date.day())
    }

}

/// Error types
pub mod error {
    use std::fmt;

    #[derive(Debug)]
    pub struct DateError(pub String);

    impl fmt::Display for DateError {
        fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            write!(f, "Date error: {}", self.0)
        }
    }

    impl std::error::Error for DateError {}
}
