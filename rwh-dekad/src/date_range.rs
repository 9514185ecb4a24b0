use chrono::NaiveDate;
use rwh_utils::dates::add_months;
use std::mem::replace;

/// A month range iterator that yields monthly anchor dates from the
/// start date through the end date (inclusive), keeping the day of
/// month fixed.
#[derive(Clone, Eq, PartialEq, Copy, Debug)]
pub struct MonthRange(pub NaiveDate, pub NaiveDate);

impl Iterator for MonthRange {
    type Item = NaiveDate;
    fn next(&mut self) -> Option<Self::Item> {
        if self.0 <= self.1 {
            let next = add_months(&self.0, 1)?;
            Some(replace(&mut self.0, next))
        } else {
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::MonthRange;
    use chrono::NaiveDate;

    #[test]
    fn test_month_range_iteration() {
        let start = NaiveDate::from_ymd_opt(2020, 11, 11).unwrap();
        let end = NaiveDate::from_ymd_opt(2021, 2, 11).unwrap();
        let dates: Vec<NaiveDate> = MonthRange(start, end).collect();
        assert_eq!(dates.len(), 4);
        assert_eq!(dates[0], start);
        assert_eq!(dates[2], NaiveDate::from_ymd_opt(2021, 1, 11).unwrap());
        assert_eq!(dates[3], end);
    }

    #[test]
    fn test_month_range_single_month() {
        let start = NaiveDate::from_ymd_opt(2022, 3, 11).unwrap();
        let dates: Vec<NaiveDate> = MonthRange(start, start).collect();
        assert_eq!(dates, vec![start]);
    }

    #[test]
    fn test_month_range_empty() {
        let start = NaiveDate::from_ymd_opt(2022, 3, 11).unwrap();
        let end = NaiveDate::from_ymd_opt(2022, 2, 11).unwrap();
        assert_eq!(MonthRange(start, end).count(), 0);
    }
}
