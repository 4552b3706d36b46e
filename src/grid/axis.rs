use crate::limits::MAX_NIGHTS_PER_AXIS;
use crate::model::Night;

use super::GridError;

// ── Date axis ────────────────────────────────────────────────────

/// Build the nights of a stay: half-open `[start, end)`, so the checkout day
/// is never a night.
pub fn build_axis(start: Night, end: Night) -> Result<Vec<Night>, GridError> {
    if end <= start {
        return Err(GridError::InvalidRange { start, end });
    }
    let count = (end - start).num_days() as usize;
    if count > MAX_NIGHTS_PER_AXIS {
        return Err(GridError::LimitExceeded("date range too long"));
    }
    Ok(start.iter_days().take(count).collect())
}

/// True if `date` is one of the nights of `[start, end)`.
pub fn on_axis(start: Night, end: Night, date: Night) -> bool {
    start <= date && date < end
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn d(y: i32, m: u32, day: u32) -> Night {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    #[test]
    fn two_nights_exclude_checkout() {
        let nights = build_axis(d(2024, 4, 1), d(2024, 4, 3)).unwrap();
        assert_eq!(nights, vec![d(2024, 4, 1), d(2024, 4, 2)]);
    }

    #[test]
    fn single_night() {
        let nights = build_axis(d(2024, 4, 1), d(2024, 4, 2)).unwrap();
        assert_eq!(nights, vec![d(2024, 4, 1)]);
    }

    #[test]
    fn crosses_month_and_leap_day() {
        let nights = build_axis(d(2024, 2, 28), d(2024, 3, 2)).unwrap();
        assert_eq!(nights, vec![d(2024, 2, 28), d(2024, 2, 29), d(2024, 3, 1)]);
    }

    #[test]
    fn equal_dates_rejected() {
        let r = build_axis(d(2024, 4, 1), d(2024, 4, 1));
        assert!(matches!(r, Err(GridError::InvalidRange { .. })));
    }

    #[test]
    fn reversed_dates_rejected() {
        let r = build_axis(d(2024, 4, 3), d(2024, 4, 1));
        assert!(matches!(r, Err(GridError::InvalidRange { .. })));
    }

    #[test]
    fn too_long_rejected() {
        let r = build_axis(d(2024, 1, 1), d(2026, 1, 1));
        assert!(matches!(r, Err(GridError::LimitExceeded(_))));
    }

    #[test]
    fn full_leap_year_allowed() {
        let nights = build_axis(d(2024, 1, 1), d(2025, 1, 1)).unwrap();
        assert_eq!(nights.len(), 366);
    }

    #[test]
    fn stable_for_same_inputs() {
        let a = build_axis(d(2024, 4, 1), d(2024, 4, 10)).unwrap();
        let b = build_axis(d(2024, 4, 1), d(2024, 4, 10)).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn on_axis_half_open() {
        let (s, e) = (d(2024, 4, 1), d(2024, 4, 3));
        assert!(on_axis(s, e, d(2024, 4, 1)));
        assert!(on_axis(s, e, d(2024, 4, 2)));
        assert!(!on_axis(s, e, d(2024, 4, 3)));
        assert!(!on_axis(s, e, d(2024, 3, 31)));
    }
}
