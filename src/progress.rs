use crate::models::User;
use chrono::NaiveDate;

pub const DEFAULT_GOAL_MILES: f64 = 100.0;

/// Inclusive date range the daily average is measured against.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TargetWindow {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl TargetWindow {
    pub fn new(start: NaiveDate, end: NaiveDate) -> Option<Self> {
        (start <= end).then_some(Self { start, end })
    }

    /// The whole of October in the given year.
    pub fn october(year: i32) -> Option<Self> {
        Self::new(
            NaiveDate::from_ymd_opt(year, 10, 1)?,
            NaiveDate::from_ymd_opt(year, 10, 31)?,
        )
    }

    pub fn total_days(&self) -> i64 {
        (self.end - self.start).num_days() + 1
    }

    pub fn days_remaining(&self, today: NaiveDate) -> i64 {
        if today < self.start {
            self.total_days()
        } else if today <= self.end {
            (self.end - today).num_days()
        } else {
            0
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub struct ProgressSettings {
    pub goal_miles: f64,
    pub window: TargetWindow,
}

impl ProgressSettings {
    /// Recompute every derived field of `user` from its stored totals.
    pub fn refresh(&self, user: &mut User, today: NaiveDate) {
        user.walk_pct = percent_of_goal(user.walk_miles, self.goal_miles);
        user.run_pct = percent_of_goal(user.run_miles, self.goal_miles);
        user.daily_avg_required = daily_average_required(
            self.goal_miles,
            user.miles,
            self.window.days_remaining(today),
        );
    }
}

pub fn percent_of_goal(miles: f64, goal: f64) -> f64 {
    if goal <= 0.0 {
        return 0.0;
    }
    (miles / goal * 100.0).min(100.0)
}

pub fn daily_average_required(goal: f64, miles: f64, days_remaining: i64) -> f64 {
    if days_remaining <= 0 {
        return 0.0;
    }
    ((goal - miles) / days_remaining as f64).max(0.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn days_remaining_has_three_phases() {
        let window = TargetWindow::october(2024).unwrap();
        assert_eq!(window.days_remaining(date(2024, 9, 15)), 31);
        assert_eq!(window.days_remaining(date(2024, 10, 1)), 30);
        assert_eq!(window.days_remaining(date(2024, 10, 20)), 11);
        assert_eq!(window.days_remaining(date(2024, 10, 31)), 0);
        assert_eq!(window.days_remaining(date(2024, 11, 1)), 0);
    }

    #[test]
    fn custom_window_must_be_ordered() {
        assert!(TargetWindow::new(date(2025, 3, 10), date(2025, 3, 1)).is_none());
        let window = TargetWindow::new(date(2025, 3, 1), date(2025, 3, 10)).unwrap();
        assert_eq!(window.total_days(), 10);
        assert_eq!(window.days_remaining(date(2025, 2, 1)), 10);
    }

    #[test]
    fn percent_is_capped_at_one_hundred() {
        assert!((percent_of_goal(6.21371, 100.0) - 6.21371).abs() < 1e-9);
        assert_eq!(percent_of_goal(150.0, 100.0), 100.0);
        assert_eq!(percent_of_goal(10.0, 0.0), 0.0);
    }

    #[test]
    fn daily_average_never_negative() {
        assert_eq!(daily_average_required(100.0, 40.0, 10), 6.0);
        assert_eq!(daily_average_required(100.0, 140.0, 10), 0.0);
        assert_eq!(daily_average_required(100.0, 40.0, 0), 0.0);
    }

    #[test]
    fn refresh_derives_fields_from_totals() {
        let settings = ProgressSettings {
            goal_miles: 100.0,
            window: TargetWindow::october(2024).unwrap(),
        };
        let mut user = User::new("Cadey");
        user.walk_miles = 20.0;
        user.run_miles = 30.0;
        user.miles = 50.0;
        user.walk_pct = 99.0;

        settings.refresh(&mut user, date(2024, 10, 21));
        assert_eq!(user.walk_pct, 20.0);
        assert_eq!(user.run_pct, 30.0);
        assert_eq!(user.daily_avg_required, 5.0);
    }
}
