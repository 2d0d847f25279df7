//! Fire-time planning for the daily dispatch.
//!
//! Planning is pure: given the local wall-clock time, whether today's
//! dispatch is already recorded, the window and a randomness source, it
//! returns the next fire time. The scheduler calls it on every loop
//! iteration, so each day's time is drawn independently. Nothing here is
//! persisted.
//!
//! One time-of-day is drawn per plan and applied to the next eligible day:
//!
//! ```text
//! sent today                         -> tomorrow @ draw
//! now.hour >= end_hour               -> tomorrow @ draw
//! today @ draw <= now                -> tomorrow @ draw
//! otherwise                          -> today    @ draw
//! ```

use crate::error::{HeraldError, Result};
use crate::random::Chooser;
use chrono::{NaiveDate, NaiveDateTime, NaiveTime, Timelike};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;

// ---------------------------------------------------------------------------
// DispatchWindow
// ---------------------------------------------------------------------------

/// Daily window `[start_hour:00, end_hour:00)` in local time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DispatchWindow {
    #[serde(default = "default_start_hour")]
    pub start_hour: u32,
    #[serde(default = "default_end_hour")]
    pub end_hour: u32,
}

fn default_start_hour() -> u32 {
    11
}

fn default_end_hour() -> u32 {
    15
}

impl Default for DispatchWindow {
    fn default() -> Self {
        Self {
            start_hour: default_start_hour(),
            end_hour: default_end_hour(),
        }
    }
}

impl DispatchWindow {
    pub fn new(start_hour: u32, end_hour: u32) -> Result<Self> {
        let w = Self {
            start_hour,
            end_hour,
        };
        w.validate()?;
        Ok(w)
    }

    pub fn validate(&self) -> Result<()> {
        if self.start_hour >= self.end_hour || self.end_hour > 24 {
            return Err(HeraldError::InvalidConfig(format!(
                "window must satisfy start_hour < end_hour <= 24, got {}..{}",
                self.start_hour, self.end_hour
            )));
        }
        Ok(())
    }

    /// Uniform hour in `[start_hour, end_hour)` and uniform minute.
    pub fn draw(&self, chooser: &mut dyn Chooser) -> NaiveTime {
        let span = self.end_hour.saturating_sub(self.start_hour).max(1) as usize;
        let hour = self.start_hour + chooser.choose(span) as u32;
        let minute = chooser.choose(60) as u32;
        NaiveTime::from_hms_opt(hour, minute, 0).unwrap_or(NaiveTime::MIN)
    }

    /// The window is over for the day once the clock reaches `end_hour`.
    pub fn has_passed(&self, now: NaiveTime) -> bool {
        now.hour() >= self.end_hour
    }

    pub fn contains(&self, t: NaiveTime) -> bool {
        t.hour() >= self.start_hour && t.hour() < self.end_hour
    }
}

impl fmt::Display for DispatchWindow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{:02}:00, {:02}:00)", self.start_hour, self.end_hour)
    }
}

// ---------------------------------------------------------------------------
// FirePlan
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PlanReason {
    /// Today's dispatch is pending and the drawn time is still ahead.
    Today,
    /// Today's dispatch is already recorded.
    AlreadySent,
    /// The window is over, or the drawn time already passed.
    WindowPassed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FirePlan {
    pub target: NaiveDateTime,
    pub reason: PlanReason,
}

impl FirePlan {
    /// Time left until `target`; zero if it is already due.
    pub fn wait_from(&self, now: NaiveDateTime) -> Duration {
        (self.target - now).to_std().unwrap_or(Duration::ZERO)
    }
}

/// Compute the next fire time.
pub fn plan_next(
    now: NaiveDateTime,
    completed_today: bool,
    window: &DispatchWindow,
    chooser: &mut dyn Chooser,
) -> FirePlan {
    let today = now.date();
    let at = window.draw(chooser);

    let reason = if completed_today {
        PlanReason::AlreadySent
    } else if window.has_passed(now.time()) || today.and_time(at) <= now {
        PlanReason::WindowPassed
    } else {
        PlanReason::Today
    };

    let day = match reason {
        PlanReason::Today => today,
        PlanReason::AlreadySent | PlanReason::WindowPassed => next_day(today),
    };
    FirePlan {
        target: day.and_time(at),
        reason,
    }
}

fn next_day(d: NaiveDate) -> NaiveDate {
    d.succ_opt().unwrap_or(NaiveDate::MAX)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::random::{FirstAvailable, LastAvailable, RandomChooser};

    fn at(day: u32, h: u32, m: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2026, 10, day)
            .unwrap()
            .and_hms_opt(h, m, 0)
            .unwrap()
    }

    fn window() -> DispatchWindow {
        DispatchWindow::default()
    }

    #[test]
    fn morning_plans_today_within_window() {
        for seed in 0..200 {
            let mut c = RandomChooser::seeded(seed);
            let plan = plan_next(at(16, 9, 0), false, &window(), &mut c);
            assert_eq!(plan.reason, PlanReason::Today);
            assert_eq!(plan.target.date(), at(16, 0, 0).date());
            assert!(window().contains(plan.target.time()), "{}", plan.target);
            assert!(plan.target > at(16, 9, 0));
        }
    }

    #[test]
    fn evening_plans_tomorrow() {
        for seed in 0..200 {
            let mut c = RandomChooser::seeded(seed);
            let plan = plan_next(at(16, 16, 0), false, &window(), &mut c);
            assert_eq!(plan.reason, PlanReason::WindowPassed);
            assert_eq!(plan.target.date(), at(17, 0, 0).date());
            assert!(window().contains(plan.target.time()));
        }
    }

    #[test]
    fn already_sent_plans_tomorrow_even_in_the_morning() {
        let plan = plan_next(at(16, 9, 0), true, &window(), &mut LastAvailable);
        assert_eq!(plan.reason, PlanReason::AlreadySent);
        assert_eq!(plan.target, at(17, 14, 59));
    }

    #[test]
    fn drawn_time_behind_now_rolls_to_tomorrow() {
        // FirstAvailable draws 11:00; at 12:30 that is already gone.
        let plan = plan_next(at(16, 12, 30), false, &window(), &mut FirstAvailable);
        assert_eq!(plan.reason, PlanReason::WindowPassed);
        assert_eq!(plan.target, at(17, 11, 0));
    }

    #[test]
    fn drawn_time_ahead_inside_window_stays_today() {
        // LastAvailable draws 14:59.
        let plan = plan_next(at(16, 12, 30), false, &window(), &mut LastAvailable);
        assert_eq!(plan.reason, PlanReason::Today);
        assert_eq!(plan.target, at(16, 14, 59));
    }

    #[test]
    fn draw_equal_to_now_is_not_future() {
        let plan = plan_next(at(16, 11, 0), false, &window(), &mut FirstAvailable);
        assert_eq!(plan.target, at(17, 11, 0));
    }

    #[test]
    fn month_boundary_rolls_over() {
        let now = NaiveDate::from_ymd_opt(2026, 10, 31)
            .unwrap()
            .and_hms_opt(18, 0, 0)
            .unwrap();
        let plan = plan_next(now, false, &window(), &mut FirstAvailable);
        assert_eq!(
            plan.target,
            NaiveDate::from_ymd_opt(2026, 11, 1)
                .unwrap()
                .and_hms_opt(11, 0, 0)
                .unwrap()
        );
    }

    #[test]
    fn wait_is_target_minus_now() {
        let plan = plan_next(at(16, 9, 0), false, &window(), &mut FirstAvailable);
        assert_eq!(plan.wait_from(at(16, 9, 0)), Duration::from_secs(2 * 3600));
        assert_eq!(plan.wait_from(at(16, 12, 0)), Duration::ZERO);
    }

    #[test]
    fn custom_window_draws_inside_it() {
        let w = DispatchWindow::new(20, 21).unwrap();
        let mut c = RandomChooser::seeded(5);
        for _ in 0..100 {
            let t = w.draw(&mut c);
            assert_eq!(t.hour(), 20);
        }
    }

    #[test]
    fn window_validation() {
        assert!(DispatchWindow::new(11, 15).is_ok());
        assert!(DispatchWindow::new(15, 15).is_err());
        assert!(DispatchWindow::new(9, 25).is_err());
        assert_eq!(window().to_string(), "[11:00, 15:00)");
    }
}
