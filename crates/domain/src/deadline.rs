use crate::date::{get_month_length, TimeOfDay};
use crate::task::{TaskFrequency, TaskSchedule};
use chrono::prelude::*;
use chrono_tz::Tz;

/// The concrete deadlines of a task for the cycle containing "now".
/// `timeout_at` gates escalation; `closes_at` is only used for the
/// remaining-time display in notifications.
#[derive(Debug, Clone, PartialEq)]
pub struct TaskDeadlines {
    pub timeout_at: i64,
    pub closes_at: Option<i64>,
}

/// Computes the deadlines of a schedule for the cycle containing `now`
/// (millis). Returns `None` when no timeout is configured, when `now` is
/// outside the schedule's activity window or when the anchored wall-clock
/// time does not exist (DST gap) - callers treat all of these as "skip",
/// not as errors.
pub fn deadlines(schedule: &TaskSchedule, now: i64) -> Option<TaskDeadlines> {
    let time_out = schedule.time_out.as_ref()?;
    if now < schedule.period_start || now > schedule.period_end {
        return None;
    }

    let tz = schedule.timezone;
    let today = tz.timestamp_millis(now).date();
    let start = tz.timestamp_millis(schedule.period_start).date();

    let (year, month, day) = anchor_ymd(&today, &start, schedule.frequency);
    let anchor = tz.ymd_opt(year, month, day).single()?;

    let timeout_at = at_time_of_day(&anchor, time_out)?;
    let closes_at = schedule
        .time_cloture
        .as_ref()
        .and_then(|t| at_time_of_day(&anchor, t));

    Some(TaskDeadlines {
        timeout_at,
        closes_at,
    })
}

fn at_time_of_day(date: &Date<Tz>, time: &TimeOfDay) -> Option<i64> {
    date.and_hms_opt(time.hours(), time.minutes(), 0)
        .map(|dt| dt.timestamp_millis())
}

/// The cycle anchor date: the most recent occurrence (not after today, in
/// the schedule's timezone) of the recurrence pattern seeded by the
/// period start.
fn anchor_ymd(
    today: &Date<Tz>,
    start: &Date<Tz>,
    frequency: Option<TaskFrequency>,
) -> (i32, u32, u32) {
    match frequency {
        None => (start.year(), start.month(), start.day()),
        Some(TaskFrequency::Daily) => (today.year(), today.month(), today.day()),
        Some(TaskFrequency::Weekly) => {
            let days_since = (today.weekday().num_days_from_monday() + 7
                - start.weekday().num_days_from_monday())
                % 7;
            let date = *today - chrono::Duration::days(days_since as i64);
            (date.year(), date.month(), date.day())
        }
        Some(TaskFrequency::Monthly) => {
            let day = start.day();
            let day_this_month = day.min(get_month_length(today.year(), today.month()));
            let (year, month) = if today.day() >= day_this_month {
                (today.year(), today.month())
            } else if today.month() == 1 {
                (today.year() - 1, 12)
            } else {
                (today.year(), today.month() - 1)
            };
            (year, month, day.min(get_month_length(year, month)))
        }
        Some(TaskFrequency::Yearly) => {
            let (month, day) = (start.month(), start.day());
            let day_this_year = day.min(get_month_length(today.year(), month));
            let passed_this_year = today.month() > month
                || (today.month() == month && today.day() >= day_this_year);
            let year = if passed_this_year {
                today.year()
            } else {
                today.year() - 1
            };
            (year, month, day.min(get_month_length(year, month)))
        }
    }
}
