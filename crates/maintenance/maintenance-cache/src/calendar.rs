//! Turns a recurrence rule (`MaintenancePeriod`) plus the owning
//! maintenance's `active_since` into concrete `[since, until)` intervals in
//! local time, and answers whether a given instant falls inside one.
//!
//! All four `PeriodType`s are resolved against `active_since` as their
//! common anchor: daily/weekly cadences count elapsed days/weeks from it,
//! monthly cadences count elapsed calendar months from it. Weekday bitmasks
//! use Monday = bit 0 .. Sunday = bit 6, remapped from chrono's
//! Monday-is-zero `Weekday::num_days_from_monday()` — the same convention
//! the recurrence rule's `dayofweek` field uses.

use chrono::{Datelike, Local, NaiveDate, TimeZone};
use maintenance_types::{MaintenancePeriod, PeriodType};

pub const SEC_PER_DAY: i64 = 86_400;
pub const SEC_PER_WEEK: i64 = 7 * SEC_PER_DAY;

/// Returns the `[since, until)` interval of this period's occurrence that
/// contains `now`, if any. `active_since` anchors the recurrence cadence.
pub fn current_interval(active_since: i64, period: &MaintenancePeriod, now: i64) -> Option<(i64, i64)> {
    match period.period_type {
        PeriodType::OneTime => one_time_interval(period, now),
        PeriodType::Daily => daily_interval(active_since, period, now),
        PeriodType::Weekly => weekly_interval(active_since, period, now),
        PeriodType::Monthly => monthly_interval(active_since, period, now),
    }
}

fn contains(since: i64, until: i64, now: i64) -> Option<(i64, i64)> {
    if since <= now && now < until {
        Some((since, until))
    } else {
        None
    }
}

fn one_time_interval(period: &MaintenancePeriod, now: i64) -> Option<(i64, i64)> {
    let since = period.start_date;
    let until = since + period.period as i64;
    contains(since, until, now)
}

fn daily_interval(active_since: i64, period: &MaintenancePeriod, now: i64) -> Option<(i64, i64)> {
    if now < active_since || period.every == 0 {
        return None;
    }
    let every_secs = period.every as i64 * SEC_PER_DAY;
    let elapsed = now - active_since;
    let cycle_start = elapsed - elapsed.rem_euclid(every_secs);
    // The candidate cycle containing `now`, plus the adjacent ones in case
    // `start_time` pushes the window across a cycle boundary.
    for offset in [cycle_start - every_secs, cycle_start, cycle_start + every_secs] {
        if offset < 0 {
            continue;
        }
        let since = active_since + offset + period.start_time as i64;
        let until = since + period.period as i64;
        if let Some(hit) = contains(since, until, now) {
            return Some(hit);
        }
    }
    None
}

fn weekly_interval(active_since: i64, period: &MaintenancePeriod, now: i64) -> Option<(i64, i64)> {
    if now < active_since || period.every == 0 || period.dayofweek == 0 {
        return None;
    }
    let every_secs = period.every as i64 * SEC_PER_WEEK;
    let elapsed = now - active_since;
    let cycle_start = elapsed - elapsed.rem_euclid(every_secs);

    // Monday-aligned start of the active_since week.
    let active_since_weekday = weekday_mon0(active_since);
    let week_anchor = active_since - active_since_weekday as i64 * SEC_PER_DAY;

    for offset in [cycle_start - every_secs, cycle_start, cycle_start + every_secs] {
        if offset < 0 {
            continue;
        }
        let week_start = week_anchor + offset;
        for day in 0..7u8 {
            if period.dayofweek & (1 << day) == 0 {
                continue;
            }
            let since = week_start + day as i64 * SEC_PER_DAY + period.start_time as i64;
            let until = since + period.period as i64;
            if let Some(hit) = contains(since, until, now) {
                return Some(hit);
            }
        }
    }
    None
}

fn monthly_interval(active_since: i64, period: &MaintenancePeriod, now: i64) -> Option<(i64, i64)> {
    if now < active_since || period.every == 0 {
        return None;
    }
    let anchor_date = epoch_to_local_date(active_since);
    let now_date = epoch_to_local_date(now);

    // Search a small window of months around `now` for a matching
    // occurrence; three months of slack comfortably covers `period`
    // durations that stretch into the next month and `every` values up to
    // a handful of months.
    let months_elapsed = (now_date.year() * 12 + now_date.month() as i32 - 1)
        - (anchor_date.year() * 12 + anchor_date.month() as i32 - 1);
    for delta in -1..=1 {
        let candidate_months = months_elapsed + delta;
        if candidate_months < 0 {
            continue;
        }
        let year = anchor_date.year() + (anchor_date.month0() as i32 + candidate_months) / 12;
        let month0 = (anchor_date.month0() as i32 + candidate_months).rem_euclid(12) as u32;
        let month = month0 + 1;

        if period.month != 0 && period.month & (1 << month0) == 0 {
            continue;
        }

        let day_of_month = if period.dayofweek == 0 {
            if period.day == 0 {
                continue;
            }
            Some(period.day as u32)
        } else {
            nth_weekday_of_month(year, month, period.dayofweek, period.every)
        };

        let Some(day) = day_of_month else { continue };
        let Some(date) = NaiveDate::from_ymd_opt(year, month, day) else { continue };
        let day_start = local_date_to_epoch(date);
        let since = day_start + period.start_time as i64;
        let until = since + period.period as i64;
        if let Some(hit) = contains(since, until, now) {
            return Some(hit);
        }
    }
    None
}

/// Finds the day-of-month for the `occurrence`-th (1-based, `5` meaning
/// "last") weekday flagged in `dayofweek_mask` within `year`/`month`.
fn nth_weekday_of_month(year: i32, month: u32, dayofweek_mask: u8, occurrence: u32) -> Option<u32> {
    let days_in_month = days_in_month(year, month);
    let mut matches = Vec::new();
    for day in 1..=days_in_month {
        let date = NaiveDate::from_ymd_opt(year, month, day)?;
        let wd = date.weekday().num_days_from_monday();
        if dayofweek_mask & (1 << wd) != 0 {
            matches.push(day);
        }
    }
    if occurrence == 5 {
        matches.last().copied()
    } else {
        matches.get(occurrence as usize - 1).copied()
    }
}

fn days_in_month(year: i32, month: u32) -> u32 {
    let (next_year, next_month) = if month == 12 { (year + 1, 1) } else { (year, month + 1) };
    let first_of_next = NaiveDate::from_ymd_opt(next_year, next_month, 1).unwrap();
    let first_of_this = NaiveDate::from_ymd_opt(year, month, 1).unwrap();
    (first_of_next - first_of_this).num_days() as u32
}

fn weekday_mon0(epoch: i64) -> u32 {
    epoch_to_local_date(epoch).weekday().num_days_from_monday()
}

fn epoch_to_local_date(epoch: i64) -> NaiveDate {
    Local.timestamp_opt(epoch, 0).single().expect("valid timestamp").date_naive()
}

fn local_date_to_epoch(date: NaiveDate) -> i64 {
    Local
        .from_local_datetime(&date.and_hms_opt(0, 0, 0).unwrap())
        .single()
        .expect("valid local midnight")
        .timestamp()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn period(period_type: PeriodType) -> MaintenancePeriod {
        MaintenancePeriod {
            time_period_id: 1,
            maintenance_id: 1,
            period_type,
            every: 1,
            month: 0,
            dayofweek: 0,
            day: 0,
            start_time: 0,
            period: 3600,
            start_date: 0,
        }
    }

    #[test]
    fn one_time_is_active_only_within_its_window() {
        let mut p = period(PeriodType::OneTime);
        p.start_date = 1000;
        p.period = 500;
        assert_eq!(current_interval(0, &p, 1000), Some((1000, 1500)));
        assert_eq!(current_interval(0, &p, 1499), Some((1000, 1500)));
        assert_eq!(current_interval(0, &p, 1500), None);
        assert_eq!(current_interval(0, &p, 999), None);
    }

    #[test]
    fn daily_recurs_every_n_days() {
        let mut p = period(PeriodType::Daily);
        p.every = 2;
        p.start_time = 3600; // 01:00 into the day
        p.period = 1800;
        let active_since = 0;
        // day 0: active
        assert!(current_interval(active_since, &p, 3600 + 100).is_some());
        // day 1: not a multiple of 2, inactive
        assert!(current_interval(active_since, &p, SEC_PER_DAY + 3600 + 100).is_none());
        // day 2: active again
        assert!(current_interval(active_since, &p, 2 * SEC_PER_DAY + 3600 + 100).is_some());
    }

    #[test]
    fn weekly_matches_flagged_weekday() {
        let mut p = period(PeriodType::Weekly);
        p.every = 1;
        p.dayofweek = 0b0000100; // Wednesday (bit 2, Monday = bit 0)
        p.start_time = 0;
        p.period = 3600;
        // active_since is itself a Monday in epoch-local terms; we only
        // assert internal consistency (some day in the week matches, days
        // outside the flagged weekday do not).
        let active_since = 0;
        let mut found_hit = false;
        for day in 0..7 {
            let t = active_since + day * SEC_PER_DAY + 100;
            if current_interval(active_since, &p, t).is_some() {
                found_hit = true;
            }
        }
        assert!(found_hit);
    }

    #[test]
    fn monthly_by_day_of_month() {
        let mut p = period(PeriodType::Monthly);
        p.every = 1;
        p.day = 15;
        p.dayofweek = 0;
        p.start_time = 0;
        p.period = 3600;
        let active_since = local_date_to_epoch(NaiveDate::from_ymd_opt(2026, 1, 1).unwrap());
        let target = local_date_to_epoch(NaiveDate::from_ymd_opt(2026, 3, 15).unwrap());
        assert!(current_interval(active_since, &p, target + 10).is_some());
        assert!(current_interval(active_since, &p, target - SEC_PER_DAY).is_none());
    }

    #[test]
    fn monthly_last_weekday_occurrence() {
        let mut p = period(PeriodType::Monthly);
        p.every = 1;
        p.dayofweek = 0b0100000; // Saturday (bit 5)
        p.day = 0;
        p.start_time = 0;
        p.period = 3600;
        let day = nth_weekday_of_month(2026, 2, 0b0100000, 5).unwrap();
        // February 2026's last Saturday is the 28th.
        assert_eq!(day, 28);
        let _ = p;
    }
}
