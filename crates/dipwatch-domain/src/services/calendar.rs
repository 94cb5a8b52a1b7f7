//! US equities calendar.
//!
//! The federal holiday calendar gates whether a run does anything at all. The NYSE
//! session schedule decides which date is the last trading day of a month.

use chrono::{DateTime, Datelike, Days, NaiveDate, Timelike, Utc, Weekday};

pub const DEFAULT_MORNING_CUTOFF_HOUR_UTC: u32 = 14;
pub const DEFAULT_FORCE_WINDOW_END_HOUR_UTC: u32 = 6;

/// Days the exchange closed outside its regular holiday rules.
const UNSCHEDULED_CLOSURES: &[(i32, u32, u32)] = &[
    (2001, 9, 11),
    (2001, 9, 12),
    (2001, 9, 13),
    (2001, 9, 14),
    (2004, 6, 11),
    (2007, 1, 2),
    (2012, 10, 29),
    (2012, 10, 30),
    (2018, 12, 5),
    (2025, 1, 9),
];

/// UTC hour windows for the month-end summary.
///
/// The summary goes out when today is the month's final session and the hour is
/// before `morning_cutoff_hour_utc`, or unconditionally before
/// `force_window_end_hour_utc`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MonthEndWindow {
    pub morning_cutoff_hour_utc: u32,
    pub force_window_end_hour_utc: u32,
}

impl Default for MonthEndWindow {
    fn default() -> Self {
        Self {
            morning_cutoff_hour_utc: DEFAULT_MORNING_CUTOFF_HOUR_UTC,
            force_window_end_hour_utc: DEFAULT_FORCE_WINDOW_END_HOUR_UTC,
        }
    }
}

pub fn is_weekday(date: NaiveDate) -> bool {
    !matches!(date.weekday(), Weekday::Sat | Weekday::Sun)
}

/// Business day under the US federal holiday calendar.
pub fn is_trading_day(today: NaiveDate) -> bool {
    is_weekday(today) && !is_federal_holiday(today)
}

pub fn is_federal_holiday(date: NaiveDate) -> bool {
    // New Year's Day of the following year can be observed on Dec 31.
    federal_holidays(date.year()).contains(&date)
        || federal_holidays(date.year() + 1).contains(&date)
}

/// Observed federal holidays whose rules belong to `year`.
pub fn federal_holidays(year: i32) -> Vec<NaiveDate> {
    let fixed = |month: u32, day: u32| {
        NaiveDate::from_ymd_opt(year, month, day).and_then(observed_nearest_weekday)
    };
    let nth = |month: u32, weekday: Weekday, n: u8| {
        NaiveDate::from_weekday_of_month_opt(year, month, weekday, n)
    };

    let mut holidays = vec![
        fixed(1, 1),
        nth(2, Weekday::Mon, 3),
        last_weekday_of_month(year, 5, Weekday::Mon),
        fixed(7, 4),
        nth(9, Weekday::Mon, 1),
        nth(10, Weekday::Mon, 2),
        fixed(11, 11),
        nth(11, Weekday::Thu, 4),
        fixed(12, 25),
    ];
    if year >= 1986 {
        holidays.push(nth(1, Weekday::Mon, 3));
    }
    if year >= 2021 {
        holidays.push(fixed(6, 19));
    }

    let mut holidays: Vec<NaiveDate> = holidays.into_iter().flatten().collect();
    holidays.sort();
    holidays
}

/// Full-day NYSE closures for `year`.
pub fn nyse_holidays(year: i32) -> Vec<NaiveDate> {
    let fixed = |month: u32, day: u32| {
        NaiveDate::from_ymd_opt(year, month, day).and_then(observed_nearest_weekday)
    };
    let nth = |month: u32, weekday: Weekday, n: u8| {
        NaiveDate::from_weekday_of_month_opt(year, month, weekday, n)
    };

    let mut holidays = vec![
        nyse_new_years_day(year),
        nth(2, Weekday::Mon, 3),
        good_friday(year),
        last_weekday_of_month(year, 5, Weekday::Mon),
        fixed(7, 4),
        nth(9, Weekday::Mon, 1),
        nth(11, Weekday::Thu, 4),
        fixed(12, 25),
    ];
    if year >= 1998 {
        holidays.push(nth(1, Weekday::Mon, 3));
    }
    if year >= 2022 {
        holidays.push(fixed(6, 19));
    }
    holidays.extend(
        UNSCHEDULED_CLOSURES
            .iter()
            .filter(|(y, _, _)| *y == year)
            .map(|(y, m, d)| NaiveDate::from_ymd_opt(*y, *m, *d)),
    );

    let mut holidays: Vec<NaiveDate> = holidays.into_iter().flatten().collect();
    holidays.sort();
    holidays.dedup();
    holidays
}

/// True when NYSE holds a regular session on `date`.
pub fn is_session(date: NaiveDate) -> bool {
    is_weekday(date) && !nyse_holidays(date.year()).contains(&date)
}

/// NYSE session dates of one calendar month, ascending.
pub fn sessions_in_month(year: i32, month: u32) -> Vec<NaiveDate> {
    let Some(first) = NaiveDate::from_ymd_opt(year, month, 1) else {
        return Vec::new();
    };
    let holidays = nyse_holidays(year);
    first
        .iter_days()
        .take_while(|day| day.month() == month)
        .filter(|day| is_weekday(*day) && !holidays.contains(day))
        .collect()
}

pub fn last_session_of_month(year: i32, month: u32) -> Option<NaiveDate> {
    sessions_in_month(year, month).last().copied()
}

pub fn is_last_trading_day_of_month(today: NaiveDate, now_utc: DateTime<Utc>) -> bool {
    is_last_trading_day_of_month_in(today, now_utc, MonthEndWindow::default())
}

/// Both windows are independent: the force window fires on any day of the month.
pub fn is_last_trading_day_of_month_in(
    today: NaiveDate,
    now_utc: DateTime<Utc>,
    window: MonthEndWindow,
) -> bool {
    let hour = now_utc.hour();
    let last_day = last_session_of_month(today.year(), today.month());
    let on_last_session = last_day == Some(today) && hour < window.morning_cutoff_hour_utc;
    on_last_session || hour < window.force_window_end_hour_utc
}

pub fn last_day_of_month(year: i32, month: u32) -> Option<NaiveDate> {
    let (next_year, next_month) = if month == 12 {
        (year + 1, 1)
    } else {
        (year, month + 1)
    };
    NaiveDate::from_ymd_opt(next_year, next_month, 1)?.pred_opt()
}

fn last_weekday_of_month(year: i32, month: u32, weekday: Weekday) -> Option<NaiveDate> {
    let mut day = last_day_of_month(year, month)?;
    while day.weekday() != weekday {
        day = day.pred_opt()?;
    }
    Some(day)
}

/// Saturday moves to Friday, Sunday to Monday.
fn observed_nearest_weekday(date: NaiveDate) -> Option<NaiveDate> {
    match date.weekday() {
        Weekday::Sat => date.pred_opt(),
        Weekday::Sun => date.succ_opt(),
        _ => Some(date),
    }
}

// A Saturday New Year's Day is not made up on the preceding Friday.
fn nyse_new_years_day(year: i32) -> Option<NaiveDate> {
    let date = NaiveDate::from_ymd_opt(year, 1, 1)?;
    match date.weekday() {
        Weekday::Sat => None,
        Weekday::Sun => date.succ_opt(),
        _ => Some(date),
    }
}

fn good_friday(year: i32) -> Option<NaiveDate> {
    easter_sunday(year)?.checked_sub_days(Days::new(2))
}

/// Anonymous Gregorian computus.
pub fn easter_sunday(year: i32) -> Option<NaiveDate> {
    let a = year % 19;
    let b = year / 100;
    let c = year % 100;
    let d = b / 4;
    let e = b % 4;
    let f = (b + 8) / 25;
    let g = (b - f + 1) / 3;
    let h = (19 * a + b - d - g + 15) % 30;
    let i = c / 4;
    let k = c % 4;
    let l = (32 + 2 * e + 2 * i - h - k) % 7;
    let m = (a + 11 * h + 22 * l) / 451;
    let month = (h + l - 7 * m + 114) / 31;
    let day = (h + l - 7 * m + 114) % 31 + 1;
    NaiveDate::from_ymd_opt(year, month as u32, day as u32)
}
