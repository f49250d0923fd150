//! Deterministic spoken and display responses for date, time, day, and
//! calendar questions.
//!
//! All formatters are pure functions of a passed instant, so the
//! dispatcher decides what "now" means and tests can pin any date. The
//! spoken strings favour natural phrasing ("It's 3 oh 5 pm") over
//! numeric formats, which read badly through speech synthesis.

use crate::intent::Intent;
use crate::pipeline::messages::ResponsePair;
use chrono::{Datelike, NaiveDateTime, Timelike};

/// Produce the response for a deterministic intent at the given instant.
#[must_use]
pub fn respond(intent: Intent, now: NaiveDateTime) -> ResponsePair {
    match intent {
        Intent::Date => current_date(now),
        Intent::Time => current_time(now),
        Intent::Day => current_day(now),
        Intent::Calendar => month_calendar(now),
    }
}

/// Today's full date: weekday, month, ordinal day, year.
#[must_use]
pub fn current_date(now: NaiveDateTime) -> ResponsePair {
    let weekday = now.format("%A");
    let month = now.format("%B");
    let spoken = format!(
        "Today is {weekday}, {month} {}, {}",
        ordinal(now.day()),
        now.year()
    );
    let display = format!("{weekday}, {month} {}, {}", now.day(), now.year());
    ResponsePair { spoken, display }
}

/// The current time on a 12-hour clock.
#[must_use]
pub fn current_time(now: NaiveDateTime) -> ResponsePair {
    let hour24 = now.hour();
    let hour = match hour24 % 12 {
        0 => 12,
        h => h,
    };
    let meridian = if hour24 >= 12 { "pm" } else { "am" };
    let spoken = format!("It's {hour} {} {meridian}", minute_phrase(now.minute()));
    let display = now.format("%I:%M %p").to_string();
    ResponsePair { spoken, display }
}

/// The current day of the week.
#[must_use]
pub fn current_day(now: NaiveDateTime) -> ResponsePair {
    let weekday = now.format("%A");
    ResponsePair {
        spoken: format!("Today is {weekday}"),
        display: weekday.to_string(),
    }
}

/// Facts about the current month: length, starting weekday, today's
/// position within it.
#[must_use]
pub fn month_calendar(now: NaiveDateTime) -> ResponsePair {
    let month = now.format("%B");
    let num_days = days_in_month(now.year(), now.month());
    let first = now.date().with_day(1).unwrap_or_else(|| now.date());
    let started = first.format("%A");
    let day = now.day();

    let spoken = format!(
        "We are in the month of {month}. This month has {num_days} days in total. \
         The first day of {month} was a {started}. \
         Today is day number {day} of the month."
    );
    let display = format!(
        "{month} {}\nDays in month: {num_days}\nStarted on: {started}\nCurrent day: {day} of {num_days}",
        now.year()
    );
    ResponsePair { spoken, display }
}

/// Format a day number with its ordinal suffix ("1st", "11th", "21st").
#[must_use]
pub fn ordinal(day: u32) -> String {
    format!("{day}{}", ordinal_suffix(day))
}

fn ordinal_suffix(day: u32) -> &'static str {
    if (10..=20).contains(&(day % 100)) {
        "th"
    } else {
        match day % 10 {
            1 => "st",
            2 => "nd",
            3 => "rd",
            _ => "th",
        }
    }
}

/// Spoken form of the minute component.
///
/// 0 is "o'clock", 1 through 9 get an "oh" prefix, everything else is
/// read as a plain number.
#[must_use]
pub fn minute_phrase(minute: u32) -> String {
    match minute {
        0 => "o'clock".to_owned(),
        1..=9 => format!("oh {minute}"),
        _ => minute.to_string(),
    }
}

/// Number of days in the given month.
#[must_use]
pub fn days_in_month(year: i32, month: u32) -> u32 {
    match month {
        1 | 3 | 5 | 7 | 8 | 10 | 12 => 31,
        4 | 6 | 9 | 11 => 30,
        _ => {
            if is_leap_year(year) {
                29
            } else {
                28
            }
        }
    }
}

fn is_leap_year(year: i32) -> bool {
    (year % 4 == 0 && year % 100 != 0) || year % 400 == 0
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]

    use super::*;
    use chrono::NaiveDate;

    fn at(y: i32, mo: u32, d: u32, h: u32, mi: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(y, mo, d)
            .unwrap()
            .and_hms_opt(h, mi, 0)
            .unwrap()
    }

    #[test]
    fn ordinal_suffixes() {
        assert_eq!(ordinal(1), "1st");
        assert_eq!(ordinal(2), "2nd");
        assert_eq!(ordinal(3), "3rd");
        assert_eq!(ordinal(4), "4th");
        assert_eq!(ordinal(11), "11th");
        assert_eq!(ordinal(12), "12th");
        assert_eq!(ordinal(13), "13th");
        assert_eq!(ordinal(21), "21st");
        assert_eq!(ordinal(22), "22nd");
        assert_eq!(ordinal(23), "23rd");
        assert_eq!(ordinal(112), "112th");
    }

    #[test]
    fn minute_phrases() {
        assert_eq!(minute_phrase(0), "o'clock");
        assert_eq!(minute_phrase(5), "oh 5");
        assert_eq!(minute_phrase(9), "oh 9");
        assert_eq!(minute_phrase(10), "10");
        assert_eq!(minute_phrase(45), "45");
    }

    #[test]
    fn time_on_the_hour() {
        let pair = current_time(at(2026, 8, 5, 15, 0));
        assert_eq!(pair.spoken, "It's 3 o'clock pm");
        assert_eq!(pair.display, "03:00 PM");
    }

    #[test]
    fn time_single_digit_minute() {
        let pair = current_time(at(2026, 8, 5, 9, 5));
        assert_eq!(pair.spoken, "It's 9 oh 5 am");
    }

    #[test]
    fn time_midnight_and_noon() {
        assert_eq!(current_time(at(2026, 8, 5, 0, 30)).spoken, "It's 12 30 am");
        assert_eq!(current_time(at(2026, 8, 5, 12, 30)).spoken, "It's 12 30 pm");
    }

    #[test]
    fn date_spoken_has_weekday_and_ordinal() {
        // 2026-08-05 is a Wednesday.
        let pair = current_date(at(2026, 8, 5, 10, 0));
        assert_eq!(pair.spoken, "Today is Wednesday, August 5th, 2026");
        assert_eq!(pair.display, "Wednesday, August 5, 2026");
    }

    #[test]
    fn day_names_the_weekday_only() {
        let pair = current_day(at(2026, 8, 7, 10, 0));
        assert_eq!(pair.spoken, "Today is Friday");
        assert_eq!(pair.display, "Friday");
    }

    #[test]
    fn calendar_summarizes_the_month() {
        // August 2026 has 31 days and started on a Saturday.
        let pair = month_calendar(at(2026, 8, 5, 10, 0));
        assert!(pair.spoken.contains("month of August"));
        assert!(pair.spoken.contains("31 days"));
        assert!(pair.spoken.contains("was a Saturday"));
        assert!(pair.spoken.contains("day number 5"));
        assert!(pair.display.contains("5 of 31"));
    }

    #[test]
    fn month_lengths() {
        assert_eq!(days_in_month(2026, 1), 31);
        assert_eq!(days_in_month(2026, 4), 30);
        assert_eq!(days_in_month(2026, 2), 28);
        assert_eq!(days_in_month(2024, 2), 29);
        assert_eq!(days_in_month(2000, 2), 29);
        assert_eq!(days_in_month(1900, 2), 28);
    }

    #[test]
    fn respond_covers_every_intent() {
        let now = at(2026, 8, 5, 15, 0);
        assert!(respond(Intent::Date, now).spoken.contains("August"));
        assert!(respond(Intent::Time, now).spoken.contains("pm"));
        assert!(respond(Intent::Day, now).spoken.contains("Wednesday"));
        assert!(respond(Intent::Calendar, now).spoken.contains("August"));
    }
}
