//! Gregorian / Jalali (Persian) calendar conversion
//!
//! Data keys are Gregorian `YYYYMMDD` strings; display dates are Jalali
//! `YYYY/MM/DD`. Conversion is arithmetic over day numbers: chrono handles
//! the Gregorian side, and the Jalali side uses the 33-year leap cycle with
//! the historical break years of the Borkowski algorithm.
//!
//! Supported range is Jalali 1000/01/01 (Gregorian 1621-03-21) through
//! Jalali 1500/12/29 (Gregorian 2122-03-20).

use crate::constants::{EXCHANGE_TIMEZONE, MAX_JALALI_YEAR, MIN_JALALI_YEAR};
use crate::error::{AppError, Result};
use chrono::{Datelike, NaiveDate, Utc};
use chrono_tz::Tz;
use std::fmt;
use std::str::FromStr;

/// Jalali years at which the leap-cycle pattern shifts
const BREAKS: [i32; 20] = [
    -61, 9, 38, 199, 426, 686, 756, 818, 1111, 1181, 1210, 1635, 2060, 2097, 2192, 2262, 2324,
    2394, 2456, 3178,
];

/// Leap-cycle facts for one Jalali year
struct JalaliYearInfo {
    /// Years since the last leap year; 0 means this year is leap
    leap: i32,
    /// Gregorian year in which this Jalali year begins
    gregorian_year: i32,
    /// Day of March on which Farvardin 1 falls
    march_day: u32,
}

fn jalali_year_info(jy: i32) -> Result<JalaliYearInfo> {
    if jy < BREAKS[0] || jy >= BREAKS[BREAKS.len() - 1] {
        return Err(AppError::InvalidDate(format!("Jalali year {} is out of range", jy)));
    }

    let gy = jy + 621;
    let mut leap_j = -14;
    let mut jp = BREAKS[0];
    let mut jump = 0;

    for &jm in &BREAKS[1..] {
        jump = jm - jp;
        if jy < jm {
            break;
        }
        leap_j += jump / 33 * 8 + (jump % 33) / 4;
        jp = jm;
    }

    let mut n = jy - jp;
    leap_j += n / 33 * 8 + (n % 33 + 3) / 4;
    if jump % 33 == 4 && jump - n == 4 {
        leap_j += 1;
    }

    let leap_g = gy / 4 - (gy / 100 + 1) * 3 / 4 - 150;
    let march_day = 20 + leap_j - leap_g;

    if jump - n < 6 {
        n = n - jump + (jump + 4) / 33 * 33;
    }
    let mut leap = ((n + 1) % 33 - 1) % 4;
    if leap == -1 {
        leap = 4;
    }

    Ok(JalaliYearInfo {
        leap,
        gregorian_year: gy,
        march_day: march_day as u32,
    })
}

/// Day number of Farvardin 1 of the Jalali year described by `info`
fn nowruz_day_number(info: &JalaliYearInfo) -> Result<i32> {
    NaiveDate::from_ymd_opt(info.gregorian_year, 3, info.march_day)
        .map(|d| d.num_days_from_ce())
        .ok_or_else(|| {
            AppError::InvalidDate(format!(
                "No Gregorian date {}-03-{}",
                info.gregorian_year, info.march_day
            ))
        })
}

fn check_year_range(year: i32) -> Result<()> {
    if !(MIN_JALALI_YEAR..=MAX_JALALI_YEAR).contains(&year) {
        return Err(AppError::InvalidDate(format!(
            "Jalali year {} outside supported range {}-{}",
            year, MIN_JALALI_YEAR, MAX_JALALI_YEAR
        )));
    }
    Ok(())
}

/// A validated date in the Jalali calendar
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct JalaliDate {
    year: i32,
    month: u32,
    day: u32,
}

impl JalaliDate {
    /// Create a date, rejecting impossible days and years outside the supported range
    pub fn new(year: i32, month: u32, day: u32) -> Result<Self> {
        check_year_range(year)?;
        if !(1..=12).contains(&month) {
            return Err(AppError::InvalidDate(format!("Invalid Jalali month {}", month)));
        }
        let max_day = Self::days_in_month(year, month)?;
        if day == 0 || day > max_day {
            return Err(AppError::InvalidDate(format!(
                "Invalid day {} for Jalali {}/{:02} (max {})",
                day, year, month, max_day
            )));
        }
        Ok(Self { year, month, day })
    }

    pub fn year(&self) -> i32 {
        self.year
    }

    pub fn month(&self) -> u32 {
        self.month
    }

    pub fn day(&self) -> u32 {
        self.day
    }

    pub fn is_leap_year(year: i32) -> Result<bool> {
        Ok(jalali_year_info(year)?.leap == 0)
    }

    /// Months 1-6 have 31 days, 7-11 have 30, Esfand has 29 or 30
    pub fn days_in_month(year: i32, month: u32) -> Result<u32> {
        match month {
            1..=6 => Ok(31),
            7..=11 => Ok(30),
            12 => Ok(if Self::is_leap_year(year)? { 30 } else { 29 }),
            _ => Err(AppError::InvalidDate(format!("Invalid Jalali month {}", month))),
        }
    }

    pub fn from_gregorian(date: NaiveDate) -> Result<Self> {
        let day_number = date.num_days_from_ce();
        let mut jy = date.year() - 621;
        let info = jalali_year_info(jy)?;
        let mut k = day_number - nowruz_day_number(&info)?;

        let (month, day) = if (0..=185).contains(&k) {
            (1 + k / 31, k % 31 + 1)
        } else {
            if k >= 0 {
                k -= 186;
            } else {
                jy -= 1;
                k += 179;
                if info.leap == 1 {
                    k += 1;
                }
            }
            (7 + k / 30, k % 30 + 1)
        };

        check_year_range(jy)?;
        Ok(Self {
            year: jy,
            month: month as u32,
            day: day as u32,
        })
    }

    pub fn to_gregorian(&self) -> Result<NaiveDate> {
        let info = jalali_year_info(self.year)?;
        let m = self.month as i32;
        let offset = (m - 1) * 31 - m / 7 * (m - 7) + self.day as i32 - 1;
        let day_number = nowruz_day_number(&info)? + offset;
        NaiveDate::from_num_days_from_ce_opt(day_number).ok_or_else(|| {
            AppError::InvalidDate(format!("Jalali {} has no Gregorian equivalent", self))
        })
    }
}

impl fmt::Display for JalaliDate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04}/{:02}/{:02}", self.year, self.month, self.day)
    }
}

impl FromStr for JalaliDate {
    type Err = AppError;

    /// Parse `YYYY/MM/DD` or `YYYY-MM-DD`
    fn from_str(s: &str) -> Result<Self> {
        let trimmed = s.trim();
        let parts: Vec<&str> = trimmed.split(|c: char| c == '/' || c == '-').collect();
        if parts.len() != 3 {
            return Err(AppError::InvalidDate(format!(
                "Expected Jalali date as YYYY/MM/DD, got '{}'",
                s
            )));
        }
        let parse = |part: &str, what: &str| {
            part.parse::<i64>()
                .map_err(|_| AppError::InvalidDate(format!("Invalid Jalali {} in '{}'", what, s)))
        };
        let year = parse(parts[0], "year")?;
        let month = parse(parts[1], "month")?;
        let day = parse(parts[2], "day")?;

        if year.abs() > 9999 || !(0..=99).contains(&month) || !(0..=99).contains(&day) {
            return Err(AppError::InvalidDate(format!("Jalali date '{}' is out of range", s)));
        }
        Self::new(year as i32, month as u32, day as u32)
    }
}

/// Parse an 8-digit `YYYYMMDD` key
pub fn parse_gregorian_key(key: &str) -> Result<NaiveDate> {
    let key = key.trim();
    if key.len() != 8 || !key.bytes().all(|b| b.is_ascii_digit()) {
        return Err(AppError::InvalidDate(format!(
            "Expected 8-digit YYYYMMDD date, got '{}'",
            key
        )));
    }
    NaiveDate::parse_from_str(key, "%Y%m%d")
        .map_err(|e| AppError::InvalidDate(format!("Invalid Gregorian date '{}': {}", key, e)))
}

pub fn format_gregorian_key(date: NaiveDate) -> String {
    date.format("%Y%m%d").to_string()
}

/// `YYYYMMDD` -> `YYYY/MM/DD` (Jalali)
pub fn gregorian_to_jalali(key: &str) -> Result<String> {
    let date = parse_gregorian_key(key)?;
    Ok(JalaliDate::from_gregorian(date)?.to_string())
}

/// `YYYY/MM/DD` (Jalali) -> `YYYYMMDD`
pub fn jalali_to_gregorian(jalali: &str) -> Result<String> {
    let date: JalaliDate = jalali.parse()?;
    Ok(format_gregorian_key(date.to_gregorian()?))
}

/// Epoch milliseconds of a `YYYYMMDD` key at midnight UTC
pub fn gregorian_timestamp_millis(key: &str) -> Result<i64> {
    let date = parse_gregorian_key(key)?;
    date.and_hms_opt(0, 0, 0)
        .map(|dt| dt.and_utc().timestamp_millis())
        .ok_or_else(|| AppError::InvalidDate(format!("Invalid midnight for '{}'", key)))
}

/// Today's date on the exchange, in the Jalali calendar
pub fn today_jalali() -> Result<JalaliDate> {
    let tz: Tz = EXCHANGE_TIMEZONE.parse().map_err(|e| {
        AppError::InvalidInput(format!("Failed to parse timezone '{}': {}", EXCHANGE_TIMEZONE, e))
    })?;
    let today = Utc::now().with_timezone(&tz).date_naive();
    JalaliDate::from_gregorian(today)
}
