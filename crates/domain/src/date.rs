use serde::{Deserialize, Serialize};
use std::convert::TryFrom;
use std::fmt::Display;
use std::str::FromStr;
use thiserror::Error;

/// A wall-clock time of day like "17:30", anchored to a concrete
/// date and timezone by the deadline calculator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct TimeOfDay {
    hours: u32,
    minutes: u32,
}

impl TimeOfDay {
    pub fn new(hours: u32, minutes: u32) -> Option<Self> {
        if hours > 23 || minutes > 59 {
            return None;
        }
        Some(Self { hours, minutes })
    }

    pub fn hours(&self) -> u32 {
        self.hours
    }

    pub fn minutes(&self) -> u32 {
        self.minutes
    }
}

#[derive(Error, Debug)]
pub enum InvalidTimeOfDayError {
    #[error("Time of day: {0} is malformed")]
    Malformed(String),
}

impl FromStr for TimeOfDay {
    type Err = InvalidTimeOfDayError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let malformed = || InvalidTimeOfDayError::Malformed(s.to_string());
        let parts = s.trim().split(':').collect::<Vec<_>>();
        if parts.len() != 2 {
            return Err(malformed());
        }
        let hours = parts[0].parse::<u32>().map_err(|_| malformed())?;
        let minutes = parts[1].parse::<u32>().map_err(|_| malformed())?;
        Self::new(hours, minutes).ok_or_else(malformed)
    }
}

impl Display for TimeOfDay {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:02}:{:02}", self.hours, self.minutes)
    }
}

impl TryFrom<String> for TimeOfDay {
    type Error = InvalidTimeOfDayError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<TimeOfDay> for String {
    fn from(t: TimeOfDay) -> Self {
        t.to_string()
    }
}

pub fn is_leap_year(year: i32) -> bool {
    year % 400 == 0 || (year % 100 != 0 && year % 4 == 0)
}

// month: January -> 1
pub fn get_month_length(year: i32, month: u32) -> u32 {
    match month {
        1 => 31,
        2 => {
            if is_leap_year(year) {
                29
            } else {
                28
            }
        }
        3 => 31,
        4 => 30,
        5 => 31,
        6 => 30,
        7 => 31,
        8 => 31,
        9 => 30,
        10 => 31,
        11 => 30,
        12 => 31,
        _ => panic!("Invalid month"),
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn it_accepts_valid_times_of_day() {
        let valid_times = vec!["0:0", "00:00", "9:30", "09:05", "23:59", " 12:00 "];

        for time in &valid_times {
            assert!(time.parse::<TimeOfDay>().is_ok());
        }
    }

    #[test]
    fn it_rejects_invalid_times_of_day() {
        let invalid_times = vec!["", "12", "24:00", "12:60", "12:00:00", "a:b", "-1:30"];

        for time in &invalid_times {
            assert!(time.parse::<TimeOfDay>().is_err());
        }
    }

    #[test]
    fn it_formats_zero_padded() {
        let t = "9:5".parse::<TimeOfDay>().unwrap();
        assert_eq!(t.to_string(), "09:05");
    }

    #[test]
    fn it_knows_month_lengths() {
        assert_eq!(get_month_length(2021, 2), 28);
        assert_eq!(get_month_length(2020, 2), 29);
        assert_eq!(get_month_length(2100, 2), 28);
        assert_eq!(get_month_length(2021, 12), 31);
    }
}
