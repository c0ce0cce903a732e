//! Game time: durations measured in turns and the world calendar.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::{Add, Sub};
use thiserror::Error;

/// Turns per in-game unit. One turn is one second.
pub const TURNS_PER_MINUTE: i64 = 60;
pub const TURNS_PER_HOUR: i64 = 60 * TURNS_PER_MINUTE;
pub const TURNS_PER_DAY: i64 = 24 * TURNS_PER_HOUR;

/// Days in each season.
pub const SEASON_LENGTH_DAYS: i64 = 90;

const SUNRISE_HOUR: i64 = 6;
const SUNSET_HOUR: i64 = 20;

/// Error when parsing a duration string such as "1 h 30 m".
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DurationParseError {
    #[error("Empty duration")]
    Empty,
    #[error("Invalid duration amount: '{0}'")]
    InvalidAmount(String),
    #[error("Unknown duration unit: '{0}'")]
    UnknownUnit(String),
    #[error("Duration out of range: '{0}'")]
    Overflow(String),
}

/// A span of game time counted in turns.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
pub struct TimeDuration(i64);

impl TimeDuration {
    pub const ZERO: TimeDuration = TimeDuration(0);

    pub fn from_turns(turns: i64) -> Self {
        Self(turns)
    }

    pub fn from_seconds(seconds: i64) -> Self {
        Self(seconds)
    }

    pub fn from_minutes(minutes: i64) -> Self {
        Self(minutes * TURNS_PER_MINUTE)
    }

    pub fn from_hours(hours: i64) -> Self {
        Self(hours * TURNS_PER_HOUR)
    }

    pub fn from_days(days: i64) -> Self {
        Self(days * TURNS_PER_DAY)
    }

    pub fn to_turns(self) -> i64 {
        self.0
    }

    pub fn to_days(self) -> i64 {
        self.0 / TURNS_PER_DAY
    }

    /// Parse durations such as `"90"`, `"30 s"`, `"2 h 15 m"` or `"1 d"`.
    ///
    /// A bare number is a turn count. Amounts may be negative.
    pub fn parse(input: &str) -> Result<Self, DurationParseError> {
        let tokens: Vec<&str> = input.split_whitespace().collect();
        if tokens.is_empty() {
            return Err(DurationParseError::Empty);
        }

        let mut total = 0i64;
        let mut iter = tokens.into_iter().peekable();
        while let Some(token) = iter.next() {
            // Accept both "30 m" and "30m"
            let split = token
                .char_indices()
                .find(|(i, c)| *i > 0 && c.is_ascii_alphabetic())
                .map(|(i, _)| i);
            let (amount_str, unit) = match split {
                Some(i) => (&token[..i], Some(token[i..].to_string())),
                None => {
                    let unit = iter
                        .next_if(|next| next.chars().all(|c| c.is_ascii_alphabetic()))
                        .map(str::to_string);
                    (token, unit)
                }
            };

            let amount: i64 = amount_str
                .parse()
                .map_err(|_| DurationParseError::InvalidAmount(amount_str.to_string()))?;

            let multiplier = match unit.as_deref() {
                None | Some("t") | Some("turn") | Some("turns") => 1,
                Some("s") | Some("second") | Some("seconds") => 1,
                Some("m") | Some("minute") | Some("minutes") => TURNS_PER_MINUTE,
                Some("h") | Some("hour") | Some("hours") => TURNS_PER_HOUR,
                Some("d") | Some("day") | Some("days") => TURNS_PER_DAY,
                Some(other) => return Err(DurationParseError::UnknownUnit(other.to_string())),
            };
            total = amount
                .checked_mul(multiplier)
                .and_then(|turns| total.checked_add(turns))
                .ok_or_else(|| DurationParseError::Overflow(input.trim().to_string()))?;
        }

        Ok(Self(total))
    }
}

impl Add for TimeDuration {
    type Output = TimeDuration;

    fn add(self, rhs: TimeDuration) -> TimeDuration {
        TimeDuration(self.0 + rhs.0)
    }
}

impl Sub for TimeDuration {
    type Output = TimeDuration;

    fn sub(self, rhs: TimeDuration) -> TimeDuration {
        TimeDuration(self.0 - rhs.0)
    }
}

impl fmt::Display for TimeDuration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} turns", self.0)
    }
}

/// Seasons of the year.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Season {
    #[default]
    Spring,
    Summer,
    Autumn,
    Winter,
}

/// World calendar, tracking the current turn and when the cataclysm began.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, Default)]
pub struct Calendar {
    /// Current absolute turn.
    pub turn: i64,
    /// Absolute turn at which the cataclysm started.
    pub cataclysm_turn: i64,
}

impl Calendar {
    pub fn new(turn: i64, cataclysm_turn: i64) -> Self {
        Self {
            turn,
            cataclysm_turn,
        }
    }

    /// Day number since the start of the calendar.
    pub fn day(&self) -> i64 {
        self.turn.div_euclid(TURNS_PER_DAY)
    }

    /// Hour of the current day.
    pub fn hour(&self) -> i64 {
        self.turn.rem_euclid(TURNS_PER_DAY) / TURNS_PER_HOUR
    }

    pub fn season(&self) -> Season {
        match self.day().rem_euclid(SEASON_LENGTH_DAYS * 4) / SEASON_LENGTH_DAYS {
            0 => Season::Spring,
            1 => Season::Summer,
            2 => Season::Autumn,
            _ => Season::Winter,
        }
    }

    pub fn is_day(&self) -> bool {
        (SUNRISE_HOUR..SUNSET_HOUR).contains(&self.hour())
    }

    pub fn time_since_cataclysm(&self) -> TimeDuration {
        TimeDuration::from_turns(self.turn - self.cataclysm_turn)
    }

    pub fn days_since_cataclysm(&self) -> i64 {
        self.time_since_cataclysm().to_days()
    }

    /// Advance time by the given duration.
    pub fn advance(&mut self, duration: TimeDuration) {
        self.turn += duration.to_turns();
    }
}
