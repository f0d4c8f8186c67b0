//! # ISS Observer Core Library
//!
//! This library provides the data structures and computation behind the
//! `iss-observer` report: where the International Space Station is right now,
//! whether the ground point beneath it is in daylight or darkness, how far that
//! point is from the nearest sunrise or sunset, and whether the moment falls in
//! the twilight window that suits naked-eye observation.
//!
//! ## Design Philosophy
//!
//! ### Pure core, thin edges
//! - **Phase evaluation** ([`phase`]) is a synchronous function of its inputs.
//!   It performs no I/O, reads no clock and logs nothing, so every boundary case
//!   can be pinned down in unit tests.
//! - **Data fetching** ([`iss_data`], [`sun_data`]) owns everything that can fail
//!   for reasons outside the program: network, HTTP status, JSON shape, time
//!   parsing.
//! - **Rendering** ([`renderer`]) turns a finished evaluation into text or JSON.
//!
//! ### UTC everywhere
//! All instants are `chrono::DateTime<Utc>`. Timestamps that arrive with a
//! non-zero offset are rejected at the parsing edge rather than silently
//! truncated.
//!
//! ### Data Flow
//! 1. **Position**: fetch the current ISS fix (timestamp + latitude/longitude)
//! 2. **Ephemeris**: fetch sunrise/sunset for yesterday, today and tomorrow at
//!    that position, concurrently
//! 3. **Evaluate**: classify the observation instant into one of six phase
//!    sub-intervals and check the ideal window
//! 4. **Report**: print the result
//!
//! ## Core Types
//!
//! - [`Position`]: latitude/longitude exactly as the provider reported them
//! - [`IssFix`]: an observation instant paired with a [`Position`]
//! - [`DayBoundaries`]: sunrise, sunset and optional solar noon for one day
//! - [`SolarDays`]: today's boundaries plus optional neighbours

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

pub mod config;
pub mod fetch;
pub mod iss_data;
pub mod logger;
pub mod phase;
pub mod renderer;
pub mod sun_data;

/// Geographic position of the ISS ground track.
///
/// The values are kept as text because they are never used arithmetically:
/// they are shown in the report and forwarded verbatim as query parameters to
/// the ephemeris service.
///
/// # Example
/// ```
/// use iss_observer_lib::Position;
///
/// let position = Position::new("51.5072", "-0.1276");
/// assert_eq!(position.latitude, "51.5072");
/// ```
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Position {
    /// Decimal degrees, north positive
    pub latitude: String,
    /// Decimal degrees, east positive
    pub longitude: String,
}

impl Position {
    pub fn new(latitude: impl Into<String>, longitude: impl Into<String>) -> Self {
        Self {
            latitude: latitude.into(),
            longitude: longitude.into(),
        }
    }
}

/// A single ISS position report.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct IssFix {
    /// Instant the position was sampled
    pub observed_at: DateTime<Utc>,
    pub position: Position,
}

/// Sunrise, sunset and (optionally) solar noon for one calendar day at one place.
///
/// Expected ordering is `sunrise < solar_noon < sunset`. The type does not
/// enforce it on construction; [`phase::Evaluator`] validates every day it is
/// given and reports violations as [`phase::PhaseError::InvalidBoundaries`].
///
/// # Example
/// ```
/// use chrono::{TimeZone, Utc};
/// use iss_observer_lib::DayBoundaries;
///
/// let day = DayBoundaries::new(
///     Utc.with_ymd_and_hms(2024, 1, 2, 7, 0, 0).unwrap(),
///     Utc.with_ymd_and_hms(2024, 1, 2, 17, 0, 0).unwrap(),
/// );
/// assert_eq!(day.day_length().num_hours(), 10);
/// assert_eq!(day.night_length().num_hours(), 14);
/// ```
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct DayBoundaries {
    pub sunrise: DateTime<Utc>,
    pub sunset: DateTime<Utc>,
    pub solar_noon: Option<DateTime<Utc>>,
}

impl DayBoundaries {
    pub fn new(sunrise: DateTime<Utc>, sunset: DateTime<Utc>) -> Self {
        Self {
            sunrise,
            sunset,
            solar_noon: None,
        }
    }

    pub fn with_solar_noon(mut self, solar_noon: DateTime<Utc>) -> Self {
        self.solar_noon = Some(solar_noon);
        self
    }

    /// Time between sunrise and sunset.
    pub fn day_length(&self) -> Duration {
        self.sunset - self.sunrise
    }

    /// Night length estimated from this day alone: `24h - day_length`.
    pub fn night_length(&self) -> Duration {
        Duration::hours(24) - self.day_length()
    }
}

/// Consecutive days of boundaries handed to the evaluator.
///
/// Only `today` is mandatory. Which neighbours are needed depends on the
/// [`phase::ClassificationMode`]; missing ones surface as
/// [`phase::PhaseError::InsufficientData`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SolarDays {
    pub yesterday: Option<DayBoundaries>,
    pub today: DayBoundaries,
    pub tomorrow: Option<DayBoundaries>,
}

impl SolarDays {
    /// Only today's boundaries.
    pub fn single(today: DayBoundaries) -> Self {
        Self {
            yesterday: None,
            today,
            tomorrow: None,
        }
    }

    /// A full yesterday/today/tomorrow bracket.
    pub fn bracket(
        yesterday: DayBoundaries,
        today: DayBoundaries,
        tomorrow: DayBoundaries,
    ) -> Self {
        Self {
            yesterday: Some(yesterday),
            today,
            tomorrow: Some(tomorrow),
        }
    }
}
