//! # Day Phase and Observation Conditions
//!
//! Classifies an observation instant against the sunrise/sunset boundaries
//! around it and decides whether conditions suit a visual ISS sighting.
//!
//! ## Phase Model
//!
//! The span between a sunset and the following sunrise (and between a sunrise
//! and the following sunset) is cut in two. The observation instant always
//! belongs to exactly one of six sub-intervals:
//!
//! ```text
//!  prev sunset      sunrise           sunset         next sunrise
//!      |  after  | before |  after  | before |  after  | before |
//!      |  sunset | sunrise| sunrise | sunset |  sunset | sunrise|
//!      ^ morning split    ^ day split        ^ evening split
//! ```
//!
//! Every comparison is `<=`, so an instant exactly on a split belongs to the
//! earlier half, and an instant exactly on sunrise/sunset reads
//! "before sunrise"/"before sunset" with a zero delta.
//!
//! ## Classification Modes
//!
//! The modes differ only in where the outer bounds and the split instants come
//! from:
//!
//! - [`ClassificationMode::ThreeDay`]: actual boundaries of yesterday, today and
//!   tomorrow; every split is the midpoint of its pair. Solar noon is ignored.
//! - [`ClassificationMode::Midpoint`]: night length estimated as
//!   `24h - day length`; night splits sit half a night away from sunrise and
//!   sunset. Yesterday is required only before today's sunrise.
//! - [`ClassificationMode::SingleDay`]: today's boundaries only; the whole
//!   pre-dawn span is "before sunrise", the whole post-dusk span is
//!   "after sunset".
//!
//! Midpoint and single-day modes split the daylight span at solar noon when
//! it is known.
//!
//! ## Ideal Window
//!
//! A sighting is ideal when the ground is dark but the station is still lit:
//! label "before sunrise" or "after sunset" with the delta inside the closed
//! [`IdealWindow`].

use crate::{DayBoundaries, SolarDays};
use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Errors produced while evaluating a phase.
///
/// None of these are retried internally; the caller has to supply different
/// input.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PhaseError {
    /// Boundaries are malformed, out of order, or do not bracket the instant
    #[error("invalid boundaries: {reason}")]
    InvalidBoundaries { reason: String },

    /// The selected mode needs a day that was not supplied
    #[error("{mode} mode needs sunrise/sunset for {missing}")]
    InsufficientData {
        mode: ClassificationMode,
        missing: &'static str,
    },

    /// Ideal-window bounds are negative or reversed
    #[error("invalid ideal window: {reason}")]
    InvalidWindow { reason: String },
}

fn invalid(reason: impl Into<String>) -> PhaseError {
    PhaseError::InvalidBoundaries {
        reason: reason.into(),
    }
}

/// Strategy used to place the phase boundaries.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ClassificationMode {
    SingleDay,
    Midpoint,
    #[default]
    ThreeDay,
}

impl ClassificationMode {
    pub const ALL: [ClassificationMode; 3] = [
        ClassificationMode::SingleDay,
        ClassificationMode::Midpoint,
        ClassificationMode::ThreeDay,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            ClassificationMode::SingleDay => "single-day",
            ClassificationMode::Midpoint => "midpoint",
            ClassificationMode::ThreeDay => "three-day",
        }
    }

    /// Whether yesterday's and tomorrow's boundaries should be fetched.
    pub fn needs_adjacent_days(self) -> bool {
        !matches!(self, ClassificationMode::SingleDay)
    }
}

impl fmt::Display for ClassificationMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("unknown classification mode `{0}` (expected single-day, midpoint or three-day)")]
pub struct UnknownModeError(pub String);

impl FromStr for ClassificationMode {
    type Err = UnknownModeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ClassificationMode::ALL
            .into_iter()
            .find(|mode| mode.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| UnknownModeError(s.to_string()))
    }
}

/// Which side of which boundary the observation instant is on.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PhaseLabel {
    BeforeSunrise,
    AfterSunrise,
    BeforeSunset,
    AfterSunset,
}

impl PhaseLabel {
    pub fn as_str(self) -> &'static str {
        match self {
            PhaseLabel::BeforeSunrise => "before sunrise",
            PhaseLabel::AfterSunrise => "after sunrise",
            PhaseLabel::BeforeSunset => "before sunset",
            PhaseLabel::AfterSunset => "after sunset",
        }
    }

    /// Labels that sit in darkness next to a sunrise or sunset.
    pub fn is_dark_side(self) -> bool {
        matches!(self, PhaseLabel::BeforeSunrise | PhaseLabel::AfterSunset)
    }
}

impl fmt::Display for PhaseLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Closed range of phase deltas considered ideal for observation.
///
/// # Example
/// ```
/// use chrono::Duration;
/// use iss_observer_lib::phase::IdealWindow;
///
/// let window = IdealWindow::from_minutes(60, 120).unwrap();
/// assert!(window.contains(Duration::minutes(60)));
/// assert!(window.contains(Duration::minutes(120)));
/// assert!(!window.contains(Duration::minutes(121)));
/// ```
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct IdealWindow {
    min: Duration,
    max: Duration,
}

impl IdealWindow {
    pub fn new(min: Duration, max: Duration) -> Result<Self, PhaseError> {
        if min < Duration::zero() || max < Duration::zero() {
            return Err(PhaseError::InvalidWindow {
                reason: "bounds must not be negative".to_string(),
            });
        }
        if min > max {
            return Err(PhaseError::InvalidWindow {
                reason: format!(
                    "minimum {}s exceeds maximum {}s",
                    min.num_seconds(),
                    max.num_seconds()
                ),
            });
        }
        Ok(Self { min, max })
    }

    pub fn from_minutes(min: i64, max: i64) -> Result<Self, PhaseError> {
        Self::new(Duration::minutes(min), Duration::minutes(max))
    }

    pub fn min(&self) -> Duration {
        self.min
    }

    pub fn max(&self) -> Duration {
        self.max
    }

    pub fn contains(&self, delta: Duration) -> bool {
        self.min <= delta && delta <= self.max
    }
}

impl Default for IdealWindow {
    /// One to two hours, the usual twilight span in which the ground is dark
    /// but the station is still sunlit.
    fn default() -> Self {
        Self {
            min: Duration::hours(1),
            max: Duration::hours(2),
        }
    }
}

/// Outcome of a single evaluation.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PhaseResult {
    /// `sunrise <= t < sunset` for today's boundaries
    pub is_day: bool,
    pub label: PhaseLabel,
    /// Distance to the boundary named by `label`, never negative
    pub delta: Duration,
    pub is_ideal: bool,
}

/// Outer bounds and split points for one evaluation.
#[derive(Clone, Copy, Debug)]
struct Bracket {
    prev_sunset: DateTime<Utc>,
    sunrise: DateTime<Utc>,
    sunset: DateTime<Utc>,
    next_sunrise: DateTime<Utc>,
    morning_split: DateTime<Utc>,
    day_split: DateTime<Utc>,
    evening_split: DateTime<Utc>,
}

impl Bracket {
    fn classify(&self, at: DateTime<Utc>) -> Result<(PhaseLabel, Duration), PhaseError> {
        if self.prev_sunset >= self.sunrise || self.sunset >= self.next_sunrise {
            return Err(invalid(
                "day is too long to place the neighbouring sunset/sunrise",
            ));
        }
        if at < self.prev_sunset || at > self.next_sunrise {
            return Err(invalid(format!(
                "observation {} lies outside {} .. {}",
                at, self.prev_sunset, self.next_sunrise
            )));
        }

        let phase = if at <= self.morning_split {
            (PhaseLabel::AfterSunset, at - self.prev_sunset)
        } else if at <= self.sunrise {
            (PhaseLabel::BeforeSunrise, self.sunrise - at)
        } else if at <= self.day_split {
            (PhaseLabel::AfterSunrise, at - self.sunrise)
        } else if at <= self.sunset {
            (PhaseLabel::BeforeSunset, self.sunset - at)
        } else if at <= self.evening_split {
            (PhaseLabel::AfterSunset, at - self.sunset)
        } else {
            (PhaseLabel::BeforeSunrise, self.next_sunrise - at)
        };

        Ok(phase)
    }
}

fn midpoint(start: DateTime<Utc>, end: DateTime<Utc>) -> DateTime<Utc> {
    start + (end - start) / 2
}

fn validate_day(day: &DayBoundaries, name: &str) -> Result<(), PhaseError> {
    if day.sunrise >= day.sunset {
        return Err(invalid(format!(
            "{name}: sunrise {} is not before sunset {}",
            day.sunrise, day.sunset
        )));
    }
    if day.day_length() >= Duration::hours(24) {
        return Err(invalid(format!(
            "{name}: daylight from {} to {} spans a whole day or more",
            day.sunrise, day.sunset
        )));
    }
    if let Some(noon) = day.solar_noon {
        if noon <= day.sunrise || noon >= day.sunset {
            return Err(invalid(format!(
                "{name}: solar noon {noon} is not between sunrise and sunset"
            )));
        }
    }
    Ok(())
}

/// Check every supplied day and the chronological order between them.
fn validate(days: &SolarDays) -> Result<(), PhaseError> {
    validate_day(&days.today, "today")?;

    if let Some(yesterday) = &days.yesterday {
        validate_day(yesterday, "yesterday")?;
        if yesterday.sunset >= days.today.sunrise {
            return Err(invalid(format!(
                "yesterday's sunset {} is not before today's sunrise {}",
                yesterday.sunset, days.today.sunrise
            )));
        }
    }

    if let Some(tomorrow) = &days.tomorrow {
        validate_day(tomorrow, "tomorrow")?;
        if days.today.sunset >= tomorrow.sunrise {
            return Err(invalid(format!(
                "today's sunset {} is not before tomorrow's sunrise {}",
                days.today.sunset, tomorrow.sunrise
            )));
        }
    }

    Ok(())
}

/// Phase evaluator configured with a mode and an ideal window.
///
/// # Example
/// ```
/// use chrono::{Duration, TimeZone, Utc};
/// use iss_observer_lib::phase::{ClassificationMode, Evaluator, IdealWindow, PhaseLabel};
/// use iss_observer_lib::{DayBoundaries, SolarDays};
///
/// let at = |d, h| Utc.with_ymd_and_hms(2024, 1, d, h, 0, 0).unwrap();
/// let days = SolarDays::bracket(
///     DayBoundaries::new(at(1, 7), at(1, 16)),
///     DayBoundaries::new(at(2, 7), at(2, 17)),
///     DayBoundaries::new(at(3, 7), at(3, 17)),
/// );
///
/// let evaluator = Evaluator::new(ClassificationMode::ThreeDay, IdealWindow::default());
/// let result = evaluator.evaluate(at(2, 19), &days).unwrap();
///
/// assert_eq!(result.label, PhaseLabel::AfterSunset);
/// assert_eq!(result.delta, Duration::hours(2));
/// assert!(!result.is_day);
/// assert!(result.is_ideal);
/// ```
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Evaluator {
    mode: ClassificationMode,
    window: IdealWindow,
}

impl Evaluator {
    pub fn new(mode: ClassificationMode, window: IdealWindow) -> Self {
        Self { mode, window }
    }

    pub fn mode(&self) -> ClassificationMode {
        self.mode
    }

    pub fn window(&self) -> IdealWindow {
        self.window
    }

    /// Classify `at` against `days`.
    ///
    /// Every supplied day is validated, including neighbours the mode would
    /// not otherwise look at.
    pub fn evaluate(
        &self,
        at: DateTime<Utc>,
        days: &SolarDays,
    ) -> Result<PhaseResult, PhaseError> {
        validate(days)?;

        let (label, delta) = self.bracket(at, days)?.classify(at)?;

        let today = &days.today;
        let is_day = today.sunrise <= at && at < today.sunset;
        let is_ideal = label.is_dark_side() && self.window.contains(delta);

        Ok(PhaseResult {
            is_day,
            label,
            delta,
            is_ideal,
        })
    }

    fn bracket(&self, at: DateTime<Utc>, days: &SolarDays) -> Result<Bracket, PhaseError> {
        let today = days.today;
        let missing = |missing: &'static str| PhaseError::InsufficientData {
            mode: self.mode,
            missing,
        };
        let day_split = today
            .solar_noon
            .unwrap_or_else(|| midpoint(today.sunrise, today.sunset));

        let bracket = match self.mode {
            ClassificationMode::ThreeDay => {
                let yesterday = days.yesterday.ok_or_else(|| missing("yesterday"))?;
                let tomorrow = days.tomorrow.ok_or_else(|| missing("tomorrow"))?;
                Bracket {
                    prev_sunset: yesterday.sunset,
                    sunrise: today.sunrise,
                    sunset: today.sunset,
                    next_sunrise: tomorrow.sunrise,
                    morning_split: midpoint(yesterday.sunset, today.sunrise),
                    day_split: midpoint(today.sunrise, today.sunset),
                    evening_split: midpoint(today.sunset, tomorrow.sunrise),
                }
            }
            ClassificationMode::Midpoint => {
                let half_night = today.night_length() / 2;
                let prev_sunset = match days.yesterday {
                    Some(yesterday) => yesterday.sunset,
                    None if at < today.sunrise => return Err(missing("yesterday")),
                    None => today.sunset - Duration::hours(24),
                };
                let next_sunrise = days
                    .tomorrow
                    .map_or(today.sunrise + Duration::hours(24), |tomorrow| {
                        tomorrow.sunrise
                    });
                Bracket {
                    prev_sunset,
                    sunrise: today.sunrise,
                    sunset: today.sunset,
                    next_sunrise,
                    morning_split: today.sunrise - half_night,
                    day_split,
                    evening_split: today.sunset + half_night,
                }
            }
            ClassificationMode::SingleDay => {
                let prev_sunset = today.sunset - Duration::hours(24);
                let next_sunrise = today.sunrise + Duration::hours(24);
                Bracket {
                    prev_sunset,
                    sunrise: today.sunrise,
                    sunset: today.sunset,
                    next_sunrise,
                    morning_split: prev_sunset,
                    day_split,
                    evening_split: next_sunrise,
                }
            }
        };

        Ok(bracket)
    }
}
