//! # Sunrise/Sunset Fetching
//!
//! Fetches sunrise, sunset and solar noon for a position and calendar day from
//! the sunrise-sunset.org JSON API.
//!
//! ## Data Source
//!
//! - **URL**: https://api.sunrise-sunset.org/json (configurable)
//! - **Query**: `lat`, `lng`, `date=YYYY-MM-DD`, `formatted=0`
//! - **Format**: JSON, instants in RFC 3339 with a `+00:00` offset
//!
//! ```json
//! {
//!   "results": {
//!     "sunrise": "2024-01-02T07:00:00+00:00",
//!     "sunset": "2024-01-02T17:00:00+00:00",
//!     "solar_noon": "2024-01-02T12:00:00+00:00"
//!   },
//!   "status": "OK"
//! }
//! ```
//!
//! ## Fetch Strategy
//!
//! One request per day. When the classification mode needs neighbouring days,
//! yesterday, today and tomorrow are requested concurrently with
//! `tokio::try_join!`; the first failure cancels the rest.
//!
//! Near the poles the service reports placeholder instants for days without a
//! sunrise or sunset. Those are passed through untouched and rejected by the
//! phase evaluator as invalid boundaries.

use crate::fetch::{parse_utc_instant, FetchError, ServiceClient};
use crate::phase::ClassificationMode;
use crate::{DayBoundaries, Position, SolarDays};
use chrono::{DateTime, NaiveDate, Utc};
use serde::Deserialize;

/// Service name used in logs and errors
pub const SERVICE: &str = "Sunrise Sunset";

#[derive(Debug, Deserialize)]
struct SunResponse {
    status: String,
    /// An empty string rather than an object when `status` is not OK
    #[serde(default)]
    results: serde_json::Value,
}

#[derive(Debug, Deserialize)]
struct SunResults {
    sunrise: String,
    sunset: String,
    #[serde(default)]
    solar_noon: Option<String>,
}

/// Fetch sunrise/sunset (and solar noon) for one day at one position.
pub async fn fetch_day(
    client: &ServiceClient,
    url: &str,
    position: &Position,
    date: NaiveDate,
) -> Result<DayBoundaries, FetchError> {
    let date_param = date.format("%Y-%m-%d").to_string();
    let query = [
        ("lat", position.latitude.as_str()),
        ("lng", position.longitude.as_str()),
        ("date", date_param.as_str()),
        ("formatted", "0"),
    ];

    let response: SunResponse = client.get_json(SERVICE, url, &query).await?;
    let day = into_boundaries(response)?;

    tracing::debug!("{}: sunrise {}, sunset {}", date, day.sunrise, day.sunset);
    Ok(day)
}

/// Fetch the days `mode` needs around the observation instant.
///
/// The calendar day is taken from the UTC date of `observed_at`.
pub async fn fetch_days(
    client: &ServiceClient,
    url: &str,
    position: &Position,
    observed_at: DateTime<Utc>,
    mode: ClassificationMode,
) -> Result<SolarDays, FetchError> {
    let today = observed_at.date_naive();

    if !mode.needs_adjacent_days() {
        tracing::info!("Fetching sunrise/sunset for {}", today);
        let day = fetch_day(client, url, position, today).await?;
        return Ok(SolarDays::single(day));
    }

    let yesterday = today.pred_opt().ok_or(FetchError::Calendar(today))?;
    let tomorrow = today.succ_opt().ok_or(FetchError::Calendar(today))?;
    tracing::info!("Fetching sunrise/sunset for {} .. {}", yesterday, tomorrow);

    let (yesterday, today, tomorrow) = tokio::try_join!(
        fetch_day(client, url, position, yesterday),
        fetch_day(client, url, position, today),
        fetch_day(client, url, position, tomorrow),
    )?;

    Ok(SolarDays::bracket(yesterday, today, tomorrow))
}

fn into_boundaries(response: SunResponse) -> Result<DayBoundaries, FetchError> {
    if response.status != "OK" {
        return Err(FetchError::Service {
            service: SERVICE,
            detail: response.status,
        });
    }

    if response.results.is_null() {
        return Err(FetchError::Service {
            service: SERVICE,
            detail: "response has no results".to_string(),
        });
    }
    let results: SunResults = serde_json::from_value(response.results)
        .map_err(|source| FetchError::Decode {
            service: SERVICE,
            source,
        })?;

    let mut day = DayBoundaries::new(
        parse_utc_instant(&results.sunrise)?,
        parse_utc_instant(&results.sunset)?,
    );
    if let Some(noon) = results.solar_noon {
        day = day.with_solar_noon(parse_utc_instant(&noon)?);
    }

    Ok(day)
}
