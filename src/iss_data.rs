//! # ISS Position Fetching
//!
//! Fetches the current ground position of the International Space Station from
//! the Open Notify "ISS Location Now" service.
//!
//! ## Data Source
//!
//! - **URL**: http://api.open-notify.org/iss-now.json (configurable)
//! - **Format**: JSON
//!
//! ```json
//! {
//!   "message": "success",
//!   "timestamp": 1704180600,
//!   "iss_position": { "latitude": "51.5072", "longitude": "-0.1276" }
//! }
//! ```
//!
//! The timestamp (Unix seconds, UTC) becomes the observation instant. The
//! coordinates are kept as text; the service sends them as JSON strings, but
//! plain numbers are accepted too.

use crate::fetch::{FetchError, ServiceClient};
use crate::{IssFix, Position};
use chrono::{TimeZone, Utc};
use serde::{Deserialize, Deserializer};

/// Service name used in logs and errors
pub const SERVICE: &str = "ISS Location Now";

#[derive(Debug, Deserialize)]
struct IssNowResponse {
    #[serde(default)]
    message: Option<String>,
    timestamp: i64,
    iss_position: RawPosition,
}

#[derive(Debug, Deserialize)]
struct RawPosition {
    #[serde(deserialize_with = "text_or_number")]
    latitude: String,
    #[serde(deserialize_with = "text_or_number")]
    longitude: String,
}

fn text_or_number<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Text(String),
        Number(serde_json::Number),
    }

    Ok(match Raw::deserialize(deserializer)? {
        Raw::Text(text) => text,
        Raw::Number(number) => number.to_string(),
    })
}

/// Fetch the current ISS position and observation instant.
///
/// # Example
/// ```no_run
/// use iss_observer_lib::config::ServiceConfig;
/// use iss_observer_lib::fetch::ServiceClient;
/// use iss_observer_lib::iss_data;
///
/// # async fn run() -> Result<(), Box<dyn std::error::Error>> {
/// let config = ServiceConfig::default();
/// let client = ServiceClient::new(&config)?;
/// let fix = iss_data::fetch(&client, &config.iss_url).await?;
/// println!("{} {}", fix.position.latitude, fix.position.longitude);
/// # Ok(())
/// # }
/// ```
pub async fn fetch(client: &ServiceClient, url: &str) -> Result<IssFix, FetchError> {
    tracing::info!("Fetching ISS position from {}", url);

    let response: IssNowResponse = client.get_json(SERVICE, url, &[]).await?;
    let fix = into_fix(response)?;

    tracing::debug!(
        "ISS at {}, {} ({})",
        fix.position.latitude,
        fix.position.longitude,
        fix.observed_at
    );
    Ok(fix)
}

fn into_fix(response: IssNowResponse) -> Result<IssFix, FetchError> {
    if let Some(message) = response.message.filter(|m| m != "success") {
        return Err(FetchError::Service {
            service: SERVICE,
            detail: message,
        });
    }

    let observed_at = Utc
        .timestamp_opt(response.timestamp, 0)
        .single()
        .ok_or(FetchError::Timestamp(response.timestamp))?;

    Ok(IssFix {
        observed_at,
        position: Position::new(
            response.iss_position.latitude,
            response.iss_position.longitude,
        ),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(body: &str) -> Result<IssFix, FetchError> {
        let response: IssNowResponse = serde_json::from_str(body).unwrap();
        into_fix(response)
    }

    #[test]
    fn test_string_coordinates() {
        let fix = parse(
            r#"{"message": "success", "timestamp": 1704180600,
                "iss_position": {"latitude": "51.5072", "longitude": "-0.1276"}}"#,
        )
        .unwrap();

        assert_eq!(fix.position, Position::new("51.5072", "-0.1276"));
        assert_eq!(
            fix.observed_at,
            Utc.with_ymd_and_hms(2024, 1, 2, 7, 30, 0).unwrap()
        );
    }

    #[test]
    fn test_numeric_coordinates_and_missing_message() {
        let fix = parse(
            r#"{"timestamp": 0, "iss_position": {"latitude": -12.25, "longitude": 170}}"#,
        )
        .unwrap();

        assert_eq!(fix.position, Position::new("-12.25", "170"));
        assert_eq!(fix.observed_at.timestamp(), 0);
    }

    #[test]
    fn test_failure_message() {
        let err = parse(
            r#"{"message": "error", "timestamp": 0,
                "iss_position": {"latitude": "0", "longitude": "0"}}"#,
        )
        .unwrap_err();

        assert!(matches!(err, FetchError::Service { .. }));
    }

    #[test]
    fn test_out_of_range_timestamp() {
        let err = parse(
            r#"{"timestamp": 9223372036854775807,
                "iss_position": {"latitude": "0", "longitude": "0"}}"#,
        )
        .unwrap_err();

        assert!(matches!(err, FetchError::Timestamp(_)));
    }

    #[test]
    fn test_missing_keys_fail_to_decode() {
        let result = serde_json::from_str::<IssNowResponse>(r#"{"timestamp": 0}"#);
        assert!(result.is_err());
    }
}
