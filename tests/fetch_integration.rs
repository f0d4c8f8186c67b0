use chrono::{DateTime, TimeZone, Utc};
use httpmock::prelude::*;
use iss_observer_lib::config::ServiceConfig;
use iss_observer_lib::fetch::{FetchError, ServiceClient};
use iss_observer_lib::phase::{ClassificationMode, Evaluator, IdealWindow, PhaseLabel};
use iss_observer_lib::{iss_data, sun_data, Position};

fn services(server: &MockServer) -> ServiceConfig {
    ServiceConfig {
        iss_url: server.url("/iss-now.json"),
        sun_url: server.url("/json"),
        timeout_secs: 5,
        retry_attempts: 2,
        retry_delay_ms: 0,
    }
}

fn utc(day: u32, hour: u32, minute: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 1, day, hour, minute, 0).unwrap()
}

fn sun_body(day: u32, sunrise: &str, sunset: &str, solar_noon: &str) -> serde_json::Value {
    serde_json::json!({
        "results": {
            "sunrise": format!("2024-01-{day:02}T{sunrise}:00+00:00"),
            "sunset": format!("2024-01-{day:02}T{sunset}:00+00:00"),
            "solar_noon": format!("2024-01-{day:02}T{solar_noon}:00+00:00"),
            "day_length": 36000,
            "civil_twilight_begin": format!("2024-01-{day:02}T06:20:00+00:00"),
        },
        "status": "OK",
        "tz_id": "UTC"
    })
}

#[tokio::test]
async fn test_fetch_iss_position() {
    let server = MockServer::start_async().await;
    let iss_mock = server
        .mock_async(|when, then| {
            when.method(GET).path("/iss-now.json");
            then.status(200)
                .header("Content-Type", "application/json")
                .json_body(serde_json::json!({
                    "message": "success",
                    "timestamp": 1704173400,
                    "iss_position": {"latitude": "51.5072", "longitude": "-0.1276"}
                }));
        })
        .await;

    let config = services(&server);
    let client = ServiceClient::new(&config).unwrap();
    let fix = iss_data::fetch(&client, &config.iss_url).await.unwrap();

    iss_mock.assert_async().await;
    assert_eq!(fix.observed_at, utc(2, 5, 30));
    assert_eq!(fix.position, Position::new("51.5072", "-0.1276"));
}

#[tokio::test]
async fn test_server_errors_are_retried() {
    let server = MockServer::start_async().await;
    let iss_mock = server
        .mock_async(|when, then| {
            when.method(GET).path("/iss-now.json");
            then.status(503);
        })
        .await;

    let config = services(&server);
    let client = ServiceClient::new(&config).unwrap();
    let err = iss_data::fetch(&client, &config.iss_url).await.unwrap_err();

    assert!(matches!(err, FetchError::Status { .. }));
    // One attempt plus two retries
    assert_eq!(iss_mock.hits_async().await, 3);
}

#[tokio::test]
async fn test_client_errors_are_not_retried() {
    let server = MockServer::start_async().await;
    let iss_mock = server
        .mock_async(|when, then| {
            when.method(GET).path("/iss-now.json");
            then.status(404);
        })
        .await;

    let config = services(&server);
    let client = ServiceClient::new(&config).unwrap();
    let err = iss_data::fetch(&client, &config.iss_url).await.unwrap_err();

    assert!(matches!(err, FetchError::Status { .. }));
    assert_eq!(iss_mock.hits_async().await, 1);
}

#[tokio::test]
async fn test_malformed_json_is_reported() {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(GET).path("/iss-now.json");
            then.status(200).body("<html>maintenance</html>");
        })
        .await;

    let config = services(&server);
    let client = ServiceClient::new(&config).unwrap();
    let err = iss_data::fetch(&client, &config.iss_url).await.unwrap_err();

    assert!(matches!(err, FetchError::Decode { .. }));
}

#[tokio::test]
async fn test_fetch_three_days_concurrently() {
    let server = MockServer::start_async().await;
    let position = Position::new("51.5072", "-0.1276");

    let mut mocks = Vec::new();
    for (day, sunrise, sunset, noon) in [
        (1, "07:30", "16:00", "11:45"),
        (2, "07:00", "17:00", "12:00"),
        (3, "07:00", "16:30", "11:45"),
    ] {
        let date = format!("2024-01-{day:02}");
        let body = sun_body(day, sunrise, sunset, noon);
        let mock = server
            .mock_async(|when, then| {
                when.method(GET)
                    .path("/json")
                    .query_param("lat", "51.5072")
                    .query_param("lng", "-0.1276")
                    .query_param("date", date.as_str())
                    .query_param("formatted", "0");
                then.status(200).json_body(body);
            })
            .await;
        mocks.push(mock);
    }

    let config = services(&server);
    let client = ServiceClient::new(&config).unwrap();
    let days = sun_data::fetch_days(
        &client,
        &config.sun_url,
        &position,
        utc(2, 5, 30),
        ClassificationMode::ThreeDay,
    )
    .await
    .unwrap();

    for mock in &mocks {
        mock.assert_async().await;
    }

    let yesterday = days.yesterday.unwrap();
    let tomorrow = days.tomorrow.unwrap();
    assert_eq!(yesterday.sunset, utc(1, 16, 0));
    assert_eq!(days.today.sunrise, utc(2, 7, 0));
    assert_eq!(days.today.sunset, utc(2, 17, 0));
    assert_eq!(days.today.solar_noon, Some(utc(2, 12, 0)));
    assert_eq!(tomorrow.sunrise, utc(3, 7, 0));

    let result = Evaluator::new(ClassificationMode::ThreeDay, IdealWindow::default())
        .evaluate(utc(2, 5, 30), &days)
        .unwrap();
    assert_eq!(result.label, PhaseLabel::BeforeSunrise);
    assert_eq!(result.delta, chrono::Duration::minutes(90));
    assert!(result.is_ideal);
}

#[tokio::test]
async fn test_single_day_mode_fetches_only_today() {
    let server = MockServer::start_async().await;
    let position = Position::new("10", "20");

    let today_mock = server
        .mock_async(|when, then| {
            when.method(GET).path("/json").query_param("date", "2024-01-02");
            then.status(200).json_body(sun_body(2, "07:00", "17:00", "12:00"));
        })
        .await;

    // Requests for any other date hit no mock and fail with 404
    let config = services(&server);
    let client = ServiceClient::new(&config).unwrap();
    let days = sun_data::fetch_days(
        &client,
        &config.sun_url,
        &position,
        utc(2, 20, 0),
        ClassificationMode::SingleDay,
    )
    .await
    .unwrap();

    today_mock.assert_async().await;
    assert!(days.yesterday.is_none());
    assert!(days.tomorrow.is_none());
}

#[tokio::test]
async fn test_one_failed_day_fails_the_bracket() {
    let server = MockServer::start_async().await;
    let position = Position::new("10", "20");

    for (day, date) in [(1, "2024-01-01"), (2, "2024-01-02")] {
        server
            .mock_async(|when, then| {
                when.method(GET).path("/json").query_param("date", date);
                then.status(200).json_body(sun_body(day, "07:00", "17:00", "12:00"));
            })
            .await;
    }
    server
        .mock_async(|when, then| {
            when.method(GET).path("/json").query_param("date", "2024-01-03");
            then.status(200)
                .json_body(serde_json::json!({"results": "", "status": "INVALID_DATE"}));
        })
        .await;

    let config = services(&server);
    let client = ServiceClient::new(&config).unwrap();
    let err = sun_data::fetch_days(
        &client,
        &config.sun_url,
        &position,
        utc(2, 12, 0),
        ClassificationMode::ThreeDay,
    )
    .await
    .unwrap_err();

    match err {
        FetchError::Service { detail, .. } => assert_eq!(detail, "INVALID_DATE"),
        other => panic!("unexpected error: {other}"),
    }
}
