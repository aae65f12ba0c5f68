use anyhow::anyhow;
use chrono_tz::Tz;
use serde::{Deserialize, Serialize};
use std::env;

/// Runtime configuration for the presence core.
///
/// Loaded from the environment with production defaults matching the field
/// deployment: Jakarta civil time, a 5 s / 10 m foreground watch cadence and
/// a 5 min / 100 m background cadence.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub database_url: String,
    pub time_zone: Tz,
    /// Minimum seconds between foreground watcher fixes.
    pub watch_interval_secs: u64,
    /// Minimum displacement in meters to trigger a foreground fix early.
    pub watch_distance_meters: f64,
    /// Seconds between background task invocations.
    pub background_interval_secs: u64,
    /// Displacement hint in meters for the background registration.
    pub background_distance_meters: f64,
    /// Title of the foreground-service notice shown while background
    /// tracking is active.
    pub notification_title: String,
    pub notification_body: String,
}

impl Config {
    pub fn load() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();

        let database_url = env::var("DATABASE_URL")
            .unwrap_or_else(|_| "postgres://localhost/presence".to_string());

        let time_zone_name = env::var("APP_TIMEZONE").unwrap_or_else(|_| "Asia/Jakarta".to_string());
        let time_zone: Tz = time_zone_name
            .parse()
            .map_err(|_| anyhow!("Invalid APP_TIMEZONE value: {}", time_zone_name))?;

        let watch_interval_secs = env::var("WATCH_INTERVAL_SECS")
            .unwrap_or_else(|_| "5".to_string())
            .parse()
            .unwrap_or(5);

        let watch_distance_meters = env::var("WATCH_DISTANCE_METERS")
            .unwrap_or_else(|_| "10".to_string())
            .parse()
            .unwrap_or(10.0);

        let background_interval_secs = env::var("BACKGROUND_INTERVAL_SECS")
            .unwrap_or_else(|_| "300".to_string())
            .parse()
            .unwrap_or(300);

        let background_distance_meters = env::var("BACKGROUND_DISTANCE_METERS")
            .unwrap_or_else(|_| "100".to_string())
            .parse()
            .unwrap_or(100.0);

        let notification_title =
            env::var("NOTIFICATION_TITLE").unwrap_or_else(|_| "Location Tracking".to_string());
        let notification_body = env::var("NOTIFICATION_BODY")
            .unwrap_or_else(|_| "Tracking your location in the background".to_string());

        Ok(Config {
            database_url,
            time_zone,
            watch_interval_secs,
            watch_distance_meters,
            background_interval_secs,
            background_distance_meters,
            notification_title,
            notification_body,
        })
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            database_url: "postgres://localhost/presence".to_string(),
            time_zone: chrono_tz::Asia::Jakarta,
            watch_interval_secs: 5,
            watch_distance_meters: 10.0,
            background_interval_secs: 300,
            background_distance_meters: 100.0,
            notification_title: "Location Tracking".to_string(),
            notification_body: "Tracking your location in the background".to_string(),
        }
    }
}
