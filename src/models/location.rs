//! Models for position fixes and the per-user current-location row.

use chrono::DateTime;
use chrono_tz::Tz;
use serde::{Deserialize, Serialize};

use crate::types::UserId;

const EARTH_RADIUS_METERS: f64 = 6_371_000.0;

/// A single latitude/longitude reading from the device, in decimal degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Fix {
    pub latitude: f64,
    pub longitude: f64,
}

impl Fix {
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
        }
    }

    /// Great-circle distance to another fix, in meters (haversine).
    pub fn distance_meters(&self, other: &Fix) -> f64 {
        let lat1 = self.latitude.to_radians();
        let lat2 = other.latitude.to_radians();
        let dlat = (other.latitude - self.latitude).to_radians();
        let dlon = (other.longitude - self.longitude).to_radians();

        let a = (dlat / 2.0).sin().powi(2) + lat1.cos() * lat2.cos() * (dlon / 2.0).sin().powi(2);
        let c = 2.0 * a.sqrt().asin();
        EARTH_RADIUS_METERS * c
    }
}

/// Latest known position of a user; a plain overwrite target, never history.
///
/// Every accepted fix from either producer replaces this row wholesale.
/// The timestamp is stamped at write time by the location writer.
#[derive(Debug, Clone, Serialize)]
pub struct CurrentLocation {
    pub user_id: UserId,
    pub latitude: f64,
    pub longitude: f64,
    pub timestamp: DateTime<Tz>,
}
