//! Post models for geotagged collection and normalization.
//!
//! A `RawPost` is immutable once collected; a `NormalizedPost` is derived
//! from exactly one `RawPost` by the record transformer and never updated
//! afterward.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Geographic point attached to a post, longitude first (source order).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinates {
    pub longitude: f64,
    pub latitude: f64,
}

impl Coordinates {
    /// Encode as the CSV cell value: a JSON `[lon, lat]` array.
    pub fn to_cell(&self) -> String {
        format!("[{},{}]", self.longitude, self.latitude)
    }
}

/// One fetched post, exactly as the source reported it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawPost {
    /// Source-assigned identifier, used as the pagination watermark.
    pub id: u64,
    /// Source-provided timestamp, passed through opaquely.
    pub created_at: String,
    /// Author handle, `"unknown"` when the source omits it.
    pub author: String,
    /// Original post body.
    pub text: String,
    /// Author-supplied free-text location, if any.
    pub location: Option<String>,
    /// Geotag, if the post carries one.
    pub coordinates: Option<Coordinates>,
    pub retweet_count: u64,
    pub favorite_count: u64,
}

/// A post after text cleaning, location standardization, and scoring.
#[derive(Debug, Clone, PartialEq)]
pub struct NormalizedPost {
    pub id: u64,
    pub created_at: String,
    pub author: String,
    /// Lowercased, noise-stripped, spell-corrected text.
    pub text: String,
    /// Standardized location, or the `"customized address"` sentinel.
    pub location: String,
    pub coordinates: Option<Coordinates>,
    pub retweet_count: u64,
    pub favorite_count: u64,
    /// Polarity of the normalized text, in [-1.0, 1.0].
    pub sentiment_score: f64,
}

/// Error produced when a geocode string cannot be parsed.
#[derive(Debug, Error)]
pub enum GeocodeError {
    #[error("geocode must be 'lat,lon,radius' (e.g. 37.7749,-122.4194,50km), got '{0}'")]
    Format(String),

    #[error("latitude {0} out of range [-90, 90]")]
    Latitude(f64),

    #[error("longitude {0} out of range [-180, 180]")]
    Longitude(f64),

    #[error("radius must be a positive number followed by 'km' or 'mi', got '{0}'")]
    Radius(String),
}

/// Unit for a search radius.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RadiusUnit {
    Kilometers,
    Miles,
}

impl RadiusUnit {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Kilometers => "km",
            Self::Miles => "mi",
        }
    }
}

/// A validated region filter: center point plus search radius.
///
/// Parsed from the CLI form `lat,lon,radius`, e.g. `37.7749,-122.4194,50km`.
#[derive(Debug, Clone, PartialEq)]
pub struct Geocode {
    pub latitude: f64,
    pub longitude: f64,
    pub radius: f64,
    pub unit: RadiusUnit,
}

impl FromStr for Geocode {
    type Err = GeocodeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let parts: Vec<&str> = s.trim().split(',').map(str::trim).collect();
        if parts.len() != 3 || parts.iter().any(|p| p.is_empty()) {
            return Err(GeocodeError::Format(s.to_string()));
        }

        let latitude: f64 = parts[0]
            .parse()
            .map_err(|_| GeocodeError::Format(s.to_string()))?;
        let longitude: f64 = parts[1]
            .parse()
            .map_err(|_| GeocodeError::Format(s.to_string()))?;

        if !(-90.0..=90.0).contains(&latitude) {
            return Err(GeocodeError::Latitude(latitude));
        }
        if !(-180.0..=180.0).contains(&longitude) {
            return Err(GeocodeError::Longitude(longitude));
        }

        let radius_str = parts[2];
        let (value, unit) = if let Some(v) = radius_str.strip_suffix("km") {
            (v, RadiusUnit::Kilometers)
        } else if let Some(v) = radius_str.strip_suffix("mi") {
            (v, RadiusUnit::Miles)
        } else {
            return Err(GeocodeError::Radius(radius_str.to_string()));
        };

        let radius: f64 = value
            .parse()
            .map_err(|_| GeocodeError::Radius(radius_str.to_string()))?;
        if !radius.is_finite() || radius <= 0.0 {
            return Err(GeocodeError::Radius(radius_str.to_string()));
        }

        Ok(Self {
            latitude,
            longitude,
            radius,
            unit,
        })
    }
}

impl fmt::Display for Geocode {
    /// Wire form expected by the search endpoint: `lat,lon,radius`.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{},{},{}{}",
            self.latitude,
            self.longitude,
            self.radius,
            self.unit.as_str()
        )
    }
}
