//! Geographic primitives: validated lat/lng points and haversine distances.
//!
//! This module provides:
//!
//! - **GeoPoint**: a latitude/longitude pair validated at construction
//! - **Distance calculations**: great-circle (haversine) distance in kilometres
//! - **Proximity checks**: "is the agent within N km of the passenger"
//! - **Interpolation**: straight-line blending in degree space
//! - **PostgreSQL points**: the longitude-first `POINT(lng lat)` / `(lng,lat)`
//!   text used by the `localisation_gps` columns
//!
//! Interpolation is *not* geodesic. It distorts with latitude and over long
//! distances and is only meant for short same-city rides.

use serde::{Deserialize, Serialize};

use crate::error::{PmrError, Result};

/// Mean Earth radius used by the haversine formula.
pub const EARTH_RADIUS_KM: f64 = 6371.0;

/// A point on the globe in decimal degrees.
///
/// Serialized as `{"lat": .., "lng": ..}`, the shape the tracking records use
/// for `position_depart`, `position_arrivee` and `position_actuelle`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawGeoPoint")]
pub struct GeoPoint {
    #[serde(rename = "lat")]
    latitude: f64,
    #[serde(rename = "lng")]
    longitude: f64,
}

#[derive(Deserialize)]
struct RawGeoPoint {
    lat: f64,
    lng: f64,
}

impl TryFrom<RawGeoPoint> for GeoPoint {
    type Error = PmrError;

    fn try_from(raw: RawGeoPoint) -> Result<Self> {
        GeoPoint::new(raw.lat, raw.lng)
    }
}

impl GeoPoint {
    /// Build a point, rejecting non-finite or out-of-range coordinates.
    pub fn new(latitude: f64, longitude: f64) -> Result<Self> {
        let lat_ok = latitude.is_finite() && (-90.0..=90.0).contains(&latitude);
        let lng_ok = longitude.is_finite() && (-180.0..=180.0).contains(&longitude);
        if !lat_ok || !lng_ok {
            return Err(PmrError::InvalidCoordinate {
                latitude,
                longitude,
            });
        }
        Ok(Self {
            latitude,
            longitude,
        })
    }

    /// For compile-time tables whose values are known to be in range.
    pub(crate) const fn new_unchecked(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
        }
    }

    pub fn latitude(&self) -> f64 {
        self.latitude
    }

    pub fn longitude(&self) -> f64 {
        self.longitude
    }

    /// Linear blend towards `other`; `fraction` is clamped to `[0, 1]`.
    ///
    /// The endpoints are returned exactly for fractions 0 and 1. Because both
    /// inputs are valid and the blend is convex, the result is always valid.
    pub fn interpolate(&self, other: &GeoPoint, fraction: f64) -> GeoPoint {
        let t = fraction.clamp(0.0, 1.0);
        if t <= 0.0 {
            return *self;
        }
        if t >= 1.0 {
            return *other;
        }
        GeoPoint {
            latitude: self.latitude + (other.latitude - self.latitude) * t,
            longitude: self.longitude + (other.longitude - self.longitude) * t,
        }
    }

    /// Longitude-first `POINT(lng lat)` text for geometry columns.
    pub fn to_pg_point(&self) -> String {
        format!("POINT({} {})", self.longitude, self.latitude)
    }

    /// Parse `POINT(lng lat)` or the native `(lng,lat)` form.
    ///
    /// Coordinates go through [`GeoPoint::new`], so out-of-range values fail
    /// with `InvalidCoordinate`; anything unparsable is `InvalidArgument`.
    pub fn from_pg_point(raw: &str) -> Result<Self> {
        let malformed = || PmrError::invalid_argument(format!("malformed point: {raw:?}"));
        let trimmed = raw.trim();
        let body = match trimmed.get(..5) {
            Some(prefix) if prefix.eq_ignore_ascii_case("point") => trimmed[5..].trim_start(),
            _ => trimmed,
        };
        let inner = body
            .strip_prefix('(')
            .and_then(|rest| rest.strip_suffix(')'))
            .ok_or_else(malformed)?;

        let mut parts = inner
            .split(|c: char| c == ',' || c.is_whitespace())
            .filter(|part| !part.is_empty());
        let (Some(lng), Some(lat), None) = (parts.next(), parts.next(), parts.next()) else {
            return Err(malformed());
        };
        let longitude: f64 = lng.parse().map_err(|_| malformed())?;
        let latitude: f64 = lat.parse().map_err(|_| malformed())?;
        GeoPoint::new(latitude, longitude)
    }
}

/// Great-circle distance between two points in kilometres.
pub fn distance_km(a: &GeoPoint, b: &GeoPoint) -> f64 {
    let (lat1, lon1) = (a.latitude.to_radians(), a.longitude.to_radians());
    let (lat2, lon2) = (b.latitude.to_radians(), b.longitude.to_radians());
    let dlat = lat2 - lat1;
    let dlon = lon2 - lon1;
    let sin_dlat = (dlat * 0.5).sin();
    let sin_dlon = (dlon * 0.5).sin();
    let h = sin_dlat * sin_dlat + lat1.cos() * lat2.cos() * sin_dlon * sin_dlon;
    // Rounding can push h a hair past 1 for antipodal points.
    let h = h.clamp(0.0, 1.0);
    let c = 2.0 * h.sqrt().atan2((1.0 - h).sqrt());
    EARTH_RADIUS_KM * c
}

/// Distance between raw `(latitude, longitude)` pairs, validating both.
pub fn distance_km_between(a: (f64, f64), b: (f64, f64)) -> Result<f64> {
    let a = GeoPoint::new(a.0, a.1)?;
    let b = GeoPoint::new(b.0, b.1)?;
    Ok(distance_km(&a, &b))
}

/// Whether `b` lies within `radius_km` of `a` (inclusive).
///
/// The alerting threshold (e.g. 0.1 km for "agent is close") is the caller's.
/// Coincident points count as within; the "agent is close" alert also
/// requires a non-zero distance, so callers wanting it must exclude zero.
pub fn within_radius_km(a: &GeoPoint, b: &GeoPoint, radius_km: f64) -> bool {
    distance_km(a, b) <= radius_km
}
