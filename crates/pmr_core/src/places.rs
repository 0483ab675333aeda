//! Place-name lookup for taxi legs.
//!
//! Legs carry free-text departure/arrival labels. The tracking workflow maps a
//! handful of well-known labels to GPS points and falls back to fixed central
//! Paris defaults for anything else.

use std::collections::HashMap;

use crate::error::Result;
use crate::geo::GeoPoint;

/// Departure used when the label is unknown (Paris, Hôtel de Ville area).
pub const DEFAULT_DEPARTURE: GeoPoint = GeoPoint::new_unchecked(48.8566, 2.3522);
/// Arrival used when the label is unknown (Paris, Gare du Nord area).
pub const DEFAULT_ARRIVAL: GeoPoint = GeoPoint::new_unchecked(48.8747, 2.3464);

const KNOWN_PLACES: [(&str, GeoPoint); 4] = [
    ("Paris, Champs-Élysées", GeoPoint::new_unchecked(48.8698, 2.3078)),
    ("Paris Gare de Lyon", GeoPoint::new_unchecked(48.8447, 2.3736)),
    ("Marseille Saint-Charles", GeoPoint::new_unchecked(43.3028, 5.3806)),
    ("Marseille, Stade Vélodrome", GeoPoint::new_unchecked(43.2699, 5.3958)),
];

#[derive(Debug, Clone)]
pub struct PlaceDirectory {
    places: HashMap<String, GeoPoint>,
}

impl Default for PlaceDirectory {
    fn default() -> Self {
        let places = KNOWN_PLACES
            .iter()
            .map(|(name, point)| (name.to_string(), *point))
            .collect();
        Self { places }
    }
}

impl PlaceDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register (or replace) a named place.
    pub fn with_place(
        mut self,
        name: impl Into<String>,
        latitude: f64,
        longitude: f64,
    ) -> Result<Self> {
        let point = GeoPoint::new(latitude, longitude)?;
        self.places.insert(name.into(), point);
        Ok(self)
    }

    pub fn lookup(&self, name: &str) -> Option<GeoPoint> {
        self.places.get(name.trim()).copied()
    }

    pub fn departure(&self, name: &str) -> GeoPoint {
        self.lookup(name).unwrap_or(DEFAULT_DEPARTURE)
    }

    pub fn arrival(&self, name: &str) -> GeoPoint {
        self.lookup(name).unwrap_or(DEFAULT_ARRIVAL)
    }

    /// Resolve both ends of a leg, applying the per-end fallbacks.
    pub fn resolve_route(&self, departure: &str, arrival: &str) -> (GeoPoint, GeoPoint) {
        let origin = self.departure(departure);
        let destination = self.arrival(arrival);
        tracing::debug!(
            departure,
            arrival,
            known_departure = self.lookup(departure).is_some(),
            known_arrival = self.lookup(arrival).is_some(),
            "resolved taxi route"
        );
        (origin, destination)
    }

    pub fn len(&self) -> usize {
        self.places.len()
    }

    pub fn is_empty(&self) -> bool {
        self.places.is_empty()
    }
}
