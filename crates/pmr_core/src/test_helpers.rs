//! Test helpers for common fixtures shared by unit, integration and bench code.

use crate::geo::GeoPoint;
use crate::pricing::TripChargeRequest;
use crate::taxi::{TaxiSimulationSession, TaxiSimulator};

/// Paris, Hôtel de Ville area.
pub const PARIS: (f64, f64) = (48.8566, 2.3522);

/// Marseille, Vieux-Port area. About 660 km from [`PARIS`].
pub const MARSEILLE: (f64, f64) = (43.2965, 5.3698);

/// Paris, Gare du Nord area. A short same-city ride from [`PARIS`].
pub const GARE_DU_NORD: (f64, f64) = (48.8747, 2.3464);

/// # Panics
///
/// Panics if the coordinates are out of range.
pub fn point((latitude, longitude): (f64, f64)) -> GeoPoint {
    GeoPoint::new(latitude, longitude).expect("fixture coordinates should be valid")
}

/// Build a charge request between two fixed labels.
///
/// # Panics
///
/// Panics if `leg_count` is zero.
pub fn charge_request(
    requires_assistance: bool,
    leg_count: u32,
    is_multimodal: bool,
) -> TripChargeRequest {
    TripChargeRequest::new(
        requires_assistance,
        leg_count,
        is_multimodal,
        "Paris Gare de Lyon",
        "Marseille Saint-Charles",
    )
    .expect("fixture request should be valid")
}

/// A running 25 minute Paris ride on the default 100 tick schedule.
///
/// # Panics
///
/// Panics if the default simulator rejects the fixture.
pub fn running_city_ride() -> TaxiSimulationSession {
    TaxiSimulator::default()
        .start(point(PARIS), point(GARE_DU_NORD), 25.0)
        .expect("fixture ride should start")
}
