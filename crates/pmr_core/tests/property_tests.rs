use pmr_core::geo::{distance_km, GeoPoint};
use pmr_core::pricing::{compute_invoice, TripChargeRequest};
use pmr_core::taxi::{SessionStatus, TaxiSimulator};
use proptest::prelude::*;

fn geo_point() -> impl Strategy<Value = GeoPoint> {
    (-90.0f64..=90.0, -180.0f64..=180.0)
        .prop_map(|(lat, lng)| GeoPoint::new(lat, lng).expect("strategy stays in range"))
}

fn city_point() -> impl Strategy<Value = GeoPoint> {
    (48.80f64..48.90, 2.25f64..2.42)
        .prop_map(|(lat, lng)| GeoPoint::new(lat, lng).expect("strategy stays in range"))
}

proptest! {
    #[test]
    fn invoice_totals_are_consistent(
        assistance in any::<bool>(),
        legs in 1u32..50,
        multimodal in any::<bool>(),
    ) {
        let request = TripChargeRequest::new(assistance, legs, multimodal, "A", "B").unwrap();
        let invoice = compute_invoice(&request);
        prop_assert!((invoice.total_amount - (invoice.subtotal + invoice.tax_amount)).abs() < 1e-9);
        prop_assert!((invoice.tax_amount - invoice.subtotal * 0.20).abs() < 1e-9);
        prop_assert!(invoice.subtotal >= 0.0);
        prop_assert_eq!(invoice.clone(), compute_invoice(&request));
    }

    #[test]
    fn distance_is_symmetric_and_non_negative(a in geo_point(), b in geo_point()) {
        let ab = distance_km(&a, &b);
        let ba = distance_km(&b, &a);
        prop_assert!(ab >= 0.0);
        prop_assert!((ab - ba).abs() < 1e-6);
        prop_assert_eq!(distance_km(&a, &a), 0.0);
    }

    #[test]
    fn advancing_never_moves_backwards(
        origin in city_point(),
        destination in city_point(),
        eta in 1.0f64..120.0,
        steps in prop::collection::vec(1u32..15, 1..40),
    ) {
        let simulator = TaxiSimulator::default();
        let mut session = simulator.start(origin, destination, eta).unwrap();
        for step in steps {
            if session.status() == SessionStatus::Arrived {
                break;
            }
            let next = simulator.advance(&session, step).unwrap();
            prop_assert!(next.progress_percent() >= session.progress_percent());
            prop_assert!(next.remaining_eta_minutes() <= session.remaining_eta_minutes());
            prop_assert!(next.progress_percent() <= 100.0);
            prop_assert!(next.remaining_eta_minutes() >= 0.0);
            session = next;
        }
    }
}
