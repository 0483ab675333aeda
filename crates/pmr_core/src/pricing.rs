//! Fee schedule and invoice computation for PMR assistance bookings.
//!
//! The schedule is fixed and lives here only:
//!
//! | line                      | trigger                                  | amount            |
//! |---------------------------|------------------------------------------|-------------------|
//! | base assistance fee       | assistance requested                     | 25                |
//! | multimodal surcharge      | multimodal itinerary with 2+ legs        | 15 per extra leg  |
//! | special assistance fee    | assistance requested                     | 10                |
//! | tax                       | always                                   | 20 % of subtotal  |
//!
//! Amounts are full precision; rounding to cents is a presentation concern.

use serde::{Deserialize, Serialize};

use crate::error::{PmrError, Result};

/// Flat fee charged when PMR assistance is requested.
pub const BASE_ASSISTANCE_FEE: f64 = 25.0;

/// Surcharge per leg beyond the first on a multimodal itinerary.
pub const MULTIMODAL_LEG_SURCHARGE: f64 = 15.0;

/// Second flat fee on the same trigger as [`BASE_ASSISTANCE_FEE`].
pub const SPECIAL_ASSISTANCE_FEE: f64 = 10.0;

/// VAT applied to the subtotal.
pub const TAX_RATE: f64 = 0.20;

/// Reservation attributes that drive the invoice.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TripChargeRequest {
    pub requires_assistance: bool,
    /// Number of transport segments; at least one.
    pub leg_count: u32,
    /// Not cross-checked against `leg_count`; the surcharge needs both.
    pub is_multimodal: bool,
    pub origin_label: String,
    pub destination_label: String,
}

impl TripChargeRequest {
    pub fn new(
        requires_assistance: bool,
        leg_count: u32,
        is_multimodal: bool,
        origin_label: impl Into<String>,
        destination_label: impl Into<String>,
    ) -> Result<Self> {
        if leg_count == 0 {
            return Err(PmrError::invalid_argument(
                "leg_count must be a positive integer",
            ));
        }
        Ok(Self {
            requires_assistance,
            leg_count,
            is_multimodal,
            origin_label: origin_label.into(),
            destination_label: destination_label.into(),
        })
    }
}

/// Line-itemized result of [`compute_invoice`].
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct InvoiceBreakdown {
    pub base_assistance_fee: f64,
    pub multimodal_surcharge: f64,
    pub special_assistance_fee: f64,
    pub subtotal: f64,
    pub tax_amount: f64,
    pub total_amount: f64,
    pub tax_rate: f64,
    pub description: String,
    pub leg_count: u32,
}

/// The `details` document stored next to an invoice row.
///
/// Only the lines that were actually charged are present.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct InvoiceDetails {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tarif_base: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub nb_etapes: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tarif_multimodal: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tarif_assistance_speciale: Option<f64>,
}

impl InvoiceBreakdown {
    /// Bookings without assistance produce an all-zero breakdown; whether
    /// such an invoice is persisted is up to the reservation workflow.
    pub fn is_billable(&self) -> bool {
        self.base_assistance_fee > 0.0
    }

    pub fn details(&self) -> InvoiceDetails {
        let charged = |amount: f64| (amount > 0.0).then_some(amount);
        let multimodal = charged(self.multimodal_surcharge);
        InvoiceDetails {
            tarif_base: charged(self.base_assistance_fee),
            nb_etapes: multimodal.map(|_| self.leg_count),
            tarif_multimodal: multimodal,
            tarif_assistance_speciale: charged(self.special_assistance_fee),
        }
    }
}

/// Compute the invoice for a reservation.
///
/// Total and deterministic: the same request always yields a bit-identical
/// breakdown.
pub fn compute_invoice(request: &TripChargeRequest) -> InvoiceBreakdown {
    let base_assistance_fee = if request.requires_assistance {
        BASE_ASSISTANCE_FEE
    } else {
        0.0
    };
    let multimodal_surcharge = if request.is_multimodal && request.leg_count > 1 {
        f64::from(request.leg_count - 1) * MULTIMODAL_LEG_SURCHARGE
    } else {
        0.0
    };
    let special_assistance_fee = if request.requires_assistance {
        SPECIAL_ASSISTANCE_FEE
    } else {
        0.0
    };

    let subtotal = base_assistance_fee + multimodal_surcharge + special_assistance_fee;
    let tax_amount = subtotal * TAX_RATE;
    let total_amount = subtotal + tax_amount;

    tracing::debug!(
        requires_assistance = request.requires_assistance,
        leg_count = request.leg_count,
        is_multimodal = request.is_multimodal,
        subtotal,
        total_amount,
        "computed invoice"
    );

    InvoiceBreakdown {
        base_assistance_fee,
        multimodal_surcharge,
        special_assistance_fee,
        subtotal,
        tax_amount,
        total_amount,
        tax_rate: TAX_RATE,
        description: format!(
            "Assistance PMR - {} -> {}",
            request.origin_label, request.destination_label
        ),
        leg_count: request.leg_count,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request(assistance: bool, legs: u32, multimodal: bool) -> TripChargeRequest {
        TripChargeRequest::new(assistance, legs, multimodal, "Paris", "Marseille")
            .expect("valid request")
    }

    #[test]
    fn no_assistance_single_leg_is_free() {
        let invoice = compute_invoice(&request(false, 1, false));
        assert_eq!(invoice.subtotal, 0.0);
        assert_eq!(invoice.tax_amount, 0.0);
        assert_eq!(invoice.total_amount, 0.0);
        assert!(!invoice.is_billable());
        assert_eq!(invoice.details(), InvoiceDetails::default());
    }

    #[test]
    fn assistance_single_leg_charges_both_flat_fees() {
        let invoice = compute_invoice(&request(true, 1, false));
        assert_eq!(invoice.base_assistance_fee, 25.0);
        assert_eq!(invoice.special_assistance_fee, 10.0);
        assert_eq!(invoice.multimodal_surcharge, 0.0);
        assert_eq!(invoice.subtotal, 35.0);
        assert!((invoice.tax_amount - 7.0).abs() < 1e-9);
        assert!((invoice.total_amount - 42.0).abs() < 1e-9);
        assert!(invoice.is_billable());
    }

    #[test]
    fn multimodal_surcharge_counts_extra_legs() {
        let invoice = compute_invoice(&request(true, 3, true));
        assert_eq!(invoice.multimodal_surcharge, 30.0);
        assert_eq!(invoice.subtotal, 65.0);
        assert!((invoice.tax_amount - 13.0).abs() < 1e-9);
        assert!((invoice.total_amount - 78.0).abs() < 1e-9);
    }

    #[test]
    fn multimodal_flag_without_extra_legs_adds_nothing() {
        let invoice = compute_invoice(&request(true, 1, true));
        assert_eq!(invoice.multimodal_surcharge, 0.0);
        let invoice = compute_invoice(&request(false, 4, false));
        assert_eq!(invoice.multimodal_surcharge, 0.0);
        assert_eq!(invoice.total_amount, 0.0);
    }

    #[test]
    fn multimodal_without_assistance_still_computes_surcharge() {
        let invoice = compute_invoice(&request(false, 2, true));
        assert_eq!(invoice.subtotal, 15.0);
        assert!(!invoice.is_billable());
    }

    #[test]
    fn description_names_both_ends() {
        let invoice = compute_invoice(&request(true, 1, false));
        assert_eq!(invoice.description, "Assistance PMR - Paris -> Marseille");
    }

    #[test]
    fn details_only_list_charged_lines() {
        let details = compute_invoice(&request(true, 3, true)).details();
        assert_eq!(details.tarif_base, Some(25.0));
        assert_eq!(details.nb_etapes, Some(3));
        assert_eq!(details.tarif_multimodal, Some(30.0));
        assert_eq!(details.tarif_assistance_speciale, Some(10.0));

        let json = serde_json::to_value(compute_invoice(&request(true, 1, false)).details())
            .expect("serialize");
        assert!(json.get("tarif_multimodal").is_none());
        assert!(json.get("nb_etapes").is_none());
        assert_eq!(json["tarif_base"], 25.0);
    }

    #[test]
    fn zero_legs_is_rejected() {
        let err = TripChargeRequest::new(true, 0, false, "a", "b").expect_err("zero legs");
        assert!(matches!(err, PmrError::InvalidArgument(_)));
    }

    #[test]
    fn computation_is_deterministic() {
        let req = request(true, 5, true);
        assert_eq!(compute_invoice(&req), compute_invoice(&req));
    }
}
