//! Invoice rows built from an [`InvoiceBreakdown`].
//!
//! The record serializes with the column names of the external `factures`
//! table so a reservation workflow can insert it as-is.

use std::fmt;

use chrono::{DateTime, Duration, Utc};
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::error::{PmrError, Result};
use crate::pricing::{InvoiceBreakdown, InvoiceDetails};

/// Days between issue and due date.
pub const PAYMENT_TERM_DAYS: i64 = 30;

const NUMBER_PREFIX: &str = "FACT";
const NUMBER_SUFFIX_LEN: usize = 5;
const BASE36: &[u8; 36] = b"0123456789ABCDEFGHIJKLMNOPQRSTUVWXYZ";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum InvoiceStatus {
    #[serde(rename = "en_attente")]
    Pending,
    #[serde(rename = "payee")]
    Paid,
    #[serde(rename = "annulee")]
    Cancelled,
}

impl InvoiceStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "en_attente",
            Self::Paid => "payee",
            Self::Cancelled => "annulee",
        }
    }
}

impl fmt::Display for InvoiceStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InvoiceRecord {
    #[serde(rename = "num_facture")]
    pub number: String,
    #[serde(rename = "montant_ht")]
    pub amount_excl_tax: f64,
    #[serde(rename = "montant_tva")]
    pub tax_amount: f64,
    #[serde(rename = "montant_ttc")]
    pub amount_incl_tax: f64,
    #[serde(rename = "statut")]
    pub status: InvoiceStatus,
    #[serde(rename = "date_echeance")]
    pub due_date: DateTime<Utc>,
    pub description: String,
    pub details: InvoiceDetails,
}

impl InvoiceRecord {
    /// Draft a pending invoice issued at `issued_at`.
    pub fn draft<R: Rng + ?Sized>(
        breakdown: &InvoiceBreakdown,
        issued_at: DateTime<Utc>,
        rng: &mut R,
    ) -> Self {
        let record = Self {
            number: invoice_number(issued_at, rng),
            amount_excl_tax: breakdown.subtotal,
            tax_amount: breakdown.tax_amount,
            amount_incl_tax: breakdown.total_amount,
            status: InvoiceStatus::Pending,
            due_date: issued_at + Duration::days(PAYMENT_TERM_DAYS),
            description: breakdown.description.clone(),
            details: breakdown.details(),
        };
        tracing::debug!(number = %record.number, total = record.amount_incl_tax, "drafted invoice");
        record
    }

    pub fn mark_paid(&mut self) -> Result<()> {
        self.transition(InvoiceStatus::Paid)
    }

    pub fn cancel(&mut self) -> Result<()> {
        self.transition(InvoiceStatus::Cancelled)
    }

    fn transition(&mut self, next: InvoiceStatus) -> Result<()> {
        if self.status != InvoiceStatus::Pending {
            return Err(PmrError::InvoiceNotPending(self.status));
        }
        tracing::info!(number = %self.number, status = %next, "invoice status changed");
        self.status = next;
        Ok(())
    }
}

/// `FACT-{epoch ms}-{5 base-36 chars}`.
pub fn invoice_number<R: Rng + ?Sized>(issued_at: DateTime<Utc>, rng: &mut R) -> String {
    let suffix: String = (0..NUMBER_SUFFIX_LEN)
        .map(|_| char::from(BASE36[rng.gen_range(0..BASE36.len())]))
        .collect();
    format!("{NUMBER_PREFIX}-{}-{suffix}", issued_at.timestamp_millis())
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    use super::*;
    use crate::pricing::{compute_invoice, TripChargeRequest};

    fn issued_at() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 3, 1, 9, 30, 0)
            .single()
            .expect("valid timestamp")
    }

    fn draft() -> InvoiceRecord {
        let request =
            TripChargeRequest::new(true, 2, true, "Paris", "Lyon").expect("valid request");
        let mut rng = StdRng::seed_from_u64(7);
        InvoiceRecord::draft(&compute_invoice(&request), issued_at(), &mut rng)
    }

    #[test]
    fn draft_copies_amounts_and_sets_due_date() {
        let record = draft();
        assert_eq!(record.amount_excl_tax, 50.0);
        assert!((record.tax_amount - 10.0).abs() < 1e-9);
        assert!((record.amount_incl_tax - 60.0).abs() < 1e-9);
        assert_eq!(record.status, InvoiceStatus::Pending);
        assert_eq!(record.due_date, issued_at() + Duration::days(30));
        assert_eq!(record.details.nb_etapes, Some(2));
    }

    #[test]
    fn number_has_prefix_timestamp_and_suffix() {
        let record = draft();
        let parts: Vec<&str> = record.number.split('-').collect();
        assert_eq!(parts.len(), 3);
        assert_eq!(parts[0], "FACT");
        assert_eq!(parts[1], issued_at().timestamp_millis().to_string());
        assert_eq!(parts[2].len(), 5);
        assert!(parts[2]
            .chars()
            .all(|c| c.is_ascii_digit() || c.is_ascii_uppercase()));
    }

    #[test]
    fn seeded_numbers_are_reproducible() {
        assert_eq!(draft().number, draft().number);
    }

    #[test]
    fn only_pending_invoices_change_status() {
        let mut record = draft();
        record.mark_paid().expect("pending invoice can be paid");
        assert_eq!(record.status, InvoiceStatus::Paid);
        assert_eq!(
            record.cancel(),
            Err(PmrError::InvoiceNotPending(InvoiceStatus::Paid))
        );

        let mut record = draft();
        record.cancel().expect("pending invoice can be cancelled");
        assert!(record.mark_paid().is_err());
    }

    #[test]
    fn serializes_with_table_column_names() {
        let json = serde_json::to_value(draft()).expect("serialize");
        assert_eq!(json["statut"], "en_attente");
        assert_eq!(json["montant_ht"], 50.0);
        assert!(json["num_facture"].as_str().expect("number").starts_with("FACT-"));
        assert_eq!(json["details"]["tarif_multimodal"], 15.0);
    }
}
