#![allow(dead_code)]

use pmr_core::tracking::{SnapshotSink, TaxiSnapshot, TrackingError};

/// Sink that fails once it has accepted `capacity` snapshots, standing in for
/// a store that goes away mid-ride.
#[derive(Debug, Default)]
pub struct FlakySink {
    pub accepted: Vec<TaxiSnapshot>,
    pub capacity: usize,
}

impl FlakySink {
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            accepted: Vec::new(),
            capacity,
        }
    }
}

#[derive(Debug, thiserror::Error)]
#[error("store unavailable")]
pub struct StoreUnavailable;

impl SnapshotSink for FlakySink {
    fn record(&mut self, snapshot: &TaxiSnapshot) -> Result<(), TrackingError> {
        if self.accepted.len() >= self.capacity {
            return Err(TrackingError::Sink(Box::new(StoreUnavailable)));
        }
        self.accepted.push(snapshot.clone());
        Ok(())
    }
}

pub fn approx_eq(a: f64, b: f64) -> bool {
    (a - b).abs() < 1e-9
}
