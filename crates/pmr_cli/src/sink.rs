use std::io::Write;

use pmr_core::tracking::{SnapshotSink, TaxiSnapshot, TrackingError};

/// Writes each persisted snapshot as one JSON document per line.
pub struct JsonLinesSink<W: Write> {
    writer: W,
    written: usize,
}

impl<W: Write> JsonLinesSink<W> {
    pub fn new(writer: W) -> Self {
        Self { writer, written: 0 }
    }

    pub fn written(&self) -> usize {
        self.written
    }

    #[cfg(test)]
    pub fn into_inner(self) -> W {
        self.writer
    }
}

impl<W: Write> SnapshotSink for JsonLinesSink<W> {
    fn record(&mut self, snapshot: &TaxiSnapshot) -> Result<(), TrackingError> {
        let line =
            serde_json::to_string(snapshot).map_err(|error| TrackingError::Sink(Box::new(error)))?;
        writeln!(self.writer, "{line}").map_err(|error| TrackingError::Sink(Box::new(error)))?;
        self.writer
            .flush()
            .map_err(|error| TrackingError::Sink(Box::new(error)))?;
        self.written += 1;
        Ok(())
    }
}
