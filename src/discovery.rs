//! Display discovery: run detection and parse the result.
//!
//! [`DisplayDiscovery`] is the only component that runs `ddcutil detect`.
//! Detection reads every candidate I2C bus, so two overlapping runs have no
//! defined combined behavior; an atomic in-flight flag rejects the second
//! caller instead.

use crate::display::{parse_detect, DisplayRecord};
use crate::traits::DdcBackend;
use log::{debug, info};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Errors from a discovery pass.
#[derive(Debug, thiserror::Error)]
pub enum DiscoveryError {
    /// Another discovery is already in flight; retry after it completes.
    #[error("discovery already in progress")]
    InProgress,

    /// The detection command failed; the message carries its diagnostic
    /// output.
    #[error("detect failed: {0}")]
    Detect(String),
}

/// Enumerates controllable displays through a [`DdcBackend`].
pub struct DisplayDiscovery<B> {
    backend: Arc<B>,
    in_flight: AtomicBool,
}

impl<B: DdcBackend> DisplayDiscovery<B> {
    /// Create a discovery handle over `backend`.
    pub fn new(backend: Arc<B>) -> Self {
        Self {
            backend,
            in_flight: AtomicBool::new(false),
        }
    }

    /// Run one detection pass and return the records in appearance order.
    ///
    /// Fails fast with [`DiscoveryError::InProgress`] if another call is
    /// still running; the backend is not touched in that case. Backend
    /// failures surface as [`DiscoveryError::Detect`] and leave it to the
    /// caller to keep whatever display set it already has.
    pub fn discover(&self) -> Result<Vec<DisplayRecord>, DiscoveryError> {
        if self.in_flight.swap(true, Ordering::SeqCst) {
            return Err(DiscoveryError::InProgress);
        }

        let result = self.backend.detect();
        self.in_flight.store(false, Ordering::SeqCst);

        let text = result.map_err(|e| DiscoveryError::Detect(e.to_string()))?;
        let records = parse_detect(&text);
        info!(
            "discovered {} display(s), {} controllable",
            records.len(),
            records.iter().filter(|r| r.controllable()).count()
        );
        for record in &records {
            debug!("  {:?}", record);
        }
        Ok(records)
    }
}
