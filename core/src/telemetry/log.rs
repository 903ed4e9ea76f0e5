use log::{info, warn};

/// Thin facade the correlation steps log through.
pub struct LogManager;

impl LogManager {
    pub fn new() -> Self {
        Self
    }

    pub fn record(&self, message: &str) {
        info!("{}", message);
    }

    /// Row-level trouble that does not abort the batch.
    pub fn flag(&self, message: &str) {
        warn!("{}", message);
    }
}

impl Default for LogManager {
    fn default() -> Self {
        Self::new()
    }
}
