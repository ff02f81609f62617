use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

// NaN bit pattern marks "no reading published yet".
const EMPTY: u64 = 0x7ff8_0000_0000_0000;

/// Most recent ambient-light reading, shared between the sensor callback
/// (single writer) and any number of readers.
///
/// The value is stored as raw `f64` bits in one atomic word, so a reader
/// sees either the old or the new reading, never a torn one. Neither side
/// ever blocks.
#[derive(Debug, Clone)]
pub struct LuxCell {
    bits: Arc<AtomicU64>,
}

impl Default for LuxCell {
    fn default() -> Self {
        Self::new()
    }
}

impl LuxCell {
    pub fn new() -> Self {
        Self { bits: Arc::new(AtomicU64::new(EMPTY)) }
    }

    pub fn with_initial(lux: f64) -> Self {
        let cell = Self::new();
        cell.publish(lux);
        cell
    }

    /// Store a new reading. Non-finite or negative values are ignored.
    pub fn publish(&self, lux: f64) {
        if !lux.is_finite() || lux < 0.0 {
            tracing::warn!("Ignoring invalid lux reading: {}", lux);
            return;
        }
        self.bits.store(lux.to_bits(), Ordering::Release);
    }

    pub fn current(&self) -> Option<f64> {
        let value = f64::from_bits(self.bits.load(Ordering::Acquire));
        (!value.is_nan()).then_some(value)
    }

    /// Current reading, or `fallback` when the sensor has not reported yet.
    pub fn current_or(&self, fallback: f64) -> f64 {
        self.current().unwrap_or(fallback)
    }
}
