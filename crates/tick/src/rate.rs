use crate::error::TickError;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

/// Lowest accepted frequency. Anything slower would overflow `Duration`
/// arithmetic long before it is useful as a tick rate.
pub const MIN_FREQUENCY_HZ: f64 = 1e-3;

/// Shared, validated target frequency.
///
/// Clones observe the same value, so a rate handed to a scheduler on another
/// thread can be retuned from the render thread. Schedulers latch the value
/// in `start()`, which means a change never affects a tick already in flight.
#[derive(Debug, Clone)]
pub struct TickRate {
    bits: Arc<AtomicU64>,
}

impl TickRate {
    pub fn new(hz: f64) -> Result<Self, TickError> {
        let hz = validate_frequency(hz)?;
        Ok(Self {
            bits: Arc::new(AtomicU64::new(hz.to_bits())),
        })
    }

    /// Replace the target frequency. On error the previous value is kept.
    pub fn set(&self, hz: f64) -> Result<(), TickError> {
        let hz = validate_frequency(hz)?;
        let old = f64::from_bits(self.bits.swap(hz.to_bits(), Ordering::AcqRel));
        if old != hz {
            tracing::debug!(old_hz = old, new_hz = hz, "tick rate changed");
        }
        Ok(())
    }

    pub fn hz(&self) -> f64 {
        f64::from_bits(self.bits.load(Ordering::Acquire))
    }

    pub fn period(&self) -> Duration {
        Duration::from_secs_f64(1.0 / self.hz())
    }
}

fn validate_frequency(hz: f64) -> Result<f64, TickError> {
    if hz.is_finite() && hz >= MIN_FREQUENCY_HZ {
        Ok(hz)
    } else {
        Err(TickError::InvalidFrequency(hz))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_non_positive_and_non_finite() {
        for hz in [0.0, -1.0, -45.0, f64::NAN, f64::INFINITY, f64::NEG_INFINITY, 1e-9] {
            assert!(
                matches!(TickRate::new(hz), Err(TickError::InvalidFrequency(_))),
                "{hz} should be rejected"
            );
        }
    }

    #[test]
    fn failed_set_keeps_previous_value() {
        let rate = TickRate::new(45.0).unwrap();
        assert!(rate.set(0.0).is_err());
        assert_eq!(rate.hz(), 45.0);
    }

    #[test]
    fn clones_share_the_value() {
        let rate = TickRate::new(45.0).unwrap();
        let other = rate.clone();
        other.set(144.0).unwrap();
        assert_eq!(rate.hz(), 144.0);
    }

    #[test]
    fn period_is_reciprocal() {
        let rate = TickRate::new(50.0).unwrap();
        assert!((rate.period().as_secs_f64() - 0.020).abs() < 1e-8);
    }
}
