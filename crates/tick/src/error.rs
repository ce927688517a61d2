use crate::rate::MIN_FREQUENCY_HZ;

/// Errors raised when configuring a tick rate.
#[derive(Debug, Clone, Copy, PartialEq, thiserror::Error)]
pub enum TickError {
    #[error("invalid tick frequency {0} Hz (must be finite and >= {min} Hz)", min = MIN_FREQUENCY_HZ)]
    InvalidFrequency(f64),
}
