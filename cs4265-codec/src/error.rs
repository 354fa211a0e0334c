//! Error type shared by every operation in the crate.

use embedded_hal::{digital, i2c};

/// Convenience alias used throughout the crate.
pub type Result<T> = core::result::Result<T, Error>;

/// Failure outcome of a codec or discrete-line operation.
///
/// Every error is reported synchronously by the call that triggered it. The
/// core never retries; a failed bus or line transfer leaves the previously
/// cached register value and shadow state in place.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Error {
    /// No clock table entry matches the requested master clock and rate.
    #[error("no clock setting for {sample_rate_hz} Hz with a {master_clock_hz} Hz master clock")]
    UnsupportedRate {
        /// Master clock in effect (0 when unset).
        master_clock_hz: u32,
        /// Requested sample rate.
        sample_rate_hz: u32,
    },
    /// The master clock frequency is not used by any clock table entry.
    #[error("unsupported master clock {0} Hz")]
    InvalidClock(u32),
    /// Interface format, sample width or direction cannot be used together.
    #[error("unsupported interface format")]
    InvalidFormat,
    /// Register transfer on the control bus failed.
    #[error("control bus error: {0}")]
    Bus(i2c::ErrorKind),
    /// Driving a discrete control line failed.
    #[error("control line error: {0}")]
    Line(digital::ErrorKind),
    /// Discrete control lines were not provided at attach time.
    #[error("discrete control lines unavailable")]
    LineUnavailable,
    /// Register address is outside the map or cannot be read.
    #[error("register 0x{0:02x} is not accessible")]
    InvalidRegister(u8),
    /// The chip id register did not identify the expected part.
    #[error("unexpected chip id 0x{found:02x}")]
    UnknownDevice {
        /// Part id nibble read from the chip.
        found: u8,
    },
    /// A control value is outside its documented range.
    #[error("value out of range")]
    OutOfRange,
    /// The control is not present on this hardware variant.
    #[error("control not available on this variant")]
    UnknownControl,
    /// The value kind does not match the control kind.
    #[error("control value has the wrong type")]
    TypeMismatch,
}

impl Error {
    pub(crate) fn bus<E: i2c::Error>(err: E) -> Self {
        Error::Bus(err.kind())
    }

    pub(crate) fn line<E: digital::Error>(err: E) -> Self {
        Error::Line(err.kind())
    }
}
