//! CS4265 / CS4245 codec driver.
//!
//! ## Components
//!
//! | Item | Description |
//! |------|-------------|
//! | [`Codec`] | Device context: attach, stream setup, mute, bias, controls |
//! | [`RegisterMap`] | Cached 8-bit register access over I2C |
//! | [`FormatNegotiator`] | Clock, framing and rate negotiation |
//! | [`PowerControl`] | Digital mute and bias level |
//! | [`clock`] | Master clock / sample rate table |
//!
//! The two parts share the register layout up to 0x10. The CS4265 adds an
//! S/PDIF transmitter; the CS4245 swaps the DAC volume registers and mutes
//! capture together with playback.

pub mod clock;
mod device;
pub mod format;
pub mod power;
pub mod registers;
pub mod regmap;

pub use clock::{resolve, ClockEntry, SpeedMode, CLOCK_TABLE};
pub use device::Codec;
pub use format::{ClockRole, DaiFormat, Direction, FormatNegotiator, FormatState, HwParams, InterfaceFormat};
pub use power::{BiasLevel, PowerControl};
pub use registers::Chip;
pub use regmap::{RegisterMap, RegisterSpec};
