//! # cs4265-codec
//!
//! A `no_std` control core for the Cirrus Logic CS4265 and CS4245 audio
//! codecs and the discrete analog hardware that MOD Devices boards wrap
//! around them: a stepped headphone volume device, input gain stages,
//! true-bypass relays and CV / expression pedal routing.
//!
//! The crate drives the codec over [`embedded_hal::i2c::I2c`] and the discrete
//! lines over [`embedded_hal::digital::OutputPin`]. It never touches the audio
//! data path; the host's serial audio interface moves samples while this
//! crate keeps the codec configured to match it.
//!
//! ## Architecture
//!
//! | Layer | Module | Purpose |
//! |-------|--------|---------|
//! | Registers | [`codec::regmap`] / [`codec::registers`] | Cached register access and layout |
//! | Clocking | [`codec::clock`] / [`codec::format`] | MCLK/rate table, interface negotiation |
//! | Power | [`codec::power`] | Digital mute and bias level |
//! | Discrete | [`discrete`] | Volume stepper, gain stages, bypass, pedal routing |
//! | Boards | [`variant`] | Per-product register values, capabilities, controls |
//! | Controls | [`control`] | Named mixer controls over all of the above |
//! | Device | [`Codec`] | Ties everything to one attached chip |
//!
//! ## Quick start
//!
//! ```ignore
//! use cs4265_codec::{Codec, ControlId, ControlSurface, ControlValue, MOD_DWARF};
//! use cs4265_codec::codec::{ClockRole, DaiFormat, Direction, HwParams};
//! use cs4265_codec::discrete::DiscreteLines;
//!
//! let lines = DiscreteLines::new(hp_clk, hp_dir, [gain_l1, gain_l2], [gain_r1, gain_r2]);
//! let mut codec = Codec::new(i2c, delay, 0x4E, &MOD_DWARF, Some(reset), Some(lines));
//! codec.attach()?;
//!
//! codec.set_sysclk(24_576_000)?;
//! codec.set_fmt(Direction::Playback, DaiFormat::I2s, ClockRole::Slave)?;
//! codec.hw_params(HwParams { sample_rate_hz: 48_000, sample_width_bits: 24, direction: Direction::Playback })?;
//! codec.set_mute(false)?;
//!
//! // 0 dB on the headphone output
//! codec.set(ControlId::HeadphoneVolume, ControlValue::Integer(11))?;
//! ```
//!
//! ## Features
//!
//! | Feature | Default | Enables |
//! |---------|---------|---------|
//! | `defmt` | no | `defmt` logging and `defmt::Format` on public types |

#![no_std]

pub mod codec;
pub mod constants;
pub mod control;
pub mod discrete;
pub mod error;
pub mod variant;

#[cfg(test)]
mod mock;

pub use codec::Codec;
pub use control::{ControlId, ControlInfo, ControlKind, ControlSurface, ControlValue, DbScale};
pub use error::{Error, Result};
pub use variant::{Variant, CS4245_GENERIC, CS4265_GENERIC, MOD_DUO, MOD_DUOX, MOD_DWARF};
