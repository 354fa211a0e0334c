//! Serial interface format negotiation.
//!
//! [`FormatNegotiator`] remembers the master clock, interface framing and
//! clock role chosen by the host, and turns a stream's rate and sample width
//! into the FM, MCLK divider and DIF register fields. Requests are validated
//! completely before the first register is touched, so a rejected request
//! leaves the chip as it was.

use embedded_hal::i2c::I2c;

use super::clock::{self, ClockEntry};
use super::regmap::RegisterMap;
use super::registers as reg;
use crate::error::{Error, Result};
use crate::variant::Variant;

// ── Public enums ───────────────────────────────────────────────────────────

/// Stream direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Direction {
    Playback,
    Capture,
}

/// Interface framing requested by the host audio framework.
///
/// The codec implements only the first three.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum DaiFormat {
    I2s,
    RightJustified,
    LeftJustified,
    DspA,
    DspB,
    Ac97,
    Pdm,
}

/// Interface framing supported by the codec.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum InterfaceFormat {
    I2s,
    LeftJustified,
    RightJustified,
}

impl InterfaceFormat {
    /// Two-bit DIF code for this framing at `width_bits`.
    pub const fn dif_code(self, width_bits: u8) -> u8 {
        match self {
            InterfaceFormat::LeftJustified => 0,
            InterfaceFormat::I2s => 1,
            InterfaceFormat::RightJustified if width_bits == 16 => 2,
            InterfaceFormat::RightJustified => 3,
        }
    }
}

impl TryFrom<DaiFormat> for InterfaceFormat {
    type Error = Error;

    fn try_from(format: DaiFormat) -> Result<Self> {
        match format {
            DaiFormat::I2s => Ok(InterfaceFormat::I2s),
            DaiFormat::LeftJustified => Ok(InterfaceFormat::LeftJustified),
            DaiFormat::RightJustified => Ok(InterfaceFormat::RightJustified),
            _ => Err(Error::InvalidFormat),
        }
    }
}

/// Which side drives the serial bit and frame clocks.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ClockRole {
    /// Codec drives the clocks.
    Master,
    /// Host drives the clocks.
    Slave,
}

/// Stream parameters handed to [`FormatNegotiator::apply_rates`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct HwParams {
    pub sample_rate_hz: u32,
    pub sample_width_bits: u8,
    pub direction: Direction,
}

/// Choices made so far by the host. `None` means not yet set.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct FormatState {
    pub master_clock_hz: Option<u32>,
    pub interface: Option<InterfaceFormat>,
    pub clock_role: Option<ClockRole>,
    pub sample_rate_hz: Option<u32>,
    pub sample_width_bits: Option<u8>,
    pub direction: Option<Direction>,
}

// ── Negotiator ─────────────────────────────────────────────────────────────

/// Maps host format requests onto the clock and interface registers.
pub struct FormatNegotiator {
    variant: &'static Variant,
    state: FormatState,
}

impl FormatNegotiator {
    pub fn new(variant: &'static Variant) -> Self {
        Self {
            variant,
            state: FormatState::default(),
        }
    }

    /// Current negotiated state.
    pub fn state(&self) -> &FormatState {
        &self.state
    }

    /// Record the master clock frequency.
    ///
    /// `0` is accepted and ignored. A frequency that no clock table entry
    /// uses is rejected and clears any previously stored master clock.
    pub fn set_clock(&mut self, master_clock_hz: u32) -> Result<()> {
        if master_clock_hz == 0 {
            #[cfg(feature = "defmt")]
            defmt::info!("cs4265: ignoring master clock 0");
            return Ok(());
        }
        if !clock::is_supported_master_clock(master_clock_hz) {
            #[cfg(feature = "defmt")]
            defmt::warn!("cs4265: invalid master clock {=u32} Hz", master_clock_hz);
            self.state.master_clock_hz = None;
            return Err(Error::InvalidClock(master_clock_hz));
        }
        self.state.master_clock_hz = Some(master_clock_hz);
        Ok(())
    }

    /// Select framing and clock role for the stream in `direction`. Writes
    /// the ADC_CTL master bit, which the serial port shares between both
    /// directions.
    pub fn set_interface_format<I2C: I2c>(
        &mut self,
        regs: &mut RegisterMap<I2C>,
        direction: Direction,
        format: DaiFormat,
        role: ClockRole,
    ) -> Result<()> {
        let interface = InterfaceFormat::try_from(format)?;
        let master = match role {
            ClockRole::Master => reg::ADC_CTL_MASTER,
            ClockRole::Slave => 0,
        };
        regs.update_bits(reg::ADC_CTL, reg::ADC_CTL_MASTER, master)?;
        self.state.interface = Some(interface);
        self.state.clock_role = Some(role);
        self.state.direction = Some(direction);
        Ok(())
    }

    /// Program speed mode, MCLK divider and DIF fields for a stream.
    ///
    /// Returns the clock table entry that was applied.
    pub fn apply_rates<I2C: I2c>(
        &mut self,
        regs: &mut RegisterMap<I2C>,
        params: HwParams,
    ) -> Result<&'static ClockEntry> {
        let interface = self.state.interface.ok_or(Error::InvalidFormat)?;
        if params.direction == Direction::Capture && interface == InterfaceFormat::RightJustified {
            return Err(Error::InvalidFormat);
        }
        let caps = &self.variant.capabilities;
        if !caps.widths.contains(&params.sample_width_bits) {
            return Err(Error::InvalidFormat);
        }
        let master_clock_hz = self.state.master_clock_hz.unwrap_or(0);
        if !caps.rates.contains(&params.sample_rate_hz) {
            return Err(Error::UnsupportedRate {
                master_clock_hz,
                sample_rate_hz: params.sample_rate_hz,
            });
        }
        let entry = clock::resolve(master_clock_hz, params.sample_rate_hz).inspect_err(|_e| {
            #[cfg(feature = "defmt")]
            defmt::warn!("cs4265: no clock setting for {=u32} Hz", params.sample_rate_hz);
        })?;

        regs.update_bits(
            reg::ADC_CTL,
            reg::ADC_CTL_FM,
            entry.speed_mode.bits() << reg::ADC_CTL_FM_SHIFT,
        )?;
        regs.update_bits(
            reg::MCLK_FREQ,
            reg::MCLK_FREQ_MASK,
            entry.divider_code << reg::MCLK_FREQ_SHIFT,
        )?;

        let dif = interface.dif_code(params.sample_width_bits);
        regs.update_bits(reg::DAC_CTL, reg::DAC_CTL_DIF, dif << reg::DAC_CTL_DIF_SHIFT)?;
        if interface != InterfaceFormat::RightJustified {
            regs.update_bits(reg::ADC_CTL, reg::ADC_CTL_DIF, dif << reg::ADC_CTL_DIF_SHIFT)?;
        }
        if self.variant.chip.has_spdif() {
            regs.update_bits(
                reg::SPDIF_CTL2,
                reg::SPDIF_CTL2_DIF,
                dif << reg::SPDIF_CTL2_DIF_SHIFT,
            )?;
        }

        #[cfg(feature = "defmt")]
        defmt::debug!(
            "cs4265: {=u32} Hz / {=u32} Hz -> fm {=u8} div {=u8} dif {=u8}",
            master_clock_hz,
            params.sample_rate_hz,
            entry.speed_mode.bits(),
            entry.divider_code,
            dif
        );

        self.state.sample_rate_hz = Some(params.sample_rate_hz);
        self.state.sample_width_bits = Some(params.sample_width_bits);
        self.state.direction = Some(params.direction);
        Ok(entry)
    }
}
