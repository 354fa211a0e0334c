//! Digital mute and bias level control.

use embedded_hal::i2c::I2c;

use super::format::Direction;
use super::regmap::RegisterMap;
use super::registers as reg;
use crate::error::Result;
use crate::variant::Variant;

/// Power state requested by the host framework.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum BiasLevel {
    Off,
    Standby,
    Prepare,
    On,
}

/// Tracks the bias level and applies mute and power-down bits.
pub struct PowerControl {
    variant: &'static Variant,
    bias: BiasLevel,
}

impl PowerControl {
    pub fn new(variant: &'static Variant) -> Self {
        Self {
            variant,
            bias: BiasLevel::Off,
        }
    }

    /// Last requested bias level.
    pub fn bias_level(&self) -> BiasLevel {
        self.bias
    }

    /// Move to `level`.
    ///
    /// `Prepare` powers the device up by clearing PDN; `Standby` and `Off`
    /// set it; `On` leaves the registers alone. Variants without bias
    /// control only record the level.
    pub fn set_bias_level<I2C: I2c>(&mut self, regs: &mut RegisterMap<I2C>, level: BiasLevel) -> Result<()> {
        if self.variant.capabilities.bias_control {
            match level {
                BiasLevel::On => {}
                BiasLevel::Prepare => {
                    regs.update_bits(reg::PWRCTL, reg::PWRCTL_PDN, 0)?;
                }
                BiasLevel::Standby | BiasLevel::Off => {
                    regs.update_bits(reg::PWRCTL, reg::PWRCTL_PDN, reg::PWRCTL_PDN)?;
                }
            }
        }
        self.bias = level;
        Ok(())
    }

    /// Apply a digital mute request for one stream direction.
    ///
    /// Sets or clears the DAC mute bit and the chip's secondary mute bit
    /// (S/PDIF transmitter on the CS4265, ADC on the CS4245). The CS4265
    /// has no capture mute; capture requests are ignored there.
    pub fn mute_stream<I2C: I2c>(
        &mut self,
        regs: &mut RegisterMap<I2C>,
        muted: bool,
        direction: Direction,
    ) -> Result<()> {
        let chip = self.variant.chip;
        if direction == Direction::Capture && !chip.capture_mute() {
            return Ok(());
        }
        let (second_reg, second_bit) = chip.secondary_mute();
        regs.update_bits(reg::DAC_CTL, reg::DAC_CTL_MUTE, if muted { reg::DAC_CTL_MUTE } else { 0 })?;
        regs.update_bits(second_reg, second_bit, if muted { second_bit } else { 0 })?;
        Ok(())
    }

    /// Whether the DAC mute bit is currently set.
    pub fn is_muted<I2C: I2c>(&self, regs: &mut RegisterMap<I2C>) -> Result<bool> {
        Ok(regs.read(reg::DAC_CTL)? & reg::DAC_CTL_MUTE != 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codec::registers::{CS4245_REGISTERS, CS4265_REGISTERS};
    use crate::mock::MockI2c;
    use crate::variant::{CS4265_GENERIC, MOD_DUO, MOD_DWARF};

    fn map(i2c: &MockI2c, specs: &'static [crate::codec::regmap::RegisterSpec]) -> RegisterMap<MockI2c> {
        let mut map = RegisterMap::new(i2c.clone(), reg::CS4265_I2C_ADDR_AD0_LOW, specs);
        map.seed_defaults();
        map
    }

    #[test]
    fn bias_prepare_clears_pdn_and_standby_sets_it() {
        let i2c = MockI2c::new();
        let mut regs = map(&i2c, &CS4265_REGISTERS);
        let mut power = PowerControl::new(&CS4265_GENERIC);
        power.set_bias_level(&mut regs, BiasLevel::Prepare).unwrap();
        assert_eq!(regs.cached(reg::PWRCTL), Some(0x0E));
        power.set_bias_level(&mut regs, BiasLevel::On).unwrap();
        assert_eq!(i2c.writes().len(), 1);
        power.set_bias_level(&mut regs, BiasLevel::Standby).unwrap();
        assert_eq!(regs.cached(reg::PWRCTL), Some(0x0F));
        assert_eq!(power.bias_level(), BiasLevel::Standby);
    }

    #[test]
    fn bias_without_control_only_records() {
        let i2c = MockI2c::new();
        let mut regs = map(&i2c, &CS4265_REGISTERS);
        let mut power = PowerControl::new(&MOD_DWARF);
        power.set_bias_level(&mut regs, BiasLevel::Prepare).unwrap();
        assert!(i2c.writes().is_empty());
        assert_eq!(power.bias_level(), BiasLevel::Prepare);
    }

    #[test]
    fn cs4265_mutes_dac_and_spdif() {
        let i2c = MockI2c::new();
        let mut regs = map(&i2c, &CS4265_REGISTERS);
        let mut power = PowerControl::new(&CS4265_GENERIC);
        power.mute_stream(&mut regs, true, Direction::Playback).unwrap();
        assert_eq!(i2c.writes(), [(reg::DAC_CTL, 0x0C), (reg::SPDIF_CTL2, 0x10)]);
        assert!(power.is_muted(&mut regs).unwrap());
        power.mute_stream(&mut regs, false, Direction::Playback).unwrap();
        assert_eq!(regs.cached(reg::DAC_CTL), Some(0x08));
        assert_eq!(regs.cached(reg::SPDIF_CTL2), Some(0x00));
    }

    #[test]
    fn cs4265_ignores_capture_mute() {
        let i2c = MockI2c::new();
        let mut regs = map(&i2c, &CS4265_REGISTERS);
        let mut power = PowerControl::new(&CS4265_GENERIC);
        power.mute_stream(&mut regs, true, Direction::Capture).unwrap();
        assert!(i2c.writes().is_empty());
    }

    #[test]
    fn cs4245_mutes_dac_and_adc_in_both_directions() {
        let i2c = MockI2c::new();
        let mut regs = map(&i2c, &CS4245_REGISTERS);
        let mut power = PowerControl::new(&MOD_DUO);
        power.mute_stream(&mut regs, true, Direction::Capture).unwrap();
        assert_eq!(i2c.writes(), [(reg::DAC_CTL, 0x0C), (reg::ADC_CTL, 0x04)]);
    }
}
