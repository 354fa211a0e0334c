//! CS4265 / CS4245 device context.
//!
//! [`Codec`] owns the control bus, the optional reset line and the discrete
//! lines of one board, plus every piece of state derived from them. All entry
//! points take `&mut self`; the host serializes calls per device.
//!
//! # Example
//!
//! ```ignore
//! let lines = DiscreteLines::new(clk, dir, [gl1, gl2], [gr1, gr2])
//!     .with_true_bypass(byl, byr);
//! let mut codec = Codec::new(i2c, delay, Codec::DEFAULT_ADDRESS, &MOD_DUO, Some(reset), Some(lines));
//! codec.attach()?;
//! codec.set_sysclk(24_576_000)?;
//! codec.set_fmt(Direction::Playback, DaiFormat::I2s, ClockRole::Slave)?;
//! codec.hw_params(HwParams { sample_rate_hz: 48_000, sample_width_bits: 24, direction: Direction::Playback })?;
//! codec.set(ControlId::HeadphoneVolume, ControlValue::Integer(11))?;
//! ```

use embedded_hal::delay::DelayNs;
use embedded_hal::digital::OutputPin;
use embedded_hal::i2c::I2c;

use super::clock::ClockEntry;
use super::format::{ClockRole, DaiFormat, Direction, FormatNegotiator, FormatState, HwParams};
use super::power::{BiasLevel, PowerControl};
use super::regmap::RegisterMap;
use super::registers as reg;
use crate::constants::{GAIN_STAGES, HEADPHONE_VOLUME_MAX, RESET_HOLD_MS};
use crate::control::{self, Binding, ControlId, ControlInfo, ControlKind, ControlSurface, ControlValue};
use crate::discrete::{lines, Channel, DiscreteCaps, DiscreteEngine, DiscreteLines, PedalConsumer, PedalSignal};
use crate::error::{Error, Result};
use crate::variant::Variant;

const NO_DISCRETE: DiscreteCaps = DiscreteCaps {
    volume_steps: 0,
    true_bypass: false,
    cv_exp_pedal: false,
};

/// One codec and the discrete hardware around it.
pub struct Codec<I2C, D, P> {
    regs: RegisterMap<I2C>,
    delay: D,
    variant: &'static Variant,
    format: FormatNegotiator,
    power: PowerControl,
    discrete: DiscreteEngine<P>,
    reset: Option<P>,
    revision: Option<u8>,
}

impl<I2C, D, P> Codec<I2C, D, P>
where
    I2C: I2c,
    D: DelayNs,
    P: OutputPin,
{
    /// Default CS4265 address (AD0 low).
    pub const DEFAULT_ADDRESS: u8 = reg::CS4265_I2C_ADDR_AD0_LOW;

    /// Build the device context. No bus or line traffic happens until
    /// [`attach`](Self::attach).
    pub fn new(
        i2c: I2C,
        delay: D,
        address: u8,
        variant: &'static Variant,
        reset: Option<P>,
        lines: Option<DiscreteLines<P>>,
    ) -> Self {
        Self {
            regs: RegisterMap::new(i2c, address, variant.chip.registers()),
            delay,
            variant,
            format: FormatNegotiator::new(variant),
            power: PowerControl::new(variant),
            discrete: DiscreteEngine::new(lines, variant.discrete.unwrap_or(NO_DISCRETE)),
            reset,
            revision: None,
        }
    }

    // ── Attach / detach ────────────────────────────────────────────────

    /// Bring the device up.
    ///
    /// Pulses the reset line, seeds the register cache, checks the chip id,
    /// writes the variant's register values and calibrates the discrete
    /// hardware. Missing discrete lines are not an error; the engine then
    /// tracks settings without driving anything.
    pub fn attach(&mut self) -> Result<()> {
        if let Some(reset) = self.reset.as_mut() {
            lines::drive(reset, false)?;
            self.delay.delay_ms(RESET_HOLD_MS);
            lines::drive(reset, true)?;
        }

        self.regs.seed_defaults();

        let id = self.regs.read(reg::CHIP_ID)?;
        let part = id & reg::CHIP_ID_PART_MASK;
        if part != self.variant.chip.part_id() {
            #[cfg(feature = "defmt")]
            defmt::error!(
                "cs4265: part id {=u8:#x}, expected {=u8:#x}",
                part >> 4,
                self.variant.chip.part_id() >> 4
            );
            return Err(Error::UnknownDevice { found: part });
        }
        let revision = id & reg::CHIP_ID_REV_MASK;
        self.revision = Some(revision);

        #[cfg(feature = "defmt")]
        defmt::info!("cs4265: {=str} revision {=u8:x}", self.variant.name, revision);

        for &(r, value) in self.variant.init_writes {
            self.regs.write(r, value)?;
        }

        if self.variant.discrete.is_some() {
            self.discrete.init()?;
        }
        Ok(())
    }

    /// Hold the chip in reset. The context can be re-attached afterwards.
    ///
    /// Negotiated clock and interface choices, the bias level and the
    /// discrete shadow state are dropped along with the register cache; the
    /// host configures the stream again after the next attach.
    pub fn detach(&mut self) -> Result<()> {
        if let Some(reset) = self.reset.as_mut() {
            lines::drive(reset, false)?;
        }
        self.revision = None;
        self.regs.invalidate_cache();
        self.format = FormatNegotiator::new(self.variant);
        self.power = PowerControl::new(self.variant);
        self.discrete.reset_state();
        Ok(())
    }

    /// Give back the bus, delay, reset line and discrete lines.
    pub fn release(self) -> (I2C, D, Option<P>, Option<DiscreteLines<P>>) {
        (self.regs.release(), self.delay, self.reset, self.discrete.release())
    }

    // ── Accessors ──────────────────────────────────────────────────────

    pub fn variant(&self) -> &'static Variant {
        self.variant
    }

    /// Silicon revision read at attach, `None` before.
    pub fn revision(&self) -> Option<u8> {
        self.revision
    }

    pub fn format_state(&self) -> &FormatState {
        self.format.state()
    }

    pub fn bias_level(&self) -> BiasLevel {
        self.power.bias_level()
    }

    /// Raw register access.
    pub fn registers(&mut self) -> &mut RegisterMap<I2C> {
        &mut self.regs
    }

    /// Direct access to the discrete engine.
    pub fn discrete(&mut self) -> &mut DiscreteEngine<P> {
        &mut self.discrete
    }

    // ── Stream configuration ───────────────────────────────────────────

    /// Set the master clock frequency (0 is ignored).
    pub fn set_sysclk(&mut self, master_clock_hz: u32) -> Result<()> {
        self.format.set_clock(master_clock_hz)
    }

    /// Set interface framing and clock role.
    pub fn set_fmt(&mut self, direction: Direction, format: DaiFormat, role: ClockRole) -> Result<()> {
        self.format.set_interface_format(&mut self.regs, direction, format, role)
    }

    /// Program clocking and framing for a stream.
    pub fn hw_params(&mut self, params: HwParams) -> Result<&'static ClockEntry> {
        self.format.apply_rates(&mut self.regs, params)
    }

    /// Digital mute for one stream direction.
    pub fn mute_stream(&mut self, muted: bool, direction: Direction) -> Result<()> {
        self.power.mute_stream(&mut self.regs, muted, direction)
    }

    /// Playback mute.
    pub fn set_mute(&mut self, muted: bool) -> Result<()> {
        self.mute_stream(muted, Direction::Playback)
    }

    pub fn is_muted(&mut self) -> Result<bool> {
        self.power.is_muted(&mut self.regs)
    }

    pub fn set_bias_level(&mut self, level: BiasLevel) -> Result<()> {
        self.power.set_bias_level(&mut self.regs, level)
    }

    // ── Pedal events ───────────────────────────────────────────────────

    /// Record whether the pedal flag interrupt was attached.
    pub fn set_flag_irq_available(&mut self, available: bool) {
        self.discrete.set_flag_irq_available(available);
    }

    /// Apply every queued pedal event. Returns how many were handled.
    pub fn process_events<const N: usize>(&mut self, events: &mut PedalConsumer<'_, N>) -> Result<usize> {
        let mut handled = 0;
        while let Some(event) = events.dequeue() {
            self.discrete.handle_event(event)?;
            handled += 1;
        }
        Ok(handled)
    }

    // ── Control helpers ────────────────────────────────────────────────

    fn check_control(&self, id: ControlId) -> Result<()> {
        if self.variant.has_control(id) {
            Ok(())
        } else {
            Err(Error::UnknownControl)
        }
    }

    fn get_discrete(&self, id: ControlId) -> ControlValue {
        let e = &self.discrete;
        match id {
            ControlId::HeadphoneVolume => ControlValue::Integer(e.volume() as i32),
            ControlId::LeftGainStage => ControlValue::Integer(e.gain_stage(Channel::Left) as i32),
            ControlId::RightGainStage => ControlValue::Integer(e.gain_stage(Channel::Right) as i32),
            ControlId::LeftTrueBypass => ControlValue::Boolean(e.bypass(Channel::Left)),
            ControlId::RightTrueBypass => ControlValue::Boolean(e.bypass(Channel::Right)),
            ControlId::HeadphoneCvMode => ControlValue::Boolean(e.headphone_cv_mode()),
            ControlId::CvExpPedalMode => ControlValue::Boolean(e.cv_exp_pedal_mode()),
            _ => ControlValue::Boolean(e.pedal_signal() == PedalSignal::Ring),
        }
    }

    fn set_discrete(&mut self, id: ControlId, value: ControlValue) -> Result<bool> {
        if self.get_discrete(id) == value {
            return Ok(false);
        }
        let e = &mut self.discrete;
        match (id, value) {
            (ControlId::HeadphoneVolume, ControlValue::Integer(v)) => e.set_volume(small(v, HEADPHONE_VOLUME_MAX)?),
            (ControlId::LeftGainStage, ControlValue::Integer(v)) => e.set_gain_stage(Channel::Left, small(v, GAIN_STAGES - 1)?),
            (ControlId::RightGainStage, ControlValue::Integer(v)) => e.set_gain_stage(Channel::Right, small(v, GAIN_STAGES - 1)?),
            (ControlId::LeftTrueBypass, ControlValue::Boolean(b)) => e.set_bypass(Channel::Left, b),
            (ControlId::RightTrueBypass, ControlValue::Boolean(b)) => e.set_bypass(Channel::Right, b),
            (ControlId::HeadphoneCvMode, ControlValue::Boolean(b)) => e.set_headphone_cv_mode(b),
            (ControlId::CvExpPedalMode, ControlValue::Boolean(b)) => e.set_cv_exp_pedal_mode(b),
            (ControlId::ExpPedalMode, ControlValue::Boolean(ring)) => {
                e.set_pedal_signal(if ring { PedalSignal::Ring } else { PedalSignal::Tip })
            }
            _ => Err(Error::TypeMismatch),
        }
    }

    fn stereo_registers(&self, binding: Binding) -> (u8, u8) {
        match binding {
            Binding::DacVolume => self.variant.chip.dac_volume_registers(),
            _ => (reg::CHA_PGA_CTL, reg::CHB_PGA_CTL),
        }
    }
}

/// Convert a control integer to `0..=max`.
fn small(value: i32, max: u8) -> Result<u8> {
    u8::try_from(value)
        .ok()
        .filter(|v| *v <= max)
        .ok_or(Error::OutOfRange)
}

impl<I2C, D, P> ControlSurface for Codec<I2C, D, P>
where
    I2C: I2c,
    D: DelayNs,
    P: OutputPin,
{
    type Error = Error;

    fn controls(&self) -> &'static [ControlId] {
        self.variant.controls
    }

    fn info(&self, id: ControlId) -> Result<ControlInfo> {
        self.check_control(id)?;
        Ok(id.info())
    }

    fn get(&mut self, id: ControlId) -> Result<ControlValue> {
        self.check_control(id)?;
        let binding = id.binding();
        match binding {
            Binding::Discrete => Ok(self.get_discrete(id)),
            Binding::Field { reg: register, shift, max, invert } => {
                let field = (self.regs.read(register)? >> shift) & max;
                let v = if invert { max - field } else { field };
                Ok(match id.info().kind {
                    ControlKind::Boolean => ControlValue::Boolean(v != 0),
                    ControlKind::Enumerated(_) => ControlValue::Enumerated(v),
                    ControlKind::Integer { .. } => ControlValue::Integer(v as i32),
                })
            }
            Binding::DacVolume | Binding::PgaGain => {
                let (ra, rb) = self.stereo_registers(binding);
                let (a, b) = (self.regs.read(ra)?, self.regs.read(rb)?);
                Ok(if binding == Binding::DacVolume {
                    ControlValue::Stereo(control::DAC_VOLUME_MAX - a as i32, control::DAC_VOLUME_MAX - b as i32)
                } else {
                    ControlValue::Stereo(control::pga_value(a), control::pga_value(b))
                })
            }
        }
    }

    fn set(&mut self, id: ControlId, value: ControlValue) -> Result<bool> {
        self.check_control(id)?;
        let binding = id.binding();
        match binding {
            Binding::Discrete => self.set_discrete(id, value),
            Binding::Field { reg: register, shift, max, invert } => {
                let v = match (id.info().kind, value) {
                    (ControlKind::Boolean, ControlValue::Boolean(b)) => b as u8,
                    (ControlKind::Enumerated(items), ControlValue::Enumerated(i)) => {
                        if i as usize >= items.len() {
                            return Err(Error::OutOfRange);
                        }
                        i
                    }
                    (ControlKind::Integer { .. }, ControlValue::Integer(i)) => small(i, max)?,
                    _ => return Err(Error::TypeMismatch),
                };
                let field = if invert { max - v } else { v };
                self.regs.update_bits(register, max << shift, field << shift)
            }
            Binding::DacVolume | Binding::PgaGain => {
                let ControlValue::Stereo(left, right) = value else {
                    return Err(Error::TypeMismatch);
                };
                let max = if binding == Binding::DacVolume {
                    control::DAC_VOLUME_MAX
                } else {
                    control::PGA_GAIN_MAX
                };
                if !(0..=max).contains(&left) || !(0..=max).contains(&right) {
                    return Err(Error::OutOfRange);
                }
                let encode = |v: i32| {
                    if binding == Binding::DacVolume {
                        (control::DAC_VOLUME_MAX - v) as u8
                    } else {
                        control::pga_code(v)
                    }
                };
                let mask = if binding == Binding::DacVolume { 0xFF } else { reg::PGA_MASK };
                let (ra, rb) = self.stereo_registers(binding);
                let a = self.regs.update_bits(ra, mask, encode(left))?;
                let b = self.regs.update_bits(rb, mask, encode(right))?;
                Ok(a || b)
            }
        }
    }
}
