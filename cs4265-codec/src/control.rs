//! Named controls exposed to the host mixer.
//!
//! Every control is identified by a [`ControlId`], described by a
//! [`ControlInfo`] and read or written as a [`ControlValue`]. Writes report
//! whether the value changed so the host can raise change notifications.

use crate::codec::registers as reg;
use crate::constants::{
    GAIN_STAGES, GAIN_STAGE_CDB, HEADPHONE_VOLUME_MAX, HEADPHONE_VOLUME_STEP_CDB, HEADPHONE_VOLUME_UNITY_STEP,
    TRIM_STEP_CDB,
};

/// Trait for components that expose named runtime controls.
pub trait ControlSurface {
    /// Error type for control operations.
    type Error;

    /// Controls available on this component.
    fn controls(&self) -> &'static [ControlId];

    /// Describe one control.
    fn info(&self, id: ControlId) -> Result<ControlInfo, Self::Error>;

    /// Read the current value of a control.
    fn get(&mut self, id: ControlId) -> Result<ControlValue, Self::Error>;

    /// Write a control. Returns `true` when the value changed.
    fn set(&mut self, id: ControlId, value: ControlValue) -> Result<bool, Self::Error>;
}

/// Every control the core knows about. Variants expose a subset.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ControlId {
    HeadphoneVolume,
    LeftGainStage,
    RightGainStage,
    LeftTrueBypass,
    RightTrueBypass,
    HeadphoneCvMode,
    CvExpPedalMode,
    ExpPedalMode,
    DacVolume,
    PgaGain,
    DeEmphasis,
    DacInvert,
    DacZeroCross,
    DacSoftRamp,
    AdcHighPassFilter,
    AdcZeroCross,
    AdcSoftRamp,
    DigitalInputMux,
    AdcInputMux,
    Loopback,
    AuxOutMux,
    SpdifBufferTransferDisable,
    SpdifChannelStatusAccess,
    SpdifValidity,
    SpdifMonoStereo,
    SpdifMmtlrData,
    SpdifMonoChannel,
}

/// Value kind and range of a control.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ControlKind {
    /// Integer in `min..=max` on `channels` channels.
    Integer { min: i32, max: i32, channels: u8 },
    Boolean,
    /// One of the listed items, by index.
    Enumerated(&'static [&'static str]),
}

/// Mapping from control value to gain.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum DbScale {
    /// `min_cdb + value * step_cdb`.
    Linear { min_cdb: i32, step_cdb: i32 },
    /// Gain of each value, in centi-dB.
    Table(&'static [i32]),
}

impl DbScale {
    /// Gain of `value` in centi-dB, `None` outside a table or when the
    /// gain does not fit in an `i32`.
    pub fn to_cdb(&self, value: i32) -> Option<i32> {
        match *self {
            DbScale::Linear { min_cdb, step_cdb } => value.checked_mul(step_cdb)?.checked_add(min_cdb),
            DbScale::Table(table) => usize::try_from(value).ok().and_then(|i| table.get(i).copied()),
        }
    }

    /// Value whose gain is closest to `db`, clamped to `min..=max`.
    pub fn value_for_db(&self, db: f32, min: i32, max: i32) -> i32 {
        let cdb = db * 100.0;
        match *self {
            DbScale::Linear { min_cdb, step_cdb } => {
                let v = libm::roundf((cdb - min_cdb as f32) / step_cdb as f32) as i32;
                v.clamp(min, max)
            }
            DbScale::Table(table) => {
                let mut best = min;
                let mut best_err = f32::MAX;
                for (i, &g) in table.iter().enumerate() {
                    let err = libm::fabsf(g as f32 - cdb);
                    if err < best_err {
                        best_err = err;
                        best = i as i32;
                    }
                }
                best.clamp(min, max)
            }
        }
    }
}

/// Static description of a control.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct ControlInfo {
    /// Mixer name.
    pub name: &'static str,
    pub kind: ControlKind,
    pub db_scale: Option<DbScale>,
}

/// Value read from or written to a control.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ControlValue {
    Integer(i32),
    /// Left and right channel values.
    Stereo(i32, i32),
    Boolean(bool),
    Enumerated(u8),
}

/// Where a control's value lives.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Binding {
    /// Shadow state of the discrete engine.
    Discrete,
    /// `max`-wide field at `shift` in `reg`. Inverted fields read as
    /// `max - field`.
    Field { reg: u8, shift: u8, max: u8, invert: bool },
    /// Stereo DAC attenuation pair.
    DacVolume,
    /// Stereo signed PGA pair.
    PgaGain,
}

const MIC_LINE: &[&str] = &["MIC", "LINEIN"];
const SDIN: &[&str] = &["SDIN1", "SDIN2"];
const CS_ACCESS: &[&str] = &["One Byte", "Two Byte"];
const STEREO_MONO: &[&str] = &["Stereo", "Mono"];
const MONO_CHANNEL: &[&str] = &["Channel A", "Channel B"];

/// Highest DAC volume value (0 dB).
pub const DAC_VOLUME_MAX: i32 = 0xFF;
/// Highest PGA value (+12 dB).
pub const PGA_GAIN_MAX: i32 = 0x30;
/// PGA register value of the lowest setting (-12 dB).
pub(crate) const PGA_MIN_CODE: i32 = 0x28;

impl ControlId {
    /// Static description.
    pub fn info(self) -> ControlInfo {
        use ControlId::*;
        let (name, kind, db_scale) = match self {
            HeadphoneVolume => (
                "Headphone Playback Volume",
                ControlKind::Integer { min: 0, max: HEADPHONE_VOLUME_MAX as i32, channels: 1 },
                Some(DbScale::Linear {
                    min_cdb: -(HEADPHONE_VOLUME_UNITY_STEP as i32) * HEADPHONE_VOLUME_STEP_CDB,
                    step_cdb: HEADPHONE_VOLUME_STEP_CDB,
                }),
            ),
            LeftGainStage | RightGainStage => (
                if self == LeftGainStage { "Left Gain Stage" } else { "Right Gain Stage" },
                ControlKind::Integer { min: 0, max: GAIN_STAGES as i32 - 1, channels: 1 },
                Some(DbScale::Table(&GAIN_STAGE_CDB)),
            ),
            LeftTrueBypass => ("Left True-Bypass", ControlKind::Boolean, None),
            RightTrueBypass => ("Right True-Bypass", ControlKind::Boolean, None),
            HeadphoneCvMode => ("Headphone/CV Mode", ControlKind::Boolean, None),
            CvExpPedalMode => ("CV/Exp.Pedal Mode", ControlKind::Boolean, None),
            ExpPedalMode => ("Exp.Pedal Mode", ControlKind::Boolean, None),
            DacVolume => (
                "DAC Volume",
                ControlKind::Integer { min: 0, max: DAC_VOLUME_MAX, channels: 2 },
                Some(DbScale::Linear {
                    min_cdb: -DAC_VOLUME_MAX * TRIM_STEP_CDB,
                    step_cdb: TRIM_STEP_CDB,
                }),
            ),
            PgaGain => (
                "PGA Gain",
                ControlKind::Integer { min: 0, max: PGA_GAIN_MAX, channels: 2 },
                Some(DbScale::Linear {
                    min_cdb: -1200,
                    step_cdb: TRIM_STEP_CDB,
                }),
            ),
            DeEmphasis => ("De-emp 44.1kHz Switch", ControlKind::Boolean, None),
            DacInvert => ("DAC INV Switch", ControlKind::Boolean, None),
            DacZeroCross => ("DAC Zero Cross Switch", ControlKind::Boolean, None),
            DacSoftRamp => ("DAC Soft Ramp Switch", ControlKind::Boolean, None),
            AdcHighPassFilter => ("ADC HPF Switch", ControlKind::Boolean, None),
            AdcZeroCross => ("ADC Zero Cross Switch", ControlKind::Boolean, None),
            AdcSoftRamp => ("ADC Soft Ramp Switch", ControlKind::Boolean, None),
            DigitalInputMux => ("Digital Input Mux", ControlKind::Enumerated(SDIN), None),
            AdcInputMux => ("ADC Input Capture Mux", ControlKind::Enumerated(MIC_LINE), None),
            Loopback => ("Loopback Switch", ControlKind::Boolean, None),
            AuxOutMux => (
                "AUX OUT MUX",
                ControlKind::Integer { min: 0, max: 3, channels: 1 },
                None,
            ),
            SpdifBufferTransferDisable => ("E to F Buffer Disable Switch", ControlKind::Boolean, None),
            SpdifChannelStatusAccess => ("C Data Access", ControlKind::Enumerated(CS_ACCESS), None),
            SpdifValidity => ("Validity Bit Control Switch", ControlKind::Boolean, None),
            SpdifMonoStereo => ("SPDIF Mono/Stereo", ControlKind::Enumerated(STEREO_MONO), None),
            SpdifMmtlrData => ("MMTLR Data Switch", ControlKind::Boolean, None),
            SpdifMonoChannel => ("Mono Channel Select", ControlKind::Enumerated(MONO_CHANNEL), None),
        };
        ControlInfo { name, kind, db_scale }
    }

    /// Whether the value lives on the discrete lines rather than in a
    /// codec register.
    pub fn is_discrete(self) -> bool {
        matches!(self.binding(), Binding::Discrete)
    }

    pub(crate) fn binding(self) -> Binding {
        use ControlId::*;
        let bit = |reg: u8, shift: u8| Binding::Field { reg, shift, max: 1, invert: false };
        match self {
            HeadphoneVolume | LeftGainStage | RightGainStage | LeftTrueBypass | RightTrueBypass
            | HeadphoneCvMode | CvExpPedalMode | ExpPedalMode => Binding::Discrete,
            DacVolume => Binding::DacVolume,
            PgaGain => Binding::PgaGain,
            DeEmphasis => bit(reg::DAC_CTL, 1),
            DacInvert => bit(reg::DAC_CTL2, 5),
            DacZeroCross => bit(reg::DAC_CTL2, 6),
            DacSoftRamp => bit(reg::DAC_CTL2, 7),
            AdcHighPassFilter => bit(reg::ADC_CTL, 1),
            AdcZeroCross => Binding::Field {
                reg: reg::ADC_CTL2,
                shift: 3,
                max: 1,
                invert: true,
            },
            AdcSoftRamp => bit(reg::ADC_CTL2, 7),
            DigitalInputMux => bit(reg::SIG_SEL, reg::SIG_SEL_SDIN_SHIFT),
            AdcInputMux => bit(reg::ADC_CTL2, 0),
            Loopback => bit(reg::SIG_SEL, 1),
            AuxOutMux => Binding::Field {
                reg: reg::SIG_SEL,
                shift: reg::SIG_SEL_AUX_SHIFT,
                max: 3,
                invert: false,
            },
            SpdifBufferTransferDisable => bit(reg::SPDIF_CTL1, reg::SPDIF_CTL1_EFTC_SHIFT),
            SpdifChannelStatusAccess => bit(reg::SPDIF_CTL1, reg::SPDIF_CTL1_CAM_SHIFT),
            SpdifValidity => bit(reg::SPDIF_CTL2, reg::SPDIF_CTL2_V_SHIFT),
            SpdifMonoStereo => bit(reg::SPDIF_CTL2, reg::SPDIF_CTL2_MMT_SHIFT),
            // two views of the same bit
            SpdifMmtlrData | SpdifMonoChannel => bit(reg::SPDIF_CTL2, reg::SPDIF_CTL2_MMTLR_SHIFT),
        }
    }

    /// Whether the control drives the S/PDIF transmitter, which only the
    /// CS4265 has.
    pub fn is_spdif(self) -> bool {
        use ControlId::*;
        matches!(
            self,
            SpdifBufferTransferDisable
                | SpdifChannelStatusAccess
                | SpdifValidity
                | SpdifMonoStereo
                | SpdifMmtlrData
                | SpdifMonoChannel
        )
    }
}

/// Split a PGA register into the control value (0 = -12 dB).
pub(crate) fn pga_value(code: u8) -> i32 {
    (code as i32 - PGA_MIN_CODE) & reg::PGA_MASK as i32
}

/// PGA register bits for a control value.
pub(crate) fn pga_code(value: i32) -> u8 {
    ((value + PGA_MIN_CODE) & reg::PGA_MASK as i32) as u8
}
