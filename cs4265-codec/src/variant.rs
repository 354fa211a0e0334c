//! Hardware variant descriptors.
//!
//! A [`Variant`] describes one product: which codec it carries, the register
//! values written at attach time, the stream formats it accepts, the discrete
//! hardware fitted around the codec and the controls it exposes. The host
//! picks one when constructing a [`Codec`](crate::Codec).

use crate::codec::registers::{self as reg, Chip};
use crate::constants::HEADPHONE_VOLUME_STEPS;
use crate::control::ControlId;
use crate::discrete::DiscreteCaps;

/// Stream capabilities of a variant.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Capabilities {
    /// Accepted sample rates in Hz.
    pub rates: &'static [u32],
    /// Accepted sample widths in bits.
    pub widths: &'static [u8],
    /// Whether bias level changes touch the PDN bit.
    pub bias_control: bool,
}

/// One supported product.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Variant {
    pub name: &'static str,
    pub chip: Chip,
    /// Register writes issued after the chip id check, in order.
    pub init_writes: &'static [(u8, u8)],
    pub capabilities: Capabilities,
    /// Discrete hardware, `None` on a bare codec.
    pub discrete: Option<DiscreteCaps>,
    /// Controls exposed through [`ControlSurface`](crate::control::ControlSurface).
    pub controls: &'static [ControlId],
}

impl Variant {
    /// Whether `id` is exposed on this variant.
    pub fn has_control(&self, id: ControlId) -> bool {
        self.controls.contains(&id)
    }
}

// ── Stream capabilities ────────────────────────────────────────────────────

const ALL_RATES: &[u32] = &[32_000, 44_100, 48_000, 64_000, 88_200, 96_000, 176_400, 192_000];
const ALL_WIDTHS: &[u8] = &[16, 24, 32];

// ── Attach-time register values ────────────────────────────────────────────

const DUO_INIT: &[(u8, u8)] = &[
    // everything but the microphone preamp powered
    (reg::PWRCTL, reg::PWRCTL_PDN_MIC),
    (reg::DAC_CTL, 0x08 | reg::DAC_CTL_MUTE),
    (reg::ADC_CTL, reg::ADC_CTL_MUTE),
    (reg::SIG_SEL, reg::SIG_SEL_LOOP),
    // soft ramp, zero cross, input pair 4
    (reg::ADC_CTL2, 0x10 | 0x08 | 0x04),
    (reg::DAC_CTL2, 0x08 | 0x04),
];

const DWARF_INIT: &[(u8, u8)] = &[
    (reg::PWRCTL, reg::PWRCTL_PDN_MIC),
    (reg::DAC_CTL, 0x08),
    (reg::ADC_CTL, 0x00),
    (reg::SIG_SEL, 0x40),
    // soft ramp, zero cross, line in
    (reg::ADC_CTL2, 0x10 | 0x08 | reg::ADC_CTL2_SELECT),
    (reg::DAC_CTL2, reg::DAC_CTL2_SOFT_RAMP | reg::DAC_CTL2_ZERO_CROSS),
];

const CS4265_INIT: &[(u8, u8)] = &[(
    reg::PWRCTL,
    reg::PWRCTL_PDN | reg::PWRCTL_PDN_DAC | reg::PWRCTL_PDN_ADC | reg::PWRCTL_PDN_MIC,
)];

// ── Control lists ──────────────────────────────────────────────────────────

use ControlId::*;

const DUO_CONTROLS: &[ControlId] = &[
    DacVolume,
    PgaGain,
    AuxOutMux,
    Loopback,
    HeadphoneVolume,
    LeftGainStage,
    RightGainStage,
    LeftTrueBypass,
    RightTrueBypass,
];

const DUOX_CONTROLS: &[ControlId] = &[
    PgaGain,
    DacVolume,
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
    HeadphoneVolume,
    LeftGainStage,
    RightGainStage,
    LeftTrueBypass,
    RightTrueBypass,
    HeadphoneCvMode,
    CvExpPedalMode,
    ExpPedalMode,
    SpdifBufferTransferDisable,
    SpdifChannelStatusAccess,
    SpdifValidity,
    SpdifMonoStereo,
    SpdifMmtlrData,
    SpdifMonoChannel,
];

const DWARF_CONTROLS: &[ControlId] = &[
    PgaGain,
    DacVolume,
    Loopback,
    HeadphoneVolume,
    LeftGainStage,
    RightGainStage,
];

const CS4265_CONTROLS: &[ControlId] = &[
    PgaGain,
    DacVolume,
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
    SpdifBufferTransferDisable,
    SpdifChannelStatusAccess,
    SpdifValidity,
    SpdifMonoStereo,
    SpdifMmtlrData,
    SpdifMonoChannel,
];

const CS4245_CONTROLS: &[ControlId] = &[
    PgaGain,
    DacVolume,
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
];

// ── Variants ───────────────────────────────────────────────────────────────

/// MOD Duo: CS4245 with headphone stepper, gain stages and true bypass.
pub static MOD_DUO: Variant = Variant {
    name: "MOD Duo",
    chip: Chip::Cs4245,
    init_writes: DUO_INIT,
    capabilities: Capabilities {
        rates: ALL_RATES,
        widths: ALL_WIDTHS,
        bias_control: false,
    },
    discrete: Some(DiscreteCaps {
        volume_steps: HEADPHONE_VOLUME_STEPS,
        true_bypass: true,
        cv_exp_pedal: false,
    }),
    controls: DUO_CONTROLS,
};

/// MOD Duo X: CS4265 with the full discrete set, including CV and
/// expression pedal routing.
pub static MOD_DUOX: Variant = Variant {
    name: "MOD Duo X",
    chip: Chip::Cs4265,
    init_writes: CS4265_INIT,
    capabilities: Capabilities {
        rates: ALL_RATES,
        widths: ALL_WIDTHS,
        bias_control: true,
    },
    discrete: Some(DiscreteCaps {
        volume_steps: HEADPHONE_VOLUME_STEPS,
        true_bypass: true,
        cv_exp_pedal: true,
    }),
    controls: DUOX_CONTROLS,
};

/// MOD Dwarf: CS4265 with headphone stepper and gain stages.
pub static MOD_DWARF: Variant = Variant {
    name: "MOD Dwarf",
    chip: Chip::Cs4265,
    init_writes: DWARF_INIT,
    capabilities: Capabilities {
        rates: ALL_RATES,
        widths: ALL_WIDTHS,
        bias_control: false,
    },
    discrete: Some(DiscreteCaps {
        volume_steps: HEADPHONE_VOLUME_STEPS,
        true_bypass: false,
        cv_exp_pedal: false,
    }),
    controls: DWARF_CONTROLS,
};

/// Bare CS4265.
pub static CS4265_GENERIC: Variant = Variant {
    name: "CS4265",
    chip: Chip::Cs4265,
    init_writes: CS4265_INIT,
    capabilities: Capabilities {
        rates: ALL_RATES,
        widths: ALL_WIDTHS,
        bias_control: true,
    },
    discrete: None,
    controls: CS4265_CONTROLS,
};

/// Bare CS4245, limited to 48 kHz / 24-bit streams.
pub static CS4245_GENERIC: Variant = Variant {
    name: "CS4245",
    chip: Chip::Cs4245,
    init_writes: &[],
    capabilities: Capabilities {
        rates: &[48_000],
        widths: &[24],
        bias_control: true,
    },
    discrete: None,
    controls: CS4245_CONTROLS,
};
