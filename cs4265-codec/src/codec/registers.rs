//! CS4265 / CS4245 register addresses, bitfields and register tables.
//!
//! Both parts share the 8-bit register layout from 0x01 to 0x10. The CS4265
//! adds an S/PDIF transmitter block (0x11..=0x2A) and swaps the channel A and
//! channel B DAC volume registers relative to the CS4245. Every register holds
//! an 8-bit value; the bus protocol is `[address, value]` for writes and a
//! one-byte address write followed by a one-byte read for reads.

// The interrupt, status-mode and C-data registers are listed for register
// table completeness and raw access; the driver itself does not touch them.
#![allow(dead_code)]

use super::regmap::RegisterSpec;

// ── I2C addresses ──────────────────────────────────────────────────────────

/// CS4265 address with AD0 tied low.
pub const CS4265_I2C_ADDR_AD0_LOW: u8 = 0x4E;

/// CS4265 address with AD0 tied high.
pub const CS4265_I2C_ADDR_AD0_HIGH: u8 = 0x4F;

/// CS4245 address with AD1 and AD0 tied low.
pub const CS4245_I2C_ADDR_LOW: u8 = 0x4C;

// ── Chip identification ────────────────────────────────────────────────────

/// Chip ID register (read-only).
/// - Bits 7:4: PART (0xD for CS4265, 0xC for CS4245)
/// - Bits 3:0: REV
pub const CHIP_ID: u8 = 0x01;
pub const CHIP_ID_PART_MASK: u8 = 0xF0;
pub const CHIP_ID_REV_MASK: u8 = 0x0F;

/// Part id nibble reported by the CS4265.
pub const CS4265_PART_ID: u8 = 0xD0;
/// Part id nibble reported by the CS4245.
pub const CS4245_PART_ID: u8 = 0xC0;

// ── Power ──────────────────────────────────────────────────────────────────

/// Power control.
/// - Bit 7: FREEZE
/// - Bit 3: PDN_MIC
/// - Bit 2: PDN_ADC
/// - Bit 1: PDN_DAC
/// - Bit 0: PDN (whole device)
pub const PWRCTL: u8 = 0x02;
pub const PWRCTL_PDN: u8 = 1 << 0;
pub const PWRCTL_PDN_DAC: u8 = 1 << 1;
pub const PWRCTL_PDN_ADC: u8 = 1 << 2;
pub const PWRCTL_PDN_MIC: u8 = 1 << 3;
pub const PWRCTL_FREEZE: u8 = 1 << 7;

// ── Serial port / DAC ──────────────────────────────────────────────────────

/// DAC control.
/// - Bits 5:4: DAC_DIF (0 = left-justified, 1 = I2S, 2 = RJ16, 3 = RJ24)
/// - Bit 2: MUTE_DAC
/// - Bit 1: DE_EMPH
pub const DAC_CTL: u8 = 0x03;
pub const DAC_CTL_DEEMPH: u8 = 1 << 1;
pub const DAC_CTL_MUTE: u8 = 1 << 2;
pub const DAC_CTL_DIF_SHIFT: u8 = 4;
pub const DAC_CTL_DIF: u8 = 0x3 << DAC_CTL_DIF_SHIFT;

/// ADC control.
/// - Bits 7:6: FM (0 = single, 1 = double, 2 = quad speed)
/// - Bit 4: ADC_DIF (0 = left-justified, 1 = I2S)
/// - Bit 2: MUTE_ADC (CS4245 only)
/// - Bit 1: HPF_FREEZE
/// - Bit 0: M/S (1 = codec drives the serial clocks)
pub const ADC_CTL: u8 = 0x04;
pub const ADC_CTL_MASTER: u8 = 1 << 0;
pub const ADC_CTL_HPF_FREEZE: u8 = 1 << 1;
pub const ADC_CTL_MUTE: u8 = 1 << 2;
pub const ADC_CTL_DIF_SHIFT: u8 = 4;
pub const ADC_CTL_DIF: u8 = 0x1 << ADC_CTL_DIF_SHIFT;
pub const ADC_CTL_FM_SHIFT: u8 = 6;
pub const ADC_CTL_FM: u8 = 0x3 << ADC_CTL_FM_SHIFT;

// ── Clocking ───────────────────────────────────────────────────────────────

/// MCLK frequency.
/// - Bits 6:4: MCLK divider code (see the clock table)
pub const MCLK_FREQ: u8 = 0x05;
pub const MCLK_FREQ_SHIFT: u8 = 4;
pub const MCLK_FREQ_MASK: u8 = 0x7 << MCLK_FREQ_SHIFT;

// ── Signal routing ─────────────────────────────────────────────────────────

/// Signal selection.
/// - Bit 7: SDIN mux (0 = SDIN1, 1 = SDIN2)
/// - Bits 6:5: AUX output source (CS4245 only)
/// - Bit 1: LOOP (digital loopback ADC to DAC)
pub const SIG_SEL: u8 = 0x06;
pub const SIG_SEL_LOOP: u8 = 1 << 1;
pub const SIG_SEL_AUX_SHIFT: u8 = 5;
pub const SIG_SEL_AUX: u8 = 0x3 << SIG_SEL_AUX_SHIFT;
pub const SIG_SEL_SDIN_SHIFT: u8 = 7;
pub const SIG_SEL_SDIN: u8 = 1 << SIG_SEL_SDIN_SHIFT;

// ── Analog input ───────────────────────────────────────────────────────────

/// Channel B programmable gain amplifier (6-bit two's complement, 0.5 dB).
pub const CHB_PGA_CTL: u8 = 0x07;

/// Channel A programmable gain amplifier (6-bit two's complement, 0.5 dB).
pub const CHA_PGA_CTL: u8 = 0x08;

/// Valid bits of the PGA registers.
pub const PGA_MASK: u8 = 0x3F;

/// ADC input control.
/// - Bit 7: PGA soft ramp
/// - Bit 3: PGA zero cross
/// - Bit 0: input select (0 = microphone, 1 = line in)
pub const ADC_CTL2: u8 = 0x09;
pub const ADC_CTL2_SELECT: u8 = 1 << 0;
pub const ADC_CTL2_ZERO_CROSS: u8 = 1 << 3;
pub const ADC_CTL2_SOFT_RAMP: u8 = 1 << 7;

// ── DAC output ─────────────────────────────────────────────────────────────

/// CS4265 DAC volume registers (attenuation, 0.5 dB per code).
pub mod cs4265 {
    pub const DAC_CHA_VOL: u8 = 0x0A;
    pub const DAC_CHB_VOL: u8 = 0x0B;
}

/// CS4245 DAC volume registers (attenuation, 0.5 dB per code).
pub mod cs4245 {
    pub const DAC_CHB_VOL: u8 = 0x0A;
    pub const DAC_CHA_VOL: u8 = 0x0B;
}

/// DAC control 2.
/// - Bit 7: soft ramp
/// - Bit 6: zero cross
/// - Bit 5: invert signal polarity
pub const DAC_CTL2: u8 = 0x0C;
pub const DAC_CTL2_INVERT: u8 = 1 << 5;
pub const DAC_CTL2_ZERO_CROSS: u8 = 1 << 6;
pub const DAC_CTL2_SOFT_RAMP: u8 = 1 << 7;

// ── Interrupts and status ──────────────────────────────────────────────────

/// Interrupt status (volatile, clear-on-read).
pub const INT_STATUS: u8 = 0x0D;
/// Interrupt mask.
pub const INT_MASK: u8 = 0x0E;
/// Status mode MSB.
pub const STATUS_MODE_MSB: u8 = 0x0F;
/// Status mode LSB.
pub const STATUS_MODE_LSB: u8 = 0x10;

// ── S/PDIF transmitter (CS4265 only) ───────────────────────────────────────

/// Transmitter control 1.
/// - Bit 6: E-to-F buffer transfer inhibit
/// - Bit 5: channel status access mode (one or two byte)
pub const SPDIF_CTL1: u8 = 0x11;
pub const SPDIF_CTL1_EFTC_SHIFT: u8 = 6;
pub const SPDIF_CTL1_CAM_SHIFT: u8 = 5;

/// Transmitter control 2.
/// - Bits 7:6: TX_DIF (same codes as DAC_DIF)
/// - Bit 4: TX_MUTE
/// - Bit 3: validity bit
/// - Bit 2: mono/stereo channel status
/// - Bit 0: MMTLR, the mono channel select
pub const SPDIF_CTL2: u8 = 0x12;
pub const SPDIF_CTL2_MUTE: u8 = 1 << 4;
pub const SPDIF_CTL2_DIF_SHIFT: u8 = 6;
pub const SPDIF_CTL2_DIF: u8 = 0x3 << SPDIF_CTL2_DIF_SHIFT;
pub const SPDIF_CTL2_V_SHIFT: u8 = 3;
pub const SPDIF_CTL2_MMT_SHIFT: u8 = 2;
pub const SPDIF_CTL2_MMTLR_SHIFT: u8 = 0;

/// First byte of the 24-byte channel status buffer.
pub const C_DATA_BUFF: u8 = 0x13;

// ── Register map bounds ────────────────────────────────────────────────────

pub const CS4265_MAX_REGISTER: u8 = 0x2A;
pub const CS4245_MAX_REGISTER: u8 = 0x10;

/// Power-on defaults of the CS4265.
const CS4265_DEFAULTS: [(u8, u8); 16] = [
    (PWRCTL, 0x0F),
    (DAC_CTL, 0x08),
    (ADC_CTL, 0x00),
    (MCLK_FREQ, 0x00),
    (SIG_SEL, 0x40),
    (CHB_PGA_CTL, 0x00),
    (CHA_PGA_CTL, 0x00),
    (ADC_CTL2, 0x19),
    (cs4265::DAC_CHA_VOL, 0x00),
    (cs4265::DAC_CHB_VOL, 0x00),
    (DAC_CTL2, 0xC0),
    (SPDIF_CTL1, 0x00),
    (SPDIF_CTL2, 0x00),
    (INT_MASK, 0x00),
    (STATUS_MODE_MSB, 0x00),
    (STATUS_MODE_LSB, 0x00),
];

/// Power-on defaults of the CS4245.
const CS4245_DEFAULTS: [(u8, u8); 15] = [
    (PWRCTL, 0x0F),
    (DAC_CTL, 0x08),
    (ADC_CTL, 0x00),
    (MCLK_FREQ, 0x00),
    (SIG_SEL, 0x40),
    (CHB_PGA_CTL, 0x00),
    (CHA_PGA_CTL, 0x00),
    (ADC_CTL2, 0x19),
    (cs4245::DAC_CHB_VOL, 0x00),
    (cs4245::DAC_CHA_VOL, 0x00),
    (DAC_CTL2, 0xC0),
    (INT_STATUS, 0x00),
    (INT_MASK, 0x00),
    (STATUS_MODE_MSB, 0x00),
    (STATUS_MODE_LSB, 0x00),
];

/// Builds a contiguous `0..N` register table. Address 0 is not readable and
/// INT_STATUS is the only volatile register.
const fn build_table<const N: usize>(defaults: &[(u8, u8)]) -> [RegisterSpec; N] {
    let mut table = [RegisterSpec {
        address: 0,
        readable: false,
        volatile: false,
        default: None,
    }; N];
    let mut addr = 0;
    while addr < N {
        let mut default = None;
        let mut i = 0;
        while i < defaults.len() {
            if defaults[i].0 as usize == addr {
                default = Some(defaults[i].1);
            }
            i += 1;
        }
        table[addr] = RegisterSpec {
            address: addr as u8,
            readable: addr >= CHIP_ID as usize,
            volatile: addr == INT_STATUS as usize,
            default,
        };
        addr += 1;
    }
    table
}

/// Register table of the CS4265 (0x00..=0x2A).
pub static CS4265_REGISTERS: [RegisterSpec; CS4265_MAX_REGISTER as usize + 1] =
    build_table(&CS4265_DEFAULTS);

/// Register table of the CS4245 (0x00..=0x10).
pub static CS4245_REGISTERS: [RegisterSpec; CS4245_MAX_REGISTER as usize + 1] =
    build_table(&CS4245_DEFAULTS);

// ── Chip kinds ─────────────────────────────────────────────────────────────

/// Codec part driven by the core.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Chip {
    /// CS4265: stereo codec with S/PDIF transmitter.
    Cs4265,
    /// CS4245: stereo codec with auxiliary analog output.
    Cs4245,
}

impl Chip {
    /// Part id nibble expected in the CHIP_ID register.
    pub const fn part_id(self) -> u8 {
        match self {
            Chip::Cs4265 => CS4265_PART_ID,
            Chip::Cs4245 => CS4245_PART_ID,
        }
    }

    /// Register table of the part.
    pub fn registers(self) -> &'static [RegisterSpec] {
        match self {
            Chip::Cs4265 => &CS4265_REGISTERS,
            Chip::Cs4245 => &CS4245_REGISTERS,
        }
    }

    /// DAC volume registers as `(channel A, channel B)`.
    pub const fn dac_volume_registers(self) -> (u8, u8) {
        match self {
            Chip::Cs4265 => (cs4265::DAC_CHA_VOL, cs4265::DAC_CHB_VOL),
            Chip::Cs4245 => (cs4245::DAC_CHA_VOL, cs4245::DAC_CHB_VOL),
        }
    }

    /// Whether the part has the S/PDIF transmitter block.
    pub const fn has_spdif(self) -> bool {
        matches!(self, Chip::Cs4265)
    }

    /// Register and bit muted alongside the DAC mute bit.
    pub const fn secondary_mute(self) -> (u8, u8) {
        match self {
            Chip::Cs4265 => (SPDIF_CTL2, SPDIF_CTL2_MUTE),
            Chip::Cs4245 => (ADC_CTL, ADC_CTL_MUTE),
        }
    }

    /// Whether capture-direction mute requests are honored.
    pub const fn capture_mute(self) -> bool {
        matches!(self, Chip::Cs4245)
    }
}
