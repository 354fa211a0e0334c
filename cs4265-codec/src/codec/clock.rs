//! Master clock / sample rate table and resolver.
//!
//! Each supported `(MCLK, Fs)` pair maps to a speed mode (written to the
//! ADC_CTL FM field) and an MCLK divider code (written to MCLK_FREQ). The
//! table is nine rate families of five master clocks each; lookups are exact
//! on both frequencies.

use crate::error::{Error, Result};

/// Converter speed mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[repr(u8)]
pub enum SpeedMode {
    /// 4 to 50 kHz.
    Single = 0,
    /// 50 to 100 kHz.
    Double = 1,
    /// 100 to 200 kHz.
    Quad = 2,
}

impl SpeedMode {
    /// Raw value of the FM field.
    pub const fn bits(self) -> u8 {
        self as u8
    }
}

/// One row of the clock table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct ClockEntry {
    pub master_clock_hz: u32,
    pub sample_rate_hz: u32,
    pub speed_mode: SpeedMode,
    /// MCLK divider code, 0..=4.
    pub divider_code: u8,
}

const fn entry(master_clock_hz: u32, sample_rate_hz: u32, speed_mode: SpeedMode, divider_code: u8) -> ClockEntry {
    ClockEntry {
        master_clock_hz,
        sample_rate_hz,
        speed_mode,
        divider_code,
    }
}

use SpeedMode::{Double, Quad, Single};

/// Every supported master clock / sample rate pair.
pub static CLOCK_TABLE: [ClockEntry; 45] = [
    // 32k
    entry(8_192_000, 32_000, Single, 0),
    entry(12_288_000, 32_000, Single, 1),
    entry(16_384_000, 32_000, Single, 2),
    entry(24_576_000, 32_000, Single, 3),
    entry(32_768_000, 32_000, Single, 4),
    // 44.1k
    entry(11_289_600, 44_100, Single, 0),
    entry(16_934_400, 44_100, Single, 1),
    entry(22_579_200, 44_100, Single, 2),
    entry(33_868_000, 44_100, Single, 3),
    entry(45_158_400, 44_100, Single, 4),
    // 48k
    entry(12_288_000, 48_000, Single, 0),
    entry(18_432_000, 48_000, Single, 1),
    entry(24_576_000, 48_000, Single, 2),
    entry(36_864_000, 48_000, Single, 3),
    entry(49_152_000, 48_000, Single, 4),
    // 64k
    entry(8_192_000, 64_000, Double, 0),
    entry(12_288_000, 64_000, Double, 1),
    entry(16_934_400, 64_000, Double, 2),
    entry(24_576_000, 64_000, Double, 3),
    entry(32_768_000, 64_000, Double, 4),
    // 88.2k
    entry(11_289_600, 88_200, Double, 0),
    entry(16_934_400, 88_200, Double, 1),
    entry(22_579_200, 88_200, Double, 2),
    entry(33_868_000, 88_200, Double, 3),
    entry(45_158_400, 88_200, Double, 4),
    // 96k
    entry(12_288_000, 96_000, Double, 0),
    entry(18_432_000, 96_000, Double, 1),
    entry(24_576_000, 96_000, Double, 2),
    entry(36_864_000, 96_000, Double, 3),
    entry(49_152_000, 96_000, Double, 4),
    // 128k
    entry(8_192_000, 128_000, Quad, 0),
    entry(12_288_000, 128_000, Quad, 1),
    entry(16_934_400, 128_000, Quad, 2),
    entry(24_576_000, 128_000, Quad, 3),
    entry(32_768_000, 128_000, Quad, 4),
    // 176.4k
    entry(11_289_600, 176_400, Quad, 0),
    entry(16_934_400, 176_400, Quad, 1),
    entry(22_579_200, 176_400, Quad, 2),
    entry(33_868_000, 176_400, Quad, 3),
    entry(49_152_000, 176_400, Quad, 4),
    // 192k
    entry(12_288_000, 192_000, Quad, 0),
    entry(18_432_000, 192_000, Quad, 1),
    entry(24_576_000, 192_000, Quad, 2),
    entry(36_864_000, 192_000, Quad, 3),
    entry(49_152_000, 192_000, Quad, 4),
];

/// Find the table entry for an exact `(master clock, sample rate)` pair.
pub fn resolve(master_clock_hz: u32, sample_rate_hz: u32) -> Result<&'static ClockEntry> {
    CLOCK_TABLE
        .iter()
        .find(|e| e.master_clock_hz == master_clock_hz && e.sample_rate_hz == sample_rate_hz)
        .ok_or(Error::UnsupportedRate {
            master_clock_hz,
            sample_rate_hz,
        })
}

/// Whether any table entry uses `master_clock_hz`.
pub fn is_supported_master_clock(master_clock_hz: u32) -> bool {
    CLOCK_TABLE.iter().any(|e| e.master_clock_hz == master_clock_hz)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pairs_are_unique() {
        for (i, a) in CLOCK_TABLE.iter().enumerate() {
            for b in &CLOCK_TABLE[i + 1..] {
                assert!(
                    !(a.master_clock_hz == b.master_clock_hz && a.sample_rate_hz == b.sample_rate_hz),
                    "duplicate {:?}",
                    a
                );
            }
        }
    }

    #[test]
    fn divider_codes_fit_field() {
        assert!(CLOCK_TABLE.iter().all(|e| e.divider_code <= 7));
    }

    #[test]
    fn resolves_common_rates() {
        let e = resolve(12_288_000, 48_000).unwrap();
        assert_eq!((e.speed_mode, e.divider_code), (Single, 0));

        let e = resolve(24_576_000, 96_000).unwrap();
        assert_eq!((e.speed_mode, e.divider_code), (Double, 2));

        let e = resolve(49_152_000, 192_000).unwrap();
        assert_eq!((e.speed_mode, e.divider_code), (Quad, 4));

        let e = resolve(11_289_600, 44_100).unwrap();
        assert_eq!((e.speed_mode, e.divider_code), (Single, 0));
    }

    #[test]
    fn unknown_pair_is_unsupported() {
        assert_eq!(
            resolve(12_288_000, 44_100),
            Err(Error::UnsupportedRate {
                master_clock_hz: 12_288_000,
                sample_rate_hz: 44_100
            })
        );
        assert!(resolve(0, 48_000).is_err());
    }

    #[test]
    fn master_clock_membership() {
        assert!(is_supported_master_clock(45_158_400));
        assert!(is_supported_master_clock(8_192_000));
        assert!(!is_supported_master_clock(12_000_000));
        assert!(!is_supported_master_clock(0));
    }
}
