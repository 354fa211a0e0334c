//! Cached register model over the 8-bit control bus.
//!
//! [`RegisterMap`] owns the bus handle and a per-register cache. Reads of
//! non-volatile registers are served from the cache once a value is known;
//! volatile registers always go to the chip. The cache is updated only after
//! a bus write succeeds, so a failed transfer never leaves it ahead of the
//! hardware.

use embedded_hal::i2c::I2c;

use crate::error::{Error, Result};

/// Largest register table handled by the cache (CS4265: 0x00..=0x2A).
pub const MAX_REGISTERS: usize = 0x2B;

/// Static description of one codec register.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct RegisterSpec {
    /// Register address.
    pub address: u8,
    /// Whether the register can be read back.
    pub readable: bool,
    /// Whether the chip may change the value on its own.
    pub volatile: bool,
    /// Power-on value, when documented.
    pub default: Option<u8>,
}

/// Register cache and accessor for one codec instance.
pub struct RegisterMap<I2C> {
    i2c: I2C,
    address: u8,
    specs: &'static [RegisterSpec],
    cache: [Option<u8>; MAX_REGISTERS],
}

impl<I2C> RegisterMap<I2C>
where
    I2C: I2c,
{
    /// Create a map with an empty cache.
    pub fn new(i2c: I2C, address: u8, specs: &'static [RegisterSpec]) -> Self {
        Self {
            i2c,
            address,
            specs,
            cache: [None; MAX_REGISTERS],
        }
    }

    /// Bus address of the codec.
    pub fn address(&self) -> u8 {
        self.address
    }

    /// Release the bus handle.
    pub fn release(self) -> I2C {
        self.i2c
    }

    /// Static description of `reg`.
    pub fn spec(&self, reg: u8) -> Result<&'static RegisterSpec> {
        let specs: &'static [RegisterSpec] = self.specs;
        specs.get(reg as usize).ok_or(Error::InvalidRegister(reg))
    }

    /// Load the documented power-on values of non-volatile registers into
    /// the cache.
    pub fn seed_defaults(&mut self) {
        for spec in self.specs.iter().filter(|s| !s.volatile) {
            if let Some(value) = spec.default {
                self.cache[spec.address as usize] = Some(value);
            }
        }
    }

    /// Forget every cached value. Subsequent reads go to the chip.
    pub fn invalidate_cache(&mut self) {
        self.cache = [None; MAX_REGISTERS];
    }

    /// Cached value of `reg`, without touching the bus.
    pub fn cached(&self, reg: u8) -> Option<u8> {
        self.cache.get(reg as usize).copied().flatten()
    }

    // ── Register access ────────────────────────────────────────────────

    /// Read `reg`, from the cache when possible.
    pub fn read(&mut self, reg: u8) -> Result<u8> {
        let spec = self.spec(reg)?;
        if !spec.readable {
            return Err(Error::InvalidRegister(reg));
        }
        if !spec.volatile {
            if let Some(value) = self.cache[reg as usize] {
                return Ok(value);
            }
        }
        let value = self.read_hw(reg)?;
        if !spec.volatile {
            self.cache[reg as usize] = Some(value);
        }
        Ok(value)
    }

    /// Write `value` to `reg` and record it in the cache.
    pub fn write(&mut self, reg: u8, value: u8) -> Result<()> {
        let spec = self.spec(reg)?;
        self.write_hw(reg, value)?;
        if !spec.volatile {
            self.cache[reg as usize] = Some(value);
        }
        Ok(())
    }

    /// Read-modify-write: `new = (current & !mask) | (value & mask)`.
    ///
    /// Returns `true` when the register value changed. No bus write is issued
    /// when the masked update leaves the value as it was.
    pub fn update_bits(&mut self, reg: u8, mask: u8, value: u8) -> Result<bool> {
        let current = self.read(reg)?;
        let new = (current & !mask) | (value & mask);
        if new == current {
            return Ok(false);
        }
        self.write(reg, new)?;
        Ok(true)
    }

    // ── Bus transfers ──────────────────────────────────────────────────

    fn read_hw(&mut self, reg: u8) -> Result<u8> {
        let mut value = [0u8; 1];
        self.i2c
            .write_read(self.address, &[reg], &mut value)
            .map_err(Error::bus)?;
        Ok(value[0])
    }

    fn write_hw(&mut self, reg: u8, value: u8) -> Result<()> {
        #[cfg(feature = "defmt")]
        defmt::trace!("cs4265: write {=u8:#04x} <- {=u8:#04x}", reg, value);
        self.i2c
            .write(self.address, &[reg, value])
            .map_err(Error::bus)
    }
}
