//! Hand-written bus and line doubles shared by the unit tests.
//!
//! The I2C double is a 64-byte register file that records every write; the
//! pin double appends `(name, level)` to a log shared by all pins of a test so
//! ordering across lines can be asserted.

extern crate std;

use std::cell::{Cell, RefCell};
use std::rc::Rc;
use std::vec::Vec;

use embedded_hal::digital::{self, OutputPin};
use embedded_hal::i2c::{self, I2c, Operation};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MockError;

impl i2c::Error for MockError {
    fn kind(&self) -> i2c::ErrorKind {
        i2c::ErrorKind::Other
    }
}

impl digital::Error for MockError {
    fn kind(&self) -> digital::ErrorKind {
        digital::ErrorKind::Other
    }
}

// ── I2C ────────────────────────────────────────────────────────────────────

struct I2cState {
    regs: [u8; 64],
    writes: Vec<(u8, u8)>,
    reads: usize,
    fail_writes: bool,
    fail_reads: bool,
}

impl Default for I2cState {
    fn default() -> Self {
        Self {
            regs: [0; 64],
            writes: Vec::new(),
            reads: 0,
            fail_writes: false,
            fail_reads: false,
        }
    }
}

/// Register-file I2C double. Clones share state.
#[derive(Clone, Default)]
pub struct MockI2c {
    state: Rc<RefCell<I2cState>>,
}

impl MockI2c {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_reg(&self, reg: u8, value: u8) {
        self.state.borrow_mut().regs[reg as usize] = value;
    }

    pub fn reg(&self, reg: u8) -> u8 {
        self.state.borrow().regs[reg as usize]
    }

    pub fn writes(&self) -> Vec<(u8, u8)> {
        self.state.borrow().writes.clone()
    }

    pub fn last_write(&self) -> Option<(u8, u8)> {
        self.state.borrow().writes.last().copied()
    }

    pub fn clear_writes(&self) {
        self.state.borrow_mut().writes.clear();
    }

    pub fn read_count(&self) -> usize {
        self.state.borrow().reads
    }

    pub fn fail_writes(&self, fail: bool) {
        self.state.borrow_mut().fail_writes = fail;
    }

    pub fn fail_reads(&self, fail: bool) {
        self.state.borrow_mut().fail_reads = fail;
    }
}

impl i2c::ErrorType for MockI2c {
    type Error = MockError;
}

impl I2c for MockI2c {
    fn transaction(
        &mut self,
        _address: u8,
        operations: &mut [Operation<'_>],
    ) -> Result<(), Self::Error> {
        let mut state = self.state.borrow_mut();
        let mut pointer = 0u8;
        for op in operations.iter_mut() {
            match op {
                Operation::Write(bytes) => {
                    if let Some((&reg, data)) = bytes.split_first() {
                        pointer = reg;
                        if !data.is_empty() && state.fail_writes {
                            return Err(MockError);
                        }
                        for (i, &b) in data.iter().enumerate() {
                            let r = reg.wrapping_add(i as u8);
                            state.regs[r as usize % 64] = b;
                            state.writes.push((r, b));
                        }
                    }
                }
                Operation::Read(buf) => {
                    if state.fail_reads {
                        return Err(MockError);
                    }
                    state.reads += 1;
                    for (i, b) in buf.iter_mut().enumerate() {
                        *b = state.regs[(pointer as usize + i) % 64];
                    }
                }
            }
        }
        Ok(())
    }
}

// ── Pins ───────────────────────────────────────────────────────────────────

/// Shared transition log: `(pin name, level)`.
pub type PinLog = Rc<RefCell<Vec<(&'static str, bool)>>>;

pub fn pin_log() -> PinLog {
    Rc::new(RefCell::new(Vec::new()))
}

/// Output pin double that records every level it is driven to.
pub struct MockPin {
    name: &'static str,
    log: PinLog,
    fail: Rc<RefCell<bool>>,
    budget: Rc<Cell<Option<usize>>>,
}

impl MockPin {
    pub fn new(name: &'static str, log: &PinLog) -> Self {
        Self {
            name,
            log: log.clone(),
            fail: Rc::new(RefCell::new(false)),
            budget: Rc::new(Cell::new(None)),
        }
    }

    /// Handle that makes subsequent writes on this pin fail.
    pub fn failure_switch(&self) -> Rc<RefCell<bool>> {
        self.fail.clone()
    }

    /// Handle limiting how many more writes succeed. `None` means no limit.
    pub fn write_budget(&self) -> Rc<Cell<Option<usize>>> {
        self.budget.clone()
    }

    fn drive(&mut self, level: bool) -> Result<(), MockError> {
        if *self.fail.borrow() {
            return Err(MockError);
        }
        match self.budget.get() {
            Some(0) => return Err(MockError),
            Some(n) => self.budget.set(Some(n - 1)),
            None => {}
        }
        self.log.borrow_mut().push((self.name, level));
        Ok(())
    }
}

impl digital::ErrorType for MockPin {
    type Error = MockError;
}

impl OutputPin for MockPin {
    fn set_low(&mut self) -> Result<(), Self::Error> {
        self.drive(false)
    }

    fn set_high(&mut self) -> Result<(), Self::Error> {
        self.drive(true)
    }
}

/// Delay double; the reset pulse only needs to be ordered, not timed.
pub struct MockDelay;

impl embedded_hal::delay::DelayNs for MockDelay {
    fn delay_ns(&mut self, _ns: u32) {}
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fresh_register_file_is_zeroed() {
        let i2c = MockI2c::new();
        assert_eq!(i2c.reg(0x3F), 0);
        assert!(i2c.writes().is_empty());
        assert_eq!(i2c.read_count(), 0);
    }

    #[test]
    fn clones_share_register_file() {
        let mut i2c = MockI2c::new();
        let other = i2c.clone();
        i2c.write(0x4E, &[0x05, 0x20]).unwrap();
        assert_eq!(other.reg(0x05), 0x20);
        assert_eq!(other.last_write(), Some((0x05, 0x20)));
    }
}
