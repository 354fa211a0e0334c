//! Discrete control lines around the codec.

use embedded_hal::digital::{OutputPin, PinState};

use crate::error::{Error, Result};

/// Output lines driving the headphone volume stepper, input gain stages,
/// true-bypass relays and (on the DuoX) the CV / expression pedal routing.
///
/// The volume and gain-stage lines are mandatory; the rest depend on the
/// board and are attached with the `with_*` builders.
pub struct DiscreteLines<P> {
    pub headphone_clk: P,
    pub headphone_dir: P,
    pub gain_stage_left: [P; 2],
    pub gain_stage_right: [P; 2],
    pub true_bypass_left: Option<P>,
    pub true_bypass_right: Option<P>,
    pub headphone_cv_mode: Option<P>,
    pub exp_enable1: Option<P>,
    pub exp_enable2: Option<P>,
}

impl<P> DiscreteLines<P> {
    pub fn new(headphone_clk: P, headphone_dir: P, gain_stage_left: [P; 2], gain_stage_right: [P; 2]) -> Self {
        Self {
            headphone_clk,
            headphone_dir,
            gain_stage_left,
            gain_stage_right,
            true_bypass_left: None,
            true_bypass_right: None,
            headphone_cv_mode: None,
            exp_enable1: None,
            exp_enable2: None,
        }
    }

    /// Attach the left and right true-bypass relay lines.
    pub fn with_true_bypass(mut self, left: P, right: P) -> Self {
        self.true_bypass_left = Some(left);
        self.true_bypass_right = Some(right);
        self
    }

    /// Attach the headphone/CV output selector and the two expression pedal
    /// enable lines.
    pub fn with_cv_exp_pedal(mut self, headphone_cv_mode: P, exp_enable1: P, exp_enable2: P) -> Self {
        self.headphone_cv_mode = Some(headphone_cv_mode);
        self.exp_enable1 = Some(exp_enable1);
        self.exp_enable2 = Some(exp_enable2);
        self
    }
}

/// Line levels `(line1, line2)` selecting each input gain stage.
pub const GAIN_STAGE_CODES: [(bool, bool); 4] = [(true, true), (true, false), (false, true), (false, false)];

/// Relay line level for a bypass state. The relay is active low: a low line
/// routes the input straight to the output.
pub const fn bypass_level(bypassed: bool) -> bool {
    !bypassed
}

/// Drive `pin` to `high`, mapping the HAL error.
pub(crate) fn drive<P: OutputPin>(pin: &mut P, high: bool) -> Result<()> {
    pin.set_state(PinState::from(high)).map_err(Error::line)
}

/// Drive an optional line; absent lines are skipped.
pub(crate) fn drive_opt<P: OutputPin>(pin: Option<&mut P>, high: bool) -> Result<()> {
    match pin {
        Some(pin) => drive(pin, high),
        None => Ok(()),
    }
}

/// One rising and falling edge on `clk`.
pub(crate) fn pulse<P: OutputPin>(clk: &mut P) -> Result<()> {
    drive(clk, true)?;
    drive(clk, false)
}
