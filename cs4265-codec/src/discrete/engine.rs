//! Open-loop protocol engine for the discrete control lines.
//!
//! Nothing on these lines is read back: the engine keeps a shadow copy of
//! every setting and derives line transitions from the difference between
//! the shadow and the request. When the lines were not provided, or the
//! engine has not been initialized, requests update the shadow only.

use embedded_hal::digital::OutputPin;

use super::event::PedalEvent;
use super::lines::{self, DiscreteLines, GAIN_STAGE_CODES};
use crate::constants::GAIN_STAGES;
use crate::error::{Error, Result};

/// Input or output channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Channel {
    Left,
    Right,
}

impl Channel {
    const fn index(self) -> usize {
        match self {
            Channel::Left => 0,
            Channel::Right => 1,
        }
    }
}

/// Which contact of the expression pedal jack carries the signal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum PedalSignal {
    Tip,
    Ring,
}

/// Discrete hardware fitted on a board.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct DiscreteCaps {
    /// Positions of the headphone volume device; also the number of
    /// calibration pulses.
    pub volume_steps: u8,
    /// True-bypass relays present.
    pub true_bypass: bool,
    /// Headphone/CV selector and expression pedal routing present.
    pub cv_exp_pedal: bool,
}

/// Shadow copy of every discrete setting.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct AuxiliaryState {
    pub volume_step: u8,
    pub gain_stage: [u8; 2],
    pub bypass: [bool; 2],
    /// `true` selects CV output, `false` headphone output.
    pub headphone_cv_mode: bool,
    /// `true` selects expression pedal input, `false` CV input.
    pub cv_exp_pedal_mode: bool,
    pub pedal_signal: PedalSignal,
    /// Lines are present and calibrated.
    pub initialized: bool,
    /// The pedal flag interrupt is wired up.
    pub flag_irq_available: bool,
}

impl Default for AuxiliaryState {
    fn default() -> Self {
        Self {
            volume_step: 0,
            gain_stage: [0; 2],
            bypass: [true; 2],
            headphone_cv_mode: false,
            cv_exp_pedal_mode: false,
            pedal_signal: PedalSignal::Tip,
            initialized: false,
            flag_irq_available: false,
        }
    }
}

/// Drives the discrete lines from shadow-state requests.
pub struct DiscreteEngine<P> {
    lines: Option<DiscreteLines<P>>,
    caps: DiscreteCaps,
    state: AuxiliaryState,
}

impl<P> DiscreteEngine<P>
where
    P: OutputPin,
{
    /// Create an engine. No line is touched until [`init`](Self::init).
    pub fn new(lines: Option<DiscreteLines<P>>, caps: DiscreteCaps) -> Self {
        Self {
            lines,
            caps,
            state: AuxiliaryState::default(),
        }
    }

    /// Calibrate the external hardware into a known state.
    ///
    /// Steps the volume device down `volume_steps` times, parks the pedal
    /// routing, selects gain stage 0 and puts both relays in bypass. Without
    /// lines the engine stays in shadow-only mode and this returns `Ok`.
    pub fn init(&mut self) -> Result<()> {
        let Some(lines) = self.lines.as_mut() else {
            #[cfg(feature = "defmt")]
            defmt::warn!("cs4265: {}, shadow-only mode", Error::LineUnavailable);
            self.state.initialized = false;
            return Ok(());
        };

        lines::drive(&mut lines.headphone_dir, false)?;
        for _ in 0..self.caps.volume_steps {
            lines::pulse(&mut lines.headphone_clk)?;
        }

        if self.caps.cv_exp_pedal {
            lines::drive_opt(lines.headphone_cv_mode.as_mut(), self.state.headphone_cv_mode)?;
            lines::drive_opt(lines.exp_enable1.as_mut(), false)?;
            lines::drive_opt(lines.exp_enable2.as_mut(), false)?;
        }

        let (l1, l2) = GAIN_STAGE_CODES[0];
        for pair in [&mut lines.gain_stage_left, &mut lines.gain_stage_right] {
            lines::drive(&mut pair[0], l1)?;
            lines::drive(&mut pair[1], l2)?;
        }

        if self.caps.true_bypass {
            let level = lines::bypass_level(true);
            lines::drive_opt(lines.true_bypass_left.as_mut(), level)?;
            lines::drive_opt(lines.true_bypass_right.as_mut(), level)?;
        }

        self.state.volume_step = 0;
        self.state.gain_stage = [0; 2];
        self.state.bypass = [true; 2];
        self.state.initialized = true;

        #[cfg(feature = "defmt")]
        defmt::debug!("cs4265: discrete lines calibrated ({=u8} pulses)", self.caps.volume_steps);
        Ok(())
    }

    pub fn is_initialized(&self) -> bool {
        self.state.initialized
    }

    /// `Err(LineUnavailable)` while requests only update the shadow state.
    pub fn check_lines(&self) -> Result<()> {
        if self.state.initialized {
            Ok(())
        } else {
            Err(Error::LineUnavailable)
        }
    }

    pub fn state(&self) -> &AuxiliaryState {
        &self.state
    }

    pub fn caps(&self) -> &DiscreteCaps {
        &self.caps
    }

    /// Record whether the pedal flag interrupt could be attached. Pedal
    /// routing lines are only driven while it is available.
    pub fn set_flag_irq_available(&mut self, available: bool) {
        #[cfg(feature = "defmt")]
        if !available {
            defmt::warn!("cs4265: expression pedal flag interrupt unavailable");
        }
        self.state.flag_irq_available = available;
    }

    /// Forget everything learned since construction. Lines are left as
    /// they are until the next [`init`](Self::init).
    pub fn reset_state(&mut self) {
        self.state = AuxiliaryState::default();
    }

    /// Give the lines back.
    pub fn release(self) -> Option<DiscreteLines<P>> {
        self.lines
    }

    fn active_lines(&mut self) -> Option<&mut DiscreteLines<P>> {
        if self.state.initialized {
            self.lines.as_mut()
        } else {
            None
        }
    }

    // ── Headphone volume ───────────────────────────────────────────────

    pub fn volume(&self) -> u8 {
        self.state.volume_step
    }

    /// Step the headphone volume device to `step`.
    ///
    /// Holds the direction line and emits one clock pulse per step of
    /// difference. Returns `false` without touching the lines when the step
    /// is unchanged.
    ///
    /// When a pulse fails the shadow keeps the steps completed before it, so
    /// a retry only emits the remainder. A pulse whose falling edge failed is
    /// not counted; if the device did latch it, [`init`](Self::init) brings
    /// device and shadow back in line.
    pub fn set_volume(&mut self, step: u8) -> Result<bool> {
        if step >= self.caps.volume_steps {
            return Err(Error::OutOfRange);
        }
        let current = self.state.volume_step;
        if step == current {
            return Ok(false);
        }
        let up = step > current;
        let mut reached = step;
        let mut failure = None;
        if let Some(lines) = self.active_lines() {
            lines::drive(&mut lines.headphone_dir, up)?;
            reached = current;
            while reached != step {
                if let Err(e) = lines::pulse(&mut lines.headphone_clk) {
                    failure = Some(e);
                    break;
                }
                reached = if up { reached + 1 } else { reached - 1 };
            }
        }
        self.state.volume_step = reached;
        if let Some(e) = failure {
            #[cfg(feature = "defmt")]
            defmt::warn!("cs4265: headphone volume stopped at {=u8} of {=u8}", reached, step);
            return Err(e);
        }
        #[cfg(feature = "defmt")]
        defmt::debug!("cs4265: headphone volume {=u8} -> {=u8}", current, step);
        Ok(true)
    }

    // ── Input gain stages ──────────────────────────────────────────────

    pub fn gain_stage(&self, channel: Channel) -> u8 {
        self.state.gain_stage[channel.index()]
    }

    /// Select input gain stage `stage` (0..=3) on `channel`. Both lines are
    /// driven even when the stage does not change.
    pub fn set_gain_stage(&mut self, channel: Channel, stage: u8) -> Result<bool> {
        if stage >= GAIN_STAGES {
            return Err(Error::OutOfRange);
        }
        let (l1, l2) = GAIN_STAGE_CODES[stage as usize];
        if let Some(lines) = self.active_lines() {
            let pair = match channel {
                Channel::Left => &mut lines.gain_stage_left,
                Channel::Right => &mut lines.gain_stage_right,
            };
            lines::drive(&mut pair[0], l1)?;
            lines::drive(&mut pair[1], l2)?;
        }
        let slot = &mut self.state.gain_stage[channel.index()];
        let changed = *slot != stage;
        *slot = stage;
        Ok(changed)
    }

    // ── True bypass ────────────────────────────────────────────────────

    pub fn bypass(&self, channel: Channel) -> bool {
        self.state.bypass[channel.index()]
    }

    /// Route `channel` around the codec (`true`) or through it (`false`).
    pub fn set_bypass(&mut self, channel: Channel, bypassed: bool) -> Result<bool> {
        if let Some(lines) = self.active_lines() {
            let line = match channel {
                Channel::Left => lines.true_bypass_left.as_mut(),
                Channel::Right => lines.true_bypass_right.as_mut(),
            };
            lines::drive_opt(line, lines::bypass_level(bypassed))?;
        }
        let slot = &mut self.state.bypass[channel.index()];
        let changed = *slot != bypassed;
        *slot = bypassed;
        Ok(changed)
    }

    // ── Headphone / CV output ──────────────────────────────────────────

    pub fn headphone_cv_mode(&self) -> bool {
        self.state.headphone_cv_mode
    }

    /// Select CV output (`true`) or headphone output (`false`).
    pub fn set_headphone_cv_mode(&mut self, cv: bool) -> Result<bool> {
        if let Some(lines) = self.active_lines() {
            lines::drive_opt(lines.headphone_cv_mode.as_mut(), cv)?;
        }
        let changed = self.state.headphone_cv_mode != cv;
        self.state.headphone_cv_mode = cv;
        Ok(changed)
    }

    // ── CV / expression pedal input ────────────────────────────────────

    pub fn cv_exp_pedal_mode(&self) -> bool {
        self.state.cv_exp_pedal_mode
    }

    pub fn pedal_signal(&self) -> PedalSignal {
        self.state.pedal_signal
    }

    /// Select expression pedal input (`true`) or CV input (`false`).
    ///
    /// CV input releases both pedal enables. Pedal input re-applies the
    /// current tip/ring routing.
    pub fn set_cv_exp_pedal_mode(&mut self, pedal: bool) -> Result<bool> {
        if pedal {
            self.route_pedal(self.state.pedal_signal)?;
        } else if let Some(lines) = self.active_lines() {
            lines::drive_opt(lines.exp_enable1.as_mut(), false)?;
            lines::drive_opt(lines.exp_enable2.as_mut(), false)?;
        }
        let changed = self.state.cv_exp_pedal_mode != pedal;
        self.state.cv_exp_pedal_mode = pedal;
        Ok(changed)
    }

    /// Route the pedal signal from the tip or the ring contact. The enable
    /// lines only move in pedal mode.
    pub fn set_pedal_signal(&mut self, signal: PedalSignal) -> Result<bool> {
        if self.state.cv_exp_pedal_mode {
            self.route_pedal(signal)?;
        }
        let changed = self.state.pedal_signal != signal;
        self.state.pedal_signal = signal;
        Ok(changed)
    }

    // Break-before-make: both enables are never high together. Skipped
    // while the flag interrupt is missing.
    fn route_pedal(&mut self, signal: PedalSignal) -> Result<()> {
        let irq = self.state.flag_irq_available;
        let Some(lines) = self.active_lines() else {
            return Ok(());
        };
        if !irq {
            #[cfg(feature = "defmt")]
            defmt::warn!("cs4265: pedal routing ignored, flag interrupt unavailable");
            return Ok(());
        }
        match signal {
            PedalSignal::Tip => {
                lines::drive_opt(lines.exp_enable1.as_mut(), false)?;
                lines::drive_opt(lines.exp_enable2.as_mut(), true)
            }
            PedalSignal::Ring => {
                lines::drive_opt(lines.exp_enable2.as_mut(), false)?;
                lines::drive_opt(lines.exp_enable1.as_mut(), true)
            }
        }
    }

    /// Apply a pedal interface event: any flag drops back to CV input.
    #[cfg_attr(not(feature = "defmt"), allow(unused_variables))]
    pub fn handle_event(&mut self, event: PedalEvent) -> Result<bool> {
        match event {
            PedalEvent::FlagRaised { flag1, flag2 } => {
                #[cfg(feature = "defmt")]
                defmt::warn!("cs4265: expression pedal flag raised ({=bool}, {=bool})", flag1, flag2);
                self.set_cv_exp_pedal_mode(false)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mock::{pin_log, MockPin, PinLog};
    extern crate std;
    use std::vec::Vec;

    const DUOX: DiscreteCaps = DiscreteCaps {
        volume_steps: 16,
        true_bypass: true,
        cv_exp_pedal: true,
    };

    const DWARF: DiscreteCaps = DiscreteCaps {
        volume_steps: 16,
        true_bypass: false,
        cv_exp_pedal: false,
    };

    fn duox_lines(log: &PinLog) -> DiscreteLines<MockPin> {
        DiscreteLines::new(
            MockPin::new("clk", log),
            MockPin::new("dir", log),
            [MockPin::new("gl1", log), MockPin::new("gl2", log)],
            [MockPin::new("gr1", log), MockPin::new("gr2", log)],
        )
        .with_true_bypass(MockPin::new("byl", log), MockPin::new("byr", log))
        .with_cv_exp_pedal(
            MockPin::new("cv", log),
            MockPin::new("en1", log),
            MockPin::new("en2", log),
        )
    }

    fn ready_engine(log: &PinLog) -> DiscreteEngine<MockPin> {
        let mut engine = DiscreteEngine::new(Some(duox_lines(log)), DUOX);
        engine.init().unwrap();
        engine.set_flag_irq_available(true);
        log.borrow_mut().clear();
        engine
    }

    fn count(log: &PinLog, name: &str, level: bool) -> usize {
        log.borrow().iter().filter(|&&(n, l)| n == name && l == level).count()
    }

    #[test]
    fn calibration_sequence() {
        let log = pin_log();
        let mut engine = DiscreteEngine::new(Some(duox_lines(&log)), DUOX);
        engine.init().unwrap();
        let entries = log.borrow().clone();
        assert_eq!(entries[0], ("dir", false));
        assert_eq!(count(&log, "clk", true), 16);
        assert_eq!(count(&log, "clk", false), 16);
        let tail: Vec<_> = entries[33..].to_vec();
        assert_eq!(
            tail,
            [
                ("cv", false),
                ("en1", false),
                ("en2", false),
                ("gl1", true),
                ("gl2", true),
                ("gr1", true),
                ("gr2", true),
                ("byl", false),
                ("byr", false),
            ]
        );
        assert!(engine.is_initialized());
    }

    #[test]
    fn calibration_skips_lines_the_board_lacks() {
        let log = pin_log();
        let lines = DiscreteLines::new(
            MockPin::new("clk", &log),
            MockPin::new("dir", &log),
            [MockPin::new("gl1", &log), MockPin::new("gl2", &log)],
            [MockPin::new("gr1", &log), MockPin::new("gr2", &log)],
        );
        let mut engine = DiscreteEngine::new(Some(lines), DWARF);
        engine.init().unwrap();
        assert_eq!(log.borrow().len(), 1 + 32 + 4);
    }

    #[test]
    fn volume_up_pulses_difference() {
        let log = pin_log();
        let mut engine = ready_engine(&log);
        assert!(engine.set_volume(5).unwrap());
        assert_eq!(log.borrow()[0], ("dir", true));
        assert_eq!(count(&log, "clk", true), 5);
        assert_eq!(count(&log, "dir", true), 1);

        log.borrow_mut().clear();
        assert!(engine.set_volume(2).unwrap());
        assert_eq!(log.borrow()[0], ("dir", false));
        assert_eq!(count(&log, "clk", true), 3);
        assert_eq!(engine.volume(), 2);
    }

    #[test]
    fn same_volume_is_unchanged_and_silent() {
        let log = pin_log();
        let mut engine = ready_engine(&log);
        assert!(engine.set_volume(7).unwrap());
        log.borrow_mut().clear();
        assert!(!engine.set_volume(7).unwrap());
        assert!(log.borrow().is_empty());
    }

    #[test]
    fn volume_out_of_range_rejected() {
        let log = pin_log();
        let mut engine = ready_engine(&log);
        assert_eq!(engine.set_volume(16), Err(Error::OutOfRange));
        assert_eq!(engine.volume(), 0);
        assert!(log.borrow().is_empty());
    }

    #[test]
    fn gain_stage_code_table() {
        let log = pin_log();
        let mut engine = ready_engine(&log);
        assert!(engine.set_gain_stage(Channel::Left, 2).unwrap());
        assert_eq!(*log.borrow(), [("gl1", false), ("gl2", true)]);
        log.borrow_mut().clear();
        assert!(engine.set_gain_stage(Channel::Right, 3).unwrap());
        assert_eq!(*log.borrow(), [("gr1", false), ("gr2", false)]);
        assert_eq!(engine.gain_stage(Channel::Left), 2);
        assert_eq!(engine.gain_stage(Channel::Right), 3);
    }

    #[test]
    fn gain_stage_rewrites_lines_when_unchanged() {
        let log = pin_log();
        let mut engine = ready_engine(&log);
        assert!(engine.set_gain_stage(Channel::Left, 1).unwrap());
        log.borrow_mut().clear();
        assert!(!engine.set_gain_stage(Channel::Left, 1).unwrap());
        assert_eq!(*log.borrow(), [("gl1", true), ("gl2", false)]);
    }

    #[test]
    fn gain_stage_out_of_range_keeps_shadow() {
        let log = pin_log();
        let mut engine = ready_engine(&log);
        assert_eq!(engine.set_gain_stage(Channel::Left, 4), Err(Error::OutOfRange));
        assert_eq!(engine.gain_stage(Channel::Left), 0);
    }

    #[test]
    fn bypass_is_active_low() {
        let log = pin_log();
        let mut engine = ready_engine(&log);
        assert!(engine.set_bypass(Channel::Left, false).unwrap());
        assert_eq!(*log.borrow(), [("byl", true)]);
        log.borrow_mut().clear();
        assert!(!engine.set_bypass(Channel::Left, false).unwrap());
        assert!(engine.set_bypass(Channel::Left, true).unwrap());
        assert_eq!(*log.borrow(), [("byl", true), ("byl", false)]);
    }

    #[test]
    fn pedal_routing_is_break_before_make() {
        let log = pin_log();
        let mut engine = ready_engine(&log);
        assert!(engine.set_cv_exp_pedal_mode(true).unwrap());
        assert_eq!(*log.borrow(), [("en1", false), ("en2", true)]);
        log.borrow_mut().clear();
        assert!(engine.set_pedal_signal(PedalSignal::Ring).unwrap());
        assert_eq!(*log.borrow(), [("en2", false), ("en1", true)]);
        log.borrow_mut().clear();
        assert!(engine.set_cv_exp_pedal_mode(false).unwrap());
        assert_eq!(*log.borrow(), [("en1", false), ("en2", false)]);
    }

    #[test]
    fn pedal_signal_in_cv_mode_is_shadow_only() {
        let log = pin_log();
        let mut engine = ready_engine(&log);
        assert!(engine.set_pedal_signal(PedalSignal::Ring).unwrap());
        assert!(log.borrow().is_empty());
        engine.set_cv_exp_pedal_mode(true).unwrap();
        assert_eq!(*log.borrow(), [("en2", false), ("en1", true)]);
    }

    #[test]
    fn pedal_routing_needs_flag_interrupt() {
        let log = pin_log();
        let mut engine = ready_engine(&log);
        engine.set_flag_irq_available(false);
        engine.set_cv_exp_pedal_mode(true).unwrap();
        assert!(log.borrow().is_empty());
        assert!(engine.cv_exp_pedal_mode());
    }

    #[test]
    fn flag_event_drops_to_cv_mode() {
        let log = pin_log();
        let mut engine = ready_engine(&log);
        engine.set_cv_exp_pedal_mode(true).unwrap();
        log.borrow_mut().clear();
        let changed = engine
            .handle_event(PedalEvent::FlagRaised { flag1: true, flag2: false })
            .unwrap();
        assert!(changed);
        assert!(!engine.cv_exp_pedal_mode());
        assert_eq!(*log.borrow(), [("en1", false), ("en2", false)]);
    }

    #[test]
    fn degraded_mode_updates_shadow_only() {
        let mut engine: DiscreteEngine<MockPin> = DiscreteEngine::new(None, DUOX);
        engine.init().unwrap();
        assert!(!engine.is_initialized());
        assert_eq!(engine.check_lines(), Err(Error::LineUnavailable));
        assert!(engine.set_volume(5).unwrap());
        assert!(!engine.set_volume(5).unwrap());
        assert_eq!(engine.volume(), 5);
        assert!(engine.set_gain_stage(Channel::Right, 1).unwrap());
        assert!(engine.set_bypass(Channel::Right, false).unwrap());
        assert!(engine.set_headphone_cv_mode(true).unwrap());
        assert!(engine.headphone_cv_mode());
    }

    #[test]
    fn line_failure_leaves_shadow() {
        let log = pin_log();
        let lines = duox_lines(&log);
        let clk_fail = lines.headphone_clk.failure_switch();
        let mut engine = DiscreteEngine::new(Some(lines), DUOX);
        engine.init().unwrap();
        *clk_fail.borrow_mut() = true;
        assert_eq!(
            engine.set_volume(3),
            Err(Error::Line(embedded_hal::digital::ErrorKind::Other))
        );
        assert_eq!(engine.volume(), 0);
    }

    #[test]
    fn interrupted_volume_train_keeps_completed_steps() {
        let log = pin_log();
        let lines = duox_lines(&log);
        let budget = lines.headphone_clk.write_budget();
        let mut engine = DiscreteEngine::new(Some(lines), DUOX);
        engine.init().unwrap();
        log.borrow_mut().clear();

        // two full pulses, then the rising edge of the third fails
        budget.set(Some(4));
        assert_eq!(
            engine.set_volume(5),
            Err(Error::Line(embedded_hal::digital::ErrorKind::Other))
        );
        assert_eq!(engine.volume(), 2);
        assert_eq!(count(&log, "clk", true), 2);

        budget.set(None);
        log.borrow_mut().clear();
        assert!(engine.set_volume(5).unwrap());
        assert_eq!(engine.volume(), 5);
        assert_eq!(count(&log, "clk", true), 3);

        // a failed falling edge is not counted
        budget.set(Some(3));
        log.borrow_mut().clear();
        assert!(engine.set_volume(1).is_err());
        assert_eq!(engine.volume(), 4);
        assert_eq!(log.borrow()[0], ("dir", false));
    }

    #[test]
    fn reset_state_forgets_settings() {
        let log = pin_log();
        let mut engine = ready_engine(&log);
        engine.set_flag_irq_available(true);
        engine.set_volume(7).unwrap();
        engine.set_headphone_cv_mode(true).unwrap();
        engine.reset_state();
        assert_eq!(*engine.state(), AuxiliaryState::default());
        assert!(!engine.is_initialized());
    }
}
