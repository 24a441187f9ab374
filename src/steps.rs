//! Conversion-step programming and arbitration of the shared sequencer.
//!
//! Steps 1..=12 belong to the touch sampler (5 X probes, 5 Y probes, two
//! pressure probes), steps 13..=16 to the general-purpose sampler. The two
//! groups are never armed from the same path: touch steps are re-armed by
//! the interrupt-return and resume paths, auxiliary steps only by the timer
//! callback, which keeps the FIFOs uncontaminated without any locking.

use crate::defs::*;
use crate::rw::RegisterBus;
use crate::{Tscadc, Wires};

impl<B, S, D> Tscadc<B, S, D>
where
  B: RegisterBus,
{
  /// Program the touch step group for the configured panel wiring.
  ///
  /// Writes the 10 position steps and 2 pressure steps (all hardware
  /// synchronized, continuous, 16-sample averaged, routed to FIFO 1) plus
  /// the charge step. Idempotent; the resume path reruns it verbatim.
  pub(crate) fn program_touch_steps(&mut self) {
    let delay = STEP_SAMPLE_DELAY | STEP_OPEN_DELAY;
    let base = StepConfig::MODE_HW_CONTINUOUS | StepConfig::AVG_16 | StepConfig::FIFO1;

    let mut x_step = base | StepConfig::XPP;
    let mut y_step = base | StepConfig::YNN | StepConfig::INM_REFN;
    match self.config.wires {
      // 4- and 8-wire panels probe identically; 8-wire only differs in the
      // AFE field of the control register.
      Wires::Four | Wires::Eight => {
        x_step |= StepConfig::INP_X | StepConfig::XNN;
        y_step |= StepConfig::YPP;
      }
      // 5-wire panels drive all four corners and sense through the wiper.
      Wires::Five => {
        x_step |= StepConfig::YNN | StepConfig::INP_WIPER | StepConfig::XNN | StepConfig::YPP;
        y_step |= StepConfig::XPP | StepConfig::INP_WIPER | StepConfig::XNP | StepConfig::YPN;
      }
    }

    for step in 1..=5 {
      self.bus.write(Reg::StepConfig(step), x_step.bits());
      self.bus.write(Reg::StepDelay(step), delay);
    }
    for step in 6..=10 {
      self.bus.write(Reg::StepConfig(step), y_step.bits());
      self.bus.write(Reg::StepDelay(step), delay);
    }

    let charge = ChargeConfig::XPP
      | ChargeConfig::YNN
      | ChargeConfig::RFP
      | ChargeConfig::RFM
      | ChargeConfig::INM
      | ChargeConfig::INP;
    self.bus.write(Reg::ChargeConfig, charge.bits());
    self.bus.write(Reg::ChargeDelay, CHARGE_STEP_DELAY);

    let z1_step = base | StepConfig::XNP | StepConfig::YPN | StepConfig::INM_REFN;
    let z2_step = z1_step | StepConfig::INP_Z;
    self.bus.write(Reg::StepConfig(11), z1_step.bits());
    self.bus.write(Reg::StepDelay(11), delay);
    self.bus.write(Reg::StepConfig(12), z2_step.bits());
    self.bus.write(Reg::StepDelay(12), delay);
  }

  /// Program steps 13..=16 for the general-purpose channels.
  ///
  /// One software-triggered one-shot step per channel, 16-sample averaged,
  /// referenced against VREFN, routed to FIFO 0. Idempotent.
  pub(crate) fn program_adc_steps(&mut self) {
    let delay = STEP_SAMPLE_DELAY | STEP_OPEN_DELAY;
    let base = StepConfig::MODE_SW_ONESHOT | StepConfig::AVG_16;

    for (slot, channel) in (13..=16).zip(4u8..) {
      let step = base | StepConfig::positive_input(channel) | StepConfig::INM_REFN;
      self.bus.write(Reg::StepConfig(slot), step.bits());
      self.bus.write(Reg::StepDelay(slot), delay);
    }
  }

  /// Step configuration applied while the sequencer is idle, keeping the
  /// panel biased for pen detection.
  pub(crate) fn program_idle_step(&mut self) {
    let idle = StepConfig::YNN | StepConfig::INM_REFN | StepConfig::IDLE_INP | StepConfig::YPN;
    self.bus.write(Reg::IdleConfig, idle.bits());
  }

  /// Re-arm the touch step group. Interrupt-return and resume paths only.
  pub(crate) fn enable_touch_steps(&mut self) {
    self.arm_steps(StepMask::TOUCH);
  }

  /// Re-arm the auxiliary step group. Timer path only.
  pub(crate) fn enable_adc_steps(&mut self) {
    self.arm_steps(StepMask::ADC);
  }

  /// Stop every step group; no conversion starts after this write.
  pub(crate) fn disable_all_steps(&mut self) {
    self.bus.write(Reg::StepEnable, 0x00);
  }

  fn arm_steps(&mut self, group: StepMask) {
    let enabled = self.bus.read(Reg::StepEnable);
    self.bus.write(Reg::StepEnable, enabled | group.bits());
  }
}
