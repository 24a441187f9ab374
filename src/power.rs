//! Suspend/resume handling.
//!
//! The hardware keeps its control register across a wake-capable suspend
//! but loses the step tables whenever the analog front end powers down, so
//! resume always re-runs the step programming on top of restoring the
//! mirrored control value.

use crate::defs::*;
use crate::rw::RegisterBus;
use crate::{Error, Tscadc};

/// How the engine should behave while the system sleeps.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum WakeMode {
  /// Keep the engine clocked and let a pen touch wake the system.
  WakeOnTouch,
  /// Gate the analog front end completely.
  PowerDown,
}

/// Control state captured on the way into suspend, consumed by resume.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PowerSnapshot {
  pub(crate) ctrl: Ctrl,
  pub(crate) wake: WakeMode,
}

impl<B, S, D> Tscadc<B, S, D>
where
  B: RegisterBus,
{
  /// Enter a suspended state.
  ///
  /// With [`WakeMode::WakeOnTouch`] conversions stop but the engine stays
  /// clocked with the pen latch armed as a wake source; with
  /// [`WakeMode::PowerDown`] the analog front end is gated entirely.
  /// Callers run in the platform's suspend context and must hold the same
  /// exclusion as the interrupt and timer paths.
  pub fn suspend(&mut self, wake: WakeMode) {
    match wake {
      WakeMode::WakeOnTouch => {
        let enabled = self.bus.read(Reg::IrqEnable);
        self.bus.write(Reg::IrqEnable, enabled | Irq::HW_PEN.bits());
        self.disable_all_steps();
        self.bus.write(Reg::IrqWakeup, IRQ_WAKEUP_ENABLE);
      }
      WakeMode::PowerDown => {
        let ctrl = Ctrl::from_bits_retain(self.bus.read(Reg::Ctrl)).difference(Ctrl::ENABLE);
        self.bus.write(Reg::Ctrl, (ctrl | Ctrl::POWER_DOWN).bits());
      }
    }
    self.snapshot = Some(PowerSnapshot { ctrl: self.ctrl, wake });
    self.live = false;
  }

  /// Leave suspend and restore the exact pre-suspend register state.
  ///
  /// The control register is rewritten from the snapshot with the
  /// power-down bit forced off, the idle, touch and (if active) auxiliary
  /// step tables are re-programmed along with the FIFO thresholds, and the
  /// engine enable bit is set last. Calling this without a preceding
  /// [`Tscadc::suspend`] is an invariant violation and fails.
  pub fn resume(&mut self) -> Result<(), Error> {
    let snapshot = self.snapshot.take().ok_or(Error::NotSuspended)?;

    if snapshot.wake == WakeMode::WakeOnTouch {
      self.bus.write(Reg::IrqWakeup, IRQ_WAKEUP_DISABLE);
      self.bus.write(Reg::IrqClear, Irq::HW_PEN.bits());
    }

    self.bus.write(Reg::Ctrl, snapshot.ctrl.bits());
    let restore = Ctrl::from_bits_retain(self.bus.read(Reg::Ctrl)).difference(Ctrl::POWER_DOWN);
    self.bus.write(Reg::Ctrl, restore.bits());

    // Step tables do not survive a power-down; rebuild them wholesale.
    self.program_idle_step();
    self.program_touch_steps();
    self.bus.write(Reg::Fifo1Threshold, TOUCH_FIFO_THRESHOLD);
    if self.adc_active() {
      self.program_adc_steps();
      self.bus.write(Reg::Fifo0Threshold, ADC_FIFO_THRESHOLD);
    }

    self.enable_touch_steps();
    let ctrl = Ctrl::from_bits_retain(self.bus.read(Reg::Ctrl));
    self.bus.write(Reg::Ctrl, (ctrl | Ctrl::ENABLE).bits());
    self.live = true;
    Ok(())
  }
}
