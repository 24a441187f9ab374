//! Timer-paced general-purpose sampling.
//!
//! The timer path only ever arms the auxiliary step group; capturing the
//! results is entirely the interrupt path's job. Keeping the re-arm on the
//! timer cadence enforces the minimum capture period no matter how fast the
//! FIFO drains.

use crate::config::clamp_period;
use crate::defs::ADC_CHANNELS;
use crate::rw::RegisterBus;
use crate::{Tscadc, Wires};

impl<B, S, D> Tscadc<B, S, D> {
  /// Most recent 12-bit sample of each auxiliary channel.
  ///
  /// Values are plain words updated by the interrupt path; a reader sees
  /// the latest completed capture.
  pub fn channel_values(&self) -> [u16; ADC_CHANNELS] {
    self.channels
  }

  /// Current auxiliary capture period in milliseconds.
  pub fn capture_period_ms(&self) -> u32 {
    self.capture_period_ms
  }

  /// Change the auxiliary capture period. Writes below
  /// [`crate::MIN_CAPTURE_PERIOD_MS`] are clamped up; the new period takes
  /// effect at the next timer tick.
  pub fn set_capture_period_ms(&mut self, period_ms: u32) {
    self.capture_period_ms = clamp_period(period_ms);
  }

  /// Whether the general-purpose sampler participates at all: it needs the
  /// enable flag and a 4-wire panel, since 5/8-wire setups repurpose the
  /// auxiliary input pins as sense lines.
  pub(crate) fn adc_active(&self) -> bool {
    self.config.adc_enabled && matches!(self.config.wires, Wires::Four)
  }
}

impl<B, S, D> Tscadc<B, S, D>
where
  B: RegisterBus,
{
  /// Timer entry point. Arms the auxiliary step group for one capture and
  /// returns the delay in milliseconds until the next tick.
  ///
  /// Runs on the timer context only; see the crate docs on execution
  /// contexts. While the engine is suspended the tick keeps the cadence
  /// but leaves the hardware untouched.
  pub fn on_timer_tick(&mut self) -> u32 {
    if self.live && self.adc_active() {
      self.enable_adc_steps();
    }
    self.capture_period_ms
  }
}
