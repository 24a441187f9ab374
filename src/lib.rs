#![no_std]
#![cfg_attr(docsrs, feature(doc_auto_cfg))]

//! `no_std` driver for the touchscreen/ADC subsystem (TSC_ADC_SS) found in
//! TI AM335x-class SoCs.
//!
//! The subsystem is a single analog-to-digital conversion engine that is
//! time-shared between a resistive touchscreen sampler and a general-purpose
//! four-channel sampler. A hardware sequencer runs up to 16 programmable
//! conversion steps and delivers results through two FIFOs on one interrupt
//! line. This crate exposes a strongly typed API on top of the raw register
//! window, with:
//!
//! - Step-table programming for 4/5/8-wire panels and the auxiliary channels
//! - An interrupt entry point that drains the FIFOs, rejects electrically
//!   noisy samples, derives contact pressure from the resistive-divider
//!   model, and debounces pen state before publishing events
//! - A timer entry point that paces the auxiliary sampler
//! - Suspend/resume with exact control-register restoration and optional
//!   wake-on-touch
//! - A register-bus seam so the logic runs against the real window or an
//!   in-memory fake
//!
//! ```no_run
//! use embedded_hal::delay::DelayNs;
//! use tscadc::{Config, Event, EventSink, Mmio, Tscadc, Wires};
//!
//! struct Input;
//!
//! impl EventSink for Input {
//!   fn report(&mut self, event: Event) {
//!     // forward to the platform's input subsystem
//!     let _ = event;
//!   }
//! }
//!
//! fn bring_up<D: DelayNs>(delay: D) -> Result<(), tscadc::Error> {
//!   let bus = unsafe { Mmio::new(0x44E0_D000) };
//!   let config = Config::new(Wires::Four, 200).with_adc(250);
//!   let mut engine = Tscadc::new(bus, Input, delay, config);
//!   engine.initialize()?;
//!   // Platform glue routes the hardware interrupt to `engine.on_interrupt()`
//!   // and a periodic timer to `engine.on_timer_tick()`.
//!   Ok(())
//! }
//! ```
//!
//! # Execution contexts
//!
//! [`Tscadc::on_interrupt`] and [`Tscadc::on_timer_tick`] are the only two
//! runtime entry points. The driver itself carries no locking: it relies on
//! the platform guaranteeing the two never execute concurrently (on a
//! single-core system where the timer callback cannot preempt the interrupt
//! handler this holds by construction). A multi-core platform must wrap the
//! driver in a non-reentrant lock, and suspend/resume callers must hold the
//! same exclusion.

#[cfg(test)]
extern crate std;

mod adc;
mod config;
mod defs;
mod event;
mod power;
mod rw;
mod sample;
mod steps;
#[cfg(test)]
mod testing;

pub use config::*;
pub use defs::{Reg, ADC_CHANNELS, MAX_12BIT};
pub use event::*;
pub use power::*;
pub use rw::*;

use defs::*;
use sample::Debounce;

/// Errors that can occur while bringing the engine up or moving it between
/// power states. Runtime sample anomalies are not errors; they are dropped
/// and the hardware's continuous sampling naturally retries.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Error {
  /// The functional clock cannot reach the conversion clock with a usable
  /// divider; the device must not come up.
  ClockTooSlow { divider: u32 },
  /// `resume` was called with no snapshot from a preceding `suspend`.
  NotSuspended,
}

/// The conversion engine: the single owner of the register window and of all
/// state shared between the interrupt and timer paths.
///
/// Generic over the register bus `B`, the event sink `S` receiving touch
/// reports, and a delay provider `D` for the one bounded busy-wait the
/// sample pipeline needs.
pub struct Tscadc<B, S, D> {
  bus: B,
  sink: S,
  delay: D,
  config: Config,
  /// Software mirror of the control register, kept for restore.
  ctrl: Ctrl,
  live: bool,
  debounce: Debounce,
  channels: [u16; ADC_CHANNELS],
  capture_period_ms: u32,
  snapshot: Option<PowerSnapshot>,
}

impl<B, S, D> Tscadc<B, S, D> {
  /// Create a driver instance. No register is touched until
  /// [`Tscadc::initialize`] runs.
  pub fn new(bus: B, sink: S, delay: D, config: Config) -> Self {
    Self {
      bus,
      sink,
      delay,
      capture_period_ms: clamp_period(config.adc_capture_period_ms),
      config,
      ctrl: Ctrl::empty(),
      live: false,
      debounce: Debounce::new(),
      channels: [0; ADC_CHANNELS],
      snapshot: None,
    }
  }

  /// Current pen debounce state.
  pub fn pen_state(&self) -> PenState {
    self.debounce.pen
  }

  /// Whether the engine is powered and converting.
  pub fn is_live(&self) -> bool {
    self.live
  }
}

impl<B, S, D> Tscadc<B, S, D>
where
  B: RegisterBus,
{
  /// Bring the engine up: program the clock divider, control register, idle
  /// step, touch steps and FIFO thresholds, then start converting.
  ///
  /// Fails if the functional clock is too slow for the conversion clock;
  /// that is fatal to device bring-up and reported exactly once, here.
  pub fn initialize(&mut self) -> Result<(), Error> {
    let divider = self.config.clock_rate_hz / ADC_CLOCK_HZ;
    if divider < MIN_CLOCK_DIVIDER {
      return Err(Error::ClockTooSlow { divider });
    }
    // The divider register takes the ratio minus one.
    self.bus.write(Reg::ClockDivider, divider - 1);

    let ctrl = Ctrl::STEP_CONFIG_WRITABLE | Ctrl::STEP_ID_TAG | Ctrl::TOUCH_ENABLE | self.config.wires.ctrl_bits();
    self.bus.write(Reg::Ctrl, ctrl.bits());
    self.ctrl = ctrl;

    self.program_idle_step();
    self.bus.write(Reg::IrqEnable, Irq::FIFO1_THRESHOLD.bits());
    self.program_touch_steps();
    self.bus.write(Reg::Fifo1Threshold, TOUCH_FIFO_THRESHOLD);

    if self.adc_active() {
      self.bus.write(Reg::IrqEnable, Irq::FIFO0_THRESHOLD.bits());
      self.program_adc_steps();
      self.bus.write(Reg::Fifo0Threshold, ADC_FIFO_THRESHOLD);
    }

    // Arm the touch group and only then release the engine; the auxiliary
    // group is armed exclusively by the timer path.
    self.enable_touch_steps();
    self.bus.write(Reg::Ctrl, (ctrl | Ctrl::ENABLE).bits());
    self.live = true;
    Ok(())
  }

  /// Quiesce the engine before teardown.
  ///
  /// Callers must stop the auxiliary timer first (waiting out any in-flight
  /// callback) and disable the interrupt source before unmapping the
  /// register window; this method only stops new conversions.
  pub fn shutdown(&mut self) {
    self.disable_all_steps();
    self.live = false;
  }
}
