//! Interrupt-driven sample pipeline.
//!
//! One interrupt line reports both FIFOs and the pen latch. The handler
//! drains whatever signaled: auxiliary words go straight into the channel
//! set; touch words run through noise rejection, pressure derivation and
//! the pen debounce before an event may be published.

use crate::defs::*;
use crate::event::{Event, EventSink, PenState, TouchPoint};
use crate::rw::RegisterBus;
use crate::Tscadc;
use embedded_hal::delay::DelayNs;

/// Debounce bookkeeping carried across interrupts.
///
/// Mutated only by the sample pipeline; cleared back to `Up` whenever the
/// sequencer reports idle.
#[derive(Debug, Clone, Copy)]
pub(crate) struct Debounce {
  pub(crate) pen: PenState,
  pub(crate) last_x: u16,
  pub(crate) last_y: u16,
}

impl Debounce {
  pub(crate) const fn new() -> Self {
    Self { pen: PenState::Up, last_x: 0, last_y: 0 }
  }
}

/// One drained touch sequence: best position samples plus the two pressure
/// probe readings. Lives for the duration of a single interrupt.
struct TouchFrame {
  x: u16,
  y: u16,
  z1: u16,
  z2: u16,
}

impl<B, S, D> Tscadc<B, S, D>
where
  B: RegisterBus,
  S: EventSink,
  D: DelayNs,
{
  /// Interrupt entry point. Returns `true` if any condition was serviced.
  ///
  /// Must not run concurrently with [`Tscadc::on_timer_tick`] or the power
  /// transitions; see the crate docs on execution contexts.
  pub fn on_interrupt(&mut self) -> bool {
    let status = Irq::from_bits_retain(self.bus.read(Reg::IrqStatus));
    let mut handled = Irq::empty();

    if status.contains(Irq::FIFO0_THRESHOLD) {
      self.drain_adc_fifo();
      self.bus.write(Reg::IrqStatus, Irq::FIFO0_THRESHOLD.bits());
      handled |= Irq::FIFO0_THRESHOLD;
    }

    let mut pen_changed = status.contains(Irq::PEN_UP);
    if status.contains(Irq::FIFO1_THRESHOLD) {
      let frame = self.drain_touch_frame();
      self.evaluate_frame(&frame);
      handled |= Irq::FIFO1_THRESHOLD | Irq::HW_PEN;

      // The sequencer needs a quiet window after the drain before the raw
      // pen status and FSM state are trustworthy.
      self.delay.delay_us(FSM_SETTLE_US);
      let raw = Irq::from_bits_retain(self.bus.read(Reg::RawIrqStatus));
      pen_changed |= raw.contains(Irq::PEN_UP);
    }

    if pen_changed {
      self.arbitrate_pen_state();
      handled |= Irq::PEN_UP;
    }

    let ack = handled.difference(Irq::FIFO0_THRESHOLD);
    if !ack.is_empty() {
      self.bus.write(Reg::IrqStatus, ack.bits());
    }
    self.bus.write(Reg::IrqEoi, 0x00);

    // Touch sampling must continue while a contact may be present.
    if handled.contains(Irq::FIFO1_THRESHOLD) {
      self.enable_touch_steps();
    }

    !handled.is_empty()
  }

  /// Move the four auxiliary words into the channel set.
  fn drain_adc_fifo(&mut self) {
    for slot in 0..ADC_CHANNELS {
      self.channels[slot] = (self.bus.read(Reg::Fifo0Data) & u32::from(MAX_12BIT)) as u16;
    }
  }

  fn drain_touch_frame(&mut self) -> TouchFrame {
    let x = self.steadiest_sample();
    let y = self.steadiest_sample();
    let z1 = (self.bus.read(Reg::Fifo1Data) & u32::from(MAX_12BIT)) as u16;
    let z2 = (self.bus.read(Reg::Fifo1Data) & u32::from(MAX_12BIT)) as u16;
    TouchFrame { x, y, z1, z2 }
  }

  /// Read one 5-sample window from FIFO 1 and keep the sample with the
  /// smallest difference from its predecessor.
  ///
  /// A settling or bouncing contact produces a drifting sample train; the
  /// steadiest adjacent pair marks the point where the panel had settled,
  /// which beats averaging readings that include the transient.
  fn steadiest_sample(&mut self) -> u16 {
    let mut best = 0;
    let mut best_diff = u32::MAX;
    let mut previous = None;

    for _ in 0..POSITION_SAMPLES {
      let sample = (self.bus.read(Reg::Fifo1Data) & u32::from(MAX_12BIT)) as u16;
      match previous {
        // The first sample has no predecessor; it stands until any
        // measured difference beats it.
        None => best = sample,
        Some(previous) => {
          let diff = u32::from(sample.abs_diff(previous));
          if diff < best_diff {
            best_diff = diff;
            best = sample;
          }
        }
      }
      previous = Some(sample);
    }

    best
  }

  /// Apply debounce and jitter gating to a drained frame, publishing a
  /// contact event if it qualifies.
  fn evaluate_frame(&mut self, frame: &TouchFrame) {
    let dx = frame.x.abs_diff(self.debounce.last_x);
    let dy = frame.y.abs_diff(self.debounce.last_y);
    let pen_down = self.debounce.pen.is_down();

    // A frame while the pen is still officially up is the first evidence
    // of a new contact; it is never published.
    if self.debounce.pen == PenState::Up {
      self.debounce.pen = PenState::Settling;
    }
    // Delta continuity holds across interrupts whether or not this frame
    // is published.
    self.debounce.last_x = frame.x;
    self.debounce.last_y = frame.y;

    // A zero pressure probe means the conversion did not complete; drop
    // the frame and let the next cycle retry.
    if frame.z1 == 0 || frame.z2 == 0 {
      return;
    }
    let Some(pressure) = pressure(frame.z1, frame.z2, frame.x, self.config.x_plate_resistance) else {
      return;
    };

    if pen_down && dx < JITTER_LIMIT && dy < JITTER_LIMIT {
      self.sink.report(Event::Contact(TouchPoint::new(frame.x, frame.y, pressure)));
    }
  }

  /// The pen latch changed: ask the sequencer whether the contact is gone.
  fn arbitrate_pen_state(&mut self) {
    if self.bus.read(Reg::AdcFsm) == FSM_IDLE {
      let had_contact = self.debounce.pen.in_contact();
      self.debounce = Debounce::new();
      if had_contact {
        self.sink.report(Event::Released);
      }
    } else {
      // Still converting: the contact is real, start publishing.
      self.debounce.pen = PenState::Down;
    }
  }
}

/// Contact pressure from the resistive-divider model:
/// `R_touch = R_xplate * x/4096 * (z2/z1 - 1)`, scaled into 12-bit units as
/// `(z + 2047) >> 12`; that shift is the one rounding rule used throughout.
///
/// Returns `None` for frames the model rejects: an unloaded divider
/// (`z2 < z1`, only seen on incomplete conversions) or pressure beyond full
/// scale.
pub(crate) fn pressure(z1: u16, z2: u16, x: u16, x_plate_resistance: u32) -> Option<u16> {
  if z1 == 0 || z2 < z1 {
    return None;
  }
  let z = u64::from(z2 - z1) * u64::from(x) * u64::from(x_plate_resistance) / u64::from(z1);
  let z = (z + 2047) >> 12;
  if z > u64::from(MAX_12BIT) {
    return None;
  }
  Some(z as u16)
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::testing::*;
  use crate::{Config, Wires};

  fn touch_words(x: [u16; 5], y: [u16; 5], z1: u16, z2: u16) -> [u16; 12] {
    let mut words = [0; 12];
    words[..5].copy_from_slice(&x);
    words[5..10].copy_from_slice(&y);
    words[10] = z1;
    words[11] = z2;
    words
  }

  /// Feed one touch frame and run the handler.
  fn run_frame(engine: &mut TestEngine, words: &[u16], fsm: u32) {
    engine.bus.raise(Irq::FIFO1_THRESHOLD);
    engine.bus.raise_raw(Irq::PEN_UP);
    engine.bus.set(Reg::AdcFsm, fsm);
    engine.bus.push_fifo1(words);
    assert!(engine.on_interrupt());
  }

  const FSM_BUSY: u32 = 0x20;

  #[test]
  fn steadiest_sample_picks_minimal_successive_difference() {
    let mut engine = four_wire_engine();
    // Differences: 900, 40, 3, 60; the third pair is the steadiest.
    engine.bus.push_fifo1(&[100, 1000, 1040, 1043, 1103]);
    assert_eq!(engine.steadiest_sample(), 1043);
  }

  #[test]
  fn steadiest_sample_first_minimum_wins_ties() {
    let mut engine = four_wire_engine();
    // Both later pairs differ by 5; the first of them is kept.
    engine.bus.push_fifo1(&[200, 205, 210, 900, 905]);
    assert_eq!(engine.steadiest_sample(), 205);
  }

  #[test]
  fn pressure_matches_reference_rounding() {
    // (300 - 100) * 2000 * 200 / 100 = 800000; (800000 + 2047) >> 12 = 195.
    assert_eq!(pressure(100, 300, 2000, 200), Some(195));
  }

  #[test]
  fn pressure_rejects_out_of_range_and_unloaded_divider() {
    assert_eq!(pressure(1, 4095, 4095, 100_000), None);
    assert_eq!(pressure(300, 100, 2000, 200), None);
    // Equal probes are a valid zero-pressure frame.
    assert_eq!(pressure(300, 300, 2000, 200), Some(0));
  }

  #[test]
  fn first_frame_after_contact_is_suppressed() {
    let mut engine = four_wire_engine();
    engine.initialize().unwrap();

    // Pen was up; the first frame settles, the FSM (busy) promotes to down.
    run_frame(&mut engine, &touch_words([2000; 5], [1000; 5], 100, 300), FSM_BUSY);
    assert!(engine.sink.events.is_empty());
    assert_eq!(engine.pen_state(), PenState::Down);

    // Second frame within the jitter window is published.
    run_frame(&mut engine, &touch_words([2005; 5], [1004; 5], 100, 300), FSM_BUSY);
    assert_eq!(engine.sink.events.as_slice(), &[Event::Contact(TouchPoint::new(2005, 1004, 196))]);
  }

  #[test]
  fn jittery_frames_are_dropped_but_tracked() {
    let mut engine = four_wire_engine();
    engine.initialize().unwrap();
    run_frame(&mut engine, &touch_words([2000; 5], [1000; 5], 100, 300), FSM_BUSY);

    // Jumps beyond the 15-unit window: dropped, but the backup coordinates
    // move so the next delta is measured against this frame.
    run_frame(&mut engine, &touch_words([2100; 5], [1000; 5], 100, 300), FSM_BUSY);
    assert!(engine.sink.events.is_empty());

    run_frame(&mut engine, &touch_words([2104; 5], [1002; 5], 100, 300), FSM_BUSY);
    assert_eq!(engine.sink.events.len(), 1);
  }

  #[test]
  fn zero_pressure_probe_skips_publication_but_keeps_bookkeeping() {
    let mut engine = four_wire_engine();
    engine.initialize().unwrap();
    run_frame(&mut engine, &touch_words([2000; 5], [1000; 5], 100, 300), FSM_BUSY);

    run_frame(&mut engine, &touch_words([2004; 5], [1003; 5], 0, 300), FSM_BUSY);
    assert!(engine.sink.events.is_empty());

    // Coordinates advanced during the invalid frame.
    run_frame(&mut engine, &touch_words([2008; 5], [1006; 5], 100, 300), FSM_BUSY);
    assert_eq!(engine.sink.events.as_slice(), &[Event::Contact(TouchPoint::new(2008, 1006, 196))]);
  }

  #[test]
  fn pen_up_emits_one_release_and_resets_coordinates() {
    let mut engine = four_wire_engine();
    engine.initialize().unwrap();
    run_frame(&mut engine, &touch_words([2000; 5], [1000; 5], 100, 300), FSM_BUSY);
    run_frame(&mut engine, &touch_words([2005; 5], [1002; 5], 100, 300), FSM_BUSY);
    engine.sink.events.clear();

    // The lift-off frame reads dead pressure probes and cannot publish.
    run_frame(&mut engine, &touch_words([2006; 5], [1002; 5], 0, 0), FSM_IDLE);
    assert_eq!(engine.sink.events.as_slice(), &[Event::Released]);
    assert_eq!(engine.pen_state(), PenState::Up);
    assert_eq!(engine.debounce.last_x, 0);
    assert_eq!(engine.debounce.last_y, 0);
  }

  #[test]
  fn pen_event_without_contact_publishes_nothing() {
    let mut engine = four_wire_engine();
    engine.initialize().unwrap();
    // A stray pen latch with the sequencer idle and nothing in flight.
    engine.bus.raise(Irq::PEN_UP);
    engine.bus.set(Reg::AdcFsm, FSM_IDLE);
    assert!(engine.on_interrupt());
    assert!(engine.sink.events.is_empty());
    assert_eq!(engine.pen_state(), PenState::Up);
  }

  #[test]
  fn touch_fifo_drain_rearms_touch_steps() {
    let mut engine = four_wire_engine();
    engine.initialize().unwrap();
    engine.disable_all_steps();
    run_frame(&mut engine, &touch_words([2000; 5], [1000; 5], 100, 300), FSM_BUSY);
    assert_eq!(engine.bus.value(Reg::StepEnable), StepMask::TOUCH.bits());
  }

  #[test]
  fn adc_fifo_drain_fills_channels_and_acks() {
    let mut engine = Tscadc::new(
      FakeBus::new(),
      RecordingSink::new(),
      NoopDelay,
      Config::new(Wires::Four, 200).with_adc(120),
    );
    engine.initialize().unwrap();
    engine.bus.raise(Irq::FIFO0_THRESHOLD);
    engine.bus.push_fifo0(&[0x1FFF, 0x234, 0x345, 0x456]);
    assert!(engine.on_interrupt());
    // Words are masked to 12 bits; no touch event results.
    assert_eq!(engine.channel_values(), [0xFFF, 0x234, 0x345, 0x456]);
    assert!(engine.sink.events.is_empty());
    assert_eq!(engine.bus.value(Reg::IrqStatus) & Irq::FIFO0_THRESHOLD.bits(), 0);
  }

  #[test]
  fn idle_interrupt_reports_unhandled() {
    let mut engine = four_wire_engine();
    engine.initialize().unwrap();
    assert!(!engine.on_interrupt());
  }
}
