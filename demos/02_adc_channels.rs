//! Drive the general-purpose sampler: the timer tick arms the auxiliary
//! steps, the simulated hardware fills FIFO 0, and the interrupt path
//! captures the four channel values.

use std::cell::RefCell;
use std::collections::VecDeque;
use std::rc::Rc;

use embedded_hal::delay::DelayNs;
use tscadc::{Config, Event, EventSink, Reg, RegisterBus, Tscadc, Wires};

const FIFO0_IRQ: u32 = 1 << 2;

struct Window {
  regs: [u32; 0x240 / 4],
  fifo0: VecDeque<u16>,
}

#[derive(Clone)]
struct Handle(Rc<RefCell<Window>>);

impl Handle {
  fn new() -> Self {
    Self(Rc::new(RefCell::new(Window { regs: [0; 0x240 / 4], fifo0: VecDeque::new() })))
  }

  /// The auxiliary steps ran: deliver one word per channel.
  fn inject_capture(&self, channels: [u16; 4]) {
    let mut w = self.0.borrow_mut();
    w.fifo0.extend(channels);
    w.regs[Reg::IrqStatus.offset() / 4] |= FIFO0_IRQ;
  }

  fn step_enable(&self) -> u32 {
    self.0.borrow().regs[Reg::StepEnable.offset() / 4]
  }
}

impl RegisterBus for Handle {
  fn read(&mut self, reg: Reg) -> u32 {
    let mut w = self.0.borrow_mut();
    match reg {
      Reg::Fifo0Data => u32::from(w.fifo0.pop_front().unwrap_or(0)),
      _ => w.regs[reg.offset() / 4],
    }
  }

  fn write(&mut self, reg: Reg, value: u32) {
    let mut w = self.0.borrow_mut();
    match reg {
      Reg::IrqStatus => w.regs[Reg::IrqStatus.offset() / 4] &= !value,
      _ => w.regs[reg.offset() / 4] = value,
    }
  }
}

struct Ignore;

impl EventSink for Ignore {
  fn report(&mut self, _event: Event) {}
}

struct Spin;

impl DelayNs for Spin {
  fn delay_ns(&mut self, _ns: u32) {}
}

fn main() {
  let window = Handle::new();
  let config = Config::new(Wires::Four, 200).with_adc(250);
  let mut engine = Tscadc::new(window.clone(), Ignore, Spin, config);
  engine.initialize().expect("clock satisfies the divider floor");

  // Writes below the floor are clamped up.
  engine.set_capture_period_ms(50);
  println!("period after writing 50 ms: {} ms", engine.capture_period_ms());
  engine.set_capture_period_ms(250);
  println!("period after writing 250 ms: {} ms", engine.capture_period_ms());

  for round in 0..3u16 {
    let next_tick = engine.on_timer_tick();
    println!("tick: auxiliary steps armed (0x{:05X}), next in {} ms", window.step_enable(), next_tick);

    let base = 0x400 + round * 0x10;
    window.inject_capture([base, base + 1, base + 2, base + 3]);
    engine.on_interrupt();
    println!("channels: {:?}", engine.channel_values());
  }
}
