//! Replay a synthetic pen stroke against a simulated register window and
//! print the events the driver publishes.

use std::cell::RefCell;
use std::collections::VecDeque;
use std::rc::Rc;

use embedded_hal::delay::DelayNs;
use tscadc::{Config, Event, EventSink, Reg, RegisterBus, Tscadc, Wires};

const FIFO1_IRQ: u32 = 1 << 5;
const PEN_UP_IRQ: u32 = 1 << 9;
const FSM_IDLE: u32 = 0x10;
const FSM_BUSY: u32 = 0x20;

struct Window {
  regs: [u32; 0x240 / 4],
  fifo1: VecDeque<u16>,
}

/// Cloneable handle so the demo can play the hardware's role between
/// interrupts while the driver owns its own handle.
#[derive(Clone)]
struct Handle(Rc<RefCell<Window>>);

impl Handle {
  fn new() -> Self {
    Self(Rc::new(RefCell::new(Window { regs: [0; 0x240 / 4], fifo1: VecDeque::new() })))
  }

  /// Latch a complete touch sequence: 5 X words, 5 Y words, z1, z2.
  fn inject_frame(&self, x: [u16; 5], y: [u16; 5], z1: u16, z2: u16, fsm: u32) {
    let mut w = self.0.borrow_mut();
    w.fifo1.extend(x);
    w.fifo1.extend(y);
    w.fifo1.extend([z1, z2]);
    w.regs[Reg::IrqStatus.offset() / 4] |= FIFO1_IRQ;
    w.regs[Reg::RawIrqStatus.offset() / 4] |= PEN_UP_IRQ;
    w.regs[Reg::AdcFsm.offset() / 4] = fsm;
  }
}

impl RegisterBus for Handle {
  fn read(&mut self, reg: Reg) -> u32 {
    let mut w = self.0.borrow_mut();
    match reg {
      Reg::Fifo1Data => u32::from(w.fifo1.pop_front().unwrap_or(0)),
      _ => w.regs[reg.offset() / 4],
    }
  }

  fn write(&mut self, reg: Reg, value: u32) {
    let mut w = self.0.borrow_mut();
    match reg {
      // Status is write-one-to-clear and mirrored into the raw view.
      Reg::IrqStatus => {
        w.regs[Reg::IrqStatus.offset() / 4] &= !value;
        w.regs[Reg::RawIrqStatus.offset() / 4] &= !value;
      }
      _ => w.regs[reg.offset() / 4] = value,
    }
  }
}

struct Printer;

impl EventSink for Printer {
  fn report(&mut self, event: Event) {
    match event {
      Event::Contact(point) => {
        println!("contact at ({:4}, {:4}) pressure {:3}", point.x, point.y, point.pressure)
      }
      Event::Released => println!("released"),
    }
  }
}

struct Spin;

impl DelayNs for Spin {
  fn delay_ns(&mut self, _ns: u32) {}
}

fn main() {
  let window = Handle::new();
  let config = Config::new(Wires::Four, 200);
  let mut engine = Tscadc::new(window.clone(), Printer, Spin, config);
  engine.initialize().expect("clock satisfies the divider floor");

  // A short drag: the first frame is settling noise and stays unpublished,
  // the following ones walk the contact across the panel.
  let stroke = [
    ([1893, 2011, 2004, 2006, 2104], [1080, 1012, 1014, 1015, 1071]),
    ([2006, 2008, 2008, 2009, 2013], [1016, 1015, 1015, 1016, 1018]),
    ([2014, 2016, 2017, 2017, 2020], [1020, 1022, 1022, 1023, 1025]),
    ([2021, 2024, 2024, 2025, 2027], [1026, 1028, 1028, 1029, 1030]),
  ];
  for (x, y) in stroke {
    window.inject_frame(x, y, 210, 640, FSM_BUSY);
    engine.on_interrupt();
  }

  // Pen leaves the panel: dead pressure probes, sequencer idle.
  window.inject_frame([2027; 5], [1030; 5], 0, 0, FSM_IDLE);
  engine.on_interrupt();
}
