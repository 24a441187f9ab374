//! In-memory fakes shared by the unit tests.

use std::collections::VecDeque;
use std::vec::Vec;

use crate::defs::Irq;
use crate::event::{Event, EventSink};
use crate::rw::RegisterBus;
use crate::{Config, Reg, Tscadc, Wires};
use embedded_hal::delay::DelayNs;

pub(crate) type TestEngine = Tscadc<FakeBus, RecordingSink, NoopDelay>;

pub(crate) fn engine_with(config: Config) -> TestEngine {
  Tscadc::new(FakeBus::new(), RecordingSink::new(), NoopDelay, config)
}

pub(crate) fn four_wire_engine() -> TestEngine {
  engine_with(Config::new(Wires::Four, 200))
}

/// Register-window fake with just enough hardware behavior for the driver:
/// FIFO data ports pop a queued word per read, the status registers are
/// write-one-to-clear, the interrupt enable register is write-one-to-set
/// and its clear register write-one-to-clear. Everything else is plain
/// storage.
pub(crate) struct FakeBus {
  regs: [u32; 0x240 / 4],
  fifo0: VecDeque<u16>,
  fifo1: VecDeque<u16>,
}

impl FakeBus {
  pub(crate) fn new() -> Self {
    Self { regs: [0; 0x240 / 4], fifo0: VecDeque::new(), fifo1: VecDeque::new() }
  }

  /// Peek at the stored value without hardware side effects.
  pub(crate) fn value(&self, reg: Reg) -> u32 {
    self.regs[reg.offset() / 4]
  }

  /// Store a value directly, bypassing write semantics.
  pub(crate) fn set(&mut self, reg: Reg, value: u32) {
    self.regs[reg.offset() / 4] = value;
  }

  /// Latch interrupt bits into both the masked and raw status views.
  pub(crate) fn raise(&mut self, irq: Irq) {
    self.regs[Reg::IrqStatus.offset() / 4] |= irq.bits();
    self.regs[Reg::RawIrqStatus.offset() / 4] |= irq.bits();
  }

  /// Latch interrupt bits into the raw status view only.
  pub(crate) fn raise_raw(&mut self, irq: Irq) {
    self.regs[Reg::RawIrqStatus.offset() / 4] |= irq.bits();
  }

  pub(crate) fn push_fifo0(&mut self, words: &[u16]) {
    self.fifo0.extend(words);
  }

  pub(crate) fn push_fifo1(&mut self, words: &[u16]) {
    self.fifo1.extend(words);
  }
}

impl RegisterBus for FakeBus {
  fn read(&mut self, reg: Reg) -> u32 {
    match reg {
      Reg::Fifo0Data => u32::from(self.fifo0.pop_front().unwrap_or(0)),
      Reg::Fifo1Data => u32::from(self.fifo1.pop_front().unwrap_or(0)),
      _ => self.value(reg),
    }
  }

  fn write(&mut self, reg: Reg, value: u32) {
    match reg {
      Reg::IrqStatus => {
        self.regs[Reg::IrqStatus.offset() / 4] &= !value;
        self.regs[Reg::RawIrqStatus.offset() / 4] &= !value;
      }
      Reg::IrqEnable => self.regs[reg.offset() / 4] |= value,
      Reg::IrqClear => self.regs[Reg::IrqEnable.offset() / 4] &= !value,
      _ => self.regs[reg.offset() / 4] = value,
    }
  }
}

/// Event sink that records everything it is handed.
pub(crate) struct RecordingSink {
  pub(crate) events: Vec<Event>,
}

impl RecordingSink {
  pub(crate) fn new() -> Self {
    Self { events: Vec::new() }
  }
}

impl EventSink for RecordingSink {
  fn report(&mut self, event: Event) {
    self.events.push(event);
  }
}

/// The settle window is irrelevant on the fake bus.
pub(crate) struct NoopDelay;

impl DelayNs for NoopDelay {
  fn delay_ns(&mut self, _ns: u32) {}
}
