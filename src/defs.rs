/******************************************************************************
 * Refer to the AM335x TRM, section 12 "Touchscreen Controller and ADC        *
 * Subsystem (TSC_ADC_SS)", for more information.                             *
 * ========================================================================== *
 *                      TSC_ADC_SS - Registers & Bit Layout                   *
*******************************************************************************/

use bitflags::bitflags;

/// Conversion clock the engine is specified for, in hertz.
pub(crate) const ADC_CLOCK_HZ: u32 = 3_000_000;

/// Smallest usable ratio between the functional clock and [`ADC_CLOCK_HZ`].
pub(crate) const MIN_CLOCK_DIVIDER: u32 = 7;

/// Full scale of a 12-bit conversion result.
pub const MAX_12BIT: u16 = (1 << 12) - 1;

/// Position samples taken per axis in one touch sequence.
pub(crate) const POSITION_SAMPLES: usize = 5;

/// General-purpose channels served by steps 13..=16.
pub const ADC_CHANNELS: usize = 4;

/// Touch FIFO threshold: 5 X + 5 Y + z1 words raise the interrupt, z2
/// completes the frame (the register counts from zero).
pub(crate) const TOUCH_FIFO_THRESHOLD: u32 = 11;

/// Auxiliary FIFO threshold: one word per channel, counted from zero.
pub(crate) const ADC_FIFO_THRESHOLD: u32 = 3;

/// Largest per-axis delta (raw units) accepted as a steady contact.
pub(crate) const JITTER_LIMIT: u16 = 15;

/// Quiet window after a touch-FIFO drain before the FSM state is valid.
pub(crate) const FSM_SETTLE_US: u32 = 315;

/// Sequencer register value while no step is being converted.
pub(crate) const FSM_IDLE: u32 = 0x10;

/// Wakeup-enable register values.
pub(crate) const IRQ_WAKEUP_ENABLE: u32 = 1 << 0;
pub(crate) const IRQ_WAKEUP_DISABLE: u32 = 0x00;

/// Open/sample delay word shared by every programmed step.
pub(crate) const STEP_OPEN_DELAY: u32 = 0x018;
pub(crate) const STEP_SAMPLE_DELAY: u32 = 0x88;

/// Inter-step charge delay.
pub(crate) const CHARGE_STEP_DELAY: u32 = 0x1;

/// Register window of the conversion engine.
///
/// Step configuration and delay registers repeat per step slot (1..=16);
/// the remaining registers sit at fixed offsets.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Reg {
  /// End-of-interrupt handshake.
  IrqEoi,
  /// Raw interrupt status, unmasked.
  RawIrqStatus,
  /// Masked interrupt status; write-one-to-clear.
  IrqStatus,
  /// Interrupt enable; write-one-to-set.
  IrqEnable,
  /// Interrupt enable clear; write-one-to-clear.
  IrqClear,
  /// Wakeup enable for the pen event.
  IrqWakeup,
  /// Module control.
  Ctrl,
  /// Sequencer finite-state-machine status.
  AdcFsm,
  /// Functional-clock divider, programmed minus one.
  ClockDivider,
  /// Step enable bits; bit 0 covers the charge step, bits 1..=16 the slots.
  StepEnable,
  /// Step configuration applied while the sequencer is idle.
  IdleConfig,
  /// Charge step configuration.
  ChargeConfig,
  /// Charge step delay.
  ChargeDelay,
  /// Configuration for step slot 1..=16.
  StepConfig(u8),
  /// Open/sample delay for step slot 1..=16.
  StepDelay(u8),
  Fifo0Count,
  Fifo0Threshold,
  Fifo1Count,
  Fifo1Threshold,
  /// Read port of FIFO 0; each read pops one word.
  Fifo0Data,
  /// Read port of FIFO 1; each read pops one word.
  Fifo1Data,
}

impl Reg {
  /// Byte offset of the register inside the memory-mapped window.
  pub const fn offset(self) -> usize {
    match self {
      Reg::IrqEoi => 0x020,
      Reg::RawIrqStatus => 0x024,
      Reg::IrqStatus => 0x028,
      Reg::IrqEnable => 0x02C,
      Reg::IrqClear => 0x030,
      Reg::IrqWakeup => 0x034,
      Reg::Ctrl => 0x040,
      Reg::AdcFsm => 0x044,
      Reg::ClockDivider => 0x04C,
      Reg::StepEnable => 0x054,
      Reg::IdleConfig => 0x058,
      Reg::ChargeConfig => 0x05C,
      Reg::ChargeDelay => 0x060,
      Reg::StepConfig(n) => 0x064 + (n as usize - 1) * 8,
      Reg::StepDelay(n) => 0x068 + (n as usize - 1) * 8,
      Reg::Fifo0Count => 0x0E4,
      Reg::Fifo0Threshold => 0x0E8,
      Reg::Fifo1Count => 0x0F0,
      Reg::Fifo1Threshold => 0x0F4,
      Reg::Fifo0Data => 0x100,
      Reg::Fifo1Data => 0x200,
    }
  }
}

bitflags! {
  /// Interrupt bits, one layout shared by the status, raw-status, enable
  /// and clear registers.
  #[derive(Debug, Clone, Copy, PartialEq, Eq)]
  pub(crate) struct Irq: u32 {
    /// Hardware pen-touch latch.
    const HW_PEN = 1 << 0;
    const FIFO0_THRESHOLD = 1 << 2;
    const FIFO0_OVERRUN = 1 << 3;
    const FIFO0_UNDERFLOW = 1 << 4;
    const FIFO1_THRESHOLD = 1 << 5;
    const FIFO1_OVERRUN = 1 << 6;
    const FIFO1_UNDERFLOW = 1 << 7;
    const PEN_UP = 1 << 9;
  }
}

bitflags! {
  /// Step-enable register masks. The touch and auxiliary groups occupy
  /// disjoint bit ranges; the arbiter only ever sets one group at a time.
  #[derive(Debug, Clone, Copy, PartialEq, Eq)]
  pub(crate) struct StepMask: u32 {
    /// Charge step plus slots 1..=12.
    const TOUCH = 0x01FFF;
    /// Slots 13..=16.
    const ADC = 0x1E000;
  }
}

bitflags! {
  /// Per-step configuration word.
  #[derive(Debug, Clone, Copy, PartialEq, Eq)]
  pub(crate) struct StepConfig: u32 {
    const MODE_SW_ONESHOT = 0x0;
    const MODE_SW_CONTINUOUS = 0x1;
    const MODE_HW_ONESHOT = 0x2;
    const MODE_HW_CONTINUOUS = 0x3;
    const AVG_2 = 1 << 2;
    const AVG_4 = 2 << 2;
    const AVG_8 = 3 << 2;
    const AVG_16 = 4 << 2;
    /// Drive the X+ transistor.
    const XPP = 1 << 5;
    /// Drive the X- transistor.
    const XNN = 1 << 6;
    /// Drive the Y+ transistor.
    const YPP = 1 << 7;
    /// Drive the Y- transistor.
    const YNN = 1 << 8;
    const XNP = 1 << 9;
    const YPN = 1 << 10;
    const RFP = 1 << 12;
    /// Negative input tied to VREFN.
    const INM_REFN = 0x8 << 15;
    /// Positive input for X sampling on 4/8-wire panels (channel 2).
    const INP_X = 1 << 20;
    /// Positive input for the 5-wire sense wiper (channel 4).
    const INP_WIPER = 1 << 21;
    /// Positive input for the second pressure probe (channel 3).
    const INP_Z = 0x3 << 19;
    /// Positive input selection held during idle.
    const IDLE_INP = 1 << 22;
    /// Route the result to FIFO 1 instead of FIFO 0.
    const FIFO1 = 1 << 26;
  }
}

impl StepConfig {
  /// Positive input pin selection for a general-purpose channel.
  pub(crate) const fn positive_input(channel: u8) -> Self {
    Self::from_bits_retain((channel as u32) << 19)
  }
}

bitflags! {
  /// Charge step configuration word.
  #[derive(Debug, Clone, Copy, PartialEq, Eq)]
  pub(crate) struct ChargeConfig: u32 {
    const XPP = 1 << 5;
    const YNN = 1 << 8;
    const RFP = 1 << 12;
    const INM = 1 << 15;
    const INM_SWAP = 1 << 16;
    const INP = 1 << 19;
    const INP_SWAP = 1 << 20;
    const RFM = 1 << 23;
  }
}

bitflags! {
  /// Module control register.
  #[derive(Debug, Clone, Copy, PartialEq, Eq)]
  pub(crate) struct Ctrl: u32 {
    /// Master enable for the subsystem.
    const ENABLE = 1 << 0;
    /// Tag FIFO words with the originating step id.
    const STEP_ID_TAG = 1 << 1;
    /// Unprotect the step configuration registers.
    const STEP_CONFIG_WRITABLE = 1 << 2;
    /// Gate the analog front end's power.
    const POWER_DOWN = 1 << 4;
    const AFE_4WIRE = 0x1 << 5;
    const AFE_5WIRE = 0x1 << 6;
    const AFE_8WIRE = 0x3 << 5;
    /// Enable the touchscreen transistor matrix.
    const TOUCH_ENABLE = 1 << 7;
  }
}
