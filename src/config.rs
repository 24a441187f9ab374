use crate::defs::Ctrl;

/// Shortest auxiliary capture period the hardware sustains reliably.
pub const MIN_CAPTURE_PERIOD_MS: u32 = 100;

/// Touch panel wiring supported by the analog front end.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Wires {
  Four,
  Five,
  Eight,
}

impl Wires {
  /// Map a raw wire count, as found in board platform data, onto the
  /// supported configurations.
  pub const fn from_count(wires: u8) -> Option<Self> {
    match wires {
      4 => Some(Self::Four),
      5 => Some(Self::Five),
      8 => Some(Self::Eight),
      _ => None,
    }
  }

  pub const fn count(self) -> u8 {
    match self {
      Self::Four => 4,
      Self::Five => 5,
      Self::Eight => 8,
    }
  }

  /// AFE pin-usage field of the control register.
  pub(crate) const fn ctrl_bits(self) -> Ctrl {
    match self {
      Self::Four => Ctrl::AFE_4WIRE,
      Self::Five => Ctrl::AFE_5WIRE,
      Self::Eight => Ctrl::AFE_8WIRE,
    }
  }
}

/// Static configuration consumed once at startup.
///
/// Construct with [`Config::new`] and adjust with the fluent helpers:
///
/// ```no_run
/// use tscadc::{Config, Wires};
///
/// let config = Config::new(Wires::Four, 200)
///   .with_adc(250)
///   .with_clock_rate(24_000_000);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Config {
  /// Panel wiring.
  pub wires: Wires,
  /// X-plate resistance in ohms, used by the pressure computation.
  pub x_plate_resistance: u32,
  /// Run the general-purpose sampler on steps 13..=16.
  pub adc_enabled: bool,
  /// Auxiliary capture period in milliseconds, floored at
  /// [`MIN_CAPTURE_PERIOD_MS`].
  pub adc_capture_period_ms: u32,
  /// Rate of the functional clock feeding the engine, in hertz.
  pub clock_rate_hz: u32,
}

impl Config {
  pub const fn new(wires: Wires, x_plate_resistance: u32) -> Self {
    Self {
      wires,
      x_plate_resistance,
      adc_enabled: false,
      adc_capture_period_ms: MIN_CAPTURE_PERIOD_MS,
      clock_rate_hz: 24_000_000,
    }
  }

  /// Enable the general-purpose sampler with the given capture period.
  /// Periods below [`MIN_CAPTURE_PERIOD_MS`] are clamped up.
  pub const fn with_adc(mut self, capture_period_ms: u32) -> Self {
    self.adc_enabled = true;
    self.adc_capture_period_ms = clamp_period(capture_period_ms);
    self
  }

  pub const fn with_clock_rate(mut self, clock_rate_hz: u32) -> Self {
    self.clock_rate_hz = clock_rate_hz;
    self
  }
}

pub(crate) const fn clamp_period(period_ms: u32) -> u32 {
  if period_ms < MIN_CAPTURE_PERIOD_MS {
    MIN_CAPTURE_PERIOD_MS
  } else {
    period_ms
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn wire_counts_round_trip() {
    assert_eq!(Wires::from_count(4), Some(Wires::Four));
    assert_eq!(Wires::from_count(5), Some(Wires::Five));
    assert_eq!(Wires::from_count(8), Some(Wires::Eight));
    assert_eq!(Wires::from_count(3), None);
    assert_eq!(Wires::Eight.count(), 8);
  }

  #[test]
  fn adc_period_is_floored_at_construction() {
    let config = Config::new(Wires::Four, 200).with_adc(50);
    assert_eq!(config.adc_capture_period_ms, 100);

    let config = Config::new(Wires::Four, 200).with_adc(250);
    assert_eq!(config.adc_capture_period_ms, 250);
  }
}
