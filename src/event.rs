/// Absolute position and contact pressure of the single supported contact.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct TouchPoint {
  pub x: u16,
  pub y: u16,
  /// Contact pressure, 0..=4095.
  pub pressure: u16,
}

impl TouchPoint {
  pub const fn new(x: u16, y: u16, pressure: u16) -> Self {
    Self { x, y, pressure }
  }
}

/// Event published by the sample pipeline.
///
/// `Contact` carries an accepted position sample with the touch-active
/// signal implied; `Released` reports the pen leaving the panel with
/// pressure back at zero.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Event {
  Contact(TouchPoint),
  Released,
}

impl Event {
  pub const fn is_contact(self) -> bool {
    matches!(self, Event::Contact(_))
  }

  pub const fn is_released(self) -> bool {
    matches!(self, Event::Released)
  }
}

/// Receiver for the events the interrupt path publishes.
///
/// One `report` call corresponds to one complete, synchronized frame; the
/// sink never sees partial coordinate updates. Implementations run in
/// interrupt context and must not block.
pub trait EventSink {
  fn report(&mut self, event: Event);
}

/// Pen debounce indicator kept across interrupts.
///
/// `Settling` covers the window between the first drained frame of a new
/// contact and the hardware confirming the pen; samples taken there are
/// bookkept but never published.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum PenState {
  Up,
  Settling,
  Down,
}

impl PenState {
  pub const fn is_down(self) -> bool {
    matches!(self, PenState::Down)
  }

  /// A contact is in progress, confirmed or not.
  pub const fn in_contact(self) -> bool {
    !matches!(self, PenState::Up)
  }
}
