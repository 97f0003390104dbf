use std::time::{SystemTime, UNIX_EPOCH};

/// Source of wall-clock seconds for deadlines.
pub trait UnixClock {
  fn now(&self) -> u64;
}

/// Reads the host clock.
#[derive(Clone, Copy, Debug, Default)]
pub struct SystemClock;

impl UnixClock for SystemClock {
  fn now(&self) -> u64 {
    SystemTime::now()
      .duration_since(UNIX_EPOCH)
      .map_or(0, |elapsed| elapsed.as_secs())
  }
}

/// Always reports the same instant.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct FixedClock(pub u64);

impl UnixClock for FixedClock {
  fn now(&self) -> u64 {
    self.0
  }
}

impl<C: UnixClock + ?Sized> UnixClock for &C {
  fn now(&self) -> u64 {
    (**self).now()
  }
}
