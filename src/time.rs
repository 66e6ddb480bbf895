//! Microsecond timebase.

/// A point on a wrapping 32 bit microsecond timeline
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct Instant(pub u32);

impl Instant {
    /// Microseconds from `earlier` to `self`, correct across one wrap.
    pub fn since(self, earlier: Instant) -> u32 {
        self.0.wrapping_sub(earlier.0)
    }
}

/// Free running microsecond clock.
///
/// The counter wraps after about 71 minutes; intervals measured with it must
/// stay shorter than that.
pub trait Monotonic {
    fn now(&self) -> Instant;

    fn elapsed_us(&self, since: Instant) -> u32 {
        self.now().since(since)
    }
}

impl<T: Monotonic> Monotonic for &T {
    fn now(&self) -> Instant {
        (**self).now()
    }
}
