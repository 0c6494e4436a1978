/// Time source for the loop driver, and play-time formatting.

use std::time::Instant;

/// Where the loop driver reads "now" from. Injected so the driver can be
/// run against a manual clock in tests.
pub trait Clock {
    fn now(&self) -> Instant;
}

pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Instant {
        Instant::now()
    }
}

/// Clock that only moves when told to.
#[cfg(test)]
pub struct ManualClock {
    now: std::cell::Cell<Instant>,
}

#[cfg(test)]
impl ManualClock {
    pub fn new() -> Self {
        ManualClock { now: std::cell::Cell::new(Instant::now()) }
    }

    pub fn advance(&self, ms: u64) {
        self.now.set(self.now.get() + std::time::Duration::from_millis(ms));
    }
}

#[cfg(test)]
impl Clock for ManualClock {
    fn now(&self) -> Instant {
        self.now.get()
    }
}

/// `hh:mm:ss.d`: hours, minutes and seconds zero-padded to two digits,
/// then tenths of a second.
pub fn format_play_time(ms: u64) -> String {
    let tenths = (ms % 1000) / 100;
    let secs = ms / 1000;
    format!(
        "{:02}:{:02}:{:02}.{}",
        secs / 3600,
        (secs / 60) % 60,
        secs % 60,
        tenths,
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn formats_hours_minutes_seconds_tenths() {
        assert_eq!(format_play_time(3_661_234), "01:01:01.2");
    }

    #[test]
    fn formats_zero() {
        assert_eq!(format_play_time(0), "00:00:00.0");
    }

    #[test]
    fn tenths_truncate() {
        assert_eq!(format_play_time(59_999), "00:00:59.9");
        assert_eq!(format_play_time(60_000), "00:01:00.0");
    }

    #[test]
    fn hours_grow_past_two_digits() {
        assert_eq!(format_play_time(100 * 3_600_000), "100:00:00.0");
    }

    #[test]
    fn manual_clock_moves_only_on_advance() {
        let c = ManualClock::new();
        let t0 = c.now();
        assert_eq!(c.now(), t0);
        c.advance(250);
        assert_eq!(c.now().duration_since(t0).as_millis(), 250);
    }
}
