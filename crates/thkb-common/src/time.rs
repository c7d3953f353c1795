/// A point in time, in milliseconds, as reported by a free running 16-bit
/// timer. The timer wraps every ~65 seconds, so instants are only meaningful
/// when compared against recent ones.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Instant {
    millis: u16,
}

impl Instant {
    pub const fn from_millis(millis: u16) -> Self {
        Instant { millis }
    }

    pub const fn millis(self) -> u16 {
        self.millis
    }

    /// Milliseconds from `earlier` to `self`, taking a single wrap of the
    /// underlying timer into account.
    pub const fn duration_since(self, earlier: Instant) -> u16 {
        self.millis.wrapping_sub(earlier.millis)
    }

    pub const fn add_millis(self, millis: u16) -> Self {
        Instant {
            millis: self.millis.wrapping_add(millis),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::Instant;

    #[test]
    fn test_duration_since_without_wrap() {
        let a = Instant::from_millis(100);
        let b = Instant::from_millis(350);
        assert_eq!(b.duration_since(a), 250);
    }

    #[test]
    fn test_duration_since_across_wrap() {
        let a = Instant::from_millis(u16::MAX - 9);
        let b = a.add_millis(30);
        assert_eq!(b.millis(), 20);
        assert_eq!(b.duration_since(a), 30);
    }

    #[test]
    fn test_duration_since_same_instant() {
        let a = Instant::from_millis(1234);
        assert_eq!(a.duration_since(a), 0);
    }
}
