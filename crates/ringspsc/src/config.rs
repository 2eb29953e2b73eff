use crate::RingError;
use crossbeam_utils::CachePadded;

/// Width, in bytes, of the region each index of a [`PaddedRing`] occupies.
///
/// Resolved at build time from the alignment `crossbeam_utils::CachePadded`
/// picks for the target: 128 on x86_64, aarch64 and powerpc64 (adjacent-line
/// prefetching pulls pairs of 64-byte lines), 256 on s390x, 32 on some
/// embedded targets, and a fallback of 64 everywhere else.
///
/// [`PaddedRing`]: crate::PaddedRing
pub const CACHE_LINE_SIZE: usize = std::mem::align_of::<CachePadded<u8>>();

/// Configuration shared by every ring variant.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Config {
    /// Maximum number of live elements (default: 1024)
    pub capacity: usize,
}

impl Config {
    /// Creates a configuration for `capacity` usable slots.
    pub const fn new(capacity: usize) -> Self {
        Self { capacity }
    }

    /// Returns the number of physical slots: one more than `capacity`, so
    /// that a full ring and an empty ring have different index pairs.
    ///
    /// Returns `None` if that count is not representable.
    #[inline]
    pub const fn slot_count(&self) -> Option<usize> {
        self.capacity.checked_add(1)
    }

    /// Checks the configuration and returns the physical slot count.
    pub fn validate(&self) -> Result<usize, RingError> {
        if self.capacity == 0 {
            return Err(RingError::ZeroCapacity);
        }
        self.slot_count().ok_or(RingError::CapacityOverflow {
            capacity: self.capacity,
        })
    }
}

impl Default for Config {
    fn default() -> Self {
        Self { capacity: 1024 }
    }
}

/// Low latency configuration (4K slots)
pub const LOW_LATENCY_CONFIG: Config = Config::new(4095);

/// High throughput configuration (256K slots)
pub const HIGH_THROUGHPUT_CONFIG: Config = Config::new(262_143);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_slot_count_reserves_one_slot() {
        assert_eq!(Config::new(9).slot_count(), Some(10));
        assert_eq!(LOW_LATENCY_CONFIG.slot_count(), Some(4096));
        assert_eq!(HIGH_THROUGHPUT_CONFIG.slot_count(), Some(262_144));
        assert_eq!(Config::new(usize::MAX).slot_count(), None);
    }

    #[test]
    fn test_validate() {
        assert_eq!(Config::default().validate(), Ok(1025));
        assert_eq!(Config::new(1).validate(), Ok(2));
        assert_eq!(Config::new(0).validate(), Err(RingError::ZeroCapacity));
        assert_eq!(
            Config::new(usize::MAX).validate(),
            Err(RingError::CapacityOverflow {
                capacity: usize::MAX
            })
        );
    }

    #[test]
    fn test_cache_line_size_is_sane() {
        assert!(CACHE_LINE_SIZE.is_power_of_two());
        assert!(CACHE_LINE_SIZE >= 32);
        assert!(CACHE_LINE_SIZE >= std::mem::size_of::<usize>());
    }
}
