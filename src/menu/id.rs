use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use std::sync::atomic::{AtomicU64, Ordering};

/// Correlation key between a menu item handle and the native menu.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MenuItemId(u64);

impl MenuItemId {
    pub fn get(self) -> u64 {
        self.0
    }
}

impl fmt::Display for MenuItemId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for MenuItemId {
    type Err = std::num::ParseIntError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.parse().map(MenuItemId)
    }
}

/// Hands out strictly increasing ids, starting at 1. The 64-bit counter is
/// never exhausted by a running process.
pub struct IdAllocator {
    next: AtomicU64,
}

impl IdAllocator {
    pub fn new() -> Self {
        Self::starting_at(1)
    }

    fn starting_at(first: u64) -> Self {
        Self {
            next: AtomicU64::new(first),
        }
    }

    pub fn next(&self) -> MenuItemId {
        MenuItemId(self.next.fetch_add(1, Ordering::Relaxed))
    }
}

impl Default for IdAllocator {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;
    use std::sync::Arc;
    use std::thread;

    #[test]
    fn ids_start_at_one_and_increase() {
        let ids = IdAllocator::new();

        let first = ids.next();
        let second = ids.next();
        let third = ids.next();

        assert_eq!(first.get(), 1);
        assert!(first < second && second < third);
    }

    #[test]
    fn ids_keep_increasing_past_the_32_bit_range() {
        let ids = IdAllocator::starting_at(u64::from(u32::MAX));

        let last_small = ids.next();
        let first_large = ids.next();

        assert_eq!(last_small.get(), u64::from(u32::MAX));
        assert_eq!(first_large.get(), u64::from(u32::MAX) + 1);
        assert!(last_small < first_large);
    }

    #[test]
    fn concurrent_allocation_never_repeats() {
        let ids = Arc::new(IdAllocator::new());
        let workers: Vec<_> = (0..8)
            .map(|_| {
                let ids = Arc::clone(&ids);
                thread::spawn(move || (0..500).map(|_| ids.next()).collect::<Vec<_>>())
            })
            .collect();

        let mut seen = HashSet::new();
        for worker in workers {
            for id in worker.join().unwrap() {
                assert!(seen.insert(id), "duplicate id {}", id);
            }
        }

        assert_eq!(seen.len(), 8 * 500);
    }

    #[test]
    fn id_parses_from_its_display_form() {
        let cases = [
            ("1", Some(1)),
            ("42", Some(42)),
            ("4294967296", Some(4_294_967_296)),
            ("", None),
            ("-3", None),
            ("abc", None),
        ];

        for (input, expected) in cases {
            let parsed = input.parse::<MenuItemId>().ok().map(MenuItemId::get);
            assert_eq!(parsed, expected, "parsing {:?}", input);
        }
    }
}
