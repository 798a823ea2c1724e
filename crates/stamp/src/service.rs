//! Internal implementation of the stamp generator.

use crate::{StampError, StampResult};
use chrono::Utc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::{fmt, str::FromStr};

/// An epoch-millisecond stamp used as the disambiguating prefix of a stored name.
///
/// # Display format
/// Stamps display as the bare decimal millisecond count, e.g. `1743033045755`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(transparent))]
pub struct Stamp(u64);

impl Stamp {
    /// Wraps a raw epoch-millisecond value.
    pub fn from_millis(millis: u64) -> Self {
        Self(millis)
    }

    /// Returns the raw epoch-millisecond value.
    pub fn as_millis(&self) -> u64 {
        self.0
    }

    /// Current wall-clock epoch millisecond; clocks before 1970 read as 0.
    pub fn now() -> Self {
        Self(u64::try_from(Utc::now().timestamp_millis()).unwrap_or(0))
    }
}

impl fmt::Display for Stamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for Stamp {
    type Err = StampError;

    /// Parses a bare decimal millisecond count.
    ///
    /// # Errors
    ///
    /// Returns [`StampError::InvalidInput`] for anything other than one or more ASCII digits
    /// that fit in a `u64`.
    fn from_str(s: &str) -> StampResult<Self> {
        if s.is_empty() || !s.bytes().all(|b| b.is_ascii_digit()) {
            return Err(StampError::InvalidInput(format!(
                "Stamp must be decimal digits, got: '{}'",
                s
            )));
        }
        s.parse::<u64>()
            .map(Self)
            .map_err(|e| StampError::InvalidInput(format!("Stamp out of range '{}': {}", s, e)))
    }
}

/// Hands out strictly increasing millisecond stamps.
///
/// The generator is lock-free and safe to share between threads (typically behind an `Arc`
/// or inside a service that is itself shared).
///
/// # Monotonicity Guarantee
///
/// Every call to [`StampGenerator::next`] returns a stamp strictly greater than every stamp
/// previously returned by the same generator. When the clock has not advanced (or has gone
/// backwards) since the last stamp, the new stamp is the last one plus 1 ms. A generator whose
/// last stamp is `u64::MAX` is exhausted and issues nothing further.
#[derive(Debug, Default)]
pub struct StampGenerator {
    last: AtomicU64,
}

impl StampGenerator {
    /// Creates a generator that has not yet issued any stamp.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a generator whose first stamp is strictly greater than `last`.
    ///
    /// Used to continue from the newest stamp already on disk after a restart.
    pub fn resume_after(last: Stamp) -> Self {
        Self {
            last: AtomicU64::new(last.0),
        }
    }

    /// Issues the next stamp, or `None` once the generator is exhausted.
    pub fn next(&self) -> Option<Stamp> {
        self.next_at(Stamp::now().0)
    }

    /// Issues the next stamp given an explicit clock reading.
    fn next_at(&self, now: u64) -> Option<Stamp> {
        let advance = |last: u64| if now > last { Some(now) } else { last.checked_add(1) };
        let previous = self
            .last
            .fetch_update(Ordering::AcqRel, Ordering::Acquire, advance)
            .ok()?;
        advance(previous).map(Stamp)
    }
}
