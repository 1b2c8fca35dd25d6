//! Task durations in minutes with two-decimal precision.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::iter::Sum;
use std::ops::Add;

const MILLIS_PER_HUNDREDTH: i64 = 600;
const HALF_HUNDREDTH_MILLIS: i64 = 300;

/// Elapsed time in minutes, rounded to two decimals.
///
/// Stored as an exact number of hundredths of a minute so that totals over
/// many tasks do not accumulate floating-point error. Serialises as a JSON
/// number such as `25.5`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct DurationMinutes(i64);

impl DurationMinutes {
    /// A zero-length duration.
    pub const ZERO: Self = Self(0);

    /// Computes the duration between two instants.
    ///
    /// The elapsed time is taken at millisecond resolution and rounded to the
    /// nearest hundredth of a minute, halves away from zero. A negative span
    /// yields a negative duration.
    ///
    /// Rounding is exact on whole milliseconds, so a span that lands on a
    /// half hundredth always rounds up in magnitude: 120.3 seconds is
    /// `2.01`, not the `2.00` that rounding the binary float `2.005` gives.
    #[must_use]
    pub fn between(start: DateTime<Utc>, end: DateTime<Utc>) -> Self {
        let millis = end.signed_duration_since(start).num_milliseconds();
        let rounded = millis
            .saturating_abs()
            .saturating_add(HALF_HUNDREDTH_MILLIS)
            .div_euclid(MILLIS_PER_HUNDREDTH);
        Self(rounded.saturating_mul(millis.signum()))
    }

    /// Creates a duration from hundredths of a minute.
    #[must_use]
    pub const fn from_hundredths(hundredths: i64) -> Self {
        Self(hundredths)
    }

    /// Returns the duration as hundredths of a minute.
    #[must_use]
    pub const fn hundredths(self) -> i64 {
        self.0
    }

    /// Returns the duration in minutes as a floating-point value.
    #[must_use]
    #[expect(
        clippy::cast_precision_loss,
        clippy::float_arithmetic,
        reason = "rendering to a JSON number; hundredths stay far below 2^52"
    )]
    pub fn as_minutes_f64(self) -> f64 {
        self.0 as f64 / 100.0
    }

    /// Rounds a floating-point minute count to the nearest hundredth.
    #[must_use]
    #[expect(
        clippy::cast_possible_truncation,
        clippy::float_arithmetic,
        reason = "persisted values were written with two decimals"
    )]
    pub fn from_minutes_f64(minutes: f64) -> Self {
        Self((minutes * 100.0).round() as i64)
    }
}

impl Add for DurationMinutes {
    type Output = Self;

    fn add(self, rhs: Self) -> Self::Output {
        Self(self.0.saturating_add(rhs.0))
    }
}

impl Sum for DurationMinutes {
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        iter.fold(Self::ZERO, Add::add)
    }
}

impl fmt::Display for DurationMinutes {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sign = if self.0 < 0 { "-" } else { "" };
        let magnitude = self.0.saturating_abs();
        write!(
            f,
            "{sign}{}.{:02}",
            magnitude.div_euclid(100),
            magnitude.rem_euclid(100)
        )
    }
}

impl Serialize for DurationMinutes {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_f64(self.as_minutes_f64())
    }
}

impl<'de> Deserialize<'de> for DurationMinutes {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        f64::deserialize(deserializer).map(Self::from_minutes_f64)
    }
}
