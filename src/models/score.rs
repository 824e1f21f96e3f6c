//! Judge score with one-decimal precision.

use serde::{de, Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;

/// A score in `[0, 10]` with one decimal, stored as tenths (0..=100).
#[derive(Clone, Copy, Debug, Default, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub struct Score(u8);

impl Score {
    pub const MAX_TENTHS: u8 = 100;

    pub fn from_tenths(tenths: u8) -> Option<Self> {
        (tenths <= Self::MAX_TENTHS).then_some(Self(tenths))
    }

    /// Parse a judge value such as `8.5`. Rejects out-of-range values and anything
    /// finer than one decimal.
    pub fn new(value: f64) -> Result<Self, String> {
        if !value.is_finite() {
            return Err(format!("score {} is not a number", value));
        }
        if !(0.0..=10.0).contains(&value) {
            return Err(format!("score {} is outside [0, 10]", value));
        }
        let scaled = value * 10.0;
        let tenths = scaled.round();
        if (scaled - tenths).abs() > 1e-6 {
            return Err(format!("score {} has more than one decimal", value));
        }
        Ok(Self(tenths as u8))
    }

    pub fn tenths(self) -> u8 {
        self.0
    }

    pub fn value(self) -> f64 {
        f64::from(self.0) / 10.0
    }
}

impl fmt::Display for Score {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.0 / 10, self.0 % 10)
    }
}

impl Serialize for Score {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_f64(self.value())
    }
}

impl<'de> Deserialize<'de> for Score {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = f64::deserialize(deserializer)?;
        Score::new(value).map_err(de::Error::custom)
    }
}
