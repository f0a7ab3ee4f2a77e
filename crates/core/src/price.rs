//! Non-negative money amount with two fractional digits.
//!
//! Stored as integer cents so round-trips through the database are exact.
//! Serialized as a decimal string (`"75.00"`) to keep JSON clients away from
//! floating point.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::error::CoreError;

/// Number of cents in one currency unit.
const CENTS_PER_UNIT: i64 = 100;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Price(i64);

impl Price {
    pub const ZERO: Price = Price(0);

    /// Build a price from a cent amount. Negative amounts are rejected.
    pub fn from_cents(cents: i64) -> Result<Self, CoreError> {
        if cents < 0 {
            return Err(CoreError::InvalidInput(format!(
                "Price must not be negative (got {cents} cents)"
            )));
        }
        Ok(Self(cents))
    }

    /// Whole units, e.g. `Price::from_units(75)` is `75.00`.
    pub fn from_units(units: u32) -> Self {
        Self(i64::from(units) * CENTS_PER_UNIT)
    }

    pub fn cents(self) -> i64 {
        self.0
    }
}

impl fmt::Display for Price {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}.{:02}",
            self.0 / CENTS_PER_UNIT,
            self.0 % CENTS_PER_UNIT
        )
    }
}

impl FromStr for Price {
    type Err = CoreError;

    /// Accepts `75`, `75.5` and `75.00`. Rejects signs, exponents and more
    /// than two fractional digits.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || CoreError::InvalidInput(format!("Invalid price '{s}'"));
        let trimmed = s.trim();
        let (whole, fraction) = match trimmed.split_once('.') {
            Some((whole, fraction)) => (whole, fraction),
            None => (trimmed, ""),
        };

        if whole.is_empty() || !whole.bytes().all(|b| b.is_ascii_digit()) {
            return Err(invalid());
        }
        if fraction.len() > 2 || !fraction.bytes().all(|b| b.is_ascii_digit()) {
            return Err(invalid());
        }
        if trimmed.ends_with('.') {
            return Err(invalid());
        }

        let units: i64 = whole.parse().map_err(|_| invalid())?;
        let cents: i64 = match fraction.len() {
            0 => 0,
            1 => fraction.parse::<i64>().map_err(|_| invalid())? * 10,
            _ => fraction.parse().map_err(|_| invalid())?,
        };

        units
            .checked_mul(CENTS_PER_UNIT)
            .and_then(|c| c.checked_add(cents))
            .map(Self)
            .ok_or_else(invalid)
    }
}

impl TryFrom<i64> for Price {
    type Error = CoreError;

    fn try_from(cents: i64) -> Result<Self, Self::Error> {
        Self::from_cents(cents)
    }
}

impl From<Price> for i64 {
    fn from(price: Price) -> Self {
        price.0
    }
}

impl Serialize for Price {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Price {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;

    use super::*;

    #[test]
    fn parses_whole_and_fractional_amounts() {
        assert_eq!("75".parse::<Price>().unwrap().cents(), 7500);
        assert_eq!("75.5".parse::<Price>().unwrap().cents(), 7550);
        assert_eq!("75.00".parse::<Price>().unwrap().cents(), 7500);
        assert_eq!("0.07".parse::<Price>().unwrap().cents(), 7);
    }

    #[test]
    fn rejects_malformed_amounts() {
        for raw in ["", "-1", "1.234", "abc", "1.", ".5", "1e3", "+2"] {
            assert_matches!(raw.parse::<Price>(), Err(CoreError::InvalidInput(_)), "{raw}");
        }
    }

    #[test]
    fn negative_cents_are_rejected() {
        assert_matches!(Price::from_cents(-1), Err(CoreError::InvalidInput(_)));
        assert_eq!(Price::from_cents(0).unwrap(), Price::ZERO);
    }

    #[test]
    fn displays_two_fraction_digits() {
        assert_eq!(Price::from_units(75).to_string(), "75.00");
        assert_eq!(Price::from_cents(1205).unwrap().to_string(), "12.05");
    }

    #[test]
    fn serializes_as_decimal_string() {
        let json = serde_json::to_string(&Price::from_cents(999).unwrap()).unwrap();
        assert_eq!(json, "\"9.99\"");
        let back: Price = serde_json::from_str(&json).unwrap();
        assert_eq!(back.cents(), 999);
    }
}
