//! # Money Module
//!
//! Provides the `Money` type for prices and totals.
//!
//! ## Why Integer Money?
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  Stored:  i64 kopecks            49999.99 руб. → 4999999                │
//! │  Wire:    JSON number (major)    4999999      → 49999.99                │
//! │  Input:   user text              "99,90"      → 9990                    │
//! │                                                                         │
//! │  Arithmetic (line totals, order totals, discounts) never touches f64.  │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! The storefront and the bot exchange prices as plain JSON numbers in
//! rubles, so serialization converts at the edge and rounds to the nearest
//! kopeck on the way in.

use serde::de::{self, Visitor};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::ops::{Add, AddAssign, Mul, Sub};
use std::str::FromStr;

use crate::error::ValidationError;

// =============================================================================
// Money Type
// =============================================================================

/// A monetary value in kopecks (1/100 ruble).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type), sqlx(transparent))]
pub struct Money(i64);

impl Money {
    /// Creates a Money value from kopecks.
    ///
    /// ```rust
    /// use assorti_core::money::Money;
    ///
    /// let price = Money::from_cents(1099);
    /// assert_eq!(price.cents(), 1099);
    /// ```
    #[inline]
    pub const fn from_cents(cents: i64) -> Self {
        Money(cents)
    }

    /// Creates a Money value from whole rubles.
    #[inline]
    pub const fn from_major(major: i64) -> Self {
        Money(major * 100)
    }

    /// Converts a decimal amount in rubles, rounding to the nearest kopeck.
    ///
    /// Only used at the JSON boundary. Non-finite input yields `None`.
    pub fn from_major_f64(value: f64) -> Option<Self> {
        if !value.is_finite() {
            return None;
        }
        let cents = (value * 100.0).round();
        if cents.abs() > i64::MAX as f64 {
            return None;
        }
        Some(Money(cents as i64))
    }

    /// Returns the value in kopecks.
    #[inline]
    pub const fn cents(&self) -> i64 {
        self.0
    }

    /// Returns the value in rubles as a float, for the wire only.
    #[inline]
    pub fn as_major_f64(&self) -> f64 {
        self.0 as f64 / 100.0
    }

    #[inline]
    pub const fn zero() -> Self {
        Money(0)
    }

    #[inline]
    pub const fn is_zero(&self) -> bool {
        self.0 == 0
    }

    #[inline]
    pub const fn is_positive(&self) -> bool {
        self.0 > 0
    }

    #[inline]
    pub const fn is_negative(&self) -> bool {
        self.0 < 0
    }

    /// Multiplies money by a quantity, `None` on overflow.
    ///
    /// ```rust
    /// use assorti_core::money::Money;
    ///
    /// let unit_price = Money::from_cents(299);
    /// assert_eq!(unit_price.checked_mul(3), Some(Money::from_cents(897)));
    /// assert_eq!(Money::from_cents(i64::MAX).checked_mul(2), None);
    /// ```
    #[inline]
    pub const fn checked_mul(&self, qty: i64) -> Option<Self> {
        match self.0.checked_mul(qty) {
            Some(cents) => Some(Money(cents)),
            None => None,
        }
    }

    /// Adds two amounts, `None` on overflow.
    #[inline]
    pub const fn checked_add(&self, other: Money) -> Option<Self> {
        match self.0.checked_add(other.0) {
            Some(cents) => Some(Money(cents)),
            None => None,
        }
    }

    /// Returns `percent`% of this amount, rounded half up.
    ///
    /// ```rust
    /// use assorti_core::money::Money;
    ///
    /// let line = Money::from_cents(10000);
    /// assert_eq!(line.percent(15).cents(), 1500);
    /// ```
    pub fn percent(&self, percent: u32) -> Money {
        let amount = (self.0 as i128 * percent as i128 + 50) / 100;
        Money(amount as i64)
    }
}

// =============================================================================
// Parsing User Input
// =============================================================================

/// Parses prices typed by a human: `"100"`, `"99.9"`, `"99,90"`.
///
/// At most two fractional digits; a leading `-` is accepted so the caller
/// decides whether negatives are allowed.
impl FromStr for Money {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = |reason: &str| ValidationError::InvalidFormat {
            field: "Цена".to_string(),
            reason: reason.to_string(),
        };

        let text = s.trim().replace(',', ".");
        let (negative, digits) = match text.strip_prefix('-') {
            Some(rest) => (true, rest),
            None => (false, text.as_str()),
        };

        let (whole, frac) = match digits.split_once('.') {
            Some((whole, frac)) => (whole, frac),
            None => (digits, ""),
        };

        if whole.is_empty() && frac.is_empty() {
            return Err(invalid("ожидается число"));
        }
        if !whole.chars().all(|c| c.is_ascii_digit()) || !frac.chars().all(|c| c.is_ascii_digit()) {
            return Err(invalid("ожидается число"));
        }
        if frac.len() > 2 {
            return Err(invalid("не более двух знаков после запятой"));
        }

        let whole: i64 = if whole.is_empty() {
            0
        } else {
            whole.parse().map_err(|_| invalid("слишком большое число"))?
        };
        let frac: i64 = match frac.len() {
            0 => 0,
            1 => frac.parse::<i64>().map_err(|_| invalid("ожидается число"))? * 10,
            _ => frac.parse().map_err(|_| invalid("ожидается число"))?,
        };

        let cents = whole
            .checked_mul(100)
            .and_then(|c| c.checked_add(frac))
            .ok_or_else(|| invalid("слишком большое число"))?;

        Ok(Money(if negative { -cents } else { cents }))
    }
}

// =============================================================================
// Trait Implementations
// =============================================================================

/// Shows rubles without trailing zero kopecks: `100`, `99.90`.
impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sign = if self.0 < 0 { "-" } else { "" };
        let abs = self.0.unsigned_abs();
        if abs % 100 == 0 {
            write!(f, "{}{}", sign, abs / 100)
        } else {
            write!(f, "{}{}.{:02}", sign, abs / 100, abs % 100)
        }
    }
}

impl Default for Money {
    fn default() -> Self {
        Money::zero()
    }
}

// Operators saturate at the i64 bounds. Totals that get stored go through
// `checked_mul` / `checked_add` instead.

impl Add for Money {
    type Output = Self;

    #[inline]
    fn add(self, other: Self) -> Self {
        Money(self.0.saturating_add(other.0))
    }
}

impl AddAssign for Money {
    #[inline]
    fn add_assign(&mut self, other: Self) {
        self.0 = self.0.saturating_add(other.0);
    }
}

impl Sub for Money {
    type Output = Self;

    #[inline]
    fn sub(self, other: Self) -> Self {
        Money(self.0.saturating_sub(other.0))
    }
}

impl Mul<i64> for Money {
    type Output = Self;

    #[inline]
    fn mul(self, qty: i64) -> Self {
        Money(self.0.saturating_mul(qty))
    }
}

impl std::iter::Sum for Money {
    fn sum<I: Iterator<Item = Money>>(iter: I) -> Self {
        iter.fold(Money::zero(), |acc, m| acc + m)
    }
}

// =============================================================================
// Serde: decimal rubles on the wire
// =============================================================================

impl Serialize for Money {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        if self.0 % 100 == 0 {
            serializer.serialize_i64(self.0 / 100)
        } else {
            serializer.serialize_f64(self.as_major_f64())
        }
    }
}

struct MoneyVisitor;

impl<'de> Visitor<'de> for MoneyVisitor {
    type Value = Money;

    fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str("a price in rubles as a number or numeric string")
    }

    fn visit_i64<E: de::Error>(self, v: i64) -> Result<Money, E> {
        v.checked_mul(100)
            .map(Money)
            .ok_or_else(|| E::custom("price out of range"))
    }

    fn visit_u64<E: de::Error>(self, v: u64) -> Result<Money, E> {
        i64::try_from(v)
            .map_err(|_| E::custom("price out of range"))
            .and_then(|v| self.visit_i64(v))
    }

    fn visit_f64<E: de::Error>(self, v: f64) -> Result<Money, E> {
        Money::from_major_f64(v).ok_or_else(|| E::custom("price must be a finite number"))
    }

    fn visit_str<E: de::Error>(self, v: &str) -> Result<Money, E> {
        v.parse().map_err(E::custom)
    }
}

impl<'de> Deserialize<'de> for Money {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_any(MoneyVisitor)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_user_input() {
        assert_eq!("100".parse::<Money>().unwrap().cents(), 10000);
        assert_eq!("99.9".parse::<Money>().unwrap().cents(), 9990);
        assert_eq!("99,90".parse::<Money>().unwrap().cents(), 9990);
        assert_eq!(" 0.5 ".parse::<Money>().unwrap().cents(), 50);
        assert_eq!("-5".parse::<Money>().unwrap().cents(), -500);

        assert!("".parse::<Money>().is_err());
        assert!("abc".parse::<Money>().is_err());
        assert!("1.234".parse::<Money>().is_err());
        assert!("1.2.3".parse::<Money>().is_err());
        assert!(".".parse::<Money>().is_err());
    }

    #[test]
    fn test_display() {
        assert_eq!(Money::from_cents(10000).to_string(), "100");
        assert_eq!(Money::from_cents(9990).to_string(), "99.90");
        assert_eq!(Money::from_cents(5).to_string(), "0.05");
        assert_eq!(Money::from_cents(-550).to_string(), "-5.50");
    }

    #[test]
    fn test_json_wire_format() {
        assert_eq!(serde_json::to_string(&Money::from_cents(4999999)).unwrap(), "49999.99");
        assert_eq!(serde_json::to_string(&Money::from_cents(10000)).unwrap(), "100");

        let m: Money = serde_json::from_str("49999.99").unwrap();
        assert_eq!(m.cents(), 4999999);
        let m: Money = serde_json::from_str("100").unwrap();
        assert_eq!(m.cents(), 10000);
        // 0.1 + 0.2 style noise is rounded away
        let m: Money = serde_json::from_str("0.30000000000000004").unwrap();
        assert_eq!(m.cents(), 30);
    }

    #[test]
    fn test_arithmetic() {
        let a = Money::from_cents(1000);
        let b = Money::from_cents(500);

        assert_eq!((a + b).cents(), 1500);
        assert_eq!((a - b).cents(), 500);
        assert_eq!((a * 3).cents(), 3000);
        let total: Money = vec![a, b, b].into_iter().sum();
        assert_eq!(total.cents(), 2000);
    }

    #[test]
    fn test_overflow_is_detected() {
        let huge = Money::from_cents(5_000_000_000_000_000_000);

        assert_eq!(huge.checked_mul(2), None);
        assert_eq!(huge.checked_add(huge), None);
        assert_eq!(huge.checked_mul(1), Some(huge));

        // operators clamp instead of wrapping
        assert_eq!((huge * 2).cents(), i64::MAX);
        assert_eq!((huge + huge).cents(), i64::MAX);
        let mut acc = huge;
        acc += huge;
        assert_eq!(acc.cents(), i64::MAX);
        assert_eq!((Money::from_cents(i64::MIN) - huge).cents(), i64::MIN);
    }

    #[test]
    fn test_percent_rounds_half_up() {
        assert_eq!(Money::from_cents(10000).percent(10).cents(), 1000);
        // 333 * 15% = 49.95 → 50
        assert_eq!(Money::from_cents(333).percent(15).cents(), 50);
        assert_eq!(Money::from_cents(999).percent(0).cents(), 0);
    }
}
