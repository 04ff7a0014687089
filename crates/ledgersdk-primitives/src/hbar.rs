//! Hbar amounts: a signed count of tinybars with exact unit conversion.

use std::fmt;
use std::str::FromStr;

use rust_decimal::Decimal;

use crate::error::PrimitivesError;

/// A unit in the hbar family. Each unit is a fixed power-of-ten number of
/// tinybars.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HbarUnit {
    /// `10^0` tinybars — the smallest unit.
    Tinybar,
    /// `10^2` tinybars.
    Microbar,
    /// `10^5` tinybars.
    Millibar,
    /// `10^8` tinybars — the base unit.
    Hbar,
    /// `10^11` tinybars.
    Kilobar,
    /// `10^14` tinybars.
    Megabar,
    /// `10^17` tinybars.
    Gigabar,
}

impl HbarUnit {
    /// Number of tinybars in one of this unit.
    pub const fn tinybars_per_unit(self) -> u128 {
        match self {
            Self::Tinybar => 1,
            Self::Microbar => 100,
            Self::Millibar => 100_000,
            Self::Hbar => 100_000_000,
            Self::Kilobar => 100_000_000_000,
            Self::Megabar => 100_000_000_000_000,
            Self::Gigabar => 100_000_000_000_000_000,
        }
    }

    /// The Unicode glyph used in string forms (e.g. `tℏ`, `ℏ`, `kℏ`).
    pub const fn symbol(self) -> &'static str {
        match self {
            Self::Tinybar => "tℏ",
            Self::Microbar => "µℏ",
            Self::Millibar => "mℏ",
            Self::Hbar => "ℏ",
            Self::Kilobar => "kℏ",
            Self::Megabar => "Mℏ",
            Self::Gigabar => "Gℏ",
        }
    }

    fn from_symbol(symbol: &str) -> Option<Self> {
        match symbol {
            "tℏ" => Some(Self::Tinybar),
            "µℏ" | "μℏ" => Some(Self::Microbar),
            "mℏ" => Some(Self::Millibar),
            "ℏ" => Some(Self::Hbar),
            "kℏ" => Some(Self::Kilobar),
            "Mℏ" => Some(Self::Megabar),
            "Gℏ" => Some(Self::Gigabar),
            _ => None,
        }
    }
}

/// A signed amount of tinybars, the smallest unit of the ledger's native
/// currency.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Hbar {
    tinybars: i64,
}

impl Hbar {
    /// Zero.
    pub const ZERO: Hbar = Hbar { tinybars: 0 };

    /// Builds an amount directly from a tinybar count.
    pub const fn from_tinybars(tinybars: i64) -> Self {
        Self { tinybars }
    }

    /// Builds an amount from `amount` of `unit`. Fails if `amount` is
    /// NaN/infinite, or does not correspond to a whole number of tinybars.
    pub fn from(amount: f64, unit: HbarUnit) -> Result<Self, PrimitivesError> {
        if !amount.is_finite() {
            return Err(PrimitivesError::NotWholeTinybars(amount));
        }
        let scaled = amount * unit.tinybars_per_unit() as f64;
        if (scaled - scaled.round()).abs() > 1e-6 {
            return Err(PrimitivesError::NotWholeTinybars(amount));
        }
        Ok(Self { tinybars: scaled.round() as i64 })
    }

    /// Raw tinybar count.
    pub const fn to_tinybars(self) -> i64 {
        self.tinybars
    }

    /// Converts to an exact decimal value in `unit`.
    pub fn to(self, unit: HbarUnit) -> Decimal {
        Decimal::from(self.tinybars) / Decimal::from(unit.tinybars_per_unit())
    }

    /// Negates the amount.
    pub const fn negated(self) -> Self {
        Self { tinybars: -self.tinybars }
    }

    /// Adds two amounts (checked; panics only on `i64` overflow, which would
    /// represent an unrepresentable ledger balance).
    pub fn checked_add(self, other: Hbar) -> Option<Hbar> {
        self.tinybars.checked_add(other.tinybars).map(Self::from_tinybars)
    }
}

impl FromStr for Hbar {
    type Err = PrimitivesError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        let (number_part, unit) = match trimmed.rsplit_once(' ') {
            Some((num, sym)) => {
                let unit = HbarUnit::from_symbol(sym)
                    .ok_or_else(|| PrimitivesError::BadHbarString(s.to_string()))?;
                (num, unit)
            }
            None => (trimmed, HbarUnit::Hbar),
        };
        let amount: f64 =
            number_part.parse().map_err(|_| PrimitivesError::BadHbarString(s.to_string()))?;
        Hbar::from(amount, unit)
    }
}

impl fmt::Display for Hbar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.tinybars.unsigned_abs() < 10_000 {
            write!(f, "{} {}", self.tinybars, HbarUnit::Tinybar.symbol())
        } else {
            let amount = self.to(HbarUnit::Hbar).normalize();
            write!(f, "{} {}", amount, HbarUnit::Hbar.symbol())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_uses_tinybar_below_threshold() {
        assert_eq!(Hbar::from_tinybars(50).to_string(), "50 tℏ");
        assert_eq!(Hbar::from_tinybars(-9_999).to_string(), "-9999 tℏ");
    }

    #[test]
    fn display_uses_base_unit_at_and_above_threshold() {
        assert_eq!(Hbar::from(50.0, HbarUnit::Hbar).unwrap().to_string(), "50 ℏ");
    }

    #[test]
    fn from_rejects_non_integer_tinybars() {
        assert!(Hbar::from(0.000000001, HbarUnit::Hbar).is_err());
    }

    #[test]
    fn from_rejects_nan_and_infinite() {
        assert!(Hbar::from(f64::NAN, HbarUnit::Hbar).is_err());
        assert!(Hbar::from(f64::INFINITY, HbarUnit::Hbar).is_err());
    }

    #[test]
    fn round_trip_through_each_unit() {
        for unit in [
            HbarUnit::Tinybar,
            HbarUnit::Microbar,
            HbarUnit::Millibar,
            HbarUnit::Hbar,
            HbarUnit::Kilobar,
        ] {
            let hbar = Hbar::from_tinybars(unit.tinybars_per_unit() as i64 * 7);
            assert_eq!(hbar.to(unit), Decimal::from(7));
        }
    }

    #[test]
    fn string_round_trip() {
        let hbar = Hbar::from_tinybars(123_456_789);
        let rendered = hbar.to_string();
        let parsed: Hbar = rendered.parse().unwrap();
        assert_eq!(hbar, parsed);
    }

    #[test]
    fn negated_flips_sign() {
        assert_eq!(Hbar::from_tinybars(5).negated(), Hbar::from_tinybars(-5));
    }
}
