//! Type-safe price representation using decimal arithmetic.

use core::fmt;
use core::iter::Sum;
use core::ops::{Add, Sub};

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// A price with currency information.
///
/// Amounts are kept in the currency's standard unit (pesos, not centavos).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Price {
    /// Amount in the currency's standard unit.
    pub amount: Decimal,
    /// ISO 4217 currency code.
    pub currency_code: CurrencyCode,
}

impl Price {
    /// Create a new price.
    #[must_use]
    pub const fn new(amount: Decimal, currency_code: CurrencyCode) -> Self {
        Self {
            amount,
            currency_code,
        }
    }

    /// A zero amount in the given currency.
    #[must_use]
    pub const fn zero(currency_code: CurrencyCode) -> Self {
        Self::new(Decimal::ZERO, currency_code)
    }

    /// Price of `quantity` units at this unit price.
    #[must_use]
    pub fn times(&self, quantity: u32) -> Self {
        Self::new(self.amount * Decimal::from(quantity), self.currency_code)
    }

    /// Whether the amount is strictly positive.
    #[must_use]
    pub fn is_positive(&self) -> bool {
        self.amount > Decimal::ZERO
    }

    /// Format with the currency symbol and no trailing zeros (e.g., "₱120").
    #[must_use]
    pub fn display(&self) -> String {
        format!("{}{}", self.currency_code.symbol(), self.amount.normalize())
    }

    /// Format with the currency symbol and two decimals (e.g., "₱120.00").
    #[must_use]
    pub fn display_fixed(&self) -> String {
        format!(
            "{}{:.2}",
            self.currency_code.symbol(),
            self.amount.round_dp(2)
        )
    }
}

impl fmt::Display for Price {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.display())
    }
}

impl Add for Price {
    type Output = Self;

    fn add(self, rhs: Self) -> Self::Output {
        Self::new(self.amount + rhs.amount, self.currency_code)
    }
}

impl Sub for Price {
    type Output = Self;

    fn sub(self, rhs: Self) -> Self::Output {
        Self::new(self.amount - rhs.amount, self.currency_code)
    }
}

impl Sum for Price {
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        let mut currency = None;
        let amount = iter
            .inspect(|p| {
                currency.get_or_insert(p.currency_code);
            })
            .map(|p| p.amount)
            .sum();
        Self::new(amount, currency.unwrap_or_default())
    }
}

/// ISO 4217 currency codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Default)]
pub enum CurrencyCode {
    #[default]
    PHP,
    USD,
    EUR,
    GBP,
}

impl CurrencyCode {
    /// Display symbol for the currency.
    #[must_use]
    pub const fn symbol(&self) -> &'static str {
        match self {
            Self::PHP => "₱",
            Self::USD => "$",
            Self::EUR => "€",
            Self::GBP => "£",
        }
    }

    /// ISO 4217 code.
    #[must_use]
    pub const fn code(&self) -> &'static str {
        match self {
            Self::PHP => "PHP",
            Self::USD => "USD",
            Self::EUR => "EUR",
            Self::GBP => "GBP",
        }
    }
}

impl std::str::FromStr for CurrencyCode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "PHP" => Ok(Self::PHP),
            "USD" => Ok(Self::USD),
            "EUR" => Ok(Self::EUR),
            "GBP" => Ok(Self::GBP),
            _ => Err(format!("unsupported currency: {s}")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn php(amount: i64) -> Price {
        Price::new(Decimal::from(amount), CurrencyCode::PHP)
    }

    #[test]
    fn test_display_drops_trailing_zeros() {
        let price = Price::new(Decimal::new(12000, 2), CurrencyCode::PHP);
        assert_eq!(price.display(), "₱120");
        assert_eq!(Price::new(Decimal::new(995, 1), CurrencyCode::PHP).display(), "₱99.5");
    }

    #[test]
    fn test_display_fixed() {
        assert_eq!(php(150).display_fixed(), "₱150.00");
        assert_eq!(
            Price::new(Decimal::new(1999, 2), CurrencyCode::USD).display_fixed(),
            "$19.99"
        );
    }

    #[test]
    fn test_times_and_sum() {
        let total: Price = [php(120).times(2), php(150)].into_iter().sum();
        assert_eq!(total, php(390));
        assert!(total.is_positive());
    }

    #[test]
    fn test_sum_of_nothing_is_zero() {
        let total: Price = std::iter::empty().sum();
        assert_eq!(total, Price::zero(CurrencyCode::PHP));
    }

    #[test]
    fn test_sub_can_go_negative() {
        let diff = php(100) - php(250);
        assert_eq!(diff.amount, Decimal::from(-150));
    }

    #[test]
    fn test_currency_from_str() {
        assert_eq!("php".parse::<CurrencyCode>(), Ok(CurrencyCode::PHP));
        assert!("XYZ".parse::<CurrencyCode>().is_err());
    }
}
