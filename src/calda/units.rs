//! Product units and conversion constants
//!
//! All internal arithmetic runs in milliliters; results are converted back to
//! each product's own unit. No rounding happens here.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Milliliters per liter
pub const ML_PER_LITER: f64 = 1000.0;

/// Unit a product dose is expressed in
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ProductUnit {
    #[serde(rename = "mL")]
    Milliliters,
    #[serde(rename = "L")]
    Liters,
}

impl ProductUnit {
    /// Display/storage string ("mL" or "L")
    pub fn as_str(&self) -> &'static str {
        match self {
            ProductUnit::Milliliters => "mL",
            ProductUnit::Liters => "L",
        }
    }

    /// Parse a unit string.
    ///
    /// Accepts the usual spellings plus the per-liter-of-mix form "mL/L",
    /// which is dosed in milliliters.
    pub fn parse(s: &str) -> Option<Self> {
        let lower = s.trim().to_lowercase();
        match lower.as_str() {
            "ml" | "ml/l" | "milliliter" | "milliliters" | "millilitre" | "millilitres" => {
                Some(ProductUnit::Milliliters)
            }
            "l" | "liter" | "liters" | "litre" | "litres" => Some(ProductUnit::Liters),
            _ => None,
        }
    }

    /// Milliliters in one unit
    pub fn ml_per_unit(&self) -> f64 {
        match self {
            ProductUnit::Milliliters => 1.0,
            ProductUnit::Liters => ML_PER_LITER,
        }
    }
}

impl fmt::Display for ProductUnit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Convert a quantity in `unit` to milliliters
pub fn to_milliliters(value: f64, unit: ProductUnit) -> f64 {
    value * unit.ml_per_unit()
}

/// Convert milliliters back to `unit`
pub fn from_milliliters(ml_value: f64, unit: ProductUnit) -> f64 {
    ml_value / unit.ml_per_unit()
}

pub fn ml_to_liters(ml_value: f64) -> f64 {
    from_milliliters(ml_value, ProductUnit::Liters)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_to_milliliters() {
        assert_eq!(to_milliliters(200.0, ProductUnit::Milliliters), 200.0);
        assert_eq!(to_milliliters(1.5, ProductUnit::Liters), 1500.0);
    }

    #[test]
    fn test_from_milliliters() {
        assert_eq!(from_milliliters(250.0, ProductUnit::Milliliters), 250.0);
        assert_eq!(from_milliliters(1250.0, ProductUnit::Liters), 1.25);
        assert_eq!(ml_to_liters(200.0), 0.2);
    }

    #[test]
    fn test_no_rounding_in_conversion() {
        let ml = to_milliliters(0.333, ProductUnit::Liters);
        assert!((ml - 333.0).abs() < 1e-9);
        let l = from_milliliters(1.0, ProductUnit::Liters);
        assert_eq!(l, 0.001);
    }

    #[test]
    fn test_ml_per_unit_drives_conversion() {
        assert_eq!(ProductUnit::Milliliters.ml_per_unit(), 1.0);
        assert_eq!(ProductUnit::Liters.ml_per_unit(), ML_PER_LITER);
        for unit in [ProductUnit::Milliliters, ProductUnit::Liters] {
            assert_eq!(to_milliliters(2.5, unit), 2.5 * unit.ml_per_unit());
            assert_eq!(from_milliliters(to_milliliters(2.5, unit), unit), 2.5);
        }
    }

    #[test]
    fn test_parse_unit() {
        assert_eq!(ProductUnit::parse("mL"), Some(ProductUnit::Milliliters));
        assert_eq!(ProductUnit::parse(" ml "), Some(ProductUnit::Milliliters));
        assert_eq!(ProductUnit::parse("mL/L"), Some(ProductUnit::Milliliters));
        assert_eq!(ProductUnit::parse("L"), Some(ProductUnit::Liters));
        assert_eq!(ProductUnit::parse("litres"), Some(ProductUnit::Liters));
        assert_eq!(ProductUnit::parse("kg"), None);
        assert_eq!(ProductUnit::parse(""), None);
    }

    #[test]
    fn test_serde_tags() {
        assert_eq!(
            serde_json::to_string(&ProductUnit::Milliliters).unwrap(),
            r#""mL""#
        );
        let unit: ProductUnit = serde_json::from_str(r#""L""#).unwrap();
        assert_eq!(unit, ProductUnit::Liters);
        assert_eq!(ProductUnit::Liters.to_string(), "L");
    }
}
