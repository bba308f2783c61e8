//! Calculation input and result types
//!
//! Field names serialize in camelCase (`areaHa`, `numeroTanques`, ...) so a
//! stored calculation keeps the same JSON shape the mobile client uses.

use serde::de::IgnoredAny;
use serde::{Deserialize, Deserializer, Serialize};

use super::units::ProductUnit;

/// A numeric field as a client sends it.
///
/// Form fields often arrive as text, so numbers are read the way a form
/// reads them: leading numeric text counts, anything else becomes NaN and is
/// reported by the validator instead of failing deserialization.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum NumberInput {
    Number(f64),
    Text(String),
    Other(IgnoredAny),
}

impl NumberInput {
    pub fn to_f64(&self) -> f64 {
        match self {
            NumberInput::Number(n) => *n,
            NumberInput::Text(s) => parse_leading_number(s),
            NumberInput::Other(_) => f64::NAN,
        }
    }
}

/// Missing or unreadable numbers become NaN
pub fn number_or_nan(value: Option<NumberInput>) -> f64 {
    value.map(|v| v.to_f64()).unwrap_or(f64::NAN)
}

/// Parse the longest numeric prefix of `s` ("12.5 ha" gives 12.5).
/// Returns NaN when there is none.
pub fn parse_leading_number(s: &str) -> f64 {
    let s = s.trim_start();
    let bytes = s.as_bytes();
    let digits_from = |mut i: usize| {
        while i < bytes.len() && bytes[i].is_ascii_digit() {
            i += 1;
        }
        i
    };

    let mut end = 0;
    if end < bytes.len() && (bytes[end] == b'+' || bytes[end] == b'-') {
        end += 1;
    }
    let int_end = digits_from(end);
    let mut has_digits = int_end > end;
    end = int_end;
    if end < bytes.len() && bytes[end] == b'.' {
        let frac_end = digits_from(end + 1);
        has_digits |= frac_end > end + 1;
        end = frac_end;
    }
    if !has_digits {
        return f64::NAN;
    }
    if end < bytes.len() && (bytes[end] == b'e' || bytes[end] == b'E') {
        let mut exp = end + 1;
        if exp < bytes.len() && (bytes[exp] == b'+' || bytes[exp] == b'-') {
            exp += 1;
        }
        let exp_end = digits_from(exp);
        if exp_end > exp {
            end = exp_end;
        }
    }

    s[..end].parse().unwrap_or(f64::NAN)
}

fn lenient_f64<'de, D>(deserializer: D) -> Result<f64, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(number_or_nan(Option::<NumberInput>::deserialize(deserializer)?))
}

fn missing_number() -> f64 {
    f64::NAN
}

/// A product in a calculation, dosed per hectare
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Product {
    /// Caller-supplied key, carried through unchanged
    pub id: String,
    pub name: String,
    /// Quantity applied per hectare, in `unit`
    #[serde(default = "missing_number", deserialize_with = "lenient_f64")]
    pub dose: f64,
    pub unit: ProductUnit,
}

/// Everything needed to calculate a spray mix
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CalculationInput {
    /// Field area in hectares
    #[serde(default = "missing_number", deserialize_with = "lenient_f64")]
    pub area_ha: f64,
    /// Application rate: liters of finished mix per hectare
    #[serde(default = "missing_number", deserialize_with = "lenient_f64")]
    pub taxa_l_ha: f64,
    /// Capacity of one tank load in liters
    #[serde(default = "missing_number", deserialize_with = "lenient_f64")]
    pub volume_tanque_l: f64,
    #[serde(default)]
    pub products: Vec<Product>,
}

/// Per-product quantities, in the product's own unit
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductResult {
    pub id: String,
    pub name: String,
    pub unit: ProductUnit,
    pub dose_ha: f64,
    /// Quantity for the whole job
    pub total_produto: f64,
    /// Quantity to add to every tank load
    pub produto_por_tanque: f64,
}

/// Result of a spray-mix calculation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CalculationResult {
    /// Finished mix (water + products) for the whole area
    pub volume_total_l: f64,
    /// Tank loads required, rounded up
    pub numero_tanques: u64,
    /// Combined product volume added to each tank, in liters
    pub total_produtos_por_tanque_l: f64,
    /// Water to top up each tank; negative when products exceed the tank
    pub agua_por_tanque_l: f64,
    pub produtos: Vec<ProductResult>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::calda::validator::{
        validation_messages, MSG_INVALID_AREA, MSG_INVALID_RATE, MSG_INVALID_TANK,
    };

    #[test]
    fn test_input_json_shape() {
        let json = r#"{
            "areaHa": 10,
            "taxaLHa": 10,
            "volumeTanqueL": 10,
            "products": [{"id": "1", "name": "Herbicide A", "dose": 200, "unit": "mL"}]
        }"#;
        let input: CalculationInput = serde_json::from_str(json).unwrap();
        assert_eq!(input.area_ha, 10.0);
        assert_eq!(input.taxa_l_ha, 10.0);
        assert_eq!(input.volume_tanque_l, 10.0);
        assert_eq!(input.products[0].unit, ProductUnit::Milliliters);
    }

    #[test]
    fn test_result_json_field_names() {
        let result = CalculationResult {
            volume_total_l: 100.0,
            numero_tanques: 10,
            total_produtos_por_tanque_l: 0.2,
            agua_por_tanque_l: 9.8,
            produtos: vec![],
        };
        let value = serde_json::to_value(&result).unwrap();
        assert!(value.get("volumeTotalL").is_some());
        assert!(value.get("numeroTanques").is_some());
        assert!(value.get("totalProdutosPorTanqueL").is_some());
        assert!(value.get("aguaPorTanqueL").is_some());
    }

    #[test]
    fn test_parse_leading_number() {
        assert_eq!(parse_leading_number("12.5"), 12.5);
        assert_eq!(parse_leading_number(" 12.5 ha"), 12.5);
        assert_eq!(parse_leading_number("-3"), -3.0);
        assert_eq!(parse_leading_number(".5"), 0.5);
        assert_eq!(parse_leading_number("1e3L"), 1000.0);
        assert_eq!(parse_leading_number("2e"), 2.0);
        assert!(parse_leading_number("abc").is_nan());
        assert!(parse_leading_number("").is_nan());
        assert!(parse_leading_number("-").is_nan());
        assert!(parse_leading_number(".").is_nan());
    }

    #[test]
    fn test_text_numbers_accepted() {
        let json = r#"{
            "areaHa": "10",
            "taxaLHa": " 10.5 ",
            "volumeTanqueL": 10,
            "products": [{"id": "1", "name": "A", "dose": "200", "unit": "mL"}]
        }"#;
        let input: CalculationInput = serde_json::from_str(json).unwrap();
        assert_eq!(input.area_ha, 10.0);
        assert_eq!(input.taxa_l_ha, 10.5);
        assert_eq!(input.products[0].dose, 200.0);
    }

    #[test]
    fn test_unreadable_numbers_reach_the_validator() {
        let json = r#"{
            "areaHa": "abc",
            "taxaLHa": null,
            "volumeTanqueL": true,
            "products": [{"id": "1", "name": "A", "unit": "mL"}]
        }"#;
        let input: CalculationInput = serde_json::from_str(json).unwrap();
        assert!(input.area_ha.is_nan());
        assert!(input.products[0].dose.is_nan());

        let messages = validation_messages(&input);
        assert_eq!(messages[0], MSG_INVALID_AREA);
        assert_eq!(messages[1], MSG_INVALID_RATE);
        assert_eq!(messages[2], MSG_INVALID_TANK);
        assert_eq!(messages.len(), 4);
    }

    #[test]
    fn test_missing_fields_reach_the_validator() {
        let input: CalculationInput = serde_json::from_str(r#"{"taxaLHa": 10}"#).unwrap();
        let messages = validation_messages(&input);
        assert_eq!(messages[0], MSG_INVALID_AREA);
        assert_eq!(messages[1], MSG_INVALID_TANK);
        assert_eq!(messages.len(), 3);
    }
}
