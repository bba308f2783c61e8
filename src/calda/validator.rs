//! Input validation
//!
//! Every check runs and every failure is reported, so a caller can show all
//! problems with a form at once.

use thiserror::Error;

use super::types::CalculationInput;

pub const MSG_INVALID_AREA: &str = "Area (ha) must be a number greater than 0";
pub const MSG_INVALID_RATE: &str = "Application rate (L/ha) must be a number greater than 0";
pub const MSG_INVALID_TANK: &str = "Tank volume (L) must be a number greater than 0";
pub const MSG_NO_PRODUCTS: &str = "Add at least one product";

/// Errors produced by the calculation engine
#[derive(Debug, Clone, PartialEq, Error)]
pub enum CalcError {
    #[error("Invalid input: {}", .messages.join("; "))]
    InvalidInput { messages: Vec<String> },
}

impl CalcError {
    pub fn messages(&self) -> &[String] {
        match self {
            CalcError::InvalidInput { messages } => messages,
        }
    }

    /// The message to show when only one fits on screen
    pub fn first_message(&self) -> Option<&str> {
        self.messages().first().map(String::as_str)
    }
}

fn is_positive(value: f64) -> bool {
    value.is_finite() && value > 0.0
}

/// Collect every validation message for `input`, in check order
pub fn validation_messages(input: &CalculationInput) -> Vec<String> {
    let mut messages = Vec::new();

    if !is_positive(input.area_ha) {
        messages.push(MSG_INVALID_AREA.to_string());
    }
    if !is_positive(input.taxa_l_ha) {
        messages.push(MSG_INVALID_RATE.to_string());
    }
    if !is_positive(input.volume_tanque_l) {
        messages.push(MSG_INVALID_TANK.to_string());
    }
    if input.products.is_empty() {
        messages.push(MSG_NO_PRODUCTS.to_string());
    }

    for (index, product) in input.products.iter().enumerate() {
        if !is_positive(product.dose) {
            messages.push(invalid_dose_message(index, &product.name));
        }
    }

    messages
}

/// Message for a product whose dose is missing, zero, or negative
pub fn invalid_dose_message(index: usize, name: &str) -> String {
    let name = name.trim();
    if name.is_empty() {
        format!("Dose of product #{} must be a number greater than 0", index + 1)
    } else {
        format!(
            "Dose of product #{} ({}) must be a number greater than 0",
            index + 1,
            name
        )
    }
}

/// Validate a calculation input
pub fn validate(input: &CalculationInput) -> Result<(), CalcError> {
    let messages = validation_messages(input);
    if messages.is_empty() {
        Ok(())
    } else {
        Err(CalcError::InvalidInput { messages })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::calda::types::Product;
    use crate::calda::units::ProductUnit;

    fn product(name: &str, dose: f64) -> Product {
        Product {
            id: "1".to_string(),
            name: name.to_string(),
            dose,
            unit: ProductUnit::Milliliters,
        }
    }

    fn valid_input() -> CalculationInput {
        CalculationInput {
            area_ha: 10.0,
            taxa_l_ha: 10.0,
            volume_tanque_l: 10.0,
            products: vec![product("Herbicide A", 200.0)],
        }
    }

    #[test]
    fn test_valid_input_passes() {
        assert!(validate(&valid_input()).is_ok());
    }

    #[test]
    fn test_zero_area() {
        let mut input = valid_input();
        input.area_ha = 0.0;
        let err = validate(&input).unwrap_err();
        assert_eq!(err.messages(), &[MSG_INVALID_AREA.to_string()]);
    }

    #[test]
    fn test_negative_and_non_finite_values() {
        let mut input = valid_input();
        input.taxa_l_ha = -5.0;
        input.volume_tanque_l = f64::NAN;
        let err = validate(&input).unwrap_err();
        assert_eq!(
            err.messages(),
            &[MSG_INVALID_RATE.to_string(), MSG_INVALID_TANK.to_string()]
        );

        let mut input = valid_input();
        input.area_ha = f64::INFINITY;
        assert!(validate(&input).is_err());
    }

    #[test]
    fn test_empty_products() {
        let mut input = valid_input();
        input.products.clear();
        let err = validate(&input).unwrap_err();
        assert_eq!(err.first_message(), Some(MSG_NO_PRODUCTS));
    }

    #[test]
    fn test_messages_accumulate_in_order() {
        let input = CalculationInput {
            area_ha: 0.0,
            taxa_l_ha: 10.0,
            volume_tanque_l: 10.0,
            products: vec![],
        };
        let err = validate(&input).unwrap_err();
        assert_eq!(
            err.messages(),
            &[MSG_INVALID_AREA.to_string(), MSG_NO_PRODUCTS.to_string()]
        );
        assert_eq!(err.first_message(), Some(MSG_INVALID_AREA));
    }

    #[test]
    fn test_invalid_product_doses() {
        let mut input = valid_input();
        input.products = vec![
            product("Good", 100.0),
            product("Zero", 0.0),
            product("", f64::NAN),
        ];
        let err = validate(&input).unwrap_err();
        assert_eq!(err.messages().len(), 2);
        assert!(err.messages()[0].contains("#2 (Zero)"));
        assert!(err.messages()[1].contains("#3 must"));
    }

    #[test]
    fn test_empty_name_is_not_an_error() {
        let mut input = valid_input();
        input.products = vec![product("   ", 50.0)];
        assert!(validate(&input).is_ok());
    }

    #[test]
    fn test_error_display() {
        let err = CalcError::InvalidInput {
            messages: vec!["a".to_string(), "b".to_string()],
        };
        assert_eq!(err.to_string(), "Invalid input: a; b");
    }
}
