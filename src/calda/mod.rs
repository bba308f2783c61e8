//! Spray-mix calculation engine
//!
//! Pure functions only: unit conversion, input validation, the calculation
//! itself, and presentation rounding.

pub mod calculator;
pub mod formatter;
pub mod types;
pub mod units;
pub mod validator;

pub use calculator::{calculate_calda, compute, tank_count};
pub use formatter::{
    default_title, format_number, format_step_summary, mixing_instructions, round2, round_result,
};
pub use types::{
    number_or_nan, parse_leading_number, CalculationInput, CalculationResult, NumberInput,
    Product, ProductResult,
};
pub use units::{from_milliliters, ml_to_liters, to_milliliters, ProductUnit, ML_PER_LITER};
pub use validator::{validate, validation_messages, CalcError};
