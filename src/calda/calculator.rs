//! Spray-mix ("calda") calculator
//!
//! Given the field area, application rate, tank volume and the per-hectare
//! dose of each product, works out the total mix volume, the number of tank
//! loads, how much of each product goes into every tank, and the water needed
//! to top each tank up.
//!
//! Every tank receives the same product quantity, including a final tank
//! that may be only partly filled. The per-tank dose is not scaled down for
//! that last load.

use super::types::{CalculationInput, CalculationResult, ProductResult};
use super::units::{from_milliliters, ml_to_liters, to_milliliters};
use super::validator::{validate, CalcError};

/// Validate `input` and calculate the mix.
///
/// The result is unrounded; see [`super::formatter::round_result`].
pub fn calculate_calda(input: &CalculationInput) -> Result<CalculationResult, CalcError> {
    validate(input)?;
    Ok(compute(input))
}

/// Calculate the mix for an input that already passed validation.
///
/// Cannot fail for validated input: area, rate and tank volume are all
/// positive, so there is always at least one tank to divide by.
pub fn compute(input: &CalculationInput) -> CalculationResult {
    let volume_total_l = input.area_ha * input.taxa_l_ha;
    let numero_tanques = tank_count(volume_total_l, input.volume_tanque_l);
    let tanks = numero_tanques as f64;

    let mut total_por_tanque_ml = 0.0;
    let produtos = input
        .products
        .iter()
        .map(|product| {
            let total_ml = to_milliliters(product.dose, product.unit) * input.area_ha;
            let por_tanque_ml = total_ml / tanks;
            total_por_tanque_ml += por_tanque_ml;

            ProductResult {
                id: product.id.clone(),
                name: product.name.clone(),
                unit: product.unit,
                dose_ha: product.dose,
                total_produto: from_milliliters(total_ml, product.unit),
                produto_por_tanque: from_milliliters(por_tanque_ml, product.unit),
            }
        })
        .collect();

    let total_produtos_por_tanque_l = ml_to_liters(total_por_tanque_ml);

    CalculationResult {
        volume_total_l,
        numero_tanques,
        total_produtos_por_tanque_l,
        agua_por_tanque_l: input.volume_tanque_l - total_produtos_por_tanque_l,
        produtos,
    }
}

/// Tank loads needed for `volume_total_l`, rounded up.
///
/// An exact multiple of the tank volume gives the exact quotient.
pub fn tank_count(volume_total_l: f64, volume_tanque_l: f64) -> u64 {
    let tanks = (volume_total_l / volume_tanque_l).ceil();
    if tanks < 1.0 {
        1
    } else {
        tanks as u64
    }
}
