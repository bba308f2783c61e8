//! Presentation of calculation results
//!
//! Rounding happens only here, once per output field, after all the
//! arithmetic is done.

use super::types::{CalculationInput, CalculationResult, ProductResult};

/// Round to 2 decimal places, halves away from zero
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Round every numeric field of a result to 2 decimal places
pub fn round_result(result: &CalculationResult) -> CalculationResult {
    CalculationResult {
        volume_total_l: round2(result.volume_total_l),
        numero_tanques: result.numero_tanques,
        total_produtos_por_tanque_l: round2(result.total_produtos_por_tanque_l),
        agua_por_tanque_l: round2(result.agua_por_tanque_l),
        produtos: result
            .produtos
            .iter()
            .map(|p| ProductResult {
                id: p.id.clone(),
                name: p.name.clone(),
                unit: p.unit,
                dose_ha: round2(p.dose_ha),
                total_produto: round2(p.total_produto),
                produto_por_tanque: round2(p.produto_por_tanque),
            })
            .collect(),
    }
}

/// Format a number the way the result screen shows it: no trailing zeros
pub fn format_number(value: f64) -> String {
    let rounded = round2(value);
    let text = format!("{:.2}", rounded);
    let text = text.trim_end_matches('0').trim_end_matches('.');
    if text == "-0" {
        "0".to_string()
    } else {
        text.to_string()
    }
}

fn plural(count: u64, singular: &str, plural: &str) -> String {
    if count == 1 {
        format!("{} {}", count, singular)
    } else {
        format!("{} {}", count, plural)
    }
}

/// Title for a saved calculation that was stored without one
pub fn default_title(input: &CalculationInput) -> String {
    format!("Calculation - {} ha", format_number(input.area_ha))
}

/// Per-tank mixing instructions for the operator
pub fn mixing_instructions(result: &CalculationResult, volume_tanque_l: f64) -> String {
    let mut lines = vec!["For each tank:".to_string()];
    for p in &result.produtos {
        lines.push(format!(
            "- Add {} {} of {}",
            format_number(p.produto_por_tanque),
            p.unit,
            p.name
        ));
    }
    lines.push(format!(
        "- Add {} L of water",
        format_number(result.agua_por_tanque_l)
    ));
    lines.push(format!(
        "- Total: {} L of mix per tank",
        format_number(volume_tanque_l)
    ));
    lines.join("\n")
}

/// Step-by-step explanation of how the result was reached
pub fn format_step_summary(input: &CalculationInput, result: &CalculationResult) -> String {
    let mut output = String::new();

    output.push_str(&format!(
        "Step 1 - Total mix volume: {} ha x {} L/ha = {} L\n",
        format_number(input.area_ha),
        format_number(input.taxa_l_ha),
        format_number(result.volume_total_l)
    ));
    output.push_str(&format!(
        "Step 2 - Tanks: {} L / {} L = {}\n",
        format_number(result.volume_total_l),
        format_number(input.volume_tanque_l),
        plural(result.numero_tanques, "tank", "tanks")
    ));

    for p in &result.produtos {
        output.push_str(&format!("{}\n", p.name));
        output.push_str(&format!(
            "  Step 3 - Product for the job: {} ha x {} {}/ha = {} {}\n",
            format_number(input.area_ha),
            format_number(p.dose_ha),
            p.unit,
            format_number(p.total_produto),
            p.unit
        ));
        output.push_str(&format!(
            "  Step 4 - Product per tank: {} {} / {} = {} {}\n",
            format_number(p.total_produto),
            p.unit,
            plural(result.numero_tanques, "tank", "tanks"),
            format_number(p.produto_por_tanque),
            p.unit
        ));
    }

    output.push_str(&format!(
        "Step 5 - Water per tank: {} L (tank) - {} L (products) = {} L\n",
        format_number(input.volume_tanque_l),
        format_number(result.total_produtos_por_tanque_l),
        format_number(result.agua_por_tanque_l)
    ));

    output
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::calda::calculator::calculate_calda;
    use crate::calda::types::Product;
    use crate::calda::units::ProductUnit;

    fn scenario_one() -> CalculationInput {
        CalculationInput {
            area_ha: 10.0,
            taxa_l_ha: 10.0,
            volume_tanque_l: 10.0,
            products: vec![Product {
                id: "1".to_string(),
                name: "Herbicide A".to_string(),
                dose: 200.0,
                unit: ProductUnit::Milliliters,
            }],
        }
    }

    #[test]
    fn test_round2_half_away_from_zero() {
        assert_eq!(round2(0.125), 0.13);
        assert_eq!(round2(-0.125), -0.13);
        assert_eq!(round2(1.375), 1.38);
        assert_eq!(round2(9.8), 9.8);
        assert_eq!(round2(1.0 / 3.0), 0.33);
    }

    #[test]
    fn test_round_result_applies_per_field() {
        let input = CalculationInput {
            area_ha: 3.0,
            taxa_l_ha: 10.0,
            volume_tanque_l: 7.0,
            products: vec![Product {
                id: "1".to_string(),
                name: "P".to_string(),
                dose: 100.0,
                unit: ProductUnit::Milliliters,
            }],
        };
        // 30 L over 7 L tanks = 5 tanks, 300 mL / 5 = 60 mL per tank
        let result = calculate_calda(&input).unwrap();
        let rounded = round_result(&result);
        assert_eq!(rounded.numero_tanques, 5);
        assert_eq!(rounded.produtos[0].produto_por_tanque, 60.0);
        assert_eq!(rounded.total_produtos_por_tanque_l, 0.06);
        assert_eq!(rounded.agua_por_tanque_l, 6.94);
    }

    #[test]
    fn test_rounded_scenario_matches_displayed_values() {
        let rounded = round_result(&calculate_calda(&scenario_one()).unwrap());
        assert_eq!(rounded.volume_total_l, 100.0);
        assert_eq!(rounded.total_produtos_por_tanque_l, 0.2);
        assert_eq!(rounded.agua_por_tanque_l, 9.8);
        assert_eq!(rounded.produtos[0].total_produto, 2000.0);
    }

    #[test]
    fn test_format_number() {
        assert_eq!(format_number(9.8), "9.8");
        assert_eq!(format_number(100.0), "100");
        assert_eq!(format_number(1.256), "1.26");
        assert_eq!(format_number(-0.001), "0");
    }

    #[test]
    fn test_default_title() {
        assert_eq!(default_title(&scenario_one()), "Calculation - 10 ha");
    }

    #[test]
    fn test_mixing_instructions() {
        let input = scenario_one();
        let result = round_result(&calculate_calda(&input).unwrap());
        let text = mixing_instructions(&result, input.volume_tanque_l);
        assert_eq!(
            text,
            "For each tank:\n- Add 200 mL of Herbicide A\n- Add 9.8 L of water\n- Total: 10 L of mix per tank"
        );
    }

    #[test]
    fn test_step_summary_mentions_every_step() {
        let input = scenario_one();
        let result = calculate_calda(&input).unwrap();
        let summary = format_step_summary(&input, &result);
        assert!(summary.contains("10 ha x 10 L/ha = 100 L"));
        assert!(summary.contains("= 10 tanks"));
        assert!(summary.contains("10 ha x 200 mL/ha = 2000 mL"));
        assert!(summary.contains("2000 mL / 10 tanks = 200 mL"));
        assert!(summary.contains("10 L (tank) - 0.2 L (products) = 9.8 L"));
    }
}
