//! Run one spray-mix calculation from a JSON file and print the result
//!
//! Usage: cargo run --bin calda_calc -- <input.json>
//!
//! The file holds a calculation input:
//! `{"areaHa": 10, "taxaLHa": 10, "volumeTanqueL": 10, "products": [...]}`
//!
//! Numbers may be written as text ("10.5"). Missing or unreadable numbers
//! are reported with the same messages as any other invalid value.

use calda::calda::{calculate_calda, format_step_summary, mixing_instructions, round_result, CalculationInput};
use tracing_subscriber::EnvFilter;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let args: Vec<String> = std::env::args().collect();
    let path = match args.get(1) {
        Some(path) => path,
        None => {
            eprintln!("Usage: calda_calc <input.json>");
            std::process::exit(2);
        }
    };

    let text = std::fs::read_to_string(path)?;
    let input: CalculationInput = serde_json::from_str(&text)?;
    tracing::debug!("Loaded input with {} products from {}", input.products.len(), path);

    match calculate_calda(&input) {
        Ok(raw) => {
            let result = round_result(&raw);
            print!("{}", format_step_summary(&input, &raw));
            println!();
            println!("{}", mixing_instructions(&result, input.volume_tanque_l));
            println!();
            println!("{}", serde_json::to_string_pretty(&result)?);
            Ok(())
        }
        Err(e) => {
            for message in e.messages() {
                eprintln!("error: {}", message);
            }
            std::process::exit(1);
        }
    }
}
