//! Data models
//!
//! Rust structs representing database entities.

mod catalog_product;
mod mix_recipe;
mod saved_calculation;

pub use catalog_product::{CatalogProduct, CatalogProductCreate, ProductCategory};
pub use mix_recipe::{MixRecipe, MixRecipeCreate};
pub use saved_calculation::{SavedCalculation, SavedCalculationCreate};
