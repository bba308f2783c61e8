//! Calda Tools module
//!
//! Tool implementations behind the MCP server.

pub mod calculations;
pub mod calculator;
pub mod products;
pub mod recipes;
pub mod status;
