//! Calda Library
//!
//! Spray-mix calculation engine plus the catalog, history, and MCP server
//! built around it.

pub mod build_info;
pub mod calda;
pub mod config;
pub mod db;
pub mod mcp;
pub mod models;
pub mod tools;
