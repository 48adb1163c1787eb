//! Stageboard - kanban stage boards for CRM records
//!
//! This library provides the core functionality for Stageboard, including:
//! - The generic board core: stage matching, partitioning and drag/drop reconciliation
//! - Optimistic stage moves against a pluggable record store
//! - A SQLite ledger of records and their stage move history
//! - CLI command parsing and execution
//!
//! # Example
//!
//! ```no_run
//! use stageboard::cli::run;
//!
//! fn main() {
//!     if let Err(e) = run() {
//!         eprintln!("Error: {}", e);
//!         std::process::exit(1);
//!     }
//! }
//! ```

pub mod board;
pub mod cli;
pub mod config;
pub mod db;
pub mod models;
pub mod repo;
pub mod utils;
