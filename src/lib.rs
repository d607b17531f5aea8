//! treexpert: versioned expert decision trees
//!
//! Layers, innermost first: `domain` (tree model, builder, evaluator),
//! `application` (services over the store boundary), `infrastructure`
//! (stores, filesystem, wiring) and `cli`.

pub mod application;
pub mod cli;
pub mod config;
pub mod domain;
pub mod exitcode;
pub mod infrastructure;
pub mod util;
