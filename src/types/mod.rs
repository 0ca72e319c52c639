//! # types
//!
//! `types` is the module containing all the public structs of the crate:
//! the database model, its entities, parse options and errors.

pub mod attributes;
pub mod database;
pub mod errors;
pub mod message;
pub mod node;
pub mod options;
pub mod signal;
