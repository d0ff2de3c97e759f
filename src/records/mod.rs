//! Generated invoice records

pub mod store;

pub use store::*;
