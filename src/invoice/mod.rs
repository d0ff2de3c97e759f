//! Invoice field preparation

pub mod prepare;

pub use prepare::*;
