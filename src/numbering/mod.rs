//! Invoice and reference numbering

pub mod allocator;
pub mod reference;

pub use allocator::*;
pub use reference::*;
