//! Tax computation: GST amounts, place of supply and amount in words

pub mod gst;
pub mod place_of_supply;
pub mod words;

pub use gst::*;
pub use place_of_supply::*;
pub use words::*;
