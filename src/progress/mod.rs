//! Progress reporting module
//!
//! Progress readings, the display seam a poll session drives, and a
//! terminal renderer built on indicatif.

mod display;
mod reading;
mod reporter;

pub use display::*;
pub use reading::*;
pub use reporter::*;
