//! BOP2 math utilities.

pub mod math;

pub use math::beta::*;
pub use math::binomial;
pub use math::stable::*;
