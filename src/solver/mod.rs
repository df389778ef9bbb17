//! Tightens a bound by searching theta and the free Hölder exponents.
pub mod optimizer;
pub mod problem;

pub use optimizer::SimpleGradient;
pub use problem::{Optimum, SearchStep};
