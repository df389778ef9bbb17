//! The symbolic function tree: theta-parameterized sigma/rho terms and the
//! combinators that compose them.
mod display;
pub mod eval;
pub mod node;

pub use node::{Exponent, Function, FunctionKind};
