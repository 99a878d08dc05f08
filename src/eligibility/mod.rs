//! Exam-access eligibility: who may see their batch's exams right now, and if
//! not, the first reason why.

pub mod outcome;
pub mod reason;
pub mod resolver;
pub mod store;

#[cfg(test)]
pub(crate) mod testing;

pub use outcome::*;
pub use reason::*;
pub use resolver::{EligibilitySnapshot, evaluate, resolve};
pub use store::*;
