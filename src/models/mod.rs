pub mod common;
pub mod eligibility;
pub mod subscription;

pub use common::*;
pub use eligibility::*;
pub use subscription::*;
