pub mod eligibility_service;
pub mod subscription_service;

pub use eligibility_service::*;
pub use subscription_service::*;
